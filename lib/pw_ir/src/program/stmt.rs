use crate::program::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the target of an invocation is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Static,
    Special,
    Virtual,
    Interface,
}

impl CallKind {
    /// Static and special invocations are bound without looking at the receiver.
    #[inline]
    #[must_use]
    pub const fn is_statically_bound(self) -> bool {
        matches!(self, Self::Static | Self::Special)
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Special => write!(f, "special"),
            Self::Virtual => write!(f, "virtual"),
            Self::Interface => write!(f, "interface"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Invoke {
    pub(crate) kind: CallKind,
    pub(crate) method_ref: MethodRef,
    pub(crate) base: Option<VarUid>,
    pub(crate) args: Vec<VarUid>,
    pub(crate) result: Option<VarUid>,
}

impl Invoke {
    #[inline]
    pub fn kind(&self) -> CallKind {
        self.kind
    }

    #[inline]
    pub fn method_ref(&self) -> &MethodRef {
        &self.method_ref
    }

    /// Receiver variable, `None` for static invocations.
    #[inline]
    pub fn base(&self) -> Option<VarUid> {
        self.base
    }

    #[inline]
    pub fn args(&self) -> &[VarUid] {
        &self.args
    }

    /// Variable receiving the returned value, if it is used.
    #[inline]
    pub fn result(&self) -> Option<VarUid> {
        self.result
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.kind == CallKind::Static
    }
}

/// The pointer-relevant statements of the program representation.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `lhs = new T`
    New { lhs: VarUid, type_: Type },
    /// `lhs = rhs`
    Copy { lhs: VarUid, rhs: VarUid },
    /// `base.field = rhs`
    InstanceStore {
        base: VarUid,
        field: FieldUid,
        rhs: VarUid,
    },
    /// `lhs = base.field`
    InstanceLoad {
        lhs: VarUid,
        base: VarUid,
        field: FieldUid,
    },
    /// `T.field = rhs`
    StaticStore { field: FieldUid, rhs: VarUid },
    /// `lhs = T.field`
    StaticLoad { lhs: VarUid, field: FieldUid },
    /// `base[*] = rhs`
    ArrayStore { base: VarUid, rhs: VarUid },
    /// `lhs = base[*]`
    ArrayLoad { lhs: VarUid, base: VarUid },
    Invoke(Invoke),
    Return(Option<VarUid>),
}

#[derive(Debug, Clone)]
pub struct Stmt {
    uid: StmtUid,
    method: MethodUid,
    // Position in the method body
    index: usize,
    kind: StmtKind,
}

impl Stmt {
    pub(crate) fn new(uid: StmtUid, method: MethodUid, index: usize, kind: StmtKind) -> Self {
        Self {
            uid,
            method,
            index,
            kind,
        }
    }

    #[inline]
    pub fn uid(&self) -> StmtUid {
        self.uid
    }

    /// The method containing the statement.
    #[inline]
    pub fn method(&self) -> MethodUid {
        self.method
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn kind(&self) -> &StmtKind {
        &self.kind
    }

    pub fn as_invoke(&self) -> Option<&Invoke> {
        if let StmtKind::Invoke(invoke) = &self.kind {
            Some(invoke)
        } else {
            None
        }
    }
}
