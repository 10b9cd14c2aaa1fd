//! Context-sensitive elements and their canonical ids.

use crate::pta::context::Context;
use crate::pta::heap::{Obj, ObjId};
use pw_ir::program::{ClassUid, FieldUid, MethodUid, StmtUid, VarUid};
use std::fmt;

macro_rules! cs_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn new(idx: usize) -> Self {
                Self(idx as u32)
            }

            #[inline]
            pub fn idx(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

cs_id!(
    /// Canonical id of a [`Pointer`]
    PointerId,
    "p"
);
cs_id!(
    /// Canonical id of a [`CSObj`]
    CSObjId,
    "cso"
);
cs_id!(
    /// Canonical id of a [`CSCallSite`]
    CSCallSiteId,
    "cscs"
);
cs_id!(
    /// Canonical id of a [`CSMethod`]
    CSMethodId,
    "csm"
);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CSVar {
    context: Context,
    var: VarUid,
}

impl CSVar {
    pub(crate) fn new(context: Context, var: VarUid) -> Self {
        Self { context, var }
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[inline]
    pub fn var(&self) -> VarUid {
        self.var
    }
}

/// An abstract object distinguished by its heap context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CSObj {
    context: Context,
    obj: ObjId,
    container: ClassUid,
}

impl CSObj {
    pub(crate) fn new(context: Context, obj: &Obj) -> Self {
        Self {
            context,
            obj: obj.id(),
            container: obj.container_type(),
        }
    }

    /// The heap context.
    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[inline]
    pub fn obj(&self) -> ObjId {
        self.obj
    }

    /// Container type of the underlying abstract object.
    #[inline]
    pub fn container_type(&self) -> ClassUid {
        self.container
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CSCallSite {
    context: Context,
    call_site: StmtUid,
}

impl CSCallSite {
    pub(crate) fn new(context: Context, call_site: StmtUid) -> Self {
        Self { context, call_site }
    }

    /// Context of the method containing the call site.
    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[inline]
    pub fn call_site(&self) -> StmtUid {
        self.call_site
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CSMethod {
    context: Context,
    method: MethodUid,
}

impl CSMethod {
    pub(crate) fn new(context: Context, method: MethodUid) -> Self {
        Self { context, method }
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[inline]
    pub fn method(&self) -> MethodUid {
        self.method
    }
}

/// The locations holding points-to sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pointer {
    Var(CSVar),
    /// Static fields are not qualified by any context.
    StaticField(FieldUid),
    InstanceField(CSObjId, FieldUid),
    /// The single slot merging all the elements of an array object.
    ArrayIndex(CSObjId),
}

impl Pointer {
    pub fn as_cs_var(&self) -> Option<&CSVar> {
        if let Self::Var(cs_var) = self {
            Some(cs_var)
        } else {
            None
        }
    }
}
