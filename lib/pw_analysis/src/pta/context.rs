//! Analysis contexts: bounded sequences of call sites, abstract objects or
//! types.

use crate::pta::heap::ObjId;
use pw_ir::program::{ClassUid, StmtUid};
use std::fmt;
use std::rc::Rc;

/// One token of a context history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContextElem {
    CallSite(StmtUid),
    Obj(ObjId),
    Type(ClassUid),
}

impl fmt::Display for ContextElem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::CallSite(stmt) => stmt.fmt(f),
            Self::Obj(obj) => obj.fmt(f),
            Self::Type(class) => class.fmt(f),
        }
    }
}

/// An immutable context, compared by its content. Cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Context(Rc<[ContextElem]>);

impl Default for Context {
    fn default() -> Self {
        Self::empty()
    }
}

impl Context {
    #[must_use]
    pub fn empty() -> Self {
        Self(Rc::from(Vec::new()))
    }

    #[must_use]
    pub fn from_elems(elems: &[ContextElem]) -> Self {
        Self(Rc::from(elems))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn elems(&self) -> &[ContextElem] {
        &self.0
    }

    /// The last `k` elements of the context (all of them if it is shorter).
    #[must_use]
    pub fn last_k(&self, k: usize) -> Self {
        if self.len() <= k {
            return self.clone();
        }
        Self::from_elems(&self.0[self.len() - k..])
    }

    /// The last `k` elements of the context extended with `elem`.
    #[must_use]
    pub fn append_limited(&self, elem: ContextElem, k: usize) -> Self {
        if k == 0 {
            return Self::empty();
        }
        let keep = self.len().min(k - 1);
        let mut elems = Vec::with_capacity(keep + 1);
        elems.extend_from_slice(&self.0[self.len() - keep..]);
        elems.push(elem);
        Self(Rc::from(elems))
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, elem) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{elem}")?;
        }
        write!(f, "]")
    }
}
