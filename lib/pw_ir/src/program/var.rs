use crate::program::*;
use std::fmt;

/// A method-local variable.
///
/// Besides its declaration, a variable indexes the statements that use it
/// as a base (field and array accesses, instance invocations): those are
/// the statements whose effect depends on the objects the variable points
/// to.
#[derive(Debug, Clone)]
pub struct Var {
    uid: VarUid,
    method: MethodUid,
    name: String,
    type_: Type,
    pub(crate) store_fields: Vec<StmtUid>,
    pub(crate) load_fields: Vec<StmtUid>,
    pub(crate) store_arrays: Vec<StmtUid>,
    pub(crate) load_arrays: Vec<StmtUid>,
    pub(crate) invokes: Vec<StmtUid>,
}

impl Var {
    pub(crate) fn new(uid: VarUid, method: MethodUid, name: &str, type_: Type) -> Self {
        Self {
            uid,
            method,
            name: name.to_string(),
            type_,
            store_fields: Vec::new(),
            load_fields: Vec::new(),
            store_arrays: Vec::new(),
            load_arrays: Vec::new(),
            invokes: Vec::new(),
        }
    }

    #[inline]
    pub fn uid(&self) -> VarUid {
        self.uid
    }

    #[inline]
    pub fn method(&self) -> MethodUid {
        self.method
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn type_(&self) -> &Type {
        &self.type_
    }

    /// Instance field stores `x.f = y` where `x` is this variable.
    #[inline]
    pub fn store_fields(&self) -> &[StmtUid] {
        &self.store_fields
    }

    /// Instance field loads `y = x.f` where `x` is this variable.
    #[inline]
    pub fn load_fields(&self) -> &[StmtUid] {
        &self.load_fields
    }

    #[inline]
    pub fn store_arrays(&self) -> &[StmtUid] {
        &self.store_arrays
    }

    #[inline]
    pub fn load_arrays(&self) -> &[StmtUid] {
        &self.load_arrays
    }

    /// Instance invocations whose receiver is this variable.
    #[inline]
    pub fn invokes(&self) -> &[StmtUid] {
        &self.invokes
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
