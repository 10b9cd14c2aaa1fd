//! Heap abstraction: the abstract objects standing for runtime objects.

use crate::errors::{AnalysisError, AnalysisResult};
use pw_ir::program::{ClassUid, MethodUid, Program, StmtKind, StmtUid};
use pw_ir::types::Type;
use rustc_hash::FxHashMap;
use std::fmt;

/// Unique id of an abstract object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjId(u32);

impl ObjId {
    pub(crate) const fn new(idx: u32) -> Self {
        Self(idx)
    }

    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "o{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjKind {
    /// Objects allocated by a `new` statement.
    NewObj(StmtUid),
    /// Objects that do not come from the program itself, identified by a
    /// description.
    Mock(String),
}

/// An abstract object.
#[derive(Debug, Clone)]
pub struct Obj {
    id: ObjId,
    kind: ObjKind,
    type_: Type,
    method: Option<MethodUid>,
    container: ClassUid,
}

impl Obj {
    #[inline]
    pub fn id(&self) -> ObjId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> &ObjKind {
        &self.kind
    }

    /// The type of the represented runtime objects.
    #[inline]
    pub fn type_(&self) -> &Type {
        &self.type_
    }

    /// The method containing the allocation, if any.
    #[inline]
    pub fn method(&self) -> Option<MethodUid> {
        self.method
    }

    /// The class declaring the allocating method.
    #[inline]
    pub fn container_type(&self) -> ClassUid {
        self.container
    }

    pub fn descr(&self, program: &Program) -> String {
        match &self.kind {
            ObjKind::NewObj(stmt) => format!("new {} @ {}", self.type_, program.stmt_descr(*stmt)),
            ObjKind::Mock(descr) => format!("mock {} <{}>", self.type_, descr),
        }
    }
}

/// Maps allocation sites to abstract objects.
pub trait HeapModel {
    /// The object abstracting the allocation done by a `new` statement.
    /// Returns the same object each time it is called with the same statement.
    fn get_obj(&mut self, program: &Program, alloc: StmtUid) -> AnalysisResult<ObjId>;

    /// The mock object of the given description, created on first request.
    fn mock_obj(&mut self, descr: &str, type_: Type, container: ClassUid) -> ObjId;

    fn obj(&self, id: ObjId) -> &Obj;

    fn nb_objs(&self) -> usize;
}

/// One abstract object per allocation site.
#[derive(Debug, Default)]
pub struct AllocationSiteHeapModel {
    objs: Vec<Obj>,
    sites: FxHashMap<StmtUid, ObjId>,
    mocks: FxHashMap<String, ObjId>,
}

impl AllocationSiteHeapModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: ObjKind, type_: Type, method: Option<MethodUid>, container: ClassUid) -> ObjId {
        let id = ObjId::new(self.objs.len() as u32);
        self.objs.push(Obj {
            id,
            kind,
            type_,
            method,
            container,
        });
        id
    }
}

impl HeapModel for AllocationSiteHeapModel {
    fn get_obj(&mut self, program: &Program, alloc: StmtUid) -> AnalysisResult<ObjId> {
        if let Some(id) = self.sites.get(&alloc) {
            return Ok(*id);
        }
        let stmt = &program[alloc];
        let StmtKind::New { type_, .. } = stmt.kind() else {
            return Err(AnalysisError::Internal(format!(
                "{} is not an allocation",
                program.stmt_descr(alloc)
            )));
        };
        let method = stmt.method();
        let container = program[method].class();
        let id = self.push(ObjKind::NewObj(alloc), type_.clone(), Some(method), container);
        self.sites.insert(alloc, id);
        Ok(id)
    }

    fn mock_obj(&mut self, descr: &str, type_: Type, container: ClassUid) -> ObjId {
        if let Some(id) = self.mocks.get(descr) {
            return *id;
        }
        let id = self.push(ObjKind::Mock(descr.to_string()), type_, None, container);
        self.mocks.insert(descr.to_string(), id);
        id
    }

    fn obj(&self, id: ObjId) -> &Obj {
        &self.objs[id.idx()]
    }

    fn nb_objs(&self) -> usize {
        self.objs.len()
    }
}
