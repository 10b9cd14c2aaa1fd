use crate::pta::context::Context;
use crate::pta::cs::element::*;
use crate::pta::heap::Obj;
use crate::pta::pts::PointsToSet;
use pw_ir::program::{FieldUid, MethodUid, StmtUid, VarUid};
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::ops;

/// Interning table of one kind of element.
#[derive(Debug)]
struct Table<T, I> {
    elems: Vec<T>,
    ids: FxHashMap<T, I>,
}

impl<T, I> Default for Table<T, I> {
    fn default() -> Self {
        Self {
            elems: Vec::new(),
            ids: FxHashMap::default(),
        }
    }
}

impl<T: Clone + Eq + Hash, I: Copy> Table<T, I> {
    /// Returns the id of the element, and whether it has just been created.
    fn intern(&mut self, elem: T, new_id: fn(usize) -> I) -> (I, bool) {
        if let Some(id) = self.ids.get(&elem) {
            return (*id, false);
        }
        let id = new_id(self.elems.len());
        self.elems.push(elem.clone());
        self.ids.insert(elem, id);
        (id, true)
    }

    fn find(&self, elem: &T) -> Option<I> {
        self.ids.get(elem).copied()
    }
}

/// Canonicalization table: each context-sensitive element is given a
/// unique id, the same for structurally equal elements. The points-to set
/// of each pointer is stored here as well.
#[derive(Debug, Default)]
pub struct CSManager {
    pointers: Table<Pointer, PointerId>,
    pts: Vec<PointsToSet>,
    objs: Table<CSObj, CSObjId>,
    call_sites: Table<CSCallSite, CSCallSiteId>,
    methods: Table<CSMethod, CSMethodId>,
    // contexts in which each variable has been qualified
    var_pointers: FxHashMap<VarUid, Vec<PointerId>>,
}

impl CSManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn get_pointer(&mut self, pointer: Pointer) -> (PointerId, bool) {
        let (id, created) = self.pointers.intern(pointer, PointerId::new);
        if created {
            self.pts.push(PointsToSet::new());
        }
        (id, created)
    }

    pub fn get_cs_var(&mut self, context: &Context, var: VarUid) -> PointerId {
        let (id, created) = self.get_pointer(Pointer::Var(CSVar::new(context.clone(), var)));
        if created {
            self.var_pointers.entry(var).or_default().push(id);
        }
        id
    }

    pub fn get_static_field(&mut self, field: FieldUid) -> PointerId {
        self.get_pointer(Pointer::StaticField(field)).0
    }

    pub fn get_instance_field(&mut self, base: CSObjId, field: FieldUid) -> PointerId {
        self.get_pointer(Pointer::InstanceField(base, field)).0
    }

    pub fn get_array_index(&mut self, array: CSObjId) -> PointerId {
        self.get_pointer(Pointer::ArrayIndex(array)).0
    }

    pub fn get_cs_obj(&mut self, heap_context: &Context, obj: &Obj) -> CSObjId {
        self.objs
            .intern(CSObj::new(heap_context.clone(), obj), CSObjId::new)
            .0
    }

    pub fn get_cs_call_site(&mut self, context: &Context, call_site: StmtUid) -> CSCallSiteId {
        self.call_sites
            .intern(CSCallSite::new(context.clone(), call_site), CSCallSiteId::new)
            .0
    }

    pub fn get_cs_method(&mut self, context: &Context, method: MethodUid) -> CSMethodId {
        self.methods
            .intern(CSMethod::new(context.clone(), method), CSMethodId::new)
            .0
    }

    pub fn find_cs_var(&self, context: &Context, var: VarUid) -> Option<PointerId> {
        self.pointers
            .find(&Pointer::Var(CSVar::new(context.clone(), var)))
    }

    pub fn find_static_field(&self, field: FieldUid) -> Option<PointerId> {
        self.pointers.find(&Pointer::StaticField(field))
    }

    pub fn find_instance_field(&self, base: CSObjId, field: FieldUid) -> Option<PointerId> {
        self.pointers.find(&Pointer::InstanceField(base, field))
    }

    pub fn find_array_index(&self, array: CSObjId) -> Option<PointerId> {
        self.pointers.find(&Pointer::ArrayIndex(array))
    }

    pub fn find_cs_obj(&self, heap_context: &Context, obj: &Obj) -> Option<CSObjId> {
        self.objs.find(&CSObj::new(heap_context.clone(), obj))
    }

    pub fn find_cs_method(&self, context: &Context, method: MethodUid) -> Option<CSMethodId> {
        self.methods.find(&CSMethod::new(context.clone(), method))
    }

    pub fn find_cs_call_site(&self, context: &Context, call_site: StmtUid) -> Option<CSCallSiteId> {
        self.call_sites
            .find(&CSCallSite::new(context.clone(), call_site))
    }

    /// The pointers of a variable, one per context it was analyzed in.
    pub fn cs_vars_of(&self, var: VarUid) -> &[PointerId] {
        self.var_pointers.get(&var).map_or(&[][..], Vec::as_slice)
    }

    #[inline]
    pub fn points_to(&self, pointer: PointerId) -> &PointsToSet {
        &self.pts[pointer.idx()]
    }

    #[inline]
    pub(crate) fn points_to_mut(&mut self, pointer: PointerId) -> &mut PointsToSet {
        &mut self.pts[pointer.idx()]
    }

    pub fn iter_pointers(&self) -> impl Iterator<Item = (PointerId, &Pointer)> {
        self.pointers
            .elems
            .iter()
            .enumerate()
            .map(|(idx, pointer)| (PointerId::new(idx), pointer))
    }

    pub fn iter_cs_objs(&self) -> impl Iterator<Item = (CSObjId, &CSObj)> {
        self.objs
            .elems
            .iter()
            .enumerate()
            .map(|(idx, obj)| (CSObjId::new(idx), obj))
    }

    pub fn nb_pointers(&self) -> usize {
        self.pointers.elems.len()
    }

    pub fn nb_cs_objs(&self) -> usize {
        self.objs.elems.len()
    }

    pub fn nb_cs_call_sites(&self) -> usize {
        self.call_sites.elems.len()
    }

    pub fn nb_cs_methods(&self) -> usize {
        self.methods.elems.len()
    }
}

impl ops::Index<PointerId> for CSManager {
    type Output = Pointer;

    fn index(&self, id: PointerId) -> &Pointer {
        &self.pointers.elems[id.idx()]
    }
}

impl ops::Index<CSObjId> for CSManager {
    type Output = CSObj;

    fn index(&self, id: CSObjId) -> &CSObj {
        &self.objs.elems[id.idx()]
    }
}

impl ops::Index<CSCallSiteId> for CSManager {
    type Output = CSCallSite;

    fn index(&self, id: CSCallSiteId) -> &CSCallSite {
        &self.call_sites.elems[id.idx()]
    }
}

impl ops::Index<CSMethodId> for CSManager {
    type Output = CSMethod;

    fn index(&self, id: CSMethodId) -> &CSMethod {
        &self.methods.elems[id.idx()]
    }
}
