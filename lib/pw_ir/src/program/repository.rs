//! The program table, centralizing all the entities of the analyzed program.

use crate::hierarchy::Hierarchy;
use crate::program::*;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::ops;

/// Root of the class hierarchy.
pub const JAVA_LANG_OBJECT: &str = "java/lang/Object";

pub struct Program {
    hierarchy: Hierarchy,
    counters: ProgramCounters,
    class_ids: BTreeMap<String, ClassUid>,
    classes: Vec<Class>,
    methods: Vec<Method>,
    fields: Vec<Field>,
    vars: Vec<Var>,
    stmts: Vec<Stmt>,
    entry: Option<MethodUid>,
    pub(crate) dispatch_cache: RefCell<BTreeMap<(ClassUid, Subsignature), Option<MethodUid>>>,
}

impl Default for Program {
    fn default() -> Self {
        Self {
            hierarchy: Hierarchy::new(),
            counters: ProgramCounters::new(),
            class_ids: BTreeMap::new(),
            classes: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            vars: Vec::new(),
            stmts: Vec::new(),
            entry: None,
            dispatch_cache: RefCell::new(BTreeMap::new()),
        }
    }
}

impl ops::Index<ClassUid> for Program {
    type Output = Class;

    fn index(&self, cuid: ClassUid) -> &Class {
        &self.classes[cuid.idx()]
    }
}

impl ops::Index<MethodUid> for Program {
    type Output = Method;

    fn index(&self, muid: MethodUid) -> &Method {
        &self.methods[muid.idx()]
    }
}

impl ops::Index<FieldUid> for Program {
    type Output = Field;

    fn index(&self, fuid: FieldUid) -> &Field {
        &self.fields[fuid.idx()]
    }
}

impl ops::Index<VarUid> for Program {
    type Output = Var;

    fn index(&self, vuid: VarUid) -> &Var {
        &self.vars[vuid.idx()]
    }
}

impl ops::Index<StmtUid> for Program {
    type Output = Stmt;

    fn index(&self, suid: StmtUid) -> &Stmt {
        &self.stmts[suid.idx()]
    }
}

impl Program {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a defined class. A phantom class of the same name, created
    /// earlier because it was referenced, is turned into the defined one.
    pub(crate) fn register_class(&mut self, name: &str, flags: ClassFlags) -> IrResult<ClassUid> {
        if let Some(uid) = self.class_ids.get(name).copied() {
            if self[uid].is_defined() {
                return Err(IrError::DuplicateClass(name.to_string()));
            }
            self.classes[uid.idx()] = Class::new(uid, name, flags);
            return Ok(uid);
        }
        log::trace!("pushing '{}' in program", name);
        let uid = self.counters.new_class_uid();
        self.classes.push(Class::new(uid, name, flags));
        self.class_ids.insert(name.to_string(), uid);
        self.hierarchy.insert_class(uid)?;
        Ok(uid)
    }

    /// Returns the class of the given name, registering a phantom class
    /// if it is unknown.
    pub(crate) fn class_or_phantom(&mut self, name: &str) -> IrResult<ClassUid> {
        if let Some(uid) = self.class_ids.get(name) {
            return Ok(*uid);
        }
        log::debug!("registering phantom class '{}'", name);
        let uid = self.counters.new_class_uid();
        self.classes.push(Class::new_no_def(uid, name));
        self.class_ids.insert(name.to_string(), uid);
        self.hierarchy.insert_class(uid)?;
        Ok(uid)
    }

    pub(crate) fn insert_extends(&mut self, class: ClassUid, superclass: ClassUid) -> IrResult<()> {
        self.hierarchy.insert_extends(class, superclass)
    }

    pub(crate) fn insert_implements(&mut self, class: ClassUid, interface: ClassUid) -> IrResult<()> {
        self.hierarchy.insert_implements(class, interface)
    }

    /// Adds the `java/lang/Object` root when missing and attaches orphans to it.
    pub fn close_hierarchy(&mut self) -> IrResult<()> {
        let root = self.class_or_phantom(JAVA_LANG_OBJECT)?;
        let mut hierarchy = std::mem::take(&mut self.hierarchy);
        let res = hierarchy.close(root, self);
        self.hierarchy = hierarchy;
        res
    }

    pub(crate) fn register_field(
        &mut self,
        class: ClassUid,
        name: &str,
        type_: Type,
        flags: FieldFlags,
    ) -> IrResult<FieldUid> {
        let uid = self.counters.new_field_uid();
        let descriptor = FieldDescr::new(self[class].name(), name, type_);
        if !self.classes[class.idx()].insert_field(name, uid) {
            return Err(IrError::DuplicateField(descriptor.to_string()));
        }
        self.fields.push(Field::new(uid, class, descriptor, flags));
        Ok(uid)
    }

    pub(crate) fn register_method(
        &mut self,
        class: ClassUid,
        subsig: Subsignature,
        flags: MethodFlags,
    ) -> IrResult<MethodUid> {
        let uid = self.counters.new_method_uid();
        let descriptor = MethodDescr::new(self[class].name(), subsig.clone());
        if !self.classes[class.idx()].insert_method(subsig, uid) {
            return Err(IrError::DuplicateMethod(descriptor.to_string()));
        }
        self.methods.push(Method::new(uid, class, descriptor, flags));
        Ok(uid)
    }

    pub(crate) fn register_var(&mut self, method: MethodUid, name: &str, type_: Type) -> VarUid {
        let uid = self.counters.new_var_uid();
        self.vars.push(Var::new(uid, method, name, type_));
        uid
    }

    pub(crate) fn var_mut(&mut self, var: VarUid) -> &mut Var {
        &mut self.vars[var.idx()]
    }

    pub(crate) fn register_stmt(&mut self, method: MethodUid, index: usize, kind: StmtKind) -> StmtUid {
        let uid = self.counters.new_stmt_uid();
        self.stmts.push(Stmt::new(uid, method, index, kind));
        uid
    }

    pub(crate) fn set_body(&mut self, method: MethodUid, body: Body) {
        self.methods[method.idx()].set_body(body);
    }

    pub(crate) fn set_entry(&mut self, method: MethodUid) {
        self.entry = Some(method);
    }

    #[inline]
    #[must_use]
    pub const fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// The declared program entry method, if any.
    #[inline]
    pub fn entry(&self) -> Option<MethodUid> {
        self.entry
    }

    #[inline]
    pub fn iter_classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.iter()
    }

    #[inline]
    pub fn iter_methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    #[inline]
    pub fn iter_stmts(&self) -> impl Iterator<Item = &Stmt> {
        self.stmts.iter()
    }

    pub fn iter_missing_classes(&self) -> impl Iterator<Item = &str> {
        self.classes
            .iter()
            .filter_map(|class| (!class.is_defined()).then(|| class.name()))
    }

    pub fn get_class_by_name(&self, name: &str) -> Option<&Class> {
        self.class_ids.get(name).map(|uid| &self[*uid])
    }

    /// Finds a method declared exactly in the class named by the descriptor.
    pub fn find_method_by_descriptor(&self, descriptor: &MethodDescr) -> Option<&Method> {
        let class = self.get_class_by_name(descriptor.class_name())?;
        class
            .get_method(descriptor.subsignature())
            .map(|muid| &self[muid])
    }

    /// Looks for a field by name in a class and then in its parents.
    pub fn resolve_field(&self, fref: &FieldRef) -> Option<&Field> {
        let class = self.get_class_by_name(&fref.class_name)?;
        let mut current = Some(class.uid());
        while let Some(cuid) = current {
            if let Some(fuid) = self[cuid].get_field(&fref.name) {
                return Some(&self[fuid]);
            }
            current = self.hierarchy.superclass(cuid);
        }
        self.hierarchy
            .all_parents(class.uid())
            .into_iter()
            .filter(|parent| self[*parent].is_interface())
            .find_map(|parent| self[parent].get_field(&fref.name))
            .map(|fuid| &self[fuid])
    }

    /// Human readable name of a variable: `method/name`.
    #[must_use]
    pub fn var_descr(&self, var: VarUid) -> String {
        let var = &self[var];
        format!("{}/{}", self[var.method()], var.name())
    }

    /// Human readable position of a statement: `method@index`.
    #[must_use]
    pub fn stmt_descr(&self, stmt: StmtUid) -> String {
        let stmt = &self[stmt];
        format!("{}@{}", self[stmt.method()], stmt.index())
    }

    pub fn nb_classes(&self) -> usize {
        self.counters.nb_classes()
    }

    pub fn nb_methods(&self) -> usize {
        self.counters.nb_methods()
    }

    pub fn nb_fields(&self) -> usize {
        self.counters.nb_fields()
    }

    pub fn nb_vars(&self) -> usize {
        self.counters.nb_vars()
    }

    pub fn nb_stmts(&self) -> usize {
        self.counters.nb_stmts()
    }
}
