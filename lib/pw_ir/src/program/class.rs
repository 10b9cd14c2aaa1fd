use crate::program::*;
use bitflags::bitflags;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

bitflags! {
    /// Class access flags the analysis cares about.
    pub struct ClassFlags: u32 {
        const ACC_PUBLIC = 0x1;
        const ACC_FINAL = 0x10;
        const ACC_INTERFACE = 0x200;
        const ACC_ABSTRACT = 0x400;
    }
}

/// The class definition, as registered in the program.
#[derive(Debug, Clone)]
pub struct Class {
    // Unique identifier in the program
    uid: ClassUid,
    // Fully qualified name, slash separated
    name: String,
    // Phantom classes are only referenced, never defined
    defined: bool,
    flags: ClassFlags,
    // Declared methods, by subsignature
    methods: BTreeMap<Subsignature, MethodUid>,
    // Declared fields, by name
    fields: BTreeMap<String, FieldUid>,
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.uid == other.uid
    }
}

impl Eq for Class {}

impl PartialOrd for Class {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Class {
    fn cmp(&self, other: &Self) -> Ordering {
        self.uid.cmp(&other.uid)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Class {
    pub(crate) fn new(uid: ClassUid, name: &str, flags: ClassFlags) -> Self {
        Self {
            uid,
            name: name.to_string(),
            defined: true,
            flags,
            methods: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Builds a class declaration for a class that is referenced but not defined.
    pub(crate) fn new_no_def(uid: ClassUid, name: &str) -> Self {
        Self {
            defined: false,
            ..Self::new(uid, name, ClassFlags::empty())
        }
    }

    pub(crate) fn insert_method(&mut self, subsig: Subsignature, method: MethodUid) -> bool {
        self.methods.insert(subsig, method).is_none()
    }

    pub(crate) fn insert_field(&mut self, name: &str, field: FieldUid) -> bool {
        self.fields.insert(name.to_string(), field).is_none()
    }

    #[inline]
    pub fn uid(&self) -> ClassUid {
        self.uid
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        self.defined
    }

    #[inline]
    #[must_use]
    pub const fn is_interface(&self) -> bool {
        self.flags.contains(ClassFlags::ACC_INTERFACE)
    }

    #[inline]
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.flags.contains(ClassFlags::ACC_ABSTRACT)
    }

    #[inline]
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.flags.contains(ClassFlags::ACC_FINAL)
    }

    /// Returns the type of the instances of the class.
    #[must_use]
    pub fn to_type(&self) -> Type {
        Type::Class(self.name.clone())
    }

    /// Returns a iterator over all methods declared in the class.
    pub fn iter_methods<'p>(&'p self, program: &'p Program) -> impl Iterator<Item = &'p Method> {
        self.methods.values().map(|muid| &program[*muid])
    }

    /// Returns a iterator over all fields declared in the class.
    pub fn iter_fields<'p>(&'p self, program: &'p Program) -> impl Iterator<Item = &'p Field> {
        self.fields.values().map(|fuid| &program[*fuid])
    }

    /// Looks for a method declared in this very class (no lookup in parents).
    #[must_use]
    pub fn get_method(&self, subsig: &Subsignature) -> Option<MethodUid> {
        self.methods.get(subsig).copied()
    }

    /// Looks for a field declared in this very class (no lookup in parents).
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<FieldUid> {
        self.fields.get(name).copied()
    }
}
