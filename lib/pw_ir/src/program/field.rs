use crate::program::*;
use bitflags::bitflags;
use lazy_static::lazy_static;
use regex::Regex;
use std::convert::TryFrom;
use std::fmt;

bitflags! {
    pub struct FieldFlags: u32 {
        const ACC_STATIC = 0x8;
        const ACC_FINAL = 0x10;
    }
}

/// The field definition.
#[derive(Debug, Clone)]
pub struct Field {
    uid: FieldUid,
    class: ClassUid,
    flags: FieldFlags,
    // Names and type that identify the field
    descriptor: FieldDescr,
}

impl Field {
    pub(crate) fn new(uid: FieldUid, class: ClassUid, descriptor: FieldDescr, flags: FieldFlags) -> Self {
        Self {
            uid,
            class,
            flags,
            descriptor,
        }
    }

    #[inline]
    pub fn uid(&self) -> FieldUid {
        self.uid
    }

    #[inline]
    pub fn class(&self) -> ClassUid {
        self.class
    }

    #[inline]
    pub fn descriptor(&self) -> &FieldDescr {
        &self.descriptor
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    #[inline]
    pub fn type_(&self) -> &Type {
        &self.descriptor.type_
    }

    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.flags.contains(FieldFlags::ACC_STATIC)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldDescr {
    class_name: String,
    name: String,
    type_: Type,
}

impl FieldDescr {
    pub(crate) fn new(class_name: &str, name: &str, type_: Type) -> Self {
        Self {
            class_name: class_name.to_string(),
            name: name.to_string(),
            type_,
        }
    }
}

impl fmt::Display for FieldDescr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "L{};->{}:{}", self.class_name, self.name, self.type_)
    }
}

/// A symbolic reference to a field, as written in statements (`LA;->f`).
/// It is resolved against the class hierarchy when the program is loaded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldRef {
    pub class_name: String,
    pub name: String,
}

lazy_static! {
    static ref FIELD_REF_RE: Regex = Regex::new(r"^L([^;]+);->([^:]+)(?::.+)?$").unwrap();
}

impl TryFrom<&str> for FieldRef {
    type Error = IrError;

    fn try_from(s: &str) -> IrResult<Self> {
        let caps = FIELD_REF_RE
            .captures(s)
            .ok_or_else(|| IrError::InvalidFieldRef(s.to_string()))?;
        Ok(Self {
            class_name: caps[1].to_string(),
            name: caps[2].to_string(),
        })
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "L{};->{}", self.class_name, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_refs() {
        let fref = FieldRef::try_from("Lcom/A;->next").unwrap();
        assert_eq!(fref.class_name, "com/A");
        assert_eq!(fref.name, "next");
        assert_eq!(format!("{fref}"), "Lcom/A;->next");

        let typed = FieldRef::try_from("LA;->f:LB;").unwrap();
        assert_eq!(typed.name, "f");

        assert!(FieldRef::try_from("A->f").is_err());
        assert!(FieldRef::try_from("LA;->").is_err());
    }
}
