use crate::program::*;
use bitflags::bitflags;
use lazy_static::lazy_static;
use regex::Regex;
use std::convert::TryFrom;
use std::fmt;

bitflags! {
    pub struct MethodFlags: u32 {
        const ACC_PUBLIC = 0x1;
        const ACC_PRIVATE = 0x2;
        const ACC_STATIC = 0x8;
        const ACC_NATIVE = 0x100;
        const ACC_ABSTRACT = 0x400;
    }
}

/// The method definition.
#[derive(Debug, Clone)]
pub struct Method {
    // Unique identifier in the program
    uid: MethodUid,
    // Declaring class
    class: ClassUid,
    flags: MethodFlags,
    // Cache of names and types that identify the method
    descriptor: MethodDescr,
    // Absent for abstract and native methods
    body: Option<Body>,
}

impl Method {
    pub(crate) fn new(
        uid: MethodUid,
        class: ClassUid,
        descriptor: MethodDescr,
        flags: MethodFlags,
    ) -> Self {
        Self {
            uid,
            class,
            flags,
            descriptor,
            body: None,
        }
    }

    pub(crate) fn set_body(&mut self, body: Body) {
        self.body = Some(body);
    }

    #[inline]
    pub fn uid(&self) -> MethodUid {
        self.uid
    }

    #[inline]
    pub fn class(&self) -> ClassUid {
        self.class
    }

    #[inline]
    pub fn descriptor(&self) -> &MethodDescr {
        &self.descriptor
    }

    #[inline]
    pub fn subsignature(&self) -> &Subsignature {
        &self.descriptor.subsig
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.descriptor.subsig.name
    }

    #[inline]
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::ACC_STATIC)
    }

    #[inline]
    #[must_use]
    pub const fn is_abstract(&self) -> bool {
        self.flags.contains(MethodFlags::ACC_ABSTRACT)
    }

    #[inline]
    #[must_use]
    pub const fn is_native(&self) -> bool {
        self.flags.contains(MethodFlags::ACC_NATIVE)
    }

    #[inline]
    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.flags.contains(MethodFlags::ACC_PRIVATE)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.descriptor.fmt(f)
    }
}

/// Variables and statements of a method with an implementation.
#[derive(Debug, Clone, Default)]
pub struct Body {
    pub(crate) this: Option<VarUid>,
    pub(crate) params: Vec<VarUid>,
    pub(crate) return_vars: Vec<VarUid>,
    pub(crate) vars: Vec<VarUid>,
    pub(crate) stmts: Vec<StmtUid>,
}

impl Body {
    /// The implicit receiver variable, for instance methods.
    #[inline]
    pub fn this(&self) -> Option<VarUid> {
        self.this
    }

    #[inline]
    pub fn params(&self) -> &[VarUid] {
        &self.params
    }

    /// Variables whose values may be returned by the method.
    #[inline]
    pub fn return_vars(&self) -> &[VarUid] {
        &self.return_vars
    }

    /// All the variables of the method, including `this` and parameters.
    #[inline]
    pub fn vars(&self) -> &[VarUid] {
        &self.vars
    }

    #[inline]
    pub fn stmts(&self) -> &[StmtUid] {
        &self.stmts
    }
}

/// Name, parameters types and return type of a method: what a
/// virtual call looks up in the method tables of the receiver classes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subsignature {
    name: String,
    parameters_types: Vec<Type>,
    return_type: Type,
}

impl Subsignature {
    pub fn new(name: &str, parameters_types: Vec<Type>, return_type: Type) -> Self {
        Self {
            name: name.to_string(),
            parameters_types,
            return_type,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parameters_types(&self) -> &[Type] {
        &self.parameters_types
    }

    #[inline]
    pub fn return_type(&self) -> &Type {
        &self.return_type
    }
}

impl fmt::Display for Subsignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for t in &self.parameters_types {
            write!(f, "{t}")?;
        }
        write!(f, "){}", self.return_type)
    }
}

/// A wrapper to cache prototype information of a method together with
/// its declaring class name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodDescr {
    class_name: String,
    subsig: Subsignature,
}

impl MethodDescr {
    pub fn new(class_name: &str, subsig: Subsignature) -> Self {
        Self {
            class_name: class_name.to_string(),
            subsig,
        }
    }

    #[inline]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[inline]
    pub fn subsignature(&self) -> &Subsignature {
        &self.subsig
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.subsig.name()
    }
}

impl fmt::Display for MethodDescr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "L{};->{}", self.class_name, self.subsig)
    }
}

lazy_static! {
    static ref METHOD_DESCR_RE: Regex =
        Regex::new(r"^L([^;]+);->([^(]+)\(([^)]*)\)(.+)$").unwrap();
}

/// Method references, as they appear at call sites, are plain
/// descriptors: the declaring class may only be a parent of the class
/// that actually implements the method.
pub type MethodRef = MethodDescr;

impl TryFrom<&str> for MethodDescr {
    type Error = IrError;

    fn try_from(s: &str) -> IrResult<Self> {
        let caps = METHOD_DESCR_RE
            .captures(s)
            .ok_or_else(|| IrError::InvalidMethodRef(s.to_string()))?;
        let parameters_types = Type::parse_list(&caps[3])?;
        let return_type = Type::try_from(&caps[4])?;
        Ok(Self {
            class_name: caps[1].to_string(),
            subsig: Subsignature::new(&caps[2], parameters_types, return_type),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_descriptors() {
        let descr = MethodDescr::try_from("Lcom/A;->foo(I[LB;)Ljava/lang/Object;").unwrap();
        assert_eq!(descr.class_name(), "com/A");
        assert_eq!(descr.name(), "foo");
        assert_eq!(
            descr.subsignature().parameters_types(),
            &[
                Type::Int,
                Type::Array(1, Box::new(Type::Class("B".to_string())))
            ]
        );
        assert_eq!(
            format!("{descr}"),
            "Lcom/A;->foo(I[LB;)Ljava/lang/Object;"
        );
        assert_eq!(format!("{}", descr.subsignature()), "foo(I[LB;)Ljava/lang/Object;");
    }

    #[test]
    fn malformed_method_descriptors() {
        assert!(MethodDescr::try_from("A->foo()V").is_err());
        assert!(MethodDescr::try_from("LA;->foo(").is_err());
        assert!(MethodDescr::try_from("LA;->foo(Q)V").is_err());
        assert!(MethodDescr::try_from("LA;->foo()").is_err());
    }
}
