//! Type descriptors of the analyzed programs.
//!
//! Types are written in the JVM/Dalvik descriptor form (`I`, `[LA;`,
//! `Ljava/lang/Object;`, ...), both when parsed and when displayed.

use crate::errors::{IrError, IrResult};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// Concrete type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Type {
    /// `void` type, only valid for return types.
    Void,
    /// `boolean` type.
    Boolean,
    /// `byte` type.
    Byte,
    /// `short` type.
    Short,
    /// `char` type.
    Char,
    /// `int` type.
    Int,
    /// `long` type.
    Long,
    /// `float` type.
    Float,
    /// `double` type.
    Double,
    /// Array of the given type descriptor, usable recursively for arrays of arrays,
    /// though it is invalid to have more than 255 dimensions.
    Array(usize, Box<Self>),
    /// Type of a fully-qualified class
    Class(String),
}

impl Type {
    /// Returns a java-like representation of the type.
    #[must_use]
    pub fn to_java_string(&self) -> String {
        match self {
            Self::Void => "void".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Byte => "byte".to_string(),
            Self::Short => "short".to_string(),
            Self::Char => "char".to_string(),
            Self::Int => "int".to_string(),
            Self::Long => "long".to_string(),
            Self::Float => "float".to_string(),
            Self::Double => "double".to_string(),
            Self::Array(n, sub) => {
                let mut s = sub.to_java_string();
                for _ in 0..*n {
                    s.push_str("[]");
                }
                s
            }
            Self::Class(name) => name.replace('/', "."),
        }
    }

    /// Objects can only be referenced through class or array types.
    #[inline]
    #[must_use]
    pub const fn is_reference(&self) -> bool {
        matches!(self, Self::Array(_, _) | Self::Class(_))
    }

    pub fn as_class_name(&self) -> Option<&str> {
        if let Self::Class(name) = self {
            Some(name)
        } else {
            None
        }
    }

    /// Returns the type of the elements of an array type, one dimension down.
    #[must_use]
    pub fn element_type(&self) -> Option<Self> {
        match self {
            Self::Array(1, inner) => Some(inner.as_ref().clone()),
            Self::Array(n, inner) => Some(Self::Array(n - 1, inner.clone())),
            _ => None,
        }
    }

    /// Splits a concatenation of descriptors, as found between the
    /// parentheses of a method descriptor (`ILjava/lang/String;[J`).
    pub fn parse_list(s: &str) -> IrResult<Vec<Self>> {
        let mut types = Vec::new();
        let bytes = s.as_bytes();
        let mut start = 0;
        while start < bytes.len() {
            let mut end = start;
            while end < bytes.len() && bytes[end] == b'[' {
                end += 1;
            }
            if end >= bytes.len() {
                return Err(conversion_error(s));
            }
            if bytes[end] == b'L' {
                match s[end..].find(';') {
                    Some(semi) => end += semi,
                    None => return Err(conversion_error(s)),
                }
            }
            types.push(Self::try_from(&s[start..=end])?);
            start = end + 1;
        }
        Ok(types)
    }
}

fn conversion_error(s: &str) -> IrError {
    IrError::Conversion {
        from: format!("&str ({s:?})"),
        to: "Type".to_string(),
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Void => write!(f, "V"),
            Self::Boolean => write!(f, "Z"),
            Self::Byte => write!(f, "B"),
            Self::Short => write!(f, "S"),
            Self::Char => write!(f, "C"),
            Self::Int => write!(f, "I"),
            Self::Long => write!(f, "J"),
            Self::Float => write!(f, "F"),
            Self::Double => write!(f, "D"),
            Self::Array(n, inner) => {
                for _ in 0..*n {
                    write!(f, "[")?;
                }
                write!(f, "{inner}")
            }
            Self::Class(classname) => write!(f, "L{classname};"),
        }
    }
}

impl TryFrom<&str> for Type {
    type Error = IrError;

    fn try_from(s: &str) -> IrResult<Self> {
        if s.is_empty() {
            return Err(conversion_error(s));
        }

        if s == "V" {
            return Ok(Self::Void);
        }

        let mut i: usize = 0;
        while i < s.len() && &s[i..=i] == "[" {
            i += 1;
        }
        if i >= s.len() || i >= 255 {
            return Err(conversion_error(s));
        }

        let t = match &s[i..] {
            "Z" => Self::Boolean,
            "B" => Self::Byte,
            "S" => Self::Short,
            "C" => Self::Char,
            "I" => Self::Int,
            "J" => Self::Long,
            "F" => Self::Float,
            "D" => Self::Double,
            sub => {
                let l = sub.len();
                if l > 2 && sub.starts_with('L') && sub.ends_with(';') {
                    Self::Class(sub[1..l - 1].to_string())
                } else {
                    return Err(conversion_error(s));
                }
            }
        };
        if i == 0 {
            Ok(t)
        } else {
            Ok(Self::Array(i, Box::new(t)))
        }
    }
}
