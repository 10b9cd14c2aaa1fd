//! Program entities (classes, methods, fields, variables, statements)
//! and the program table that owns them.

mod class;
mod field;
mod method;
mod repository;
mod stmt;
mod uids;
mod var;

pub use class::{Class, ClassFlags};
pub use field::{Field, FieldDescr, FieldFlags, FieldRef};
pub use method::{Body, Method, MethodDescr, MethodFlags, MethodRef, Subsignature};
pub use repository::{Program, JAVA_LANG_OBJECT};
pub use stmt::{CallKind, Invoke, Stmt, StmtKind};
pub use uids::{ClassUid, FieldUid, MethodUid, ProgramCounters, StmtUid, VarUid};
pub use var::Var;

pub(crate) use crate::errors::{IrError, IrResult};
pub(crate) use crate::types::Type;
