//! This crate provides the program representation analyzed by the
//! `PtaWorks` points-to solver: classes, members, method bodies made of
//! pointer-relevant statements, the class hierarchy and the method
//! dispatch oracle.

pub mod errors;
pub mod hierarchy;
pub mod loader;
pub mod program;
pub mod types;

mod dispatch;

pub use crate::loader::{load_json, load_reader};
