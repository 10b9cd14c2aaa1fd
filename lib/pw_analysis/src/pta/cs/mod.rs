//! Context-sensitive program elements and their canonicalization.

mod element;
mod manager;

pub use element::{
    CSCallSite, CSCallSiteId, CSMethod, CSMethodId, CSObj, CSObjId, CSVar, Pointer, PointerId,
};
pub use manager::CSManager;
