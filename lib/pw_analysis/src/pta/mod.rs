//! Context-sensitive, inclusion-based points-to analysis with on-the-fly
//! call graph construction.
//!
//! The analysis is parameterized by a [`ContextSelector`], which decides
//! how method calls and allocations are distinguished, and by a
//! [`HeapModel`], which decides how runtime objects are abstracted.
//! [`Plugin`]s can observe the solver and inject additional facts.

pub mod context;
pub mod cs;
pub mod cs_callgraph;
pub mod heap;
pub mod options;
pub mod pfg;
pub mod plugin;
pub mod pts;
pub mod result;
pub mod selector;
pub mod solver;
pub mod stats;
pub mod worklist;

#[cfg(test)]
mod tests;

pub use context::{Context, ContextElem};
pub use cs_callgraph::{CSCallGraph, CallEdge};
pub use heap::{AllocationSiteHeapModel, HeapModel, Obj, ObjId, ObjKind};
pub use options::{AnalysisOptions, SelectorKind};
pub use plugin::{MainArgsHandler, Plugin};
pub use pts::PointsToSet;
pub use result::PointerAnalysisResult;
pub use selector::{make_selector, ContextSelector};
pub use solver::Solver;
pub use stats::AnalysisStats;
