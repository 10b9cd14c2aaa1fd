//! This crate provides the context-sensitive points-to analysis of the
//! `PtaWorks` project, which builds the program call graph on the fly.

pub mod callgraph;
pub mod errors;
pub mod pta;

use crate::errors::AnalysisResult;
use crate::pta::{AnalysisOptions, PointerAnalysisResult, Solver};
use pw_ir::program::Program;

/// Runs the points-to analysis on a program, without any additional plugin.
pub fn points_to_analysis<'p>(
    program: &'p Program,
    options: &AnalysisOptions,
) -> AnalysisResult<PointerAnalysisResult<'p>> {
    Solver::new(program, options).solve()
}
