//! # `PtaWorks`
//!
//! `ptaworks` is the main crate of the `PtaWorks` points-to analysis
//! project. The project is subdivided into multiple crates, `ptaworks` acts as
//! entry point by reexporting important structs and functions from those
//! sub-crates. Most of the reexport are done within the `ptaworks::prelude`
//! namespace.
//!
//! ## Library basics
//!
//! Programs are described in JSON (see [`pw_ir::loader`]) and loaded into a
//! `Program`, which holds classes, methods, and their pointer-relevant
//! statements. The analysis then computes points-to sets and the call graph,
//! on the fly, with the chosen context sensitivity:
//!
//! ```rust
//! use ptaworks::prelude::*;
//!
//! let program = load_json(r#"{ "classes": [{ "name": "Main", "methods": [{
//!     "name": "main", "static": true,
//!     "locals": [{ "name": "x", "type": "LMain;" }],
//!     "body": [{ "op": "new", "lhs": "x", "type": "LMain;" }]
//! }]}]}"#)?;
//! let options = AnalysisOptions {
//!     cs: "2-obj".parse()?,
//!     ..AnalysisOptions::default()
//! };
//! let result = points_to_analysis(&program, &options)?;
//! println!("reachable methods: {}", result.reachable_methods().len());
//! # Ok::<(), PwError>(())
//! ```
//!
//! ## Sub-crates
//!
//!  - [`pw_ir`] contains the program representation: classes, fields,
//!    methods, variables and statements, the class hierarchy, method
//!    dispatch, and the JSON loader,
//!  - [`pw_analysis`] contains the context-sensitive points-to solver, its
//!    context selectors, and the call graph built along with it.

mod errors;
mod input;

pub mod cli;
pub mod pw_callgraph;
pub mod pw_hierarchy;
pub mod pw_pointsto;

pub use pw_analysis as analysis;
pub use pw_ir as ir;

/// Reexport module of commonly used structures and functions from `PtaWorks` project
/// sub-crates:
///
/// ```rust
/// use ptaworks::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{PwError, PwResult};
    pub use crate::input::{analysis_options, load_program};

    pub use pw_analysis::callgraph::CallGraph;
    pub use pw_analysis::errors::AnalysisError;
    pub use pw_analysis::points_to_analysis;
    pub use pw_analysis::pta::{AnalysisOptions, PointerAnalysisResult, SelectorKind};

    pub use pw_ir::errors::IrError;
    pub use pw_ir::program::{Class, Method, Program};
    pub use pw_ir::load_json;

    use clap::ArgMatches;

    pub fn init_logger(args: &ArgMatches) {
        let env = env_logger::Env::new()
            .filter_or("PW_LOG", "info")
            .write_style("PW_LOG_STYLE");

        let mut builder = env_logger::Builder::from_env(env);
        if args.get_flag("verbose") {
            builder.filter_level(log::LevelFilter::Trace);
        } else if args.get_flag("debug") {
            builder.filter_level(log::LevelFilter::Debug);
        }
        if args.get_flag("ecslog") {
            builder.format(ecs_logger::format);
        }
        builder.init();
    }
}
