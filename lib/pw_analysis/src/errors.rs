//! Analysis errors definition.

use pw_ir::errors::IrError;
use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no entry point: {0}")]
    MissingEntryPoint(String),

    #[error("cannot resolve callee {callee} of statically bound call at {call_site}")]
    UnresolvedStaticCallee { call_site: String, callee: String },

    #[error("invalid context sensitivity '{0}' (expected 'ci', '<k>-call', '<k>-obj' or '<k>-type' with k > 0)")]
    InvalidContextSensitivity(String),

    #[error("options error: {0}")]
    Options(#[from] serde_json::Error),

    #[error("program error: {0}")]
    Ir(#[from] IrError),

    #[error("internal error: {0}")]
    Internal(String),
}
