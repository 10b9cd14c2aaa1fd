//! Program representation errors definition.

use thiserror::Error;

/// An alias for result that can be an [`IrError`].
pub type IrResult<T> = Result<T, IrError>;

#[derive(Debug, Error)]
pub enum IrError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("conversion error from {from} to {to}")]
    Conversion { from: String, to: String },

    #[error("malformed method reference: {0}")]
    InvalidMethodRef(String),

    #[error("malformed field reference: {0}")]
    InvalidFieldRef(String),

    #[error("class '{0}' is defined twice")]
    DuplicateClass(String),

    #[error("class not found: {0}")]
    ClassNotFound(String),

    #[error("method '{0}' is declared twice")]
    DuplicateMethod(String),

    #[error("field '{0}' is declared twice")]
    DuplicateField(String),

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("variable '{var}' is declared twice in {method}")]
    DuplicateVar { method: String, var: String },

    #[error("unknown variable '{var}' in {method}")]
    UnknownVar { method: String, var: String },

    #[error("malformed statement #{index} in {method}: {reason}")]
    MalformedStmt {
        method: String,
        index: usize,
        reason: String,
    },

    #[error("internal error: {0}")]
    Internal(String),
}
