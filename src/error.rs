use crate::types::VarKind;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("unknown value kind: {0}")]
    UnknownValueKind(String),

    /// Value-kind error for a variable that already exists with another kind.
    #[error("variable `{name}` is {declared}, got a {found} value")]
    KindMismatch {
        name: String,
        declared: VarKind,
        found: VarKind,
    },

    #[error("unknown comparison function: {0}")]
    UnknownComparisonFunction(String),

    #[error("missing entry node `{0}`")]
    MissingEntryNode(String),

    #[error("malformed directive `{directive}`: {reason}")]
    Format { directive: String, reason: String },
}

impl CompileError {
    /// Fatal errors abort the whole compile; the rest only skip a statement.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CompileError::MissingEntryNode(_) | CompileError::Format { .. }
        )
    }
}

/// A non-fatal problem found while lowering a node.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Diagnostic {
    pub node: String,
    pub message: String,
}

/// Errors surfaced by the JSON entry points.
#[derive(Error, Debug)]
pub enum JsonError {
    #[error("invalid document: {0}")]
    Document(#[from] serde_json::Error),

    #[error(transparent)]
    Compile(#[from] CompileError),
}
