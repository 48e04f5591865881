//! Generator failures (`spec.md §7`): internal invariant breaks. These are
//! never user-facing diagnostics — the validator is what catches graphs
//! before they reach codegen — so a `CodegenError` here means a bug, not a
//! malformed workflow.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodegenError {
    #[error("instance '{0}' references unknown node type '{1}'")]
    UnknownNodeType(String, String),

    #[error("connection references unknown instance '{0}'")]
    UnknownInstance(String),

    #[error("control graph has a cycle after validation claimed none: {0:?}")]
    CycleAfterExpansion(Vec<String>),

    #[error("scoped port '{0}' on '{1}' has no registered scope children")]
    MissingScopeChildren(String, String),

    #[error("exit port '{0}' has no reachable connection and no default")]
    UnreachableExitPort(String),
}

pub type Result<T> = std::result::Result<T, CodegenError>;
