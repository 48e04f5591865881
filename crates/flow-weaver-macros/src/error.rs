//! Errors surfaced during macro expansion.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MacroError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MacroError {
    #[error("@path requires at least two steps, found {0}")]
    PathTooShort(usize),

    #[error("macro references unknown instance '{0}'")]
    UnknownInstance(String),

    #[error("@map child '{child_id}' has no non-control-flow {direction} port to infer")]
    MapCannotInferPort { child_id: String, direction: &'static str },

    #[error("@fanOut/@fanIn requires at least one target/source, found none")]
    EmptyFanSet,
}
