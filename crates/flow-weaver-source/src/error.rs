//! Errors surfaced by the host-source facade.

use thiserror::Error;

use crate::tokenizer::TokenizeError;

pub type Result<T> = std::result::Result<T, SourceError>;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to tokenize tag body: {0}")]
    Tokenize(#[from] TokenizeError),

    #[error("unresolved callback type for scope '{scope}' parameter '{param}'")]
    UnresolvedCallbackType { scope: String, param: String },

    #[error("signature extraction found no declaration for function '{0}'")]
    UnknownFunction(String),
}
