//! Errors surfaced by the doc-comment driver, tag parser, and import resolver.

use thiserror::Error;

use flow_weaver_macros::MacroError;
use flow_weaver_source::{SourceError, TokenizeError};

pub type Result<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed tag: {0}")]
    MalformedTag(String),

    #[error("unknown tag '@{0}'")]
    UnknownTag(String),

    #[error("unknown @flowWeaver kind '{0}'")]
    UnknownFlowWeaverKind(String),

    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Macro(#[from] MacroError),

    #[error("import '{specifier}' could not be resolved from '{from}'")]
    UnresolvedImport { specifier: String, from: String },

    #[error("Circular dependency detected:\n  {0}")]
    ImportCycle(String),

    #[error("I/O error reading '{path}': {source}")]
    Io { path: String, source: std::io::Error },
}
