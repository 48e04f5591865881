//! Host-language source facade.
//!
//! Owns the three components of the compiler that touch host-language
//! syntax directly: type inference (`§4.A`), the tag-body tokenizer
//! (`§4.B`), and the signature-extraction oracle (`§4.C`, §9). Everything
//! downstream (the doc-comment parser, macro expander, validator,
//! generator) depends only on `HostSourceOracle` and `PortKind`, never on a
//! concrete host parser.

pub mod error;
pub mod inference;
pub mod oracle;
pub mod tokenizer;

pub use error::{Result, SourceError};
pub use inference::infer_port_kind;
pub use oracle::{FunctionSignature, HostSourceOracle, LightweightOracle, ParamInfo, ReturnField};
pub use tokenizer::{tokenize, Token, TokenizeError};
