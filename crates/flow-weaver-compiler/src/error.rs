//! Errors the orchestrating service can return before a `CompileOutcome`
//! even exists: everything after parsing succeeds is instead folded into
//! the outcome's `diagnostics` (`spec.md §7`: "Parsing never throws on
//! user-reachable errors except for resolution failures where no AST can
//! be produced").

use thiserror::Error;

use flow_weaver_codegen::CodegenError;
use flow_weaver_parser::ParseError;

pub type Result<T> = std::result::Result<T, CompilerError>;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error("import '{function_name}' from '{module}' matches neither a nodeType nor a workflow in the target file")]
    ImportedSymbolNotFound { function_name: String, module: String },
}
