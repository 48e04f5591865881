//! Turns annotated TypeScript/JavaScript source into the `flow-weaver-ast`
//! types: doc-block extraction, tag parsing, port-order assignment,
//! auto-inference, macro expansion (via `flow-weaver-macros`), and
//! cross-file import resolution (`spec.md §4.B`-§4.E).

pub mod auto_infer;
pub mod doc_block;
pub mod driver;
pub mod error;
pub mod import_resolver;
pub mod node_type_builder;
pub mod pattern_builder;
pub mod port_order;
pub mod tags;
pub mod workflow_builder;

pub use auto_infer::auto_infer_node_types;
pub use doc_block::{extract_doc_blocks, RawDocBlock};
pub use driver::{parse_module, resolve_imports, ParsedModule};
pub use error::{ParseError, Result};
pub use import_resolver::{resolve_specifier, ImportCache, ImportStack};
pub use node_type_builder::build_node_type;
pub use pattern_builder::build_pattern;
pub use port_order::assign_port_order;
pub use tags::{parse_tag_line, BlockKind, Tag};
pub use workflow_builder::build_workflow;
