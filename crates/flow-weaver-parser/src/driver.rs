//! Doc-comment driver (`spec.md §4.D`): extracts doc blocks, classifies each
//! by its `@flowWeaver` kind, and dispatches to the matching builder. Errors
//! on individual blocks are buffered rather than aborting the whole file, so
//! "partial results remain usable" for everything else in the file.

use std::path::Path;

use flow_weaver_ast::{NodeType, Pattern, Workflow};
use flow_weaver_source::{HostSourceOracle, LightweightOracle};

use crate::error::{ParseError, Result};
use crate::import_resolver::{resolve_specifier, ImportCache, ImportStack};
use crate::node_type_builder::build_node_type;
use crate::pattern_builder::build_pattern;
use crate::tags::{parse_tag_line, BlockKind, Tag};
use crate::workflow_builder::build_workflow;

/// Everything a single source file contributes to a compile.
#[derive(Debug, Clone, Default)]
pub struct ParsedModule {
    pub node_types: Vec<NodeType>,
    pub workflows: Vec<Workflow>,
    pub patterns: Vec<Pattern>,
    /// Names synthesized by auto-inference for each entry in `workflows`
    /// (same index), so callers can raise `INFERRED_NODE_TYPE` without
    /// re-deriving the list themselves (`spec.md §4.G`).
    pub inferred_node_types: Vec<Vec<String>>,
}

/// Parses every doc-commented declaration in `source`. Blocks that fail to
/// parse are skipped and their error recorded; everything else in the file
/// still parses (`spec.md §4.D`).
pub fn parse_module(source_file: &str, source: &str) -> (ParsedModule, Vec<ParseError>) {
    let mut oracle = LightweightOracle::new();
    oracle.scan(source);

    let mut module = ParsedModule::default();
    let mut errors = Vec::new();

    for block in crate::doc_block::extract_doc_blocks(source) {
        let Some(function_name) = &block.function_name else { continue };

        let mut tags = Vec::new();
        let mut parse_failed = false;
        for line in &block.lines {
            match parse_tag_line(line) {
                Ok(Some(tag)) => tags.push(tag),
                Ok(None) => {}
                Err(e) => {
                    errors.push(e);
                    parse_failed = true;
                    break;
                }
            }
        }
        if parse_failed {
            continue;
        }

        let kind = tags.iter().find_map(|t| if let Tag::FlowWeaver(k) = t { Some(k.clone()) } else { None });
        let Some(kind) = kind else { continue };

        match kind {
            BlockKind::NodeType => {
                module.node_types.push(build_node_type(function_name, &tags, &oracle as &dyn HostSourceOracle));
            }
            BlockKind::Workflow => {
                let name = tags
                    .iter()
                    .find_map(|t| if let Tag::Name(n) = t { Some(n.clone()) } else { None })
                    .unwrap_or_else(|| function_name.clone());
                match build_workflow(&name, function_name, source_file, &tags, &oracle as &dyn HostSourceOracle) {
                    Ok(mut wf) => {
                        let available: Vec<String> = oracle.known_function_names();
                        let inferred =
                            crate::auto_infer::auto_infer_node_types(&mut wf, &oracle as &dyn HostSourceOracle, &available);
                        module.workflows.push(wf);
                        module.inferred_node_types.push(inferred);
                    }
                    Err(e) => errors.push(e),
                }
            }
            BlockKind::Pattern => {
                let name = tags
                    .iter()
                    .find_map(|t| if let Tag::Name(n) = t { Some(n.clone()) } else { None })
                    .unwrap_or_else(|| function_name.clone());
                match build_pattern(&name, source_file, &tags) {
                    Ok(p) => module.patterns.push(p),
                    Err(e) => errors.push(e),
                }
            }
        }
    }

    (module, errors)
}

/// Resolves and parses every import a workflow declares, validating that
/// each target exists and feeding parses through the shared cache
/// (`spec.md §4.E`). Returns the parsed modules in declaration order.
pub fn resolve_imports(
    imports: &[flow_weaver_ast::ImportDecl],
    from_path: &Path,
    cache: &ImportCache<ParsedModule>,
    stack: &mut ImportStack,
) -> Result<Vec<ParsedModule>> {
    let from_dir = from_path.parent().unwrap_or_else(|| Path::new("."));
    let mut out = Vec::new();

    for import in imports {
        let resolved = resolve_specifier(from_dir, &import.module).ok_or_else(|| ParseError::UnresolvedImport {
            specifier: import.module.clone(),
            from: from_path.display().to_string(),
        })?;
        let key = resolved.display().to_string();
        stack.enter(&key)?;
        let module = cache.get_or_parse(&resolved, |content| {
            let (parsed, errors) = parse_module(&key, content);
            if let Some(first) = errors.into_iter().next() {
                return Err(first);
            }
            Ok(parsed)
        });
        stack.exit();
        out.push(module?);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node_type_block() {
        let src = "/**\n * @flowWeaver nodeType\n * @name Double\n */\nexport function double(x: number): number { return x * 2; }";
        let (module, errors) = parse_module("double.ts", src);
        assert!(errors.is_empty());
        assert_eq!(module.node_types.len(), 1);
        assert_eq!(module.node_types[0].name, "Double");
    }

    #[test]
    fn malformed_block_is_buffered_not_fatal() {
        let src = "/**\n * @flowWeaver nodeType\n * @bogusTag x\n */\nexport function double(x: number): number { return x * 2; }\n\n/**\n * @flowWeaver nodeType\n */\nexport function triple(x: number): number { return x * 3; }";
        let (module, errors) = parse_module("m.ts", src);
        assert_eq!(errors.len(), 1);
        assert_eq!(module.node_types.len(), 1);
        assert_eq!(module.node_types[0].function_name, "triple");
    }

    #[test]
    fn parses_workflow_block_with_auto_inference() {
        let src = "/**\n * @flowWeaver workflow\n * @name Pipeline\n * @autoConnect\n */\nexport function pipeline(x: number): { result: number } { return { result: x }; }";
        let (module, errors) = parse_module("pipeline.ts", src);
        assert!(errors.is_empty());
        assert_eq!(module.workflows.len(), 1);
        assert_eq!(module.workflows[0].name, "Pipeline");
    }
}
