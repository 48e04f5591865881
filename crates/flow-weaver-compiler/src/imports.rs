//! Merges a workflow's `@import`ed symbols into its `node_types` before
//! validation/codegen see it (`spec.md §4.E`, §4.D). `flow_weaver_parser`
//! only resolves and parses the target files; deciding which declaration in
//! that file each import actually names, and turning a plain workflow
//! function into a callable node type, is this crate's job.

use std::path::Path;

use flow_weaver_ast::{ImportDecl, NodeType, NodeVariant, Workflow};
use flow_weaver_parser::{resolve_imports, ImportCache, ImportStack, ParsedModule};

use crate::error::{CompilerError, Result};

fn workflow_is_async(wf: &Workflow) -> bool {
    wf.user_specified_async || wf.instances.iter().any(|i| wf.find_node_type(&i.node_type).is_some_and(|nt| nt.is_async))
}

/// Builds the `NodeType` a workflow presents when it's imported and used as
/// a node elsewhere: its start ports become inputs, its exit ports become
/// outputs, and it keeps the standard success/failure control pair since a
/// compiled workflow always reports one of the two (`spec.md §4.H`).
fn node_type_for_imported_workflow(import: &ImportDecl, wf: &Workflow) -> NodeType {
    let mut nt = NodeType::new_function(import.name.clone(), wf.function_name.clone());
    nt.variant = NodeVariant::ImportedWorkflow;
    nt.is_async = workflow_is_async(wf);
    nt.import_source = Some(import.module.clone());
    for (name, port) in &wf.start_ports {
        nt.add_input(name, port.clone());
    }
    for (name, port) in &wf.exit_ports {
        nt.add_output(name, port.clone());
    }
    nt
}

/// Resolves every `@import` on `wf` and merges the matching declaration
/// into `wf.node_types`, in import order. `from_path` anchors relative
/// specifiers; `cache`/`stack` are the session's shared import-resolution
/// state (`spec.md §4.E`).
pub fn merge_imports(
    wf: &mut Workflow,
    from_path: &Path,
    cache: &ImportCache<ParsedModule>,
    stack: &mut ImportStack,
) -> Result<()> {
    if wf.imports.is_empty() {
        return Ok(());
    }

    let resolved = resolve_imports(&wf.imports, from_path, cache, stack).map_err(CompilerError::Parse)?;

    for (import, module) in wf.imports.clone().iter().zip(resolved.iter()) {
        if wf.find_node_type(&import.name).is_some() {
            continue;
        }

        if let Some(nt) = module.node_types.iter().find(|nt| nt.function_name == import.function_name) {
            let mut cloned = nt.clone();
            cloned.name = import.name.clone();
            cloned.import_source = Some(import.module.clone());
            wf.node_types.push(cloned);
            continue;
        }

        if let Some(imported_wf) = module.workflows.iter().find(|w| w.function_name == import.function_name) {
            wf.node_types.push(node_type_for_imported_workflow(import, imported_wf));
            continue;
        }

        return Err(CompilerError::ImportedSymbolNotFound {
            function_name: import.function_name.clone(),
            module: import.module.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{PortDefinition as Pd, PortKind};

    #[test]
    fn merges_function_node_type_from_import() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("lib.ts"),
            "/**\n * @flowWeaver nodeType\n */\nexport function double(x: number): number { return x * 2; }",
        )
        .unwrap();
        let from_path = dir.path().join("w.ts");

        let mut wf = Workflow::new("W", "w", from_path.display().to_string());
        wf.imports.push(ImportDecl { name: "double".into(), function_name: "double".into(), module: "./lib".into() });

        let cache = ImportCache::new(8);
        let mut stack = ImportStack::new();
        merge_imports(&mut wf, &from_path, &cache, &mut stack).unwrap();

        let nt = wf.find_node_type("double").unwrap();
        assert_eq!(nt.function_name, "double");
        assert_eq!(nt.import_source.as_deref(), Some("./lib"));
    }

    #[test]
    fn unresolvable_import_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib.ts"), "export const x = 1;").unwrap();
        let from_path = dir.path().join("w.ts");

        let mut wf = Workflow::new("W", "w", from_path.display().to_string());
        wf.imports.push(ImportDecl { name: "missing".into(), function_name: "missing".into(), module: "./lib".into() });

        let cache = ImportCache::new(8);
        let mut stack = ImportStack::new();
        assert!(merge_imports(&mut wf, &from_path, &cache, &mut stack).is_err());
    }

    #[test]
    fn builds_node_type_for_imported_workflow() {
        let mut sub = Workflow::new("Sub", "sub", "sub.ts");
        sub.start_ports.push(("x".to_string(), Pd::new(PortKind::Number)));
        sub.exit_ports.push(("y".to_string(), Pd::new(PortKind::Number)));
        let import = ImportDecl { name: "sub".into(), function_name: "sub".into(), module: "./sub".into() };
        let nt = node_type_for_imported_workflow(&import, &sub);
        assert_eq!(nt.variant, NodeVariant::ImportedWorkflow);
        assert!(nt.find_input("x").is_some());
        assert!(nt.has_success_port);
    }
}
