//! Auto-inference (`spec.md §4.D`): "when a workflow names a type with no
//! matching annotated nodeType and no matching import, look for a
//! same-file function whose name matches; synthesize a NodeType with
//! `expression=true` iff its first parameter is not literally `execute`."

use flow_weaver_ast::{NodeType, PortDefinition, Workflow};
use flow_weaver_source::{infer_port_kind, HostSourceOracle};

/// Synthesizes a `NodeType` for every instance whose declared type has
/// neither an annotated `NodeType` nor a matching import, but does match a
/// same-file function name. Returns the synthesized type names so the
/// validator can raise `INFERRED_NODE_TYPE` for each (`spec.md §4.G`).
pub fn auto_infer_node_types(workflow: &mut Workflow, oracle: &dyn HostSourceOracle, available_function_names: &[String]) -> Vec<String> {
    let mut inferred = Vec::new();
    let referenced: Vec<String> = workflow.instances.iter().map(|i| i.node_type.clone()).collect();

    for type_name in referenced {
        if workflow.find_node_type(&type_name).is_some() {
            continue;
        }
        if workflow.imports.iter().any(|imp| imp.name == type_name) {
            continue;
        }
        if !available_function_names.iter().any(|f| f == &type_name) {
            continue;
        }

        let params = oracle.parameters(&type_name);
        let expression = params.first().is_none_or(|p| p.name != "execute");

        let mut nt = if expression {
            NodeType::new_expression(type_name.clone(), type_name.clone())
        } else {
            NodeType::new_function(type_name.clone(), type_name.clone())
        };
        for param in &params {
            if param.name == "execute" {
                continue;
            }
            nt.add_input(&param.name, PortDefinition::new(infer_port_kind(&param.type_text)).optional_if(param.optional));
        }
        for field in oracle.return_object_fields(&type_name) {
            nt.add_output(&field.name, PortDefinition::new(infer_port_kind(&field.type_text)));
        }

        workflow.node_types.push(nt);
        inferred.push(type_name);
    }

    inferred
}

trait OptionalExt {
    fn optional_if(self, flag: bool) -> Self;
}

impl OptionalExt for PortDefinition {
    fn optional_if(self, flag: bool) -> Self {
        if flag {
            self.optional()
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::NodeInstance;
    use flow_weaver_source::LightweightOracle;

    #[test]
    fn infers_expression_node_type_for_unannotated_function() {
        let mut oracle = LightweightOracle::new();
        oracle.scan("function triple(x: number): number { return x * 3; }");
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("t", "triple"));
        let inferred = auto_infer_node_types(&mut wf, &oracle, &["triple".to_string()]);
        assert_eq!(inferred, vec!["triple".to_string()]);
        let nt = wf.find_node_type("triple").unwrap();
        assert!(nt.expression);
        assert!(nt.find_input("x").is_some());
    }

    #[test]
    fn does_not_infer_when_import_exists() {
        let mut oracle = LightweightOracle::new();
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("t", "imported"));
        wf.imports.push(flow_weaver_ast::ImportDecl { name: "imported".into(), function_name: "imported".into(), module: "./x".into() });
        let inferred = auto_infer_node_types(&mut wf, &oracle, &["imported".to_string()]);
        assert!(inferred.is_empty());
    }
}
