//! Validates a built `Workflow` and produces the diagnostic list the
//! compiler reports (`spec.md §4.G`). Each category is its own module so the
//! severity/strict-types promotion logic in `flow-weaver-diagnostics` stays
//! the single place that decision is made.

pub mod agent_patterns;
pub mod connectivity;
pub mod required_inputs;
pub mod scope;
pub mod structural;
pub mod typing;

use flow_weaver_ast::Workflow;
use flow_weaver_diagnostics::{Diagnostic, DiagnosticCode};

/// Runs every validation category over `wf` and returns the combined
/// diagnostic list. `inferred_type_names` comes from
/// `flow_weaver_parser::auto_infer_node_types` — each gets an
/// `INFERRED_NODE_TYPE` warning so authors know a type was synthesized
/// rather than declared.
pub fn validate_workflow(wf: &Workflow, inferred_type_names: &[String]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    structural::check(wf, &mut diagnostics);
    connectivity::check(wf, &mut diagnostics);
    typing::check(wf, &mut diagnostics);
    required_inputs::check(wf, &mut diagnostics);
    scope::check(wf, &mut diagnostics);
    agent_patterns::check(wf, &mut diagnostics);

    for name in inferred_type_names {
        diagnostics.push(Diagnostic::new(
            DiagnosticCode::InferredNodeType,
            format!("node type '{name}' was inferred from its function signature, not declared"),
            wf.options.strict_types,
        ));
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{Connection, Endpoint, NodeInstance, NodeType, PortDefinition, PortKind};
    use flow_weaver_diagnostics::Severity;

    #[test]
    fn clean_linear_pipeline_has_no_errors() {
        let mut wf = Workflow::new("Pipeline", "pipeline", "p.ts");
        let mut nt = NodeType::new_function("double", "double");
        nt.add_input("x", PortDefinition::new(PortKind::Number));
        nt.add_output("y", PortDefinition::new(PortKind::Number));
        wf.node_types.push(nt);
        wf.instances.push(NodeInstance::new("d", "double"));
        wf.start_ports.push(("x".to_string(), PortDefinition::new(PortKind::Number)));
        wf.exit_ports.push(("y".to_string(), PortDefinition::new(PortKind::Number)));
        wf.connections.push(Connection::new(Endpoint::new("Start", "execute"), Endpoint::new("d", "execute")));
        wf.connections.push(Connection::new(Endpoint::new("Start", "x"), Endpoint::new("d", "x")));
        wf.connections.push(Connection::new(Endpoint::new("d", "onSuccess"), Endpoint::new("Exit", "y")));
        wf.connections.push(Connection::new(Endpoint::new("d", "y"), Endpoint::new("Exit", "y")));

        let diags = validate_workflow(&wf, &[]);
        assert!(diags.iter().all(|d| d.severity != Severity::Error), "unexpected errors: {diags:?}");
    }

    #[test]
    fn inferred_types_produce_warnings() {
        let wf = Workflow::new("W", "w", "w.ts");
        let diags = validate_workflow(&wf, &["triple".to_string()]);
        assert!(diags.iter().any(|d| d.code == flow_weaver_diagnostics::DiagnosticCode::InferredNodeType));
    }

    #[test]
    fn strict_types_promotes_inferred_warning() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.options.strict_types = true;
        let diags = validate_workflow(&wf, &["triple".to_string()]);
        let inferred = diags.iter().find(|d| d.code == flow_weaver_diagnostics::DiagnosticCode::InferredNodeType).unwrap();
        assert_eq!(inferred.severity, Severity::Error);
    }
}
