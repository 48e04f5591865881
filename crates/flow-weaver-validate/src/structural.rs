//! Structural checks (`spec.md §4.G`): names, ids, node types, and
//! connection well-formedness. Grounded on the teacher's
//! `validate_edge_references`/`validate_node_types`.

use std::collections::HashSet;

use flow_weaver_ast::{reserved, GraphLike, Workflow};
use flow_weaver_diagnostics::{Diagnostic, DiagnosticCode};

pub fn check(wf: &Workflow, out: &mut Vec<Diagnostic>) {
    let strict = wf.options.strict_types;

    if wf.name.trim().is_empty() {
        out.push(Diagnostic::new(DiagnosticCode::MissingWorkflowName, "workflow has no name", strict));
    }
    if wf.function_name.trim().is_empty() {
        out.push(Diagnostic::new(DiagnosticCode::MissingFunctionName, "workflow has no backing function", strict));
    }

    let mut seen_type_names = HashSet::new();
    for nt in &wf.node_types {
        if reserved::is_reserved_node_name(&nt.name) {
            out.push(Diagnostic::new(DiagnosticCode::ReservedNodeName, format!("node type '{}' uses a reserved name", nt.name), strict));
        }
        if !seen_type_names.insert(nt.name.clone()) {
            out.push(Diagnostic::new(DiagnosticCode::DuplicateNodeName, format!("duplicate node type name '{}'", nt.name), strict));
        }
    }

    for (key, children) in &wf.scopes {
        let Some(parent_id) = key.split('.').next() else { continue };
        for child_id in children {
            if wf.find_instance(child_id).is_none() {
                out.push(Diagnostic::new(
                    DiagnosticCode::UndefinedNode,
                    format!("scope '{key}' on '{parent_id}' lists undefined child '{child_id}'"),
                    strict,
                ));
            }
        }
    }

    let mut seen_ids = HashSet::new();
    for inst in &wf.instances {
        if reserved::is_reserved_node_name(&inst.id) {
            out.push(
                Diagnostic::new(DiagnosticCode::ReservedInstanceId, format!("instance id '{}' is reserved", inst.id), strict)
                    .with_node(&inst.id),
            );
        }
        if !seen_ids.insert(inst.id.clone()) {
            out.push(
                Diagnostic::new(DiagnosticCode::DuplicateInstanceId, format!("duplicate instance id '{}'", inst.id), strict)
                    .with_node(&inst.id),
            );
        }
        let known = wf.find_node_type(&inst.node_type).is_some() || wf.imports.iter().any(|i| i.name == inst.node_type);
        if !known {
            out.push(
                Diagnostic::new(DiagnosticCode::UnknownNodeType, format!("instance '{}' has unknown type '{}'", inst.id, inst.node_type), strict)
                    .with_node(&inst.id),
            );
        }
    }

    let mut seen_connections = HashSet::new();
    for c in &wf.connections {
        if !seen_connections.insert((c.from.clone(), c.to.clone())) {
            out.push(Diagnostic::new(
                DiagnosticCode::DuplicateConnection,
                format!("duplicate connection {}.{} -> {}.{}", c.from.node, c.from.port, c.to.node, c.to.port),
                strict,
            ));
        }

        check_source_endpoint(wf, c, out, strict);
        check_target_endpoint(wf, c, out, strict);
    }
}

fn check_source_endpoint(wf: &Workflow, c: &flow_weaver_ast::Connection, out: &mut Vec<Diagnostic>, strict: bool) {
    let node = c.from.node.as_str();
    if node == reserved::START_NODE {
        let valid = c.from.port == reserved::EXECUTE || wf.start_ports.iter().any(|(n, _)| n == &c.from.port);
        if !valid {
            out.push(Diagnostic::new(DiagnosticCode::UnknownSourcePort, format!("Start has no output port '{}'", c.from.port), strict));
        }
        return;
    }
    if node == reserved::EXIT_NODE {
        out.push(Diagnostic::new(DiagnosticCode::UnknownSourceNode, "Exit cannot be a connection source", strict));
        return;
    }
    let Some(inst) = wf.find_instance(node) else {
        out.push(Diagnostic::new(DiagnosticCode::UnknownSourceNode, format!("connection references unknown node '{node}'"), strict).with_node(node));
        return;
    };
    if let Some(nt) = wf.find_node_type(&inst.node_type) {
        if nt.find_output(&c.from.port).is_none() {
            out.push(
                Diagnostic::new(DiagnosticCode::UnknownSourcePort, format!("node '{node}' has no output port '{}'", c.from.port), strict)
                    .with_node(node),
            );
        }
    }
}

fn check_target_endpoint(wf: &Workflow, c: &flow_weaver_ast::Connection, out: &mut Vec<Diagnostic>, strict: bool) {
    let node = c.to.node.as_str();
    if node == reserved::EXIT_NODE {
        let valid = wf.exit_ports.iter().any(|(n, _)| n == &c.to.port);
        if !valid {
            out.push(Diagnostic::new(DiagnosticCode::UnknownTargetPort, format!("Exit has no input port '{}'", c.to.port), strict));
        }
        return;
    }
    if node == reserved::START_NODE {
        out.push(Diagnostic::new(DiagnosticCode::UnknownTargetNode, "Start cannot be a connection target", strict));
        return;
    }
    let Some(inst) = wf.find_instance(node) else {
        out.push(Diagnostic::new(DiagnosticCode::UnknownTargetNode, format!("connection references unknown node '{node}'"), strict).with_node(node));
        return;
    };
    if let Some(nt) = wf.find_node_type(&inst.node_type) {
        if nt.find_input(&c.to.port).is_none() {
            out.push(
                Diagnostic::new(DiagnosticCode::UnknownTargetPort, format!("node '{node}' has no input port '{}'", c.to.port), strict)
                    .with_node(node),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{Connection, Endpoint, NodeInstance, NodeType, PortDefinition, PortKind};

    fn wf_with_double() -> Workflow {
        let mut wf = Workflow::new("Pipeline", "pipeline", "p.ts");
        let mut nt = NodeType::new_function("double", "double");
        nt.add_input("x", PortDefinition::new(PortKind::Number));
        nt.add_output("y", PortDefinition::new(PortKind::Number));
        wf.node_types.push(nt);
        wf.instances.push(NodeInstance::new("d", "double"));
        wf
    }

    #[test]
    fn flags_unknown_node_type() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("a", "missing"));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::UnknownNodeType));
    }

    #[test]
    fn flags_unknown_target_port() {
        let mut wf = wf_with_double();
        wf.connections.push(Connection::new(Endpoint::new("Start", "execute"), Endpoint::new("d", "nonexistent")));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::UnknownTargetPort));
    }

    #[test]
    fn clean_graph_has_no_structural_diagnostics() {
        let mut wf = wf_with_double();
        wf.connections.push(Connection::new(Endpoint::new("Start", "execute"), Endpoint::new("d", "execute")));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn flags_duplicate_node_type_name() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.node_types.push(NodeType::new_function("double", "double"));
        wf.node_types.push(NodeType::new_function("double", "double2"));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::DuplicateNodeName));
    }

    #[test]
    fn flags_reserved_node_type_name() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.node_types.push(NodeType::new_function("Start", "start"));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::ReservedNodeName));
    }

    #[test]
    fn flags_undefined_scope_child() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.set_scope_children("loop", "iterate", vec!["ghost".to_string()]);
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::UndefinedNode));
    }
}
