//! Scope checks (`spec.md §4.G`, §4.H): declared scopes must be non-empty,
//! every child's `parent` must point at a scope that still lists it, a
//! connection crossing a scope boundary must agree on the scope name at
//! both ends, and every scoped connection must stay within its scope's own
//! owner/children, name a port that actually exists, and agree on type
//! (`spec.md §4.G` line 190: "every child connection's `scope` equals `S`;
//! endpoints are `P` or a child listed in `scopes[P.S]`").

use flow_weaver_ast::{reserved, GraphLike, NodeType, PortDefinition, PortKind, Workflow};
use flow_weaver_diagnostics::{Diagnostic, DiagnosticCode};

pub fn check(wf: &Workflow, out: &mut Vec<Diagnostic>) {
    let strict = wf.options.strict_types;

    for (key, children) in &wf.scopes {
        if children.is_empty() {
            out.push(Diagnostic::new(DiagnosticCode::ScopeEmpty, format!("scope '{key}' has no children"), strict));
        }
    }

    for inst in &wf.instances {
        let Some(parent) = &inst.parent else { continue };
        let registered = wf.scope_children(&parent.id, &parent.scope).map(|c| c.iter().any(|id| id == &inst.id)).unwrap_or(false);
        if !registered {
            out.push(
                Diagnostic::new(
                    DiagnosticCode::ScopeOrphanedChild,
                    format!("'{}' is parented to '{}.{}', but that scope doesn't list it", inst.id, parent.id, parent.scope),
                    strict,
                )
                .with_node(&inst.id),
            );
        }
    }

    for c in &wf.connections {
        if c.from.scope != c.to.scope {
            out.push(Diagnostic::new(
                DiagnosticCode::ScopeWrongScopeName,
                format!(
                    "connection {}.{} -> {}.{} crosses scopes ({:?} != {:?})",
                    c.from.node, c.from.port, c.to.node, c.to.port, c.from.scope, c.to.scope
                ),
                strict,
            ));
        }
    }

    for inst in &wf.instances {
        let Some(nt) = wf.find_node_type(&inst.node_type) else { continue };
        let Some(scope_names) = &nt.scopes else { continue };
        for scope_name in scope_names {
            check_one_scope(wf, inst, nt, scope_name, out, strict);
        }
    }
}

fn scoped_ports<'a>(nt: &'a NodeType, scope_name: &str, outputs: bool) -> Vec<(&'a str, &'a PortDefinition)> {
    let ports = if outputs { &nt.outputs } else { &nt.inputs };
    ports.iter().filter(|(_, p)| p.scope.as_deref() == Some(scope_name)).map(|(n, p)| (n.as_str(), p)).collect()
}

fn check_one_scope(
    wf: &Workflow,
    inst: &flow_weaver_ast::NodeInstance,
    nt: &NodeType,
    scope_name: &str,
    out: &mut Vec<Diagnostic>,
    strict: bool,
) {
    let Some(children) = wf.scope_children(&inst.id, scope_name) else {
        out.push(
            Diagnostic::new(
                DiagnosticCode::ScopeInconsistent,
                format!("node '{}' declares scope '{scope_name}' but the workflow never registers it", inst.id),
                strict,
            )
            .with_node(&inst.id),
        );
        return;
    };

    let out_ports = scoped_ports(nt, scope_name, true);
    let in_ports = scoped_ports(nt, scope_name, false);

    for (name, port) in out_ports.iter().chain(in_ports.iter()) {
        if reserved::is_reserved_scope_port(name) && port.kind != PortKind::Step {
            out.push(
                Diagnostic::new(
                    DiagnosticCode::ScopeConsistencyError,
                    format!("scoped port '{scope_name}.{name}' on '{}' is reserved but not STEP-typed", inst.id),
                    strict,
                )
                .with_node(&inst.id),
            );
        }
    }

    let scoped_conns: Vec<&flow_weaver_ast::Connection> = wf
        .connections
        .iter()
        .filter(|c| c.from.scope.as_deref() == Some(scope_name) || c.to.scope.as_deref() == Some(scope_name))
        .filter(|c| c.from.node == inst.id || c.to.node == inst.id || children.contains(&c.from.node) || children.contains(&c.to.node))
        .collect();

    for c in &scoped_conns {
        for (node, port, is_from) in [(&c.from.node, &c.from.port, true), (&c.to.node, &c.to.port, false)] {
            if node != &inst.id && !children.contains(node) {
                out.push(Diagnostic::new(
                    DiagnosticCode::ScopeConnectionOutside,
                    format!("connection in scope '{}.{scope_name}' touches '{node}', which is neither the owner nor a registered child", inst.id),
                    strict,
                ));
                continue;
            }
            let port_known = if node == &inst.id {
                if is_from { out_ports.iter().any(|(n, _)| n == port) } else { in_ports.iter().any(|(n, _)| n == port) }
            } else {
                wf.find_instance(node)
                    .and_then(|child| wf.find_node_type(&child.node_type))
                    .map(|child_nt| if is_from { child_nt.find_output(port).is_some() } else { child_nt.find_input(port).is_some() })
                    .unwrap_or(false)
            };
            if !port_known {
                out.push(Diagnostic::new(
                    DiagnosticCode::ScopeUnknownPort,
                    format!("scope '{}.{scope_name}' connection references unknown port '{node}.{port}'", inst.id),
                    strict,
                ));
            }
        }

        let from_kind = port_kind_of(wf, inst, &out_ports, &c.from.node, &c.from.port);
        let to_kind = port_kind_of_input(wf, inst, &in_ports, &c.to.node, &c.to.port);
        if let (Some(fk), Some(tk)) = (from_kind, to_kind) {
            if fk != PortKind::Any && tk != PortKind::Any && fk != tk {
                out.push(Diagnostic::new(
                    DiagnosticCode::ScopePortTypeMismatch,
                    format!(
                        "scope '{}.{scope_name}' connects {:?} -> {:?} across a type mismatch ({fk:?} != {tk:?})",
                        inst.id, c.from, c.to
                    ),
                    strict,
                ));
            }
        }
    }

    for (name, port) in &in_ports {
        if reserved::is_reserved_scope_port(name) || port.optional {
            continue;
        }
        let fed = scoped_conns.iter().any(|c| c.to.node == inst.id && c.to.port == *name);
        if !fed {
            out.push(
                Diagnostic::new(
                    DiagnosticCode::ScopeMissingRequiredInput,
                    format!("scope '{}.{scope_name}' never feeds required input '{name}'", inst.id),
                    strict,
                )
                .with_node(&inst.id),
            );
        }
    }

    for (name, _) in &out_ports {
        if reserved::is_reserved_scope_port(name) {
            continue;
        }
        let consumed = scoped_conns.iter().any(|c| c.from.node == inst.id && c.from.port == *name);
        if !consumed {
            out.push(
                Diagnostic::new(
                    DiagnosticCode::ScopeUnusedInput,
                    format!("scope '{}.{scope_name}' never consumes '{name}'", inst.id),
                    strict,
                )
                .with_node(&inst.id),
            );
        }
    }
}

fn port_kind_of(wf: &Workflow, inst: &flow_weaver_ast::NodeInstance, out_ports: &[(&str, &PortDefinition)], node: &str, port: &str) -> Option<PortKind> {
    if node == inst.id {
        out_ports.iter().find(|(n, _)| *n == port).map(|(_, p)| p.kind)
    } else {
        wf.find_instance(node).and_then(|child| wf.find_node_type(&child.node_type)).and_then(|nt| nt.find_output(port)).map(|p| p.kind)
    }
}

fn port_kind_of_input(wf: &Workflow, inst: &flow_weaver_ast::NodeInstance, in_ports: &[(&str, &PortDefinition)], node: &str, port: &str) -> Option<PortKind> {
    if node == inst.id {
        in_ports.iter().find(|(n, _)| *n == port).map(|(_, p)| p.kind)
    } else {
        wf.find_instance(node).and_then(|child| wf.find_node_type(&child.node_type)).and_then(|nt| nt.find_input(port)).map(|p| p.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{Connection, Endpoint, NodeInstance, PortKind};

    #[test]
    fn flags_empty_scope() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.set_scope_children("loop", "iterate", vec![]);
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::ScopeEmpty));
    }

    #[test]
    fn flags_orphaned_scope_child() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("child", "t").with_parent("loop", "iterate"));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::ScopeOrphanedChild));
    }

    #[test]
    fn flags_mismatched_scope_names() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.connections.push(Connection::new(
            Endpoint::new("loop", "item").with_scope("iterate"),
            Endpoint::new("child", "item"),
        ));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::ScopeWrongScopeName));
    }

    #[test]
    fn matching_scopes_are_fine() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.set_scope_children("loop", "iterate", vec!["child".to_string()]);
        wf.instances.push(NodeInstance::new("child", "t").with_parent("loop", "iterate"));
        wf.connections.push(Connection::new(
            Endpoint::new("loop", "item").with_scope("iterate"),
            Endpoint::new("child", "item").with_scope("iterate"),
        ));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.is_empty());
    }

    fn map_node_type() -> NodeType {
        let mut nt = NodeType::new_function("__fw_map_loop__", "__fw_map_loop__");
        nt.scopes = Some(vec!["iterate".to_string()]);
        nt.add_input("items", PortDefinition::new(PortKind::Array));
        nt.add_output("results", PortDefinition::new(PortKind::Array));
        nt.add_output("start", PortDefinition::new(PortKind::Step).with_scope("iterate"));
        nt.add_output("item", PortDefinition::new(PortKind::Any).with_scope("iterate"));
        nt.add_input("success", PortDefinition::new(PortKind::Step).with_scope("iterate"));
        nt.add_input("failure", PortDefinition::new(PortKind::Step).with_scope("iterate"));
        nt.add_input("processed", PortDefinition::new(PortKind::Any).with_scope("iterate"));
        nt
    }

    fn double_node_type() -> NodeType {
        let mut nt = NodeType::new_function("double", "double");
        nt.add_input("x", PortDefinition::new(PortKind::Number));
        nt.add_output("y", PortDefinition::new(PortKind::Number));
        nt
    }

    fn wf_with_full_map() -> Workflow {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.node_types.push(map_node_type());
        wf.node_types.push(double_node_type());
        wf.instances.push(NodeInstance::new("loop", "__fw_map_loop__"));
        wf.instances.push(NodeInstance::new("child", "double").with_parent("loop", "iterate"));
        wf.set_scope_children("loop", "iterate", vec!["child".to_string()]);
        wf.connections.push(Connection::new(Endpoint::new("loop", "start").with_scope("iterate"), Endpoint::new("child", "execute").with_scope("iterate")));
        wf.connections.push(Connection::new(Endpoint::new("loop", "item").with_scope("iterate"), Endpoint::new("child", "x").with_scope("iterate")));
        wf.connections.push(Connection::new(Endpoint::new("child", "y").with_scope("iterate"), Endpoint::new("loop", "processed").with_scope("iterate")));
        wf.connections.push(Connection::new(
            Endpoint::new("child", reserved::ON_SUCCESS).with_scope("iterate"),
            Endpoint::new("loop", "success").with_scope("iterate"),
        ));
        wf.connections.push(Connection::new(
            Endpoint::new("child", reserved::ON_FAILURE).with_scope("iterate"),
            Endpoint::new("loop", "failure").with_scope("iterate"),
        ));
        wf
    }

    #[test]
    fn canonical_map_shape_has_no_scope_consistency_diagnostics() {
        let wf = wf_with_full_map();
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn flags_connection_touching_node_outside_the_scope() {
        let mut wf = wf_with_full_map();
        wf.instances.push(NodeInstance::new("stray", "double"));
        wf.connections.push(Connection::new(Endpoint::new("loop", "item").with_scope("iterate"), Endpoint::new("stray", "x").with_scope("iterate")));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::ScopeConnectionOutside));
    }

    #[test]
    fn flags_unknown_scoped_port() {
        let mut wf = wf_with_full_map();
        wf.connections.push(Connection::new(Endpoint::new("loop", "ghost").with_scope("iterate"), Endpoint::new("child", "x").with_scope("iterate")));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::ScopeUnknownPort));
    }

    #[test]
    fn flags_missing_required_scoped_input() {
        let mut wf = wf_with_full_map();
        wf.connections.retain(|c| !(c.from.node == "child" && c.from.port == "y"));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::ScopeMissingRequiredInput));
    }

    #[test]
    fn flags_unused_scoped_output() {
        let mut wf = wf_with_full_map();
        wf.connections.retain(|c| !(c.from.node == "loop" && c.from.port == "item"));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::ScopeUnusedInput));
    }
}
