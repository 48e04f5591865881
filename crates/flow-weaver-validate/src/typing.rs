//! Typing checks (`spec.md §4.G`): port-kind compatibility across
//! connections. `PortKind::is_compatible_with` does the actual comparison;
//! this module just resolves each endpoint's kind.

use flow_weaver_ast::{reserved, GraphLike, PortKind, Workflow};
use flow_weaver_diagnostics::{Diagnostic, DiagnosticCode};

pub fn check(wf: &Workflow, out: &mut Vec<Diagnostic>) {
    let strict = wf.options.strict_types;

    for c in &wf.connections {
        let Some(source_kind) = output_kind(wf, &c.from.node, &c.from.port) else { continue };
        let Some(target_kind) = input_kind(wf, &c.to.node, &c.to.port) else { continue };

        if !source_kind.is_compatible_with(&target_kind) {
            out.push(
                Diagnostic::new(
                    DiagnosticCode::TypeMismatch,
                    format!("{}.{} ({source_kind:?}) -> {}.{} ({target_kind:?}) are incompatible", c.from.node, c.from.port, c.to.node, c.to.port),
                    strict,
                )
                .with_node(&c.to.node),
            );
        }
    }
}

fn output_kind(wf: &Workflow, node: &str, port: &str) -> Option<PortKind> {
    if node == reserved::START_NODE {
        if port == reserved::EXECUTE {
            return Some(PortKind::Step);
        }
        return wf.start_ports.iter().find(|(n, _)| n == port).map(|(_, p)| p.kind);
    }
    let inst = wf.find_instance(node)?;
    let nt = wf.find_node_type(&inst.node_type)?;
    nt.find_output(port).map(|p| p.kind)
}

fn input_kind(wf: &Workflow, node: &str, port: &str) -> Option<PortKind> {
    if node == reserved::EXIT_NODE {
        return wf.exit_ports.iter().find(|(n, _)| n == port).map(|(_, p)| p.kind);
    }
    let inst = wf.find_instance(node)?;
    let nt = wf.find_node_type(&inst.node_type)?;
    nt.find_input(port).map(|p| p.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{Connection, Endpoint, NodeInstance, NodeType, PortDefinition};

    #[test]
    fn flags_incompatible_kinds() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        let mut nt = NodeType::new_function("sink", "sink");
        nt.add_input("value", PortDefinition::new(PortKind::String));
        wf.node_types.push(nt);
        wf.instances.push(NodeInstance::new("s", "sink"));
        wf.start_ports.push(("n".to_string(), PortDefinition::new(PortKind::Number)));
        wf.connections.push(Connection::new(Endpoint::new("Start", "n"), Endpoint::new("s", "value")));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::TypeMismatch));
    }

    #[test]
    fn any_kind_never_mismatches() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        let mut nt = NodeType::new_function("sink", "sink");
        nt.add_input("value", PortDefinition::new(PortKind::Any));
        wf.node_types.push(nt);
        wf.instances.push(NodeInstance::new("s", "sink"));
        wf.start_ports.push(("n".to_string(), PortDefinition::new(PortKind::Number)));
        wf.connections.push(Connection::new(Endpoint::new("Start", "n"), Endpoint::new("s", "value")));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.is_empty());
    }
}
