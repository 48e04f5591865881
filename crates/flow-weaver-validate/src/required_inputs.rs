//! Annotation <-> signature checks (`spec.md §4.G`): a required input with
//! no connection, instance-level expression, or default is unreachable.

use flow_weaver_ast::{GraphLike, Workflow};
use flow_weaver_diagnostics::{Diagnostic, DiagnosticCode};

pub fn check(wf: &Workflow, out: &mut Vec<Diagnostic>) {
    let strict = wf.options.strict_types;

    for inst in &wf.instances {
        let Some(nt) = wf.find_node_type(&inst.node_type) else { continue };
        let incoming = wf.incoming(&inst.id);

        for (port_name, port) in &nt.inputs {
            if port.is_control_flow || port.optional || port.default.is_some() || port.expression.is_some() {
                continue;
            }
            if let Some(cfg) = inst.config.port_config(port_name) {
                if cfg.expression.is_some() {
                    continue;
                }
            }
            let connected = incoming.iter().any(|c| c.to.port == *port_name);
            if !connected {
                out.push(
                    Diagnostic::new(DiagnosticCode::MissingRequiredInput, format!("'{}' input '{port_name}' is required but unconnected", inst.id), strict)
                        .with_node(&inst.id),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{NodeInstance, NodeType, PortDefinition, PortKind};
    use flow_weaver_diagnostics::DiagnosticCode;

    #[test]
    fn flags_unconnected_required_input() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        let mut nt = NodeType::new_function("sink", "sink");
        nt.add_input("value", PortDefinition::new(PortKind::String));
        wf.node_types.push(nt);
        wf.instances.push(NodeInstance::new("s", "sink"));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::MissingRequiredInput));
    }

    #[test]
    fn optional_input_is_not_flagged() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        let mut nt = NodeType::new_function("sink", "sink");
        nt.add_input("value", PortDefinition::new(PortKind::String).optional());
        wf.node_types.push(nt);
        wf.instances.push(NodeInstance::new("s", "sink"));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.is_empty());
    }
}
