//! Start/Exit wiring (`spec.md §4.H`): Start's ports become the params
//! destructure, Exit's ports become the return object. `any` casts back to
//! the declared exit-port type are normalized to `unknown`, matching the
//! target language's stricter top type.

use flow_weaver_ast::{reserved, GraphLike, PortKind, Workflow};

use crate::error::{CodegenError, Result};
use crate::sanitize::index_var;

fn cast_type_name(kind: PortKind) -> &'static str {
    match kind {
        PortKind::Any => "unknown",
        PortKind::Step => "boolean",
        PortKind::Boolean => "boolean",
        PortKind::Number => "number",
        PortKind::String => "string",
        PortKind::Array => "unknown[]",
        PortKind::Object => "Record<string, unknown>",
        PortKind::Function => "(...args: unknown[]) => unknown",
    }
}

/// Renders the `{ x, y, ... }: Params` destructure for the function signature.
pub fn params_destructure(wf: &Workflow) -> String {
    let names: Vec<&str> = wf.start_ports.iter().map(|(n, _)| n.as_str()).collect();
    format!("{{ {} }}", names.join(", "))
}

/// Renders the return-object expression, wiring each Exit port to whichever
/// connection feeds it (cast to the declared port type).
pub fn return_object(wf: &Workflow) -> Result<String> {
    let mut fields = Vec::new();
    for (port_name, port_def) in &wf.exit_ports {
        let conn = wf
            .connections
            .iter()
            .find(|c| c.to.node == reserved::EXIT_NODE && c.to.port == *port_name && c.from.node != reserved::START_NODE);

        let expr = match conn {
            Some(c) => format!(
                "ctx.getVariable({{ id: '{}', portName: '{}', executionIndex: {}, nodeTypeName: '{}' }}) as {}",
                c.from.node,
                c.from.port,
                index_var(&c.from.node),
                wf.find_instance(&c.from.node).map(|i| i.node_type.clone()).unwrap_or_default(),
                cast_type_name(port_def.kind),
            ),
            None if port_def.optional => "undefined".to_string(),
            None => return Err(CodegenError::UnreachableExitPort(port_name.clone())),
        };
        fields.push(format!("{port_name}: {expr}"));
    }

    let onsuccess_connected = wf.connections.iter().any(|c| c.to.node == reserved::EXIT_NODE && c.from.port == reserved::ON_SUCCESS);
    let onfailure_connected = wf.connections.iter().any(|c| c.to.node == reserved::EXIT_NODE && c.from.port == reserved::ON_FAILURE);
    if onsuccess_connected || onfailure_connected {
        fields.insert(0, "onFailure: !onSuccessFlag".to_string());
        fields.insert(0, "onSuccess: onSuccessFlag".to_string());
    }

    Ok(format!("{{ {} }}", fields.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{Connection, Endpoint, NodeInstance, NodeType, PortDefinition, PortKind};

    fn wf_with_exit() -> Workflow {
        let mut wf = Workflow::new("W", "w", "w.ts");
        let mut nt = NodeType::new_function("double", "double");
        nt.add_output("y", PortDefinition::new(PortKind::Number));
        wf.node_types.push(nt);
        wf.instances.push(NodeInstance::new("d", "double"));
        wf.exit_ports.push(("result".to_string(), PortDefinition::new(PortKind::Any)));
        wf.connections.push(Connection::new(Endpoint::new("d", "y"), Endpoint::new("Exit", "result")));
        wf
    }

    #[test]
    fn params_destructure_lists_start_port_names() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.start_ports.push(("x".to_string(), PortDefinition::new(PortKind::Number)));
        wf.start_ports.push(("y".to_string(), PortDefinition::new(PortKind::String)));
        assert_eq!(params_destructure(&wf), "{ x, y }");
    }

    #[test]
    fn any_cast_normalizes_to_unknown() {
        let wf = wf_with_exit();
        let expr = return_object(&wf).unwrap();
        assert!(expr.contains("as unknown"));
    }

    #[test]
    fn unreachable_required_exit_port_is_an_error() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.exit_ports.push(("result".to_string(), PortDefinition::new(PortKind::Any)));
        assert!(return_object(&wf).is_err());
    }
}
