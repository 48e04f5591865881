//! Per-node frame emission (`spec.md §4.H`). Builds the generated-source
//! text for a single instance: index allocation, status events, input
//! resolution, the user call, output storage, and the success/failure
//! control-flow handoff.
//!
//! Mirrors the teacher's runtime shape in
//! `src-tauri/src/workflow/engine.rs::execute` (send `node_started`, resolve
//! inputs, call, send `node_completed`/`node_error`) but emits that sequence
//! as source text rather than running it directly, since the workflow this
//! crate targets is compiled ahead of time, not interpreted.

use flow_weaver_ast::{reserved, GraphLike, NodeInstance, NodeType, Workflow};

use crate::error::{CodegenError, Result};
use crate::sanitize::{index_var, sanitize_identifier};

/// One resolved input, ready to splice into the call argument list.
struct ResolvedInput {
    port_name: String,
    expr: String,
}

/// Priority chain for resolving a single input port's value
/// (`spec.md §4.H`): `skipped → instance-level expression → connection (with
/// FUNCTION-type registry resolution) → node-type default expression →
/// default literal → optional undefined → typed undefined sentinel`.
fn resolve_input(wf: &Workflow, inst: &NodeInstance, nt: &NodeType, port_name: &str) -> ResolvedInput {
    if let Some(cfg) = inst.config.port_config(port_name) {
        if let Some(expr) = &cfg.expression {
            return ResolvedInput { port_name: port_name.to_string(), expr: expr.clone() };
        }
    }

    let incoming = wf.incoming(&inst.id).into_iter().find(|c| c.to.port == port_name);
    if let Some(conn) = incoming {
        let source_kind = nt.find_input(port_name).map(|p| p.kind);
        let expr = if matches!(source_kind, Some(flow_weaver_ast::PortKind::Function)) {
            format!("ctx.resolveFunction('{}', '{}')", conn.from.node, conn.from.port)
        } else {
            format!(
                "ctx.getVariable({{ id: '{}', portName: '{}', executionIndex: {}, nodeTypeName: '{}' }})",
                conn.from.node,
                conn.from.port,
                index_var(&conn.from.node),
                nt.name,
            )
        };
        return ResolvedInput { port_name: port_name.to_string(), expr };
    }

    let port = nt.find_input(port_name);
    if let Some(default_expr) = port.and_then(|p| p.expression.as_ref()) {
        return ResolvedInput { port_name: port_name.to_string(), expr: default_expr.clone() };
    }
    if let Some(default) = port.and_then(|p| p.default.as_ref()) {
        return ResolvedInput { port_name: port_name.to_string(), expr: default.to_string() };
    }
    if port.is_some_and(|p| p.optional) {
        return ResolvedInput { port_name: port_name.to_string(), expr: "undefined".to_string() };
    }
    ResolvedInput { port_name: port_name.to_string(), expr: "undefined as unknown as never".to_string() }
}

/// Renders the full frame for one instance. `out` accumulates generated
/// lines; indentation is the caller's responsibility via `indent`.
pub fn emit_frame(wf: &Workflow, inst: &NodeInstance, indent: &str, out: &mut String) -> Result<()> {
    let nt = wf
        .find_node_type(&inst.node_type)
        .ok_or_else(|| CodegenError::UnknownNodeType(inst.id.clone(), inst.node_type.clone()))?;

    let sid = sanitize_identifier(&inst.id);
    let idx = index_var(&inst.id);
    let has_onfailure_handler = wf.outgoing(&inst.id).iter().any(|c| c.from.port == reserved::ON_FAILURE);

    out.push_str(&format!("{indent}const {idx} = ctx.allocateIndex('{}');\n", inst.id));
    out.push_str(&format!(
        "{indent}await ctx.sendStatusChangedEvent({{ id: '{}', executionIndex: {idx}, status: 'RUNNING' }});\n",
        inst.id
    ));

    let args: Vec<ResolvedInput> = nt
        .inputs
        .iter()
        .filter(|(name, p)| name != reserved::EXECUTE && !p.is_control_flow)
        .map(|(name, _)| resolve_input(wf, inst, nt, name))
        .collect();

    let call_args = if nt.expression {
        args.iter().map(|a| a.expr.clone()).collect::<Vec<_>>().join(", ")
    } else {
        let mut parts = vec!["execute: true".to_string()];
        parts.extend(args.iter().map(|a| format!("{}: {}", a.port_name, a.expr)));
        format!("{{ {} }}", parts.join(", "))
    };

    out.push_str(&format!("{indent}try {{\n"));
    let maybe_await = if nt.is_async { "await " } else { "" };
    out.push_str(&format!("{indent}  const {sid}Result = {maybe_await}{}({call_args});\n", nt.function_name));

    for (out_name, _) in nt.outputs.iter().filter(|(n, p)| !p.is_control_flow && n.as_str() != reserved::ON_SUCCESS && n.as_str() != reserved::ON_FAILURE) {
        out.push_str(&format!(
            "{indent}  ctx.setVariable({{ id: '{}', portName: '{}', executionIndex: {idx}, nodeTypeName: '{}' }}, {sid}Result.{out_name});\n",
            inst.id, out_name, nt.name
        ));
    }

    out.push_str(&format!(
        "{indent}  await ctx.sendStatusChangedEvent({{ id: '{}', executionIndex: {idx}, status: 'SUCCEEDED' }});\n",
        inst.id
    ));
    out.push_str(&format!("{indent}}} catch (err) {{\n"));
    out.push_str(&format!(
        "{indent}  await ctx.sendStatusChangedEvent({{ id: '{}', executionIndex: {idx}, status: 'FAILED' }});\n",
        inst.id
    ));
    out.push_str(&format!("{indent}  ctx.logError('{}', err);\n", inst.id));
    if has_onfailure_handler {
        out.push_str(&format!(
            "{indent}  ctx.setVariable({{ id: '{}', portName: 'onSuccess', executionIndex: {idx}, nodeTypeName: '{}' }}, false);\n",
            inst.id, nt.name
        ));
        out.push_str(&format!(
            "{indent}  ctx.setVariable({{ id: '{}', portName: 'onFailure', executionIndex: {idx}, nodeTypeName: '{}' }}, true);\n",
            inst.id, nt.name
        ));
    } else {
        out.push_str(&format!("{indent}  throw err;\n"));
    }
    out.push_str(&format!("{indent}}}\n"));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{Connection, Endpoint, NodeType, PortDefinition, PortKind};

    fn sample_workflow() -> Workflow {
        let mut wf = Workflow::new("Pipeline", "pipeline", "p.ts");
        let mut nt = NodeType::new_function("double", "double");
        nt.add_input("x", PortDefinition::new(PortKind::Number));
        nt.add_output("y", PortDefinition::new(PortKind::Number));
        wf.node_types.push(nt);
        wf.instances.push(NodeInstance::new("d", "double"));
        wf.start_ports.push(("x".to_string(), PortDefinition::new(PortKind::Number)));
        wf.connections.push(Connection::new(Endpoint::new("Start", "x"), Endpoint::new("d", "x")));
        wf
    }

    #[test]
    fn emits_try_catch_with_rethrow_when_no_handler() {
        let wf = sample_workflow();
        let inst = wf.find_instance("d").unwrap();
        let mut out = String::new();
        emit_frame(&wf, inst, "  ", &mut out).unwrap();
        assert!(out.contains("throw err;"));
        assert!(out.contains("dIdx = ctx.allocateIndex('d')"));
    }

    #[test]
    fn suppresses_rethrow_when_failure_handler_present() {
        let mut wf = sample_workflow();
        wf.connections.push(Connection::new(Endpoint::new("d", "onFailure"), Endpoint::new("Exit", "err")));
        let inst = wf.find_instance("d").unwrap();
        let mut out = String::new();
        emit_frame(&wf, inst, "  ", &mut out).unwrap();
        assert!(!out.contains("throw err;"));
        assert!(out.contains("onFailure"));
    }

    #[test]
    fn unknown_node_type_is_an_error() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("x", "missing"));
        let inst = wf.find_instance("x").unwrap();
        let mut out = String::new();
        assert!(emit_frame(&wf, inst, "", &mut out).is_err());
    }
}
