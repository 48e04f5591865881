//! Scope closures (`spec.md §4.H`). A scoped port on a node becomes a
//! closure argument (if it's a parent OUTPUT port) or the closure's return
//! value (if it's a parent INPUT port) — directions are inverted from the
//! caller's vantage so the graph stays acyclic (`spec.md §9`: "avoid cyclic
//! graphs in scope callbacks by inverting port directions").

use flow_weaver_ast::{GraphLike, NodeInstance, NodeType, Workflow};

use crate::error::{CodegenError, Result};
use crate::frame::emit_frame;
use crate::order::flat_execution_order;
use crate::sanitize::sanitize_identifier;

/// Emits the closure body for one scoped port on `inst`, using `scope_name`
/// to look up registered children (`wf.scopes["<id>.<scope_name>"]`).
///
/// `is_async` forces `async` on the closure when the owning workflow,
/// the node itself, or any child instance is async.
pub fn emit_scope_closure(wf: &Workflow, inst: &NodeInstance, nt: &NodeType, scope_name: &str, indent: &str, out: &mut String) -> Result<()> {
    let children = wf
        .scope_children(&inst.id, scope_name)
        .ok_or_else(|| CodegenError::MissingScopeChildren(scope_name.to_string(), inst.id.clone()))?
        .to_vec();

    let child_async = children.iter().any(|id| {
        wf.find_instance(id)
            .and_then(|i| wf.find_node_type(&i.node_type))
            .is_some_and(|nt| nt.is_async)
    });
    let is_async = nt.is_async || child_async;
    let asyncness = if is_async { "async " } else { "" };
    let maybe_await = if is_async { "await " } else { "" };

    let param_port = nt
        .outputs
        .iter()
        .find(|(_, p)| p.scope.as_deref() == Some(scope_name))
        .map(|(n, _)| n.clone());
    let param_name = param_port.clone().unwrap_or_else(|| "item".to_string());

    out.push_str(&format!("{indent}const {}Scope = {asyncness}({param_name}: unknown) => {{\n", sanitize_identifier(&inst.id)));
    let body_indent = format!("{indent}  ");
    out.push_str(&format!(
        "{body_indent}const scopeCtx = ctx.createScope('{}', {}Idx, '{scope_name}', true);\n",
        inst.id,
        sanitize_identifier(&inst.id)
    ));
    if let Some(port) = &param_port {
        out.push_str(&format!("{body_indent}scopeCtx.setVariable('{port}', {param_name});\n"));
    }

    let mut scoped_wf = wf.clone();
    scoped_wf.instances = children.iter().filter_map(|id| wf.find_instance(id).cloned()).collect();
    scoped_wf.connections = wf
        .connections
        .iter()
        .filter(|c| c.from.scope.as_deref() == Some(scope_name) || c.to.scope.as_deref() == Some(scope_name))
        .cloned()
        .collect();

    for child_id in flat_execution_order(&scoped_wf)? {
        let child = scoped_wf.find_instance(&child_id).ok_or_else(|| CodegenError::UnknownInstance(child_id.clone()))?;
        emit_frame(&scoped_wf, child, &body_indent, out)?;
    }

    out.push_str(&format!("{body_indent}ctx.mergeScope(scopeCtx);\n"));

    let return_port = nt
        .inputs
        .iter()
        .find(|(_, p)| p.scope.as_deref() == Some(scope_name))
        .map(|(n, _)| n.clone());
    if let Some(port) = return_port {
        out.push_str(&format!(
            "{body_indent}return {{ success: scopeCtx.getVariable('success'), failure: scopeCtx.getVariable('failure'), {port}: scopeCtx.getVariable('{port}') }};\n"
        ));
    } else {
        out.push_str(&format!("{body_indent}return {{ success: scopeCtx.getVariable('success'), failure: scopeCtx.getVariable('failure') }};\n"));
    }

    out.push_str(&format!("{indent}}};\n"));
    let _ = maybe_await;
    Ok(())
}
