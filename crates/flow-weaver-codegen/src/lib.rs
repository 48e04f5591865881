//! Generates the function body for a compiled workflow (`spec.md §4.H`).
//! Orchestrates execution-order planning ([`order`]), per-node frames
//! ([`frame`]), scope closures ([`scope`]), and Start/Exit wiring
//! ([`exit`]) into one generated source string. The splice pass that
//! stitches this body back into the user's file lives in [`splice`]
//! (`spec.md §4.J`).

pub mod error;
pub mod exit;
pub mod frame;
pub mod order;
pub mod sanitize;
pub mod scope;
pub mod splice;

pub use error::{CodegenError, Result};

use flow_weaver_ast::{GraphLike, Workflow};

/// The generated body text plus whether the enclosing function must be
/// declared `async` (`spec.md §4.H`: "async iff the workflow is async, the
/// node is async, or any child node is async").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedBody {
    pub body: String,
    pub is_async: bool,
}

fn workflow_is_async(wf: &Workflow) -> bool {
    wf.user_specified_async || wf.instances.iter().any(|i| wf.find_node_type(&i.node_type).is_some_and(|nt| nt.is_async))
}

/// Generates the full function body for `wf`: params destructure is the
/// caller's concern (it goes in the function signature, not the body);
/// this produces everything from the first status event through the
/// return statement.
pub fn generate_workflow_body(wf: &Workflow) -> Result<GeneratedBody> {
    let is_async = workflow_is_async(wf);
    let maybe_await = if is_async { "await " } else { "" };
    let mut body = String::new();

    if wf.instances.is_empty() {
        body.push_str("  return ");
        body.push_str(&exit::return_object(wf)?);
        body.push_str(";\n");
        return Ok(GeneratedBody { body, is_async });
    }

    body.push_str("  let onSuccessFlag = true;\n");

    let stages = order::execution_stages(wf)?;
    for stage in stages {
        if stage.len() == 1 {
            let inst = wf
                .find_instance(&stage[0])
                .ok_or_else(|| CodegenError::UnknownInstance(stage[0].clone()))?;
            frame::emit_frame(wf, inst, "  ", &mut body)?;
            emit_node_scopes(wf, inst, "  ", &mut body)?;
        } else if is_async {
            body.push_str("  await Promise.all([\n");
            for id in &stage {
                let inst = wf.find_instance(id).ok_or_else(|| CodegenError::UnknownInstance(id.clone()))?;
                body.push_str("    (async () => {\n");
                frame::emit_frame(wf, inst, "      ", &mut body)?;
                emit_node_scopes(wf, inst, "      ", &mut body)?;
                body.push_str("    })(),\n");
            }
            body.push_str("  ]);\n");
        } else {
            for id in &stage {
                let inst = wf.find_instance(id).ok_or_else(|| CodegenError::UnknownInstance(id.clone()))?;
                frame::emit_frame(wf, inst, "  ", &mut body)?;
                emit_node_scopes(wf, inst, "  ", &mut body)?;
            }
        }
    }

    body.push_str(&format!("  {maybe_await}ctx.flush();\n"));
    body.push_str("  return ");
    body.push_str(&exit::return_object(wf)?);
    body.push_str(";\n");

    Ok(GeneratedBody { body, is_async })
}

fn emit_node_scopes(wf: &Workflow, inst: &flow_weaver_ast::NodeInstance, indent: &str, out: &mut String) -> Result<()> {
    let Some(nt) = wf.find_node_type(&inst.node_type) else { return Ok(()) };
    let mut scope_names: Vec<&str> = nt
        .outputs
        .iter()
        .filter_map(|(_, p)| p.scope.as_deref())
        .chain(nt.inputs.iter().filter_map(|(_, p)| p.scope.as_deref()))
        .collect();
    scope_names.sort_unstable();
    scope_names.dedup();
    for scope_name in scope_names {
        scope::emit_scope_closure(wf, inst, nt, scope_name, indent, out)?;
    }
    Ok(())
}
