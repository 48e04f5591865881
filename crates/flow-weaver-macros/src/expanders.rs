//! Macro lowering (`spec.md §4.F`): each expander turns a `RawMacroTag` into
//! canonical instances, connections, and scope entries on the workflow, and
//! records a `Macro` so the regenerator can re-emit sugar instead of raw
//! connections.

use flow_weaver_ast::{
    workflow::reserved, CoerceMacroData, CoercionKind, Connection, Endpoint, FanInMacroData, FanOutMacroData,
    Macro, MapMacroData, NodeType, NodeVariant, PathMacroData, PathStep, PortDefinition, PortKind, Workflow,
};

use crate::error::{MacroError, Result};
use crate::raw::{RawMacroTag, RawPathStep, RawPortRef};

/// Runs every collected macro tag against `workflow`, mutating it in place.
/// Order follows declaration order; later macros see earlier ones' effects,
/// matching the "order-independent up to macro ordering" invariant
/// (`spec.md §4.F`).
pub fn expand_all(workflow: &mut Workflow, tags: Vec<RawMacroTag>) -> Result<()> {
    for tag in tags {
        match tag {
            RawMacroTag::Map { instance_id, child_id, child_in_port, child_out_port, source } => {
                expand_map(workflow, instance_id, child_id, child_in_port, child_out_port, source)?;
            }
            RawMacroTag::Path { steps } => expand_path(workflow, steps)?,
            RawMacroTag::FanOut { source, targets } => expand_fan_out(workflow, source, targets)?,
            RawMacroTag::FanIn { sources, target } => expand_fan_in(workflow, sources, target)?,
            RawMacroTag::Coerce { id, source, target, kind } => expand_coerce(workflow, id, source, target, kind)?,
        }
    }
    Ok(())
}

fn add_connection_deduped(workflow: &mut Workflow, conn: Connection) {
    if !workflow.connections.contains(&conn) {
        workflow.connections.push(conn);
    }
}

/// `@map instanceId childId[(in -> out)] over source.port` (`spec.md §4.F`).
fn expand_map(
    workflow: &mut Workflow,
    instance_id: String,
    child_id: String,
    child_in_port: Option<String>,
    child_out_port: Option<String>,
    source: Endpoint,
) -> Result<()> {
    let child_type_name = workflow
        .instances
        .iter()
        .find(|i| i.id == child_id)
        .map(|i| i.node_type.clone())
        .ok_or_else(|| MacroError::UnknownInstance(child_id.clone()))?;
    let child_type = workflow
        .find_node_type(&child_type_name)
        .ok_or_else(|| MacroError::UnknownInstance(child_type_name.clone()))?;

    let in_port = match child_in_port {
        Some(p) => p,
        None => child_type
            .inputs
            .iter()
            .find(|(_, p)| !p.is_control_flow)
            .map(|(n, _)| n.clone())
            .ok_or(MacroError::MapCannotInferPort { child_id: child_id.clone(), direction: "input" })?,
    };
    let out_port = match child_out_port {
        Some(p) => p,
        None => child_type
            .outputs
            .iter()
            .find(|(_, p)| !p.is_control_flow)
            .map(|(n, _)| n.clone())
            .ok_or(MacroError::MapCannotInferPort { child_id: child_id.clone(), direction: "output" })?,
    };

    let map_type_name = format!("__fw_map_{instance_id}__");
    if workflow.find_node_type(&map_type_name).is_none() {
        let mut nt = NodeType::new_function(map_type_name.clone(), map_type_name.clone());
        nt.variant = NodeVariant::MapIterator;
        nt.scopes = Some(vec!["iterate".to_string()]);
        nt.add_input("items", PortDefinition::new(PortKind::Array));
        nt.add_output("results", PortDefinition::new(PortKind::Array));
        nt.add_output("start", PortDefinition::new(PortKind::Step).with_scope("iterate"));
        nt.add_output("item", PortDefinition::new(PortKind::Any).with_scope("iterate"));
        nt.add_input("success", PortDefinition::new(PortKind::Step).with_scope("iterate"));
        nt.add_input("failure", PortDefinition::new(PortKind::Step).with_scope("iterate"));
        nt.add_input("processed", PortDefinition::new(PortKind::Any).with_scope("iterate"));
        workflow.node_types.push(nt);
    }

    if let Some(inst) = workflow.instances.iter_mut().find(|i| i.id == instance_id) {
        inst.node_type = map_type_name;
    }
    if let Some(child) = workflow.instances.iter_mut().find(|i| i.id == child_id) {
        child.parent = Some(flow_weaver_ast::InstanceParent { id: instance_id.clone(), scope: "iterate".to_string() });
    }
    workflow.set_scope_children(&instance_id, "iterate", vec![child_id.clone()]);

    add_connection_deduped(workflow, Connection::new(source.clone(), Endpoint::new(&instance_id, "items")));
    add_connection_deduped(
        workflow,
        Connection::new(
            Endpoint::new(&instance_id, "start").with_scope("iterate"),
            Endpoint::new(&child_id, "execute").with_scope("iterate"),
        ),
    );
    add_connection_deduped(
        workflow,
        Connection::new(
            Endpoint::new(&instance_id, "item").with_scope("iterate"),
            Endpoint::new(&child_id, &in_port).with_scope("iterate"),
        ),
    );
    add_connection_deduped(
        workflow,
        Connection::new(
            Endpoint::new(&child_id, &out_port).with_scope("iterate"),
            Endpoint::new(&instance_id, "processed").with_scope("iterate"),
        ),
    );
    add_connection_deduped(
        workflow,
        Connection::new(
            Endpoint::new(&child_id, reserved::ON_SUCCESS).with_scope("iterate"),
            Endpoint::new(&instance_id, "success").with_scope("iterate"),
        ),
    );
    add_connection_deduped(
        workflow,
        Connection::new(
            Endpoint::new(&child_id, reserved::ON_FAILURE).with_scope("iterate"),
            Endpoint::new(&instance_id, "failure").with_scope("iterate"),
        ),
    );

    workflow.macros.push(Macro::Map(MapMacroData {
        instance_id,
        child_id,
        child_in_port: Some(in_port),
        child_out_port: Some(out_port),
        source,
    }));
    Ok(())
}

/// `@path s0 -> s1:route -> … -> sn` (`spec.md §4.F`). `Start`/`Exit` are
/// handled specially since they are pseudo-nodes with no declared data ports.
fn expand_path(workflow: &mut Workflow, steps: Vec<RawPathStep>) -> Result<()> {
    if steps.len() < 2 {
        return Err(MacroError::PathTooShort(steps.len()));
    }

    for window in steps.windows(2) {
        let (from, to) = (&window[0], &window[1]);
        let route = from.route.clone().unwrap_or_else(|| "ok".to_string());
        let route_port = match route.as_str() {
            "fail" => reserved::ON_FAILURE,
            _ => reserved::ON_SUCCESS,
        };
        let from_port = if from.node == reserved::START_NODE { reserved::EXECUTE } else { route_port };
        // Exit has no `execute` port; it's a sink keyed by which route arrived.
        let to_port = if to.node == reserved::EXIT_NODE { route_port } else { reserved::EXECUTE };
        add_connection_deduped(workflow, Connection::new(Endpoint::new(&from.node, from_port), Endpoint::new(&to.node, to_port)));

        let data_inputs: Vec<String> = if to.node == reserved::EXIT_NODE {
            workflow.exit_ports.iter().filter(|(_, p)| !p.is_control_flow).map(|(n, _)| n.clone()).collect()
        } else if let Some(to_type_name) = workflow.instances.iter().find(|i| i.id == to.node).map(|i| i.node_type.clone()) {
            workflow
                .find_node_type(&to_type_name)
                .map(|to_type| to_type.inputs.iter().filter(|(_, p)| !p.is_control_flow).map(|(n, _)| n.clone()).collect())
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        for input_name in data_inputs {
            if let Some(src) = find_nearest_matching_output(workflow, &steps, to, &input_name) {
                add_connection_deduped(
                    workflow,
                    Connection::new(Endpoint::new(&src, &input_name), Endpoint::new(&to.node, &input_name)),
                );
            }
        }
    }

    workflow.macros.push(Macro::Path(PathMacroData {
        steps: steps.into_iter().map(|s| {
            let mut step = PathStep::new(s.node);
            if let Some(r) = s.route {
                step = step.with_route(r);
            }
            step
        }).collect(),
    }));
    Ok(())
}

fn find_nearest_matching_output(
    workflow: &Workflow,
    steps: &[RawPathStep],
    to: &RawPathStep,
    port_name: &str,
) -> Option<String> {
    let to_idx = steps.iter().position(|s| s.node == to.node)?;
    for step in steps[..to_idx].iter().rev() {
        if step.node == reserved::START_NODE {
            if workflow.start_ports.iter().any(|(n, _)| n == port_name) {
                return Some(reserved::START_NODE.to_string());
            }
            continue;
        }
        let type_name = workflow.instances.iter().find(|i| i.id == step.node)?.node_type.clone();
        if let Some(nt) = workflow.find_node_type(&type_name) {
            if nt.outputs.iter().any(|(n, _)| n == port_name) {
                return Some(step.node.clone());
            }
        }
    }
    None
}

fn resolve_port(port_ref: &RawPortRef, default_name: &str) -> String {
    port_ref.port.clone().unwrap_or_else(|| default_name.to_string())
}

/// `@fanOut src.port -> t1[.p], t2[.p]` (`spec.md §4.F`).
fn expand_fan_out(workflow: &mut Workflow, source: RawPortRef, targets: Vec<RawPortRef>) -> Result<()> {
    if targets.is_empty() {
        return Err(MacroError::EmptyFanSet);
    }
    let source_port = source.port.clone().unwrap_or_default();
    let mut resolved_targets = Vec::new();
    for t in &targets {
        let port = resolve_port(t, &source_port);
        add_connection_deduped(workflow, Connection::new(Endpoint::new(&source.node, &source_port), Endpoint::new(&t.node, &port)));
        resolved_targets.push(Endpoint::new(&t.node, &port));
    }
    workflow.macros.push(Macro::FanOut(FanOutMacroData {
        source: Endpoint::new(&source.node, &source_port),
        targets: resolved_targets,
    }));
    Ok(())
}

/// `@fanIn s1[.p], s2[.p] -> tgt.port` (`spec.md §4.F`).
fn expand_fan_in(workflow: &mut Workflow, sources: Vec<RawPortRef>, target: RawPortRef) -> Result<()> {
    if sources.is_empty() {
        return Err(MacroError::EmptyFanSet);
    }
    let target_port = target.port.clone().unwrap_or_default();
    let mut resolved_sources = Vec::new();
    for s in &sources {
        let port = resolve_port(s, &target_port);
        add_connection_deduped(workflow, Connection::new(Endpoint::new(&s.node, &port), Endpoint::new(&target.node, &target_port)));
        resolved_sources.push(Endpoint::new(&s.node, &port));
    }
    workflow.macros.push(Macro::FanIn(FanInMacroData { sources: resolved_sources, target: Endpoint::new(&target.node, &target_port) }));
    Ok(())
}

/// `@coerce id src.p -> tgt.p as <kind>` (`spec.md §4.F`).
fn expand_coerce(workflow: &mut Workflow, id: String, source: RawPortRef, target: RawPortRef, kind: CoercionKind) -> Result<()> {
    let source_port = source.port.clone().unwrap_or_default();
    let target_port = target.port.clone().unwrap_or_default();

    if workflow.find_node_type(kind.node_type_name()).is_none() {
        let mut nt = NodeType::new_expression(kind.node_type_name(), kind.node_type_name());
        nt.variant = NodeVariant::Coercion;
        nt.add_input("value", PortDefinition::new(PortKind::Any));
        nt.add_output("result", PortDefinition::new(coercion_result_kind(kind)));
        workflow.node_types.push(nt);
    }
    workflow.instances.push(flow_weaver_ast::NodeInstance::new(&id, kind.node_type_name()));

    let src_endpoint = Endpoint::new(&source.node, &source_port);
    let tgt_endpoint = Endpoint::new(&target.node, &target_port);
    add_connection_deduped(workflow, Connection::new(src_endpoint.clone(), Endpoint::new(&id, "value")));
    add_connection_deduped(workflow, Connection::new(Endpoint::new(&id, "result"), tgt_endpoint.clone()));

    workflow.macros.push(Macro::Coerce(CoerceMacroData { id, source: src_endpoint, target: tgt_endpoint, kind }));
    Ok(())
}

fn coercion_result_kind(kind: CoercionKind) -> PortKind {
    match kind {
        CoercionKind::String => PortKind::String,
        CoercionKind::Number => PortKind::Number,
        CoercionKind::Boolean => PortKind::Boolean,
        CoercionKind::Json => PortKind::String,
        CoercionKind::Object => PortKind::Object,
    }
}

/// `@autoConnect` (`spec.md §4.F`): wires `Start -> first -> … -> last ->
/// Exit` by declaration order when no explicit `@connect` exists. Runs only
/// when `workflow.options.auto_connect` is set and there are zero existing
/// connections.
pub fn expand_auto_connect(workflow: &mut Workflow) {
    if !workflow.options.auto_connect || !workflow.connections.is_empty() {
        return;
    }
    let ids: Vec<String> = workflow.instances.iter().filter(|i| i.is_root()).map(|i| i.id.clone()).collect();
    if ids.is_empty() {
        return;
    }

    let mut prev = reserved::START_NODE.to_string();
    for id in &ids {
        let from_port = if prev == reserved::START_NODE { reserved::EXECUTE } else { reserved::ON_SUCCESS };
        add_connection_deduped(workflow, Connection::new(Endpoint::new(&prev, from_port), Endpoint::new(id, reserved::EXECUTE)));
        wire_data_by_name(workflow, &prev, id);
        prev = id.clone();
    }
    add_connection_deduped(workflow, Connection::new(Endpoint::new(&prev, reserved::ON_SUCCESS), Endpoint::new(reserved::EXIT_NODE, reserved::ON_SUCCESS)));
    wire_data_by_name(workflow, &prev, reserved::EXIT_NODE);
}

fn wire_data_by_name(workflow: &mut Workflow, from_id: &str, to_id: &str) {
    let from_outputs: Vec<String> = if from_id == reserved::START_NODE {
        workflow.start_ports.iter().map(|(n, _)| n.clone()).collect()
    } else {
        workflow
            .instances
            .iter()
            .find(|i| i.id == from_id)
            .and_then(|i| workflow.find_node_type(&i.node_type))
            .map(|nt| nt.outputs.iter().filter(|(_, p)| !p.is_control_flow).map(|(n, _)| n.clone()).collect())
            .unwrap_or_default()
    };
    let to_inputs: Vec<String> = if to_id == reserved::EXIT_NODE {
        workflow.exit_ports.iter().map(|(n, _)| n.clone()).collect()
    } else {
        workflow
            .instances
            .iter()
            .find(|i| i.id == to_id)
            .and_then(|i| workflow.find_node_type(&i.node_type))
            .map(|nt| nt.inputs.iter().filter(|(_, p)| !p.is_control_flow).map(|(n, _)| n.clone()).collect())
            .unwrap_or_default()
    };
    for name in from_outputs {
        if to_inputs.contains(&name) {
            add_connection_deduped(workflow, Connection::new(Endpoint::new(from_id, &name), Endpoint::new(to_id, &name)));
        }
    }
}
