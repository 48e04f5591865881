//! Workflow construction (`spec.md §4.D`): `@node`/`@connect`/`@scope`/
//! `@position` fill instances/connections, `@param`/`@returns` fill
//! start/exit ports, and the macro expander runs over the result.

use flow_weaver_ast::{
    CancelOnSpec, Endpoint, InstanceConfig, InstanceParent, NodeInstance, PortDefinition, ThrottleSpec, TriggerSpec,
    Workflow,
};
use flow_weaver_macros::raw::RawMacroTag;
use flow_weaver_source::{infer_port_kind, HostSourceOracle};

use crate::error::Result;
use crate::port_order::assign_port_order;
use crate::tags::Tag;

/// Builds a `Workflow`'s instances/connections/ports/options from its tags,
/// then runs the macro expander over the collected graph
/// (`spec.md §4.D`, §4.F). Does not run validation.
pub fn build_workflow(
    name: &str,
    function_name: &str,
    source_file: &str,
    tags: &[Tag],
    oracle: &dyn HostSourceOracle,
) -> Result<Workflow> {
    let mut workflow = Workflow::new(name, function_name, source_file);
    let mut macro_tags = Vec::new();
    let mut last_node_id: Option<String> = None;

    for t in tags {
        match t {
            Tag::Name(n) => workflow.name = n.clone(),
            Tag::Description(_) => {}
            Tag::StrictTypes => workflow.options.strict_types = true,
            Tag::AutoConnect => workflow.options.auto_connect = true,
            Tag::Import { name, function_name, module } => {
                workflow.imports.push(flow_weaver_ast::ImportDecl {
                    name: name.clone(),
                    function_name: function_name.clone(),
                    module: module.clone(),
                });
            }
            Tag::Node(n) => {
                let mut inst = NodeInstance::new(n.id.clone(), n.type_name.clone());
                if let Some(parent_scope) = &n.parent_scope {
                    if let Some((parent_id, scope_name)) = parent_scope.split_once('.') {
                        inst.parent = Some(InstanceParent { id: parent_id.to_string(), scope: scope_name.to_string() });
                    }
                }
                inst.config = InstanceConfig {
                    label: n.label.clone(),
                    color: n.color.clone(),
                    icon: n.icon.clone(),
                    minimized: n.minimized,
                    pull_execution: n.pull_execution.clone(),
                    ..Default::default()
                };
                last_node_id = Some(n.id.clone());
                workflow.instances.push(inst);
            }
            Tag::Connect(c) => {
                workflow.connections.push(flow_weaver_ast::Connection::new(c.from.clone(), c.to.clone()));
            }
            Tag::Scope(s) => {
                if let Some(parent_id) = &last_node_id {
                    workflow.set_scope_children(parent_id, &s.name, s.children.clone());
                }
            }
            Tag::Position(p) => {
                if p.id == "Start" {
                    workflow.ui.start_node = Some(p.id.clone());
                    workflow.ui.start_position = Some((p.x, p.y));
                } else if p.id == "Exit" {
                    workflow.ui.exit_node = Some(p.id.clone());
                    workflow.ui.exit_position = Some((p.x, p.y));
                }
                if let Some(inst) = workflow.instances.iter_mut().find(|i| i.id == p.id) {
                    inst.config.x = Some(p.x);
                    inst.config.y = Some(p.y);
                }
            }
            Tag::Trigger { event, cron } => {
                workflow.options.trigger = Some(TriggerSpec { event: event.clone(), cron: cron.clone() });
            }
            Tag::CancelOn { event, match_expr, timeout } => {
                workflow.options.cancel_on =
                    Some(CancelOnSpec { event: event.clone(), match_expr: match_expr.clone(), timeout: timeout.clone() });
            }
            Tag::Retries(n) => workflow.options.retries = Some(*n),
            Tag::Timeout(d) => workflow.options.timeout = Some(d.clone()),
            Tag::Throttle { limit, period } => {
                workflow.options.throttle = Some(ThrottleSpec { limit: *limit, period: period.clone() });
            }
            Tag::Param(_) | Tag::Returns(_) => {}
            Tag::Map { instance_id, child_id, child_in, child_out, source } => {
                macro_tags.push(RawMacroTag::Map {
                    instance_id: instance_id.clone(),
                    child_id: child_id.clone(),
                    child_in_port: child_in.clone(),
                    child_out_port: child_out.clone(),
                    source: source.clone(),
                });
            }
            Tag::Path { steps } => macro_tags.push(RawMacroTag::Path {
                steps: steps.iter().map(|s| flow_weaver_macros::raw::RawPathStep { node: s.node.clone(), route: s.route.clone() }).collect(),
            }),
            Tag::FanOut { source, targets } => macro_tags.push(RawMacroTag::FanOut { source: source.clone(), targets: targets.clone() }),
            Tag::FanIn { sources, target } => macro_tags.push(RawMacroTag::FanIn { sources: sources.clone(), target: target.clone() }),
            Tag::Coerce { id, source, target, kind } => {
                macro_tags.push(RawMacroTag::Coerce { id: id.clone(), source: source.clone(), target: target.clone(), kind: *kind });
            }
            _ => {}
        }
    }

    for param in oracle.parameters(function_name) {
        workflow
            .start_ports
            .push((param.name.clone(), PortDefinition::new(infer_port_kind(&param.type_text)).optional_if(param.optional)));
    }
    for field in oracle.return_object_fields(function_name) {
        workflow.exit_ports.push((field.name.clone(), PortDefinition::new(infer_port_kind(&field.type_text))));
    }
    assign_port_order(&mut workflow.start_ports, |_| false);
    assign_port_order(&mut workflow.exit_ports, |_| false);

    if workflow.ui.start_node.is_none() && workflow.ui.exit_node.is_none() {
        workflow.ui.start_node = Some("Start".to_string());
        workflow.ui.exit_node = Some("Exit".to_string());
    }

    flow_weaver_macros::expand_all(&mut workflow, macro_tags)?;
    flow_weaver_macros::expand_auto_connect(&mut workflow);

    Ok(workflow)
}

trait OptionalExt {
    fn optional_if(self, flag: bool) -> Self;
}

impl OptionalExt for PortDefinition {
    fn optional_if(self, flag: bool) -> Self {
        if flag {
            self.optional()
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_source::LightweightOracle;

    #[test]
    fn builds_linear_pipeline_via_path() {
        let mut oracle = LightweightOracle::new();
        oracle.scan("function pipeline(x: number): { result: number } { return { result: x }; }");
        let tags = vec![
            Tag::Node(crate::tags::NodeTag {
                id: "d".into(),
                type_name: "double".into(),
                parent_scope: None,
                label: None,
                color: None,
                icon: None,
                minimized: false,
                pull_execution: None,
            }),
            Tag::Path {
                steps: vec![
                    flow_weaver_macros::raw::RawPathStep { node: "Start".into(), route: None },
                    flow_weaver_macros::raw::RawPathStep { node: "d".into(), route: None },
                    flow_weaver_macros::raw::RawPathStep { node: "Exit".into(), route: None },
                ],
            },
        ];
        let wf = build_workflow("Pipeline", "pipeline", "pipeline.ts", &tags, &oracle).unwrap();
        assert_eq!(wf.instances.len(), 1);
        assert!(wf.connections.iter().any(|c| c.from.node == "Start" && c.to.node == "d"));
        assert!(wf.connections.iter().any(|c| c.to.node == "Exit"));
        assert_eq!(wf.start_ports[0].0, "x");
        assert_eq!(wf.exit_ports[0].0, "result");
    }
}
