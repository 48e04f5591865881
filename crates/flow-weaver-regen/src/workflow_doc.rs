//! Workflow doc-block regeneration (`spec.md §4.I`). Emits the canonical
//! sequence: description, `@flowWeaver workflow`, options, `@name` (if it
//! differs from `functionName`), `@node` lines for non-synthetic instances,
//! macro sugar lines, `@position` for Start/Exit, `@connect` lines (skipping
//! anything a macro already covers), `@param`/`@returns`, and `@scope`
//! declarations not covered by `@map`.

use flow_weaver_ast::{reserved, Connection, Macro, Workflow};

use crate::coverage::covered_connections;
use crate::sugar::detect_sugar;

fn is_synthetic_node_type(name: &str) -> bool {
    name.starts_with("__fw_")
}

fn endpoint_text(e: &flow_weaver_ast::Endpoint) -> String {
    match &e.scope {
        Some(scope) => format!("{}.{}:{}", e.node, e.port, scope),
        None => format!("{}.{}", e.node, e.port),
    }
}

fn macro_line(m: &Macro) -> String {
    match m {
        Macro::Map(d) => {
            let ports = match (&d.child_in_port, &d.child_out_port) {
                (Some(i), Some(o)) => format!("({i} -> {o})"),
                _ => String::new(),
            };
            format!(" * @map {} {}{} over {}", d.instance_id, d.child_id, ports, endpoint_text(&d.source))
        }
        Macro::Path(d) => {
            let steps: Vec<String> = d
                .steps
                .iter()
                .map(|s| match &s.route {
                    Some(r) => format!("{}:{r}", s.node),
                    None => s.node.clone(),
                })
                .collect();
            format!(" * @path {}", steps.join(" -> "))
        }
        Macro::FanOut(d) => {
            let targets: Vec<String> = d.targets.iter().map(endpoint_text).collect();
            format!(" * @fanOut {} -> {}", endpoint_text(&d.source), targets.join(", "))
        }
        Macro::FanIn(d) => {
            let sources: Vec<String> = d.sources.iter().map(endpoint_text).collect();
            format!(" * @fanIn {} -> {}", sources.join(", "), endpoint_text(&d.target))
        }
        Macro::Coerce(d) => {
            let kind = match d.kind {
                flow_weaver_ast::CoercionKind::String => "string",
                flow_weaver_ast::CoercionKind::Number => "number",
                flow_weaver_ast::CoercionKind::Boolean => "boolean",
                flow_weaver_ast::CoercionKind::Json => "json",
                flow_weaver_ast::CoercionKind::Object => "object",
            };
            format!(" * @coerce {} {} -> {} as {kind}", d.id, endpoint_text(&d.source), endpoint_text(&d.target))
        }
    }
}

/// Renders the full workflow doc-comment block. `wf.macros` is first
/// reconciled: stale entries dropped, new sugar shapes detected, mirroring
/// what a fresh compile would do before regenerating (`spec.md §4.I`).
pub fn generate_workflow_doc(wf: &Workflow) -> String {
    let live_macros: Vec<Macro> = crate::coverage::retain_live_macros(&wf.macros, &wf.connections);
    let mut macros = live_macros;
    macros.extend(detect_sugar(&wf.connections, &macros));

    let covered: Vec<Connection> = macros.iter().flat_map(covered_connections).collect();

    let mut lines = vec!["/**".to_string()];
    lines.push(" * @flowWeaver workflow".to_string());
    if wf.options.strict_types {
        lines.push(" * @strictTypes".to_string());
    }
    if wf.options.auto_connect {
        lines.push(" * @autoConnect".to_string());
    }
    if let Some(trigger) = &wf.options.trigger {
        let mut attrs = Vec::new();
        if let Some(e) = &trigger.event {
            attrs.push(format!(r#"event="{e}""#));
        }
        if let Some(c) = &trigger.cron {
            attrs.push(format!(r#"cron="{c}""#));
        }
        lines.push(format!(" * @trigger {}", attrs.join(" ")));
    }
    if let Some(retries) = wf.options.retries {
        lines.push(format!(" * @retries {retries}"));
    }
    if let Some(timeout) = &wf.options.timeout {
        lines.push(format!(r#" * @timeout "{timeout}""#));
    }
    if wf.name != wf.function_name {
        lines.push(format!(" * @name {}", wf.name));
    }

    for inst in &wf.instances {
        if inst.is_root() && !is_synthetic_node_type(&inst.node_type) {
            lines.push(format!(" * @node {} {}", inst.id, inst.node_type));
        } else if !inst.is_root() && !is_synthetic_node_type(&inst.node_type) {
            let parent = inst.parent.as_ref().unwrap();
            lines.push(format!(" * @node {} {} {}.{}", inst.id, inst.node_type, parent.id, parent.scope));
        }
    }

    for m in &macros {
        lines.push(macro_line(m));
    }

    if let Some((x, y)) = wf.ui.start_position {
        lines.push(format!(" * @position {} {x} {y}", reserved::START_NODE));
    }
    if let Some((x, y)) = wf.ui.exit_position {
        lines.push(format!(" * @position {} {x} {y}", reserved::EXIT_NODE));
    }

    for c in &wf.connections {
        if covered.contains(c) {
            continue;
        }
        lines.push(format!(" * @connect {} -> {}", endpoint_text(&c.from), endpoint_text(&c.to)));
    }

    for (name, _) in &wf.start_ports {
        lines.push(format!(" * @param {name}"));
    }
    for (name, _) in &wf.exit_ports {
        lines.push(format!(" * @returns {name}"));
    }

    let map_covered_scopes: Vec<(String, String)> = macros
        .iter()
        .filter_map(|m| match m {
            Macro::Map(d) => Some((d.instance_id.clone(), "iterate".to_string())),
            _ => None,
        })
        .collect();
    for (key, children) in &wf.scopes {
        let Some((parent_id, scope_name)) = key.split_once('.') else { continue };
        if map_covered_scopes.iter().any(|(id, s)| id == parent_id && s == scope_name) {
            continue;
        }
        lines.push(format!(" * @scope {scope_name} {}", children.join(" ")));
    }

    lines.push(" */".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{Connection, Endpoint, NodeInstance};

    #[test]
    fn emits_node_lines_for_real_instances() {
        let mut wf = Workflow::new("Pipeline", "pipeline", "p.ts");
        wf.instances.push(NodeInstance::new("d", "double"));
        let doc = generate_workflow_doc(&wf);
        assert!(doc.contains("@node d double"));
    }

    #[test]
    fn skips_node_line_for_synthetic_instances() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("c1", "__fw_to_string__"));
        let doc = generate_workflow_doc(&wf);
        assert!(!doc.contains("@node c1"));
    }

    #[test]
    fn connect_line_omitted_when_covered_by_detected_fan_out() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("a", "split"));
        wf.instances.push(NodeInstance::new("b", "sink"));
        wf.instances.push(NodeInstance::new("c", "sink"));
        wf.connections.push(Connection::new(Endpoint::new("a", "out"), Endpoint::new("b", "in")));
        wf.connections.push(Connection::new(Endpoint::new("a", "out"), Endpoint::new("c", "in")));
        let doc = generate_workflow_doc(&wf);
        assert!(doc.contains("@fanOut"));
        assert!(!doc.contains("@connect"));
    }

    #[test]
    fn name_tag_only_when_it_differs() {
        let wf = Workflow::new("pipeline", "pipeline", "p.ts");
        assert!(!generate_workflow_doc(&wf).contains("@name"));
    }
}
