//! Node-type doc-block regeneration (`spec.md §4.I`). Emits a complete
//! `/** ... */` block, or returns `function_text` verbatim when the
//! `NodeType` carries one (round-trip of hand-authored source).

use flow_weaver_ast::{ExecuteWhen, NodeType, PortDefinition};

fn port_line(tag: &str, name: &str, port: &PortDefinition) -> String {
    let mut line = format!(" * @{tag} {name}");
    if let Some(default) = &port.default {
        let rendered = match default {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        line.push_str(&format!("={rendered}"));
    }
    if let Some(scope) = &port.scope {
        line.push_str(&format!(" scope:{scope}"));
    }
    if let Some(order) = port.order {
        line.push_str(&format!(" [order:{order}]"));
    }
    if let Some(placement) = port.placement {
        let p = match placement {
            flow_weaver_ast::Placement::Top => "TOP",
            flow_weaver_ast::Placement::Bottom => "BOTTOM",
        };
        line.push_str(&format!(" [placement:{p}]"));
    }
    if let Some(expr) = &port.expression {
        line.push_str(&format!(" - Expression: {expr}"));
    } else if let Some(label) = &port.label {
        line.push_str(&format!(" - {label}"));
    }
    line
}

/// Renders the full doc-comment block for `nt`. Falls back to the
/// preserved `function_text` when present, since that already contains the
/// user's original comment verbatim.
pub fn generate_node_type_doc(nt: &NodeType) -> String {
    if let Some(text) = &nt.function_text {
        return text.clone();
    }

    let mut lines = vec!["/**".to_string()];
    if let Some(desc) = &nt.description {
        lines.push(format!(" * {desc}"));
    }
    lines.push(" * @flowWeaver nodeType".to_string());
    if nt.name != nt.function_name {
        lines.push(format!(" * @name {}", nt.name));
    }
    if let Some(label) = &nt.label {
        lines.push(format!(" * @label \"{label}\""));
    }
    if let Some(color) = &nt.visuals.color {
        lines.push(format!(" * @color \"{color}\""));
    }
    if let Some(icon) = &nt.visuals.icon {
        lines.push(format!(" * @icon \"{icon}\""));
    }
    for tag in &nt.visuals.tags {
        lines.push(format!(" * @tag \"{tag}\""));
    }
    if nt.expression {
        lines.push(" * @expression".to_string());
    }
    match &nt.execute_when {
        ExecuteWhen::Conjunction => {}
        ExecuteWhen::Disjunction => lines.push(" * @executeWhen DISJUNCTION".to_string()),
        ExecuteWhen::Custom { expression } => lines.push(format!(" * @executeWhen {expression}")),
    }
    for scope in nt.scopes.iter().flatten() {
        lines.push(format!(" * @scope {scope}"));
    }
    for (name, port) in &nt.inputs {
        if name == "execute" && port.is_control_flow {
            continue;
        }
        lines.push(port_line("input", name, port));
    }
    for (name, port) in &nt.outputs {
        if (name == "onSuccess" || name == "onFailure") && port.is_control_flow {
            continue;
        }
        lines.push(port_line("output", name, port));
    }
    lines.push(" */".to_string());
    lines.join("\n")
}
