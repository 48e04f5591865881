//! Node-type construction (`spec.md §4.D`): merges annotated ports with
//! signature-inferred ports.

use flow_weaver_ast::{NodeType, PortDefinition, PortKind};
use flow_weaver_source::{infer_port_kind, HostSourceOracle};

use crate::port_order::assign_port_order;
use crate::tags::{PortTag, Tag};

/// Builds a `NodeType` from the tags of a single node-type doc block, using
/// `oracle` to resolve ports that lack an explicit `@input`/`@output`
/// attribute (`spec.md §4.D`).
pub fn build_node_type(function_name: &str, tags: &[Tag], oracle: &dyn HostSourceOracle) -> NodeType {
    let is_expression = tags.iter().any(|t| matches!(t, Tag::Expression));
    let name = tags
        .iter()
        .find_map(|t| if let Tag::Name(n) = t { Some(n.clone()) } else { None })
        .unwrap_or_else(|| function_name.to_string());

    let mut node_type = if is_expression {
        NodeType::new_expression(name, function_name)
    } else {
        NodeType::new_function(name, function_name)
    };

    for t in tags {
        match t {
            Tag::Label(v) => node_type.label = Some(v.clone()),
            Tag::Description(v) => node_type.description = Some(v.clone()),
            Tag::Color(v) => node_type.visuals.color = Some(v.clone()),
            Tag::Icon(v) => node_type.visuals.icon = Some(v.clone()),
            Tag::TagLabel(v) => node_type.visuals.tags.push(v.clone()),
            Tag::ExecuteWhen(expr) => {
                node_type.execute_when = if expr == "DISJUNCTION" || expr == "OR" {
                    flow_weaver_ast::ExecuteWhen::Disjunction
                } else if expr == "CONJUNCTION" || expr == "AND" {
                    flow_weaver_ast::ExecuteWhen::Conjunction
                } else {
                    flow_weaver_ast::ExecuteWhen::Custom { expression: expr.clone() }
                };
            }
            Tag::Scope(s) => {
                node_type.scopes.get_or_insert_with(Vec::new).push(s.name.clone());
            }
            _ => {}
        }
    }

    let explicit_inputs: Vec<&PortTag> = tags.iter().filter_map(|t| if let Tag::Input(p) = t { Some(p) } else { None }).collect();
    let explicit_outputs: Vec<&PortTag> = tags.iter().filter_map(|t| if let Tag::Output(p) = t { Some(p) } else { None }).collect();

    if !explicit_inputs.is_empty() || !explicit_outputs.is_empty() {
        for p in &explicit_inputs {
            node_type.add_input(&p.name, build_port_from_tag(p, oracle, function_name, true));
        }
        for p in &explicit_outputs {
            node_type.add_output(&p.name, build_port_from_tag(p, oracle, function_name, false));
        }
    } else if is_expression {
        for param in oracle.parameters(function_name) {
            node_type.add_input(&param.name, PortDefinition::new(infer_port_kind(&param.type_text)).optional_if(param.optional));
        }
        for field in oracle.return_object_fields(function_name) {
            node_type.add_output(&field.name, PortDefinition::new(infer_port_kind(&field.type_text)));
        }
    } else {
        for param in oracle.parameters(function_name) {
            if param.name == "execute" {
                continue;
            }
            node_type.add_input(&param.name, PortDefinition::new(infer_port_kind(&param.type_text)).optional_if(param.optional));
        }
        for field in oracle.return_object_fields(function_name) {
            node_type.add_output(&field.name, PortDefinition::new(infer_port_kind(&field.type_text)));
        }
    }

    assign_port_order(&mut node_type.inputs, |n| n == "execute");
    assign_port_order(&mut node_type.outputs, |n| n == "onSuccess" || n == "onFailure");

    node_type
}

fn build_port_from_tag(tag: &PortTag, oracle: &dyn HostSourceOracle, function_name: &str, is_input: bool) -> PortDefinition {
    let kind = if let Some(scope) = &tag.attrs.scope {
        let resolved = if is_input {
            oracle.callback_return_field_type(scope, &tag.name)
        } else {
            oracle.callback_param_type(scope, &tag.name)
        };
        resolved.map(|t| infer_port_kind(&t))
    } else {
        None
    }
    .or_else(|| {
        let sig_type = if is_input {
            oracle.parameters(function_name).into_iter().find(|p| p.name == tag.name).map(|p| p.type_text)
        } else {
            oracle.return_object_fields(function_name).into_iter().find(|f| f.name == tag.name).map(|f| f.type_text)
        };
        sig_type.map(|t| infer_port_kind(&t))
    })
    .unwrap_or(PortKind::Any);

    let mut port = PortDefinition::new(kind);
    port.order = tag.attrs.order;
    port.placement = tag.attrs.placement;
    port.scope = tag.attrs.scope.clone();
    if let Some(d) = &tag.default {
        port.default = Some(serde_json::Value::String(d.clone()));
    }
    if let Some(desc) = &tag.description {
        if let Some(expr) = desc.strip_prefix("Expression:") {
            port.expression = Some(expr.trim().to_string());
        } else {
            port.label = Some(desc.clone());
        }
    }
    port
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
    fn infers_ports_from_signature_when_no_explicit_ports() {
        let mut oracle = LightweightOracle::new();
        oracle.scan("function double(x: number): number { return x * 2; }");
        let nt = build_node_type("double", &[], &oracle);
        assert!(nt.find_input("x").is_some());
        assert!(nt.find_input("execute").is_some());
    }

    #[test]
    fn expression_variant_omits_execute() {
        let mut oracle = LightweightOracle::new();
        oracle.scan("function double(x: number): number { return x * 2; }");
        let nt = build_node_type("double", &[Tag::Expression], &oracle);
        assert!(nt.find_input("execute").is_none());
        assert!(nt.find_input("x").is_some());
    }

    #[test]
    fn explicit_input_tag_overrides_inference() {
        let mut oracle = LightweightOracle::new();
        oracle.scan("function greet(name: string): string { return name; }");
        let tag = Tag::Input(PortTag { name: "name".to_string(), default: None, attrs: Default::default(), description: None });
        let nt = build_node_type("greet", &[tag], &oracle);
        // explicit-ports path replaces inference entirely; only "name" plus mandatory triad present
        assert!(nt.find_input("name").is_some());
    }
}
