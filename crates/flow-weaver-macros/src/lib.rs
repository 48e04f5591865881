//! Sugar macro expander.
//!
//! Lowers `@map`, `@path`, `@fanOut`, `@fanIn`, `@coerce` and `@autoConnect`
//! into the canonical instance/connection/scope form the validator and
//! generator operate on (`spec.md §4.F`).

pub mod error;
pub mod expanders;
pub mod raw;

pub use error::{MacroError, Result};
pub use expanders::{expand_all, expand_auto_connect};
pub use raw::{RawMacroTag, RawPathStep, RawPortRef};

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{CoercionKind, Endpoint, NodeInstance, NodeType, PortDefinition, PortKind, Workflow};

    fn doubler_workflow() -> Workflow {
        let mut wf = Workflow::new("Loop", "loop", "loop.ts");
        let mut child = NodeType::new_function("doubleValue", "doubleValue");
        child.add_input("item", PortDefinition::new(PortKind::Number));
        child.add_output("doubled", PortDefinition::new(PortKind::Number));
        wf.node_types.push(child);
        wf.instances.push(NodeInstance::new("loop", "__placeholder__"));
        wf.instances.push(NodeInstance::new("child", "doubleValue"));
        wf.start_ports.push(("items".to_string(), PortDefinition::new(PortKind::Array)));
        wf
    }

    #[test]
    fn map_expansion_produces_six_canonical_edges() {
        let mut wf = doubler_workflow();
        let tags = vec![RawMacroTag::Map {
            instance_id: "loop".to_string(),
            child_id: "child".to_string(),
            child_in_port: None,
            child_out_port: None,
            source: Endpoint::new("Start", "items"),
        }];
        expand_all(&mut wf, tags).unwrap();
        assert_eq!(wf.connections.len(), 6);
        assert_eq!(wf.scope_children("loop", "iterate"), Some(&["child".to_string()][..]));
        assert_eq!(wf.macros.len(), 1);
    }

    #[test]
    fn map_expansion_is_idempotent_on_replay() {
        let mut wf = doubler_workflow();
        let make_tag = || RawMacroTag::Map {
            instance_id: "loop".to_string(),
            child_id: "child".to_string(),
            child_in_port: None,
            child_out_port: None,
            source: Endpoint::new("Start", "items"),
        };
        expand_all(&mut wf, vec![make_tag()]).unwrap();
        let connections_after_first = wf.connections.len();
        expand_all(&mut wf, vec![make_tag()]).unwrap();
        assert_eq!(wf.connections.len(), connections_after_first, "replaying @map must not duplicate edges");
    }

    #[test]
    fn path_with_single_step_is_an_error() {
        let mut wf = Workflow::new("X", "x", "x.ts");
        let err = expand_all(&mut wf, vec![RawMacroTag::Path { steps: vec![crate::raw::RawPathStep { node: "Start".into(), route: None }] }])
            .unwrap_err();
        assert_eq!(err, MacroError::PathTooShort(1));
    }

    #[test]
    fn coerce_inserts_synthetic_instance_and_type() {
        let mut wf = Workflow::new("X", "x", "x.ts");
        wf.instances.push(NodeInstance::new("a", "t"));
        wf.instances.push(NodeInstance::new("b", "t"));
        expand_all(
            &mut wf,
            vec![RawMacroTag::Coerce {
                id: "c1".to_string(),
                source: crate::raw::RawPortRef { node: "a".to_string(), port: Some("out".to_string()) },
                target: crate::raw::RawPortRef { node: "b".to_string(), port: Some("in".to_string()) },
                kind: CoercionKind::String,
            }],
        )
        .unwrap();
        assert!(wf.find_node_type("__fw_to_string__").is_some());
        assert!(wf.instances.iter().any(|i| i.id == "c1"));
        assert_eq!(wf.connections.len(), 2);
    }
}
