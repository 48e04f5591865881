//! Static catalog of the builtin `__fw_to_*__` coercion node types
//! (`spec.md §4.F`). `flow_weaver_macros::expanders::expand_coerce` already
//! registers these lazily, instance by instance, the first time a `@coerce`
//! macro needs one; this module exists so a caller can list the full
//! catalog up front (tooling, docs) the way the teacher's `NodeRegistry`
//! lists every builtin task kind without having to run one first.

use flow_weaver_ast::{CoercionKind, NodeType, NodeVariant, PortDefinition, PortKind};

fn result_kind(kind: CoercionKind) -> PortKind {
    match kind {
        CoercionKind::String => PortKind::String,
        CoercionKind::Number => PortKind::Number,
        CoercionKind::Boolean => PortKind::Boolean,
        CoercionKind::Json => PortKind::String,
        CoercionKind::Object => PortKind::Object,
    }
}

/// Builds the `NodeType` for one coercion kind, matching
/// `expand_coerce`'s inline construction exactly.
pub fn coercion_node_type(kind: CoercionKind) -> NodeType {
    let mut nt = NodeType::new_expression(kind.node_type_name(), kind.node_type_name());
    nt.variant = NodeVariant::Coercion;
    nt.add_input("value", PortDefinition::new(PortKind::Any));
    nt.add_output("result", PortDefinition::new(result_kind(kind)));
    nt
}

/// All five builtin coercion node types, in declaration order.
pub fn all_coercion_node_types() -> Vec<NodeType> {
    [CoercionKind::String, CoercionKind::Number, CoercionKind::Boolean, CoercionKind::Json, CoercionKind::Object]
        .into_iter()
        .map(coercion_node_type)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_one_entry_per_kind() {
        assert_eq!(all_coercion_node_types().len(), 5);
    }

    #[test]
    fn names_match_the_dunder_convention() {
        let nt = coercion_node_type(CoercionKind::Number);
        assert_eq!(nt.name, "__fw_to_number__");
        assert!(nt.expression);
    }
}
