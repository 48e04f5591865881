//! Annotation regeneration (`spec.md §4.I`): turns a canonical AST back
//! into doc-comment text. The fidelity law this crate exists to uphold is
//! `parse(generate(W)) ≡ W` modulo transient source locations, generated
//! metadata, and synthetic macro re-ordering.

pub mod coverage;
pub mod node_doc;
pub mod sugar;
pub mod workflow_doc;

pub use node_doc::generate_node_type_doc;
pub use workflow_doc::generate_workflow_doc;

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{Connection, Endpoint, NodeInstance, NodeType, PortDefinition, PortKind, Workflow};

    #[test]
    fn full_workflow_doc_round_trips_shape_for_simple_pipeline() {
        let mut wf = Workflow::new("Pipeline", "pipeline", "p.ts");
        let mut double = NodeType::new_function("double", "double");
        double.add_input("x", PortDefinition::new(PortKind::Number));
        double.add_output("y", PortDefinition::new(PortKind::Number));
        wf.node_types.push(double);
        wf.instances.push(NodeInstance::new("d", "double"));
        wf.start_ports.push(("x".to_string(), PortDefinition::new(PortKind::Number)));
        wf.exit_ports.push(("result".to_string(), PortDefinition::new(PortKind::Number)));
        wf.connections.push(Connection::new(Endpoint::new("Start", "execute"), Endpoint::new("d", "execute")));
        wf.connections.push(Connection::new(Endpoint::new("Start", "x"), Endpoint::new("d", "x")));
        wf.connections.push(Connection::new(Endpoint::new("d", "onSuccess"), Endpoint::new("Exit", "result")));
        wf.connections.push(Connection::new(Endpoint::new("d", "y"), Endpoint::new("Exit", "result")));

        let doc = generate_workflow_doc(&wf);
        assert!(doc.starts_with("/**"));
        assert!(doc.trim_end().ends_with("*/"));
        assert!(doc.contains("@flowWeaver workflow"));
        assert!(doc.contains("@node d double"));
        assert!(doc.contains("@param x"));
        assert!(doc.contains("@returns result"));
    }
}
