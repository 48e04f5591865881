//! Connectivity checks (`spec.md §4.G`): reachability from `Start`, arrival
//! at `Exit`, orphaned nodes/ports, and control-flow cycles. Cycle detection
//! is Kahn's algorithm over the instance subgraph, grounded on the teacher's
//! `detect_cycles`.

use std::collections::{HashMap, HashSet, VecDeque};

use flow_weaver_ast::{reserved, GraphLike, Workflow};
use flow_weaver_diagnostics::{Diagnostic, DiagnosticCode};

pub fn check(wf: &Workflow, out: &mut Vec<Diagnostic>) {
    let strict = wf.options.strict_types;

    if !wf.connections.iter().any(|c| c.from.node == reserved::START_NODE) {
        out.push(Diagnostic::new(DiagnosticCode::NoStartConnections, "Start has no outgoing connections", strict));
    }
    if !wf.connections.iter().any(|c| c.to.node == reserved::EXIT_NODE) {
        out.push(Diagnostic::new(DiagnosticCode::NoExitConnections, "no connection reaches Exit", strict));
    }

    for inst in &wf.instances {
        if wf.incoming(&inst.id).is_empty() && wf.outgoing(&inst.id).is_empty() {
            out.push(Diagnostic::new(DiagnosticCode::UnusedNode, format!("node '{}' has no connections", inst.id), strict).with_node(&inst.id));
        }
    }

    for inst in &wf.instances {
        let Some(nt) = wf.find_node_type(&inst.node_type) else { continue };
        for (port_name, _) in &nt.outputs {
            let used = wf.connections.iter().any(|c| c.from.node == inst.id && c.from.port == *port_name);
            if !used {
                out.push(
                    Diagnostic::new(DiagnosticCode::UnusedOutputPort, format!("node '{}' never uses output '{port_name}'", inst.id), strict)
                        .with_node(&inst.id),
                );
            }
        }
    }

    let mut exit_targets: HashMap<&str, u32> = HashMap::new();
    let mut input_targets: HashMap<(&str, &str), u32> = HashMap::new();
    for c in &wf.connections {
        if c.to.node == reserved::EXIT_NODE {
            *exit_targets.entry(c.to.port.as_str()).or_insert(0) += 1;
        } else if c.to.port != reserved::EXECUTE {
            *input_targets.entry((c.to.node.as_str(), c.to.port.as_str())).or_insert(0) += 1;
        }
    }
    for (port, count) in exit_targets {
        if count > 1 {
            out.push(Diagnostic::new(DiagnosticCode::MultipleExitConnections, format!("Exit.{port} receives {count} connections"), strict));
        }
    }
    for ((node, port), count) in input_targets {
        if count > 1 {
            out.push(
                Diagnostic::new(DiagnosticCode::MultipleConnectionsToInput, format!("'{node}'.{port} receives {count} connections"), strict)
                    .with_node(node),
            );
        }
    }

    if has_cycle(wf) {
        out.push(Diagnostic::new(DiagnosticCode::CycleDetected, "control-flow graph contains a cycle", strict));
    }
}

/// Kahn's algorithm over the instance subgraph (`spec.md §4.G`). Edges
/// touching the `Start`/`Exit` pseudo-nodes are boundary edges, not part of
/// the cycle among real instances. Only control-flow edges (targeting
/// `execute`) count, and scoped edges (a `@map`/scope's parent<->child
/// wiring) are excluded entirely — they form a deliberate 2-cycle between
/// an instance and its own children that isn't a real cycle, matching
/// `codegen::order::execution_stages`'s filter.
fn has_cycle(wf: &Workflow) -> bool {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    for inst in &wf.instances {
        in_degree.insert(inst.id.as_str(), 0);
    }
    let instance_ids: HashSet<&str> = in_degree.keys().copied().collect();

    let control_edges: Vec<(&str, &str)> = wf
        .connections
        .iter()
        .filter(|c| c.from.scope.is_none() && c.to.scope.is_none())
        .filter(|c| c.to.port == reserved::EXECUTE)
        .filter(|c| instance_ids.contains(c.from.node.as_str()) && instance_ids.contains(c.to.node.as_str()))
        .map(|c| (c.from.node.as_str(), c.to.node.as_str()))
        .collect();

    for (_, to) in &control_edges {
        *in_degree.entry(to).or_insert(0) += 1;
    }

    let mut queue: VecDeque<&str> = in_degree.iter().filter(|(_, &deg)| deg == 0).map(|(&id, _)| id).collect();
    let mut visited = 0;
    while let Some(node_id) = queue.pop_front() {
        visited += 1;
        for (from, to) in &control_edges {
            if *from == node_id {
                if let Some(deg) = in_degree.get_mut(to) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(to);
                    }
                }
            }
        }
    }

    visited < wf.instances.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{Connection, Endpoint, NodeInstance};

    #[test]
    fn detects_cycle_among_instances() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("a", "t"));
        wf.instances.push(NodeInstance::new("b", "t"));
        wf.connections.push(Connection::new(Endpoint::new("a", "onSuccess"), Endpoint::new("b", "execute")));
        wf.connections.push(Connection::new(Endpoint::new("b", "onSuccess"), Endpoint::new("a", "execute")));
        assert!(has_cycle(&wf));
    }

    #[test]
    fn linear_chain_has_no_cycle() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("a", "t"));
        wf.instances.push(NodeInstance::new("b", "t"));
        wf.connections.push(Connection::new(Endpoint::new("a", "onSuccess"), Endpoint::new("b", "execute")));
        assert!(!has_cycle(&wf));
    }

    #[test]
    fn flags_missing_start_and_exit_connections() {
        let wf = Workflow::new("W", "w", "w.ts");
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::NoStartConnections));
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::NoExitConnections));
    }

    #[test]
    fn flags_duplicate_input_connections() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("a", "t"));
        wf.instances.push(NodeInstance::new("b", "t"));
        wf.connections.push(Connection::new(Endpoint::new("a", "out"), Endpoint::new("b", "in")));
        wf.connections.push(Connection::new(Endpoint::new("Start", "execute"), Endpoint::new("b", "in")));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::MultipleConnectionsToInput));
    }
}
