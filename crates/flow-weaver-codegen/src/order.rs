//! Execution order (`spec.md §4.H`): builds the control-flow graph from
//! STEP edges targeting `execute` and runs Kahn's algorithm over it. Nodes
//! with no control predecessors other than `Start` execute in declaration
//! order with a stable tie-break on `id`; nodes that become ready in the
//! same pass are grouped into one stage, which the frame emitter renders as
//! parallel sibling sequences when the workflow is async (`spec.md §5`).

use std::collections::{HashMap, HashSet};

use flow_weaver_ast::{reserved, GraphLike, Workflow};

use crate::error::{CodegenError, Result};

/// One layer of the topological order: instances with no unresolved control
/// predecessor remaining once every earlier stage has "run".
pub type Stage = Vec<String>;

/// Computes the staged execution order for every real instance in `wf`
/// (`Start`/`Exit` are boundary pseudo-nodes, never scheduled themselves).
pub fn execution_stages(wf: &Workflow) -> Result<Vec<Stage>> {
    let root_ids: HashSet<&str> = wf.instances.iter().filter(|i| i.is_root()).map(|i| i.id.as_str()).collect();

    let control_edges: Vec<(&str, &str)> = wf
        .connections
        .iter()
        .filter(|c| c.from.scope.is_none() && c.to.scope.is_none())
        .filter(|c| c.to.port == reserved::EXECUTE)
        .map(|c| (c.from.node.as_str(), c.to.node.as_str()))
        .collect();

    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();

    for id in &root_ids {
        in_degree.entry(id).or_insert(0);
    }
    for (from, to) in &control_edges {
        if *from == reserved::START_NODE || !root_ids.contains(to) {
            continue;
        }
        *in_degree.entry(to).or_insert(0) += 1;
        if root_ids.contains(from) {
            adjacency.entry(from).or_default().push(to);
        }
    }

    let mut stages = Vec::new();
    let mut scheduled: HashSet<&str> = HashSet::new();

    while scheduled.len() < root_ids.len() {
        let mut ready: Vec<&str> = in_degree
            .iter()
            .filter(|(id, deg)| !scheduled.contains(*id) && **deg == 0)
            .map(|(id, _)| *id)
            .collect();

        if ready.is_empty() {
            let remaining: Vec<String> =
                root_ids.iter().map(|id| id.to_string()).filter(|id| !scheduled.contains(id.as_str())).collect();
            return Err(CodegenError::CycleAfterExpansion(remaining));
        }

        ready.sort_unstable();

        for id in &ready {
            scheduled.insert(id);
            if let Some(targets) = adjacency.get(id) {
                for t in targets {
                    if let Some(deg) = in_degree.get_mut(t) {
                        *deg = deg.saturating_sub(1);
                    }
                }
            }
        }

        stages.push(ready.into_iter().map(String::from).collect());
    }

    Ok(stages)
}

/// Flattened declaration-order view of [`execution_stages`], used where the
/// caller doesn't care about parallel grouping (e.g. synchronous workflows).
pub fn flat_execution_order(wf: &Workflow) -> Result<Vec<String>> {
    Ok(execution_stages(wf)?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{Connection, Endpoint, NodeInstance};

    #[test]
    fn linear_chain_orders_by_dependency() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("b", "t"));
        wf.instances.push(NodeInstance::new("a", "t"));
        wf.connections.push(Connection::new(Endpoint::new("a", "onSuccess"), Endpoint::new("b", "execute")));
        wf.connections.push(Connection::new(Endpoint::new("Start", "execute"), Endpoint::new("a", "execute")));

        let order = flat_execution_order(&wf).unwrap();
        assert_eq!(order, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn independent_branches_share_a_stage() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("a", "t"));
        wf.instances.push(NodeInstance::new("b", "t"));
        wf.connections.push(Connection::new(Endpoint::new("Start", "execute"), Endpoint::new("a", "execute")));
        wf.connections.push(Connection::new(Endpoint::new("Start", "execute"), Endpoint::new("b", "execute")));

        let stages = execution_stages(&wf).unwrap();
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0], vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn cycle_is_reported() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("a", "t"));
        wf.instances.push(NodeInstance::new("b", "t"));
        wf.connections.push(Connection::new(Endpoint::new("a", "onSuccess"), Endpoint::new("b", "execute")));
        wf.connections.push(Connection::new(Endpoint::new("b", "onSuccess"), Endpoint::new("a", "execute")));

        let err = flat_execution_order(&wf).unwrap_err();
        assert!(matches!(err, CodegenError::CycleAfterExpansion(_)));
    }
}
