//! Sugar re-detection (`spec.md §4.I`): before emitting `@connect` lines,
//! scan the connections not already covered by a recorded macro for shapes
//! matching `@fanOut`/`@fanIn` (no scope on either endpoint) and materialize
//! matching macro records so regeneration prefers sugar over raw wiring.
//! `@path` chains are left as `@connect` lines here — the parser's own
//! `@path` macro only covers control-flow edges, and re-folding an
//! already-expanded chain back into a path step list without the route
//! metadata the user originally wrote risks losing information, so this
//! module only re-detects the two shapes that round-trip losslessly from
//! connections alone.

use std::collections::HashMap;

use flow_weaver_ast::{Connection, Endpoint, FanInMacroData, FanOutMacroData, Macro};

use crate::coverage::covered_connections;

/// Finds `@fanOut`/`@fanIn` shapes among `connections` that aren't already
/// covered by `existing_macros`, and returns the macros to add.
pub fn detect_sugar(connections: &[Connection], existing_macros: &[Macro]) -> Vec<Macro> {
    let covered: Vec<Connection> = existing_macros.iter().flat_map(covered_connections).collect();
    let uncovered: Vec<&Connection> = connections.iter().filter(|c| !covered.contains(c)).collect();

    let mut by_source: HashMap<&Endpoint, Vec<&Endpoint>> = HashMap::new();
    let mut by_target: HashMap<&Endpoint, Vec<&Endpoint>> = HashMap::new();
    for c in &uncovered {
        if c.from.scope.is_some() || c.to.scope.is_some() {
            continue;
        }
        by_source.entry(&c.from).or_default().push(&c.to);
        by_target.entry(&c.to).or_default().push(&c.from);
    }

    let mut detected = Vec::new();

    for (source, targets) in &by_source {
        if targets.len() > 1 {
            let mut targets: Vec<Endpoint> = targets.iter().map(|e| (*e).clone()).collect();
            targets.sort_by(|a, b| (a.node.as_str(), a.port.as_str()).cmp(&(b.node.as_str(), b.port.as_str())));
            detected.push(Macro::FanOut(FanOutMacroData { source: (*source).clone(), targets }));
        }
    }

    for (target, sources) in &by_target {
        if sources.len() > 1 {
            let mut sources: Vec<Endpoint> = sources.iter().map(|e| (*e).clone()).collect();
            sources.sort_by(|a, b| (a.node.as_str(), a.port.as_str()).cmp(&(b.node.as_str(), b.port.as_str())));
            detected.push(Macro::FanIn(FanInMacroData { sources, target: (*target).clone() }));
        }
    }

    detected
}
