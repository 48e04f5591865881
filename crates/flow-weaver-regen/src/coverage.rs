//! Macro coverage (`spec.md §4.I`): reconstructs the canonical connections a
//! `Macro` record lowers to, the way `flow-weaver-macros::expanders` built
//! them. Used to (a) skip macro-covered connections when emitting
//! `@connect` lines and (b) drop a macro whose canonical connections no
//! longer all exist on the graph (stale-macro filtering).

use flow_weaver_ast::{reserved, Connection, Endpoint, Macro};

/// The connections `m` is responsible for, in the same order the expander
/// created them.
pub fn covered_connections(m: &Macro) -> Vec<Connection> {
    match m {
        Macro::Map(d) => {
            let in_port = d.child_in_port.as_deref().unwrap_or("");
            let out_port = d.child_out_port.as_deref().unwrap_or("");
            vec![
                Connection::new(d.source.clone(), Endpoint::new(&d.instance_id, "items")),
                Connection::new(
                    Endpoint::new(&d.instance_id, "start").with_scope("iterate"),
                    Endpoint::new(&d.child_id, reserved::EXECUTE).with_scope("iterate"),
                ),
                Connection::new(
                    Endpoint::new(&d.instance_id, "item").with_scope("iterate"),
                    Endpoint::new(&d.child_id, in_port).with_scope("iterate"),
                ),
                Connection::new(
                    Endpoint::new(&d.child_id, out_port).with_scope("iterate"),
                    Endpoint::new(&d.instance_id, "processed").with_scope("iterate"),
                ),
                Connection::new(
                    Endpoint::new(&d.child_id, reserved::ON_SUCCESS).with_scope("iterate"),
                    Endpoint::new(&d.instance_id, "success").with_scope("iterate"),
                ),
                Connection::new(
                    Endpoint::new(&d.child_id, reserved::ON_FAILURE).with_scope("iterate"),
                    Endpoint::new(&d.instance_id, "failure").with_scope("iterate"),
                ),
            ]
        }
        Macro::Path(d) => d
            .steps
            .windows(2)
            .map(|w| {
                let route = w[0].route.clone().unwrap_or_else(|| "ok".to_string());
                let from_port = match route.as_str() {
                    "fail" => reserved::ON_FAILURE,
                    _ => reserved::ON_SUCCESS,
                };
                let from_port = if w[0].node == reserved::START_NODE { reserved::EXECUTE } else { from_port };
                Connection::new(Endpoint::new(&w[0].node, from_port), Endpoint::new(&w[1].node, reserved::EXECUTE))
            })
            .collect(),
        Macro::FanOut(d) => d.targets.iter().map(|t| Connection::new(d.source.clone(), t.clone())).collect(),
        Macro::FanIn(d) => d.sources.iter().map(|s| Connection::new(s.clone(), d.target.clone())).collect(),
        Macro::Coerce(d) => vec![
            Connection::new(d.source.clone(), Endpoint::new(&d.id, "value")),
            Connection::new(Endpoint::new(&d.id, "result"), d.target.clone()),
        ],
    }
}

/// Drops macros whose canonical connections no longer all exist on `all`
/// (`spec.md §4.I`: "stale-macro filtering").
pub fn retain_live_macros(macros: &[Macro], all: &[Connection]) -> Vec<Macro> {
    macros
        .iter()
        .filter(|m| covered_connections(m).iter().all(|c| all.contains(c)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{CoerceMacroData, CoercionKind};

    #[test]
    fn stale_coerce_macro_is_dropped() {
        let m = Macro::Coerce(CoerceMacroData {
            id: "c1".to_string(),
            source: Endpoint::new("a", "out"),
            target: Endpoint::new("b", "in"),
            kind: CoercionKind::String,
        });
        let live = retain_live_macros(&[m], &[]);
        assert!(live.is_empty());
    }

    #[test]
    fn live_coerce_macro_is_kept() {
        let m = Macro::Coerce(CoerceMacroData {
            id: "c1".to_string(),
            source: Endpoint::new("a", "out"),
            target: Endpoint::new("b", "in"),
            kind: CoercionKind::String,
        });
        let conns = covered_connections(&m);
        let live = retain_live_macros(&[m], &conns);
        assert_eq!(live.len(), 1);
    }
}
