//! Pre-lowering macro tag records, as collected by the doc-comment parser
//! before the expander runs (`spec.md §4.B`, §4.F).

use flow_weaver_ast::{CoercionKind, Endpoint};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPathStep {
    pub node: String,
    pub route: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPortRef {
    pub node: String,
    pub port: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMacroTag {
    /// `@map instanceId childId[(in -> out)] over source.port`
    Map {
        instance_id: String,
        child_id: String,
        child_in_port: Option<String>,
        child_out_port: Option<String>,
        source: Endpoint,
    },
    /// `@path s0 -> s1:route -> … -> sn`
    Path { steps: Vec<RawPathStep> },
    /// `@fanOut src.port -> t1[.p], t2[.p]`
    FanOut { source: RawPortRef, targets: Vec<RawPortRef> },
    /// `@fanIn s1[.p], s2[.p] -> tgt.port`
    FanIn { sources: Vec<RawPortRef>, target: RawPortRef },
    /// `@coerce id src.p -> tgt.p as <kind>`
    Coerce { id: String, source: RawPortRef, target: RawPortRef, kind: CoercionKind },
}
