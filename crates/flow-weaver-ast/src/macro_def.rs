//! `Macro`: the data record a sugar annotation lowers to, kept on the
//! `Workflow` so the regenerator (`spec.md §4.I`) can re-emit sugar instead
//! of raw connections, and so the expander (`spec.md §4.F`) can detect when
//! an expansion no longer holds.

use serde::{Deserialize, Serialize};

use crate::connection::Endpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionKind {
    String,
    Number,
    Boolean,
    Json,
    Object,
}

impl CoercionKind {
    /// The synthetic node-type name this coercion lowers to, e.g.
    /// `__fw_to_string__` (`spec.md §4.F`).
    pub fn node_type_name(&self) -> &'static str {
        match self {
            CoercionKind::String => "__fw_to_string__",
            CoercionKind::Number => "__fw_to_number__",
            CoercionKind::Boolean => "__fw_to_boolean__",
            CoercionKind::Json => "__fw_to_json__",
            CoercionKind::Object => "__fw_to_object__",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "json" => Some(Self::Json),
            "object" => Some(Self::Object),
            _ => None,
        }
    }
}

/// One hop of a `@path` chain: the step node and the route taken out of it
/// (default `ok` → `onSuccess`, per `spec.md §4.F`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

impl PathStep {
    pub fn new(node: impl Into<String>) -> Self {
        Self { node: node.into(), route: None }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMacroData {
    pub instance_id: String,
    pub child_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_in_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_out_port: Option<String>,
    pub source: Endpoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMacroData {
    pub steps: Vec<PathStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutMacroData {
    pub source: Endpoint,
    pub targets: Vec<Endpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanInMacroData {
    pub sources: Vec<Endpoint>,
    pub target: Endpoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoerceMacroData {
    pub id: String,
    pub source: Endpoint,
    pub target: Endpoint,
    pub kind: CoercionKind,
}

/// Tagged union of the five sugar macros (`spec.md §3`, §4.F).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Macro {
    Map(MapMacroData),
    Path(PathMacroData),
    FanOut(FanOutMacroData),
    FanIn(FanInMacroData),
    Coerce(CoerceMacroData),
}

impl Macro {
    /// A stable short label, used in logs and in the annotation regenerator
    /// when reporting which macro covers a given connection.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Macro::Map(_) => "map",
            Macro::Path(_) => "path",
            Macro::FanOut(_) => "fanOut",
            Macro::FanIn(_) => "fanIn",
            Macro::Coerce(_) => "coerce",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_kind_round_trips_by_name() {
        for kind in [
            CoercionKind::String,
            CoercionKind::Number,
            CoercionKind::Boolean,
            CoercionKind::Json,
            CoercionKind::Object,
        ] {
            let name = match kind {
                CoercionKind::String => "string",
                CoercionKind::Number => "number",
                CoercionKind::Boolean => "boolean",
                CoercionKind::Json => "json",
                CoercionKind::Object => "object",
            };
            assert_eq!(CoercionKind::from_name(name), Some(kind));
        }
    }

    #[test]
    fn coercion_node_type_name_is_dunder_wrapped() {
        assert_eq!(CoercionKind::String.node_type_name(), "__fw_to_string__");
    }
}
