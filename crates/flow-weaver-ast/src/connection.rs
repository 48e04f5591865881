//! `Connection`: an edge between two node-instance ports.

use serde::{Deserialize, Serialize};

/// One endpoint of a `Connection`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub node: String,
    pub port: String,
    /// When set, names the scope this endpoint's edge participates in;
    /// must match the other endpoint's `scope` exactly (`spec.md §3`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Endpoint {
    pub fn new(node: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            port: port.into(),
            scope: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub from: Endpoint,
    pub to: Endpoint,
}

impl Connection {
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self { from, to }
    }

    /// Whether this connection carries control flow (its source port is one
    /// of the STEP outputs, per `spec.md §4.H` — this is a naming
    /// convention check; kind-correctness is validated separately).
    pub fn is_step_by_name(&self) -> bool {
        matches!(self.from.port.as_str(), "onSuccess" | "onFailure" | "start")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_must_match_to_be_well_formed() {
        let c = Connection::new(
            Endpoint::new("loop", "item").with_scope("iterate"),
            Endpoint::new("child", "item").with_scope("iterate"),
        );
        assert_eq!(c.from.scope, c.to.scope);
    }
}
