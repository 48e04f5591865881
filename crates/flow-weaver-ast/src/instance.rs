//! `NodeInstance`: a placement of a `NodeType` inside a workflow or pattern.

use serde::{Deserialize, Serialize};

/// Where a `NodeInstance` is parented — either the graph root, or a named
/// scope on another instance (see the scope model in `spec.md §3`/§4.H).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceParent {
    pub id: String,
    pub scope: String,
}

/// Per-port overrides an instance may carry, layered over the `NodeType`'s
/// declared `PortDefinition` at codegen/regeneration time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortConfig {
    pub port_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<crate::port::PortDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub port_configs: Vec<PortConfig>,
    /// A STEP input marked `pullExecution` is lazily invoked before the node
    /// runs (`spec.md §4.H`), enabling data-dependent re-triggering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_execution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub minimized: bool,
}

impl InstanceConfig {
    pub fn port_config(&self, port_name: &str) -> Option<&PortConfig> {
        self.port_configs.iter().find(|c| c.port_name == port_name)
    }
}

/// A placement of a `NodeType` inside a `Workflow`/`Pattern`.
///
/// `id` is unique within the owning graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInstance {
    pub id: String,
    /// Name of the `NodeType` this instance places.
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<InstanceParent>,
    #[serde(default)]
    pub config: InstanceConfig,
}

impl NodeInstance {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            parent: None,
            config: InstanceConfig::default(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>, scope: impl Into<String>) -> Self {
        self.parent = Some(InstanceParent {
            id: parent_id.into(),
            scope: scope.into(),
        });
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_instance_has_no_parent() {
        let n = NodeInstance::new("a", "double");
        assert!(n.is_root());
    }

    #[test]
    fn scoped_instance_records_parent_and_scope() {
        let n = NodeInstance::new("child", "doubleValue").with_parent("loop", "iterate");
        assert!(!n.is_root());
        assert_eq!(n.parent.as_ref().unwrap().scope, "iterate");
    }
}
