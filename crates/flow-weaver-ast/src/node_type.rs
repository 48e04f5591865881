//! `NodeType`: the template describing a callable's ports (`spec.md §3`).

use serde::{Deserialize, Serialize};

use crate::port::PortDefinition;
use crate::port::ExecuteWhen;

/// The flavor of a `NodeType`, mirroring the teacher's duck-typed
/// node-kind union (functions vs imported workflows vs synthetic map
/// iterators vs coercions vs stubs), modeled here as a tagged union with
/// per-variant invariants checked at construction (`spec.md §9`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeVariant {
    Function,
    ImportedWorkflow,
    MapIterator,
    Coercion,
    Stub,
}

/// A source location used for diagnostics and round-trip bookkeeping.
///
/// Transient: excluded from the round-trip equality law in `spec.md §4.I`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeVisuals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Template describing a callable with typed input and output ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeType {
    /// Defaults to `function_name` when not explicitly given.
    pub name: String,
    pub function_name: String,
    pub variant: NodeVariant,
    pub inputs: Vec<(String, PortDefinition)>,
    pub outputs: Vec<(String, PortDefinition)>,
    pub has_success_port: bool,
    pub has_failure_port: bool,
    pub is_async: bool,
    pub execute_when: ExecuteWhen,
    /// Pure-function flavor without an `execute` parameter.
    pub expression: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_source: Option<String>,
    /// Verbatim source used for round-trip of user-authored nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_text: Option<String>,
    #[serde(default)]
    pub source_location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub visuals: NodeVisuals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_config: Option<serde_json::Value>,
}

impl NodeType {
    /// Build the skeleton of a non-expression `NodeType` with its mandatory
    /// control-flow triad already in place (`spec.md §3` invariant): an
    /// `execute:STEP` input and `onSuccess`/`onFailure:STEP` outputs.
    pub fn new_function(name: impl Into<String>, function_name: impl Into<String>) -> Self {
        let function_name = function_name.into();
        let name = name.into();
        let mut nt = Self {
            name,
            function_name,
            variant: NodeVariant::Function,
            inputs: Vec::new(),
            outputs: Vec::new(),
            has_success_port: true,
            has_failure_port: true,
            is_async: false,
            execute_when: ExecuteWhen::Conjunction,
            expression: false,
            scope: None,
            scopes: None,
            import_source: None,
            function_text: None,
            source_location: SourceLocation::default(),
            label: None,
            description: None,
            visuals: NodeVisuals::default(),
            default_config: None,
        };
        nt.inputs.push(("execute".to_string(), PortDefinition::execute()));
        nt.outputs.push(("onSuccess".to_string(), PortDefinition::on_success()));
        nt.outputs.push(("onFailure".to_string(), PortDefinition::on_failure()));
        nt
    }

    /// Build the skeleton of an expression-flavored `NodeType`: no control
    /// flow ports at all (`spec.md §3`: "Expression variants omit these").
    pub fn new_expression(name: impl Into<String>, function_name: impl Into<String>) -> Self {
        let function_name = function_name.into();
        let name = name.into();
        Self {
            name,
            function_name,
            variant: NodeVariant::Function,
            inputs: Vec::new(),
            outputs: Vec::new(),
            has_success_port: false,
            has_failure_port: false,
            is_async: false,
            execute_when: ExecuteWhen::Conjunction,
            expression: true,
            scope: None,
            scopes: None,
            import_source: None,
            function_text: None,
            source_location: SourceLocation::default(),
            label: None,
            description: None,
            visuals: NodeVisuals::default(),
            default_config: None,
        }
    }

    pub fn find_input(&self, name: &str) -> Option<&PortDefinition> {
        self.inputs.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn find_output(&self, name: &str) -> Option<&PortDefinition> {
        self.outputs.iter().find(|(n, _)| n == name).map(|(_, p)| p)
    }

    pub fn add_input(&mut self, name: impl Into<String>, port: PortDefinition) {
        self.inputs.push((name.into(), port));
    }

    pub fn add_output(&mut self, name: impl Into<String>, port: PortDefinition) {
        self.outputs.push((name.into(), port));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortKind;

    #[test]
    fn function_variant_has_control_flow_triad() {
        let nt = NodeType::new_function("double", "double");
        assert!(nt.find_input("execute").is_some());
        assert!(nt.find_output("onSuccess").is_some());
        assert!(nt.find_output("onFailure").unwrap().failure);
    }

    #[test]
    fn expression_variant_has_no_control_flow() {
        let nt = NodeType::new_expression("double", "double");
        assert!(nt.find_input("execute").is_none());
        assert!(!nt.has_success_port);
    }

    #[test]
    fn add_input_appends_in_order() {
        let mut nt = NodeType::new_expression("add", "add");
        nt.add_input("x", PortDefinition::new(PortKind::Number));
        nt.add_input("y", PortDefinition::new(PortKind::Number));
        assert_eq!(nt.inputs[0].0, "x");
        assert_eq!(nt.inputs[1].0, "y");
    }
}
