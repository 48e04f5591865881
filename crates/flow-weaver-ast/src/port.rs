//! Port-level types: direction, data kind, and the port definition itself.
//!
//! Mirrors the shape of a teacher `PortDataType`/`PortDefinition` pair, but
//! adds the control-flow and scope concepts the annotation compiler's port
//! model needs (see `spec.md §3`, §4.D, §4.H).

use serde::{Deserialize, Serialize};

/// Which side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    Input,
    Output,
}

/// The data type carried by a port.
///
/// `Step` is the control-flow signal carrier; it is never inferred from a
/// host-language type (see `flow-weaver-source`'s `infer_port_kind`), only
/// assigned by structural position. `Function` carries a scope closure
/// reference rather than a plain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortKind {
    Step,
    Boolean,
    Number,
    String,
    Array,
    Object,
    Function,
    Any,
}

impl PortKind {
    /// Whether a value of `self` may flow into a port of kind `other`.
    ///
    /// `Any` is compatible with everything in either direction; otherwise
    /// kinds must match exactly. Lossy/unusual coercions are a validator
    /// concern (`UNUSUAL_TYPE_COERCION`), not a compatibility concern.
    pub fn is_compatible_with(&self, other: &PortKind) -> bool {
        matches!(self, PortKind::Any) || matches!(other, PortKind::Any) || self == other
    }
}

/// Where a port is drawn relative to the node body, when explicitly pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Top,
    Bottom,
}

/// Strategy for merging multiple incoming STEP edges into a non-`execute` port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ExecuteWhen {
    /// Fire iff every predecessor STEP value is truthy.
    Conjunction,
    /// Fire iff any predecessor STEP value is truthy.
    Disjunction,
    /// Evaluate a user-authored host-language boolean expression.
    ///
    /// Per `spec.md §9` Open Questions, the exact merge evaluator is
    /// implementation-defined; see `DESIGN.md` for the evaluator this
    /// implementation picked.
    Custom { expression: String },
}

/// A single input or output port on a `NodeType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortDefinition {
    pub kind: PortKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub optional: bool,
    /// Host-language snippet evaluated at the call site (`Expression:` prefix
    /// in a doc-comment description, or an explicit `expr:` port attribute).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Non-null marks a scoped port; see the scope-direction inversion rule
    /// in `spec.md §4.H`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default)]
    pub is_control_flow: bool,
    #[serde(default)]
    pub failure: bool,
    #[serde(default)]
    pub hidden: bool,
    /// Verbatim host-language type text, preserved for UI display / round-trip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

impl PortDefinition {
    pub fn new(kind: PortKind) -> Self {
        Self {
            kind,
            label: None,
            default: None,
            optional: false,
            expression: None,
            scope: None,
            is_control_flow: false,
            failure: false,
            hidden: false,
            ts_type: None,
            order: None,
            placement: None,
        }
    }

    /// The mandatory `execute` control-flow input every non-expression
    /// `NodeType` carries (`spec.md §3` invariant).
    pub fn execute() -> Self {
        let mut p = Self::new(PortKind::Step);
        p.is_control_flow = true;
        p
    }

    /// The mandatory `onSuccess` control-flow output.
    pub fn on_success() -> Self {
        let mut p = Self::new(PortKind::Step);
        p.is_control_flow = true;
        p
    }

    /// The mandatory `onFailure` control-flow output (`failure = true`).
    pub fn on_failure() -> Self {
        let mut p = Self::new(PortKind::Step);
        p.is_control_flow = true;
        p.failure = true;
        p
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn is_scoped(&self) -> bool {
        self.scope.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_is_compatible_both_ways() {
        assert!(PortKind::Any.is_compatible_with(&PortKind::String));
        assert!(PortKind::Number.is_compatible_with(&PortKind::Any));
        assert!(!PortKind::Number.is_compatible_with(&PortKind::String));
    }

    #[test]
    fn scoped_port_detection() {
        let p = PortDefinition::new(PortKind::Number).with_scope("iterate");
        assert!(p.is_scoped());
        assert!(!PortDefinition::new(PortKind::Number).is_scoped());
    }

    #[test]
    fn control_flow_triad_shapes() {
        assert!(PortDefinition::execute().is_control_flow);
        assert!(PortDefinition::on_success().is_control_flow);
        let f = PortDefinition::on_failure();
        assert!(f.is_control_flow && f.failure);
    }
}
