//! `Diagnostic`, `Severity`, and the friendly-explanation layer
//! (`spec.md §4.G`: "Every diagnostic exposes `{code, message, nodeId?,
//! severity}`; a companion layer rewrites each into a human-readable
//! `{title, explanation, fix}` record keyed by `code`.").

use serde::{Deserialize, Serialize};

use crate::code::DiagnosticCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    pub severity: Severity,
}

impl Diagnostic {
    /// Build a diagnostic at its code's default severity, promoted to
    /// `Error` when `strict_types` is set and the code is strict-sensitive.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, strict_types: bool) -> Self {
        let severity = if strict_types && code.is_strict_sensitive() {
            Severity::Error
        } else {
            code.default_severity()
        };
        Self { code, message: message.into(), node_id: None, severity }
    }

    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Human-readable rewrite of a `Diagnostic`, keyed by code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendlyDiagnostic {
    pub title: String,
    pub explanation: String,
    pub fix: String,
}

/// Looks up the canned title/explanation/fix text for a code. Codes without
/// a specific entry fall back to a generic rendering built from the code
/// name itself, so every diagnostic is still friendly-renderable.
pub fn explain(code: DiagnosticCode) -> FriendlyDiagnostic {
    use DiagnosticCode::*;
    let (title, explanation, fix) = match code {
        CycleDetected => (
            "Control-flow cycle",
            "The control-flow graph contains a cycle, so no valid execution order exists.",
            "Break the cycle by routing one of the STEP connections through a scope instead of a direct edge.",
        ),
        UnknownNodeType => (
            "Unknown node type",
            "An instance references a node type that has no matching declaration.",
            "Check the node type name for typos, or add the missing @node declaration.",
        ),
        MissingRequiredInput => (
            "Missing required input",
            "A required input port has no connection, instance-level expression, or default.",
            "Connect the input, add an expression, or mark the port optional.",
        ),
        TypeMismatch => (
            "Type mismatch",
            "The connected ports carry incompatible data types.",
            "Insert a @coerce step, or adjust one port's declared type.",
        ),
        ScopeOrphanedChild => (
            "Orphaned scope child",
            "A node is parented to a scope that no longer exists on its parent instance.",
            "Remove the stale child instance, or restore the scope on the parent node type.",
        ),
        _ => {
            return FriendlyDiagnostic {
                title: code.as_str().replace('_', " ").to_lowercase(),
                explanation: format!("See diagnostic code {code} for details."),
                fix: "Consult the diagnostic message for remediation.".to_string(),
            }
        }
    };
    FriendlyDiagnostic {
        title: title.to_string(),
        explanation: explanation.to_string(),
        fix: fix.to_string(),
    }
}

/// Splits a diagnostic list into errors and warnings, preserving order
/// within each group (used by the compiler to decide pass/fail).
pub fn group_by_severity(diagnostics: &[Diagnostic]) -> (Vec<&Diagnostic>, Vec<&Diagnostic>) {
    let errors = diagnostics.iter().filter(|d| d.severity == Severity::Error).collect();
    let warnings = diagnostics.iter().filter(|d| d.severity == Severity::Warning).collect();
    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_types_promotes_type_mismatch() {
        let lenient = Diagnostic::new(DiagnosticCode::TypeMismatch, "x", false);
        let strict = Diagnostic::new(DiagnosticCode::TypeMismatch, "x", true);
        assert_eq!(lenient.severity, Severity::Warning);
        assert_eq!(strict.severity, Severity::Error);
    }

    #[test]
    fn agent_pattern_never_promoted() {
        let d = Diagnostic::new(DiagnosticCode::AgentLlmNoFallback, "x", true);
        assert_eq!(d.severity, Severity::Warning);
    }

    #[test]
    fn group_by_severity_splits_correctly() {
        let diags = vec![
            Diagnostic::new(DiagnosticCode::CycleDetected, "a", false),
            Diagnostic::new(DiagnosticCode::UnusedNode, "b", false),
        ];
        let (errors, warnings) = group_by_severity(&diags);
        assert_eq!(errors.len(), 1);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn unknown_entries_fall_back_to_generic_explanation() {
        let f = explain(DiagnosticCode::ScopeUnusedInput);
        assert!(f.explanation.contains("SCOPE_UNUSED_INPUT"));
    }
}
