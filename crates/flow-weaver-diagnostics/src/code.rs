//! `DiagnosticCode`: the compiler's stable diagnostic vocabulary.
//!
//! These codes are a contract — external tooling matches on them, so once a
//! variant ships its wire name (the `#[serde(rename = "...")]`) never
//! changes. Categories follow the validator's own grouping.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // --- Structural ---
    #[serde(rename = "MISSING_WORKFLOW_NAME")]
    MissingWorkflowName,
    #[serde(rename = "MISSING_FUNCTION_NAME")]
    MissingFunctionName,
    #[serde(rename = "DUPLICATE_NODE_NAME")]
    DuplicateNodeName,
    #[serde(rename = "RESERVED_NODE_NAME")]
    ReservedNodeName,
    #[serde(rename = "DUPLICATE_INSTANCE_ID")]
    DuplicateInstanceId,
    #[serde(rename = "RESERVED_INSTANCE_ID")]
    ReservedInstanceId,
    #[serde(rename = "UNKNOWN_NODE_TYPE")]
    UnknownNodeType,
    #[serde(rename = "UNKNOWN_SOURCE_NODE")]
    UnknownSourceNode,
    #[serde(rename = "UNKNOWN_TARGET_NODE")]
    UnknownTargetNode,
    #[serde(rename = "UNKNOWN_SOURCE_PORT")]
    UnknownSourcePort,
    #[serde(rename = "UNKNOWN_TARGET_PORT")]
    UnknownTargetPort,
    #[serde(rename = "UNDEFINED_NODE")]
    UndefinedNode,
    #[serde(rename = "DUPLICATE_CONNECTION")]
    DuplicateConnection,
    #[serde(rename = "MUTABLE_NODE_TYPE_BINDING")]
    MutableNodeTypeBinding,
    #[serde(rename = "INVALID_EXECUTE_WHEN")]
    InvalidExecuteWhen,
    #[serde(rename = "INVALID_PORT_TYPE")]
    InvalidPortType,
    #[serde(rename = "INVALID_COLOR")]
    InvalidColor,
    #[serde(rename = "INVALID_ICON")]
    InvalidIcon,
    #[serde(rename = "INFERRED_NODE_TYPE")]
    InferredNodeType,

    // --- Connectivity ---
    #[serde(rename = "NO_START_CONNECTIONS")]
    NoStartConnections,
    #[serde(rename = "NO_EXIT_CONNECTIONS")]
    NoExitConnections,
    #[serde(rename = "UNUSED_NODE")]
    UnusedNode,
    #[serde(rename = "UNUSED_OUTPUT_PORT")]
    UnusedOutputPort,
    #[serde(rename = "UNREACHABLE_EXIT_PORT")]
    UnreachableExitPort,
    #[serde(rename = "MULTIPLE_EXIT_CONNECTIONS")]
    MultipleExitConnections,
    #[serde(rename = "MULTIPLE_CONNECTIONS_TO_INPUT")]
    MultipleConnectionsToInput,
    #[serde(rename = "CYCLE_DETECTED")]
    CycleDetected,

    // --- Typing ---
    #[serde(rename = "TYPE_MISMATCH")]
    TypeMismatch,
    #[serde(rename = "TYPE_INCOMPATIBLE")]
    TypeIncompatible,
    #[serde(rename = "LOSSY_TYPE_COERCION")]
    LossyTypeCoercion,
    #[serde(rename = "UNUSUAL_TYPE_COERCION")]
    UnusualTypeCoercion,
    #[serde(rename = "STEP_PORT_TYPE_MISMATCH")]
    StepPortTypeMismatch,
    #[serde(rename = "OBJECT_TYPE_MISMATCH")]
    ObjectTypeMismatch,
    #[serde(rename = "INVALID_EXIT_PORT_TYPE")]
    InvalidExitPortType,

    // --- Annotation <-> signature ---
    #[serde(rename = "ANNOTATION_SIGNATURE_MISMATCH")]
    AnnotationSignatureMismatch,
    #[serde(rename = "ANNOTATION_SIGNATURE_TYPE_MISMATCH")]
    AnnotationSignatureTypeMismatch,
    #[serde(rename = "MISSING_REQUIRED_INPUT")]
    MissingRequiredInput,

    // --- Scope ---
    #[serde(rename = "SCOPE_EMPTY")]
    ScopeEmpty,
    #[serde(rename = "SCOPE_INCONSISTENT")]
    ScopeInconsistent,
    #[serde(rename = "SCOPE_CONSISTENCY_ERROR")]
    ScopeConsistencyError,
    #[serde(rename = "SCOPE_WRONG_SCOPE_NAME")]
    ScopeWrongScopeName,
    #[serde(rename = "SCOPE_CONNECTION_OUTSIDE")]
    ScopeConnectionOutside,
    #[serde(rename = "SCOPE_PORT_TYPE_MISMATCH")]
    ScopePortTypeMismatch,
    #[serde(rename = "SCOPE_UNKNOWN_PORT")]
    ScopeUnknownPort,
    #[serde(rename = "SCOPE_ORPHANED_CHILD")]
    ScopeOrphanedChild,
    #[serde(rename = "SCOPE_MISSING_REQUIRED_INPUT")]
    ScopeMissingRequiredInput,
    #[serde(rename = "SCOPE_UNUSED_INPUT")]
    ScopeUnusedInput,

    // --- Agent patterns (advisory, never fatal) ---
    #[serde(rename = "AGENT_LLM_MISSING_ERROR_HANDLER")]
    AgentLlmMissingErrorHandler,
    #[serde(rename = "AGENT_UNGUARDED_TOOL_EXECUTOR")]
    AgentUnguardedToolExecutor,
    #[serde(rename = "AGENT_MISSING_MEMORY_IN_LOOP")]
    AgentMissingMemoryInLoop,
    #[serde(rename = "AGENT_LLM_NO_FALLBACK")]
    AgentLlmNoFallback,
    #[serde(rename = "AGENT_TOOL_NO_OUTPUT_HANDLING")]
    AgentToolNoOutputHandling,
}

impl DiagnosticCode {
    /// The stable wire string, e.g. `"CYCLE_DETECTED"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingWorkflowName => "MISSING_WORKFLOW_NAME",
            Self::MissingFunctionName => "MISSING_FUNCTION_NAME",
            Self::DuplicateNodeName => "DUPLICATE_NODE_NAME",
            Self::ReservedNodeName => "RESERVED_NODE_NAME",
            Self::DuplicateInstanceId => "DUPLICATE_INSTANCE_ID",
            Self::ReservedInstanceId => "RESERVED_INSTANCE_ID",
            Self::UnknownNodeType => "UNKNOWN_NODE_TYPE",
            Self::UnknownSourceNode => "UNKNOWN_SOURCE_NODE",
            Self::UnknownTargetNode => "UNKNOWN_TARGET_NODE",
            Self::UnknownSourcePort => "UNKNOWN_SOURCE_PORT",
            Self::UnknownTargetPort => "UNKNOWN_TARGET_PORT",
            Self::UndefinedNode => "UNDEFINED_NODE",
            Self::DuplicateConnection => "DUPLICATE_CONNECTION",
            Self::MutableNodeTypeBinding => "MUTABLE_NODE_TYPE_BINDING",
            Self::InvalidExecuteWhen => "INVALID_EXECUTE_WHEN",
            Self::InvalidPortType => "INVALID_PORT_TYPE",
            Self::InvalidColor => "INVALID_COLOR",
            Self::InvalidIcon => "INVALID_ICON",
            Self::InferredNodeType => "INFERRED_NODE_TYPE",
            Self::NoStartConnections => "NO_START_CONNECTIONS",
            Self::NoExitConnections => "NO_EXIT_CONNECTIONS",
            Self::UnusedNode => "UNUSED_NODE",
            Self::UnusedOutputPort => "UNUSED_OUTPUT_PORT",
            Self::UnreachableExitPort => "UNREACHABLE_EXIT_PORT",
            Self::MultipleExitConnections => "MULTIPLE_EXIT_CONNECTIONS",
            Self::MultipleConnectionsToInput => "MULTIPLE_CONNECTIONS_TO_INPUT",
            Self::CycleDetected => "CYCLE_DETECTED",
            Self::TypeMismatch => "TYPE_MISMATCH",
            Self::TypeIncompatible => "TYPE_INCOMPATIBLE",
            Self::LossyTypeCoercion => "LOSSY_TYPE_COERCION",
            Self::UnusualTypeCoercion => "UNUSUAL_TYPE_COERCION",
            Self::StepPortTypeMismatch => "STEP_PORT_TYPE_MISMATCH",
            Self::ObjectTypeMismatch => "OBJECT_TYPE_MISMATCH",
            Self::InvalidExitPortType => "INVALID_EXIT_PORT_TYPE",
            Self::AnnotationSignatureMismatch => "ANNOTATION_SIGNATURE_MISMATCH",
            Self::AnnotationSignatureTypeMismatch => "ANNOTATION_SIGNATURE_TYPE_MISMATCH",
            Self::MissingRequiredInput => "MISSING_REQUIRED_INPUT",
            Self::ScopeEmpty => "SCOPE_EMPTY",
            Self::ScopeInconsistent => "SCOPE_INCONSISTENT",
            Self::ScopeConsistencyError => "SCOPE_CONSISTENCY_ERROR",
            Self::ScopeWrongScopeName => "SCOPE_WRONG_SCOPE_NAME",
            Self::ScopeConnectionOutside => "SCOPE_CONNECTION_OUTSIDE",
            Self::ScopePortTypeMismatch => "SCOPE_PORT_TYPE_MISMATCH",
            Self::ScopeUnknownPort => "SCOPE_UNKNOWN_PORT",
            Self::ScopeOrphanedChild => "SCOPE_ORPHANED_CHILD",
            Self::ScopeMissingRequiredInput => "SCOPE_MISSING_REQUIRED_INPUT",
            Self::ScopeUnusedInput => "SCOPE_UNUSED_INPUT",
            Self::AgentLlmMissingErrorHandler => "AGENT_LLM_MISSING_ERROR_HANDLER",
            Self::AgentUnguardedToolExecutor => "AGENT_UNGUARDED_TOOL_EXECUTOR",
            Self::AgentMissingMemoryInLoop => "AGENT_MISSING_MEMORY_IN_LOOP",
            Self::AgentLlmNoFallback => "AGENT_LLM_NO_FALLBACK",
            Self::AgentToolNoOutputHandling => "AGENT_TOOL_NO_OUTPUT_HANDLING",
        }
    }

    /// Default severity before `strictTypes` promotion (`spec.md §4.G`).
    pub fn default_severity(&self) -> super::Severity {
        use super::Severity::*;
        match self {
            Self::InferredNodeType
            | Self::UnusedNode
            | Self::UnusedOutputPort
            | Self::TypeMismatch
            | Self::AgentLlmMissingErrorHandler
            | Self::AgentUnguardedToolExecutor
            | Self::AgentMissingMemoryInLoop
            | Self::AgentLlmNoFallback
            | Self::AgentToolNoOutputHandling
            | Self::ScopeUnusedInput => Warning,
            _ => Error,
        }
    }

    /// Whether `strictTypes` promotes this code from warning to error.
    /// Only the typing-adjacent warnings are strict-sensitive; advisory
    /// agent-pattern codes never escalate (`spec.md §4.G`: "never fatal").
    pub fn is_strict_sensitive(&self) -> bool {
        matches!(self, Self::TypeMismatch | Self::InferredNodeType)
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_matches_serde_rename() {
        let json = serde_json::to_string(&DiagnosticCode::CycleDetected).unwrap();
        assert_eq!(json, "\"CYCLE_DETECTED\"");
        assert_eq!(DiagnosticCode::CycleDetected.as_str(), "CYCLE_DETECTED");
    }

    #[test]
    fn agent_patterns_never_strict_escalate() {
        assert!(!DiagnosticCode::AgentLlmNoFallback.is_strict_sensitive());
    }

    #[test]
    fn round_trip_every_code() {
        let codes = [
            DiagnosticCode::MissingWorkflowName,
            DiagnosticCode::ScopeOrphanedChild,
            DiagnosticCode::AgentToolNoOutputHandling,
            DiagnosticCode::MultipleConnectionsToInput,
        ];
        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
            assert_eq!(back.as_str(), code.as_str());
        }
    }
}
