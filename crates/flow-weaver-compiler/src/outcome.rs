//! `CompileOutcome`: the summary type a `compile()` call returns
//! (`SPEC_FULL.md §2`), bundling the AST, diagnostics, generated source,
//! and regenerated annotations the way the teacher's `OrchestrationResult`
//! bundles `{success, outputs, error, nodes_executed, execution_time_ms}`.

use flow_weaver_ast::{NodeType, Pattern, Workflow};
use flow_weaver_diagnostics::{group_by_severity, Diagnostic};

/// Everything one compiled workflow produced.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub name: String,
    pub ast: Workflow,
    pub diagnostics: Vec<Diagnostic>,
    /// Present iff codegen ran (validation had no errors, or `force` was
    /// set).
    pub generated_body: Option<String>,
    pub is_async: bool,
    pub regenerated_doc: String,
    pub node_count: usize,
    pub connection_count: usize,
    pub macro_count: usize,
}

impl WorkflowOutcome {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// `(errors, warnings)`, file order preserved within each group
    /// (`spec.md §7`: "grouped in output by workflow, then by severity,
    /// then by file order").
    pub fn by_severity(&self) -> (Vec<&Diagnostic>, Vec<&Diagnostic>) {
        group_by_severity(&self.diagnostics)
    }
}

/// Everything one source file produced, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct CompileOutcome {
    pub node_types: Vec<NodeType>,
    pub patterns: Vec<Pattern>,
    pub workflows: Vec<WorkflowOutcome>,
    /// The full file contents after splicing every generated workflow body
    /// and the runtime preamble into it, if the caller asked for splicing.
    pub spliced_source: Option<String>,
}

impl CompileOutcome {
    pub fn has_errors(&self) -> bool {
        self.workflows.iter().any(WorkflowOutcome::has_errors)
    }

    /// `(workflow name, errors, warnings)` for every compiled workflow, in
    /// file order (`spec.md §7`'s grouping rule, made concrete across an
    /// entire file rather than one workflow at a time).
    pub fn grouped_by_workflow_then_severity(&self) -> Vec<(&str, Vec<&Diagnostic>, Vec<&Diagnostic>)> {
        self.workflows
            .iter()
            .map(|w| {
                let (errors, warnings) = w.by_severity();
                (w.name.as_str(), errors, warnings)
            })
            .collect()
    }
}
