//! Agent-pattern advisories (`spec.md §4.G`: "heuristic, advisory, never
//! fatal"). These look for shape-level smells common to LLM/tool/agent
//! workflows — an LLM call with no failure path, a tool executor with no
//! upstream guard, a loop body with no memory node — by pattern-matching on
//! node type names, since no stronger signal is available at this layer.

use flow_weaver_ast::{GraphLike, Workflow};
use flow_weaver_diagnostics::{Diagnostic, DiagnosticCode};

const LLM_HINTS: &[&str] = &["llm", "agent", "chat", "completion"];
const TOOL_HINTS: &[&str] = &["tool", "executor"];
const GUARD_HINTS: &[&str] = &["guard", "valid", "check", "auth", "permission"];
const MEMORY_HINTS: &[&str] = &["memory", "history", "context"];

fn matches_any(haystack: &str, hints: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    hints.iter().any(|h| lower.contains(h))
}

pub fn check(wf: &Workflow, out: &mut Vec<Diagnostic>) {
    let strict = wf.options.strict_types;

    for inst in &wf.instances {
        let is_llm = matches_any(&inst.node_type, LLM_HINTS);
        let is_tool = matches_any(&inst.node_type, TOOL_HINTS);

        if is_llm {
            let failure_targets: Vec<&str> = wf
                .outgoing(&inst.id)
                .into_iter()
                .filter(|c| c.from.port == "onFailure")
                .map(|c| c.to.node.as_str())
                .collect();
            if failure_targets.is_empty() {
                out.push(
                    Diagnostic::new(DiagnosticCode::AgentLlmMissingErrorHandler, format!("'{}' has no onFailure handler", inst.id), strict)
                        .with_node(&inst.id),
                );
            } else if failure_targets.iter().all(|t| *t == flow_weaver_ast::reserved::EXIT_NODE) {
                out.push(
                    Diagnostic::new(DiagnosticCode::AgentLlmNoFallback, format!("'{}' fails straight to Exit with no fallback path", inst.id), strict)
                        .with_node(&inst.id),
                );
            }
        }

        if is_tool {
            let guarded = wf.dependencies(&inst.id).iter().any(|dep| matches_any(dep, GUARD_HINTS));
            if !guarded && !wf.dependencies(&inst.id).is_empty() {
                out.push(
                    Diagnostic::new(DiagnosticCode::AgentUnguardedToolExecutor, format!("'{}' runs with no upstream guard/validation node", inst.id), strict)
                        .with_node(&inst.id),
                );
            }
            let output_used = wf.outgoing(&inst.id).iter().any(|c| c.from.port == "onSuccess" || c.from.port == "result");
            if !output_used {
                out.push(
                    Diagnostic::new(DiagnosticCode::AgentToolNoOutputHandling, format!("'{}' output is never consumed", inst.id), strict)
                        .with_node(&inst.id),
                );
            }
        }

        if let Some(parent) = &inst.parent {
            if is_llm {
                let siblings = wf.scope_children(&parent.id, &parent.scope).unwrap_or_default();
                let has_memory = siblings.iter().any(|id| matches_any(id, MEMORY_HINTS));
                if !has_memory {
                    out.push(
                        Diagnostic::new(
                            DiagnosticCode::AgentMissingMemoryInLoop,
                            format!("loop '{}.{}' runs '{}' with no memory/history node in the same scope", parent.id, parent.scope, inst.id),
                            strict,
                        )
                        .with_node(&inst.id),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_weaver_ast::{Connection, Endpoint, NodeInstance};

    #[test]
    fn flags_llm_with_no_failure_handler() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("a", "callLlm"));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::AgentLlmMissingErrorHandler));
    }

    #[test]
    fn flags_llm_failing_straight_to_exit() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("a", "callLlm"));
        wf.connections.push(Connection::new(Endpoint::new("a", "onFailure"), Endpoint::new("Exit", "error")));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::AgentLlmNoFallback));
    }

    #[test]
    fn flags_unguarded_tool_executor() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("a", "fetchTool"));
        wf.instances.push(NodeInstance::new("b", "runToolExecutor"));
        wf.connections.push(Connection::new(Endpoint::new("a", "onSuccess"), Endpoint::new("b", "execute")));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::AgentUnguardedToolExecutor));
    }

    #[test]
    fn guarded_tool_executor_is_not_flagged_for_guard() {
        let mut wf = Workflow::new("W", "w", "w.ts");
        wf.instances.push(NodeInstance::new("g", "authGuard"));
        wf.instances.push(NodeInstance::new("b", "runToolExecutor"));
        wf.connections.push(Connection::new(Endpoint::new("g", "onSuccess"), Endpoint::new("b", "execute")));
        wf.connections.push(Connection::new(Endpoint::new("b", "onSuccess"), Endpoint::new("Exit", "done")));
        let mut diags = Vec::new();
        check(&wf, &mut diags);
        assert!(!diags.iter().any(|d| d.code == DiagnosticCode::AgentUnguardedToolExecutor));
    }
}
