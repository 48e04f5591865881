//! Edge-case migration registry (`spec.md §6`): "a strictly-ordered list of
//! AST -> AST transforms applied after parse and before validate; new
//! entries only when round-trip cannot absorb a format change. Each
//! migration is named and idempotent."

use flow_weaver_ast::Workflow;

/// One AST -> AST transform. Implementations must be idempotent: running
/// `apply` twice in a row has the same effect as running it once.
pub trait Migration: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, workflow: &mut Workflow);
}

/// Renames the pre-1.0 `@map` scope spelling `loop` to its current name
/// `iterate` (`flow-weaver-macros::expanders::expand_map` only ever
/// produces `iterate` scopes today; files authored against the older
/// compiler still carry the old spelling in their `@scope`/`@connect`
/// tags, so this runs once per compile rather than asking every workflow
/// author to edit their source by hand).
pub struct NormalizeLegacyScopeNames;

const LEGACY_SCOPE_NAME: &str = "loop";
const CURRENT_SCOPE_NAME: &str = "iterate";

impl Migration for NormalizeLegacyScopeNames {
    fn name(&self) -> &'static str {
        "normalize_legacy_scope_names"
    }

    fn apply(&self, workflow: &mut Workflow) {
        for (key, _) in workflow.scopes.iter_mut() {
            if let Some((parent, scope)) = key.split_once('.') {
                if scope == LEGACY_SCOPE_NAME {
                    *key = format!("{parent}.{CURRENT_SCOPE_NAME}");
                }
            }
        }
        for inst in &mut workflow.instances {
            if let Some(parent) = &mut inst.parent {
                if parent.scope == LEGACY_SCOPE_NAME {
                    parent.scope = CURRENT_SCOPE_NAME.to_string();
                }
            }
        }
        for conn in &mut workflow.connections {
            if conn.from.scope.as_deref() == Some(LEGACY_SCOPE_NAME) {
                conn.from.scope = Some(CURRENT_SCOPE_NAME.to_string());
            }
            if conn.to.scope.as_deref() == Some(LEGACY_SCOPE_NAME) {
                conn.to.scope = Some(CURRENT_SCOPE_NAME.to_string());
            }
        }
        for nt in &mut workflow.node_types {
            if let Some(scopes) = &mut nt.scopes {
                for s in scopes.iter_mut() {
                    if s == LEGACY_SCOPE_NAME {
                        *s = CURRENT_SCOPE_NAME.to_string();
                    }
                }
            }
            for (_, port) in nt.inputs.iter_mut().chain(nt.outputs.iter_mut()) {
                if port.scope.as_deref() == Some(LEGACY_SCOPE_NAME) {
                    port.scope = Some(CURRENT_SCOPE_NAME.to_string());
                }
            }
        }
    }
}

/// The ordered set of migrations a compile applies, in registration order.
pub struct MigrationRegistry {
    migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRegistry {
    /// The registry a default `CompilerConfig` ships with.
    pub fn standard() -> Self {
        Self { migrations: vec![Box::new(NormalizeLegacyScopeNames)] }
    }

    pub fn empty() -> Self {
        Self { migrations: Vec::new() }
    }

    pub fn apply_all(&self, workflow: &mut Workflow) {
        for migration in &self.migrations {
            log::debug!("applying migration '{}' to workflow '{}'", migration.name(), workflow.name);
            migration.apply(workflow);
        }
    }
}
