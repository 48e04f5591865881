//! Compiler-wide configuration. Per-workflow configuration lives on
//! `Workflow.options` instead (`strictTypes`, `autoConnect`, `trigger`, ...);
//! this struct only holds what's shared across every compile a session runs,
//! analogous to the `max_nodes`-style builder option the teacher's
//! orchestration executor takes.

#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Capacity of the import-resolution cache (`spec.md §4.E`, §5).
    pub cache_capacity: usize,
    /// Run codegen even when validation reported errors.
    pub force: bool,
    /// Apply the edge-case migration registry between parse and validate
    /// (`spec.md §6`). Disabling this is only useful for tests that want to
    /// see the pre-migration AST.
    pub run_migrations: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self { cache_capacity: 256, force: false, run_migrations: true }
    }
}
