//! Stable diagnostic codes and friendly explanations.
//!
//! The validator (`flow-weaver-validate`) is the sole producer of
//! `Diagnostic` values; this crate only owns the vocabulary and the
//! human-readable rewrite, so downstream consumers (CLIs, editors) can
//! depend on the codes without pulling in validation logic.

pub mod code;
pub mod diagnostic;

pub use code::DiagnosticCode;
pub use diagnostic::{explain, group_by_severity, Diagnostic, FriendlyDiagnostic, Severity};
