//! Workflow graph data model for the annotation compiler.
//!
//! This crate defines the types the rest of the compiler operates on:
//! `Workflow`/`Pattern` graphs built from `NodeType` templates, `NodeInstance`
//! placements, `Connection` edges and sugar `Macro` records. It has no
//! parsing, validation, or code-generation logic of its own — those live in
//! `flow-weaver-parser`, `flow-weaver-validate`, and `flow-weaver-codegen`
//! respectively, all of which depend on this crate for their shared vocabulary.

pub mod connection;
pub mod instance;
pub mod macro_def;
pub mod node_type;
pub mod port;
pub mod workflow;

pub use connection::{Connection, Endpoint};
pub use instance::{InstanceConfig, InstanceParent, NodeInstance, PortConfig};
pub use macro_def::{
    CoerceMacroData, CoercionKind, FanInMacroData, FanOutMacroData, Macro, MapMacroData, PathMacroData, PathStep,
};
pub use node_type::{NodeType, NodeVariant, NodeVisuals, SourceLocation};
pub use port::{ExecuteWhen, Placement, PortDefinition, PortDirection, PortKind};
pub use workflow::{
    reserved, CancelOnSpec, GraphLike, ImportDecl, Pattern, ThrottleSpec, TriggerSpec, Workflow, WorkflowOptions,
    WorkflowUi,
};
