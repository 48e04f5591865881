//! `Workflow` and `Pattern`: the top-level graph containers, plus the
//! `GraphLike` trait both share for traversal (grounded on
//! `WorkflowGraph::{find_node, incoming_edges, outgoing_edges,
//! get_dependencies, get_dependents}` in the teacher workspace).

use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::instance::NodeInstance;
use crate::macro_def::Macro;
use crate::node_type::NodeType;
use crate::port::PortDefinition;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDecl {
    pub name: String,
    pub function_name: String,
    pub module: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOnSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_expr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottleSpec {
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowOptions {
    #[serde(default)]
    pub strict_types: bool,
    #[serde(default)]
    pub auto_connect: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<TriggerSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_on: Option<CancelOnSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle: Option<ThrottleSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowUi {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_node: Option<String>,
    /// Canvas position of the `Start` pseudo-node, round-tripped via
    /// `@position Start x y` (`spec.md §4.I`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_position: Option<(f64, f64)>,
    /// Canvas position of the `Exit` pseudo-node, round-tripped via
    /// `@position Exit x y` (`spec.md §4.I`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_position: Option<(f64, f64)>,
}

/// Reserved pseudo-node and port names, shared across the whole compiler
/// (`spec.md §3`).
pub mod reserved {
    pub const START_NODE: &str = "Start";
    pub const EXIT_NODE: &str = "Exit";
    pub const EXECUTE: &str = "execute";
    pub const ON_SUCCESS: &str = "onSuccess";
    pub const ON_FAILURE: &str = "onFailure";
    pub const SCOPE_START: &str = "start";
    pub const SCOPE_SUCCESS: &str = "success";
    pub const SCOPE_FAILURE: &str = "failure";

    pub fn is_reserved_node_name(name: &str) -> bool {
        name == START_NODE || name == EXIT_NODE
    }

    pub fn is_reserved_scope_port(name: &str) -> bool {
        name == SCOPE_START || name == SCOPE_SUCCESS || name == SCOPE_FAILURE
    }
}

/// A directed graph of typed node instances connected by ports, with
/// designated `Start`/`Exit` pseudo-nodes carrying parameter/return ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub name: String,
    pub function_name: String,
    pub source_file: String,
    pub node_types: Vec<NodeType>,
    pub instances: Vec<NodeInstance>,
    pub connections: Vec<Connection>,
    /// Keyed by `"parentId.scopeName"`.
    #[serde(default)]
    pub scopes: Vec<(String, Vec<String>)>,
    pub start_ports: Vec<(String, PortDefinition)>,
    pub exit_ports: Vec<(String, PortDefinition)>,
    #[serde(default)]
    pub imports: Vec<ImportDecl>,
    #[serde(default)]
    pub macros: Vec<Macro>,
    #[serde(default)]
    pub ui: WorkflowUi,
    #[serde(default)]
    pub options: WorkflowOptions,
    #[serde(default)]
    pub user_specified_async: bool,
    #[serde(default)]
    pub available_function_names: Vec<String>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, function_name: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function_name: function_name.into(),
            source_file: source_file.into(),
            node_types: Vec::new(),
            instances: Vec::new(),
            connections: Vec::new(),
            scopes: Vec::new(),
            start_ports: Vec::new(),
            exit_ports: Vec::new(),
            imports: Vec::new(),
            macros: Vec::new(),
            ui: WorkflowUi::default(),
            options: WorkflowOptions::default(),
            user_specified_async: false,
            available_function_names: Vec::new(),
        }
    }

    pub fn find_node_type(&self, name: &str) -> Option<&NodeType> {
        self.node_types.iter().find(|nt| nt.name == name)
    }

    pub fn scope_children(&self, parent_id: &str, scope_name: &str) -> Option<&[String]> {
        let key = format!("{parent_id}.{scope_name}");
        self.scopes
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_slice())
    }

    pub fn set_scope_children(&mut self, parent_id: &str, scope_name: &str, children: Vec<String>) {
        let key = format!("{parent_id}.{scope_name}");
        if let Some(entry) = self.scopes.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = children;
        } else {
            self.scopes.push((key, children));
        }
    }
}

/// A reusable sub-graph with abstract `IN`/`OUT` pseudo-ports instead of
/// `Start`/`Exit` (`spec.md §3`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub name: String,
    pub source_file: String,
    pub node_types: Vec<NodeType>,
    pub instances: Vec<NodeInstance>,
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub scopes: Vec<(String, Vec<String>)>,
    pub input_ports: Vec<(String, PortDefinition)>,
    pub output_ports: Vec<(String, PortDefinition)>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Pattern {
    pub fn new(name: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_file: source_file.into(),
            node_types: Vec::new(),
            instances: Vec::new(),
            connections: Vec::new(),
            scopes: Vec::new(),
            input_ports: Vec::new(),
            output_ports: Vec::new(),
            description: None,
        }
    }
}

/// Shared traversal surface for `Workflow` and `Pattern`, so the validator
/// and generator can walk either without duplicating graph-walking code —
/// directly modeled on `WorkflowGraph`'s dependency helpers in the teacher.
pub trait GraphLike {
    fn instances(&self) -> &[NodeInstance];
    fn connections(&self) -> &[Connection];

    fn find_instance(&self, id: &str) -> Option<&NodeInstance> {
        self.instances().iter().find(|i| i.id == id)
    }

    fn incoming(&self, node_id: &str) -> Vec<&Connection> {
        self.connections().iter().filter(|c| c.to.node == node_id).collect()
    }

    fn outgoing(&self, node_id: &str) -> Vec<&Connection> {
        self.connections().iter().filter(|c| c.from.node == node_id).collect()
    }

    fn dependencies(&self, node_id: &str) -> Vec<&str> {
        self.incoming(node_id).into_iter().map(|c| c.from.node.as_str()).collect()
    }

    fn dependents(&self, node_id: &str) -> Vec<&str> {
        self.outgoing(node_id).into_iter().map(|c| c.to.node.as_str()).collect()
    }
}

impl GraphLike for Workflow {
    fn instances(&self) -> &[NodeInstance] {
        &self.instances
    }

    fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

impl GraphLike for Pattern {
    fn instances(&self) -> &[NodeInstance] {
        &self.instances
    }

    fn connections(&self) -> &[Connection] {
        &self.connections
    }
}
