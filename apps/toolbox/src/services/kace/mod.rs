//! KACE custom inventory rule builder: catalog, rule tree and serializer.

pub mod catalog;
mod import;
mod serialize;
mod tree;

use std::collections::BTreeMap;

use thiserror::Error;

pub use import::{import_rule_string, parse_rule_export, ImportError};
pub use serialize::{generate, render, render_condition, RenderOutcome, INVALID_PLACEHOLDER};
pub use tree::{Condition, Group, JoinOperator, Node, NodeId, RuleSnapshot, RuleTree, SnapshotNode};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0} is not a group")]
    NotAGroup(NodeId),
    #[error("node {0} is not a condition")]
    NotACondition(NodeId),
    #[error("unknown function `{0}`")]
    UnknownFunction(String),
    #[error("`{function}` has no parameter `{param}`")]
    UnknownParameter { function: String, param: String },
    #[error("no top-level operator at position {0}")]
    OperatorIndex(usize),
    #[error("invalid rule snapshot: {0}")]
    Snapshot(String),
    #[error("add at least one condition before generating")]
    Empty,
    #[error("{} condition(s) are incomplete", .0.len())]
    Invalid(BTreeMap<NodeId, String>),
}
