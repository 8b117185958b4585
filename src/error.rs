//! Error types.
//!
//! Most scene operations never fail: reconciler churn routinely calls them
//! out of order, so they log and return. The few that can be checked by a
//! caller return [`SceneError`].

use thiserror::Error;

use crate::types::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("parent not set - no node created for {0}")]
    ParentMissing(NodeId),

    #[error("parent {parent} of {node} is not rendered yet")]
    ParentNotRendered { node: NodeId, parent: NodeId },

    #[error("node {0} is already rendered")]
    AlreadyRendered(NodeId),

    #[error("node {0} must be rendered before animating")]
    NotRendered(NodeId),
}

pub type Result<T> = std::result::Result<T, SceneError>;
