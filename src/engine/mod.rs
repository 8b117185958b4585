//! Scene Engine - node arena, property routing and the commit pipeline.
//!
//! The engine manages the core data structures:
//! - Scene: generational arena of nodes plus the renderer it drives
//! - Node: local values, pending renderer writes, children, style, states
//! - Props: the forwarding table (animatable, instant, local)
//! - Tasks: deferred work drained by `Scene::run_microtasks`
//!
//! # Architecture
//!
//! Nodes are NOT owned by their parents. They are slots in one arena,
//! addressed by [`NodeId`](crate::NodeId), and linked by id:
//!
//! ```text
//! Slot 0: root  (parent=None,   handle=1, children=[1, 2])
//! Slot 1: view  (parent=Some 0, handle=2, children=[3])
//! Slot 2: text  (parent=Some 0, handle=3, children=[4 leaf])
//! ```
//!
//! Freed slots bump their generation, so stale ids never alias new nodes.

mod animation;
mod children;
mod node;
mod props;
mod render;
mod scene;
mod tasks;

pub use children::*;
pub use node::*;
pub use props::*;
pub use scene::*;
pub(crate) use tasks::Task;
