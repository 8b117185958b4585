//! State Module - per-node state stacks and what they drive.
//!
//! - **States** - ordered set of active state names with change notification
//! - **Resolve** - merging state style blocks onto a node, with rollback
//! - **Focus** - active element, focus path, the `focus` state

mod focus;
mod resolve;
mod states;

pub use focus::*;
pub use states::*;
