//! Deferred work ("microtasks").
//!
//! Work that must observe a settled tree (layout flushes, deferred
//! destruction, focus changes) is queued here and drained by
//! [`Scene::run_microtasks`], which the host calls once per tick after the
//! reconciler finished mutating the tree.

use super::scene::Scene;
use crate::types::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Task {
    /// Lay out every queued node, most recently queued first.
    FlushLayout,
    /// Destroy the node if it is still queued for deletion.
    Destroy(NodeId),
    /// Move focus to the node.
    Focus(NodeId),
}

impl Scene {
    /// Drain the task queue, including tasks queued while draining.
    /// Returns the number of tasks run.
    pub fn run_microtasks(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.tasks.pop_front() {
            match task {
                Task::FlushLayout => self.flush_layout_queue(),
                Task::Destroy(id) => self.destroy(id),
                Task::Focus(id) => self.apply_focus(id),
            }
            self.flush_state_changes();
            ran += 1;
        }
        ran
    }

    /// Tasks waiting for the next [`Scene::run_microtasks`].
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }
}
