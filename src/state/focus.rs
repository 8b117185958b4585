//! Focus - active element, focus path and focus forwarding.
//!
//! The active element lives in a signal so hosts can derive from it. Every
//! node on the path from the active element up to the root carries the
//! `focus` state; nodes leaving that path lose it and get `on_blur`.
//!
//! # Example
//!
//! ```ignore
//! scene.set_focus(button);   // deferred while rendered
//! scene.run_microtasks();
//! assert_eq!(scene.active_element(), Some(button));
//! ```

use spark_signals::Signal;

use crate::engine::{NodeStyle, Scene, Task};
use crate::types::{NodeId, NodeKind, PropValue};

pub const FOCUS_STATE: &str = "focus";

impl Scene {
    /// Request focus for `id`.
    ///
    /// Unrendered nodes remember the request as `autofocus` and take focus
    /// at commit. Rendered nodes forward focus (hook first, then a
    /// `forwardFocus` child index) or take it on the next microtask tick.
    pub fn set_focus(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else { return };
        if !node.is_rendered() {
            self.write_prop(id, "autofocus", PropValue::Bool(true));
            return;
        }

        if let Some(forward) = node.hooks.forward_focus.clone() {
            if forward(self, id) {
                return;
            }
        } else if let Some(index) = node.number("forwardFocus") {
            let target = (index >= 0.0)
                .then(|| node.children.get(index as usize))
                .flatten()
                .filter(|&c| self.node(c).is_some_and(|n| n.kind() != NodeKind::TextLeaf));
            if let Some(target) = target {
                self.set_focus(target);
                return;
            }
        }

        self.tasks.push_back(Task::Focus(id));
    }

    pub(crate) fn apply_focus(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        let previous = self.active_element.get();
        if previous == Some(id) {
            return;
        }
        self.active_element.set(Some(id));
        self.log_node(id, "Focus");

        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            path.push(node_id);
            current = self.node(node_id).and_then(|n| n.parent);
        }

        let old_path = std::mem::take(&mut self.focus_path);
        for &old in old_path.iter().filter(|n| !path.contains(n)) {
            if !self.contains(old) {
                continue;
            }
            self.remove_state(old, FOCUS_STATE);
            if let Some(hook) = self.node(old).and_then(|n| n.hooks.on_blur.clone()) {
                hook(self, old, Some(id), previous);
            }
        }

        for &node_id in &path {
            if old_path.contains(&node_id) {
                continue;
            }
            self.add_state(node_id, FOCUS_STATE);
            if let Some(hook) = self.node(node_id).and_then(|n| n.hooks.on_focus.clone()) {
                hook(self, node_id, Some(id), previous);
            }
        }

        self.focus_path = path;
    }

    /// Currently focused node.
    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element.get()
    }

    /// Reactive handle on the focused node.
    pub fn active_element_signal(&self) -> Signal<Option<NodeId>> {
        self.active_element.clone()
    }

    /// Focused node first, root last.
    pub fn focus_path(&self) -> &[NodeId] {
        &self.focus_path
    }

    pub fn has_focus(&self, id: NodeId) -> bool {
        self.has_state(id, FOCUS_STATE)
    }
}
