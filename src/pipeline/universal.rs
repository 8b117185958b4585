//! Host operations for a reconciler.
//!
//! Each operation is a thin pass-through onto the scene. Removal is
//! deferred by one microtask tick so that remove-then-insert (a move) never
//! destroys and recreates the engine-side node.

use crate::engine::{Scene, Task};
use crate::types::{NodeFlags, NodeId, NodeKind, PropValue};

impl Scene {
    /// Create an unattached element. `"text"` creates a text element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let kind = if name == "text" {
            NodeKind::Text
        } else {
            NodeKind::Element
        };
        self.alloc(kind, name)
    }

    /// Create an unattached text leaf carrying `text`.
    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        let id = self.alloc(NodeKind::TextLeaf, "#text");
        if let Some(node) = self.node_mut(id) {
            node.text = text.into();
        }
        id
    }

    /// Replace a leaf's payload and refresh the owning text element.
    pub fn replace_text(&mut self, id: NodeId, value: &str) {
        let Some(node) = self.node_mut(id) else { return };
        node.text = value.into();
        let parent = node.parent;
        if let Some(parent) = parent {
            self.refresh_text(parent);
        }
    }

    /// Set a property by name.
    pub fn set_property(&mut self, id: NodeId, name: &str, value: impl Into<PropValue>) {
        self.write_prop(id, name, value.into());
    }

    /// Attach `node` under `parent`, before `anchor` when it is a child of
    /// `parent`. Commits the node if the parent is already rendered.
    pub fn insert_node(&mut self, parent: NodeId, node: NodeId, anchor: Option<NodeId>) {
        if !self.contains(parent) || !self.contains(node) {
            return;
        }
        self.log_node(parent, "Insert");

        let previous = self.node(node).and_then(|n| n.parent);
        if let Some(previous) = previous.and_then(|p| self.node_mut(p)) {
            previous.children.remove(node);
        }

        let Some(p) = self.node_mut(parent) else { return };
        p.children.insert(node, anchor);
        let parent_handle = p.handle;
        let parent_rendered = p.is_rendered();
        let parent_lays_out = p.requires_layout();
        let parent_is_text = p.is_text_node();
        p.flags.insert(NodeFlags::DIRTY);

        let Some(n) = self.node_mut(node) else { return };
        n.parent = Some(parent);
        n.flags.remove(NodeFlags::QUEUED_DELETE);
        let kind = n.kind;
        let handle = n.handle;

        if let Some(handle) = handle {
            self.renderer.set_parent(handle, parent_handle);
        }
        if parent_rendered && parent_lays_out {
            self.queue_layout(parent);
        }

        match kind {
            NodeKind::TextLeaf => {
                if parent_is_text {
                    self.refresh_text(parent);
                } else {
                    tracing::warn!(node = %node, parent = %parent, "text leaf inserted outside of a text element");
                }
            }
            NodeKind::Element | NodeKind::Text => {
                if parent_rendered && handle.is_none() {
                    self.render(node);
                }
            }
        }
        self.flush_state_changes();
    }

    /// Detach `node` from `parent` and queue its destruction. Re-inserting
    /// it before the next tick cancels the destruction.
    pub fn remove_node(&mut self, parent: NodeId, node: NodeId) {
        if !self.contains(node) {
            return;
        }
        self.log_node(parent, "Remove");

        let parent_is_text = match self.node_mut(parent) {
            Some(p) => {
                p.children.remove(node);
                p.is_text_node()
            }
            None => false,
        };

        let Some(n) = self.node_mut(node) else { return };
        n.flags.insert(NodeFlags::QUEUED_DELETE);
        let is_leaf = n.is_leaf();
        self.tasks.push_back(Task::Destroy(node));

        if is_leaf && parent_is_text {
            self.refresh_text(parent);
        }
    }

    /// True for text elements (`"text"`), which own text leaves.
    pub fn is_text_node(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.is_text_node())
    }

    pub fn get_parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn get_first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.children.first())
    }

    /// Sibling after `id`; `None` when `id` is last or detached.
    pub fn get_next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id)?.parent?;
        self.node(parent)?.children.next_after(id)
    }

    /// Recompute a text element's `text` from its leaves. A rendered,
    /// autosized text element waits for a fresh measurement.
    pub(crate) fn refresh_text(&mut self, id: NodeId) {
        if !self.node(id).is_some_and(|n| n.is_text_node()) {
            return;
        }
        let text = self.get_text(id);
        self.write_prop(id, "text", PropValue::from(text));

        if let Some(node) = self.node_mut(id) {
            if node.is_rendered() && node.is_autosized() {
                node.flags.insert(NodeFlags::AWAITING_LOAD);
            }
        }
    }
}
