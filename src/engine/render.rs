//! Commit and teardown.
//!
//! `try_render` materializes a node: geometry defaults, text preparation,
//! state styles, then one `create_*` call carrying every buffered property.
//! Children are committed depth-first right after their parent.

use compact_str::CompactString;

use super::node::{Node, NodeStyle};
use super::scene::Scene;
use crate::error::{Result, SceneError};
use crate::state::FOCUS_STATE;
use crate::types::{NodeFlags, NodeId, NodeKind, PropValue};

impl Scene {
    /// Commit `id` and its subtree, logging instead of failing.
    pub fn render(&mut self, id: NodeId) {
        if let Err(err) = self.try_render(id) {
            tracing::warn!(node = %id, %err, "render skipped");
        }
    }

    /// Commit `id` and its subtree. The parent must already be rendered.
    pub fn try_render(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id).ok_or(SceneError::UnknownNode(id))?;
        if node.is_leaf() {
            return Ok(());
        }
        let parent_id = node.parent.ok_or(SceneError::ParentMissing(id))?;
        let parent = self.node(parent_id).ok_or(SceneError::ParentMissing(id))?;
        if !parent.is_rendered() {
            return Err(SceneError::ParentNotRendered {
                node: id,
                parent: parent_id,
            });
        }
        if node.is_rendered() {
            return Err(SceneError::AlreadyRendered(id));
        }

        let kind = node.kind;
        let parent_handle = parent.handle;
        let parent_width = parent.width().unwrap_or(0.0);
        let parent_height = parent.height().unwrap_or(0.0);
        let parent_lays_out = parent.requires_layout();
        let parent_dirty = parent.is_dirty();

        if parent_lays_out {
            self.queue_layout(parent_id);
        }
        // Place this child before it is committed.
        if parent_dirty {
            if let Some(parent) = self.node_mut(parent_id) {
                parent.flags.remove(NodeFlags::DIRTY);
            }
            self.update_layout(parent_id, None, None);
        }

        self.apply_geometry_defaults(id, kind, parent_width, parent_height);
        if kind == NodeKind::Text {
            self.prepare_text(id, parent_width, parent_height);
        }

        if self.node(id).is_some_and(|n| !n.states.is_empty()) {
            self.resolve_states(id);
        }

        self.log_node(id, "Rendering");
        let Some(node) = self.node_mut(id) else {
            return Err(SceneError::UnknownNode(id));
        };
        let props = std::mem::take(&mut node.pending);
        let handle = match kind {
            NodeKind::Text => self.renderer.create_text_node(&props, parent_handle),
            _ => self.renderer.create_node(&props, parent_handle),
        };
        self.handles.insert(handle, id);

        let Some(node) = self.node_mut(id) else {
            return Err(SceneError::UnknownNode(id));
        };
        node.handle = Some(handle);
        let measure_text = kind == NodeKind::Text && (node.width().is_none() || node.height().is_none());
        if measure_text {
            node.flags.insert(NodeFlags::AUTOSIZED | NodeFlags::AWAITING_LOAD);
        } else if node.prop("autosize").is_some_and(PropValue::is_truthy) && parent_lays_out {
            node.flags.insert(NodeFlags::AWAITING_LOAD);
        }
        let on_create = node.hooks.on_create.clone();
        let events: Vec<CompactString> = node.hooks.on_events.iter().map(|(name, _)| name.clone()).collect();
        let children: Vec<NodeId> = node.children.iter().collect();
        let autofocus = node.flag("autofocus");

        if let Some(hook) = on_create {
            hook(self, id);
        }
        for name in events {
            self.renderer.listen(handle, &name);
        }

        if kind == NodeKind::Element {
            for child in children {
                let Some(c) = self.node(child) else { continue };
                if c.is_leaf() {
                    if !c.text().trim().is_empty() {
                        tracing::warn!(node = %child, text = %c.text(), "text outside of a text element");
                    }
                    continue;
                }
                if !c.is_rendered() {
                    self.render(child);
                }
            }
        }

        if autofocus {
            self.set_focus(id);
        }
        Ok(())
    }

    fn apply_geometry_defaults(&mut self, id: NodeId, kind: NodeKind, parent_width: f64, parent_height: f64) {
        let Some(node) = self.node(id) else { return };
        let mut writes: Vec<(&'static str, PropValue)> = Vec::new();
        let mut autosized = false;

        if !node.has_prop("x") {
            writes.push(("x", PropValue::Number(0.0)));
        }
        if !node.has_prop("y") {
            writes.push(("y", PropValue::Number(0.0)));
        }

        if kind == NodeKind::Element {
            let has_texture = node.prop("texture").is_some_and(PropValue::is_truthy);
            if !has_texture {
                if node.width().is_none() {
                    writes.push(("width", PropValue::Number(parent_width - node.x())));
                    autosized = true;
                }
                if node.height().is_none() {
                    writes.push(("height", PropValue::Number(parent_height - node.y())));
                    autosized = true;
                }
                let has_color = node.has_prop("color");
                if node.prop("rtt").is_some_and(PropValue::is_truthy) && !has_color {
                    writes.push(("color", PropValue::Number(0xffff_ffff_u32 as f64)));
                } else if !has_color && !node.prop("src").is_some_and(PropValue::is_truthy) {
                    // Without a color or source the engine would paint white.
                    writes.push(("color", PropValue::Number(0.0)));
                }
            }
        }

        for (name, value) in writes {
            self.write_prop(id, name, value);
        }
        if autosized {
            if let Some(node) = self.node_mut(id) {
                node.flags.insert(NodeFlags::AUTOSIZED);
            }
        }
    }

    fn prepare_text(&mut self, id: NodeId, parent_width: f64, parent_height: f64) {
        let fonts: Vec<_> = self
            .config
            .font_settings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (name, value) in fonts {
            if !self.node(id).is_some_and(|n| n.has_prop(&name)) {
                self.write_prop(id, &name, value);
            }
        }

        let text = self.get_text(id);
        self.write_prop(id, "text", PropValue::from(text));

        let Some(node) = self.node(id) else { return };
        if node.has_prop("textAlign") && !node.has_prop("contain") {
            tracing::warn!(node = %id, "textAlign requires contain to take effect");
        }

        let mut writes: Vec<(&'static str, f64)> = Vec::new();
        if let Some(contain) = node.string("contain") {
            if node.width().is_none() {
                writes.push(("width", parent_width - node.x() - node.margin_right()));
            }
            let max_lines = node.number("maxLines");
            if contain == "both" && node.height().is_none() && max_lines.is_none() {
                writes.push(("height", parent_height - node.y() - node.margin_bottom()));
            } else if max_lines == Some(1.0) && node.height().is_none() {
                let line = node
                    .number("lineHeight")
                    .or_else(|| node.number("fontSize"))
                    .unwrap_or(0.0);
                writes.push(("height", line));
            }
        }

        for (name, value) in writes {
            self.write_prop(id, name, PropValue::Number(value));
        }
    }

    /// Destroy a node queued for deletion, together with its subtree.
    /// Nodes re-inserted since the removal are left untouched.
    pub fn destroy(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else { return };
        if !node.flags.contains(NodeFlags::QUEUED_DELETE) {
            return;
        }
        self.log_node(id, "Destroying");
        if let Some(handle) = node.handle {
            self.renderer.destroy_node(handle);
        }

        let active = self.active_element.get();
        let mut lost_focus = false;
        for member in self.subtree(id) {
            if let Some(handle) = self.node(member).and_then(Node::handle) {
                self.handles.remove(&handle);
            }
            if active == Some(member) {
                self.active_element.set(None);
                lost_focus = true;
            }
            self.layout_queue.shift_remove(&member);
            self.focus_path.retain(|&f| f != member);
            self.release(member);
        }

        // Ancestors of a destroyed active element are no longer focused.
        if lost_focus {
            for ancestor in std::mem::take(&mut self.focus_path) {
                self.remove_state(ancestor, FOCUS_STATE);
                if let Some(hook) = self.node(ancestor).and_then(|n| n.hooks.on_blur.clone()) {
                    hook(self, ancestor, None, active);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::renderer::HeadlessRenderer;

    fn scene() -> (Scene, HeadlessRenderer) {
        let engine = HeadlessRenderer::new();
        let scene = Scene::new(Box::new(engine.clone()), Config::default());
        (scene, engine)
    }

    #[test]
    fn test_render_requires_rendered_parent() {
        let (mut scene, _) = scene();
        let orphan = scene.create_element("view");
        assert_eq!(scene.try_render(orphan), Err(SceneError::ParentMissing(orphan)));

        let parent = scene.create_element("view");
        let child = scene.create_element("view");
        scene.insert_node(parent, child, None);
        assert_eq!(
            scene.try_render(child),
            Err(SceneError::ParentNotRendered { node: child, parent })
        );
    }

    #[test]
    fn test_render_twice_is_rejected() {
        let (mut scene, _) = scene();
        let root = scene.root();
        let view = scene.create_element("view");
        scene.insert_node(root, view, None);

        assert_eq!(scene.try_render(view), Err(SceneError::AlreadyRendered(view)));
    }

    #[test]
    fn test_geometry_defaults_fill_parent() {
        let (mut scene, engine) = scene();
        let root = scene.root();
        let view = scene.create_element("view");
        scene.set_property(view, "x", 20);
        scene.insert_node(root, view, None);

        let node = scene.node(view).expect("view");
        let handle = node.handle().expect("handle");
        assert!(node.is_autosized());
        assert_eq!(engine.number(handle, "width"), Some(1900.0));
        assert_eq!(engine.number(handle, "height"), Some(1080.0));
        assert_eq!(engine.number(handle, "color"), Some(0.0));
    }

    #[test]
    fn test_rtt_defaults_to_white() {
        let (mut scene, engine) = scene();
        let root = scene.root();
        let view = scene.create_element("view");
        scene.set_property(view, "rtt", true);
        scene.insert_node(root, view, None);

        let handle = scene.node(view).and_then(Node::handle).expect("handle");
        assert_eq!(engine.number(handle, "color"), Some(0xffff_ffff_u32 as f64));
    }

    #[test]
    fn test_destroying_focused_node_blurs_ancestors() {
        let (mut scene, _) = scene();
        let root = scene.root();
        let list = scene.create_element("view");
        let item = scene.create_element("view");
        scene.insert_node(list, item, None);
        scene.insert_node(root, list, None);
        scene.set_focus(item);
        scene.run_microtasks();
        assert!(scene.has_focus(list));

        let blurred = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let log = blurred.clone();
        scene.set_on_blur(list, move |_, node, next, _| log.borrow_mut().push((node, next)));

        scene.remove_node(list, item);
        scene.run_microtasks();

        assert_eq!(scene.active_element(), None);
        assert!(scene.focus_path().is_empty());
        assert!(!scene.has_focus(list));
        assert!(!scene.has_focus(root));
        assert_eq!(blurred.borrow().as_slice(), &[(list, None)]);
    }

    #[test]
    fn test_destroy_skips_reinserted_node() {
        let (mut scene, engine) = scene();
        let root = scene.root();
        let view = scene.create_element("view");
        scene.insert_node(root, view, None);

        scene.remove_node(root, view);
        scene.insert_node(root, view, None);
        scene.run_microtasks();

        assert!(scene.contains(view));
        assert_eq!(engine.destroy_count(), 0);
    }
}
