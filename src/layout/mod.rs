//! Layout - batched, bottom-up re-layout of containers.
//!
//! Containers that need layout (flex display or a before-layout hook) are
//! queued when their children change and flushed once per microtask tick.
//! Size changes propagate to the parent, one level per changed container.
//!
//! # Example
//!
//! ```ignore
//! use spark_scene::{Scene, Config, HeadlessRenderer};
//!
//! let mut scene = Scene::new(Box::new(HeadlessRenderer::new()), Config::default());
//! let row = scene.create_element("view");
//! scene.set_property(row, "display", "flex");
//! scene.insert_node(scene.root(), row, None);
//! scene.run_microtasks(); // flushes the layout queue
//! ```

mod flex;

use crate::engine::{NodeStyle, Scene, Task};
use crate::types::{Dimensions, Display, NodeFlags, NodeId};

impl Scene {
    /// Queue a container for the next layout flush.
    pub(crate) fn queue_layout(&mut self, id: NodeId) {
        self.layout_queue.insert(id);
        if !self.layout_flush_queued {
            self.layout_flush_queued = true;
            self.tasks.push_back(Task::FlushLayout);
        }
    }

    /// Lay out every queued container, most recently queued first.
    pub(crate) fn flush_layout_queue(&mut self) {
        self.layout_flush_queued = false;
        let queued: Vec<NodeId> = self.layout_queue.drain(..).collect();
        for id in queued.into_iter().rev() {
            let Some(node) = self.node_mut(id) else { continue };
            node.flags.remove(NodeFlags::DIRTY);
            self.update_layout(id, None, None);
        }
    }

    /// Re-run layout for `id`. `child` and `dimensions` identify the child
    /// whose measurement triggered the pass, if any.
    pub fn update_layout(&mut self, id: NodeId, child: Option<NodeId>, dimensions: Option<Dimensions>) {
        let Some(node) = self.node(id) else { return };
        if !node.has_children() {
            return;
        }
        self.log_node(id, "Layout");

        let before = node.hooks.on_before_layout.clone();
        let after = node.hooks.on_layout.clone();
        let parent = node.parent;

        let mut changed = match before {
            Some(hook) => hook(self, id, child, dimensions),
            None => false,
        };
        if self.node(id).is_some_and(|n| n.display() == Display::Flex) {
            changed |= self.calculate_flex(id);
        }
        if changed {
            if let Some(parent) = parent {
                self.update_layout(parent, None, None);
            }
        }

        if let Some(hook) = after {
            hook(self, id, child, dimensions);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::config::Config;
    use crate::renderer::HeadlessRenderer;
    use crate::Scene;

    fn scene() -> Scene {
        Scene::new(Box::new(HeadlessRenderer::new()), Config::default())
    }

    #[test]
    fn test_queue_flushes_once_per_tick() {
        let mut scene = scene();
        let root = scene.root();
        let row = scene.create_element("view");
        scene.set_property(row, "display", "flex");
        scene.insert_node(root, row, None);

        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        scene.set_on_layout(row, move |_, _, _, _| {
            c.set(c.get() + 1);
            false
        });

        for _ in 0..3 {
            let child = scene.create_element("view");
            scene.set_property(child, "width", 10);
            scene.insert_node(row, child, None);
        }
        count.set(0);
        scene.run_microtasks();

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_before_layout_hook_marks_container() {
        let mut scene = scene();
        let root = scene.root();
        let view = scene.create_element("view");
        scene.set_on_before_layout(view, |_, _, _, _| false);

        assert!(scene.node(view).is_some_and(|n| n.requires_layout()));
        scene.insert_node(root, view, None);
    }
}
