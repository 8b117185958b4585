//! Scene - the explicit context that owns every node and the renderer.
//!
//! Nodes live in a generational arena. Property writes go through
//! [`Scene::write_prop`], which buffers renderer-bound values until the
//! node is committed and forwards them (instantly or as a transition)
//! afterwards.
//!
//! # Lifecycle
//!
//! ```text
//! Scene::new ── root committed ── build/insert nodes ── run_microtasks ── ... ── shutdown
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use compact_str::CompactString;
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use spark_signals::{signal, Signal};

use super::node::{
    CreateHook, EventHook, FailHook, FocusHook, ForwardFocusHook, LayoutHook, LoadHook, Node,
    NodeStyle,
};
use super::props::{default_value, forwarding, is_color_prop, Forwarding};
use super::tasks::Task;
use crate::config::Config;
use crate::renderer::{AnimationId, Renderer, RendererEvent};
use crate::state::{StateInit, States};
use crate::style::{flatten_styles, hex_color, Style};
use crate::types::{NodeFlags, NodeId, NodeKind, PropMap, PropValue, RenderHandle};

// =============================================================================
// Arena
// =============================================================================

struct Slot {
    generation: u32,
    node: Option<Node>,
}

fn node_in(slots: &[Slot], id: NodeId) -> Option<&Node> {
    slots
        .get(id.index())
        .filter(|s| s.generation == id.generation)
        .and_then(|s| s.node.as_ref())
}

fn node_in_mut(slots: &mut [Slot], id: NodeId) -> Option<&mut Node> {
    slots
        .get_mut(id.index())
        .filter(|s| s.generation == id.generation)
        .and_then(|s| s.node.as_mut())
}

// =============================================================================
// Scene
// =============================================================================

pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    pub(crate) renderer: Box<dyn Renderer>,
    pub(crate) config: Config,
    root: NodeId,
    pub(crate) handles: FxHashMap<RenderHandle, NodeId>,
    pub(crate) animations: FxHashMap<AnimationId, NodeId>,
    pub(crate) layout_queue: IndexSet<NodeId>,
    pub(crate) layout_flush_queued: bool,
    pub(crate) tasks: VecDeque<Task>,
    state_changes: Rc<RefCell<Vec<NodeId>>>,
    pub(crate) active_element: Signal<Option<NodeId>>,
    pub(crate) focus_path: Vec<NodeId>,
}

impl Scene {
    /// Create a scene and commit its root node to `renderer`.
    pub fn new(renderer: Box<dyn Renderer>, config: Config) -> Self {
        let mut scene = Self {
            slots: Vec::new(),
            free: Vec::new(),
            renderer,
            config,
            root: NodeId::new(0, 0),
            handles: FxHashMap::default(),
            animations: FxHashMap::default(),
            layout_queue: IndexSet::new(),
            layout_flush_queued: false,
            tasks: VecDeque::new(),
            state_changes: Rc::new(RefCell::new(Vec::new())),
            active_element: signal(None),
            focus_path: Vec::new(),
        };

        let root = scene.alloc(NodeKind::Element, "root");
        let mut props = PropMap::new();
        props.insert("x".into(), PropValue::Number(0.0));
        props.insert("y".into(), PropValue::Number(0.0));
        props.insert("width".into(), PropValue::Number(scene.config.app_width));
        props.insert("height".into(), PropValue::Number(scene.config.app_height));

        let handle = scene.renderer.create_node(&props, None);
        if let Some(node) = node_in_mut(&mut scene.slots, root) {
            node.values = props;
            node.handle = Some(handle);
        }
        scene.handles.insert(handle, root);
        scene.root = root;

        tracing::debug!(root = %root, "scene initialized");
        scene
    }

    /// Destroy the root's backing node and hand the renderer back.
    pub fn shutdown(mut self) -> Box<dyn Renderer> {
        if let Some(handle) = self.node(self.root).and_then(Node::handle) {
            self.renderer.destroy_node(handle);
        }
        tracing::debug!("scene shut down");
        self.renderer
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        node_in(&self.slots, id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        node_in_mut(&mut self.slots, id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Node currently committed as `handle`.
    pub fn node_for_handle(&self, handle: RenderHandle) -> Option<NodeId> {
        self.handles.get(&handle).copied()
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind, name: &str) -> NodeId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let generation = self.slots[index as usize].generation;
        let id = NodeId::new(index, generation);

        let changes = self.state_changes.clone();
        let states = States::new(move || changes.borrow_mut().push(id), StateInit::default());
        self.slots[index as usize].node = Some(Node::new(kind, name, states));
        id
    }

    /// Free a slot. Its id becomes stale.
    pub(crate) fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            if slot.generation == id.generation && slot.node.is_some() {
                slot.node = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
            }
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Debug-level trace, gated by `Config::debug` or the node's `debug` prop.
    pub(crate) fn log_node(&self, id: NodeId, msg: &str) {
        if let Some(node) = self.node(id) {
            if self.config.debug || node.debug() {
                tracing::debug!(node = %id, name = %node.name(), "{}", msg);
            }
        }
    }

    // =========================================================================
    // Property access
    // =========================================================================

    pub fn prop(&self, id: NodeId, name: &str) -> Option<&PropValue> {
        self.node(id).and_then(|n| n.prop(name))
    }

    pub fn number(&self, id: NodeId, name: &str) -> Option<f64> {
        self.node(id).and_then(|n| n.number(name))
    }

    /// Store a value and route it by the property table: local only,
    /// pending until commit, or straight to the renderer.
    pub(crate) fn write_prop(&mut self, id: NodeId, name: &str, value: PropValue) {
        let value = if is_color_prop(name) && matches!(value, PropValue::Str(_)) {
            PropValue::Number(hex_color(&value))
        } else {
            value
        };
        let policy = forwarding(name);

        let Some(node) = node_in_mut(&mut self.slots, id) else {
            return;
        };
        node.values.insert(name.into(), value.clone());

        if !policy.reaches_renderer() {
            return;
        }

        let Some(handle) = node.handle else {
            node.pending.insert(name.into(), value);
            return;
        };

        if policy == Forwarding::Animatable && self.config.animations_enabled {
            if let Some(setting) = node.transition().and_then(|t| t.lookup(name)) {
                let settings = setting
                    .cloned()
                    .or_else(|| node.animation_settings.clone())
                    .unwrap_or_else(|| self.config.animation_settings.clone());
                let mut props = PropMap::new();
                props.insert(name.into(), value);
                let animation = self.renderer.animate(handle, &props, &settings);
                self.renderer.start_animation(animation);
                self.animations.insert(animation, id);
                return;
            }
        }

        self.renderer.set_property(handle, name, &value);
    }

    /// Roll a property back to "never set". Renderer-bound properties with
    /// a known engine default get that default; any other renderer-bound
    /// property is cleared on the engine side too.
    pub(crate) fn unset_prop(&mut self, id: NodeId, name: &str) {
        if let Some(value) = default_value(name) {
            self.write_prop(id, name, value);
            return;
        }
        let reaches_renderer = forwarding(name).reaches_renderer();
        let Some(node) = self.node_mut(id) else { return };
        node.values.shift_remove(name);
        node.pending.shift_remove(name);
        let handle = node.handle;

        if let (true, Some(handle)) = (reaches_renderer, handle) {
            self.renderer.unset_property(handle, name);
        }
    }

    // =========================================================================
    // Style
    // =========================================================================

    /// Assign a style sheet. Properties the node already holds win.
    pub fn set_style(&mut self, id: NodeId, style: Style) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let assign: Vec<(CompactString, PropValue)> = style
            .props()
            .filter(|(k, _)| !node.has_prop(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        node.style = Some(style);

        for (key, value) in assign {
            self.write_prop(id, &key, value);
        }
    }

    /// Flatten several sheets (first definition wins) and assign the result.
    pub fn set_styles(&mut self, id: NodeId, styles: &[Style]) {
        self.set_style(id, flatten_styles(styles));
    }

    pub fn set_animation_settings(&mut self, id: NodeId, settings: crate::AnimationSettings) {
        if let Some(node) = self.node_mut(id) {
            node.animation_settings = Some(settings);
        }
    }

    // =========================================================================
    // States
    // =========================================================================

    /// Replace the node's state stack. Resolves immediately when rendered.
    pub fn set_states(&mut self, id: NodeId, initial: impl Into<StateInit>) {
        let changes = self.state_changes.clone();
        let rendered = match self.node_mut(id) {
            Some(node) => {
                node.states = States::new(move || changes.borrow_mut().push(id), initial);
                node.is_rendered()
            }
            None => return,
        };
        if rendered {
            self.resolve_states(id);
        }
    }

    /// Mutate the state stack; any change is resolved before returning.
    pub fn with_states<R>(&mut self, id: NodeId, f: impl FnOnce(&mut States) -> R) -> Option<R> {
        let result = self.node_mut(id).map(|n| f(&mut n.states));
        self.flush_state_changes();
        result
    }

    pub fn add_state(&mut self, id: NodeId, state: &str) -> bool {
        self.with_states(id, |s| s.add(state)).unwrap_or(false)
    }

    pub fn remove_state(&mut self, id: NodeId, state: &str) -> bool {
        self.with_states(id, |s| s.remove(state)).unwrap_or(false)
    }

    pub fn toggle_state(&mut self, id: NodeId, state: &str) {
        self.with_states(id, |s| s.toggle(state));
    }

    pub fn has_state(&self, id: NodeId, state: &str) -> bool {
        self.node(id).is_some_and(|n| n.states.has(state))
    }

    /// Resolve styles for every rendered node whose states changed.
    /// Unrendered nodes resolve once at commit.
    pub(crate) fn flush_state_changes(&mut self) {
        loop {
            let changed: Vec<NodeId> = std::mem::take(&mut *self.state_changes.borrow_mut());
            if changed.is_empty() {
                break;
            }
            let mut seen = FxHashSet::default();
            for id in changed {
                if seen.insert(id) && self.node(id).is_some_and(Node::is_rendered) {
                    self.resolve_states(id);
                }
            }
        }
    }

    // =========================================================================
    // Hooks
    // =========================================================================

    pub fn set_on_create(&mut self, id: NodeId, hook: impl Fn(&mut Scene, NodeId) + 'static) {
        if let Some(node) = self.node_mut(id) {
            node.hooks.on_create = Some(Rc::new(hook) as CreateHook);
        }
    }

    pub fn set_on_load(
        &mut self,
        id: NodeId,
        hook: impl Fn(&mut Scene, NodeId, crate::Dimensions) + 'static,
    ) {
        if let Some(node) = self.node_mut(id) {
            node.hooks.on_load = Some(Rc::new(hook) as LoadHook);
        }
    }

    pub fn set_on_fail(&mut self, id: NodeId, hook: impl Fn(&mut Scene, NodeId, &str) + 'static) {
        if let Some(node) = self.node_mut(id) {
            node.hooks.on_fail = Some(Rc::new(hook) as FailHook);
        }
    }

    pub fn set_on_before_layout(
        &mut self,
        id: NodeId,
        hook: impl Fn(&mut Scene, NodeId, Option<NodeId>, Option<crate::Dimensions>) -> bool + 'static,
    ) {
        if let Some(node) = self.node_mut(id) {
            node.hooks.on_before_layout = Some(Rc::new(hook) as LayoutHook);
        }
    }

    /// Runs after every layout pass on the node. The return value is ignored.
    pub fn set_on_layout(
        &mut self,
        id: NodeId,
        hook: impl Fn(&mut Scene, NodeId, Option<NodeId>, Option<crate::Dimensions>) -> bool + 'static,
    ) {
        if let Some(node) = self.node_mut(id) {
            node.hooks.on_layout = Some(Rc::new(hook) as LayoutHook);
        }
    }

    pub fn set_on_focus(
        &mut self,
        id: NodeId,
        hook: impl Fn(&mut Scene, NodeId, Option<NodeId>, Option<NodeId>) + 'static,
    ) {
        if let Some(node) = self.node_mut(id) {
            node.hooks.on_focus = Some(Rc::new(hook) as FocusHook);
        }
    }

    pub fn set_on_blur(
        &mut self,
        id: NodeId,
        hook: impl Fn(&mut Scene, NodeId, Option<NodeId>, Option<NodeId>) + 'static,
    ) {
        if let Some(node) = self.node_mut(id) {
            node.hooks.on_blur = Some(Rc::new(hook) as FocusHook);
        }
    }

    pub fn set_forward_focus(&mut self, id: NodeId, hook: impl Fn(&mut Scene, NodeId) -> bool + 'static) {
        if let Some(node) = self.node_mut(id) {
            node.hooks.forward_focus = Some(Rc::new(hook) as ForwardFocusHook);
        }
    }

    /// Replace the node's named event handlers. Each name is subscribed on
    /// the engine at commit, or right away when already rendered.
    pub fn set_on_events(&mut self, id: NodeId, events: Vec<(CompactString, EventHook)>) {
        let Some(node) = self.node_mut(id) else { return };
        let handle = node.handle;
        let names: Vec<CompactString> = events.iter().map(|(name, _)| name.clone()).collect();
        node.hooks.on_events = events;

        if let Some(handle) = handle {
            for name in names {
                self.renderer.listen(handle, &name);
            }
        }
    }

    // =========================================================================
    // Renderer events
    // =========================================================================

    /// Deliver an engine event for `handle`.
    pub fn handle_event(&mut self, handle: RenderHandle, event: RendererEvent) {
        match event {
            RendererEvent::Loaded { dimensions } => {
                let Some(id) = self.node_for_handle(handle) else {
                    return;
                };
                let Some(node) = self.node_mut(id) else {
                    return;
                };
                let awaiting = node.flags.contains(NodeFlags::AWAITING_LOAD);
                if awaiting {
                    node.flags.remove(NodeFlags::AWAITING_LOAD);
                    // The engine already holds the measured size.
                    node.values.insert("width".into(), PropValue::Number(dimensions.width));
                    node.values.insert("height".into(), PropValue::Number(dimensions.height));
                }
                let parent = node.parent;
                let on_load = node.hooks.on_load.clone();

                if let Some(hook) = on_load {
                    hook(self, id, dimensions);
                }
                if awaiting {
                    if let Some(parent) = parent {
                        self.update_layout(parent, Some(id), Some(dimensions));
                    }
                }
            }
            RendererEvent::Failed { reason } => {
                let Some(id) = self.node_for_handle(handle) else {
                    return;
                };
                let on_fail = self.node(id).and_then(|n| n.hooks.on_fail.clone());
                match on_fail {
                    Some(hook) => hook(self, id, reason.as_str()),
                    None => tracing::debug!(node = %id, %reason, "load failed"),
                }
            }
            RendererEvent::AnimationFinished { animation } => {
                self.animation_finished(animation);
            }
            RendererEvent::Custom { name, data } => {
                let Some(id) = self.node_for_handle(handle) else {
                    return;
                };
                let handlers: Vec<EventHook> = self
                    .node(id)
                    .map(|n| {
                        n.hooks
                            .on_events
                            .iter()
                            .filter(|(event, _)| *event == name)
                            .map(|(_, hook)| hook.clone())
                            .collect()
                    })
                    .unwrap_or_default();
                for hook in handlers {
                    hook(self, id, &data);
                }
            }
        }
        self.flush_state_changes();
    }

    // =========================================================================
    // Tree queries
    // =========================================================================

    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|n| n.children.iter().collect())
            .unwrap_or_default()
    }

    /// Child at the node's `selected` index (0 when unset).
    pub fn selected_child(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        node.children.selected(node.selected())
    }

    /// Direct child with a matching `id` property.
    pub fn get_child_by_id(&self, id: NodeId, child_id: &str) -> Option<NodeId> {
        let node = self.node(id)?;
        node.children
            .iter()
            .find(|&c| self.node(c).and_then(|n| n.id()) == Some(child_id))
    }

    /// Depth-first search of the whole subtree.
    pub fn search_children_by_id(&self, id: NodeId, child_id: &str) -> Option<NodeId> {
        let node = self.node(id)?;
        for child in node.children.iter() {
            let Some(c) = self.node(child) else { continue };
            if c.is_leaf() {
                continue;
            }
            if c.id() == Some(child_id) {
                return Some(child);
            }
            if let Some(found) = self.search_children_by_id(child, child_id) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated payload of the node's text leaves.
    pub fn get_text(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        node.children
            .iter()
            .filter_map(|c| self.node(c))
            .filter(|c| c.is_leaf())
            .map(Node::text)
            .collect()
    }

    /// The node and all its descendants, parents first.
    pub(crate) fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.node(current) {
                out.push(current);
                stack.extend(node.children.iter());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{HeadlessRenderer, RenderCall};
    use crate::types::Transition;

    fn scene() -> (Scene, HeadlessRenderer) {
        let engine = HeadlessRenderer::new();
        let scene = Scene::new(Box::new(engine.clone()), Config::default());
        (scene, engine)
    }

    #[test]
    fn test_root_is_committed() {
        let (scene, engine) = scene();
        let root = scene.node(scene.root()).expect("root");
        let handle = root.handle().expect("root handle");

        assert_eq!(engine.number(handle, "width"), Some(1920.0));
        assert_eq!(scene.node_for_handle(handle), Some(scene.root()));
    }

    #[test]
    fn test_stale_ids_do_not_alias() {
        let (mut scene, _) = scene();
        let a = scene.alloc(NodeKind::Element, "view");
        scene.release(a);
        let b = scene.alloc(NodeKind::Element, "view");

        assert_eq!(a.index(), b.index());
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
    }

    #[test]
    fn test_write_prop_buffers_before_render() {
        let (mut scene, engine) = scene();
        let id = scene.alloc(NodeKind::Element, "view");
        scene.write_prop(id, "x", PropValue::Number(10.0));
        scene.write_prop(id, "gap", PropValue::Number(4.0));

        let node = scene.node(id).expect("node");
        assert_eq!(node.pending.get("x"), Some(&PropValue::Number(10.0)));
        // Local props never reach the pending bag
        assert!(node.pending.get("gap").is_none());
        assert_eq!(node.gap(), 4.0);
        assert_eq!(engine.created_count(), 1);
    }

    #[test]
    fn test_color_strings_are_normalized() {
        let (mut scene, _) = scene();
        let id = scene.alloc(NodeKind::Element, "view");
        scene.write_prop(id, "color", PropValue::from("#ff0000"));

        assert_eq!(scene.number(id, "color"), Some(0xff0000ff_u32 as f64));
    }

    #[test]
    fn test_style_does_not_override_explicit_props() {
        let (mut scene, _) = scene();
        let id = scene.alloc(NodeKind::Element, "view");
        scene.write_prop(id, "alpha", PropValue::Number(0.0));
        scene.set_style(id, Style::new().set("alpha", 1).set("width", 100));

        assert_eq!(scene.number(id, "alpha"), Some(0.0));
        assert_eq!(scene.number(id, "width"), Some(100.0));
    }

    #[test]
    fn test_rollback_without_default_clears_engine_value() {
        let (mut scene, engine) = scene();
        let root = scene.root();
        let view = scene.create_element("view");
        scene.set_style(view, Style::new().state("focus", Style::new().set("clipping", true)));
        scene.insert_node(root, view, None);
        let handle = scene.node(view).and_then(Node::handle).expect("handle");
        let before = engine.prop(handle, "clipping");

        scene.add_state(view, "focus");
        assert_eq!(engine.prop(handle, "clipping"), Some(PropValue::Bool(true)));

        scene.remove_state(view, "focus");
        assert_eq!(engine.prop(handle, "clipping"), before);
        assert!(scene.prop(view, "clipping").is_none());
    }

    #[test]
    fn test_named_events_reach_their_handlers() {
        let (mut scene, engine) = scene();
        let root = scene.root();
        let view = scene.create_element("view");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let on_scroll: EventHook = Rc::new(move |_: &mut Scene, node: NodeId, data: &PropValue| {
            log.borrow_mut().push((node, data.clone()))
        });
        scene.set_on_events(view, vec![("scrolled".into(), on_scroll)]);
        assert!(engine.calls().iter().all(|c| !matches!(c, RenderCall::Listen(..))));

        scene.insert_node(root, view, None);
        let handle = scene.node(view).and_then(Node::handle).expect("handle");
        assert_eq!(
            engine.node(handle).map(|n| n.listeners),
            Some(vec!["scrolled".to_string()])
        );

        scene.handle_event(
            handle,
            RendererEvent::Custom { name: "scrolled".into(), data: PropValue::Number(3.0) },
        );
        scene.handle_event(
            handle,
            RendererEvent::Custom { name: "other".into(), data: PropValue::Number(4.0) },
        );
        assert_eq!(seen.borrow().as_slice(), &[(view, PropValue::Number(3.0))]);
    }

    #[test]
    fn test_transition_write_on_rendered_node_animates() {
        let (mut scene, engine) = scene();
        let root = scene.root();
        scene.write_prop(root, "transition", PropValue::Transition(Transition::All));
        engine.clear_calls();

        scene.write_prop(root, "alpha", PropValue::Number(0.5));

        assert_eq!(engine.started_animations().len(), 1);
        assert_eq!(scene.number(root, "alpha"), Some(0.5));
    }
}
