//! Headless renderer - records every call instead of drawing.
//!
//! Used by the test suite and by hosts that want to run a scene without a
//! GPU. Cloning a `HeadlessRenderer` shares the same underlying state, so a
//! caller can hand one clone to the scene and keep another for inspection.
//!
//! # Example
//!
//! ```ignore
//! use spark_scene::{Config, HeadlessRenderer, Scene};
//!
//! let engine = HeadlessRenderer::new();
//! let mut scene = Scene::new(Box::new(engine.clone()), Config::default());
//! // ... build nodes ...
//! assert_eq!(engine.destroy_count(), 0);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::{AnimationId, Renderer};
use crate::types::{AnimationSettings, PropMap, PropValue, RenderHandle};

/// One recorded call into the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    CreateNode(RenderHandle),
    CreateTextNode(RenderHandle),
    Destroy(RenderHandle),
    SetProperty(RenderHandle, String, PropValue),
    UnsetProperty(RenderHandle, String),
    Listen(RenderHandle, String),
    SetParent(RenderHandle, Option<RenderHandle>),
    Animate(AnimationId, RenderHandle),
    StartAnimation(AnimationId),
}

/// State of one engine-side node.
#[derive(Debug, Clone, Default)]
pub struct HeadlessNode {
    pub props: PropMap,
    pub parent: Option<RenderHandle>,
    pub is_text: bool,
    pub destroyed: bool,
    /// Event names subscribed with `listen`.
    pub listeners: Vec<String>,
}

#[derive(Debug, Clone)]
struct HeadlessAnimation {
    handle: RenderHandle,
    props: PropMap,
    settings: AnimationSettings,
    started: bool,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_handle: u64,
    next_animation: u64,
    nodes: FxHashMap<RenderHandle, HeadlessNode>,
    animations: FxHashMap<AnimationId, HeadlessAnimation>,
    calls: Vec<RenderCall>,
}

/// In-memory [`Renderer`] implementation.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&mut self, props: &PropMap, parent: Option<RenderHandle>, is_text: bool) -> RenderHandle {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        let handle = RenderHandle(state.next_handle);
        state.nodes.insert(
            handle,
            HeadlessNode {
                props: props.clone(),
                parent,
                is_text,
                destroyed: false,
                listeners: Vec::new(),
            },
        );
        state.calls.push(if is_text {
            RenderCall::CreateTextNode(handle)
        } else {
            RenderCall::CreateNode(handle)
        });
        handle
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Snapshot of an engine-side node.
    pub fn node(&self, handle: RenderHandle) -> Option<HeadlessNode> {
        self.state.borrow().nodes.get(&handle).cloned()
    }

    /// Current value of one property on an engine-side node.
    pub fn prop(&self, handle: RenderHandle, name: &str) -> Option<PropValue> {
        self.state
            .borrow()
            .nodes
            .get(&handle)
            .and_then(|n| n.props.get(name).cloned())
    }

    /// Numeric property shortcut.
    pub fn number(&self, handle: RenderHandle, name: &str) -> Option<f64> {
        self.prop(handle, name).and_then(|v| v.as_number())
    }

    pub fn parent_of(&self, handle: RenderHandle) -> Option<RenderHandle> {
        self.state.borrow().nodes.get(&handle).and_then(|n| n.parent)
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.state.borrow().calls.clone()
    }

    /// Number of `destroy_node` calls for any handle.
    pub fn destroy_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, RenderCall::Destroy(_)))
            .count()
    }

    /// Number of `destroy_node` calls for one handle.
    pub fn destroy_calls(&self, handle: RenderHandle) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, RenderCall::Destroy(h) if *h == handle))
            .count()
    }

    /// Number of nodes created, text or plain.
    pub fn created_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, RenderCall::CreateNode(_) | RenderCall::CreateTextNode(_)))
            .count()
    }

    /// Target props and settings of an animation.
    pub fn animation(&self, id: AnimationId) -> Option<(RenderHandle, PropMap, AnimationSettings, bool)> {
        self.state
            .borrow()
            .animations
            .get(&id)
            .map(|a| (a.handle, a.props.clone(), a.settings.clone(), a.started))
    }

    /// Ids of every started animation, oldest first.
    pub fn started_animations(&self) -> Vec<AnimationId> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                RenderCall::StartAnimation(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded calls, keeping node state.
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }
}

impl Renderer for HeadlessRenderer {
    fn create_node(&mut self, props: &PropMap, parent: Option<RenderHandle>) -> RenderHandle {
        self.create(props, parent, false)
    }

    fn create_text_node(&mut self, props: &PropMap, parent: Option<RenderHandle>) -> RenderHandle {
        self.create(props, parent, true)
    }

    fn destroy_node(&mut self, handle: RenderHandle) {
        let mut state = self.state.borrow_mut();
        if let Some(node) = state.nodes.get_mut(&handle) {
            node.destroyed = true;
        }
        state.calls.push(RenderCall::Destroy(handle));
    }

    fn set_property(&mut self, handle: RenderHandle, name: &str, value: &PropValue) {
        let mut state = self.state.borrow_mut();
        if let Some(node) = state.nodes.get_mut(&handle) {
            node.props.insert(name.into(), value.clone());
        }
        state
            .calls
            .push(RenderCall::SetProperty(handle, name.to_string(), value.clone()));
    }

    fn unset_property(&mut self, handle: RenderHandle, name: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(node) = state.nodes.get_mut(&handle) {
            node.props.shift_remove(name);
        }
        state
            .calls
            .push(RenderCall::UnsetProperty(handle, name.to_string()));
    }

    fn listen(&mut self, handle: RenderHandle, event: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(node) = state.nodes.get_mut(&handle) {
            node.listeners.push(event.to_string());
        }
        state.calls.push(RenderCall::Listen(handle, event.to_string()));
    }

    fn set_parent(&mut self, handle: RenderHandle, parent: Option<RenderHandle>) {
        let mut state = self.state.borrow_mut();
        if let Some(node) = state.nodes.get_mut(&handle) {
            node.parent = parent;
        }
        state.calls.push(RenderCall::SetParent(handle, parent));
    }

    fn animate(
        &mut self,
        handle: RenderHandle,
        props: &PropMap,
        settings: &AnimationSettings,
    ) -> AnimationId {
        let mut state = self.state.borrow_mut();
        state.next_animation += 1;
        let id = AnimationId(state.next_animation);
        state.animations.insert(
            id,
            HeadlessAnimation {
                handle,
                props: props.clone(),
                settings: settings.clone(),
                started: false,
            },
        );
        state.calls.push(RenderCall::Animate(id, handle));
        id
    }

    /// Jumps straight to the end values; there is no clock.
    fn start_animation(&mut self, animation: AnimationId) {
        let mut state = self.state.borrow_mut();
        let target = state.animations.get_mut(&animation).map(|a| {
            a.started = true;
            (a.handle, a.props.clone())
        });
        if let Some((handle, props)) = target {
            if let Some(node) = state.nodes.get_mut(&handle) {
                for (k, v) in props {
                    node.props.insert(k, v);
                }
            }
        }
        state.calls.push(RenderCall::StartAnimation(animation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let engine = HeadlessRenderer::new();
        let mut driver = engine.clone();

        let mut props = PropMap::new();
        props.insert("x".into(), PropValue::Number(5.0));
        let h = driver.create_node(&props, None);

        assert_eq!(engine.number(h, "x"), Some(5.0));
        assert_eq!(engine.created_count(), 1);
    }

    #[test]
    fn test_animation_jumps_to_end() {
        let mut engine = HeadlessRenderer::new();
        let h = engine.create_node(&PropMap::new(), None);

        let mut props = PropMap::new();
        props.insert("alpha".into(), PropValue::Number(0.5));
        let id = engine.animate(h, &props, &AnimationSettings::default());
        assert_eq!(engine.number(h, "alpha"), None);

        engine.start_animation(id);
        assert_eq!(engine.number(h, "alpha"), Some(0.5));
        assert_eq!(engine.started_animations(), vec![id]);
    }

    #[test]
    fn test_unset_removes_the_value() {
        let mut engine = HeadlessRenderer::new();
        let mut props = PropMap::new();
        props.insert("clipping".into(), PropValue::Bool(true));
        let h = engine.create_node(&props, None);

        engine.unset_property(h, "clipping");
        assert_eq!(engine.prop(h, "clipping"), None);
    }

    #[test]
    fn test_destroy_is_recorded() {
        let mut engine = HeadlessRenderer::new();
        let h = engine.create_node(&PropMap::new(), None);
        engine.destroy_node(h);

        assert_eq!(engine.destroy_calls(h), 1);
        assert!(engine.node(h).is_some_and(|n| n.destroyed));
    }
}
