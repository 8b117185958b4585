//! Node - the entity behind every element, text element and text leaf.
//!
//! A node owns its local property values (the source of truth for reads),
//! a pending bag of renderer-bound writes made before commit, its children,
//! its style sheet and its state stack. Everything that needs the arena or
//! the renderer lives on [`Scene`](crate::Scene).

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use compact_str::CompactString;
use indexmap::IndexMap;

use super::children::Children;
use crate::renderer::AnimationId;
use crate::state::States;
use crate::style::Style;
use crate::types::{
    AlignItems, AnimationSettings, Dimensions, Display, FlexBoundary, FlexDirection,
    JustifyContent, NodeFlags, NodeId, NodeKind, PropMap, PropValue, RenderHandle,
    RenderStatus, Transition,
};
use crate::Scene;

// =============================================================================
// Hooks
// =============================================================================

/// Runs after the node is committed.
pub type CreateHook = Rc<dyn Fn(&mut Scene, NodeId)>;
/// Runs on every `Loaded` event for the node's handle.
pub type LoadHook = Rc<dyn Fn(&mut Scene, NodeId, Dimensions)>;
/// Runs on a `Failed` event for the node's handle.
pub type FailHook = Rc<dyn Fn(&mut Scene, NodeId, &str)>;
/// Layout hook: `(scene, node, child that triggered it, child dimensions)`.
/// Before-layout hooks return true when they changed the node's size.
pub type LayoutHook = Rc<dyn Fn(&mut Scene, NodeId, Option<NodeId>, Option<Dimensions>) -> bool>;
/// Focus hook: `(scene, node, newly focused, previously focused)`.
pub type FocusHook = Rc<dyn Fn(&mut Scene, NodeId, Option<NodeId>, Option<NodeId>)>;
/// Custom focus forwarding. Returns true when focus was handled.
pub type ForwardFocusHook = Rc<dyn Fn(&mut Scene, NodeId) -> bool>;
/// Handler for a named engine event: `(scene, node, event data)`.
pub type EventHook = Rc<dyn Fn(&mut Scene, NodeId, &PropValue)>;

#[derive(Clone, Default)]
pub(crate) struct NodeHooks {
    pub on_create: Option<CreateHook>,
    pub on_load: Option<LoadHook>,
    pub on_fail: Option<FailHook>,
    pub on_before_layout: Option<LayoutHook>,
    pub on_layout: Option<LayoutHook>,
    pub on_focus: Option<FocusHook>,
    pub on_blur: Option<FocusHook>,
    pub forward_focus: Option<ForwardFocusHook>,
    pub on_events: Vec<(CompactString, EventHook)>,
}

// =============================================================================
// Style capability
// =============================================================================

/// Read access to the externally settable style and geometry properties.
///
/// Every method reads the node's local values; writes always go through
/// the scene so they can be buffered or forwarded.
pub trait NodeStyle {
    fn prop(&self, name: &str) -> Option<&PropValue>;

    fn has_prop(&self, name: &str) -> bool {
        self.prop(name).is_some()
    }

    fn number(&self, name: &str) -> Option<f64> {
        self.prop(name).and_then(PropValue::as_number)
    }

    fn string(&self, name: &str) -> Option<&str> {
        self.prop(name).and_then(PropValue::as_str)
    }

    /// True only for an explicit `true`.
    fn flag(&self, name: &str) -> bool {
        self.prop(name).and_then(PropValue::as_bool).unwrap_or(false)
    }

    fn id(&self) -> Option<&str> {
        self.string("id")
    }

    fn x(&self) -> f64 {
        self.number("x").unwrap_or(0.0)
    }

    fn y(&self) -> f64 {
        self.number("y").unwrap_or(0.0)
    }

    fn width(&self) -> Option<f64> {
        self.number("width")
    }

    fn height(&self) -> Option<f64> {
        self.number("height")
    }

    fn margin_top(&self) -> f64 {
        self.number("marginTop").unwrap_or(0.0)
    }

    fn margin_right(&self) -> f64 {
        self.number("marginRight").unwrap_or(0.0)
    }

    fn margin_bottom(&self) -> f64 {
        self.number("marginBottom").unwrap_or(0.0)
    }

    fn margin_left(&self) -> f64 {
        self.number("marginLeft").unwrap_or(0.0)
    }

    fn display(&self) -> Display {
        self.string("display").map(Display::parse).unwrap_or_default()
    }

    fn flex_direction(&self) -> FlexDirection {
        self.string("flexDirection").map(FlexDirection::parse).unwrap_or_default()
    }

    fn justify_content(&self) -> JustifyContent {
        self.string("justifyContent").map(JustifyContent::parse).unwrap_or_default()
    }

    fn align_items(&self) -> Option<AlignItems> {
        self.string("alignItems").and_then(AlignItems::parse)
    }

    fn gap(&self) -> f64 {
        self.number("gap").unwrap_or(0.0)
    }

    fn flex_boundary(&self) -> FlexBoundary {
        self.string("flexBoundary").map(FlexBoundary::parse).unwrap_or_default()
    }

    /// Participates in flex placement unless explicitly `false`.
    fn flex_item(&self) -> bool {
        self.prop("flexItem").and_then(PropValue::as_bool).unwrap_or(true)
    }

    fn forward_states(&self) -> bool {
        self.flag("forwardStates")
    }

    fn selected(&self) -> Option<usize> {
        self.number("selected").filter(|n| *n >= 0.0).map(|n| n as usize)
    }

    fn transition(&self) -> Option<&Transition> {
        match self.prop("transition") {
            Some(PropValue::Transition(t)) => Some(t),
            _ => None,
        }
    }

    fn debug(&self) -> bool {
        self.flag("debug")
    }
}

// =============================================================================
// Node
// =============================================================================

pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) name: CompactString,
    /// Payload of a text leaf.
    pub(crate) text: CompactString,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Children,
    pub(crate) values: PropMap,
    /// Renderer-bound writes made while unrendered.
    pub(crate) pending: PropMap,
    pub(crate) handle: Option<RenderHandle>,
    pub(crate) flags: NodeFlags,
    pub(crate) style: Option<Style>,
    pub(crate) states: States,
    /// Pre-state value of every property currently driven by a state.
    pub(crate) state_undo: IndexMap<CompactString, Option<PropValue>>,
    pub(crate) animation_settings: Option<AnimationSettings>,
    pub(crate) animation_queue: VecDeque<(PropMap, AnimationSettings)>,
    pub(crate) animation_queue_settings: Option<AnimationSettings>,
    pub(crate) current_animation: Option<AnimationId>,
    pub(crate) hooks: NodeHooks,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, name: &str, states: States) -> Self {
        Self {
            kind,
            name: name.into(),
            text: CompactString::default(),
            parent: None,
            children: Children::new(),
            values: PropMap::new(),
            pending: PropMap::new(),
            handle: None,
            flags: NodeFlags::empty(),
            style: None,
            states,
            state_undo: IndexMap::new(),
            animation_settings: None,
            animation_queue: VecDeque::new(),
            animation_queue_settings: None,
            current_animation: None,
            hooks: NodeHooks::default(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Leaf payload; empty for elements.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn handle(&self) -> Option<RenderHandle> {
        self.handle
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn states(&self) -> &States {
        &self.states
    }

    pub fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    pub fn values(&self) -> &PropMap {
        &self.values
    }

    pub fn status(&self) -> RenderStatus {
        if self.flags.contains(NodeFlags::QUEUED_DELETE) {
            RenderStatus::QueuedForDelete
        } else if self.handle.is_some() {
            RenderStatus::Rendered
        } else {
            RenderStatus::Unrendered
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_text_node(&self) -> bool {
        self.kind == NodeKind::Text
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::TextLeaf
    }

    pub fn is_autosized(&self) -> bool {
        self.flags.contains(NodeFlags::AUTOSIZED)
    }

    pub fn is_dirty(&self) -> bool {
        self.flags.contains(NodeFlags::DIRTY)
    }

    /// Flex or a before-layout hook means children placement is computed.
    pub fn requires_layout(&self) -> bool {
        self.display() == Display::Flex || self.hooks.on_before_layout.is_some()
    }
}

impl NodeStyle for Node {
    fn prop(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("id", &self.id())
            .field("parent", &self.parent)
            .field("children", &self.children.len())
            .field("status", &self.status())
            .field("flags", &self.flags)
            .field("states", &self.states)
            .finish()
    }
}
