//! Core types for spark-scene.
//!
//! These types define the foundation that everything builds on: node
//! identity, property values, layout enums and node lifecycle flags.

use std::fmt;

use compact_str::CompactString;
use indexmap::IndexMap;

// =============================================================================
// Identity
// =============================================================================

/// Arena address of a node inside a [`Scene`](crate::Scene).
///
/// The generation makes ids of destroyed nodes stale instead of aliasing
/// whatever node later reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the arena.
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}v{}", self.index, self.generation)
    }
}

/// Opaque handle to a node materialized by the external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

/// Measured size reported by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// =============================================================================
// Property values
// =============================================================================

/// A property value as written by the reconciler or a style sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Number(f64),
    Str(CompactString),
    Bool(bool),
    Transition(Transition),
}

impl PropValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Loose truthiness, used only where the renderer contract itself is
    /// truthiness-based (e.g. `src`, `texture`, `rtt`).
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Str(s) => !s.is_empty(),
            Self::Bool(b) => *b,
            Self::Transition(t) => !matches!(t, Transition::Off),
        }
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for PropValue {
    fn from(v: i32) -> Self {
        Self::Number(v as f64)
    }
}

impl From<u32> for PropValue {
    fn from(v: u32) -> Self {
        Self::Number(v as f64)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Str(CompactString::from(v))
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Str(CompactString::from(v))
    }
}

impl From<Transition> for PropValue {
    fn from(v: Transition) -> Self {
        Self::Transition(v)
    }
}

/// Ordered property bag keyed by property name.
pub type PropMap = IndexMap<CompactString, PropValue>;

// =============================================================================
// Animation
// =============================================================================

/// Settings handed to the renderer when starting an animation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSettings {
    /// Duration in milliseconds.
    pub duration: f64,
    pub delay: f64,
    pub easing: CompactString,
    pub repeat: u32,
    pub looped: bool,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            duration: 250.0,
            delay: 0.0,
            easing: CompactString::from("ease-in-out"),
            repeat: 0,
            looped: false,
        }
    }
}

/// Per-property transition entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionSetting {
    /// Animate with the node's animation settings.
    Default,
    Settings(AnimationSettings),
}

/// Which animatable writes start an animation instead of an instant set.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Transition {
    #[default]
    Off,
    /// Every animatable property transitions with default settings.
    All,
    Props(IndexMap<CompactString, TransitionSetting>),
}

impl Transition {
    /// Transition for `name`: `None` when the write should be instant,
    /// `Some(None)` for default settings.
    pub fn lookup(&self, name: &str) -> Option<Option<&AnimationSettings>> {
        match self {
            Self::Off => None,
            Self::All => Some(None),
            Self::Props(props) => match props.get(name)? {
                TransitionSetting::Default => Some(None),
                TransitionSetting::Settings(s) => Some(Some(s)),
            },
        }
    }
}

// =============================================================================
// Layout enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Block,
    Flex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    FlexEnd,
    Center,
    SpaceBetween,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignItems {
    FlexStart,
    Center,
    FlexEnd,
}

/// Whether an autosized flex container may resize itself to its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexBoundary {
    #[default]
    Contain,
    Fixed,
}

impl Display {
    pub fn parse(s: &str) -> Self {
        match s {
            "flex" => Self::Flex,
            _ => Self::Block,
        }
    }
}

impl FlexDirection {
    pub fn parse(s: &str) -> Self {
        match s {
            "column" => Self::Column,
            _ => Self::Row,
        }
    }
}

impl JustifyContent {
    pub fn parse(s: &str) -> Self {
        match s {
            "flexEnd" => Self::FlexEnd,
            "center" => Self::Center,
            "spaceBetween" => Self::SpaceBetween,
            "spaceEvenly" => Self::SpaceEvenly,
            _ => Self::FlexStart,
        }
    }
}

impl AlignItems {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flexStart" => Some(Self::FlexStart),
            "center" => Some(Self::Center),
            "flexEnd" => Some(Self::FlexEnd),
            _ => None,
        }
    }
}

impl FlexBoundary {
    pub fn parse(s: &str) -> Self {
        match s {
            "fixed" => Self::Fixed,
            _ => Self::Contain,
        }
    }
}

// =============================================================================
// Node kind and lifecycle
// =============================================================================

/// What a node is, structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Structural node: owns children and participates in layout.
    Element,
    /// `<text>` element: committed as a renderer text node whose content
    /// is the concatenation of its leaf children.
    Text,
    /// Raw string produced by the reconciler. Never committed on its own.
    TextLeaf,
}

/// Lifecycle of a node relative to the external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    Unrendered,
    Rendered,
    QueuedForDelete,
}

bitflags::bitflags! {
    /// Per-node bookkeeping flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        /// Dimensions derived from context rather than assigned.
        const AUTOSIZED = 1 << 0;
        /// Children changed since the last layout pass.
        const DIRTY = 1 << 1;
        /// Removed by the reconciler; destroy runs unless re-inserted.
        const QUEUED_DELETE = 1 << 2;
        /// Next `Loaded` event feeds measured size back into layout.
        const AWAITING_LOAD = 1 << 3;
        /// Chained animation queue is currently playing.
        const ANIMATING = 1 << 4;
    }
}
