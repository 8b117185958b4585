//! # spark-scene
//!
//! Retained scene graph that sits between a UI reconciler and an external
//! rendering engine.
//!
//! ## Architecture
//!
//! spark-scene keeps every node in a generational arena owned by a
//! [`Scene`]. Property writes are stored locally, buffered until the node
//! is committed, and forwarded to a [`Renderer`] afterwards, either
//! instantly or as an animated transition.
//!
//! ```text
//! reconciler → Scene (nodes, styles, states, flex layout) → Renderer
//!                 ^                                            │
//!                 └────────────── RendererEvent ───────────────┘
//! ```
//!
//! Deferred work (layout flushes, destruction, focus) is drained with
//! [`Scene::run_microtasks`].
//!
//! ## Modules
//!
//! - [`types`] - Core types (NodeId, PropValue, layout enums, flags)
//! - [`engine`] - Scene arena, nodes, property table, commit and animation
//! - [`layout`] - Batched flex layout
//! - [`state`] - State stacks, state styles, focus
//! - [`style`] - Style sheets and color parsing
//! - [`renderer`] - Renderer contract and the headless engine
//! - [`pipeline`] - Reconciler host operations

pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod renderer;
pub mod state;
pub mod style;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{Config, StateMapper};

pub use error::{Result, SceneError};

pub use engine::{
    forwarding, is_color_prop, Children, CreateHook, EventHook, FailHook, FocusHook, ForwardFocusHook,
    Forwarding, LayoutHook, LoadHook, Node, NodeStyle, Scene, ANIMATABLE_PROPS, INSTANT_PROPS,
};

pub use renderer::{AnimationId, HeadlessNode, HeadlessRenderer, RenderCall, Renderer, RendererEvent};

pub use state::{StateInit, StateList, States, FOCUS_STATE};

pub use style::{flatten_styles, hex_color, Style};
