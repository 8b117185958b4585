//! Renderer contract.
//!
//! The scene never draws anything itself. It drives an external engine
//! through the [`Renderer`] trait: nodes are materialized into opaque
//! [`RenderHandle`]s, properties are pushed onto them, and the engine
//! reports back asynchronous results as [`RendererEvent`]s delivered via
//! [`Scene::handle_event`](crate::Scene::handle_event).
//!
//! [`HeadlessRenderer`] is an in-memory engine that records every call.

mod headless;

pub use headless::*;

use compact_str::CompactString;

use crate::types::{AnimationSettings, Dimensions, PropMap, PropValue, RenderHandle};

/// Identifies one animation started on the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationId(pub u64);

/// Capabilities consumed from the external rendering engine.
pub trait Renderer {
    /// Materialize a plain node with its initial properties.
    fn create_node(&mut self, props: &PropMap, parent: Option<RenderHandle>) -> RenderHandle;

    /// Materialize a text node. Its size is resolved asynchronously and
    /// reported with [`RendererEvent::Loaded`].
    fn create_text_node(&mut self, props: &PropMap, parent: Option<RenderHandle>) -> RenderHandle;

    /// Release a node and everything the engine attached below it.
    fn destroy_node(&mut self, handle: RenderHandle);

    /// Set a single property instantly.
    fn set_property(&mut self, handle: RenderHandle, name: &str, value: &PropValue);

    /// Clear a property back to the engine's own default.
    fn unset_property(&mut self, handle: RenderHandle, name: &str);

    /// Subscribe to a named engine event on `handle`. Occurrences are
    /// reported with [`RendererEvent::Custom`].
    fn listen(&mut self, handle: RenderHandle, event: &str);

    /// Re-link a node under another parent, or detach it.
    fn set_parent(&mut self, handle: RenderHandle, parent: Option<RenderHandle>);

    /// Prepare an interpolated animation towards `props`.
    fn animate(
        &mut self,
        handle: RenderHandle,
        props: &PropMap,
        settings: &AnimationSettings,
    ) -> AnimationId;

    /// Start a prepared animation. Completion is reported with
    /// [`RendererEvent::AnimationFinished`].
    fn start_animation(&mut self, animation: AnimationId);
}

/// Asynchronous notifications from the engine about a handle.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererEvent {
    /// Texture or text finished loading; carries the measured size.
    Loaded { dimensions: Dimensions },
    /// Texture or image failed to load.
    Failed { reason: CompactString },
    /// An animation started on this handle came to a stop.
    AnimationFinished { animation: AnimationId },
    /// A named event the scene subscribed to with [`Renderer::listen`].
    Custom { name: CompactString, data: PropValue },
}
