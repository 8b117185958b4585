//! Explicit animations and animation chains.
//!
//! `animate` hands a target property bag to the renderer. `chain` queues
//! bags that `start` plays back one after another; each finished animation
//! (reported through [`RendererEvent::AnimationFinished`]) starts the next.
//!
//! [`RendererEvent::AnimationFinished`]: crate::renderer::RendererEvent::AnimationFinished

use super::scene::Scene;
use crate::error::{Result, SceneError};
use crate::renderer::AnimationId;
use crate::types::{AnimationSettings, NodeFlags, NodeId, PropMap};

impl Scene {
    /// Prepare an animation of `props` on a rendered node. The local values
    /// take the target immediately; the caller starts it with
    /// [`Scene::start_animation`].
    pub fn animate(
        &mut self,
        id: NodeId,
        props: PropMap,
        settings: Option<AnimationSettings>,
    ) -> Result<AnimationId> {
        let fallback = self.config.animation_settings.clone();
        let node = self.node_mut(id).ok_or(SceneError::UnknownNode(id))?;
        let handle = node.handle.ok_or(SceneError::NotRendered(id))?;
        let settings = settings
            .or_else(|| node.animation_settings.clone())
            .unwrap_or(fallback);

        for (key, value) in &props {
            node.values.insert(key.clone(), value.clone());
        }

        let animation = self.renderer.animate(handle, &props, &settings);
        self.animations.insert(animation, id);
        Ok(animation)
    }

    pub fn start_animation(&mut self, animation: AnimationId) {
        self.renderer.start_animation(animation);
    }

    /// Append a step to the node's animation chain.
    ///
    /// Chaining onto a running chain starts a fresh queue; the step that is
    /// currently playing still finishes and then hands over to it. Settings
    /// given to the first step apply to every later step that omits them.
    pub fn chain(&mut self, id: NodeId, props: PropMap, settings: Option<AnimationSettings>) {
        let fallback = self.config.animation_settings.clone();
        let Some(node) = self.node_mut(id) else { return };
        if node.flags.contains(NodeFlags::ANIMATING) {
            node.animation_queue.clear();
            node.animation_queue_settings = None;
            node.flags.remove(NodeFlags::ANIMATING);
        }

        let settings = match settings {
            Some(settings) => {
                if node.animation_queue_settings.is_none() {
                    node.animation_queue_settings = Some(settings.clone());
                }
                settings
            }
            None => node
                .animation_queue_settings
                .clone()
                .or_else(|| node.animation_settings.clone())
                .unwrap_or(fallback),
        };
        node.animation_queue.push_back((props, settings));
    }

    /// Play the chain from its first queued step.
    pub fn start(&mut self, id: NodeId) -> Result<()> {
        self.play_next(id)
    }

    fn play_next(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id).ok_or(SceneError::UnknownNode(id))?;
        let Some((props, settings)) = node.animation_queue.pop_front() else {
            node.flags.remove(NodeFlags::ANIMATING);
            node.animation_queue_settings = None;
            node.current_animation = None;
            return Ok(());
        };
        node.flags.insert(NodeFlags::ANIMATING);

        let animation = self.animate(id, props, Some(settings))?;
        if let Some(node) = self.node_mut(id) {
            node.current_animation = Some(animation);
        }
        self.renderer.start_animation(animation);
        Ok(())
    }

    pub(crate) fn animation_finished(&mut self, animation: AnimationId) {
        let Some(id) = self.animations.remove(&animation) else {
            return;
        };
        let chained = self
            .node(id)
            .is_some_and(|n| n.current_animation == Some(animation));
        if chained {
            if let Err(err) = self.play_next(id) {
                tracing::warn!(node = %id, %err, "animation chain stopped");
            }
        }
    }

    /// True while a chain is playing on the node.
    pub fn is_animating(&self, id: NodeId) -> bool {
        self.node(id)
            .is_some_and(|n| n.flags.contains(NodeFlags::ANIMATING))
    }
}
