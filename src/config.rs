//! Scene configuration.
//!
//! Held by the [`Scene`](crate::Scene) for its whole lifetime. There is no
//! global config: every scene carries its own.

use std::fmt;
use std::rc::Rc;

use compact_str::CompactString;

use crate::types::{AnimationSettings, PropMap, PropValue};

/// Remaps the raw active state names before style lookup.
pub type StateMapper = Rc<dyn Fn(&[CompactString]) -> Vec<CompactString>>;

/// Scene-wide settings.
#[derive(Clone)]
pub struct Config {
    /// Emit per-node debug diagnostics for every node.
    pub debug: bool,
    /// When false, transitions never start animations.
    pub animations_enabled: bool,
    /// Fallback for nodes without their own `animationSettings`.
    pub animation_settings: AnimationSettings,
    /// Defaults applied to text nodes for properties they leave unset.
    pub font_settings: PropMap,
    /// Root node width.
    pub app_width: f64,
    /// Root node height.
    pub app_height: f64,
    /// Optional hook rewriting active states before style lookup.
    pub state_mapper: Option<StateMapper>,
}

impl Default for Config {
    fn default() -> Self {
        let mut font_settings = PropMap::new();
        font_settings.insert("fontFamily".into(), PropValue::from("Ubuntu"));
        font_settings.insert("fontSize".into(), PropValue::Number(100.0));

        Self {
            debug: false,
            animations_enabled: true,
            animation_settings: AnimationSettings::default(),
            font_settings,
            app_width: 1920.0,
            app_height: 1080.0,
            state_mapper: None,
        }
    }
}

impl Config {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_animations(mut self, enabled: bool) -> Self {
        self.animations_enabled = enabled;
        self
    }

    pub fn with_animation_settings(mut self, settings: AnimationSettings) -> Self {
        self.animation_settings = settings;
        self
    }

    pub fn with_font_settings(mut self, fonts: PropMap) -> Self {
        self.font_settings = fonts;
        self
    }

    pub fn with_app_size(mut self, width: f64, height: f64) -> Self {
        self.app_width = width;
        self.app_height = height;
        self
    }

    pub fn with_state_mapper(
        mut self,
        mapper: impl Fn(&[CompactString]) -> Vec<CompactString> + 'static,
    ) -> Self {
        self.state_mapper = Some(Rc::new(mapper));
        self
    }

    /// Apply the state mapper, if any.
    pub(crate) fn map_states(&self, states: &[CompactString]) -> Vec<CompactString> {
        match &self.state_mapper {
            Some(mapper) => mapper(states),
            None => states.to_vec(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("debug", &self.debug)
            .field("animations_enabled", &self.animations_enabled)
            .field("animation_settings", &self.animation_settings)
            .field("font_settings", &self.font_settings)
            .field("app_width", &self.app_width)
            .field("app_height", &self.app_height)
            .field("state_mapper", &self.state_mapper.is_some())
            .finish()
    }
}
