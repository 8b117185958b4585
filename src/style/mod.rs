//! Style sheets.
//!
//! A [`Style`] is an ordered map of property name to value plus nested
//! per-state override blocks. When a node is styled, a property the node
//! already holds is never overwritten; state blocks are applied later by
//! state resolution.
//!
//! # Example
//!
//! ```ignore
//! use spark_scene::Style;
//!
//! let button = Style::new()
//!     .set("width", 200)
//!     .set("color", "#333333")
//!     .state("focus", Style::new().set("color", "#ffffff").set("scale", 1.1));
//! ```

use compact_str::CompactString;
use indexmap::IndexMap;

use crate::types::{PropMap, PropValue};

// =============================================================================
// Style container
// =============================================================================

/// Property values plus per-state override blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    props: PropMap,
    states: IndexMap<CompactString, PropMap>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a property value.
    pub fn set(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder: add a state block. Only the block's plain properties are
    /// kept; state blocks do not nest.
    pub fn state(mut self, name: &str, block: Style) -> Self {
        self.insert_state(name, block.props);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<PropValue>) {
        self.props.insert(CompactString::from(name), value.into());
    }

    pub fn insert_state(&mut self, name: &str, block: PropMap) {
        self.states.insert(CompactString::from(name), block);
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.props.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.props.contains_key(name)
    }

    /// Override block for a state name.
    pub fn state_block(&self, state: &str) -> Option<&PropMap> {
        self.states.get(state)
    }

    /// True if any of `states` has an override block.
    pub fn has_any_state(&self, states: &[CompactString]) -> bool {
        states.iter().any(|s| self.states.contains_key(s.as_str()))
    }

    /// Plain properties in declaration order.
    pub fn props(&self) -> impl Iterator<Item = (&CompactString, &PropValue)> {
        self.props.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty() && self.states.is_empty()
    }
}

/// Merge several style sheets left to right. The first definition of a key
/// wins, for plain properties and state blocks alike.
pub fn flatten_styles<'a>(styles: impl IntoIterator<Item = &'a Style>) -> Style {
    let mut result = Style::new();
    for style in styles {
        for (key, value) in &style.props {
            if !result.props.contains_key(key) {
                result.props.insert(key.clone(), value.clone());
            }
        }
        for (state, block) in &style.states {
            if !result.states.contains_key(state) {
                result.states.insert(state.clone(), block.clone());
            }
        }
    }
    result
}

// =============================================================================
// Color normalization
// =============================================================================

/// Convert a color value to the renderer's `0xRRGGBBAA` number.
///
/// Accepts numbers (passed through), `#rrggbb`, `#rrggbbaa`, `0x...` and
/// bare hex strings. Six digit forms get an opaque alpha. Anything else
/// becomes transparent black.
pub fn hex_color(value: &PropValue) -> f64 {
    match value {
        PropValue::Number(n) => *n,
        PropValue::Str(s) => parse_hex(s).map(f64::from).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn parse_hex(s: &str) -> Option<u32> {
    let digits = if let Some(rest) = s.strip_prefix('#') {
        rest
    } else if let Some(rest) = s.strip_prefix("0x") {
        return u32::from_str_radix(rest, 16).ok();
    } else {
        s
    };

    match digits.len() {
        6 => u32::from_str_radix(digits, 16).ok().map(|rgb| (rgb << 8) | 0xff),
        8 => u32::from_str_radix(digits, 16).ok(),
        _ => None,
    }
}
