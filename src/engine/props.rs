//! Property table.
//!
//! Every property name resolves to a forwarding policy at compile time.
//! Renderer-bound properties are either animatable (may start a transition)
//! or instant. Everything else is local to the node and never reaches the
//! renderer.

use crate::types::PropValue;

/// How a property write reaches the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forwarding {
    /// Numeric renderer property; honors `transition`.
    Animatable,
    /// Renderer property that is always set instantly.
    Instant,
    /// Node-local field.
    Local,
}

impl Forwarding {
    pub fn reaches_renderer(self) -> bool {
        !matches!(self, Self::Local)
    }
}

/// Properties the renderer can interpolate.
pub const ANIMATABLE_PROPS: &[&str] = &[
    "alpha",
    "color",
    "colorTop",
    "colorRight",
    "colorBottom",
    "colorLeft",
    "colorTl",
    "colorTr",
    "colorBl",
    "colorBr",
    "height",
    "fontSize",
    "lineHeight",
    "mount",
    "mountX",
    "mountY",
    "pivot",
    "pivotX",
    "pivotY",
    "rotation",
    "scale",
    "scaleX",
    "scaleY",
    "width",
    "worldX",
    "worldY",
    "x",
    "y",
    "zIndex",
    "zIndexLocked",
];

/// Renderer properties that never animate.
pub const INSTANT_PROPS: &[&str] = &[
    "absX",
    "absY",
    "autosize",
    "clipping",
    "contain",
    "fontFamily",
    "fontStretch",
    "fontStyle",
    "fontWeight",
    "letterSpacing",
    "maxLines",
    "offsetY",
    "overflowSuffix",
    "rtt",
    "scrollable",
    "scrollY",
    "src",
    "text",
    "textAlign",
    "textBaseline",
    "textOverflow",
    "texture",
    "verticalAlign",
    "wordWrap",
];

/// Forwarding policy for a property name.
pub fn forwarding(name: &str) -> Forwarding {
    match name {
        "alpha" | "color" | "colorTop" | "colorRight" | "colorBottom" | "colorLeft"
        | "colorTl" | "colorTr" | "colorBl" | "colorBr" | "height" | "fontSize"
        | "lineHeight" | "mount" | "mountX" | "mountY" | "pivot" | "pivotX" | "pivotY"
        | "rotation" | "scale" | "scaleX" | "scaleY" | "width" | "worldX" | "worldY" | "x"
        | "y" | "zIndex" | "zIndexLocked" => Forwarding::Animatable,

        "absX" | "absY" | "autosize" | "clipping" | "contain" | "fontFamily" | "fontStretch"
        | "fontStyle" | "fontWeight" | "letterSpacing" | "maxLines" | "offsetY"
        | "overflowSuffix" | "rtt" | "scrollable" | "scrollY" | "src" | "text" | "textAlign"
        | "textBaseline" | "textOverflow" | "texture" | "verticalAlign" | "wordWrap" => {
            Forwarding::Instant
        }

        _ => Forwarding::Local,
    }
}

/// Color channels take hex strings and are normalized before storage.
pub fn is_color_prop(name: &str) -> bool {
    name.starts_with("color")
}

/// Engine default for a renderer property, used when a state rolls a
/// property back to "never set".
pub fn default_value(name: &str) -> Option<PropValue> {
    let value = match name {
        "alpha" | "scale" | "scaleX" | "scaleY" => 1.0,
        "pivot" | "pivotX" | "pivotY" => 0.5,
        "x" | "y" | "rotation" | "mount" | "mountX" | "mountY" | "zIndex" => 0.0,
        _ => return None,
    };
    Some(PropValue::Number(value))
}
