//! Single-axis flex placement.
//!
//! # Algorithm
//!
//! 1. Collect participating children (structural, `flexItem` not false,
//!    measured text). An unmeasured non-empty text child aborts the pass.
//! 2. Assign main-axis positions per `justifyContent`.
//! 3. Assign cross-axis positions per `alignItems` when the container has
//!    a cross size.
//! 4. `flexStart` only: an autosized container shrinks or grows to its
//!    content, unless `flexBoundary` is `fixed`.
//!
//! Positions are written through the scene, so transitions on `x`/`y`
//! animate layout moves.

use crate::engine::{NodeStyle, Scene};
use crate::types::{AlignItems, FlexBoundary, FlexDirection, JustifyContent, NodeId, NodeKind, PropValue};

/// Property names for one axis.
#[derive(Debug, Clone, Copy)]
struct Axis {
    dimension: &'static str,
    position: &'static str,
    cross_dimension: &'static str,
    cross_position: &'static str,
}

impl Axis {
    fn for_direction(direction: FlexDirection) -> Self {
        match direction {
            FlexDirection::Row => Self {
                dimension: "width",
                position: "x",
                cross_dimension: "height",
                cross_position: "y",
            },
            FlexDirection::Column => Self {
                dimension: "height",
                position: "y",
                cross_dimension: "width",
                cross_position: "x",
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Item {
    id: NodeId,
    size: f64,
    cross: f64,
    lead: f64,
    trail: f64,
}

/// Main-axis positions for `items` inside a container of `container` size.
/// Returns the positions and the flexStart cursor (content extent + gap).
fn place(justify: JustifyContent, container: f64, gap: f64, items: &[Item]) -> (Vec<f64>, f64) {
    let n = items.len();
    let item_size: f64 = items.iter().map(|i| i.size).sum();
    let mut positions = vec![0.0; n];
    let mut cursor = 0.0;

    match justify {
        JustifyContent::FlexStart => {
            for (pos, item) in positions.iter_mut().zip(items) {
                *pos = cursor + item.lead;
                cursor += item.size + gap + item.lead + item.trail;
            }
        }
        JustifyContent::FlexEnd => {
            let mut start = container;
            for (pos, item) in positions.iter_mut().zip(items).rev() {
                *pos = start - item.size - item.trail;
                start -= item.size + gap + item.lead + item.trail;
            }
        }
        JustifyContent::Center => {
            let span = item_size + gap * (n as f64 - 1.0);
            let mut start = (container - span) / 2.0;
            for (pos, item) in positions.iter_mut().zip(items) {
                *pos = start;
                start += item.size + gap;
            }
        }
        JustifyContent::SpaceBetween => {
            // A lone item has nothing to space against and sits at the start.
            let pad = if n > 1 {
                (container - item_size) / (n as f64 - 1.0)
            } else {
                0.0
            };
            let mut start = 0.0;
            for (pos, item) in positions.iter_mut().zip(items) {
                *pos = start;
                start += item.size + pad;
            }
        }
        JustifyContent::SpaceEvenly => {
            let pad = (container - item_size) / (n as f64 + 1.0);
            let mut start = pad;
            for (pos, item) in positions.iter_mut().zip(items) {
                *pos = start;
                start += item.size + pad;
            }
        }
    }

    (positions, cursor)
}

fn align(align: AlignItems, container_cross: f64, item_cross: f64) -> f64 {
    match align {
        AlignItems::FlexStart => 0.0,
        AlignItems::Center => (container_cross - item_cross) / 2.0,
        AlignItems::FlexEnd => container_cross - item_cross,
    }
}

impl Scene {
    /// Place the children of a flex container. Returns true when the
    /// container changed its own main-axis size.
    pub fn calculate_flex(&mut self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let axis = Axis::for_direction(node.flex_direction());
        let justify = node.justify_content();
        let align_items = node.align_items();
        let gap = node.gap();
        let container = node.number(axis.dimension).unwrap_or(0.0);
        let container_cross = node.number(axis.cross_dimension).unwrap_or(0.0);
        let resizes = node.is_autosized() && node.flex_boundary() != FlexBoundary::Fixed;
        let (lead_name, trail_name) = match axis.position {
            "x" => ("marginLeft", "marginRight"),
            _ => ("marginTop", "marginBottom"),
        };

        let mut items = Vec::with_capacity(node.children.len());
        for child in node.children.iter() {
            let Some(c) = self.node(child) else { continue };
            match c.kind() {
                NodeKind::TextLeaf => continue,
                NodeKind::Text => {
                    if c.string("text").is_none_or(str::is_empty) {
                        continue;
                    }
                    if c.width().is_none() || c.height().is_none() {
                        self.log_node(id, "Layout aborted, text not measured");
                        return false;
                    }
                }
                NodeKind::Element => {}
            }
            if !c.flex_item() {
                continue;
            }
            items.push(Item {
                id: child,
                size: c.number(axis.dimension).unwrap_or(0.0),
                cross: c.number(axis.cross_dimension).unwrap_or(0.0),
                lead: c.number(lead_name).unwrap_or(0.0),
                trail: c.number(trail_name).unwrap_or(0.0),
            });
        }
        if items.is_empty() {
            return false;
        }

        let (positions, cursor) = place(justify, container, gap, &items);
        for (item, pos) in items.iter().zip(positions) {
            self.write_prop(item.id, axis.position, PropValue::Number(pos));
        }

        if let Some(align_items) = align_items {
            if container_cross != 0.0 {
                for item in &items {
                    let pos = align(align_items, container_cross, item.cross);
                    self.write_prop(item.id, axis.cross_position, PropValue::Number(pos));
                }
            }
        }

        if justify == JustifyContent::FlexStart && resizes {
            let size = cursor - gap;
            if size != container {
                self.write_prop(id, axis.dimension, PropValue::Number(size));
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(sizes: &[f64]) -> Vec<Item> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| Item {
                id: NodeId::new(i as u32, 0),
                size,
                cross: 0.0,
                lead: 0.0,
                trail: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_flex_start_with_gap() {
        let (pos, cursor) = place(JustifyContent::FlexStart, 1000.0, 10.0, &items(&[100.0, 50.0, 150.0]));
        assert_eq!(pos, vec![0.0, 110.0, 170.0]);
        assert_eq!(cursor - 10.0, 320.0);
    }

    #[test]
    fn test_flex_start_margins() {
        let mut list = items(&[100.0, 100.0]);
        list[0].lead = 5.0;
        list[0].trail = 15.0;
        let (pos, _) = place(JustifyContent::FlexStart, 1000.0, 0.0, &list);
        assert_eq!(pos, vec![5.0, 120.0]);
    }

    #[test]
    fn test_flex_end_mirrors() {
        let (pos, _) = place(JustifyContent::FlexEnd, 1000.0, 10.0, &items(&[100.0, 50.0]));
        assert_eq!(pos, vec![840.0, 950.0]);
    }

    #[test]
    fn test_center() {
        let (pos, _) = place(JustifyContent::Center, 400.0, 20.0, &items(&[100.0, 100.0]));
        assert_eq!(pos, vec![90.0, 210.0]);
    }

    #[test]
    fn test_space_between() {
        let (pos, _) = place(JustifyContent::SpaceBetween, 500.0, 0.0, &items(&[100.0, 100.0, 100.0]));
        assert_eq!(pos, vec![0.0, 200.0, 400.0]);

        let (pos, _) = place(JustifyContent::SpaceBetween, 500.0, 0.0, &items(&[100.0]));
        assert_eq!(pos, vec![0.0]);
    }

    #[test]
    fn test_space_evenly_is_symmetric() {
        let list = items(&[100.0, 60.0, 40.0]);
        let (pos, _) = place(JustifyContent::SpaceEvenly, 400.0, 0.0, &list);
        let leading = pos[0];
        let trailing = 400.0 - (pos[2] + list[2].size);
        assert_eq!(leading, 50.0);
        assert_eq!(leading, trailing);
    }

    #[test]
    fn test_space_evenly_centres_a_single_item() {
        let (pos, _) = place(JustifyContent::SpaceEvenly, 400.0, 0.0, &items(&[100.0]));
        assert_eq!(pos, vec![150.0]);
    }

    #[test]
    fn test_align() {
        assert_eq!(align(AlignItems::FlexStart, 100.0, 40.0), 0.0);
        assert_eq!(align(AlignItems::Center, 100.0, 40.0), 30.0);
        assert_eq!(align(AlignItems::FlexEnd, 100.0, 40.0), 60.0);
    }
}
