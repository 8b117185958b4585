//! State-driven style resolution.
//!
//! When a node's state stack changes, the style blocks of every active
//! state are merged (later states win) and applied on top of the node's
//! base values. `state_undo` remembers the base value of each property
//! currently driven by a state, so deactivating a state restores exactly
//! what was there before any state touched it.

use compact_str::CompactString;
use indexmap::IndexMap;

use crate::engine::{Node, NodeStyle, Scene};
use crate::types::{NodeId, PropMap, PropValue};

impl Scene {
    pub(crate) fn resolve_states(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else { return };
        self.log_node(id, "States changed");

        let raw = node.states.to_vec();
        if node.forward_states() {
            let children: Vec<NodeId> = node
                .children
                .iter()
                .filter(|&c| self.node(c).is_some_and(|n| !n.is_leaf()))
                .collect();
            for child in children {
                self.set_states(child, raw.as_slice());
            }
        }

        let states = self.config.map_states(&raw);
        let Some(node) = self.node(id) else { return };
        let style_matches = node.style.as_ref().is_some_and(|s| s.has_any_state(&states));
        if node.state_undo.is_empty() && !style_matches {
            return;
        }

        let mut merged = PropMap::new();
        if let Some(style) = &node.style {
            for state in &states {
                if let Some(block) = style.state_block(state) {
                    for (key, value) in block {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        let mut undo: IndexMap<CompactString, Option<PropValue>> = IndexMap::new();
        let mut rollback: Vec<(CompactString, Option<PropValue>)> = Vec::new();
        for (key, base) in &node.state_undo {
            if merged.contains_key(key) {
                undo.insert(key.clone(), base.clone());
            } else {
                rollback.push((key.clone(), base.clone()));
            }
        }
        for key in merged.keys() {
            if !undo.contains_key(key) {
                undo.insert(key.clone(), node.values.get(key).cloned());
            }
        }

        if let Some(node) = self.node_mut(id) {
            node.state_undo = undo;
        }

        // Transition first so the writes below animate (or not) under the
        // transition that is in effect after this pass.
        if let Some(i) = rollback.iter().position(|(key, _)| key == "transition") {
            let (key, base) = rollback.remove(i);
            match base {
                Some(value) => self.write_prop(id, &key, value),
                None => self.unset_prop(id, &key),
            }
        }
        if let Some(transition) = merged.shift_remove("transition") {
            self.write_prop(id, "transition", transition);
        }
        for (key, base) in rollback {
            match base {
                Some(value) => self.write_prop(id, &key, value),
                None => self.unset_prop(id, &key),
            }
        }
        for (key, value) in merged {
            self.write_prop(id, &key, value);
        }
    }

    /// Property names currently driven by a state style.
    pub fn state_driven_props(&self, id: NodeId) -> Vec<CompactString> {
        self.node(id)
            .map(|n: &Node| n.state_undo.keys().cloned().collect())
            .unwrap_or_default()
    }
}
