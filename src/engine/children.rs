//! Children - ordered child list owned by a node.
//!
//! Order is render order, sibling order and flex placement order. Parent
//! assignment and dirty marking are done by the scene around these calls.

use crate::types::NodeId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Children {
    ids: Vec<NodeId>,
}

impl Children {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `node` before `before` when it is a member, else append.
    pub fn insert(&mut self, node: NodeId, before: Option<NodeId>) {
        match before.and_then(|b| self.index_of(b)) {
            Some(index) => self.ids.insert(index, node),
            None => self.ids.push(node),
        }
    }

    /// Remove the first occurrence of `node`. Absent nodes are ignored.
    pub fn remove(&mut self, node: NodeId) -> bool {
        match self.index_of(node) {
            Some(index) => {
                self.ids.remove(index);
                true
            }
            None => false,
        }
    }

    /// Child at the owner's `selected` index (0 when unset).
    pub fn selected(&self, selected: Option<usize>) -> Option<NodeId> {
        self.get(selected.unwrap_or(0))
    }

    pub fn first(&self) -> Option<NodeId> {
        self.ids.first().copied()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.ids.get(index).copied()
    }

    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.ids.iter().position(|&c| c == node)
    }

    /// Sibling following `node`, if `node` is a member and not last.
    pub fn next_after(&self, node: NodeId) -> Option<NodeId> {
        self.index_of(node).and_then(|i| self.get(i + 1))
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.index_of(node).is_some()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: u32) -> NodeId {
        NodeId::new(i, 0)
    }

    #[test]
    fn test_insert_append_and_anchor() {
        let mut children = Children::new();
        children.insert(id(1), None);
        children.insert(id(3), None);
        children.insert(id(2), Some(id(3)));

        assert_eq!(children.as_slice(), &[id(1), id(2), id(3)]);
    }

    #[test]
    fn test_non_member_anchor_appends() {
        let mut children = Children::new();
        children.insert(id(1), None);
        children.insert(id(2), Some(id(99)));

        assert_eq!(children.as_slice(), &[id(1), id(2)]);
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        let mut children = Children::new();
        children.insert(id(1), None);
        children.insert(id(2), None);

        assert!(!children.remove(id(7)));
        assert_eq!(children.as_slice(), &[id(1), id(2)]);

        assert!(children.remove(id(1)));
        assert_eq!(children.as_slice(), &[id(2)]);
    }

    #[test]
    fn test_selected_and_siblings() {
        let mut children = Children::new();
        for i in 1..=3 {
            children.insert(id(i), None);
        }

        assert_eq!(children.selected(None), Some(id(1)));
        assert_eq!(children.selected(Some(2)), Some(id(3)));
        assert_eq!(children.selected(Some(5)), None);
        assert_eq!(children.next_after(id(2)), Some(id(3)));
        assert_eq!(children.next_after(id(3)), None);
        assert_eq!(children.next_after(id(42)), None);
    }
}
