// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal and depth-first node addressing.

use alloc::vec::Vec;

use super::tree::LayerTree;
use crate::id::{GroupId, INVALID, NodeId};

/// An iterator over the direct children of a node.
///
/// Created by [`LayerTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a LayerTree,
    slots: core::slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a LayerTree, slots: &'a [u32]) -> Self {
        Self {
            tree,
            slots: slots.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.slots.next().map(|&idx| self.tree.handle(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl ExactSizeIterator for Children<'_> {}

impl LayerTree {
    /// Returns the raw slots of all reachable nodes in depth-first pre-order.
    #[must_use]
    pub fn traversal_order(&self) -> Vec<u32> {
        let mut order = Vec::new();
        if self.root == INVALID {
            return order;
        }
        let mut stack = alloc::vec![self.root];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            stack.extend(self.children[idx as usize].iter().rev());
        }
        order
    }

    /// Returns the number of nodes reachable from the root.
    #[must_use]
    pub fn count(&self) -> usize {
        self.traversal_order().len()
    }

    /// Returns the node at depth-first position `index` (the root is 0).
    #[must_use]
    pub fn from_index(&self, index: usize) -> Option<NodeId> {
        self.traversal_order()
            .get(index)
            .map(|&idx| self.handle(idx))
    }

    /// Returns the depth-first position of a node.
    ///
    /// Returns `None` for stale handles and for nodes not reachable from the
    /// root.
    #[must_use]
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        if !self.is_alive(id) {
            return None;
        }
        self.traversal_order().iter().position(|&idx| idx == id.idx)
    }

    /// Returns the first node (depth-first) that mirrors `group`.
    ///
    /// A group linked under several parents is mirrored by several nodes;
    /// this returns the one met first.
    #[must_use]
    pub fn find_group(&self, group: GroupId) -> Option<NodeId> {
        self.traversal_order()
            .into_iter()
            .find(|&idx| self.group[idx as usize] == group)
            .map(|idx| self.handle(idx))
    }

    /// Returns whether `node` is `ancestor` or lies in its subtree.
    ///
    /// Stale handles are never contained.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(ancestor) || !self.is_alive(node) {
            return false;
        }
        let mut current = node.idx;
        while current != INVALID {
            if current == ancestor.idx {
                return true;
            }
            current = self.parent[current as usize];
        }
        false
    }

    /// Returns the path of raw slots from the root down to `idx`, inclusive.
    pub(crate) fn path_to(&self, idx: u32) -> Vec<u32> {
        let mut path = Vec::new();
        let mut current = idx;
        while current != INVALID {
            path.push(current);
            current = self.parent[current as usize];
        }
        path.reverse();
        path
    }

    /// Collects the raw slots of the subtree rooted at `idx`, pre-order.
    pub(crate) fn subtree(&self, idx: u32) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack = alloc::vec![idx];
        while let Some(i) = stack.pop() {
            out.push(i);
            stack.extend(self.children[i as usize].iter().rev());
        }
        out
    }
}
