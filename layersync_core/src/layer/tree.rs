// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage for the derived layer tree.

use alloc::vec::Vec;

use super::traverse::Children;
use crate::flags::{LOCAL_BITS_ALL, LayerFlags, RuntimeFlags};
use crate::id::{GroupId, INVALID, NodeId};

/// Struct-of-arrays storage for the nodes of one view layer.
///
/// Nodes are addressed by [`NodeId`] handles. Each node mirrors one group of
/// the source hierarchy and owns an ordered list of child slots. Freed slots
/// are recycled via a free list; generation counters make stale handles fail
/// validation.
///
/// Structure is only ever changed by reconciliation (see
/// [`reconcile`](crate::resync::reconcile)) and by loading (see
/// [`read`](crate::persist::read)). Callers edit authored state through
/// [`set_flags`](Self::set_flags) and [`set_local_bits`](Self::set_local_bits).
#[derive(Clone, Debug)]
pub struct LayerTree {
    // -- Topology --
    pub(crate) group: Vec<GroupId>,
    pub(crate) parent: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,

    // -- Authored state --
    pub(crate) flags: Vec<LayerFlags>,
    pub(crate) local_bits: Vec<u16>,

    // -- Derived state (written by reconciliation) --
    pub(crate) runtime: Vec<RuntimeFlags>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) root: u32,
}

impl Default for LayerTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerTree {
    /// Creates an empty tree without a root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            group: Vec::new(),
            parent: Vec::new(),
            children: Vec::new(),
            flags: Vec::new(),
            local_bits: Vec::new(),
            runtime: Vec::new(),
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            root: INVALID,
        }
    }

    /// Returns the root node, or `None` if the tree has never been synced.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        (self.root != INVALID).then(|| self.handle(self.root))
    }

    /// Returns whether the tree has no root yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root == INVALID
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        let idx = id.idx as usize;
        idx < self.alive.len() && self.alive[idx] && self.generation[idx] == id.generation
    }

    // -- Getters --

    /// Returns the group mirrored by a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn group(&self, id: NodeId) -> GroupId {
        self.validate(id);
        self.group[id.idx as usize]
    }

    /// Returns the authored flags of a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> LayerFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns the runtime flags computed by the last reconciliation.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn runtime(&self, id: NodeId) -> RuntimeFlags {
        self.validate(id);
        self.runtime[id.idx as usize]
    }

    /// Returns the per-viewport local visibility bits of a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn local_bits(&self, id: NodeId) -> u16 {
        self.validate(id);
        self.local_bits[id.idx as usize]
    }

    /// Returns the parent of a node, or `None` for the root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns an iterator over the direct children of a node, in order.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.children[id.idx as usize])
    }

    /// Returns the number of direct children of a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.validate(id);
        self.children[id.idx as usize].len()
    }

    // -- Authored state setters --

    /// Replaces the authored flags of a single node.
    ///
    /// This does not touch descendants; see
    /// [`set_layer_flag`](crate::visibility::set_layer_flag) for the
    /// recursive variant. Derived state is only refreshed by the next
    /// reconciliation.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_flags(&mut self, id: NodeId, flags: LayerFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
    }

    /// Replaces the per-viewport local visibility bits of a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_local_bits(&mut self, id: NodeId, bits: u16) {
        self.validate(id);
        self.local_bits[id.idx as usize] = bits;
    }

    // -- Allocation (crate-internal) --

    /// Allocates a detached node wrapping `group`.
    ///
    /// The node starts with the given authored flags, every local bit set,
    /// and empty runtime flags.
    pub(crate) fn create_node(&mut self, group: GroupId, flags: LayerFlags) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.group[i] = group;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.flags[i] = flags;
            self.local_bits[i] = LOCAL_BITS_ALL;
            self.runtime[i] = RuntimeFlags::empty();
            self.alive[i] = true;
            idx
        } else {
            let idx = self.group.len() as u32;
            self.group.push(group);
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.flags.push(flags);
            self.local_bits.push(LOCAL_BITS_ALL);
            self.runtime.push(RuntimeFlags::empty());
            self.generation.push(0);
            self.alive.push(true);
            idx
        }
    }

    /// Frees a single slot.
    ///
    /// Not recursive: children are freed on their own by the caller, which
    /// walks its own snapshot of the old tree.
    pub(crate) fn free_node(&mut self, idx: u32) {
        let i = idx as usize;
        debug_assert!(self.alive[i], "double free of layer node slot {idx}");
        self.generation[i] += 1;
        self.alive[i] = false;
        self.parent[i] = INVALID;
        self.children[i].clear();
        if self.root == idx {
            self.root = INVALID;
        }
        self.free_list.push(idx);
    }

    /// Installs `idx` as the single top-level node.
    pub(crate) fn set_root(&mut self, idx: u32) {
        self.parent[idx as usize] = INVALID;
        self.root = idx;
    }

    /// Replaces the child list of `parent` and fixes the back-references.
    pub(crate) fn replace_children(&mut self, parent: u32, children: Vec<u32>) {
        for &c in &children {
            self.parent[c as usize] = parent;
        }
        self.children[parent as usize] = children;
    }

    /// Builds a handle for a live slot.
    pub(crate) fn handle(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            self.generation
                .get(id.idx as usize)
                .copied()
                .unwrap_or(u32::MAX)
        );
    }
}
