// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A named view over the source hierarchy.

use alloc::string::String;

use crate::base::Base;
use crate::config::SyncConfig;
use crate::error::IndexError;
use crate::flags::{BaseFlags, LayerFlags, RestrictFlags};
use crate::gate::SyncGate;
use crate::hierarchy::Hierarchy;
use crate::id::{INVALID, NodeId, ObjectId};
use crate::index::{BaseIndex, DuplicatePolicy};
use crate::layer::LayerTree;
use crate::resync::{ResyncStats, reconcile_with};
use crate::trace::Tracer;

/// One view layer: a [`LayerTree`], its [`BaseIndex`], the active node and
/// the out-of-sync flag.
///
/// A fresh view layer is out of sync; the first
/// [`ensure_synced`](Self::ensure_synced) builds its tree.
#[derive(Clone, Debug)]
pub struct ViewLayer {
    pub(crate) name: String,
    pub(crate) tree: LayerTree,
    pub(crate) index: BaseIndex,
    pub(crate) active: Option<NodeId>,
    pub(crate) out_of_sync: bool,
    pub(crate) has_exporters: bool,
}

impl ViewLayer {
    /// Creates an empty view layer.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tree: LayerTree::new(),
            index: BaseIndex::new(),
            active: None,
            out_of_sync: true,
            has_exporters: false,
        }
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the view layer.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the layer tree.
    #[must_use]
    pub fn tree(&self) -> &LayerTree {
        &self.tree
    }

    /// Returns the layer tree for edits of authored node state.
    pub fn tree_mut(&mut self) -> &mut LayerTree {
        &mut self.tree
    }

    /// Returns the base index.
    #[must_use]
    pub fn index(&self) -> &BaseIndex {
        &self.index
    }

    /// Returns the base index for flag and selection edits.
    pub fn index_mut(&mut self) -> &mut BaseIndex {
        &mut self.index
    }

    /// Returns the active node.
    #[must_use]
    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// Makes `node` the active node.
    ///
    /// Returns `false` and leaves the active node unchanged if `node` is
    /// stale or excluded.
    pub fn activate(&mut self, node: NodeId) -> bool {
        if !self.tree.is_alive(node) || self.tree.flags(node).contains(LayerFlags::EXCLUDE) {
            return false;
        }
        self.active = Some(node);
        true
    }

    /// Returns whether `node`, or any node on its path from the root, is
    /// excluded, hidden, or wraps a viewport-restricted group.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn is_hidden(&self, node: NodeId, hierarchy: &Hierarchy) -> bool {
        self.tree.validate(node);
        node_hidden(&self.tree, hierarchy, node.idx)
    }

    /// Returns whether any group reached by the last reconciliation carries
    /// exporters.
    #[must_use]
    pub fn has_exporters(&self) -> bool {
        self.has_exporters
    }

    // -- Synchronization --

    /// Returns whether the view layer needs a reconciliation.
    #[must_use]
    pub fn is_out_of_sync(&self) -> bool {
        self.out_of_sync
    }

    /// Flags the view layer for reconciliation on the next
    /// [`ensure_synced`](Self::ensure_synced).
    pub fn mark_dirty(&mut self) {
        self.out_of_sync = true;
    }

    /// Reconciles the view layer if it is out of sync.
    ///
    /// Returns whether the view layer is in sync afterwards. The out-of-sync
    /// flag is only cleared by a successful pass.
    pub fn ensure_synced(&mut self, hierarchy: &Hierarchy, gate: &SyncGate) -> bool {
        self.ensure_synced_with(hierarchy, gate, &SyncConfig::interactive(), &mut Tracer::none())
            .is_some()
    }

    /// Like [`ensure_synced`](Self::ensure_synced), with explicit settings.
    ///
    /// Returns the statistics of the pass, or default statistics if the view
    /// layer was already in sync, or `None` if the pass was refused.
    pub fn ensure_synced_with(
        &mut self,
        hierarchy: &Hierarchy,
        gate: &SyncGate,
        config: &SyncConfig,
        tracer: &mut Tracer<'_>,
    ) -> Option<ResyncStats> {
        if !self.out_of_sync {
            return Some(ResyncStats::default());
        }
        let stats = reconcile_with(self, hierarchy, gate, config, tracer)?;
        self.out_of_sync = false;
        Some(stats)
    }

    /// Recomputes the flags of every base from its collection bits and the
    /// current object restrictions.
    pub fn eval_base_flags(&mut self, hierarchy: &Hierarchy) {
        for base in self.index.bases_mut() {
            eval_base(base, hierarchy);
        }
    }

    /// Recomputes the flags of the base of `object` only.
    ///
    /// Returns `false` if the object has no base.
    pub fn eval_object_flags(&mut self, object: ObjectId, hierarchy: &Hierarchy) -> bool {
        match self.index.find_mut(object) {
            Some(base) => {
                eval_base(base, hierarchy);
                true
            }
            None => false,
        }
    }

    /// Repoints every base of `old` at `new` and rebuilds the hash under
    /// `policy`.
    ///
    /// Returns the number of duplicate bases removed.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::DuplicateBase`] in strict mode when `new` already
    /// had a base.
    pub fn remap_object(
        &mut self,
        old: ObjectId,
        new: ObjectId,
        policy: DuplicatePolicy,
    ) -> Result<usize, IndexError> {
        let mut touched = false;
        for base in &mut self.index.bases {
            if base.object == old {
                base.object = new;
                touched = true;
            }
        }
        if !touched {
            return Ok(0);
        }
        self.out_of_sync = true;
        self.index.rebuild_hash(policy)
    }

    // -- Selection --

    /// Selects (or with `deselect`, deselects) the bases of every object
    /// in the subtree of `node`.
    ///
    /// Objects of excluded nodes are left alone. A node whose group is
    /// select-restricted is skipped along with its whole subtree. Returns
    /// whether any base changed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn select_objects(&mut self, node: NodeId, hierarchy: &Hierarchy, deselect: bool) -> bool {
        self.tree.validate(node);
        let mut changed = false;
        let mut stack = alloc::vec![node.idx];
        while let Some(idx) = stack.pop() {
            let group = self.tree.group[idx as usize];
            if !hierarchy.is_alive(group)
                || hierarchy.restrict(group).contains(RestrictFlags::HIDE_SELECT)
            {
                continue;
            }
            if !self.tree.flags[idx as usize].contains(LayerFlags::EXCLUDE) {
                for &object in hierarchy.objects(group) {
                    let Some(base) = self.index.find_mut(object) else {
                        continue;
                    };
                    if deselect {
                        if base.flags.contains(BaseFlags::SELECTED) {
                            base.flags.remove(BaseFlags::SELECTED);
                            changed = true;
                        }
                    } else if base.flags.contains(BaseFlags::SELECTABLE)
                        && !base.flags.contains(BaseFlags::SELECTED)
                    {
                        base.flags.insert(BaseFlags::SELECTED);
                        changed = true;
                    }
                }
            }
            stack.extend(self.tree.children[idx as usize].iter().rev());
        }
        changed
    }

    /// Returns whether any object in the subtree of `node` has a selected
    /// base, with the same skipping rules as
    /// [`select_objects`](Self::select_objects).
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn has_selected_objects(&self, node: NodeId, hierarchy: &Hierarchy) -> bool {
        self.tree.validate(node);
        let mut stack = alloc::vec![node.idx];
        while let Some(idx) = stack.pop() {
            let group = self.tree.group[idx as usize];
            if !hierarchy.is_alive(group)
                || hierarchy.restrict(group).contains(RestrictFlags::HIDE_SELECT)
            {
                continue;
            }
            if !self.tree.flags[idx as usize].contains(LayerFlags::EXCLUDE)
                && hierarchy
                    .objects(group)
                    .iter()
                    .filter_map(|&o| self.index.find(o))
                    .any(Base::is_selected)
            {
                return true;
            }
            stack.extend(self.tree.children[idx as usize].iter().rev());
        }
        false
    }

    /// Shows only the base of `object`, or with `extend`, toggles its hidden
    /// state.
    ///
    /// Returns `false` if the object has no base.
    pub fn set_base_visible(
        &mut self,
        object: ObjectId,
        hierarchy: &Hierarchy,
        extend: bool,
    ) -> bool {
        if !self.index.contains(object) {
            return false;
        }
        for base in self.index.bases_mut() {
            if base.object == object {
                if extend {
                    base.flags.toggle(BaseFlags::HIDDEN);
                } else {
                    base.flags.remove(BaseFlags::HIDDEN);
                }
            } else if !extend {
                base.flags.insert(BaseFlags::HIDDEN);
            } else {
                continue;
            }
            eval_base(base, hierarchy);
        }
        true
    }
}

fn eval_base(base: &mut Base, hierarchy: &Hierarchy) {
    let restrict = if hierarchy.is_object_alive(base.object) {
        hierarchy.object_restrict(base.object)
    } else {
        RestrictFlags::empty()
    };
    base.eval_flags(restrict);
}

/// Returns whether the node at `idx` or an ancestor is excluded, hidden, or
/// wraps a viewport-restricted group.
pub(crate) fn node_hidden(tree: &LayerTree, hierarchy: &Hierarchy, idx: u32) -> bool {
    let mut current = idx;
    while current != INVALID {
        let i = current as usize;
        if tree.flags[i].intersects(LayerFlags::EXCLUDE | LayerFlags::HIDE) {
            return true;
        }
        let group = tree.group[i];
        if hierarchy.is_alive(group)
            && !hierarchy.is_master(group)
            && hierarchy.restrict(group).contains(RestrictFlags::HIDE_VIEWPORT)
        {
            return true;
        }
        current = tree.parent[i];
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::GroupId;

    struct Fixture {
        h: Hierarchy,
        vl: ViewLayer,
        a: GroupId,
        b: GroupId,
        o1: ObjectId,
        o2: ObjectId,
    }

    fn fixture() -> Fixture {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let b = h.create_group("B");
        h.link_child(master, a).unwrap();
        h.link_child(a, b).unwrap();
        let o1 = h.create_object("O1");
        let o2 = h.create_object("O2");
        h.link_object(a, o1).unwrap();
        h.link_object(b, o2).unwrap();
        let mut vl = ViewLayer::new("V");
        assert!(vl.ensure_synced(&h, &SyncGate::new()));
        Fixture { h, vl, a, b, o1, o2 }
    }

    #[test]
    fn ensure_synced_clears_dirty_only_on_success() {
        let Fixture { h, mut vl, .. } = fixture();
        assert!(!vl.is_out_of_sync());
        vl.mark_dirty();
        let gate = SyncGate::new();
        {
            let _g = gate.scoped();
            assert!(!vl.ensure_synced(&h, &gate));
            assert!(vl.is_out_of_sync());
        }
        assert!(vl.ensure_synced(&h, &gate));
        assert!(!vl.is_out_of_sync());
    }

    #[test]
    fn activate_rejects_excluded() {
        let Fixture { mut vl, a, .. } = fixture();
        let node_a = vl.tree().find_group(a).unwrap();
        vl.tree_mut().set_flags(node_a, LayerFlags::EXCLUDE);
        assert!(!vl.activate(node_a));
        vl.tree_mut().set_flags(node_a, LayerFlags::HIDE);
        assert!(vl.activate(node_a));
        assert_eq!(vl.active(), Some(node_a));
    }

    #[test]
    fn hidden_is_inherited_from_ancestors() {
        let Fixture { mut h, mut vl, a, b, .. } = fixture();
        let node_a = vl.tree().find_group(a).unwrap();
        let node_b = vl.tree().find_group(b).unwrap();
        assert!(!vl.is_hidden(node_b, &h));
        vl.tree_mut().set_flags(node_a, LayerFlags::HIDE);
        assert!(vl.is_hidden(node_b, &h));
        vl.tree_mut().set_flags(node_a, LayerFlags::empty());
        h.set_restrict(a, RestrictFlags::HIDE_VIEWPORT);
        assert!(vl.is_hidden(node_b, &h));
    }

    #[test]
    fn select_skips_restricted_subtree() {
        let Fixture { mut h, mut vl, a, b, o1, o2 } = fixture();
        let node_a = vl.tree().find_group(a).unwrap();
        assert!(vl.select_objects(node_a, &h, false));
        assert!(vl.index().find(o1).unwrap().is_selected());
        assert!(vl.index().find(o2).unwrap().is_selected());
        assert!(vl.has_selected_objects(node_a, &h));

        assert!(vl.select_objects(node_a, &h, true));
        assert!(!vl.has_selected_objects(node_a, &h));

        h.set_restrict(b, RestrictFlags::HIDE_SELECT);
        vl.select_objects(node_a, &h, false);
        assert!(vl.index().find(o1).unwrap().is_selected());
        assert!(!vl.index().find(o2).unwrap().is_selected());
    }

    #[test]
    fn base_visibility_isolate_and_toggle() {
        let Fixture { h, mut vl, o1, o2, .. } = fixture();
        assert!(vl.set_base_visible(o1, &h, false));
        assert!(!vl.index().find(o1).unwrap().flags.contains(BaseFlags::HIDDEN));
        let b2 = vl.index().find(o2).unwrap();
        assert!(b2.flags.contains(BaseFlags::HIDDEN));
        assert!(!b2.flags.contains(BaseFlags::MAYBE_VISIBLE));

        assert!(vl.set_base_visible(o2, &h, true));
        assert!(vl.index().find(o2).unwrap().flags.contains(BaseFlags::MAYBE_VISIBLE));
    }

    #[test]
    fn remap_onto_existing_object_drops_duplicate() {
        let Fixture { mut vl, o1, o2, .. } = fixture();
        // Objects are collected after the subtree, so O2 (in B) comes first
        // and its base is the one kept.
        assert_eq!(vl.index().bases()[0].object(), o2);
        let kept = vl.index().bases()[0].id();
        assert_eq!(vl.remap_object(o2, o1, DuplicatePolicy::Fix), Ok(1));
        assert_eq!(vl.index().len(), 1);
        assert_eq!(vl.index().find(o1).unwrap().id(), kept);
        assert!(vl.is_out_of_sync());
    }

    #[test]
    fn strict_remap_reports_duplicate() {
        let Fixture { mut vl, o1, o2, .. } = fixture();
        assert_eq!(
            vl.remap_object(o2, o1, DuplicatePolicy::Strict),
            Err(IndexError::DuplicateBase { object: o1 })
        );
    }
}
