// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change collection for the source hierarchy.
//!
//! Structural edits mark dirty channels as they happen (see
//! [`dirty`](crate::dirty)). [`Hierarchy::take_changes`] drains every channel
//! at once and hands the raw slot indices to the caller, which decides
//! whether view layers need a full reconciliation or only a flag refresh.
//!
//! Slot indices rather than [`GroupId`](crate::id::GroupId) handles are
//! reported because a drained group may already have been destroyed.

use alloc::vec::Vec;

use super::store::Hierarchy;
use crate::dirty;

/// Slots touched since the previous [`Hierarchy::take_changes`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HierarchyChanges {
    /// Groups whose child list changed, or that were created or destroyed.
    pub topology: Vec<u32>,
    /// Groups whose object list changed.
    pub members: Vec<u32>,
    /// Groups whose effective restrictions may have changed.
    pub restrict: Vec<u32>,
    /// Objects whose restrict flags changed.
    pub object_restrict: Vec<u32>,
}

impl HierarchyChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.topology.clear();
        self.members.clear();
        self.restrict.clear();
        self.object_restrict.clear();
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topology.is_empty()
            && self.members.is_empty()
            && self.restrict.is_empty()
            && self.object_restrict.is_empty()
    }

    /// Returns whether view layers must be reconciled.
    ///
    /// Object restrictions alone only require recomputing base flags.
    #[must_use]
    pub fn needs_resync(&self) -> bool {
        !self.topology.is_empty() || !self.members.is_empty() || !self.restrict.is_empty()
    }
}

impl Hierarchy {
    /// Drains all dirty channels and returns the touched slots.
    pub fn take_changes(&mut self) -> HierarchyChanges {
        let mut changes = HierarchyChanges::default();
        self.take_changes_into(&mut changes);
        changes
    }

    /// Like [`take_changes`](Self::take_changes), but reuses a caller-provided
    /// buffer.
    pub fn take_changes_into(&mut self, changes: &mut HierarchyChanges) {
        changes.clear();

        changes.topology = self
            .dirty
            .drain(dirty::TOPOLOGY)
            .deterministic()
            .run()
            .collect();

        changes.members = self
            .dirty
            .drain(dirty::MEMBERS)
            .deterministic()
            .run()
            .collect();

        // RESTRICT propagates; include every dependent group.
        changes.restrict = self
            .dirty
            .drain(dirty::RESTRICT)
            .affected()
            .deterministic()
            .run()
            .collect();

        changes.object_restrict = self
            .object_dirty
            .drain(dirty::OBJECT_RESTRICT)
            .deterministic()
            .run()
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::RestrictFlags;

    #[test]
    fn fresh_hierarchy_reports_master_creation() {
        let mut h = Hierarchy::new();
        let changes = h.take_changes();
        assert_eq!(changes.topology, [h.master().unwrap().index()]);
        assert!(changes.needs_resync());
        assert!(h.take_changes().is_empty());
    }

    #[test]
    fn restrict_propagates_to_descendants() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let b = h.create_group("B");
        h.link_child(master, a).unwrap();
        h.link_child(a, b).unwrap();
        let _ = h.take_changes();

        h.set_restrict(a, RestrictFlags::HIDE_VIEWPORT);
        let changes = h.take_changes();
        assert!(changes.restrict.contains(&a.index()));
        assert!(changes.restrict.contains(&b.index()));
        assert!(!changes.restrict.contains(&master.index()));
        assert!(changes.topology.is_empty());
    }

    #[test]
    fn object_restrict_alone_does_not_need_resync() {
        let mut h = Hierarchy::new();
        let o = h.create_object("O");
        let _ = h.take_changes();

        h.set_object_restrict(o, RestrictFlags::HIDE_SELECT);
        let changes = h.take_changes();
        assert_eq!(changes.object_restrict, [o.index()]);
        assert!(!changes.needs_resync());
        assert!(!changes.is_empty());
    }

    #[test]
    fn membership_changes_are_local() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let o = h.create_object("O");
        let _ = h.take_changes();

        h.link_object(master, o).unwrap();
        let changes = h.take_changes();
        assert_eq!(changes.members, [master.index()]);
        assert!(changes.restrict.is_empty());
    }
}
