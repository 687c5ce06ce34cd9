// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays storage for groups and objects.

use alloc::string::String;
use alloc::vec::Vec;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::dirty;
use crate::error::HierarchyError;
use crate::flags::RestrictFlags;
use crate::id::{GroupId, INVALID, ObjectId};

/// The source hierarchy: an ordered graph of groups referencing objects.
///
/// Groups are addressed by [`GroupId`] handles and objects by [`ObjectId`]
/// handles. Both live in parallel arrays; destroyed slots are recycled via a
/// free list and generation counters make stale handles fail validation.
///
/// A group may be linked under several parents, so the structure is a DAG
/// rooted at the single *master* group. Cycles are rejected at link time.
#[derive(Debug)]
pub struct Hierarchy {
    // -- Groups --
    pub(crate) group_name: Vec<String>,
    pub(crate) group_children: Vec<Vec<GroupId>>,
    pub(crate) group_parents: Vec<Vec<GroupId>>,
    pub(crate) group_objects: Vec<Vec<ObjectId>>,
    pub(crate) group_restrict: Vec<RestrictFlags>,
    pub(crate) group_exporters: Vec<bool>,
    pub(crate) group_generation: Vec<u32>,
    pub(crate) group_alive: Vec<bool>,
    pub(crate) group_free: Vec<u32>,
    pub(crate) master: u32,

    // -- Objects --
    pub(crate) object_name: Vec<String>,
    pub(crate) object_restrict: Vec<RestrictFlags>,
    pub(crate) object_generation: Vec<u32>,
    pub(crate) object_alive: Vec<bool>,
    pub(crate) object_free: Vec<u32>,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) object_dirty: DirtyTracker<u32>,
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    /// Creates a hierarchy holding only its master group.
    #[must_use]
    pub fn new() -> Self {
        let mut hierarchy = Self::unversioned();
        hierarchy.install_master();
        hierarchy
    }

    /// Creates a hierarchy without a master group.
    ///
    /// This is the shape of data that has not been versioned yet; view layers
    /// refuse to reconcile against it until [`install_master`](Self::install_master)
    /// runs.
    #[must_use]
    pub fn unversioned() -> Self {
        Self {
            group_name: Vec::new(),
            group_children: Vec::new(),
            group_parents: Vec::new(),
            group_objects: Vec::new(),
            group_restrict: Vec::new(),
            group_exporters: Vec::new(),
            group_generation: Vec::new(),
            group_alive: Vec::new(),
            group_free: Vec::new(),
            master: INVALID,
            object_name: Vec::new(),
            object_restrict: Vec::new(),
            object_generation: Vec::new(),
            object_alive: Vec::new(),
            object_free: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            object_dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        }
    }

    /// Creates the master group if the hierarchy has none, and returns it.
    pub fn install_master(&mut self) -> GroupId {
        if let Some(master) = self.master() {
            return master;
        }
        let master = self.create_group("Master");
        self.master = master.idx;
        master
    }

    /// Returns the master group, or `None` for unversioned data.
    #[must_use]
    pub fn master(&self) -> Option<GroupId> {
        (self.master != INVALID).then(|| self.group_handle(self.master))
    }

    /// Returns whether `group` is the master group.
    #[must_use]
    pub fn is_master(&self, group: GroupId) -> bool {
        self.master != INVALID && group.idx == self.master && self.is_alive(group)
    }

    // -- Group allocation --

    /// Creates a new, unlinked group and returns its handle.
    pub fn create_group(&mut self, name: impl Into<String>) -> GroupId {
        let name = name.into();
        let idx = if let Some(idx) = self.group_free.pop() {
            let i = idx as usize;
            self.group_name[i] = name;
            self.group_restrict[i] = RestrictFlags::empty();
            self.group_exporters[i] = false;
            self.group_alive[i] = true;
            idx
        } else {
            let idx = self.group_name.len() as u32;
            self.group_name.push(name);
            self.group_children.push(Vec::new());
            self.group_parents.push(Vec::new());
            self.group_objects.push(Vec::new());
            self.group_restrict.push(RestrictFlags::empty());
            self.group_exporters.push(false);
            self.group_generation.push(0);
            self.group_alive.push(true);
            idx
        };
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.group_handle(idx)
    }

    /// Destroys a group.
    ///
    /// The group is unlinked from all of its parents, its children lose it as
    /// a parent (they stay alive but may become unreachable), and its object
    /// references are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::Master`] for the master group and
    /// [`HierarchyError::StaleGroup`] for a stale handle.
    pub fn destroy_group(&mut self, group: GroupId) -> Result<(), HierarchyError> {
        self.check(group)?;
        if self.is_master(group) {
            return Err(HierarchyError::Master);
        }
        let idx = group.idx as usize;

        for parent in core::mem::take(&mut self.group_parents[idx]) {
            self.group_children[parent.idx as usize].retain(|c| *c != group);
            self.dirty.mark(parent.idx, dirty::TOPOLOGY);
        }
        for child in core::mem::take(&mut self.group_children[idx]) {
            self.group_parents[child.idx as usize].retain(|p| *p != group);
            self.dirty
                .remove_dependency(child.idx, group.idx, dirty::RESTRICT);
            self.dirty.mark(child.idx, dirty::TOPOLOGY);
        }
        self.group_objects[idx].clear();
        self.dirty.remove_key(group.idx);

        self.group_generation[idx] += 1;
        self.group_alive[idx] = false;
        self.group_free.push(group.idx);
        Ok(())
    }

    /// Returns whether the given handle refers to a live group.
    #[must_use]
    pub fn is_alive(&self, group: GroupId) -> bool {
        let idx = group.idx as usize;
        idx < self.group_alive.len()
            && self.group_alive[idx]
            && self.group_generation[idx] == group.generation
    }

    // -- Group topology --

    /// Appends `child` to the child list of `parent`.
    ///
    /// # Errors
    ///
    /// Fails if either handle is stale, `child` is the master group, `child`
    /// is already a direct child of `parent`, or the link would create a cycle.
    pub fn link_child(&mut self, parent: GroupId, child: GroupId) -> Result<(), HierarchyError> {
        let end = self.group_children.get(parent.idx as usize).map_or(0, Vec::len);
        self.insert_child(parent, end, child)
    }

    /// Inserts `child` at position `index` of the child list of `parent`.
    ///
    /// `index` is clamped to the current child count.
    ///
    /// # Errors
    ///
    /// Same as [`link_child`](Self::link_child).
    pub fn insert_child(
        &mut self,
        parent: GroupId,
        index: usize,
        child: GroupId,
    ) -> Result<(), HierarchyError> {
        self.check(parent)?;
        self.check(child)?;
        if self.is_master(child) {
            return Err(HierarchyError::Master);
        }
        if self.has_child(parent, child) {
            return Err(HierarchyError::AlreadyLinked { parent, child });
        }
        if parent == child || self.is_descendant(parent, child) {
            return Err(HierarchyError::Cycle { parent, child });
        }

        let siblings = &mut self.group_children[parent.idx as usize];
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.group_parents[child.idx as usize].push(parent);

        // Restrictions are inherited: the child depends on the parent.
        let _ = self
            .dirty
            .add_dependency(child.idx, parent.idx, dirty::RESTRICT);
        self.dirty.mark(parent.idx, dirty::TOPOLOGY);
        self.dirty
            .mark_with(child.idx, dirty::RESTRICT, &EagerPolicy);
        Ok(())
    }

    /// Removes `child` from the child list of `parent`.
    ///
    /// Returns `false` if it was not a child.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn unlink_child(&mut self, parent: GroupId, child: GroupId) -> bool {
        self.validate(parent);
        self.validate(child);
        let siblings = &mut self.group_children[parent.idx as usize];
        let Some(pos) = siblings.iter().position(|c| *c == child) else {
            return false;
        };
        siblings.remove(pos);
        self.group_parents[child.idx as usize].retain(|p| *p != parent);

        self.dirty
            .remove_dependency(child.idx, parent.idx, dirty::RESTRICT);
        self.dirty.mark(parent.idx, dirty::TOPOLOGY);
        self.dirty
            .mark_with(child.idx, dirty::RESTRICT, &EagerPolicy);
        true
    }

    /// Moves `child` from its current parent(s) to the end of `new_parent`'s
    /// child list.
    ///
    /// # Errors
    ///
    /// Same as [`link_child`](Self::link_child). On error the hierarchy is
    /// left unchanged.
    pub fn reparent(&mut self, child: GroupId, new_parent: GroupId) -> Result<(), HierarchyError> {
        self.check(child)?;
        self.check(new_parent)?;
        if self.is_master(child) {
            return Err(HierarchyError::Master);
        }
        if new_parent == child || self.is_descendant(new_parent, child) {
            return Err(HierarchyError::Cycle {
                parent: new_parent,
                child,
            });
        }
        for parent in self.group_parents[child.idx as usize].clone() {
            self.unlink_child(parent, child);
        }
        self.link_child(new_parent, child)
    }

    /// Moves `child` to position `index` among its siblings under `parent`.
    ///
    /// Returns `false` if `child` is not a child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn move_child(&mut self, parent: GroupId, child: GroupId, index: usize) -> bool {
        self.validate(parent);
        self.validate(child);
        let siblings = &mut self.group_children[parent.idx as usize];
        let Some(pos) = siblings.iter().position(|c| *c == child) else {
            return false;
        };
        siblings.remove(pos);
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.dirty.mark(parent.idx, dirty::TOPOLOGY);
        true
    }

    /// Returns the ordered child groups of `group`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn children(&self, group: GroupId) -> &[GroupId] {
        self.validate(group);
        &self.group_children[group.idx as usize]
    }

    /// Returns the parents of `group`, in link order.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn parents(&self, group: GroupId) -> &[GroupId] {
        self.validate(group);
        &self.group_parents[group.idx as usize]
    }

    /// Returns whether `child` is a direct child of `parent`.
    ///
    /// Stale handles are never related.
    #[must_use]
    pub fn has_child(&self, parent: GroupId, child: GroupId) -> bool {
        self.is_alive(parent) && self.group_children[parent.idx as usize].contains(&child)
    }

    /// Returns whether `group` is reachable from `ancestor` through child links.
    #[must_use]
    pub fn is_descendant(&self, group: GroupId, ancestor: GroupId) -> bool {
        if !self.is_alive(ancestor) {
            return false;
        }
        let mut stack: Vec<GroupId> = self.group_children[ancestor.idx as usize].clone();
        while let Some(current) = stack.pop() {
            if current == group {
                return true;
            }
            if self.is_alive(current) {
                stack.extend_from_slice(&self.group_children[current.idx as usize]);
            }
        }
        false
    }

    // -- Group properties --

    /// Returns the name of a group.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn group_name(&self, group: GroupId) -> &str {
        self.validate(group);
        &self.group_name[group.idx as usize]
    }

    /// Returns the restrict flags of a group.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn restrict(&self, group: GroupId) -> RestrictFlags {
        self.validate(group);
        self.group_restrict[group.idx as usize]
    }

    /// Sets the restrict flags of a group.
    ///
    /// Marks the RESTRICT channel with eager propagation to descendants.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_restrict(&mut self, group: GroupId, restrict: RestrictFlags) {
        self.validate(group);
        self.group_restrict[group.idx as usize] = restrict;
        self.dirty
            .mark_with(group.idx, dirty::RESTRICT, &EagerPolicy);
    }

    /// Returns whether the group carries exporters.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn has_exporters(&self, group: GroupId) -> bool {
        self.validate(group);
        self.group_exporters[group.idx as usize]
    }

    /// Sets whether the group carries exporters.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_has_exporters(&mut self, group: GroupId, value: bool) {
        self.validate(group);
        self.group_exporters[group.idx as usize] = value;
        self.dirty.mark(group.idx, dirty::RESTRICT);
    }

    /// Returns the objects directly referenced by `group`, in link order.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn objects(&self, group: GroupId) -> &[ObjectId] {
        self.validate(group);
        &self.group_objects[group.idx as usize]
    }

    // -- Objects --

    /// Creates a new object, not referenced by any group.
    pub fn create_object(&mut self, name: impl Into<String>) -> ObjectId {
        let name = name.into();
        let idx = if let Some(idx) = self.object_free.pop() {
            let i = idx as usize;
            self.object_name[i] = name;
            self.object_restrict[i] = RestrictFlags::empty();
            self.object_alive[i] = true;
            idx
        } else {
            let idx = self.object_name.len() as u32;
            self.object_name.push(name);
            self.object_restrict.push(RestrictFlags::empty());
            self.object_generation.push(0);
            self.object_alive.push(true);
            idx
        };
        ObjectId {
            idx,
            generation: self.object_generation[idx as usize],
        }
    }

    /// Destroys an object and drops every group reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::StaleObject`] for a stale handle.
    pub fn destroy_object(&mut self, object: ObjectId) -> Result<(), HierarchyError> {
        if !self.is_object_alive(object) {
            return Err(HierarchyError::StaleObject(object));
        }
        for (idx, members) in self.group_objects.iter_mut().enumerate() {
            let before = members.len();
            members.retain(|o| *o != object);
            if members.len() != before {
                self.dirty.mark(idx as u32, dirty::MEMBERS);
            }
        }
        let i = object.idx as usize;
        self.object_generation[i] += 1;
        self.object_alive[i] = false;
        self.object_free.push(object.idx);
        self.object_dirty.remove_key(object.idx);
        Ok(())
    }

    /// Returns whether the given handle refers to a live object.
    #[must_use]
    pub fn is_object_alive(&self, object: ObjectId) -> bool {
        let idx = object.idx as usize;
        idx < self.object_alive.len()
            && self.object_alive[idx]
            && self.object_generation[idx] == object.generation
    }

    /// Adds `object` to the member list of `group`.
    ///
    /// Returns `Ok(false)` if it already was a member.
    ///
    /// # Errors
    ///
    /// Fails if either handle is stale.
    pub fn link_object(
        &mut self,
        group: GroupId,
        object: ObjectId,
    ) -> Result<bool, HierarchyError> {
        self.check(group)?;
        if !self.is_object_alive(object) {
            return Err(HierarchyError::StaleObject(object));
        }
        let members = &mut self.group_objects[group.idx as usize];
        if members.contains(&object) {
            return Ok(false);
        }
        members.push(object);
        self.dirty.mark(group.idx, dirty::MEMBERS);
        Ok(true)
    }

    /// Removes `object` from the member list of `group`.
    ///
    /// Returns `false` if it was not a member.
    ///
    /// # Panics
    ///
    /// Panics if the group handle is stale.
    pub fn unlink_object(&mut self, group: GroupId, object: ObjectId) -> bool {
        self.validate(group);
        let members = &mut self.group_objects[group.idx as usize];
        let Some(pos) = members.iter().position(|o| *o == object) else {
            return false;
        };
        members.remove(pos);
        self.dirty.mark(group.idx, dirty::MEMBERS);
        true
    }

    /// Replaces every group reference to `old` with `new`.
    ///
    /// Groups that already reference `new` simply drop `old`.
    ///
    /// # Errors
    ///
    /// Fails if either object handle is stale.
    pub fn remap_object(&mut self, old: ObjectId, new: ObjectId) -> Result<(), HierarchyError> {
        if !self.is_object_alive(old) {
            return Err(HierarchyError::StaleObject(old));
        }
        if !self.is_object_alive(new) {
            return Err(HierarchyError::StaleObject(new));
        }
        for (idx, members) in self.group_objects.iter_mut().enumerate() {
            let Some(pos) = members.iter().position(|o| *o == old) else {
                continue;
            };
            if members.contains(&new) {
                members.remove(pos);
            } else {
                members[pos] = new;
            }
            self.dirty.mark(idx as u32, dirty::MEMBERS);
        }
        Ok(())
    }

    /// Returns the name of an object.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn object_name(&self, object: ObjectId) -> &str {
        self.validate_object(object);
        &self.object_name[object.idx as usize]
    }

    /// Returns the restrict flags of an object.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn object_restrict(&self, object: ObjectId) -> RestrictFlags {
        self.validate_object(object);
        self.object_restrict[object.idx as usize]
    }

    /// Sets the restrict flags of an object.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_object_restrict(&mut self, object: ObjectId, restrict: RestrictFlags) {
        self.validate_object(object);
        self.object_restrict[object.idx as usize] = restrict;
        self.object_dirty.mark(object.idx, dirty::OBJECT_RESTRICT);
    }

    /// Returns the live object at raw slot `idx`, if any.
    #[must_use]
    pub fn object_at(&self, idx: u32) -> Option<ObjectId> {
        let i = idx as usize;
        (i < self.object_alive.len() && self.object_alive[i]).then(|| ObjectId {
            idx,
            generation: self.object_generation[i],
        })
    }

    // -- Internal helpers --

    pub(crate) fn group_handle(&self, idx: u32) -> GroupId {
        GroupId {
            idx,
            generation: self.group_generation[idx as usize],
        }
    }

    fn check(&self, group: GroupId) -> Result<(), HierarchyError> {
        if self.is_alive(group) {
            Ok(())
        } else {
            Err(HierarchyError::StaleGroup(group))
        }
    }

    /// Panics if the handle is stale.
    fn validate(&self, group: GroupId) {
        assert!(self.is_alive(group), "stale GroupId: {group:?}");
    }

    /// Panics if the handle is stale.
    fn validate_object(&self, object: ObjectId) {
        assert!(self.is_object_alive(object), "stale ObjectId: {object:?}");
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn new_has_master() {
        let hierarchy = Hierarchy::new();
        let master = hierarchy.master().unwrap();
        assert!(hierarchy.is_master(master));
        assert_eq!(hierarchy.group_name(master), "Master");
    }

    #[test]
    fn unversioned_has_no_master_until_installed() {
        let mut hierarchy = Hierarchy::unversioned();
        assert!(hierarchy.master().is_none());
        let master = hierarchy.install_master();
        assert_eq!(hierarchy.master(), Some(master));
        assert_eq!(hierarchy.install_master(), master);
    }

    #[test]
    fn link_and_order_children() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let b = h.create_group("B");
        let c = h.create_group("C");
        h.link_child(master, a).unwrap();
        h.link_child(master, c).unwrap();
        h.insert_child(master, 1, b).unwrap();
        assert_eq!(h.children(master), &[a, b, c]);

        assert!(h.move_child(master, a, 2));
        assert_eq!(h.children(master), &[b, c, a]);
        assert_eq!(h.parents(a), &[master]);
    }

    #[test]
    fn cycle_is_rejected() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let b = h.create_group("B");
        h.link_child(master, a).unwrap();
        h.link_child(a, b).unwrap();
        assert_eq!(
            h.link_child(b, a),
            Err(HierarchyError::Cycle { parent: b, child: a })
        );
        assert_eq!(h.link_child(a, a), Err(HierarchyError::Cycle { parent: a, child: a }));
        assert_eq!(
            h.link_child(master, a),
            Err(HierarchyError::AlreadyLinked { parent: master, child: a })
        );
        assert_eq!(h.link_child(a, master), Err(HierarchyError::Master));
    }

    #[test]
    fn group_may_have_several_parents() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let b = h.create_group("B");
        let shared = h.create_group("Shared");
        h.link_child(master, a).unwrap();
        h.link_child(master, b).unwrap();
        h.link_child(a, shared).unwrap();
        h.link_child(b, shared).unwrap();
        assert_eq!(h.parents(shared), &[a, b]);
    }

    #[test]
    fn reparent_moves_between_parents() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let b = h.create_group("B");
        let g = h.create_group("G");
        h.link_child(master, a).unwrap();
        h.link_child(master, b).unwrap();
        h.link_child(a, g).unwrap();

        h.reparent(g, b).unwrap();
        assert!(h.children(a).is_empty());
        assert_eq!(h.children(b), &[g]);
        assert_eq!(h.parents(g), &[b]);
    }

    #[test]
    fn destroy_group_unlinks_everywhere() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let x = h.create_group("X");
        h.link_child(master, a).unwrap();
        h.link_child(a, x).unwrap();

        h.destroy_group(a).unwrap();
        assert!(!h.is_alive(a));
        assert!(h.children(master).is_empty());
        assert!(h.parents(x).is_empty());
        assert_eq!(h.destroy_group(master), Err(HierarchyError::Master));
        assert_eq!(h.destroy_group(a), Err(HierarchyError::StaleGroup(a)));

        // Slot reuse yields a fresh generation.
        let y = h.create_group("Y");
        assert_eq!(y.index(), a.index());
        assert_ne!(y.generation(), a.generation());
        assert!(!h.is_alive(a));
    }

    #[test]
    fn objects_link_unlink_and_remap() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        h.link_child(master, a).unwrap();
        let o1 = h.create_object("O1");
        let o2 = h.create_object("O2");

        assert_eq!(h.link_object(a, o1), Ok(true));
        assert_eq!(h.link_object(a, o1), Ok(false));
        h.link_object(master, o1).unwrap();
        h.link_object(master, o2).unwrap();

        h.remap_object(o1, o2).unwrap();
        assert_eq!(h.objects(a), &[o2]);
        assert_eq!(h.objects(master), &[o2]);

        assert!(h.unlink_object(a, o2));
        assert!(!h.unlink_object(a, o2));

        h.destroy_object(o2).unwrap();
        assert!(h.objects(master).is_empty());
        assert!(!h.is_object_alive(o2));
        assert_eq!(h.object_at(o2.index()), None);
        assert_eq!(h.object_at(o1.index()), Some(o1));
    }

    #[test]
    #[should_panic(expected = "stale GroupId")]
    fn stale_group_panics_on_children() {
        let mut h = Hierarchy::new();
        let a = h.create_group("A");
        h.destroy_group(a).unwrap();
        let _ = h.children(a);
    }

    #[test]
    fn descendant_query() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let b = h.create_group("B");
        h.link_child(master, a).unwrap();
        h.link_child(a, b).unwrap();
        assert!(h.is_descendant(b, master));
        assert!(!h.is_descendant(master, b));
        let all: Vec<_> = vec![a, b];
        assert!(all.iter().all(|g| h.is_descendant(*g, master)));
    }
}
