// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconciliation of a view layer against the source hierarchy.
//!
//! [`reconcile`] makes a view layer's [`LayerTree`] isomorphic to the current
//! group hierarchy and rebuilds its base list, reusing existing nodes (and the
//! authored flags on them) wherever possible. A pass runs in four phases:
//!
//! 1. **Snapshot**: one transient [`ResyncNode`] per existing layer node,
//!    recording the *old* parent/child links and how well each node still
//!    fits the hierarchy (`usable`, `valid_as_child`, `valid_as_parent`,
//!    `used`). The snapshot lives in a bump arena freed at the end of the
//!    pass and is never restructured, so later searches still see the old
//!    shape.
//! 2. **Rebuild**: depth-first from the root, each child group is matched to
//!    an old node (direct child first, then a breadth-first widening search
//!    over unused nodes) or gets a new node inheriting the parent's flags.
//!    Bases are collected for every object of every non-excluded node.
//! 3. **Cleanup**: unused snapshot nodes are freed.
//! 4. **Finalize**: unreached bases are dropped, base flags are evaluated,
//!    and the active node is repaired.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;

use crate::config::SyncConfig;
use crate::flags::{BaseFlags, LOCAL_BITS_ALL, LayerFlags, RestrictFlags, RuntimeFlags};
use crate::gate::SyncGate;
use crate::hierarchy::Hierarchy;
use crate::id::{GroupId, INVALID};
use crate::index::BaseCollector;
use crate::layer::LayerTree;
use crate::trace::{
    BaseRemovedEvent, GateClosedEvent, MatchKind, NodeFreedEvent, NodeMatchEvent,
    ResyncBeginEvent, Tracer,
};
use crate::view_layer::{ViewLayer, node_hidden};

/// Counters of a completed reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResyncStats {
    /// Nodes kept under the same parent.
    pub reused: usize,
    /// Nodes moved to a new parent.
    pub relocated: usize,
    /// Nodes created.
    pub created: usize,
    /// Nodes freed.
    pub freed: usize,
    /// Bases created.
    pub bases_created: usize,
    /// Bases removed.
    pub bases_removed: usize,
    /// Child links skipped because the group was not alive.
    pub skipped_children: usize,
}

impl ResyncStats {
    /// Returns whether the pass left the tree structure and base identities
    /// untouched.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.relocated == 0
            && self.created == 0
            && self.freed == 0
            && self.bases_created == 0
            && self.bases_removed == 0
    }
}

/// Reconciles `view_layer` against `hierarchy` with interactive settings and
/// no tracing.
///
/// Returns `false` without touching the tree when the gate is closed (the
/// view layer is then marked out of sync) or when the hierarchy has no
/// master group yet.
pub fn reconcile(view_layer: &mut ViewLayer, hierarchy: &Hierarchy, gate: &SyncGate) -> bool {
    reconcile_with(
        view_layer,
        hierarchy,
        gate,
        &SyncConfig::interactive(),
        &mut Tracer::none(),
    )
    .is_some()
}

/// Reconciles `view_layer` against `hierarchy`.
///
/// Returns the pass statistics, or `None` if the pass was refused (see
/// [`reconcile`]).
///
/// # Panics
///
/// Panics if `config.validate_bases` is set and an object of a non-excluded
/// node ends up without a base.
pub fn reconcile_with(
    view_layer: &mut ViewLayer,
    hierarchy: &Hierarchy,
    gate: &SyncGate,
    config: &SyncConfig,
    tracer: &mut Tracer<'_>,
) -> Option<ResyncStats> {
    if !gate.is_open() {
        view_layer.out_of_sync = true;
        tracer.gate_closed(&GateClosedEvent {
            depth: gate.depth(),
        });
        log::debug!("resync of {:?} deferred: gate closed", view_layer.name);
        return None;
    }
    let Some(master) = hierarchy.master() else {
        log::warn!("resync of {:?} refused: hierarchy has no master group", view_layer.name);
        return None;
    };

    let tree = &mut view_layer.tree;
    if tree.is_empty() {
        let root = tree.create_node(master, LayerFlags::empty());
        tree.set_root(root);
    } else if tree.group[tree.root as usize] != master {
        log::warn!("root node of {:?} rewrapped to the master group", view_layer.name);
        tree.group[tree.root as usize] = master;
    }

    tracer.resync_begin(&ResyncBeginEvent {
        old_nodes: tree.count(),
        old_bases: view_layer.index.len(),
    });

    let old_count = tree.count();
    let bump = Bump::with_capacity(old_count.max(1) * core::mem::size_of::<ResyncNode<'_>>() * 2);
    let mut arena: BumpVec<'_, ResyncNode<'_>> = BumpVec::with_capacity_in(old_count, &bump);

    // Phase A: snapshot.
    snapshot(&mut arena, &bump, tree, hierarchy, tree.root, None);
    debug_assert!(arena[0].used, "root node must always be reusable");

    // Phase B: rebuild.
    let mut engine = Engine {
        tree,
        hierarchy,
        arena,
        bump: &bump,
        bases: view_layer.index.begin_collect(),
        queue: VecDeque::new(),
        stats: ResyncStats::default(),
        tracer,
        has_exporters: false,
    };
    let root_slot = engine.tree.root;
    engine.tree.runtime[root_slot as usize] = RuntimeFlags::empty();
    engine.sync_node(
        0,
        Inherited {
            new_child_flags: LayerFlags::empty(),
            restrict: RestrictFlags::empty(),
            layer_restrict: LayerFlags::empty(),
            local_bits: LOCAL_BITS_ALL,
        },
    );
    engine.finish_root(root_slot);

    // Phase C: cleanup.
    let Engine {
        arena,
        bases,
        mut stats,
        tracer,
        has_exporters,
        ..
    } = engine;
    stats.bases_created = bases.created;
    log::trace!("collected {} bases", bases.assembled().len());
    for rnode in arena.iter().rev() {
        if rnode.used {
            continue;
        }
        let handle = view_layer.tree.handle(rnode.node);
        if view_layer.active == Some(handle) {
            // Fall back to the closest old ancestor that survives.
            let mut up = rnode.parent;
            while let Some(p) = up.filter(|&p| !arena[p as usize].used) {
                up = arena[p as usize].parent;
            }
            view_layer.active = up.map(|p| view_layer.tree.handle(arena[p as usize].node));
        }
        log::debug!("freeing unused node for {:?}", rnode.group);
        tracer.node_freed(&NodeFreedEvent {
            node: handle,
            group: rnode.group,
        });
        view_layer.tree.free_node(rnode.node);
        stats.freed += 1;
    }
    drop(arena);
    drop(bump);

    // Phase D: finalize.
    let removed = view_layer.index.finish_collect(bases);
    stats.bases_removed = removed.len();
    for base in &removed {
        tracer.base_removed(&BaseRemovedEvent {
            base: base.id,
            object: base.object,
        });
    }
    view_layer.has_exporters = has_exporters;

    if config.validate_bases {
        validate_bases(view_layer, hierarchy);
    }

    for base in view_layer.index.bases_mut() {
        let restrict = if hierarchy.is_object_alive(base.object) {
            hierarchy.object_restrict(base.object)
        } else {
            RestrictFlags::empty()
        };
        base.eval_flags(restrict);
    }

    repair_active(view_layer, hierarchy);

    log::debug!(
        "resynced {:?}: {} reused, {} relocated, {} created, {} freed, bases +{} -{}",
        view_layer.name,
        stats.reused,
        stats.relocated,
        stats.created,
        stats.freed,
        stats.bases_created,
        stats.bases_removed
    );
    tracer.resync_summary(&stats);
    Some(stats)
}

/// Transient mirror of one old layer node.
#[derive(Debug)]
struct ResyncNode<'b> {
    /// Slot in the layer tree.
    node: u32,
    /// Group the node wrapped when the pass started.
    group: GroupId,
    /// Arena index of the old parent.
    parent: Option<u32>,
    /// Arena indices of the old children, plus nodes created under this one.
    children: BumpVec<'b, u32>,
    /// The wrapped group is still alive.
    usable: bool,
    /// At least one old child is still a valid child.
    valid_as_parent: bool,
    /// The old parent is usable and its group still lists this group.
    valid_as_child: bool,
    /// Part of the fully valid chain from the root, or claimed by the rebuild.
    used: bool,
}

/// Accumulated state passed down the rebuild recursion.
#[derive(Clone, Copy, Debug)]
struct Inherited {
    /// Authored flags given to nodes created under the current node.
    new_child_flags: LayerFlags,
    /// Union of group restrictions along the path (the master's excluded).
    restrict: RestrictFlags,
    /// Union of authored flags along the path (the root's excluded).
    layer_restrict: LayerFlags,
    /// Intersection of local bits along the path.
    local_bits: u16,
}

fn snapshot<'b>(
    arena: &mut BumpVec<'b, ResyncNode<'b>>,
    bump: &'b Bump,
    tree: &LayerTree,
    hierarchy: &Hierarchy,
    slot: u32,
    parent: Option<u32>,
) -> u32 {
    let group = tree.group[slot as usize];
    let usable = hierarchy.is_alive(group);
    let valid_as_child = usable
        && parent.is_none_or(|p| {
            let p = &arena[p as usize];
            p.usable && hierarchy.has_child(p.group, group)
        });
    let used = valid_as_child && parent.is_none_or(|p| arena[p as usize].used);

    let me = arena.len() as u32;
    arena.push(ResyncNode {
        node: slot,
        group,
        parent,
        children: BumpVec::new_in(bump),
        usable,
        valid_as_parent: usable && tree.children[slot as usize].is_empty(),
        valid_as_child,
        used,
    });
    if let Some(p) = parent {
        arena[p as usize].children.push(me);
    }

    for &child_slot in &tree.children[slot as usize] {
        let child = snapshot(arena, bump, tree, hierarchy, child_slot, Some(me));
        if usable && arena[child as usize].valid_as_child {
            arena[me as usize].valid_as_parent = true;
        }
    }

    let n = &arena[me as usize];
    log::trace!(
        "old node for {:?}: usable={} valid_parent={} valid_child={} used={}",
        n.group,
        n.usable,
        n.valid_as_parent,
        n.valid_as_child,
        n.used
    );
    me
}

struct Engine<'t, 'h, 'b, 'tr, 's> {
    tree: &'t mut LayerTree,
    hierarchy: &'h Hierarchy,
    arena: BumpVec<'b, ResyncNode<'b>>,
    bump: &'b Bump,
    bases: BaseCollector,
    queue: VecDeque<u32>,
    stats: ResyncStats,
    tracer: &'tr mut Tracer<'s>,
    has_exporters: bool,
}

impl Engine<'_, '_, '_, '_, '_> {
    /// Finds the best old node for `child_group` under arena node `start`.
    ///
    /// Preference order: a direct old child of `start`; then, breadth-first,
    /// an unused node that is not part of a still-valid chain, searching the
    /// subtree of `start` first and then widening to the siblings of each
    /// ancestor in turn.
    fn find(&mut self, start: u32, child_group: GroupId) -> Option<u32> {
        debug_assert_ne!(self.arena[start as usize].group, child_group);
        self.queue.clear();
        self.queue.push_back(start);
        let mut widened = start;

        while let Some(current) = self.queue.pop_front() {
            let n = &self.arena[current as usize];
            if n.usable
                && n.group == child_group
                && (n.parent == Some(start) || (!n.used && !n.valid_as_child))
            {
                return Some(current);
            }
            self.queue.extend(n.children.iter().copied());

            if self.queue.is_empty() {
                if let Some(parent) = self.arena[widened as usize].parent {
                    let siblings = &self.arena[parent as usize].children;
                    self.queue
                        .extend(siblings.iter().copied().filter(|&s| s != widened));
                    widened = parent;
                }
            }
        }
        None
    }

    fn sync_node(&mut self, current: u32, inherited: Inherited) {
        let hierarchy = self.hierarchy;
        let (slot, group) = {
            let n = &self.arena[current as usize];
            debug_assert!(n.used);
            (n.node, n.group)
        };

        let source_children = hierarchy.children(group);
        let mut new_children = Vec::with_capacity(source_children.len());
        let mut skipped = 0;

        for &child_group in source_children {
            // Stale links are tolerated and counted; `Hierarchy` itself
            // unlinks destroyed groups.
            if !hierarchy.is_alive(child_group) {
                skipped += 1;
                continue;
            }

            let (child, kind) = match self.find(current, child_group) {
                Some(found) => {
                    let kind = if self.arena[found as usize].parent == Some(current) {
                        self.stats.reused += 1;
                        MatchKind::Unchanged
                    } else {
                        self.stats.relocated += 1;
                        MatchKind::Relocated
                    };
                    self.arena[found as usize].used = true;
                    (found, kind)
                }
                None => {
                    let slot = self.tree.create_node(child_group, inherited.new_child_flags);
                    let idx = self.arena.len() as u32;
                    self.arena.push(ResyncNode {
                        node: slot,
                        group: child_group,
                        parent: Some(current),
                        children: BumpVec::new_in(self.bump),
                        usable: true,
                        valid_as_parent: true,
                        valid_as_child: true,
                        used: true,
                    });
                    self.arena[current as usize].children.push(idx);
                    self.stats.created += 1;
                    (idx, MatchKind::Created)
                }
            };

            let child_slot = self.arena[child as usize].node;
            log::debug!(
                "{:?} under {:?}: {kind:?}",
                hierarchy.group_name(child_group),
                hierarchy.group_name(group)
            );
            self.tracer.node_match(&NodeMatchEvent {
                group: child_group,
                node: self.tree.handle(child_slot),
                parent: self.tree.handle(slot),
                kind,
            });
            new_children.push(child_slot);

            let child_flags = self.tree.flags[child_slot as usize];
            let mut child_inherited = Inherited {
                new_child_flags: child_flags,
                restrict: inherited.restrict,
                layer_restrict: inherited.layer_restrict,
                local_bits: inherited.local_bits & self.tree.local_bits[child_slot as usize],
            };
            if !hierarchy.is_master(child_group) {
                child_inherited.restrict |= hierarchy.restrict(child_group);
                child_inherited.layer_restrict |= child_flags;
            }

            self.tree.runtime[child_slot as usize] = RuntimeFlags::empty();
            self.sync_node(child, child_inherited);

            // Exclude is evaluated locally and never inherited.
            if child_flags.contains(LayerFlags::EXCLUDE) {
                continue;
            }
            let runtime = &mut self.tree.runtime[child_slot as usize];
            if child_inherited.restrict.contains(RestrictFlags::HIDE_VIEWPORT) {
                runtime.insert(RuntimeFlags::HIDE_VIEWPORT);
            }
            if !runtime.contains(RuntimeFlags::HIDE_VIEWPORT)
                && !child_inherited.layer_restrict.contains(LayerFlags::HIDE)
            {
                runtime.insert(RuntimeFlags::VISIBLE_VIEW_LAYER);
            }
            if hierarchy.has_exporters(child_group) {
                runtime.insert(RuntimeFlags::HAS_EXPORTERS);
                self.has_exporters = true;
            }
        }

        debug_assert_eq!(
            source_children.len() - skipped,
            new_children.len(),
            "rebuilt child count does not match the source"
        );
        self.stats.skipped_children += skipped;
        self.tree.replace_children(slot, new_children);

        self.sync_objects(slot, group, inherited);
    }

    /// Collects bases for the objects of one node and ORs in the bits its
    /// groups contribute.
    fn sync_objects(&mut self, slot: u32, group: GroupId, inherited: Inherited) {
        let flags = self.tree.flags[slot as usize];
        if flags.contains(LayerFlags::EXCLUDE) {
            return;
        }
        let hierarchy = self.hierarchy;
        for &object in hierarchy.objects(group) {
            if !hierarchy.is_object_alive(object) {
                continue;
            }
            let base = self.bases.acquire_or_create(object, inherited.local_bits);
            let from = &mut base.flag_from_collection;

            if !inherited.restrict.contains(RestrictFlags::HIDE_VIEWPORT) {
                from.insert(BaseFlags::ENABLED_VIEWPORT | BaseFlags::MAYBE_VISIBLE);
                if !inherited.layer_restrict.contains(LayerFlags::HIDE) {
                    from.insert(BaseFlags::DEFAULT_VISIBLE);
                }
                if !inherited.restrict.contains(RestrictFlags::HIDE_SELECT) {
                    from.insert(BaseFlags::SELECTABLE);
                }
            }
            if !inherited.restrict.contains(RestrictFlags::HIDE_RENDER) {
                from.insert(BaseFlags::ENABLED_RENDER);
            }
            if flags.contains(LayerFlags::HOLDOUT) {
                from.insert(BaseFlags::HOLDOUT);
            }
            if flags.contains(LayerFlags::INDIRECT_ONLY) {
                from.insert(BaseFlags::INDIRECT_ONLY);
            }
            self.tree.runtime[slot as usize].insert(RuntimeFlags::HAS_OBJECTS);
        }
    }

    /// Derives the root's runtime flags once its subtree is done.
    fn finish_root(&mut self, root: u32) {
        let flags = self.tree.flags[root as usize];
        let master = self.tree.group[root as usize];
        let runtime = &mut self.tree.runtime[root as usize];
        if !flags.intersects(LayerFlags::EXCLUDE | LayerFlags::HIDE) {
            runtime.insert(RuntimeFlags::VISIBLE_VIEW_LAYER);
        }
        if self.hierarchy.has_exporters(master) {
            runtime.insert(RuntimeFlags::HAS_EXPORTERS);
            self.has_exporters = true;
        }
    }
}

/// Checks that every object of every non-excluded node has a base.
fn validate_bases(view_layer: &ViewLayer, hierarchy: &Hierarchy) {
    let tree = &view_layer.tree;
    for slot in tree.traversal_order() {
        if tree.flags[slot as usize].contains(LayerFlags::EXCLUDE) {
            continue;
        }
        let group = tree.group[slot as usize];
        for &object in hierarchy.objects(group) {
            if hierarchy.is_object_alive(object) && !view_layer.index.contains(object) {
                log::error!(
                    "object {:?} of group {:?} has no base",
                    hierarchy.object_name(object),
                    hierarchy.group_name(group)
                );
                panic!(
                    "object {object:?} from group {group:?} has no entry in the base cache of {:?}",
                    view_layer.name
                );
            }
        }
    }
}

/// Points the active node at a visible node.
///
/// A missing active node falls back to the root; a hidden one moves up to
/// its nearest non-hidden ancestor, or the root if there is none.
fn repair_active(view_layer: &mut ViewLayer, hierarchy: &Hierarchy) {
    let tree = &view_layer.tree;
    let Some(root) = tree.root() else {
        view_layer.active = None;
        return;
    };
    let active = match view_layer.active {
        Some(active) if tree.is_alive(active) => active,
        _ => {
            view_layer.active = Some(root);
            return;
        }
    };
    if !node_hidden(tree, hierarchy, active.idx) {
        return;
    }
    let mut current = tree.parent[active.idx as usize];
    while current != INVALID && node_hidden(tree, hierarchy, current) {
        current = tree.parent[current as usize];
    }
    let repaired = if current == INVALID {
        root
    } else {
        tree.handle(current)
    };
    log::debug!("active node moved from {active:?} to {repaired:?}");
    view_layer.active = Some(repaired);
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn synced(h: &Hierarchy) -> ViewLayer {
        let gate = SyncGate::new();
        let mut vl = ViewLayer::new("View Layer");
        assert!(reconcile(&mut vl, h, &gate));
        vl
    }

    fn child_groups(vl: &ViewLayer, node: crate::id::NodeId) -> Vec<GroupId> {
        vl.tree()
            .children(node)
            .map(|c| vl.tree().group(c))
            .collect()
    }

    #[test]
    fn first_pass_mirrors_hierarchy() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let b = h.create_group("B");
        let x = h.create_group("X");
        h.link_child(master, a).unwrap();
        h.link_child(master, b).unwrap();
        h.link_child(a, x).unwrap();

        let vl = synced(&h);
        let root = vl.tree().root().unwrap();
        assert_eq!(vl.tree().group(root), master);
        assert_eq!(child_groups(&vl, root), [a, b]);
        let node_a = vl.tree().find_group(a).unwrap();
        assert_eq!(child_groups(&vl, node_a), [x]);
        assert_eq!(vl.active(), Some(root));
    }

    #[test]
    fn closed_gate_marks_dirty_and_refuses() {
        let h = Hierarchy::new();
        let gate = SyncGate::new();
        let mut vl = ViewLayer::new("V");
        let _guard = gate.scoped();
        assert!(!reconcile(&mut vl, &h, &gate));
        assert!(vl.is_out_of_sync());
        assert!(vl.tree().is_empty());
    }

    #[test]
    fn unversioned_hierarchy_is_refused() {
        let h = Hierarchy::unversioned();
        let gate = SyncGate::new();
        let mut vl = ViewLayer::new("V");
        assert!(!reconcile(&mut vl, &h, &gate));
        assert!(vl.tree().is_empty());
    }

    #[test]
    fn second_pass_is_noop() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        h.link_child(master, a).unwrap();
        let o = h.create_object("O");
        h.link_object(a, o).unwrap();

        let gate = SyncGate::new();
        let mut vl = ViewLayer::new("V");
        reconcile(&mut vl, &h, &gate);
        let stats = reconcile_with(
            &mut vl,
            &h,
            &gate,
            &SyncConfig::strict(),
            &mut Tracer::none(),
        )
        .unwrap();
        assert!(stats.is_noop());
        assert_eq!(stats.reused, 1);
    }

    #[test]
    fn excluded_node_contributes_no_bases() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        h.link_child(master, a).unwrap();
        let o = h.create_object("O");
        h.link_object(a, o).unwrap();

        let gate = SyncGate::new();
        let mut vl = synced(&h);
        let node_a = vl.tree().find_group(a).unwrap();
        vl.tree_mut().set_flags(node_a, LayerFlags::EXCLUDE);
        reconcile(&mut vl, &h, &gate);
        assert!(vl.index().find(o).is_none());
        assert!(vl.tree().runtime(node_a).is_empty());
    }

    #[test]
    fn restrictions_flow_into_base_flags() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let b = h.create_group("B");
        h.link_child(master, a).unwrap();
        h.link_child(a, b).unwrap();
        let o = h.create_object("O");
        h.link_object(b, o).unwrap();
        h.set_restrict(a, RestrictFlags::HIDE_SELECT);

        let vl = synced(&h);
        let base = vl.index().find(o).unwrap();
        assert!(base.flags.contains(BaseFlags::MAYBE_VISIBLE));
        assert!(!base.flags.contains(BaseFlags::SELECTABLE));

        h.set_restrict(a, RestrictFlags::HIDE_VIEWPORT);
        let vl = synced(&h);
        let node_b = vl.tree().find_group(b).unwrap();
        assert!(vl.tree().runtime(node_b).contains(RuntimeFlags::HIDE_VIEWPORT));
        assert!(!vl.tree().runtime(node_b).contains(RuntimeFlags::VISIBLE_VIEW_LAYER));
        assert!(!vl.index().find(o).unwrap().flags.contains(BaseFlags::ENABLED_VIEWPORT));
    }

    #[test]
    fn shared_group_gets_one_node_per_path_and_one_base() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let b = h.create_group("B");
        let shared = h.create_group("Shared");
        h.link_child(master, a).unwrap();
        h.link_child(master, b).unwrap();
        h.link_child(a, shared).unwrap();
        h.link_child(b, shared).unwrap();
        let o = h.create_object("O");
        h.link_object(shared, o).unwrap();

        let vl = synced(&h);
        assert_eq!(vl.tree().count(), 5);
        assert_eq!(vl.index().len(), 1);
        assert!(vl.index().is_consistent());
    }

    #[test]
    fn holdout_comes_from_node_flags() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        h.link_child(master, a).unwrap();
        let o = h.create_object("O");
        h.link_object(a, o).unwrap();

        let gate = SyncGate::new();
        let mut vl = synced(&h);
        let node_a = vl.tree().find_group(a).unwrap();
        vl.tree_mut().set_flags(node_a, LayerFlags::HOLDOUT);
        reconcile(&mut vl, &h, &gate);
        let base = vl.index().find(o).unwrap();
        assert!(base.flags.contains(BaseFlags::HOLDOUT));
        assert!(vl.tree().runtime(node_a).contains(RuntimeFlags::HAS_OBJECTS));
    }

    #[test]
    fn exporters_are_reported() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        h.link_child(master, a).unwrap();
        h.set_has_exporters(a, true);
        let vl = synced(&h);
        assert!(vl.has_exporters());
    }

    #[test]
    fn dead_child_links_are_skipped() {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let b = h.create_group("B");
        h.link_child(master, a).unwrap();
        h.link_child(master, b).unwrap();
        let mut vl = synced(&h);
        let node_a = vl.tree().find_group(a).unwrap();

        // Leave a stale link behind, as a store without unlink-on-destroy would.
        h.group_generation[a.idx as usize] += 1;
        vl.mark_dirty();
        let stats = reconcile_with(
            &mut vl,
            &h,
            &SyncGate::new(),
            &SyncConfig::strict(),
            &mut Tracer::none(),
        )
        .unwrap();
        assert_eq!(stats.skipped_children, 1);
        assert_eq!(stats.freed, 1);
        assert!(!vl.tree().is_alive(node_a));
        let root = vl.tree().root().unwrap();
        assert_eq!(child_groups(&vl, root), [b]);
    }
}
