// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end reconciliation scenarios.

use layersync_core::config::SyncConfig;
use layersync_core::flags::{BaseFlags, LayerFlags, local_slot_bit};
use layersync_core::gate::SyncGate;
use layersync_core::hierarchy::Hierarchy;
use layersync_core::id::{BaseId, GroupId, NodeId, ObjectId};
use layersync_core::layer::LayerTree;
use layersync_core::resync::{ResyncStats, reconcile, reconcile_with};
use layersync_core::trace::Tracer;
use layersync_core::view_layer::ViewLayer;
use layersync_core::visibility::local_sync;

static GATE: SyncGate = SyncGate::new();

fn sync(vl: &mut ViewLayer, h: &Hierarchy) -> ResyncStats {
    reconcile_with(vl, h, &GATE, &SyncConfig::strict(), &mut Tracer::none())
        .expect("gate is never closed in these tests")
}

fn node(vl: &ViewLayer, group: GroupId) -> NodeId {
    vl.tree().find_group(group).expect("group is mirrored")
}

/// Asserts that the subtree of `node` has the shape of the subtree of `group`.
fn assert_isomorphic(tree: &LayerTree, h: &Hierarchy, node: NodeId, group: GroupId) {
    assert_eq!(tree.group(node), group);
    let children: Vec<_> = tree.children(node).collect();
    assert_eq!(children.len(), h.children(group).len(), "child count of {group:?}");
    for (&child_node, &child_group) in children.iter().zip(h.children(group)) {
        assert_isomorphic(tree, h, child_node, child_group);
    }
}

fn identities(vl: &ViewLayer) -> (Vec<NodeId>, Vec<(ObjectId, BaseId)>) {
    let tree = vl.tree();
    let nodes = (0..tree.count()).filter_map(|i| tree.from_index(i)).collect();
    let bases = vl.index().bases().iter().map(|b| (b.object(), b.id())).collect();
    (nodes, bases)
}

fn assert_hash_consistent(vl: &ViewLayer) {
    let index = vl.index();
    for (pos, base) in index.bases().iter().enumerate() {
        assert_eq!(index.position(base.object()), Some(pos));
    }
    assert_eq!(index.hash_len(), index.len());
}

struct Scenario {
    h: Hierarchy,
    vl: ViewLayer,
    master: GroupId,
    a: GroupId,
    b: GroupId,
    x: GroupId,
    o1: ObjectId,
    o2: ObjectId,
}

/// `Master { A { X }, B }` with O1 in A and O2 in B.
fn scenario() -> Scenario {
    let mut h = Hierarchy::new();
    let master = h.master().unwrap();
    let a = h.create_group("A");
    let b = h.create_group("B");
    let x = h.create_group("X");
    h.link_child(master, a).unwrap();
    h.link_child(master, b).unwrap();
    h.link_child(a, x).unwrap();
    let o1 = h.create_object("O1");
    let o2 = h.create_object("O2");
    h.link_object(a, o1).unwrap();
    h.link_object(b, o2).unwrap();
    let mut vl = ViewLayer::new("View Layer");
    sync(&mut vl, &h);
    Scenario {
        h,
        vl,
        master,
        a,
        b,
        x,
        o1,
        o2,
    }
}

#[test]
fn first_resync_mirrors_the_scenario() {
    let s = scenario();
    let root = s.vl.tree().root().unwrap();
    assert_isomorphic(s.vl.tree(), &s.h, root, s.master);
    assert_eq!(s.vl.index().len(), 2);
    for object in [s.o1, s.o2] {
        let base = s.vl.index().find(object).unwrap();
        assert!(base.flags.contains(BaseFlags::DEFAULT_VISIBLE | BaseFlags::SELECTABLE));
    }
}

#[test]
fn second_resync_changes_nothing() {
    let mut s = scenario();
    let before = identities(&s.vl);
    let stats = sync(&mut s.vl, &s.h);
    assert!(stats.is_noop());
    assert_eq!(identities(&s.vl), before);
}

#[test]
fn delete_and_insert() {
    let mut s = scenario();
    let node_a = node(&s.vl, s.a);
    let node_x = node(&s.vl, s.x);
    let base_ids: Vec<_> = [s.o1, s.o2]
        .map(|o| s.vl.index().find(o).unwrap().id())
        .into();
    assert!(s.vl.activate(node_x));

    s.h.destroy_group(s.x).unwrap();
    let y = s.h.create_group("Y");
    s.h.link_child(s.master, y).unwrap();
    let stats = sync(&mut s.vl, &s.h);

    assert_eq!(stats.freed, 1);
    assert_eq!(stats.created, 1);
    assert!(!s.vl.tree().is_alive(node_x));
    assert_eq!(node(&s.vl, s.a), node_a);
    let node_y = node(&s.vl, y);
    assert_eq!(s.vl.tree().flags(node_y), LayerFlags::empty());
    assert_eq!(s.vl.active(), Some(node_a));
    let after: Vec<_> = [s.o1, s.o2]
        .map(|o| s.vl.index().find(o).unwrap().id())
        .into();
    assert_eq!(after, base_ids);
    let root = s.vl.tree().root().unwrap();
    assert_isomorphic(s.vl.tree(), &s.h, root, s.master);
}

#[test]
fn reorder_keeps_authored_flags() {
    let mut s = scenario();
    let node_b = node(&s.vl, s.b);
    s.vl.tree_mut().set_flags(node_b, LayerFlags::HOLDOUT);

    assert!(s.h.move_child(s.master, s.b, 0));
    let stats = sync(&mut s.vl, &s.h);
    assert_eq!(stats.created, 0);
    assert_eq!(stats.freed, 0);

    let root = s.vl.tree().root().unwrap();
    let first = s.vl.tree().children(root).next().unwrap();
    assert_eq!(first, node_b);
    assert_eq!(s.vl.tree().flags(first), LayerFlags::HOLDOUT);
    assert_isomorphic(s.vl.tree(), &s.h, root, s.master);
}

#[test]
fn reparent_keeps_exclude() {
    let mut s = scenario();
    let node_x = node(&s.vl, s.x);
    s.vl.tree_mut().set_flags(node_x, LayerFlags::EXCLUDE);

    s.h.reparent(s.x, s.b).unwrap();
    let stats = sync(&mut s.vl, &s.h);
    assert_eq!(stats.relocated, 1);
    assert_eq!(stats.created, 0);

    let moved = node(&s.vl, s.x);
    assert_eq!(moved, node_x);
    assert!(s.vl.tree().flags(moved).contains(LayerFlags::EXCLUDE));
    assert_eq!(s.vl.tree().parent(moved), Some(node(&s.vl, s.b)));
}

#[test]
fn reparent_subtree_reuses_whole_chain() {
    let mut s = scenario();
    let z = s.h.create_group("Z");
    s.h.link_child(s.x, z).unwrap();
    sync(&mut s.vl, &s.h);
    let node_x = node(&s.vl, s.x);
    let node_z = node(&s.vl, z);

    s.h.reparent(s.x, s.b).unwrap();
    sync(&mut s.vl, &s.h);
    assert_eq!(node(&s.vl, s.x), node_x);
    assert_eq!(node(&s.vl, z), node_z);
    assert_eq!(s.vl.tree().parent(node_z), Some(node_x));
}

#[test]
fn new_node_inherits_parent_flags() {
    let mut s = scenario();
    let node_a = node(&s.vl, s.a);
    s.vl.tree_mut().set_flags(node_a, LayerFlags::HIDE | LayerFlags::INDIRECT_ONLY);

    let fresh = s.h.create_group("Fresh");
    s.h.link_child(s.a, fresh).unwrap();
    sync(&mut s.vl, &s.h);
    assert_eq!(
        s.vl.tree().flags(node(&s.vl, fresh)),
        LayerFlags::HIDE | LayerFlags::INDIRECT_ONLY
    );
}

#[test]
fn bases_are_unique_and_hash_is_consistent() {
    let mut s = scenario();
    // O1 reachable twice: directly in A and through B.
    s.h.link_object(s.b, s.o1).unwrap();
    let shared = s.h.create_group("Shared");
    s.h.link_child(s.a, shared).unwrap();
    s.h.link_child(s.b, shared).unwrap();
    let o3 = s.h.create_object("O3");
    s.h.link_object(shared, o3).unwrap();
    sync(&mut s.vl, &s.h);

    assert_eq!(s.vl.index().len(), 3);
    assert_hash_consistent(&s.vl);

    // Excluding B leaves O2 unreachable; O1 and O3 stay reachable through A.
    let node_b = node(&s.vl, s.b);
    s.vl.tree_mut().set_flags(node_b, LayerFlags::EXCLUDE);
    sync(&mut s.vl, &s.h);
    assert!(s.vl.index().find(s.o2).is_none());
    assert!(s.vl.index().find(s.o1).is_some());
    assert!(s.vl.index().find(o3).is_some());
    assert_hash_consistent(&s.vl);
}

#[test]
fn hidden_active_moves_to_visible_ancestor() {
    let mut s = scenario();
    let node_a = node(&s.vl, s.a);
    let node_x = node(&s.vl, s.x);
    assert!(s.vl.activate(node_x));
    s.vl.tree_mut().set_flags(node_a, LayerFlags::HIDE);
    sync(&mut s.vl, &s.h);
    assert_eq!(s.vl.active(), s.vl.tree().root());
}

#[test]
fn unversioned_hierarchy_is_retried_later() {
    let mut h = Hierarchy::unversioned();
    let mut vl = ViewLayer::new("View Layer");
    assert!(!reconcile(&mut vl, &h, &GATE));
    assert!(vl.tree().is_empty());

    let master = h.install_master();
    assert!(vl.ensure_synced(&h, &GATE));
    assert_eq!(vl.tree().group(vl.tree().root().unwrap()), master);
}

#[test]
fn local_visibility_per_slot() {
    let mut s = scenario();
    let bit0 = local_slot_bit(0);
    let bit1 = local_slot_bit(1);
    local_sync(&mut s.vl, &s.h, bit0);
    local_sync(&mut s.vl, &s.h, bit1);

    let node_b = node(&s.vl, s.b);
    let bits = s.vl.tree().local_bits(node_b);
    s.vl.tree_mut().set_local_bits(node_b, bits & !bit0);
    local_sync(&mut s.vl, &s.h, bit0);

    let o1 = s.vl.index().find(s.o1).unwrap();
    let o2 = s.vl.index().find(s.o2).unwrap();
    assert_ne!(o1.local_bits & bit0, 0);
    assert_eq!(o2.local_bits & bit0, 0);
    assert_ne!(o2.local_bits & bit1, 0);
}

#[test]
fn gate_defers_until_reopened() {
    static LOCAL_GATE: SyncGate = SyncGate::new();
    let mut s = scenario();
    let y = s.h.create_group("Y");
    s.h.link_child(s.master, y).unwrap();
    s.vl.mark_dirty();
    {
        let _outer = LOCAL_GATE.scoped();
        let _inner = LOCAL_GATE.scoped();
        assert!(!s.vl.ensure_synced(&s.h, &LOCAL_GATE));
    }
    assert!(s.vl.is_out_of_sync());
    assert!(s.vl.tree().find_group(y).is_none());
    assert!(s.vl.ensure_synced(&s.h, &LOCAL_GATE));
    assert!(s.vl.tree().find_group(y).is_some());
}

#[test]
fn claimed_node_is_not_taken_by_a_second_parent() {
    let mut s = scenario();
    let shared = s.h.create_group("S");
    s.h.link_child(s.a, shared).unwrap();
    sync(&mut s.vl, &s.h);
    let node_s = node(&s.vl, shared);
    s.vl.tree_mut().set_flags(node_s, LayerFlags::HOLDOUT);

    s.h.link_child(s.b, shared).unwrap();
    let stats = sync(&mut s.vl, &s.h);
    assert_eq!(stats.created, 1);
    assert_eq!(stats.freed, 0);

    let node_a = node(&s.vl, s.a);
    let node_b = node(&s.vl, s.b);
    let under_a: Vec<_> = s.vl.tree().children(node_a).collect();
    assert_eq!(under_a, [node(&s.vl, s.x), node_s]);
    assert_eq!(s.vl.tree().flags(node_s), LayerFlags::HOLDOUT);
    let under_b: Vec<_> = s.vl.tree().children(node_b).collect();
    assert_eq!(under_b.len(), 1);
    assert_ne!(under_b[0], node_s);
    assert_eq!(s.vl.tree().group(under_b[0]), shared);
    assert_eq!(s.vl.tree().flags(under_b[0]), LayerFlags::empty());
}

#[test]
fn widening_search_skips_nodes_of_a_still_valid_chain() {
    // Master { A { P { S } }, B }, then P moves to B and S is linked under A.
    let mut s = scenario();
    let p = s.h.create_group("P");
    let shared = s.h.create_group("S");
    s.h.link_child(s.a, p).unwrap();
    s.h.link_child(p, shared).unwrap();
    sync(&mut s.vl, &s.h);
    let node_p = node(&s.vl, p);
    let node_s = node(&s.vl, shared);
    s.vl.tree_mut().set_flags(node_s, LayerFlags::HOLDOUT);

    s.h.reparent(p, s.b).unwrap();
    s.h.link_child(s.a, shared).unwrap();
    let stats = sync(&mut s.vl, &s.h);
    assert_eq!(stats.relocated, 1);
    assert_eq!(stats.created, 1);
    assert_eq!(stats.freed, 0);

    // S stays with P, whose chain is still valid below the moved node.
    assert_eq!(s.vl.tree().parent(node_p), Some(node(&s.vl, s.b)));
    let under_p: Vec<_> = s.vl.tree().children(node_p).collect();
    assert_eq!(under_p, [node_s]);
    assert_eq!(s.vl.tree().flags(node_s), LayerFlags::HOLDOUT);

    let node_a = node(&s.vl, s.a);
    let fresh = s
        .vl
        .tree()
        .children(node_a)
        .find(|&c| s.vl.tree().group(c) == shared)
        .unwrap();
    assert_ne!(fresh, node_s);
    assert_eq!(s.vl.tree().flags(fresh), LayerFlags::empty());
    let root = s.vl.tree().root().unwrap();
    assert_isomorphic(s.vl.tree(), &s.h, root, s.master);
}
