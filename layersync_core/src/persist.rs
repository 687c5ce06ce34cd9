// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat, serde-friendly records of a view layer.
//!
//! [`write`] lays the layer tree out depth-first, each node followed by its
//! subtree and carrying its child count, next to the base list. Hash and
//! derived flags are not stored: [`read`] leaves the view layer out of sync so
//! the next reconciliation recomputes them.
//!
//! Older data stored the top-level groups as siblings instead of under a
//! single master wrapper. [`read`] detects that shape (more than one
//! top-level entry, or a single one that does not wrap the master group) and
//! synthesizes a root around the former siblings.

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::ReadError;
use crate::flags::{BaseFlags, LayerFlags};
use crate::hierarchy::Hierarchy;
use crate::id::{BaseId, GroupId, ObjectId};
use crate::index::DuplicatePolicy;
use crate::layer::LayerTree;
use crate::view_layer::ViewLayer;

/// A stored view layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewLayerRecord {
    /// View layer name.
    pub name: String,
    /// Number of top-level entries at the front of `nodes`. Current data
    /// always has one.
    pub top_level: usize,
    /// Layer nodes in depth-first pre-order.
    pub nodes: Vec<NodeRecord>,
    /// Bases in list order.
    pub bases: Vec<BaseRecord>,
    /// Depth-first position of the active node.
    pub active_node: Option<usize>,
    /// Position of the active base in `bases`.
    pub active_base: Option<usize>,
}

/// A stored layer node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// The wrapped group.
    pub group: GroupId,
    /// Authored [`LayerFlags`] bits.
    pub flags: u16,
    /// Per-viewport local bits.
    pub local_bits: u16,
    /// Number of direct children, stored right after this node.
    pub child_count: usize,
}

/// A stored base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRecord {
    /// The wrapped object.
    pub object: ObjectId,
    /// [`BaseFlags`] bits.
    pub flags: u16,
    /// Per-viewport local bits.
    pub local_bits: u16,
}

/// Captures `view_layer` as a record.
#[must_use]
pub fn write(view_layer: &ViewLayer) -> ViewLayerRecord {
    let tree = view_layer.tree();
    let order = tree.traversal_order();
    let nodes = order
        .iter()
        .map(|&idx| {
            let i = idx as usize;
            NodeRecord {
                group: tree.group[i],
                flags: tree.flags[i].bits(),
                local_bits: tree.local_bits[i],
                child_count: tree.children[i].len(),
            }
        })
        .collect();
    let bases = view_layer
        .index()
        .bases()
        .iter()
        .map(|b| BaseRecord {
            object: b.object(),
            flags: b.flags.bits(),
            local_bits: b.local_bits,
        })
        .collect();
    let active_node = view_layer.active().and_then(|n| tree.index_of(n));
    let active_base = view_layer
        .index()
        .active()
        .and_then(|a| view_layer.index().bases().iter().position(|b| b.id() == a.id()));

    ViewLayerRecord {
        name: view_layer.name().into(),
        top_level: usize::from(!tree.is_empty()),
        nodes,
        bases,
        active_node,
        active_base,
    }
}

/// Rebuilds a view layer from a record.
///
/// Bases of objects that no longer exist are dropped. An active node index
/// outside the stream falls back to the root. The result is out of sync.
///
/// # Errors
///
/// - [`ReadError::Empty`] if the record holds no nodes.
/// - [`ReadError::Truncated`] if a node declares more children than follow.
/// - [`ReadError::Trailing`] if nodes follow the declared top-level entries.
/// - [`ReadError::NoMaster`] if a record with several top-level entries has
///   to be wrapped and `hierarchy` has no master group.
/// - [`ReadError::Index`] if two bases share one object.
pub fn read(record: &ViewLayerRecord, hierarchy: &Hierarchy) -> Result<ViewLayer, ReadError> {
    if record.nodes.is_empty() || record.top_level == 0 {
        return Err(ReadError::Empty);
    }

    let mut view_layer = ViewLayer::new(record.name.clone());
    let tree = &mut view_layer.tree;
    let mut slots = Vec::with_capacity(record.nodes.len());
    let mut cursor = 0;
    let mut top = Vec::with_capacity(record.top_level.min(record.nodes.len()));
    for _ in 0..record.top_level {
        top.push(read_node(&record.nodes, &mut cursor, tree, &mut slots)?);
    }
    if cursor < record.nodes.len() {
        return Err(ReadError::Trailing(record.nodes.len() - cursor));
    }

    let current_shape = top.len() == 1
        && hierarchy
            .master()
            .is_none_or(|master| tree.group[top[0] as usize] == master);
    if current_shape {
        tree.set_root(top[0]);
    } else {
        let master = hierarchy.master().ok_or(ReadError::NoMaster)?;
        log::warn!(
            "wrapping {} legacy top-level nodes of {:?} in a master node",
            top.len(),
            record.name
        );
        let root = tree.create_node(master, LayerFlags::empty());
        tree.replace_children(root, top);
        tree.set_root(root);
    }

    view_layer.active = match record.active_node {
        Some(pos) if pos < slots.len() => Some(view_layer.tree.handle(slots[pos])),
        Some(pos) => {
            log::warn!("active node index {pos} out of range, falling back to the root");
            view_layer.tree.root()
        }
        None => None,
    };

    let mut loaded: Vec<Option<BaseId>> = Vec::with_capacity(record.bases.len());
    for b in &record.bases {
        if !hierarchy.is_object_alive(b.object) {
            log::debug!("dropping base of missing object {:?}", b.object);
            loaded.push(None);
            continue;
        }
        let id = view_layer.index.push_loaded(
            b.object,
            BaseFlags::from_bits_truncate(b.flags),
            b.local_bits,
        );
        loaded.push(Some(id));
    }
    view_layer.index.active = record
        .active_base
        .and_then(|pos| loaded.get(pos).copied().flatten());
    view_layer.index.rebuild_hash(DuplicatePolicy::Strict)?;

    Ok(view_layer)
}

/// Reads one node and its subtree; `slots` receives the created slots in
/// stream order.
fn read_node(
    nodes: &[NodeRecord],
    cursor: &mut usize,
    tree: &mut LayerTree,
    slots: &mut Vec<u32>,
) -> Result<u32, ReadError> {
    let Some(rec) = nodes.get(*cursor) else {
        return Err(ReadError::Truncated {
            expected: *cursor + 1,
            found: nodes.len(),
        });
    };
    *cursor += 1;
    let slot = tree.create_node(rec.group, LayerFlags::from_bits_truncate(rec.flags));
    tree.local_bits[slot as usize] = rec.local_bits;
    slots.push(slot);

    // Counts come from untrusted data; the remaining stream bounds them.
    let mut children = Vec::with_capacity(rec.child_count.min(nodes.len() - *cursor));
    for _ in 0..rec.child_count {
        children.push(read_node(nodes, cursor, tree, slots)?);
    }
    tree.replace_children(slot, children);
    Ok(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::SyncGate;

    fn synced() -> (Hierarchy, ViewLayer, GroupId, ObjectId) {
        let mut h = Hierarchy::new();
        let master = h.master().unwrap();
        let a = h.create_group("A");
        let x = h.create_group("X");
        h.link_child(master, a).unwrap();
        h.link_child(a, x).unwrap();
        let o = h.create_object("O");
        h.link_object(x, o).unwrap();
        let mut vl = ViewLayer::new("V");
        assert!(vl.ensure_synced(&h, &SyncGate::new()));
        (h, vl, a, o)
    }

    #[test]
    fn write_then_read_keeps_authored_state() {
        let (h, mut vl, a, o) = synced();
        let node_a = vl.tree().find_group(a).unwrap();
        vl.tree_mut().set_flags(node_a, LayerFlags::HOLDOUT);
        assert!(vl.activate(node_a));
        assert!(vl.index_mut().select_and_set_active(o));

        let record = write(&vl);
        assert_eq!(record.top_level, 1);
        assert_eq!(record.nodes.len(), 3);
        assert_eq!(record.active_node, Some(1));

        let json = serde_json::to_string(&record).unwrap();
        let back: ViewLayerRecord = serde_json::from_str(&json).unwrap();
        let mut loaded = read(&back, &h).unwrap();
        assert!(loaded.is_out_of_sync());
        let node_a = loaded.tree().find_group(a).unwrap();
        assert_eq!(loaded.tree().flags(node_a), LayerFlags::HOLDOUT);
        assert_eq!(loaded.active(), Some(node_a));
        assert_eq!(loaded.index().active().unwrap().object(), o);

        assert!(loaded.ensure_synced(&h, &SyncGate::new()));
        assert_eq!(write(&loaded), record);
    }

    #[test]
    fn legacy_siblings_are_wrapped() {
        let (h, vl, a, _) = synced();
        let mut record = write(&vl);
        // Drop the master wrapper: two top-level siblings A and a copy of A.
        let a_node = record.nodes[1];
        record.nodes = alloc::vec![
            NodeRecord {
                child_count: 0,
                ..a_node
            },
            NodeRecord {
                child_count: 0,
                ..a_node
            },
        ];
        record.top_level = 2;
        record.active_node = Some(9);

        let loaded = read(&record, &h).unwrap();
        let root = loaded.tree().root().unwrap();
        assert_eq!(Some(loaded.tree().group(root)), h.master());
        assert_eq!(loaded.tree().child_count(root), 2);
        assert!(loaded.tree().children(root).all(|c| loaded.tree().group(c) == a));
        assert_eq!(loaded.active(), Some(root));
    }

    #[test]
    fn legacy_single_top_level_group_is_wrapped() {
        let (h, vl, a, _) = synced();
        let mut record = write(&vl);
        // A alone at the top level, still holding X.
        record.nodes.remove(0);
        record.nodes[0].flags = LayerFlags::HOLDOUT.bits();
        record.active_node = Some(0);

        let mut loaded = read(&record, &h).unwrap();
        let root = loaded.tree().root().unwrap();
        assert_eq!(Some(loaded.tree().group(root)), h.master());
        let node_a = loaded.tree().find_group(a).unwrap();
        assert_eq!(loaded.active(), Some(node_a));

        assert!(loaded.ensure_synced(&h, &SyncGate::new()));
        assert_eq!(loaded.tree().find_group(a), Some(node_a));
        assert_eq!(loaded.tree().flags(node_a), LayerFlags::HOLDOUT);
        assert_eq!(loaded.tree().flags(root), LayerFlags::empty());
        assert_eq!(loaded.tree().child_count(node_a), 1);
    }

    #[test]
    fn oversized_child_count_is_truncated() {
        let (h, vl, _, _) = synced();
        let mut record = write(&vl);
        record.nodes[0].child_count = usize::MAX;
        assert!(matches!(read(&record, &h), Err(ReadError::Truncated { .. })));

        let mut record = write(&vl);
        record.top_level = usize::MAX;
        assert!(matches!(read(&record, &h), Err(ReadError::Truncated { .. })));
    }

    #[test]
    fn legacy_without_master_is_rejected() {
        let (_, vl, _, _) = synced();
        let mut record = write(&vl);
        record.top_level = 2;
        record.nodes[0].child_count = 0;
        record.nodes[1].child_count = 0;
        record.nodes.truncate(2);
        assert!(matches!(
            read(&record, &Hierarchy::unversioned()),
            Err(ReadError::NoMaster)
        ));
    }

    #[test]
    fn malformed_streams() {
        let (h, vl, _, _) = synced();
        let mut record = write(&vl);
        record.nodes.pop();
        assert!(matches!(read(&record, &h), Err(ReadError::Truncated { .. })));

        let mut record = write(&vl);
        record.nodes.push(record.nodes[2]);
        assert!(matches!(read(&record, &h), Err(ReadError::Trailing(1))));

        let mut record = write(&vl);
        record.nodes.clear();
        assert!(matches!(read(&record, &h), Err(ReadError::Empty)));
    }

    #[test]
    fn dead_objects_and_duplicates() {
        let (mut h, vl, _, o) = synced();
        let mut record = write(&vl);
        record.bases.push(record.bases[0]);
        assert!(matches!(read(&record, &h), Err(ReadError::Index(_))));

        record.bases.pop();
        record.active_base = Some(0);
        h.destroy_object(o).unwrap();
        let loaded = read(&record, &h).unwrap();
        assert!(loaded.index().is_empty());
        assert!(loaded.index().active().is_none());
    }
}
