// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-viewport local visibility and recursive flag setters.
//!
//! Every viewport that filters collections locally owns one bit of the
//! 16-bit local mask (see [`local_slot_bit`](crate::flags::local_slot_bit)).
//! Layer nodes carry the mask the user authored; [`local_sync`] propagates it
//! onto bases. The setters here only touch authored state and mark the view
//! layer dirty, the next reconciliation derives everything else.

use alloc::vec::Vec;

use crate::flags::{BaseFlags, LayerFlags, RuntimeFlags};
use crate::hierarchy::Hierarchy;
use crate::id::NodeId;
use crate::trace::{LocalSyncEvent, Tracer};
use crate::view_layer::ViewLayer;

/// A viewport as far as base visibility is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    /// The viewport's local-collection slot bit.
    pub slot_bit: u16,
    /// Whether the viewport filters by its local bit instead of the view
    /// layer's own visibility.
    pub local_collections: bool,
}

impl Viewport {
    /// Creates a viewport using the view layer's visibility.
    #[must_use]
    pub const fn new(slot_bit: u16) -> Self {
        Self {
            slot_bit,
            local_collections: false,
        }
    }

    /// Creates a viewport filtering by its local bit.
    #[must_use]
    pub const fn local(slot_bit: u16) -> Self {
        Self {
            slot_bit,
            local_collections: true,
        }
    }
}

/// Propagates `slot_bit` from layer nodes onto bases.
///
/// Returns the number of bases that have the bit afterwards.
pub fn local_sync(view_layer: &mut ViewLayer, hierarchy: &Hierarchy, slot_bit: u16) -> usize {
    local_sync_with(view_layer, hierarchy, slot_bit, &mut Tracer::none())
}

/// Like [`local_sync`], reporting to `tracer`.
pub fn local_sync_with(
    view_layer: &mut ViewLayer,
    hierarchy: &Hierarchy,
    slot_bit: u16,
    tracer: &mut Tracer<'_>,
) -> usize {
    for base in view_layer.index.bases_mut() {
        base.local_bits &= !slot_bit;
    }

    let tree = &view_layer.tree;
    if let Some(root) = tree.root() {
        let mut stack: Vec<(u32, bool)> = alloc::vec![(root.idx, true)];
        while let Some((idx, parent_visible)) = stack.pop() {
            let i = idx as usize;
            let visible = parent_visible && tree.local_bits[i] & slot_bit != 0;
            let group = tree.group[i];
            if visible && hierarchy.is_alive(group) {
                for &object in hierarchy.objects(group) {
                    if let Some(base) = view_layer.index.find_mut(object) {
                        base.local_bits |= slot_bit;
                    }
                }
            }
            for &child in tree.children[i].iter().rev() {
                if !tree.flags[child as usize].contains(LayerFlags::EXCLUDE) {
                    stack.push((child, visible));
                }
            }
        }
    }

    let visible_bases = view_layer
        .index
        .bases()
        .iter()
        .filter(|b| b.local_bits & slot_bit != 0)
        .count();
    log::debug!(
        "local sync of {:?} slot {slot_bit:#06x}: {visible_bases} visible bases",
        view_layer.name
    );
    tracer.local_sync(&LocalSyncEvent {
        slot_bit,
        visible_bases,
    });
    visible_bases
}

/// Shows or hides `node`.
///
/// With `recursive`, the whole subtree is updated and the bases of its
/// objects are shown or hidden too.
///
/// # Panics
///
/// Panics if the handle is stale.
pub fn set_visible(
    view_layer: &mut ViewLayer,
    hierarchy: &Hierarchy,
    node: NodeId,
    visible: bool,
    recursive: bool,
) {
    view_layer.tree.validate(node);
    let slots = if recursive {
        view_layer.tree.subtree(node.idx)
    } else {
        alloc::vec![node.idx]
    };
    for &idx in &slots {
        view_layer.tree.flags[idx as usize].set(LayerFlags::HIDE, !visible);
        if !recursive {
            continue;
        }
        let group = view_layer.tree.group[idx as usize];
        if !hierarchy.is_alive(group) {
            continue;
        }
        for &object in hierarchy.objects(group) {
            if let Some(base) = view_layer.index.find_mut(object) {
                base.flags.set(BaseFlags::HIDDEN, !visible);
            }
        }
    }
    view_layer.mark_dirty();
}

/// Hides every top-level node except the path down to `node`, which is
/// shown along with its subtree.
///
/// With `extend`, other nodes keep their state; a node that is already
/// visible is hidden instead.
///
/// # Panics
///
/// Panics if the handle is stale.
pub fn isolate(view_layer: &mut ViewLayer, node: NodeId, extend: bool) {
    let tree = &mut view_layer.tree;
    tree.validate(node);
    let hide_it = extend
        && tree.runtime[node.idx as usize].contains(RuntimeFlags::VISIBLE_VIEW_LAYER);

    if !extend {
        for top in tree.children[tree.root as usize].clone() {
            for idx in tree.subtree(top) {
                tree.flags[idx as usize].insert(LayerFlags::HIDE);
            }
        }
    }

    if hide_it {
        tree.flags[node.idx as usize].insert(LayerFlags::HIDE);
    } else {
        for idx in tree.path_to(node.idx) {
            tree.flags[idx as usize].remove(LayerFlags::HIDE);
        }
        for idx in tree.subtree(node.idx) {
            tree.flags[idx as usize].remove(LayerFlags::HIDE);
        }
    }
    view_layer.mark_dirty();
}

/// Local-collection counterpart of [`isolate`] for one viewport.
///
/// Edits the nodes' local bits for `viewport` and re-propagates them onto
/// bases.
///
/// # Panics
///
/// Panics if the handle is stale.
pub fn isolate_local(
    view_layer: &mut ViewLayer,
    hierarchy: &Hierarchy,
    viewport: Viewport,
    node: NodeId,
    extend: bool,
) {
    let bit = viewport.slot_bit;
    let tree = &mut view_layer.tree;
    tree.validate(node);
    let hide_it = extend && tree.local_bits[node.idx as usize] & bit != 0;

    if !extend {
        for top in tree.children[tree.root as usize].clone() {
            for idx in tree.subtree(top) {
                tree.local_bits[idx as usize] &= !bit;
            }
        }
    }

    if hide_it {
        tree.local_bits[node.idx as usize] &= !bit;
    } else {
        for idx in tree.path_to(node.idx) {
            tree.local_bits[idx as usize] |= bit;
        }
        for idx in tree.subtree(node.idx) {
            tree.local_bits[idx as usize] |= bit;
        }
    }
    local_sync(view_layer, hierarchy, bit);
}

/// Sets or clears `flag` on `node` and its whole subtree.
///
/// [`LayerFlags::EXCLUDE`] is special: excluding remembers each
/// descendant's previous exclude state in
/// [`LayerFlags::PREVIOUSLY_EXCLUDED`], and re-enabling restores it, so
/// nodes that were excluded on their own stay excluded.
///
/// # Panics
///
/// Panics if the handle is stale.
pub fn set_layer_flag(view_layer: &mut ViewLayer, node: NodeId, flag: LayerFlags, value: bool) {
    let tree = &mut view_layer.tree;
    tree.validate(node);
    let slots = tree.subtree(node.idx);

    if flag.contains(LayerFlags::EXCLUDE) {
        let (own, descendants) = slots.split_at(1);
        tree.flags[own[0] as usize].set(LayerFlags::EXCLUDE, value);
        tree.flags[own[0] as usize].remove(LayerFlags::PREVIOUSLY_EXCLUDED);
        for &idx in descendants {
            let flags = &mut tree.flags[idx as usize];
            if value {
                let was = flags.contains(LayerFlags::EXCLUDE);
                flags.set(LayerFlags::PREVIOUSLY_EXCLUDED, was);
                flags.insert(LayerFlags::EXCLUDE);
            } else {
                let was = flags.contains(LayerFlags::PREVIOUSLY_EXCLUDED);
                flags.set(LayerFlags::EXCLUDE, was);
                flags.remove(LayerFlags::PREVIOUSLY_EXCLUDED);
            }
        }
    }

    let rest = flag - LayerFlags::EXCLUDE - LayerFlags::PREVIOUSLY_EXCLUDED;
    if !rest.is_empty() {
        for &idx in &slots {
            tree.flags[idx as usize].set(rest, value);
        }
    }
    view_layer.mark_dirty();
}
