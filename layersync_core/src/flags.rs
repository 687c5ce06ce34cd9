// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flag sets carried by groups, objects, layer nodes, and bases.
//!
//! Flags come in three flavours:
//!
//! - **Restrict** flags ([`RestrictFlags`]) are owned by the source hierarchy,
//!   on groups and on objects. They are inherited down the group hierarchy.
//! - **Authored** flags ([`LayerFlags`]) are owned by a view layer's nodes and
//!   must survive structural edits of the hierarchy.
//! - **Derived** flags ([`RuntimeFlags`], and the collection part of
//!   [`BaseFlags`]) are recomputed from scratch on every reconciliation.

use bitflags::bitflags;

bitflags! {
    /// Restrictions set on a source group or object.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RestrictFlags: u8 {
        /// Hidden in every viewport.
        const HIDE_VIEWPORT = 1 << 0;
        /// Excluded from renders.
        const HIDE_RENDER = 1 << 1;
        /// Cannot be selected.
        const HIDE_SELECT = 1 << 2;
    }
}

bitflags! {
    /// User-authored per-node state of a view layer.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LayerFlags: u16 {
        /// The node and its subtree do not contribute objects to the view layer.
        ///
        /// Never inherited: a descendant's exclusion is evaluated locally.
        const EXCLUDE = 1 << 0;
        /// Hidden in the view layer (but still enabled).
        const HIDE = 1 << 1;
        /// Objects render as holdout.
        const HOLDOUT = 1 << 2;
        /// Objects only contribute indirectly.
        const INDIRECT_ONLY = 1 << 3;
        /// Exclude state remembered while an ancestor excluded the subtree.
        const PREVIOUSLY_EXCLUDED = 1 << 4;
    }
}

bitflags! {
    /// Per-node state derived during reconciliation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RuntimeFlags: u8 {
        /// Visible in the view layer: not viewport-restricted and not hidden.
        const VISIBLE_VIEW_LAYER = 1 << 0;
        /// The group or one of its ancestors is hidden in viewports.
        const HIDE_VIEWPORT = 1 << 1;
        /// The group directly references at least one object.
        const HAS_OBJECTS = 1 << 2;
        /// The group carries exporters.
        const HAS_EXPORTERS = 1 << 3;
    }
}

bitflags! {
    /// Per-object state of a view layer.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BaseFlags: u16 {
        /// Selected.
        const SELECTED = 1 << 0;
        /// Selectable.
        const SELECTABLE = 1 << 1;
        /// Enabled in viewports.
        const ENABLED_VIEWPORT = 1 << 2;
        /// Enabled in renders.
        const ENABLED_RENDER = 1 << 3;
        /// Rendered as holdout.
        const HOLDOUT = 1 << 4;
        /// Contributes indirectly only.
        const INDIRECT_ONLY = 1 << 5;
        /// Hidden by the user in this view layer.
        const HIDDEN = 1 << 6;
        /// Enabled and possibly visible in some viewport.
        const MAYBE_VISIBLE = 1 << 7;
        /// Enabled and visible in a viewport without local overrides.
        const DEFAULT_VISIBLE = 1 << 8;
    }
}

/// Base flags whose value is derived purely from the containing groups.
///
/// These bits are cleared at the start of every reconciliation and rebuilt
/// from [`Base::flag_from_collection`](crate::base::Base::flag_from_collection).
pub const COLLECTION_DERIVED: BaseFlags = BaseFlags::MAYBE_VISIBLE
    .union(BaseFlags::DEFAULT_VISIBLE)
    .union(BaseFlags::SELECTABLE)
    .union(BaseFlags::ENABLED_VIEWPORT)
    .union(BaseFlags::ENABLED_RENDER)
    .union(BaseFlags::HOLDOUT)
    .union(BaseFlags::INDIRECT_ONLY);

/// Local visibility mask with every viewport slot set.
pub const LOCAL_BITS_ALL: u16 = u16::MAX;

/// Returns the local visibility bit of a viewport slot.
///
/// # Panics
///
/// Panics if `slot` is not below 16.
#[must_use]
pub const fn local_slot_bit(slot: u8) -> u16 {
    assert!(slot < 16, "local visibility slot out of range");
    1 << slot
}
