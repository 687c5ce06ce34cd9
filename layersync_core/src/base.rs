// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-object records of a view layer.

use crate::flags::{BaseFlags, COLLECTION_DERIVED, RestrictFlags};
use crate::id::{BaseId, ObjectId};

/// The view-layer state of one object.
///
/// A view layer holds at most one base per object. Bases are created the
/// first time reconciliation reaches an object through a non-excluded group,
/// reused on every later pass for as long as the object stays reachable, and
/// dropped once it is not.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Base {
    pub(crate) id: BaseId,
    pub(crate) object: ObjectId,
    /// Effective flags, see [`eval_flags`](Self::eval_flags).
    pub flags: BaseFlags,
    /// Bits contributed by the groups that reference the object.
    ///
    /// Rebuilt from scratch by every reconciliation.
    pub flag_from_collection: BaseFlags,
    /// Per-viewport local visibility bits.
    pub local_bits: u16,
}

impl Base {
    pub(crate) fn new(id: BaseId, object: ObjectId, local_bits: u16) -> Self {
        Self {
            id,
            object,
            flags: BaseFlags::empty(),
            flag_from_collection: BaseFlags::empty(),
            local_bits,
        }
    }

    /// Returns the identity of this record.
    #[must_use]
    pub fn id(&self) -> BaseId {
        self.id
    }

    /// Returns the object this base wraps.
    #[must_use]
    pub fn object(&self) -> ObjectId {
        self.object
    }

    /// Returns whether the base is selected.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.flags.contains(BaseFlags::SELECTED)
    }

    /// Clears every collection-derived bit, ahead of a reconciliation pass.
    pub(crate) fn reset_collection_bits(&mut self) {
        self.flags.remove(COLLECTION_DERIVED);
        self.flag_from_collection.remove(COLLECTION_DERIVED);
    }

    /// Recomputes [`flags`](Self::flags) from the collection bits and the
    /// object's own restrictions.
    ///
    /// Viewport-disabled or user-hidden bases lose their visibility and
    /// selectability; unselectable bases are deselected.
    pub fn eval_flags(&mut self, object_restrict: RestrictFlags) {
        self.flags.remove(COLLECTION_DERIVED);
        self.flags |= self.flag_from_collection & COLLECTION_DERIVED;

        if object_restrict.contains(RestrictFlags::HIDE_VIEWPORT) {
            self.flags.remove(BaseFlags::ENABLED_VIEWPORT);
        }
        if object_restrict.contains(RestrictFlags::HIDE_RENDER) {
            self.flags.remove(BaseFlags::ENABLED_RENDER);
        }
        if object_restrict.contains(RestrictFlags::HIDE_SELECT) {
            self.flags.remove(BaseFlags::SELECTABLE);
        }

        if !self.flags.contains(BaseFlags::ENABLED_VIEWPORT)
            || self.flags.contains(BaseFlags::HIDDEN)
        {
            self.flags.remove(
                BaseFlags::MAYBE_VISIBLE | BaseFlags::DEFAULT_VISIBLE | BaseFlags::SELECTABLE,
            );
        }

        if !self.flags.contains(BaseFlags::SELECTABLE) {
            self.flags.remove(BaseFlags::SELECTED);
        }
    }
}
