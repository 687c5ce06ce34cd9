// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Predicate-filtered iteration over bases.

use crate::base::Base;
use crate::flags::BaseFlags;
use crate::id::ObjectId;
use crate::index::BaseIndex;
use crate::visibility::Viewport;

/// Which bases a [`FilteredBases`] yields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseFilter {
    /// Selected bases.
    Selected,
    /// Bases that may be selected.
    Selectable,
    /// Bases visible in the given viewport, or in the default view without one.
    Visible(Option<Viewport>),
    /// Selected bases that are also visible.
    SelectedVisible(Option<Viewport>),
}

impl BaseFilter {
    /// Returns whether `base` passes the filter.
    #[must_use]
    pub fn matches(self, base: &Base) -> bool {
        match self {
            Self::Selected => base.flags.contains(BaseFlags::SELECTED),
            Self::Selectable => base.flags.contains(BaseFlags::SELECTABLE),
            Self::Visible(viewport) => base_is_visible(base, viewport),
            Self::SelectedVisible(viewport) => {
                base.flags.contains(BaseFlags::SELECTED) && base_is_visible(base, viewport)
            }
        }
    }
}

/// Returns whether `base` is visible, in `viewport` if given.
///
/// A base has to be enabled and maybe-visible first. A viewport with local
/// collections then decides by its own bit; otherwise the view layer's
/// default visibility applies.
#[must_use]
pub fn base_is_visible(base: &Base, viewport: Option<Viewport>) -> bool {
    if !base.flags.contains(BaseFlags::MAYBE_VISIBLE) {
        return false;
    }
    match viewport {
        Some(v) if v.local_collections => base.local_bits & v.slot_bit != 0,
        _ => base.flags.contains(BaseFlags::DEFAULT_VISIBLE),
    }
}

/// Iterator over the bases of a [`BaseIndex`] that pass a [`BaseFilter`].
///
/// Created by [`BaseIndex::filtered`].
#[derive(Clone, Debug)]
pub struct FilteredBases<'a> {
    inner: core::slice::Iter<'a, Base>,
    filter: BaseFilter,
}

impl<'a> Iterator for FilteredBases<'a> {
    type Item = &'a Base;

    fn next(&mut self) -> Option<&'a Base> {
        let filter = self.filter;
        self.inner.find(|b| filter.matches(b))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl BaseIndex {
    /// Returns the bases passing `filter`, in list order.
    #[must_use]
    pub fn filtered(&self, filter: BaseFilter) -> FilteredBases<'_> {
        FilteredBases {
            inner: self.bases().iter(),
            filter,
        }
    }

    /// Returns the objects of the bases passing `filter`.
    pub fn filtered_objects(&self, filter: BaseFilter) -> impl Iterator<Item = ObjectId> + '_ {
        self.filtered(filter).map(Base::object)
    }
}
