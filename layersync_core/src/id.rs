// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group, object, node, and base identity types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel value indicating "no slot" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a group in a [`Hierarchy`](crate::hierarchy::Hierarchy).
///
/// Contains both a slot index and a generation counter so that stale handles
/// can be detected after a group is destroyed and the slot is reused. A
/// [`LayerTree`](crate::layer::LayerTree) node whose group handle went stale is
/// no longer *usable* during reconciliation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl GroupId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({}@gen{})", self.idx, self.generation)
    }
}

/// A handle to an object in a [`Hierarchy`](crate::hierarchy::Hierarchy).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl ObjectId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({}@gen{})", self.idx, self.generation)
    }
}

/// A handle to a node in a [`LayerTree`](crate::layer::LayerTree).
///
/// Reconciliation keeps a node's handle stable when it reuses the node, so
/// comparing handles before and after a resync tells whether authored state
/// was carried over or recreated.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@gen{})", self.idx, self.generation)
    }
}

/// Identity of a [`Base`](crate::base::Base) record.
///
/// Bases move between positions of the base list during reconciliation; the
/// serial number stays with the record for as long as it is reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BaseId(pub(crate) u32);

impl BaseId {
    /// Returns the serial number.
    #[inline]
    #[must_use]
    pub const fn serial(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for BaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BaseId({})", self.0)
    }
}
