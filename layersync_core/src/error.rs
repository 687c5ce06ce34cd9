// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use thiserror::Error;

use crate::id::{GroupId, ObjectId};

/// Errors from structural edits of a [`Hierarchy`](crate::hierarchy::Hierarchy).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HierarchyError {
    /// The group handle no longer refers to a live group.
    #[error("stale group handle {0:?}")]
    StaleGroup(GroupId),
    /// The object handle no longer refers to a live object.
    #[error("stale object handle {0:?}")]
    StaleObject(ObjectId),
    /// Linking would make a group its own ancestor.
    #[error("linking {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Prospective parent.
        parent: GroupId,
        /// Prospective child.
        child: GroupId,
    },
    /// The child is already linked under this parent.
    #[error("{child:?} is already a child of {parent:?}")]
    AlreadyLinked {
        /// Parent group.
        parent: GroupId,
        /// Child group.
        child: GroupId,
    },
    /// The master group cannot be linked as a child or destroyed.
    #[error("the master group cannot be used here")]
    Master,
}

/// Consistency errors of a [`BaseIndex`](crate::index::BaseIndex).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The same object is referenced by more than one base.
    #[error("object {object:?} has more than one base in the view layer")]
    DuplicateBase {
        /// The object with several bases.
        object: ObjectId,
    },
}

/// Errors from [`read`](crate::persist::read).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The record holds no layer nodes at all.
    #[error("view layer record has no layer nodes")]
    Empty,
    /// A node declares more children than the stream provides.
    #[error("layer node stream truncated: expected {expected} nodes, found {found}")]
    Truncated {
        /// Nodes needed by the declared child counts.
        expected: usize,
        /// Nodes present in the stream.
        found: usize,
    },
    /// Trailing nodes follow the declared top-level entries.
    #[error("{0} trailing layer nodes after the top-level entries")]
    Trailing(usize),
    /// A legacy record with several top-level nodes needs a master group to
    /// wrap them, and the hierarchy has none.
    #[error("legacy view layer record needs a master group to wrap its top-level nodes")]
    NoMaster,
    /// The base list maps one object twice.
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Errors from [`Scene::remap_object`](crate::scene::Scene::remap_object).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RemapError {
    /// The hierarchy rejected the remap.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
    /// A view layer ended up with a duplicate base in strict mode.
    #[error(transparent)]
    Index(#[from] IndexError),
}
