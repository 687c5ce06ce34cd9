// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants for the source hierarchy.
//!
//! [`Hierarchy`](crate::hierarchy::Hierarchy) uses multi-channel dirty
//! tracking (via [`understory_dirty`]) to record which groups and objects
//! changed since the last [`take_changes`](crate::hierarchy::Hierarchy::take_changes).
//!
//! # Propagation semantics
//!
//! - **Propagating**: [`RESTRICT`] uses
//!   [`EagerPolicy`](understory_dirty::EagerPolicy) and has dependency edges
//!   from child group to parent group. Restrict flags are inherited, so
//!   changing a group's restrictions marks every descendant group.
//!
//! - **Local-only**: [`TOPOLOGY`] and [`MEMBERS`] are marked on the group
//!   whose child list or object list changed.
//!
//! - **Objects**: [`OBJECT_RESTRICT`] lives in a separate tracker keyed by
//!   object slot, since object restrictions only require a flag recompute
//!   of the corresponding bases rather than a full reconciliation.

use understory_dirty::Channel;

/// Child-group list changed (link, unlink, reorder, create, destroy).
pub const TOPOLOGY: Channel = Channel::new(0);

/// Member-object list changed.
pub const MEMBERS: Channel = Channel::new(1);

/// Group restrict flags or exporter state changed; propagates to descendants.
pub const RESTRICT: Channel = Channel::new(2);

/// Object restrict flags changed.
pub const OBJECT_RESTRICT: Channel = Channel::new(3);
