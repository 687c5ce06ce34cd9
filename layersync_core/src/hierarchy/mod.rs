// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Source hierarchy data model.
//!
//! The hierarchy is the authoritative structure that view layers mirror:
//!
//! - **Groups** ([`GroupId`](crate::id::GroupId)) form an ordered DAG rooted
//!   at a single *master* group. A group may be linked under several parents;
//!   each path to it becomes its own node in a view layer.
//! - **Objects** ([`ObjectId`](crate::id::ObjectId)) are referenced by any
//!   number of groups. Each object reachable through an enabled path gets
//!   exactly one base per view layer.
//! - **Restrict flags** live on both groups and objects and feed the derived
//!   visibility of nodes and bases.
//!
//! # Dirty tracking
//!
//! Mutations mark channels from [`dirty`](crate::dirty). TOPOLOGY and MEMBERS
//! are local; RESTRICT propagates eagerly to descendant groups. Call
//! [`Hierarchy::take_changes`] to drain them.

mod changes;
mod store;

pub use changes::HierarchyChanges;
pub use store::Hierarchy;
