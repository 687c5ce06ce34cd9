// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer tree data model.
//!
//! A *layer node* is the per-view-layer mirror of one source group. Each node
//! has:
//!
//! - An identity ([`NodeId`](crate::id::NodeId)), a generational handle that
//!   becomes stale when reconciliation frees the node.
//! - Topology: a parent slot and an ordered list of child slots. After a
//!   successful reconciliation the shape matches the source hierarchy.
//! - **Authored state** set by the caller: [`LayerFlags`](crate::flags::LayerFlags)
//!   (exclude, hide, holdout, indirect-only) and per-viewport local bits.
//!   Reconciliation reuses nodes so this state survives structural edits.
//! - **Derived state** written by reconciliation:
//!   [`RuntimeFlags`](crate::flags::RuntimeFlags).
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles.

mod traverse;
mod tree;

pub use traverse::Children;
pub use tree::LayerTree;
