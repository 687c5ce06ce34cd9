// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View-layer reconciliation over a hierarchy of object groups.
//!
//! `layersync_core` keeps a derived per-view-layer tree in step with a source
//! hierarchy of groups while preserving the state users author on the derived
//! nodes (exclusion, visibility, holdout) across reparenting, reordering,
//! insertion and deletion. Alongside the tree it maintains one base record
//! per reachable object and an object-to-base hash.
//!
//! # Architecture
//!
//! ```text
//!   editor edits ──► Hierarchy (dirty channels)
//!                        │
//!                        ▼
//!   Scene::ensure_synced ──► take_changes() ──► ViewLayer::mark_dirty
//!                                                    │
//!                 ┌──────────────────────────────────┘
//!                 ▼
//!   SyncGate open? ──► reconcile() ──► LayerTree + BaseIndex
//!                                           │
//!                 ┌─────────────────────────┘
//!                 ▼
//!   local_sync() per viewport ──► Base local bits
//! ```
//!
//! **[`hierarchy`]**: Struct-of-arrays store of groups and objects with
//! generational handles. Edits mark `understory_dirty` channels; see
//! [`dirty`].
//!
//! **[`layer`]**: The derived [`LayerTree`](layer::LayerTree). Structure is
//! owned by reconciliation; callers edit authored flags and local bits.
//!
//! **[`resync`]**: The reconciliation pass, matching old nodes to groups by
//! direct child first and a widening breadth-first search second.
//!
//! **[`index`]**: [`BaseIndex`](index::BaseIndex), the base list with its
//! lazily built, build-once object hash and explicit duplicate policies.
//!
//! **[`gate`]**: [`SyncGate`](gate::SyncGate), the nestable counter that
//! defers reconciliation during bulk edits.
//!
//! **[`visibility`]**: Per-viewport local visibility and recursive setters
//! for authored node flags.
//!
//! **[`scene`]**: [`Scene`](scene::Scene), which ties a hierarchy, its view
//! layers and viewports together.
//!
//! **[`persist`]**: Flat serde records of a view layer, tolerant of the
//! legacy multi-root shape.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types, with
//! the zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod base;
pub mod config;
pub mod dirty;
pub mod error;
pub mod flags;
pub mod gate;
pub mod hierarchy;
pub mod id;
pub mod index;
pub mod iter;
pub mod layer;
pub mod persist;
pub mod resync;
pub mod scene;
pub mod trace;
pub mod view_layer;
pub mod visibility;
