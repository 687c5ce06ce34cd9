// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for reconciliation.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! resync engine calls as it matches, creates, and frees nodes. All method
//! bodies default to no-ops, so implementing only the events you care about
//! is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Per-decision logging through the `log` facade happens regardless of this
//! feature; the sink is for structured consumers such as recorders.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::id::{BaseId, GroupId, NodeId, ObjectId};
use crate::resync::ResyncStats;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// How a source group found its layer node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// The node was already a direct child of the same parent.
    Unchanged,
    /// An unused node elsewhere in the old tree was moved here.
    Relocated,
    /// No reusable node existed; a new one was created.
    Created,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a reconciliation pass starts.
#[derive(Clone, Copy, Debug)]
pub struct ResyncBeginEvent {
    /// Nodes in the old tree.
    pub old_nodes: usize,
    /// Bases in the old list.
    pub old_bases: usize,
}

/// Emitted for every child group placed during the rebuild phase.
#[derive(Clone, Copy, Debug)]
pub struct NodeMatchEvent {
    /// The source group.
    pub group: GroupId,
    /// The node now mirroring it.
    pub node: NodeId,
    /// Its new parent node.
    pub parent: NodeId,
    /// How the node was obtained.
    pub kind: MatchKind,
}

/// Emitted when an unused node is freed during cleanup.
#[derive(Clone, Copy, Debug)]
pub struct NodeFreedEvent {
    /// The (now stale) node handle.
    pub node: NodeId,
    /// The group it used to mirror; may itself be stale.
    pub group: GroupId,
}

/// Emitted when a base is dropped because its object became unreachable.
#[derive(Clone, Copy, Debug)]
pub struct BaseRemovedEvent {
    /// The removed base.
    pub base: BaseId,
    /// Its object.
    pub object: ObjectId,
}

/// Emitted when a resync request is refused because the gate is closed.
#[derive(Clone, Copy, Debug)]
pub struct GateClosedEvent {
    /// Gate depth at the time of the request.
    pub depth: i32,
}

/// Emitted after a local-visibility pass.
#[derive(Clone, Copy, Debug)]
pub struct LocalSyncEvent {
    /// The viewport slot bit that was propagated.
    pub slot_bit: u16,
    /// Bases that ended up with the bit set.
    pub visible_bases: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from reconciliation.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a reconciliation pass starts.
    fn on_resync_begin(&mut self, e: &ResyncBeginEvent) {
        _ = e;
    }

    /// Called when a child group is matched to a node.
    fn on_node_match(&mut self, e: &NodeMatchEvent) {
        _ = e;
    }

    /// Called when an unused node is freed.
    fn on_node_freed(&mut self, e: &NodeFreedEvent) {
        _ = e;
    }

    /// Called when a base is removed.
    fn on_base_removed(&mut self, e: &BaseRemovedEvent) {
        _ = e;
    }

    /// Called with the statistics of a completed pass.
    fn on_resync_summary(&mut self, s: &ResyncStats) {
        _ = s;
    }

    /// Called when a resync request hits a closed gate.
    fn on_gate_closed(&mut self, e: &GateClosedEvent) {
        _ = e;
    }

    /// Called after a local-visibility pass.
    fn on_local_sync(&mut self, e: &LocalSyncEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident, $arg:ident) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            s.$method($arg);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = $arg;
        }
    }};
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`ResyncBeginEvent`].
    #[inline]
    pub fn resync_begin(&mut self, e: &ResyncBeginEvent) {
        dispatch!(self, on_resync_begin, e);
    }

    /// Emits a [`NodeMatchEvent`].
    #[inline]
    pub fn node_match(&mut self, e: &NodeMatchEvent) {
        dispatch!(self, on_node_match, e);
    }

    /// Emits a [`NodeFreedEvent`].
    #[inline]
    pub fn node_freed(&mut self, e: &NodeFreedEvent) {
        dispatch!(self, on_node_freed, e);
    }

    /// Emits a [`BaseRemovedEvent`].
    #[inline]
    pub fn base_removed(&mut self, e: &BaseRemovedEvent) {
        dispatch!(self, on_base_removed, e);
    }

    /// Emits a pass summary.
    #[inline]
    pub fn resync_summary(&mut self, s: &ResyncStats) {
        dispatch!(self, on_resync_summary, s);
    }

    /// Emits a [`GateClosedEvent`].
    #[inline]
    pub fn gate_closed(&mut self, e: &GateClosedEvent) {
        dispatch!(self, on_gate_closed, e);
    }

    /// Emits a [`LocalSyncEvent`].
    #[inline]
    pub fn local_sync(&mut self, e: &LocalSyncEvent) {
        dispatch!(self, on_local_sync, e);
    }
}
