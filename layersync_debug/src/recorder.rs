// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event it receives
//! in arrival order. Pass events are small `Copy` structs, so the recording is
//! a plain `Vec` that can be inspected directly or handed to
//! [`json::export`](crate::json::export).

use layersync_core::resync::ResyncStats;
use layersync_core::trace::{
    BaseRemovedEvent, GateClosedEvent, LocalSyncEvent, MatchKind, NodeFreedEvent, NodeMatchEvent,
    ResyncBeginEvent, TraceSink,
};

/// A recorded trace event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A pass started.
    ResyncBegin(ResyncBeginEvent),
    /// A group was matched to a node.
    NodeMatch(NodeMatchEvent),
    /// An unused node was freed.
    NodeFreed(NodeFreedEvent),
    /// A base was removed.
    BaseRemoved(BaseRemovedEvent),
    /// A pass finished.
    ResyncSummary(ResyncStats),
    /// A request hit a closed gate.
    GateClosed(GateClosedEvent),
    /// A local-visibility pass finished.
    LocalSync(LocalSyncEvent),
}

/// Records trace events in memory.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns its events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discards all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Returns the summaries of all completed passes, oldest first.
    pub fn summaries(&self) -> impl Iterator<Item = &ResyncStats> + '_ {
        self.events.iter().filter_map(|e| match e {
            RecordedEvent::ResyncSummary(s) => Some(s),
            _ => None,
        })
    }

    /// Returns the number of matches of the given kind.
    #[must_use]
    pub fn match_count(&self, kind: MatchKind) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::NodeMatch(m) if m.kind == kind))
            .count()
    }
}

impl TraceSink for RecorderSink {
    fn on_resync_begin(&mut self, e: &ResyncBeginEvent) {
        self.events.push(RecordedEvent::ResyncBegin(*e));
    }

    fn on_node_match(&mut self, e: &NodeMatchEvent) {
        self.events.push(RecordedEvent::NodeMatch(*e));
    }

    fn on_node_freed(&mut self, e: &NodeFreedEvent) {
        self.events.push(RecordedEvent::NodeFreed(*e));
    }

    fn on_base_removed(&mut self, e: &BaseRemovedEvent) {
        self.events.push(RecordedEvent::BaseRemoved(*e));
    }

    fn on_resync_summary(&mut self, s: &ResyncStats) {
        self.events.push(RecordedEvent::ResyncSummary(*s));
    }

    fn on_gate_closed(&mut self, e: &GateClosedEvent) {
        self.events.push(RecordedEvent::GateClosed(*e));
    }

    fn on_local_sync(&mut self, e: &LocalSyncEvent) {
        self.events.push(RecordedEvent::LocalSync(*e));
    }
}
