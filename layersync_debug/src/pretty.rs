// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use layersync_core::resync::ResyncStats;
use layersync_core::trace::{
    BaseRemovedEvent, GateClosedEvent, LocalSyncEvent, MatchKind, NodeFreedEvent, NodeMatchEvent,
    ResyncBeginEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    /// Skip [`MatchKind::Unchanged`] matches, which dominate steady-state passes.
    changes_only: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("changes_only", &self.changes_only)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            changes_only: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            changes_only: false,
        }
    }

    /// Only print matches that relocated or created a node.
    #[must_use]
    pub fn changes_only(mut self, yes: bool) -> Self {
        self.changes_only = yes;
        self
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn kind_name(kind: MatchKind) -> &'static str {
    match kind {
        MatchKind::Unchanged => "unchanged",
        MatchKind::Relocated => "relocated",
        MatchKind::Created => "created",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_resync_begin(&mut self, e: &ResyncBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[resync:begin] nodes={} bases={}",
            e.old_nodes, e.old_bases,
        );
    }

    fn on_node_match(&mut self, e: &NodeMatchEvent) {
        if self.changes_only && e.kind == MatchKind::Unchanged {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[match:{}] group={:?} node={:?} parent={:?}",
            kind_name(e.kind),
            e.group,
            e.node,
            e.parent,
        );
    }

    fn on_node_freed(&mut self, e: &NodeFreedEvent) {
        let _ = writeln!(self.writer, "[freed] node={:?} group={:?}", e.node, e.group);
    }

    fn on_base_removed(&mut self, e: &BaseRemovedEvent) {
        let _ = writeln!(
            self.writer,
            "[base:removed] base={:?} object={:?}",
            e.base, e.object,
        );
    }

    fn on_resync_summary(&mut self, s: &ResyncStats) {
        let _ = writeln!(
            self.writer,
            "[summary] reused={} relocated={} created={} freed={} bases(+{} -{}) skipped={}",
            s.reused,
            s.relocated,
            s.created,
            s.freed,
            s.bases_created,
            s.bases_removed,
            s.skipped_children,
        );
    }

    fn on_gate_closed(&mut self, e: &GateClosedEvent) {
        let _ = writeln!(self.writer, "[gate:closed] depth={}", e.depth);
    }

    fn on_local_sync(&mut self, e: &LocalSyncEvent) {
        let _ = writeln!(
            self.writer,
            "[local] slot={:#06x} visible={}",
            e.slot_bit, e.visible_bases,
        );
    }
}
