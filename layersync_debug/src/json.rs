// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of recorded events.
//!
//! [`export`] writes the events of a [`RecorderSink`](crate::recorder::RecorderSink)
//! as one JSON array, one object per event with a `"type"` tag. Handles are
//! written as `[index, generation]` pairs.

use std::io::{self, Write};

use serde_json::{Value, json};

use layersync_core::id::{GroupId, NodeId, ObjectId};
use layersync_core::trace::MatchKind;

use crate::recorder::RecordedEvent;

/// Converts recorded events to a JSON array.
#[must_use]
pub fn to_value(events: &[RecordedEvent]) -> Value {
    Value::Array(events.iter().map(event_value).collect())
}

/// Writes recorded events as pretty-printed JSON.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    serde_json::to_writer_pretty(writer, &to_value(events))?;
    Ok(())
}

fn event_value(event: &RecordedEvent) -> Value {
    match event {
        RecordedEvent::ResyncBegin(e) => json!({
            "type": "ResyncBegin",
            "old_nodes": e.old_nodes,
            "old_bases": e.old_bases,
        }),
        RecordedEvent::NodeMatch(e) => json!({
            "type": "NodeMatch",
            "kind": kind_name(e.kind),
            "group": group(e.group),
            "node": node(e.node),
            "parent": node(e.parent),
        }),
        RecordedEvent::NodeFreed(e) => json!({
            "type": "NodeFreed",
            "node": node(e.node),
            "group": group(e.group),
        }),
        RecordedEvent::BaseRemoved(e) => json!({
            "type": "BaseRemoved",
            "base": e.base.serial(),
            "object": object(e.object),
        }),
        RecordedEvent::ResyncSummary(s) => json!({
            "type": "ResyncSummary",
            "reused": s.reused,
            "relocated": s.relocated,
            "created": s.created,
            "freed": s.freed,
            "bases_created": s.bases_created,
            "bases_removed": s.bases_removed,
            "skipped_children": s.skipped_children,
        }),
        RecordedEvent::GateClosed(e) => json!({
            "type": "GateClosed",
            "depth": e.depth,
        }),
        RecordedEvent::LocalSync(e) => json!({
            "type": "LocalSync",
            "slot_bit": e.slot_bit,
            "visible_bases": e.visible_bases,
        }),
    }
}

fn kind_name(kind: MatchKind) -> &'static str {
    match kind {
        MatchKind::Unchanged => "Unchanged",
        MatchKind::Relocated => "Relocated",
        MatchKind::Created => "Created",
    }
}

fn node(id: NodeId) -> Value {
    json!([id.index(), id.generation()])
}

fn group(id: GroupId) -> Value {
    json!([id.index(), id.generation()])
}

fn object(id: ObjectId) -> Value {
    json!([id.index(), id.generation()])
}
