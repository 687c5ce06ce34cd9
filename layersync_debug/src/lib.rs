// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and JSON export for layersync diagnostics.
//!
//! This crate provides [`TraceSink`](layersync_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: in-memory recording of every event.
//! - [`json::export`]: writes recorded events as a JSON array.
//!
//! [`outline`] dumps a view layer's tree next to the group names of its
//! hierarchy, which is usually the quickest way to see what a pass did.

pub mod json;
pub mod outline;
pub mod pretty;
pub mod recorder;
