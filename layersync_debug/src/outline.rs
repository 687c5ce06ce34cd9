// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indented text dumps of a view layer's tree.
//!
//! One line per node, two spaces of indent per level, the group name followed
//! by authored flags in brackets and derived flags in braces:
//!
//! ```text
//! view layer "View Layer"
//! Master {visible_view_layer}
//!   A [holdout] {visible_view_layer|has_objects} *
//!     X [exclude]
//! ```
//!
//! The active node is marked with `*`. Nodes whose group no longer exists
//! (possible while the layer is out of sync) print as `<deleted>`.

use std::fmt::Write as _;
use std::io::{self, Write};

use layersync_core::hierarchy::Hierarchy;
use layersync_core::id::NodeId;
use layersync_core::view_layer::ViewLayer;

/// Writes the outline of `view_layer` to `writer`.
pub fn write_outline(
    view_layer: &ViewLayer,
    hierarchy: &Hierarchy,
    writer: &mut dyn Write,
) -> io::Result<()> {
    writer.write_all(outline(view_layer, hierarchy).as_bytes())
}

/// Returns the outline of `view_layer` as a string.
#[must_use]
pub fn outline(view_layer: &ViewLayer, hierarchy: &Hierarchy) -> String {
    let mut out = String::new();
    let _ = write!(out, "view layer {:?}", view_layer.name());
    if view_layer.is_out_of_sync() {
        out.push_str(" (out of sync)");
    }
    out.push('\n');
    match view_layer.tree().root() {
        Some(root) => node_lines(view_layer, hierarchy, root, 0, &mut out),
        None => out.push_str("(empty)\n"),
    }
    out
}

fn node_lines(
    view_layer: &ViewLayer,
    hierarchy: &Hierarchy,
    node: NodeId,
    depth: usize,
    out: &mut String,
) {
    let tree = view_layer.tree();
    let group = tree.group(node);
    for _ in 0..depth {
        out.push_str("  ");
    }
    if hierarchy.is_alive(group) {
        out.push_str(hierarchy.group_name(group));
    } else {
        out.push_str("<deleted>");
    }

    let authored = names(tree.flags(node).iter_names().map(|(n, _)| n));
    if !authored.is_empty() {
        let _ = write!(out, " [{authored}]");
    }
    let runtime = names(tree.runtime(node).iter_names().map(|(n, _)| n));
    if !runtime.is_empty() {
        let _ = write!(out, " {{{runtime}}}");
    }
    if view_layer.active() == Some(node) {
        out.push_str(" *");
    }
    out.push('\n');

    for child in tree.children(node) {
        node_lines(view_layer, hierarchy, child, depth + 1, out);
    }
}

fn names<'a>(iter: impl Iterator<Item = &'a str>) -> String {
    iter.map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("|")
}
