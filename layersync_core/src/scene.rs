// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A hierarchy plus the view layers derived from it.
//!
//! [`Scene`] is the entry point editors talk to: they edit the hierarchy
//! through [`Scene::hierarchy_mut`] and call [`Scene::ensure_synced`] before
//! reading view-layer state. Bulk edits go through [`Scene::batch`], which
//! keeps the gate closed so that all of them are caught up by one pass per
//! view layer.

use alloc::string::String;
use alloc::vec::Vec;

use crate::config::SyncConfig;
use crate::error::RemapError;
use crate::flags::LayerFlags;
use crate::gate::SyncGate;
use crate::hierarchy::{Hierarchy, HierarchyChanges};
use crate::id::ObjectId;
use crate::index::DuplicatePolicy;
use crate::trace::Tracer;
use crate::view_layer::ViewLayer;
use crate::visibility::{Viewport, local_sync_with, set_layer_flag};

/// How [`Scene::add_view_layer`] initializes a new view layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NewLayerMode {
    /// A fresh tree with default flags.
    New,
    /// A copy of the view layer at the given position.
    Copy(usize),
    /// A fresh tree with every node below the root excluded.
    Empty,
}

/// A source hierarchy and its view layers.
#[derive(Debug)]
pub struct Scene {
    hierarchy: Hierarchy,
    view_layers: Vec<ViewLayer>,
    viewports: Vec<Viewport>,
    gate: &'static SyncGate,
    config: SyncConfig,
    changes: HierarchyChanges,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates a scene with a fresh hierarchy, one view layer, and the
    /// process-wide gate.
    #[must_use]
    pub fn new() -> Self {
        Self::with_gate(Hierarchy::new(), SyncGate::global())
    }

    /// Creates a scene around `hierarchy` gated by `gate`, with one view
    /// layer.
    #[must_use]
    pub fn with_gate(hierarchy: Hierarchy, gate: &'static SyncGate) -> Self {
        let mut scene = Self {
            hierarchy,
            view_layers: Vec::new(),
            viewports: Vec::new(),
            gate,
            config: SyncConfig::default(),
            changes: HierarchyChanges::default(),
        };
        scene.add_view_layer("View Layer", NewLayerMode::New);
        scene
    }

    /// Returns the hierarchy.
    #[must_use]
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Returns the hierarchy for edits.
    ///
    /// Edits are picked up by the next [`ensure_synced`](Self::ensure_synced).
    pub fn hierarchy_mut(&mut self) -> &mut Hierarchy {
        &mut self.hierarchy
    }

    /// Returns the gate.
    #[must_use]
    pub fn gate(&self) -> &'static SyncGate {
        self.gate
    }

    /// Returns the settings.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Replaces the settings.
    pub fn set_config(&mut self, config: SyncConfig) {
        self.config = config;
    }

    // -- View layers --

    /// Returns the view layers.
    #[must_use]
    pub fn view_layers(&self) -> &[ViewLayer] {
        &self.view_layers
    }

    /// Returns the view layer at `index`.
    #[must_use]
    pub fn view_layer(&self, index: usize) -> Option<&ViewLayer> {
        self.view_layers.get(index)
    }

    /// Returns the view layer at `index` for edits.
    pub fn view_layer_mut(&mut self, index: usize) -> Option<&mut ViewLayer> {
        self.view_layers.get_mut(index)
    }

    /// Returns the position of the view layer named `name`.
    #[must_use]
    pub fn find_view_layer(&self, name: &str) -> Option<usize> {
        self.view_layers.iter().position(|vl| vl.name() == name)
    }

    /// Adds a view layer and returns its position.
    ///
    /// [`NewLayerMode::Copy`] with an out-of-range position falls back to
    /// [`NewLayerMode::New`].
    pub fn add_view_layer(&mut self, name: impl Into<String>, mode: NewLayerMode) -> usize {
        let name = name.into();
        let view_layer = match mode {
            NewLayerMode::Copy(source) if source < self.view_layers.len() => {
                let mut copy = self.view_layers[source].clone();
                copy.set_name(name);
                copy
            }
            NewLayerMode::Copy(source) => {
                log::warn!("no view layer at {source} to copy, creating {name:?} from scratch");
                ViewLayer::new(name)
            }
            NewLayerMode::New => ViewLayer::new(name),
            NewLayerMode::Empty => {
                let mut view_layer = ViewLayer::new(name);
                if view_layer.ensure_synced(&self.hierarchy, self.gate) {
                    let top: Vec<_> = view_layer
                        .tree()
                        .root()
                        .map(|root| view_layer.tree().children(root).collect())
                        .unwrap_or_default();
                    for node in top {
                        set_layer_flag(&mut view_layer, node, LayerFlags::EXCLUDE, true);
                    }
                }
                view_layer
            }
        };
        self.view_layers.push(view_layer);
        let index = self.view_layers.len() - 1;
        self.view_layers[index].ensure_synced_with(
            &self.hierarchy,
            self.gate,
            &self.config,
            &mut Tracer::none(),
        );
        index
    }

    /// Removes and returns the view layer at `index`.
    pub fn remove_view_layer(&mut self, index: usize) -> Option<ViewLayer> {
        (index < self.view_layers.len()).then(|| self.view_layers.remove(index))
    }

    // -- Viewports --

    /// Registers a viewport for local-visibility passes.
    pub fn add_viewport(&mut self, viewport: Viewport) {
        if !self.viewports.contains(&viewport) {
            self.viewports.push(viewport);
        }
    }

    /// Unregisters a viewport.
    pub fn remove_viewport(&mut self, viewport: Viewport) {
        self.viewports.retain(|v| *v != viewport);
    }

    /// Returns the registered viewports.
    #[must_use]
    pub fn viewports(&self) -> &[Viewport] {
        &self.viewports
    }

    // -- Synchronization --

    /// Marks every view layer out of sync.
    pub fn mark_dirty(&mut self) {
        for view_layer in &mut self.view_layers {
            view_layer.mark_dirty();
        }
    }

    /// Brings every view layer up to date with the hierarchy.
    ///
    /// Returns whether all view layers are in sync afterwards.
    pub fn ensure_synced(&mut self) -> bool {
        self.ensure_synced_with(&mut Tracer::none())
    }

    /// Like [`ensure_synced`](Self::ensure_synced), reporting to `tracer`.
    pub fn ensure_synced_with(&mut self, tracer: &mut Tracer<'_>) -> bool {
        self.hierarchy.take_changes_into(&mut self.changes);
        if self.changes.needs_resync() {
            self.mark_dirty();
        } else if !self.changes.object_restrict.is_empty() {
            let objects: Vec<ObjectId> = self
                .changes
                .object_restrict
                .iter()
                .filter_map(|&idx| self.hierarchy.object_at(idx))
                .collect();
            for view_layer in &mut self.view_layers {
                for &object in &objects {
                    view_layer.eval_object_flags(object, &self.hierarchy);
                }
            }
        }

        let mut all = true;
        for view_layer in &mut self.view_layers {
            let synced = view_layer
                .ensure_synced_with(&self.hierarchy, self.gate, &self.config, tracer)
                .is_some();
            all &= synced;
            if synced && self.config.local_sync_on_ensure {
                for viewport in self.viewports.iter().filter(|v| v.local_collections) {
                    local_sync_with(view_layer, &self.hierarchy, viewport.slot_bit, tracer);
                }
            }
        }
        all
    }

    /// Runs `f` with the gate closed, then synchronizes once.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let gate = self.gate;
        let result = {
            let _guard = gate.scoped();
            f(self)
        };
        self.ensure_synced();
        result
    }

    /// Replaces `old` with `new` in the hierarchy and in every view layer.
    ///
    /// Returns the total number of duplicate bases removed.
    ///
    /// # Errors
    ///
    /// Fails if either object is stale, or with
    /// [`DuplicatePolicy::Strict`] if a view layer already had a base of
    /// `new`. On failure no synchronization runs: the failing view layer
    /// keeps both bases, is out of sync and has no hash. The next
    /// [`ensure_synced`](Self::ensure_synced) repairs it by keeping the
    /// first base.
    pub fn remap_object(
        &mut self,
        old: ObjectId,
        new: ObjectId,
        policy: DuplicatePolicy,
    ) -> Result<usize, RemapError> {
        let gate = self.gate;
        let result = {
            let _guard = gate.scoped();
            self.remap_all(old, new, policy)
        };
        if result.is_ok() {
            self.ensure_synced();
        }
        result
    }

    fn remap_all(
        &mut self,
        old: ObjectId,
        new: ObjectId,
        policy: DuplicatePolicy,
    ) -> Result<usize, RemapError> {
        self.hierarchy.remap_object(old, new)?;
        let mut removed = 0;
        for view_layer in &mut self.view_layers {
            removed += view_layer.remap_object(old, new, policy)?;
        }
        Ok(removed)
    }

    /// [`remap_object`](Self::remap_object) with the configured policy.
    ///
    /// # Errors
    ///
    /// See [`remap_object`](Self::remap_object).
    pub fn remap_object_default(
        &mut self,
        old: ObjectId,
        new: ObjectId,
    ) -> Result<usize, RemapError> {
        self.remap_object(old, new, self.config.remap_policy)
    }
}
