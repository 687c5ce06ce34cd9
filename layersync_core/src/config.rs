// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reconciliation settings.

use crate::index::DuplicatePolicy;

/// Settings for [`Scene`](crate::scene::Scene) synchronization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    /// Check after every reconciliation that each object of a non-excluded
    /// node has a base. A failed check panics.
    pub validate_bases: bool,
    /// Duplicate policy for
    /// [`Scene::remap_object_default`](crate::scene::Scene::remap_object_default).
    pub remap_policy: DuplicatePolicy,
    /// Run local-visibility passes for every registered viewport from
    /// [`Scene::ensure_synced`](crate::scene::Scene::ensure_synced).
    pub local_sync_on_ensure: bool,
}

impl SyncConfig {
    /// Settings for interactive editing.
    ///
    /// Duplicates left by remaps are repaired; validation only runs in debug
    /// builds.
    #[must_use]
    pub const fn interactive() -> Self {
        Self {
            validate_bases: cfg!(debug_assertions),
            remap_policy: DuplicatePolicy::Fix,
            local_sync_on_ensure: true,
        }
    }

    /// Settings for controlled pipelines where duplicates indicate a bug.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            validate_bases: true,
            remap_policy: DuplicatePolicy::Strict,
            local_sync_on_ensure: true,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::interactive()
    }
}
