// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reentrant suppression of reconciliation.
//!
//! Bulk edits (for example remapping many objects) would otherwise trigger a
//! reconciliation per edit. Closing the gate for the duration of the batch
//! turns every resync request into "mark dirty", and a single
//! [`ensure_synced`](crate::scene::Scene::ensure_synced) afterwards catches up.
//!
//! ```
//! use layersync_core::gate::SyncGate;
//!
//! static GATE: SyncGate = SyncGate::new();
//!
//! {
//!     let _outer = GATE.scoped();
//!     let _inner = GATE.scoped();
//!     assert!(!GATE.is_open());
//! }
//! assert!(GATE.is_open());
//! ```

use core::sync::atomic::{AtomicI32, Ordering};

/// Upper bound on nested [`SyncGate::forbid`] calls.
///
/// Reaching it almost certainly means a forbid without matching allow.
pub const MAX_FORBID_DEPTH: i32 = 16 * 256;

static GLOBAL: SyncGate = SyncGate::new();

/// A nestable counter that blocks reconciliation while positive.
#[derive(Debug)]
pub struct SyncGate {
    depth: AtomicI32,
}

impl Default for SyncGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncGate {
    /// Creates an open gate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            depth: AtomicI32::new(0),
        }
    }

    /// Returns the process-wide gate used by [`Scene::new`](crate::scene::Scene::new).
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Closes the gate one more level.
    pub fn forbid(&self) {
        let prev = self.depth.fetch_add(1, Ordering::AcqRel);
        debug_assert!(prev >= 0, "sync gate depth went negative: {prev}");
        debug_assert!(
            prev < MAX_FORBID_DEPTH - 1,
            "sync gate nested {prev} levels deep; unbalanced forbid?"
        );
    }

    /// Opens the gate one level.
    pub fn allow(&self) {
        let prev = self.depth.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "sync gate allowed more often than forbidden");
        debug_assert!(prev < MAX_FORBID_DEPTH, "sync gate depth out of range: {prev}");
    }

    /// Returns whether reconciliation may run.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.depth.load(Ordering::Acquire) <= 0
    }

    /// Returns the current nesting depth.
    #[must_use]
    pub fn depth(&self) -> i32 {
        self.depth.load(Ordering::Acquire)
    }

    /// Closes the gate until the returned guard is dropped.
    #[must_use = "the gate reopens as soon as the guard is dropped"]
    pub fn scoped(&self) -> ForbidGuard<'_> {
        self.forbid();
        ForbidGuard { gate: self }
    }
}

/// Keeps a [`SyncGate`] closed while alive.
#[derive(Debug)]
pub struct ForbidGuard<'a> {
    gate: &'a SyncGate,
}

impl Drop for ForbidGuard<'_> {
    fn drop(&mut self) {
        self.gate.allow();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbid_allow_nest() {
        let gate = SyncGate::new();
        assert!(gate.is_open());
        gate.forbid();
        gate.forbid();
        assert_eq!(gate.depth(), 2);
        gate.allow();
        assert!(!gate.is_open());
        gate.allow();
        assert!(gate.is_open());
    }

    #[test]
    fn guard_reopens_on_drop() {
        let gate = SyncGate::new();
        {
            let _g = gate.scoped();
            assert!(!gate.is_open());
        }
        assert!(gate.is_open());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "allowed more often")]
    fn unbalanced_allow_asserts() {
        let gate = SyncGate::new();
        gate.allow();
    }
}
