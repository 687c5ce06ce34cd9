// Copyright 2026 the Layersync Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Object-to-base index of a view layer.
//!
//! [`BaseIndex`] owns the ordered base list (which doubles as the flat array
//! cache, see [`BaseIndex::bases`]) and an object-to-position hash. The hash
//! is either absent or exactly consistent with the list:
//!
//! - Reconciliation takes the current hash as its *old* lookup, assembles a
//!   fresh list plus a fresh hash through a [`BaseCollector`], and installs
//!   both at the end of the pass.
//! - Any other structural change (loading, identity remap, explicit
//!   [`invalidate_hash`](BaseIndex::invalidate_hash)) drops the hash. It is
//!   rebuilt on the next lookup, at most once even with concurrent readers.

use alloc::vec::Vec;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::base::Base;
use crate::error::IndexError;
use crate::flags::BaseFlags;
use crate::id::{BaseId, ObjectId};

/// How a hash rebuild treats an object that has several bases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep the first base and drop the later duplicates.
    ///
    /// This is expected after remapping an object onto another one already
    /// present in the view layer.
    #[default]
    Fix,
    /// Treat duplicates as an internal consistency error.
    Strict,
}

/// The bases of a view layer and their object lookup.
#[derive(Debug)]
pub struct BaseIndex {
    pub(crate) bases: Vec<Base>,
    pub(crate) active: Option<BaseId>,
    pub(crate) next_id: u32,
    lookup: OnceLock<HashMap<ObjectId, u32>>,
    build_lock: Mutex<()>,
}

impl Default for BaseIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for BaseIndex {
    fn clone(&self) -> Self {
        let lookup = OnceLock::new();
        if let Some(map) = self.lookup.get() {
            let _ = lookup.set(map.clone());
        }
        Self {
            bases: self.bases.clone(),
            active: self.active,
            next_id: self.next_id,
            lookup,
            build_lock: Mutex::new(()),
        }
    }
}

impl BaseIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bases: Vec::new(),
            active: None,
            next_id: 0,
            lookup: OnceLock::new(),
            build_lock: Mutex::new(()),
        }
    }

    /// Returns the bases in list order.
    #[must_use]
    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    /// Returns the bases for flag edits.
    ///
    /// The slice cannot be reordered or resized, so the hash stays valid.
    pub fn bases_mut(&mut self) -> &mut [Base] {
        &mut self.bases
    }

    /// Returns the number of bases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Returns whether there are no bases.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    // -- Lookup --

    /// Returns the list position of the base of `object`.
    ///
    /// Builds the hash on first use.
    ///
    /// # Panics
    ///
    /// Panics if the hash has to be built and the base list maps one object
    /// twice. Use [`rebuild_hash`](Self::rebuild_hash) with an explicit policy
    /// after edits that may introduce duplicates.
    #[must_use]
    pub fn position(&self, object: ObjectId) -> Option<usize> {
        self.lookup().get(&object).map(|&pos| pos as usize)
    }

    /// Returns the base of `object`, if it has one.
    ///
    /// # Panics
    ///
    /// See [`position`](Self::position).
    #[must_use]
    pub fn find(&self, object: ObjectId) -> Option<&Base> {
        self.position(object).map(|pos| &self.bases[pos])
    }

    /// Returns the base of `object` for flag edits.
    ///
    /// # Panics
    ///
    /// See [`position`](Self::position).
    pub fn find_mut(&mut self, object: ObjectId) -> Option<&mut Base> {
        let pos = self.position(object)?;
        Some(&mut self.bases[pos])
    }

    /// Returns whether `object` has a base.
    ///
    /// # Panics
    ///
    /// See [`position`](Self::position).
    #[must_use]
    pub fn contains(&self, object: ObjectId) -> bool {
        self.position(object).is_some()
    }

    /// Returns the base with the given identity.
    #[must_use]
    pub fn by_id(&self, id: BaseId) -> Option<&Base> {
        self.bases.iter().find(|b| b.id == id)
    }

    // -- Hash management --

    /// Drops the hash; the next lookup rebuilds it.
    pub fn invalidate_hash(&mut self) {
        self.lookup = OnceLock::new();
    }

    /// Returns whether the hash is currently built.
    #[must_use]
    pub fn is_hash_built(&self) -> bool {
        self.lookup.get().is_some()
    }

    /// Returns the number of hash entries, or 0 if the hash is not built.
    #[must_use]
    pub fn hash_len(&self) -> usize {
        self.lookup.get().map_or(0, HashMap::len)
    }

    /// Rebuilds the hash from the base list under an explicit duplicate policy.
    ///
    /// Returns the number of duplicate bases removed (always 0 in strict mode).
    ///
    /// # Errors
    ///
    /// In [`DuplicatePolicy::Strict`] mode, returns
    /// [`IndexError::DuplicateBase`] for the first object with several bases.
    /// The hash is left unbuilt in that case.
    pub fn rebuild_hash(&mut self, policy: DuplicatePolicy) -> Result<usize, IndexError> {
        self.invalidate_hash();
        let mut map = HashMap::with_capacity(self.bases.len());
        let mut removed = 0;
        let mut pos = 0;
        while pos < self.bases.len() {
            let object = self.bases[pos].object;
            if map.contains_key(&object) {
                match policy {
                    DuplicatePolicy::Fix => {
                        let dup = self.bases.remove(pos);
                        if self.active == Some(dup.id) {
                            self.active = None;
                        }
                        log::warn!("removed duplicate base {:?} of {object:?}", dup.id);
                        removed += 1;
                        continue;
                    }
                    DuplicatePolicy::Strict => {
                        log::error!("{object:?} has more than one base in the view layer");
                        return Err(IndexError::DuplicateBase { object });
                    }
                }
            }
            map.insert(object, pos as u32);
            pos += 1;
        }
        let _ = self.lookup.set(map);
        Ok(removed)
    }

    /// Returns whether the hash, if built, matches the base list exactly.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let Some(map) = self.lookup.get() else {
            return true;
        };
        map.len() == self.bases.len()
            && self
                .bases
                .iter()
                .enumerate()
                .all(|(pos, b)| map.get(&b.object) == Some(&(pos as u32)))
    }

    /// Returns the hash, building it once if needed.
    fn lookup(&self) -> &HashMap<ObjectId, u32> {
        if let Some(map) = self.lookup.get() {
            return map;
        }
        let _guard = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another reader may have built it while we waited.
        if let Some(map) = self.lookup.get() {
            return map;
        }
        let mut map = HashMap::with_capacity(self.bases.len());
        for (pos, base) in self.bases.iter().enumerate() {
            if map.insert(base.object, pos as u32).is_some() {
                log::error!("{:?} has more than one base in the view layer", base.object);
                panic!(
                    "{}",
                    IndexError::DuplicateBase {
                        object: base.object
                    }
                );
            }
        }
        self.lookup.get_or_init(|| map)
    }

    // -- Active base and selection --

    /// Returns the active base.
    #[must_use]
    pub fn active(&self) -> Option<&Base> {
        self.active.and_then(|id| self.by_id(id))
    }

    /// Clears the active base.
    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Deselects every base.
    pub fn deselect_all(&mut self) {
        for base in &mut self.bases {
            base.flags.remove(BaseFlags::SELECTED);
        }
    }

    /// Makes the base of `object` active, selecting it if it is selectable.
    ///
    /// Returns `false` if the object has no base.
    ///
    /// # Panics
    ///
    /// See [`position`](Self::position).
    pub fn select_and_set_active(&mut self, object: ObjectId) -> bool {
        let Some(base) = self.find_mut(object) else {
            return false;
        };
        if base.flags.contains(BaseFlags::SELECTABLE) {
            base.flags.insert(BaseFlags::SELECTED);
        }
        let id = base.id;
        self.active = Some(id);
        true
    }

    // -- Reconciliation support --

    /// Starts assembling a new base list.
    ///
    /// The current list becomes the pool of reusable bases, with every
    /// collection-derived bit cleared.
    pub(crate) fn begin_collect(&mut self) -> BaseCollector {
        if !self.is_hash_built() {
            // Duplicates here come from a load or remap that skipped its own
            // rebuild; keep the first base.
            let _ = self.rebuild_hash(DuplicatePolicy::Fix);
        }
        let old_lookup = core::mem::take(&mut self.lookup).into_inner().unwrap_or_default();
        let old = core::mem::take(&mut self.bases)
            .into_iter()
            .map(|mut b| {
                b.reset_collection_bits();
                Some(b)
            })
            .collect();
        BaseCollector {
            old,
            old_lookup,
            new: Vec::new(),
            new_lookup: HashMap::new(),
            next_id: self.next_id,
            created: 0,
        }
    }

    /// Installs the assembled list and hash; returns the bases that were
    /// not reused.
    pub(crate) fn finish_collect(&mut self, collector: BaseCollector) -> Vec<Base> {
        let BaseCollector {
            old,
            new,
            new_lookup,
            next_id,
            ..
        } = collector;
        let removed: Vec<Base> = old.into_iter().flatten().collect();
        if let Some(active) = self.active {
            if removed.iter().any(|b| b.id == active) {
                self.active = None;
            }
        }
        self.bases = new;
        self.next_id = next_id;
        self.lookup = OnceLock::new();
        let _ = self.lookup.set(new_lookup);
        debug_assert!(self.is_consistent(), "base hash out of sync after reconciliation");
        removed
    }

    /// Appends a base during loading. The hash must be rebuilt afterwards.
    pub(crate) fn push_loaded(
        &mut self,
        object: ObjectId,
        flags: BaseFlags,
        local_bits: u16,
    ) -> BaseId {
        let id = BaseId(self.next_id);
        self.next_id += 1;
        let mut base = Base::new(id, object, local_bits);
        base.flags = flags;
        self.bases.push(base);
        self.invalidate_hash();
        id
    }
}

/// Assembles the base list during one reconciliation pass.
#[derive(Debug)]
pub(crate) struct BaseCollector {
    old: Vec<Option<Base>>,
    old_lookup: HashMap<ObjectId, u32>,
    new: Vec<Base>,
    new_lookup: HashMap<ObjectId, u32>,
    next_id: u32,
    pub(crate) created: usize,
}

impl BaseCollector {
    /// Returns the base of `object` in the new list, moving it over from the
    /// old list or creating it as needed.
    ///
    /// `local_bits` seeds the local visibility of newly created bases.
    pub(crate) fn acquire_or_create(&mut self, object: ObjectId, local_bits: u16) -> &mut Base {
        if let Some(&pos) = self.new_lookup.get(&object) {
            return &mut self.new[pos as usize];
        }
        let reused = self
            .old_lookup
            .get(&object)
            .and_then(|&pos| self.old[pos as usize].take());
        let base = reused.unwrap_or_else(|| {
            let id = BaseId(self.next_id);
            self.next_id += 1;
            self.created += 1;
            Base::new(id, object, local_bits)
        });
        let pos = self.new.len();
        self.new_lookup.insert(object, pos as u32);
        self.new.push(base);
        &mut self.new[pos]
    }

    /// Returns the bases assembled so far.
    pub(crate) fn assembled(&self) -> &[Base] {
        &self.new
    }
}
