use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::models::{AggregationResult, CategorySummary, NormalizedTransaction};

/// Identifies one set of declared inputs within one cache generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKey {
    pub generation: u64,
    pub fingerprint: u64,
}

/// Hash the canonical JSON form of `inputs`.
///
/// `serde_json` maps keep their keys sorted, so equal values always produce
/// the same fingerprint.
pub fn fingerprint<T: Serialize + ?Sized>(inputs: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    match serde_json::to_string(inputs) {
        Ok(canonical) => canonical.hash(&mut hasher),
        // Unserializable inputs never match anything cached.
        Err(_) => u64::MAX.hash(&mut hasher),
    }
    hasher.finish()
}

struct Slot<T> {
    inner: RwLock<Option<(CacheKey, Arc<T>)>>,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    fn get(&self, key: CacheKey) -> Option<Arc<T>> {
        let guard = self.inner.read().ok()?;
        match guard.as_ref() {
            Some((stored, val)) if *stored == key => Some(Arc::clone(val)),
            _ => None,
        }
    }

    fn set(&self, key: CacheKey, val: Arc<T>) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some((key, val));
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Per-session memo of every derived quantity.
///
/// Each slot remembers the last result together with the key it was computed
/// for. Bumping the generation makes every slot stale at once.
pub struct AggregationCache {
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    normalized: Slot<Vec<NormalizedTransaction>>,
    projected: Slot<Vec<NormalizedTransaction>>,
    filtered: Slot<Vec<NormalizedTransaction>>,
    weekly: Slot<AggregationResult>,
    categories: Slot<CategorySummary>,
}

impl Default for AggregationCache {
    fn default() -> Self {
        Self::new()
    }
}

/// The slots holding normalized transaction sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionSlot {
    Normalized,
    Projected,
    Filtered,
}

impl TransactionSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normalized => "normalized",
            Self::Projected => "projected",
            Self::Filtered => "filtered",
        }
    }
}

impl AggregationCache {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            normalized: Slot::new(),
            projected: Slot::new(),
            filtered: Slot::new(),
            weekly: Slot::new(),
            categories: Slot::new(),
        }
    }

    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn key(&self, fingerprint: u64) -> CacheKey {
        CacheKey {
            generation: self.generation(),
            fingerprint,
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn record(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn transaction_slot(&self, slot: TransactionSlot) -> &Slot<Vec<NormalizedTransaction>> {
        match slot {
            TransactionSlot::Normalized => &self.normalized,
            TransactionSlot::Projected => &self.projected,
            TransactionSlot::Filtered => &self.filtered,
        }
    }

    pub fn get_transactions(
        &self,
        slot: TransactionSlot,
        key: CacheKey,
    ) -> Option<Arc<Vec<NormalizedTransaction>>> {
        let found = self.transaction_slot(slot).get(key);
        self.record(found.is_some());
        found
    }

    pub fn set_transactions(
        &self,
        slot: TransactionSlot,
        key: CacheKey,
        val: Arc<Vec<NormalizedTransaction>>,
    ) {
        self.transaction_slot(slot).set(key, val);
    }

    pub fn get_weekly(&self, key: CacheKey) -> Option<Arc<AggregationResult>> {
        let found = self.weekly.get(key);
        self.record(found.is_some());
        found
    }

    pub fn set_weekly(&self, key: CacheKey, val: Arc<AggregationResult>) {
        self.weekly.set(key, val);
    }

    pub fn get_categories(&self, key: CacheKey) -> Option<Arc<CategorySummary>> {
        let found = self.categories.get(key);
        self.record(found.is_some());
        found
    }

    pub fn set_categories(&self, key: CacheKey, val: Arc<CategorySummary>) {
        self.categories.set(key, val);
    }
}
