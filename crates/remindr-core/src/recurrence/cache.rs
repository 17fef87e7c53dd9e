//! Memoized display windows.

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::window::{compute_display_window, DisplayWindow, WindowQuery};
use super::RecurrenceRule;
use crate::error::SearchError;

/// The full query, plus `today` for Daily rules (the only rule that reads it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    query: WindowQuery,
    today: Option<NaiveDate>,
}

impl CacheKey {
    fn new(query: &WindowQuery, today: NaiveDate) -> Self {
        let today = matches!(query.rule, RecurrenceRule::Daily).then_some(today);
        Self {
            query: *query,
            today,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Unbounded map from window queries to their results.
///
/// Safe to share between threads. Two callers missing on the same key may
/// both compute it; the results are identical, so whichever insert lands
/// first is kept. Errors are returned but never stored.
#[derive(Debug, Default)]
pub struct OccurrenceCache {
    entries: RwLock<HashMap<CacheKey, DisplayWindow>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl OccurrenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(
        &self,
        query: &WindowQuery,
        today: NaiveDate,
    ) -> Result<DisplayWindow, SearchError> {
        let key = CacheKey::new(query, today);
        if let Some(window) = self.entries.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(*window);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let window = compute_display_window(query, today)?;
        let stored = *self.entries.write().entry(key).or_insert(window);
        debug!(rule = %query.rule, reference = %query.reference, "cached display window");
        Ok(stored)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
