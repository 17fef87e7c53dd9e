use chrono::NaiveDate;

use super::cache::{CacheStats, OccurrenceCache};
use super::clock::{Clock, SystemClock};
use super::window::{compute_display_window, DisplayWindow, WindowQuery};
use crate::error::SearchError;

/// Window search with an injected clock and an optional memo cache.
///
/// Tasks and filters take an engine rather than calling
/// [`compute_display_window`] directly, so one cache serves a whole listing.
#[derive(Debug)]
pub struct WindowEngine<C = SystemClock> {
    cache: Option<OccurrenceCache>,
    clock: C,
}

impl WindowEngine<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for WindowEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> WindowEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            cache: Some(OccurrenceCache::new()),
            clock,
        }
    }

    /// Drop the cache; every query runs the search.
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn display_window(&self, query: &WindowQuery) -> Result<DisplayWindow, SearchError> {
        let today = self.clock.today();
        match &self.cache {
            Some(cache) => cache.get_or_compute(query, today),
            None => compute_display_window(query, today),
        }
    }

    pub fn cache(&self) -> Option<&OccurrenceCache> {
        self.cache.as_ref()
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(OccurrenceCache::stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{FixedClock, RecurrenceRule};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily_done_on(day: NaiveDate) -> WindowQuery {
        WindowQuery {
            rule: RecurrenceRule::Daily,
            start_date: ymd(2020, 1, 1),
            last_completed: Some(day),
            advance_days: 0,
            expire_days: 0,
            reference: day,
        }
    }

    #[test]
    fn clock_decides_daily_rollover() {
        let done = ymd(2020, 3, 1);
        let same_day = WindowEngine::with_clock(FixedClock(done));
        assert_eq!(
            same_day.display_window(&daily_done_on(done)).unwrap().occurrence,
            ymd(2020, 3, 2)
        );

        let next_day = WindowEngine::with_clock(FixedClock(ymd(2020, 3, 2)));
        assert_eq!(
            next_day.display_window(&daily_done_on(done)).unwrap().occurrence,
            done
        );
    }

    #[test]
    fn uncached_engine_matches_cached() {
        let clock = FixedClock(ymd(2020, 1, 1));
        let cached = WindowEngine::with_clock(clock);
        let uncached = WindowEngine::with_clock(clock).without_cache();
        let q = WindowQuery {
            rule: RecurrenceRule::monthly(7).unwrap(),
            ..daily_done_on(ymd(2020, 1, 1))
        };
        assert_eq!(
            cached.display_window(&q).unwrap(),
            uncached.display_window(&q).unwrap()
        );
        assert!(uncached.cache().is_none());
        assert_eq!(cached.cache_stats().map(|s| s.misses), Some(1));
    }
}
