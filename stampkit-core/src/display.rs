//! Deciding how a message timestamp is displayed.
//!
//! A timestamp renders as relative time ("5m ago") when relative time is
//! enabled and the message is younger than the configured threshold. Future
//! timestamps and anything older than the threshold use the absolute format.
//!
//! Relative labels are memoized per timestamp. The memo is swept wholesale
//! once more than an hour has passed since the previous sweep, checked lazily
//! on every call. Staleness is therefore bounded by the sweep interval rather
//! than tracked per entry; labels are cheap to recompute.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::TimestampConfig;
use crate::format::{relative_label, FormatterCache, Zone, HOUR_MS};

/// Interval between lazy sweeps of the relative label memo.
pub const SWEEP_INTERVAL_MS: i64 = HOUR_MS as i64;

/// Relative labels keyed by target timestamp.
#[derive(Debug)]
pub struct RelativeTimeCache {
    entries: DashMap<i64, String>,
    last_sweep: Mutex<i64>,
}

impl RelativeTimeCache {
    /// Create an empty cache whose sweep window starts at `now`.
    pub fn new(now: i64) -> Self {
        Self {
            entries: DashMap::new(),
            last_sweep: Mutex::new(now),
        }
    }

    /// Return the stored label for `target`, computing it from `delta` on a miss.
    pub fn get_or_compute(&self, target: i64, delta: u64) -> String {
        if let Some(label) = self.entries.get(&target) {
            return label.value().clone();
        }
        let entry = self
            .entries
            .entry(target)
            .or_insert_with(|| relative_label(delta));
        entry.value().clone()
    }

    /// Clear everything if more than one sweep interval has elapsed since the
    /// last sweep. Returns whether a sweep happened.
    pub fn evict_if_stale(&self, now: i64) -> bool {
        let mut last_sweep = self.last_sweep.lock();
        if now.saturating_sub(*last_sweep) <= SWEEP_INTERVAL_MS {
            return false;
        }

        let evicted = self.entries.len();
        self.entries.clear();
        *last_sweep = now;
        tracing::debug!(evicted, "Swept relative time cache");
        true
    }

    /// Drop every stored label. Idempotent.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How a timestamp is shown at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    /// Formatted with the configured pattern
    Absolute,
    /// Relative label recomputed on every render
    Live { delta: u64 },
    /// Relative label served from the memo
    Memoized { delta: u64 },
}

impl DisplayKind {
    pub fn classify(now: i64, target: i64, config: &TimestampConfig) -> Self {
        if !config.use_relative_time {
            return DisplayKind::Absolute;
        }

        // Future targets fail the conversion and count as old
        match u64::try_from(now.saturating_sub(target)) {
            Ok(delta) if delta < config.threshold_millis() => {
                // Only the first hour is kept live; older labels change slowly
                // enough to come from the memo.
                if config.real_time_updates && delta < HOUR_MS {
                    DisplayKind::Live { delta }
                } else {
                    DisplayKind::Memoized { delta }
                }
            }
            _ => DisplayKind::Absolute,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DisplayKind::Absolute => "absolute",
            DisplayKind::Live { .. } => "live",
            DisplayKind::Memoized { .. } => "memoized",
        }
    }

    pub fn is_relative(&self) -> bool {
        !matches!(self, DisplayKind::Absolute)
    }
}

/// Renders message timestamps with cached formatters and relative labels.
pub struct TimestampRenderer {
    formatters: FormatterCache,
    relative: RelativeTimeCache,
    clock: Arc<dyn Clock>,
}

impl TimestampRenderer {
    pub fn new(zone: Zone, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_millis();
        Self {
            formatters: FormatterCache::new(zone),
            relative: RelativeTimeCache::new(now),
            clock,
        }
    }

    /// Renderer driven by wall-clock time
    pub fn with_system_clock(zone: Zone) -> Self {
        Self::new(zone, Arc::new(SystemClock))
    }

    pub fn formatters(&self) -> &FormatterCache {
        &self.formatters
    }

    pub fn relative_cache(&self) -> &RelativeTimeCache {
        &self.relative
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Render `instant` with `pattern`, falling back to the default format.
    pub fn render(&self, pattern: &str, instant: i64) -> String {
        self.formatters.render(pattern, instant)
    }

    /// Display `target` as seen at the clock's current instant.
    pub fn display(&self, target: i64, config: &TimestampConfig) -> String {
        self.display_timestamp(self.clock.now_millis(), target, config)
    }

    /// Display `target` as seen at `now`.
    pub fn display_timestamp(&self, now: i64, target: i64, config: &TimestampConfig) -> String {
        self.relative.evict_if_stale(now);

        match DisplayKind::classify(now, target, config) {
            DisplayKind::Absolute => self.render(&config.format, target),
            DisplayKind::Live { delta } => relative_label(delta),
            DisplayKind::Memoized { delta } => self.relative.get_or_compute(target, delta),
        }
    }

    /// Sweep the relative label memo if it is due, using the clock.
    pub fn evict_if_stale(&self) -> bool {
        self.relative.evict_if_stale(self.clock.now_millis())
    }

    /// Drop stored relative labels so the next render recomputes them.
    pub fn flush(&self) {
        self.relative.clear();
    }

    /// Drop stored relative labels and compiled formatters.
    pub fn clear(&self) {
        self.relative.clear();
        self.formatters.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::format::{DAY_MS, MINUTE_MS};

    // 2021-03-04T05:06:07.089Z
    const TARGET: i64 = 1_614_834_367_089;
    const MINUTE: i64 = MINUTE_MS as i64;
    const HOUR: i64 = HOUR_MS as i64;
    const DAY: i64 = DAY_MS as i64;

    fn renderer(now: i64) -> (TimestampRenderer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        let renderer = TimestampRenderer::new(Zone::Utc, clock.clone());
        (renderer, clock)
    }

    fn config() -> TimestampConfig {
        TimestampConfig::default()
    }

    #[test]
    fn test_absolute_when_relative_disabled() {
        let (renderer, _) = renderer(TARGET);
        let config = TimestampConfig {
            use_relative_time: false,
            ..config()
        };
        let expected = renderer.render(&config.format, TARGET);
        assert_eq!(expected, "04.03.2021, 05:06:07");

        for delta in [0, 30_000, HOUR, 3 * DAY, -DAY] {
            assert_eq!(
                renderer.display_timestamp(TARGET + delta, TARGET, &config),
                expected
            );
        }
    }

    #[test]
    fn test_future_target_is_absolute() {
        let (renderer, _) = renderer(TARGET);
        let shown = renderer.display_timestamp(TARGET - 1, TARGET, &config());
        assert_eq!(shown, "04.03.2021, 05:06:07");
    }

    #[test]
    fn test_threshold_boundary() {
        let (renderer, _) = renderer(TARGET);
        let config = TimestampConfig {
            relative_time_threshold: 2,
            ..config()
        };
        assert_eq!(
            renderer.display_timestamp(TARGET + 2 * HOUR - 1, TARGET, &config),
            "1h ago"
        );
        assert_eq!(
            renderer.display_timestamp(TARGET + 2 * HOUR, TARGET, &config),
            "04.03.2021, 05:06:07"
        );
    }

    #[test]
    fn test_invalid_format_falls_back_for_old_messages() {
        let (renderer, _) = renderer(TARGET);
        let config = TimestampConfig {
            format: "invalid qq".to_string(),
            ..config()
        };
        assert_eq!(
            renderer.display_timestamp(TARGET + 30 * DAY, TARGET, &config),
            "04.03.2021, 05:06:07"
        );
    }

    #[test]
    fn test_real_time_updates_are_not_cached() {
        let (renderer, clock) = renderer(TARGET + 30_000);
        let config = config();

        assert_eq!(renderer.display(TARGET, &config), "Just now");
        clock.advance(45_000);
        assert_eq!(renderer.display(TARGET, &config), "1m ago");
        assert!(renderer.relative_cache().is_empty());
    }

    #[test]
    fn test_cached_label_survives_clock_advance() {
        let (renderer, clock) = renderer(TARGET + 30_000);
        let config = TimestampConfig {
            real_time_updates: false,
            ..config()
        };

        assert_eq!(renderer.display(TARGET, &config), "Just now");
        clock.advance(10 * MINUTE);
        assert_eq!(renderer.display(TARGET, &config), "Just now");
        assert_eq!(renderer.relative_cache().len(), 1);
    }

    #[test]
    fn test_real_time_updates_cache_after_first_hour() {
        let (renderer, clock) = renderer(TARGET + 2 * HOUR);
        let config = config();

        assert_eq!(renderer.display(TARGET, &config), "2h ago");
        clock.advance(HOUR);
        assert_eq!(renderer.display(TARGET, &config), "2h ago");
    }

    #[test]
    fn test_sweep_after_an_hour() {
        let (renderer, clock) = renderer(TARGET + 30_000);
        let config = TimestampConfig {
            real_time_updates: false,
            ..config()
        };

        assert_eq!(renderer.display(TARGET, &config), "Just now");

        // Exactly one hour since the last sweep is not yet stale
        clock.set(TARGET + 30_000 + HOUR);
        assert_eq!(renderer.display(TARGET, &config), "Just now");

        clock.advance(1);
        assert_eq!(renderer.display(TARGET, &config), "1h ago");
    }

    #[test]
    fn test_flush_forces_recompute() {
        let (renderer, clock) = renderer(TARGET + 30_000);
        let config = TimestampConfig {
            real_time_updates: false,
            ..config()
        };

        assert_eq!(renderer.display(TARGET, &config), "Just now");
        clock.advance(5 * MINUTE);
        renderer.flush();
        renderer.flush();
        assert_eq!(renderer.display(TARGET, &config), "5m ago");
    }

    #[test]
    fn test_evict_if_stale_uses_clock() {
        let (renderer, clock) = renderer(TARGET);
        assert!(!renderer.evict_if_stale());
        clock.advance(HOUR + 1);
        assert!(renderer.evict_if_stale());
        assert!(!renderer.evict_if_stale());
    }

    #[test]
    fn test_clear_drops_formatters() {
        let (renderer, _) = renderer(TARGET);
        renderer.render("HH:mm", TARGET);
        assert_eq!(renderer.formatters().len(), 1);
        renderer.clear();
        assert!(renderer.formatters().is_empty());
    }

    #[test]
    fn test_classify() {
        let config = config();
        assert_eq!(
            DisplayKind::classify(TARGET + 30_000, TARGET, &config),
            DisplayKind::Live { delta: 30_000 }
        );
        assert_eq!(
            DisplayKind::classify(TARGET + HOUR, TARGET, &config),
            DisplayKind::Memoized { delta: HOUR_MS }
        );
        assert_eq!(
            DisplayKind::classify(TARGET + DAY, TARGET, &config),
            DisplayKind::Absolute
        );
        assert_eq!(
            DisplayKind::classify(TARGET - 1, TARGET, &config),
            DisplayKind::Absolute
        );
        assert!(!DisplayKind::Absolute.is_relative());
        assert_eq!(DisplayKind::Live { delta: 0 }.name(), "live");
    }

    #[test]
    fn test_extreme_instants_do_not_overflow() {
        let (renderer, _) = renderer(TARGET);
        let config = config();
        let shown = renderer.display_timestamp(i64::MAX, i64::MIN, &config);
        assert!(!shown.is_empty());
        let shown = renderer.display_timestamp(i64::MIN, i64::MAX, &config);
        assert!(!shown.is_empty());
    }
}
