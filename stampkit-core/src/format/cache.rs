//! Per-pattern formatter cache.
//!
//! Formatters are created on first use, shared by every caller, and kept until
//! the cache is cleared. Each one sits behind its own mutex, so renders of the
//! same pattern serialize while distinct patterns never contend.

use chrono::{DateTime, FixedOffset};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

use super::pattern::{FormatError, Layout};
use super::zone::Zone;

/// A formatter handle shared through the cache.
pub type SharedFormatter = Arc<Mutex<CompiledFormatter>>;

/// One pattern plus its lazily compiled layout and output buffer.
///
/// Formatting reuses the internal buffer, so an instance needs `&mut self`
/// and must be locked when shared.
#[derive(Debug)]
pub struct CompiledFormatter {
    pattern: String,
    layout: Option<Layout>,
    scratch: String,
}

impl CompiledFormatter {
    /// Create a formatter without validating the pattern.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            layout: None,
            scratch: String::new(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether the pattern has been compiled successfully yet.
    pub fn is_compiled(&self) -> bool {
        self.layout.is_some()
    }

    /// Format a date-time, compiling the pattern on first use.
    pub fn format(&mut self, dt: &DateTime<FixedOffset>) -> Result<String, FormatError> {
        let layout = match self.layout.take() {
            Some(layout) => layout,
            None => Layout::parse(&self.pattern)?,
        };

        self.scratch.clear();
        layout.write(dt, &mut self.scratch);
        self.layout = Some(layout);

        Ok(self.scratch.clone())
    }
}

/// Cache of compiled formatters keyed by exact pattern string.
#[derive(Debug)]
pub struct FormatterCache {
    formatters: DashMap<String, SharedFormatter>,
    fallback: Layout,
    zone: Zone,
}

impl Default for FormatterCache {
    fn default() -> Self {
        Self::new(Zone::default())
    }
}

impl FormatterCache {
    pub fn new(zone: Zone) -> Self {
        Self {
            formatters: DashMap::new(),
            fallback: Layout::fallback(),
            zone,
        }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Look up or create the formatter for `pattern`.
    ///
    /// Returns the same instance for the same string until [`clear`](Self::clear).
    pub fn compile(&self, pattern: &str) -> SharedFormatter {
        if let Some(existing) = self.formatters.get(pattern) {
            return Arc::clone(existing.value());
        }

        let entry = self
            .formatters
            .entry(pattern.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(CompiledFormatter::new(pattern))));
        Arc::clone(entry.value())
    }

    /// Render `instant` (ms since epoch) with `pattern`, surfacing format errors.
    pub fn try_render(&self, pattern: &str, instant: i64) -> Result<String, FormatError> {
        let dt = self.zone.datetime(instant);
        let formatter = self.compile(pattern);
        let result = formatter.lock().format(&dt);
        result
    }

    /// Render `instant` with `pattern`, falling back to the default format
    /// when the pattern is invalid.
    pub fn render(&self, pattern: &str, instant: i64) -> String {
        match self.try_render(pattern, instant) {
            Ok(rendered) => rendered,
            Err(err) => {
                tracing::warn!(
                    pattern = %pattern,
                    error = %err,
                    "Invalid timestamp format, using default format"
                );
                self.render_default(instant)
            }
        }
    }

    /// Render `instant` with the default format. Never fails.
    pub fn render_default(&self, instant: i64) -> String {
        self.fallback.render(&self.zone.datetime(instant))
    }

    /// Number of cached formatters
    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }

    /// Drop every cached formatter.
    pub fn clear(&self) {
        self.formatters.clear();
    }
}
