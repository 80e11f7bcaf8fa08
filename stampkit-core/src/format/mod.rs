//! Timestamp formatting shared across UIs.
//!
//! - [`pattern`]: `SimpleDateFormat`-style pattern compiler
//! - [`cache`]: per-pattern formatter cache with default-format fallback
//! - [`relative`]: "5m ago" labels
//! - [`zone`]: offset instants are rendered in

pub mod cache;
pub mod pattern;
pub mod relative;
pub mod zone;

pub use cache::{CompiledFormatter, FormatterCache, SharedFormatter};
pub use pattern::{FormatError, Layout, DEFAULT_FORMAT};
pub use relative::{relative_label, DAY_MS, HOUR_MS, MINUTE_MS, WEEK_MS};
pub use zone::Zone;
