//! # stampkit-core
//!
//! Core library for stampkit - custom message timestamps and chat text transforms.
//!
//! This library provides:
//! - A `SimpleDateFormat`-style pattern compiler with a shared formatter cache
//! - Relative time labels ("5m ago") with a lazily swept memo
//! - Slash-command text transforms (mock, owo, reverse, ...)
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Rendering
//!
//! A [`TimestampRenderer`] decides per call whether a timestamp is shown as
//! relative time or through the configured pattern:
//! - **Disabled or old:** formatted with the pattern (default format on error)
//! - **First hour, real-time updates on:** relative label, recomputed each call
//! - **Otherwise within threshold:** relative label, memoized per timestamp
//!
//! ## Example
//!
//! ```rust,no_run
//! use stampkit_core::{Config, TimestampRenderer};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//! let zone = config.locale.zone().expect("invalid timezone");
//!
//! let renderer = TimestampRenderer::with_system_clock(zone);
//! println!("{}", renderer.display(1_614_834_367_089, &config.timestamps));
//! ```

// Re-export commonly used items at the crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, TimestampConfig};
pub use display::{DisplayKind, TimestampRenderer};
pub use error::{Error, Result};
pub use format::{relative_label, FormatError, FormatterCache, Zone, DEFAULT_FORMAT};
pub use settings::{SettingsProvider, SettingsStore};
pub use transform::TextCommand;

// Public modules
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod format;
pub mod logging;
pub mod settings;
pub mod transform;
