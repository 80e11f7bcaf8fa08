//! stampkit - Custom timestamps and chat text transforms
//!
//! Render message timestamps with a custom pattern or as relative time, and
//! run the chat slash-command text transforms from the terminal.

mod refresh;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use stampkit_core::config::parse_threshold_hours;
use stampkit_core::{Config, DisplayKind, TextCommand, TimestampConfig, TimestampRenderer, Zone};

use crate::refresh::{Observer, RefreshLoop, StdoutObserver};

#[derive(Parser, Debug)]
#[command(name = "stampkit")]
#[command(about = "Custom timestamps and chat text transforms")]
#[command(version)]
struct Args {
    /// Zone to render in: local, utc, or an offset like +02:00
    #[arg(long, global = true)]
    tz: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Format an instant with a pattern (invalid patterns use the default format)
    Render {
        /// SimpleDateFormat-style pattern, e.g. "dd.MM.yyyy, HH:mm:ss"
        #[arg(long)]
        pattern: String,

        /// Milliseconds since the Unix epoch (default: now)
        #[arg(long, allow_negative_numbers = true)]
        at: Option<i64>,
    },

    /// Preview a pattern against the current time
    Preview {
        /// Pattern to preview (default: the configured format)
        #[arg(long)]
        pattern: Option<String>,

        /// Fail instead of falling back when the pattern is invalid
        #[arg(long)]
        strict: bool,
    },

    /// Display a message timestamp the way the chat would
    Show {
        /// Message timestamp in milliseconds since the Unix epoch
        #[arg(allow_negative_numbers = true)]
        target: i64,

        /// Current time in milliseconds since the Unix epoch (default: now)
        #[arg(long, allow_negative_numbers = true)]
        now: Option<i64>,

        /// Print a JSON object instead of plain text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        overrides: DisplayOverrides,
    },

    /// Keep re-displaying a timestamp on an interval
    Watch {
        /// Message timestamp in milliseconds since the Unix epoch
        #[arg(allow_negative_numbers = true)]
        target: i64,

        /// Seconds between refreshes
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,

        /// Stop after this many refreshes (default: until Ctrl-C)
        #[arg(long)]
        ticks: Option<u64>,

        /// Recompute memoized relative labels on every refresh
        #[arg(long)]
        flush: bool,

        #[command(flatten)]
        overrides: DisplayOverrides,
    },

    /// Apply a slash-command text transform
    Text {
        /// lenny, mock, upper, lower, owo, reverse, spoiler or emoji
        command: String,

        /// Message to transform
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },

    /// List available text transforms
    Commands,
}

/// Command-line overrides for the `[timestamps]` config section
#[derive(clap::Args, Debug, Clone)]
struct DisplayOverrides {
    /// Pattern for timestamps older than the threshold
    #[arg(long)]
    format: Option<String>,

    /// Always use the pattern, never relative time
    #[arg(long)]
    no_relative: bool,

    /// Hours below which relative time is used
    #[arg(long)]
    threshold: Option<String>,

    /// Memoize relative labels even during the first hour
    #[arg(long)]
    no_real_time: bool,
}

impl DisplayOverrides {
    fn apply(&self, base: &TimestampConfig) -> Result<TimestampConfig> {
        let mut config = base.clone();
        if let Some(format) = &self.format {
            config.format = format.clone();
        }
        if self.no_relative {
            config.use_relative_time = false;
        }
        if let Some(threshold) = &self.threshold {
            config.relative_time_threshold =
                parse_threshold_hours(threshold).with_context(|| {
                    format!(
                        "invalid threshold {:?}: must be a positive number of hours",
                        threshold
                    )
                })?;
        }
        if self.no_real_time {
            config.real_time_updates = false;
        }
        Ok(config)
    }
}

#[derive(Serialize)]
struct ShownTimestamp<'a> {
    target: i64,
    now: i64,
    kind: &'static str,
    relative: bool,
    display: &'a str,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = stampkit_core::logging::init(&config.logging).ok();

    let zone = match &args.tz {
        Some(tz) => tz.parse::<Zone>().context("invalid --tz")?,
        None => config.locale.zone().context("invalid locale.timezone")?,
    };
    tracing::debug!(zone = %zone, "stampkit starting");

    let renderer = TimestampRenderer::with_system_clock(zone);

    match args.command {
        Command::Render { pattern, at } => {
            let at = at.unwrap_or_else(|| renderer.now_millis());
            println!("{}", renderer.render(&pattern, at));
        }
        Command::Preview { pattern, strict } => {
            let pattern = pattern.unwrap_or_else(|| config.timestamps.format.clone());
            let now = renderer.now_millis();
            let preview = if strict {
                renderer.formatters().try_render(&pattern, now)?
            } else {
                renderer.render(&pattern, now)
            };
            println!("Preview: {}", preview);
        }
        Command::Show {
            target,
            now,
            json,
            overrides,
        } => {
            let timestamps = overrides.apply(&config.timestamps)?;
            let now = now.unwrap_or_else(|| renderer.now_millis());
            let display = renderer.display_timestamp(now, target, &timestamps);

            if json {
                let kind = DisplayKind::classify(now, target, &timestamps);
                let shown = ShownTimestamp {
                    target,
                    now,
                    kind: kind.name(),
                    relative: kind.is_relative(),
                    display: &display,
                };
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                println!("{}", display);
            }
        }
        Command::Watch {
            target,
            interval_secs,
            ticks,
            flush,
            overrides,
        } => {
            let timestamps = overrides.apply(&config.timestamps)?;
            watch(renderer, timestamps, target, interval_secs, ticks, flush)?;
        }
        Command::Text { command, message } => {
            let command: TextCommand = command.parse()?;
            println!("{}", command.apply(&message.join(" ")));
        }
        Command::Commands => {
            for command in TextCommand::ALL {
                println!("/{:<10} {}", command.name(), command.description());
            }
        }
    }

    Ok(())
}

fn watch(
    renderer: TimestampRenderer,
    timestamps: TimestampConfig,
    target: i64,
    interval_secs: u64,
    ticks: Option<u64>,
    flush: bool,
) -> Result<()> {
    if interval_secs == 0 {
        anyhow::bail!("--interval-secs must be at least 1");
    }

    let mut refresh = RefreshLoop::new(
        Arc::new(renderer),
        timestamps,
        target,
        Duration::from_secs(interval_secs),
    )
    .flush_each_tick(flush);
    let stdout: Arc<dyn Observer> = Arc::new(StdoutObserver);
    refresh.subscribe(&stdout);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let ran = runtime.block_on(refresh.run(ticks));
    tracing::info!(ticks = ran, "Watch finished");

    Ok(())
}
