//! Periodic re-rendering of a displayed timestamp.
//!
//! The loop belongs to the UI layer: it asks the renderer for a fresh display
//! every interval and hands the result to whoever is still watching. Observers
//! are held weakly and dropped from the list once their owner goes away.

use std::sync::{Arc, Weak};
use std::time::Duration;

use stampkit_core::{TimestampConfig, TimestampRenderer};
use tokio::time::MissedTickBehavior;

/// Something that shows a rendered timestamp.
pub trait Observer: Send + Sync {
    fn refresh(&self, rendered: &str);
}

/// Prints every refresh on its own line.
pub struct StdoutObserver;

impl Observer for StdoutObserver {
    fn refresh(&self, rendered: &str) {
        println!("{}", rendered);
    }
}

pub struct RefreshLoop {
    renderer: Arc<TimestampRenderer>,
    config: TimestampConfig,
    target: i64,
    period: Duration,
    flush_each_tick: bool,
    observers: Vec<Weak<dyn Observer>>,
}

impl RefreshLoop {
    pub fn new(
        renderer: Arc<TimestampRenderer>,
        config: TimestampConfig,
        target: i64,
        period: Duration,
    ) -> Self {
        Self {
            renderer,
            config,
            target,
            period,
            flush_each_tick: false,
            observers: Vec::new(),
        }
    }

    /// Drop memoized relative labels before every render.
    pub fn flush_each_tick(mut self, flush: bool) -> Self {
        self.flush_each_tick = flush;
        self
    }

    pub fn subscribe(&mut self, observer: &Arc<dyn Observer>) {
        self.observers.push(Arc::downgrade(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Render once and notify live observers. Returns how many were notified.
    pub fn tick(&mut self) -> usize {
        if self.flush_each_tick {
            self.renderer.flush();
        }
        let rendered = self.renderer.display(self.target, &self.config);

        let mut notified = 0;
        self.observers.retain(|observer| match observer.upgrade() {
            Some(observer) => {
                observer.refresh(&rendered);
                notified += 1;
                true
            }
            None => false,
        });
        tracing::debug!(timestamp = self.target, notified, "Refreshed timestamp");
        notified
    }

    /// Tick every period until `ticks` have run, every observer is gone, or
    /// Ctrl-C is pressed. Returns the number of ticks run.
    pub async fn run(mut self, ticks: Option<u64>) -> u64 {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut done = 0;
        while ticks.map_or(true, |max| done < max) {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick();
                    done += 1;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Refresh loop interrupted");
                    break;
                }
            }

            if self.observers.is_empty() {
                tracing::info!("No observers left, stopping refresh loop");
                break;
            }
        }
        done
    }
}
