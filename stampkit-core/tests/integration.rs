//! Integration tests for stampkit-core
//!
//! These drive the public API end to end: settings feed a config, a renderer
//! with a manual clock displays timestamps, and the transforms run as commands.

use stampkit_core::config::TimestampConfig;
use stampkit_core::format::{HOUR_MS, MINUTE_MS};
use stampkit_core::transform::{mock, owoify, reverse};
use stampkit_core::{
    relative_label, Config, ManualClock, SettingsStore, TextCommand, TimestampRenderer, Zone,
    DEFAULT_FORMAT,
};
use std::sync::Arc;
use std::thread;

// 2021-03-04T05:06:07.089Z
const TARGET: i64 = 1_614_834_367_089;
const HOUR: i64 = HOUR_MS as i64;
const MINUTE: i64 = MINUTE_MS as i64;

fn renderer_at(now: i64) -> (TimestampRenderer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(now));
    (TimestampRenderer::new(Zone::Utc, clock.clone()), clock)
}

// ============================================
// Rendering
// ============================================

#[test]
fn test_render_in_fixed_zone() {
    let clock = Arc::new(ManualClock::new(TARGET));
    let zone: Zone = "+02:00".parse().unwrap();
    let renderer = TimestampRenderer::new(zone, clock);

    assert_eq!(
        renderer.render("yyyy-MM-dd'T'HH:mm:ss.SSSXXX", TARGET),
        "2021-03-04T07:06:07.089+02:00"
    );
}

#[test]
fn test_malformed_patterns_render_default() {
    let (renderer, _) = renderer_at(TARGET);
    let expected = renderer.render(DEFAULT_FORMAT, TARGET);

    for pattern in ["qq", "HH:mm 'x", "yyyy-MM-dd bbb", "Today is EEEE"] {
        assert_eq!(renderer.render(pattern, TARGET), expected, "{pattern}");
    }
}

#[test]
fn test_relative_label_table() {
    assert_eq!(relative_label(59_000), "Just now");
    assert_eq!(relative_label(60_000), "1m ago");
    assert_eq!(relative_label(3_600_000), "1h ago");
    assert_eq!(relative_label(86_400_000), "1d ago");
    assert_eq!(relative_label(604_800_000), "1w ago");
}

// ============================================
// Display decisions
// ============================================

#[test]
fn test_settings_drive_display() {
    let (renderer, clock) = renderer_at(TARGET + 3 * HOUR);

    let mut settings = SettingsStore::new();
    settings.set_string(TimestampConfig::FORMAT_KEY, "HH:mm");
    settings.set_int(TimestampConfig::THRESHOLD_KEY, 2);

    let config = TimestampConfig::from_settings(&settings);
    assert_eq!(renderer.display(TARGET, &config), "05:06");

    // The host flips the threshold; the next read picks it up
    settings.set_int(TimestampConfig::THRESHOLD_KEY, 48);
    let config = TimestampConfig::from_settings(&settings);
    assert_eq!(renderer.display(TARGET, &config), "3h ago");

    settings.set_bool(TimestampConfig::USE_RELATIVE_TIME_KEY, false);
    let config = TimestampConfig::from_settings(&settings);
    clock.advance(MINUTE);
    assert_eq!(renderer.display(TARGET, &config), "05:06");
}

#[test]
fn test_real_time_label_moves_with_clock() {
    let (renderer, clock) = renderer_at(TARGET + 30_000);
    let config = TimestampConfig::default();

    let first = renderer.display(TARGET, &config);
    clock.advance(31_000);
    let second = renderer.display(TARGET, &config);

    assert_eq!(first, "Just now");
    assert_eq!(second, "1m ago");
}

#[test]
fn test_cached_label_within_sweep_window() {
    let (renderer, clock) = renderer_at(TARGET + 30_000);
    let config = TimestampConfig {
        real_time_updates: false,
        ..Default::default()
    };

    let first = renderer.display(TARGET, &config);
    for _ in 0..5 {
        clock.advance(10 * MINUTE);
        assert_eq!(renderer.display(TARGET, &config), first);
    }
}

#[test]
fn test_future_messages_never_relative() {
    let (renderer, _) = renderer_at(TARGET);
    let config = Config::default().timestamps;
    for ahead in [1, MINUTE, HOUR, 30 * 24 * HOUR] {
        let shown = renderer.display(TARGET + ahead, &config);
        assert!(!shown.ends_with("ago"), "{shown}");
        assert_ne!(shown, "Just now");
    }
}

#[test]
fn test_concurrent_display() {
    let (renderer, _) = renderer_at(TARGET + 2 * HOUR);
    let renderer = Arc::new(renderer);
    let config = Arc::new(TimestampConfig::default());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let renderer = Arc::clone(&renderer);
            let config = Arc::clone(&config);
            thread::spawn(move || {
                (0..100)
                    .map(|n| {
                        let target = TARGET - (i * 100 + n) * MINUTE;
                        renderer.display(target, &config)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        let labels = handle.join().unwrap();
        assert!(labels.iter().all(|label| label.ends_with("h ago")));
    }
    assert_eq!(renderer.relative_cache().len(), 400);
}

// ============================================
// Text commands
// ============================================

#[test]
fn test_transforms() {
    assert_eq!(owoify("Hello World"), "Hewwu Wuwwd");
    assert_eq!(mock("hello"), "hElLo");
    assert_eq!(reverse("abc"), "cba");
}

#[test]
fn test_commands_by_name() {
    let lenny: TextCommand = "lenny".parse().unwrap();
    assert_eq!(lenny.apply("ok"), "ok ( ͡° ͜ʖ ͡°)");

    let upper: TextCommand = "upper".parse().unwrap();
    assert_eq!(upper.apply("  quiet please "), "QUIET PLEASE");

    let emoji: TextCommand = "emoji".parse().unwrap();
    assert_eq!(emoji.apply("gg <:pog:1234>"), "gg :pog:");
}
