// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless exit-intent session.
//!
//! Replay a short scripted visit against the in-memory host and print every
//! flag transition as it happens.
//!
//! Run:
//! - `cargo run -p understory_exit_intent --example headless_session`

use core::time::Duration;

use kurbo::{Point, Size};
use understory_exit_intent::headless::{HeadlessPlatform, MemoryStorage};
use understory_exit_intent::platform::{Event, Storage};
use understory_exit_intent::{Config, ConfigError, ExitIntent};

type Engine = ExitIntent<HeadlessPlatform, MemoryStorage>;

fn report(intent: &mut Engine, what: &str) {
    println!("[{:>5} ms] {what}", intent.platform().elapsed_millis());
    for change in intent.take_changes() {
        println!("           {:?} -> {}", change.flag, change.value);
    }
}

fn main() -> Result<(), ConfigError> {
    let config = Config::from_json(
        r#"{
            "repeatAfterDays": 3,
            "scrollPercentageToTrigger": 80,
            "handleScrollBars": true,
            "storageKey": "newsletter"
        }"#,
    )?;

    let platform = HeadlessPlatform::new(Size::new(1_280.0, 800.0))
        .with_epoch_millis(1_700_000_000_000)
        .with_document_height(4_000.0);
    let mut intent = ExitIntent::new(config.clone(), platform, MemoryStorage::new())?;

    intent.mounted();
    report(&mut intent, "mounted");

    // Read a bit, scrolling part of the way down.
    for offset in [400.0, 900.0, 1_500.0] {
        intent.platform_mut().set_scroll_offset(offset);
        intent.handle_event(&Event::Scroll);
        intent.advance_by(Duration::from_millis(120));
    }
    intent.advance_by(Duration::from_millis(500));
    report(&mut intent, "scrolled to 47%");

    // Drift toward the tab strip, then dart for it.
    for y in [420.0, 300.0, 180.0, 90.0, 20.0] {
        intent.handle_event(&Event::PointerMove {
            position: Point::new(640.0, y),
        });
        intent.advance_by(Duration::from_millis(16));
    }
    let signal = intent.last_signal();
    report(&mut intent, &format!("pointer exit: {signal:?}"));
    println!("           scroll locked: {}", intent.platform().is_scroll_locked());

    intent.close();
    report(&mut intent, "closed");

    let (_, storage) = intent.into_parts();
    println!(
        "stored: newsletter = {:?}",
        storage.get(&config.storage_key)
    );

    // A day later the cooldown still holds.
    let tomorrow = HeadlessPlatform::new(Size::new(1_280.0, 800.0))
        .with_epoch_millis(1_700_000_000_000 + 86_400_000);
    let mut next = ExitIntent::new(config, tomorrow, storage)?;
    next.mounted();
    println!("next day: phase = {:?}", next.phase());

    Ok(())
}
