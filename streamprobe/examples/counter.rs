//! Counter Example
//!
//! A small view model exposes its state as a [`LiveValue`] and is tested
//! through probes, the way a UI test would observe it.
//!
//! # Key Concepts Demonstrated
//!
//! ## 1. Late vs. Early Probes
//!
//! A probe attached before the counter changes records every value. A probe
//! attached afterwards only starts from the latest one.
//!
//! ## 2. Lifecycle Gating
//!
//! A probe attached through a [`LifecycleGate`] stops receiving values while
//! the gate is stopped and catches up with the latest value when it starts
//! again.
//!
//! ## 3. Waiting for Background Work
//!
//! Clicks from another thread are awaited with a bounded timeout instead
//! of a sleep.

use std::{thread, time::Duration};

use streamprobe::*;

/// Holds a non-negative counter driven by plus and minus buttons.
struct CounterViewModel {
    counter: LiveValue<u32>,
}

impl CounterViewModel {
    fn new() -> Self {
        Self {
            counter: LiveValue::with_value(0),
        }
    }

    fn counter(&self) -> &LiveValue<u32> {
        &self.counter
    }

    fn plus_clicked(&self) {
        self.counter.update(|v| v.copied().unwrap_or(0) + 1);
    }

    /// Never goes below zero.
    fn minus_clicked(&self) {
        self.counter
            .update(|v| v.copied().unwrap_or(0).saturating_sub(1));
    }
}

fn main() -> Result {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let model = CounterViewModel::new();
    let probe = model.counter().probe();

    model.plus_clicked();
    model.plus_clicked();
    model.minus_clicked();
    model.minus_clicked();
    model.minus_clicked();

    probe
        .assert_value(&0)
        .assert_history_size(6)
        .assert_never(|v| *v > 2);
    println!("history: {:?}", probe.value_history());

    // Attached late, sees only the current value
    model.counter().probe().assert_history_size(1).assert_value(&0);

    let gate = LifecycleGate::resumed();
    let screen = ValueProbe::attach_gated(model.counter(), &gate);
    gate.pause()?.stop()?;
    model.plus_clicked();
    model.plus_clicked();
    screen.assert_value(&0);
    gate.start()?;
    screen.assert_value(&2).assert_history_size(2);
    println!("gated history: {:?}", screen.value_history());

    let clicker = model.counter().clone();
    let handle = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        clicker.update(|v| v.copied().unwrap_or(0) + 1);
    });
    probe
        .await_next_value_within(Duration::from_secs(2))?
        .assert_value(&3);
    handle.join().expect("clicker thread panicked");

    // Destroying the gate drops the screen's subscription
    gate.move_to(LifecycleState::Destroyed)?;
    probe.dispose();
    assert!(!model.counter().has_observers());
    Ok(())
}
