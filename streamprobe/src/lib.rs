#![cfg_attr(docsrs, feature(doc_cfg))]
//! # Streamprobe
//!
//! Recording probes for observable value streams.
//!
//! A [`ValueProbe`] subscribes to a [`Source`], records every value it
//! delivers, and lets a test assert on the latest value or the whole
//! history. Waits block (or `.await`) until a value arrives, with a bounded
//! timeout, so values published from other threads can be tested without
//! sleeps.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use streamprobe::*;
//!
//! let count = LiveValue::<i32>::new();
//! let probe = count.probe();
//!
//! let worker = count.clone();
//! std::thread::spawn(move || worker.update(|v| v.copied().unwrap_or(0) + 1));
//!
//! probe
//!     .await_value_within(Duration::from_secs(5))?
//!     .assert_value(&1)
//!     .assert_history_size(1)
//!     .assert_never(|v| *v < 0);
//!
//! probe.dispose();
//! assert!(!count.has_observers());
//! # Ok::<(), streamprobe::Error>(())
//! ```
//!
//! ## Core Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ValueProbe`] | Records a source's values and asserts on them |
//! | [`Source`] | Contract for observable value streams a probe can attach to |
//! | [`LiveValue`] | Thread-safe observable holding the latest value |
//! | [`LifecycleGate`] | Controllable lifecycle that gates delivery to subscribers |
//! | [`LifecycleState`] | States of a gate, ordered from `Destroyed` to `Resumed` |
//! | [`ProbeConfig`] | Per-probe settings such as the default wait timeout |
//!
//! ## Lifecycle Gating
//!
//! Subscribers attached through a [`LifecycleGate`] only receive values while
//! the gate is started or resumed. When the gate becomes active again they
//! receive the latest value once:
//!
//! ```rust
//! use streamprobe::*;
//!
//! let live = LiveValue::new();
//! let gate = LifecycleGate::resumed();
//! let probe = ValueProbe::attach_gated(&live, &gate);
//!
//! live.set("a");
//! gate.pause()?.stop()?;
//! live.set("b");
//! live.set("c");
//! gate.start()?;
//!
//! assert_eq!(probe.value_history(), vec!["a", "c"]);
//! # Ok::<(), streamprobe::Error>(())
//! ```
//!
//! ## Features
//!
//! - **`async`** (default) - `expect_value()` / `expect_next_value()` awaitable waits on Tokio
//! - **`serde`** - JSON export of the history (`ValueProbe::history_json()`) and serde derives
//!
//! ## Examples
//!
//! - `counter.rs` - A counter view model tested through probes

mod config;
mod error;
mod lifecycle_gate;
mod lifecycle_state;
mod live_value;
mod source;
mod value_probe;

#[cfg(feature = "async")]
mod expectation;

mod internal;

pub use config::ProbeConfig;
pub use error::Error;
pub use lifecycle_gate::{LifecycleGate, Listener, ListenerId};
pub use lifecycle_state::{LifecycleEvent, LifecycleState};
pub use live_value::LiveValue;
pub use source::{Observer, Source, SourceExt, SubscriptionId};
pub use value_probe::ValueProbe;

#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub use expectation::Expectation;

/// Convenience alias for `Result<T, streamprobe::Error>`.
pub type Result<T = ()> = std::result::Result<T, Error>;
