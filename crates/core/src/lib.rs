// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod command;
mod error;
mod lifecycle;
mod observer;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use command::Command;
pub use error::CoreError;
pub use lifecycle::LifecycleHandler;
pub use observer::{LifecycleObserver, TracingObserver};
pub use state::{MetricsRecalculation, TransitionAction, TransitionResult};
