//! # Async subscribers for listener failures.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! that fans failures out to subscribers on dedicated worker tasks.
//!
//! ## Architecture
//! ```text
//! Failure flow:
//!   dispatch ── report(failure) ──► "error" signal      (synchronous)
//!                                ├─► FailureBus          (broadcast)
//!                                └─► SubscriberSet ──► Subscribe::on_failure(&ListenerFailure)
//!                                                          │
//!                                                    ┌─────┴─────┬─────────┐
//!                                                    ▼           ▼         ▼
//!                                                 LogWriter    Metrics   Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;
