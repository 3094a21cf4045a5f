//! Custody core: interception, isolated dispatch and configuration.
//!
//! The public API from this module is [`Custodian`] and its builder/config.
//!
//! Internal modules:
//! - [`custodian`]: activation, deactivation and the interception routing table;
//! - [`dispatch`]: the dispatch handler, failure reporting and the fallback reporter;
//! - [`builder`]: assembles a custodian from config, sink and subscribers;
//! - [`config`]: fallback policy and failure stream settings.

mod builder;
mod config;
mod custodian;
mod dispatch;

pub use builder::CustodianBuilder;
pub use config::{
    CustodianConfig, FallbackPolicy, UNHANDLED_REJECTION_EVENTS, is_rejection_event,
};
pub use custodian::Custodian;
