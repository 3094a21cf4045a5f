//! # Custodian configuration.
//!
//! Provides [`CustodianConfig`], the settings applied when a custodian is built.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`FailureBus`](crate::FailureBus)

use crate::emitter::EventEmitter;

/// Event names treated as unhandled-rejection signals.
pub const UNHANDLED_REJECTION_EVENTS: &[&str] = &["unhandledRejection", "unhandled_rejection"];

/// When a fallback `"error"` handler is installed.
///
/// The fallback writes failures to the custodian's
/// [`DiagnosticSink`](crate::DiagnosticSink) when nobody else listens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Never install a fallback; unheard failures are logged at `warn` and dropped.
    Disabled,
    /// Install only for a process-wide emitter and an unhandled-rejection style event.
    #[default]
    UnhandledRejection,
    /// Install whenever a failure would otherwise go unheard.
    Always,
}

impl FallbackPolicy {
    /// Decides, once, whether a custodian over (`emitter`, `event`) gets a fallback.
    pub fn is_fallback_eligible<A: 'static>(self, emitter: &EventEmitter<A>, event: &str) -> bool {
        match self {
            FallbackPolicy::Disabled => false,
            FallbackPolicy::Always => true,
            FallbackPolicy::UnhandledRejection => {
                emitter.is_process_wide() && is_rejection_event(event)
            }
        }
    }
}

/// True if `event` names an unhandled-rejection style signal.
pub fn is_rejection_event(event: &str) -> bool {
    UNHANDLED_REJECTION_EVENTS.contains(&event)
}

/// Settings for a [`Custodian`](crate::Custodian).
///
/// ## Field semantics
/// - `fallback`: when the fallback `"error"` handler is installed
/// - `bus_capacity`: ring size of the failure broadcast stream (min 1)
#[derive(Clone, Debug)]
pub struct CustodianConfig {
    /// Fallback reporter policy.
    pub fallback: FallbackPolicy,

    /// Capacity of the failure broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` failures observe
    /// `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl CustodianConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for CustodianConfig {
    /// Default configuration:
    ///
    /// - `fallback = FallbackPolicy::UnhandledRejection`
    /// - `bus_capacity = 256`
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::default(),
            bus_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_eligibility_needs_process_wide_emitter() {
        let process = EventEmitter::<u32>::process_wide();
        let local = EventEmitter::<u32>::new();
        let policy = FallbackPolicy::UnhandledRejection;

        assert!(policy.is_fallback_eligible(&process, "unhandledRejection"));
        assert!(!policy.is_fallback_eligible(&process, "tick"));
        assert!(!policy.is_fallback_eligible(&local, "unhandledRejection"));
    }

    #[test]
    fn test_forced_policies() {
        let local = EventEmitter::<u32>::new();
        assert!(FallbackPolicy::Always.is_fallback_eligible(&local, "tick"));
        assert!(
            !FallbackPolicy::Disabled
                .is_fallback_eligible(&EventEmitter::<u32>::process_wide(), "unhandledRejection")
        );
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let cfg = CustodianConfig {
            bus_capacity: 0,
            ..CustodianConfig::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
