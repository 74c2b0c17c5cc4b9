//! Embedded-side configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use sdk_bridge::server::ServerConfig;
//! use sdk_bridge::transport::Platform;
//!
//! let config = ServerConfig::new()
//!     .with_platform(Platform::Android)
//!     .with_poll_interval(Duration::from_millis(250))
//!     .with_max_attempts(40);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::transport::{EventSource, Platform};

// ============================================================================
// Constants
// ============================================================================

/// Delay between vendor discovery probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Maximum number of discovery probes.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

// ============================================================================
// ServerConfig
// ============================================================================

/// Bridge server settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Delay between discovery probes.
    pub poll_interval: Duration,

    /// Maximum number of discovery probes. Never below 1.
    pub max_attempts: u32,

    /// The single inbound event source that is listened to.
    pub event_source: EventSource,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerConfig {
    /// Default settings for the current platform.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            event_source: EventSource::for_platform(Platform::current()),
        }
    }

    /// Sets the discovery poll interval.
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the discovery attempt bound. Zero is raised to one.
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Selects the event source authoritative for `platform`.
    #[inline]
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.event_source = EventSource::for_platform(platform);
        self
    }

    /// Selects the inbound event source explicitly.
    #[inline]
    #[must_use]
    pub fn with_event_source(mut self, source: EventSource) -> Self {
        self.event_source = source;
        self
    }

    /// Upper bound of time spent searching for the vendor service.
    #[inline]
    #[must_use]
    pub fn discovery_window(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.max_attempts, 20);
        assert_eq!(config.discovery_window(), Duration::from_secs(10));
    }

    #[test]
    fn test_zero_attempts_raised() {
        assert_eq!(ServerConfig::new().with_max_attempts(0).max_attempts, 1);
    }

    #[test]
    fn test_platform_selection() {
        let config = ServerConfig::new().with_platform(Platform::Android);
        assert_eq!(config.event_source, EventSource::Document);

        let config = config.with_event_source(EventSource::Window);
        assert_eq!(config.event_source, EventSource::Window);
    }
}
