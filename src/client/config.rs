//! Host-side bridge configuration.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use sdk_bridge::BridgeConfig;
//!
//! # fn example() -> sdk_bridge::Result<()> {
//! let config = BridgeConfig::builder()
//!     .sdk_url("https://sandbox.example.com/sdk.js")
//!     .on_sdk_ready(|methods| println!("SDK ready: {methods:?}"))
//!     .on_error(|err| eprintln!("bridge error: {err}"))
//!     .call_timeout(Duration::from_secs(45))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

use super::style::WebViewStyle;

// ============================================================================
// Constants
// ============================================================================

/// Vendor SDK sandbox script loaded when no URL is configured.
pub const DEFAULT_SDK_URL: &str = "https://sandbox.src.mastercard.com/srci/integration/2/lib.js";

/// Trusted origin the bootstrap page is served under.
pub const DEFAULT_BASE_URL: &str = "https://src.mastercard.com/";

/// Time a call waits for its response.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Callback Types
// ============================================================================

/// Readiness callback. Receives the announced method names.
pub type ReadyCallback = Arc<dyn Fn(Vec<String>) + Send + Sync>;

/// Channel and protocol error callback.
pub type ErrorCallback = Arc<dyn Fn(Error) + Send + Sync>;

// ============================================================================
// BridgeConfig
// ============================================================================

/// Validated host-side settings.
#[derive(Clone)]
pub struct BridgeConfig {
    sdk_url: Url,
    base_url: Url,
    on_sdk_ready: Option<ReadyCallback>,
    on_error: Option<ErrorCallback>,
    style: WebViewStyle,
    call_timeout: Duration,
}

impl BridgeConfig {
    /// Starts a builder.
    #[inline]
    #[must_use]
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::new()
    }

    /// Vendor SDK script URL.
    #[inline]
    #[must_use]
    pub fn sdk_url(&self) -> &Url {
        &self.sdk_url
    }

    /// Origin of the bootstrap page.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Web view placement.
    #[inline]
    #[must_use]
    pub fn style(&self) -> &WebViewStyle {
        &self.style
    }

    /// Per-call response timeout.
    #[inline]
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    pub(crate) fn on_sdk_ready(&self) -> Option<&ReadyCallback> {
        self.on_sdk_ready.as_ref()
    }

    pub(crate) fn on_error(&self) -> Option<&ErrorCallback> {
        self.on_error.as_ref()
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("sdk_url", &self.sdk_url.as_str())
            .field("base_url", &self.base_url.as_str())
            .field("on_sdk_ready", &self.on_sdk_ready.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("style", &self.style)
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

// ============================================================================
// BridgeConfigBuilder
// ============================================================================

/// Builder for [`BridgeConfig`].
#[derive(Default)]
pub struct BridgeConfigBuilder {
    sdk_url: Option<String>,
    base_url: Option<String>,
    on_sdk_ready: Option<ReadyCallback>,
    on_error: Option<ErrorCallback>,
    style: Option<WebViewStyle>,
    call_timeout: Option<Duration>,
}

impl BridgeConfigBuilder {
    /// Creates a builder with nothing overridden.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the vendor SDK script URL.
    #[inline]
    #[must_use]
    pub fn sdk_url(mut self, url: impl Into<String>) -> Self {
        self.sdk_url = Some(url.into());
        self
    }

    /// Overrides the trusted origin of the bootstrap page.
    #[inline]
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the readiness callback.
    #[inline]
    #[must_use]
    pub fn on_sdk_ready(mut self, callback: impl Fn(Vec<String>) + Send + Sync + 'static) -> Self {
        self.on_sdk_ready = Some(Arc::new(callback));
        self
    }

    /// Sets the channel/protocol error callback.
    #[inline]
    #[must_use]
    pub fn on_error(mut self, callback: impl Fn(Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Overrides the web view placement.
    #[inline]
    #[must_use]
    pub fn style(mut self, style: WebViewStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Overrides the per-call timeout.
    #[inline]
    #[must_use]
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a URL does not parse or is not http(s)
    /// - [`Error::Config`] if the call timeout is zero
    pub fn build(self) -> Result<BridgeConfig> {
        let sdk_url = parse_web_url(
            "sdk_url",
            self.sdk_url.as_deref().unwrap_or(DEFAULT_SDK_URL),
        )?;
        let base_url = parse_web_url(
            "base_url",
            self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
        )?;

        let call_timeout = self.call_timeout.unwrap_or(DEFAULT_CALL_TIMEOUT);
        if call_timeout.is_zero() {
            return Err(Error::config("call_timeout must be greater than zero"));
        }

        Ok(BridgeConfig {
            sdk_url,
            base_url,
            on_sdk_ready: self.on_sdk_ready,
            on_error: self.on_error,
            style: self.style.unwrap_or_default(),
            call_timeout,
        })
    }
}

/// Parses an http(s) URL.
fn parse_web_url(field: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::config(format!("{field} {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::config(format!(
            "{field} must be http or https, got {scheme}"
        ))),
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
        let config = BridgeConfig::builder().build().expect("defaults are valid");
        assert_eq!(config.sdk_url().as_str(), DEFAULT_SDK_URL);
        assert_eq!(config.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.call_timeout(), Duration::from_secs(30));
        assert!(config.style().is_hidden());
        assert!(config.on_sdk_ready().is_none());
        assert!(config.on_error().is_none());
    }

    #[test]
    fn test_overrides() {
        let config = BridgeConfig::builder()
            .sdk_url("https://cdn.example.com/sdk.js")
            .style(WebViewStyle::visible(100.0, 100.0))
            .call_timeout(Duration::from_secs(5))
            .on_sdk_ready(|_| {})
            .build()
            .expect("valid");
        assert_eq!(config.sdk_url().host_str(), Some("cdn.example.com"));
        assert!(!config.style().is_hidden());
        assert_eq!(config.call_timeout(), Duration::from_secs(5));
        assert!(config.on_sdk_ready().is_some());
    }

    #[test]
    fn test_invalid_url() {
        let err = BridgeConfig::builder()
            .sdk_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_non_web_scheme() {
        let err = BridgeConfig::builder()
            .base_url("file:///etc/passwd")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = BridgeConfig::builder()
            .call_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_debug_hides_callbacks() {
        let config = BridgeConfig::builder().on_error(|_| {}).build().expect("valid");
        let debug = format!("{config:?}");
        assert!(debug.contains("on_error: true"));
    }
}
