//! Bootstrap document for the embedded web view.
//!
//! The web view is loaded with a minimal HTML page whose only job is to
//! pull in the vendor SDK script. The page's base URL must be the vendor's
//! trusted origin, otherwise the SDK's origin checks reject it.
//!
//! # Load Flow
//!
//! 1. Host mounts the web view with [`BootstrapDocument::to_html`] and
//!    [`BootstrapDocument::base_url`]
//! 2. The `<script>` tag starts loading the vendor SDK asynchronously
//! 3. The bridge server's discovery loop notices the SDK object
//! 4. The server posts the ready announcement to the host

// ============================================================================
// Imports
// ============================================================================

use url::Url;

// ============================================================================
// BootstrapDocument
// ============================================================================

/// Minimal page that loads the vendor SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapDocument {
    sdk_url: Url,
    base_url: Url,
}

impl BootstrapDocument {
    /// Creates the document for an SDK script and trusted origin.
    #[inline]
    #[must_use]
    pub fn new(sdk_url: Url, base_url: Url) -> Self {
        Self { sdk_url, base_url }
    }

    /// Script URL loaded by the page.
    #[inline]
    #[must_use]
    pub fn sdk_url(&self) -> &Url {
        &self.sdk_url
    }

    /// Origin the page is served under.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Renders the page.
    #[must_use]
    pub fn to_html(&self) -> String {
        BOOTSTRAP_HTML_TEMPLATE
            .replace("$BASE_URL", &escape_attribute(self.base_url.as_str()))
            .replace("$SDK_URL", &escape_attribute(self.sdk_url.as_str()))
    }

    /// Renders the page as a `data:text/html,...` URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:text/html,{}", urlencoding::encode(&self.to_html()))
    }
}

/// Escapes a value for a double-quoted HTML attribute.
fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ============================================================================
// Constants
// ============================================================================

/// HTML template for the bootstrap page.
const BOOTSTRAP_HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<base href="$BASE_URL">
<script src="$SDK_URL"></script>
</head>
<body></body>
</html>
"#;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> BootstrapDocument {
        BootstrapDocument::new(
            Url::parse("https://sandbox.example.com/sdk.js?v=2&env=test").expect("url"),
            Url::parse("https://pay.example.com/").expect("url"),
        )
    }

    #[test]
    fn test_html_loads_script_under_base() {
        let html = document().to_html();
        assert!(html.contains(r#"<base href="https://pay.example.com/">"#));
        assert!(html.contains(
            r#"<script src="https://sandbox.example.com/sdk.js?v=2&amp;env=test"></script>"#
        ));
        assert!(!html.contains('$'));
    }

    #[test]
    fn test_data_uri_is_encoded() {
        let uri = document().to_data_uri();
        assert!(uri.starts_with("data:text/html,"));
        assert!(!uri.contains('<'));
        assert!(uri.contains("sandbox.example.com"));
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(escape_attribute(r#"a"b<c>&"#), "a&quot;b&lt;c&gt;&amp;");
    }
}
