//! Placement of the hidden web view.
//!
//! The vendor SDK needs a real web surface to run in but nothing on it is
//! shown to the user, so the default style is zero-size and invisible.

// ============================================================================
// Position
// ============================================================================

/// Layout mode of the web view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Position {
    /// Taken out of the layout flow.
    #[default]
    Absolute,
    /// Laid out in place.
    Relative,
}

impl Position {
    /// CSS keyword.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Relative => "relative",
        }
    }
}

// ============================================================================
// WebViewStyle
// ============================================================================

/// Visual placement of the web view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebViewStyle {
    /// Width in logical pixels.
    pub width: f32,
    /// Height in logical pixels.
    pub height: f32,
    /// Opacity from 0 to 1.
    pub opacity: f32,
    /// Layout mode.
    pub position: Position,
}

impl Default for WebViewStyle {
    fn default() -> Self {
        Self::hidden()
    }
}

impl WebViewStyle {
    /// Zero-size, invisible, out of flow.
    #[inline]
    #[must_use]
    pub const fn hidden() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            opacity: 0.0,
            position: Position::Absolute,
        }
    }

    /// Fully opaque view of the given size, laid out in place.
    ///
    /// Useful while debugging the vendor SDK.
    #[inline]
    #[must_use]
    pub const fn visible(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            opacity: 1.0,
            position: Position::Relative,
        }
    }

    /// Returns `true` if nothing of the view can be seen.
    #[inline]
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.opacity <= 0.0 || self.width <= 0.0 || self.height <= 0.0
    }

    /// Renders as an inline CSS declaration list.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!(
            "position: {}; width: {}px; height: {}px; opacity: {}",
            self.position.as_str(),
            self.width,
            self.height,
            self.opacity
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_hidden() {
        let style = WebViewStyle::default();
        assert!(style.is_hidden());
        assert_eq!(
            style.to_css(),
            "position: absolute; width: 0px; height: 0px; opacity: 0"
        );
    }

    #[test]
    fn test_visible() {
        let style = WebViewStyle::visible(320.0, 480.0);
        assert!(!style.is_hidden());
        assert_eq!(
            style.to_css(),
            "position: relative; width: 320px; height: 480px; opacity: 1"
        );
    }
}
