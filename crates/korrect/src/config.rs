//! Overlay configuration.
//!
//! Settings can be built in code or read from a TOML file. Missing keys take
//! their defaults:
//!
//! ```
//! use korrect::OverlayConfig;
//!
//! let config = OverlayConfig::from_toml_str(r#"
//! hide_spinner = true
//! text_debounce_ms = 250
//! "#).unwrap();
//!
//! assert!(config.hide_spinner);
//! assert_eq!(config.text_debounce_ms, 250);
//! assert_eq!(config.resize_debounce_ms, 500);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::OverlayResult;

/// Tunable behaviour of one overlay instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Never show the loading indicator.
    pub hide_spinner: bool,
    /// Quiet interval after key-down/input before a lint is requested.
    pub text_debounce_ms: u64,
    /// Quiet interval after a resize before labels are re-derived.
    pub resize_debounce_ms: u64,
    /// Grace period before the popup hides once the pointer leaves.
    pub hide_delay_ms: u64,
    /// Horizontal shift of the popup relative to the hovered rectangle.
    pub popup_offset_x: f32,
    /// Popup width in pixels.
    pub popup_width: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            hide_spinner: false,
            text_debounce_ms: 300,
            resize_debounce_ms: 500,
            hide_delay_ms: 50,
            popup_offset_x: -10.0,
            popup_width: 240.0,
        }
    }
}

impl OverlayConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> OverlayResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> OverlayResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn with_hide_spinner(mut self, hide: bool) -> Self {
        self.hide_spinner = hide;
        self
    }

    pub fn with_text_debounce(mut self, interval: Duration) -> Self {
        self.text_debounce_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_resize_debounce(mut self, interval: Duration) -> Self {
        self.resize_debounce_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_hide_delay(mut self, delay: Duration) -> Self {
        self.hide_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_popup_offset_x(mut self, offset: f32) -> Self {
        self.popup_offset_x = offset;
        self
    }

    pub fn with_popup_width(mut self, width: f32) -> Self {
        self.popup_width = width;
        self
    }

    pub fn text_debounce(&self) -> Duration {
        Duration::from_millis(self.text_debounce_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OverlayError;

    #[test]
    fn test_defaults() {
        let config = OverlayConfig::default();
        assert_eq!(config.text_debounce(), Duration::from_millis(300));
        assert_eq!(config.resize_debounce(), Duration::from_millis(500));
        assert_eq!(config.hide_delay(), Duration::from_millis(50));
        assert_eq!(config.popup_offset_x, -10.0);
    }

    #[test]
    fn test_builder() {
        let config = OverlayConfig::new()
            .with_hide_spinner(true)
            .with_text_debounce(Duration::from_millis(100))
            .with_popup_width(320.0);
        assert!(config.hide_spinner);
        assert_eq!(config.text_debounce_ms, 100);
        assert_eq!(config.popup_width, 320.0);
    }

    #[test]
    fn test_invalid_toml() {
        let result = OverlayConfig::from_toml_str("text_debounce_ms = \"soon\"");
        assert!(matches!(result, Err(OverlayError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("korrect.toml");
        std::fs::write(&path, "hide_delay_ms = 80\npopup_offset_x = 0.0\n").unwrap();

        let config = OverlayConfig::load(&path).unwrap();
        assert_eq!(config.hide_delay_ms, 80);
        assert_eq!(config.popup_offset_x, 0.0);

        let missing = OverlayConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(OverlayError::Io(_))));
    }
}
