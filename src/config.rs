use anyhow::{Context, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};

/// Width and height of the browser viewport, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 595,
            height: 842,
        }
    }
}

/// Wait budgets and settle delays used by the navigator.
///
/// The viewer offers no "transition finished" event, so every delay here is an
/// empirically tuned constant rather than a readiness signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    /// Budget for the initial page load.
    pub navigation_timeout: Duration,
    /// Best-effort wait for the cookie consent button.
    pub consent_timeout: Duration,
    /// Best-effort wait for the "present" launch button.
    pub present_timeout: Duration,
    /// Fatal wait for the fullscreen control, i.e. the viewer being interactive.
    pub viewer_timeout: Duration,
    /// Wait for the first "next" control after slide 0.
    pub next_timeout: Duration,
    /// Pause after entering fullscreen, before slide 0 is captured.
    pub fullscreen_settle: Duration,
    /// Pause after each advance, before the end-marker check and capture.
    pub slide_settle: Duration,
    pub poll_interval: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(180),
            consent_timeout: Duration::from_secs(5),
            present_timeout: Duration::from_secs(10),
            viewer_timeout: Duration::from_secs(30),
            next_timeout: Duration::from_secs(10),
            fullscreen_settle: Duration::from_millis(500),
            slide_settle: Duration::from_millis(1800),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// CSS selectors for the viewer controls the navigator looks for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub consent_accept: String,
    pub present: String,
    pub fullscreen: String,
    pub next: String,
    pub end_marker: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            consent_accept: "#onetrust-accept-btn-handler".into(),
            present: ".viewer-common-info-overlay-button-filled".into(),
            fullscreen: ".webgl-viewer-navbar-fullscreen-enter-icon".into(),
            next: ".webgl-viewer-navbar-next-icon".into(),
            end_marker: ".viewer-common-info-overlay-end-of-presentation".into(),
        }
    }
}

impl Selectors {
    /// Reads a JSON object of selector overrides. Keys that are absent keep
    /// their default value.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading selector file {}", path.display()))?;
        Self::from_json(&bytes)
            .with_context(|| format!("parsing selector file {}", path.display()))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Everything the navigator needs besides the document and the session.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub timings: Timings,
    pub selectors: Selectors,
    /// Identity sent with every request; defaults to a realistic desktop UA.
    pub user_agent: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timings: Timings::default(),
            selectors: Selectors::default(),
            user_agent: ua_generator::ua::spoof_ua().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let s = Selectors::from_json(br#"{"next": "button.next"}"#).unwrap();
        assert_eq!(s.next, "button.next");
        assert_eq!(s.fullscreen, Selectors::default().fullscreen);
        assert_eq!(s.end_marker, Selectors::default().end_marker);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Selectors::from_json(b"{not json").is_err());
    }

    #[test]
    fn viewer_wait_is_the_longest_ui_wait() {
        let t = Timings::default();
        assert!(t.viewer_timeout > t.present_timeout);
        assert!(t.present_timeout > t.consent_timeout);
        assert!(t.slide_settle > t.fullscreen_settle);
    }
}
