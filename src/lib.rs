//! Captures every slide of a web presentation as a 1280x720 PNG.
//!
//! A [`RemoteDocument`] (normally [`chrome::ChromeDocument`]) is driven by the
//! [`navigator`] state machine; each slide goes through [`postprocess`] and
//! lands in `{out}/prezi-{n}.png`.

pub mod chrome;
pub mod config;
pub mod document;
pub mod error;
pub mod navigator;
pub mod postprocess;
pub mod session;
pub mod wait;

pub use config::{CaptureConfig, Selectors, Timings, Viewport};
pub use document::RemoteDocument;
pub use error::CaptureError;
pub use navigator::{capture_presentation, CaptureReport, Navigator, Termination};
pub use session::CaptureSession;
