//! The capture state machine.
//!
//! Phases run in a fixed order and are never re-entered:
//! init, consent, present, viewer ready, fullscreen, first capture, then one
//! advance step per slide until the end marker shows up or the next control
//! disappears.

use crate::{
    config::CaptureConfig,
    document::RemoteDocument,
    error::CaptureError,
    postprocess,
    session::{CaptureSession, SlideArtifact},
    wait::{self, Elapsed},
};
use serde::Serialize;
use std::{path::PathBuf, time::Duration};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Top-left corner, outside the viewer's hover zones.
const NEUTRAL_POINTER: (f64, f64) = (0.0, 0.0);

/// Why the advance loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The viewer showed its end-of-presentation overlay.
    EndMarker,
    /// The last captured slide had no next control.
    NoNextControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    ConsentDismissal,
    PresentEntry,
    ViewerReady,
    FullscreenEnter,
    FirstCapture,
    Advance,
    Done(Termination),
}

#[derive(Debug, Clone)]
pub struct CaptureReport {
    /// Written files, in slide order; entry `n` is `prezi-{n}.png`.
    pub slides: Vec<PathBuf>,
    pub termination: Termination,
}

pub struct Navigator<'a, D: RemoteDocument + ?Sized> {
    doc: &'a D,
    session: CaptureSession,
    config: &'a CaptureConfig,
    captured: Vec<PathBuf>,
}

impl<'a, D: RemoteDocument + ?Sized> Navigator<'a, D> {
    pub fn new(doc: &'a D, session: CaptureSession, config: &'a CaptureConfig) -> Self {
        Self {
            doc,
            session,
            config,
            captured: Vec::new(),
        }
    }

    pub async fn run(mut self) -> Result<CaptureReport, CaptureError> {
        let mut phase = Phase::Init;
        loop {
            debug!(?phase, index = self.session.index(), "phase");
            phase = match phase {
                Phase::Init => {
                    self.init().await?;
                    Phase::ConsentDismissal
                }
                Phase::ConsentDismissal => {
                    let sel = &self.config.selectors.consent_accept;
                    let t = self.config.timings.consent_timeout;
                    self.click_if_shown(sel, t, "cookie consent").await;
                    Phase::PresentEntry
                }
                Phase::PresentEntry => {
                    let sel = &self.config.selectors.present;
                    let t = self.config.timings.present_timeout;
                    self.click_if_shown(sel, t, "present button").await;
                    Phase::ViewerReady
                }
                Phase::ViewerReady => {
                    self.await_viewer().await?;
                    Phase::FullscreenEnter
                }
                Phase::FullscreenEnter => {
                    self.doc.click(&self.config.selectors.fullscreen).await?;
                    info!("entered fullscreen");
                    Phase::FirstCapture
                }
                Phase::FirstCapture => self.first_capture().await?,
                Phase::Advance => self.advance().await?,
                Phase::Done(termination) => {
                    info!(slides = self.captured.len(), ?termination, "capture finished");
                    return Ok(CaptureReport {
                        slides: self.captured,
                        termination,
                    });
                }
            };
        }
    }

    async fn init(&self) -> Result<(), CaptureError> {
        let viewport = self.session.viewport();
        info!(
            width = viewport.width,
            height = viewport.height,
            "configuring page"
        );
        self.doc
            .set_viewport(viewport)
            .await
            .map_err(CaptureError::Setup)?;
        self.doc
            .set_user_agent(&self.config.user_agent)
            .await
            .map_err(CaptureError::Setup)?;

        let url = self.session.url();
        info!(url, "opening presentation");
        self.doc
            .navigate(url, self.config.timings.navigation_timeout)
            .await
            .map_err(|source| CaptureError::Navigation {
                url: url.to_string(),
                source,
            })
    }

    /// Clicks `selector` if it appears within `timeout`. Never fails the run.
    async fn click_if_shown(&self, selector: &str, timeout: Duration, what: &str) {
        let interval = self.config.timings.poll_interval;
        match wait::await_optional(self.doc, selector, timeout, interval).await {
            Ok(true) => match self.doc.click(selector).await {
                Ok(()) => info!("{what} clicked"),
                Err(e) => warn!(error = %e, "{what} shown but click failed"),
            },
            Ok(false) => info!("no {what} within {timeout:?}, continuing"),
            Err(e) => warn!(error = %e, "lookup of {what} failed, continuing"),
        }
    }

    async fn await_viewer(&self) -> Result<(), CaptureError> {
        let t = &self.config.timings;
        let sel = &self.config.selectors.fullscreen;
        match wait::await_required(self.doc, sel, t.viewer_timeout, t.poll_interval).await? {
            Ok(()) => {
                info!("viewer ready");
                Ok(())
            }
            Err(Elapsed(after)) => {
                error!(?after, "viewer never became interactive");
                Err(CaptureError::ViewerNotReady(after))
            }
        }
    }

    async fn first_capture(&mut self) -> Result<Phase, CaptureError> {
        let config = self.config;
        let t = &config.timings;
        sleep(t.fullscreen_settle).await;
        self.capture().await?;
        self.park_pointer().await?;

        let next = &config.selectors.next;
        if !wait::await_optional(self.doc, next, t.next_timeout, t.poll_interval).await? {
            info!("no next control after the first slide");
            return Ok(Phase::Done(Termination::NoNextControl));
        }
        self.doc.click(next).await?;
        Ok(Phase::Advance)
    }

    async fn advance(&mut self) -> Result<Phase, CaptureError> {
        let config = self.config;
        let index = self.session.advance();
        sleep(config.timings.slide_settle).await;

        if self.doc.is_present(&config.selectors.end_marker).await? {
            info!(index, "end of presentation reached");
            return Ok(Phase::Done(Termination::EndMarker));
        }

        self.capture().await?;
        self.park_pointer().await?;

        let next = &config.selectors.next;
        if !self.doc.is_present(next).await? {
            info!(index, "next control gone, treating slide as last");
            return Ok(Phase::Done(Termination::NoNextControl));
        }
        self.doc.click(next).await?;
        Ok(Phase::Advance)
    }

    async fn capture(&mut self) -> Result<(), CaptureError> {
        let index = self.session.index();
        debug_assert_eq!(self.captured.len(), index);

        let artifact = SlideArtifact {
            index,
            path: self.session.slide_path(index),
            raw: self.doc.screenshot().await?,
        };
        postprocess::write_slide(&artifact.raw, &artifact.path).map_err(|source| {
            CaptureError::Postprocess {
                index: artifact.index,
                path: artifact.path.clone(),
                source,
            }
        })?;
        info!(index, path = %artifact.path.display(), "slide saved");
        self.captured.push(artifact.path);
        Ok(())
    }

    async fn park_pointer(&self) -> Result<(), CaptureError> {
        let (x, y) = NEUTRAL_POINTER;
        self.doc.move_pointer(x, y).await?;
        Ok(())
    }
}

/// Runs the state machine against `doc`, then closes it exactly once,
/// whatever the outcome.
pub async fn capture_presentation<D: RemoteDocument>(
    doc: &mut D,
    session: CaptureSession,
    config: &CaptureConfig,
) -> Result<CaptureReport, CaptureError> {
    let result = Navigator::new(&*doc, session, config).run().await;
    if let Err(e) = doc.close().await {
        warn!(error = %e, "failed to close browser");
    }
    result
}
