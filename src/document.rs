use crate::config::Viewport;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// The presentation page as seen from the navigator.
///
/// The page is owned by the browser; the navigator only observes it through
/// selector queries and drives it with clicks and pointer moves. Implementors
/// must tolerate `close` being the last call made on them.
#[async_trait]
pub trait RemoteDocument: Send + Sync {
    /// Sizes the display surface to `viewport` at a device scale of 1.
    async fn set_viewport(&self, viewport: Viewport) -> Result<()>;

    /// Applies the user agent string used for every request of the page.
    async fn set_user_agent(&self, user_agent: &str) -> Result<()>;

    /// Loads `url` and waits for the navigation to finish.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Whether an element matching `selector` is currently in the DOM.
    async fn is_present(&self, selector: &str) -> Result<bool>;

    /// Clicks the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<()>;

    async fn move_pointer(&self, x: f64, y: f64) -> Result<()>;

    /// PNG capture of the visible viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Releases the browser. Later calls are no-ops.
    async fn close(&mut self) -> Result<()>;
}
