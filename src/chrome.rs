use crate::{config::Viewport, document::RemoteDocument};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use headless_chrome::{
    browser::tab::point::Point, protocol::cdp::Page::CaptureScreenshotFormatOption,
    types::Bounds, Browser, LaunchOptionsBuilder, Tab,
};
use std::{
    ffi::{OsStr, OsString},
    sync::Arc,
    time::Duration,
};
use tracing::{debug, info};

/// How the Chrome process is started.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub viewport: Viewport,
    pub headful: bool,
    /// Upper bound on browser silence before headless_chrome drops the
    /// connection. Must outlast the slowest navigation.
    pub idle_timeout: Duration,
}

/// A single Chrome tab driven over the DevTools protocol.
///
/// headless_chrome is blocking, so every call is moved onto tokio's blocking
/// pool. Dropping the value kills the browser process.
pub struct ChromeDocument {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl ChromeDocument {
    pub fn launch(cfg: &LaunchConfig) -> Result<Self> {
        let arg_vec: Vec<OsString> = vec![
            OsString::from("--disable-gpu"),
            OsString::from("--disable-dev-shm-usage"),
            OsString::from("--disable-setuid-sandbox"),
            OsString::from("--no-first-run"),
            OsString::from("--no-default-browser-check"),
            OsString::from("--hide-scrollbars"),
            OsString::from("--force-device-scale-factor=1"),
        ];

        let launch_opts = LaunchOptionsBuilder::default()
            .headless(!cfg.headful)
            .sandbox(false)
            .window_size(Some((cfg.viewport.width, cfg.viewport.height)))
            .idle_browser_timeout(cfg.idle_timeout)
            .args(
                arg_vec
                    .iter()
                    .map(|s| s.as_os_str())
                    .collect::<Vec<&OsStr>>(),
            )
            .build()
            .map_err(|e| anyhow!("invalid launch options: {e}"))?;

        let browser = Browser::new(launch_opts).context("launching chrome")?;
        let tab = browser.new_tab().context("opening tab")?;
        info!(
            width = cfg.viewport.width,
            height = cfg.viewport.height,
            headful = cfg.headful,
            "browser launched"
        );

        Ok(Self {
            browser: Some(browser),
            tab,
        })
    }

    async fn with_tab<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> Result<T> + Send + 'static,
    {
        if self.browser.is_none() {
            return Err(anyhow!("browser already closed"));
        }
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || f(&tab))
            .await
            .context("browser task panicked")?
    }
}

#[async_trait]
impl RemoteDocument for ChromeDocument {
    async fn set_viewport(&self, viewport: Viewport) -> Result<()> {
        self.with_tab(move |tab| {
            tab.set_bounds(Bounds::Normal {
                left: Some(0),
                top: Some(0),
                width: Some(f64::from(viewport.width)),
                height: Some(f64::from(viewport.height)),
            })?;
            Ok(())
        })
        .await
    }

    async fn set_user_agent(&self, user_agent: &str) -> Result<()> {
        let ua = user_agent.to_string();
        self.with_tab(move |tab| {
            tab.set_user_agent(&ua, None, None)?;
            Ok(())
        })
        .await
    }

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let url = url.to_string();
        self.with_tab(move |tab| {
            tab.set_default_timeout(timeout);
            tab.navigate_to(&url)?;
            tab.wait_until_navigated()?;
            Ok(())
        })
        .await
    }

    async fn is_present(&self, selector: &str) -> Result<bool> {
        let js = format!(
            "document.querySelector({}) !== null",
            serde_json::to_string(selector)?
        );
        self.with_tab(move |tab| {
            let found = tab
                .evaluate(&js, false)?
                .value
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            Ok(found)
        })
        .await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let selector = selector.to_string();
        self.with_tab(move |tab| {
            tab.find_element(&selector)
                .with_context(|| format!("element {selector} vanished before click"))?
                .click()?;
            Ok(())
        })
        .await
    }

    async fn move_pointer(&self, x: f64, y: f64) -> Result<()> {
        self.with_tab(move |tab| {
            tab.move_mouse_to_point(Point { x, y })?;
            Ok(())
        })
        .await
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.with_tab(|tab| {
            let png = tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)?;
            Ok(png)
        })
        .await
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(browser) = self.browser.take() {
            debug!("closing browser");
            drop(browser);
            info!("browser closed");
        }
        Ok(())
    }
}
