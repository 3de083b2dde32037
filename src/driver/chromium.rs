//! Native browser backend using `chromiumoxide`.
//!
//! Single source of truth for:
//! * Finding a usable browser executable (Brave → Chrome → Chromium, cross-platform).
//! * Launching a headless session with stealth defaults.
//! * The [`BrowserDriver`] implementation the crawl engine runs over.
//!
//! Locators passed in by site strategies are CSS selectors.

use super::{BrowserDriver, DriverElement, DriverLauncher};
use crate::core::config::chrome_executable_override;
use crate::core::error::{CrawlError, DriverError};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::browser::BrowserConfig;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Element, Page};
use futures::StreamExt;
use rand::seq::IndexedRandom;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

const DESKTOP_USER_AGENTS: &[&str] = &[
    // Chrome 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 132 – macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36",
    // Chrome 131 – Linux
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Firefox 133 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    // Edge 132 – Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36 Edg/132.0.0.0",
];

/// Returns a randomly-chosen realistic desktop User-Agent string.
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    DESKTOP_USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(DESKTOP_USER_AGENTS[0])
}

/// Find a usable Chromium-family browser executable.
///
/// Resolution order:
/// 1. `CHROME_EXECUTABLE` env var (explicit override)
/// 2. PATH scan – finds package-manager installs on all platforms.
/// 3. OS-specific well-known install paths.
pub fn find_chrome_executable() -> Option<String> {
    if let Some(p) = chrome_executable_override() {
        return Some(p);
    }

    if let Ok(path_var) = std::env::var("PATH") {
        let candidates = [
            "brave-browser",
            "brave",
            "google-chrome",
            "chromium",
            "chromium-browser",
            "chrome",
        ];
        for dir in std::env::split_paths(&path_var) {
            for exe in candidates {
                let full = dir.join(exe);
                if full.exists() {
                    return Some(full.to_string_lossy().to_string());
                }
            }
        }
    }

    #[cfg(target_os = "macos")]
    {
        let candidates = [
            "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "linux")]
    {
        let candidates = [
            "/usr/bin/brave-browser",
            "/usr/bin/brave",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/google-chrome",
            "/usr/local/bin/chromium",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    #[cfg(target_os = "windows")]
    {
        let candidates = [
            r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe",
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        ];
        for c in candidates {
            if Path::new(c).exists() {
                return Some(c.to_string());
            }
        }
    }

    None
}

/// Build a `BrowserConfig` for headless operation with stealth defaults.
///
/// `--disable-blink-features=AutomationControlled` hides the
/// `navigator.webdriver` flag; the UA is drawn from `DESKTOP_USER_AGENTS`.
pub fn build_headless_config(exe: &str, width: u32, height: u32) -> Result<BrowserConfig> {
    let ua = random_user_agent();

    BrowserConfig::builder()
        .chrome_executable(exe)
        .viewport(Viewport {
            width,
            height,
            device_scale_factor: Some(1.0),
            emulating_mobile: false,
            is_landscape: true,
            has_touch: false,
        })
        .window_size(width, height)
        .arg("--disable-gpu")
        .arg("--no-sandbox") // often required in CI / restricted environments
        .arg("--disable-setuid-sandbox")
        .arg("--disable-dev-shm-usage") // avoids /dev/shm OOM in constrained environments
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--disable-sync")
        .arg("--disable-crash-reporter")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--hide-scrollbars")
        .arg("--mute-audio")
        .arg("--disable-blink-features=AutomationControlled")
        .arg(format!("--user-agent={}", ua))
        .build()
        .map_err(|e| anyhow!("Failed to build browser config: {}", e))
}

fn backend_err(e: impl std::fmt::Display) -> DriverError {
    DriverError::Backend(e.to_string())
}

// ── Element handle ───────────────────────────────────────────────────────────

struct ChromiumElement {
    inner: Element,
}

#[async_trait]
impl DriverElement for ChromiumElement {
    async fn text(&self) -> Result<String, DriverError> {
        let text = self.inner.inner_text().await.map_err(backend_err)?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        self.inner.attribute(name).await.map_err(backend_err)
    }

    async fn click(&self) -> Result<(), DriverError> {
        self.inner.click().await.map_err(backend_err)?;
        Ok(())
    }
}

// ── Driver ───────────────────────────────────────────────────────────────────

/// One live headless-browser session over a single page.
pub struct ChromiumDriver {
    browser: Mutex<Option<Browser>>,
    page: Page,
}

impl ChromiumDriver {
    /// Launch a fresh headless browser and open a blank page.
    pub async fn launch() -> Result<Arc<Self>> {
        let exe = find_chrome_executable().ok_or_else(|| {
            anyhow!(
                "No browser found. Install Brave, Chrome, or Chromium. \
                 Set CHROME_EXECUTABLE if installed in a non-standard location."
            )
        })?;

        info!("Launching headless browser: {}", exe);
        let config = build_headless_config(&exe, 1920, 1080)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| anyhow!("Failed to launch browser ({}): {}", exe, e))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("CDP handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| anyhow!("Failed to open page: {}", e))?;

        Ok(Arc::new(Self {
            browser: Mutex::new(Some(browser)),
            page,
        }))
    }

    async fn query_once(&self, locator: &str) -> Result<Vec<Arc<dyn DriverElement>>, DriverError> {
        match self.page.find_elements(locator).await {
            Ok(elements) => Ok(elements
                .into_iter()
                .map(|inner| Arc::new(ChromiumElement { inner }) as Arc<dyn DriverElement>)
                .collect()),
            // "not found" surfaces as an error in chromiumoxide; treat as empty.
            Err(_) => Ok(Vec::new()),
        }
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.page.goto(url).await.map_err(backend_err)?;
        self.page.wait_for_navigation().await.map_err(backend_err)?;
        Ok(())
    }

    async fn click(&self, locator: &str) -> Result<(), DriverError> {
        let el = self
            .find_element(locator, Duration::from_secs(10))
            .await?;
        el.click().await
    }

    async fn type_text(&self, locator: &str, text: &str) -> Result<(), DriverError> {
        let el = self
            .page
            .find_element(locator)
            .await
            .map_err(|_| DriverError::ElementMissing {
                locator: locator.to_string(),
            })?;
        el.click().await.map_err(backend_err)?;
        el.type_str(text).await.map_err(backend_err)?;
        Ok(())
    }

    async fn find_element(
        &self,
        locator: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn DriverElement>, DriverError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Ok(inner) = self.page.find_element(locator).await {
                return Ok(Arc::new(ChromiumElement { inner }));
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(DriverError::WaitTimeout {
                    locator: locator.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn find_elements(
        &self,
        locator: &str,
        timeout: Duration,
    ) -> Result<Vec<Arc<dyn DriverElement>>, DriverError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let found = self.query_once(locator).await?;
            if !found.is_empty() || tokio::time::Instant::now() >= deadline {
                return Ok(found);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn element_present(&self, locator: &str) -> bool {
        self.page.find_element(locator).await.is_ok()
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let url = self.page.url().await.map_err(backend_err)?;
        Ok(url.unwrap_or_default())
    }

    async fn scroll_to_bottom(&self) -> Result<(), DriverError> {
        self.page
            .evaluate("window.scrollTo({top: document.body.scrollHeight, behavior: 'smooth'});")
            .await
            .map_err(backend_err)?;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), DriverError> {
        self.page
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await
            .map_err(backend_err)?;
        Ok(())
    }

    async fn release(&self) {
        let mut guard = self.browser.lock().await;
        if let Some(mut browser) = guard.take() {
            if let Err(e) = browser.close().await {
                warn!("Browser close error (non-fatal): {}", e);
            } else {
                info!("Browser session released");
            }
        }
    }
}

/// Production launcher: a fresh headless Chromium per crawl session.
pub struct ChromiumLauncher;

#[async_trait]
impl DriverLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Arc<dyn BrowserDriver>, CrawlError> {
        ChromiumDriver::launch()
            .await
            .map(|d| d as Arc<dyn BrowserDriver>)
            .map_err(|e| CrawlError::SessionLaunch(e.to_string()))
    }
}
