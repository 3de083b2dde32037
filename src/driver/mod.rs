//! Browser-driver capability seam.
//!
//! The crawl engine never talks to a browser backend directly; it goes
//! through [`BrowserDriver`] / [`DriverElement`] trait objects. Locators are
//! opaque strings owned by the site strategy. The production implementation
//! is [`chromium::ChromiumDriver`]; tests substitute a scripted mock.

pub mod chromium;

use crate::core::error::{CrawlError, DriverError};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// One element handle inside the current view.
#[async_trait]
pub trait DriverElement: Send + Sync {
    async fn text(&self) -> Result<String, DriverError>;
    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError>;
    async fn click(&self) -> Result<(), DriverError>;
}

/// The browser session underlying a crawl. Effectively single-threaded:
/// interacting calls (navigate/click/type) must never be issued concurrently
/// from two tasks — the challenge gate only observes (`element_present`)
/// while the crawl loop runs, and only interacts while the loop is paused.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn click(&self, locator: &str) -> Result<(), DriverError>;

    async fn type_text(&self, locator: &str, text: &str) -> Result<(), DriverError>;

    /// Find one element, polling up to `timeout`.
    async fn find_element(
        &self,
        locator: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn DriverElement>, DriverError>;

    /// Find all matching elements, polling up to `timeout` for at least one.
    /// An empty result after the timeout is not an error.
    async fn find_elements(
        &self,
        locator: &str,
        timeout: Duration,
    ) -> Result<Vec<Arc<dyn DriverElement>>, DriverError>;

    /// Instant presence probe — no waiting.
    async fn element_present(&self, locator: &str) -> bool;

    async fn current_url(&self) -> Result<String, DriverError>;

    /// Trigger incremental-load growth on sites that extend a single list.
    async fn scroll_to_bottom(&self) -> Result<(), DriverError>;

    async fn screenshot(&self, path: &Path) -> Result<(), DriverError>;

    /// Release the underlying session. Idempotent.
    async fn release(&self);
}

/// Acquires the browser session a crawl runs over. Injected into
/// `CrawlSession` so tests can substitute a mock session.
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn BrowserDriver>, CrawlError>;
}
