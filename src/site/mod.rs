//! Site strategies — one interchangeable value per supported job board.
//!
//! The crawl engine is site-agnostic; everything selector-shaped lives behind
//! [`SiteStrategy`]. A strategy is selected by configuration, never by
//! inheritance.

pub mod indeed;
pub mod linkedin;

use crate::core::config::Credentials;
use crate::core::error::CrawlError;
use crate::core::types::{PaginationStyle, SearchTask};
use crate::driver::{BrowserDriver, DriverElement};
use async_trait::async_trait;
use std::sync::Arc;

/// How the "easy apply" flag is read off the apply button.
#[derive(Debug, Clone)]
pub enum EasyApplyProbe {
    /// True when the button's attribute equals the given value.
    AttributeEquals { name: String, value: String },
    /// True when the button text contains the given fragment.
    TextContains(String),
}

/// Where structured detail sections live and how each section is labeled.
#[derive(Debug, Clone)]
pub struct DetailSectionMap {
    /// Locator matching one element per detail section.
    pub section: String,
    /// Attribute carrying the section label. When `None`, the first text
    /// line of the section is the label and the remaining lines the values.
    pub label_attribute: Option<String>,
}

/// Locator table for one listing's detail view, consumed by the extractor.
#[derive(Debug, Clone)]
pub struct FieldMap {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub apply_button: Option<String>,
    pub easy_apply: Option<EasyApplyProbe>,
    pub details: Option<DetailSectionMap>,
    pub benefits: Option<String>,
}

#[async_trait]
pub trait SiteStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn home_url(&self) -> String;

    fn pagination_style(&self) -> PaginationStyle;

    /// Locator whose presence means an interactive challenge is on screen.
    fn challenge_locator(&self) -> &str;

    /// Locator whose presence confirms the search produced a result view.
    fn results_wrapper(&self) -> &str;

    fn field_map(&self) -> FieldMap;

    /// Canonical public URL for a listing id.
    fn listing_url(&self, id: &str) -> String;

    /// Best-effort popup/consent dismissal after first navigation.
    async fn dismiss_popups(&self, driver: &dyn BrowserDriver) -> Result<(), CrawlError>;

    /// Credential login. Only invoked when credentials are configured;
    /// failure is fatal to the run.
    async fn login(
        &self,
        driver: &dyn BrowserDriver,
        credentials: &Credentials,
    ) -> Result<(), CrawlError>;

    /// Issue one search query.
    async fn search(&self, driver: &dyn BrowserDriver, task: &SearchTask)
        -> Result<(), CrawlError>;

    /// All listing elements currently in the result list.
    async fn list_elements(
        &self,
        driver: &dyn BrowserDriver,
    ) -> Result<Vec<Arc<dyn DriverElement>>, CrawlError>;

    /// Listing id readable from the list element itself, before the detail
    /// view is opened. Sites that only reveal the id after opening return
    /// `None` — those listings must be clicked before dedup can apply.
    async fn id_before_open(
        &self,
        element: &dyn DriverElement,
    ) -> Result<Option<String>, CrawlError>;

    /// Listing id read from the opened detail view.
    async fn id_after_open(&self, driver: &dyn BrowserDriver) -> Result<String, CrawlError>;

    /// The next-page control, or `None` when the result set is exhausted.
    async fn next_page_affordance(
        &self,
        driver: &dyn BrowserDriver,
    ) -> Result<Option<Arc<dyn DriverElement>>, CrawlError>;

    /// Trigger incremental-load growth (no-op on paged sites).
    async fn load_more(&self, driver: &dyn BrowserDriver) -> Result<(), CrawlError>;
}

/// Build the strategy named by configuration.
pub fn strategy_by_name(name: &str) -> Option<Arc<dyn SiteStrategy>> {
    match name {
        "indeed" => Some(Arc::new(indeed::IndeedStrategy::default())),
        "linkedin" => Some(Arc::new(linkedin::LinkedinStrategy::default())),
        _ => None,
    }
}
