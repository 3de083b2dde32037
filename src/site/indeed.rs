//! Indeed strategy — fixed pagination, URL-built searches.

use super::{DetailSectionMap, EasyApplyProbe, FieldMap, SiteStrategy};
use crate::core::config::Credentials;
use crate::core::error::CrawlError;
use crate::core::types::{PaginationStyle, SearchTask};
use crate::driver::{BrowserDriver, DriverElement};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const CHALLENGE: &str = "#JnAv0 div div";
const RESULTS_WRAPPER: &str = "#jobsearch-ViewjobPaneWrapper";
const JOB_LIST: &str = "#mosaic-jobResults ul a";
const PAGINATION_LINKS: &str = "#jobsearch-JapanPage nav li a";
const COOKIE_REJECT: &str = "#onetrust-reject-all-handler";

const LOGIN_LINK: &str = ".css-7dcbld.eu4oa1w0 a";
const LOGIN_EMAIL_INPUT: &str = "input[type='email']";
const LOGIN_EMAIL_SUBMIT: &str = "#emailform button";
const LOGIN_PASSCODE_INPUT: &str = "#passcode-input";

pub struct IndeedStrategy {
    base_url: String,
}

impl Default for IndeedStrategy {
    fn default() -> Self {
        Self {
            base_url: "https://br.indeed.com".to_string(),
        }
    }
}

impl IndeedStrategy {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SiteStrategy for IndeedStrategy {
    fn name(&self) -> &'static str {
        "indeed"
    }

    fn home_url(&self) -> String {
        self.base_url.clone()
    }

    fn pagination_style(&self) -> PaginationStyle {
        PaginationStyle::Paged
    }

    fn challenge_locator(&self) -> &str {
        CHALLENGE
    }

    fn results_wrapper(&self) -> &str {
        RESULTS_WRAPPER
    }

    fn field_map(&self) -> FieldMap {
        FieldMap {
            title: "[class*='jobsearch-HeaderContainer'] h2 span".into(),
            company: "[data-company-name]".into(),
            location: "[data-testid*='companyLocation']".into(),
            description: "#jobDescriptionText".into(),
            apply_button: Some("#jobsearch-ViewJobButtons-container button".into()),
            easy_apply: Some(EasyApplyProbe::AttributeEquals {
                name: "id".into(),
                value: "indeedApplyButton".into(),
            }),
            details: Some(DetailSectionMap {
                section: "#jobDetailsSection div[role='group']".into(),
                label_attribute: Some("aria-label".into()),
            }),
            benefits: Some("#benefits li".into()),
        }
    }

    fn listing_url(&self, id: &str) -> String {
        format!("{}/viewjob?jk={}", self.base_url, id)
    }

    async fn dismiss_popups(&self, driver: &dyn BrowserDriver) -> Result<(), CrawlError> {
        if driver.element_present(COOKIE_REJECT).await {
            driver.click(COOKIE_REJECT).await?;
            debug!("cookie popup dismissed");
        }
        Ok(())
    }

    /// Email-first login. Indeed sends a verification code instead of taking
    /// a password; an unattended crawl cannot answer it, so reaching the
    /// passcode screen is reported as an authentication failure rather than
    /// blocking forever on input that will never come.
    async fn login(
        &self,
        driver: &dyn BrowserDriver,
        credentials: &Credentials,
    ) -> Result<(), CrawlError> {
        driver.click(LOGIN_LINK).await?;
        driver
            .type_text(LOGIN_EMAIL_INPUT, &credentials.username)
            .await?;
        driver.click(LOGIN_EMAIL_SUBMIT).await?;
        info!("login submitted for {}", credentials.username);

        let passcode_shown = driver
            .find_element(LOGIN_PASSCODE_INPUT, Duration::from_secs(10))
            .await
            .is_ok();
        if passcode_shown {
            return Err(CrawlError::AuthenticationFailure(
                "verification code required — unattended login not possible".into(),
            ));
        }
        Ok(())
    }

    async fn search(
        &self,
        driver: &dyn BrowserDriver,
        task: &SearchTask,
    ) -> Result<(), CrawlError> {
        let mut url = Url::parse(&format!("{}/jobs", self.base_url))
            .map_err(|e| crate::core::error::DriverError::Backend(e.to_string()))
            .map_err(CrawlError::from)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &task.term);
            if let Some(location) = &task.location {
                pairs.append_pair("l", location);
            }
        }
        driver.navigate(url.as_str()).await?;
        Ok(())
    }

    async fn list_elements(
        &self,
        driver: &dyn BrowserDriver,
    ) -> Result<Vec<Arc<dyn DriverElement>>, CrawlError> {
        let candidates = driver
            .find_elements(JOB_LIST, Duration::from_secs(15))
            .await?;
        // Anchors interleave ads and navigation; real listings carry a
        // "job_<id>" element id.
        let mut listings = Vec::new();
        for el in candidates {
            if let Some(id) = el.attribute("id").await? {
                if id.starts_with("job_") {
                    listings.push(el);
                }
            }
        }
        Ok(listings)
    }

    async fn id_before_open(
        &self,
        element: &dyn DriverElement,
    ) -> Result<Option<String>, CrawlError> {
        let raw = element.attribute("id").await?;
        Ok(raw
            .as_deref()
            .and_then(|v| v.strip_prefix("job_"))
            .map(str::to_string))
    }

    async fn id_after_open(&self, driver: &dyn BrowserDriver) -> Result<String, CrawlError> {
        // The pane id is already known from the list element; fall back to
        // the jk query parameter when called anyway.
        let current = driver.current_url().await?;
        Url::parse(&current)
            .ok()
            .and_then(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == "jk" || k == "vjk")
                    .map(|(_, v)| v.into_owned())
            })
            .ok_or_else(|| CrawlError::NavigationTimeout {
                locator: "viewjob jk parameter".into(),
            })
    }

    async fn next_page_affordance(
        &self,
        driver: &dyn BrowserDriver,
    ) -> Result<Option<Arc<dyn DriverElement>>, CrawlError> {
        if !driver.element_present(PAGINATION_LINKS).await {
            return Ok(None);
        }
        let links = driver
            .find_elements(PAGINATION_LINKS, Duration::from_secs(5))
            .await?;
        // The link after the one marked aria-current="page" is the next page.
        for (i, link) in links.iter().enumerate() {
            if link.attribute("aria-current").await?.as_deref() == Some("page") {
                return Ok(links.get(i + 1).cloned());
            }
        }
        Ok(None)
    }

    async fn load_more(&self, _driver: &dyn BrowserDriver) -> Result<(), CrawlError> {
        Ok(()) // fixed pagination — nothing grows in place
    }
}
