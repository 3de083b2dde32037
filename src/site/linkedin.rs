//! LinkedIn strategy — incremental-load result list plus a "see more" control.
//!
//! Selector tables differ between the anonymous and the authenticated view;
//! a successful login swaps the table, mirroring how the two page variants
//! actually render.

use super::{DetailSectionMap, EasyApplyProbe, FieldMap, SiteStrategy};
use crate::core::config::Credentials;
use crate::core::error::CrawlError;
use crate::core::types::{PaginationStyle, SearchTask};
use crate::driver::{BrowserDriver, DriverElement};
use async_trait::async_trait;
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const HOME_URL: &str = "https://www.linkedin.com/jobs/search";
const CHALLENGE: &str = "#captcha-internal, .challenge-dialog";

const ANON_WRAPPER: &str = ".two-pane-serp-page__detail-view";
const ANON_JOB_LIST: &str = "#main-content section ul li div a";
const ANON_NEXT_PAGE: &str = "#main-content section:nth-of-type(2) > button";
const ANON_SEARCH_TERM: &str = "#job-search-bar-keywords";
const ANON_SEARCH_LOCATION: &str = "#job-search-bar-location";
const ANON_SEARCH_SUBMIT: &str = "#jobs-search-panel form button";
const ANON_POPUP_CLOSE: &str = "#base-contextual-sign-in-modal section > button";

const AUTH_WRAPPER: &str = "[class*='jobs-details__main-content']";
const AUTH_JOB_LIST: &str = "#main div ul li a[href*='/jobs/view/']";
const AUTH_NEXT_PAGE: &str = "button[aria-label='View next page']";
const AUTH_SEARCH_TERM: &str = "[id^='jobs-search-box-keyword-id']";
const AUTH_SEARCH_LOCATION: &str = "[id^='jobs-search-box-location-id']";
const AUTH_SEARCH_SUBMIT: &str = "#global-nav-search button";

const LOGIN_OPEN: &str = "#base-contextual-sign-in-modal .sign-in-modal > button";
const LOGIN_USERNAME: &str = "#base-sign-in-modal_session_key";
const LOGIN_PASSWORD: &str = "#base-sign-in-modal_session_password";
const LOGIN_SUBMIT: &str = "#base-sign-in-modal form button[type='submit']";

pub struct LinkedinStrategy {
    logged: AtomicBool,
    job_id_pattern: Regex,
}

impl Default for LinkedinStrategy {
    fn default() -> Self {
        Self {
            logged: AtomicBool::new(false),
            job_id_pattern: Regex::new(r"currentJobId=(\d+)|/jobs/view/(\d+)")
                .expect("valid job id pattern"),
        }
    }
}

impl LinkedinStrategy {
    fn is_logged(&self) -> bool {
        self.logged.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SiteStrategy for LinkedinStrategy {
    fn name(&self) -> &'static str {
        "linkedin"
    }

    fn home_url(&self) -> String {
        HOME_URL.to_string()
    }

    fn pagination_style(&self) -> PaginationStyle {
        PaginationStyle::IncrementalLoad
    }

    fn challenge_locator(&self) -> &str {
        CHALLENGE
    }

    fn results_wrapper(&self) -> &str {
        if self.is_logged() {
            AUTH_WRAPPER
        } else {
            ANON_WRAPPER
        }
    }

    fn field_map(&self) -> FieldMap {
        if self.is_logged() {
            FieldMap {
                title: format!("{AUTH_WRAPPER} h1 a"),
                company: format!("{AUTH_WRAPPER} [class*='company-name'] a"),
                location: format!("{AUTH_WRAPPER} [class*='primary-description'] span"),
                description: "#job-details div".into(),
                apply_button: Some("#jobs-apply-button-id".into()),
                easy_apply: Some(EasyApplyProbe::TextContains("simplificada".into())),
                details: Some(DetailSectionMap {
                    section: format!("{AUTH_WRAPPER} ul li [class*='ui-label']"),
                    label_attribute: None,
                }),
                benefits: None,
            }
        } else {
            FieldMap {
                title: format!("{ANON_WRAPPER} a.topcard__link"),
                company: format!("{ANON_WRAPPER} .topcard__flavor-row span:nth-of-type(1)"),
                location: format!("{ANON_WRAPPER} .topcard__flavor-row span:nth-of-type(2)"),
                description: format!("{ANON_WRAPPER} [class*='description__text'] section div"),
                apply_button: Some(format!("{ANON_WRAPPER} div button[class*='sign-up']")),
                easy_apply: Some(EasyApplyProbe::TextContains("simplificada".into())),
                details: Some(DetailSectionMap {
                    section: format!("{ANON_WRAPPER} .description__job-criteria-list > li"),
                    label_attribute: None,
                }),
                benefits: None,
            }
        }
    }

    fn listing_url(&self, id: &str) -> String {
        format!("https://www.linkedin.com/jobs/view/{id}")
    }

    async fn dismiss_popups(&self, driver: &dyn BrowserDriver) -> Result<(), CrawlError> {
        if driver.element_present(ANON_POPUP_CLOSE).await {
            driver.click(ANON_POPUP_CLOSE).await?;
            info!("sign-in popup dismissed");
        }
        Ok(())
    }

    async fn login(
        &self,
        driver: &dyn BrowserDriver,
        credentials: &Credentials,
    ) -> Result<(), CrawlError> {
        let password = credentials.password.as_deref().ok_or_else(|| {
            CrawlError::AuthenticationFailure("linkedin login requires a password".into())
        })?;

        driver.click(LOGIN_OPEN).await?;
        driver
            .type_text(LOGIN_USERNAME, &credentials.username)
            .await?;
        driver.type_text(LOGIN_PASSWORD, password).await?;
        driver.click(LOGIN_SUBMIT).await?;

        // The authenticated shell renders the global nav search box.
        let logged_in = driver
            .find_element(AUTH_SEARCH_TERM, Duration::from_secs(15))
            .await
            .is_ok();
        if !logged_in {
            return Err(CrawlError::AuthenticationFailure(
                "login form submitted but authenticated view never appeared".into(),
            ));
        }
        self.logged.store(true, Ordering::Relaxed);
        info!("authenticated as {}", credentials.username);
        Ok(())
    }

    async fn search(
        &self,
        driver: &dyn BrowserDriver,
        task: &SearchTask,
    ) -> Result<(), CrawlError> {
        let (term_input, location_input, submit) = if self.is_logged() {
            (AUTH_SEARCH_TERM, AUTH_SEARCH_LOCATION, AUTH_SEARCH_SUBMIT)
        } else {
            (ANON_SEARCH_TERM, ANON_SEARCH_LOCATION, ANON_SEARCH_SUBMIT)
        };
        driver.type_text(term_input, &task.term).await?;
        if let Some(location) = &task.location {
            driver.type_text(location_input, location).await?;
        }
        driver.click(submit).await?;
        Ok(())
    }

    async fn list_elements(
        &self,
        driver: &dyn BrowserDriver,
    ) -> Result<Vec<Arc<dyn DriverElement>>, CrawlError> {
        let locator = if self.is_logged() {
            AUTH_JOB_LIST
        } else {
            ANON_JOB_LIST
        };
        Ok(driver.find_elements(locator, Duration::from_secs(15)).await?)
    }

    async fn id_before_open(
        &self,
        element: &dyn DriverElement,
    ) -> Result<Option<String>, CrawlError> {
        // Anchor hrefs usually embed the job id; absent that, the id is only
        // knowable after the detail pane opens.
        if let Some(href) = element.attribute("href").await? {
            if let Some(id) = self.extract_id(&href) {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    async fn id_after_open(&self, driver: &dyn BrowserDriver) -> Result<String, CrawlError> {
        let current = driver.current_url().await?;
        self.extract_id(&current)
            .ok_or_else(|| CrawlError::NavigationTimeout {
                locator: "currentJobId in url".into(),
            })
    }

    async fn next_page_affordance(
        &self,
        driver: &dyn BrowserDriver,
    ) -> Result<Option<Arc<dyn DriverElement>>, CrawlError> {
        let locator = if self.is_logged() {
            AUTH_NEXT_PAGE
        } else {
            ANON_NEXT_PAGE
        };
        if !driver.element_present(locator).await {
            return Ok(None);
        }
        match driver.find_element(locator, Duration::from_secs(5)).await {
            Ok(el) => Ok(Some(el)),
            Err(e) => {
                warn!("next-page control vanished: {}", e);
                Ok(None)
            }
        }
    }

    async fn load_more(&self, driver: &dyn BrowserDriver) -> Result<(), CrawlError> {
        driver.scroll_to_bottom().await?;
        Ok(())
    }
}

impl LinkedinStrategy {
    fn extract_id(&self, url: &str) -> Option<String> {
        self.job_id_pattern.captures(url).and_then(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().to_string())
        })
    }
}
