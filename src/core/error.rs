use std::time::Duration;
use thiserror::Error;

/// Failures at the browser-driver seam. Locators are opaque strings owned by
/// the site strategy; the driver only reports them back for diagnostics.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("element not found: {locator}")]
    ElementMissing { locator: String },

    #[error("timed out after {timeout:?} waiting for {locator}")]
    WaitTimeout { locator: String, timeout: Duration },

    #[error("browser backend error: {0}")]
    Backend(String),
}

/// Crawl-level error taxonomy.
///
/// `TransientExtraction` and `NavigationTimeout` are recoverable at their
/// respective scopes (single listing / single search task); the rest escalate
/// to the session boundary.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("browser session launch failed: {0}")]
    SessionLaunch(String),

    /// A single listing's fields could not be read in time, even after the
    /// bounded retry. The listing is skipped and stays unmarked, so it
    /// remains eligible on a later run.
    #[error("extraction failed for listing {id}: {reason}")]
    TransientExtraction { id: String, reason: String },

    /// An expected view or element never appeared. Escalated to the
    /// enclosing search-task iteration: log and move on to the next task.
    #[error("navigation timeout waiting for {locator}")]
    NavigationTimeout { locator: String },

    /// Login flow failed or timed out. Fatal to the run.
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("record persistence failed: {0}")]
    Persistence(#[from] std::io::Error),
}

impl CrawlError {
    /// Recoverable within the current search task (skip listing / skip task)
    /// rather than aborting the whole run.
    pub fn is_task_recoverable(&self) -> bool {
        matches!(
            self,
            CrawlError::TransientExtraction { .. } | CrawlError::NavigationTimeout { .. }
        )
    }
}
