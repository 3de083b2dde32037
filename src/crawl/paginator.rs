//! Result-list pagination with a consumed-offset cursor.
//!
//! One cursor model covers both pagination shapes. On paged sites each page
//! yields a fresh list: the first fetch is all new, the second fetch yields
//! nothing beyond the cursor, which triggers a page advance (cursor resets).
//! On incremental-load sites the list grows in place: each fetch returns only
//! the elements beyond the last consumed offset, and a fetch with zero new
//! elements means the current page is exhausted.

use crate::core::error::CrawlError;
use crate::driver::{BrowserDriver, DriverElement};
use crate::site::SiteStrategy;
use std::sync::Arc;
use tracing::debug;

pub struct Paginator {
    max_pages: usize,
    pages_visited: usize,
    cursor: usize,
}

impl Paginator {
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages: max_pages.max(1),
            pages_visited: 1,
            cursor: 0,
        }
    }

    /// Slice off the elements beyond the consumed offset and advance the
    /// cursor past them. Positions already consumed are never revisited,
    /// even as the underlying list grows between fetches.
    pub fn unseen<'a, T>(&mut self, items: &'a [T]) -> &'a [T] {
        let start = self.cursor.min(items.len());
        // Monotonic: a momentary re-render shrink must not rewind the cursor.
        self.cursor = self.cursor.max(items.len());
        &items[start..]
    }

    /// Look up the next-page affordance. `None` is terminal: either the site
    /// offers no further control or the configured page cap is reached. On
    /// `Some`, the cursor resets for the fresh page — the caller still has to
    /// activate the returned control.
    pub async fn next(
        &mut self,
        driver: &dyn BrowserDriver,
        strategy: &dyn SiteStrategy,
    ) -> Result<Option<Arc<dyn DriverElement>>, CrawlError> {
        if self.pages_visited >= self.max_pages {
            debug!("page cap reached ({})", self.max_pages);
            return Ok(None);
        }
        match strategy.next_page_affordance(driver).await? {
            Some(control) => {
                self.pages_visited += 1;
                self.cursor = 0;
                debug!("advancing to page {}", self.pages_visited);
                Ok(Some(control))
            }
            None => {
                debug!("no further page affordance");
                Ok(None)
            }
        }
    }

    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }
}
