//! Detail-view extraction with whole-extraction retry.
//!
//! A transient rendering race mid-extraction invalidates everything read so
//! far, so the retry restarts the entire extraction rather than individual
//! fields. The caller must hold the challenge gate clear around the call;
//! the extractor itself never waits.

use crate::core::error::{CrawlError, DriverError};
use crate::core::types::ListingRecord;
use crate::driver::BrowserDriver;
use crate::site::{DetailSectionMap, EasyApplyProbe, FieldMap, SiteStrategy};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::warn;

pub struct RecordExtractor {
    /// Bounded wait per required field.
    field_timeout: Duration,
    /// Fixed delay between whole-extraction attempts.
    retry_delay: Duration,
    /// Additional attempts after the first.
    max_retries: u32,
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self {
            field_timeout: Duration::from_secs(15),
            retry_delay: Duration::from_secs(3),
            max_retries: 1,
        }
    }
}

impl RecordExtractor {
    pub fn new(field_timeout: Duration, retry_delay: Duration, max_retries: u32) -> Self {
        Self {
            field_timeout,
            retry_delay,
            max_retries,
        }
    }

    /// Extract the currently open detail view into a record.
    ///
    /// Exhausting the retry budget yields `TransientExtraction`; the caller
    /// logs and skips only this id, leaving it eligible for a later run.
    pub async fn extract(
        &self,
        driver: &dyn BrowserDriver,
        strategy: &dyn SiteStrategy,
        id: &str,
    ) -> Result<ListingRecord, CrawlError> {
        let map = strategy.field_map();
        let mut attempt = 0;
        loop {
            match self.extract_once(driver, strategy, &map, id).await {
                Ok(record) => return Ok(record),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "extraction attempt {} failed for listing {}: {} — retrying",
                        attempt, id, e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    return Err(CrawlError::TransientExtraction {
                        id: id.to_string(),
                        reason: e.to_string(),
                    })
                }
            }
        }
    }

    async fn extract_once(
        &self,
        driver: &dyn BrowserDriver,
        strategy: &dyn SiteStrategy,
        map: &FieldMap,
        id: &str,
    ) -> Result<ListingRecord, DriverError> {
        let title = self.required_text(driver, &map.title).await?;
        let company = self.required_text(driver, &map.company).await?;
        let location = self.required_text(driver, &map.location).await?;
        let description = self.required_text(driver, &map.description).await?;

        let easy_apply = self.easy_apply(driver, map).await;
        let details = match &map.details {
            Some(section_map) => self.details(driver, section_map).await,
            None => None,
        };
        let benefits = match &map.benefits {
            Some(locator) => self.benefits(driver, locator).await,
            None => None,
        };

        Ok(ListingRecord {
            id: id.to_string(),
            url: strategy.listing_url(id),
            title,
            company,
            location,
            description,
            details,
            benefits,
            easy_apply,
        })
    }

    async fn required_text(
        &self,
        driver: &dyn BrowserDriver,
        locator: &str,
    ) -> Result<String, DriverError> {
        driver
            .find_element(locator, self.field_timeout)
            .await?
            .text()
            .await
    }

    /// Optional: absence of the apply button never fails the extraction.
    async fn easy_apply(&self, driver: &dyn BrowserDriver, map: &FieldMap) -> Option<bool> {
        let (locator, probe) = match (&map.apply_button, &map.easy_apply) {
            (Some(locator), Some(probe)) => (locator, probe),
            _ => return None,
        };
        let button = driver
            .find_element(locator, Duration::from_secs(5))
            .await
            .ok()?;
        match probe {
            EasyApplyProbe::AttributeEquals { name, value } => {
                let attr = button.attribute(name).await.ok()??;
                Some(attr == *value)
            }
            EasyApplyProbe::TextContains(fragment) => {
                let text = button.text().await.ok()?;
                Some(text.to_lowercase().contains(&fragment.to_lowercase()))
            }
        }
    }

    /// Optional structured detail sections, keyed by section label.
    async fn details(
        &self,
        driver: &dyn BrowserDriver,
        section_map: &DetailSectionMap,
    ) -> Option<BTreeMap<String, Vec<String>>> {
        if !driver.element_present(&section_map.section).await {
            return None;
        }
        let sections = driver
            .find_elements(&section_map.section, Duration::from_secs(5))
            .await
            .ok()?;

        let mut details: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for section in sections {
            let text = section.text().await.ok()?;
            let mut lines = text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string);

            let (label, values): (String, Vec<String>) = match &section_map.label_attribute {
                Some(attr) => match section.attribute(attr).await.ok()? {
                    Some(label) => (label, lines.collect()),
                    None => continue,
                },
                // Label-less sections: first text line is the label.
                None => match lines.next() {
                    Some(label) => (label, lines.collect()),
                    None => continue,
                },
            };
            details.entry(label).or_default().extend(values);
        }
        if details.is_empty() {
            None
        } else {
            Some(details)
        }
    }

    async fn benefits(&self, driver: &dyn BrowserDriver, locator: &str) -> Option<Vec<String>> {
        if !driver.element_present(locator).await {
            return None;
        }
        let elements = driver
            .find_elements(locator, Duration::from_secs(5))
            .await
            .ok()?;
        let mut benefits = Vec::new();
        for el in elements {
            if let Ok(text) = el.text().await {
                if !text.is_empty() {
                    benefits.push(text);
                }
            }
        }
        if benefits.is_empty() {
            None
        } else {
            Some(benefits)
        }
    }
}
