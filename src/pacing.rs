//! Politeness delays between driver interactions.
//!
//! Fixed sleeps between clicks are an easy bot signal; every inter-listing
//! wait is drawn from a jittered range instead.

use std::env;
use tracing::debug;

/// Delay configuration for polite crawling.
#[derive(Debug, Clone, Copy)]
pub struct RequestDelay {
    /// Minimum delay in milliseconds between interactions
    pub min_ms: u64,
    /// Maximum delay in milliseconds between interactions
    pub max_ms: u64,
}

impl RequestDelay {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// Get random delay within configured range with jitter
    pub fn random_delay(&self) -> u64 {
        use rand::prelude::*;
        let mut rng = rand::rng();
        let base_delay = rng.random_range(self.min_ms..=self.max_ms);

        // ±20% jitter to avoid pattern detection
        let jitter_range = (base_delay as f64 * 0.2) as i64;
        let jitter = if jitter_range > 0 {
            rng.random_range(-jitter_range..=jitter_range)
        } else {
            0
        };

        (base_delay as i64 + jitter).max(self.min_ms as i64) as u64
    }

    /// Default polite delay between listing clicks: 800ms-2500ms
    pub fn default_polite() -> Self {
        Self {
            min_ms: 800,
            max_ms: 2500,
        }
    }

    /// Conservative delay: 2000ms-5000ms (for protected sites)
    pub fn conservative() -> Self {
        Self {
            min_ms: 2000,
            max_ms: 5000,
        }
    }
}

pub fn request_delay_from_env() -> RequestDelay {
    let preset = env::var("JOBSCOUT_DELAY_PRESET")
        .ok()
        .map(|v| v.to_lowercase());
    let base = match preset.as_deref() {
        Some("conservative") => RequestDelay::conservative(),
        _ => RequestDelay::default_polite(),
    };
    let min_ms = env::var("JOBSCOUT_DELAY_MIN_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(base.min_ms);
    let max_ms = env::var("JOBSCOUT_DELAY_MAX_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(base.max_ms);
    let (min_ms, max_ms) = if min_ms > max_ms {
        (max_ms, min_ms)
    } else {
        (min_ms, max_ms)
    };
    RequestDelay::new(min_ms, max_ms)
}

/// Sleep for one randomized pacing interval.
pub async fn pause(delay: &RequestDelay) {
    let ms = delay.random_delay();
    if ms > 0 {
        debug!("pacing: {}ms", ms);
        tokio::time::sleep(tokio::time::Duration::from_millis(ms)).await;
    }
}
