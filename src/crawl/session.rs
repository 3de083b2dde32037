//! Top-level crawl session — owns the lifecycle and composes everything.
//!
//! One session drives one browser session through the configured searches.
//! Teardown (gate cancellation, then browser release) is guaranteed on every
//! exit path; a failure inside the running crawl captures a diagnostic
//! screenshot and force-flushes admitted records before the session stops.

use super::extractor::RecordExtractor;
use super::gate::{ChallengeGate, GateTuning};
use super::paginator::Paginator;
use crate::core::config::{Credentials, ScoutConfig};
use crate::core::error::CrawlError;
use crate::core::types::{AdmissionResult, CrawlState, SearchTask};
use crate::driver::{BrowserDriver, DriverLauncher};
use crate::filter::{MatchMode, RelevanceFilter};
use crate::pacing::{self, RequestDelay};
use crate::site::SiteStrategy;
use crate::store::{sink::PersistenceSink, RecordStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub struct CrawlSession {
    strategy: Arc<dyn SiteStrategy>,
    launcher: Arc<dyn DriverLauncher>,
    searches: Vec<SearchTask>,
    credentials: Option<Credentials>,
    filter: RelevanceFilter,
    sink: PersistenceSink,
    extractor: RecordExtractor,
    pacing: RequestDelay,
    gate_tuning: GateTuning,
    max_pages: usize,
    /// Bounded wait for the result view after issuing a search.
    results_timeout: Duration,
    snapshot_dir: PathBuf,
    state: CrawlState,
    driver: Option<Arc<dyn BrowserDriver>>,
}

impl CrawlSession {
    pub fn new(
        strategy: Arc<dyn SiteStrategy>,
        launcher: Arc<dyn DriverLauncher>,
        config: &ScoutConfig,
    ) -> Self {
        let mode = if config.full_match {
            MatchMode::All
        } else {
            MatchMode::Any
        };
        let filter = RelevanceFilter::new(&config.keywords, &config.exclude_keywords, mode);
        let sink = PersistenceSink::new(&config.resolve_records_dir(), strategy.name());
        Self {
            strategy,
            launcher,
            searches: config.searches.clone(),
            credentials: config.credentials.clone(),
            filter,
            sink,
            extractor: RecordExtractor::default(),
            pacing: pacing::request_delay_from_env(),
            gate_tuning: GateTuning::default(),
            max_pages: config.resolve_max_pages(),
            results_timeout: Duration::from_secs(15),
            snapshot_dir: PathBuf::from("."),
            state: CrawlState::Ready,
            driver: None,
        }
    }

    /// Test/tuning hook: shrink the gate windows.
    pub fn with_gate_tuning(mut self, tuning: GateTuning) -> Self {
        self.gate_tuning = tuning;
        self
    }

    /// Test/tuning hook: override pacing and extraction timing.
    pub fn with_timing(
        mut self,
        pacing: RequestDelay,
        extractor: RecordExtractor,
        results_timeout: Duration,
    ) -> Self {
        self.pacing = pacing;
        self.extractor = extractor;
        self.results_timeout = results_timeout;
        self
    }

    pub fn with_snapshot_dir(mut self, dir: PathBuf) -> Self {
        self.snapshot_dir = dir;
        self
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Run the whole crawl. No-op unless the session is `Ready`.
    ///
    /// Teardown order on every exit path: cancel the challenge watcher and
    /// wait for it, then release the browser session, then transition to
    /// `Stopped`. The first error is returned after teardown completes.
    pub async fn start(&mut self) -> Result<(), CrawlError> {
        if self.state != CrawlState::Ready {
            warn!("start() ignored — session is {:?}", self.state);
            return Ok(());
        }

        // Seed the seen set before acquiring any browser resources.
        let seen = self.sink.existing_ids()?;
        let mut store = RecordStore::new(seen);

        let driver = match self.launcher.launch().await {
            Ok(driver) => driver,
            Err(e) => {
                // Session never entered Running; nothing to tear down.
                error!("fatal: {}", e);
                return Err(e);
            }
        };
        self.driver = Some(driver.clone());
        self.state = CrawlState::Running;
        info!("crawl session started ({})", self.strategy.name());
        let started = Instant::now();

        let gate = ChallengeGate::spawn(
            driver.clone(),
            self.strategy.challenge_locator().to_string(),
            self.gate_tuning,
        );

        let result = self.run(driver.as_ref(), &gate, &mut store).await;

        if let Err(e) = &result {
            error!("crawl failed: {}", e);
            self.capture_snapshot(driver.as_ref()).await;
        }
        // Admitted records survive every exit path, including a run that
        // abandoned its last search task mid-page.
        if let Err(flush_err) = self.sink.flush(&mut store) {
            warn!("final flush failed: {}", flush_err);
        }

        gate.shutdown().await;
        info!(
            "crawl finished in {:.1}s — {} records captured, {} ids seen",
            started.elapsed().as_secs_f64(),
            store.admitted_count(),
            store.seen_count(),
        );
        self.stop().await;
        result
    }

    /// Release the browser session. Valid only from `Running`.
    pub async fn stop(&mut self) {
        if self.state != CrawlState::Running {
            return;
        }
        if let Some(driver) = &self.driver {
            driver.release().await;
        }
        self.state = CrawlState::Stopped;
        info!("crawl session stopped");
    }

    /// Discard the session handle and return to `Ready`. Valid only from
    /// `Stopped`.
    pub fn reset(&mut self) {
        if self.state != CrawlState::Stopped {
            return;
        }
        self.driver = None;
        self.state = CrawlState::Ready;
    }

    async fn run(
        &self,
        driver: &dyn BrowserDriver,
        gate: &ChallengeGate,
        store: &mut RecordStore,
    ) -> Result<(), CrawlError> {
        // Setup: land on the site, clear popups, optionally authenticate.
        gate.wait_ready().await;
        driver.navigate(&self.strategy.home_url()).await?;
        gate.wait_ready().await;
        self.strategy.dismiss_popups(driver).await?;
        if let Some(credentials) = &self.credentials {
            gate.wait_ready().await;
            self.strategy.login(driver, credentials).await?;
        }

        let total = self.searches.len();
        info!("{} searches to run", total);
        for (index, task) in self.searches.iter().enumerate() {
            info!(
                "[{} of {}] searching: {} | location: {}",
                index + 1,
                total,
                task.term,
                task.location.as_deref().unwrap_or("-"),
            );
            gate.wait_ready().await;
            match self.run_search(driver, gate, store, task).await {
                Ok(()) => {}
                Err(e) if e.is_task_recoverable() => {
                    warn!("search '{}' abandoned: {} — moving on", task.term, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn run_search(
        &self,
        driver: &dyn BrowserDriver,
        gate: &ChallengeGate,
        store: &mut RecordStore,
        task: &SearchTask,
    ) -> Result<(), CrawlError> {
        self.strategy.search(driver, task).await?;
        gate.wait_ready().await;

        let wrapper = self.strategy.results_wrapper();
        if driver
            .find_element(wrapper, self.results_timeout)
            .await
            .is_err()
        {
            return Err(CrawlError::NavigationTimeout {
                locator: wrapper.to_string(),
            });
        }

        let mut paginator = Paginator::new(self.max_pages);
        loop {
            gate.wait_ready().await;
            let elements = self.strategy.list_elements(driver).await?;
            let fresh = paginator.unseen(&elements).to_vec();

            if fresh.is_empty() {
                match paginator.next(driver, self.strategy.as_ref()).await? {
                    Some(control) => {
                        gate.wait_ready().await;
                        control.click().await?;
                        debug!("loading next result page");
                        continue;
                    }
                    None => break,
                }
            }

            let batch_size = fresh.len();
            info!("{} new results in view", batch_size);
            for (i, element) in fresh.iter().enumerate() {
                pacing::pause(&self.pacing).await;

                // Known listings are skipped without re-opening their detail
                // view whenever the id is readable off the list element.
                if let Some(id) = self.strategy.id_before_open(element.as_ref()).await? {
                    if store.is_known(&id) {
                        info!("[{} of {}] listing {} already captured", i + 1, batch_size, id);
                        continue;
                    }
                }

                gate.wait_ready().await;
                element.click().await?;
                gate.wait_ready().await;

                let id = match self.strategy.id_before_open(element.as_ref()).await? {
                    Some(id) => id,
                    None => self.strategy.id_after_open(driver).await?,
                };
                if store.is_known(&id) {
                    info!("[{} of {}] listing {} already captured", i + 1, batch_size, id);
                    continue;
                }

                match self.extractor.extract(driver, self.strategy.as_ref(), &id).await {
                    Ok(record) => {
                        let (title, url) = (record.title.clone(), record.url.clone());
                        match store.try_admit(record, &self.filter) {
                            AdmissionResult::Admitted => {
                                info!("[{} of {}] {}: {}", i + 1, batch_size, title, url);
                            }
                            AdmissionResult::FilteredOut => {
                                info!("[{} of {}] {} — not relevant", i + 1, batch_size, title);
                            }
                            AdmissionResult::AlreadySeen => {
                                debug!("listing {} resurfaced mid-batch", id);
                            }
                        }
                    }
                    Err(e @ CrawlError::TransientExtraction { .. }) => {
                        // Skip this id only; it stays unmarked and eligible
                        // for a later run.
                        warn!("{}", e);
                    }
                    Err(e) => return Err(e),
                }
            }

            // Once per completed page: bounds I/O while capping what a crash
            // can lose to a single page of extracted work.
            self.sink.flush(store)?;
            gate.wait_ready().await;
            self.strategy.load_more(driver).await?;
        }

        self.sink.flush(store)?;
        debug!(
            "search '{}' complete after {} page(s)",
            task.term,
            paginator.pages_visited()
        );
        Ok(())
    }

    async fn capture_snapshot(&self, driver: &dyn BrowserDriver) {
        let stamp = chrono::Local::now().format("%d_%m_%Y_%H_%M_%S");
        let path = self.snapshot_dir.join(format!("{stamp}_ERROR.png"));
        match driver.screenshot(&path).await {
            Ok(()) => info!("diagnostic snapshot saved to {}", path.display()),
            Err(e) => warn!("diagnostic snapshot failed: {}", e),
        }
    }
}
