//! End-to-end crawl tests over a scripted in-memory site.
//!
//! The mock driver records every interacting call together with whether a
//! challenge was on screen at that moment, so the pause/resume contract is
//! checked on every test, not just the dedicated gate test.

use async_trait::async_trait;
use jobscout::core::config::ScoutConfig;
use jobscout::core::error::{CrawlError, DriverError};
use jobscout::core::types::{CrawlState, PaginationStyle, SearchTask};
use jobscout::crawl::{CrawlSession, GateTuning, RecordExtractor};
use jobscout::driver::{BrowserDriver, DriverElement, DriverLauncher};
use jobscout::pacing::RequestDelay;
use jobscout::site::{FieldMap, SiteStrategy};
use jobscout::store::{sink::PersistenceSink, RecordStore};
use jobscout::filter::{MatchMode, RelevanceFilter};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const CHALLENGE_LOCATOR: &str = "challenge-box";

#[derive(Clone)]
struct MockListing {
    id: String,
    title: String,
    description: String,
}

impl MockListing {
    fn new(id: &str, title: &str, description: &str) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Default)]
struct SiteState {
    listings: Vec<MockListing>,
    /// Listings appended to the list by the next scroll (incremental load).
    pending_listings: Vec<MockListing>,
    /// Site grows one list in place instead of paging.
    incremental: bool,
    /// List elements expose no id attribute; ids resolve only after opening.
    hide_list_ids: bool,
    /// Post-open id resolution fails for this listing.
    fail_id_after_open_for: Option<String>,
    /// Per-field rendering latency in the detail view.
    field_delay_ms: u64,
    challenge_present: bool,
    /// Opening this listing's detail view raises a challenge.
    raise_challenge_on_open: Option<String>,
    /// Clicking this listing fails with a backend error.
    fail_click_on: Option<String>,
    /// This listing's detail view never renders its fields.
    missing_fields_for: Option<String>,
    opened: Option<usize>,
    /// Ids whose detail view was opened by clicking a list element.
    detail_opens: Vec<String>,
    /// Interacting calls issued while a challenge was on screen (excluding
    /// the gate's own resolution clicks on the challenge locator).
    gate_violations: Vec<String>,
    searches_issued: Vec<String>,
    /// Search terms whose result view never appears.
    broken_terms: HashSet<String>,
    released: bool,
}

type Shared = Arc<Mutex<SiteState>>;

struct MockDriver {
    state: Shared,
}

impl MockDriver {
    fn record_interaction(&self, what: &str) {
        let mut s = self.state.lock().unwrap();
        if s.challenge_present && what != CHALLENGE_LOCATOR {
            s.gate_violations.push(what.to_string());
        }
    }

    fn opened_field(&self, field: &str) -> Option<String> {
        let s = self.state.lock().unwrap();
        let listing = s.listings.get(s.opened?)?;
        if s.missing_fields_for.as_deref() == Some(listing.id.as_str()) {
            return None;
        }
        match field {
            "title" => Some(listing.title.clone()),
            "company" => Some("Acme Corp".to_string()),
            "location" => Some("Remote".to_string()),
            "description" => Some(listing.description.clone()),
            _ => None,
        }
    }
}

struct TextElement {
    value: String,
}

#[async_trait]
impl DriverElement for TextElement {
    async fn text(&self) -> Result<String, DriverError> {
        Ok(self.value.clone())
    }
    async fn attribute(&self, _name: &str) -> Result<Option<String>, DriverError> {
        Ok(None)
    }
    async fn click(&self) -> Result<(), DriverError> {
        Ok(())
    }
}

struct ListingElement {
    state: Shared,
    index: usize,
}

#[async_trait]
impl DriverElement for ListingElement {
    async fn text(&self) -> Result<String, DriverError> {
        let s = self.state.lock().unwrap();
        Ok(s.listings[self.index].title.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, DriverError> {
        let s = self.state.lock().unwrap();
        if name == "id" && !s.hide_list_ids {
            Ok(Some(format!("job_{}", s.listings[self.index].id)))
        } else {
            Ok(None)
        }
    }

    async fn click(&self) -> Result<(), DriverError> {
        let mut s = self.state.lock().unwrap();
        if s.challenge_present {
            s.gate_violations.push("listing click".to_string());
        }
        let id = s.listings[self.index].id.clone();
        if s.fail_click_on.as_deref() == Some(id.as_str()) {
            return Err(DriverError::Backend("tab crashed".into()));
        }
        s.opened = Some(self.index);
        if s.raise_challenge_on_open.as_deref() == Some(id.as_str()) {
            s.challenge_present = true;
        }
        s.detail_opens.push(id);
        Ok(())
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.record_interaction(url);
        Ok(())
    }

    async fn click(&self, locator: &str) -> Result<(), DriverError> {
        self.record_interaction(locator);
        Ok(())
    }

    async fn type_text(&self, locator: &str, _text: &str) -> Result<(), DriverError> {
        self.record_interaction(locator);
        Ok(())
    }

    async fn find_element(
        &self,
        locator: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn DriverElement>, DriverError> {
        let delay = self.state.lock().unwrap().field_delay_ms;
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if locator == "wrapper" {
            let s = self.state.lock().unwrap();
            let current = s.searches_issued.last().cloned().unwrap_or_default();
            if s.broken_terms.contains(&current) {
                return Err(DriverError::WaitTimeout {
                    locator: locator.to_string(),
                    timeout,
                });
            }
            return Ok(Arc::new(TextElement { value: String::new() }));
        }
        match self.opened_field(locator) {
            Some(value) => Ok(Arc::new(TextElement { value })),
            None => Err(DriverError::WaitTimeout {
                locator: locator.to_string(),
                timeout,
            }),
        }
    }

    async fn find_elements(
        &self,
        _locator: &str,
        _timeout: Duration,
    ) -> Result<Vec<Arc<dyn DriverElement>>, DriverError> {
        Ok(Vec::new())
    }

    async fn element_present(&self, locator: &str) -> bool {
        if locator == CHALLENGE_LOCATOR {
            return self.state.lock().unwrap().challenge_present;
        }
        false
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let s = self.state.lock().unwrap();
        Ok(match s.opened {
            Some(i) => format!("https://mock.example/view/{}", s.listings[i].id),
            None => "https://mock.example/".to_string(),
        })
    }

    async fn scroll_to_bottom(&self) -> Result<(), DriverError> {
        self.record_interaction("scroll");
        let mut s = self.state.lock().unwrap();
        let mut grown = std::mem::take(&mut s.pending_listings);
        s.listings.append(&mut grown);
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), DriverError> {
        std::fs::write(path, b"png").map_err(|e| DriverError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn release(&self) {
        self.state.lock().unwrap().released = true;
    }
}

struct MockLauncher {
    state: Shared,
    fail: bool,
}

#[async_trait]
impl DriverLauncher for MockLauncher {
    async fn launch(&self) -> Result<Arc<dyn BrowserDriver>, CrawlError> {
        if self.fail {
            return Err(CrawlError::SessionLaunch("no browser installed".into()));
        }
        Ok(Arc::new(MockDriver {
            state: self.state.clone(),
        }))
    }
}

struct MockStrategy {
    state: Shared,
}

#[async_trait]
impl SiteStrategy for MockStrategy {
    fn name(&self) -> &'static str {
        "mocksite"
    }

    fn home_url(&self) -> String {
        "https://mock.example/".to_string()
    }

    fn pagination_style(&self) -> PaginationStyle {
        if self.state.lock().unwrap().incremental {
            PaginationStyle::IncrementalLoad
        } else {
            PaginationStyle::Paged
        }
    }

    fn challenge_locator(&self) -> &str {
        CHALLENGE_LOCATOR
    }

    fn results_wrapper(&self) -> &str {
        "wrapper"
    }

    fn field_map(&self) -> FieldMap {
        FieldMap {
            title: "title".into(),
            company: "company".into(),
            location: "location".into(),
            description: "description".into(),
            apply_button: None,
            easy_apply: None,
            details: None,
            benefits: None,
        }
    }

    fn listing_url(&self, id: &str) -> String {
        format!("https://mock.example/view/{id}")
    }

    async fn dismiss_popups(&self, _driver: &dyn BrowserDriver) -> Result<(), CrawlError> {
        Ok(())
    }

    async fn login(
        &self,
        _driver: &dyn BrowserDriver,
        _credentials: &jobscout::core::config::Credentials,
    ) -> Result<(), CrawlError> {
        Ok(())
    }

    async fn search(
        &self,
        _driver: &dyn BrowserDriver,
        task: &SearchTask,
    ) -> Result<(), CrawlError> {
        self.state
            .lock()
            .unwrap()
            .searches_issued
            .push(task.term.clone());
        Ok(())
    }

    async fn list_elements(
        &self,
        _driver: &dyn BrowserDriver,
    ) -> Result<Vec<Arc<dyn DriverElement>>, CrawlError> {
        let count = self.state.lock().unwrap().listings.len();
        Ok((0..count)
            .map(|index| {
                Arc::new(ListingElement {
                    state: self.state.clone(),
                    index,
                }) as Arc<dyn DriverElement>
            })
            .collect())
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
        {
            let s = self.state.lock().unwrap();
            if let (Some(i), Some(bad)) = (s.opened, s.fail_id_after_open_for.as_deref()) {
                if s.listings[i].id == bad {
                    return Err(CrawlError::NavigationTimeout {
                        locator: "job id in url".into(),
                    });
                }
            }
        }
        let url = driver.current_url().await?;
        Ok(url.rsplit('/').next().unwrap_or_default().to_string())
    }

    async fn next_page_affordance(
        &self,
        _driver: &dyn BrowserDriver,
    ) -> Result<Option<Arc<dyn DriverElement>>, CrawlError> {
        Ok(None)
    }

    async fn load_more(&self, driver: &dyn BrowserDriver) -> Result<(), CrawlError> {
        if self.state.lock().unwrap().incremental {
            driver.scroll_to_bottom().await?;
        }
        Ok(())
    }
}

// ── Test wiring ──────────────────────────────────────────────────────────────

fn fast_tuning() -> GateTuning {
    GateTuning {
        poll_interval: Duration::from_millis(10),
        passive_window: Duration::from_millis(60),
        passive_poll: Duration::from_millis(10),
        active_window: Duration::from_millis(60),
        attempt_wait: Duration::from_millis(10),
    }
}

fn session(
    state: &Shared,
    records_dir: PathBuf,
    keywords: &[&str],
    excludes: &[&str],
    searches: Vec<SearchTask>,
) -> CrawlSession {
    let config = ScoutConfig {
        site: Some("mocksite".into()),
        searches,
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        full_match: false,
        exclude_keywords: excludes.iter().map(|s| s.to_string()).collect(),
        credentials: None,
        max_pages: Some(5),
        records_dir: Some(records_dir),
    };
    CrawlSession::new(
        Arc::new(MockStrategy {
            state: state.clone(),
        }),
        Arc::new(MockLauncher {
            state: state.clone(),
            fail: false,
        }),
        &config,
    )
    .with_gate_tuning(fast_tuning())
    .with_timing(
        RequestDelay::new(0, 0),
        RecordExtractor::new(Duration::from_millis(50), Duration::from_millis(10), 1),
        Duration::from_millis(50),
    )
}

fn persisted_ids(records_dir: &Path) -> HashSet<String> {
    PersistenceSink::new(records_dir, "mocksite")
        .existing_ids()
        .unwrap()
}

/// Pre-seed the record directory as a previous run would have left it.
fn seed_records(records_dir: &Path, ids: &[&str]) {
    let sink = PersistenceSink::new(records_dir, "mocksite");
    let filter = RelevanceFilter::new::<&str>(&[], &[], MatchMode::Any);
    let mut store = RecordStore::new(HashSet::new());
    for id in ids {
        let record = jobscout::core::types::ListingRecord {
            id: id.to_string(),
            url: format!("https://mock.example/view/{id}"),
            title: "old".into(),
            company: "old".into(),
            location: "old".into(),
            description: "old".into(),
            details: None,
            benefits: None,
            easy_apply: None,
        };
        store.try_admit(record, &filter);
    }
    sink.flush(&mut store).unwrap();
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_listing_is_persisted_and_known_ones_never_reopened() {
    let tmp = tempfile::tempdir().unwrap();
    seed_records(tmp.path(), &["1", "2"]);

    let state: Shared = Arc::new(Mutex::new(SiteState {
        listings: vec![
            MockListing::new("1", "Old role", "java role"),
            MockListing::new("2", "Other old role", "java role"),
            MockListing::new("3", "New role", "java developer wanted"),
        ],
        ..Default::default()
    }));

    let mut session = session(
        &state,
        tmp.path().to_path_buf(),
        &["java"],
        &[],
        vec![SearchTask::new("developer")],
    );
    session.start().await.unwrap();

    assert_eq!(
        persisted_ids(tmp.path()),
        HashSet::from(["1".to_string(), "2".to_string(), "3".to_string()])
    );

    let s = state.lock().unwrap();
    // Ids 1 and 2 were skipped from the list element alone.
    assert_eq!(s.detail_opens, vec!["3".to_string()]);
    assert!(s.gate_violations.is_empty());
    assert!(s.released, "browser session must be released on teardown");
}

#[tokio::test]
async fn exclude_term_rejects_despite_include_match() {
    let tmp = tempfile::tempdir().unwrap();
    let state: Shared = Arc::new(Mutex::new(SiteState {
        listings: vec![MockListing::new(
            "77",
            "Java backend",
            "Java backend, fluent english required",
        )],
        ..Default::default()
    }));

    let mut session = session(
        &state,
        tmp.path().to_path_buf(),
        &["java"],
        &["english"],
        vec![SearchTask::new("java")],
    );
    session.start().await.unwrap();

    assert!(persisted_ids(tmp.path()).is_empty());
    // Filtered out, not seen: the detail view *was* opened (extraction
    // happens before filtering) but nothing was written.
    assert_eq!(state.lock().unwrap().detail_opens, vec!["77".to_string()]);
}

#[tokio::test]
async fn rerun_against_same_store_writes_nothing_new() {
    let tmp = tempfile::tempdir().unwrap();
    let listings = vec![MockListing::new("9", "Role", "java daily")];

    for run in 0..2 {
        let state: Shared = Arc::new(Mutex::new(SiteState {
            listings: listings.clone(),
            ..Default::default()
        }));
        let mut session = session(
            &state,
            tmp.path().to_path_buf(),
            &["java"],
            &[],
            vec![SearchTask::new("java")],
        );
        session.start().await.unwrap();
        if run == 1 {
            assert!(
                state.lock().unwrap().detail_opens.is_empty(),
                "second run must not re-open a persisted listing"
            );
        }
    }
    assert_eq!(persisted_ids(tmp.path()), HashSet::from(["9".to_string()]));
}

#[tokio::test]
async fn missing_result_view_skips_task_and_continues() {
    let tmp = tempfile::tempdir().unwrap();
    let state: Shared = Arc::new(Mutex::new(SiteState {
        listings: vec![MockListing::new("5", "Role", "java daily")],
        broken_terms: HashSet::from(["broken".to_string()]),
        ..Default::default()
    }));

    let mut session = session(
        &state,
        tmp.path().to_path_buf(),
        &["java"],
        &[],
        vec![SearchTask::new("broken"), SearchTask::new("java")],
    );
    session.start().await.unwrap();

    // First task timed out, second still ran and persisted.
    assert_eq!(persisted_ids(tmp.path()), HashSet::from(["5".to_string()]));
    assert_eq!(
        state.lock().unwrap().searches_issued,
        vec!["broken".to_string(), "java".to_string()]
    );
}

#[tokio::test]
async fn abandoned_task_still_flushes_admitted_records() {
    let tmp = tempfile::tempdir().unwrap();
    // Ids resolve only after the detail view opens; resolution breaks on the
    // second listing, abandoning the task after the first was admitted.
    let state: Shared = Arc::new(Mutex::new(SiteState {
        listings: vec![
            MockListing::new("L1", "Kept role", "java daily"),
            MockListing::new("L2", "Broken role", "java daily"),
        ],
        hide_list_ids: true,
        fail_id_after_open_for: Some("L2".to_string()),
        ..Default::default()
    }));

    let mut session = session(
        &state,
        tmp.path().to_path_buf(),
        &["java"],
        &[],
        vec![SearchTask::new("java")],
    );
    // Task-recoverable failure: the run itself still succeeds.
    session.start().await.unwrap();

    // The record admitted before the task was abandoned must reach disk.
    assert_eq!(persisted_ids(tmp.path()), HashSet::from(["L1".to_string()]));
}

#[tokio::test]
async fn incremental_list_growth_is_consumed_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let state: Shared = Arc::new(Mutex::new(SiteState {
        listings: vec![MockListing::new("c1", "First", "java one")],
        pending_listings: vec![
            MockListing::new("c2", "Second", "java two"),
            MockListing::new("c3", "Third", "java three"),
        ],
        incremental: true,
        // The challenge appears while the last listing's detail view is
        // still rendering; the scroll that follows must wait it out.
        raise_challenge_on_open: Some("c3".to_string()),
        field_delay_ms: 30,
        ..Default::default()
    }));

    let mut session = session(
        &state,
        tmp.path().to_path_buf(),
        &["java"],
        &[],
        vec![SearchTask::new("java")],
    );

    let clearer = {
        let state = state.clone();
        tokio::spawn(async move {
            for _ in 0..500 {
                if state.lock().unwrap().challenge_present {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
            state.lock().unwrap().challenge_present = false;
        })
    };

    session.start().await.unwrap();
    clearer.await.unwrap();

    let s = state.lock().unwrap();
    // Scroll-grown entries are consumed exactly once, in list order.
    assert_eq!(
        s.detail_opens,
        vec!["c1".to_string(), "c2".to_string(), "c3".to_string()]
    );
    assert!(
        s.gate_violations.is_empty(),
        "interacting calls while paused: {:?}",
        s.gate_violations
    );
    drop(s);
    assert_eq!(
        persisted_ids(tmp.path()),
        HashSet::from(["c1".to_string(), "c2".to_string(), "c3".to_string()])
    );
}

#[tokio::test]
async fn crawl_pauses_while_challenge_is_on_screen() {
    let tmp = tempfile::tempdir().unwrap();
    let state: Shared = Arc::new(Mutex::new(SiteState {
        listings: vec![
            MockListing::new("a1", "Role 1", "java one"),
            MockListing::new("a2", "Role 2", "java two"),
        ],
        // The challenge appears right after the first detail view opens.
        raise_challenge_on_open: Some("a1".to_string()),
        ..Default::default()
    }));

    // Pacing well above the 10ms gate poll, so the watcher always observes
    // the challenge before the crawl reaches its next interacting call.
    let mut session = session(
        &state,
        tmp.path().to_path_buf(),
        &["java"],
        &[],
        vec![SearchTask::new("java")],
    )
    .with_timing(
        RequestDelay::new(100, 100),
        RecordExtractor::new(Duration::from_millis(50), Duration::from_millis(10), 1),
        Duration::from_millis(50),
    );

    // Clear the challenge a while after it appears; until then the crawl
    // must stay parked.
    let clearer = {
        let state = state.clone();
        tokio::spawn(async move {
            for _ in 0..500 {
                if state.lock().unwrap().challenge_present {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
            state.lock().unwrap().challenge_present = false;
        })
    };

    session.start().await.unwrap();
    clearer.await.unwrap();

    let s = state.lock().unwrap();
    assert!(
        s.gate_violations.is_empty(),
        "interacting calls while paused: {:?}",
        s.gate_violations
    );
    // Once cleared, the queued work proceeded in list order.
    assert_eq!(s.detail_opens, vec!["a1".to_string(), "a2".to_string()]);
    drop(s);
    assert_eq!(
        persisted_ids(tmp.path()),
        HashSet::from(["a1".to_string(), "a2".to_string()])
    );
}

#[tokio::test]
async fn lifecycle_transitions() {
    let tmp = tempfile::tempdir().unwrap();
    let state: Shared = Arc::new(Mutex::new(SiteState::default()));

    let mut session = session(
        &state,
        tmp.path().to_path_buf(),
        &[],
        &[],
        vec![SearchTask::new("anything")],
    );
    assert_eq!(session.state(), CrawlState::Ready);

    session.start().await.unwrap();
    assert_eq!(session.state(), CrawlState::Stopped);

    // start() from Stopped is a no-op.
    session.start().await.unwrap();
    assert_eq!(session.state(), CrawlState::Stopped);

    session.reset();
    assert_eq!(session.state(), CrawlState::Ready);
}

#[tokio::test]
async fn unreadable_detail_view_skips_only_that_listing() {
    let tmp = tempfile::tempdir().unwrap();
    let state: Shared = Arc::new(Mutex::new(SiteState {
        listings: vec![
            MockListing::new("b1", "Flaky role", "java daily"),
            MockListing::new("b2", "Solid role", "java daily"),
        ],
        missing_fields_for: Some("b1".to_string()),
        ..Default::default()
    }));

    let mut session = session(
        &state,
        tmp.path().to_path_buf(),
        &["java"],
        &[],
        vec![SearchTask::new("java")],
    );
    // The whole run still succeeds; the unreadable listing is skipped.
    session.start().await.unwrap();

    assert_eq!(persisted_ids(tmp.path()), HashSet::from(["b2".to_string()]));
    // b1 was opened (and retried) but never persisted or marked seen, so a
    // later run may pick it up again.
    assert!(state.lock().unwrap().detail_opens.contains(&"b1".to_string()));
}

#[tokio::test]
async fn fatal_failure_flushes_admitted_work_and_snapshots() {
    let records = tempfile::tempdir().unwrap();
    let snapshots = tempfile::tempdir().unwrap();
    let state: Shared = Arc::new(Mutex::new(SiteState {
        listings: vec![
            MockListing::new("x1", "Good role", "java daily"),
            MockListing::new("x2", "Broken role", "java daily"),
        ],
        fail_click_on: Some("x2".to_string()),
        ..Default::default()
    }));

    let mut session = session(
        &state,
        records.path().to_path_buf(),
        &["java"],
        &[],
        vec![SearchTask::new("java")],
    )
    .with_snapshot_dir(snapshots.path().to_path_buf());

    let err = session.start().await.unwrap_err();
    assert!(matches!(err, CrawlError::Driver(_)));
    assert_eq!(session.state(), CrawlState::Stopped);

    // Work admitted before the failure survived the crash.
    assert_eq!(
        persisted_ids(records.path()),
        HashSet::from(["x1".to_string()])
    );
    assert!(state.lock().unwrap().released);

    // One timestamped diagnostic snapshot was captured.
    let snaps: Vec<_> = std::fs::read_dir(snapshots.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(snaps.len(), 1);
    assert!(snaps[0].ends_with("_ERROR.png"));
}

#[tokio::test]
async fn failed_launch_is_fatal_and_stays_ready() {
    let tmp = tempfile::tempdir().unwrap();
    let state: Shared = Arc::new(Mutex::new(SiteState::default()));
    let config = ScoutConfig {
        searches: vec![SearchTask::new("java")],
        records_dir: Some(tmp.path().to_path_buf()),
        ..Default::default()
    };
    let mut session = CrawlSession::new(
        Arc::new(MockStrategy {
            state: state.clone(),
        }),
        Arc::new(MockLauncher { state, fail: true }),
        &config,
    );

    let err = session.start().await.unwrap_err();
    assert!(matches!(err, CrawlError::SessionLaunch(_)));
    assert_eq!(session.state(), CrawlState::Ready);
}
