//! Challenge gate — the single synchronization point between the crawl loop
//! and interactive anti-bot challenges.
//!
//! A background task polls the site's challenge locator. While a challenge is
//! on screen the shared flag is raised and every waiter suspends; once it
//! clears, waiters resume in their original order. The gate never aborts the
//! crawl: a challenge that outlives both resolution windows leaves the loop
//! paused until a later poll cycle finds it gone (liveness over deadline).

use crate::driver::BrowserDriver;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Poll and resolution-window timing. Defaults match production; tests
/// shrink everything.
#[derive(Debug, Clone, Copy)]
pub struct GateTuning {
    /// Outer detection poll interval.
    pub poll_interval: Duration,
    /// Passive phase: total window to let the challenge clear on its own.
    pub passive_window: Duration,
    /// Passive phase re-poll interval.
    pub passive_poll: Duration,
    /// Active phase: total window for interaction attempts.
    pub active_window: Duration,
    /// Settle wait after each interaction attempt.
    pub attempt_wait: Duration,
}

impl Default for GateTuning {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            passive_window: Duration::from_secs(25),
            passive_poll: Duration::from_secs(3),
            active_window: Duration::from_secs(40),
            attempt_wait: Duration::from_secs(5),
        }
    }
}

enum Resolution {
    Cleared,
    Unresolved,
    Shutdown,
}

/// Handle to the running watcher task. The task is the sole writer of the
/// challenge flag; the crawl loop only reads and waits.
pub struct ChallengeGate {
    state_rx: watch::Receiver<bool>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ChallengeGate {
    /// Spawn the watcher over the given session and challenge locator.
    pub fn spawn(driver: Arc<dyn BrowserDriver>, locator: String, tuning: GateTuning) -> Self {
        let (state_tx, state_rx) = watch::channel(false);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(watch_loop(driver, locator, tuning, state_tx, shutdown_rx));
        Self {
            state_rx,
            shutdown_tx,
            handle,
        }
    }

    /// Current challenge flag. Never cache this across driver interactions —
    /// re-check (or better, [`wait_ready`](Self::wait_ready)) before each one.
    pub fn is_active(&self) -> bool {
        *self.state_rx.borrow()
    }

    /// Suspend until no challenge is on screen. Returns immediately when the
    /// flag is already clear.
    pub async fn wait_ready(&self) {
        let mut rx = self.state_rx.clone();
        // An Err means the watcher ended (teardown) — nothing left to wait on.
        let _ = rx.wait_for(|active| !active).await;
    }

    /// Cooperative teardown: signal the watcher and wait for it to finish,
    /// so no gate-owned interaction races session shutdown.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.handle.await {
            warn!("challenge watcher ended abnormally: {}", e);
        }
        debug!("challenge watcher stopped");
    }
}

/// Sleep that wakes early on shutdown. Returns `true` when shutdown fired.
async fn sleep_or_shutdown(duration: Duration, shutdown_rx: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = shutdown_rx.wait_for(|s| *s) => true,
    }
}

async fn watch_loop(
    driver: Arc<dyn BrowserDriver>,
    locator: String,
    tuning: GateTuning,
    state_tx: watch::Sender<bool>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    debug!("challenge watcher started");
    loop {
        if sleep_or_shutdown(tuning.poll_interval, &mut shutdown_rx).await {
            break;
        }
        let present = driver.element_present(&locator).await;
        let active = *state_tx.borrow();

        if !present {
            if active {
                // A previously unresolved challenge finally went away.
                info!("challenge cleared — resuming crawl");
                state_tx.send_replace(false);
            }
            continue;
        }

        if active {
            continue; // still paused; keep polling
        }

        warn!("challenge detected — pausing crawl");
        state_tx.send_replace(true);

        match resolve(&driver, &locator, &tuning, &mut shutdown_rx).await {
            Resolution::Cleared => {
                info!("challenge resolved — resuming crawl");
                state_tx.send_replace(false);
            }
            Resolution::Unresolved => {
                // Deliberate: stay paused and fall back to outer polling
                // instead of aborting the crawl.
                warn!("challenge unresolved after both windows — crawl stays paused");
            }
            Resolution::Shutdown => break,
        }
    }
}

/// Two-phase resolution: wait for self-clearance, then try bounded
/// interaction attempts.
async fn resolve(
    driver: &Arc<dyn BrowserDriver>,
    locator: &str,
    tuning: &GateTuning,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> Resolution {
    // Passive phase: many challenges clear on their own (or are solved by a
    // human watching the session).
    let passive_deadline = tokio::time::Instant::now() + tuning.passive_window;
    while tokio::time::Instant::now() < passive_deadline {
        if sleep_or_shutdown(tuning.passive_poll, shutdown_rx).await {
            return Resolution::Shutdown;
        }
        if !driver.element_present(locator).await {
            debug!("challenge cleared during passive phase");
            return Resolution::Cleared;
        }
    }

    // Active phase: bounded interaction attempts. The crawl loop is parked
    // on the flag, so these are the only driver interactions right now.
    debug!("passive phase exhausted — starting interaction attempts");
    let active_deadline = tokio::time::Instant::now() + tuning.active_window;
    while tokio::time::Instant::now() < active_deadline {
        if let Err(e) = driver.click(locator).await {
            debug!("challenge interaction attempt failed: {}", e);
        }
        if sleep_or_shutdown(tuning.attempt_wait, shutdown_rx).await {
            return Resolution::Shutdown;
        }
        if !driver.element_present(locator).await {
            debug!("challenge cleared during active phase");
            return Resolution::Cleared;
        }
    }

    Resolution::Unresolved
}
