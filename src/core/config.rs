use crate::core::types::SearchTask;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ScoutConfig — file-based config loader (jobscout.json) with env-var fallback
// ---------------------------------------------------------------------------

/// Optional login credentials. When absent, the site is crawled anonymously
/// and the strategy's login flow is skipped entirely.
#[derive(serde::Deserialize, Clone)]
pub struct Credentials {
    pub username: String,
    /// Never logged.
    #[serde(default)]
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Top-level config loaded from `jobscout.json`.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ScoutConfig {
    /// Site strategy to run — `"indeed"` or `"linkedin"`.
    pub site: Option<String>,
    /// Ordered list of searches; processed in this exact order.
    #[serde(default)]
    pub searches: Vec<SearchTask>,
    /// Include keywords for the relevance filter. Empty ⇒ admit everything.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// When true, ALL include keywords must match; default is any-match.
    #[serde(default)]
    pub full_match: bool,
    /// Exclude keywords — any match rejects the listing, overriding includes.
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Hard cap on result pages visited per search task.
    pub max_pages: Option<usize>,
    /// Directory holding one JSON file per persisted listing id.
    pub records_dir: Option<PathBuf>,
}

impl ScoutConfig {
    /// Site name: JSON field → `JOBSCOUT_SITE` env var → `"indeed"`.
    pub fn resolve_site(&self) -> String {
        if let Some(s) = &self.site {
            if !s.trim().is_empty() {
                return s.trim().to_lowercase();
            }
        }
        std::env::var("JOBSCOUT_SITE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|| "indeed".to_string())
    }

    /// Max pages per search task: JSON field → `JOBSCOUT_MAX_PAGES` env → 10.
    pub fn resolve_max_pages(&self) -> usize {
        if let Some(n) = self.max_pages {
            return n.max(1);
        }
        std::env::var("JOBSCOUT_MAX_PAGES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10)
    }

    /// Records directory: JSON field → `JOBSCOUT_RECORDS_DIR` env → `./jobs`.
    pub fn resolve_records_dir(&self) -> PathBuf {
        if let Some(dir) = &self.records_dir {
            return dir.clone();
        }
        std::env::var("JOBSCOUT_RECORDS_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("jobs"))
    }
}

pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";

/// Optional override for the Chromium-family browser executable.
///
/// Default behavior is auto-discovery (see `driver::chromium::find_chrome_executable()`).
/// This function only returns a value when `CHROME_EXECUTABLE` is set to an existing path.
pub fn chrome_executable_override() -> Option<String> {
    let p = std::env::var(ENV_CHROME_EXECUTABLE).ok()?;
    let p = p.trim();
    if p.is_empty() {
        return None;
    }
    if Path::new(p).exists() {
        Some(p.to_string())
    } else {
        None
    }
}

/// Load `jobscout.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `JOBSCOUT_CONFIG` env var path
/// 2. `./jobscout.json` (process cwd)
/// 3. `../jobscout.json` (one level up)
/// 4. `~/.jobscout/jobscout.json`
///
/// Missing file → `ScoutConfig::default()` (silent, all env-var fallbacks apply).
/// Parse error → log a warning, return `ScoutConfig::default()`.
pub fn load_scout_config() -> ScoutConfig {
    let candidates: Vec<PathBuf> = {
        let mut v = vec![
            PathBuf::from("jobscout.json"),
            PathBuf::from("../jobscout.json"),
        ];
        if let Some(home) = dirs::home_dir() {
            v.push(home.join(".jobscout").join("jobscout.json"));
        }
        if let Ok(env_path) = std::env::var("JOBSCOUT_CONFIG") {
            v.insert(0, PathBuf::from(env_path));
        }
        v
    };

    for path in &candidates {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<ScoutConfig>(&contents) {
                Ok(cfg) => {
                    tracing::info!("jobscout.json loaded from {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        "jobscout.json parse error at {}: {} — using defaults",
                        path.display(),
                        e
                    );
                    return ScoutConfig::default();
                }
            },
            Err(_) => continue, // file not found at this path — try next
        }
    }

    ScoutConfig::default()
}
