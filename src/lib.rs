pub mod core;
pub mod crawl;
pub mod driver;
pub mod filter;
pub mod pacing;
pub mod site;
pub mod store;

// --- Primary exports ---
pub use core::config::{load_scout_config, ScoutConfig};
pub use core::types;
pub use core::types::*;
pub use core::{CrawlError, DriverError};
pub use crawl::{ChallengeGate, CrawlSession, GateTuning, Paginator, RecordExtractor};
pub use filter::{MatchMode, RelevanceFilter};
pub use site::{strategy_by_name, SiteStrategy};
pub use store::{sink::PersistenceSink, RecordStore};
