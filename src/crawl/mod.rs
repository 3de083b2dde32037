//! The crawl orchestration engine.

pub mod extractor;
pub mod gate;
pub mod paginator;
pub mod session;

pub use extractor::RecordExtractor;
pub use gate::{ChallengeGate, GateTuning};
pub use paginator::Paginator;
pub use session::CrawlSession;
