//! Article collection: source adapters, fan-out coordination, and validation.

mod coordinator;
mod error;
mod headline_api;
mod registry;
mod rss;
mod similarity;
mod source;
mod validator;

pub use coordinator::{Coordinator, CoordinatorStats, SourceCounters};
pub use error::CollectError;
pub use headline_api::{FetchOutcome, HeadlineApiClient, TopicSpec};
pub use registry::{build_sources, builtin_specs};
pub use rss::RssSource;
pub use similarity::similarity_ratio;
pub use source::{NewsSource, RateGate};
pub use validator::{ContentValidator, RejectReason, ValidationStats};
