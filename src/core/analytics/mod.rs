pub mod emitter;
pub mod event;

pub use emitter::{AnalyticsEmitter, AnalyticsSink, LoggingSink};
pub use event::AuctionOutcomeEvent;
