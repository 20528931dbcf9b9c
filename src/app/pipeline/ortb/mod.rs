pub mod context;
pub mod pipeline;
pub mod tasks;

pub use context::{AuctionContext, AuctionError};
pub use pipeline::build_auction_pipeline;
