pub mod errors;
pub mod kargo;
pub mod registry;
pub mod rubicon;

pub use errors::{AdapterError, AdapterErrorKind};
pub use registry::{AdapterRegistry, BidderAdapter, BidderResponse, ExtraInfo, OutboundRequest, ResponseData};
