pub mod analytics;
pub mod auction;
pub mod privacy;
pub mod resolve;
pub mod validate;
