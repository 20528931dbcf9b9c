pub mod handlers;

pub use handlers::{AppState, configure};
