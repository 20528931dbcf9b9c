pub mod auth;

pub use auth::AdminAuthGate;
