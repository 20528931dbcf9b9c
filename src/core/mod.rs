pub mod adapters;
pub mod admin;
pub mod analytics;
pub mod circuit;
pub mod currency;
pub mod managers;
pub mod models;
pub mod privacy;
pub mod resolver;
