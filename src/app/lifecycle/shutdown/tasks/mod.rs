pub mod flush_analytics;
pub mod stop_currency_refresher;
pub mod stop_server;
