use crate::app::pipeline::core::Pipeline;
use crate::app::pipeline::ortb::{AuctionContext, AuctionError};
use crate::core::adapters::registry::AdapterRegistry;
use crate::core::admin::AdminAuthGate;
use crate::core::analytics::AnalyticsEmitter;
use crate::core::circuit::CircuitBreakerRegistry;
use crate::core::currency::converter::{AggregateConverter, CurrencyConverter};
use crate::core::models::config::ExchangeConfig;
use crate::core::privacy::PrivacyGate;
use crate::core::resolver::ConfigResolver;
use std::sync::{Arc, Mutex, OnceLock};

/// Everything the startup pipeline assembles, in the order it becomes
/// available. Each slot is written exactly once by the task that owns
/// it; later tasks (and the running server) read through `OnceLock`s
/// rather than re-deriving state.
#[derive(Default)]
pub struct StartupContext {
    pub config: OnceLock<ExchangeConfig>,
    pub adapters: OnceLock<Arc<AdapterRegistry>>,
    pub breakers: OnceLock<Arc<CircuitBreakerRegistry>>,
    pub currency_converter: OnceLock<Arc<CurrencyConverter>>,
    pub currency: OnceLock<Arc<AggregateConverter>>,
    pub resolver: OnceLock<Arc<ConfigResolver>>,
    pub privacy_gate: OnceLock<Arc<PrivacyGate>>,
    pub analytics: OnceLock<Arc<AnalyticsEmitter>>,
    pub admin_gate: OnceLock<Arc<AdminAuthGate>>,
    pub auction_pipeline: OnceLock<Arc<Pipeline<AuctionContext, AuctionError>>>,

    /// Background handles collected so shutdown can abort them cleanly.
    pub currency_refresher: Mutex<Option<tokio::task::JoinHandle<()>>>,
    pub analytics_worker: Mutex<Option<tokio::task::JoinHandle<()>>>,
    pub server_handle: Mutex<Option<actix_web::dev::ServerHandle>>,
}
