use crate::core::currency::table::{CurrencyTable, RatesDocument};
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug)]
pub enum CurrencyError {
    NotAvailable { from: String, to: String },
}

impl std::fmt::Display for CurrencyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrencyError::NotAvailable { from, to } => {
                write!(f, "no conversion rate available from {from} to {to}")
            }
        }
    }
}

impl std::error::Error for CurrencyError {}

pub struct Stats {
    pub running: bool,
    pub consecutive_fetch_errors: u64,
    pub rates_loaded: usize,
    pub currency_count: usize,
    pub data_as_of: DateTime<Utc>,
    pub last_fetch: DateTime<Utc>,
    pub age: Duration,
    pub stale: bool,
}

/// Single-writer/many-reader rate table behind an [`ArcSwap`], refreshed
/// on a background interval (§4.2). Readers copy out one `f64` and never
/// hold a lock across an await point.
pub struct CurrencyConverter {
    table: ArcSwap<CurrencyTable>,
    rates_url: String,
    stale_threshold: Duration,
    last_fetch: ArcSwap<DateTime<Utc>>,
    consecutive_fetch_errors: AtomicU64,
    client: reqwest::Client,
}

impl CurrencyConverter {
    pub fn new(rates_url: impl Into<String>, stale_threshold: Duration) -> Self {
        Self {
            table: ArcSwap::from_pointee(CurrencyTable::empty()),
            rates_url: rates_url.into(),
            stale_threshold,
            last_fetch: ArcSwap::from_pointee(DateTime::UNIX_EPOCH),
            consecutive_fetch_errors: AtomicU64::new(0),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("reqwest client should build"),
        }
    }

    /// Spawns the background refresher. Runs until the returned handle is
    /// dropped or aborted during shutdown.
    pub fn spawn_refresher(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let converter = self.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = converter.refresh_once().await {
                    warn!("currency refresh failed: {e}");
                }
                tokio::time::sleep(interval).await;
            }
        })
    }

    pub async fn refresh_once(&self) -> anyhow::Result<()> {
        let result = self.fetch_document().await;

        match result {
            Ok(doc) => {
                let table = CurrencyTable::from_document(doc)?;
                self.table.store(Arc::new(table));
                self.last_fetch.store(Arc::new(Utc::now()));
                self.consecutive_fetch_errors.store(0, Ordering::Release);
                debug!("currency table refreshed");
                Ok(())
            }
            Err(e) => {
                self.consecutive_fetch_errors.fetch_add(1, Ordering::AcqRel);
                Err(e)
            }
        }
    }

    async fn fetch_document(&self) -> anyhow::Result<RatesDocument> {
        let response = self.client.get(&self.rates_url).send().await?;

        if response.status() != reqwest::StatusCode::OK {
            anyhow::bail!("rates source returned status {}", response.status());
        }

        Ok(response.json::<RatesDocument>().await?)
    }

    pub fn get_rate(&self, from: &str, to: &str) -> Result<f64, CurrencyError> {
        if from == to {
            return Ok(1.0);
        }

        let table = self.table.load();

        if let Some(rate) = table.direct_rate(from, to) {
            return Ok(rate);
        }

        if let Some(inverse) = table.direct_rate(to, from)
            && inverse != 0.0
        {
            return Ok(1.0 / inverse);
        }

        Err(CurrencyError::NotAvailable {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, CurrencyError> {
        Ok(amount * self.get_rate(from, to)?)
    }

    pub fn stats(&self) -> Stats {
        let table = self.table.load();
        let last_fetch = **self.last_fetch.load();
        let age = Utc::now()
            .signed_duration_since(last_fetch)
            .to_std()
            .unwrap_or(Duration::ZERO);

        Stats {
            running: true,
            consecutive_fetch_errors: self.consecutive_fetch_errors.load(Ordering::Acquire),
            rates_loaded: table.rate_count(),
            currency_count: table.currency_count(),
            data_as_of: table.data_as_of,
            last_fetch,
            age,
            stale: age > self.stale_threshold,
        }
    }
}

/// Consults caller-provided custom rates before falling back to the
/// externally refreshed table, first hit wins (§4.2 aggregate policy).
pub struct AggregateConverter {
    custom: HashMap<(String, String), f64>,
    external: Arc<CurrencyConverter>,
}

impl AggregateConverter {
    pub fn new(custom: HashMap<(String, String), f64>, external: Arc<CurrencyConverter>) -> Self {
        Self { custom, external }
    }

    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, CurrencyError> {
        if from == to {
            return Ok(amount);
        }

        if let Some(rate) = self.custom.get(&(from.to_string(), to.to_string())) {
            return Ok(amount * rate);
        }

        self.external.convert(amount, from, to)
    }
}
