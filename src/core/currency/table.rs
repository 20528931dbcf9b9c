use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// Wire shape of the remote rates document, §6.5.
#[derive(Debug, Deserialize)]
pub struct RatesDocument {
    #[serde(rename = "generatedAt")]
    pub generated_at: String,
    #[serde(rename = "dataAsOf")]
    pub data_as_of: String,
    pub conversions: HashMap<String, HashMap<String, f64>>,
}

#[derive(Debug, Clone)]
pub struct CurrencyTable {
    pub generated_at: DateTime<Utc>,
    pub data_as_of: DateTime<Utc>,
    pub rates: HashMap<String, HashMap<String, f64>>,
}

impl CurrencyTable {
    pub fn empty() -> Self {
        Self {
            generated_at: DateTime::UNIX_EPOCH,
            data_as_of: DateTime::UNIX_EPOCH,
            rates: HashMap::new(),
        }
    }

    pub fn from_document(doc: RatesDocument) -> anyhow::Result<Self> {
        let generated_at = DateTime::parse_from_rfc3339(&doc.generated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        let data_as_of = DateTime::parse_from_rfc3339(&doc.data_as_of)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(generated_at);

        Ok(Self {
            generated_at,
            data_as_of,
            rates: doc.conversions,
        })
    }

    /// Direct lookup only; the converter tries both directions and the
    /// identity shortcut before calling this.
    pub fn direct_rate(&self, from: &str, to: &str) -> Option<f64> {
        self.rates.get(from)?.get(to).copied()
    }

    pub fn currency_count(&self) -> usize {
        let mut currencies: std::collections::HashSet<&str> = std::collections::HashSet::new();
        for (base, targets) in &self.rates {
            currencies.insert(base.as_str());
            currencies.extend(targets.keys().map(|s| s.as_str()));
        }
        currencies.len()
    }

    pub fn rate_count(&self) -> usize {
        self.rates.values().map(|m| m.len()).sum()
    }
}
