use crate::core::adapters::kargo::KargoAdapter;
use crate::core::adapters::registry::{AdapterRegistry, BidderAdapter};
use crate::core::adapters::rubicon::RubiconAdapter;
use crate::core::models::config::BidderConfigEntry;
use crate::core::resolver::{BidderSchema, FieldSpec, FieldType};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds the adapter registry from config at startup (C9), matching
/// each configured bidder code to its concrete adapter implementation.
/// An entry for a bidder code with no known adapter is skipped with a
/// warning rather than failing startup outright.
pub fn build_adapter_registry(entries: &[BidderConfigEntry]) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new();

    for entry in entries {
        let adapter: Option<Arc<dyn BidderAdapter>> = match entry.bidder.id.as_str() {
            "rubicon" => Some(Arc::new(RubiconAdapter::new(entry.endpoint.clone()))),
            "kargo" => Some(Arc::new(KargoAdapter::new(entry.endpoint.clone()))),
            other => {
                tracing::warn!(bidder = other, "no adapter implementation for configured bidder");
                None
            }
        };

        if let Some(adapter) = adapter {
            registry.register(entry.bidder.clone(), adapter);
        }
    }

    registry
}

/// Per-bidder parameter schemas (§4.4), keyed by bidder code. Only the
/// bidders the exchange actually knows how to call get a schema; an
/// unrecognized configured bidder already warned out in
/// `build_adapter_registry` and is skipped here too.
pub fn build_bidder_schemas(entries: &[BidderConfigEntry]) -> HashMap<String, BidderSchema> {
    let mut schemas = HashMap::new();

    for entry in entries {
        let schema = match entry.bidder.id.as_str() {
            "rubicon" => Some(BidderSchema::new(vec![
                FieldSpec::new("accountId", true, vec![FieldType::Integer, FieldType::DigitString]),
                FieldSpec::new("siteId", true, vec![FieldType::Integer, FieldType::DigitString]),
                FieldSpec::new("zoneId", true, vec![FieldType::Integer, FieldType::DigitString]),
            ])),
            "kargo" => Some(BidderSchema::new(vec![
                FieldSpec::new("placementId", true, vec![FieldType::StringAny]),
                FieldSpec::new("adSlotId", false, vec![FieldType::StringAny]),
            ])),
            _ => None,
        };

        if let Some(schema) = schema {
            schemas.insert(entry.bidder.id.clone(), schema);
        }
    }

    schemas
}
