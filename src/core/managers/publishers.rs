use crate::core::models::config::ExchangeConfig;
use crate::core::resolver::RegisteredPubs;

/// Builds the static allow-list fallback (§4.4 fallback step 4) from
/// whatever the operator baked into config. Empty by default; a
/// deployment with no relational store reachable at all still serves
/// the publishers listed here.
pub fn build_registered_pubs(config: &ExchangeConfig) -> RegisteredPubs {
    let entries = config
        .registered_publishers
        .iter()
        .map(|p| (p.id.clone(), p.clone()))
        .collect();

    RegisteredPubs { entries }
}
