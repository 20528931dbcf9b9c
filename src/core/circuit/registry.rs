use crate::core::circuit::breaker::CircuitBreaker;
use dashmap::DashMap;
use std::time::Duration;

/// Process-wide-by-construction, not by singleton: this registry is owned
/// by whatever builds the auction engine, so a fresh `Exchange` in tests
/// gets a fresh set of breakers (§9 design note).
pub struct CircuitBreakerRegistry {
    breakers: DashMap<String, CircuitBreaker>,
    failure_threshold: u32,
    cooldown: Duration,
}

impl CircuitBreakerRegistry {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            breakers: DashMap::new(),
            failure_threshold,
            cooldown,
        }
    }

    pub fn allow(&self, bidder_id: &str) -> bool {
        self.breaker_for(bidder_id).allow()
    }

    pub fn record_success(&self, bidder_id: &str) {
        self.breaker_for(bidder_id).record_success();
    }

    pub fn record_failure(&self, bidder_id: &str) {
        self.breaker_for(bidder_id).record_failure();
    }

    fn breaker_for(&self, bidder_id: &str) -> dashmap::mapref::one::Ref<'_, String, CircuitBreaker> {
        if !self.breakers.contains_key(bidder_id) {
            self.breakers.entry(bidder_id.to_string()).or_insert_with(|| {
                CircuitBreaker::new(self.failure_threshold, self.cooldown)
            });
        }

        self.breakers.get(bidder_id).expect("just inserted")
    }
}
