pub mod breaker;
pub mod registry;

pub use breaker::{CircuitBreaker, State as CircuitState};
pub use registry::CircuitBreakerRegistry;
