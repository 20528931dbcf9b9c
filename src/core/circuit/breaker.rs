use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: State,
    consecutive_failures: u32,
    last_transition: Instant,
}

pub struct Stats {
    pub state: State,
    pub consecutive_failures: u32,
    pub since_last_transition: Duration,
}

/// Per-bidder failure-tracking state machine (§4.3). All counters live
/// behind a single mutex whose critical sections are constant-time, so
/// contention in the auction hot path never turns into a queue.
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    failure_threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: State::Closed,
                consecutive_failures: 0,
                last_transition: Instant::now(),
            }),
            failure_threshold,
            cooldown,
        }
    }

    /// Returns whether a call should be attempted. `false` means the
    /// breaker is open and the cool-down has not yet elapsed; the caller
    /// must skip the network call entirely (I6).
    pub fn allow(&self) -> bool {
        let mut inner = self.inner.lock();

        match inner.state {
            State::Closed => true,
            State::HalfOpen => true,
            State::Open => {
                if inner.last_transition.elapsed() >= self.cooldown {
                    inner.state = State::HalfOpen;
                    inner.last_transition = Instant::now();
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();

        match inner.state {
            State::HalfOpen => {
                inner.state = State::Closed;
                inner.consecutive_failures = 0;
                inner.last_transition = Instant::now();
            }
            State::Closed => {
                inner.consecutive_failures = 0;
            }
            State::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();

        match inner.state {
            State::HalfOpen => {
                inner.state = State::Open;
                inner.consecutive_failures += 1;
                inner.last_transition = Instant::now();
            }
            State::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.failure_threshold {
                    inner.state = State::Open;
                    inner.last_transition = Instant::now();
                }
            }
            State::Open => {}
        }
    }

    pub fn force_open(&self) {
        let mut inner = self.inner.lock();
        inner.state = State::Open;
        inner.last_transition = Instant::now();
    }

    pub fn state(&self) -> State {
        self.inner.lock().state
    }

    pub fn stats(&self) -> Stats {
        let inner = self.inner.lock();
        Stats {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            since_last_transition: inner.last_transition.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new(5, Duration::from_secs(30));

        for _ in 0..4 {
            breaker.record_failure();
            assert_eq!(breaker.state(), State::Closed);
        }

        breaker.record_failure();
        assert_eq!(breaker.state(), State::Open);
        assert!(!breaker.allow());
    }

    #[test]
    fn half_open_success_closes_and_failure_reopens() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(0));
        breaker.record_failure();
        assert_eq!(breaker.state(), State::Open);

        assert!(breaker.allow());
        assert_eq!(breaker.state(), State::HalfOpen);

        breaker.record_success();
        assert_eq!(breaker.state(), State::Closed);

        assert!(breaker.allow());
        breaker.record_failure();
        assert_eq!(breaker.state(), State::Open);
    }

    #[test]
    fn success_resets_failure_counter_while_closed() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), State::Closed);
    }
}
