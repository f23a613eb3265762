//! Per-provider circuit breaking for search.
//!
//! A provider that keeps failing is taken out of rotation for
//! `recovery_timeout`. After that it is admitted again on probation and
//! returns to normal service once `success_threshold` calls in a row succeed;
//! any failure on probation takes it out again.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,

    #[serde(with = "crate::config::duration_str")]
    pub recovery_timeout: Duration,

    /// Consecutive probation successes that close it again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy)]
struct Circuit {
    state: CircuitState,
    /// Failures while closed, successes while half-open
    streak: u32,
    opened_at: Instant,
}

impl Circuit {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            streak: 0,
            opened_at: Instant::now(),
        }
    }

    fn trip(&mut self) {
        self.state = CircuitState::Open;
        self.streak = 0;
        self.opened_at = Instant::now();
    }
}

/// Circuits keyed by provider name.
#[derive(Debug)]
pub struct CircuitBreaker {
    circuits: Mutex<HashMap<String, Circuit>>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            circuits: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Whether `provider` may be called now. An open circuit whose recovery
    /// timeout has passed moves to half-open and admits the call.
    pub fn allows(&self, provider: &str) -> bool {
        let mut circuits = self.circuits.lock();
        let Some(circuit) = circuits.get_mut(provider) else {
            return true;
        };

        if circuit.state != CircuitState::Open {
            return true;
        }
        if circuit.opened_at.elapsed() < self.config.recovery_timeout {
            return false;
        }

        circuit.state = CircuitState::HalfOpen;
        circuit.streak = 0;
        tracing::info!(provider, "Circuit half-open, admitting trial call");
        true
    }

    pub fn on_success(&self, provider: &str) {
        let mut circuits = self.circuits.lock();
        let Some(circuit) = circuits.get_mut(provider) else {
            return;
        };

        match circuit.state {
            CircuitState::Closed => circuit.streak = 0,
            CircuitState::HalfOpen => {
                circuit.streak += 1;
                if circuit.streak >= self.config.success_threshold {
                    *circuit = Circuit::closed();
                    tracing::info!(provider, "Circuit closed, provider recovered");
                }
            }
            CircuitState::Open => {}
        }
    }

    pub fn on_failure(&self, provider: &str) {
        let mut circuits = self.circuits.lock();
        let circuit = circuits
            .entry(provider.to_string())
            .or_insert_with(Circuit::closed);

        match circuit.state {
            CircuitState::Closed => {
                circuit.streak += 1;
                if circuit.streak >= self.config.failure_threshold {
                    tracing::warn!(provider, failures = circuit.streak, "Circuit opened");
                    circuit.trip();
                }
            }
            CircuitState::HalfOpen => {
                tracing::warn!(provider, "Trial call failed, circuit reopened");
                circuit.trip();
            }
            CircuitState::Open => {}
        }
    }

    pub fn state(&self, provider: &str) -> CircuitState {
        self.circuits
            .lock()
            .get(provider)
            .map_or(CircuitState::Closed, |circuit| circuit.state)
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
