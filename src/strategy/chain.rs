//! Ordered strategy chain

use tracing::{error, info, instrument, warn};

use crate::envelope::ResultEnvelope;
use crate::error::AggregationError;
use crate::query::AggregationSpec;
use super::AcquisitionStrategy;

/// A served result and the strategy that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub envelope: ResultEnvelope,
    pub strategy: String,
}

impl Acquisition {
    /// Whether a strategy other than the first one served the request
    pub fn is_degraded(&self, chain: &StrategyChain) -> bool {
        chain
            .strategies
            .first()
            .is_some_and(|first| first.name() != self.strategy)
    }
}

/// Strategies tried in order until one succeeds.
///
/// Each strategy runs to completion before the next is tried. Only
/// execution-class failures move the chain along; any other error is
/// returned as is.
#[derive(Default)]
pub struct StrategyChain {
    strategies: Vec<Box<dyn AcquisitionStrategy>>,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: impl AcquisitionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn push(&mut self, strategy: Box<dyn AcquisitionStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    #[instrument(name = "strategy::chain::run", level = "debug", skip(self, spec), fields(dataset = %spec.dataset))]
    pub fn run(&self, spec: &AggregationSpec) -> Result<Acquisition, AggregationError> {
        let mut last_error = None;

        for strategy in &self.strategies {
            match strategy.acquire(spec) {
                Ok(envelope) => {
                    info!(
                        strategy = strategy.name(),
                        rows = envelope.rows.len(),
                        truncated = envelope.truncated,
                        elapsed_ms = envelope.elapsed_ms,
                        "served aggregation"
                    );
                    return Ok(Acquisition {
                        envelope,
                        strategy: strategy.name().to_string(),
                    });
                }
                Err(err) if err.is_fallback_eligible() => {
                    warn!(strategy = strategy.name(), error = %err, "strategy failed, trying next");
                    last_error = Some(err);
                }
                Err(err) => {
                    if let AggregationError::Internal(detail) = &err {
                        error!(strategy = strategy.name(), %detail, "internal error during acquisition");
                    }
                    return Err(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            error!("strategy chain is empty");
            AggregationError::Internal("no acquisition strategy configured".to_string())
        }))
    }
}
