//! Ordered fallback chains.
//!
//! A chain is a list of strategies tried in order; the first one that
//! succeeds wins. Strategies that do not apply to the input are skipped
//! without counting as failures.

use async_trait::async_trait;
use std::fmt::{self, Debug, Display};

/// One way of turning an `I` into an `O`.
#[async_trait]
pub trait Strategy<I: ?Sized + Sync, O: Send, E: Send>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this strategy can be attempted for `input` at all.
    fn applies(&self, _input: &I) -> bool {
        true
    }

    async fn attempt(&self, input: &I) -> Result<O, E>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failure<E> {
    pub strategy: &'static str,
    pub error: E,
}

/// The winning value, which strategy produced it, and what failed before it.
#[derive(Debug)]
pub struct Resolved<O, E> {
    pub value: O,
    pub strategy: &'static str,
    pub failures: Vec<Failure<E>>,
}

/// Every applicable strategy failed (or none applied).
#[derive(Debug)]
pub struct ChainExhausted<E> {
    pub failures: Vec<Failure<E>>,
}

impl<E: Display> Display for ChainExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "no applicable strategy");
        }
        write!(f, "all strategies failed")?;
        for failure in &self.failures {
            write!(f, "; {}: {}", failure.strategy, failure.error)?;
        }
        Ok(())
    }
}

impl<E: Debug + Display> std::error::Error for ChainExhausted<E> {}

impl<E> ChainExhausted<E> {
    pub fn last_error(&self) -> Option<&E> {
        self.failures.last().map(|f| &f.error)
    }
}

pub struct StrategyChain<I: ?Sized + Sync, O: Send, E: Send> {
    label: &'static str,
    strategies: Vec<Box<dyn Strategy<I, O, E>>>,
}

impl<I: ?Sized + Sync, O: Send, E: Send + Display> StrategyChain<I, O, E> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            strategies: Vec::new(),
        }
    }

    pub fn with(mut self, strategy: impl Strategy<I, O, E> + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn push(&mut self, strategy: Box<dyn Strategy<I, O, E>>) {
        self.strategies.push(strategy);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Runs the strategies in order and returns the first success.
    pub async fn run(&self, input: &I) -> Result<Resolved<O, E>, ChainExhausted<E>> {
        let mut failures = Vec::new();
        for strategy in &self.strategies {
            if !strategy.applies(input) {
                log::trace!("[{}] skipping '{}': not applicable", self.label, strategy.name());
                continue;
            }
            match strategy.attempt(input).await {
                Ok(value) => {
                    if !failures.is_empty() {
                        log::debug!(
                            "[{}] '{}' succeeded after {} failure(s)",
                            self.label,
                            strategy.name(),
                            failures.len()
                        );
                    }
                    return Ok(Resolved {
                        value,
                        strategy: strategy.name(),
                        failures,
                    });
                }
                Err(error) => {
                    log::debug!("[{}] '{}' failed: {}", self.label, strategy.name(), error);
                    failures.push(Failure {
                        strategy: strategy.name(),
                        error,
                    });
                }
            }
        }
        Err(ChainExhausted { failures })
    }
}
