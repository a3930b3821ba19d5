//! Shared application state for the HTTP server.
//!
//! [`AppState`] carries the injected evaluator and the per-request limits.
//! It is cloned into every handler; the evaluator sits behind an `Arc` and
//! needs no lock, since [`Evaluator::evaluate`] takes `&self`.

use std::sync::Arc;
use std::time::Duration;

use crate::config::BridgeConfig;
use crate::evaluator::Evaluator;

#[derive(Clone)]
pub struct AppState {
    /// Host scripting engine.
    pub evaluator: Arc<dyn Evaluator>,
    /// How long a POST waits for the evaluator before answering 504.
    pub eval_timeout: Duration,
    /// Largest accepted POST body, in bytes.
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &BridgeConfig, evaluator: Arc<dyn Evaluator>) -> Self {
        AppState {
            evaluator,
            eval_timeout: config.eval_timeout,
            max_body_bytes: config.max_body_bytes,
        }
    }

    /// State with default limits around `evaluator` (for testing and embedding).
    pub fn with_evaluator(evaluator: impl Evaluator) -> Self {
        AppState::new(&BridgeConfig::default(), Arc::new(evaluator))
    }
}
