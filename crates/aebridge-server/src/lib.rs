//! Local HTTP bridge into a host application's scripting engine.
//!
//! The server answers `GET` on any path with a fixed liveness string and
//! forwards the `to_eval` script of a `POST` JSON body to an injected
//! [`Evaluator`](evaluator::Evaluator), relaying the evaluator's text result
//! back as the response body. This crate contains the evaluator seam, the
//! host-command evaluator, configuration, error handling, and the axum
//! router and server loop.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod handlers;
pub mod host;
pub mod router;
pub mod schema;
pub mod server;
pub mod state;

pub use config::BridgeConfig;
pub use error::BridgeError;
pub use evaluator::{EvalError, EvalOutcome, EvalReply, Evaluator};
pub use handlers::liveness::LIVENESS_MESSAGE;
