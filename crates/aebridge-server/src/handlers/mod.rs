//! HTTP handlers for the bridge.
//!
//! The router sends every `GET` to [`liveness::liveness`] and every `POST`
//! to [`eval::eval_script`], whatever the path.

pub mod eval;
pub mod liveness;
