//! Wire types for the bridge's request bodies.

pub mod eval;
