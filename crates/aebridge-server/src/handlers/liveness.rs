//! Liveness handler.

/// Body returned for every `GET`.
pub const LIVENESS_MESSAGE: &str = "AfterEffects is alive";

/// `GET /{*path}`
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}
