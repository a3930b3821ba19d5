//! Script execution handler.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::BridgeError;
use crate::evaluator;
use crate::schema::eval::EvalRequest;
use crate::state::AppState;

/// Forwards `to_eval` to the evaluator and answers with its result.
///
/// `POST /{*path}`
///
/// The body is parsed before the evaluator is touched, so malformed or
/// oversized requests never reach it. The wait is bounded by
/// [`AppState::eval_timeout`]; giving up drops the outcome, which the
/// evaluator sees as an abandoned reply.
pub async fn eval_script(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<String, BridgeError> {
    let span = tracing::info_span!("eval", request_id = %Uuid::new_v4());
    let result = run(state, body).instrument(span.clone()).await;
    if let Err(err) = &result {
        span.in_scope(|| tracing::warn!(status = %err.status(), error = %err, "eval request failed"));
    }
    result
}

async fn run(state: AppState, body: Result<Bytes, BytesRejection>) -> Result<String, BridgeError> {
    let request = EvalRequest::from_slice(&body?)?;
    tracing::info!(script = %request.to_eval, "script to be executed");

    let (reply, outcome) = evaluator::channel();
    state.evaluator.evaluate(request.to_eval, reply);

    let result = tokio::time::timeout(state.eval_timeout, outcome.wait())
        .await
        .map_err(|_| BridgeError::EvaluatorTimeout(state.eval_timeout))??;

    tracing::info!(result = %result, "evaluator sent back");
    Ok(result)
}
