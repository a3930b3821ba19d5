//! The evaluator seam between the bridge and the host scripting engine.
//!
//! A host exposes its engine as `evaluate(script, on_complete)`. Here that
//! capability is the [`Evaluator`] trait, handed to the server at
//! construction. The completion callback is an [`EvalReply`], a one-shot
//! handle the evaluator may complete from any thread or task. The request
//! side holds the matching [`EvalOutcome`] and awaits it under a timeout;
//! dropping the outcome marks the reply as abandoned.

use tokio::sync::oneshot;

/// Host-supplied script evaluator.
///
/// `evaluate` must not block: implementations hand the script off and
/// complete `reply` later. Concurrent calls are unordered relative to each
/// other; an engine that needs serialization enforces it itself.
pub trait Evaluator: Send + Sync + 'static {
    fn evaluate(&self, script: String, reply: EvalReply);
}

impl<F> Evaluator for F
where
    F: Fn(String, EvalReply) + Send + Sync + 'static,
{
    fn evaluate(&self, script: String, reply: EvalReply) {
        self(script, reply)
    }
}

/// Why an evaluation produced no result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// The evaluator reported an error.
    #[error("{0}")]
    Failed(String),
    /// The reply was dropped without a result.
    #[error("evaluator dropped the request without a result")]
    Dropped,
}

/// Completion handle passed to [`Evaluator::evaluate`].
#[derive(Debug)]
pub struct EvalReply {
    tx: oneshot::Sender<Result<String, String>>,
}

/// Awaitable result of one evaluation.
#[derive(Debug)]
pub struct EvalOutcome {
    rx: oneshot::Receiver<Result<String, String>>,
}

/// Creates a connected reply/outcome pair for one evaluation.
pub fn channel() -> (EvalReply, EvalOutcome) {
    let (tx, rx) = oneshot::channel();
    (EvalReply { tx }, EvalOutcome { rx })
}

impl EvalReply {
    /// Delivers the script's textual result.
    ///
    /// Returns `false` if the request already gave up waiting.
    pub fn complete(self, result: impl Into<String>) -> bool {
        self.tx.send(Ok(result.into())).is_ok()
    }

    /// Reports an evaluator error. Returns `false` if nobody is waiting.
    pub fn fail(self, message: impl Into<String>) -> bool {
        self.tx.send(Err(message.into())).is_ok()
    }

    /// Whether the waiting request has timed out or disconnected.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the waiting request is gone.
    pub async fn abandoned(&mut self) {
        self.tx.closed().await
    }
}

impl EvalOutcome {
    /// Waits for the evaluator to complete, fail, or drop the reply.
    pub async fn wait(self) -> Result<String, EvalError> {
        match self.rx.await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(message)) => Err(EvalError::Failed(message)),
            Err(_) => Err(EvalError::Dropped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completed_reply_resolves_outcome() {
        let (reply, outcome) = channel();
        assert!(reply.complete("2"));
        assert_eq!(outcome.wait().await, Ok("2".to_string()));
    }

    #[tokio::test]
    async fn failed_reply_carries_message() {
        let (reply, outcome) = channel();
        reply.fail("ReferenceError: foo is undefined");
        assert_eq!(
            outcome.wait().await,
            Err(EvalError::Failed("ReferenceError: foo is undefined".to_string()))
        );
    }

    #[tokio::test]
    async fn dropped_reply_is_reported() {
        let (reply, outcome) = channel();
        drop(reply);
        assert_eq!(outcome.wait().await, Err(EvalError::Dropped));
    }

    #[tokio::test]
    async fn dropping_outcome_abandons_reply() {
        let (mut reply, outcome) = channel();
        assert!(!reply.is_abandoned());
        drop(outcome);
        reply.abandoned().await;
        assert!(reply.is_abandoned());
        assert!(!reply.complete("late"));
    }

    #[tokio::test]
    async fn closures_are_evaluators() {
        let evaluator = |script: String, reply: EvalReply| {
            reply.complete(script.to_uppercase());
        };
        let (reply, outcome) = channel();
        evaluator.evaluate("app.project".to_string(), reply);
        assert_eq!(outcome.wait().await.unwrap(), "APP.PROJECT");
    }
}
