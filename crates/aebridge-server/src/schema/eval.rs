//! The POST request envelope.

use serde::Deserialize;

use crate::error::BridgeError;

/// JSON body of a script-execution request.
///
/// Fields other than `to_eval` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EvalRequest {
    /// Script text handed to the evaluator verbatim.
    pub to_eval: String,
}

impl EvalRequest {
    /// Parses a buffered request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, BridgeError> {
        serde_json::from_slice(body).map_err(|err| BridgeError::MalformedRequestBody(err.to_string()))
    }
}
