//! HTTP client for the aebridge server.
//!
//! [`BridgeClient`] pings the bridge and sends scripts to it. [`BridgeClient::eval`]
//! wraps the script in a host-side `try/catch` so an ExtendScript error comes
//! back as a JSON-encoded error object instead of blocking the host UI with a
//! dialog, then decodes the result text as JSON when it parses.
//!
//! Host objects cannot cross the wire, so [`BridgeClient::eval_returning_object`]
//! parks object results in the panel's `$._pydobe` table and hands back an
//! [`ObjectRef`] that later scripts address by id (see [`objects`]).

pub mod objects;

use serde_json::{json, Value};

pub use objects::{object_script, Collection, ObjectRef, ObjectValue};

/// Where the bridge listens by default.
pub const DEFAULT_URL: &str = "http://127.0.0.1:2000";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bridge answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The host caught an exception while running the script.
    #[error("script raised: {message}")]
    Script { message: String, error: Value },

    #[error("expected {expected} from the host, got '{text}'")]
    UnexpectedResult { expected: &'static str, text: String },

    #[error("index {index} is out of range for a collection of {len}")]
    IndexOutOfRange { index: i64, len: usize },
}

/// Decoded result of [`BridgeClient::eval`].
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    Json(Value),
    Text(String),
}

impl EvalValue {
    /// Interprets result text as JSON when possible, otherwise keeps the text.
    pub fn decode(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => EvalValue::Json(value),
            Err(_) => EvalValue::Text(text),
        }
    }

    /// Whether the host reported a caught script error (`{"error": true, ...}`).
    pub fn is_script_error(&self) -> bool {
        matches!(self, EvalValue::Json(value) if is_error_object(value))
    }
}

fn is_error_object(value: &Value) -> bool {
    value.get("error") == Some(&Value::Bool(true))
}

/// Wraps `code` so the host catches its errors and returns them as JSON.
pub fn wrap_script(code: &str) -> String {
    format!(
        "try{{\n{}\n}}catch(e){{e.error=true;ExtendJSON.stringify(e)}}",
        code
    )
}

#[derive(Debug, Clone)]
pub struct BridgeClient {
    base_url: String,
    http: reqwest::Client,
}

impl Default for BridgeClient {
    fn default() -> Self {
        BridgeClient::new(DEFAULT_URL)
    }
}

impl BridgeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        BridgeClient {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the bridge's liveness text.
    pub async fn ping(&self) -> Result<String, ClientError> {
        let response = self
            .http
            .get(&self.base_url)
            .send()
            .await
            .map_err(|source| self.request_error(source))?;
        self.read_text(response).await
    }

    /// Sends `script` unchanged and returns the raw result text.
    pub async fn eval_raw(&self, script: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(&self.base_url)
            .json(&json!({ "to_eval": script }))
            .send()
            .await
            .map_err(|source| self.request_error(source))?;
        self.read_text(response).await
    }

    /// Sends `code` inside the error guard of [`wrap_script`] and decodes the result.
    pub async fn eval(&self, code: &str) -> Result<EvalValue, ClientError> {
        let text = self.eval_raw(&wrap_script(code)).await?;
        Ok(EvalValue::decode(text))
    }

    /// Evaluates `line` and parks an object result host-side.
    ///
    /// Scalars come back as [`ObjectValue::Value`]; objects as a handle.
    pub async fn eval_returning_object(&self, line: &str) -> Result<ObjectValue, ClientError> {
        match self.eval(&object_script(line)).await? {
            EvalValue::Json(error) if is_error_object(&error) => {
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                Err(ClientError::Script { message, error })
            }
            value => Ok(ObjectValue::decode(value)),
        }
    }

    async fn read_text(&self, response: reqwest::Response) -> Result<String, ClientError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| self.request_error(source))?;
        if !status.is_success() {
            return Err(ClientError::Status { status, body });
        }
        Ok(body)
    }

    fn request_error(&self, source: reqwest::Error) -> ClientError {
        ClientError::Request {
            url: self.base_url.clone(),
            source,
        }
    }
}
