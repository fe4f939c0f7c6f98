//! Request/response envelopes (JSON text frames).
//!
//! Request:  `{"id": "...", "command": "...", "params": {...}}`
//! Response: `{"id": ..., "status": "success"|"error", "timestamp": "...",
//!            "data": {...}}` or `{..., "error": "..."}`
//!
//! Exactly one of `data`/`error` is present on a response; `Outcome` makes
//! that unrepresentable otherwise.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{BridgeError, Result};

/// Command parameters / success payloads.
pub type Params = Map<String, Value>;

/// Decoded controller request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Caller-supplied id, echoed verbatim in the response.
    pub id: Option<String>,
    /// Case-sensitive command name.
    pub command: String,
    pub params: Params,
}

impl Request {
    pub fn new(id: impl Into<String>, command: impl Into<String>, params: Params) -> Self {
        Self {
            id: Some(id.into()),
            command: command.into(),
            params,
        }
    }

    /// Parameter lookup; JSON `null` counts as absent.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key).filter(|v| !v.is_null())
    }

    pub fn require(&self, key: &str) -> Result<&Value> {
        self.param(key)
            .ok_or_else(|| BridgeError::MissingParameter(key.to_string()))
    }

    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| BridgeError::invalid_parameter(key, "a string"))
    }

    pub fn opt_str(&self, key: &str) -> Result<Option<&str>> {
        match self.param(key) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(Some)
                .ok_or_else(|| BridgeError::invalid_parameter(key, "a string")),
        }
    }

    /// Same request under a different id (the bridge's wire id).
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            command: self.command.clone(),
            params: self.params.clone(),
        }
    }

    pub fn to_text(&self) -> String {
        json!({
            "id": self.id,
            "command": self.command,
            "params": self.params,
        })
        .to_string()
    }
}

/// Request parse failure, carrying whatever id could be recovered so an
/// error envelope can still be addressed.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub id: Option<String>,
    pub error: BridgeError,
}

impl Rejected {
    fn new(id: Option<String>, error: BridgeError) -> Self {
        Self { id, error }
    }

    pub fn into_response(self) -> Response {
        Response::from_error(self.id, &self.error)
    }
}

/// Parse a raw text frame into a request.
///
/// `command` is checked before anything else about the request body so a
/// request without one is always `MissingCommand`, whatever else it carries.
pub fn parse_request(raw: &str) -> std::result::Result<Request, Rejected> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| Rejected::new(None, BridgeError::Parse(e.to_string())))?;

    let Value::Object(mut obj) = value else {
        return Err(Rejected::new(
            None,
            BridgeError::Parse("envelope must be a JSON object".into()),
        ));
    };

    let id = match obj.remove("id") {
        Some(Value::String(s)) => Some(s),
        _ => None,
    };

    let command = match obj.remove("command") {
        None | Some(Value::Null) => return Err(Rejected::new(id, BridgeError::MissingCommand)),
        Some(Value::String(s)) if s.is_empty() => {
            return Err(Rejected::new(id, BridgeError::MissingCommand))
        }
        Some(Value::String(s)) => s,
        Some(_) => {
            return Err(Rejected::new(
                id,
                BridgeError::Parse("'command' must be a string".into()),
            ))
        }
    };

    let params = match obj.remove("params") {
        None | Some(Value::Null) => Params::new(),
        Some(Value::Object(m)) => m,
        Some(_) => {
            return Err(Rejected::new(
                id,
                BridgeError::Parse("'params' must be an object".into()),
            ))
        }
    };

    Ok(Request {
        id,
        command,
        params,
    })
}

/// Response status on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Terminal result of one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Params),
    Error(String),
}

/// Response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub id: Option<String>,
    /// ISO-8601, assigned by whoever produces the envelope.
    pub timestamp: String,
    pub outcome: Outcome,
}

#[derive(Debug, Deserialize)]
struct ResponseWire {
    #[serde(default)]
    id: Option<String>,
    status: Status,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    data: Option<Params>,
    #[serde(default)]
    error: Option<String>,
}

/// Current time in the envelope timestamp format.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Response {
    pub fn success(id: Option<String>, data: Params) -> Self {
        Self {
            id,
            timestamp: now_timestamp(),
            outcome: Outcome::Success(data),
        }
    }

    pub fn error(id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            id,
            timestamp: now_timestamp(),
            outcome: Outcome::Error(message.into()),
        }
    }

    pub fn from_error(id: Option<String>, err: &BridgeError) -> Self {
        Self::error(id, err.to_string())
    }

    pub fn from_result(id: Option<String>, res: Result<Params>) -> Self {
        match res {
            Ok(data) => Self::success(id, data),
            Err(e) => Self::from_error(id, &e),
        }
    }

    pub fn status(&self) -> Status {
        match self.outcome {
            Outcome::Success(_) => Status::Success,
            Outcome::Error(_) => Status::Error,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status() == Status::Success
    }

    pub fn data(&self) -> Option<&Params> {
        match &self.outcome {
            Outcome::Success(d) => Some(d),
            Outcome::Error(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Error(e) => Some(e),
        }
    }

    /// Re-address the response and stamp it fresh for sending.
    pub fn relay(self, id: Option<String>) -> Self {
        Self {
            id,
            timestamp: now_timestamp(),
            outcome: self.outcome,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut v = json!({
            "id": self.id,
            "status": self.status(),
            "timestamp": self.timestamp,
        });
        match &self.outcome {
            Outcome::Success(data) => v["data"] = Value::Object(data.clone()),
            Outcome::Error(msg) => v["error"] = Value::String(msg.clone()),
        }
        v
    }

    pub fn to_text(&self) -> String {
        self.to_value().to_string()
    }
}

/// Parse a response envelope produced by the host executor.
pub fn parse_response(raw: &str) -> Result<Response> {
    let wire: ResponseWire = serde_json::from_str(raw)
        .map_err(|e| BridgeError::Parse(format!("invalid response envelope: {e}")))?;

    let outcome = match wire.status {
        Status::Success => Outcome::Success(wire.data.unwrap_or_default()),
        Status::Error => Outcome::Error(wire.error.ok_or_else(|| {
            BridgeError::Parse("error response without 'error' field".into())
        })?),
    };

    Ok(Response {
        id: wire.id,
        timestamp: wire.timestamp,
        outcome,
    })
}
