//! The uniform result of every service call.
//!
//! # Design
//! `Envelope` is a discriminated type: a call either succeeded with a JSON
//! payload or failed with an `ErrorCode` and whatever body the server sent.
//! Its JSON form is the flat `{ "ok", "data", "code" }` object callers expect;
//! `code` appears only on failures.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure classes a call can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The server answered 400.
    #[error("bad request")]
    BadRequest,
    /// The server answered 401.
    #[error("unauthorized")]
    Unauthorized,
    /// The server answered 404.
    #[error("not found")]
    NotFound,
    /// Any other non-2xx status.
    #[error("server error")]
    ServerError,
    /// The exchange did not complete: connection refused, DNS, timeout.
    #[error("network error")]
    NetworkError,
    /// A success status arrived with a body that is not JSON, or `data` did
    /// not match the shape the caller asked for.
    #[error("response could not be parsed")]
    ParseError,
}

impl ErrorCode {
    /// Map a non-2xx status code to its error kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorCode::BadRequest,
            401 => ErrorCode::Unauthorized,
            404 => ErrorCode::NotFound,
            _ => ErrorCode::ServerError,
        }
    }

    /// Wire name, e.g. `"UNAUTHORIZED"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::ParseError => "PARSE_ERROR",
        }
    }
}

/// Result of a call through `ApiService`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireEnvelope", try_from = "WireEnvelope")]
pub enum Envelope {
    Success { data: Value },
    /// `data` holds the parsed error body, or `null` when there was none.
    Failure { code: ErrorCode, data: Value },
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Envelope::Success { data }
    }

    pub fn failure(code: ErrorCode, data: Option<Value>) -> Self {
        Envelope::Failure {
            code,
            data: data.unwrap_or(Value::Null),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    /// The error kind, or `None` for a success.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Envelope::Success { .. } => None,
            Envelope::Failure { code, .. } => Some(*code),
        }
    }

    pub fn data(&self) -> &Value {
        match self {
            Envelope::Success { data } | Envelope::Failure { data, .. } => data,
        }
    }

    pub fn into_data(self) -> Value {
        match self {
            Envelope::Success { data } | Envelope::Failure { data, .. } => data,
        }
    }

    /// Split into the payload or the error kind, dropping any error body.
    pub fn into_result(self) -> Result<Value, ErrorCode> {
        match self {
            Envelope::Success { data } => Ok(data),
            Envelope::Failure { code, .. } => Err(code),
        }
    }

    /// Deserialize a successful payload into `T`.
    ///
    /// A payload of the wrong shape is reported as `ErrorCode::ParseError`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ErrorCode> {
        let data = self.into_result()?;
        serde_json::from_value(data).map_err(|e| {
            tracing::debug!(error = %e, "envelope payload did not match the requested type");
            ErrorCode::ParseError
        })
    }
}

#[derive(Serialize, Deserialize)]
struct WireEnvelope {
    ok: bool,
    #[serde(default)]
    data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
}

impl From<Envelope> for WireEnvelope {
    fn from(envelope: Envelope) -> Self {
        match envelope {
            Envelope::Success { data } => WireEnvelope {
                ok: true,
                data,
                code: None,
            },
            Envelope::Failure { code, data } => WireEnvelope {
                ok: false,
                data,
                code: Some(code),
            },
        }
    }
}

impl TryFrom<WireEnvelope> for Envelope {
    type Error = String;

    fn try_from(wire: WireEnvelope) -> Result<Self, Self::Error> {
        match (wire.ok, wire.code) {
            (true, None) => Ok(Envelope::Success { data: wire.data }),
            (false, Some(code)) => Ok(Envelope::Failure {
                code,
                data: wire.data,
            }),
            (true, Some(_)) => Err("a successful envelope cannot carry a code".to_string()),
            (false, None) => Err("a failed envelope must carry a code".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_mapping_table() {
        assert_eq!(ErrorCode::from_status(400), ErrorCode::BadRequest);
        assert_eq!(ErrorCode::from_status(401), ErrorCode::Unauthorized);
        assert_eq!(ErrorCode::from_status(404), ErrorCode::NotFound);
        assert_eq!(ErrorCode::from_status(403), ErrorCode::ServerError);
        assert_eq!(ErrorCode::from_status(409), ErrorCode::ServerError);
        assert_eq!(ErrorCode::from_status(500), ErrorCode::ServerError);
        assert_eq!(ErrorCode::from_status(503), ErrorCode::ServerError);
    }

    #[test]
    fn success_serializes_without_code() {
        let json = serde_json::to_value(Envelope::success(json!({"id": 1}))).unwrap();
        assert_eq!(json, json!({"ok": true, "data": {"id": 1}}));
    }

    #[test]
    fn failure_serializes_with_code_and_null_data() {
        let json = serde_json::to_value(Envelope::failure(ErrorCode::NetworkError, None)).unwrap();
        assert_eq!(json, json!({"ok": false, "data": null, "code": "NETWORK_ERROR"}));
    }

    #[test]
    fn code_wire_names_match_serde() {
        for code in [
            ErrorCode::BadRequest,
            ErrorCode::Unauthorized,
            ErrorCode::NotFound,
            ErrorCode::ServerError,
            ErrorCode::NetworkError,
            ErrorCode::ParseError,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), json!(code.as_str()));
        }
    }

    #[test]
    fn deserialize_rejects_inconsistent_shapes() {
        let missing_code: Result<Envelope, _> = serde_json::from_value(json!({"ok": false}));
        assert!(missing_code.is_err());
        let extra_code: Result<Envelope, _> =
            serde_json::from_value(json!({"ok": true, "data": 1, "code": "NOT_FOUND"}));
        assert!(extra_code.is_err());
    }

    #[test]
    fn deserialize_failure_defaults_data_to_null() {
        let envelope: Envelope =
            serde_json::from_value(json!({"ok": false, "code": "PARSE_ERROR"})).unwrap();
        assert_eq!(envelope, Envelope::failure(ErrorCode::ParseError, None));
    }

    #[test]
    fn decode_typed_payload() {
        #[derive(Deserialize)]
        struct User {
            id: u32,
        }
        let user: User = Envelope::success(json!({"id": 7})).decode().unwrap();
        assert_eq!(user.id, 7);
    }

    #[test]
    fn decode_wrong_shape_is_parse_error() {
        let err = Envelope::success(json!("text")).decode::<Vec<u32>>().unwrap_err();
        assert_eq!(err, ErrorCode::ParseError);
    }

    #[test]
    fn decode_failure_returns_its_code() {
        let envelope = Envelope::failure(ErrorCode::Unauthorized, Some(json!({"code": "X"})));
        assert_eq!(envelope.decode::<Value>().unwrap_err(), ErrorCode::Unauthorized);
    }
}
