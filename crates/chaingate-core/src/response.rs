//! Normalized JSON-RPC responses.
//!
//! Upstream providers are frequently non-compliant: some answer with a bare
//! `{"code":..,"message":..}`, some with `{"error":"..."}`, some with an empty
//! body or plain text. [`NormalizedResponse::decode`] never fails. Every body
//! becomes either a result or a [`JsonRpcError`], never both and never neither.
//!
//! The result payload is kept as raw JSON and only parsed into a
//! [`serde_json::Value`] on first call to [`NormalizedResponse::parsed_result`].

use std::sync::{Arc, PoisonError, RwLock};

use serde::de::Deserializer;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::error::{JsonRpcErrorCode, JsonRpcException};
use crate::request::RpcId;

const EMPTY_RESPONSE_MESSAGE: &str = "unexpected empty response from upstream endpoint";
const MISSING_RESULT_MESSAGE: &str = "upstream response is missing both result and error";

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>, data: Option<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    fn server_side(message: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::ServerSideException.code(), message, None)
    }
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

/// Failure to turn the raw result payload into a JSON value.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to parse upstream result: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Write-once slot, filled on first successful read.
#[derive(Debug, Default)]
struct LazyValue {
    slot: RwLock<Option<Arc<Value>>>,
}

impl LazyValue {
    fn get_or_try_init<E>(
        &self,
        init: impl FnOnce() -> Result<Value, E>,
    ) -> Result<Arc<Value>, E> {
        {
            let slot = self.slot.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(value) = slot.as_ref() {
                return Ok(Arc::clone(value));
            }
        }

        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have filled the slot while we waited for the write lock.
        if let Some(value) = slot.as_ref() {
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(init()?);
        *slot = Some(Arc::clone(&value));
        Ok(value)
    }
}

/// A response after upstream quirks have been smoothed out.
#[derive(Debug)]
pub struct NormalizedResponse {
    jsonrpc: String,
    id: RpcId,
    result: Option<Box<RawValue>>,
    error: Option<JsonRpcError>,
    parsed: LazyValue,
}

/// Raw envelope; `result` and `error` stay unparsed for inspection.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    jsonrpc: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    // `"result": null` is a real result, so null must not collapse to None.
    #[serde(default, deserialize_with = "present")]
    result: Option<Box<RawValue>>,
    #[serde(default)]
    error: Option<Box<RawValue>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Box<RawValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

/// `{"code": 429, "message": "..."}` at the top level.
#[derive(Deserialize)]
struct BareError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// `{"error": "..."}` at the top level.
#[derive(Deserialize)]
struct BareStringError {
    #[serde(default)]
    error: Option<String>,
}

impl NormalizedResponse {
    fn from_parts(
        jsonrpc: String,
        id: RpcId,
        result: Option<Box<RawValue>>,
        error: Option<JsonRpcError>,
    ) -> Self {
        Self {
            jsonrpc,
            id,
            result,
            error,
            parsed: LazyValue::default(),
        }
    }

    /// Decode an upstream body. Never fails; unusable bodies become errors.
    pub fn decode(raw: &[u8]) -> Self {
        let body = trim_ascii_whitespace(raw);
        let envelope = if body.first() == Some(&b'{') {
            serde_json::from_slice::<Envelope>(body).ok()
        } else {
            None
        };

        let Some(envelope) = envelope else {
            return Self::from_error(RpcId::Null, tolerate_malformed_body(body));
        };

        let jsonrpc = match envelope.jsonrpc {
            Some(Value::String(version)) => version,
            _ => "2.0".to_string(),
        };

        if envelope.error.is_none() && envelope.result.is_none() && envelope.id.is_none() {
            let error = tolerate_malformed_body(body);
            return Self::from_parts(jsonrpc, RpcId::Null, None, Some(error));
        }

        let id = envelope.id.map(RpcId::from).unwrap_or_default();
        match (envelope.result, envelope.error) {
            (_, Some(error)) => {
                let error = parse_error_document(&error);
                Self::from_parts(jsonrpc, id, None, Some(error))
            }
            (Some(result), None) => Self::from_parts(jsonrpc, id, Some(result), None),
            (None, None) => Self::from_parts(
                jsonrpc,
                id,
                None,
                Some(JsonRpcError::server_side(MISSING_RESULT_MESSAGE)),
            ),
        }
    }

    /// A successful response carrying `result`.
    pub fn with_result<T: Serialize + ?Sized>(
        id: RpcId,
        result: &T,
    ) -> Result<Self, serde_json::Error> {
        let raw = serde_json::value::to_raw_value(result)?;
        Ok(Self::from_raw_result(id, raw))
    }

    /// A successful response carrying an already serialized result.
    pub fn from_raw_result(id: RpcId, result: Box<RawValue>) -> Self {
        Self::from_parts("2.0".into(), id, Some(result), None)
    }

    pub fn from_error(id: RpcId, error: JsonRpcError) -> Self {
        Self::from_parts("2.0".into(), id, None, Some(error))
    }

    /// The error response shown to a caller for a translated internal failure.
    pub fn from_exception(id: RpcId, exception: &JsonRpcException) -> Self {
        Self::from_error(id, exception.to_json_rpc_error())
    }

    pub fn jsonrpc(&self) -> &str {
        &self.jsonrpc
    }

    pub fn id(&self) -> &RpcId {
        &self.id
    }

    /// Mirror the request id onto a response whose upstream omitted it.
    pub fn fill_missing_id(&mut self, id: &RpcId) {
        if self.id.is_null() {
            self.id = id.clone();
        }
    }

    /// The raw result JSON, untouched.
    pub fn result_raw(&self) -> Option<&RawValue> {
        self.result.as_deref()
    }

    pub fn error(&self) -> Option<&JsonRpcError> {
        self.error.as_ref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The result parsed into a JSON value, computed once and memoized.
    ///
    /// Returns `Ok(None)` for error responses. A parse failure is logged with
    /// the raw payload and nothing is memoized.
    pub fn parsed_result(&self) -> Result<Option<Arc<Value>>, ResponseError> {
        let Some(raw) = self.result.as_deref() else {
            return Ok(None);
        };
        self.parsed
            .get_or_try_init(|| {
                serde_json::from_str::<Value>(raw.get()).map_err(|err| {
                    tracing::warn!(error = %err, raw = raw.get(), "failed to parse upstream result");
                    ResponseError::Parse(err)
                })
            })
            .map(Some)
    }

    /// Strict JSON-RPC 2.0 bytes for the caller.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Fields worth logging for this response.
    pub fn log_projection(&self) -> Value {
        json!({
            "id": self.id,
            "result": self.result.as_deref().map(RawValue::get),
            "error": self.error,
        })
    }
}

impl Serialize for NormalizedResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("JsonRpcResponse", 3)?;
        st.serialize_field("jsonrpc", "2.0")?;
        st.serialize_field("id", &self.id)?;
        match (&self.error, &self.result) {
            (Some(error), _) => st.serialize_field("error", error)?,
            (None, Some(result)) => st.serialize_field("result", result)?,
            (None, None) => st.serialize_field("result", &Value::Null)?,
        }
        st.end()
    }
}

/// Inspect an upstream `error` sub-document as permissively as possible.
fn parse_error_document(raw: &RawValue) -> JsonRpcError {
    match serde_json::from_str::<Value>(raw.get()) {
        Ok(Value::Object(fields)) => {
            let code = fields
                .get("code")
                .and_then(|c| c.as_i64().or_else(|| c.as_f64().map(|f| f as i64)))
                .unwrap_or(0);
            let message = fields
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let data = fields.get("data").cloned().and_then(error_data);
            JsonRpcError::new(code, message, data)
        }
        Ok(Value::String(message)) => JsonRpcError::server_side(message),
        _ => JsonRpcError::server_side(raw.get()),
    }
}

/// Fallbacks for bodies that are not JSON-RPC responses at all.
/// Order matters; the first matching shape wins.
fn tolerate_malformed_body(body: &[u8]) -> JsonRpcError {
    let is_object = body.first() == Some(&b'{');

    if is_object {
        if let Ok(bare) = serde_json::from_slice::<BareError>(body) {
            let code = bare.code.unwrap_or(0);
            let message = bare.message.unwrap_or_default();
            let data = bare.data.and_then(error_data);
            if code != 0 || !message.is_empty() || data.is_some() {
                return JsonRpcError::new(code, message, data);
            }
        }

        if let Ok(BareStringError { error: Some(error) }) =
            serde_json::from_slice::<BareStringError>(body)
        {
            if !error.is_empty() {
                return JsonRpcError::server_side(error);
            }
        }
    }

    if body.is_empty() || is_empty_object(body) {
        return JsonRpcError::server_side(EMPTY_RESPONSE_MESSAGE);
    }

    let text = String::from_utf8_lossy(body);
    if is_object || body.first() == Some(&b'[') {
        JsonRpcError::server_side(format!(
            "unexpected response json structure from upstream: {text}"
        ))
    } else {
        JsonRpcError::server_side(text)
    }
}

/// `data` is carried as text; structured data keeps its JSON form.
fn error_data(data: Value) -> Option<String> {
    match data {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn is_empty_object(body: &[u8]) -> bool {
    serde_json::from_slice::<Map<String, Value>>(body).is_ok_and(|m| m.is_empty())
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}
