//! Cross-context message schemas.
//!
//! Page → relay → aggregator carries [`PageMessage`]; viewers talk to the
//! aggregator with [`ViewerRequest`] / [`ViewerResponse`] and receive
//! [`Notification`] pushes. On the wire every message is a plain JSON object
//! dispatched by its `type` tag; viewer and aggregator messages additionally
//! carry a `from` field naming the sending participant.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, LogEntry, LogSnapshot, Result, TabId, TabInfo};

/// Participant named in the `from` field of viewer/aggregator messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Participant {
    Viewer,
    Aggregator,
}

impl Participant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Participant::Viewer => "viewer",
            Participant::Aggregator => "aggregator",
        }
    }
}

/// Page context → relay → aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PageMessage {
    #[serde(rename = "LOG_CAPTURED")]
    LogCaptured(LogEntry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRef {
    pub tab_id: TabId,
}

/// Viewer → aggregator query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewerRequest {
    GetInitialData,
    ClearTabLogs(TabRef),
    ClearAllLogs,
}

impl ViewerRequest {
    pub const TAGS: [&'static str; 3] = ["GET_INITIAL_DATA", "CLEAR_TAB_LOGS", "CLEAR_ALL_LOGS"];

    pub fn clear_tab(tab_id: TabId) -> Self {
        ViewerRequest::ClearTabLogs(TabRef { tab_id })
    }

    /// Wire form: `{from: "viewer", type, payload?}`
    pub fn to_message(&self) -> Result<Value> {
        with_sender(serde_json::to_value(self)?, Participant::Viewer)
    }
}

/// Decode a raw viewer message into a typed request.
///
/// The `from` field must name the viewer. A `type` tag outside
/// [`ViewerRequest::TAGS`] yields [`Error::UnknownRequest`]; a known tag with a
/// malformed payload yields [`Error::Decode`].
pub fn decode_viewer_message(message: Value) -> Result<ViewerRequest> {
    let fields = take_sender(message, Participant::Viewer)?;

    let kind = fields
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if !ViewerRequest::TAGS.contains(&kind.as_str()) {
        return Err(Error::UnknownRequest(kind));
    }

    Ok(serde_json::from_value(Value::Object(fields))?)
}

/// Reply to a [`ViewerRequest`].
///
/// The wire form carries no tag, so decoding needs the request it answers
/// (see [`ViewerResponse::decode`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewerResponse {
    Ack(Ack),
    Snapshot(LogSnapshot),
}

impl ViewerResponse {
    /// Decode the wire reply to `request`.
    ///
    /// `GET_INITIAL_DATA` answers with a snapshot, or with a failed ack when
    /// the store could not be read; the clear requests always answer with an
    /// ack.
    pub fn decode(request: &ViewerRequest, response: Value) -> Result<Self> {
        let is_ack = response.get("success").is_some();
        match request {
            ViewerRequest::GetInitialData if !is_ack => {
                Ok(ViewerResponse::Snapshot(serde_json::from_value(response)?))
            }
            _ => Ok(ViewerResponse::Ack(serde_json::from_value(response)?)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<TabId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            success: true,
            tab_id: None,
            error: None,
        }
    }

    pub fn tab_cleared(tab_id: TabId) -> Self {
        Self {
            success: true,
            tab_id: Some(tab_id),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            tab_id: None,
            error: Some(error.into()),
        }
    }

    pub fn tab_not_found(tab_id: TabId) -> Self {
        Self {
            success: false,
            tab_id: Some(tab_id),
            error: Some(format!("No logs recorded for tab {}", tab_id)),
        }
    }
}

impl From<Ack> for ViewerResponse {
    fn from(ack: Ack) -> Self {
        ViewerResponse::Ack(ack)
    }
}

impl From<LogSnapshot> for ViewerResponse {
    fn from(snapshot: LogSnapshot) -> Self {
        ViewerResponse::Snapshot(snapshot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLog {
    pub tab_id: TabId,
    pub log_entry: LogEntry,
    pub tab_info: TabInfo,
}

/// Aggregator → viewer push
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Notification {
    #[serde(rename = "NEW_LOG")]
    NewLog(NewLog),
}

impl Notification {
    /// Wire form: `{from: "aggregator", type: "NEW_LOG", payload}`
    pub fn to_message(&self) -> Result<Value> {
        with_sender(serde_json::to_value(self)?, Participant::Aggregator)
    }
}

/// Decode a raw aggregator push; the `from` field must name the aggregator.
pub fn decode_aggregator_message(message: Value) -> Result<Notification> {
    let fields = take_sender(message, Participant::Aggregator)?;
    Ok(serde_json::from_value(Value::Object(fields))?)
}

fn take_sender(message: Value, expected: Participant) -> Result<Map<String, Value>> {
    let Value::Object(mut fields) = message else {
        return Err(Error::UnexpectedSender("<not an object>".to_string()));
    };

    match fields.remove("from") {
        Some(Value::String(from)) if from == expected.as_str() => Ok(fields),
        Some(other) => Err(Error::UnexpectedSender(other.to_string())),
        None => Err(Error::UnexpectedSender("<missing>".to_string())),
    }
}

fn with_sender(mut message: Value, from: Participant) -> Result<Value> {
    if let Value::Object(fields) = &mut message {
        fields.insert("from".to_string(), Value::String(from.as_str().to_string()));
    }
    Ok(message)
}
