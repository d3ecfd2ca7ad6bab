use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{AppEvent, CaptureRegion, OverlaySession, Rect};

/// How a `db-read` returns rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// First row or `null`
    Get,
    /// Every row
    All,
}

/// Statement parameters as sent by the renderer: positional array or named object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlParams {
    #[default]
    None,
    Positional(Vec<Value>),
    Named(serde_json::Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum Command {
    TakeShot(CaptureRegion),
    NewOverlay(OverlaySession),
    CloseOverlay,
    UpdateMenuBounds(Rect),
    UpdateSelectionBounds(Rect),
    UpdateTextBoxBounds(Rect),
    DbWrite {
        sql: String,
        #[serde(default)]
        params: SqlParams,
    },
    DbRead {
        mode: ReadMode,
        sql: String,
        #[serde(default)]
        params: SqlParams,
    },
    Translate {
        text: String,
        source_tag: String,
        target_tag: String,
    },
    GetInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<u64>,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Stable error kind, e.g. `capture`, `recognition`, `translation`, `write-timeout`
    pub kind: String,
    pub message: String,
    /// Recognized text kept when a later pipeline stage failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recognized: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ServerMessage {
    Response {
        id: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ErrorPayload>,
    },
    Event(AppEvent),
}

impl ServerMessage {
    pub fn ok(id: Option<u64>, result: Value) -> Self {
        ServerMessage::Response {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: Option<u64>, error: ErrorPayload) -> Self {
        ServerMessage::Response {
            id,
            result: None,
            error: Some(error),
        }
    }
}
