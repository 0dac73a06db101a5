use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::origin::TrustedOrigin;

/// A cross-context message as delivered to the page.
///
/// `data` is whatever the sender posted: the player sends JSON-encoded
/// strings, other frames may send objects or anything else.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InboundMessage {
    pub origin: String,
    #[serde(default)]
    pub data: Value,
}

/// Player lifecycle codes carried by `onStateChange`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
    Unknown(i64),
}

impl From<i64> for PlayerState {
    fn from(code: i64) -> Self {
        match code {
            -1 => PlayerState::Unstarted,
            0 => PlayerState::Ended,
            1 => PlayerState::Playing,
            2 => PlayerState::Paused,
            3 => PlayerState::Buffering,
            5 => PlayerState::Cued,
            other => PlayerState::Unknown(other),
        }
    }
}

/// Decoded player event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    StateChange(PlayerState),
    Ready,
    /// A well-formed event this service has no use for.
    Unrecognized,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("message origin {0:?} is not trusted")]
    UntrustedOrigin(String),

    #[error("payload is not valid JSON: {0}")]
    NotJson(String),

    #[error("payload has an unexpected shape: {0}")]
    UnexpectedShape(String),
}

#[derive(Deserialize)]
#[serde(tag = "event")]
enum WireEvent {
    #[serde(rename = "onStateChange")]
    StateChange { info: i64 },
    #[serde(rename = "onReady")]
    Ready,
    #[serde(other)]
    Other,
}

impl From<WireEvent> for PlayerEvent {
    fn from(wire: WireEvent) -> Self {
        match wire {
            WireEvent::StateChange { info } => {
                PlayerEvent::StateChange(PlayerState::from(info))
            }
            WireEvent::Ready => PlayerEvent::Ready,
            WireEvent::Other => PlayerEvent::Unrecognized,
        }
    }
}

impl InboundMessage {
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }

    /// Validate the origin, then decode the payload.
    ///
    /// The payload is never inspected for untrusted origins.
    pub fn decode(
        &self,
        trusted: &TrustedOrigin,
    ) -> Result<PlayerEvent, DecodeError> {
        if !trusted.matches(&self.origin) {
            return Err(DecodeError::UntrustedOrigin(self.origin.clone()));
        }
        decode_payload(&self.data)
    }
}

fn decode_payload(data: &Value) -> Result<PlayerEvent, DecodeError> {
    match data {
        Value::String(raw) => {
            let parsed: Value = serde_json::from_str(raw)
                .map_err(|err| DecodeError::NotJson(err.to_string()))?;
            match parsed {
                Value::Object(_) => decode_object(&parsed),
                other => Err(DecodeError::UnexpectedShape(format!(
                    "expected an object, found {}",
                    kind_of(&other)
                ))),
            }
        }
        Value::Object(_) => decode_object(data),
        other => Err(DecodeError::UnexpectedShape(format!(
            "expected a string or object, found {}",
            kind_of(other)
        ))),
    }
}

fn decode_object(data: &Value) -> Result<PlayerEvent, DecodeError> {
    WireEvent::deserialize(data)
        .map(PlayerEvent::from)
        .map_err(|err| DecodeError::UnexpectedShape(err.to_string()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
