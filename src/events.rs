//! # events
//!
//! Wire messages exchanged over `/ws`.
//!
//! * [`WsEvent`]: everything the server pushes to a listener.  Serialised
//!   once per publish and handed to every matching listener as a JSON string.
//! * [`ClientMessage`]: what a listener may send back (subscribe /
//!   unsubscribe).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ─── Server → Client ──────────────────────────────────────────────────────────

/// Per-symbol payload produced by one price-feed tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePayload {
    pub current_price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub timestamp: DateTime<Utc>,
}

/// One `(symbol, payload)` pair emitted by the mutator.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub symbol: String,
    pub data: PricePayload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WsEvent {
    /// Sent once, right after the upgrade.
    Welcome {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// Ack for `subscribe`.  `symbol: null` means "everything".
    Subscribed {
        symbol: Option<String>,
        message: String,
    },

    /// Ack for `unsubscribe`.
    Unsubscribed {
        message: String,
    },

    /// Bad or unknown client message.
    Error {
        message: String,
    },

    /// Fan-out from the price feed.
    PriceUpdate {
        symbol: String,
        data: PricePayload,
    },
}

impl WsEvent {
    pub fn welcome() -> Self {
        WsEvent::Welcome {
            message:   "Connected to Stock Market Dashboard API".to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn subscribed(symbol: Option<String>) -> Self {
        let message = match &symbol {
            Some(s) => format!("Subscribed to {s} updates"),
            None => "Subscribed to all symbol updates".to_string(),
        };
        WsEvent::Subscribed { symbol, message }
    }

    pub fn unsubscribed() -> Self {
        WsEvent::Unsubscribed {
            message: "Unsubscribed from updates".to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        WsEvent::Error { message: message.into() }
    }

    /// แปลงเป็น JSON String สำหรับส่งผ่าน WebSocket
    #[inline]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"error","message":"Serialization error"}"#.to_string())
    }
}

impl From<PriceUpdate> for WsEvent {
    fn from(update: PriceUpdate) -> Self {
        WsEvent::PriceUpdate {
            symbol: update.symbol,
            data:   update.data,
        }
    }
}

// ─── Client → Server ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Missing or null `symbol` subscribes to every symbol.
    Subscribe {
        #[serde(default)]
        symbol: Option<String>,
    },
    Unsubscribe,
}

const KNOWN_TYPES: [&str; 2] = ["subscribe", "unsubscribe"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientMessageError {
    /// Not JSON, or a known `type` with a malformed body.
    #[error("Invalid message format")]
    InvalidFormat,

    /// JSON whose `type` is missing or not one we handle.
    #[error("Unknown message type")]
    UnknownType,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, ClientMessageError> {
        let value: Value =
            serde_json::from_str(text).map_err(|_| ClientMessageError::InvalidFormat)?;

        let known = value
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|t| KNOWN_TYPES.contains(&t));
        if !known {
            return Err(ClientMessageError::UnknownType);
        }

        serde_json::from_value(value).map_err(|_| ClientMessageError::InvalidFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subscribe() {
        let msg = ClientMessage::parse(r#"{"type":"subscribe","symbol":"AAPL"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Subscribe { symbol: Some("AAPL".into()) });

        let msg = ClientMessage::parse(r#"{"type":"subscribe"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Subscribe { symbol: None });
    }

    #[test]
    fn test_parse_unsubscribe() {
        let msg = ClientMessage::parse(r#"{"type":"unsubscribe"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Unsubscribe);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(ClientMessage::parse("not json"), Err(ClientMessageError::InvalidFormat));
        assert_eq!(
            ClientMessage::parse(r#"{"type":"subscribe","symbol":42}"#),
            Err(ClientMessageError::InvalidFormat)
        );
        assert_eq!(ClientMessage::parse(r#"{"type":"buy"}"#), Err(ClientMessageError::UnknownType));
        assert_eq!(ClientMessage::parse(r#"{"symbol":"AAPL"}"#), Err(ClientMessageError::UnknownType));
    }

    #[test]
    fn test_price_update_wire_shape() {
        let ts = Utc::now();
        let event: WsEvent = PriceUpdate {
            symbol: "MSFT".into(),
            data: PricePayload {
                current_price:  380.12,
                change:         1.22,
                change_percent: 0.32,
                volume:         7_000_000,
                timestamp:      ts,
            },
        }
        .into();

        let v: Value = serde_json::from_str(&event.to_json()).unwrap();
        assert_eq!(v["type"], "priceUpdate");
        assert_eq!(v["symbol"], "MSFT");
        assert_eq!(v["data"]["currentPrice"], 380.12);
        assert_eq!(v["data"]["changePercent"], 0.32);
        assert_eq!(v["data"]["volume"], 7_000_000);
    }

    #[test]
    fn test_ack_shapes() {
        let v: Value = serde_json::from_str(&WsEvent::subscribed(Some("TSLA".into())).to_json()).unwrap();
        assert_eq!(v["type"], "subscribed");
        assert_eq!(v["message"], "Subscribed to TSLA updates");

        let v: Value = serde_json::from_str(&WsEvent::error("Unknown message type").to_json()).unwrap();
        assert_eq!(v["type"], "error");
    }
}
