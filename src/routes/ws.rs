//! # routes::ws
//!
//! **Live price feed** over WebSocket.
//!
//! ```text
//!  client ──upgrade──▶ connect() ──▶ welcome
//!         ──{"type":"subscribe","symbol":"AAPL"}──▶ filter = AAPL, ack
//!         ──{"type":"subscribe"}──────────────────▶ filter = all,  ack
//!         ──{"type":"unsubscribe"}────────────────▶ filter = all,  ack
//!         ◀──{"type":"priceUpdate",...}── every tick, filtered
//! ```
//!
//! `unsubscribe` only clears the filter; the socket keeps receiving every
//! symbol until it closes.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    engine::broadcaster::{Broadcaster, ListenerId},
    events::{ClientMessage, WsEvent},
    state::SharedState,
};

/// GET /ws: upgrade and register a listener.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (id, rx) = state.broadcaster.connect().await;
    let (sender, receiver) = socket.split();

    info!(listener = %id, "🔌 WebSocket client connected");
    run_listener(&state.broadcaster, id, rx, sender, receiver).await;

    state.broadcaster.disconnect(id).await;
    info!(listener = %id, "🔌 WebSocket client disconnected");
}

/// Pump one connection until either side goes away.
///
/// Price updates arrive through the listener's queue and may be dropped when
/// it is full.  Welcome, acks and errors are written straight to the socket,
/// so a lagging client still sees the reply to every message it sends.
/// Pings are answered by the WebSocket layer itself.
async fn run_listener<S, R, E>(
    broadcaster: &Broadcaster,
    id: ListenerId,
    mut rx: mpsc::Receiver<String>,
    mut sender: S,
    mut receiver: R,
) where
    S: Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, E>> + Unpin,
{
    if sender.send(Message::Text(WsEvent::welcome().to_json())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            // Queue → socket
            frame = rx.recv() => {
                match frame {
                    Some(json) => {
                        if sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    None => break, // dropped from the registry
                }
            }

            // Socket → registry, reply → socket
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let reply = apply_client_message(broadcaster, id, &text).await;
                        if sender.send(Message::Text(reply.to_json())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {} // binary / ping / pong
                }
            }
        }
    }
}

/// Apply one text frame from a client and build the reply for it.
pub(crate) async fn apply_client_message(
    broadcaster: &Broadcaster,
    id: ListenerId,
    text: &str,
) -> WsEvent {
    match ClientMessage::parse(text) {
        Ok(ClientMessage::Subscribe { symbol }) => {
            let symbol = symbol
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty());
            broadcaster.subscribe(id, symbol.clone()).await;
            WsEvent::subscribed(symbol)
        }
        Ok(ClientMessage::Unsubscribe) => {
            broadcaster.unsubscribe(id).await;
            WsEvent::unsubscribed()
        }
        Err(err) => {
            debug!(listener = %id, %err, "Rejected client message");
            WsEvent::error(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use futures_util::{sink, stream};
    use serde_json::Value;

    use crate::events::{PricePayload, PriceUpdate};

    fn json(event: &WsEvent) -> Value {
        serde_json::from_str(&event.to_json()).unwrap()
    }

    #[tokio::test]
    async fn test_subscribe_sets_uppercased_filter() {
        let hub = Broadcaster::new(8);
        let (id, _rx) = hub.connect().await;

        let reply = apply_client_message(&hub, id, r#"{"type":"subscribe","symbol":"aapl"}"#).await;

        assert_eq!(hub.filter_of(id).await, Some(Some("AAPL".to_string())));
        let v = json(&reply);
        assert_eq!(v["type"], "subscribed");
        assert_eq!(v["symbol"], "AAPL");
    }

    #[tokio::test]
    async fn test_subscribe_without_symbol_means_all() {
        let hub = Broadcaster::new(8);
        let (id, _rx) = hub.connect().await;
        hub.subscribe(id, Some("MSFT".into())).await;

        let reply = apply_client_message(&hub, id, r#"{"type":"subscribe"}"#).await;

        assert_eq!(hub.filter_of(id).await, Some(None));
        assert_eq!(json(&reply)["symbol"], Value::Null);
    }

    #[tokio::test]
    async fn test_unsubscribe_twice_is_harmless() {
        let hub = Broadcaster::new(8);
        let (id, _rx) = hub.connect().await;
        hub.subscribe(id, Some("TSLA".into())).await;

        for _ in 0..2 {
            let reply = apply_client_message(&hub, id, r#"{"type":"unsubscribe"}"#).await;
            assert_eq!(json(&reply)["type"], "unsubscribed");
            assert_eq!(hub.filter_of(id).await, Some(None));
        }
    }

    #[tokio::test]
    async fn test_bad_messages_get_error_reply_and_keep_filter() {
        let hub = Broadcaster::new(8);
        let (id, _rx) = hub.connect().await;
        hub.subscribe(id, Some("NVDA".into())).await;

        let reply = apply_client_message(&hub, id, "not json").await;
        assert_eq!(json(&reply)["message"], "Invalid message format");

        let reply = apply_client_message(&hub, id, r#"{"type":"dance"}"#).await;
        assert_eq!(json(&reply)["type"], "error");
        assert_eq!(json(&reply)["message"], "Unknown message type");

        assert_eq!(hub.filter_of(id).await, Some(Some("NVDA".to_string())));
    }

    #[tokio::test]
    async fn test_ack_reaches_lagging_client() {
        let hub = Broadcaster::new(1);
        let (id, rx) = hub.connect().await;

        // fill the only queue slot
        let update: WsEvent = PriceUpdate {
            symbol: "MSFT".into(),
            data: PricePayload {
                current_price:  378.9,
                change:         0.0,
                change_percent: 0.0,
                volume:         1,
                timestamp:      Utc::now(),
            },
        }
        .into();
        assert_eq!(hub.publish("MSFT", &update).await, 1);
        assert_eq!(hub.publish("MSFT", &update).await, 0);

        let sent = Arc::new(Mutex::new(Vec::<Value>::new()));
        let socket_out = Box::pin(sink::unfold(sent.clone(), |sent, msg: Message| async move {
            if let Message::Text(text) = msg {
                sent.lock().unwrap().push(serde_json::from_str(&text).unwrap());
            }
            Ok::<_, Infallible>(sent)
        }));
        let socket_in = stream::iter(vec![
            Ok::<_, Infallible>(Message::Text(r#"{"type":"subscribe","symbol":"aapl"}"#.into())),
            Ok(Message::Text("garbage".into())),
        ]);

        run_listener(&hub, id, rx, socket_out, socket_in).await;

        assert_eq!(hub.filter_of(id).await, Some(Some("AAPL".to_string())));

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0]["type"], "welcome");
        assert!(sent.iter().any(|v| v["type"] == "subscribed" && v["symbol"] == "AAPL"));
        assert!(sent.iter().any(|v| v["type"] == "error"));
    }
}
