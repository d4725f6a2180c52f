//! WebSocket transport.

use crate::hub::GameHub;
use crate::protocol::{ClientMessage, ErrorCode};
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, instrument, warn};

/// Routes `/` and `/ws` to the game socket.
pub fn router(hub: GameHub) -> Router {
    Router::new()
        .route("/", get(ws_handler))
        .route("/ws", get(ws_handler))
        .with_state(hub)
}

/// Binds `host:port` and serves until the listener fails.
#[instrument(skip(hub))]
pub async fn serve(host: &str, port: u16, hub: GameHub) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Server running on ws://{}:{}/ws", host, port);
    axum::serve(listener, router(hub)).await
}

async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<GameHub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: GameHub) {
    let (mut sink, mut stream) = socket.split();
    let (id, mut outbox) = hub.connect().await;

    let writer = tokio::spawn(async move {
        while let Some(message) = outbox.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to encode frame");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                debug!("Socket closed while writing");
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                Ok(message) => hub.handle(id, message).await,
                Err(e) => {
                    debug!(connection = %id, error = %e, "Unparseable frame");
                    hub.reject(id, ErrorCode::BadRequest, format!("Malformed message: {}", e))
                        .await;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(connection = %id, error = %e, "Socket error");
                break;
            }
        }
    }

    hub.disconnect(id).await;
    writer.abort();
}
