//! Connection Handler
//!
//! One task per open WebSocket, running for as long as the socket lives. A
//! separate writer task drains the connection's channel into the sink so
//! broadcasts and echoes share one FIFO path to the peer. There is no idle
//! timeout: a quiet, healthy connection blocks until the far end closes it
//! or a failed broadcast write cancels it.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::network::handlers::AppState;
use crate::network::lifecycle;
use crate::network::protocol::{contains_echo_marker, ECHO_MARKER};

/// Drive one authorized connection: register it, pump frames until the
/// socket dies or the cancel handle fires, then run teardown exactly once.
pub async fn run_connection(state: AppState, socket: WebSocket, room_id: Uuid, player_id: Uuid) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let cancel = CancellationToken::new();

    let conn_id = state
        .registry
        .register(room_id, player_id, tx.clone(), cancel.clone())
        .await;
    info!(%room_id, %player_id, %conn_id, "new client");

    let writer = tokio::spawn(pump_outbound(sink, rx, cancel.clone()));

    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if text.contains(ECHO_MARKER) {
                        let _ = tx.send(Message::Text(text));
                    }
                }
                Some(Ok(Message::Binary(bytes))) => {
                    if contains_echo_marker(&bytes) {
                        let _ = tx.send(Message::Binary(bytes));
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(err)) => {
                    warn!(%room_id, %conn_id, error = %err, "read failed");
                    break;
                }
                // Ping/pong is answered by the protocol layer.
                Some(Ok(_)) => {}
            },
            // Fired by the dispatcher on a failed broadcast write; unblocks
            // the receive loop so teardown can run.
            _ = cancel.cancelled() => break,
        }
    }

    writer.abort();

    if let Err(err) =
        lifecycle::disconnect(&state.registry, &*state.store, room_id, conn_id, player_id).await
    {
        error!(%room_id, %player_id, error = %err, "teardown incomplete");
    }
}

/// Drain the connection's channel into the socket sink. A failed write
/// means the write half is dead: fire the cancel handle so the receive
/// loop unblocks and teardown runs, instead of leaving the connection
/// registered until the read side notices.
async fn pump_outbound<S>(
    mut sink: S,
    mut rx: mpsc::UnboundedReceiver<Message>,
    cancel: CancellationToken,
) where
    S: futures_util::Sink<Message> + Unpin,
{
    while let Some(message) = rx.recv().await {
        if sink.send(message).await.is_err() {
            cancel.cancel();
            break;
        }
    }
}
