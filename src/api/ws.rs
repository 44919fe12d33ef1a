// =============================================================================
// Live Feed — dashboard snapshots over `/api/v1/ws`
// =============================================================================
//
// A subscriber gets one frame as soon as the socket opens, whatever the
// current state. After that the server polls `state_version` on a short
// timer and sends another frame only when a refresh cycle has published
// since the previous frame. The client never has to ask.
//
// Inbound traffic only matters for liveness. A Ping is answered with a Pong
// and a Close or end of stream ends the session.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{Sink, SinkExt, StreamExt};
use serde::Serialize;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::app_state::{AppState, DashboardSnapshot};

/// How often a session checks for a newly published snapshot.
const VERSION_POLL: Duration = Duration::from_millis(500);

/// One outbound frame.
#[derive(Debug, Serialize)]
pub struct WsFrame {
    /// Per-connection sequence number, starting at 1.
    pub seq: u64,
    pub state_version: u64,
    /// `None` until the first refresh cycle has completed.
    pub snapshot: Option<DashboardSnapshot>,
}

/// What a session does with one inbound item.
#[derive(Debug, PartialEq)]
enum Inbound {
    Reply(Message),
    Ignore,
    Hangup,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    info!("live feed subscriber connecting");
    ws.on_upgrade(move |socket| run_session(socket, state))
}

async fn run_session(socket: WebSocket, state: Arc<AppState>) {
    let (mut outbound, mut inbound) = socket.split();
    let mut seq: u64 = 0;

    let mut delivered = state.current_state_version();
    if let Err(e) = push_frame(&mut outbound, &state, &mut seq).await {
        warn!(error = %e, "live feed: first frame not delivered");
        return;
    }

    let mut poll = interval(VERSION_POLL);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = poll.tick() => {
                let latest = state.current_state_version();
                if latest == delivered {
                    continue;
                }
                if let Err(e) = push_frame(&mut outbound, &state, &mut seq).await {
                    debug!(error = %e, "live feed: subscriber unreachable");
                    break;
                }
                delivered = latest;
            }

            item = inbound.next() => match classify(item) {
                Inbound::Reply(reply) => {
                    if let Err(e) = outbound.send(reply).await {
                        debug!(error = %e, "live feed: pong not delivered");
                        break;
                    }
                }
                Inbound::Ignore => {}
                Inbound::Hangup => break,
            },
        }
    }

    info!(frames = seq, "live feed subscriber gone");
}

fn classify(item: Option<Result<Message, axum::Error>>) -> Inbound {
    match item {
        Some(Ok(Message::Ping(payload))) => Inbound::Reply(Message::Pong(payload)),
        Some(Ok(Message::Close(_))) | None => Inbound::Hangup,
        Some(Ok(_)) => Inbound::Ignore,
        Some(Err(e)) => {
            warn!(error = %e, "live feed: receive failed");
            Inbound::Hangup
        }
    }
}

fn build_frame(state: &AppState, seq: u64) -> WsFrame {
    WsFrame {
        seq,
        state_version: state.current_state_version(),
        snapshot: state.latest_snapshot(),
    }
}

/// Send the current snapshot as the next frame. Only transport errors are
/// returned; a frame that fails to serialize is logged and skipped.
async fn push_frame<S>(sink: &mut S, state: &AppState, seq: &mut u64) -> Result<(), axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    *seq += 1;
    let frame = build_frame(state, *seq);

    let json = match serde_json::to_string(&frame) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, seq = *seq, "live feed: frame not serializable");
            return Ok(());
        }
    };
    sink.send(Message::Text(json)).await?;
    debug!(state_version = frame.state_version, seq = *seq, "live feed: frame sent");
    Ok(())
}
