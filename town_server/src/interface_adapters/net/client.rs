use crate::domain::{GameError, Player, PlayerId};
use crate::interface_adapters::protocol::{
    ClientMessage, CommandPayload, CommandResultDto, ServerMessage, TownSnapshotDto,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rand_id;
use crate::use_cases::{AreaCommand, TownEvent, TownHandle, TownSnapshot, TownUpdate};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    UpdatesClosed,
    JoinRequired,
    JoinTimeout,
    InvalidDisplayName,
    ClosedBeforeJoin,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const MAX_DISPLAY_NAME_LEN: usize = 32;
const JOIN_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Serializes each town update once and rebroadcasts the shared bytes.
pub async fn update_serializer(
    mut updates_rx: broadcast::Receiver<TownUpdate>,
    update_bytes_tx: broadcast::Sender<Utf8Bytes>,
) {
    loop {
        match updates_rx.recv().await {
            Ok(update) => {
                let msg = ServerMessage::from(&update);
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize town update");
                        continue;
                    }
                };
                let _ = update_bytes_tx.send(Utf8Bytes::from(txt));
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                // Connections resync from a snapshot when they lag themselves.
                warn!(missed = n, "update serializer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("town updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub fn spawn_update_serializer(town: &TownHandle, update_bytes_tx: broadcast::Sender<Utf8Bytes>) {
    tokio::spawn(update_serializer(town.updates_tx.subscribe(), update_bytes_tx));
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        // Separate connection id for correlating logs before a player_id exists.
        let conn_id = rand_id();
        let span = info_span!("conn", conn_id, player_id = tracing::field::Empty);
        handle_socket(socket, state).instrument(span)
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut ctx = match bootstrap_connection(&mut socket, &state).await {
        Ok(ctx) => ctx,
        Err(NetError::ClosedBeforeJoin) => {
            info!("client disconnected before join handshake");
            return;
        }
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = socket.close().await;
            return;
        }
    };

    tracing::Span::current().record("player_id", ctx.player_id);
    info!(
        player_id = ctx.player_id,
        display_name = %ctx.display_name,
        "client connected"
    );

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

struct ConnCtx {
    pub player_id: PlayerId,
    pub display_name: String,
    pub input_tx: mpsc::Sender<TownEvent>,
    pub update_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    pub lag_recovery_count: u64,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,

    pub last_update_lag_log: Instant,
    pub last_invalid_input_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

struct JoinHandshake {
    display_name: String,
    bytes_in: u64,
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    state: &AppState,
) -> Result<ConnCtx, NetError> {
    // Subscribe before joining so no update after the snapshot is missed.
    let update_bytes_rx = state.update_bytes_tx.subscribe();
    let input_tx = state.town.input_tx.clone();

    let join = match timeout(JOIN_HANDSHAKE_TIMEOUT, read_join_handshake(socket)).await {
        Ok(result) => result?,
        Err(_) => {
            let _ = send_close_with_reason(socket, close_code::POLICY, "join timeout").await;
            return Err(NetError::JoinTimeout);
        }
    };

    let player_id = rand_id();
    let (reply, reply_rx) = oneshot::channel();
    input_tx
        .send(TownEvent::Join {
            player: Player::new(player_id, join.display_name.clone()),
            reply,
        })
        .await
        .map_err(|_| NetError::InputClosed)?;
    let snapshot = reply_rx.await.map_err(|_| NetError::InputClosed)?;

    let identity_msg = ServerMessage::Identity {
        player_id: player_id.to_string(),
    };
    let snapshot_msg = ServerMessage::Snapshot(TownSnapshotDto::from(&snapshot));
    let mut bytes_out = 0u64;
    for msg in [&identity_msg, &snapshot_msg] {
        match send_message(socket, msg).await {
            Ok(bytes) => bytes_out += bytes as u64,
            Err(err) => {
                // Compensate the join so the town does not keep a ghost player.
                let _ = input_tx.send(TownEvent::Leave { player_id }).await;
                return Err(err);
            }
        }
    }

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        player_id,
        display_name: join.display_name,
        input_tx,
        update_bytes_rx,
        lag_recovery_count: 0,

        msgs_in: 1,
        msgs_out: 2,
        bytes_in: join.bytes_in,
        bytes_out,

        invalid_json: 0,

        last_update_lag_log: now,
        last_invalid_input_log: now,

        close_frame: None,
    })
}

enum LoopControl {
    Continue,
    Disconnect,
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

async fn read_join_handshake(socket: &mut WebSocket) -> Result<JoinHandshake, NetError> {
    loop {
        let Some(incoming) = socket.recv().await else {
            return Err(NetError::ClosedBeforeJoin);
        };

        match incoming.map_err(NetError::Ws)? {
            Message::Text(text) => {
                let bytes_in = text.len() as u64;
                let payload = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join(payload)) => payload,
                    Ok(_) => {
                        let _ = send_close_with_reason(socket, close_code::POLICY, "join required")
                            .await;
                        return Err(NetError::JoinRequired);
                    }
                    Err(_) => {
                        let _ = send_close_with_reason(
                            socket,
                            close_code::POLICY,
                            "invalid join payload",
                        )
                        .await;
                        return Err(NetError::JoinRequired);
                    }
                };

                let display_name = payload.display_name.trim();
                if display_name.is_empty() || display_name.chars().count() > MAX_DISPLAY_NAME_LEN
                {
                    let _ =
                        send_close_with_reason(socket, close_code::POLICY, "invalid display name")
                            .await;
                    return Err(NetError::InvalidDisplayName);
                }

                return Ok(JoinHandshake {
                    display_name: display_name.to_string(),
                    bytes_in,
                });
            }
            Message::Binary(_) => {
                let _ = send_close_with_reason(
                    socket,
                    close_code::UNSUPPORTED,
                    "binary messages not supported",
                )
                .await;
                return Err(NetError::JoinRequired);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Err(NetError::ClosedBeforeJoin),
        }
    }
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect: bool = tokio::select! {
            incoming = socket.recv() => {
                match handle_incoming_ws(socket, incoming, ctx).await {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            update = ctx.update_bytes_rx.recv() => {
                match update {
                    Ok(bytes) => match forward_bytes(bytes, socket, ctx).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(&mut ctx.last_update_lag_log) {
                            warn!(missed = n, "town updates lagged; sending snapshot");
                        }
                        match resync(socket, ctx).await {
                            Ok(LoopControl::Continue) => false,
                            Ok(LoopControl::Disconnect) => true,
                            Err(e) => {
                                fatal = Some(e);
                                true
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        fatal = Some(NetError::UpdatesClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(ctx).await {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn handle_incoming_ws(
    socket: &mut WebSocket,
    incoming: Option<Result<Message, Error>>,
    ctx: &mut ConnCtx,
) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    let msg = match incoming {
        Some(Ok(msg)) => msg,
        Some(Err(e)) => {
            warn!(player_id, error = %e, "websocket recv error");
            return Ok(LoopControl::Disconnect);
        }
        None => {
            info!(player_id, "websocket closed");
            return Ok(LoopControl::Disconnect);
        }
    };

    let text = match msg {
        Message::Text(text) => text,
        Message::Binary(_) => {
            ctx.close_frame = Some(CloseFrame {
                code: close_code::UNSUPPORTED,
                reason: "binary messages not supported".into(),
            });
            return Ok(LoopControl::Disconnect);
        }
        Message::Ping(_) | Message::Pong(_) => return Ok(LoopControl::Continue),
        Message::Close(_) => return Ok(LoopControl::Disconnect),
    };

    ctx.msgs_in += 1;
    ctx.bytes_in += text.len() as u64;

    let event = match serde_json::from_str::<ClientMessage>(&text) {
        Ok(ClientMessage::Join(_)) => {
            // Repeated Join packets after bootstrap keep the original identity.
            if should_log(&mut ctx.last_invalid_input_log) {
                warn!(player_id, "duplicate join ignored");
            }
            return Ok(LoopControl::Continue);
        }
        Ok(ClientMessage::EnterArea { area_id }) => TownEvent::EnterArea { player_id, area_id },
        Ok(ClientMessage::ExitArea { area_id }) => TownEvent::ExitArea { player_id, area_id },
        Ok(ClientMessage::Command(payload)) => {
            return dispatch_command(socket, ctx, payload).await;
        }
        Err(parse_err) => {
            ctx.invalid_json += 1;
            if should_log(&mut ctx.last_invalid_input_log) {
                warn!(
                    player_id,
                    bytes = text.len(),
                    error = %parse_err,
                    "failed to parse client message"
                );
            }
            if ctx.invalid_json > MAX_INVALID_JSON {
                ctx.close_frame = Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "too many invalid messages".into(),
                });
                return Ok(LoopControl::Disconnect);
            }
            return Ok(LoopControl::Continue);
        }
    };

    ctx.input_tx
        .send(event)
        .await
        .map_err(|_| NetError::InputClosed)?;
    Ok(LoopControl::Continue)
}

// Runs one command through the town task and answers with its CommandResult.
async fn dispatch_command(
    socket: &mut WebSocket,
    ctx: &mut ConnCtx,
    payload: CommandPayload,
) -> Result<LoopControl, NetError> {
    let CommandPayload {
        command_id,
        area_id,
        command,
    } = payload;

    let result = match AreaCommand::try_from(command) {
        Ok(command) => {
            let (reply, reply_rx) = oneshot::channel();
            ctx.input_tx
                .send(TownEvent::Command {
                    player_id: ctx.player_id,
                    area_id,
                    command,
                    reply,
                })
                .await
                .map_err(|_| NetError::InputClosed)?;
            reply_rx.await.map_err(|_| NetError::InputClosed)?
        }
        Err(error) => Err::<_, GameError>(error),
    };

    let msg = ServerMessage::CommandResult(CommandResultDto::from_result(command_id, &result));
    match send_message(socket, &msg).await {
        Ok(bytes) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes as u64;
            Ok(LoopControl::Continue)
        }
        Err(err) => {
            warn!(error = ?err, command_id, "failed to send command result");
            Ok(LoopControl::Disconnect)
        }
    }
}

// Lagged connections get a fresh snapshot instead of the missed deltas.
async fn resync(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<LoopControl, NetError> {
    let (reply, reply_rx) = oneshot::channel();
    ctx.input_tx
        .send(TownEvent::Snapshot { reply })
        .await
        .map_err(|_| NetError::InputClosed)?;
    let snapshot: TownSnapshot = reply_rx.await.map_err(|_| NetError::InputClosed)?;

    ctx.lag_recovery_count += 1;
    let msg = ServerMessage::Snapshot(TownSnapshotDto::from(&snapshot));
    match send_message(socket, &msg).await {
        Ok(bytes) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes as u64;
            Ok(LoopControl::Continue)
        }
        Err(err) => {
            warn!(error = ?err, "failed to send lag recovery snapshot");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_bytes(bytes: Utf8Bytes, socket: &mut WebSocket, ctx: &mut ConnCtx) -> LoopControl {
    let bytes_len = bytes.len();
    match socket.send(Message::Text(bytes)).await.map_err(NetError::Ws) {
        Ok(()) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            warn!(error = ?err, "failed to send town update");
            LoopControl::Disconnect
        }
    }
}

async fn disconnect_cleanup(ctx: &ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;
    // Leaving the town also withdraws the player from any live game.
    ctx.input_tx
        .send(TownEvent::Leave { player_id })
        .await
        .map_err(|_| NetError::InputClosed)?;

    debug!(
        player_id,
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        bytes_in = ctx.bytes_in,
        bytes_out = ctx.bytes_out,
        invalid_json = ctx.invalid_json,
        lag_recovery_count = ctx.lag_recovery_count,
        "connection stats"
    );
    info!(player_id, "client disconnected");
    Ok(())
}
