// WebSocket connection to the town server with per-command reply correlation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::controllers::{CommandAck, CommandSender};
use crate::errors::ClientError;
use crate::protocol::{
    AreaCommandDto, ClientMessage, CommandPayload, CommandResultDto, ServerMessage,
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
// `None` once the socket is gone; waiting commands are dropped with it.
type PendingCommands = Arc<Mutex<Option<HashMap<u64, oneshot::Sender<CommandResultDto>>>>>;

const OUTGOING_CHANNEL_CAPACITY: usize = 64;
const UPDATE_CHANNEL_CAPACITY: usize = 256;
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TownConnection {
    outgoing: mpsc::Sender<ClientMessage>,
    pending: PendingCommands,
    next_command_id: AtomicU64,
    command_timeout: Duration,
}

impl TownConnection {
    /// Connects and sends `Join`. The receiver yields every server message except
    /// command results, starting with `Identity` and `Snapshot`. Updates that
    /// arrive while the receiver is full are dropped with a warning.
    pub async fn connect(
        url: &str,
        display_name: &str,
    ) -> Result<(Self, mpsc::Receiver<ServerMessage>), ClientError> {
        let (socket, _) = connect_async(url).await?;
        let (mut sink, stream) = socket.split();

        let join = ClientMessage::Join {
            display_name: display_name.to_string(),
        };
        sink.send(Message::text(serde_json::to_string(&join)?))
            .await?;
        info!(%url, "connected to town");

        let (outgoing, outgoing_rx) = mpsc::channel(OUTGOING_CHANNEL_CAPACITY);
        let (updates_tx, updates_rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let pending: PendingCommands = Arc::new(Mutex::new(Some(HashMap::new())));

        tokio::spawn(writer_task(sink, outgoing_rx));
        tokio::spawn(reader_task(stream, pending.clone(), updates_tx));

        Ok((
            Self {
                outgoing,
                pending,
                next_command_id: AtomicU64::new(0),
                command_timeout: DEFAULT_COMMAND_TIMEOUT,
            },
            updates_rx,
        ))
    }

    pub fn with_command_timeout(mut self, command_timeout: Duration) -> Self {
        self.command_timeout = command_timeout;
        self
    }

    pub async fn enter_area(&self, area_id: &str) -> Result<(), ClientError> {
        self.send(ClientMessage::EnterArea {
            area_id: area_id.to_string(),
        })
        .await
    }

    pub async fn exit_area(&self, area_id: &str) -> Result<(), ClientError> {
        self.send(ClientMessage::ExitArea {
            area_id: area_id.to_string(),
        })
        .await
    }

    async fn send(&self, msg: ClientMessage) -> Result<(), ClientError> {
        self.outgoing
            .send(msg)
            .await
            .map_err(|_| ClientError::NotConnected)
    }

    async fn forget(&self, command_id: u64) {
        if let Some(pending) = self.pending.lock().await.as_mut() {
            pending.remove(&command_id);
        }
    }
}

#[async_trait]
impl CommandSender for TownConnection {
    async fn send_command(
        &self,
        area_id: &str,
        command: AreaCommandDto,
    ) -> Result<CommandAck, ClientError> {
        let command_id = self.next_command_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (reply, reply_rx) = oneshot::channel();
        match self.pending.lock().await.as_mut() {
            Some(pending) => {
                pending.insert(command_id, reply);
            }
            None => return Err(ClientError::NotConnected),
        }

        let sent = self
            .send(ClientMessage::Command(CommandPayload {
                command_id,
                area_id: area_id.to_string(),
                command,
            }))
            .await;
        if let Err(err) = sent {
            self.forget(command_id).await;
            return Err(err);
        }

        let result = match timeout(self.command_timeout, reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => return Err(ClientError::NotConnected),
            Err(_) => {
                self.forget(command_id).await;
                return Err(ClientError::Transport(format!(
                    "command {command_id} timed out"
                )));
            }
        };

        match result.error {
            Some(error) => Err(ClientError::Command {
                code: error.code,
                message: error.message,
            }),
            None => Ok(CommandAck {
                game_id: result.game_id,
            }),
        }
    }
}

async fn writer_task(
    mut sink: SplitSink<Socket, Message>,
    mut outgoing_rx: mpsc::Receiver<ClientMessage>,
) {
    while let Some(msg) = outgoing_rx.recv().await {
        let txt = match serde_json::to_string(&msg) {
            Ok(txt) => txt,
            Err(e) => {
                warn!(error = %e, "failed to serialize client message");
                continue;
            }
        };
        if let Err(e) = sink.send(Message::text(txt)).await {
            warn!(error = %e, "failed to send to town; writer exiting");
            break;
        }
    }
    let _ = sink.close().await;
}

async fn reader_task(
    mut stream: SplitStream<Socket>,
    pending: PendingCommands,
    updates_tx: mpsc::Sender<ServerMessage>,
) {
    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "town socket error");
                break;
            }
        };

        let msg = match serde_json::from_str::<ServerMessage>(text.as_str()) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "unreadable server message");
                continue;
            }
        };

        route_message(msg, &pending, &updates_tx).await;
    }

    pending.lock().await.take();
    info!("town connection closed");
}

// Never waits on the update receiver, so command replies keep flowing while it is full.
async fn route_message(
    msg: ServerMessage,
    pending: &PendingCommands,
    updates_tx: &mpsc::Sender<ServerMessage>,
) {
    match msg {
        ServerMessage::CommandResult(result) => {
            let waiting = pending
                .lock()
                .await
                .as_mut()
                .and_then(|p| p.remove(&result.command_id));
            match waiting {
                Some(reply) => {
                    let _ = reply.send(result);
                }
                None => debug!(command_id = result.command_id, "unexpected command result"),
            }
        }
        other => match updates_tx.try_send(other) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!(?dropped, "update receiver full; dropping server update");
            }
            // A dropped receiver only stops update delivery.
            Err(TrySendError::Closed(_)) => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    async fn next_json<S>(ws: &mut WebSocketStream<S>) -> Value
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
    {
        loop {
            match ws.next().await.expect("client hung up").expect("socket error") {
                Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn command_results_are_matched_by_id() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();

            let join = next_json(&mut ws).await;
            assert_eq!(join, json!({ "type": "Join", "data": { "display_name": "Ada" } }));
            ws.send(Message::text(
                json!({ "type": "Identity", "data": { "player_id": "7" } }).to_string(),
            ))
            .await
            .unwrap();

            let first = next_json(&mut ws).await;
            let second = next_json(&mut ws).await;
            // Answer out of order.
            for (cmd, reply) in [
                (second, json!({ "game_id": "g1" })),
                (first, json!({ "error": { "code": "game_full", "message": "game is full" } })),
            ] {
                let mut data = reply;
                data["command_id"] = cmd["data"]["command_id"].clone();
                ws.send(Message::text(
                    json!({ "type": "CommandResult", "data": data }).to_string(),
                ))
                .await
                .unwrap();
            }
            ws
        });

        let (connection, mut updates) = TownConnection::connect(&format!("ws://{addr}"), "Ada")
            .await
            .unwrap();
        assert_eq!(
            updates.recv().await,
            Some(ServerMessage::Identity {
                player_id: "7".into()
            })
        );

        let (full, joined) = tokio::join!(
            connection.send_command("trick", AreaCommandDto::JoinGame),
            async {
                // Make sure the second command goes out after the first.
                tokio::time::sleep(Duration::from_millis(50)).await;
                connection
                    .send_command("trick", AreaCommandDto::JoinGame)
                    .await
            }
        );

        assert_eq!(
            full,
            Err(ClientError::Command {
                code: "game_full".into(),
                message: "game is full".into()
            })
        );
        assert_eq!(
            joined,
            Ok(CommandAck {
                game_id: Some("g1".into())
            })
        );
        drop(server.await.unwrap());
    }

    #[tokio::test]
    async fn command_results_are_delivered_while_updates_back_up() {
        let (reply, reply_rx) = oneshot::channel();
        let pending: PendingCommands = Arc::new(Mutex::new(Some(HashMap::from([(3, reply)]))));
        let (updates_tx, mut updates_rx) = mpsc::channel(1);
        let left = |id: &str| ServerMessage::PlayerLeft {
            player_id: id.into(),
        };

        route_message(left("1"), &pending, &updates_tx).await;
        route_message(left("2"), &pending, &updates_tx).await;
        let result = CommandResultDto {
            command_id: 3,
            game_id: Some("g1".into()),
            error: None,
        };
        tokio::time::timeout(
            Duration::from_secs(1),
            route_message(ServerMessage::CommandResult(result.clone()), &pending, &updates_tx),
        )
        .await
        .expect("routing must not wait on the update receiver");

        assert_eq!(reply_rx.await, Ok(result));
        assert_eq!(updates_rx.recv().await, Some(left("1")));
        assert!(updates_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn commands_fail_once_the_server_hangs_up() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            let _join = next_json(&mut ws).await;
            ws.close(None).await.unwrap();
        });

        let (connection, mut updates) = TownConnection::connect(&format!("ws://{addr}"), "Ada")
            .await
            .unwrap();
        // The update channel closes when the reader exits.
        assert_eq!(updates.recv().await, None);

        let result = connection
            .send_command("trick", AreaCommandDto::JoinGame)
            .await;

        assert!(matches!(
            result,
            Err(ClientError::NotConnected) | Err(ClientError::Transport(_))
        ));
    }
}
