use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::controllers::{AreaEvent, CommandAck, CommandSender};
use crate::errors::ClientError;
use crate::protocol::{AreaCommandDto, PlayerDto};

/// Records every command and answers with a canned result.
pub(crate) struct RecordingSender {
    sent: Mutex<Vec<(String, AreaCommandDto)>>,
    game_id: Option<String>,
    failure: Option<(String, String)>,
}

impl RecordingSender {
    pub(crate) fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            game_id: None,
            failure: None,
        }
    }

    pub(crate) fn with_game_id(mut self, game_id: &str) -> Self {
        self.game_id = Some(game_id.to_string());
        self
    }

    pub(crate) fn failing(mut self, code: &str, message: &str) -> Self {
        self.failure = Some((code.to_string(), message.to_string()));
        self
    }

    pub(crate) fn sent(&self) -> Vec<(String, AreaCommandDto)> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }
}

#[async_trait]
impl CommandSender for RecordingSender {
    async fn send_command(
        &self,
        area_id: &str,
        command: AreaCommandDto,
    ) -> Result<CommandAck, ClientError> {
        self.sent
            .lock()
            .expect("sent mutex poisoned")
            .push((area_id.to_string(), command));
        if let Some((code, message)) = &self.failure {
            return Err(ClientError::Command {
                code: code.clone(),
                message: message.clone(),
            });
        }
        Ok(CommandAck {
            game_id: self.game_id.clone(),
        })
    }
}

pub(crate) fn player(id: &str, display_name: &str) -> PlayerDto {
    PlayerDto {
        id: id.into(),
        display_name: display_name.into(),
        vehicle: None,
    }
}

pub(crate) fn drain(events: &mut broadcast::Receiver<AreaEvent>) -> Vec<AreaEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}
