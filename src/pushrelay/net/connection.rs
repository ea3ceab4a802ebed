use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{ErrorCode, PushError};
use crate::pushrelay::handler::CommandHandler;
use crate::pushrelay::net::protocol::Response;
use crate::pushrelay::types::SessionId;
use crate::pushrelay::ui::UiHandle;

/// State owned by a session's UI executor
pub struct SessionView {
    pub id: SessionId,
    outbox: UnboundedSender<Response>,
    pub busy: bool,
}

impl SessionView {
    fn new(id: SessionId, outbox: UnboundedSender<Response>) -> Self {
        Self {
            id,
            outbox,
            busy: false,
        }
    }

    pub fn send(&self, response: Response) {
        if let Err(e) = self.outbox.send(response) {
            debug!("Session {} gone, dropping response: {}", self.id, e);
        }
    }
}

/// One control-client connection
pub struct Session {
    id: SessionId,
    write_tx: UnboundedSender<Response>,
    cancel_token: CancellationToken,
    ui: UiHandle<SessionView>,
}

impl Session {
    pub fn new(stream: TcpStream, handler: Arc<CommandHandler>) -> Arc<Self> {
        let (reader, writer) = stream.into_split();
        let (write_tx, write_rx) = unbounded_channel::<Response>();
        let cancel_token = CancellationToken::new();
        let id = Uuid::new_v4();

        let (ui, _) = UiHandle::spawn(SessionView::new(id, write_tx.clone()), cancel_token.child_token());

        let session = Arc::new(Self {
            id,
            write_tx,
            cancel_token,
            ui,
        });
        info!("Session {} opened", id);

        let session_read = session.clone();
        tokio::spawn(async move {
            if let Err(e) = Session::read_task(session_read.clone(), reader, handler).await {
                warn!("Read task error: {}", e);
            }
            session_read.close();
        });

        let cancel_write = session.cancel_token.clone();
        tokio::spawn(async move {
            if let Err(e) = Session::write_task(writer, write_rx, cancel_write).await {
                warn!("Write task error: {}", e);
            }
        });

        session
    }

    async fn read_task(session: Arc<Session>, reader: OwnedReadHalf, handler: Arc<CommandHandler>) -> Result<(), PushError> {
        tokio::select! {
            _ = session.cancel_token.cancelled() => Ok(()),
            res = Session::read(session.clone(), reader, handler) => res,
        }
    }

    async fn read(session: Arc<Session>, reader: OwnedReadHalf, handler: Arc<CommandHandler>) -> Result<(), PushError> {
        debug!("Starting read loop for session {}", session.id);
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    debug!("Received request from session {}: {}", session.id, line);
                    handler.handle_line(&session, line).await;
                }
                Ok(None) => {
                    debug!("Session {} reached end of stream", session.id);
                    return Ok(());
                }
                Err(e) => {
                    error!("Failed to read request line: {}", e);
                    return Err(PushError::new(ErrorCode::ReadFailed, "Connection failed"));
                }
            }
        }
    }

    async fn write_task(
        mut writer: OwnedWriteHalf,
        mut rx: UnboundedReceiver<Response>,
        cancel: CancellationToken,
    ) -> Result<(), PushError> {
        debug!("Starting write task");
        loop {
            let response = tokio::select! {
                _ = cancel.cancelled() => break,
                response = rx.recv() => match response {
                    Some(response) => response,
                    None => break,
                },
            };
            let encoded = response.encode_line()?;
            if let Err(e) = writer.write_all(&encoded).await {
                error!("Failed to write response: {}", e);
                return Err(PushError::new(ErrorCode::WriteFailed, "Connection failed"));
            }
        }
        info!("Write task completed");
        Ok(())
    }

    pub fn send(&self, response: Response) {
        if let Err(e) = self.write_tx.send(response) {
            warn!("Failed to queue response for session {}: {}", self.id, e);
        }
    }

    pub fn ui(&self) -> &UiHandle<SessionView> {
        &self.ui
    }

    pub fn close(&self) {
        if self.cancel_token.is_cancelled() {
            return;
        }
        self.cancel_token.cancel();
        info!("Session {} closed", self.id);
    }

    pub fn id(&self) -> SessionId {
        self.id
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
