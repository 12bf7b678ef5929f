//! Serialized async front end for a device session.
//!
//! A dedicated thread owns the [`Crt571Client`] and runs one exchange at a
//! time; callers queue behind a single-slot channel.

use std::thread;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::client::Crt571Client;
use super::error::{Crt571Error, Result};
use super::response::Reply;
use super::transport::Transport;
use super::types::{CM_CARD_MOVE, CM_INITIALIZE, CM_STATUS_REQUEST, InitMode, MovePosition, StatusKind};

enum Job {
    Command {
        cm: u8,
        pm: u8,
        data: Vec<u8>,
        reply: oneshot::Sender<Result<Reply>>,
    },
    ClearLine {
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Clonable handle to a session running on its own thread.
///
/// The worker exits once every handle is dropped.
#[derive(Clone)]
pub struct DeviceHandle {
    tx: mpsc::Sender<Job>,
}

impl DeviceHandle {
    /// Move `client` onto a worker thread.
    pub fn spawn<T: Transport + 'static>(client: Crt571Client<T>) -> Result<Self> {
        let (tx, rx) = mpsc::channel(1);
        thread::Builder::new()
            .name("crt571-worker".to_string())
            .spawn(move || run_worker(client, rx))?;
        Ok(Self { tx })
    }

    /// Send any command/parameter pair; see [`Crt571Client::command`].
    pub async fn command(&self, cm: u8, pm: u8, data: impl Into<Vec<u8>>) -> Result<Reply> {
        let (reply, rx) = oneshot::channel();
        let job = Job::Command {
            cm,
            pm,
            data: data.into(),
            reply,
        };
        self.tx.send(job).await.map_err(|_| Crt571Error::WorkerStopped)?;
        rx.await.map_err(|_| Crt571Error::WorkerStopped)?
    }

    pub async fn clear_line(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job::ClearLine { reply })
            .await
            .map_err(|_| Crt571Error::WorkerStopped)?;
        rx.await.map_err(|_| Crt571Error::WorkerStopped)?
    }

    pub async fn status(&self, kind: StatusKind) -> Result<Reply> {
        self.command(CM_STATUS_REQUEST, kind.pm(), Vec::new()).await
    }

    pub async fn initialize(&self, mode: InitMode) -> Result<Reply> {
        self.command(CM_INITIALIZE, mode.pm(), Vec::new()).await
    }

    pub async fn move_card(&self, position: MovePosition) -> Result<Reply> {
        self.command(CM_CARD_MOVE, position.pm(), Vec::new()).await
    }
}

fn run_worker<T: Transport>(mut client: Crt571Client<T>, mut rx: mpsc::Receiver<Job>) {
    info!("CRT-571 worker started");
    while let Some(job) = rx.blocking_recv() {
        match job {
            Job::Command { cm, pm, data, reply } => {
                let result = client.command(cm, pm, &data);
                if reply.send(result).is_err() {
                    debug!("Caller went away before reply to CM {cm:#04X}");
                }
            }
            Job::ClearLine { reply } => {
                if reply.send(client.clear_line()).is_err() {
                    debug!("Caller went away before line clear finished");
                }
            }
        }
    }
    info!("CRT-571 worker stopped");
}
