use crate::state::StateHandle;
use shared::ipc::{Command, Response};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info};

/// Largest request accepted from a client; result batches are the bulk.
const MAX_REQUEST_BYTES: u64 = 1024 * 1024;

pub struct DaemonServer {
    socket_path: PathBuf,
    state: StateHandle,
}

impl DaemonServer {
    pub fn new(socket_path: PathBuf, state: StateHandle) -> Self {
        Self { socket_path, state }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn bind(&self) -> anyhow::Result<UnixListener> {
        if self.socket_path.exists() {
            std::fs::remove_file(&self.socket_path)?;
        }

        info!("Starting socket server at {}", self.socket_path.display());
        let listener = UnixListener::bind(&self.socket_path)?;
        debug!("Listener bound successfully");
        Ok(listener)
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let listener = self.bind()?;
        self.serve(listener).await
    }

    pub async fn serve(&self, listener: UnixListener) -> anyhow::Result<()> {
        loop {
            debug!("Waiting for connection...");
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("Connection accepted");
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_connection(state, stream).await {
                            error!("Error handling connection: {}", e);
                        } else {
                            debug!("Connection handled successfully");
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }

    async fn handle_connection(state: StateHandle, mut stream: UnixStream) -> anyhow::Result<()> {
        let mut buffer = Vec::new();
        (&mut stream)
            .take(MAX_REQUEST_BYTES)
            .read_to_end(&mut buffer)
            .await?;

        if buffer.is_empty() {
            return Ok(());
        }

        let response = match serde_json::from_slice::<Command>(&buffer) {
            Ok(command) => {
                info!("Received command: {}", describe(&command));
                state.send(command).await?
            }
            Err(e) => Response::Error(format!("Malformed request: {}", e)),
        };

        let response_json = serde_json::to_vec(&response)?;
        stream.write_all(&response_json).await?;
        stream.shutdown().await?;

        debug!("Sent response: {:?}", response);

        Ok(())
    }
}

/// Short form for logs; batches can be long.
fn describe(command: &Command) -> String {
    match command {
        Command::Submit(batch) => format!(
            "Submit({} result(s) from index {})",
            batch.results.len(),
            batch.result_index
        ),
        other => format!("{:?}", other),
    }
}

impl Drop for DaemonServer {
    fn drop(&mut self) {
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}
