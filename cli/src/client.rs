use shared::ipc::{Command, IpcError, Response};
use std::path::PathBuf;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::{timeout, Duration};
use tracing::warn;

/// Timeout for socket operations (5 seconds)
const SOCKET_TIMEOUT: Duration = Duration::from_secs(5);

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    pub fn new(socket_path: Option<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.unwrap_or_else(shared::default_socket_path),
        }
    }

    pub async fn send_command(&self, cmd: Command) -> Result<Response, IpcError> {
        // Connect with timeout
        let mut stream = match timeout(SOCKET_TIMEOUT, UnixStream::connect(&self.socket_path)).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(IpcError::ConnectionRefused);
            }
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                return Err(IpcError::ConnectionRefused);
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                warn!(
                    "Connection timeout: failed to connect to daemon at {} within {:?}",
                    self.socket_path.display(),
                    SOCKET_TIMEOUT
                );
                return Err(IpcError::Timeout);
            }
        };

        let command_json = serde_json::to_vec(&cmd)?;

        // The daemon reads until end of stream, so close our write half.
        let write = async {
            stream.write_all(&command_json).await?;
            stream.shutdown().await
        };
        match timeout(SOCKET_TIMEOUT, write).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                warn!("Write timeout: failed to send command to daemon within {:?}", SOCKET_TIMEOUT);
                return Err(IpcError::Timeout);
            }
        }

        let mut buffer = Vec::new();
        match timeout(SOCKET_TIMEOUT, stream.read_to_end(&mut buffer)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                warn!(
                    "Read timeout: failed to receive response from daemon within {:?}",
                    SOCKET_TIMEOUT
                );
                return Err(IpcError::Timeout);
            }
        }

        let response: Response = serde_json::from_slice(&buffer)?;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::StatusInfo;
    use tokio::net::UnixListener;

    fn temp_socket(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.sock", name, std::process::id()));
        std::fs::remove_file(&path).ok();
        path
    }

    /// Accepts one connection, checks the command and answers with `response`.
    fn mock_daemon(path: &PathBuf, expect: Command, response: Response) {
        let listener = UnixListener::bind(path).unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut buffer = Vec::new();
            stream.read_to_end(&mut buffer).await.unwrap();
            let command: Command = serde_json::from_slice(&buffer).unwrap();
            assert_eq!(command, expect);

            let response_json = serde_json::to_vec(&response).unwrap();
            stream.write_all(&response_json).await.unwrap();
        });
    }

    #[test]
    fn test_daemon_client_default_socket() {
        let client = DaemonClient::new(None);
        assert_eq!(client.socket_path, shared::default_socket_path());
    }

    #[tokio::test]
    async fn test_send_command_socket_not_found() {
        let client = DaemonClient::new(Some(temp_socket("voix-missing")));
        let result = client.send_command(Command::Start).await;
        assert!(matches!(result, Err(IpcError::ConnectionRefused)));
    }

    #[tokio::test]
    async fn test_send_command_with_mock_server() {
        let socket = temp_socket("voix-start");
        mock_daemon(&socket, Command::Start, Response::Ok);

        let client = DaemonClient::new(Some(socket.clone()));
        let result = client.send_command(Command::Start).await;
        assert!(matches!(result, Ok(Response::Ok)));

        std::fs::remove_file(&socket).ok();
    }

    #[tokio::test]
    async fn test_send_command_status() {
        let socket = temp_socket("voix-status");
        let info = StatusInfo {
            is_running: true,
            is_listening: false,
            key_held: true,
            language: "en-US".to_string(),
            commands: 4,
        };
        mock_daemon(&socket, Command::Status, Response::Status(info.clone()));

        let client = DaemonClient::new(Some(socket.clone()));
        let result = client.send_command(Command::Status).await.unwrap();
        assert_eq!(result, Response::Status(info));

        std::fs::remove_file(&socket).ok();
    }

    #[tokio::test]
    async fn test_send_command_error_response() {
        let socket = temp_socket("voix-error");
        mock_daemon(
            &socket,
            Command::Unregister("open tab".to_string()),
            Response::Error("test error".to_string()),
        );

        let client = DaemonClient::new(Some(socket.clone()));
        let result = client
            .send_command(Command::Unregister("open tab".to_string()))
            .await;
        assert!(matches!(result, Ok(Response::Error(_))));

        std::fs::remove_file(&socket).ok();
    }

    #[tokio::test]
    async fn test_send_command_timeout_on_read() {
        let socket = temp_socket("voix-timeout");

        let listener = UnixListener::bind(&socket).unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();

            let mut buffer = Vec::new();
            let _ = stream.read_to_end(&mut buffer).await;

            // Never answer; the client gives up after SOCKET_TIMEOUT.
            tokio::time::sleep(tokio::time::Duration::from_secs(6)).await;
        });

        let client = DaemonClient::new(Some(socket.clone()));
        let result = client.send_command(Command::Start).await;
        assert!(matches!(result, Err(IpcError::Timeout)));

        std::fs::remove_file(&socket).ok();
    }
}
