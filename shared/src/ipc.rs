use crate::transcript::ResultBatch;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const SOCKET_NAME: &str = "voixd.sock";

/// Unix socket the daemon listens on.
/// Uses XDG runtime directory if available, falls back to /tmp/voixd.sock
pub fn default_socket_path() -> PathBuf {
    match dirs::runtime_dir() {
        Some(runtime_dir) => runtime_dir.join(SOCKET_NAME),
        None => PathBuf::from("/tmp").join(SOCKET_NAME),
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    Status,
    KeyDown(u32),
    KeyUp(u32),
    Submit(ResultBatch),
    Register(CommandSpec),
    Unregister(String),
    List,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum Response {
    Ok,
    Error(String),
    Status(StatusInfo),
    Report(BatchSummary),
    Commands(Vec<String>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatusInfo {
    pub is_running: bool,
    pub is_listening: bool,
    pub key_held: bool,
    pub language: String,
    pub commands: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    #[default]
    Exact,
    Prefix,
}

/// How a prefix command turns the rest of the utterance into its argument.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractSpec {
    #[default]
    Remainder,
    Before(String),
    After(String),
    /// Keep the whole remainder and expose both sides of the separator.
    Split(String),
    Pattern(String),
}

/// A command binding as written in the config file or sent over the socket.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub phrase: String,
    #[serde(rename = "match", default)]
    pub kind: MatchKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractSpec>,
    /// Program and arguments; `{arg}` is replaced by the extracted argument,
    /// `{1}` and `{2}` by its parts.
    pub run: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HandlerFailure {
    pub key: String,
    pub error: String,
}

/// Outcome of one processed result batch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BatchSummary {
    pub accepted: bool,
    pub dispatched: Vec<String>,
    pub unmatched: Vec<String>,
    pub failed: Vec<HandlerFailure>,
}

#[derive(Error, Debug)]
pub enum IpcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection refused: is voixd running?")]
    ConnectionRefused,

    #[error("Connection timeout")]
    Timeout,
}
