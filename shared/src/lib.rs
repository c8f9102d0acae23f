pub mod ipc;
pub mod transcript;

pub use ipc::{
    default_socket_path, BatchSummary, CommandSpec, ExtractSpec, HandlerFailure, IpcError,
    MatchKind, StatusInfo,
};
pub use transcript::{Alternative, ResultBatch, TranscriptResult};
