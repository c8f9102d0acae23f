pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod output;
pub mod recognition;
pub mod server;
pub mod state;
pub mod trigger;

pub use commands::{CommandHandler, CommandPattern, CommandRegistry, Extractor};
pub use dispatch::{
    normalize, BatchReport, DispatchEvent, DispatchObserver, Dispatcher, ListenControl,
    SessionState,
};
pub use error::{CommandError, EngineError, SessionError};
pub use recognition::{EngineConfig, FeedEngine, RecognitionSession, TranscriptionEngine};
pub use state::{DaemonState, StateHandle};
pub use trigger::{KeyCode, TriggerBinding, TriggerOutcome};
