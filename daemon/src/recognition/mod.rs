pub mod engine;
pub mod session;

pub use engine::{FeedEngine, TranscriptionEngine};
pub use session::{EngineConfig, RecognitionSession, DEFAULT_LANGUAGE};
