use super::session::EngineConfig;
use crate::error::EngineError;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

/// A continuous speech-to-text connection.
///
/// The engine is opened once per session. Result batches travel separately
/// (see `DaemonState`), so an engine only owns the connection lifecycle.
pub trait TranscriptionEngine: Send {
    fn open(&mut self, config: &EngineConfig) -> Result<(), EngineError>;

    fn close(&mut self) {}
}

fn language_tag() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("language tag pattern is valid")
    })
}

/// Engine whose results are produced by an external transcription process
/// that submits batches over the daemon socket.
#[derive(Debug, Default)]
pub struct FeedEngine {
    language: Option<String>,
}

impl FeedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.language.is_some()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl TranscriptionEngine for FeedEngine {
    fn open(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        if !language_tag().is_match(&config.language) {
            return Err(EngineError::UnsupportedLanguage(config.language.clone()));
        }

        debug!(
            "Feed engine config: continuous={}, interim_results={}, max_alternatives={}",
            config.continuous, config.interim_results, config.max_alternatives
        );
        info!("Transcription feed opened for language {}", config.language);
        self.language = Some(config.language.clone());
        Ok(())
    }

    fn close(&mut self) {
        if self.language.take().is_some() {
            info!("Transcription feed closed");
        }
    }
}
