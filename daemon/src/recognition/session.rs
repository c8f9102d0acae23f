use super::engine::TranscriptionEngine;
use crate::error::SessionError;
use tracing::{debug, info};

pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Engine settings. Everything except the language is fixed policy.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub language: String,
    pub continuous: bool,
    pub interim_results: bool,
    pub max_alternatives: u32,
}

impl EngineConfig {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            continuous: true,
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultSlot {
    Detached,
    Attached,
}

/// One open engine connection plus the single result-handler slot.
///
/// Attaching and detaching only decide whether batches reach the owner;
/// the connection stays open until the session is dropped.
pub struct RecognitionSession<E: TranscriptionEngine> {
    engine: E,
    config: EngineConfig,
    slot: ResultSlot,
}

impl<E: TranscriptionEngine> RecognitionSession<E> {
    pub fn open(mut engine: E, config: EngineConfig) -> Result<Self, SessionError> {
        engine.open(&config)?;
        info!("Recognition session open ({})", config.language);
        Ok(Self {
            engine,
            config,
            slot: ResultSlot::Detached,
        })
    }

    /// Returns false when a handler was already attached.
    pub fn attach_result_handler(&mut self) -> bool {
        if self.slot == ResultSlot::Attached {
            return false;
        }
        self.slot = ResultSlot::Attached;
        debug!("Result handler attached");
        true
    }

    /// Returns false when no handler was attached.
    pub fn detach_result_handler(&mut self) -> bool {
        if self.slot == ResultSlot::Detached {
            return false;
        }
        self.slot = ResultSlot::Detached;
        debug!("Result handler detached");
        true
    }

    pub fn accepts_results(&self) -> bool {
        self.slot == ResultSlot::Attached
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

impl<E: TranscriptionEngine> Drop for RecognitionSession<E> {
    fn drop(&mut self) {
        self.engine.close();
    }
}
