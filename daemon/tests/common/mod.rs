// Shared fixtures for voixd integration tests
//
// - ScriptedEngine: a transcription engine that opens (or fails) on demand
// - Calls: records handler invocations in order
// - batch helpers for building result batches

#![allow(dead_code)]

use shared::{ResultBatch, TranscriptResult};
use std::sync::{Arc, Mutex};
use voixd::{CommandHandler, Dispatcher, EngineConfig, EngineError, TranscriptionEngine};

#[derive(Debug, Default)]
pub struct ScriptedEngine {
    pub fail_with: Option<String>,
    pub opened_with: Option<EngineConfig>,
}

impl ScriptedEngine {
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            opened_with: None,
        }
    }
}

impl TranscriptionEngine for ScriptedEngine {
    fn open(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        if let Some(reason) = &self.fail_with {
            return Err(EngineError::Unavailable(reason.clone()));
        }
        self.opened_with = Some(config.clone());
        Ok(())
    }
}

pub fn dispatcher() -> Dispatcher<ScriptedEngine> {
    Dispatcher::new(ScriptedEngine::default(), EngineConfig::default())
        .expect("scripted engine opens")
}

/// Ordered log of handler invocations.
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<(String, Option<String>)>>>);

impl Calls {
    pub fn handler(&self, name: &str) -> CommandHandler {
        let calls = self.clone();
        let name = name.to_string();
        Box::new(move |argument| {
            calls
                .0
                .lock()
                .unwrap()
                .push((name.clone(), argument.map(str::to_string)));
            Ok(())
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn all(&self) -> Vec<(String, Option<String>)> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

pub fn final_batch(texts: &[&str]) -> ResultBatch {
    ResultBatch::new(
        0,
        texts.iter().map(|t| TranscriptResult::final_text(*t)).collect(),
    )
}
