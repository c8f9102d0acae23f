//! Turns result batches into command invocations.
//!
//! A batch is processed only while listening. Processing stops listening
//! first, so a handler that asks to listen again affects later batches only.

use super::observer::{DispatchEvent, DispatchObserver, TracingObserver};
use super::{ListenControl, SessionState};
use crate::commands::{CommandHandler, CommandPattern, CommandRegistry};
use crate::error::SessionError;
use crate::recognition::{EngineConfig, RecognitionSession, TranscriptionEngine};
use shared::{BatchSummary, HandlerFailure, ResultBatch};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, trace};

/// The one normalization applied to utterances and command keys alike.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// False when the batch arrived while stopped and was dropped.
    pub accepted: bool,
    pub events: Vec<DispatchEvent>,
}

impl BatchReport {
    fn dropped() -> Self {
        Self::default()
    }

    pub fn dispatched(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DispatchEvent::Dispatched { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn unmatched(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DispatchEvent::Unmatched { utterance } => Some(utterance.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                DispatchEvent::HandlerFailed { key, error } => Some((key.as_str(), error.as_str())),
                _ => None,
            })
            .collect()
    }
}

impl From<BatchReport> for BatchSummary {
    fn from(report: BatchReport) -> Self {
        let mut summary = BatchSummary {
            accepted: report.accepted,
            ..Default::default()
        };
        for event in report.events {
            match event {
                DispatchEvent::Dispatched { key, .. } => summary.dispatched.push(key),
                DispatchEvent::Unmatched { utterance } => summary.unmatched.push(utterance),
                DispatchEvent::HandlerFailed { key, error } => {
                    summary.failed.push(HandlerFailure { key, error })
                }
            }
        }
        summary
    }
}

pub struct Dispatcher<E: TranscriptionEngine> {
    registry: CommandRegistry,
    session: RecognitionSession<E>,
    observer: Box<dyn DispatchObserver>,
}

impl<E: TranscriptionEngine> Dispatcher<E> {
    pub fn new(engine: E, config: EngineConfig) -> Result<Self, SessionError> {
        Ok(Self {
            registry: CommandRegistry::new(),
            session: RecognitionSession::open(engine, config)?,
            observer: Box::new(TracingObserver),
        })
    }

    pub fn with_observer(mut self, observer: impl DispatchObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn register(&mut self, pattern: CommandPattern, handler: CommandHandler) {
        self.registry.register(pattern.rekey(normalize), handler);
    }

    pub fn unregister(&mut self, pattern: &str) -> bool {
        self.registry.unregister(&normalize(pattern))
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn session(&self) -> &RecognitionSession<E> {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        if self.session.accepts_results() {
            SessionState::Listening
        } else {
            SessionState::Stopped
        }
    }

    pub fn start(&mut self) {
        if self.session.attach_result_handler() {
            info!("Listening for commands");
        }
    }

    pub fn stop(&mut self) {
        if self.session.detach_result_handler() {
            info!("Stopped listening");
        }
    }

    pub fn handle_batch(&mut self, batch: &ResultBatch) -> BatchReport {
        if !self.session.accepts_results() {
            debug!(
                "Dropping batch of {} result(s) while stopped",
                batch.results.len()
            );
            return BatchReport::dropped();
        }

        self.stop();

        let mut report = BatchReport {
            accepted: true,
            events: Vec::new(),
        };

        for (index, result) in batch.pending() {
            if !result.is_final {
                trace!("Skipping interim result {}", index);
                continue;
            }
            let Some(best) = result.best() else {
                debug!("Final result {} has no alternatives", index);
                continue;
            };

            let utterance = normalize(&best.transcript);
            debug!("Result {}: '{}'", index, utterance);

            for event in self.dispatch(&utterance) {
                self.observer.observe(&event);
                report.events.push(event);
            }
        }

        report
    }

    fn dispatch(&mut self, utterance: &str) -> Vec<DispatchEvent> {
        let Some(resolved) = self.registry.resolve(utterance) else {
            return vec![DispatchEvent::Unmatched {
                utterance: utterance.to_string(),
            }];
        };

        let key = resolved.command.key().to_string();
        let argument = resolved.argument;
        let mut events = vec![DispatchEvent::Dispatched {
            key: key.clone(),
            argument: argument.clone(),
            listeners: resolved.command.listener_count(),
        }];

        for listener in resolved.command.listeners_mut() {
            if let Err(error) = invoke(listener, argument.as_deref()) {
                events.push(DispatchEvent::HandlerFailed {
                    key: key.clone(),
                    error,
                });
            }
        }

        events
    }
}

impl<E: TranscriptionEngine> ListenControl for Dispatcher<E> {
    fn start(&mut self) {
        Dispatcher::start(self)
    }

    fn stop(&mut self) {
        Dispatcher::stop(self)
    }

    fn is_listening(&self) -> bool {
        self.state() == SessionState::Listening
    }
}

fn invoke(listener: &mut CommandHandler, argument: Option<&str>) -> Result<(), String> {
    match panic::catch_unwind(AssertUnwindSafe(|| (*listener)(argument))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(payload) => Err(format!("panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
