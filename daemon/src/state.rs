//! Daemon state and its event loop.
//!
//! One task owns the dispatcher and the trigger. Socket connections send
//! requests to it over a channel, so every registry or listening change is
//! applied in arrival order on that single task.

use crate::config::Config;
use crate::dispatch::{Dispatcher, ListenControl};
use crate::output::build_command;
use crate::recognition::{EngineConfig, TranscriptionEngine};
use crate::trigger::{KeyCode, TriggerBinding, TriggerOutcome};
use anyhow::Context;
use shared::ipc::{Command, Response};
use shared::{BatchSummary, CommandSpec, StatusInfo};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

pub type Request = (Command, oneshot::Sender<Response>);

/// Handle used to talk to the event loop.
#[derive(Clone)]
pub struct StateHandle {
    tx: mpsc::Sender<Request>,
}

impl StateHandle {
    pub async fn send(&self, command: Command) -> anyhow::Result<Response> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((command, reply_tx))
            .await
            .map_err(|_| anyhow::anyhow!("Daemon event loop has stopped"))?;
        reply_rx
            .await
            .map_err(|_| anyhow::anyhow!("Daemon event loop dropped the request"))
    }
}

pub struct DaemonState<E: TranscriptionEngine> {
    dispatcher: Dispatcher<E>,
    trigger: TriggerBinding,
}

impl<E: TranscriptionEngine> DaemonState<E> {
    /// Opens the engine and binds every configured command.
    pub fn new(config: &Config, engine: E) -> anyhow::Result<Self> {
        let engine_config = EngineConfig::new(config.recognition.language.clone());
        let dispatcher = Dispatcher::new(engine, engine_config)?;
        Self::with_dispatcher(config, dispatcher)
    }

    pub fn with_dispatcher(config: &Config, dispatcher: Dispatcher<E>) -> anyhow::Result<Self> {
        let mut state = Self {
            dispatcher,
            trigger: TriggerBinding::new(config.trigger.key_code),
        };
        for spec in &config.commands {
            state
                .register(spec)
                .with_context(|| format!("Invalid command '{}' in config", spec.phrase))?;
        }
        info!(
            "Daemon state ready with {} command(s)",
            state.dispatcher.registry().len()
        );
        Ok(state)
    }

    pub fn dispatcher(&self) -> &Dispatcher<E> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<E> {
        &mut self.dispatcher
    }

    pub fn trigger(&self) -> &TriggerBinding {
        &self.trigger
    }

    fn register(&mut self, spec: &CommandSpec) -> anyhow::Result<()> {
        let (pattern, handler) = build_command(spec)?;
        self.dispatcher.register(pattern, handler);
        Ok(())
    }

    pub fn status(&self) -> StatusInfo {
        StatusInfo {
            is_running: true,
            is_listening: self.dispatcher.is_listening(),
            key_held: self.trigger.is_held(),
            language: self.dispatcher.session().config().language.clone(),
            commands: self.dispatcher.registry().len(),
        }
    }

    pub fn handle(&mut self, command: Command) -> Response {
        debug!("Handling {:?}", command);

        match command {
            Command::Start => {
                self.dispatcher.start();
                Response::Ok
            }
            Command::Stop => {
                self.dispatcher.stop();
                Response::Ok
            }
            Command::Status => Response::Status(self.status()),
            Command::KeyDown(code) => {
                let outcome = self.trigger.key_down(KeyCode(code), &mut self.dispatcher);
                debug!("Key down {}: {:?}", code, outcome);
                Response::Ok
            }
            Command::KeyUp(code) => {
                let outcome = self.trigger.key_up(KeyCode(code));
                if outcome == TriggerOutcome::Ignored {
                    debug!("Key up {} ignored", code);
                }
                Response::Ok
            }
            Command::Submit(batch) => {
                let report = self.dispatcher.handle_batch(&batch);
                Response::Report(BatchSummary::from(report))
            }
            Command::Register(spec) => match self.register(&spec) {
                Ok(()) => {
                    info!("Registered '{}' over IPC", spec.phrase);
                    Response::Ok
                }
                Err(e) => {
                    warn!("Rejected command '{}': {}", spec.phrase, e);
                    Response::Error(e.to_string())
                }
            },
            Command::Unregister(phrase) => {
                if !self.dispatcher.unregister(&phrase) {
                    debug!("'{}' was not registered", phrase);
                }
                Response::Ok
            }
            Command::List => Response::Commands(
                self.dispatcher
                    .registry()
                    .keys()
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }
}

impl<E: TranscriptionEngine + 'static> DaemonState<E> {
    /// Moves the state onto its own task and returns a handle to it.
    pub fn spawn(self, capacity: usize) -> (StateHandle, tokio::task::JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let task = tokio::spawn(self.run(rx));
        (StateHandle { tx }, task)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Request>) {
        info!("Event loop started");
        while let Some((command, reply)) = rx.recv().await {
            let response = self.handle(command);
            if reply.send(response).is_err() {
                debug!("Requester went away before the response");
            }
        }
        info!("Event loop stopped");
    }
}
