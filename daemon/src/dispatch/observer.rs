use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    /// Every listener of `key` was invoked once.
    Dispatched {
        key: String,
        argument: Option<String>,
        listeners: usize,
    },
    /// A final utterance resolved to no command.
    Unmatched { utterance: String },
    /// One listener of `key` returned an error or panicked.
    HandlerFailed { key: String, error: String },
}

pub trait DispatchObserver: Send {
    fn observe(&mut self, event: &DispatchEvent);
}

impl<F> DispatchObserver for F
where
    F: FnMut(&DispatchEvent) + Send,
{
    fn observe(&mut self, event: &DispatchEvent) {
        self(event)
    }
}

/// Default observer: every event becomes a log line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn observe(&mut self, event: &DispatchEvent) {
        match event {
            DispatchEvent::Dispatched {
                key,
                argument: Some(argument),
                listeners,
            } => info!("Dispatched '{}' ('{}') to {} listener(s)", key, argument, listeners),
            DispatchEvent::Dispatched {
                key,
                argument: None,
                listeners,
            } => info!("Dispatched '{}' to {} listener(s)", key, listeners),
            DispatchEvent::Unmatched { utterance } => {
                warn!("No command matches '{}'", utterance)
            }
            DispatchEvent::HandlerFailed { key, error } => {
                error!("Handler for '{}' failed: {}", key, error)
            }
        }
    }
}
