pub mod dispatcher;
pub mod observer;

pub use dispatcher::{normalize, BatchReport, Dispatcher};
pub use observer::{DispatchEvent, DispatchObserver, TracingObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Stopped,
    Listening,
}

/// Anything that can be told to start or stop listening.
pub trait ListenControl {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_listening(&self) -> bool;
}
