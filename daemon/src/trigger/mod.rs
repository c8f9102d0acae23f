pub mod binding;

pub use binding::{KeyCode, TriggerBinding, TriggerOutcome};
