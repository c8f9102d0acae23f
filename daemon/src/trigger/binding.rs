//! Hold-to-talk trigger
//!
//! Pressing the trigger key starts listening. Auto-repeat key-down events
//! while the key is held are ignored. Releasing the key only re-arms the
//! trigger: listening ends when the dispatcher processes a batch.

use crate::dispatch::ListenControl;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const V: KeyCode = KeyCode(86);

    /// Key code of an ASCII letter or digit, as reported by key-down events.
    pub fn from_char(c: char) -> Option<KeyCode> {
        c.is_ascii_alphanumeric()
            .then(|| KeyCode(c.to_ascii_uppercase() as u32))
    }
}

impl Default for KeyCode {
    fn default() -> Self {
        KeyCode::V
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match char::from_u32(self.0).filter(char::is_ascii_alphanumeric) {
            Some(c) => write!(f, "{} ({})", c, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Key went down and `start()` was issued.
    Armed,
    /// Key-down while already held, nothing issued.
    Repeat,
    /// Key went up, trigger re-armed.
    Released,
    /// Not the trigger key, or a release without a press.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct TriggerBinding {
    key: KeyCode,
    held: bool,
}

impl TriggerBinding {
    pub fn new(key: KeyCode) -> Self {
        info!("Hold-to-talk key: {}", key);
        Self { key, held: false }
    }

    pub fn key(&self) -> KeyCode {
        self.key
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn key_down(&mut self, key: KeyCode, control: &mut impl ListenControl) -> TriggerOutcome {
        if key != self.key {
            return TriggerOutcome::Ignored;
        }
        if self.held {
            return TriggerOutcome::Repeat;
        }

        self.held = true;
        debug!("Trigger pressed");
        control.start();
        TriggerOutcome::Armed
    }

    pub fn key_up(&mut self, key: KeyCode) -> TriggerOutcome {
        if key != self.key || !self.held {
            return TriggerOutcome::Ignored;
        }

        self.held = false;
        debug!("Trigger released");
        TriggerOutcome::Released
    }
}

impl Default for TriggerBinding {
    fn default() -> Self {
        Self::new(KeyCode::default())
    }
}
