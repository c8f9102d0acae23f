//! Command registry: normalized key to listener fan-out.
//!
//! Keys arrive already normalized; the registry compares them byte for byte.
//! Resolution tries exact commands first, then prefix commands in the order
//! they were first registered, so "open tab" and "open tab in new window"
//! resolve deterministically.

use super::pattern::{strip_word_prefix, CommandPattern, Extractor};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// A bound action. Exact commands receive `None`, prefix commands receive
/// the extracted argument (possibly empty).
pub type CommandHandler = Box<dyn FnMut(Option<&str>) -> anyhow::Result<()> + Send>;

#[derive(Debug, Clone)]
pub enum CommandKind {
    Exact,
    Prefix(Extractor),
}

pub struct Command {
    key: String,
    kind: CommandKind,
    listeners: Vec<CommandHandler>,
}

impl Command {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn listeners_mut(&mut self) -> impl Iterator<Item = &mut CommandHandler> {
        self.listeners.iter_mut()
    }

    fn argument_for(&self, utterance: &str) -> Option<Option<String>> {
        match &self.kind {
            CommandKind::Exact => (utterance == self.key).then_some(None),
            CommandKind::Prefix(extractor) => strip_word_prefix(&self.key, utterance)
                .map(|rest| Some(extractor.extract(rest))),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Which command an utterance resolves to, without borrowing its listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub key: String,
    pub argument: Option<String>,
}

pub struct Resolved<'a> {
    pub command: &'a mut Command,
    pub argument: Option<String>,
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
    order: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the command for `pattern`, creating it if needed.
    ///
    /// The first registration fixes the command shape; a later registration
    /// under the same key with another shape still appends its listener.
    pub fn register(&mut self, pattern: CommandPattern, handler: CommandHandler) {
        let (key, kind) = match pattern {
            CommandPattern::Exact(key) => (key, CommandKind::Exact),
            CommandPattern::Prefix { prefix, extractor } => (prefix, CommandKind::Prefix(extractor)),
        };

        match self.commands.get_mut(&key) {
            Some(command) => {
                if !same_kind(&command.kind, &kind) {
                    warn!(
                        "Command '{}' already registered as {:?}, keeping that shape",
                        key, command.kind
                    );
                }
                command.listeners.push(handler);
                debug!(
                    "Appended listener to '{}' ({} listeners)",
                    key,
                    command.listeners.len()
                );
            }
            None => {
                debug!("Registered command '{}' as {:?}", key, kind);
                self.order.push(key.clone());
                self.commands.insert(
                    key.clone(),
                    Command {
                        key,
                        kind,
                        listeners: vec![handler],
                    },
                );
            }
        }
    }

    /// Removes the command and all of its listeners. Returns whether it existed.
    pub fn unregister(&mut self, key: &str) -> bool {
        if self.commands.remove(key).is_none() {
            debug!("Unregister of unknown command '{}' ignored", key);
            return false;
        }
        self.order.retain(|k| k != key);
        debug!("Unregistered command '{}'", key);
        true
    }

    pub fn lookup(&self, utterance: &str) -> Option<Match> {
        if let Some(command) = self.commands.get(utterance) {
            if matches!(command.kind, CommandKind::Exact) {
                return Some(Match {
                    key: command.key.clone(),
                    argument: None,
                });
            }
        }

        self.order
            .iter()
            .filter_map(|key| self.commands.get(key))
            .filter(|command| matches!(command.kind, CommandKind::Prefix(_)))
            .find_map(|command| {
                command.argument_for(utterance).map(|argument| Match {
                    key: command.key.clone(),
                    argument,
                })
            })
    }

    pub fn resolve(&mut self, utterance: &str) -> Option<Resolved<'_>> {
        let Match { key, argument } = self.lookup(utterance)?;
        let command = self.commands.get_mut(&key)?;
        Some(Resolved { command, argument })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.commands.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Command> {
        self.commands.get(key)
    }

    /// Keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn same_kind(a: &CommandKind, b: &CommandKind) -> bool {
    match (a, b) {
        (CommandKind::Exact, CommandKind::Exact) => true,
        (CommandKind::Prefix(x), CommandKind::Prefix(y)) => x.same_shape(y),
        _ => false,
    }
}
