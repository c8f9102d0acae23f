pub mod pattern;
pub mod registry;

pub use pattern::{CommandPattern, Extractor};
pub use registry::{Command, CommandHandler, CommandKind, CommandRegistry, Match, Resolved};
