pub mod effect;

pub use effect::{build_command, ShellEffect};
