use crate::commands::{CommandHandler, CommandPattern, Extractor};
use crate::error::CommandError;
use shared::CommandSpec;
use std::process::Stdio;
use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{debug, info};

const ARG_PLACEHOLDER: &str = "{arg}";

/// A program launched when a command fires, e.g. `xdg-open` with a URL.
#[derive(Debug, Clone)]
pub struct ShellEffect {
    program: String,
    args: Vec<String>,
    parts: Option<Extractor>,
}

impl ShellEffect {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            parts: None,
        }
    }

    /// Uses `extractor` to fill the positional `{1}`, `{2}` placeholders.
    pub fn with_parts(mut self, extractor: Extractor) -> Self {
        self.parts = Some(extractor);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with `{arg}` replaced by the command argument (empty for
    /// exact commands) and `{N}` by its N-th part (empty when missing).
    pub fn render_args(&self, argument: Option<&str>) -> Vec<String> {
        let argument = argument.unwrap_or("");
        let parts = match &self.parts {
            Some(extractor) => extractor.parts(argument),
            None => vec![argument.to_string()],
        };

        self.args
            .iter()
            .map(|arg| render(arg, argument, &parts))
            .collect()
    }

    /// Spawns the program detached. The child is reaped on the tokio runtime
    /// and its exit status is only logged.
    pub fn run(&self, argument: Option<&str>) -> Result<(), CommandError> {
        let runtime =
            Handle::try_current().map_err(|_| CommandError::NoRuntime(self.program.clone()))?;

        let args = self.render_args(argument);
        info!("Running {} {:?}", self.program, args);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let program = self.program.clone();
        runtime.spawn(async move {
            match child.wait().await {
                Ok(status) => debug!("{} exited with {}", program, status),
                Err(e) => debug!("Failed to wait for {}: {}", program, e),
            }
        });

        Ok(())
    }

    pub fn into_handler(self) -> CommandHandler {
        Box::new(move |argument| self.run(argument).map_err(anyhow::Error::from))
    }
}

fn render(template: &str, argument: &str, parts: &[String]) -> String {
    let mut rendered = template.replace(ARG_PLACEHOLDER, argument);
    // Highest index first so "{12}" is not consumed by "{1}".
    for index in (1..=parts.len().max(2)).rev() {
        let placeholder = format!("{{{}}}", index);
        let part = parts.get(index - 1).map_or("", String::as_str);
        rendered = rendered.replace(&placeholder, part);
    }
    rendered
}

/// Builds the pattern and handler for a configured command.
pub fn build_command(spec: &CommandSpec) -> Result<(CommandPattern, CommandHandler), CommandError> {
    let pattern = CommandPattern::from_spec(spec).map_err(|source| CommandError::Pattern {
        phrase: spec.phrase.clone(),
        source,
    })?;

    let effect = effect_for(spec, &pattern)?;
    Ok((pattern, effect.into_handler()))
}

fn effect_for(spec: &CommandSpec, pattern: &CommandPattern) -> Result<ShellEffect, CommandError> {
    let (program, args) = spec
        .run
        .split_first()
        .filter(|(program, _)| !program.trim().is_empty())
        .ok_or_else(|| CommandError::EmptyRun(spec.phrase.clone()))?;

    let effect = ShellEffect::new(program.clone(), args.to_vec());
    Ok(match pattern {
        CommandPattern::Prefix { extractor, .. } => effect.with_parts(extractor.clone()),
        CommandPattern::Exact(_) => effect,
    })
}
