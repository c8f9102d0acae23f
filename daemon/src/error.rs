use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unsupported language tag '{0}'")]
    UnsupportedLanguage(String),

    #[error("Transcription engine unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to start transcription engine: {0}")]
    EngineStart(#[from] EngineError),
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid argument pattern for '{phrase}': {source}")]
    Pattern {
        phrase: String,
        #[source]
        source: regex::Error,
    },

    #[error("Command '{0}' has nothing to run")]
    EmptyRun(String),

    #[error("Cannot run '{0}' outside the tokio runtime")]
    NoRuntime(String),

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
