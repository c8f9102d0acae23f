mod client;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::DaemonClient;
use shared::ipc::{Command, CommandSpec, ExtractSpec, MatchKind, Response};
use shared::{ResultBatch, TranscriptResult};
use std::path::PathBuf;

/// Key code the daemon binds to hold-to-talk by default (V).
const DEFAULT_KEY_CODE: u32 = 86;

#[derive(Parser)]
#[command(name = "voix")]
#[command(about = "CLI tool for the voixd voice command daemon")]
struct Cli {
    /// Socket path of a running voixd
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start listening
    Start,
    /// Stop listening
    Stop,
    Status,
    /// Press the trigger key
    Press {
        #[arg(long, default_value_t = DEFAULT_KEY_CODE)]
        key: u32,
    },
    /// Release the trigger key
    Release {
        #[arg(long, default_value_t = DEFAULT_KEY_CODE)]
        key: u32,
    },
    /// List registered command keys
    List,
    /// Deliver a transcript to the dispatcher as if it had been recognized
    Say {
        text: String,
        /// Mark the result as interim instead of final
        #[arg(long)]
        interim: bool,
    },
    /// Bind a phrase to a program
    Register {
        phrase: String,
        /// Match the phrase as a prefix and pass the rest as {arg}
        #[arg(long)]
        prefix: bool,
        /// Only pass the text before this separator as {arg}
        #[arg(long, requires = "prefix", conflicts_with_all = ["after", "split"])]
        before: Option<String>,
        /// Only pass the text after this separator as {arg}
        #[arg(long, requires = "prefix", conflicts_with = "split")]
        after: Option<String>,
        /// Pass the text before and after this separator as {1} and {2}
        #[arg(long, requires = "prefix")]
        split: Option<String>,
        #[arg(required = true, trailing_var_arg = true)]
        run: Vec<String>,
    },
    Unregister {
        phrase: String,
    },
}

fn register_spec(
    phrase: String,
    prefix: bool,
    before: Option<String>,
    after: Option<String>,
    split: Option<String>,
    run: Vec<String>,
) -> CommandSpec {
    let extract = match (before, after, split) {
        (Some(sep), _, _) => Some(ExtractSpec::Before(sep)),
        (None, Some(sep), _) => Some(ExtractSpec::After(sep)),
        (None, None, Some(sep)) => Some(ExtractSpec::Split(sep)),
        (None, None, None) => None,
    };
    CommandSpec {
        phrase,
        kind: if prefix { MatchKind::Prefix } else { MatchKind::Exact },
        extract,
        run,
    }
}

fn to_command(command: Commands) -> Command {
    match command {
        Commands::Start => Command::Start,
        Commands::Stop => Command::Stop,
        Commands::Status => Command::Status,
        Commands::Press { key } => Command::KeyDown(key),
        Commands::Release { key } => Command::KeyUp(key),
        Commands::List => Command::List,
        Commands::Say { text, interim } => {
            let result = if interim {
                TranscriptResult::interim_text(text)
            } else {
                TranscriptResult::final_text(text)
            };
            Command::Submit(ResultBatch::new(0, vec![result]))
        }
        Commands::Register {
            phrase,
            prefix,
            before,
            after,
            split,
            run,
        } => Command::Register(register_spec(phrase, prefix, before, after, split, run)),
        Commands::Unregister { phrase } => Command::Unregister(phrase),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new(cli.socket);

    match client.send_command(to_command(cli.command)).await {
        Ok(Response::Ok) => {
            println!("Success");
        }
        Ok(Response::Status(info)) => {
            println!("Status:");
            println!("  Running: {}", info.is_running);
            println!("  Listening: {}", info.is_listening);
            println!("  Key held: {}", info.key_held);
            println!("  Language: {}", info.language);
            println!("  Commands: {}", info.commands);
        }
        Ok(Response::Report(summary)) => {
            if !summary.accepted {
                println!("Batch ignored: no result handler attached");
            }
            for key in &summary.dispatched {
                println!("Dispatched: {}", key);
            }
            for utterance in &summary.unmatched {
                println!("Unmatched: {}", utterance);
            }
            for failure in &summary.failed {
                eprintln!("Handler for '{}' failed: {}", failure.key, failure.error);
            }
        }
        Ok(Response::Commands(keys)) => {
            for key in keys {
                println!("{}", key);
            }
        }
        Ok(Response::Error(msg)) => {
            eprintln!("Error: {}", msg);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to reach voixd: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
