//! CLI command definitions for the `bmo` binary.
//!
//! Uses clap derive macros. Deployment-time values (config path, bind
//! address, API key, primary model) can also come from the environment.

pub mod ask;
pub mod models;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secrecy::SecretString;

/// Campus guide robot backend.
#[derive(Parser)]
#[command(name = "bmo", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "BMO_CONFIG", default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// OpenRouter API key.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Override the primary model from the config file.
    #[arg(long, env = "BMO_PRIMARY_MODEL", global = true)]
    pub model: Option<String>,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// API key wrapped for the provider, or an error naming the variable.
    pub fn require_api_key(&self) -> anyhow::Result<SecretString> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(SecretString::from(key.to_string())),
            _ => anyhow::bail!(
                "OPENROUTER_API_KEY is not set. Export it or pass --api-key to talk to the model provider."
            ),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Address to bind.
        #[arg(long, env = "BMO_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on.
        #[arg(long, env = "BMO_PORT", default_value_t = 8000)]
        port: u16,
    },

    /// Run one wake and respond round in-process and print the reply.
    Ask {
        /// What the visitor said.
        transcript: String,

        /// Print the full reply as JSON, audio included.
        #[arg(long)]
        json: bool,

        /// Write the synthesized MP3 to this file.
        #[arg(long)]
        save_audio: Option<PathBuf>,
    },

    /// Print the resolved model candidate list.
    Models {
        /// Print as a JSON array.
        #[arg(long)]
        json: bool,
    },
}
