use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::infra::config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(name = "roomchat", about = "Terminal client for multi-room chat servers")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Server base url, overrides `server.base_url`
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Display name, overrides `session.username`
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start TUI shell
    Run,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            server_url: self.server.clone(),
            username: self.username.clone(),
        }
    }
}
