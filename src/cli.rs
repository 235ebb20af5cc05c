//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use hosten_console::PermissionAction;
use hosten_console::core::models::{CommandPayload, ProcessCommand};
use std::path::PathBuf;

/// Hosten console - inspect teams, permissions and processes
#[derive(Parser, Debug)]
#[command(name = "hosten")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML configuration file; `HOSTEN_*` variables override it
    #[arg(short, long, global = true, env = "HOSTEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use the in-memory demo backend instead of the REST API
    #[arg(long, global = true)]
    pub mock: bool,

    /// Act as this user against the demo backend
    #[arg(long, global = true, requires = "mock", value_name = "USER_ID")]
    pub as_user: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the teams you belong to
    Teams,

    /// Select the active team
    Select {
        /// Team id
        #[arg(required_unless_present = "clear")]
        team_id: Option<String>,

        /// Forget the current selection
        #[arg(long, conflicts_with = "team_id")]
        clear: bool,
    },

    /// Show your role and permissions in the active team
    Whoami,

    /// Check a single permission, e.g. `process:start`
    Can {
        #[arg(value_parser = parse_action)]
        action: PermissionAction,
    },

    /// List servers
    Servers,

    /// List processes running on a server
    #[command(alias = "ps")]
    Processes {
        /// Server client id
        server: String,
    },

    /// Start a process
    Start(ProcessArgs),

    /// Stop a process
    Stop(ProcessArgs),

    /// Restart a process
    Restart(ProcessArgs),
}

impl Commands {
    /// The remote command behind start/stop/restart
    pub fn process_command(&self) -> Option<(ProcessCommand, &ProcessArgs)> {
        match self {
            Commands::Start(args) => Some((ProcessCommand::Pm2Start, args)),
            Commands::Stop(args) => Some((ProcessCommand::Pm2Stop, args)),
            Commands::Restart(args) => Some((ProcessCommand::Pm2Restart, args)),
            _ => None,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ProcessArgs {
    /// Server client id
    pub server: String,

    /// Application name
    pub app: String,

    /// Script to run, for apps not yet known to the supervisor
    #[arg(long, default_value = "")]
    pub script: String,

    /// Extra supervisor options
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    pub options: String,
}

impl ProcessArgs {
    pub fn payload(&self) -> CommandPayload {
        CommandPayload {
            app: self.app.clone(),
            options: self.options.clone(),
            script: self.script.clone(),
        }
    }
}

fn parse_action(s: &str) -> Result<PermissionAction, String> {
    s.parse::<PermissionAction>().map_err(|e| e.to_string())
}
