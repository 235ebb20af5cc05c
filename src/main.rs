//! Hosten console CLI
//!
//! Resolves the active team and the permissions you hold in it, and gates
//! process commands on them before they reach the backend.

mod cli;

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use cli::{Cli, Commands};
use hosten_console::auth::permission::PERMISSION_GROUPS;
use hosten_console::auth::rbac::check_permission;
use hosten_console::core::models::{CommandRequest, ProcessCommand};
use hosten_console::utils::logging::init_logging;
use hosten_console::{
    AlertBus, AlertReceiver, ApiClient, Config, FileSelectionStore, MockTeamBackend,
    PermissionAction, SelectionOutcome, TeamContext, TeamService,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let env = Config::from_env().context("invalid HOSTEN_* environment")?;
    match path {
        Some(path) => {
            let file = Config::from_file(path)
                .await
                .with_context(|| format!("failed to load {}", path.display()))?;
            Ok(file.merge(env))
        }
        None => Ok(env),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref()).await?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    init_logging(&config.logging)?;

    let alerts = AlertBus::new();
    let mut alert_rx = alerts.subscribe();
    let store = Arc::new(FileSelectionStore::new(&config.storage.state_file));

    let (service, client): (Arc<dyn TeamService>, Option<Arc<ApiClient>>) = if cli.mock {
        let mut backend = MockTeamBackend::new();
        if let Some(user) = &cli.as_user {
            backend = backend.as_user(user);
        }
        debug!("Using demo backend as {}", backend.current_user_id());
        (Arc::new(backend) as Arc<dyn TeamService>, None)
    } else {
        let client = Arc::new(ApiClient::new(config.client_config()?)?);
        (client.clone() as Arc<dyn TeamService>, Some(client))
    };

    let context = TeamContext::new(service, store, alerts);
    let result = dispatch(&cli.command, &context, client.as_deref()).await;

    print_alerts(&mut alert_rx);
    result
}

async fn dispatch(
    command: &Commands,
    context: &TeamContext,
    client: Option<&ApiClient>,
) -> anyhow::Result<()> {
    if let Commands::Select { team_id, .. } = command {
        let outcome = context.select_team(team_id.as_deref()).await;
        ensure_loaded(&outcome)?;
        match context.current_team() {
            Some(team) => println!("Selected {} ({})", team.name, team.id),
            None => println!("No team selected"),
        }
        return Ok(());
    }

    ensure_loaded(&context.initialize().await)?;

    match command {
        Commands::Teams => {
            let selected = context.selected_team_id();
            let teams = context.teams();
            if teams.is_empty() {
                println!("You are not a member of any team");
            }
            for team in teams {
                let marker = if selected.as_deref() == Some(team.id.as_str()) {
                    '*'
                } else {
                    ' '
                };
                println!(
                    "{} {:<12} {:<24} {} members",
                    marker,
                    team.id,
                    team.name,
                    team.member_count.unwrap_or_default()
                );
            }
        }
        Commands::Whoami => whoami(context),
        Commands::Can { action } => {
            let check = check_permission(&context.permissions(), *action);
            if let Some(reason) = check.denial_reason {
                bail!(reason);
            }
            println!("allowed: {}", action);
        }
        Commands::Servers => {
            context.require(PermissionAction::ServerView)?;
            let servers = require_client(client)?.list_servers().await?.servers;
            for server in servers {
                println!(
                    "{:<24} {:<20} {:<12} {}",
                    server.client_id,
                    server.name,
                    format!("{:?}", server.environment).to_lowercase(),
                    if server.connected { "connected" } else { "offline" }
                );
            }
        }
        Commands::Processes { server } => {
            context.require(ProcessCommand::Pm2List.required_permission())?;
            let info = require_client(client)?.list_processes(server).await?;
            for process in &info.result {
                println!(
                    "{:>3} {:<24} {:<8} restarts={} cpu={:.1}% mem={}MB",
                    process.pm_id,
                    process.name,
                    format!("{:?}", process.status).to_lowercase(),
                    process.restarts,
                    process.cpu,
                    process.memory / (1024 * 1024)
                );
            }
        }
        Commands::Start(_) | Commands::Stop(_) | Commands::Restart(_) => {
            let (kind, args) = command
                .process_command()
                .ok_or_else(|| anyhow!("not a process command"))?;
            context.require(kind.required_permission())?;

            let request = CommandRequest {
                command: kind,
                client_id: args.server.clone(),
                payload: Some(args.payload()),
            };
            let info = require_client(client)?.send_command(&request).await?;
            println!("{} {}: {}", kind, args.app, info.status);
        }
        Commands::Select { .. } => {}
    }

    Ok(())
}

fn whoami(context: &TeamContext) {
    let Some(team) = context.current_team() else {
        println!("No team selected");
        return;
    };
    let Some(role) = context.current_role() else {
        println!("{} ({}): permissions not loaded", team.name, team.id);
        return;
    };

    println!("{} ({})", team.name, team.id);
    println!("Role: {} - {}", role.label(), role.description());

    let granted = context.permissions();
    for group in PERMISSION_GROUPS.iter() {
        println!();
        println!("{}", group.label);
        for info in group.permissions {
            let mark = if granted.contains(&info.action) { 'x' } else { ' ' };
            println!("  [{}] {:<20} {}", mark, info.label, info.action);
        }
    }
}

fn ensure_loaded(outcome: &SelectionOutcome) -> anyhow::Result<()> {
    match outcome {
        SelectionOutcome::Failed(e) => {
            Err(anyhow::Error::new(e.clone()).context("failed to load team"))
        }
        _ => Ok(()),
    }
}

fn require_client(client: Option<&ApiClient>) -> anyhow::Result<&ApiClient> {
    client.ok_or_else(|| anyhow!("this command needs the REST backend; drop --mock"))
}

fn print_alerts(rx: &mut AlertReceiver) {
    while let Ok(alert) = rx.try_recv() {
        debug!("Alert {} delivered", alert.id);
        eprintln!("{} {}", alert.title, alert.message);
    }
}
