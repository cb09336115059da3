//! triage - operator console for the incident triage backend
//!
//! Drives the same dashboard view-model a UI would: every command loads the
//! collection first, then selects, creates or updates through it.

mod cli;
mod logger;
mod render;

use anyhow::{Context, bail};
use clap::Parser;
use cli::{Cli, Command, CreateArgs, ListArgs, UpdateArgs};
use shared::UpdateIncidentInput;
use triage_client::{Dashboard, NetworkHttpClient};

type Console = Dashboard<NetworkHttpClient>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file before clap reads env fallbacks
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logger::init_logger(&cli.log_level, cli.json_logs)?;

    let config = cli.client_config();
    tracing::debug!(base_url = %config.base_url, timeout = config.timeout, "Connecting");
    let dashboard = Dashboard::from_config(&config).context("invalid client configuration")?;

    dashboard
        .load_all()
        .await
        .context("failed to load incidents")?;

    match &cli.command {
        Command::List(args) => list(&dashboard, args, cli.json),
        Command::Show { id } => show(&dashboard, id, cli.json).await,
        Command::Create(args) => create(&dashboard, args, cli.json).await,
        Command::Update(args) => update(&dashboard, args, cli.json).await,
    }
}

fn list(dashboard: &Console, args: &ListArgs, json: bool) -> anyhow::Result<()> {
    dashboard.set_criteria(args.criteria());
    let view = dashboard.view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view.incidents)?);
    } else {
        print!("{}", render::queue(&view, &dashboard.users()));
    }
    Ok(())
}

async fn show(dashboard: &Console, id: &str, json: bool) -> anyhow::Result<()> {
    let Some(incident) = dashboard.select(Some(id)).await? else {
        bail!("selection of {id} was superseded");
    };
    print_incident(dashboard, &incident, json)
}

async fn create(dashboard: &Console, args: &CreateArgs, json: bool) -> anyhow::Result<()> {
    let input = match args.form().validate() {
        Ok(input) => input,
        Err(errors) => {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            bail!(messages.join(" "));
        }
    };

    let created = dashboard.create(&input).await?;
    tracing::info!(incident_id = %created.id, "Created");
    print_incident(dashboard, &created, json)
}

async fn update(dashboard: &Console, args: &UpdateArgs, json: bool) -> anyhow::Result<()> {
    let Some(current) = dashboard.select(Some(&args.id)).await? else {
        bail!("selection of {} was superseded", args.id);
    };

    let status = args.status.unwrap_or(current.status);
    let assignee = args.assignee_or(current.assignee_id.clone());
    let Some(patch) = UpdateIncidentInput::between(&current, status, assignee) else {
        eprintln!("Nothing to change");
        return print_incident(dashboard, &current, json);
    };

    let updated = dashboard.update(&args.id, &patch).await?;
    print_incident(dashboard, &updated, json)
}

fn print_incident(
    dashboard: &Console,
    incident: &shared::Incident,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(incident)?);
    } else {
        print!("{}", render::detail(incident, &dashboard.users()));
    }
    Ok(())
}
