//! Command-line interface

use clap::{Args, Parser, Subcommand};
use shared::{CreateIncidentForm, IncidentStatus, Severity};
use triage_client::{AssigneeFilter, ClientConfig, SortKey, ViewCriteria};

#[derive(Debug, Parser)]
#[command(name = "triage", version, about = "Incident triage console")]
pub struct Cli {
    /// API base URL
    #[arg(long, global = true, env = "TRIAGE_API_URL")]
    pub api_url: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    pub json_logs: bool,

    /// Print records as JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Environment configuration with command-line overrides applied
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        config
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the incident queue
    List(ListArgs),
    /// Show one incident with its status history
    Show {
        id: String,
    },
    /// Create an incident
    Create(CreateArgs),
    /// Change the status and/or assignee of an incident
    Update(UpdateArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive title substring
    #[arg(long, default_value = "")]
    pub search: String,

    #[arg(long)]
    pub status: Option<IncidentStatus>,

    #[arg(long)]
    pub severity: Option<Severity>,

    /// User id, or "unassigned"
    #[arg(long, default_value = "any")]
    pub assignee: AssigneeFilter,

    /// created-desc, created-asc, severity-desc or status
    #[arg(long, default_value = "created-desc")]
    pub sort: SortKey,
}

impl ListArgs {
    pub fn criteria(&self) -> ViewCriteria {
        ViewCriteria::new()
            .with_search(self.search.clone())
            .with_status(self.status)
            .with_severity(self.severity)
            .with_assignee(self.assignee.clone())
            .with_sort(self.sort)
    }
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub severity: Option<Severity>,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Assignee user id
    #[arg(long, default_value = "")]
    pub assignee: String,
}

impl CreateArgs {
    pub fn form(&self) -> CreateIncidentForm {
        CreateIncidentForm {
            title: self.title.clone(),
            description: self.description.clone(),
            severity: self.severity,
            assignee_id: self.assignee.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub id: String,

    #[arg(long)]
    pub status: Option<IncidentStatus>,

    /// Assign to this user id
    #[arg(long, conflicts_with = "unassign")]
    pub assignee: Option<String>,

    /// Clear the assignee
    #[arg(long, default_value_t = false)]
    pub unassign: bool,
}

impl UpdateArgs {
    /// Requested assignee, falling back to `current` when not given
    pub fn assignee_or(&self, current: Option<String>) -> Option<String> {
        if self.unassign {
            None
        } else {
            self.assignee.clone().or(current)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("triage").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_defaults() {
        let Command::List(args) = parse(&["list"]).command else {
            panic!("expected list");
        };
        assert_eq!(args.criteria(), ViewCriteria::default());
    }

    #[test]
    fn test_list_filters() {
        let cli = parse(&[
            "list",
            "--status",
            "in-progress",
            "--severity",
            "critical",
            "--assignee",
            "unassigned",
            "--sort",
            "severity-desc",
        ]);
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        let criteria = args.criteria();
        assert_eq!(criteria.status, Some(IncidentStatus::InProgress));
        assert_eq!(criteria.severity, Some(Severity::Critical));
        assert_eq!(criteria.assignee, AssigneeFilter::Unassigned);
        assert_eq!(criteria.sort, SortKey::SeverityDesc);
    }

    #[test]
    fn test_unknown_sort_is_rejected() {
        assert!(Cli::try_parse_from(["triage", "list", "--sort", "priority"]).is_err());
    }

    #[test]
    fn test_create_form_carries_raw_input() {
        let Command::Create(args) = parse(&["create", "--title", " Disk full "]).command else {
            panic!("expected create");
        };
        let form = args.form();
        assert_eq!(form.severity, None);
        assert_eq!(form.validate().unwrap_err().len(), 1);
    }

    #[test]
    fn test_update_assignee_resolution() {
        let Command::Update(args) = parse(&["update", "inc-1", "--unassign"]).command else {
            panic!("expected update");
        };
        assert_eq!(args.assignee_or(Some("u-1".into())), None);

        let Command::Update(args) = parse(&["update", "inc-1", "--status", "resolved"]).command
        else {
            panic!("expected update");
        };
        assert_eq!(args.status, Some(IncidentStatus::Resolved));
        assert_eq!(args.assignee_or(Some("u-1".into())).as_deref(), Some("u-1"));
    }

    #[test]
    fn test_assignee_conflicts_with_unassign() {
        assert!(
            Cli::try_parse_from(["triage", "update", "x", "--assignee", "u-1", "--unassign"])
                .is_err()
        );
    }
}
