//! Plain-text rendering of the queue and the detail panel

use shared::util::{assignee_name, format_timestamp};
use shared::{Incident, User};
use std::fmt::Write;
use triage_client::QueueView;

pub fn queue(view: &QueueView, users: &[User]) -> String {
    let mut out = String::new();
    for incident in &view.incidents {
        let _ = writeln!(
            out,
            "{:<12} {:<9} {:<12} {:<18} {}",
            incident.id,
            incident.severity.as_str(),
            incident.status.as_str(),
            assignee_name(users, incident.assignee_id.as_deref()),
            incident.title,
        );
    }
    let _ = writeln!(out, "Showing {} of {} incidents", view.shown(), view.total);
    out
}

pub fn detail(incident: &Incident, users: &[User]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", incident.title, incident.id);
    let _ = writeln!(out, "  Severity: {}", incident.severity);
    let _ = writeln!(out, "  Status:   {}", incident.status);
    let _ = writeln!(
        out,
        "  Assignee: {}",
        assignee_name(users, incident.assignee_id.as_deref())
    );
    let _ = writeln!(out, "  Created:  {}", format_timestamp(&incident.created_at));
    let _ = writeln!(out, "  Updated:  {}", format_timestamp(&incident.updated_at));
    if !incident.description.is_empty() {
        let _ = writeln!(out, "\n  {}", incident.description);
    }
    if !incident.status_history.is_empty() {
        let _ = writeln!(out, "\n  History:");
        for change in &incident.status_history {
            let _ = writeln!(
                out,
                "    {}  {:<12} {}",
                format_timestamp(&change.changed_at),
                change.status.as_str(),
                assignee_name(users, Some(&change.changed_by)),
            );
        }
    }
    out
}
