use crate::models::User;
use chrono::{DateTime, Utc};

/// Display name for an incident's assignee.
///
/// `None` renders as "Unassigned"; an id with no matching user as "Unknown".
pub fn assignee_name<'a>(users: &'a [User], assignee_id: Option<&str>) -> &'a str {
    let Some(id) = assignee_id else {
        return "Unassigned";
    };
    users
        .iter()
        .find(|u| u.id == id)
        .map(|u| u.name.as_str())
        .unwrap_or("Unknown")
}

/// Medium date + short time, e.g. "16 Oct 2026, 14:05" (UTC)
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.format("%-d %b %Y, %H:%M").to_string()
}
