pub mod agenda;
pub mod config;
pub mod plan;
pub mod project;

use agenda_core::{AgendaBlock, Config, Project};
use chrono::{DateTime, NaiveDate, Utc};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// The `--user` flag, or the configured default owner.
pub fn resolve_user(user: Option<String>, config: &Config) -> String {
    user.filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| config.user_id.clone())
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("invalid date '{input}' (expected RFC 3339 or YYYY-MM-DD)"))
}

/// One line per block: time range, then project title (or id if unknown).
pub fn format_agenda(blocks: &[AgendaBlock], projects: &[Project]) -> String {
    let mut out = String::new();
    for block in blocks {
        let title = projects
            .iter()
            .find(|p| p.id == block.project_id)
            .map(|p| p.title.as_str())
            .unwrap_or(block.project_id.as_str());
        out.push_str(&format!(
            "{} - {}  {}\n",
            block.start.format("%Y-%m-%d %H:%M"),
            block.end.format("%H:%M"),
            title
        ));
    }
    out
}
