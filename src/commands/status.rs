use anyhow::Result;
use tracing::{info, warn};

use super::store::{open_existing_store, summarize_store};
use crate::cli::StatusArgs;
use crate::util::write_json_stdout;

pub fn run(args: StatusArgs) -> Result<()> {
    info!(db_path = %args.db_path.display(), "status requested");

    if !args.db_path.exists() {
        warn!(path = %args.db_path.display(), "database file missing");
        return Ok(());
    }

    let connection = open_existing_store(&args.db_path)?;
    let summary = summarize_store(&connection, &args.db_path)?;

    if args.json {
        return write_json_stdout(&summary);
    }

    info!(
        schema_version = %summary.db_schema_version.clone().unwrap_or_default(),
        updated_at = %summary.db_updated_at.clone().unwrap_or_default(),
        reports = summary.reports_total,
        sections = summary.sections_total,
        latest_report_at = %summary.latest_report_at.clone().unwrap_or_default(),
        "database status"
    );
    for (severity, count) in &summary.severity_counts {
        info!(severity = %severity, reports = *count, "severity distribution");
    }
    for (health, count) in &summary.health_counts {
        info!(health = %health, reports = *count, "health distribution");
    }

    Ok(())
}
