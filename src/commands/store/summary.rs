use super::*;

pub fn summarize_store(connection: &Connection, db_path: &Path) -> Result<StoreSummary> {
    Ok(StoreSummary {
        db_path: db_path.display().to_string(),
        db_schema_version: metadata_value(connection, "db_schema_version")?,
        db_updated_at: metadata_value(connection, "db_updated_at")?,
        reports_total: count_rows(connection, "SELECT COUNT(*) FROM reports")?,
        sections_total: count_rows(connection, "SELECT COUNT(*) FROM report_sections")?,
        latest_report_at: connection
            .query_row("SELECT MAX(updated_at) FROM reports", [], |row| row.get(0))
            .context("failed to read latest report timestamp")?,
        severity_counts: grouped_counts(
            connection,
            "SELECT severity, COUNT(*) FROM reports GROUP BY severity",
        )?,
        health_counts: grouped_counts(
            connection,
            "SELECT overall_health, COUNT(*) FROM report_analytics GROUP BY overall_health",
        )?,
    })
}

fn metadata_value(connection: &Connection, key: &str) -> Result<Option<String>> {
    connection
        .query_row("SELECT value FROM metadata WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()
        .with_context(|| format!("failed to read metadata key {key}"))
}

fn count_rows(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}

fn grouped_counts(connection: &Connection, sql: &str) -> Result<BTreeMap<String, i64>> {
    let mut statement = connection.prepare(sql)?;
    let rows = statement.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

    let mut counts = BTreeMap::new();
    for row in rows {
        let (label, count): (String, i64) = row?;
        counts.insert(label, count);
    }
    Ok(counts)
}
