use super::*;

pub fn open_store(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }

    let connection = Connection::open(path)
        .with_context(|| format!("failed to open database: {}", path.display()))?;
    configure_connection(&connection)?;
    ensure_schema(&connection)?;
    Ok(connection)
}

/// Opens a store without creating it or touching its schema.
pub fn open_existing_store(path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open database: {}", path.display()))
}

pub fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reports (
              report_id TEXT PRIMARY KEY,
              evaluation_date TEXT NOT NULL,
              contract_type TEXT NOT NULL,
              year INTEGER NOT NULL,
              context TEXT NOT NULL,
              approved_budget REAL NOT NULL,
              executed_value REAL NOT NULL,
              planned_end_date TEXT,
              physical_progress_pct REAL NOT NULL,
              days_remaining INTEGER NOT NULL,
              composite_risk REAL NOT NULL,
              confidence REAL NOT NULL,
              engine_severity TEXT NOT NULL,
              severity TEXT NOT NULL,
              raw_record TEXT NOT NULL,
              report_json TEXT NOT NULL,
              created_at TEXT NOT NULL,
              updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS report_sections (
              report_id TEXT NOT NULL,
              position INTEGER NOT NULL,
              title TEXT NOT NULL,
              block_name TEXT NOT NULL,
              severity TEXT NOT NULL,
              message TEXT NOT NULL,
              data_json TEXT NOT NULL,
              PRIMARY KEY(report_id, position),
              FOREIGN KEY(report_id) REFERENCES reports(report_id)
            );

            CREATE TABLE IF NOT EXISTS report_analytics (
              report_id TEXT PRIMARY KEY,
              budget_efficiency REAL NOT NULL,
              time_performance REAL NOT NULL,
              risk_score REAL NOT NULL,
              budget_trend TEXT NOT NULL,
              timeline_trend TEXT NOT NULL,
              overall_health TEXT NOT NULL,
              FOREIGN KEY(report_id) REFERENCES reports(report_id)
            );

            CREATE INDEX IF NOT EXISTS idx_reports_severity ON reports(severity);
            CREATE INDEX IF NOT EXISTS idx_reports_evaluation_date ON reports(evaluation_date);
            CREATE INDEX IF NOT EXISTS idx_report_analytics_health ON report_analytics(overall_health);
            ",
        )
        .context("failed to initialize report schema")?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('engine_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [env!("CARGO_PKG_VERSION")],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}
