use super::*;

/// Upserts one analysis and returns its report id (the record fingerprint for
/// the evaluation date). Sections are replaced wholesale on re-analysis.
pub fn persist_analysis(
    connection: &mut Connection,
    record: &ContractRecord,
    analysis: &ContractAnalysis,
) -> Result<String> {
    let metrics = &analysis.metrics;
    let report = &analysis.report;
    let report_id = record.fingerprint(metrics.evaluation_date);
    let raw_record = serde_json::to_string(record).context("failed to serialize contract record")?;
    let report_json = serde_json::to_string(report).context("failed to serialize report")?;
    let analytics = compute_report_analytics(metrics);
    let now = now_utc_string();

    let tx = connection.transaction()?;

    tx.execute(
        "
        INSERT INTO reports(
          report_id, evaluation_date, contract_type, year, context,
          approved_budget, executed_value, planned_end_date, physical_progress_pct, days_remaining,
          composite_risk, confidence, engine_severity, severity,
          raw_record, report_json, created_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)
        ON CONFLICT(report_id) DO UPDATE SET
          contract_type=excluded.contract_type,
          year=excluded.year,
          context=excluded.context,
          approved_budget=excluded.approved_budget,
          executed_value=excluded.executed_value,
          planned_end_date=excluded.planned_end_date,
          physical_progress_pct=excluded.physical_progress_pct,
          days_remaining=excluded.days_remaining,
          composite_risk=excluded.composite_risk,
          confidence=excluded.confidence,
          engine_severity=excluded.engine_severity,
          severity=excluded.severity,
          raw_record=excluded.raw_record,
          report_json=excluded.report_json,
          updated_at=excluded.updated_at
        ",
        params![
            report_id,
            metrics.evaluation_date,
            report.contract_type,
            report.year,
            report.context,
            metrics.approved_budget,
            metrics.executed_value,
            metrics.planned_end_date,
            metrics.physical_progress_pct,
            metrics.days_remaining,
            analysis.assessment.composite_risk,
            analysis.assessment.confidence,
            analysis.assessment.severity.as_str(),
            report.highest_severity().as_str(),
            raw_record,
            report_json,
            now,
        ],
    )
    .with_context(|| format!("failed to upsert report {report_id}"))?;

    tx.execute(
        "DELETE FROM report_sections WHERE report_id = ?1",
        [&report_id],
    )?;

    {
        let mut insert_section = tx.prepare(
            "
            INSERT INTO report_sections(
              report_id, position, title, block_name, severity, message, data_json
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )?;

        for (position, section) in report.sections.iter().enumerate() {
            let data_json = serde_json::to_string(&section.data)
                .with_context(|| format!("failed to serialize section data: {}", section.title))?;
            insert_section.execute(params![
                report_id,
                position as i64,
                section.title,
                section.message.block_name,
                section.message.severity.as_str(),
                section.message.message,
                data_json,
            ])?;
        }
    }

    tx.execute(
        "
        INSERT INTO report_analytics(
          report_id, budget_efficiency, time_performance, risk_score,
          budget_trend, timeline_trend, overall_health
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(report_id) DO UPDATE SET
          budget_efficiency=excluded.budget_efficiency,
          time_performance=excluded.time_performance,
          risk_score=excluded.risk_score,
          budget_trend=excluded.budget_trend,
          timeline_trend=excluded.timeline_trend,
          overall_health=excluded.overall_health
        ",
        params![
            report_id,
            analytics.budget_efficiency,
            analytics.time_performance,
            analytics.risk_score,
            analytics.budget_trend,
            analytics.timeline_trend,
            analytics.overall_health,
        ],
    )?;

    tx.commit()
        .with_context(|| format!("failed to commit report {report_id}"))?;

    debug!(
        report_id = %report_id,
        sections = report.sections.len(),
        health = analytics.overall_health,
        "report persisted"
    );

    Ok(report_id)
}
