use anyhow::Result;
use tracing::{info, warn};

use super::records::{
    enrichment_provider, engine_config, load_first_record, missing_canonical_fields,
};
use super::store::{open_store, persist_analysis};
use crate::cli::AnalyzeArgs;
use crate::engine::analyze_contract;
use crate::util::{write_json_pretty, write_json_stdout};

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let record = load_first_record(&args.input)?;
    let config = engine_config(&args.engine);
    let provider = enrichment_provider(args.engine.enrichment);

    info!(
        input = %args.input.display(),
        fields = record.len(),
        evaluation_date = %config.evaluation_date,
        enrichment = args.engine.enrichment.as_str(),
        "analysis requested"
    );

    let missing = missing_canonical_fields(&record);
    if record.is_empty() {
        warn!("record has no fields; every metric falls back to its default");
    } else if !missing.is_empty() {
        warn!(missing = ?missing, "record lacks canonical fields; defaults apply");
    }

    let analysis = analyze_contract(&record, &config, provider.as_ref());

    match &args.output {
        Some(path) => {
            write_json_pretty(path, &analysis.report)?;
            info!(path = %path.display(), "report written");
        }
        None => write_json_stdout(&analysis.report)?,
    }

    if let Some(db_path) = &args.db_path {
        let mut connection = open_store(db_path)?;
        let report_id = persist_analysis(&mut connection, &record, &analysis)?;
        info!(db_path = %db_path.display(), report_id = %report_id, "report stored");
    }

    Ok(())
}
