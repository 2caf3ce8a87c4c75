use inventory_engine::RunSummary;
use inventory_ingest_lib::{logging, run_with_config, IngestConfig};

pub fn run(config: &IngestConfig) -> anyhow::Result<()> {
    let _guard = logging::init(config)?;
    let Some(summary) = run_with_config(config)? else {
        anyhow::bail!("nothing ingested");
    };
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(stats) => println!(
                "ok    {} -> {} ({} rows, {} columns)",
                outcome.file_name, outcome.table_name, stats.rows, stats.columns
            ),
            Err(err) => println!("fail  {err}"),
        }
    }
    println!(
        "{} ingested, {} failed in {:.2} minutes",
        summary.succeeded(),
        summary.failed(),
        summary.elapsed_minutes()
    );
}
