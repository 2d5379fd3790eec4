mod analytics;
mod config;
mod error;
mod models;
mod normalize;
mod parse;
mod store;

use std::path::Path;

use analytics::KpiFilter;
use models::Job;
use store::TrapStore;
use tracing::info;

const CONFIG_PATH: &str = "greasebook.toml";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // init tracing
    tracing_subscriber::fmt()
        .with_target(true)
        .with_level(true)
        .with_env_filter("info")
        .init();

    let cfg = if Path::new(CONFIG_PATH).exists() {
        config::Config::load(CONFIG_PATH)?
    } else {
        config::Config::default()
    };
    let db = TrapStore::open(&cfg.db_path, &cfg.documents_dir)?;

    // Each argument is an invoice/manifest text file to ingest.
    for path in std::env::args().skip(1) {
        let text = std::fs::read_to_string(&path)?;
        let result = parse::extract_and_score(&text);
        info!(
            file = %path,
            confidence = result.confidence_score,
            extracted = result.extracted_fields.len(),
            missing = result.missing_fields.len(),
            "Parsed invoice text"
        );

        let mut job = Job::from_parse_result(&result, Some(&path));
        db.save_job(&mut job)?;
        info!(job_id = %job.job_id, status = %job.status, "STORED");
    }

    // Print statistics
    let kpis = db.dashboard_kpis(&KpiFilter::default())?;
    info!(
        jobs_completed = kpis.jobs_completed,
        jobs_scheduled = kpis.jobs_scheduled,
        jobs_in_progress = kpis.jobs_in_progress,
        total_revenue = kpis.total_revenue(),
        total_gallons = kpis.total_gallons,
        docs_missing = kpis.docs_missing_count,
        overdue_services = kpis.overdue_services,
        customers = kpis.customer_count,
        sites = kpis.site_count,
        "Dashboard statistics"
    );

    Ok(())
}
