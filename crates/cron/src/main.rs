//! One-shot entrypoint for the system crontab:
//!
//! ```text
//! */5 * * * * crm-cron heartbeat
//! 0 */12 * * * crm-cron low-stock
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crm_infra::CrmConfig;
use crm_infra::jobs::{CronJob, HeartbeatJob, LowStockJob};

#[derive(Parser, Debug)]
#[command(about = "Run a CRM maintenance job once", long_about = None)]
struct Options {
    #[command(subcommand)]
    job: Job,
}

#[derive(Subcommand, Debug)]
enum Job {
    /// Append a liveness line and probe the GraphQL `hello` field
    Heartbeat,
    /// Raise the stock of low-inventory products through the GraphQL API
    LowStock,
}

#[tokio::main]
async fn main() -> Result<()> {
    let opts = Options::parse();
    crm_observability::init();

    let cfg = CrmConfig::from_env().context("invalid configuration")?;
    let summary = run(opts.job, &cfg).await?;
    println!("{summary}");
    Ok(())
}

/// Run one job to completion; the returned line is printed on success.
async fn run(job: Job, cfg: &CrmConfig) -> Result<String> {
    match job {
        Job::Heartbeat => {
            let job = HeartbeatJob::from_config(cfg)?;
            let report = job
                .run()
                .await
                .with_context(|| format!("{} job failed", job.name()))?;
            tracing::debug!(graphql = ?report.graphql, "heartbeat report");
            Ok("Heartbeat logged successfully".to_string())
        }
        Job::LowStock => {
            let job = LowStockJob::from_config(cfg)?;
            let report = job
                .run()
                .await
                .with_context(|| format!("{} job failed", job.name()))?;
            Ok(report.message)
        }
    }
}
