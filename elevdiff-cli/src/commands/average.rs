use anyhow::{bail, Context, Result};
use elevdiff::{ElevationPipeline, ElevationSummary, FetchMode, PipelineConfig};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::input;
use crate::InputArgs;

#[derive(Serialize)]
struct AverageResponse {
    mode: String,
    chunks: usize,
    elapsed_ms: u64,
    mean_difference: f64,
    #[serde(flatten)]
    summary: ElevationSummary,
}

pub fn run(
    api_key: Option<String>,
    endpoint: String,
    batch_size: usize,
    timeout_secs: u64,
    input: InputArgs,
    concurrent: bool,
    json: bool,
) -> Result<()> {
    let api_key = api_key.context(
        "ELEVDIFF_API_KEY environment variable not set. Use --api-key or set ELEVDIFF_API_KEY",
    )?;

    let mode = if concurrent {
        FetchMode::Concurrent
    } else {
        FetchMode::Sequential
    };

    let config = PipelineConfig::new(api_key)
        .with_endpoint(endpoint)
        .with_batch_size(batch_size)
        .with_mode(mode)
        .with_timeout(timeout_secs);
    let pipeline = ElevationPipeline::new(config).context("Invalid configuration")?;

    let points = input::load(&input)?;
    let chunks = pipeline.plan(&points).len();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.set_message(format!("Requesting {} chunks ({})", chunks, mode));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let start = Instant::now();
    let result = pipeline.run(&points);
    let elapsed_ms = start.elapsed().as_millis() as u64;
    spinner.finish_and_clear();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => bail!("{:?} stage failed: {}", e.stage(), e),
    };

    tracing::info!(
        mode = %mode,
        points = summary.count,
        chunks,
        elapsed_ms,
        "Average elevation difference computed"
    );

    if json {
        let response = AverageResponse {
            mode: mode.to_string(),
            chunks,
            elapsed_ms,
            mean_difference: summary.mean_difference(),
            summary,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        println!("Points:             {}", summary.count);
        println!("Chunks:             {} (batch size {})", chunks, pipeline.batch_size());
        println!("Reference mean:     {:.2} m", summary.reference_mean);
        println!("Service mean:       {:.2} m", summary.service_mean);
        println!("Average difference: {:.2} m", summary.mean_difference());
    }

    Ok(())
}
