use anyhow::{Context, Result};
use elevdiff::request::{build_requests, parse_endpoint};
use elevdiff::Batcher;
use serde::Serialize;

use crate::input;
use crate::InputArgs;

#[derive(Serialize)]
struct ChunkPlan {
    chunk: usize,
    locations: usize,
    url_length: usize,
    url: String,
}

/// Print the chunk layout and redacted request URLs without sending anything.
pub fn run(endpoint: String, batch_size: usize, input: InputArgs, json: bool) -> Result<()> {
    let batcher = Batcher::new(batch_size).context("Invalid batch size")?;
    let endpoint = parse_endpoint(&endpoint).context("Invalid endpoint")?;

    let points = input::load(&input)?;
    // Nothing is sent, so no key is needed.
    let requests = build_requests(&points, &batcher, &endpoint, "");

    let plan: Vec<ChunkPlan> = requests
        .iter()
        .map(|request| {
            let url = request.redacted_url().to_string();
            ChunkPlan {
                chunk: request.chunk,
                locations: request.point_count,
                url_length: url.len(),
                url,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!(
            "{} points in {} chunks (batch size {})",
            points.len(),
            plan.len(),
            batcher.batch_size()
        );
        for chunk in &plan {
            println!(
                "  chunk {:>4}: {:>5} locations, URL length {}",
                chunk.chunk, chunk.locations, chunk.url_length
            );
        }
    }

    Ok(())
}
