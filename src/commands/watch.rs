use anyhow::Result;
use chrono::Utc;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use rerelease::address::{Snapshot, StdoutSink};
use rerelease::config::Config;
use rerelease::pipeline::Pipeline;

use super::open_source;

pub async fn watch(config: &Config, items: Option<&Path>, prefix: String) -> Result<()> {
    let source = open_source(config, items)?;
    let handle = Pipeline::new(source, StdoutSink::new(prefix), &config.pipeline)
        .spawn(config.pipeline.snapshot_buffer);

    let mut state = handle.state();
    let printer = tokio::spawn(async move {
        while state.changed().await.is_ok() {
            let line = state.borrow_and_update().to_string();
            println!("{line}");
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim().trim_start_matches('?');
                if line.is_empty() {
                    continue;
                }
                handle.send(Snapshot::from_query(line, Utc::now().fixed_offset())).await?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, finishing pending work");
                break;
            }
        }
    }

    let pipeline = handle.finish().await?;
    let stats = pipeline.stats();
    drop(pipeline);
    let _ = printer.await;

    tracing::info!(
        snapshots = stats.snapshots,
        fetches = stats.fetches_started,
        discarded = stats.fetches_discarded,
        schedules = stats.schedules_computed,
        writes = stats.address_writes,
        "Watch finished"
    );

    Ok(())
}
