use anyhow::{bail, Result};
use chrono::Utc;
use serde_json::json;
use std::path::Path;

use rerelease::address::{MemorySink, Snapshot};
use rerelease::config::Config;
use rerelease::pipeline::{Pipeline, PipelineState, Replay};
use rerelease::schedule::Slot;

use super::open_source;

pub async fn schedule(config: &Config, query: &str, items: Option<&Path>, as_json: bool) -> Result<()> {
    let now = Utc::now();
    let snapshot = Snapshot::from_query(query, now.fixed_offset());
    let address = snapshot.to_query();

    let source = open_source(config, items)?;
    let handle = Pipeline::new(source, MemorySink::default(), &config.pipeline)
        .spawn(config.pipeline.snapshot_buffer);
    handle.send(snapshot).await?;
    let pipeline = handle.finish().await?;

    let replay = match pipeline.state() {
        PipelineState::Ready(replay) => replay,
        PipelineState::Failed { message } => bail!(message),
        other => bail!("No schedule computed ({other})"),
    };

    if as_json {
        print_json(&replay, &address)?;
        return Ok(());
    }

    println!("{} ({})", replay.summary.title, replay.summary.source_id);
    println!("Rule {} from {}", replay.rule, replay.anchor.to_rfc3339());
    println!("================================");

    for (i, (item, slot)) in replay.entries().enumerate() {
        let at = match slot {
            Slot::Assigned(at) => at.to_rfc3339(),
            Slot::Skipped => String::from("skipped"),
        };
        println!("{:>4}. {at:<25}  {}", i + 1, item.title);
        println!("      originally {}", item.original_instant.to_rfc3339());
    }

    let progress = replay.schedule.progress(&now);
    println!();
    println!(
        "Released: {} of {} scheduled",
        progress.released.len(),
        replay.schedule.assigned_count()
    );
    if let Some(next) = progress.next_release {
        println!("Next release: {}", next.to_rfc3339());
    }
    println!("Address: ?{address}");

    Ok(())
}

fn print_json(replay: &Replay, address: &str) -> Result<()> {
    let items: Vec<_> = replay
        .entries()
        .map(|(item, slot)| {
            json!({
                "id": item.id,
                "title": item.title,
                "originalInstant": item.original_instant,
                "slot": slot,
            })
        })
        .collect();

    let output = json!({
        "title": replay.summary.title,
        "sourceId": replay.summary.source_id,
        "rule": replay.rule,
        "start": replay.anchor,
        "address": address,
        "items": items,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
