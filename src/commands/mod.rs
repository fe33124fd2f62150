pub mod expand;
pub mod rule;
pub mod schedule;
pub mod watch;

// Re-export command functions for convenience
pub use expand::expand;
pub use rule::rule;
pub use schedule::schedule;
pub use watch::watch;

use anyhow::{Context, Result};
use std::path::Path;

use rerelease::config::Config;
use rerelease::source::{HttpItemSource, ItemSource, StaticItemSource};

/// Items from a JSON file when given, the summary endpoint otherwise
fn open_source(config: &Config, items: Option<&Path>) -> Result<Box<dyn ItemSource>> {
    match items {
        Some(path) => {
            let source = StaticItemSource::from_file(path)
                .with_context(|| format!("Failed to load items from {}", path.display()))?;
            tracing::debug!(sources = ?source.source_ids(), "Loaded static items");
            Ok(Box::new(source))
        }
        None => {
            let source = HttpItemSource::from_config(&config.source)
                .context("Failed to create summary client")?;
            Ok(Box::new(source))
        }
    }
}
