//! Reactive recompute pipeline
//!
//! Turns a stream of [`Snapshot`]s into published schedules while keeping
//! three side effects under control:
//!
//! - items are fetched when the source changes, and after a failure only
//!   when one of the schedule inputs changes
//! - the schedule is recomputed only when one of its inputs changes
//! - the shareable address is written once per burst of edits
//!
//! # Architecture
//!
//! ```text
//! snapshots ──▶ ┌──────────────────────────────┐ ──▶ watch<PipelineState>
//!  (mpsc)       │ select! loop                 │
//!               │  Distinct<source>   ─▶ fetch ├──▶ spawned fetch task
//! fetch results │  Distinct<inputs>   ─▶ assign│        │
//!  (gen-tagged) │  Distinct<address>  ─▶ debounce ──▶ AddressSink
//!       ▲       └──────────────────────────────┘        │
//!       └───────────────────────────────────────────────┘
//! ```
//!
//! Every fetch carries the generation current when it was issued. Issuing a
//! new fetch, or moving to a source that is already cached or blank, bumps
//! the generation; a result tagged with an older generation is discarded,
//! so a slow response can never overwrite a newer one.
//!
//! # Example
//!
//! ```no_run
//! use rerelease::address::{MemorySink, Snapshot};
//! use rerelease::config::PipelineConfig;
//! use rerelease::pipeline::Pipeline;
//! use rerelease::source::StaticItemSource;
//!
//! # async fn example() -> rerelease::error::Result<()> {
//! let source = StaticItemSource::from_file("items.json".as_ref())?;
//! let pipeline = Pipeline::new(source, MemorySink::default(), &PipelineConfig::default());
//! let handle = pipeline.spawn(32);
//!
//! let anchor = chrono::DateTime::parse_from_rfc3339("2023-07-01T01:30:00-04:00").unwrap();
//! handle.send(Snapshot::new("https://example.com/feed.xml", "2wTuTh", anchor)).await?;
//!
//! let pipeline = handle.finish().await?;
//! println!("{:?}", pipeline.stats());
//! # Ok(())
//! # }
//! ```

pub mod debounce;
pub mod distinct;
pub mod state;

use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::address::{AddressSink, Snapshot};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::models::FeedSummary;
use crate::rule::Rule;
use crate::schedule::{assign, generate, Bounds};
use crate::source::{FetchError, ItemSource};

pub use debounce::Debouncer;
pub use distinct::Distinct;
pub use state::{PipelineState, PipelineStats, Replay};

// ============================================================================
// Internal types
// ============================================================================

/// Result of a spawned fetch, tagged with the generation that issued it
#[derive(Debug)]
struct FetchOutcome {
    generation: u64,
    source_id: String,
    result: std::result::Result<FeedSummary, FetchError>,
}

/// Everything the schedule depends on
#[derive(Debug, Clone, PartialEq)]
struct ScheduleInputs {
    source_id: String,
    rule: Rule,
    anchor: DateTime<FixedOffset>,
    // DateTime equality ignores the offset, which still changes the output
    anchor_offset: i32,
    bounds: Bounds,
}

impl ScheduleInputs {
    fn of(snapshot: &Snapshot, source_id: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            rule: snapshot.rule(),
            anchor: snapshot.anchor,
            anchor_offset: snapshot.anchor.offset().local_minus_utc(),
            bounds: snapshot.bounds(),
        }
    }
}

enum Event {
    Snapshot(Option<Snapshot>),
    Fetched(FetchOutcome),
    AddressDue,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Recompute pipeline over an item source and an address sink
pub struct Pipeline<S, A> {
    source: Arc<S>,
    sink: A,

    state_tx: watch::Sender<PipelineState>,
    fetch_tx: mpsc::UnboundedSender<FetchOutcome>,
    fetch_rx: mpsc::UnboundedReceiver<FetchOutcome>,

    generation: u64,
    in_flight: Option<String>,
    cache: HashMap<String, Arc<FeedSummary>>,
    current: Option<Snapshot>,

    source_key: Distinct<Option<String>>,
    // Last inputs seen by on_snapshot; a failed source is retried only when they change
    request_key: Distinct<ScheduleInputs>,
    schedule_key: Distinct<ScheduleInputs>,
    address_key: Distinct<String>,
    debounce: Debouncer<String>,
    last_written: Option<String>,

    stats: PipelineStats,
}

impl<S, A> Pipeline<S, A>
where
    S: ItemSource + 'static,
    A: AddressSink,
{
    pub fn new(source: S, sink: A, config: &PipelineConfig) -> Self {
        Self::with_shared_source(Arc::new(source), sink, config)
    }

    /// Build over a source that is shared with other owners
    pub fn with_shared_source(source: Arc<S>, sink: A, config: &PipelineConfig) -> Self {
        let (state_tx, _) = watch::channel(PipelineState::Idle);
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let last_written = Some(sink.read()).filter(|query| !query.is_empty());

        Self {
            source,
            sink,
            state_tx,
            fetch_tx,
            fetch_rx,
            generation: 0,
            in_flight: None,
            cache: HashMap::new(),
            current: None,
            source_key: Distinct::new(),
            request_key: Distinct::new(),
            schedule_key: Distinct::new(),
            address_key: Distinct::new(),
            debounce: Debouncer::new(config.debounce()),
            last_written,
            stats: PipelineStats::default(),
        }
    }

    /// Receiver for every published state
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.state_tx.subscribe()
    }

    /// Latest published state
    pub fn state(&self) -> PipelineState {
        self.state_tx.borrow().clone()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    pub fn into_sink(self) -> A {
        self.sink
    }

    /// Process snapshots until the channel closes
    ///
    /// After the channel closes, the in-flight fetch for the current source
    /// and any pending address write are still completed before returning.
    pub async fn run(&mut self, mut snapshots: mpsc::Receiver<Snapshot>) {
        let mut open = true;
        tracing::debug!(
            debounce_ms = self.debounce.window().as_millis() as u64,
            "Pipeline started"
        );

        loop {
            if !open && self.in_flight.is_none() && !self.debounce.is_pending() {
                break;
            }

            let deadline = self.debounce.deadline();
            let event = tokio::select! {
                snapshot = snapshots.recv(), if open => Event::Snapshot(snapshot),
                Some(outcome) = self.fetch_rx.recv() => Event::Fetched(outcome),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    Event::AddressDue
                }
            };

            match event {
                Event::Snapshot(Some(snapshot)) => self.on_snapshot(snapshot),
                Event::Snapshot(None) => {
                    tracing::debug!("Snapshot channel closed, draining");
                    open = false;
                }
                Event::Fetched(outcome) => self.on_fetched(outcome),
                Event::AddressDue => self.on_address_due(),
            }
        }

        tracing::debug!(
            snapshots = self.stats.snapshots,
            fetches = self.stats.fetches_started,
            discarded = self.stats.fetches_discarded,
            schedules = self.stats.schedules_computed,
            writes = self.stats.address_writes,
            "Pipeline stopped"
        );
    }

    /// Move the pipeline onto its own task
    pub fn spawn(self, buffer: usize) -> PipelineHandle<S, A>
    where
        A: 'static,
    {
        let (snapshots, rx) = mpsc::channel(buffer.max(1));
        let state = self.subscribe();
        let task = tokio::spawn(async move {
            let mut pipeline = self;
            pipeline.run(rx).await;
            pipeline
        });

        PipelineHandle {
            snapshots,
            state,
            task,
        }
    }

    // ------------------------------------------------------------------------
    // Event handlers
    // ------------------------------------------------------------------------

    fn on_snapshot(&mut self, snapshot: Snapshot) {
        self.stats.snapshots += 1;

        let query = snapshot.to_query();
        if self.address_key.update(query.clone()) {
            tracing::trace!(query = %query, "Address write scheduled");
            self.debounce.schedule(query, Instant::now());
        }

        let source = snapshot.source().map(str::to_string);
        let inputs = source.as_deref().map(|id| ScheduleInputs::of(&snapshot, id));
        self.current = Some(snapshot);

        let source_changed = self.source_key.update(source.clone());
        let Some(source_id) = source else {
            if source_changed {
                self.supersede();
                self.schedule_key.reset();
                self.publish(PipelineState::Failed {
                    message: FetchError::MissingSource.to_string(),
                });
            }
            return;
        };

        let inputs_changed = inputs.is_some_and(|inputs| self.request_key.update(inputs));

        if self.cache.contains_key(&source_id) {
            if source_changed {
                self.supersede();
            }
            self.recompute();
        } else if source_changed || (self.in_flight.is_none() && inputs_changed) {
            self.start_fetch(source_id);
        } else {
            tracing::trace!(source_id = %source_id, "No fetch-relevant change");
        }
    }

    fn on_fetched(&mut self, outcome: FetchOutcome) {
        if outcome.generation != self.generation {
            self.stats.fetches_discarded += 1;
            tracing::warn!(
                source_id = %outcome.source_id,
                generation = outcome.generation,
                current = self.generation,
                "Discarding superseded fetch"
            );
            return;
        }

        self.in_flight = None;
        match outcome.result {
            Ok(summary) => {
                tracing::info!(
                    source_id = %outcome.source_id,
                    items = summary.items.len(),
                    "Fetch completed"
                );
                self.cache.insert(outcome.source_id, Arc::new(summary));
                self.schedule_key.reset();
                self.recompute();
            }
            Err(e) => {
                tracing::warn!(source_id = %outcome.source_id, error = %e, "Fetch failed");
                self.schedule_key.reset();
                self.publish(PipelineState::Failed {
                    message: e.to_string(),
                });
            }
        }
    }

    fn on_address_due(&mut self) {
        let Some(query) = self.debounce.take_due(Instant::now()) else {
            return;
        };

        if self.last_written.as_deref() == Some(query.as_str()) {
            tracing::trace!("Address unchanged, skipping write");
            return;
        }

        self.sink.write(&query);
        self.stats.address_writes += 1;
        tracing::debug!(query = %query, "Address written");
        self.last_written = Some(query);
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Invalidate every fetch issued so far
    fn supersede(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }

    fn start_fetch(&mut self, source_id: String) {
        self.supersede();
        self.in_flight = Some(source_id.clone());
        self.schedule_key.reset();
        self.stats.fetches_started += 1;

        tracing::info!(source_id = %source_id, generation = self.generation, "Fetching items");
        self.publish(PipelineState::Loading {
            source_id: source_id.clone(),
        });

        let source = Arc::clone(&self.source);
        let tx = self.fetch_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            // The fetch runs on its own task so a panic still reports an outcome
            let fetch = {
                let source_id = source_id.clone();
                tokio::spawn(async move { source.fetch(&source_id).await })
            };
            let result = fetch
                .await
                .unwrap_or_else(|e| Err(FetchError::Task(e.to_string())));
            // The receiver is gone once the pipeline has stopped
            let _ = tx.send(FetchOutcome {
                generation,
                source_id,
                result,
            });
        });
    }

    /// Recompute the schedule if its inputs changed and the items are loaded
    fn recompute(&mut self) {
        let Some(snapshot) = &self.current else {
            return;
        };
        let Some(source_id) = snapshot.source() else {
            return;
        };
        let Some(summary) = self.cache.get(source_id) else {
            return;
        };

        let inputs = ScheduleInputs::of(snapshot, source_id);
        if !self.schedule_key.update(inputs.clone()) {
            tracing::trace!(source_id = %inputs.source_id, "Schedule inputs unchanged");
            return;
        }

        let schedule = assign(
            &summary.items,
            &inputs.bounds,
            generate(inputs.rule, inputs.anchor),
        );
        self.stats.schedules_computed += 1;
        tracing::debug!(
            source_id = %inputs.source_id,
            rule = %inputs.rule,
            assigned = schedule.assigned_count(),
            skipped = schedule.skipped_count(),
            "Schedule recomputed"
        );

        let replay = Replay {
            summary: Arc::clone(summary),
            rule: inputs.rule,
            anchor: inputs.anchor,
            schedule,
        };
        self.publish(PipelineState::Ready(replay));
    }

    fn publish(&self, state: PipelineState) {
        self.state_tx.send_replace(state);
    }
}

// ============================================================================
// Handle
// ============================================================================

/// A pipeline running on its own task
pub struct PipelineHandle<S, A> {
    snapshots: mpsc::Sender<Snapshot>,
    state: watch::Receiver<PipelineState>,
    task: JoinHandle<Pipeline<S, A>>,
}

impl<S, A> PipelineHandle<S, A> {
    /// Queue a snapshot
    pub async fn send(&self, snapshot: Snapshot) -> Result<()> {
        self.snapshots
            .send(snapshot)
            .await
            .map_err(|_| Error::Pipeline("pipeline stopped".to_string()))
    }

    /// Receiver for published states
    pub fn state(&self) -> watch::Receiver<PipelineState> {
        self.state.clone()
    }

    /// Close the input, let the pipeline drain and get it back
    pub async fn finish(self) -> Result<Pipeline<S, A>> {
        drop(self.snapshots);
        self.task
            .await
            .map_err(|e| Error::with_source("pipeline task failed", e))
    }
}

// ============================================================================
// Tests
// ============================================================================
