use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::aggregate::{AggregationOutcome, AggregationPlan, aggregate};
use crate::config::{AggregateOptions, RunConfig, ScrapeOptions};
use crate::cursor::MatchCursor;
use crate::ingest::{IngestOutcome, IngestPlan, ingest};
use crate::pipeline_state::PipelineState;
use crate::registry::PlayerRegistry;
use crate::source::MatchSource;
use crate::stat_log::StatLog;
use crate::stats_store::{ApplyOutcome, StatsBatch, StatsStore};

#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub outcome: IngestOutcome,
    pub previous_cursor: MatchCursor,
    /// Strict runs leave the stored ingestion cursor alone.
    pub cursor_saved: bool,
    pub log_rows: usize,
}

#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub outcome: AggregationOutcome,
    /// `None` on a dry run.
    pub applied: Option<ApplyOutcome>,
}

#[derive(Debug, Clone)]
pub struct StatusReport {
    pub state: PipelineState,
    pub log_rows: usize,
    pub last_index: usize,
    /// Matches between the aggregation and ingestion cursors.
    pub behind: usize,
    /// Leading run of those that is complete in the log and can be folded in now.
    pub pending_blocks: usize,
}

/// Runs ingestion and commits the log plus ingestion cursor on success only.
pub fn run_scrape(
    config: &RunConfig,
    opts: &ScrapeOptions,
    source: &dyn MatchSource,
) -> Result<ScrapeReport> {
    let log_path = config.log_path();
    let state_path = config.state_path();

    let (mut log, mut state) = if opts.force_restart {
        warn!("force restart: starting from an empty log and reset cursors");
        (StatLog::new(), PipelineState::default())
    } else {
        (
            StatLog::load_or_new(&log_path)?,
            PipelineState::load_or_default(&state_path)?,
        )
    };

    let strict = !opts.weeks.is_empty();
    let plan = if strict {
        IngestPlan::strict(opts.weeks.clone())
    } else {
        IngestPlan::resume(state.ingestion, opts.max_matches)
    }
    .with_skipped(config.skipped_matches.clone());

    let previous_cursor = state.ingestion;
    let outcome = ingest(source, &mut log, &plan).context("ingestion run aborted")?;

    log.save(&log_path)?;
    let cursor_saved = !strict || opts.force_restart;
    if !strict {
        state.ingestion = outcome.cursor;
    }
    if cursor_saved {
        state.save(&state_path)?;
    }

    info!(
        cursor = %outcome.cursor,
        stop = ?outcome.stop,
        ingested = outcome.matches_ingested,
        "scrape finished"
    );

    Ok(ScrapeReport {
        previous_cursor,
        cursor_saved,
        log_rows: log.len(),
        outcome,
    })
}

/// Aggregates from the stored aggregation cursor (or the store's watermark,
/// when it has one) up to the ingestion cursor. With `commit` the batch goes
/// to `store` and the cursor advances.
pub fn run_aggregate(
    config: &RunConfig,
    opts: &AggregateOptions,
    registry: &PlayerRegistry,
    store: &mut dyn StatsStore,
) -> Result<AggregateReport> {
    let log_path = config.log_path();
    let state_path = config.state_path();
    if !log_path.exists() {
        anyhow::bail!(
            "{} not found, run the scraper first",
            log_path.display()
        );
    }
    let log = StatLog::load(&log_path)?;
    let mut state = PipelineState::load_or_default(&state_path)?;

    // A store watermark commits with its deltas and wins over the state file.
    let start = match store.watermark()? {
        Some(mark) if mark != state.aggregation => {
            warn!(
                state = %state.aggregation,
                watermark = %mark,
                "aggregation cursor disagrees with the stats store, resuming from the store"
            );
            mark
        }
        _ => state.aggregation,
    };

    let plan = AggregationPlan::new(start, state.ingestion)
        .with_skipped(config.skipped_matches.clone());
    let outcome = aggregate(&log, registry, &plan).context("aggregation run aborted")?;

    if !opts.commit {
        info!(next = %outcome.next_cursor, "dry run, nothing written");
        return Ok(AggregateReport {
            outcome,
            applied: None,
        });
    }

    let applied = store.apply(&StatsBatch::from(&outcome))?;
    state.aggregation = outcome.next_cursor;
    state.save(&state_path)?;

    Ok(AggregateReport {
        outcome,
        applied: Some(applied),
    })
}

pub fn status(config: &RunConfig) -> Result<StatusReport> {
    let log = StatLog::load_or_new(&config.log_path())?;
    let state = PipelineState::load_or_default(&config.state_path())?;

    let mut pending_blocks = 0usize;
    let mut cursor = state.aggregation;
    while cursor < state.ingestion {
        if config.skipped_matches.contains(&cursor) || log.match_block(cursor).is_some() {
            pending_blocks += 1;
        } else {
            break;
        }
        cursor = cursor.advance();
    }

    Ok(StatusReport {
        log_rows: log.len(),
        last_index: log.last_index(),
        behind: state.aggregation.matches_until(state.ingestion),
        pending_blocks,
        state,
    })
}
