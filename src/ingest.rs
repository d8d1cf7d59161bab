use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::cursor::MatchCursor;
use crate::error::PipelineResult;
use crate::slot_index::{GAMES_PER_MATCH, MATCHES_PER_WEEK, SlotKey};
use crate::source::{MIN_GAME_LINKS, MatchListing, MatchSource};
use crate::stat_log::{StatLog, WriteOutcome};
use crate::stat_row::StatLine;

pub const DEFAULT_MAX_MATCHES: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestMode {
    /// Walk forward from the cursor for at most `max_matches` matches.
    Resume { max_matches: usize },
    /// Re-scrape exactly these weeks, stopping at the first unplayed match.
    Strict { weeks: Vec<u32> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestPlan {
    pub start: MatchCursor,
    pub mode: IngestMode,
    pub skipped: BTreeSet<MatchCursor>,
}

impl IngestPlan {
    pub fn resume(start: MatchCursor, max_matches: usize) -> Self {
        Self {
            start,
            mode: IngestMode::Resume { max_matches },
            skipped: BTreeSet::new(),
        }
    }

    pub fn strict(weeks: Vec<u32>) -> Self {
        let mut seen = BTreeSet::new();
        let weeks = weeks
            .into_iter()
            .filter(|w| *w >= 1 && seen.insert(*w))
            .collect::<Vec<_>>();
        Self {
            start: MatchCursor::week_start(weeks.first().copied().unwrap_or(1)),
            mode: IngestMode::Strict { weeks },
            skipped: BTreeSet::new(),
        }
    }

    pub fn with_skipped(mut self, skipped: BTreeSet<MatchCursor>) -> Self {
        self.skipped = skipped;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The match at the returned cursor has not been played yet.
    NotYetOccurred,
    /// The season list has no entry at the returned cursor yet.
    ListExhausted,
    /// `max_matches` were attempted.
    AttemptBound,
    /// Every requested week was scraped.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    /// Next match to attempt on the following run.
    pub cursor: MatchCursor,
    pub stop: StopReason,
    pub matches_ingested: usize,
    pub matches_skipped: usize,
    pub rows_inserted: usize,
    pub rows_overwritten: usize,
    pub rows_unchanged: usize,
}

impl IngestOutcome {
    fn new(cursor: MatchCursor) -> Self {
        Self {
            cursor,
            stop: StopReason::Completed,
            matches_ingested: 0,
            matches_skipped: 0,
            rows_inserted: 0,
            rows_overwritten: 0,
            rows_unchanged: 0,
        }
    }

    fn record(&mut self, write: WriteOutcome) {
        match write {
            WriteOutcome::Inserted => self.rows_inserted += 1,
            WriteOutcome::Overwritten => self.rows_overwritten += 1,
            WriteOutcome::Unchanged => self.rows_unchanged += 1,
        }
    }
}

enum MatchStatus {
    Ingested,
    Skipped,
    NotYetOccurred,
    ListExhausted,
}

/// Scrapes matches into `log` following `plan`.
///
/// Any error leaves already-written rows of this run in `log`; callers only
/// persist the log and the returned cursor when this returns `Ok`.
pub fn ingest(
    source: &dyn MatchSource,
    log: &mut StatLog,
    plan: &IngestPlan,
) -> PipelineResult<IngestOutcome> {
    let listings = source.match_list()?;
    info!(
        listed = listings.len(),
        start = %plan.start,
        "loaded season match list"
    );

    match &plan.mode {
        IngestMode::Resume { max_matches } => {
            ingest_resume(source, log, plan, &listings, *max_matches)
        }
        IngestMode::Strict { weeks } => ingest_strict(source, log, plan, &listings, weeks),
    }
}

fn ingest_resume(
    source: &dyn MatchSource,
    log: &mut StatLog,
    plan: &IngestPlan,
    listings: &[MatchListing],
    max_matches: usize,
) -> PipelineResult<IngestOutcome> {
    let mut outcome = IngestOutcome::new(plan.start);
    for _ in 0..max_matches {
        let cursor = outcome.cursor;
        match ingest_match(source, log, plan, listings, cursor, &mut outcome)? {
            MatchStatus::Ingested | MatchStatus::Skipped => outcome.cursor = cursor.advance(),
            MatchStatus::NotYetOccurred => {
                outcome.stop = StopReason::NotYetOccurred;
                return Ok(outcome);
            }
            MatchStatus::ListExhausted => {
                outcome.stop = StopReason::ListExhausted;
                return Ok(outcome);
            }
        }
    }
    outcome.stop = StopReason::AttemptBound;
    Ok(outcome)
}

fn ingest_strict(
    source: &dyn MatchSource,
    log: &mut StatLog,
    plan: &IngestPlan,
    listings: &[MatchListing],
    weeks: &[u32],
) -> PipelineResult<IngestOutcome> {
    let mut outcome = IngestOutcome::new(plan.start);
    for week in weeks {
        for match_num in 0..MATCHES_PER_WEEK as u32 {
            let cursor = MatchCursor::new(*week, match_num);
            outcome.cursor = cursor;
            match ingest_match(source, log, plan, listings, cursor, &mut outcome)? {
                MatchStatus::Ingested | MatchStatus::Skipped => {}
                MatchStatus::NotYetOccurred | MatchStatus::ListExhausted => {
                    warn!(%cursor, "strict scrape reached an unplayed match, stopping");
                    outcome.stop = StopReason::NotYetOccurred;
                    return Ok(outcome);
                }
            }
        }
        outcome.cursor = MatchCursor::week_start(week + 1);
    }
    outcome.stop = StopReason::Completed;
    Ok(outcome)
}

fn ingest_match(
    source: &dyn MatchSource,
    log: &mut StatLog,
    plan: &IngestPlan,
    listings: &[MatchListing],
    cursor: MatchCursor,
    outcome: &mut IngestOutcome,
) -> PipelineResult<MatchStatus> {
    if plan.skipped.contains(&cursor) {
        info!(%cursor, "match marked as skipped");
        outcome.matches_skipped += 1;
        return Ok(MatchStatus::Skipped);
    }

    let Some(listing) = listings.get(cursor.ordinal()) else {
        info!(%cursor, "match list has no entry yet, stopping");
        return Ok(MatchStatus::ListExhausted);
    };
    let Some(match_url) = listing.url.as_deref() else {
        info!(%cursor, title = %listing.title, "match has no page yet, stopping");
        return Ok(MatchStatus::NotYetOccurred);
    };

    let links = source.game_links(match_url)?;
    if links.len() < MIN_GAME_LINKS {
        info!(%cursor, title = %listing.title, "match has yet to occur, stopping");
        return Ok(MatchStatus::NotYetOccurred);
    }

    info!(%cursor, title = %listing.title, "scraping match");

    // Parse both games before touching the log so a bad second game does not
    // leave the first one half-applied.
    let mut staged: Vec<(SlotKey, String, StatLine)> = Vec::new();
    for (game_num, game_url) in links.iter().skip(1).take(GAMES_PER_MATCH).enumerate() {
        let sheet = source.game_sheet(game_url)?;
        for (slot, (name, line)) in sheet.statlines(game_url)?.into_iter().enumerate() {
            let key = SlotKey {
                week: cursor.week,
                match_num: cursor.match_num,
                game_num: game_num as u32,
                slot: slot as u32,
            };
            staged.push((key, name, line));
        }
    }

    for (key, name, line) in &staged {
        let write = log.upsert(*key, name, *line);
        outcome.record(write);
    }
    outcome.matches_ingested += 1;
    Ok(MatchStatus::Ingested)
}
