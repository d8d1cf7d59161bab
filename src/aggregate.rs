use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::cursor::MatchCursor;
use crate::error::{PipelineError, PipelineResult};
use crate::registry::{PlayerId, PlayerRegistry};
use crate::slot_index::from_index;
use crate::stat_log::StatLog;
use crate::stat_row::RawStatRow;

/// One player's summed week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerWeekAggregate {
    pub player_id: PlayerId,
    pub week: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub cs: u32,
    pub points: i64,
    pub games_played: u32,
}

impl PlayerWeekAggregate {
    fn empty(player_id: PlayerId, week: u32) -> Self {
        Self {
            player_id,
            week,
            kills: 0,
            deaths: 0,
            assists: 0,
            cs: 0,
            points: 0,
            games_played: 0,
        }
    }

    fn add_game(&mut self, row: &RawStatRow) {
        self.kills += row.stats.kills;
        self.deaths += row.stats.deaths;
        self.assists += row.stats.assists;
        self.cs += row.stats.cs;
        self.points += row.stats.points();
        self.games_played += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationPlan {
    pub start: MatchCursor,
    /// First match not to read. Normally the ingestion cursor.
    pub limit: MatchCursor,
    pub skipped: BTreeSet<MatchCursor>,
}

impl AggregationPlan {
    pub fn new(start: MatchCursor, limit: MatchCursor) -> Self {
        Self {
            start,
            limit,
            skipped: BTreeSet::new(),
        }
    }

    /// Re-derives one whole week from the log.
    pub fn week(week: u32) -> Self {
        Self::new(MatchCursor::week_start(week), MatchCursor::week_start(week + 1))
    }

    pub fn with_skipped(mut self, skipped: BTreeSet<MatchCursor>) -> Self {
        self.skipped = skipped;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationOutcome {
    pub from: MatchCursor,
    /// Next unconsumed match. Not persisted here; the caller decides.
    pub next_cursor: MatchCursor,
    pub matches_consumed: usize,
    pub matches_skipped: usize,
    /// Sorted by (week, player id).
    pub aggregates: Vec<PlayerWeekAggregate>,
}

/// Folds complete 20-row match blocks from `plan.start` into per-player
/// weekly totals. Stops at the first missing block or at `plan.limit`.
pub fn aggregate(
    log: &StatLog,
    registry: &PlayerRegistry,
    plan: &AggregationPlan,
) -> PipelineResult<AggregationOutcome> {
    let mut totals: BTreeMap<(u32, PlayerId), PlayerWeekAggregate> = BTreeMap::new();
    let mut cursor = plan.start;
    let mut matches_consumed = 0usize;
    let mut matches_skipped = 0usize;

    while cursor < plan.limit {
        if plan.skipped.contains(&cursor) {
            matches_skipped += 1;
            cursor = cursor.advance();
            continue;
        }
        let Some(block) = log.match_block(cursor) else {
            debug!(%cursor, "no complete block, end of available data");
            break;
        };

        for (index, row) in block {
            check_row_position(index, row)?;
            let player_id =
                registry
                    .lookup(&row.player_name)
                    .ok_or_else(|| PipelineError::UnknownPlayer {
                        name: row.player_name.clone(),
                        index,
                    })?;
            totals
                .entry((cursor.week, player_id))
                .or_insert_with(|| PlayerWeekAggregate::empty(player_id, cursor.week))
                .add_game(row);
        }

        matches_consumed += 1;
        cursor = cursor.advance();
    }

    info!(
        from = %plan.start,
        to = %cursor,
        matches_consumed,
        players = totals.len(),
        "aggregated match blocks"
    );

    Ok(AggregationOutcome {
        from: plan.start,
        next_cursor: cursor,
        matches_consumed,
        matches_skipped,
        aggregates: totals.into_values().collect(),
    })
}

fn check_row_position(index: usize, row: &RawStatRow) -> PipelineResult<()> {
    let Some(key) = from_index(index) else {
        return Err(PipelineError::CorruptLog {
            index,
            detail: "reserved index holds a stat row".to_string(),
        });
    };
    if (key.week, key.match_num, key.game_num) != (row.week, row.match_num, row.game_num) {
        return Err(PipelineError::CorruptLog {
            index,
            detail: format!(
                "row says week {} match {} game {}, position says week {} match {} game {}",
                row.week, row.match_num, row.game_num, key.week, key.match_num, key.game_num
            ),
        });
    }
    Ok(())
}
