use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cursor::MatchCursor;
use crate::error::PipelineError;
use crate::slot_index::{ROWS_PER_MATCH, SlotKey, from_index};
use crate::stat_row::{RawStatRow, StatLine};

/// On-disk shape of one log row. The explicit `index` column keeps gaps
/// intact across a reload.
#[derive(Debug, Serialize, Deserialize)]
struct LogRecord {
    index: usize,
    playername: String,
    kills: u32,
    deaths: u32,
    assists: u32,
    cs: u32,
    week: u32,
    matchnum: u32,
    gamenum: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    Overwritten,
    Unchanged,
}

/// The raw per-game log, addressed by slot index. Index 0 is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatLog {
    rows: BTreeMap<usize, RawStatRow>,
}

impl StatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, key: SlotKey, player_name: &str, stats: StatLine) -> WriteOutcome {
        let index = key.to_index();
        let row = RawStatRow::new(player_name, stats, key);
        match self.rows.insert(index, row.clone()) {
            None => WriteOutcome::Inserted,
            Some(previous) if previous == row => WriteOutcome::Unchanged,
            Some(_) => WriteOutcome::Overwritten,
        }
    }

    /// Stores `row` at `index` without checking that they agree.
    #[cfg(test)]
    pub(crate) fn insert_unchecked(&mut self, index: usize, row: RawStatRow) {
        self.rows.insert(index, row);
    }

    pub fn get(&self, index: usize) -> Option<&RawStatRow> {
        self.rows.get(&index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.rows.keys().next_back().copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &RawStatRow)> {
        self.rows.iter().map(|(index, row)| (*index, row))
    }

    /// All 20 rows of a match, or `None` while any of them is missing.
    pub fn match_block(&self, cursor: MatchCursor) -> Option<Vec<(usize, &RawStatRow)>> {
        let start = cursor.block_start();
        (start..start + ROWS_PER_MATCH)
            .map(|index| self.rows.get(&index).map(|row| (index, row)))
            .collect()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("open stat log {}", path.display()))?;
        let mut rows = BTreeMap::new();
        for record in reader.deserialize::<LogRecord>() {
            let record = record.with_context(|| format!("decode row of {}", path.display()))?;
            let key = from_index(record.index).ok_or_else(|| PipelineError::CorruptLog {
                index: record.index,
                detail: "reserved index holds a stat row".to_string(),
            })?;
            if (key.week, key.match_num, key.game_num)
                != (record.week, record.matchnum, record.gamenum)
            {
                return Err(PipelineError::CorruptLog {
                    index: record.index,
                    detail: format!(
                        "row claims week {} match {} game {}",
                        record.week, record.matchnum, record.gamenum
                    ),
                })
                .with_context(|| format!("load stat log {}", path.display()));
            }
            let stats = StatLine {
                kills: record.kills,
                deaths: record.deaths,
                assists: record.assists,
                cs: record.cs,
            };
            rows.insert(record.index, RawStatRow::new(record.playername, stats, key));
        }
        Ok(Self { rows })
    }

    /// Loads the log, or starts an empty one when the file does not exist yet.
    pub fn load_or_new(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "stat log not found, starting a new one");
            return Ok(Self::new());
        }
        Self::load(path)
    }

    /// Full rewrite through a temp file so a crash never leaves half a log.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create data dir {}", parent.display()))?;
        }
        let tmp = path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp)
                .with_context(|| format!("create {}", tmp.display()))?;
            for (index, row) in &self.rows {
                writer
                    .serialize(LogRecord {
                        index: *index,
                        playername: row.player_name.clone(),
                        kills: row.stats.kills,
                        deaths: row.stats.deaths,
                        assists: row.stats.assists,
                        cs: row.stats.cs,
                        week: row.week,
                        matchnum: row.match_num,
                        gamenum: row.game_num,
                    })
                    .with_context(|| format!("write stat log row {index}"))?;
            }
            // Header only on an empty log, so the file is still recognisable.
            if self.rows.is_empty() {
                writer
                    .write_record([
                        "index",
                        "playername",
                        "kills",
                        "deaths",
                        "assists",
                        "cs",
                        "week",
                        "matchnum",
                        "gamenum",
                    ])
                    .context("write stat log header")?;
            }
            writer.flush().context("flush stat log")?;
        }
        fs::rename(&tmp, path).context("swap stat log")?;
        Ok(())
    }
}
