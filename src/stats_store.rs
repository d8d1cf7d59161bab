use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{info, warn};

use crate::aggregate::{AggregationOutcome, PlayerWeekAggregate};
use crate::cursor::MatchCursor;
use crate::registry::PlayerId;

/// Weekly deltas covering the aggregation range `[from, to)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsBatch {
    pub from: MatchCursor,
    pub to: MatchCursor,
    pub updates: Vec<PlayerWeekAggregate>,
}

impl From<&AggregationOutcome> for StatsBatch {
    fn from(outcome: &AggregationOutcome) -> Self {
        Self {
            from: outcome.from,
            to: outcome.next_cursor,
            updates: outcome.aggregates.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { rows: usize },
    AlreadyApplied,
}

/// Downstream per-player weekly stats.
pub trait StatsStore {
    fn apply(&mut self, batch: &StatsBatch) -> Result<ApplyOutcome>;

    /// End of the last batch this store committed, if it tracks one.
    fn watermark(&self) -> Result<Option<MatchCursor>> {
        Ok(None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredWeekStats {
    pub player_id: PlayerId,
    pub week: u32,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub cs: i64,
    pub points: i64,
    pub games_played: i64,
}

/// SQLite stats store. Deltas and the store watermark commit together, and a
/// batch that does not start at the watermark is not applied again.
pub struct SqliteStatsStore {
    conn: Connection,
}

impl SqliteStatsStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create data dir {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open sqlite db {}", path.display()))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn weekly_rows(&self) -> Result<Vec<StoredWeekStats>> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
                SELECT player_id, week, kills, deaths, assists, cs, points, games_played
                FROM weekly_stats
                ORDER BY week ASC, player_id ASC
                "#,
            )
            .context("prepare weekly stats query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StoredWeekStats {
                    player_id: row.get::<_, u32>(0)?,
                    week: row.get::<_, u32>(1)?,
                    kills: row.get(2)?,
                    deaths: row.get(3)?,
                    assists: row.get(4)?,
                    cs: row.get(5)?,
                    points: row.get(6)?,
                    games_played: row.get(7)?,
                })
            })
            .context("query weekly stats")?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("decode weekly stats row")?);
        }
        Ok(out)
    }

    pub fn week_row(&self, player_id: PlayerId, week: u32) -> Result<Option<StoredWeekStats>> {
        Ok(self
            .weekly_rows()?
            .into_iter()
            .find(|row| row.player_id == player_id && row.week == week))
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS weekly_stats (
            player_id INTEGER NOT NULL,
            week INTEGER NOT NULL,
            kills INTEGER NOT NULL,
            deaths INTEGER NOT NULL,
            assists INTEGER NOT NULL,
            cs INTEGER NOT NULL,
            points INTEGER NOT NULL,
            games_played INTEGER NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (player_id, week)
        );
        CREATE INDEX IF NOT EXISTS idx_weekly_stats_week ON weekly_stats(week);

        CREATE TABLE IF NOT EXISTS store_watermark (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            week INTEGER NOT NULL,
            match_num INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS aggregation_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            applied_at TEXT NOT NULL,
            from_week INTEGER NOT NULL,
            from_match INTEGER NOT NULL,
            to_week INTEGER NOT NULL,
            to_match INTEGER NOT NULL,
            rows_updated INTEGER NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

fn read_watermark(conn: &Connection) -> Result<Option<MatchCursor>> {
    conn.query_row(
        "SELECT week, match_num FROM store_watermark WHERE id = 1",
        [],
        |row| {
            Ok(MatchCursor {
                week: row.get::<_, u32>(0)?,
                match_num: row.get::<_, u32>(1)?,
            })
        },
    )
    .optional()
    .context("query store watermark")
}

impl StatsStore for SqliteStatsStore {
    fn apply(&mut self, batch: &StatsBatch) -> Result<ApplyOutcome> {
        let tx = self.conn.transaction().context("begin stats transaction")?;

        if let Some(mark) = read_watermark(&tx)? {
            if mark >= batch.to && batch.to > batch.from {
                warn!(
                    watermark = %mark,
                    from = %batch.from,
                    to = %batch.to,
                    "batch already applied"
                );
                return Ok(ApplyOutcome::AlreadyApplied);
            }
            if mark != batch.from {
                return Err(anyhow!(
                    "stats store is at {mark}, refusing batch starting at {}",
                    batch.from
                ));
            }
        }

        let now = Utc::now().to_rfc3339();
        for update in &batch.updates {
            tx.execute(
                r#"
                INSERT INTO weekly_stats (
                    player_id, week, kills, deaths, assists, cs, points, games_played, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(player_id, week) DO UPDATE SET
                    kills = kills + excluded.kills,
                    deaths = deaths + excluded.deaths,
                    assists = assists + excluded.assists,
                    cs = cs + excluded.cs,
                    points = points + excluded.points,
                    games_played = games_played + excluded.games_played,
                    updated_at = excluded.updated_at
                "#,
                params![
                    update.player_id as i64,
                    update.week as i64,
                    update.kills as i64,
                    update.deaths as i64,
                    update.assists as i64,
                    update.cs as i64,
                    update.points,
                    update.games_played as i64,
                    now,
                ],
            )
            .context("upsert weekly stats")?;
        }

        tx.execute(
            r#"
            INSERT INTO store_watermark (id, week, match_num) VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET week = excluded.week, match_num = excluded.match_num
            "#,
            params![batch.to.week as i64, batch.to.match_num as i64],
        )
        .context("update store watermark")?;

        tx.execute(
            r#"
            INSERT INTO aggregation_runs (
                applied_at, from_week, from_match, to_week, to_match, rows_updated
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                now,
                batch.from.week as i64,
                batch.from.match_num as i64,
                batch.to.week as i64,
                batch.to.match_num as i64,
                batch.updates.len() as i64
            ],
        )
        .context("insert aggregation run")?;

        tx.commit().context("commit stats transaction")?;
        info!(rows = batch.updates.len(), to = %batch.to, "applied stats batch");
        Ok(ApplyOutcome::Applied {
            rows: batch.updates.len(),
        })
    }

    fn watermark(&self) -> Result<Option<MatchCursor>> {
        read_watermark(&self.conn)
    }
}

/// Writes each weekly delta as an incremental `UPDATE Stats` statement for a
/// store this crate does not own. Replaying the script double-applies it.
pub struct SqlScriptSink<W: Write> {
    out: W,
}

impl<W: Write> SqlScriptSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn update_statement(update: &PlayerWeekAggregate) -> String {
    format!(
        "UPDATE Stats SET kills = kills + {}, deaths = deaths + {}, assists = assists + {}, cs = cs + {}, points = ROUND(points + {}, 2), gamesPlayed = gamesPlayed + {} WHERE playerID = {} AND week = {};",
        update.kills,
        update.deaths,
        update.assists,
        update.cs,
        update.points,
        update.games_played,
        update.player_id,
        update.week
    )
}

impl<W: Write> StatsStore for SqlScriptSink<W> {
    fn apply(&mut self, batch: &StatsBatch) -> Result<ApplyOutcome> {
        for update in &batch.updates {
            writeln!(self.out, "{}", update_statement(update)).context("write update statement")?;
        }
        self.out.flush().context("flush update statements")?;
        Ok(ApplyOutcome::Applied {
            rows: batch.updates.len(),
        })
    }
}
