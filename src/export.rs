use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::registry::{PlayerId, PlayerRegistry};
use crate::stats_store::StoredWeekStats;

pub struct ExportReport {
    pub weekly_rows: usize,
    pub players: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

#[derive(Default)]
struct SeasonTotals {
    kills: i64,
    deaths: i64,
    assists: i64,
    cs: i64,
    points: i64,
    games_played: i64,
    weeks: i64,
}

pub fn export_standings(
    path: &Path,
    rows: &[StoredWeekStats],
    registry: &PlayerRegistry,
) -> Result<ExportReport> {
    let name_of = |id: PlayerId| {
        registry
            .name_of(id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{id}"))
    };

    let mut weekly_rows = vec![header(&["Week", "Player ID", "Player"], &[])];
    let mut season: BTreeMap<PlayerId, SeasonTotals> = BTreeMap::new();
    for row in rows {
        let mut line = vec![
            Cell::from(i64::from(row.week)),
            Cell::from(i64::from(row.player_id)),
            Cell::from(name_of(row.player_id)),
        ];
        line.extend(stat_cells(
            row.kills,
            row.deaths,
            row.assists,
            row.cs,
            row.points,
            row.games_played,
        ));
        weekly_rows.push(line);

        let totals = season.entry(row.player_id).or_default();
        totals.kills += row.kills;
        totals.deaths += row.deaths;
        totals.assists += row.assists;
        totals.cs += row.cs;
        totals.points += row.points;
        totals.games_played += row.games_played;
        totals.weeks += 1;
    }

    let mut ranked = season.into_iter().collect::<Vec<_>>();
    ranked.sort_by(|(a_id, a), (b_id, b)| b.points.cmp(&a.points).then(a_id.cmp(b_id)));

    let mut season_rows = vec![header(&["Rank", "Player ID", "Player"], &["Weeks"])];
    for (rank, (id, totals)) in ranked.iter().enumerate() {
        let mut line = vec![
            Cell::from(rank as i64 + 1),
            Cell::from(i64::from(*id)),
            Cell::from(name_of(*id)),
        ];
        line.extend(stat_cells(
            totals.kills,
            totals.deaths,
            totals.assists,
            totals.cs,
            totals.points,
            totals.games_played,
        ));
        line.push(Cell::from(totals.weeks));
        season_rows.push(line);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Weekly")?;
        write_rows(sheet, &weekly_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Season")?;
        write_rows(sheet, &season_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        weekly_rows: rows.len(),
        players: ranked.len(),
    })
}

fn header(lead: &[&str], trail: &[&str]) -> Vec<Cell> {
    lead.iter()
        .chain(["Kills", "Deaths", "Assists", "CS", "Points", "Games"].iter())
        .chain(trail.iter())
        .map(|s| Cell::from(*s))
        .collect()
}

fn stat_cells(
    kills: i64,
    deaths: i64,
    assists: i64,
    cs: i64,
    points: i64,
    games: i64,
) -> [Cell; 6] {
    [kills, deaths, assists, cs, points, games].map(Cell::from)
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match cell {
                Cell::Text(value) => worksheet.write_string(r, c, value),
                Cell::Number(value) => worksheet.write_number(r, c, *value),
            }
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
