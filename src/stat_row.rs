use serde::{Deserialize, Serialize};

use crate::slot_index::SlotKey;

/// One player's numbers for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatLine {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub cs: u32,
}

impl StatLine {
    pub fn points(&self) -> i64 {
        crate::scoring::points(self.kills, self.deaths, self.assists, self.cs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatRow {
    pub player_name: String,
    pub stats: StatLine,
    pub week: u32,
    pub match_num: u32,
    pub game_num: u32,
}

impl RawStatRow {
    pub fn new(player_name: impl Into<String>, stats: StatLine, key: SlotKey) -> Self {
        Self {
            player_name: player_name.into(),
            stats,
            week: key.week,
            match_num: key.match_num,
            game_num: key.game_num,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdaError {
    MissingSeparator,
    Kills,
    Deaths,
    Assists,
    Cs,
}

impl KdaError {
    pub fn field(&self) -> &'static str {
        match self {
            KdaError::MissingSeparator => "kda",
            KdaError::Kills => "kills",
            KdaError::Deaths => "deaths",
            KdaError::Assists => "assists",
            KdaError::Cs => "cs",
        }
    }
}

/// Parses a `"K/D/A"` cell plus its separate CS cell.
///
/// Only the first two `/` split the string; anything after the second one
/// belongs to assists and must itself be numeric.
pub fn parse_kda(kda: &str, cs: &str) -> Result<StatLine, KdaError> {
    let (kills, rest) = kda.split_once('/').ok_or(KdaError::MissingSeparator)?;
    let (deaths, assists) = rest.split_once('/').ok_or(KdaError::MissingSeparator)?;

    Ok(StatLine {
        kills: parse_count(kills).ok_or(KdaError::Kills)?,
        deaths: parse_count(deaths).ok_or(KdaError::Deaths)?,
        assists: parse_count(assists).ok_or(KdaError::Assists)?,
        cs: parse_count(cs).ok_or(KdaError::Cs)?,
    })
}

fn parse_count(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<u32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kda_works() {
        assert_eq!(
            parse_kda("7/2/5", "210"),
            Ok(StatLine {
                kills: 7,
                deaths: 2,
                assists: 5,
                cs: 210
            })
        );
        assert_eq!(
            parse_kda(" 10/0/12 ", " 301 ").map(|s| s.cs),
            Ok(301)
        );
    }

    #[test]
    fn parse_kda_rejects_bad_shapes() {
        assert_eq!(parse_kda("invalid", "0"), Err(KdaError::MissingSeparator));
        assert_eq!(parse_kda("7/2", "0"), Err(KdaError::MissingSeparator));
        assert_eq!(parse_kda("7/x/5", "0"), Err(KdaError::Deaths));
        assert_eq!(parse_kda("7/2/5/1", "0"), Err(KdaError::Assists));
        assert_eq!(parse_kda("-1/2/5", "0"), Err(KdaError::Kills));
        assert_eq!(parse_kda("1/2/5", "1.5"), Err(KdaError::Cs));
    }
}
