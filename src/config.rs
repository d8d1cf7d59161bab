use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::cursor::MatchCursor;
use crate::gol_source::DEFAULT_BASE_URL;
use crate::ingest::DEFAULT_MAX_MATCHES;
use crate::registry::PlayerRegistry;

pub const DEFAULT_SEASON: &str = "LCK Summer 2024";

const LOG_FILE: &str = "rawstats.csv";
const STATE_FILE: &str = "pipeline_state.json";
const DB_FILE: &str = "stats.sqlite";

/// Everything one run needs, built once by the binary and passed down.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub season: String,
    pub base_url: String,
    pub registry_path: Option<PathBuf>,
    /// Matches that will never be played; both pipelines step over them.
    pub skipped_matches: BTreeSet<MatchCursor>,
}

impl RunConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            season: DEFAULT_SEASON.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            registry_path: None,
            skipped_matches: BTreeSet::new(),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    pub fn load_registry(&self) -> Result<PlayerRegistry> {
        match &self.registry_path {
            Some(path) => PlayerRegistry::load(path),
            None => Ok(PlayerRegistry::lck_default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub force_restart: bool,
    /// Non-empty selects strict mode.
    pub weeks: Vec<u32>,
    pub max_matches: usize,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            force_restart: false,
            weeks: Vec::new(),
            max_matches: DEFAULT_MAX_MATCHES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// When false nothing is written: the store is untouched and the cursor stays.
    pub commit: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self { commit: true }
    }
}

/// Parses `3,4 5;6` style week lists. Any token that is not a week number
/// fails the whole list.
pub fn parse_weeks(raw: &str) -> Result<Vec<u32>> {
    let mut weeks = Vec::new();
    for part in raw.split([',', ';', ' ']).map(str::trim) {
        if part.is_empty() {
            continue;
        }
        match part.parse::<u32>() {
            Ok(week) if week >= 1 => weeks.push(week),
            _ => bail!("invalid week {part:?} in {raw:?}, expected numbers from 1"),
        }
    }
    if weeks.is_empty() {
        bail!("no weeks given in {raw:?}");
    }
    Ok(weeks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_weeks_works() {
        assert_eq!(parse_weeks("3,4").unwrap(), vec![3, 4]);
        assert_eq!(parse_weeks(" 1; 2  5").unwrap(), vec![1, 2, 5]);
        assert_eq!(parse_weeks("3, 4").unwrap(), vec![3, 4]);
    }

    #[test]
    fn parse_weeks_rejects_bad_tokens() {
        assert!(parse_weeks("abc").is_err());
        assert!(parse_weeks("3,x").is_err());
        assert!(parse_weeks("0").is_err());
        assert!(parse_weeks("").is_err());
        assert!(parse_weeks(" , ").is_err());
    }

    #[test]
    fn derived_paths_live_in_data_dir() {
        let config = RunConfig::new("/tmp/lck");
        assert_eq!(config.log_path(), PathBuf::from("/tmp/lck/rawstats.csv"));
        assert_eq!(config.state_path(), PathBuf::from("/tmp/lck/pipeline_state.json"));
        assert_eq!(config.db_path(), PathBuf::from("/tmp/lck/stats.sqlite"));
    }
}
