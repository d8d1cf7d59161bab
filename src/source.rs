use crate::error::{PipelineError, PipelineResult};
use crate::slot_index::{GAMES_PER_MATCH, PLAYERS_PER_GAME};
use crate::stat_row::{StatLine, parse_kda};

/// A match page lists a summary tab plus one tab per game; fewer than this
/// many tabs means the match has not been played yet.
pub const MIN_GAME_LINKS: usize = GAMES_PER_MATCH + 1;

/// One row of the season match list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchListing {
    pub url: Option<String>,
    pub title: String,
    pub team_blue: String,
    pub team_red: String,
    pub score: String,
    pub week_label: String,
    pub patch: String,
    pub date: String,
}

/// The three per-player columns scraped from a game page, still as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSheet {
    pub players: Vec<String>,
    pub kdas: Vec<String>,
    pub cs: Vec<String>,
}

impl GameSheet {
    /// Checks the fixed ten-player shape and parses every statline.
    pub fn statlines(&self, url: &str) -> PipelineResult<Vec<(String, StatLine)>> {
        for (field, actual) in [
            ("players", self.players.len()),
            ("kda cells", self.kdas.len()),
            ("cs cells", self.cs.len()),
        ] {
            if actual != PLAYERS_PER_GAME {
                return Err(PipelineError::ParseShapeMismatch {
                    url: url.to_string(),
                    field,
                    expected: PLAYERS_PER_GAME,
                    actual,
                });
            }
        }

        self.players
            .iter()
            .zip(self.kdas.iter().zip(&self.cs))
            .enumerate()
            .map(|(slot, (name, (kda, cs)))| {
                let line = parse_kda(kda, cs).map_err(|err| PipelineError::MalformedStat {
                    url: url.to_string(),
                    slot,
                    field: err.field(),
                    raw: format!("{kda} / {cs}"),
                })?;
                Ok((name.trim().to_string(), line))
            })
            .collect()
    }
}

/// Where match data comes from. Every call is a blocking fetch.
pub trait MatchSource {
    /// Season matches in play order (oldest first).
    fn match_list(&self) -> PipelineResult<Vec<MatchListing>>;

    /// Tab links of a match page: summary first, then one per game played.
    fn game_links(&self, match_url: &str) -> PipelineResult<Vec<String>>;

    fn game_sheet(&self, game_url: &str) -> PipelineResult<GameSheet>;
}
