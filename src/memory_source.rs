use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{PipelineError, PipelineResult};
use crate::slot_index::GAMES_PER_MATCH;
use crate::source::{GameSheet, MatchListing, MatchSource};

/// In-memory [`MatchSource`] for tests, benches and offline runs.
#[derive(Debug, Default)]
pub struct MemorySource {
    listings: Vec<MatchListing>,
    links: HashMap<String, Vec<String>>,
    sheets: HashMap<String, GameSheet>,
    requests: RefCell<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a played match with both game sheets; returns its ordinal.
    pub fn push_played(&mut self, title: &str, games: [GameSheet; GAMES_PER_MATCH]) -> usize {
        let ordinal = self.listings.len();
        let match_url = format!("memory://match/{ordinal}");
        let mut links = vec![format!("{match_url}/summary")];
        for (game, sheet) in games.into_iter().enumerate() {
            let game_url = format!("{match_url}/game/{game}");
            self.sheets.insert(game_url.clone(), sheet);
            links.push(game_url);
        }
        self.links.insert(match_url.clone(), links);
        self.listings.push(listing(title, match_url));
        ordinal
    }

    /// Appends a scheduled match whose page only has the summary tab.
    pub fn push_unplayed(&mut self, title: &str) -> usize {
        let ordinal = self.listings.len();
        let match_url = format!("memory://match/{ordinal}");
        self.links
            .insert(match_url.clone(), vec![format!("{match_url}/summary")]);
        self.listings.push(listing(title, match_url));
        ordinal
    }

    pub fn replace_sheet(&mut self, ordinal: usize, game: usize, sheet: GameSheet) {
        self.sheets
            .insert(format!("memory://match/{ordinal}/game/{game}"), sheet);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    fn record(&self, url: &str) {
        self.requests.borrow_mut().push(url.to_string());
    }
}

fn listing(title: &str, url: String) -> MatchListing {
    let (team_blue, team_red) = title
        .split_once(" vs ")
        .map(|(a, b)| (a.trim().to_string(), b.trim().to_string()))
        .unwrap_or_default();
    MatchListing {
        url: Some(url),
        title: title.to_string(),
        team_blue,
        team_red,
        ..MatchListing::default()
    }
}

impl MatchSource for MemorySource {
    fn match_list(&self) -> PipelineResult<Vec<MatchListing>> {
        self.record("memory://matchlist");
        Ok(self.listings.clone())
    }

    fn game_links(&self, match_url: &str) -> PipelineResult<Vec<String>> {
        self.record(match_url);
        self.links
            .get(match_url)
            .cloned()
            .ok_or_else(|| PipelineError::transport(match_url, "404 Not Found"))
    }

    fn game_sheet(&self, game_url: &str) -> PipelineResult<GameSheet> {
        self.record(game_url);
        self.sheets
            .get(game_url)
            .cloned()
            .ok_or_else(|| PipelineError::transport(game_url, "404 Not Found"))
    }
}
