//! Row addressing for the raw stat log.
//!
//! Every statline has exactly one home in the log, derived from where it was
//! played: `200*(week-1) + 20*match + 10*game + slot + 1`. Index 0 is never a
//! data row. Re-ingesting a slot lands on the same index and overwrites it,
//! which is what makes ingestion idempotent.

use serde::{Deserialize, Serialize};

pub const PLAYERS_PER_GAME: usize = 10;
pub const GAMES_PER_MATCH: usize = 2;
pub const MATCHES_PER_WEEK: usize = 10;

pub const ROWS_PER_MATCH: usize = PLAYERS_PER_GAME * GAMES_PER_MATCH;
pub const ROWS_PER_WEEK: usize = ROWS_PER_MATCH * MATCHES_PER_WEEK;

/// Position of one statline: 1-based week, 0-based match, game and slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub week: u32,
    pub match_num: u32,
    pub game_num: u32,
    pub slot: u32,
}

impl SlotKey {
    pub fn new(week: u32, match_num: u32, game_num: u32, slot: u32) -> Option<Self> {
        let key = Self {
            week,
            match_num,
            game_num,
            slot,
        };
        key.is_valid().then_some(key)
    }

    pub fn is_valid(&self) -> bool {
        self.week >= 1
            && (self.match_num as usize) < MATCHES_PER_WEEK
            && (self.game_num as usize) < GAMES_PER_MATCH
            && (self.slot as usize) < PLAYERS_PER_GAME
    }

    pub fn to_index(&self) -> usize {
        to_index(self.week, self.match_num, self.game_num, self.slot)
    }
}

/// Log index for a slot. Callers must pass a valid tuple (see [`SlotKey::is_valid`]).
pub fn to_index(week: u32, match_num: u32, game_num: u32, slot: u32) -> usize {
    debug_assert!(week >= 1, "weeks are 1-based");
    ROWS_PER_WEEK * (week as usize - 1)
        + ROWS_PER_MATCH * match_num as usize
        + PLAYERS_PER_GAME * game_num as usize
        + slot as usize
        + 1
}

/// Inverse of [`to_index`]. Returns `None` for the reserved index 0.
pub fn from_index(index: usize) -> Option<SlotKey> {
    let offset = index.checked_sub(1)?;
    let week = offset / ROWS_PER_WEEK + 1;
    let in_week = offset % ROWS_PER_WEEK;
    let match_num = in_week / ROWS_PER_MATCH;
    let in_match = in_week % ROWS_PER_MATCH;
    let game_num = in_match / PLAYERS_PER_GAME;
    let slot = in_match % PLAYERS_PER_GAME;
    Some(SlotKey {
        week: u32::try_from(week).ok()?,
        match_num: match_num as u32,
        game_num: game_num as u32,
        slot: slot as u32,
    })
}

/// First log index of a match block (game 0, slot 0).
pub fn match_block_start(week: u32, match_num: u32) -> usize {
    to_index(week, match_num, 0, 0)
}
