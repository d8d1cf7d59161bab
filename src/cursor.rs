use std::fmt;

use serde::{Deserialize, Serialize};

use crate::slot_index::{MATCHES_PER_WEEK, match_block_start};

/// Next unit of work for a pipeline: 1-based week, 0-based match within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchCursor {
    pub week: u32,
    pub match_num: u32,
}

impl Default for MatchCursor {
    fn default() -> Self {
        Self::season_start()
    }
}

impl MatchCursor {
    pub fn new(week: u32, match_num: u32) -> Self {
        Self {
            week: week.max(1),
            match_num: match_num.min(MATCHES_PER_WEEK as u32 - 1),
        }
    }

    pub fn season_start() -> Self {
        Self {
            week: 1,
            match_num: 0,
        }
    }

    pub fn week_start(week: u32) -> Self {
        Self::new(week, 0)
    }

    /// Cursor one match further on, wrapping into the next week after match 9.
    pub fn advance(self) -> Self {
        if self.match_num as usize + 1 >= MATCHES_PER_WEEK {
            Self {
                week: self.week + 1,
                match_num: 0,
            }
        } else {
            Self {
                week: self.week,
                match_num: self.match_num + 1,
            }
        }
    }

    /// Position of this match in the season's play-ordered match list.
    pub fn ordinal(&self) -> usize {
        self.week.saturating_sub(1) as usize * MATCHES_PER_WEEK + self.match_num as usize
    }

    /// False for week 0 or a match number past the end of a week.
    pub fn is_valid(&self) -> bool {
        self.week >= 1 && (self.match_num as usize) < MATCHES_PER_WEEK
    }

    pub fn block_start(&self) -> usize {
        match_block_start(self.week, self.match_num)
    }

    pub fn matches_until(&self, later: MatchCursor) -> usize {
        later.ordinal().saturating_sub(self.ordinal())
    }
}

impl fmt::Display for MatchCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week {} match {}", self.week, self.match_num)
    }
}

/// Parses `W:M` (week, match) as used by `--skip`.
pub fn parse_match_ref(raw: &str) -> Option<MatchCursor> {
    let (week, match_num) = raw.trim().split_once(':')?;
    let week = week.trim().parse::<u32>().ok()?;
    let match_num = match_num.trim().parse::<u32>().ok()?;
    if week == 0 || match_num as usize >= MATCHES_PER_WEEK {
        return None;
    }
    Some(MatchCursor { week, match_num })
}
