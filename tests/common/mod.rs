#![allow(dead_code)]

use lck_fantasy::memory_source::MemorySource;
use lck_fantasy::source::GameSheet;

pub const BLUE: [&str; 5] = ["Kiin", "Canyon", "Chovy", "Peyz", "Lehends"];
pub const RED: [&str; 5] = ["Zeus", "Oner", "Faker", "Gumayushi", "Keria"];

/// Deterministic statline for a slot so expected sums can be recomputed.
pub fn kda_for(ordinal: usize, game: usize, slot: usize) -> (u32, u32, u32, u32) {
    let seed = (ordinal * 31 + game * 7 + slot * 3) as u32;
    (seed % 9, (seed / 3) % 6, (seed * 5) % 13, 150 + (seed * 11) % 190)
}

pub fn sheet(ordinal: usize, game: usize) -> GameSheet {
    let mut out = GameSheet::default();
    for (slot, name) in BLUE.iter().chain(RED.iter()).enumerate() {
        let (k, d, a, cs) = kda_for(ordinal, game, slot);
        out.players.push(name.to_string());
        out.kdas.push(format!("{k}/{d}/{a}"));
        out.cs.push(cs.to_string());
    }
    out
}

/// Season source with `played` completed matches followed by `unplayed`
/// scheduled ones.
pub fn season(played: usize, unplayed: usize) -> MemorySource {
    let mut source = MemorySource::new();
    for ordinal in 0..played {
        source.push_played("GEN vs T1", [sheet(ordinal, 0), sheet(ordinal, 1)]);
    }
    for _ in 0..unplayed {
        source.push_unplayed("HLE vs DK");
    }
    source
}
