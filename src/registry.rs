use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub type PlayerId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Top,
    Jng,
    Mid,
    #[serde(rename = "ADC")]
    Adc,
    Supp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub id: PlayerId,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Name -> id lookup for scraped player names, with an alias table for the
/// spellings the source uses inconsistently.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerRegistry {
    players: HashMap<String, PlayerEntry>,
    #[serde(default)]
    aliases: HashMap<String, String>,
}

const LCK_SUMMER_2024: &[(&str, PlayerId, Option<Role>)] = &[
    ("Kiin", 0, Some(Role::Top)),
    ("Zeus", 1, Some(Role::Top)),
    ("Doran", 2, Some(Role::Top)),
    ("PerfecT", 3, Some(Role::Top)),
    ("Kingen", 4, Some(Role::Top)),
    ("DuDu", 5, Some(Role::Top)),
    ("Clear", 6, Some(Role::Top)),
    ("DnDn", 7, Some(Role::Top)),
    ("Rascal", 8, Some(Role::Top)),
    ("Morgan", 9, Some(Role::Top)),
    ("Canyon", 10, Some(Role::Jng)),
    ("Oner", 11, Some(Role::Jng)),
    ("Peanut", 12, Some(Role::Jng)),
    ("Pyosik", 13, Some(Role::Jng)),
    ("Lucid", 14, Some(Role::Jng)),
    ("Cuzz", 15, Some(Role::Jng)),
    ("Willer", 16, Some(Role::Jng)),
    ("Sylvie", 17, Some(Role::Jng)),
    ("Sponge", 18, Some(Role::Jng)),
    ("YoungJae", 19, Some(Role::Jng)),
    ("Chovy", 20, Some(Role::Mid)),
    ("Faker", 21, Some(Role::Mid)),
    ("Zeka", 22, Some(Role::Mid)),
    ("Bdd", 23, Some(Role::Mid)),
    ("Showmaker", 24, Some(Role::Mid)),
    ("BuLLDoG", 25, Some(Role::Mid)),
    ("Clozer", 26, Some(Role::Mid)),
    ("Fisher", 27, Some(Role::Mid)),
    ("SeTab", 28, Some(Role::Mid)),
    ("Karis", 29, Some(Role::Mid)),
    ("Peyz", 30, Some(Role::Adc)),
    ("Gumayushi", 31, Some(Role::Adc)),
    ("Viper", 32, Some(Role::Adc)),
    ("Deft", 33, Some(Role::Adc)),
    ("Aiming", 34, Some(Role::Adc)),
    ("Bull", 35, Some(Role::Adc)),
    ("Hena", 36, Some(Role::Adc)),
    ("Jiwoo", 37, Some(Role::Adc)),
    ("Teddy", 38, Some(Role::Adc)),
    ("Envyy", 39, Some(Role::Adc)),
    ("Lehends", 40, Some(Role::Supp)),
    ("Keria", 41, Some(Role::Supp)),
    ("Delight", 42, Some(Role::Supp)),
    ("BeryL", 43, Some(Role::Supp)),
    ("Kellin", 44, Some(Role::Supp)),
    ("Andil", 45, Some(Role::Supp)),
    ("Execute", 46, Some(Role::Supp)),
    ("Peter", 47, Some(Role::Supp)),
    ("Pleata", 48, Some(Role::Supp)),
    ("Pollu", 49, Some(Role::Supp)),
    ("Mihile", 50, Some(Role::Top)),
    ("Leaper", 51, Some(Role::Adc)),
    ("Moham", 52, Some(Role::Supp)),
    ("GuGer", 53, Some(Role::Supp)),
    ("Raptor", 54, Some(Role::Jng)),
    ("Casting", 55, Some(Role::Top)),
    ("Samver", 56, Some(Role::Adc)),
    ("kyeahoo", 57, Some(Role::Mid)),
    ("Frog", 58, Some(Role::Top)),
    ("Callme", 59, Some(Role::Mid)),
    ("DDoiV", 60, Some(Role::Jng)),
    ("Pullbae", 61, Some(Role::Mid)),
    ("Duro", 62, None),
];

const LCK_ALIASES: &[(&str, &str)] = &[
    ("kingen", "Kingen"),
    ("ShowMaker", "Showmaker"),
    ("Bulldog", "BuLLDoG"),
];

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lck_default() -> Self {
        let mut registry = Self::new();
        for (name, id, role) in LCK_SUMMER_2024 {
            registry.insert(name, *id, *role);
        }
        for (variant, canonical) in LCK_ALIASES {
            registry.alias(variant, canonical);
        }
        registry
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read player registry {}", path.display()))?;
        let registry = serde_json::from_str::<PlayerRegistry>(&raw)
            .with_context(|| format!("parse player registry {}", path.display()))?;
        if registry.is_empty() {
            bail!("player registry {} lists no players", path.display());
        }
        for (variant, canonical) in &registry.aliases {
            if !registry.players.contains_key(canonical) {
                bail!(
                    "player registry {}: alias {variant:?} points at unknown player {canonical:?}",
                    path.display()
                );
            }
        }
        tracing::info!(players = registry.len(), path = %path.display(), "loaded player registry");
        Ok(registry)
    }

    pub fn insert(&mut self, name: &str, id: PlayerId, role: Option<Role>) {
        self.players
            .insert(name.to_string(), PlayerEntry { id, role });
    }

    pub fn alias(&mut self, variant: &str, canonical: &str) {
        self.aliases
            .insert(variant.to_string(), canonical.to_string());
    }

    pub fn lookup(&self, name: &str) -> Option<PlayerId> {
        self.entry(name).map(|entry| entry.id)
    }

    pub fn entry(&self, name: &str) -> Option<&PlayerEntry> {
        let name = name.trim();
        let canonical = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.players.get(canonical)
    }

    pub fn name_of(&self, id: PlayerId) -> Option<&str> {
        self.players
            .iter()
            .find(|(_, entry)| entry.id == id)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
