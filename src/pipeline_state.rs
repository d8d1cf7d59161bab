use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cursor::MatchCursor;

const STATE_VERSION: u32 = 1;

/// Both pipeline cursors, kept in their own document next to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    pub version: u32,
    pub ingestion: MatchCursor,
    pub aggregation: MatchCursor,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            ingestion: MatchCursor::season_start(),
            aggregation: MatchCursor::season_start(),
            updated_at: None,
        }
    }
}

impl PipelineState {
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("read {}", path.display()));
            }
        };
        let state = serde_json::from_str::<PipelineState>(&raw)
            .with_context(|| format!("parse pipeline state {}", path.display()))?;
        if state.version != STATE_VERSION {
            return Err(anyhow!(
                "pipeline state {} has version {}, expected {}",
                path.display(),
                state.version,
                STATE_VERSION
            ));
        }
        for (name, cursor) in [("ingestion", state.ingestion), ("aggregation", state.aggregation)] {
            if !cursor.is_valid() {
                return Err(anyhow!(
                    "pipeline state {} has {name} cursor week {} match {} out of range",
                    path.display(),
                    cursor.week,
                    cursor.match_num
                ));
            }
        }
        Ok(state)
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create data dir {}", parent.display()))?;
        }
        self.version = STATE_VERSION;
        self.updated_at = Some(Utc::now().to_rfc3339());
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).context("serialize pipeline state")?;
        fs::write(&tmp, json).context("write pipeline state")?;
        fs::rename(&tmp, path).context("swap pipeline state")?;
        Ok(())
    }
}
