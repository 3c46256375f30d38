//! Bestiary persistence.
//!
//! A bestiary is one ruleset's table of guards, saved as human-readable JSON.

use crate::guard::{Guard, GuardId};
use crate::rulesets::{AnyGuard, Ruleset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current bestiary file version.
const BESTIARY_VERSION: u32 = 1;

/// The guards of one ruleset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bestiary {
    /// File format version for compatibility checking.
    pub version: u32,

    /// Ruleset every guard in this file belongs to.
    pub ruleset: Ruleset,

    /// Guard records in table order.
    #[serde(default)]
    pub guards: Vec<Guard>,
}

impl Bestiary {
    pub fn new(ruleset: Ruleset) -> Self {
        Self {
            version: BESTIARY_VERSION,
            ruleset,
            guards: Vec::new(),
        }
    }

    /// Add a guard, assigning the next free id if it has none yet.
    pub fn add(&mut self, mut guard: Guard) -> GuardId {
        if !guard.id.is_stored() {
            guard.id = self.next_id();
        }
        let id = guard.id;
        self.guards.push(guard);
        id
    }

    /// One past the highest stored id, or the lowest free id once that
    /// would overflow.
    fn next_id(&self) -> GuardId {
        let highest = self.guards.iter().map(|g| g.id.0).max().unwrap_or(0);
        let next = highest.checked_add(1).or_else(|| {
            (1..u64::MAX).find(|id| self.guards.iter().all(|g| g.id.0 != *id))
        });
        GuardId(next.unwrap_or(u64::MAX))
    }

    pub fn get(&self, id: GuardId) -> Option<&Guard> {
        self.guards.iter().find(|g| g.id == id)
    }

    /// Find a guard by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&Guard> {
        let name = name.trim().to_lowercase();
        self.guards.iter().find(|g| g.name().to_lowercase() == name)
    }

    /// Find a guard by name and interpret it under this bestiary's ruleset.
    pub fn creature(&self, name: &str) -> Option<AnyGuard> {
        self.find(name).cloned().map(|g| self.ruleset.wrap(g))
    }

    pub fn names(&self) -> impl Iterator<Item = String> + '_ {
        self.guards.iter().map(Guard::name)
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        tracing::info!(path = %path.display(), guards = self.guards.len(), "saved bestiary");
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let bestiary: Self = serde_json::from_str(&content)?;

        if bestiary.version != BESTIARY_VERSION {
            tracing::warn!(
                path = %path.display(),
                found = bestiary.version,
                "unsupported bestiary version"
            );
            return Err(PersistError::VersionMismatch {
                expected: BESTIARY_VERSION,
                found: bestiary.version,
            });
        }

        tracing::info!(
            path = %path.display(),
            ruleset = %bestiary.ruleset,
            guards = bestiary.guards.len(),
            "loaded bestiary"
        );
        Ok(bestiary)
    }

    /// Read only the ruleset of a bestiary file.
    pub async fn peek_ruleset(path: impl AsRef<Path>) -> Result<Ruleset, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            ruleset: Ruleset,
        }

        let partial: Partial = serde_json::from_str(&content)?;

        if partial.version != BESTIARY_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: BESTIARY_VERSION,
                found: partial.version,
            });
        }

        Ok(partial.ruleset)
    }
}

/// Generate a file path for a bestiary.
pub fn bestiary_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    let sanitized = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    dir.as_ref().join(format!("{sanitized}.json"))
}
