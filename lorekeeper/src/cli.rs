//! Command line mode.
//!
//! Prints rendered ability text, stat blocks, and combatant summaries for a
//! single creature, either read from a bestiary file or freshly created.

use lorekeeper_core::{
    AnyGuard, Bestiary, Creature, GuardError, PersistError, Ruleset, StatBlock,
};
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the user by the command line mode.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("No creature selected: pass --bestiary <FILE> --guard <NAME> or --new <RULESET>")]
    NoCreature,

    #[error("--bestiary needs --guard <NAME>")]
    MissingGuard,

    #[error("No guard named '{name}' in {path}")]
    UnknownGuard { name: String, path: String },

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// What to print, and for which creature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    pub bestiary: Option<PathBuf>,
    pub guard: Option<String>,
    pub new_ruleset: Option<String>,
    pub text: Option<String>,
    pub stat_block: bool,
    pub combatant: bool,
}

impl CliConfig {
    pub fn with_bestiary(mut self, path: impl Into<PathBuf>) -> Self {
        self.bestiary = Some(path.into());
        self
    }

    pub fn with_guard(mut self, name: impl Into<String>) -> Self {
        self.guard = Some(name.into());
        self
    }

    pub fn with_new(mut self, ruleset: impl Into<String>) -> Self {
        self.new_ruleset = Some(ruleset.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_stat_block(mut self) -> Self {
        self.stat_block = true;
        self
    }

    pub fn with_combatant(mut self) -> Self {
        self.combatant = true;
        self
    }

    /// The stat block is printed when asked for, or when nothing else is.
    pub fn wants_stat_block(&self) -> bool {
        self.stat_block || (self.text.is_none() && !self.combatant)
    }
}

/// Parse the configuration from command line arguments.
pub fn parse_config_from_args(args: &[String]) -> CliConfig {
    let mut config = CliConfig::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--bestiary" => {
                if let Some(path) = args.get(i + 1) {
                    config.bestiary = Some(PathBuf::from(path));
                    i += 1;
                }
            }
            "--guard" => {
                if let Some(name) = args.get(i + 1) {
                    config.guard = Some(name.clone());
                    i += 1;
                }
            }
            "--new" => {
                if let Some(ruleset) = args.get(i + 1) {
                    config.new_ruleset = Some(ruleset.clone());
                    i += 1;
                }
            }
            "--text" => {
                if let Some(text) = args.get(i + 1) {
                    config.text = Some(text.clone());
                    i += 1;
                }
            }
            "--stat-block" => config.stat_block = true,
            "--combatant" => config.combatant = true,
            _ => {}
        }
        i += 1;
    }

    config
}

/// Select the creature named by the configuration.
async fn load_creature(config: &CliConfig) -> Result<AnyGuard, CliError> {
    if let Some(ruleset) = &config.new_ruleset {
        let ruleset: Ruleset = ruleset.parse()?;
        return Ok(ruleset.new_guard()?);
    }

    let path = config.bestiary.as_ref().ok_or(CliError::NoCreature)?;
    let name = config.guard.as_deref().ok_or(CliError::MissingGuard)?;

    let bestiary = Bestiary::load_json(path).await?;
    bestiary
        .creature(name)
        .ok_or_else(|| CliError::UnknownGuard {
            name: name.to_string(),
            path: path.display().to_string(),
        })
}

/// Produce everything the configuration asks for, in a fixed order:
/// rendered text, stat block, combatant summary.
pub async fn run(config: &CliConfig) -> Result<String, CliError> {
    let guard = load_creature(config).await?;
    tracing::debug!(name = %guard.record().name(), ruleset = %guard.ruleset(), "selected guard");

    let mut sections = Vec::new();
    if let Some(text) = &config.text {
        sections.push(guard.render(text));
    }
    if config.wants_stat_block() {
        sections.push(StatBlock::for_guard(&guard).to_string());
    }
    if config.combatant {
        sections.push(guard.to_combatant().to_string());
    }

    Ok(sections.join("\n\n"))
}
