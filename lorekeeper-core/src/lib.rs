//! Creature records and stat-text templating for tabletop campaigns.
//!
//! This crate provides:
//! - Creature ("guard") records with ordered, string-keyed fields
//! - A static property registry per ruleset (`#[stat_properties]`)
//! - The bracket templating engine that turns authored ability text into
//!   finished sentences for one creature
//! - Plain-text stat blocks and bestiary persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use lorekeeper_core::{Creature, Dnd5eGuard};
//!
//! let mut goblin = Dnd5eGuard::new();
//! goblin.set("name", "Goblin");
//!
//! let text = goblin.render("[Name] hits for 1d6[+finesse] damage.");
//! assert_eq!(text, "The goblin hits for 1d6 damage.");
//! ```

// Lets `#[stat_properties]` expansions inside this crate name it by path.
extern crate self as lorekeeper_core;

pub mod abilities;
pub mod dice;
pub mod expr;
pub mod guard;
pub mod persist;
pub mod properties;
pub mod rulesets;
pub mod stat_block;
pub mod template;
pub mod testing;

pub use lorekeeper_macros::stat_properties;

// Primary public API
pub use abilities::{Ability, AbilityDetails, AbilityKind};
pub use guard::{Creature, FieldValue, Fields, Gender, Guard, GuardError, GuardId};
pub use persist::{Bestiary, PersistError};
pub use properties::{PropertyResolver, PropertyTable};
pub use rulesets::{AdndGuard, AnyGuard, Combatant, Dnd5eGuard, PathfinderGuard, Ruleset};
pub use stat_block::{StatBlock, StatLine};
pub use template::render;
