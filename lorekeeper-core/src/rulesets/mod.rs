//! Creature types per ruleset.
//!
//! Each ruleset wraps the same [`Guard`] record with its own derived
//! properties, defaults, and conversion into an encounter [`Combatant`].

pub mod adnd;
pub mod dnd5e;
pub mod pathfinder;

pub use adnd::AdndGuard;
pub use dnd5e::Dnd5eGuard;
pub use pathfinder::PathfinderGuard;

use crate::abilities::{parse_ability_table, Ability};
use crate::guard::{Creature, FieldValue, Guard, GuardError, GuardId};
use crate::properties::PropertyResolver;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported game systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ruleset {
    #[serde(alias = "dnd", alias = "5e")]
    Dnd5e,
    #[serde(alias = "pf2e")]
    Pathfinder,
    Adnd,
}

impl Ruleset {
    pub const ALL: [Ruleset; 3] = [Ruleset::Dnd5e, Ruleset::Pathfinder, Ruleset::Adnd];

    pub fn name(self) -> &'static str {
        match self {
            Ruleset::Dnd5e => "D&D 5e",
            Ruleset::Pathfinder => "Pathfinder",
            Ruleset::Adnd => "AD&D",
        }
    }

    /// A fresh default creature.
    pub fn new_guard(self) -> Result<AnyGuard, GuardError> {
        match self {
            Ruleset::Dnd5e => Ok(AnyGuard::Dnd5e(Dnd5eGuard::new())),
            Ruleset::Pathfinder => Ok(AnyGuard::Pathfinder(PathfinderGuard::new())),
            Ruleset::Adnd => Err(GuardError::NotCreatable(self.name())),
        }
    }

    /// Interpret a stored record under this ruleset.
    pub fn wrap(self, record: Guard) -> AnyGuard {
        match self {
            Ruleset::Dnd5e => AnyGuard::Dnd5e(Dnd5eGuard::from_record(record)),
            Ruleset::Pathfinder => AnyGuard::Pathfinder(PathfinderGuard::from_record(record)),
            Ruleset::Adnd => AnyGuard::Adnd(AdndGuard::from_record(record)),
        }
    }

    /// The library of common abilities offered when editing a creature.
    pub fn default_abilities(self) -> Vec<Ability> {
        match self {
            Ruleset::Dnd5e => parse_ability_table(dnd5e::DEFAULT_ABILITIES),
            Ruleset::Pathfinder => parse_ability_table(pathfinder::DEFAULT_ABILITIES),
            Ruleset::Adnd => Vec::new(),
        }
    }

    /// Icon shown next to a creature of the given type.
    pub fn icon_name(self, creature_type: &str) -> &'static str {
        match self {
            Ruleset::Dnd5e => dnd5e::icon_name(creature_type),
            Ruleset::Pathfinder => pathfinder::icon_name(creature_type),
            Ruleset::Adnd => "skull",
        }
    }
}

impl FromStr for Ruleset {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dnd" | "dnd5e" | "5e" => Ok(Ruleset::Dnd5e),
            "pathfinder" | "pf2e" => Ok(Ruleset::Pathfinder),
            "adnd" => Ok(Ruleset::Adnd),
            _ => Err(GuardError::UnknownRuleset(s.to_string())),
        }
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An encounter participant derived from a guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub guard: GuardId,
    pub name: String,
    pub initiative_roll: String,
    pub label: String,
    pub maximum_hit_points_roll: String,
    pub power: String,
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] initiative {}, hit points {}, {}",
            self.name, self.label, self.initiative_roll, self.maximum_hit_points_roll, self.power
        )
    }
}

/// A guard of any ruleset.
#[derive(Debug, Clone)]
pub enum AnyGuard {
    Dnd5e(Dnd5eGuard),
    Pathfinder(PathfinderGuard),
    Adnd(AdndGuard),
}

impl AnyGuard {
    pub fn ruleset(&self) -> Ruleset {
        match self {
            AnyGuard::Dnd5e(_) => Ruleset::Dnd5e,
            AnyGuard::Pathfinder(_) => Ruleset::Pathfinder,
            AnyGuard::Adnd(_) => Ruleset::Adnd,
        }
    }

    /// Set a field, refreshing the substitutable names if the key is new.
    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) {
        match self {
            AnyGuard::Dnd5e(guard) => guard.set(key, value),
            AnyGuard::Pathfinder(guard) => guard.set(key, value),
            AnyGuard::Adnd(guard) => guard.set(key, value),
        }
    }

    pub fn to_combatant(&self) -> Combatant {
        match self {
            AnyGuard::Dnd5e(guard) => guard.to_combatant(),
            AnyGuard::Pathfinder(guard) => guard.to_combatant(),
            AnyGuard::Adnd(guard) => guard.to_combatant(),
        }
    }

    pub fn icon_name(&self) -> &'static str {
        self.ruleset().icon_name(&self.record().text("type"))
    }

    pub fn abilities(&self) -> Vec<Ability> {
        Ability::list_for(self.record())
    }

    pub fn into_record(self) -> Guard {
        match self {
            AnyGuard::Dnd5e(guard) => guard.into_record(),
            AnyGuard::Pathfinder(guard) => guard.into_record(),
            AnyGuard::Adnd(guard) => guard.into_record(),
        }
    }
}

impl Creature for AnyGuard {
    fn record(&self) -> &Guard {
        match self {
            AnyGuard::Dnd5e(guard) => guard.record(),
            AnyGuard::Pathfinder(guard) => guard.record(),
            AnyGuard::Adnd(guard) => guard.record(),
        }
    }

    fn resolver(&self) -> &PropertyResolver {
        match self {
            AnyGuard::Dnd5e(guard) => guard.resolver(),
            AnyGuard::Pathfinder(guard) => guard.resolver(),
            AnyGuard::Adnd(guard) => guard.resolver(),
        }
    }

    fn derived(&self, name: &str) -> Option<i64> {
        match self {
            AnyGuard::Dnd5e(guard) => guard.derived(name),
            AnyGuard::Pathfinder(guard) => guard.derived(name),
            AnyGuard::Adnd(guard) => guard.derived(name),
        }
    }
}

/// Integer with an explicit sign: `+3`, `-1`, `+0`.
pub(crate) fn signed(value: i64) -> String {
    format!("{value:+}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruleset_parsing() {
        assert_eq!("dnd".parse::<Ruleset>().unwrap(), Ruleset::Dnd5e);
        assert_eq!("5E".parse::<Ruleset>().unwrap(), Ruleset::Dnd5e);
        assert_eq!("pf2e".parse::<Ruleset>().unwrap(), Ruleset::Pathfinder);
        assert_eq!("adnd".parse::<Ruleset>().unwrap(), Ruleset::Adnd);
        assert!(matches!(
            "gurps".parse::<Ruleset>(),
            Err(GuardError::UnknownRuleset(_))
        ));
    }

    #[test]
    fn test_ruleset_serde_aliases() {
        let ruleset: Ruleset = serde_json::from_str("\"dnd\"").unwrap();
        assert_eq!(ruleset, Ruleset::Dnd5e);
        assert_eq!(serde_json::to_string(&Ruleset::Pathfinder).unwrap(), "\"pathfinder\"");
    }

    #[test]
    fn test_new_guard() {
        assert!(matches!(Ruleset::Dnd5e.new_guard(), Ok(AnyGuard::Dnd5e(_))));
        assert!(matches!(
            Ruleset::Pathfinder.new_guard(),
            Ok(AnyGuard::Pathfinder(_))
        ));
        assert!(matches!(
            Ruleset::Adnd.new_guard(),
            Err(GuardError::NotCreatable("AD&D"))
        ));
    }

    #[test]
    fn test_wrap_keeps_record() {
        let mut record = Guard::new().with_id(GuardId(9));
        record.set("name", "Orc");
        let guard = Ruleset::Adnd.wrap(record.clone());
        assert_eq!(guard.ruleset(), Ruleset::Adnd);
        assert_eq!(guard.into_record(), record);
    }

    #[test]
    fn test_set_adds_new_names() {
        let mut guard = Ruleset::Pathfinder.wrap(Guard::new());
        assert_eq!(guard.render("[rank]"), "rank");
        guard.set("rank", 4);
        assert_eq!(guard.render("[rank+1]"), "5");
    }

    #[test]
    fn test_default_abilities() {
        let library = Ruleset::Dnd5e.default_abilities();
        assert!(library.iter().any(|a| a.name == "Parry"));
        assert!(!Ruleset::Pathfinder.default_abilities().is_empty());
        assert!(Ruleset::Adnd.default_abilities().is_empty());
    }
}
