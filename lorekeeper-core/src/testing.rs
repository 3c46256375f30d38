//! Testing utilities.
//!
//! This module provides fixtures for unit and integration tests:
//! - `GuardBuilder` for assembling records field by field
//! - Sample creatures with well-known stat blocks
//! - A sample bestiary holding them

use crate::abilities::{Ability, AbilityKind};
use crate::guard::{FieldValue, Guard};
use crate::persist::Bestiary;
use crate::rulesets::{AnyGuard, Ruleset};

/// Builds a guard record for a ruleset.
///
/// Starts from the ruleset's default creature where one exists, so every
/// field the stat block reads is present.
#[derive(Debug, Clone)]
pub struct GuardBuilder {
    ruleset: Ruleset,
    record: Guard,
}

impl GuardBuilder {
    pub fn new(ruleset: Ruleset) -> Self {
        let record = ruleset
            .new_guard()
            .map(AnyGuard::into_record)
            .unwrap_or_default();
        Self { ruleset, record }
    }

    pub fn field(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.record.set(key, value);
        self
    }

    /// Store the given abilities as the record's JSON ability list.
    pub fn abilities(mut self, abilities: &[Ability]) -> Self {
        let json = Ability::list_to_json(abilities).unwrap_or_default();
        self.record.set("abilities", json);
        self
    }

    pub fn record(self) -> Guard {
        self.record
    }

    pub fn build(self) -> AnyGuard {
        self.ruleset.wrap(self.record)
    }
}

/// An ability whose title is its name.
pub fn ability(name: &str, kind: AbilityKind, priority: i64, text: &str) -> Ability {
    Ability {
        name: name.to_string(),
        title: name.to_string(),
        kind,
        priority,
        text: text.to_string(),
        actions: None,
    }
}

/// A D&D 5e goblin (CR 1/4), narrated as "the goblin".
pub fn sample_goblin() -> AnyGuard {
    GuardBuilder::new(Ruleset::Dnd5e)
        .field("name", "Goblin")
        .field("gender", 2)
        .field("type", "humanoid")
        .field("subtype", "goblinoid")
        .field("size", "small")
        .field("alignment", "neutral evil")
        .field("armor_class", "15 (leather armor, shield)")
        .field("hit_dice", "2d6")
        .field("strength", 8)
        .field("dexterity", 14)
        .field("constitution", 10)
        .field("intelligence", 10)
        .field("wisdom", 8)
        .field("charisma", 8)
        .field("skills", "Stealth +6")
        .field("senses", "darkvision 60 ft.")
        .field("languages", "Common, Goblin")
        .field("challenge", "1/4")
        .abilities(&[
            ability(
                "Nimble Escape",
                AbilityKind::Bonus,
                0,
                "[Name] can take the Disengage or Hide action as a bonus action on each of [his/her/its] turns.",
            ),
            ability(
                "Scimitar",
                AbilityKind::Action,
                1,
                "<i>Melee Weapon Attack:</i> [+prof+finesse] to hit, reach 5 ft., one target. <i>Hit:</i> 1d6[+finesse] slashing damage.",
            ),
            ability(
                "Shortbow",
                AbilityKind::Action,
                0,
                "<i>Ranged Weapon Attack:</i> [+prof+dex] to hit, range 80/320 ft., one target. <i>Hit:</i> 1d6[+dex] piercing damage.",
            ),
        ])
        .build()
}

/// A D&D 5e veteran (CR 3).
pub fn sample_veteran() -> AnyGuard {
    GuardBuilder::new(Ruleset::Dnd5e)
        .field("name", "Veteran")
        .field("gender", 0)
        .field("subtype", "any race")
        .field("alignment", "any alignment")
        .field("armor_class", "17 (splint)")
        .field("hit_dice", "9d8")
        .field("strength", 16)
        .field("dexterity", 13)
        .field("constitution", 14)
        .field("intelligence", 10)
        .field("wisdom", 11)
        .field("charisma", 10)
        .field("skills", "Athletics +5, Perception +2")
        .field("languages", "any one language (usually Common)")
        .field("challenge", "3")
        .abilities(&[
            ability(
                "Multiattack",
                AbilityKind::Action,
                2,
                "[Name] makes two longsword attacks.",
            ),
            ability(
                "Longsword",
                AbilityKind::Action,
                1,
                "<i>Melee Weapon Attack:</i> [+prof+str] to hit, reach 5 ft., one target. <i>Hit:</i> 1d8[+str] slashing damage.",
            ),
            ability(
                "Parry",
                AbilityKind::Reaction,
                0,
                "[Name] adds [prof] to [his/her/its] AC against one melee attack that would hit [him/her/it].",
            ),
        ])
        .build()
}

/// A Pathfinder goblin warrior (level -1).
pub fn sample_pathfinder_goblin() -> AnyGuard {
    let mut dogslicer = ability(
        "Dogslicer",
        AbilityKind::Offensive,
        0,
        "[+dexterity+4] (agile, backstabber, finesse), <b>Damage</b> 1d6 slashing",
    );
    dogslicer.actions = Some("1 action".to_string());

    GuardBuilder::new(Ruleset::Pathfinder)
        .field("name", "Goblin Warrior")
        .field("gender", 1)
        .field("level", -1)
        .field("size", "Small")
        .field("traits", "Goblin")
        .field("perception", 2)
        .field("senses", "darkvision")
        .field("languages", "Common, Goblin")
        .field("skills", "Acrobatics +5, Athletics +2, Nature +1, Stealth +5")
        .field("dexterity", "+3")
        .field("constitution", "+1")
        .field("wisdom", "-1")
        .field("charisma", "+1")
        .field("armor_class", "16")
        .field("reflex", "+7")
        .field("will", "+3")
        .field("hit_points", 6)
        .abilities(&[dogslicer])
        .build()
}

/// A D&D 5e bestiary holding the goblin and the veteran.
pub fn sample_bestiary() -> Bestiary {
    let mut bestiary = Bestiary::new(Ruleset::Dnd5e);
    bestiary.add(sample_goblin().into_record());
    bestiary.add(sample_veteran().into_record());
    bestiary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::Creature;

    #[test]
    fn test_builder_starts_from_defaults() {
        let record = GuardBuilder::new(Ruleset::Dnd5e).record();
        assert_eq!(record.name(), "Unnamed Guard");

        let record = GuardBuilder::new(Ruleset::Adnd).field("name", "Ogre").record();
        assert_eq!(record.name(), "Ogre");
        assert!(!record.fields.contains_key("hit_dice"));
    }

    #[test]
    fn test_samples() {
        assert_eq!(sample_goblin().abilities().len(), 3);
        assert_eq!(sample_veteran().record().int("strength"), 16);
        assert_eq!(sample_pathfinder_goblin().ruleset(), Ruleset::Pathfinder);
        assert_eq!(sample_bestiary().guards.len(), 2);
    }
}
