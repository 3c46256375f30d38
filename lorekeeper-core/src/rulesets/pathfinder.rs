//! Pathfinder 2e creatures.
//!
//! Pathfinder stat blocks print modifiers directly, so there are no derived
//! properties: every name an ability may mention is a stored field.

use super::{signed, Combatant};
use crate::guard::{Creature, FieldValue, Guard};
use crate::properties::{PropertyResolver, PropertyTable};

pub(super) const DEFAULT_ABILITIES: &str = "
name;type;actions;text
Buck;defensive;reaction;<b>Trigger</b> A creature Mounts or uses the Command an Animal action while riding [name]. <b>Effect</b> The triggering creature must succeed at a DC {DC} Reflex save or fall off [him/her/it] and land prone. If the save is a critical failure, the triggering creature also takes 1d6 bludgeoning damage in addition to the normal damage for the fall.
Catch Rock;defensive;reaction;<b>Requirements</b> [Name] must have a free hand but can Release anything [he/she/it]'s holding as part of this reaction. <b>Trigger</b> [Name] is targeted with a thrown rock Strike or a rock would fall on [him/her/it]. <b>Effect</b> [Name] gains a +4 circumstance bonus to [his/her/its] AC against the triggering attack or to any defense against the falling rock. If the attack misses or [name] successfully defends against the falling rock, [name] catches the rock, takes no damage, and is now holding the rock.
Attack of Opportunity;general;reaction;<b>Trigger</b> A creature within [name]'s reach uses a manipulate action or a move action, makes a ranged attack, or leaves a square during a move action it's using. <b>Effect</b> [Name] attempts a melee Strike against the triggering creature.
";

pub(super) fn icon_name(creature_type: &str) -> &'static str {
    match creature_type.trim().to_lowercase().as_str() {
        "aberration" => "ufo",
        "animal" => "bear",
        "astral" => "star2",
        "celestial" => "angel",
        "construct" => "robot",
        "dragon" => "fire",
        "elemental" => "drop",
        "ethereal" => "planet",
        "fey" => "sickle",
        "fiend" => "devil",
        "fungus" => "mushroom",
        "humanoid" => "user",
        "monitor" => "scales",
        "ooze" => "object_ball",
        "plant" => "leaf",
        "spirit" => "ghost",
        "undead" => "skull",
        _ => "ballpen",
    }
}

/// A Pathfinder 2e creature.
#[derive(Debug, Clone)]
pub struct PathfinderGuard {
    record: Guard,
    resolver: PropertyResolver,
}

impl PathfinderGuard {
    pub fn from_record(record: Guard) -> Self {
        let resolver = PropertyResolver::for_record::<Self>(&record);
        Self { record, resolver }
    }

    /// The default creature offered when adding a new guard.
    pub fn new() -> Self {
        let mut record = Guard::new();
        record.set("name", "New Guard");
        record.set("level", 0);
        record.set("type", "Humanoid");
        record.set("size", "Medium");
        record.set("perception", 5);
        for score in [
            "strength",
            "dexterity",
            "constitution",
            "intelligence",
            "wisdom",
            "charisma",
        ] {
            record.set(score, "+0");
        }
        record.set("armor_class", "15");
        record.set("fortitude", "+5");
        record.set("reflex", "+5");
        record.set("will", "+5");
        record.set("hit_points", 10);
        record.set("speed", "25 feet");
        record.set("abilities", "[]");
        Self::from_record(record)
    }

    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) {
        let known = self.record.fields.contains_key(key);
        self.record.set(key, value);
        if !known {
            self.resolver = PropertyResolver::for_record::<Self>(&self.record);
        }
    }

    pub fn into_record(self) -> Guard {
        self.record
    }

    pub fn to_combatant(&self) -> Combatant {
        let level = self.record.text("level");
        Combatant {
            guard: self.record.id,
            name: self.record.name(),
            initiative_roll: format!("1d20{}", signed(self.record.int("perception"))),
            label: format!("Level {level}"),
            maximum_hit_points_roll: self.record.text("hit_points"),
            power: format!("level {level}"),
        }
    }
}

impl Default for PathfinderGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyTable for PathfinderGuard {
    const PROPERTY_NAMES: &'static [&'static str] = &[];

    fn property(&self, _name: &str) -> Option<i64> {
        None
    }
}

impl Creature for PathfinderGuard {
    fn record(&self) -> &Guard {
        &self.record
    }

    fn resolver(&self) -> &PropertyResolver {
        &self.resolver
    }

    fn derived(&self, name: &str) -> Option<i64> {
        self.property(name)
    }
}
