//! AD&D 2nd edition creatures.
//!
//! These are only ever imported from monster manual entries, never created
//! from scratch.

use super::Combatant;
use crate::guard::{Creature, FieldValue, Guard};
use crate::properties::{PropertyResolver, PropertyTable};

/// Stat block rows: label and field key.
pub const MONSTER_TABLE: &[(&str, &str)] = &[
    ("Climate/Terrain", "climate"),
    ("Frequency", "frequency"),
    ("Organization", "organization"),
    ("Activity Cycle", "activity"),
    ("Diet", "diet"),
    ("Intelligence", "intelligence"),
    ("Treasure", "treasure"),
    ("Alignment", "alignment"),
    ("No. Appearing", "appearing"),
    ("Armor Class", "armor_class"),
    ("Movement", "movement"),
    ("Hit Dice", "hit_dice"),
    ("THAC0", "thac0"),
    ("No. of Attacks", "attacks"),
    ("Damage/Attack", "damage"),
    ("Special Attacks", "offensive"),
    ("Special Defenses", "defensive"),
    ("Magic Resistance", "magic_resistance"),
    ("Size", "size"),
    ("Morale", "morale"),
    ("XP Value", "xp"),
];

/// An AD&D creature.
#[derive(Debug, Clone)]
pub struct AdndGuard {
    record: Guard,
    resolver: PropertyResolver,
}

impl AdndGuard {
    pub fn from_record(record: Guard) -> Self {
        let resolver = PropertyResolver::for_record::<Self>(&record);
        Self { record, resolver }
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

    /// Size rank from the size code: `T` 1 through `G` 5, anything else 6.
    pub fn size_rank(&self) -> i64 {
        let size = self.record.text("size");
        match size.split(' ').next().unwrap_or_default() {
            "T" => 1,
            "S" => 2,
            "M" => 3,
            "L" => 4,
            "G" => 5,
            _ => 6,
        }
    }

    /// XP value with thousands separators removed; zero when unreadable.
    pub fn xp(&self) -> i64 {
        self.record
            .text("xp")
            .replace(',', "")
            .trim()
            .parse()
            .unwrap_or(0)
    }

    /// Hit points roll from hit dice like `4+4`: eight-sided dice plus the bonus.
    pub fn maximum_hit_points_roll(&self) -> String {
        let hit_dice = self.record.text("hit_dice");
        let mut parts = hit_dice.split('+');
        let count = parts.next().unwrap_or_default().trim().parse::<i64>();
        let modifier = parts.next().map_or(Ok(0), |m| m.trim().parse::<i64>());
        match (count, modifier) {
            (Ok(count), Ok(modifier)) => format!("{count}d8+{modifier}"),
            _ => hit_dice,
        }
    }

    pub fn to_combatant(&self) -> Combatant {
        Combatant {
            guard: self.record.id,
            name: self.record.name(),
            initiative_roll: self.size_rank().to_string(),
            label: format!(
                "HD {}; AC {}",
                self.record.text("hit_dice"),
                self.record.text("armor_class")
            ),
            maximum_hit_points_roll: self.maximum_hit_points_roll(),
            power: self.xp().to_string(),
        }
    }
}

impl PropertyTable for AdndGuard {
    const PROPERTY_NAMES: &'static [&'static str] = &[];

    fn property(&self, _name: &str) -> Option<i64> {
        None
    }
}

impl Creature for AdndGuard {
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
