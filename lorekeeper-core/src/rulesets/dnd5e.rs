//! D&D 5th edition creatures.

use super::{signed, Combatant};
use crate::guard::{Creature, FieldValue, Guard};
use crate::properties::{PropertyResolver, PropertyTable};
use lorekeeper_macros::stat_properties;

/// Experience points by challenge rating.
pub const XP_TABLE: &[(&str, i64)] = &[
    ("1/8", 10),
    ("1/4", 25),
    ("1/2", 50),
    ("1", 100),
    ("2", 200),
    ("3", 450),
    ("4", 700),
    ("5", 1100),
    ("6", 1800),
    ("7", 2300),
    ("8", 2900),
    ("9", 3900),
    ("10", 5000),
    ("11", 5900),
    ("12", 7200),
    ("13", 8400),
    ("14", 10000),
    ("15", 11500),
    ("16", 13000),
    ("17", 15000),
    ("18", 18000),
    ("19", 20000),
    ("20", 25000),
];

/// The six ability scores in stat block order.
pub const ABILITY_SCORES: [&str; 6] = [
    "strength",
    "dexterity",
    "constitution",
    "intelligence",
    "wisdom",
    "charisma",
];

pub(super) const DEFAULT_ABILITIES: &str = "
name;title;type;priority;text
Sneak Attack;Sneak Attack (1/Turn);passive;0;[Name] deals an extra {Extra Damage:2d6} damage when [he/she/it] hits a target with a weapon attack and has advantage on the attack roll, or when the target is within 5 feet of an ally of [name] that isn't incapacitated and [name] doesn't have disadvantage on the attack roll.
Reckless;Reckless;passive;0;At the start of [his/her/its] turn, [name] can gain advantage on all melee weapon attack rolls during that turn, but attack rolls against [him/her/it] have advantage until the start of [his/her/its] turn.
Brave;Brave;passive;0;[Name] has advantage on saving throws against being frightened.
Spellcasting;Spellcasting;passive;0;[Name] is a {Level:3rd}-level spellcaster. [His/Her/Its] spellcasting ability modifier is {Ability Name:Intelligence} (spell save DC [8+prof+{Ability Shorthand:int}], [+prof+{Ability Shorthand}] to hit with spell attacks). [He/She/It] has the following {Spell List:wizard} spells prepared:
Shield Bash;Shield Bash;action;0;<i>Melee Weapon Attack:</i> [+prof+str] to hit, reach 5 ft., one creature. <i>Hit:</i> 2d4[+str] bludgeoning damage. If the target is a Medium or smaller creature, it must succeed on a DC [10+prof+str] Strength saving throw or be knocked prone.
Parry;Parry;reaction;0;[Name] adds [prof] to [his/her/its] AC against one melee attack that would hit [him/her/it]. To do so, [name] must see the attacker and be wielding a melee weapon.
Keen Senses;Keen Senses;passive;0;[Name] has advantage on Wisdom (Perception) checks.
Cunning Action;Cunning Action;bonus;0;On each of [his/her/its] turns, [name] can use a bonus action to take the Dash, Disengage or Hide action.
Pack Tactics;Pack Tactics;passive;0;[Name] has advantage on an attack roll against a creature if at least one of [name]'s allies is within 5 feet of the creature and the ally isn't incapacitated.
Nimble Escape;Nimble Escape;bonus;0;[Name] can take the Disengage and the Hide action as a bonus action on each of [his/her/its] turns.
Aggressive;Aggressive;bonus;0;As a bonus action, [name] can move up to [his/her/its] speed toward a hostile creature [he/she/it] can see.
Second Wind;Second Wind (Recharges after a Short or Long Rest);bonus;0;As a bonus action, [name] can regain {Hit Points:20} hit points.
Melee Attack;{Attack Name};action;0;<i>Melee Weapon Attack:</i> [+prof+{Ability:str}] to hit, reach {Reach:5} ft., one target. <i>Hit:</i> {Damage:1d8}[+{Ability}] {Damage Type:slashing} damage.
Ranged Attack;{Attack Name};action;0;<i>Ranged Weapon Attack:</i> [+prof+{Ability:dex}] to hit, range {Range:80/320} ft., one target. <i>Hit:</i> {Damage:1d8}[+{Ability}] {Damage Type:piercing} damage.
Uncanny Dodge;Uncanny Dodge;reaction;0;[Name] halves the damage that it takes from an attack that hits [him/her/it]. [Name] must be able to see the attacker.
Weapon Attack;Weapon Attack;legendary;1;[Name] makes a weapon attack.
Command Ally;Command Ally;legendary;0;[Name] targets one ally [he/she/it] can see within 30 feet of [him/her/it]. If the target can see and hear [name], the target can make one weapon attack as a reaction and gains advantage on the attack roll.
Sunlight Sensitivity;Sunlight Sensitivity;passive;0;While in sunlight, [name] has disadvantage on attack rolls, as well as on Wisdom (Perception) checks that rely on sight.
Dagger;Dagger;action;0;<i>Melee or Ranged Weapon Attack:</i> [+prof+finesse] to hit, reach 5 ft. or range 20/60 ft., one target. <i>Hit:</i> 1d4[+finesse] piercing damage.
Legendary Resistance;Legendary Resistance;passive;0;If [name] fails a saving throw, it can choose to succeed instead.
";

/// Ability score modifier, rounded down.
pub fn ability_modifier(score: i64) -> i64 {
    score.saturating_sub(10).div_euclid(2)
}

/// Numeric challenge rating: `"1/8"` is 0.125, `"3"` is 3, empty is 0.
pub fn parse_challenge(challenge: &str) -> f64 {
    let challenge = challenge.trim();
    if challenge.is_empty() {
        return 0.0;
    }
    let parsed = match challenge.split_once('/') {
        Some((numerator, denominator)) => {
            match (numerator.trim().parse::<i64>(), denominator.trim().parse::<i64>()) {
                (Ok(n), Ok(d)) if d != 0 => Some(n as f64 / d as f64),
                _ => None,
            }
        }
        None => challenge.parse::<i64>().ok().map(|n| n as f64),
    };
    parsed.unwrap_or_else(|| {
        tracing::trace!(challenge, "unreadable challenge rating");
        0.0
    })
}

/// XP awarded for a challenge rating, zero when the rating is not in the table.
pub fn challenge_xp(challenge: &str) -> i64 {
    let challenge = challenge.trim();
    XP_TABLE
        .iter()
        .find(|(rating, _)| *rating == challenge)
        .map_or(0, |(_, xp)| *xp)
}

pub(super) fn icon_name(creature_type: &str) -> &'static str {
    match creature_type.trim().to_lowercase().as_str() {
        "aberration" => "ufo",
        "beast" => "bear",
        "celestial" => "angel",
        "construct" => "robot",
        "dragon" => "fire",
        "elemental" => "drop",
        "fey" => "sickle",
        "fiend" => "devil",
        "giant" => "person",
        "humanoid" => "user",
        "monstrosity" => "spider",
        "ooze" => "object_ball",
        "plant" => "leaf",
        "swarm" => "worm",
        "undead" => "skull",
        _ => "ballpen",
    }
}

/// A D&D 5e creature.
#[derive(Debug, Clone)]
pub struct Dnd5eGuard {
    record: Guard,
    resolver: PropertyResolver,
}

impl Dnd5eGuard {
    pub fn from_record(record: Guard) -> Self {
        let resolver = PropertyResolver::for_record::<Self>(&record);
        Self { record, resolver }
    }

    /// The default creature offered when adding a new guard.
    pub fn new() -> Self {
        let mut record = Guard::new();
        record.set("name", "Unnamed Guard");
        record.set("gender", 2);
        record.set("type", "Humanoid");
        record.set("alignment", "Unaligned");
        record.set("subtype", "any");
        record.set("size", "Medium");
        record.set("challenge", "1/8");
        record.set("languages", "");
        record.set("hit_dice", "2d8");
        record.set("speed", "30 ft.");
        record.set("senses", "");
        record.set("armor_class", "10");
        for score in ABILITY_SCORES {
            record.set(score, 10);
        }
        for key in [
            "skills",
            "saves",
            "damage_vulnerabilities",
            "damage_resistances",
            "damage_immunities",
            "condition_immunities",
        ] {
            record.set(key, "");
        }
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

    /// Number of hit dice, read from notation like `2d8`.
    pub fn hit_dice_count(&self) -> Option<i64> {
        let hit_dice = self.record.text("hit_dice");
        match hit_dice.split('d').collect::<Vec<_>>().as_slice() {
            [count, _] => count.trim().parse().ok(),
            _ => None,
        }
    }

    /// Roll for maximum hit points: the hit dice plus the constitution
    /// bonus of every die. Unreadable hit dice are used as written.
    pub fn maximum_hit_points_roll(&self) -> String {
        let hit_dice = self.record.text("hit_dice");
        match self.hit_dice_count() {
            Some(count) => format!("{hit_dice}{}", signed(count.saturating_mul(self.con()))),
            None => hit_dice,
        }
    }

    pub fn to_combatant(&self) -> Combatant {
        let hit_dice = self.record.text("hit_dice");
        let count = hit_dice.split('d').next().unwrap_or_default();
        Combatant {
            guard: self.record.id,
            name: self.record.name(),
            initiative_roll: format!("1d20{}", signed(self.dex())),
            label: format!("{count} HD"),
            maximum_hit_points_roll: self.maximum_hit_points_roll(),
            power: format!("CR {}", self.record.text("challenge")),
        }
    }
}

impl Default for Dnd5eGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[stat_properties]
impl Dnd5eGuard {
    pub fn str(&self) -> i64 {
        ability_modifier(self.record.int("strength"))
    }

    pub fn dex(&self) -> i64 {
        ability_modifier(self.record.int("dexterity"))
    }

    pub fn con(&self) -> i64 {
        ability_modifier(self.record.int("constitution"))
    }

    pub fn int(&self) -> i64 {
        ability_modifier(self.record.int("intelligence"))
    }

    pub fn wis(&self) -> i64 {
        ability_modifier(self.record.int("wisdom"))
    }

    pub fn cha(&self) -> i64 {
        ability_modifier(self.record.int("charisma"))
    }

    /// The better of strength and dexterity.
    pub fn finesse(&self) -> i64 {
        self.dex().max(self.str())
    }

    /// Proficiency bonus by challenge rating.
    pub fn prof(&self) -> i64 {
        let cr = self.cr();
        if cr < 1.0 {
            2
        } else {
            2 + (cr.floor() as i64 - 1) / 4
        }
    }

    pub fn cr(&self) -> f64 {
        parse_challenge(&self.record.text("challenge"))
    }

    #[property(skip)]
    pub fn xp(&self) -> i64 {
        challenge_xp(&self.record.text("challenge"))
    }
}

impl Creature for Dnd5eGuard {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::Gender;

    #[test]
    fn test_registered_properties() {
        assert_eq!(
            Dnd5eGuard::PROPERTY_NAMES,
            &["str", "dex", "con", "int", "wis", "cha", "finesse", "prof"]
        );
    }

    #[test]
    fn test_new_defaults() {
        let guard = Dnd5eGuard::new();
        assert_eq!(guard.record().name(), "Unnamed Guard");
        assert_eq!(guard.record().gender(), Gender::Other);
        assert_eq!(guard.record().text("hit_dice"), "2d8");
        assert_eq!(guard.str(), 0);
        assert_eq!(guard.prof(), 2);
        assert_eq!(guard.xp(), 10);
    }

    #[test]
    fn test_modifiers_round_down() {
        let mut guard = Dnd5eGuard::new();
        guard.set("strength", 9);
        guard.set("dexterity", 15);
        assert_eq!(guard.str(), -1);
        assert_eq!(guard.dex(), 2);
        assert_eq!(guard.finesse(), 2);
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(20), 5);
        assert_eq!(ability_modifier(i64::MIN), i64::MIN / 2);
        assert_eq!(ability_modifier(i64::MAX), (i64::MAX - 10) / 2);
    }

    #[test]
    fn test_extreme_scores_still_render() {
        let mut guard = Dnd5eGuard::new();
        guard.set("strength", i64::MIN);
        assert_eq!(guard.render("[+str]"), "-4611686018427387904");

        guard.set("hit_dice", "9000000000000000000d8");
        guard.set("constitution", i64::MAX);
        assert_eq!(
            guard.maximum_hit_points_roll(),
            format!("9000000000000000000d8+{}", i64::MAX)
        );
    }

    #[test]
    fn test_challenge_and_proficiency() {
        assert_eq!(parse_challenge("1/8"), 0.125);
        assert_eq!(parse_challenge("3"), 3.0);
        assert_eq!(parse_challenge(""), 0.0);
        assert_eq!(parse_challenge("1/0"), 0.0);

        let mut guard = Dnd5eGuard::new();
        for (challenge, prof) in [("1/2", 2), ("1", 2), ("4", 2), ("5", 3), ("9", 4), ("17", 6)] {
            guard.set("challenge", challenge);
            assert_eq!(guard.prof(), prof, "challenge {challenge}");
        }
    }

    #[test]
    fn test_xp_lookup() {
        assert_eq!(challenge_xp("1/4"), 25);
        assert_eq!(challenge_xp("10"), 5000);
        assert_eq!(challenge_xp("31"), 0);
    }

    #[test]
    fn test_combatant() {
        let mut guard = Dnd5eGuard::new();
        guard.set("name", "Bugbear");
        guard.set("hit_dice", "5d8");
        guard.set("constitution", 13);
        guard.set("dexterity", 14);
        guard.set("challenge", "1");
        let combatant = guard.to_combatant();
        assert_eq!(combatant.name, "Bugbear");
        assert_eq!(combatant.initiative_roll, "1d20+2");
        assert_eq!(combatant.label, "5 HD");
        assert_eq!(combatant.maximum_hit_points_roll, "5d8+5");
        assert_eq!(combatant.power, "CR 1");

        guard.set("hit_dice", "27");
        assert_eq!(guard.maximum_hit_points_roll(), "27");
    }

    #[test]
    fn test_icons() {
        assert_eq!(icon_name("Undead"), "skull");
        assert_eq!(icon_name("swarm"), "worm");
        assert_eq!(icon_name("Homunculus"), "ballpen");
    }

    #[test]
    fn test_render_derived_properties() {
        let mut guard = Dnd5eGuard::new();
        guard.set("name", "Veteran");
        guard.set("gender", 0);
        guard.set("strength", 16);
        guard.set("challenge", "3");
        assert_eq!(guard.render("[+prof+str] to hit"), "+5 to hit");
        assert_eq!(guard.render("DC [8+prof+str]"), "DC 13");
        assert_eq!(
            guard.render("[Name] adds [prof] to [his/her/its] AC"),
            "Veteran adds 2 to his AC"
        );
    }
}
