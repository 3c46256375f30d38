//! Plain-text stat blocks.
//!
//! A [`StatBlock`] is an ordered list of [`StatLine`]s; front ends decide how
//! to style each kind of line, and `Display` gives a plain text rendering.

use crate::abilities::{Ability, AbilityKind};
use crate::dice::DiceExpression;
use crate::guard::{Creature, Guard};
use crate::rulesets::dnd5e::{ability_modifier, ABILITY_SCORES};
use crate::rulesets::{adnd::MONSTER_TABLE, signed, AnyGuard, Dnd5eGuard};
use crate::template::capitalize;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref PERCEPTION_SKILL: Regex =
        Regex::new(r"(?i)Perception\s*([+-]?\d+)").expect("valid perception pattern");
}

const RULE: &str = "----------------------------------------";

/// One line of a stat block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatLine {
    Title(String),
    Subtitle(String),
    Separator,
    /// A bold label followed by its value.
    Field { label: String, value: String },
    /// Heading of an ability section such as "Actions".
    Section(String),
    Ability { title: String, text: String },
    Text(String),
}

impl fmt::Display for StatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatLine::Title(text)
            | StatLine::Subtitle(text)
            | StatLine::Section(text)
            | StatLine::Text(text) => f.write_str(text),
            StatLine::Separator => f.write_str(RULE),
            StatLine::Field { label, value } => write!(f, "{label} {value}"),
            StatLine::Ability { title, text } => write!(f, "{title} {text}"),
        }
    }
}

/// A rendered stat block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatBlock {
    lines: Vec<StatLine>,
}

impl StatBlock {
    pub fn for_guard(guard: &AnyGuard) -> Self {
        let mut block = StatBlock::default();
        match guard {
            AnyGuard::Dnd5e(guard) => block.build_dnd5e(guard),
            AnyGuard::Pathfinder(_) => block.build_pathfinder(guard),
            AnyGuard::Adnd(_) => block.build_adnd(guard.record()),
        }
        block
    }

    pub fn lines(&self) -> &[StatLine] {
        &self.lines
    }

    /// Value of the first field with the given label.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            StatLine::Field { label: l, value } if l == label => Some(value.as_str()),
            _ => None,
        })
    }

    fn push(&mut self, line: StatLine) {
        self.lines.push(line);
    }

    fn field_line(&mut self, label: &str, value: impl Into<String>) {
        self.push(StatLine::Field {
            label: label.to_string(),
            value: value.into(),
        });
    }

    fn build_dnd5e(&mut self, guard: &Dnd5eGuard) {
        let record = guard.record();
        self.push(StatLine::Title(record.name()));

        let creature_type = capitalize(&record.text("type"));
        let subtype = record.text("subtype");
        let subtype = subtype.trim();
        let kind = if subtype.is_empty() {
            creature_type
        } else {
            format!("{creature_type} ({subtype})")
        };
        self.push(StatLine::Subtitle(format!(
            "{} {kind}, {}",
            capitalize(&record.text("size")),
            record.text("alignment")
        )));
        self.push(StatLine::Separator);

        self.field_line("Armor Class", record.text("armor_class"));
        self.field_line("Hit Points", dnd5e_hit_points(guard));
        self.field_line("Speed", record.text("speed"));
        self.push(StatLine::Separator);

        let scores = ABILITY_SCORES
            .iter()
            .map(|score| {
                format!(
                    "{} {} ({})",
                    score[..3].to_uppercase(),
                    record.text(score),
                    signed(ability_modifier(record.int(score)))
                )
            })
            .collect::<Vec<_>>()
            .join("  ");
        self.push(StatLine::Text(scores));
        self.push(StatLine::Separator);

        for (label, key) in [
            ("Saving Throws", "saves"),
            ("Skills", "skills"),
            ("Damage Resistances", "damage_resistances"),
            ("Damage Immunities", "damage_immunities"),
            ("Damage Vulnerabilities", "damage_vulnerabilities"),
            ("Condition Immunities", "condition_immunities"),
        ] {
            let value = record.text(key);
            if !value.is_empty() {
                self.field_line(label, value);
            }
        }

        let passive = format!("passive Perception {}", passive_perception(guard));
        let senses = record.text("senses");
        let senses = senses.trim();
        if senses.is_empty() {
            self.field_line("Senses", passive);
        } else {
            self.field_line("Senses", format!("{senses}, {passive}"));
        }

        let languages = record.text("languages");
        let languages = if languages.is_empty() {
            "-".to_string()
        } else {
            languages
        };
        self.field_line("Languages", languages);
        self.field_line(
            "Challenge",
            format!(
                "{} ({} XP)",
                record.text("challenge"),
                group_thousands(guard.xp())
            ),
        );
        self.push(StatLine::Separator);

        let mut abilities = Ability::list_for(record);
        abilities.sort_by(|a, b| b.priority.cmp(&a.priority));

        for ability in abilities.iter().filter(|a| a.kind == AbilityKind::Passive) {
            self.dnd5e_ability(guard, ability);
        }
        for (heading, kind) in [
            ("Actions", AbilityKind::Action),
            ("Bonus Actions", AbilityKind::Bonus),
            ("Reactions", AbilityKind::Reaction),
            ("Legendary Actions", AbilityKind::Legendary),
        ] {
            let mut section = abilities.iter().filter(|a| a.kind == kind).peekable();
            if section.peek().is_none() {
                continue;
            }
            self.push(StatLine::Section(heading.to_string()));
            for ability in section {
                self.dnd5e_ability(guard, ability);
            }
        }
    }

    fn dnd5e_ability(&mut self, guard: &Dnd5eGuard, ability: &Ability) {
        self.push(StatLine::Ability {
            title: ability.rendered_title(guard),
            text: ability.rendered_text(guard),
        });
    }

    fn build_pathfinder(&mut self, guard: &AnyGuard) {
        let record = guard.record();
        self.push(StatLine::Title(record.name()));
        self.push(StatLine::Subtitle(format!("Creature {}", record.text("level"))));
        self.push(StatLine::Separator);

        let mut tags = vec![record.text("size"), record.text("type")];
        tags.extend(record.traits());
        tags.retain(|tag| !tag.is_empty());
        self.push(StatLine::Text(tags.join(", ")));

        let info = record.text("info");
        if !info.is_empty() {
            self.push(StatLine::Text(info));
        }

        let mut perception = signed(record.int("perception"));
        let senses = record.text("senses");
        if !senses.is_empty() {
            perception.push_str(&format!("; {senses}"));
        }
        self.field_line("Perception", perception);
        for (label, key) in [("Languages", "languages"), ("Skills", "skills")] {
            let value = record.text(key);
            if !value.is_empty() {
                self.field_line(label, value);
            }
        }

        let scores = [
            ("Str", "strength"),
            ("Dex", "dexterity"),
            ("Con", "constitution"),
            ("Int", "intelligence"),
            ("Wis", "wisdom"),
            ("Cha", "charisma"),
        ]
        .iter()
        .map(|(short, key)| format!("{short} {}", record.text(key)))
        .collect::<Vec<_>>()
        .join(", ");
        self.push(StatLine::Text(scores));

        let abilities = Ability::list_for(record);
        self.pathfinder_abilities(guard, &abilities, AbilityKind::General);
        let items = record.text("items");
        if !items.is_empty() {
            self.field_line("Items", items);
        }
        self.push(StatLine::Separator);

        let mut defenses = format!(
            "{}; Fort {}, Ref {}, Will {}",
            record.text("armor_class"),
            record.text("fortitude"),
            record.text("reflex"),
            record.text("will")
        );
        let saves = record.text("saves");
        if !saves.is_empty() {
            defenses.push_str(&format!("; {saves}"));
        }
        self.field_line("AC", defenses);

        let mut hit_points = record.text("hit_points");
        let comment = record.text("hit_points_comment");
        if !comment.is_empty() {
            hit_points.push_str(&format!(" ({comment})"));
        }
        let life = [
            ("HP", hit_points),
            ("Immunities", record.text("immunities")),
            ("Resistances", record.text("resistances")),
            ("Weaknesses", record.text("weaknesses")),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("{label} {value}"))
        .collect::<Vec<_>>()
        .join("; ");
        if !life.is_empty() {
            self.push(StatLine::Text(life));
        }
        self.pathfinder_abilities(guard, &abilities, AbilityKind::Defensive);
        self.push(StatLine::Separator);

        self.field_line("Speed", record.text("speed"));
        self.pathfinder_abilities(guard, &abilities, AbilityKind::Offensive);

        let description = record.text("text");
        if !description.is_empty() {
            self.push(StatLine::Separator);
            self.push(StatLine::Text(description));
        }
    }

    fn pathfinder_abilities(&mut self, guard: &AnyGuard, abilities: &[Ability], kind: AbilityKind) {
        for ability in abilities.iter().filter(|a| a.kind == kind) {
            let title = match ability.actions.as_deref() {
                Some(actions) if !actions.is_empty() => format!("{} ({actions})", ability.name),
                _ => ability.name.clone(),
            };
            self.push(StatLine::Ability {
                title,
                text: ability.rendered_text(guard),
            });
        }
    }

    fn build_adnd(&mut self, record: &Guard) {
        self.push(StatLine::Title(record.name()));
        for (label, key) in MONSTER_TABLE {
            self.field_line(&format!("{label}:"), record.text(key));
        }
        let description = record.text("text");
        if !description.is_empty() {
            self.push(StatLine::Separator);
            self.push(StatLine::Text(description));
        }
    }
}

impl fmt::Display for StatBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}

/// `avg (NdM+k)` where k is the constitution bonus of every die.
///
/// Hit dice that are not a single plain dice term, or whose totals do not
/// fit in an `i64`, are printed as written.
fn dnd5e_hit_points(guard: &Dnd5eGuard) -> String {
    let hit_dice = guard.record().text("hit_dice");
    let expression = match DiceExpression::parse(&hit_dice) {
        Ok(expression) if expression.components.len() == 1 && expression.modifier == 0 => {
            expression
        }
        _ => return hit_dice,
    };
    let die = &expression.components[0];
    let count = i64::from(die.count);
    let Some((modifier, average)) = count
        .checked_mul(guard.con())
        .and_then(|modifier| Some((modifier, expression.average().checked_add(modifier)?)))
    else {
        return hit_dice;
    };
    let modifier = if modifier == 0 {
        String::new()
    } else {
        signed(modifier)
    };
    format!("{average} ({count}{}{modifier})", die.die_type)
}

/// 10 plus the Perception skill bonus, or plus the wisdom modifier.
fn passive_perception(guard: &Dnd5eGuard) -> i64 {
    let skills = guard.record().text("skills");
    let bonus = PERCEPTION_SKILL
        .captures(&skills)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .unwrap_or_else(|| guard.wis());
    bonus.saturating_add(10)
}

/// `25000` becomes `25,000`.
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
