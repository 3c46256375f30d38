//! Authored ability text.
//!
//! Abilities are stored on a guard as a JSON list in the `abilities` field.
//! Their title and text are bracket templates (see [`crate::template`]);
//! library entries may also carry `{Label:default}` placeholders that are
//! filled in once, when the ability is added to a creature.

use crate::guard::{Creature, Guard};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    /// `{Label}` or `{Label:default}`.
    static ref PLACEHOLDER: Regex = Regex::new(r"\{(?P<name>[^:}]*?)(?::(?P<default>[^}]*?))?\}")
        .expect("valid placeholder pattern");
}

/// When an ability is used, which also decides its stat block section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKind {
    Passive,
    Action,
    Bonus,
    Reaction,
    Legendary,
    General,
    Defensive,
    Offensive,
    #[serde(other)]
    Other,
}

impl AbilityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AbilityKind::Passive => "passive",
            AbilityKind::Action => "action",
            AbilityKind::Bonus => "bonus",
            AbilityKind::Reaction => "reaction",
            AbilityKind::Legendary => "legendary",
            AbilityKind::General => "general",
            AbilityKind::Defensive => "defensive",
            AbilityKind::Offensive => "offensive",
            AbilityKind::Other => "other",
        }
    }

    fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "passive" => AbilityKind::Passive,
            "action" => AbilityKind::Action,
            "bonus" => AbilityKind::Bonus,
            "reaction" => AbilityKind::Reaction,
            "legendary" => AbilityKind::Legendary,
            "general" => AbilityKind::General,
            "defensive" => AbilityKind::Defensive,
            "offensive" => AbilityKind::Offensive,
            _ => AbilityKind::Other,
        }
    }
}

impl fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ability of a creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: AbilityKind,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub text: String,
    /// Action cost label (`"2 actions"`, `"reaction"`), where the ruleset has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<String>,
}

impl Ability {
    /// Parse the JSON ability list stored on a record.
    ///
    /// Empty or malformed JSON yields an empty list.
    pub fn list_from_json(json: &str) -> Vec<Ability> {
        if json.trim().is_empty() {
            return Vec::new();
        }
        match serde_json::from_str(json) {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!(%err, "ignoring malformed ability list");
                Vec::new()
            }
        }
    }

    /// Abilities stored on a record.
    pub fn list_for(record: &Guard) -> Vec<Ability> {
        Self::list_from_json(&record.text("abilities"))
    }

    pub fn list_to_json(abilities: &[Ability]) -> serde_json::Result<String> {
        serde_json::to_string(abilities)
    }

    /// Title as printed, falling back to the name when no title was authored.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.name
        } else {
            &self.title
        }
    }

    pub fn rendered_title<C: Creature + ?Sized>(&self, creature: &C) -> String {
        creature.render(&format!("{}.", self.display_title()))
    }

    pub fn rendered_text<C: Creature + ?Sized>(&self, creature: &C) -> String {
        creature.render(&self.text)
    }

    /// Placeholders of this ability with their defaults.
    pub fn details(&self) -> AbilityDetails {
        AbilityDetails::scan(&self.title, &self.text)
    }

    /// Copy of this ability with every placeholder replaced.
    pub fn with_details(&self, details: &AbilityDetails) -> Ability {
        Ability {
            title: details.fill(&self.title),
            text: details.fill(&self.text),
            ..self.clone()
        }
    }
}

/// Values chosen for an ability's `{Label:default}` placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbilityDetails {
    entries: Vec<(String, String)>,
}

impl AbilityDetails {
    /// Collect placeholders from a title and text.
    ///
    /// Labels are unique and kept in order of first appearance; each keeps
    /// the default given where it first appears.
    pub fn scan(title: &str, text: &str) -> Self {
        let mut details = Self::default();
        for source in [title, text] {
            for caps in PLACEHOLDER.captures_iter(source) {
                let name = &caps["name"];
                if details.get(name).is_some() {
                    continue;
                }
                let default = caps.name("default").map_or("", |m| m.as_str());
                details.entries.push((name.to_string(), default.to_string()));
            }
        }
        details
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, value)| value.as_str())
    }

    /// Set the value of a known label. Returns false for unknown labels.
    pub fn set(&mut self, label: &str, value: impl Into<String>) -> bool {
        match self.entries.iter_mut().find(|(l, _)| l == label) {
            Some((_, existing)) => {
                *existing = value.into();
                true
            }
            None => false,
        }
    }

    /// Replace every placeholder of a known label with its value.
    pub fn fill(&self, text: &str) -> String {
        PLACEHOLDER
            .replace_all(text, |caps: &Captures| match self.get(&caps["name"]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// Parse a `;`-separated ability table.
///
/// The first non-blank line is the header; recognised columns are `name`,
/// `title`, `type`, `actions`, `priority` and `text`. The text column may
/// itself contain `;` when it is the last column. Rows missing a name are
/// skipped.
pub fn parse_ability_table(table: &str) -> Vec<Ability> {
    let mut lines = table.lines().map(str::trim).filter(|line| !line.is_empty());
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<&str> = header.split(';').map(str::trim).collect();

    let mut abilities = Vec::new();
    for line in lines {
        let cells: Vec<&str> = line.splitn(columns.len(), ';').collect();
        let cell = |column: &str| {
            columns
                .iter()
                .position(|c| *c == column)
                .and_then(|index| cells.get(index).copied())
                .map(str::trim)
        };
        let Some(name) = cell("name").filter(|name| !name.is_empty()) else {
            tracing::debug!(line, "skipping ability row without a name");
            continue;
        };
        abilities.push(Ability {
            name: name.to_string(),
            title: cell("title").unwrap_or_default().to_string(),
            kind: AbilityKind::parse(cell("type").unwrap_or_default()),
            priority: cell("priority").and_then(|p| p.parse().ok()).unwrap_or(0),
            text: cell("text").unwrap_or_default().to_string(),
            actions: cell("actions")
                .filter(|a| !a.is_empty())
                .map(str::to_string),
        });
    }
    abilities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_details() {
        let details = AbilityDetails::scan(
            "{Attack Name}",
            "[+prof+{Ability:str}] to hit. {Damage:1d8}[+{Ability}] {Damage Type:slashing}",
        );
        let labels: Vec<&str> = details.labels().collect();
        assert_eq!(labels, vec!["Attack Name", "Ability", "Damage", "Damage Type"]);
        assert_eq!(details.get("Attack Name"), Some(""));
        assert_eq!(details.get("Ability"), Some("str"));
        assert_eq!(details.get("Damage"), Some("1d8"));
    }

    #[test]
    fn test_fill_replaces_every_occurrence() {
        let mut details = AbilityDetails::scan("", "[+{Ability:str}] and [{Ability}]");
        assert!(details.set("Ability", "dex"));
        assert!(!details.set("Unknown", "x"));
        assert_eq!(details.fill("[+{Ability:str}] and [{Ability}]"), "[+dex] and [dex]");
        assert_eq!(details.fill("{Other}"), "{Other}");
    }

    #[test]
    fn test_list_from_json() {
        let json = r#"[{"name": "Bite", "title": "Bite", "type": "action", "priority": 1, "text": "1d4"},
                       {"name": "Odd", "type": "lair", "text": ""}]"#;
        let abilities = Ability::list_from_json(json);
        assert_eq!(abilities.len(), 2);
        assert_eq!(abilities[0].kind, AbilityKind::Action);
        assert_eq!(abilities[1].kind, AbilityKind::Other);
        assert_eq!(abilities[1].display_title(), "Odd");

        assert!(Ability::list_from_json("").is_empty());
        assert!(Ability::list_from_json("{not json").is_empty());
    }

    #[test]
    fn test_parse_table() {
        let table = "
name;title;type;priority;text
Parry;Parry;reaction;0;[Name] adds [prof] to [his/her/its] AC.
Weapon Attack;Weapon Attack;legendary;1;[Name] makes a weapon attack; then rests.
";
        let abilities = parse_ability_table(table);
        assert_eq!(abilities.len(), 2);
        assert_eq!(abilities[0].kind, AbilityKind::Reaction);
        assert_eq!(abilities[1].priority, 1);
        assert_eq!(abilities[1].text, "[Name] makes a weapon attack; then rests.");
        assert_eq!(abilities[1].actions, None);
    }

    #[test]
    fn test_with_details() {
        let ability = Ability {
            name: "Melee Attack".into(),
            title: "{Attack Name}".into(),
            kind: AbilityKind::Action,
            priority: 0,
            text: "{Damage:1d8} damage".into(),
            actions: None,
        };
        let mut details = ability.details();
        details.set("Attack Name", "Club");
        let filled = ability.with_details(&details);
        assert_eq!(filled.title, "Club");
        assert_eq!(filled.text, "1d8 damage");
    }
}
