//! Property resolution for bracket expressions.
//!
//! The names a bracket may mention are the ruleset's derived integer
//! properties (registered statically with `#[stat_properties]`) followed by
//! every stored field key of the record. [`PropertyResolver`] compiles them
//! once into a single case-insensitive whole-word pattern.

use crate::guard::{eq_ignore_case, Creature, Gender, Guard};
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Static registry of a creature type's derived integer properties.
///
/// Implemented by `#[stat_properties]`; see `lorekeeper_macros`.
pub trait PropertyTable {
    /// Registered property names, in declaration order.
    const PROPERTY_NAMES: &'static [&'static str];

    /// Evaluate a registered property by name.
    fn property(&self, name: &str) -> Option<i64>;
}

/// Substitutable names of one creature and the pattern that finds them.
#[derive(Debug, Clone)]
pub struct PropertyResolver {
    names: Vec<String>,
    pattern: Option<Regex>,
}

impl PropertyResolver {
    /// Build the resolver for a record of creature type `T`.
    pub fn for_record<T: PropertyTable>(record: &Guard) -> Self {
        let names = T::PROPERTY_NAMES
            .iter()
            .copied()
            .chain(record.fields.keys())
            .chain(std::iter::once("name"));
        Self::from_names(names)
    }

    /// Build a resolver from an explicit list of names.
    ///
    /// Duplicates (compared case-insensitively) keep their first position.
    /// Names containing anything but word characters are dropped, since they
    /// can never be matched as a whole word.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut collected: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !is_word(name) {
                tracing::debug!(name, "skipping property name that is not a whole word");
                continue;
            }
            if collected.iter().any(|n| eq_ignore_case(n, name)) {
                continue;
            }
            collected.push(name.to_string());
        }

        let pattern = build_pattern(&collected);
        tracing::debug!(count = collected.len(), "built property resolver");
        Self {
            names: collected,
            pattern,
        }
    }

    /// Substitutable names in their natural order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| eq_ignore_case(n, name))
    }

    /// The compiled matching pattern, if any names exist.
    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    /// Replace every whole-word occurrence of a known name with `lookup(name)`.
    pub fn substitute<'t, F>(&self, content: &'t str, mut lookup: F) -> Cow<'t, str>
    where
        F: FnMut(&str) -> String,
    {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(content, |caps: &Captures| lookup(&caps[1])),
            None => Cow::Borrowed(content),
        }
    }
}

fn is_word(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Whole-word, case-insensitive alternation with longer names tried first,
/// so `strength` is never shadowed by `str`.
fn build_pattern(names: &[String]) -> Option<Regex> {
    if names.is_empty() {
        return None;
    }
    let mut ordered: Vec<&String> = names.iter().collect();
    ordered.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    let alternation = ordered
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    match Regex::new(&format!(r"(?i)\b({alternation})\b")) {
        Ok(pattern) => Some(pattern),
        Err(err) => {
            tracing::warn!(%err, "could not compile property pattern");
            None
        }
    }
}

/// Resolve one matched name to its current display value.
///
/// Order: the `name` special case, then derived properties, then stored
/// fields. Unknown names resolve to an empty string.
pub fn resolve<C: Creature + ?Sized>(creature: &C, word: &str) -> String {
    let word = word.to_lowercase();
    if word == "name" {
        return name_reference(creature.record());
    }
    if let Some(value) = creature.derived(&word) {
        return value.to_string();
    }
    creature
        .record()
        .fields
        .get_ignore_case(&word)
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// How narration refers to the creature.
///
/// The short name (lowercased) wins over the full name; creatures in the
/// third gender slot are referred to as "the <name>".
pub fn name_reference(record: &Guard) -> String {
    let short_name = record.short_name();
    let short_name = short_name.trim();
    let name = if short_name.is_empty() {
        record.name()
    } else {
        short_name.to_lowercase()
    };
    if record.gender() == Gender::Other {
        format!("the {name}")
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl PropertyTable for Plain {
        const PROPERTY_NAMES: &'static [&'static str] = &["str", "prof"];

        fn property(&self, name: &str) -> Option<i64> {
            match name {
                "str" => Some(3),
                "prof" => Some(2),
                _ => None,
            }
        }
    }

    #[test]
    fn test_names_order() {
        let mut record = Guard::new();
        record.set("strength", 16);
        let resolver = PropertyResolver::for_record::<Plain>(&record);
        let names = resolver.names();
        assert_eq!(&names[..3], &["str", "prof", "name"]);
        assert_eq!(names.last().map(String::as_str), Some("strength"));
        assert_eq!(names.iter().filter(|n| *n == "name").count(), 1);
    }

    #[test]
    fn test_whole_word_only() {
        let resolver = PropertyResolver::from_names(["str"]);
        let out = resolver.substitute("str+strength+Str", |_| "X".to_string());
        assert_eq!(out, "X+strength+X");
    }

    #[test]
    fn test_longest_name_wins() {
        let resolver = PropertyResolver::from_names(["str", "str_bonus"]);
        let out = resolver.substitute("str_bonus", |w| format!("<{w}>"));
        assert_eq!(out, "<str_bonus>");
    }

    #[test]
    fn test_non_word_names_dropped() {
        let resolver = PropertyResolver::from_names(["hit points", "", "ac", "AC"]);
        assert_eq!(resolver.names(), &["ac".to_string()]);
        assert!(resolver.contains("Ac"));
    }

    #[test]
    fn test_empty_resolver_is_identity() {
        let resolver = PropertyResolver::from_names(Vec::<String>::new());
        assert!(resolver.pattern().is_none());
        assert_eq!(resolver.substitute("anything", |_| "X".into()), "anything");
    }

    #[test]
    fn test_unicode_field_names() {
        let resolver = PropertyResolver::from_names(["Ärger", "ärger"]);
        assert_eq!(resolver.names(), &["Ärger".to_string()]);
        assert!(resolver.contains("ÄRGER"));
    }

    #[test]
    fn test_name_reference() {
        let mut record = Guard::new();
        record.set("name", "Goblin Boss");
        assert_eq!(name_reference(&record), "Goblin Boss");
        record.set("short_name", "  Boss ");
        assert_eq!(name_reference(&record), "boss");
        record.set("gender", 2);
        assert_eq!(name_reference(&record), "the boss");
    }
}
