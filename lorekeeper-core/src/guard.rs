//! Creature ("guard") records.
//!
//! A guard is one stat-bearing entity: a monster, an NPC, or a reusable
//! template. Its data lives in an ordered set of named fields whose exact
//! keys depend on the ruleset; a handful of keys (`name`, `short_name`,
//! `gender`) are shared by every ruleset.

use crate::properties::PropertyResolver;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Errors from guard records.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Invalid guard id: expected {expected} bytes, found {found}")]
    InvalidId { expected: usize, found: usize },

    #[error("{0} guards cannot be newly created")]
    NotCreatable(&'static str),

    #[error("Unknown ruleset: {0}")]
    UnknownRuleset(String),
}

// ============================================================================
// ID Types
// ============================================================================

/// Row identifier of a guard in its table. Zero means "not yet stored".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuardId(pub u64);

impl GuardId {
    /// Number of bytes in the encoded form.
    pub const BYTE_SIZE: usize = 8;

    /// Encode as big-endian bytes.
    pub fn to_bytes(self) -> [u8; Self::BYTE_SIZE] {
        self.0.to_be_bytes()
    }

    /// Decode from big-endian bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GuardError> {
        let array: [u8; Self::BYTE_SIZE] =
            bytes.try_into().map_err(|_| GuardError::InvalidId {
                expected: Self::BYTE_SIZE,
                found: bytes.len(),
            })?;
        Ok(Self(u64::from_be_bytes(array)))
    }

    pub fn is_stored(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for GuardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Field Values
// ============================================================================

/// A single stored field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Integer view of the value.
    ///
    /// Text such as `"+5"` or `" 12 "` parses; anything else is `None`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            FieldValue::Float(value) => Some(value.floor() as i64),
            FieldValue::Text(text) => {
                let trimmed = text.trim();
                trimmed.strip_prefix('+').unwrap_or(trimmed).parse().ok()
            }
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(value) => write!(f, "{value}"),
            FieldValue::Float(value) => write!(f, "{}", format_float(*value)),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

/// Render a float the way stat text expects: `2.0`, `0.5`, `-1.25`.
pub(crate) fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

// ============================================================================
// Fields
// ============================================================================

/// Insertion-ordered, string-keyed field storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field by exact key.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a field by exact key, falling back to a case-insensitive match.
    pub fn get_ignore_case(&self, key: &str) -> Option<&FieldValue> {
        self.get(key).or_else(|| {
            self.entries
                .iter()
                .find(|(k, _)| eq_ignore_case(k, key))
                .map(|(_, v)| v)
        })
    }

    /// Set a field, keeping its position if it already exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in their natural (insertion) order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Unicode-aware case-insensitive name comparison.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Fields, A::Error> {
                let mut fields = Fields::new();
                while let Some((key, value)) = access.next_entry::<String, FieldValue>()? {
                    fields.set(key, value);
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

// ============================================================================
// Gender
// ============================================================================

/// The three gendered text slots a creature can select.
///
/// Slot 2 also marks the creature as an object of narration: its name is
/// rendered as "the <name>".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

impl Gender {
    /// Slot for a stored value; anything outside 0..=2 uses the first slot.
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => Gender::Female,
            2 => Gender::Other,
            _ => Gender::Male,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Gender::Male => 0,
            Gender::Female => 1,
            Gender::Other => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Guard
// ============================================================================

/// A creature record as stored in the guard table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guard {
    /// Row identifier (zero until stored).
    #[serde(default)]
    pub id: GuardId,

    /// All stored fields, in table column order.
    pub fields: Fields,
}

impl Guard {
    /// Create a record with the fields every ruleset shares.
    pub fn new() -> Self {
        let mut fields = Fields::new();
        fields.set("name", "");
        fields.set("gender", 0);
        fields.set("type", "");
        fields.set("_treasure", 0);
        fields.set("short_name", "");
        fields.set("traits", "");
        fields.set("_created", "");
        fields.set("_modified", "");
        Self {
            id: GuardId::default(),
            fields,
        }
    }

    pub fn with_id(mut self, id: GuardId) -> Self {
        self.id = id;
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.set(key, value);
    }

    /// Text of a field; missing fields read as empty.
    pub fn text(&self, key: &str) -> String {
        self.fields
            .get(key)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    /// Integer value of a field; missing or non-numeric fields read as zero.
    pub fn int(&self, key: &str) -> i64 {
        self.fields
            .get(key)
            .and_then(FieldValue::as_int)
            .unwrap_or(0)
    }

    pub fn name(&self) -> String {
        self.text("name")
    }

    pub fn short_name(&self) -> String {
        self.text("short_name")
    }

    pub fn gender(&self) -> Gender {
        Gender::from_index(self.int("gender"))
    }

    /// Trait tags stored as a comma separated list.
    pub fn traits(&self) -> Vec<String> {
        self.text("traits")
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for Guard {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Creature
// ============================================================================

/// A guard record together with its ruleset's derived properties.
///
/// This is everything the templating engine needs from a creature: stored
/// fields, the name/gender pair, the derived integer properties, and the
/// resolver built for it at construction time.
pub trait Creature {
    /// The underlying stored record.
    fn record(&self) -> &Guard;

    /// The property resolver built when the creature was constructed.
    fn resolver(&self) -> &PropertyResolver;

    /// Value of a derived (computed) property, if the ruleset defines one.
    fn derived(&self, name: &str) -> Option<i64>;

    /// Render authored ability text for this creature.
    fn render(&self, text: &str) -> String {
        crate::template::render(self, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_id_bytes() {
        let id = GuardId(258);
        assert_eq!(id.to_bytes(), [0, 0, 0, 0, 0, 0, 1, 2]);
        assert_eq!(GuardId::from_bytes(&id.to_bytes()).unwrap(), id);
        assert!(matches!(
            GuardId::from_bytes(&[1, 2, 3]),
            Err(GuardError::InvalidId {
                expected: 8,
                found: 3
            })
        ));
    }

    #[test]
    fn test_default_fields() {
        let guard = Guard::new();
        let keys: Vec<&str> = guard.fields.keys().collect();
        assert_eq!(
            keys,
            vec![
                "name",
                "gender",
                "type",
                "_treasure",
                "short_name",
                "traits",
                "_created",
                "_modified",
            ]
        );
        assert_eq!(guard.gender(), Gender::Male);
        assert!(!guard.id.is_stored());
    }

    #[test]
    fn test_set_keeps_position() {
        let mut fields = Fields::new();
        fields.set("a", 1);
        fields.set("b", 2);
        fields.set("a", "three");
        let keys: Vec<&str> = fields.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(fields.get("a"), Some(&FieldValue::Text("three".to_string())));
    }

    #[test]
    fn test_int_parsing() {
        let mut guard = Guard::new();
        guard.set("strength", "+5");
        guard.set("wisdom", " -2 ");
        guard.set("speed", "30 ft.");
        assert_eq!(guard.int("strength"), 5);
        assert_eq!(guard.int("wisdom"), -2);
        assert_eq!(guard.int("speed"), 0);
        assert_eq!(guard.int("missing"), 0);
        assert_eq!(guard.text("missing"), "");
    }

    #[test]
    fn test_gender_out_of_range() {
        let mut guard = Guard::new();
        guard.set("gender", 2);
        assert_eq!(guard.gender(), Gender::Other);
        guard.set("gender", 7);
        assert_eq!(guard.gender(), Gender::Male);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut fields = Fields::new();
        fields.set("Perception", 5);
        assert_eq!(fields.get("perception"), None);
        assert_eq!(fields.get_ignore_case("perception"), Some(&FieldValue::Int(5)));

        fields.set("Ärger", 4);
        assert_eq!(fields.get_ignore_case("ärger"), Some(&FieldValue::Int(4)));
    }

    #[test]
    fn test_field_display() {
        assert_eq!(FieldValue::Int(-3).to_string(), "-3");
        assert_eq!(FieldValue::Float(2.0).to_string(), "2.0");
        assert_eq!(FieldValue::Float(0.5).to_string(), "0.5");
        assert_eq!(FieldValue::from("Goblin").to_string(), "Goblin");
    }

    #[test]
    fn test_serde_preserves_order() {
        let mut guard = Guard::new().with_id(GuardId(4));
        guard.set("zeta", 1);
        guard.set("alpha", "x");
        let json = serde_json::to_string(&guard).unwrap();
        let back: Guard = serde_json::from_str(&json).unwrap();
        assert_eq!(back, guard);
        let keys: Vec<&str> = back.fields.keys().collect();
        assert_eq!(keys.last(), Some(&"alpha"));
    }

    #[test]
    fn test_traits() {
        let mut guard = Guard::new();
        guard.set("traits", "Goblinoid, , Humanoid");
        assert_eq!(guard.traits(), vec!["Goblinoid", "Humanoid"]);
    }
}
