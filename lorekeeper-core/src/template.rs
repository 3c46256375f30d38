//! Bracket templating for authored ability text.
//!
//! Ability text such as `"[Name] deals 1d6[+str] damage"` is written once
//! and rendered per creature. Each `[...]` segment is one of:
//!
//! - a gendered triple `[he/she/it]`, picking the creature's gender slot;
//! - an arithmetic expression over property names, `[+prof+str]`, rendered
//!   as a number (with an explicit sign when the segment starts with one);
//! - anything else, which is rendered with known names substituted but
//!   otherwise as written.
//!
//! Rendering never fails. Segments that cannot be evaluated degrade to
//! their substituted text so a single bad bracket cannot break a stat block.

use crate::dice::simplify_zero_modifiers;
use crate::expr::{self, Number};
use crate::guard::Creature;
use crate::properties::resolve;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// A non-nested bracket segment.
    static ref BRACKET: Regex = Regex::new(r"\[([^\]]*)\]").expect("valid bracket pattern");

    /// Three slash-separated alternatives.
    static ref GENDERED: Regex =
        Regex::new(r"([^/]*)/([^/]*)/([^/]*)").expect("valid gendered pattern");

    /// Inline markup tags, carried through untouched.
    static ref MARKUP: Regex = Regex::new(r"<.*?>").expect("valid markup pattern");
}

/// Render authored text for a creature.
///
/// Every bracket segment is replaced by its rendered form, text outside
/// brackets is kept verbatim, and the finished string gets a final dice
/// cleanup pass (`2d6+0` becomes `2d6`).
pub fn render<C: Creature + ?Sized>(creature: &C, text: &str) -> String {
    let expanded = BRACKET.replace_all(text, |caps: &Captures| render_segment(creature, &caps[1]));
    simplify_zero_modifiers(&expanded).into_owned()
}

/// Render the inner content of one bracket segment.
pub fn render_segment<C: Creature + ?Sized>(creature: &C, content: &str) -> String {
    let prefix: String = MARKUP.find_iter(content).map(|m| m.as_str()).collect();
    let content = MARKUP.replace_all(content, "");

    if GENDERED.is_match(&content) {
        let slot = creature.record().gender().index() + 1;
        let selected = GENDERED.replace_all(&content, |caps: &Captures| caps[slot].to_string());
        return prefix + &selected;
    }

    let content = content.replace(' ', "");
    let Some(first) = content.chars().next() else {
        return String::new();
    };
    let signed = matches!(first, '+' | '-');
    let upper = first.is_uppercase();

    let substituted = creature
        .resolver()
        .substitute(&content, |word| resolve(creature, word));

    let mut result = match expr::evaluate(&substituted) {
        Ok(number) => format_number(number, signed),
        Err(err) => {
            tracing::trace!(
                segment = %content,
                substituted = %substituted,
                %err,
                "bracket left unevaluated"
            );
            substituted.into_owned()
        }
    };

    if upper {
        result = capitalize(&result);
    }
    prefix + &result
}

fn format_number(number: Number, signed: bool) -> String {
    if signed {
        number.signed()
    } else {
        number.to_string()
    }
}

/// First character uppercased, the rest lowercased.
pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::Guard;
    use crate::properties::PropertyResolver;

    /// A creature with one derived property, `str`.
    struct Brute {
        record: Guard,
        resolver: PropertyResolver,
    }

    impl Brute {
        fn new(record: Guard) -> Self {
            let resolver = PropertyResolver::from_names(
                std::iter::once("str").chain(record.fields.keys()),
            );
            Self { record, resolver }
        }
    }

    impl Creature for Brute {
        fn record(&self) -> &Guard {
            &self.record
        }

        fn resolver(&self) -> &PropertyResolver {
            &self.resolver
        }

        fn derived(&self, name: &str) -> Option<i64> {
            (name == "str").then(|| (self.record.int("strength") - 10).div_euclid(2))
        }
    }

    fn brute(name: &str, gender: i64, strength: i64) -> Brute {
        let mut record = Guard::new();
        record.set("name", name);
        record.set("gender", gender);
        record.set("strength", strength);
        Brute::new(record)
    }

    #[test]
    fn test_gendered_triple() {
        for (gender, expected) in [(0, "Strong"), (1, "Agile"), (2, "Graceful")] {
            let creature = brute("Ogre", gender, 10);
            assert_eq!(render(&creature, "[Strong/Agile/Graceful]"), expected);
        }
    }

    #[test]
    fn test_gendered_keeps_spaces_and_markup() {
        let creature = brute("Ogre", 1, 10);
        assert_eq!(render(&creature, "[<i>he / she / it</i>] roars"), "<i></i> she  roars");
    }

    #[test]
    fn test_signed_arithmetic() {
        let creature = brute("Ogre", 0, 16);
        assert_eq!(render(&creature, "[+str]"), "+3");
        assert_eq!(render(&creature, "[str]"), "3");
        assert_eq!(render(&creature, "DC [8 + str + 2]"), "DC 13");

        let weak = brute("Kobold", 0, 7);
        assert_eq!(render(&weak, "[+str]"), "-2");
    }

    #[test]
    fn test_soft_failure() {
        let creature = brute("Ogre", 0, 10);
        assert_eq!(render(&creature, "[hello world]"), "helloworld");
        assert_eq!(render(&creature, "[1/0]"), "1/0");
        assert_eq!(render(&creature, "[str+]"), "0+");
    }

    #[test]
    fn test_empty_segment_disappears() {
        let creature = brute("Ogre", 0, 10);
        assert_eq!(render(&creature, "a[]b[   ]c"), "abc");
        assert_eq!(render(&creature, "a[<b></b>]c"), "ac");
    }

    #[test]
    fn test_name_and_capitalization() {
        let creature = brute("Goblin", 0, 10);
        assert_eq!(render(&creature, "[Name] attacks."), "Goblin attacks.");
        assert_eq!(render(&creature, "[name] attacks."), "Goblin attacks.");

        let object = brute("Goblin", 2, 10);
        assert_eq!(render(&object, "[Name] attacks."), "The goblin attacks.");
        assert_eq!(render(&object, "hits [name]."), "hits the Goblin.");
    }

    #[test]
    fn test_capitalization_ignores_leading_spaces() {
        let object = brute("Goblin", 2, 10);
        assert_eq!(render(&object, "[ Name] attacks."), "The goblin attacks.");
        assert_eq!(render(&object, "[ name] attacks."), "the Goblin attacks.");
    }

    #[test]
    fn test_non_ascii_field_names() {
        let mut record = Guard::new();
        record.set("Ärger", 4);
        let creature = Brute::new(record);
        assert_eq!(render(&creature, "rage [Ärger]"), "rage 4");
        assert_eq!(render(&creature, "rage [+ärger]"), "rage +4");
    }

    #[test]
    fn test_whole_word_substitution() {
        let creature = brute("Ogre", 0, 18);
        assert_eq!(render(&creature, "[str]"), "4");
        assert_eq!(render(&creature, "[strength]"), "18");
        assert_eq!(render(&creature, "[strong]"), "strong");
    }

    #[test]
    fn test_markup_prefix() {
        let creature = brute("Ogre", 0, 14);
        assert_eq!(render(&creature, "[<b>+str</b>]"), "<b></b>+2");
    }

    #[test]
    fn test_dice_cleanup_after_brackets() {
        let creature = brute("Ogre", 0, 10);
        assert_eq!(
            render(&creature, "<i>Hit:</i> 2d6[+str] bludgeoning damage."),
            "<i>Hit:</i> 2d6 bludgeoning damage."
        );
    }

    #[test]
    fn test_unclosed_bracket_passes_through() {
        let creature = brute("Ogre", 0, 10);
        assert_eq!(render(&creature, "[str and more"), "[str and more");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("the goblin"), "The goblin");
        assert_eq!(capitalize("GOBLIN Boss"), "Goblin boss");
        assert_eq!(capitalize(""), "");
    }
}
