//! Integration tests for ability text rendering.
//!
//! These exercise the public API end to end: records built per ruleset,
//! rendered through `Creature::render`, and printed as stat blocks.

use lorekeeper_core::testing::{
    sample_goblin, sample_pathfinder_goblin, sample_veteran, GuardBuilder,
};
use lorekeeper_core::{render, Ability, AbilityDetails, Creature, Ruleset, StatBlock};

// =============================================================================
// Bracket segments
// =============================================================================

#[test]
fn test_gendered_selection() {
    for (gender, expected) in [(0, "Strong"), (1, "Agile"), (2, "Graceful")] {
        let guard = GuardBuilder::new(Ruleset::Dnd5e).field("gender", gender).build();
        assert_eq!(guard.render("[Strong/Agile/Graceful]"), expected);
    }
}

#[test]
fn test_field_substitution_with_sign() {
    let guard = GuardBuilder::new(Ruleset::Pathfinder)
        .field("strength_modifier", 3)
        .build();
    assert_eq!(guard.render("[+strength_modifier]"), "+3");

    let guard = GuardBuilder::new(Ruleset::Pathfinder)
        .field("strength_modifier", -2)
        .build();
    assert_eq!(guard.render("[+strength_modifier]"), "-2");
}

#[test]
fn test_soft_failure_passthrough() {
    let guard = sample_goblin();
    assert_eq!(guard.render("[hello world]"), "helloworld");
    assert_eq!(guard.render("Roll [(1+] now"), "Roll (1+ now");
    assert_eq!(guard.render("no brackets here"), "no brackets here");
}

#[test]
fn test_name_special_case() {
    let goblin = GuardBuilder::new(Ruleset::Dnd5e)
        .field("name", "Goblin")
        .field("short_name", "")
        .field("gender", 0)
        .build();
    assert_eq!(goblin.render("[Name] attacks."), "Goblin attacks.");

    let goblin = GuardBuilder::new(Ruleset::Dnd5e)
        .field("name", "Goblin")
        .field("gender", 2)
        .build();
    assert_eq!(goblin.render("[Name] attacks."), "The goblin attacks.");
}

#[test]
fn test_short_name_is_preferred() {
    let boss = GuardBuilder::new(Ruleset::Dnd5e)
        .field("name", "Goblin Boss")
        .field("short_name", "Boss")
        .field("gender", 1)
        .build();
    assert_eq!(boss.render("Allies of [name] cheer."), "Allies of boss cheer.");
    assert_eq!(boss.render("[Name] shouts."), "Boss shouts.");
}

#[test]
fn test_dice_cleanup() {
    let guard = GuardBuilder::new(Ruleset::Dnd5e).build();
    assert_eq!(guard.render("2d6+0 fire"), "2d6 fire");
    assert_eq!(guard.render("2d6[+str] fire"), "2d6 fire");
    let once = guard.render("1d8[+str]+0 and 1d4-0.");
    assert_eq!(once, "1d8 and 1d4.");
    assert_eq!(guard.render(&once), once);
}

#[test]
fn test_whole_word_matching() {
    let guard = GuardBuilder::new(Ruleset::Dnd5e).field("strength", 18).build();
    assert_eq!(guard.render("[str]"), "4");
    assert_eq!(guard.render("[strength]"), "18");

    let guard = GuardBuilder::new(Ruleset::Adnd).field("str", 2).build();
    assert_eq!(guard.render("[strength]"), "strength");
    assert_eq!(guard.render("[strong]"), "strong");
}

#[test]
fn test_render_free_function_matches_trait() {
    let guard = sample_veteran();
    let text = "[Name] hits for 1d8[+str].";
    assert_eq!(render(&guard, text), guard.render(text));
    assert_eq!(guard.render(text), "Veteran hits for 1d8+3.");
}

// =============================================================================
// Ability library
// =============================================================================

#[test]
fn test_library_ability_with_details() {
    let library = Ruleset::Dnd5e.default_abilities();
    let melee = library
        .iter()
        .find(|a| a.name == "Melee Attack")
        .expect("library has a melee attack");

    let mut details: AbilityDetails = melee.details();
    details.set("Attack Name", "Greataxe");
    details.set("Damage", "1d12");
    let ability: Ability = melee.with_details(&details);

    let veteran = sample_veteran();
    assert_eq!(ability.rendered_title(&veteran), "Greataxe.");
    assert_eq!(
        ability.rendered_text(&veteran),
        "<i>Melee Weapon Attack:</i> +5 to hit, reach 5 ft., one target. \
         <i>Hit:</i> 1d12+3 slashing damage."
    );
}

#[test]
fn test_every_library_ability_renders() {
    for ruleset in [Ruleset::Dnd5e, Ruleset::Pathfinder] {
        let guard = ruleset.new_guard().expect("ruleset can create guards");
        for ability in ruleset.default_abilities() {
            let text = ability.rendered_text(&guard);
            assert!(!text.contains("[Name]"), "{} left a bracket: {text}", ability.name);
        }
    }
}

// =============================================================================
// Stat blocks
// =============================================================================

#[test]
fn test_goblin_stat_block() {
    let block = StatBlock::for_guard(&sample_goblin());
    let text = block.to_string();

    assert!(text.starts_with("Goblin\nSmall Humanoid (goblinoid), neutral evil\n"));
    assert_eq!(block.field("Armor Class"), Some("15 (leather armor, shield)"));
    assert_eq!(block.field("Hit Points"), Some("7 (2d6)"));
    assert_eq!(block.field("Senses"), Some("darkvision 60 ft., passive Perception 9"));
    assert_eq!(block.field("Challenge"), Some("1/4 (25 XP)"));
    assert!(text.contains("STR 8 (-1)  DEX 14 (+2)"));
    assert!(text.contains(
        "Scimitar. <i>Melee Weapon Attack:</i> +4 to hit, reach 5 ft., one target. \
         <i>Hit:</i> 1d6+2 slashing damage."
    ));
    assert!(text.contains(
        "Bonus Actions\nNimble Escape. The goblin can take the Disengage or Hide action \
         as a bonus action on each of its turns."
    ));
}

#[test]
fn test_veteran_stat_block() {
    let block = StatBlock::for_guard(&sample_veteran());
    let text = block.to_string();

    assert_eq!(block.field("Hit Points"), Some("58 (9d8+18)"));
    assert_eq!(block.field("Senses"), Some("passive Perception 12"));
    assert_eq!(block.field("Challenge"), Some("3 (450 XP)"));
    let actions = text.find("Multiattack.").expect("multiattack listed");
    let longsword = text.find("Longsword.").expect("longsword listed");
    assert!(actions < longsword, "higher priority first");
    assert!(text.contains("Reactions\nParry. Veteran adds 2 to his AC"));
}

#[test]
fn test_pathfinder_stat_block() {
    let text = StatBlock::for_guard(&sample_pathfinder_goblin()).to_string();
    assert!(text.starts_with("Goblin Warrior\nCreature -1\n"));
    assert!(text.contains("Small, Humanoid, Goblin"));
    assert!(text.contains("Perception +2; darkvision"));
    assert!(text.contains("Dogslicer (1 action) +7 (agile, backstabber, finesse)"));
    assert!(text.contains("AC 16; Fort +5, Ref +7, Will +3"));
}

#[test]
fn test_combatants() {
    let goblin = sample_goblin().to_combatant();
    assert_eq!(goblin.initiative_roll, "1d20+2");
    assert_eq!(goblin.label, "2 HD");
    assert_eq!(goblin.maximum_hit_points_roll, "2d6+0");
    assert_eq!(goblin.power, "CR 1/4");

    let warrior = sample_pathfinder_goblin().to_combatant();
    assert_eq!(warrior.initiative_roll, "1d20+2");
    assert_eq!(warrior.label, "Level -1");
}
