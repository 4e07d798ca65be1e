//! Identify-style stat blocks for objects and mobiles.
//!
//! Numeric codes (item type, wear slots, flags, apply locations, races) are decoded with
//! the lookup tables below. Codes past the end of a table print as `Unknown(n)` or
//! `BIT#n` so nothing authored is silently dropped.

use crate::world::store::WorldData;
use crate::world::types::{Entity, EntityRef, MobileRecord, ObjectRecord};

pub const ITEM_TYPES: &[&str] = &[
    "UNDEFINED", "Light", "Scroll", "Wand", "Staff", "Weapon", "Fire-Weapon", "Missile",
    "Treasure", "Armor", "Potion", "Worn", "Other", "Trash", "Trap", "Container", "Note",
    "Liquid Container", "Key", "Food", "Money", "Pen", "Boat", "Fountain", "Portal", "Herb",
    "Instrument", "Warpstone", "Airship", "Ammunition", "For Sale Sign", "Recall Item", "Orb",
    "UNUSED", "UNUSED", "Grant Scroll", "Forage", "Mana Spike", "Token", "Reward", "Dye",
    "Event Scroll", "Reroll Scroll",
];

pub const WEAR_BITS: &[&str] = &[
    "Take", "Finger", "Neck", "Body", "Head", "Face", "Ear", "Legs", "Feet", "Hands", "Arms",
    "Shield", "About", "Waist", "Wrist", "Wield", "Hold", "Throw", "Two Hands", "Ankle",
    "Floating", "Orb",
];

pub const ITEM_FLAG_BITS: &[&str] = &[
    "Glowing", "Humming", "!Rent", "!Donate", "!Invis", "Invisible", "Magical", "Cursed",
    "Blessed", "!Good", "!Evil", "!Neutral", "^UNUSED", "^UNUSED", "^UNUSED", "^UNUSED", "!Sell",
    "^UNUSED", "^UNUSED", "Remort-Only", "!Mortal", "Limited", "Quest", "Junk", "!Purge",
    "^UNUSED", "^UNUSED", "Hidden", "UNUSED", "^UNUSED", "UNUSED", "String-Parsed", "!Locate",
    "Bonding", "UNUSED", "Inset", "UNUSED", "UNUSED", "UNUSED", "!Elf", "!Dwarf", "!Human",
    "!Neuter", "!Male", "!Female",
];

pub const AFFECT_BITS: &[&str] = &[
    "BLIND", "INVIS", "DET-ALIGN", "DET-INVIS", "DET-MAGIC", "SENSE-LIFE", "WATWALK", "SANCT",
    "^UNUSED", "^CURSE", "INFRA", "POISON", "PROT-EVIL", "PROT-GOOD", "^SLEEP", "^!TRACK",
    "^UNUSED", "^UNUSED", "SNEAK", "HIDE", "^UNUSED", "CHARM", "^UNUSED", "FLY", "PASSDOOR",
    "^UNUSED", "^UNUSED", "^UNUSED", "^UNUSED", "^UNUSED", "^UNUSED", "^UNUSED", "TRUESIGHT",
    "PENUMBRA", "SPIRIT", "WRAITH", "SCALE", "SHIFT", "BLOODLUST", "SHADOW", "ILLUSION",
    "METAMORPH", "HEAT", "FLAME", "FROST", "SHOCK", "ENERGY", "BLUNT", "PIERCE", "SLASH",
    "ENTROPY", "IMPACT",
];

pub const APPLY_TYPES: &[&str] = &[
    "NONE", "Strength", "Dexterity", "Intelligence", "Wisdom", "Constitution", "Charisma",
    "Class", "Level", "Age", "Weight", "Height", "Max-Mana", "Max-Hit", "Max-Move", "Gold", "Exp",
    "Armor", "Hitroll", "Damroll", "UNUSED", "UNUSED", "UNUSED", "UNUSED", "Saving Throw",
    "UNUSED", "Apply-All", "HP-Regen", "Mana-Regen", "Move-Regen", "Regen-All", "UNUSED",
    "Magic-Points", "Attacks", "PSPs", "Dam-Enhance", "UNUSED", "UNUSED", "UNUSED", "SpellFail",
    "Eat_Spell", "UNUSED", "Resist Fire", "Resist Cold", "Resist Elec", "Resist Energy",
    "Resist Blunt", "Resist Pierce", "Resist Slash", "Resist Entropy", "Resist Impact",
    "SpellDam", "SpellDam2", "SpellEnhance", "UNUSED", "UNUSED", "UNUSED", "Casts", "SpellCap",
    "SummonCap", "Haste", "HP", "Mana", "Move", "Quest Points", "Spell Damage Cap",
];

pub const DRINKS: &[&str] = &[
    "water", "beer", "wine", "ale", "dark ale", "whiskey", "lemonade", "firebreather",
    "local specialty", "slime mold juice", "milk", "tea", "coffee", "blood", "salt water",
    "clear water", "dr. pepper", "cherry slurpee", "milk shake", "klava", "jump juice",
];

pub const MOB_FLAG_BITS: &[&str] = &[
    "SPEC", "SENTINEL", "SCAVENGER", "ISNPC", "AWARE", "AGGR", "STAY-ZONE", "WIMPY", "AGGR_EVIL",
    "AGGR_GOOD", "AGGR_NEUTRAL", "MEMORY", "HELPER", "!CHARM", "!SUMMN", "!SLEEP", "!BASH",
    "!BLIND", "UNUSED", "UNUSED", "!NO_POISON", "UNUSED", "UNUSED", "UNUSED", "UNUSED", "UNUSED",
    "UNUSED", "!FIRE", "!COLD", "!ELEC", "!ENERGY", "!BLUNT", "!PIERCE", "!SLASH", "!ENTROPY",
    "!IMPACT", "HUNTER", "SUMMONED", "UNDEAD_NOT_ROT", "UNUSED", "DONTFIGHT", "!PUMMEL",
    "!PETRIFY", "RECALL", "^UNUSD", "!FIGHT_MOBS", "MAG_SUMMONS", "!STEAL", "QUEST",
];

const RACES: &[&str] = &[
    "Human", "Elven", "Dwarf", "Halfling", "Gnome", "Halfbreed", "Reptilian", "Special",
    "Lycanth", "Draconian", "Undead", "Orc", "Insect", "Arachnid", "Dinosaur", "Fish", "Bird",
    "Giant", "Predator", "Parasite", "Slime", "Demon", "Snake", "Herbiv", "Tree", "Veggie",
    "Faerie", "Planar", "Devil", "Ghost", "Goblin", "Troll", "Vegman", "Mindflayer", "Primate",
    "Enchanted", "Golem", "Dragon", "Elemental", "Ogre", "Humaned",
];

const ITEM_WEAPON: i64 = 5;
const ITEM_ARMOR: i64 = 9;
const ITEM_LIGHT: i64 = 1;
const ITEM_MISSILE: i64 = 7;
const ITEM_CONTAINER: i64 = 15;
const ITEM_DRINK_CONTAINER: i64 = 17;
const ITEM_FOOD: i64 = 19;
const ITEM_FOUNTAIN: i64 = 23;
const ITEM_PORTAL: i64 = 24;
const ITEM_WAND: i64 = 3;
const ITEM_STAFF: i64 = 4;

/// Name at `index`, or `Unknown(index)`.
pub fn sprint_type(index: i64, table: &[&str]) -> String {
    usize::try_from(index)
        .ok()
        .and_then(|i| table.get(i))
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Unknown({})", index))
}

/// Space-separated names of the set bits. Blank, `^`-prefixed and `UNUSED` slots are
/// skipped; bits past the table print as `BIT#n`. No bits set reads as `Nothing`.
pub fn sprint_bits(bits: u64, table: &[&str]) -> String {
    let names: Vec<String> = (0..64)
        .filter(|bit| bits & (1u64 << bit) != 0)
        .filter_map(|bit| match table.get(bit) {
            Some(name) if name.is_empty() || name.starts_with('^') => None,
            Some(name) if name.to_ascii_uppercase().starts_with("UNUSED") => None,
            Some(name) => Some(name.to_string()),
            None => Some(format!("BIT#{}", bit)),
        })
        .collect();
    if names.is_empty() {
        "Nothing".to_string()
    } else {
        names.join(" ")
    }
}

/// Average of `count` dice with `sides` faces.
pub fn dice_average(count: i64, sides: i64) -> f64 {
    (sides as f64 + 1.0) / 2.0 * count as f64
}

fn drink_name(index: i64) -> String {
    sprint_type(index, DRINKS)
}

fn type_specific_lines(obj: &ObjectRecord) -> Vec<String> {
    let [v0, v1, v2, v3] = obj.values;
    let mut lines = Vec::new();
    match obj.type_flag.unwrap_or(-1) {
        ITEM_WEAPON => lines.push(format!(
            "Damage Dice is '{}D{}', for an average per-round damage of {:.1}.",
            v1,
            v2,
            dice_average(v1, v2)
        )),
        ITEM_MISSILE => lines.push(format!(
            "Damage Dice is '{}D{}', for an average damage of {:.1} on impact.",
            v1,
            v2,
            dice_average(v1, v2)
        )),
        ITEM_ARMOR => lines.push(format!("AC-apply is {}", v0)),
        ITEM_LIGHT => lines.push(if v2 == -1 {
            "Hours left: [Infinite]".to_string()
        } else {
            format!("Hours left: [{}]", v2)
        }),
        ITEM_WAND | ITEM_STAFF => {
            lines.push(format!("Casts spell #{}", v3));
            lines.push(format!("It has {} maximum charge(s) and {} remaining.", v1, v2));
        }
        ITEM_CONTAINER => {
            lines.push(format!("Can hold {} items with a maximum weight of {}.", v0, v3));
            for (bit, text) in [
                (1, "This container can be closed."),
                (2, "This container is pickproof."),
                (4, "This container is currently closed."),
                (8, "This container is currently locked."),
            ] {
                if v1 & bit != 0 {
                    lines.push(text.to_string());
                }
            }
            if v2 > 0 {
                lines.push(format!("Key required: {}", v2));
            }
        }
        ITEM_DRINK_CONTAINER => {
            lines.push(format!("Can hold {} drink units.", v0));
            lines.push(format!("Contains {} drink units of {}.", v1, drink_name(v2)));
        }
        ITEM_FOOD => {
            lines.push(format!("This food will fill you up by {} hours.", v0));
            if v1 > 0 {
                lines.push(format!("This food is poisoned (poison level: {}).", v1));
            }
        }
        ITEM_FOUNTAIN => {
            lines.push(format!("This fountain contains {}.", drink_name(v2)));
            lines.push(format!("Drink units available: {}", v1));
        }
        ITEM_PORTAL => {
            lines.push(format!("This portal leads to room {}.", v0));
            if v1 > 0 {
                lines.push(format!("Portal key required: {}", v1));
            }
        }
        _ => {}
    }
    lines
}

/// Stat block of an object, roughly what the in-game identify spell shows.
pub fn identify_object(obj: &ObjectRecord) -> Vec<String> {
    let short = obj.short_desc.as_deref().unwrap_or("(no short_desc)");
    let mut lines = vec![
        format!("=== Object [{}] '{}' ===", obj.vnum, short),
        format!(
            "Item type: {}",
            obj.type_flag
                .map(|t| sprint_type(t, ITEM_TYPES))
                .unwrap_or_else(|| "(none)".to_string())
        ),
    ];
    if let Some(keywords) = obj.keywords.as_deref().filter(|k| !k.trim().is_empty()) {
        lines.push(format!("Keywords: {}", keywords));
    }
    lines.push(format!("Can be worn on: {}", sprint_bits(obj.wear_flags, WEAR_BITS)));
    if obj.affects != 0 {
        lines.push(format!(
            "Item will give you the following abilities: {}",
            sprint_bits(obj.affects, AFFECT_BITS)
        ));
    }
    if obj.item_flags != 0 {
        lines.push(format!("Item is: {}", sprint_bits(obj.item_flags, ITEM_FLAG_BITS)));
    }
    lines.push(format!("Weight: {}, Value: {}", obj.weight, obj.cost));
    lines.extend(type_specific_lines(obj));
    if obj.min_level > 0 {
        lines.push(format!("You must be at least level {} to use this.", obj.min_level));
    }
    if !obj.applies.is_empty() {
        lines.push("Can affect you as :".to_string());
        for apply in &obj.applies {
            lines.push(format!(
                "   Affects: {} By {}",
                sprint_type(apply.location, APPLY_TYPES),
                apply.modifier
            ));
        }
    }
    if let Some(description) = obj.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(format!("Room description: {}", description.trim_end()));
    }
    lines
}

fn sex_name(sex: i64) -> String {
    match sex {
        0 => "Neuter".to_string(),
        1 => "Male".to_string(),
        2 => "Female".to_string(),
        other => format!("Unknown({})", other),
    }
}

fn race_name(race: i64) -> String {
    usize::try_from(race)
        .ok()
        .and_then(|i| RACES.get(i))
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("Race#{}", race))
}

/// Stat block of a mobile with its scripts and repop equipment resolved through `world`.
pub fn identify_mobile(mob: &MobileRecord, world: &dyn WorldData) -> Vec<String> {
    let short = mob.short_desc.as_deref().unwrap_or("(no short)");
    let stats = &mob.stats;
    let mut lines = vec![format!("=== Mobile [{}] '{}' ===", mob.vnum, short)];
    if let Some(keywords) = mob.keywords.as_deref().filter(|k| !k.trim().is_empty()) {
        lines.push(format!("Keywords: {}", keywords));
    }
    if let Some(long) = mob.long_desc.as_deref().filter(|l| !l.trim().is_empty()) {
        lines.push(format!("Long: {}", long.trim_end()));
    }
    lines.push(format!(
        "Level {}  Alignment {}",
        mob.level.unwrap_or(0),
        mob.alignment.unwrap_or(0)
    ));
    if stats.race.is_some() || stats.sex.is_some() {
        lines.push(format!(
            "Race: {}  Sex: {}",
            race_name(stats.race.unwrap_or(0)),
            sex_name(stats.sex.unwrap_or(0))
        ));
    }
    lines.push(format!(
        "HP {}  AC {}  Hitroll {}  Damroll {}",
        stats.max_hit.unwrap_or(0),
        stats.armor.unwrap_or(0),
        stats.hitroll.unwrap_or(0),
        stats.damroll.unwrap_or(0)
    ));
    if let Some((count, sides)) = stats.damage_dice {
        lines.push(format!(
            "Damage Dice {}D{} (avg {:.1} before damroll)",
            count,
            sides,
            dice_average(count, sides)
        ));
    }
    if let Some(attacks) = stats.attacks.filter(|a| *a > 0) {
        lines.push(format!("Attacks: {}", attacks));
    }
    lines.push(format!(
        "Gold {}  Exp {}",
        stats.gold.unwrap_or(0),
        stats.exp.unwrap_or(0)
    ));
    lines.push(format!("Mob flags: {}", sprint_bits(mob.mob_flags, MOB_FLAG_BITS)));
    if let Some(spec_proc) = &mob.spec_proc {
        lines.push(format!("Spec proc: {}", spec_proc));
    }

    if !mob.scripts.is_empty() {
        lines.push("Scripts:".to_string());
        for script in &mob.scripts {
            let line = match world.get(EntityRef::script(*script)) {
                Ok(Entity::Script(record)) => format!("  - {}", record.brief()),
                _ => format!("  - {} (script missing)", script),
            };
            lines.push(line);
        }
    }
    if !mob.repops.is_empty() {
        lines.push("Equipment:".to_string());
        for repop in &mob.repops {
            lines.push(format!(
                "  - {} ({}% chance)",
                world.brief_of(EntityRef::object(repop.object)),
                repop.percent
            ));
        }
    }
    if let Some(description) = mob.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push("Description:".to_string());
        lines.extend(description.trim_end().lines().map(|l| format!("  {}", l)));
    }
    lines
}
