//! JSON readers for the on-disk world layout.
//!
//! Each file is first decoded into a private `*Seed` struct that mirrors the authored
//! format (field aliases, loosely typed numbers) and is then converted into the typed
//! records from [`crate::world::types`]. Numbers are read leniently: integers, floats and
//! numeric strings are all accepted, anything else reads as absent.

use crate::world::errors::WorldError;
use crate::world::types::{
    clamp_percent, AssembleRecord, Entity, EntityKind, MobileRecord, MobileStats, ObjectApply,
    ObjectRecord, Repop, ResetCommand, RoomRecord, ScriptRecord, ShopRecord, Vnum, ZoneMeta,
};
use log::debug;
use serde::Deserialize;
use serde_json::Value;

/// Read an integer out of a loosely typed JSON value.
pub fn lenient_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn lenient_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Positive vnum, or `None` for zero, negative and non-numeric values.
pub fn lenient_vnum(value: &Value) -> Option<Vnum> {
    lenient_int(value)
        .filter(|n| *n > 0)
        .and_then(|n| Vnum::try_from(n).ok())
}

fn opt_int(value: &Option<Value>) -> Option<i64> {
    value.as_ref().and_then(lenient_int)
}

/// Read a flag bitvector: an integer, a `0x` hex string, a string of `0`/`1` digits
/// (most significant bit first) or a decimal string. Anything else reads as no bits.
pub fn lenient_bits(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i as u64))
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::Bool(b) => u64::from(*b),
        Value::String(s) => {
            let s = s.trim();
            if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                u64::from_str_radix(hex, 16).unwrap_or(0)
            } else if !s.is_empty() && s.chars().all(|c| c == '0' || c == '1') {
                u64::from_str_radix(s, 2).unwrap_or(0)
            } else {
                s.parse::<u64>().unwrap_or(0)
            }
        }
        _ => 0,
    }
}

fn opt_bits(value: &Option<Value>) -> u64 {
    value.as_ref().map(lenient_bits).unwrap_or(0)
}

fn opt_text(value: &Option<Value>) -> Option<String> {
    match value.as_ref()? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-blank text among candidate fields.
fn first_text(candidates: &[&Option<Value>]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|v| opt_text(v))
        .find(|s| !s.trim().is_empty())
}

fn text_list(value: &Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| opt_text(&Some(item.clone())))
            .collect(),
        Some(Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Vnums out of a list of numbers or `{ "vnum": n }` objects. Unusable entries are dropped.
fn vnum_list(value: &Option<Value>) -> Vec<Vnum> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(map) => map.get("vnum").and_then(lenient_vnum),
            other => lenient_vnum(other),
        })
        .collect()
}

/// Zone flags may be authored as a list, a separated string or a bare integer bitmask.
fn parse_flags(value: &Option<Value>) -> Vec<String> {
    let mut flags: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s
            .split(|c: char| c.is_whitespace() || c == ',')
            .map(str::to_string)
            .collect(),
        Some(Value::Number(n)) if lenient_int(&Value::Number(n.clone())) != Some(0) => {
            vec![n.to_string()]
        }
        _ => Vec::new(),
    };
    flags.retain(|f| !f.is_empty());
    flags
}

fn decode<'de, T: Deserialize<'de>>(context: &str, contents: &'de str) -> Result<T, WorldError> {
    serde_json::from_str(contents).map_err(|e| WorldError::json(context, e))
}

// ============================================================================
// Zones
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ZoneSeed {
    zone: Option<Value>,
    name: Option<Value>,
    author: Option<Value>,
    top: Option<Value>,
    lifespan: Option<Value>,
    reset_mode: Option<Value>,
    flags: Option<Value>,
    #[serde(alias = "commands")]
    cmds: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommandSeed {
    #[serde(alias = "command")]
    cmd: Option<Value>,
    #[serde(alias = "vnum")]
    arg1: Option<Value>,
    #[serde(alias = "max")]
    arg2: Option<Value>,
    #[serde(alias = "room")]
    arg3: Option<Value>,
    #[serde(alias = "percent")]
    prob: Option<Value>,
    flag: Option<Value>,
}

impl CommandSeed {
    fn into_command(self) -> Option<ResetCommand> {
        let code = opt_text(&self.cmd)?;
        if code.trim().is_empty() {
            return None;
        }
        let probability = self.prob.as_ref().and_then(lenient_float).unwrap_or(100.0);
        Some(
            ResetCommand::parse(
                &code,
                opt_int(&self.arg1).unwrap_or(0),
                opt_int(&self.arg2).unwrap_or(0),
                opt_int(&self.arg3).unwrap_or(0),
            )
            .with_probability(probability)
            .with_if_flag(opt_int(&self.flag).unwrap_or(0)),
        )
    }
}

/// Parse `<zone>/<zone>.json`. The directory id wins over the `zone` field.
pub fn parse_zone(id: Vnum, contents: &str) -> Result<ZoneMeta, WorldError> {
    let seed: ZoneSeed = decode(&format!("zone {}", id), contents)?;

    if let Some(declared) = seed.zone.as_ref().and_then(lenient_vnum) {
        if declared != id {
            debug!("zone file in directory {} declares zone {}", id, declared);
        }
    }

    let mut commands = Vec::new();
    if let Some(Value::Array(entries)) = seed.cmds {
        for (index, entry) in entries.into_iter().enumerate() {
            if !entry.is_object() {
                debug!("zone {}: ignoring non-object reset entry {}", id, index);
                continue;
            }
            match serde_json::from_value::<CommandSeed>(entry) {
                Ok(cmd) => commands.extend(cmd.into_command()),
                Err(e) => debug!("zone {}: unreadable reset entry {}: {}", id, index, e),
            }
        }
    }

    Ok(ZoneMeta {
        id,
        name: opt_text(&seed.name).unwrap_or_default(),
        author: opt_text(&seed.author).unwrap_or_default(),
        top: seed.top.as_ref().and_then(lenient_vnum),
        lifespan: opt_int(&seed.lifespan),
        reset_mode: opt_int(&seed.reset_mode),
        flags: parse_flags(&seed.flags),
        commands,
    })
}

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ObjectSeed {
    short_desc: Option<Value>,
    short_descr: Option<Value>,
    name: Option<Value>,
    description: Option<Value>,
    type_flag: Option<Value>,
    weight: Option<Value>,
    cost: Option<Value>,
    wear_flags: Option<Value>,
    item_flags: Option<Value>,
    affs: Option<Value>,
    v0: Option<Value>,
    v1: Option<Value>,
    v2: Option<Value>,
    v3: Option<Value>,
    min_level: Option<Value>,
    #[serde(alias = "applies")]
    applys: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApplySeed {
    #[serde(rename = "type", alias = "location")]
    location: Option<Value>,
    modifier: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RepopSeed {
    vnum: Option<Value>,
    arg1: Option<Value>,
    obj: Option<Value>,
    #[serde(alias = "prob")]
    percent: Option<Value>,
    #[serde(alias = "cmd")]
    command: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MobileSeed {
    short_descr: Option<Value>,
    short_desc: Option<Value>,
    name: Option<Value>,
    long_descr: Option<Value>,
    long_desc: Option<Value>,
    level: Option<Value>,
    alignment: Option<Value>,
    spec_proc: Option<Value>,
    description: Option<Value>,
    repops: Option<Value>,
    race: Option<Value>,
    sex: Option<Value>,
    max_hit: Option<Value>,
    armor: Option<Value>,
    hitroll: Option<Value>,
    damroll: Option<Value>,
    damnodice: Option<Value>,
    damsizedice: Option<Value>,
    attacks: Option<Value>,
    gold: Option<Value>,
    exp: Option<Value>,
    mob_flags: Option<Value>,
    scripts: Option<Value>,
}

impl MobileSeed {
    fn stats(&self) -> MobileStats {
        let dice = match (opt_int(&self.damnodice), opt_int(&self.damsizedice)) {
            (Some(count), Some(sides)) if count > 0 && sides > 0 => Some((count, sides)),
            _ => None,
        };
        MobileStats {
            race: opt_int(&self.race),
            sex: opt_int(&self.sex),
            max_hit: opt_int(&self.max_hit),
            armor: opt_int(&self.armor),
            hitroll: opt_int(&self.hitroll),
            damroll: opt_int(&self.damroll),
            damage_dice: dice,
            attacks: opt_int(&self.attacks),
            gold: opt_int(&self.gold),
            exp: opt_int(&self.exp),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RoomSeed {
    name: Option<Value>,
    title: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScriptSeed {
    name: Option<Value>,
    #[serde(rename = "type")]
    script_type: Option<Value>,
    trigger_type: Option<Value>,
    level: Option<Value>,
    code: Option<Value>,
    script: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AssembleSeed {
    vnum: Option<Value>,
    parts: Option<Value>,
    cmd: Option<Value>,
    keywords: Option<Value>,
    prob: Option<Value>,
    percent: Option<Value>,
    probability: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ShopSeed {
    keeper: Option<Value>,
    rooms: Option<Value>,
    producing: Option<Value>,
    products: Option<Value>,
    sells: Option<Value>,
}

fn parse_repops(value: &Option<Value>) -> Vec<Repop> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|item| item.is_object())
        .filter_map(|item| serde_json::from_value::<RepopSeed>(item.clone()).ok())
        .filter_map(|seed| {
            let object = [&seed.vnum, &seed.arg1, &seed.obj]
                .into_iter()
                .find_map(|v| v.as_ref().and_then(lenient_vnum))?;
            Some(Repop {
                object,
                percent: clamp_percent(
                    seed.percent.as_ref().and_then(lenient_float).unwrap_or(100.0),
                ),
                command: opt_text(&seed.command),
            })
        })
        .collect()
}

/// Applies come as a list of `{type, modifier}` objects or as a map keyed by slot
/// number. Entries with a zero location or modifier are dropped.
fn parse_applies(value: &Option<Value>) -> Vec<ObjectApply> {
    let entries: Vec<&Value> = match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => {
            let mut slots: Vec<(i64, &Value)> = map
                .iter()
                .map(|(slot, entry)| (slot.parse::<i64>().unwrap_or(i64::MAX), entry))
                .collect();
            slots.sort_by_key(|(slot, _)| *slot);
            slots.into_iter().map(|(_, entry)| entry).collect()
        }
        _ => Vec::new(),
    };
    entries
        .into_iter()
        .filter(|entry| entry.is_object())
        .filter_map(|entry| serde_json::from_value::<ApplySeed>(entry.clone()).ok())
        .filter_map(|seed| {
            let location = opt_int(&seed.location).filter(|l| *l != 0)?;
            let modifier = opt_int(&seed.modifier).filter(|m| *m != 0)?;
            Some(ObjectApply { location, modifier })
        })
        .collect()
}

/// Parse one `<zone>/<kind>/<vnum>.json` file into its typed record.
pub fn parse_entity(
    kind: EntityKind,
    vnum: Vnum,
    zone: Vnum,
    contents: &str,
) -> Result<Entity, WorldError> {
    let context = format!("{} {} (zone {})", kind, vnum, zone);
    let entity = match kind {
        EntityKind::Zone => Entity::Zone(parse_zone(vnum, contents)?),
        EntityKind::Object => {
            let seed: ObjectSeed = decode(&context, contents)?;
            Entity::Object(ObjectRecord {
                vnum,
                zone,
                short_desc: first_text(&[&seed.short_desc, &seed.short_descr, &seed.name]),
                type_flag: opt_int(&seed.type_flag),
                keywords: first_text(&[&seed.name]),
                description: first_text(&[&seed.description]),
                weight: opt_int(&seed.weight).unwrap_or(0),
                cost: opt_int(&seed.cost).unwrap_or(0),
                wear_flags: opt_bits(&seed.wear_flags),
                item_flags: opt_bits(&seed.item_flags),
                affects: opt_bits(&seed.affs),
                values: [&seed.v0, &seed.v1, &seed.v2, &seed.v3].map(|v| opt_int(v).unwrap_or(0)),
                min_level: opt_int(&seed.min_level).unwrap_or(0),
                applies: parse_applies(&seed.applys),
            })
        }
        EntityKind::Mobile => {
            let seed: MobileSeed = decode(&context, contents)?;
            Entity::Mobile(MobileRecord {
                vnum,
                zone,
                short_desc: first_text(&[&seed.short_descr, &seed.short_desc, &seed.name]),
                level: opt_int(&seed.level),
                alignment: opt_int(&seed.alignment),
                spec_proc: first_text(&[&seed.spec_proc]),
                description: opt_text(&seed.description),
                repops: parse_repops(&seed.repops),
                keywords: first_text(&[&seed.name]),
                long_desc: first_text(&[&seed.long_descr, &seed.long_desc]),
                stats: seed.stats(),
                mob_flags: opt_bits(&seed.mob_flags),
                scripts: vnum_list(&seed.scripts),
            })
        }
        EntityKind::Room => {
            let seed: RoomSeed = decode(&context, contents)?;
            Entity::Room(RoomRecord {
                vnum,
                zone,
                name: first_text(&[&seed.name, &seed.title]),
            })
        }
        EntityKind::Script => {
            let seed: ScriptSeed = decode(&context, contents)?;
            Entity::Script(ScriptRecord {
                vnum,
                zone,
                name: opt_text(&seed.name),
                script_type: opt_text(&seed.script_type),
                trigger_type: opt_text(&seed.trigger_type),
                level: opt_int(&seed.level),
                code: first_text(&[&seed.code, &seed.script]).unwrap_or_default(),
            })
        }
        EntityKind::Recipe => {
            let seed: AssembleSeed = decode(&context, contents)?;
            let probability = [&seed.prob, &seed.percent, &seed.probability]
                .into_iter()
                .find_map(|v| v.as_ref().and_then(lenient_float));
            Entity::Recipe(AssembleRecord {
                vnum,
                zone,
                result: seed.vnum.as_ref().and_then(lenient_vnum),
                parts: vnum_list(&seed.parts),
                probability,
                commands: text_list(&seed.cmd),
                keywords: text_list(&seed.keywords),
            })
        }
        EntityKind::Shop => {
            let seed: ShopSeed = decode(&context, contents)?;
            let stock = [&seed.producing, &seed.products, &seed.sells]
                .into_iter()
                .find(|v| matches!(v, Some(Value::Array(_))))
                .map(|v| vnum_list(v))
                .unwrap_or_default();
            Entity::Shop(ShopRecord {
                vnum,
                zone,
                keeper: seed.keeper.as_ref().and_then(lenient_vnum),
                rooms: vnum_list(&seed.rooms),
                producing: stock,
            })
        }
    };
    Ok(entity)
}
