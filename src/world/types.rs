use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric identifier of a world entity. Unique only within its [`EntityKind`].
pub type Vnum = u32;

/// Clamp a percentage into `[0, 100]`. NaN collapses to zero.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Zone,
    Room,
    Object,
    Mobile,
    Script,
    Recipe,
    Shop,
}

impl EntityKind {
    /// Kinds tried, in order, when a bare vnum has to be auto-detected.
    pub const DETECTION_ORDER: [EntityKind; 5] = [
        EntityKind::Object,
        EntityKind::Mobile,
        EntityKind::Room,
        EntityKind::Script,
        EntityKind::Recipe,
    ];

    /// Kinds stored as `<zone>/<dir>/<vnum>.json`.
    pub const FILE_KINDS: [EntityKind; 6] = [
        EntityKind::Room,
        EntityKind::Object,
        EntityKind::Mobile,
        EntityKind::Script,
        EntityKind::Recipe,
        EntityKind::Shop,
    ];

    /// Directory name used inside a zone directory. Zones live in `<zone>/<zone>.json`.
    pub fn dir_name(self) -> Option<&'static str> {
        match self {
            EntityKind::Zone => None,
            EntityKind::Room => Some("room"),
            EntityKind::Object => Some("object"),
            EntityKind::Mobile => Some("mobile"),
            EntityKind::Script => Some("script"),
            EntityKind::Recipe => Some("assemble"),
            EntityKind::Shop => Some("shop"),
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::FILE_KINDS
            .into_iter()
            .find(|kind| kind.dir_name() == Some(name))
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Zone => "zone",
            EntityKind::Room => "room",
            EntityKind::Object => "object",
            EntityKind::Mobile => "mobile",
            EntityKind::Script => "script",
            EntityKind::Recipe => "recipe",
            EntityKind::Shop => "shop",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zone" => Ok(EntityKind::Zone),
            "room" | "wld" => Ok(EntityKind::Room),
            "object" | "obj" => Ok(EntityKind::Object),
            "mobile" | "mob" => Ok(EntityKind::Mobile),
            "script" | "trigger" => Ok(EntityKind::Script),
            "recipe" | "assemble" | "assembly" => Ok(EntityKind::Recipe),
            "shop" => Ok(EntityKind::Shop),
            other => Err(format!("unknown entity kind '{}'", other)),
        }
    }
}

/// Tagged reference to any world entity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub vnum: Vnum,
}

impl EntityRef {
    pub fn new(kind: EntityKind, vnum: Vnum) -> Self {
        Self { kind, vnum }
    }

    pub fn zone(vnum: Vnum) -> Self {
        Self::new(EntityKind::Zone, vnum)
    }

    pub fn room(vnum: Vnum) -> Self {
        Self::new(EntityKind::Room, vnum)
    }

    pub fn object(vnum: Vnum) -> Self {
        Self::new(EntityKind::Object, vnum)
    }

    pub fn mobile(vnum: Vnum) -> Self {
        Self::new(EntityKind::Mobile, vnum)
    }

    pub fn script(vnum: Vnum) -> Self {
        Self::new(EntityKind::Script, vnum)
    }

    pub fn recipe(vnum: Vnum) -> Self {
        Self::new(EntityKind::Recipe, vnum)
    }

    pub fn shop(vnum: Vnum) -> Self {
        Self::new(EntityKind::Shop, vnum)
    }

    /// Brief used when the entity cannot be loaded.
    pub fn missing_brief(&self) -> String {
        format!("[{}] ({} missing)", self.vnum, self.kind)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.vnum)
    }
}

// ============================================================================
// Zone reset commands
// ============================================================================

/// Typed form of a zone reset command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ResetOp {
    /// `M`/`W`: load a mobile into a room.
    LoadMobile { mobile: Vnum, room: Vnum, max: i64 },
    /// `O`/`X`: load an object into a room.
    LoadObject { object: Vnum, room: Vnum, max: i64 },
    /// `E`/`Z`: equip an object on the most recently loaded mobile.
    EquipObject { object: Vnum, position: i64, max: i64 },
    /// `G`/`Y`: give an object to the most recently loaded mobile.
    GiveObject { object: Vnum, max: i64 },
    /// `P`/`Q`: put an object into a container object.
    PutObject {
        object: Vnum,
        container: Vnum,
        max: i64,
    },
    /// `R`: remove an object from a room.
    RemoveObject { room: Vnum, object: Vnum },
    /// `D`: set a door state.
    Door { room: Vnum, direction: i64, state: i64 },
    /// `A`: randomize an exit.
    RandomizeExit { room: Vnum, direction: i64, zone: i64 },
    Other { arg1: i64, arg2: i64, arg3: i64 },
}

fn as_vnum(value: i64) -> Vnum {
    Vnum::try_from(value).unwrap_or(0)
}

impl ResetOp {
    pub fn from_args(code: &str, arg1: i64, arg2: i64, arg3: i64) -> Self {
        match code {
            "M" | "W" => ResetOp::LoadMobile {
                mobile: as_vnum(arg1),
                room: as_vnum(arg3),
                max: arg2,
            },
            "O" | "X" => ResetOp::LoadObject {
                object: as_vnum(arg1),
                room: as_vnum(arg3),
                max: arg2,
            },
            "E" | "Z" => ResetOp::EquipObject {
                object: as_vnum(arg1),
                position: arg3,
                max: arg2,
            },
            "G" | "Y" => ResetOp::GiveObject {
                object: as_vnum(arg1),
                max: arg2,
            },
            "P" | "Q" => ResetOp::PutObject {
                object: as_vnum(arg1),
                container: as_vnum(arg3),
                max: arg2,
            },
            "R" => ResetOp::RemoveObject {
                room: as_vnum(arg1),
                object: as_vnum(arg2),
            },
            "D" => ResetOp::Door {
                room: as_vnum(arg1),
                direction: arg2,
                state: arg3,
            },
            "A" => ResetOp::RandomizeExit {
                room: as_vnum(arg1),
                direction: arg2,
                zone: arg3,
            },
            _ => ResetOp::Other { arg1, arg2, arg3 },
        }
    }

    /// Object brought into the world by this command, if any.
    pub fn loaded_object(&self) -> Option<Vnum> {
        match self {
            ResetOp::LoadObject { object, .. }
            | ResetOp::EquipObject { object, .. }
            | ResetOp::GiveObject { object, .. }
            | ResetOp::PutObject { object, .. } => Some(*object),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResetCommand {
    /// Raw command letter as authored (`M`, `O`, `P`, ...).
    pub code: String,
    pub op: ResetOp,
    /// Declared probability in percent, clamped to `[0, 100]`.
    pub probability: f64,
    /// Conditional execution flag (`0` = always).
    #[serde(default)]
    pub if_flag: i64,
}

impl ResetCommand {
    pub fn parse(code: &str, arg1: i64, arg2: i64, arg3: i64) -> Self {
        let code = code.trim().to_ascii_uppercase();
        Self {
            op: ResetOp::from_args(&code, arg1, arg2, arg3),
            code,
            probability: 100.0,
            if_flag: 0,
        }
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = clamp_percent(probability);
        self
    }

    pub fn with_if_flag(mut self, flag: i64) -> Self {
        self.if_flag = flag;
        self
    }
}

// ============================================================================
// Zone metadata
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ZoneMeta {
    pub id: Vnum,
    pub name: String,
    pub author: String,
    #[serde(default)]
    pub top: Option<Vnum>,
    #[serde(default)]
    pub lifespan: Option<i64>,
    #[serde(default)]
    pub reset_mode: Option<i64>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub commands: Vec<ResetCommand>,
}

impl ZoneMeta {
    pub fn new(id: Vnum, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = author.to_string();
        self
    }

    pub fn with_flag(mut self, flag: &str) -> Self {
        if !self.has_flag(flag) {
            self.flags.push(flag.to_string());
        }
        self
    }

    pub fn with_command(mut self, command: ResetCommand) -> Self {
        self.commands.push(command);
        self
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f.eq_ignore_ascii_case(flag))
    }

    pub fn brief(&self) -> String {
        let name = if self.name.trim().is_empty() {
            "(no name)"
        } else {
            self.name.as_str()
        };
        if self.author.trim().is_empty() {
            format!("[{}] \"{}\"", self.id, name)
        } else {
            format!("[{}] \"{}\" by {}", self.id, name, self.author)
        }
    }
}

// ============================================================================
// Entity records
// ============================================================================

fn named(text: &Option<String>) -> Option<&str> {
    text.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// One stat modifier an object grants while worn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectApply {
    /// Index into the apply-type table.
    pub location: i64,
    pub modifier: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ObjectRecord {
    pub vnum: Vnum,
    pub zone: Vnum,
    pub short_desc: Option<String>,
    #[serde(default)]
    pub type_flag: Option<i64>,
    /// Space-separated keywords players type to refer to the object.
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weight: i64,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub wear_flags: u64,
    #[serde(default)]
    pub item_flags: u64,
    /// Abilities granted while worn, as an affect bitvector.
    #[serde(default)]
    pub affects: u64,
    /// Type-specific values `v0..v3`.
    #[serde(default)]
    pub values: [i64; 4],
    #[serde(default)]
    pub min_level: i64,
    #[serde(default)]
    pub applies: Vec<ObjectApply>,
}

impl ObjectRecord {
    pub fn new(vnum: Vnum, zone: Vnum, short_desc: &str) -> Self {
        Self {
            vnum,
            zone,
            short_desc: Some(short_desc.to_string()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_flag: i64) -> Self {
        self.type_flag = Some(type_flag);
        self
    }

    pub fn with_keywords(mut self, keywords: &str) -> Self {
        self.keywords = Some(keywords.to_string());
        self
    }

    pub fn with_values(mut self, values: [i64; 4]) -> Self {
        self.values = values;
        self
    }

    /// Text matched by entity search: short description, keywords and description.
    pub fn search_fields(&self) -> Vec<&str> {
        [&self.short_desc, &self.keywords, &self.description]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .collect()
    }

    pub fn brief(&self) -> String {
        match named(&self.short_desc) {
            Some(short) => match self.type_flag {
                Some(t) => format!("[{}] \"{}\" (type {})", self.vnum, short, t),
                None => format!("[{}] \"{}\"", self.vnum, short),
            },
            None => EntityRef::object(self.vnum).missing_brief(),
        }
    }
}

/// Object a mobile re-equips itself with on repop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Repop {
    pub object: Vnum,
    pub percent: f64,
    #[serde(default)]
    pub command: Option<String>,
}

/// Combat and reward numbers of a mobile prototype.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MobileStats {
    pub race: Option<i64>,
    pub sex: Option<i64>,
    pub max_hit: Option<i64>,
    pub armor: Option<i64>,
    pub hitroll: Option<i64>,
    pub damroll: Option<i64>,
    /// Damage dice as `(count, sides)`.
    pub damage_dice: Option<(i64, i64)>,
    pub attacks: Option<i64>,
    pub gold: Option<i64>,
    pub exp: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MobileRecord {
    pub vnum: Vnum,
    pub zone: Vnum,
    pub short_desc: Option<String>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub alignment: Option<i64>,
    /// Special procedure attached to the mobile, if any.
    #[serde(default)]
    pub spec_proc: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub repops: Vec<Repop>,
    #[serde(default)]
    pub keywords: Option<String>,
    /// Line shown when the mobile stands in a room.
    #[serde(default)]
    pub long_desc: Option<String>,
    #[serde(default)]
    pub stats: MobileStats,
    #[serde(default)]
    pub mob_flags: u64,
    /// Script vnums attached to the mobile.
    #[serde(default)]
    pub scripts: Vec<Vnum>,
}

impl MobileRecord {
    pub fn new(vnum: Vnum, zone: Vnum, short_desc: &str) -> Self {
        Self {
            vnum,
            zone,
            short_desc: Some(short_desc.to_string()),
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: i64) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_spec_proc(mut self, spec_proc: &str) -> Self {
        self.spec_proc = Some(spec_proc.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_repop(mut self, object: Vnum, percent: f64) -> Self {
        self.repops.push(Repop {
            object,
            percent: clamp_percent(percent),
            command: None,
        });
        self
    }

    pub fn with_keywords(mut self, keywords: &str) -> Self {
        self.keywords = Some(keywords.to_string());
        self
    }

    pub fn with_long_desc(mut self, long_desc: &str) -> Self {
        self.long_desc = Some(long_desc.to_string());
        self
    }

    pub fn with_script(mut self, script: Vnum) -> Self {
        self.scripts.push(script);
        self
    }

    /// Text matched by entity search: short description, keywords and room line.
    pub fn search_fields(&self) -> Vec<&str> {
        [&self.short_desc, &self.keywords, &self.long_desc]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .collect()
    }

    pub fn brief(&self) -> String {
        let Some(short) = named(&self.short_desc) else {
            return EntityRef::mobile(self.vnum).missing_brief();
        };
        let mut extra = Vec::new();
        if let Some(level) = self.level {
            extra.push(format!("lvl {}", level));
        }
        if let Some(align) = self.alignment {
            extra.push(format!("align {}", align));
        }
        if extra.is_empty() {
            format!("[{}] \"{}\"", self.vnum, short)
        } else {
            format!("[{}] \"{}\" ({})", self.vnum, short, extra.join(", "))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomRecord {
    pub vnum: Vnum,
    pub zone: Vnum,
    pub name: Option<String>,
}

impl RoomRecord {
    pub fn new(vnum: Vnum, zone: Vnum, name: &str) -> Self {
        Self {
            vnum,
            zone,
            name: Some(name.to_string()),
        }
    }

    pub fn brief(&self) -> String {
        match named(&self.name) {
            Some(name) => format!("[{}] \"{}\"", self.vnum, name),
            None => EntityRef::room(self.vnum).missing_brief(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScriptRecord {
    pub vnum: Vnum,
    pub zone: Vnum,
    pub name: Option<String>,
    #[serde(default)]
    pub script_type: Option<String>,
    #[serde(default)]
    pub trigger_type: Option<String>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub code: String,
}

impl ScriptRecord {
    pub fn brief(&self) -> String {
        let name = named(&self.name).unwrap_or("(no name)");
        let mut bits = Vec::new();
        if let Some(t) = &self.script_type {
            bits.push(format!("type={}", t));
        }
        if let Some(t) = &self.trigger_type {
            bits.push(format!("trigger={}", t));
        }
        if bits.is_empty() {
            format!("[{}] \"{}\"", self.vnum, name)
        } else {
            format!("[{}] \"{}\" ({})", self.vnum, name, bits.join(", "))
        }
    }
}

/// Raw assembly record as authored in `<zone>/assemble/<vnum>.json`.
///
/// Validation (missing result, no usable parts) happens in the recipe catalog so that
/// malformed files can be reported and skipped rather than failing the read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AssembleRecord {
    /// File vnum.
    pub vnum: Vnum,
    pub zone: Vnum,
    /// Result object vnum; `None` when absent or non-positive.
    pub result: Option<Vnum>,
    /// Usable part vnums in authored order (duplicates are extra units).
    pub parts: Vec<Vnum>,
    /// Declared success probability, if any.
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl AssembleRecord {
    pub fn brief(&self) -> String {
        match self.result {
            Some(result) => format!(
                "[{}] assembly of object {} ({} parts)",
                self.vnum,
                result,
                self.parts.len()
            ),
            None => format!("[{}] assembly (no result)", self.vnum),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShopRecord {
    pub vnum: Vnum,
    pub zone: Vnum,
    #[serde(default)]
    pub keeper: Option<Vnum>,
    #[serde(default)]
    pub rooms: Vec<Vnum>,
    /// Objects the shop always has in stock.
    #[serde(default)]
    pub producing: Vec<Vnum>,
}

impl ShopRecord {
    pub fn brief(&self) -> String {
        match self.keeper {
            Some(keeper) => format!(
                "[{}] shop kept by mobile {} ({} items)",
                self.vnum,
                keeper,
                self.producing.len()
            ),
            None => format!("[{}] shop ({} items)", self.vnum, self.producing.len()),
        }
    }
}

/// Any record the world accessor can return, tagged by kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Zone(ZoneMeta),
    Room(RoomRecord),
    Object(ObjectRecord),
    Mobile(MobileRecord),
    Script(ScriptRecord),
    Recipe(AssembleRecord),
    Shop(ShopRecord),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Zone(_) => EntityKind::Zone,
            Entity::Room(_) => EntityKind::Room,
            Entity::Object(_) => EntityKind::Object,
            Entity::Mobile(_) => EntityKind::Mobile,
            Entity::Script(_) => EntityKind::Script,
            Entity::Recipe(_) => EntityKind::Recipe,
            Entity::Shop(_) => EntityKind::Shop,
        }
    }

    pub fn vnum(&self) -> Vnum {
        match self {
            Entity::Zone(z) => z.id,
            Entity::Room(r) => r.vnum,
            Entity::Object(o) => o.vnum,
            Entity::Mobile(m) => m.vnum,
            Entity::Script(s) => s.vnum,
            Entity::Recipe(a) => a.vnum,
            Entity::Shop(s) => s.vnum,
        }
    }

    /// Zone the record was read from.
    pub fn zone(&self) -> Vnum {
        match self {
            Entity::Zone(z) => z.id,
            Entity::Room(r) => r.zone,
            Entity::Object(o) => o.zone,
            Entity::Mobile(m) => m.zone,
            Entity::Script(s) => s.zone,
            Entity::Recipe(a) => a.zone,
            Entity::Shop(s) => s.zone,
        }
    }

    pub fn reference(&self) -> EntityRef {
        EntityRef::new(self.kind(), self.vnum())
    }

    pub fn brief(&self) -> String {
        match self {
            Entity::Zone(z) => z.brief(),
            Entity::Room(r) => r.brief(),
            Entity::Object(o) => o.brief(),
            Entity::Mobile(m) => m.brief(),
            Entity::Script(s) => s.brief(),
            Entity::Recipe(a) => a.brief(),
            Entity::Shop(s) => s.brief(),
        }
    }
}

macro_rules! entity_from {
    ($($record:ident => $variant:ident),* $(,)?) => {
        $(impl From<$record> for Entity {
            fn from(record: $record) -> Self {
                Entity::$variant(record)
            }
        })*
    };
}

entity_from!(
    ZoneMeta => Zone,
    RoomRecord => Room,
    ObjectRecord => Object,
    MobileRecord => Mobile,
    ScriptRecord => Script,
    AssembleRecord => Recipe,
    ShopRecord => Shop,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_dir_names() {
        for kind in EntityKind::FILE_KINDS {
            let dir = kind.dir_name().expect("file kind has a dir");
            assert_eq!(EntityKind::from_dir_name(dir), Some(kind));
        }
        assert_eq!(EntityKind::Recipe.dir_name(), Some("assemble"));
        assert_eq!(EntityKind::from_dir_name("zone"), None);
    }

    #[test]
    fn kind_parses_common_aliases() {
        assert_eq!("obj".parse::<EntityKind>(), Ok(EntityKind::Object));
        assert_eq!("MOB".parse::<EntityKind>(), Ok(EntityKind::Mobile));
        assert_eq!("assemble".parse::<EntityKind>(), Ok(EntityKind::Recipe));
        assert!("planet".parse::<EntityKind>().is_err());
    }

    #[test]
    fn reset_ops_follow_command_letters() {
        assert_eq!(
            ResetCommand::parse("p", 10, 1, 20).op,
            ResetOp::PutObject {
                object: 10,
                container: 20,
                max: 1
            }
        );
        assert_eq!(
            ResetCommand::parse("W", 5, 2, 7).op,
            ResetOp::LoadMobile {
                mobile: 5,
                room: 7,
                max: 2
            }
        );
        assert!(matches!(
            ResetCommand::parse("S", 0, 0, 0).op,
            ResetOp::Other { .. }
        ));
        assert_eq!(ResetCommand::parse("R", 3001, 3005, 0).op.loaded_object(), None);
    }

    #[test]
    fn probability_is_clamped() {
        assert_eq!(ResetCommand::parse("O", 1, 1, 1).with_probability(250.0).probability, 100.0);
        assert_eq!(ResetCommand::parse("O", 1, 1, 1).with_probability(-3.0).probability, 0.0);
        assert_eq!(clamp_percent(f64::NAN), 0.0);
    }

    #[test]
    fn briefs_include_vnum_and_text() {
        let mut obj = ObjectRecord::new(3001, 30, "a rusty sword");
        obj.type_flag = Some(5);
        assert_eq!(obj.brief(), "[3001] \"a rusty sword\" (type 5)");

        let mob = MobileRecord::new(3010, 30, "the cityguard").with_level(12);
        assert_eq!(mob.brief(), "[3010] \"the cityguard\" (lvl 12)");

        let room = RoomRecord {
            vnum: 3000,
            zone: 30,
            name: Some("  ".to_string()),
        };
        assert_eq!(room.brief(), "[3000] (room missing)");
    }

    #[test]
    fn zone_flags_are_case_insensitive() {
        let zone = ZoneMeta::new(12, "Immortal Hall").with_flag("ADMIN").with_flag("admin");
        assert_eq!(zone.flags.len(), 1);
        assert!(zone.has_flag("Admin"));
    }
}
