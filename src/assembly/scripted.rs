//! Items produced by special procedures or scripts instead of assembly recipes.
//!
//! Such items cannot be discovered from reset commands or assembly files, so they are
//! listed by hand. The built-in table is versioned with [`REGISTRY_VERSION`]; deployments
//! add or override entries through `[[scripted_items]]` in the configuration file.

use crate::assembly::zones::ZoneAccessibility;
use crate::config::ScriptedItemConfig;
use crate::world::{Entity, EntityRef, Vnum, WorldData};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bumped whenever the built-in table changes.
pub const REGISTRY_VERSION: u32 = 1;

struct BuiltinEntry {
    target: Vnum,
    target_name: &'static str,
    creator: Vnum,
    creator_name: &'static str,
    creator_zone: Vnum,
    procedure: &'static str,
    requirements: &'static str,
}

const BUILTIN_ENTRIES: &[BuiltinEntry] = &[BuiltinEntry {
    target: 19002,
    target_name: "the Armor of the Gods",
    creator: 18226,
    creator_name: "Kharas",
    creator_zone: 180,
    procedure: "mob_kharas",
    requirements: "Bring Kharas his hammer and materials",
}];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCreatedEntry {
    pub target: EntityRef,
    pub target_name: String,
    /// Mobile running the procedure.
    pub creator: EntityRef,
    pub creator_name: String,
    pub creator_zone: Vnum,
    pub procedure: String,
    pub requirements: String,
}

impl ScriptCreatedEntry {
    pub fn new(target: Vnum, creator: Vnum, creator_zone: Vnum, procedure: &str) -> Self {
        Self {
            target: EntityRef::object(target),
            target_name: String::new(),
            creator: EntityRef::mobile(creator),
            creator_name: String::new(),
            creator_zone,
            procedure: procedure.to_string(),
            requirements: String::new(),
        }
    }

    pub fn with_names(mut self, target_name: &str, creator_name: &str) -> Self {
        self.target_name = target_name.to_string();
        self.creator_name = creator_name.to_string();
        self
    }

    pub fn with_requirements(mut self, requirements: &str) -> Self {
        self.requirements = requirements.to_string();
        self
    }

    /// Human readable description surfaced in reports.
    pub fn describe(&self) -> String {
        let creator = if self.creator_name.is_empty() {
            format!("mobile {}", self.creator.vnum)
        } else {
            format!("{} (mobile {})", self.creator_name, self.creator.vnum)
        };
        let mut text = format!(
            "{} via {} in zone {}",
            creator, self.procedure, self.creator_zone
        );
        if !self.requirements.is_empty() {
            text.push_str(": ");
            text.push_str(&self.requirements);
        }
        text
    }
}

impl From<&BuiltinEntry> for ScriptCreatedEntry {
    fn from(entry: &BuiltinEntry) -> Self {
        ScriptCreatedEntry::new(
            entry.target,
            entry.creator,
            entry.creator_zone,
            entry.procedure,
        )
        .with_names(entry.target_name, entry.creator_name)
        .with_requirements(entry.requirements)
    }
}

impl From<&ScriptedItemConfig> for ScriptCreatedEntry {
    fn from(item: &ScriptedItemConfig) -> Self {
        ScriptCreatedEntry::new(item.target, item.creator, item.creator_zone, &item.procedure)
            .with_names(&item.target_name, &item.creator_name)
            .with_requirements(&item.requirements)
    }
}

/// What is known about the mobile behind a script-created item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorSummary {
    pub creator_brief: String,
    pub creator_found: bool,
    pub spec_proc: Option<String>,
    pub description: Option<String>,
    pub zone_accessible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptRegistry {
    entries: BTreeMap<EntityRef, ScriptCreatedEntry>,
}

impl ScriptRegistry {
    /// Registry holding only the built-in table.
    pub fn builtin() -> Self {
        Self::default().with_entries(BUILTIN_ENTRIES.iter().map(ScriptCreatedEntry::from))
    }

    /// Add entries, replacing any existing entry for the same target.
    pub fn with_entries(mut self, entries: impl IntoIterator<Item = ScriptCreatedEntry>) -> Self {
        for entry in entries {
            if self.entries.contains_key(&entry.target) {
                debug!("scripted entry for {} overridden", entry.target);
            }
            self.entries.insert(entry.target, entry);
        }
        self
    }

    pub fn lookup(&self, target: EntityRef) -> Option<&ScriptCreatedEntry> {
        self.entries.get(&target)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ScriptCreatedEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the creator mobile of `entry` for display. Never affects analysis.
    pub fn investigate(
        &self,
        entry: &ScriptCreatedEntry,
        world: &dyn WorldData,
        zones: &ZoneAccessibility,
    ) -> CreatorSummary {
        let (creator_found, spec_proc, description) = match world.get(entry.creator) {
            Ok(Entity::Mobile(mobile)) => (true, mobile.spec_proc, mobile.description),
            Ok(_) => (true, None, None),
            Err(e) => {
                debug!("creator {} not loaded: {}", entry.creator, e);
                (false, None, None)
            }
        };
        CreatorSummary {
            creator_brief: world.brief_of(entry.creator),
            creator_found,
            spec_proc,
            description,
            zone_accessible: zones.is_zone_accessible(entry.creator_zone),
        }
    }
}
