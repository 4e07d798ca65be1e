//! The analysis session: one world, its derived catalogs, and a report cache.
//!
//! A [`Session`] is the only place analysis state lives. Catalogs are built once when
//! the session opens and are read-only afterwards; reports are memoized per
//! [`RecipeKey`] behind a `RwLock` so a session can be shared between threads.
//! [`Session::reload`] takes `&mut self`, which serializes it against every reader.

use crate::assembly::analyzer::{AccessibilityReport, Analyzer, AnalyzerOptions, Verdict};
use crate::assembly::format::{
    format_location, format_percent, format_recipe_line, format_zone_summary,
    SCRIPT_PREVIEW_LINES,
};
use crate::assembly::locations::{LoadLocation, LoadLocationIndex};
use crate::assembly::recipes::{Recipe, RecipeCatalog, RecipeKey};
use crate::assembly::scripted::{CreatorSummary, ScriptCreatedEntry, ScriptRegistry, REGISTRY_VERSION};
use crate::assembly::search::{search_entities, EntityQuery, SearchHit};
use crate::assembly::zones::{AccessPolicy, ZoneAccess, ZoneAccessibility};
use crate::config::Config;
use crate::world::identify::{identify_mobile, identify_object};
use crate::world::{
    Entity, EntityKind, EntityRef, FileWorld, ResetOp, Vnum, WorldData, WorldError, ZoneMeta,
};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub analysis: AnalyzerOptions,
    pub access: AccessPolicy,
    /// Extra script-created items layered over the built-in registry.
    pub scripted_items: Vec<ScriptCreatedEntry>,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            analysis: AnalyzerOptions::from(&config.analysis),
            access: AccessPolicy {
                restricted_flags: config.accessibility.restricted_flags.clone(),
                reserved_zones: config.accessibility.reserved_zones.clone(),
            },
            scripted_items: config
                .scripted_items
                .iter()
                .map(ScriptCreatedEntry::from)
                .collect(),
        }
    }
}

/// Selection criteria for [`Session::browse`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssemblyFilter {
    /// Drop inaccessible recipes.
    #[serde(default)]
    pub accessible_only: bool,
    #[serde(default)]
    pub min_success_rate: Option<f64>,
    /// Restrict to recipes owned by these zones (empty means all).
    #[serde(default)]
    pub zones: Vec<Vnum>,
    #[serde(default)]
    pub verdict: Option<Verdict>,
}

impl AssemblyFilter {
    pub fn matches(&self, report: &AccessibilityReport) -> bool {
        if self.accessible_only && !report.is_accessible() {
            return false;
        }
        if let Some(min) = self.min_success_rate {
            if report.success_rate < min {
                return false;
            }
        }
        if !self.zones.is_empty() && !self.zones.contains(&report.zone) {
            return false;
        }
        self.verdict.map_or(true, |v| v == report.verdict)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub zones: usize,
    pub restricted_zones: usize,
    pub recipes: usize,
    pub load_locations: usize,
    pub scripted_entries: usize,
    pub registry_version: u32,
    pub cached_reports: usize,
    pub loaded_at: DateTime<Utc>,
    pub fingerprint: Option<String>,
}

/// Catalogs derived from the world in one pass.
struct Catalogs {
    zones: Vec<ZoneMeta>,
    access: ZoneAccessibility,
    recipes: RecipeCatalog,
    locations: LoadLocationIndex,
    scripted: ScriptRegistry,
}

impl Catalogs {
    fn build(world: &dyn WorldData, settings: &SessionSettings) -> Self {
        let zones = world.list_zones();
        let access = ZoneAccessibility::resolve(&zones, &settings.access);
        Self {
            recipes: RecipeCatalog::load(world),
            locations: LoadLocationIndex::build(world),
            scripted: ScriptRegistry::builtin().with_entries(settings.scripted_items.iter().cloned()),
            zones,
            access,
        }
    }
}

pub struct Session {
    world: Box<dyn WorldData>,
    settings: SessionSettings,
    catalogs: Catalogs,
    reports: RwLock<HashMap<RecipeKey, AccessibilityReport>>,
    loaded_at: DateTime<Utc>,
    fingerprint: Option<String>,
}

impl Session {
    /// Open the file world configured in `config.world.root`.
    pub fn open(config: &Config) -> Result<Self, WorldError> {
        let world = FileWorld::open(&config.world.root)?;
        Ok(Self::with_world(
            Box::new(world),
            SessionSettings::from_config(config),
        ))
    }

    pub fn with_world(world: Box<dyn WorldData>, settings: SessionSettings) -> Self {
        let catalogs = Catalogs::build(world.as_ref(), &settings);
        let fingerprint = world.fingerprint();
        let session = Self {
            world,
            settings,
            catalogs,
            reports: RwLock::new(HashMap::new()),
            loaded_at: Utc::now(),
            fingerprint,
        };
        info!(
            "session ready: {} zones, {} recipes",
            session.catalogs.zones.len(),
            session.catalogs.recipes.len()
        );
        session
    }

    pub fn world(&self) -> &dyn WorldData {
        self.world.as_ref()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// All recipes of the world, sorted by `(zone, result)`.
    pub fn load_all_recipes(&self) -> &[Recipe] {
        self.catalogs.recipes.recipes()
    }

    pub fn recipes(&self) -> &RecipeCatalog {
        &self.catalogs.recipes
    }

    pub fn zones(&self) -> &[ZoneMeta] {
        &self.catalogs.zones
    }

    pub fn zone_access(&self, zone: Vnum) -> ZoneAccess {
        self.catalogs.access.access(zone)
    }

    pub fn is_zone_accessible(&self, zone: Vnum) -> bool {
        self.catalogs.access.is_zone_accessible(zone)
    }

    pub fn find_load_locations(&self, entity: EntityRef) -> &[LoadLocation] {
        self.catalogs.locations.find_load_locations(entity)
    }

    pub fn scripted_entry(&self, entity: EntityRef) -> Option<&ScriptCreatedEntry> {
        self.catalogs.scripted.lookup(entity)
    }

    pub fn scripted_entries(&self) -> impl Iterator<Item = &ScriptCreatedEntry> {
        self.catalogs.scripted.entries()
    }

    pub fn investigate(&self, entry: &ScriptCreatedEntry) -> CreatorSummary {
        self.catalogs
            .scripted
            .investigate(entry, self.world.as_ref(), &self.catalogs.access)
    }

    fn analyzer(&self) -> Analyzer<'_> {
        Analyzer {
            recipes: &self.catalogs.recipes,
            locations: &self.catalogs.locations,
            zones: &self.catalogs.access,
            scripted: &self.catalogs.scripted,
            world: self.world.as_ref(),
            options: &self.settings.analysis,
        }
    }

    /// Analyze one recipe, reusing the cached report for its key when present.
    pub fn analyze(&self, recipe: &Recipe) -> AccessibilityReport {
        let key = recipe.key();
        if let Some(report) = self.read_reports().get(&key) {
            return report.clone();
        }
        let report = self.analyzer().analyze(recipe);
        self.write_reports().insert(key, report.clone());
        report
    }

    /// Best report among every recipe producing `result`: accessible before
    /// inaccessible, then highest success rate.
    pub fn analyze_result(&self, result: Vnum) -> Option<AccessibilityReport> {
        let mut best: Option<AccessibilityReport> = None;
        for recipe in self.catalogs.recipes.producing(result) {
            let report = self.analyze(recipe);
            let better = match &best {
                None => true,
                Some(current) => {
                    (report.is_accessible(), report.success_rate)
                        > (current.is_accessible(), current.success_rate)
                }
            };
            if better {
                best = Some(report);
            }
        }
        best
    }

    pub fn analyze_all(&self) -> Vec<AccessibilityReport> {
        self.load_all_recipes()
            .iter()
            .map(|recipe| self.analyze(recipe))
            .collect()
    }

    /// Reports matching `filter`, highest success rate first.
    pub fn browse(&self, filter: &AssemblyFilter) -> Vec<AccessibilityReport> {
        let mut reports: Vec<AccessibilityReport> = self
            .analyze_all()
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();
        reports.sort_by(|a, b| {
            b.success_rate
                .partial_cmp(&a.success_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        reports
    }

    /// Recipes whose result matches `term` by vnum or by (case-insensitive) brief.
    pub fn search_recipes(&self, term: &str) -> Vec<&Recipe> {
        self.load_all_recipes()
            .iter()
            .filter(|recipe| self.entity_matches(recipe.result, term))
            .collect()
    }

    /// Recipes with at least one component matching `term`.
    pub fn recipes_using_part(&self, term: &str) -> Vec<&Recipe> {
        self.load_all_recipes()
            .iter()
            .filter(|recipe| {
                recipe
                    .distinct_components()
                    .into_iter()
                    .any(|(component, _)| self.entity_matches(component, term))
            })
            .collect()
    }

    fn entity_matches(&self, entity: EntityRef, term: &str) -> bool {
        let term = term.trim();
        if let Ok(vnum) = term.parse::<Vnum>() {
            return entity.vnum == vnum;
        }
        let needle = term.to_lowercase();
        !needle.is_empty() && self.world.brief_of(entity).to_lowercase().contains(&needle)
    }

    /// Rooms a mobile is loaded into by zone resets: `(zone, room, probability)`.
    pub fn mobile_spawns(&self, mobile: Vnum) -> Vec<(Vnum, Vnum, f64)> {
        let mut spawns = Vec::new();
        for zone in &self.catalogs.zones {
            for cmd in &zone.commands {
                if let ResetOp::LoadMobile { mobile: m, room, .. } = cmd.op {
                    if m == mobile {
                        spawns.push((zone.id, room, cmd.probability));
                    }
                }
            }
        }
        spawns
    }

    /// Whether a player can get hold of `entity`. Objects count when they load in an
    /// accessible zone or an accessible recipe produces them; mobiles when a reset in an
    /// accessible zone spawns them.
    pub fn is_obtainable(&self, entity: EntityRef) -> bool {
        match entity.kind {
            EntityKind::Object => {
                self.find_load_locations(entity)
                    .iter()
                    .any(|l| l.probability > 0.0 && self.is_zone_accessible(l.zone))
                    || self
                        .analyze_result(entity.vnum)
                        .map_or(false, |r| r.is_accessible())
            }
            EntityKind::Mobile => self
                .mobile_spawns(entity.vnum)
                .iter()
                .any(|(zone, _, p)| *p > 0.0 && self.is_zone_accessible(*zone)),
            _ => false,
        }
    }

    /// Objects and mobiles matching `query`, best first.
    pub fn search_entities(&self, query: &EntityQuery) -> Vec<SearchHit> {
        search_entities(self.world.as_ref(), query, |entity| self.is_obtainable(entity))
    }

    /// Identify-style detail view of one entity, followed by where it comes from and
    /// which recipes involve it. Zones render as their full summary.
    pub fn describe(&self, entity: EntityRef) -> Result<Vec<String>, WorldError> {
        let world = self.world.as_ref();
        let mut lines = match world.get(entity)? {
            Entity::Zone(zone) => {
                let mut lines = vec![format!("Access: {}", self.zone_access(zone.id).describe())];
                lines.extend(format_zone_summary(&zone, world, SCRIPT_PREVIEW_LINES));
                return Ok(lines);
            }
            Entity::Object(obj) => identify_object(&obj),
            Entity::Mobile(mob) => identify_mobile(&mob, world),
            other => return Ok(vec![other.brief()]),
        };

        if entity.kind == EntityKind::Mobile {
            let spawns = self.mobile_spawns(entity.vnum);
            if spawns.is_empty() {
                lines.push("Spawns: nowhere".to_string());
            } else {
                lines.push("Spawns:".to_string());
                for (zone, room, probability) in spawns {
                    lines.push(format!(
                        "- zone {}: in room {} ({})",
                        zone,
                        world.brief_of(EntityRef::room(room)),
                        format_percent(probability)
                    ));
                }
            }
        } else {
            let locations = self.find_load_locations(entity);
            if locations.is_empty() {
                lines.push("Loads: nowhere".to_string());
            } else {
                lines.push("Loads:".to_string());
                for location in locations {
                    lines.push(format!("- {}", format_location(location, world)));
                }
            }
            if let Some(entry) = self.scripted_entry(entity) {
                lines.push(format!("Script-created: {}", entry.describe()));
            }
            let crafted = self.catalogs.recipes.producing(entity.vnum);
            if !crafted.is_empty() {
                lines.push("Crafted by:".to_string());
                for recipe in crafted {
                    lines.push(format!(
                        "- {}",
                        format_recipe_line(recipe, &self.analyze(recipe), world)
                    ));
                }
            }
            let uses = self.catalogs.recipes.using_component(entity.vnum);
            if !uses.is_empty() {
                lines.push("Used in:".to_string());
                for recipe in uses {
                    lines.push(format!(
                        "- {}",
                        format_recipe_line(recipe, &self.analyze(recipe), world)
                    ));
                }
            }
        }
        lines.push(format!(
            "Obtainable: {}",
            if self.is_obtainable(entity) { "yes" } else { "no" }
        ));
        Ok(lines)
    }

    pub fn cached_reports(&self) -> usize {
        self.read_reports().len()
    }

    pub fn clear_cache(&self) {
        self.write_reports().clear();
        debug!("report cache cleared");
    }

    /// Re-index the world, rebuild every catalog and drop cached reports.
    pub fn reload(&mut self) -> Result<(), WorldError> {
        self.world.refresh()?;
        self.catalogs = Catalogs::build(self.world.as_ref(), &self.settings);
        self.fingerprint = self.world.fingerprint();
        self.loaded_at = Utc::now();
        self.clear_cache();
        info!(
            "world reloaded: {} zones, {} recipes",
            self.catalogs.zones.len(),
            self.catalogs.recipes.len()
        );
        Ok(())
    }

    /// Reload only when the world fingerprint differs from the one seen at load time.
    /// Backends without a fingerprint never report changes.
    pub fn reload_if_changed(&mut self) -> Result<bool, WorldError> {
        let current = self.world.fingerprint();
        if current.is_none() || current == self.fingerprint {
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            zones: self.catalogs.zones.len(),
            restricted_zones: self.catalogs.access.restricted().len(),
            recipes: self.catalogs.recipes.len(),
            load_locations: self.catalogs.locations.location_count(),
            scripted_entries: self.catalogs.scripted.len(),
            registry_version: REGISTRY_VERSION,
            cached_reports: self.cached_reports(),
            loaded_at: self.loaded_at,
            fingerprint: self.fingerprint.clone(),
        }
    }

    fn read_reports(&self) -> RwLockReadGuard<'_, HashMap<RecipeKey, AccessibilityReport>> {
        self.reports.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_reports(&self) -> RwLockWriteGuard<'_, HashMap<RecipeKey, AccessibilityReport>> {
        self.reports.write().unwrap_or_else(|e| e.into_inner())
    }
}
