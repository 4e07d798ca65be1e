//! Recipe accessibility analysis.
//!
//! For every distinct component the analyzer tries, in order:
//!
//! 1. a load location in an accessible zone with a positive probability
//! 2. a nested recipe producing the component (recursively analyzed)
//! 3. the script-created item registry
//!
//! The recipe's success rate is `recipe% × min(component%) / 100`, or zero as soon as
//! one component cannot be resolved. Analysis never fails: problems such as cycles or
//! an exhausted depth budget are reported as [`UnresolvedReason`] values.
//!
//! Within one top-level analysis each nested result vnum is worked out once. Outcomes
//! that did not depend on the current path (no cycle cut, no depth cut) are memoized
//! and reused wherever the same component shows up again, so shared sub-assemblies
//! cost linear rather than exponential time.

use crate::assembly::locations::{LoadLocation, LoadLocationIndex};
use crate::assembly::recipes::{Recipe, RecipeCatalog, RecipeKey};
use crate::assembly::scripted::{ScriptCreatedEntry, ScriptRegistry};
use crate::assembly::zones::ZoneAccessibility;
use crate::config::AnalysisConfig;
use crate::world::{clamp_percent, EntityKind, EntityRef, Vnum, WorldData};
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    FullyAccessible,
    PartiallyAccessible,
    Inaccessible,
}

impl Verdict {
    pub fn is_accessible(self) -> bool {
        !matches!(self, Verdict::Inaccessible)
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::FullyAccessible => "fully accessible",
            Verdict::PartiallyAccessible => "partially accessible",
            Verdict::Inaccessible => "inaccessible",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a component could not be obtained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The entity exists but nothing loads, produces or scripts it.
    NoSource,
    /// The entity is not part of the world at all.
    NotFound,
    /// Every load location sits in a restricted zone.
    OnlyRestrictedZones { zones: Vec<Vnum> },
    /// Recipes produce it, but none of them is obtainable.
    NestedInaccessible,
    /// Producing it requires itself; `path` lists result vnums ending in the repeat.
    CycleDetected { path: Vec<Vnum> },
    /// Nested recipes go deeper than the configured limit.
    DepthExceeded { depth: usize },
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NoSource => f.write_str("no known source"),
            UnresolvedReason::NotFound => f.write_str("not found in world"),
            UnresolvedReason::OnlyRestrictedZones { zones } => {
                let list: Vec<String> = zones.iter().map(|z| z.to_string()).collect();
                write!(f, "only loads in restricted zones ({})", list.join(", "))
            }
            UnresolvedReason::NestedInaccessible => f.write_str("producing recipe inaccessible"),
            UnresolvedReason::CycleDetected { path } => {
                let list: Vec<String> = path.iter().map(|v| v.to_string()).collect();
                write!(f, "recipe cycle {}", list.join(" -> "))
            }
            UnresolvedReason::DepthExceeded { depth } => {
                write!(f, "nested recipes deeper than {}", depth)
            }
        }
    }
}

/// How a component was (or was not) obtained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "via", rename_all = "snake_case")]
pub enum Resolution {
    LoadLocation { best: LoadLocation },
    NestedRecipe { nested: NestedSummary },
    Scripted { entry: ScriptCreatedEntry },
    Unresolved { reason: UnresolvedReason },
}

/// Headline of the best recipe producing a nested component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NestedSummary {
    pub key: RecipeKey,
    pub verdict: Verdict,
    pub success_rate: f64,
    pub requires_scripted_procedure: bool,
    #[serde(default)]
    pub scripted_procedures: Vec<String>,
}

impl From<&AccessibilityReport> for NestedSummary {
    fn from(report: &AccessibilityReport) -> Self {
        Self {
            key: report.key(),
            verdict: report.verdict,
            success_rate: report.success_rate,
            requires_scripted_procedure: report.requires_scripted_procedure,
            scripted_procedures: report.scripted_procedures.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentResolution {
    pub component: EntityRef,
    /// Units of this component the recipe consumes.
    pub quantity: usize,
    pub resolution: Resolution,
    /// Probability the component is obtained, zero when unresolved.
    pub probability: f64,
    /// Every known load location, including ones in restricted zones.
    pub locations: Vec<LoadLocation>,
    pub low_probability: bool,
}

impl ComponentResolution {
    pub fn is_resolved(&self) -> bool {
        !matches!(self.resolution, Resolution::Unresolved { .. })
    }

    pub fn is_scripted(&self) -> bool {
        matches!(self.resolution, Resolution::Scripted { .. })
    }

    pub fn unresolved_reason(&self) -> Option<&UnresolvedReason> {
        match &self.resolution {
            Resolution::Unresolved { reason } => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessibilityReport {
    pub zone: Vnum,
    pub result: EntityRef,
    /// Assembly file the recipe was read from.
    pub source: Vnum,
    pub recipe_probability: f64,
    pub zone_accessible: bool,
    pub verdict: Verdict,
    pub success_rate: f64,
    pub requires_scripted_procedure: bool,
    /// Descriptions of every scripted procedure involved, nested ones included.
    pub scripted_procedures: Vec<String>,
    pub has_low_probability_component: bool,
    /// Empty when the recipe's own zone is inaccessible.
    pub components: Vec<ComponentResolution>,
    /// Load locations of the result itself.
    pub alternative_sources: Vec<LoadLocation>,
}

impl AccessibilityReport {
    pub fn key(&self) -> RecipeKey {
        RecipeKey {
            zone: self.zone,
            result: self.result.vnum,
        }
    }

    pub fn is_accessible(&self) -> bool {
        self.verdict.is_accessible()
    }

    pub fn unresolved_components(&self) -> impl Iterator<Item = &ComponentResolution> {
        self.components.iter().filter(|c| !c.is_resolved())
    }

    /// First cycle or depth failure anywhere in this report's unresolved components.
    fn structural_failure(&self) -> Option<UnresolvedReason> {
        self.unresolved_components()
            .filter_map(ComponentResolution::unresolved_reason)
            .find(|reason| {
                matches!(
                    reason,
                    UnresolvedReason::CycleDetected { .. } | UnresolvedReason::DepthExceeded { .. }
                )
            })
            .cloned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerOptions {
    pub max_depth: usize,
    pub low_probability_threshold: f64,
    pub scripted_is_fully_accessible: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

impl From<&AnalysisConfig> for AnalyzerOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            low_probability_threshold: config.low_probability_threshold,
            scripted_is_fully_accessible: config.scripted_is_fully_accessible,
        }
    }
}

#[derive(Debug, Clone)]
struct Memoized {
    outcome: Result<NestedSummary, UnresolvedReason>,
    /// Nesting levels the outcome consumed below the component that asked for it.
    height: usize,
}

/// State of one top-level analysis.
#[derive(Debug, Default)]
struct Walk {
    /// Result vnums currently being produced, outermost first.
    path: Vec<Vnum>,
    memo: HashMap<Vnum, Memoized>,
    /// Set when a cycle or depth cut shaped the outcome being computed.
    tainted: bool,
    /// Deepest recipe level reached while computing the current outcome.
    deepest: usize,
}

/// Borrowing view over the loaded catalogs. Holds no state of its own.
pub struct Analyzer<'a> {
    pub recipes: &'a RecipeCatalog,
    pub locations: &'a LoadLocationIndex,
    pub zones: &'a ZoneAccessibility,
    pub scripted: &'a ScriptRegistry,
    pub world: &'a dyn WorldData,
    pub options: &'a AnalyzerOptions,
}

impl<'a> Analyzer<'a> {
    pub fn analyze(&self, recipe: &Recipe) -> AccessibilityReport {
        let mut walk = Walk {
            path: vec![recipe.result.vnum],
            ..Walk::default()
        };
        self.analyze_at(recipe, &mut walk, 0)
    }

    fn analyze_at(&self, recipe: &Recipe, walk: &mut Walk, depth: usize) -> AccessibilityReport {
        trace!("analyzing {} at depth {}", recipe.key(), depth);
        walk.deepest = walk.deepest.max(depth);
        let zone_accessible = self.zones.is_zone_accessible(recipe.zone);
        let mut report = AccessibilityReport {
            zone: recipe.zone,
            result: recipe.result,
            source: recipe.source,
            recipe_probability: clamp_percent(recipe.probability),
            zone_accessible,
            verdict: Verdict::Inaccessible,
            success_rate: 0.0,
            requires_scripted_procedure: false,
            scripted_procedures: Vec::new(),
            has_low_probability_component: false,
            components: Vec::new(),
            alternative_sources: self.locations.find_load_locations(recipe.result).to_vec(),
        };
        if !zone_accessible {
            return report;
        }

        let mut nested_partial = false;
        for (component, quantity) in recipe.distinct_components() {
            let resolution = self.resolve_component(component, quantity, walk, depth);
            match &resolution.resolution {
                Resolution::Scripted { entry } => {
                    report.requires_scripted_procedure = true;
                    push_unique(&mut report.scripted_procedures, entry.describe());
                }
                Resolution::NestedRecipe { nested } => {
                    nested_partial |= nested.verdict == Verdict::PartiallyAccessible;
                    report.requires_scripted_procedure |= nested.requires_scripted_procedure;
                    for procedure in &nested.scripted_procedures {
                        push_unique(&mut report.scripted_procedures, procedure.clone());
                    }
                }
                _ => {}
            }
            report.has_low_probability_component |= resolution.low_probability;
            report.components.push(resolution);
        }

        if report.components.iter().any(|c| !c.is_resolved()) {
            return report;
        }

        let weakest = report
            .components
            .iter()
            .map(|c| c.probability)
            .fold(100.0_f64, f64::min);
        report.success_rate = clamp_percent(report.recipe_probability * weakest / 100.0);

        let scripted_degrades =
            report.requires_scripted_procedure && !self.options.scripted_is_fully_accessible;
        report.verdict = if report.has_low_probability_component || nested_partial || scripted_degrades
        {
            Verdict::PartiallyAccessible
        } else {
            Verdict::FullyAccessible
        };
        report
    }

    fn resolve_component(
        &self,
        component: EntityRef,
        quantity: usize,
        walk: &mut Walk,
        depth: usize,
    ) -> ComponentResolution {
        let locations = self.locations.find_load_locations(component).to_vec();
        let mut resolved = ComponentResolution {
            component,
            quantity,
            resolution: Resolution::Unresolved {
                reason: UnresolvedReason::NoSource,
            },
            probability: 0.0,
            locations,
            low_probability: false,
        };

        // locations are sorted by descending probability
        let best = resolved
            .locations
            .iter()
            .find(|l| l.probability > 0.0 && self.zones.is_zone_accessible(l.zone))
            .cloned();
        if let Some(best) = best {
            resolved.probability = best.probability;
            resolved.resolution = Resolution::LoadLocation { best };
            return self.finish(resolved);
        }

        let mut nested_failure = None;
        if component.kind == EntityKind::Object && self.recipes.is_craftable(component.vnum) {
            match self.resolve_nested(component.vnum, walk, depth) {
                Ok(nested) => {
                    resolved.probability = nested.success_rate;
                    resolved.resolution = Resolution::NestedRecipe { nested };
                    return self.finish(resolved);
                }
                Err(reason) => nested_failure = Some(reason),
            }
        }

        if let Some(entry) = self.scripted.lookup(component) {
            resolved.probability = 100.0;
            resolved.resolution = Resolution::Scripted {
                entry: entry.clone(),
            };
            return self.finish(resolved);
        }

        let reason = nested_failure.unwrap_or_else(|| self.missing_source_reason(&resolved));
        resolved.resolution = Resolution::Unresolved { reason };
        resolved
    }

    /// Best accessible recipe producing `vnum`, or why none is usable.
    fn resolve_nested(
        &self,
        vnum: Vnum,
        walk: &mut Walk,
        depth: usize,
    ) -> Result<NestedSummary, UnresolvedReason> {
        if walk.path.contains(&vnum) {
            walk.tainted = true;
            let mut cycle = walk.path.clone();
            cycle.push(vnum);
            return Err(UnresolvedReason::CycleDetected { path: cycle });
        }
        if let Some(hit) = walk.memo.get(&vnum) {
            if depth + hit.height <= self.options.max_depth {
                trace!("reusing outcome for {} at depth {}", vnum, depth);
                walk.deepest = walk.deepest.max(depth + hit.height);
                return hit.outcome.clone();
            }
        }
        if depth + 1 > self.options.max_depth {
            walk.tainted = true;
            return Err(UnresolvedReason::DepthExceeded {
                depth: self.options.max_depth,
            });
        }

        let outer_tainted = std::mem::replace(&mut walk.tainted, false);
        let outer_deepest = std::mem::replace(&mut walk.deepest, depth);
        walk.path.push(vnum);

        let mut best: Option<NestedSummary> = None;
        let mut structural = None;
        for recipe in self.recipes.producing(vnum) {
            let nested = self.analyze_at(recipe, walk, depth + 1);
            if nested.is_accessible() && nested.success_rate > 0.0 {
                if best
                    .as_ref()
                    .map_or(true, |b| nested.success_rate > b.success_rate)
                {
                    best = Some(NestedSummary::from(&nested));
                }
            } else if structural.is_none() {
                structural = nested.structural_failure();
            }
        }
        walk.path.pop();

        let outcome =
            best.ok_or_else(|| structural.unwrap_or(UnresolvedReason::NestedInaccessible));
        if !walk.tainted {
            walk.memo.insert(
                vnum,
                Memoized {
                    outcome: outcome.clone(),
                    height: walk.deepest - depth,
                },
            );
        }
        walk.tainted |= outer_tainted;
        walk.deepest = walk.deepest.max(outer_deepest);
        outcome
    }

    fn missing_source_reason(&self, resolved: &ComponentResolution) -> UnresolvedReason {
        let mut restricted: Vec<Vnum> = resolved
            .locations
            .iter()
            .filter(|l| !self.zones.is_zone_accessible(l.zone))
            .map(|l| l.zone)
            .collect();
        restricted.sort_unstable();
        restricted.dedup();
        if !restricted.is_empty() {
            UnresolvedReason::OnlyRestrictedZones { zones: restricted }
        } else if resolved.locations.is_empty() && !self.world.contains(resolved.component) {
            UnresolvedReason::NotFound
        } else {
            UnresolvedReason::NoSource
        }
    }

    fn finish(&self, mut resolved: ComponentResolution) -> ComponentResolution {
        resolved.low_probability = resolved.probability < self.options.low_probability_threshold;
        resolved
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::zones::AccessPolicy;
    use crate::world::{MemoryWorld, ObjectRecord, ResetCommand, ZoneMeta};

    struct Fixture {
        world: MemoryWorld,
        recipes: RecipeCatalog,
        locations: LoadLocationIndex,
        zones: ZoneAccessibility,
        scripted: ScriptRegistry,
        options: AnalyzerOptions,
    }

    impl Fixture {
        fn new(world: MemoryWorld, recipes: Vec<Recipe>) -> Self {
            let zones = ZoneAccessibility::resolve(&world.list_zones(), &AccessPolicy::default());
            Self {
                locations: LoadLocationIndex::build(&world),
                recipes: RecipeCatalog::from_recipes(recipes),
                scripted: ScriptRegistry::default(),
                options: AnalyzerOptions::default(),
                zones,
                world,
            }
        }

        fn with_scripted(mut self, entry: ScriptCreatedEntry) -> Self {
            self.scripted = self.scripted.with_entries([entry]);
            self
        }

        fn analyzer(&self) -> Analyzer<'_> {
            Analyzer {
                recipes: &self.recipes,
                locations: &self.locations,
                zones: &self.zones,
                scripted: &self.scripted,
                world: &self.world,
                options: &self.options,
            }
        }

        fn analyze(&self, zone: Vnum, result: Vnum) -> AccessibilityReport {
            let recipe = self
                .recipes
                .get(RecipeKey { zone, result })
                .expect("recipe in fixture");
            self.analyzer().analyze(recipe)
        }
    }

    /// Zone whose resets load each `(object, percent)` into room 1.
    fn loads(zone: Vnum, objects: &[(Vnum, f64)]) -> ZoneMeta {
        objects.iter().fold(ZoneMeta::new(zone, "loads"), |z, (obj, pct)| {
            z.with_command(ResetCommand::parse("O", *obj as i64, 1, 1).with_probability(*pct))
        })
    }

    #[test]
    fn empty_recipe_is_vacuously_accessible() {
        let fx = Fixture::new(
            MemoryWorld::new().with_zone(ZoneMeta::new(1, "Town")),
            vec![Recipe::new(1, 900).with_probability(70.0)],
        );
        let report = fx.analyze(1, 900);
        assert_eq!(report.verdict, Verdict::FullyAccessible);
        assert_eq!(report.success_rate, 70.0);
        assert!(report.components.is_empty());
    }

    #[test]
    fn nested_rates_multiply() {
        let fx = Fixture::new(
            MemoryWorld::new().with_zone(loads(1, &[(100, 50.0)])),
            vec![
                Recipe::new(1, 901).with_component(100),
                Recipe::new(1, 902).with_component(901).with_probability(50.0),
            ],
        );
        let report = fx.analyze(1, 902);
        assert_eq!(report.success_rate, 25.0);
        assert_eq!(report.verdict, Verdict::FullyAccessible);
        match &report.components[0].resolution {
            Resolution::NestedRecipe { nested } => {
                assert_eq!(nested.key, RecipeKey { zone: 1, result: 901 });
                assert_eq!(nested.success_rate, 50.0);
                assert_eq!(nested.verdict, Verdict::FullyAccessible);
            }
            other => panic!("expected nested recipe, got {:?}", other),
        }
    }

    #[test]
    fn rate_is_exactly_one_hundred_when_everything_is_certain() {
        let fx = Fixture::new(
            MemoryWorld::new().with_zone(loads(1, &[(100, 100.0), (101, 100.0)])),
            vec![Recipe::new(1, 900)
                .with_components([100, 101])
                .with_probability(150.0)],
        );
        let report = fx.analyze(1, 900);
        assert_eq!(report.recipe_probability, 100.0);
        assert_eq!(report.success_rate, 100.0);
    }

    #[test]
    fn restricted_zone_short_circuits() {
        let fx = Fixture::new(
            MemoryWorld::new()
                .with_zone(loads(1, &[(100, 100.0)]))
                .with_zone(ZoneMeta::new(2, "Admin").with_flag("ADMIN")),
            vec![Recipe::new(2, 900).with_component(100)],
        );
        let report = fx.analyze(2, 900);
        assert_eq!(report.verdict, Verdict::Inaccessible);
        assert!(!report.zone_accessible);
        assert!(report.components.is_empty());
        assert_eq!(report.success_rate, 0.0);
    }

    #[test]
    fn cycles_terminate_and_are_reported() {
        let fx = Fixture::new(
            MemoryWorld::new().with_zone(ZoneMeta::new(1, "Loop")),
            vec![
                Recipe::new(1, 801).with_component(802),
                Recipe::new(1, 802).with_component(801),
            ],
        );
        let report = fx.analyze(1, 801);
        assert_eq!(report.verdict, Verdict::Inaccessible);
        assert_eq!(
            report.components[0].unresolved_reason(),
            Some(&UnresolvedReason::CycleDetected {
                path: vec![801, 802, 801]
            })
        );
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut fx = Fixture::new(
            MemoryWorld::new().with_zone(loads(1, &[(100, 100.0)])),
            vec![
                Recipe::new(1, 701).with_component(100),
                Recipe::new(1, 702).with_component(701),
                Recipe::new(1, 703).with_component(702),
            ],
        );
        fx.options.max_depth = 1;
        let report = fx.analyze(1, 703);
        assert_eq!(report.verdict, Verdict::Inaccessible);
        assert_eq!(
            report.components[0].unresolved_reason(),
            Some(&UnresolvedReason::DepthExceeded { depth: 1 })
        );

        fx.options.max_depth = 2;
        assert_eq!(fx.analyze(1, 703).verdict, Verdict::FullyAccessible);
    }

    #[test]
    fn shared_sub_assemblies_are_analyzed_once() {
        // level k makes two results, each needing both results of level k - 1
        const LEVELS: Vnum = 30;
        let result = |level: Vnum, side: Vnum| 1000 + level * 2 + side;
        let mut recipes = Vec::new();
        for level in 1..=LEVELS {
            for side in 0..2 {
                recipes.push(
                    Recipe::new(1, result(level, side))
                        .with_components([result(level - 1, 0), result(level - 1, 1)]),
                );
            }
        }
        let fx = Fixture::new(
            MemoryWorld::new()
                .with_zone(loads(1, &[(result(0, 0), 100.0), (result(0, 1), 90.0)])),
            recipes,
        );

        let report = fx.analyze(1, result(LEVELS, 0));
        assert_eq!(report.verdict, Verdict::FullyAccessible);
        assert_eq!(report.success_rate, 90.0);
        assert_eq!(report.components.len(), 2);
        match &report.components[1].resolution {
            Resolution::NestedRecipe { nested } => {
                assert_eq!(nested.key.result, result(LEVELS - 1, 1));
                assert_eq!(nested.success_rate, 90.0);
            }
            other => panic!("expected nested recipe, got {:?}", other),
        }
        let encoded = serde_json::to_string(&report).expect("encode report");
        assert!(encoded.len() < 4096, "report is {} bytes", encoded.len());
    }

    #[test]
    fn reused_outcome_respects_remaining_depth() {
        let mut fx = Fixture::new(
            MemoryWorld::new().with_zone(loads(1, &[(100, 100.0)])),
            vec![
                Recipe::new(1, 701).with_component(100),
                Recipe::new(1, 702).with_component(701),
                Recipe::new(1, 703).with_component(702),
                Recipe::new(1, 900).with_components([701, 703]),
            ],
        );
        fx.options.max_depth = 2;
        let report = fx.analyze(1, 900);
        assert!(report.components[0].is_resolved());
        assert_eq!(
            report.components[1].unresolved_reason(),
            Some(&UnresolvedReason::DepthExceeded { depth: 2 })
        );

        fx.options.max_depth = 3;
        assert_eq!(fx.analyze(1, 900).verdict, Verdict::FullyAccessible);
    }

    #[test]
    fn cycle_cut_outcomes_are_not_reused() {
        // 802 sits on a cycle through 801 but is also reachable without it
        let fx = Fixture::new(
            MemoryWorld::new().with_zone(loads(1, &[(100, 100.0)])),
            vec![
                Recipe::new(1, 801).with_component(802),
                Recipe::new(1, 802).with_component(801),
                Recipe::new(1, 803).with_component(100),
                Recipe::new(1, 804).with_components([803, 801]),
            ],
        );
        let report = fx.analyze(1, 804);
        assert!(report.components[0].is_resolved());
        assert_eq!(
            report.components[1].unresolved_reason(),
            Some(&UnresolvedReason::CycleDetected {
                path: vec![804, 801, 802, 801]
            })
        );
        assert_eq!(
            fx.analyze(1, 802).components[0].unresolved_reason(),
            Some(&UnresolvedReason::CycleDetected {
                path: vec![802, 801, 802]
            })
        );
    }

    #[test]
    fn scripted_component_is_partial_by_default() {
        let world = MemoryWorld::new()
            .with_zone(loads(1, &[(100, 80.0)]))
            .with_entity(ObjectRecord::new(101, 1, "a rune"));
        let mut fx = Fixture::new(
            world,
            vec![Recipe::new(1, 900).with_components([100, 101])],
        )
        .with_scripted(ScriptCreatedEntry::new(101, 50, 1, "mob_forge"));

        let report = fx.analyze(1, 900);
        assert_eq!(report.verdict, Verdict::PartiallyAccessible);
        assert_eq!(report.success_rate, 80.0);
        assert!(report.requires_scripted_procedure);
        assert_eq!(report.scripted_procedures.len(), 1);
        assert!(report.scripted_procedures[0].contains("mob_forge"));
        assert!(matches!(
            report.components[0].resolution,
            Resolution::LoadLocation { .. }
        ));
        assert!(report.components[1].is_scripted());
        assert_eq!(report.components[1].probability, 100.0);

        fx.options.scripted_is_fully_accessible = true;
        let report = fx.analyze(1, 900);
        assert_eq!(report.verdict, Verdict::FullyAccessible);
        assert!(report.requires_scripted_procedure);
    }

    #[test]
    fn nested_scripted_flag_propagates() {
        let fx = Fixture::new(
            MemoryWorld::new().with_zone(ZoneMeta::new(1, "Forge")),
            vec![
                Recipe::new(1, 901).with_component(101),
                Recipe::new(1, 902).with_component(901),
            ],
        )
        .with_scripted(ScriptCreatedEntry::new(101, 50, 1, "mob_forge"));
        let report = fx.analyze(1, 902);
        assert!(report.requires_scripted_procedure);
        assert_eq!(report.verdict, Verdict::PartiallyAccessible);
        assert_eq!(report.success_rate, 100.0);
    }

    #[test]
    fn low_probability_component_downgrades() {
        let fx = Fixture::new(
            MemoryWorld::new().with_zone(loads(1, &[(100, 10.0), (101, 90.0)])),
            vec![Recipe::new(1, 900).with_components([100, 101])],
        );
        let report = fx.analyze(1, 900);
        assert_eq!(report.verdict, Verdict::PartiallyAccessible);
        assert!(report.has_low_probability_component);
        assert_eq!(report.success_rate, 10.0);
    }

    #[test]
    fn best_accessible_location_wins() {
        let fx = Fixture::new(
            MemoryWorld::new()
                .with_zone(loads(1, &[(100, 40.0)]))
                .with_zone(loads(2, &[(100, 100.0)]).with_flag("CLOSED")),
            vec![Recipe::new(1, 900).with_component(100)],
        );
        let report = fx.analyze(1, 900);
        let component = &report.components[0];
        assert_eq!(component.probability, 40.0);
        assert_eq!(component.locations.len(), 2);
        match &component.resolution {
            Resolution::LoadLocation { best } => assert_eq!(best.zone, 1),
            other => panic!("expected load location, got {:?}", other),
        }
    }

    #[test]
    fn unresolved_reasons_are_specific() {
        let world = MemoryWorld::new()
            .with_zone(ZoneMeta::new(1, "Town"))
            .with_zone(loads(2, &[(102, 100.0)]).with_flag("GODZONE"))
            .with_entity(ObjectRecord::new(101, 1, "a pebble"));
        let fx = Fixture::new(
            world,
            vec![Recipe::new(1, 900).with_components([100, 101, 102, 101])],
        );
        let report = fx.analyze(1, 900);
        assert_eq!(report.verdict, Verdict::Inaccessible);
        assert_eq!(report.success_rate, 0.0);
        assert_eq!(report.components.len(), 3);
        assert_eq!(
            report.components[0].unresolved_reason(),
            Some(&UnresolvedReason::NotFound)
        );
        assert_eq!(
            report.components[1].unresolved_reason(),
            Some(&UnresolvedReason::NoSource)
        );
        assert_eq!(report.components[1].quantity, 2);
        assert_eq!(
            report.components[2].unresolved_reason(),
            Some(&UnresolvedReason::OnlyRestrictedZones { zones: vec![2] })
        );
    }

    #[test]
    fn analysis_is_idempotent() {
        let fx = Fixture::new(
            MemoryWorld::new().with_zone(loads(1, &[(100, 60.0)])),
            vec![
                Recipe::new(1, 901).with_component(100),
                Recipe::new(1, 902).with_components([901, 100]),
            ],
        );
        assert_eq!(fx.analyze(1, 902), fx.analyze(1, 902));
    }

    #[test]
    fn alternative_sources_list_result_locations() {
        let fx = Fixture::new(
            MemoryWorld::new().with_zone(loads(1, &[(100, 100.0), (900, 5.0)])),
            vec![Recipe::new(1, 900).with_component(100)],
        );
        let report = fx.analyze(1, 900);
        assert_eq!(report.alternative_sources.len(), 1);
        assert_eq!(report.alternative_sources[0].probability, 5.0);
    }
}
