use crate::assembly::errors::CatalogError;
use crate::world::{clamp_percent, AssembleRecord, Entity, EntityKind, EntityRef, Vnum, WorldData};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifies a recipe within a session: the zone that owns it and the object it produces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipeKey {
    pub zone: Vnum,
    pub result: Vnum,
}

impl fmt::Display for RecipeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone {} / object {}", self.zone, self.result)
    }
}

/// A declarative assembly: combine the components to obtain the result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub zone: Vnum,
    /// Vnum of the assembly file the recipe was read from.
    pub source: Vnum,
    pub result: EntityRef,
    /// Components in authored order; repeats are additional units.
    pub components: Vec<EntityRef>,
    /// Success probability of the assembly itself, in percent.
    pub probability: f64,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Recipe {
    pub fn new(zone: Vnum, result: Vnum) -> Self {
        Self {
            zone,
            source: result,
            result: EntityRef::object(result),
            components: Vec::new(),
            probability: 100.0,
            commands: Vec::new(),
            keywords: Vec::new(),
        }
    }

    pub fn with_component(mut self, vnum: Vnum) -> Self {
        self.components.push(EntityRef::object(vnum));
        self
    }

    pub fn with_components(mut self, vnums: impl IntoIterator<Item = Vnum>) -> Self {
        self.components
            .extend(vnums.into_iter().map(EntityRef::object));
        self
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = clamp_percent(probability);
        self
    }

    pub fn with_command(mut self, command: &str) -> Self {
        self.commands.push(command.to_string());
        self
    }

    pub fn key(&self) -> RecipeKey {
        RecipeKey {
            zone: self.zone,
            result: self.result.vnum,
        }
    }

    /// Distinct components in first-appearance order with their unit counts.
    pub fn distinct_components(&self) -> Vec<(EntityRef, usize)> {
        let mut counted: Vec<(EntityRef, usize)> = Vec::new();
        for component in &self.components {
            match counted.iter_mut().find(|(c, _)| c == component) {
                Some((_, qty)) => *qty += 1,
                None => counted.push((*component, 1)),
            }
        }
        counted
    }

    /// Validate a raw assembly file into a recipe.
    pub fn from_record(record: &AssembleRecord) -> Result<Self, CatalogError> {
        let malformed = |reason: &str| CatalogError::MalformedRecipe {
            zone: record.zone,
            file: record.vnum,
            reason: reason.to_string(),
        };
        let result = record
            .result
            .ok_or_else(|| malformed("missing or non-positive result vnum"))?;
        if record.parts.is_empty() {
            return Err(malformed("no usable components"));
        }
        Ok(Recipe {
            zone: record.zone,
            source: record.vnum,
            result: EntityRef::object(result),
            components: record.parts.iter().copied().map(EntityRef::object).collect(),
            probability: clamp_percent(record.probability.unwrap_or(100.0)),
            commands: record.commands.clone(),
            keywords: record.keywords.clone(),
        })
    }
}

/// Read one zone's assembly file. `Ok(None)` when the file holds some other entity.
pub fn read_recipe(
    world: &dyn WorldData,
    zone: Vnum,
    file: Vnum,
) -> Result<Option<Recipe>, CatalogError> {
    match world.get_in_zone(zone, EntityRef::recipe(file))? {
        Entity::Recipe(record) => Recipe::from_record(&record).map(Some),
        other => {
            debug!("recipe {} in zone {} resolved to {}", file, zone, other.kind());
            Ok(None)
        }
    }
}

/// Read every assembly file in the world.
///
/// Each zone's files are read from that zone, so two zones may ship the same file
/// number. Malformed recipes and unreadable files are logged and skipped; one bad zone
/// never prevents the others from loading. The result is sorted by `(zone, result)`.
pub fn load_all_recipes(world: &dyn WorldData) -> Vec<Recipe> {
    let mut recipes = Vec::new();
    let mut skipped = 0usize;

    for zone in world.zone_ids() {
        for file in world.list_ids(zone, EntityKind::Recipe) {
            match read_recipe(world, zone, file) {
                Ok(Some(recipe)) => recipes.push(recipe),
                Ok(None) => {}
                Err(e @ CatalogError::MalformedRecipe { .. }) => {
                    warn!("{}", e);
                    skipped += 1;
                }
                Err(CatalogError::World(e)) => {
                    warn!("skipping recipe file {} in zone {}: {}", file, zone, e);
                    skipped += 1;
                }
            }
        }
    }

    recipes.sort_by_key(Recipe::key);
    info!(
        "loaded {} recipes ({} skipped)",
        recipes.len(),
        skipped
    );
    recipes
}

/// Loaded recipes with lookups by key, result and component.
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: Vec<Recipe>,
    by_result: HashMap<Vnum, Vec<usize>>,
    by_component: HashMap<Vnum, Vec<usize>>,
}

impl RecipeCatalog {
    pub fn load(world: &dyn WorldData) -> Self {
        Self::from_recipes(load_all_recipes(world))
    }

    pub fn from_recipes(mut recipes: Vec<Recipe>) -> Self {
        recipes.sort_by_key(Recipe::key);
        let mut by_result: HashMap<Vnum, Vec<usize>> = HashMap::new();
        let mut by_component: HashMap<Vnum, Vec<usize>> = HashMap::new();
        for (idx, recipe) in recipes.iter().enumerate() {
            by_result.entry(recipe.result.vnum).or_default().push(idx);
            for (component, _) in recipe.distinct_components() {
                by_component.entry(component.vnum).or_default().push(idx);
            }
        }
        Self {
            recipes,
            by_result,
            by_component,
        }
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn get(&self, key: RecipeKey) -> Option<&Recipe> {
        self.by_result
            .get(&key.result)?
            .iter()
            .map(|idx| &self.recipes[*idx])
            .find(|r| r.zone == key.zone)
    }

    /// Every recipe producing `result`, across all zones.
    pub fn producing(&self, result: Vnum) -> Vec<&Recipe> {
        self.lookup(&self.by_result, result)
    }

    pub fn is_craftable(&self, vnum: Vnum) -> bool {
        self.by_result.contains_key(&vnum)
    }

    /// Every recipe that lists `component` among its parts.
    pub fn using_component(&self, component: Vnum) -> Vec<&Recipe> {
        self.lookup(&self.by_component, component)
    }

    /// Zones that own at least one recipe, ascending.
    pub fn zones(&self) -> Vec<Vnum> {
        let mut zones: Vec<Vnum> = self.recipes.iter().map(|r| r.zone).collect();
        zones.dedup();
        zones
    }

    fn lookup(&self, map: &HashMap<Vnum, Vec<usize>>, vnum: Vnum) -> Vec<&Recipe> {
        map.get(&vnum)
            .map(|ids| ids.iter().map(|idx| &self.recipes[*idx]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{MemoryWorld, ZoneMeta};

    fn assemble(vnum: Vnum, zone: Vnum, result: Option<Vnum>, parts: &[Vnum]) -> AssembleRecord {
        AssembleRecord {
            vnum,
            zone,
            result,
            parts: parts.to_vec(),
            ..AssembleRecord::default()
        }
    }

    #[test]
    fn test_malformed_recipes_are_skipped() {
        let world = MemoryWorld::new()
            .with_zone(ZoneMeta::new(20, "Forge"))
            .with_entity(assemble(1, 20, Some(500), &[100, 101]))
            .with_entity(assemble(2, 20, None, &[100]))
            .with_entity(assemble(3, 20, Some(501), &[]))
            .with_entity(assemble(4, 10, Some(400), &[100]));

        let recipes = load_all_recipes(&world);
        let keys: Vec<RecipeKey> = recipes.iter().map(Recipe::key).collect();
        assert_eq!(
            keys,
            vec![
                RecipeKey { zone: 10, result: 400 },
                RecipeKey { zone: 20, result: 500 },
            ]
        );
    }

    #[test]
    fn test_same_file_number_in_two_zones() {
        let world = MemoryWorld::new()
            .with_entity(assemble(500, 10, Some(500), &[100]))
            .with_entity(assemble(500, 20, Some(500), &[100]));
        let keys: Vec<RecipeKey> = load_all_recipes(&world).iter().map(Recipe::key).collect();
        assert_eq!(
            keys,
            vec![
                RecipeKey { zone: 10, result: 500 },
                RecipeKey { zone: 20, result: 500 },
            ]
        );
    }

    #[test]
    fn test_read_recipe_reports_world_errors() {
        let world = MemoryWorld::new().with_entity(assemble(1, 20, Some(500), &[100]));
        assert!(matches!(
            read_recipe(&world, 30, 1),
            Err(CatalogError::World(crate::world::WorldError::NotFound(_)))
        ));
        assert!(matches!(
            read_recipe(&world, 20, 1),
            Ok(Some(Recipe { zone: 20, .. }))
        ));
    }

    #[test]
    fn test_load_is_idempotent() {
        let world = MemoryWorld::new()
            .with_entity(assemble(1, 20, Some(500), &[100, 100, 101]))
            .with_entity(assemble(2, 30, Some(600), &[500]));
        assert_eq!(load_all_recipes(&world), load_all_recipes(&world));
    }

    #[test]
    fn test_from_record_clamps_probability() {
        let mut record = assemble(7, 1, Some(70), &[1]);
        record.probability = Some(180.0);
        let recipe = Recipe::from_record(&record).unwrap();
        assert_eq!(recipe.probability, 100.0);
        assert_eq!(recipe.source, 7);

        let err = Recipe::from_record(&assemble(8, 1, Some(70), &[])).unwrap_err();
        assert!(err.to_string().contains("no usable components"));
    }

    #[test]
    fn test_distinct_components_keep_order_and_count() {
        let recipe = Recipe::new(1, 10).with_components([5, 3, 5, 5, 2]);
        assert_eq!(
            recipe.distinct_components(),
            vec![
                (EntityRef::object(5), 3),
                (EntityRef::object(3), 1),
                (EntityRef::object(2), 1),
            ]
        );
    }

    #[test]
    fn test_catalog_lookups() {
        let catalog = RecipeCatalog::from_recipes(vec![
            Recipe::new(30, 900).with_components([1, 2]),
            Recipe::new(10, 900).with_components([3]),
            Recipe::new(10, 901).with_components([900, 1]),
        ]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.producing(900).len(), 2);
        assert_eq!(catalog.producing(900)[0].zone, 10);
        assert!(catalog.is_craftable(901));
        assert!(!catalog.is_craftable(1));
        assert_eq!(catalog.using_component(1).len(), 2);
        assert_eq!(
            catalog.get(RecipeKey { zone: 30, result: 900 }).map(|r| r.components.len()),
            Some(2)
        );
        assert_eq!(catalog.zones(), vec![10, 30]);
    }
}
