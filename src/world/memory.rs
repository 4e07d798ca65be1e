//! In-memory world, used by tests and by callers that assemble a dataset programmatically.

use crate::world::errors::WorldError;
use crate::world::store::WorldData;
use crate::world::types::{Entity, EntityKind, EntityRef, Vnum, ZoneMeta};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    zones: BTreeMap<Vnum, ZoneMeta>,
    /// Keyed by owning zone first so duplicated vnums coexist.
    entities: BTreeMap<(Vnum, EntityRef), Entity>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(mut self, zone: ZoneMeta) -> Self {
        self.insert_zone(zone);
        self
    }

    /// Add an entity. Its zone is registered as a bare zone if not already present.
    pub fn with_entity(mut self, entity: impl Into<Entity>) -> Self {
        self.insert(entity.into());
        self
    }

    pub fn insert_zone(&mut self, zone: ZoneMeta) {
        self.zones.insert(zone.id, zone);
    }

    pub fn insert(&mut self, entity: Entity) {
        if let Entity::Zone(zone) = entity {
            self.insert_zone(zone);
            return;
        }
        let zone = entity.zone();
        self.zones
            .entry(zone)
            .or_insert_with(|| ZoneMeta::new(zone, ""));
        self.entities.insert((zone, entity.reference()), entity);
    }
}

impl WorldData for MemoryWorld {
    fn zone_ids(&self) -> Vec<Vnum> {
        self.zones.keys().copied().collect()
    }

    fn get(&self, entity: EntityRef) -> Result<Entity, WorldError> {
        if entity.kind == EntityKind::Zone {
            return self
                .zones
                .get(&entity.vnum)
                .cloned()
                .map(Entity::Zone)
                .ok_or(WorldError::NotFound(entity));
        }
        self.entities
            .iter()
            .find(|((_, key), _)| *key == entity)
            .map(|(_, found)| found.clone())
            .ok_or(WorldError::NotFound(entity))
    }

    fn get_in_zone(&self, zone: Vnum, entity: EntityRef) -> Result<Entity, WorldError> {
        if entity.kind == EntityKind::Zone {
            return self.get(entity);
        }
        self.entities
            .get(&(zone, entity))
            .cloned()
            .ok_or(WorldError::NotFound(entity))
    }

    fn list_ids(&self, zone: Vnum, kind: EntityKind) -> Vec<Vnum> {
        if kind == EntityKind::Zone {
            return self.zones.keys().filter(|id| **id == zone).copied().collect();
        }
        self.entities
            .keys()
            .filter(|(owner, key)| *owner == zone && key.kind == kind)
            .map(|(_, key)| key.vnum)
            .collect()
    }

    fn contains(&self, entity: EntityRef) -> bool {
        match entity.kind {
            EntityKind::Zone => self.zones.contains_key(&entity.vnum),
            _ => self.entities.keys().any(|(_, key)| *key == entity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::types::{MobileRecord, ObjectRecord};

    #[test]
    fn entities_register_their_zone() {
        let world = MemoryWorld::new()
            .with_zone(ZoneMeta::new(30, "Midgaard"))
            .with_entity(ObjectRecord::new(3001, 30, "a sword"))
            .with_entity(MobileRecord::new(4001, 40, "a rat"));
        assert_eq!(world.zone_ids(), vec![30, 40]);
        assert_eq!(world.list_ids(40, EntityKind::Mobile), vec![4001]);
        assert!(world.contains(EntityRef::object(3001)));
        assert!(!world.contains(EntityRef::mobile(3001)));
        assert!(matches!(
            world.get(EntityRef::room(1)),
            Err(WorldError::NotFound(_))
        ));
    }

    #[test]
    fn detection_prefers_objects() {
        let world = MemoryWorld::new()
            .with_entity(MobileRecord::new(100, 1, "a mob"))
            .with_entity(ObjectRecord::new(100, 1, "an object"));
        assert_eq!(world.detect_kind(100), Some(EntityKind::Object));
        assert_eq!(world.brief_of(EntityRef::mobile(100)), "[100] \"a mob\"");
    }

    #[test]
    fn same_vnum_in_two_zones() {
        let world = MemoryWorld::new()
            .with_entity(ObjectRecord::new(500, 20, "a late copy"))
            .with_entity(ObjectRecord::new(500, 10, "an early copy"));
        assert_eq!(world.brief_of(EntityRef::object(500)), "[500] \"an early copy\"");
        assert_eq!(world.list_ids(20, EntityKind::Object), vec![500]);
        assert_eq!(
            world
                .get_in_zone(20, EntityRef::object(500))
                .map(|e| e.brief())
                .ok(),
            Some("[500] \"a late copy\"".to_string())
        );
    }
}
