//! Where entities come into the world.
//!
//! The index is built once per session from three sources:
//!
//! 1. zone reset command streams (rooms, containers, mobile equipment and inventory)
//! 2. mobile `repops` lists (equipment re-loaded when the mobile repops)
//! 3. shop stock lists
//!
//! Container placements compound: an item put into a container that was itself placed
//! at 50% loads at `50% × item%`.

use crate::world::{
    clamp_percent, Entity, EntityKind, EntityRef, ResetOp, Vnum, WorldData, ZoneMeta,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Mechanism {
    ZoneReset,
    Container,
    MobileEquipment,
    MobileInventory,
    ShopStock,
}

impl Mechanism {
    pub fn label(self) -> &'static str {
        match self {
            Mechanism::ZoneReset => "zone reset",
            Mechanism::Container => "container",
            Mechanism::MobileEquipment => "equipped",
            Mechanism::MobileInventory => "carried",
            Mechanism::ShopStock => "shop stock",
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The concrete place an entity loads into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoadSite {
    Room { room: Vnum },
    Container { container: Vnum },
    Mobile { mobile: Vnum },
    Shop { shop: Vnum, keeper: Option<Vnum> },
}

impl LoadSite {
    /// Entity the site refers to, for brief lookups.
    pub fn entity(&self) -> EntityRef {
        match *self {
            LoadSite::Room { room } => EntityRef::room(room),
            LoadSite::Container { container } => EntityRef::object(container),
            LoadSite::Mobile { mobile } => EntityRef::mobile(mobile),
            LoadSite::Shop {
                keeper: Some(keeper),
                ..
            } => EntityRef::mobile(keeper),
            LoadSite::Shop { shop, keeper: None } => EntityRef::shop(shop),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadLocation {
    pub entity: EntityRef,
    /// Zone whose resets (or shop, or mobile) produce the entity.
    pub zone: Vnum,
    pub mechanism: Mechanism,
    pub site: LoadSite,
    /// Effective probability in percent, already compounded for nested containers.
    pub probability: f64,
    /// Reset command letter, `repop` for mobile repops, `None` for shop stock.
    #[serde(default)]
    pub command: Option<String>,
}

impl LoadLocation {
    pub fn new(entity: EntityRef, zone: Vnum, mechanism: Mechanism, site: LoadSite) -> Self {
        Self {
            entity,
            zone,
            mechanism,
            site,
            probability: 100.0,
            command: None,
        }
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = clamp_percent(probability);
        self
    }

    pub fn with_command(mut self, command: &str) -> Self {
        self.command = Some(command.to_string());
        self
    }
}

fn by_probability_desc(a: &LoadLocation, b: &LoadLocation) -> Ordering {
    b.probability
        .partial_cmp(&a.probability)
        .unwrap_or(Ordering::Equal)
}

#[derive(Debug, Clone, Default)]
pub struct LoadLocationIndex {
    locations: HashMap<EntityRef, Vec<LoadLocation>>,
}

impl LoadLocationIndex {
    pub fn build(world: &dyn WorldData) -> Self {
        let zones = world.list_zones();
        let mut index = Self::default();
        for zone in &zones {
            index.index_resets(zone);
        }
        for zone in world.zone_ids() {
            index.index_repops(world, zone);
            index.index_shops(world, zone);
        }
        index.finish();
        info!(
            "indexed {} load locations for {} entities",
            index.location_count(),
            index.locations.len()
        );
        index
    }

    /// Every known location for `entity`, highest probability first.
    pub fn find_load_locations(&self, entity: EntityRef) -> &[LoadLocation] {
        self.locations
            .get(&entity)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn location_count(&self) -> usize {
        self.locations.values().map(Vec::len).sum()
    }

    fn push(&mut self, location: LoadLocation) {
        self.locations
            .entry(location.entity)
            .or_default()
            .push(location);
    }

    fn finish(&mut self) {
        for list in self.locations.values_mut() {
            list.sort_by(by_probability_desc);
        }
    }

    fn index_resets(&mut self, zone: &ZoneMeta) {
        let mut current_mobile: Option<Vnum> = None;
        let mut placed: HashMap<Vnum, f64> = HashMap::new();

        for cmd in &zone.commands {
            let probability = clamp_percent(cmd.probability);
            let code = cmd.code.as_str();
            match cmd.op {
                ResetOp::LoadMobile { mobile, room, .. } if mobile > 0 => {
                    current_mobile = Some(mobile);
                    self.push(
                        LoadLocation::new(
                            EntityRef::mobile(mobile),
                            zone.id,
                            Mechanism::ZoneReset,
                            LoadSite::Room { room },
                        )
                        .with_probability(probability)
                        .with_command(code),
                    );
                }
                ResetOp::LoadObject { object, room, .. } if object > 0 => {
                    placed.insert(object, probability);
                    self.push(
                        LoadLocation::new(
                            EntityRef::object(object),
                            zone.id,
                            Mechanism::ZoneReset,
                            LoadSite::Room { room },
                        )
                        .with_probability(probability)
                        .with_command(code),
                    );
                }
                ResetOp::EquipObject { object, .. } | ResetOp::GiveObject { object, .. }
                    if object > 0 =>
                {
                    let Some(mobile) = current_mobile else {
                        debug!(
                            "zone {}: {} {} has no mobile to attach to; skipped",
                            zone.id, code, object
                        );
                        continue;
                    };
                    let mechanism = if matches!(cmd.op, ResetOp::EquipObject { .. }) {
                        Mechanism::MobileEquipment
                    } else {
                        Mechanism::MobileInventory
                    };
                    placed.insert(object, probability);
                    self.push(
                        LoadLocation::new(
                            EntityRef::object(object),
                            zone.id,
                            mechanism,
                            LoadSite::Mobile { mobile },
                        )
                        .with_probability(probability)
                        .with_command(code),
                    );
                }
                ResetOp::PutObject {
                    object, container, ..
                } if object > 0 => {
                    let effective = match placed.get(&container) {
                        Some(container_pct) => clamp_percent(container_pct * probability / 100.0),
                        None => probability,
                    };
                    placed.insert(object, effective);
                    self.push(
                        LoadLocation::new(
                            EntityRef::object(object),
                            zone.id,
                            Mechanism::Container,
                            LoadSite::Container { container },
                        )
                        .with_probability(effective)
                        .with_command(code),
                    );
                }
                // an M/W with no usable mobile still starts a new block
                ResetOp::LoadMobile { .. } => current_mobile = None,
                _ => {}
            }
        }
    }

    fn index_repops(&mut self, world: &dyn WorldData, zone: Vnum) {
        for vnum in world.list_ids(zone, EntityKind::Mobile) {
            match world.get_in_zone(zone, EntityRef::mobile(vnum)) {
                Ok(Entity::Mobile(mobile)) => {
                    for repop in &mobile.repops {
                        let location = LoadLocation::new(
                            EntityRef::object(repop.object),
                            zone,
                            Mechanism::MobileEquipment,
                            LoadSite::Mobile { mobile: vnum },
                        )
                        .with_probability(repop.percent)
                        .with_command(repop.command.as_deref().unwrap_or("repop"));
                        self.push(location);
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("skipping repops of mobile {}: {}", vnum, e),
            }
        }
    }

    fn index_shops(&mut self, world: &dyn WorldData, zone: Vnum) {
        for vnum in world.list_ids(zone, EntityKind::Shop) {
            match world.get_in_zone(zone, EntityRef::shop(vnum)) {
                Ok(Entity::Shop(shop)) => {
                    for object in &shop.producing {
                        self.push(LoadLocation::new(
                            EntityRef::object(*object),
                            zone,
                            Mechanism::ShopStock,
                            LoadSite::Shop {
                                shop: vnum,
                                keeper: shop.keeper,
                            },
                        ));
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("skipping shop {}: {}", vnum, e),
            }
        }
    }
}
