//! Free-text search over object and mobile prototypes.
//!
//! Objects match on short description, keywords and room description; mobiles on short
//! description, keywords and their room line. Each hit is scored per field and keeps its
//! best score:
//!
//! | match                       | relevance                      |
//! |-----------------------------|--------------------------------|
//! | whole field equals the term | 1.0                            |
//! | field starts with the term  | 0.9                            |
//! | field contains the term     | 0.7                            |
//! | some term words are words   | 0.5 + 0.2 × matched / total    |

use crate::world::{Entity, EntityKind, EntityRef, Vnum, WorldData};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Kinds entity search looks at when no kind is requested.
pub const SEARCHABLE_KINDS: [EntityKind; 2] = [EntityKind::Object, EntityKind::Mobile];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityQuery {
    pub term: String,
    /// `None` searches objects and mobiles.
    #[serde(default)]
    pub kind: Option<EntityKind>,
    /// Only entities stored in these zones (empty means all).
    #[serde(default)]
    pub zones: Vec<Vnum>,
    /// Drop entities a player cannot obtain or meet.
    #[serde(default)]
    pub accessible_only: bool,
    pub limit: usize,
}

impl EntityQuery {
    pub fn new(term: &str) -> Self {
        Self {
            term: term.to_string(),
            kind: None,
            zones: Vec::new(),
            accessible_only: false,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_zone(mut self, zone: Vnum) -> Self {
        self.zones.push(zone);
        self
    }

    pub fn accessible_only(mut self) -> Self {
        self.accessible_only = true;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn kinds(&self) -> Vec<EntityKind> {
        match self.kind {
            Some(kind) if SEARCHABLE_KINDS.contains(&kind) => vec![kind],
            Some(kind) => {
                debug!("entity search does not cover {} records", kind);
                Vec::new()
            }
            None => SEARCHABLE_KINDS.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub entity: EntityRef,
    pub zone: Vnum,
    pub name: String,
    pub relevance: f64,
    pub accessible: bool,
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Score `text` against an already normalized `term`; `None` when nothing matches.
fn field_relevance(term: &str, text: &str) -> Option<f64> {
    let text = normalize(text);
    if text.is_empty() {
        return None;
    }
    if text == term {
        return Some(1.0);
    }
    if text.starts_with(term) {
        return Some(0.9);
    }
    if text.contains(term) {
        return Some(0.7);
    }
    let words: Vec<&str> = text.split(' ').collect();
    let wanted: Vec<&str> = term.split(' ').collect();
    let matched = wanted.iter().filter(|w| words.contains(w)).count();
    (matched > 0).then(|| 0.5 + matched as f64 / wanted.len() as f64 * 0.2)
}

/// Best score of `term` over `fields`.
pub fn relevance(term: &str, fields: &[&str]) -> Option<f64> {
    let term = normalize(term);
    if term.is_empty() {
        return None;
    }
    fields
        .iter()
        .filter_map(|field| field_relevance(&term, field))
        .fold(None, |best: Option<f64>, score| {
            Some(best.map_or(score, |b| b.max(score)))
        })
}

fn by_relevance(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.relevance
        .partial_cmp(&a.relevance)
        .unwrap_or(Ordering::Equal)
        .then(a.zone.cmp(&b.zone))
        .then(a.entity.vnum.cmp(&b.entity.vnum))
}

/// Run `query` over every zone of `world`, best hits first.
///
/// `accessible` decides whether a player can obtain (or meet) an entity; the session
/// supplies it from its load-location index and recipe analysis.
pub fn search_entities(
    world: &dyn WorldData,
    query: &EntityQuery,
    accessible: impl Fn(EntityRef) -> bool,
) -> Vec<SearchHit> {
    let kinds = query.kinds();
    let mut hits = Vec::new();
    for zone in world.zone_ids() {
        if !query.zones.is_empty() && !query.zones.contains(&zone) {
            continue;
        }
        for kind in &kinds {
            for vnum in world.list_ids(zone, *kind) {
                let reference = EntityRef::new(*kind, vnum);
                let (fields, name) = match world.get_in_zone(zone, reference) {
                    Ok(Entity::Object(obj)) => (
                        obj.search_fields().into_iter().map(str::to_string).collect::<Vec<_>>(),
                        obj.short_desc.clone(),
                    ),
                    Ok(Entity::Mobile(mob)) => (
                        mob.search_fields().into_iter().map(str::to_string).collect(),
                        mob.short_desc.clone(),
                    ),
                    Ok(_) => continue,
                    Err(e) => {
                        debug!("search skipped {} in zone {}: {}", reference, zone, e);
                        continue;
                    }
                };
                let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
                let Some(score) = relevance(&query.term, &fields) else {
                    continue;
                };
                let is_accessible = accessible(reference);
                if query.accessible_only && !is_accessible {
                    continue;
                }
                hits.push(SearchHit {
                    entity: reference,
                    zone,
                    name: name.unwrap_or_else(|| reference.missing_brief()),
                    relevance: score,
                    accessible: is_accessible,
                });
            }
        }
    }
    hits.sort_by(by_relevance);
    hits.truncate(query.limit);
    hits
}
