use crate::world::errors::WorldError;
use crate::world::loader::{parse_entity, parse_zone};
use crate::world::types::{Entity, EntityKind, EntityRef, Vnum, ZoneMeta};
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Read access to a world dataset.
///
/// Implementors supply the four required lookups; everything else (kind detection,
/// briefs, zone listing) is derived from them. Ids are only unique within a kind, so
/// every lookup takes an explicit [`EntityRef`].
pub trait WorldData: Send + Sync {
    /// Ids of every zone in the world, ascending.
    fn zone_ids(&self) -> Vec<Vnum>;

    /// Load one entity. Absent entities yield [`WorldError::NotFound`]. When the same
    /// vnum exists in several zones, the copy in the lowest zone id is returned.
    fn get(&self, entity: EntityRef) -> Result<Entity, WorldError>;

    /// Vnums of every entity of `kind` stored under `zone`, ascending.
    fn list_ids(&self, zone: Vnum, kind: EntityKind) -> Vec<Vnum>;

    /// Cheap existence check that never touches entity contents.
    fn contains(&self, entity: EntityRef) -> bool;

    /// Load the copy of `entity` stored under `zone`, ignoring same-numbered entities
    /// elsewhere. Pair it with [`WorldData::list_ids`] to walk one zone's files.
    fn get_in_zone(&self, zone: Vnum, entity: EntityRef) -> Result<Entity, WorldError> {
        let found = self.get(entity)?;
        if entity.kind == EntityKind::Zone || found.zone() == zone {
            Ok(found)
        } else {
            Err(WorldError::NotFound(entity))
        }
    }

    /// Guess the kind of a bare vnum, probing in [`EntityKind::DETECTION_ORDER`].
    fn detect_kind(&self, vnum: Vnum) -> Option<EntityKind> {
        EntityKind::DETECTION_ORDER
            .into_iter()
            .find(|kind| self.contains(EntityRef::new(*kind, vnum)))
    }

    /// One-line description of a bare vnum with auto-detected kind.
    fn brief(&self, vnum: Vnum) -> String {
        match self.detect_kind(vnum) {
            Some(kind) => self.brief_of(EntityRef::new(kind, vnum)),
            None => format!("[{}] (unknown entity type)", vnum),
        }
    }

    fn brief_of(&self, entity: EntityRef) -> String {
        match self.get(entity) {
            Ok(found) => found.brief(),
            Err(WorldError::NotFound(_)) => entity.missing_brief(),
            Err(e) => {
                debug!("brief for {} unavailable: {}", entity, e);
                entity.missing_brief()
            }
        }
    }

    fn zone(&self, id: Vnum) -> Result<ZoneMeta, WorldError> {
        match self.get(EntityRef::zone(id))? {
            Entity::Zone(zone) => Ok(zone),
            _ => Err(WorldError::NotFound(EntityRef::zone(id))),
        }
    }

    /// Every readable zone. Zones whose metadata cannot be parsed are logged and skipped.
    fn list_zones(&self) -> Vec<ZoneMeta> {
        let mut zones = Vec::new();
        for id in self.zone_ids() {
            match self.zone(id) {
                Ok(zone) => zones.push(zone),
                Err(e) => warn!("skipping zone {}: {}", id, e),
            }
        }
        zones
    }

    /// Opaque change marker for the underlying dataset, if the backend can compute one.
    fn fingerprint(&self) -> Option<String> {
        None
    }

    /// Re-read whatever index the backend keeps.
    fn refresh(&mut self) -> Result<(), WorldError> {
        Ok(())
    }
}

pub struct FileWorldBuilder {
    root: PathBuf,
    allow_missing_root: bool,
}

impl FileWorldBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            allow_missing_root: false,
        }
    }

    /// Treat a missing root directory as an empty world instead of an error.
    pub fn allow_missing_root(mut self) -> Self {
        self.allow_missing_root = true;
        self
    }

    pub fn open(self) -> Result<FileWorld, WorldError> {
        let mut world = FileWorld {
            root: self.root,
            allow_missing_root: self.allow_missing_root,
            zones: BTreeMap::new(),
            index: HashMap::new(),
            zoned: HashMap::new(),
            by_zone: BTreeMap::new(),
        };
        world.scan()?;
        Ok(world)
    }
}

#[derive(Debug, Clone)]
struct IndexedFile {
    zone: Vnum,
    path: PathBuf,
}

/// World backed by the `<root>/<zone>/<kind>/<vnum>.json` directory layout.
///
/// Opening the world lists every zone directory once and records where each entity
/// lives; entity contents are read on demand. Call [`WorldData::refresh`] after the
/// dataset changes on disk.
#[derive(Debug)]
pub struct FileWorld {
    root: PathBuf,
    allow_missing_root: bool,
    /// Zone id to zone metadata file (`None` when the directory has no zone file).
    zones: BTreeMap<Vnum, Option<PathBuf>>,
    /// Zone-agnostic lookups; the lowest zone wins for duplicated vnums.
    index: HashMap<EntityRef, IndexedFile>,
    /// Every entity file, duplicates included.
    zoned: HashMap<(Vnum, EntityRef), PathBuf>,
    by_zone: BTreeMap<(Vnum, EntityKind), Vec<Vnum>>,
}

fn numeric_stem(path: &Path) -> Option<Vnum> {
    path.file_stem()?.to_str()?.parse::<Vnum>().ok()
}

impl FileWorld {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, WorldError> {
        FileWorldBuilder::new(root.as_ref()).open()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of indexed entity files across all zones.
    pub fn entity_count(&self) -> usize {
        self.zoned.len()
    }

    fn scan(&mut self) -> Result<(), WorldError> {
        self.zones.clear();
        self.index.clear();
        self.zoned.clear();
        self.by_zone.clear();

        if !self.root.is_dir() {
            if self.allow_missing_root {
                warn!("world root {} not found; using an empty world", self.root.display());
                return Ok(());
            }
            return Err(WorldError::MissingRoot(self.root.display().to_string()));
        }

        let mut zone_dirs: Vec<(Vnum, PathBuf)> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter_map(|path| {
                let id = path.file_name()?.to_str()?.parse::<Vnum>().ok()?;
                Some((id, path))
            })
            .collect();
        zone_dirs.sort();

        for (zone, dir) in zone_dirs {
            let zone_file = dir.join(format!("{}.json", zone));
            self.zones
                .insert(zone, zone_file.is_file().then_some(zone_file));
            for kind in EntityKind::FILE_KINDS {
                if let Some(name) = kind.dir_name() {
                    self.scan_kind_dir(zone, kind, &dir.join(name));
                }
            }
        }

        for ids in self.by_zone.values_mut() {
            ids.sort_unstable();
        }
        info!(
            "indexed {} zones and {} entity files under {}",
            self.zones.len(),
            self.zoned.len(),
            self.root.display()
        );
        Ok(())
    }

    fn scan_kind_dir(&mut self, zone: Vnum, kind: EntityKind, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(vnum) = numeric_stem(&path) else {
                debug!("ignoring non-numeric file {}", path.display());
                continue;
            };
            let key = EntityRef::new(kind, vnum);
            match self.index.get(&key) {
                Some(existing) => debug!(
                    "{} found in zone {} and zone {}; zone {} answers unscoped lookups",
                    key, existing.zone, zone, existing.zone
                ),
                None => {
                    self.index.insert(
                        key,
                        IndexedFile {
                            zone,
                            path: path.clone(),
                        },
                    );
                }
            }
            self.zoned.insert((zone, key), path);
            self.by_zone.entry((zone, kind)).or_default().push(vnum);
        }
    }

    /// Every world file currently on disk, sorted. Walks the tree rather than the index so
    /// that files added since the last scan are noticed.
    fn dataset_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let Ok(zones) = fs::read_dir(&self.root) else {
            return files;
        };
        for zone_dir in zones.filter_map(|e| e.ok()).map(|e| e.path()) {
            let Some(zone) = zone_dir
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<Vnum>().ok())
            else {
                continue;
            };
            let zone_file = zone_dir.join(format!("{}.json", zone));
            if zone_file.is_file() {
                files.push(zone_file);
            }
            for name in EntityKind::FILE_KINDS.iter().filter_map(|k| k.dir_name()) {
                if let Ok(entries) = fs::read_dir(zone_dir.join(name)) {
                    files.extend(
                        entries
                            .filter_map(|e| e.ok())
                            .map(|e| e.path())
                            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json")),
                    );
                }
            }
        }
        files.sort();
        files
    }
}

impl WorldData for FileWorld {
    fn zone_ids(&self) -> Vec<Vnum> {
        self.zones.keys().copied().collect()
    }

    fn get(&self, entity: EntityRef) -> Result<Entity, WorldError> {
        if entity.kind == EntityKind::Zone {
            return match self.zones.get(&entity.vnum) {
                None => Err(WorldError::NotFound(entity)),
                Some(None) => Ok(Entity::Zone(ZoneMeta::new(entity.vnum, ""))),
                Some(Some(path)) => {
                    let contents = fs::read_to_string(path)?;
                    Ok(Entity::Zone(parse_zone(entity.vnum, &contents)?))
                }
            };
        }
        let file = self
            .index
            .get(&entity)
            .ok_or(WorldError::NotFound(entity))?;
        let contents = fs::read_to_string(&file.path)?;
        parse_entity(entity.kind, entity.vnum, file.zone, &contents)
    }

    fn get_in_zone(&self, zone: Vnum, entity: EntityRef) -> Result<Entity, WorldError> {
        if entity.kind == EntityKind::Zone {
            return self.get(entity);
        }
        let path = self
            .zoned
            .get(&(zone, entity))
            .ok_or(WorldError::NotFound(entity))?;
        let contents = fs::read_to_string(path)?;
        parse_entity(entity.kind, entity.vnum, zone, &contents)
    }

    fn list_ids(&self, zone: Vnum, kind: EntityKind) -> Vec<Vnum> {
        if kind == EntityKind::Zone {
            return if self.zones.contains_key(&zone) {
                vec![zone]
            } else {
                Vec::new()
            };
        }
        self.by_zone
            .get(&(zone, kind))
            .cloned()
            .unwrap_or_default()
    }

    fn contains(&self, entity: EntityRef) -> bool {
        match entity.kind {
            EntityKind::Zone => self.zones.contains_key(&entity.vnum),
            _ => self.index.contains_key(&entity),
        }
    }

    /// SHA-256 over every world file's relative path, size and modification time.
    fn fingerprint(&self) -> Option<String> {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        for path in self.dataset_files() {
            let relative = path.strip_prefix(&self.root).unwrap_or(&path);
            hasher.update(relative.to_string_lossy().as_bytes());
            match fs::metadata(&path) {
                Ok(meta) => {
                    hasher.update(meta.len().to_le_bytes());
                    let modified = meta
                        .modified()
                        .ok()
                        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                        .map(|d| d.as_nanos())
                        .unwrap_or(0);
                    hasher.update(modified.to_le_bytes());
                }
                Err(_) => hasher.update(b"<missing>"),
            }
        }
        Some(format!("{:x}", hasher.finalize()))
    }

    fn refresh(&mut self) -> Result<(), WorldError> {
        self.scan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_missing_root_is_an_error_unless_allowed() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("nope");
        assert!(matches!(
            FileWorld::open(&root),
            Err(WorldError::MissingRoot(_))
        ));
        let world = FileWorldBuilder::new(&root)
            .allow_missing_root()
            .open()
            .expect("empty world");
        assert!(world.zone_ids().is_empty());
    }

    #[test]
    fn test_index_and_lookup() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        write(root, "30/30.json", r#"{"zone": 30, "name": "Midgaard"}"#);
        write(root, "30/object/3001.json", r#"{"short_desc": "a sword"}"#);
        write(root, "30/mobile/3001.json", r#"{"short_descr": "a guard"}"#);
        write(root, "30/object/readme.txt", "ignored");
        write(root, "31/room/3100.json", r#"{"name": "A Road"}"#);
        fs::create_dir_all(root.join("not-a-zone")).unwrap();

        let world = FileWorld::open(root).expect("open");
        assert_eq!(world.zone_ids(), vec![30, 31]);
        assert_eq!(world.entity_count(), 3);
        assert_eq!(world.list_ids(30, EntityKind::Object), vec![3001]);
        assert_eq!(world.detect_kind(3001), Some(EntityKind::Object));
        assert_eq!(world.brief(3001), "[3001] \"a sword\"");
        assert_eq!(world.brief(9999), "[9999] (unknown entity type)");
        assert_eq!(
            world.brief_of(EntityRef::mobile(3001)),
            "[3001] \"a guard\""
        );

        // zone 31 has no zone file and reads as bare metadata
        let zones = world.list_zones();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[1].id, 31);
        assert!(zones[1].name.is_empty());
    }

    #[test]
    fn test_duplicate_vnum_stays_reachable_per_zone() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        write(root, "10/object/500.json", r#"{"short_desc": "first"}"#);
        write(root, "20/object/500.json", r#"{"short_desc": "second"}"#);
        let world = FileWorld::open(root).expect("open");
        assert_eq!(world.entity_count(), 2);

        let Entity::Object(obj) = world.get(EntityRef::object(500)).unwrap() else {
            panic!("expected object");
        };
        assert_eq!(obj.zone, 10);
        assert_eq!(world.list_ids(20, EntityKind::Object), vec![500]);

        let Entity::Object(second) = world.get_in_zone(20, EntityRef::object(500)).unwrap()
        else {
            panic!("expected object");
        };
        assert_eq!(second.zone, 20);
        assert_eq!(second.short_desc.as_deref(), Some("second"));
        assert!(matches!(
            world.get_in_zone(30, EntityRef::object(500)),
            Err(WorldError::NotFound(_))
        ));
    }

    #[test]
    fn test_fingerprint_sees_new_files_before_refresh() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path();
        write(root, "1/1.json", r#"{"name": "One"}"#);
        let mut world = FileWorld::open(root).expect("open");
        let before = world.fingerprint().expect("fingerprint");
        assert_eq!(world.fingerprint().as_deref(), Some(before.as_str()));

        write(root, "1/object/100.json", r#"{"short_desc": "new thing"}"#);
        let changed = world.fingerprint().expect("fingerprint");
        assert_ne!(changed, before);
        assert!(!world.contains(EntityRef::object(100)));

        world.refresh().expect("refresh");
        assert!(world.contains(EntityRef::object(100)));
        assert_eq!(world.fingerprint(), Some(changed));
    }
}
