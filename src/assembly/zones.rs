use crate::world::{Vnum, ZoneMeta};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flags that mark a zone as closed to ordinary players when none are configured.
pub const DEFAULT_RESTRICTED_FLAGS: [&str; 6] =
    ["ADMIN", "GODZONE", "IMMORTAL", "DEV", "TEST", "CLOSED"];

/// Rules deciding which zones an ordinary player can reach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub restricted_flags: Vec<String>,
    pub reserved_zones: Vec<Vnum>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            restricted_flags: DEFAULT_RESTRICTED_FLAGS
                .iter()
                .map(|f| f.to_string())
                .collect(),
            reserved_zones: Vec::new(),
        }
    }
}

impl AccessPolicy {
    pub fn classify(&self, zone: &ZoneMeta) -> ZoneAccess {
        if self.reserved_zones.contains(&zone.id) {
            return ZoneAccess::ReservedZone;
        }
        for flag in &zone.flags {
            if self
                .restricted_flags
                .iter()
                .any(|r| r.eq_ignore_ascii_case(flag))
            {
                return ZoneAccess::RestrictedFlag(flag.clone());
            }
        }
        ZoneAccess::Open
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "access", content = "detail", rename_all = "snake_case")]
pub enum ZoneAccess {
    Open,
    /// The zone carries a restricted flag (kept as authored).
    RestrictedFlag(String),
    ReservedZone,
    /// Not present in the world (or its metadata could not be read).
    Unknown,
}

impl ZoneAccess {
    pub fn is_open(&self) -> bool {
        matches!(self, ZoneAccess::Open)
    }

    pub fn describe(&self) -> String {
        match self {
            ZoneAccess::Open => "open".to_string(),
            ZoneAccess::RestrictedFlag(flag) => format!("restricted ({})", flag),
            ZoneAccess::ReservedZone => "reserved".to_string(),
            ZoneAccess::Unknown => "unknown zone".to_string(),
        }
    }
}

/// Per-zone accessibility, resolved once per session load.
///
/// Only zone flags and the reserved list are considered; whether a zone's rooms are
/// actually connected to the rest of the world is not checked.
#[derive(Debug, Clone, Default)]
pub struct ZoneAccessibility {
    table: BTreeMap<Vnum, ZoneAccess>,
}

impl ZoneAccessibility {
    pub fn resolve(zones: &[ZoneMeta], policy: &AccessPolicy) -> Self {
        let table = zones
            .iter()
            .map(|zone| {
                let access = policy.classify(zone);
                if !access.is_open() {
                    debug!("zone {} is {}", zone.id, access.describe());
                }
                (zone.id, access)
            })
            .collect();
        Self { table }
    }

    pub fn is_zone_accessible(&self, zone: Vnum) -> bool {
        self.access(zone).is_open()
    }

    pub fn access(&self, zone: Vnum) -> ZoneAccess {
        self.table.get(&zone).cloned().unwrap_or(ZoneAccess::Unknown)
    }

    /// Zones that are not open, ascending by id.
    pub fn restricted(&self) -> Vec<(Vnum, ZoneAccess)> {
        self.table
            .iter()
            .filter(|(_, access)| !access.is_open())
            .map(|(id, access)| (*id, access.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_flags_match_case_insensitively() {
        let zones = vec![
            ZoneMeta::new(1, "Town"),
            ZoneMeta::new(2, "Immortal Hall").with_flag("immortal"),
            ZoneMeta::new(3, "Sandbox").with_flag("NOMAGIC").with_flag("Test"),
        ];
        let access = ZoneAccessibility::resolve(&zones, &AccessPolicy::default());
        assert!(access.is_zone_accessible(1));
        assert!(!access.is_zone_accessible(2));
        assert_eq!(access.access(3), ZoneAccess::RestrictedFlag("Test".to_string()));
        assert_eq!(access.restricted().len(), 2);
    }

    #[test]
    fn test_reserved_and_unknown_zones() {
        let policy = AccessPolicy {
            reserved_zones: vec![12],
            ..AccessPolicy::default()
        };
        let access = ZoneAccessibility::resolve(&[ZoneMeta::new(12, "Limbo")], &policy);
        assert_eq!(access.access(12), ZoneAccess::ReservedZone);
        assert_eq!(access.access(99), ZoneAccess::Unknown);
        assert!(!access.is_zone_accessible(99));
    }

    #[test]
    fn test_custom_flags_replace_defaults() {
        let policy = AccessPolicy {
            restricted_flags: vec!["QUEST".to_string()],
            reserved_zones: Vec::new(),
        };
        let zones = [
            ZoneMeta::new(1, "A").with_flag("ADMIN"),
            ZoneMeta::new(2, "B").with_flag("quest"),
        ];
        let access = ZoneAccessibility::resolve(&zones, &policy);
        assert!(access.is_zone_accessible(1));
        assert!(!access.is_zone_accessible(2));
    }
}
