//! Plain-text renderers for reports, load locations and zone summaries.

use crate::assembly::analyzer::{AccessibilityReport, ComponentResolution, Resolution, Verdict};
use crate::assembly::locations::{LoadLocation, LoadSite};
use crate::assembly::recipes::Recipe;
use crate::assembly::scripted::{CreatorSummary, ScriptCreatedEntry};
use crate::assembly::search::SearchHit;
use crate::world::{
    Entity, EntityKind, EntityRef, ResetCommand, ResetOp, Vnum, WorldData, ZoneMeta,
};

/// Longest name rendered before truncation.
pub const MAX_NAME_LEN: usize = 50;

/// Shorten `name` to [`MAX_NAME_LEN`] characters, marking the cut with "...".
pub fn truncate_name(name: &str) -> String {
    if name.chars().count() <= MAX_NAME_LEN {
        return name.to_string();
    }
    let kept: String = name.chars().take(MAX_NAME_LEN - 3).collect();
    format!("{}...", kept)
}

pub fn format_percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}%", value)
    } else {
        format!("{:.1}%", value)
    }
}

fn brief(world: &dyn WorldData, entity: EntityRef) -> String {
    truncate_name(&world.brief_of(entity))
}

fn verdict_marker(verdict: Verdict, rate: f64) -> String {
    match verdict {
        Verdict::FullyAccessible => "[OK]".to_string(),
        Verdict::PartiallyAccessible => format!("[~{:.0}%]", rate),
        Verdict::Inaccessible => "[X]".to_string(),
    }
}

pub fn format_location(location: &LoadLocation, world: &dyn WorldData) -> String {
    let site = match location.site {
        LoadSite::Room { room } => format!("in room {}", brief(world, EntityRef::room(room))),
        LoadSite::Container { container } => {
            format!("inside {}", brief(world, EntityRef::object(container)))
        }
        LoadSite::Mobile { mobile } => format!("on {}", brief(world, EntityRef::mobile(mobile))),
        LoadSite::Shop { shop, keeper } => match keeper {
            Some(keeper) => format!(
                "sold by {} (shop {})",
                brief(world, EntityRef::mobile(keeper)),
                shop
            ),
            None => format!("sold at shop {}", shop),
        },
    };
    let command = location
        .command
        .as_deref()
        .map(|c| format!(" [{}]", c))
        .unwrap_or_default();
    format!(
        "zone {}: {} {} ({}){}",
        location.zone,
        location.mechanism,
        site,
        format_percent(location.probability),
        command
    )
}

/// One-line status of a recipe, e.g. `[OK] [900] "a steel sword" - zone 1, 2 parts, 30%`.
pub fn format_recipe_line(
    recipe: &Recipe,
    report: &AccessibilityReport,
    world: &dyn WorldData,
) -> String {
    let mut line = format!(
        "{} {} - zone {}, {} parts, {}",
        verdict_marker(report.verdict, report.success_rate),
        brief(world, recipe.result),
        recipe.zone,
        recipe.components.len(),
        format_percent(report.success_rate)
    );
    if report.requires_scripted_procedure {
        line.push_str(" (scripted)");
    }
    line
}

fn format_component(component: &ComponentResolution, world: &dyn WorldData) -> Vec<String> {
    let qty = if component.quantity > 1 {
        format!("{}x ", component.quantity)
    } else {
        String::new()
    };
    let head = format!("- {}{}", qty, brief(world, component.component));
    let mut lines = Vec::new();
    match &component.resolution {
        Resolution::LoadLocation { best } => {
            lines.push(format!("{}: {}", head, format_percent(component.probability)));
            lines.push(format!("    best: {}", format_location(best, world)));
            let others = component.locations.len().saturating_sub(1);
            if others > 0 {
                lines.push(format!("    ({} other locations)", others));
            }
        }
        Resolution::NestedRecipe { nested } => {
            lines.push(format!(
                "{}: {} via nested recipe in zone {} ({})",
                head,
                format_percent(component.probability),
                nested.key.zone,
                nested.verdict
            ));
        }
        Resolution::Scripted { entry } => {
            lines.push(format!("{}: scripted", head));
            lines.push(format!("    {}", entry.describe()));
        }
        Resolution::Unresolved { reason } => {
            lines.push(format!("{}: UNAVAILABLE ({})", head, reason));
        }
    }
    if component.low_probability {
        lines.push("    low probability".to_string());
    }
    lines
}

/// Detailed, multi-line rendering of a report.
pub fn format_report(report: &AccessibilityReport, world: &dyn WorldData) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("=== {} ===", brief(world, report.result)));
    lines.push(format!(
        "Recipe: zone {} (file {}), success {}",
        report.zone,
        report.source,
        format_percent(report.recipe_probability)
    ));
    lines.push(format!(
        "Verdict: {} - overall {}",
        report.verdict,
        format_percent(report.success_rate)
    ));

    if !report.zone_accessible {
        lines.push(format!("Zone {} is not accessible to players.", report.zone));
    } else if report.components.is_empty() {
        lines.push("No components required.".to_string());
    } else {
        lines.push("Components:".to_string());
        for component in &report.components {
            lines.extend(format_component(component, world));
        }
    }

    if report.requires_scripted_procedure {
        lines.push("Requires scripted procedures:".to_string());
        for procedure in &report.scripted_procedures {
            lines.push(format!("- {}", procedure));
        }
    }

    if !report.alternative_sources.is_empty() {
        lines.push("Also loads directly:".to_string());
        for location in &report.alternative_sources {
            lines.push(format!("- {}", format_location(location, world)));
        }
    }
    lines
}

fn describe_command(cmd: &ResetCommand, world: &dyn WorldData) -> String {
    let text = match cmd.op {
        ResetOp::LoadMobile { mobile, room, max } => format!(
            "load mobile {} into {} (max {})",
            brief(world, EntityRef::mobile(mobile)),
            brief(world, EntityRef::room(room)),
            max
        ),
        ResetOp::LoadObject { object, room, max } => format!(
            "load object {} into {} (max {})",
            brief(world, EntityRef::object(object)),
            brief(world, EntityRef::room(room)),
            max
        ),
        ResetOp::EquipObject {
            object, position, ..
        } => format!(
            "equip {} at position {}",
            brief(world, EntityRef::object(object)),
            position
        ),
        ResetOp::GiveObject { object, .. } => {
            format!("give {}", brief(world, EntityRef::object(object)))
        }
        ResetOp::PutObject {
            object, container, ..
        } => format!(
            "put {} into {}",
            brief(world, EntityRef::object(object)),
            brief(world, EntityRef::object(container))
        ),
        ResetOp::RemoveObject { room, object } => format!(
            "remove {} from {}",
            brief(world, EntityRef::object(object)),
            brief(world, EntityRef::room(room))
        ),
        ResetOp::Door {
            room,
            direction,
            state,
        } => format!(
            "set door {} of {} to state {}",
            direction,
            brief(world, EntityRef::room(room)),
            state
        ),
        ResetOp::RandomizeExit {
            room, direction, ..
        } => format!(
            "randomize exits 0..{} of {}",
            direction,
            brief(world, EntityRef::room(room))
        ),
        ResetOp::Other { arg1, arg2, arg3 } => format!("{} {} {}", arg1, arg2, arg3),
    };
    let mut line = format!("{}: {}", cmd.code, text);
    if cmd.probability < 100.0 {
        line.push_str(&format!(" @ {}", format_percent(cmd.probability)));
    }
    if cmd.if_flag != 0 {
        line.push_str(" (if previous succeeded)");
    }
    line
}

/// Zone header followed by its reset commands in execution order.
pub fn format_zone_resets(zone: &ZoneMeta, world: &dyn WorldData) -> Vec<String> {
    let mut lines = vec![format!("=== Zone {} ===", zone.brief())];
    if let Some(top) = zone.top {
        lines.push(format!("Top vnum: {}", top));
    }
    if let Some(lifespan) = zone.lifespan {
        lines.push(format!("Lifespan: {} min", lifespan));
    }
    if !zone.flags.is_empty() {
        lines.push(format!("Flags: {}", zone.flags.join(" ")));
    }
    if zone.commands.is_empty() {
        lines.push("No reset commands.".to_string());
        return lines;
    }
    lines.push(format!("Reset commands ({}):", zone.commands.len()));
    for (idx, cmd) in zone.commands.iter().enumerate() {
        // indent commands that belong to the preceding mobile
        let indent = match cmd.op {
            ResetOp::EquipObject { .. } | ResetOp::GiveObject { .. } => "    ",
            ResetOp::PutObject { .. } => "      ",
            _ => "  ",
        };
        lines.push(format!("{}{}. {}", indent, idx + 1, describe_command(cmd, world)));
    }
    lines
}

/// One search result, e.g. `0.90 object [100] "an iron ingot" - zone 1`.
pub fn format_search_hit(hit: &SearchHit) -> String {
    let mut line = format!(
        "{:.2} {} [{}] \"{}\" - zone {}",
        hit.relevance,
        hit.entity.kind,
        hit.entity.vnum,
        truncate_name(&hit.name),
        hit.zone
    );
    if !hit.accessible {
        line.push_str(" (not obtainable)");
    }
    line
}

/// Code lines shown per script in a zone summary.
pub const SCRIPT_PREVIEW_LINES: usize = 25;

/// Every assembly file stored in `zone`, readable or not.
pub fn format_zone_assembles(zone: Vnum, world: &dyn WorldData) -> Vec<String> {
    let files = world.list_ids(zone, EntityKind::Recipe);
    if files.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("=== Assembles ({}) ===", files.len())];
    for file in files {
        let record = match world.get_in_zone(zone, EntityRef::recipe(file)) {
            Ok(Entity::Recipe(record)) => record,
            Ok(other) => {
                lines.push(format!("- [{}] unexpected {} record", file, other.kind()));
                continue;
            }
            Err(e) => {
                lines.push(format!("- [{}] failed to read: {}", file, e));
                continue;
            }
        };
        match record.result {
            Some(result) => lines.push(format!(
                "- Result: {} (file {})",
                brief(world, EntityRef::object(result)),
                file
            )),
            None => lines.push(format!("- [{}] no result", file)),
        }
        if !record.commands.is_empty() {
            lines.push(format!("  Commands: {}", record.commands.join(", ")));
        }
        if !record.keywords.is_empty() {
            lines.push(format!("  Keywords: {}", record.keywords.join(", ")));
        }
        if let Some(probability) = record.probability {
            lines.push(format!("  Success: {}", format_percent(probability)));
        }
        lines.push(format!("  Parts ({}):", record.parts.len()));
        let mut seen = Vec::new();
        for part in &record.parts {
            if seen.contains(part) {
                continue;
            }
            seen.push(*part);
            let count = record.parts.iter().filter(|p| *p == part).count();
            let times = if count > 1 {
                format!(" x{}", count)
            } else {
                String::new()
            };
            lines.push(format!(
                "    - {}{}",
                brief(world, EntityRef::object(*part)),
                times
            ));
        }
    }
    lines
}

/// Scripts stored in `zone` with the first `max_lines` lines of their code.
pub fn format_zone_scripts(zone: Vnum, world: &dyn WorldData, max_lines: usize) -> Vec<String> {
    let scripts = world.list_ids(zone, EntityKind::Script);
    if scripts.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("=== Scripts ({}) ===", scripts.len())];
    for vnum in scripts {
        let script = match world.get_in_zone(zone, EntityRef::script(vnum)) {
            Ok(Entity::Script(script)) => script,
            Ok(_) => continue,
            Err(e) => {
                lines.push(format!("- [{}] failed to read: {}", vnum, e));
                continue;
            }
        };
        lines.push(format!("- {}", script.brief()));
        if let Some(level) = script.level {
            lines.push(format!("  Level: {}", level));
        }
        let code: Vec<&str> = script.code.lines().collect();
        for line in code.iter().take(max_lines) {
            lines.push(format!("    | {}", line));
        }
        if code.len() > max_lines {
            lines.push(format!("    ... ({} more lines)", code.len() - max_lines));
        }
    }
    lines
}

/// Resets, assemblies and scripts of one zone.
pub fn format_zone_summary(
    zone: &ZoneMeta,
    world: &dyn WorldData,
    script_lines: usize,
) -> Vec<String> {
    let mut lines = format_zone_resets(zone, world);
    lines.extend(format_zone_assembles(zone.id, world));
    lines.extend(format_zone_scripts(zone.id, world, script_lines));
    lines
}

pub fn format_creator_summary(entry: &ScriptCreatedEntry, summary: &CreatorSummary) -> Vec<String> {
    let target = if entry.target_name.is_empty() {
        entry.target.to_string()
    } else {
        format!("{} ({})", truncate_name(&entry.target_name), entry.target)
    };
    let mut lines = vec![
        format!("=== {} ===", target),
        format!("Creator: {}", summary.creator_brief),
        format!("Procedure: {}", entry.procedure),
    ];
    if !entry.requirements.is_empty() {
        lines.push(format!("Requirements: {}", entry.requirements));
    }
    if !summary.creator_found {
        lines.push("Creator not found in world.".to_string());
    }
    if let Some(spec_proc) = &summary.spec_proc {
        lines.push(format!("Spec proc: {}", spec_proc));
    }
    if let Some(description) = &summary.description {
        lines.push(format!("Description: {}", description.trim()));
    }
    lines.push(format!(
        "Zone {}: {}",
        entry.creator_zone,
        if summary.zone_accessible {
            "accessible"
        } else {
            "not accessible"
        }
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::locations::Mechanism;
    use crate::world::{AssembleRecord, MemoryWorld, ObjectRecord, RoomRecord, ScriptRecord};

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("short"), "short");
        let long = "x".repeat(60);
        let cut = truncate_name(&long);
        assert_eq!(cut.chars().count(), MAX_NAME_LEN);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(25.0), "25%");
        assert_eq!(format_percent(12.5), "12.5%");
    }

    #[test]
    fn test_format_location() {
        let world = MemoryWorld::new().with_entity(RoomRecord::new(3001, 30, "The Temple"));
        let loc = LoadLocation::new(
            EntityRef::object(5),
            30,
            Mechanism::ZoneReset,
            LoadSite::Room { room: 3001 },
        )
        .with_probability(50.0)
        .with_command("O");
        assert_eq!(
            format_location(&loc, &world),
            "zone 30: zone reset in room [3001] \"The Temple\" (50%) [O]"
        );
    }

    #[test]
    fn test_zone_resets_listing() {
        let world = MemoryWorld::new()
            .with_entity(ObjectRecord::new(3005, 30, "a chest"))
            .with_entity(RoomRecord::new(3001, 30, "The Temple"));
        let zone = ZoneMeta::new(30, "Midgaard")
            .with_flag("NOMAGIC")
            .with_command(ResetCommand::parse("O", 3005, 1, 3001).with_probability(40.0))
            .with_command(ResetCommand::parse("P", 3006, 1, 3005));
        let lines = format_zone_resets(&zone, &world);
        assert_eq!(lines[0], "=== Zone [30] \"Midgaard\" ===");
        assert!(lines.iter().any(|l| l == "Flags: NOMAGIC"));
        assert!(lines
            .iter()
            .any(|l| l.contains("O: load object [3005] \"a chest\" into [3001] \"The Temple\" (max 1) @ 40%")));
        assert!(lines
            .iter()
            .any(|l| l.contains("P: put [3006] (object missing) into [3005] \"a chest\"")));
    }

    #[test]
    fn test_zone_summary_lists_assembles_and_scripts() {
        let world = MemoryWorld::new()
            .with_entity(ObjectRecord::new(100, 30, "an iron ingot"))
            .with_entity(ObjectRecord::new(900, 30, "a steel sword"))
            .with_entity(AssembleRecord {
                vnum: 1,
                zone: 30,
                result: Some(900),
                parts: vec![100, 100, 101],
                commands: vec!["forge".to_string()],
                ..Default::default()
            })
            .with_entity(ScriptRecord {
                vnum: 3000,
                zone: 30,
                name: Some("smith greets".to_string()),
                trigger_type: Some("Greet".to_string()),
                level: Some(5),
                code: "say hello\nemote waves\nsay bye".to_string(),
                ..Default::default()
            });
        let zone = ZoneMeta::new(30, "Midgaard").with_author("Furey");
        let lines = format_zone_summary(&zone, &world, 2);
        assert_eq!(lines[0], "=== Zone [30] \"Midgaard\" by Furey ===");
        let expected = [
            "=== Assembles (1) ===",
            "- Result: [900] \"a steel sword\" (file 1)",
            "  Commands: forge",
            "  Parts (3):",
            "    - [100] \"an iron ingot\" x2",
            "    - [101] (object missing)",
            "=== Scripts (1) ===",
            "- [3000] \"smith greets\" (trigger=Greet)",
            "  Level: 5",
            "    | say hello",
            "    | emote waves",
            "    ... (1 more lines)",
        ];
        let start = lines
            .iter()
            .position(|l| l == expected[0])
            .expect("assembles header");
        assert_eq!(&lines[start..], &expected);

        assert!(format_zone_assembles(31, &world).is_empty());
        assert!(format_zone_scripts(31, &world, SCRIPT_PREVIEW_LINES).is_empty());
    }

    #[test]
    fn test_search_hit_line() {
        let hit = SearchHit {
            entity: EntityRef::mobile(3000),
            zone: 30,
            name: "the smith".to_string(),
            relevance: 0.7,
            accessible: false,
        };
        assert_eq!(
            format_search_hit(&hit),
            "0.70 mobile [3000] \"the smith\" - zone 30 (not obtainable)"
        );
    }

    #[test]
    fn test_creator_summary_lines() {
        let entry = ScriptCreatedEntry::new(19002, 18226, 180, "mob_kharas")
            .with_names("the Armor of the Gods", "Kharas");
        let summary = CreatorSummary {
            creator_brief: "[18226] \"Kharas\"".to_string(),
            creator_found: true,
            spec_proc: Some("mob_kharas".to_string()),
            description: None,
            zone_accessible: false,
        };
        let lines = format_creator_summary(&entry, &summary);
        assert_eq!(lines[0], "=== the Armor of the Gods (object 19002) ===");
        assert_eq!(lines.last().map(String::as_str), Some("Zone 180: not accessible"));
    }
}
