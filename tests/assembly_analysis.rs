//! End-to-end analysis over on-disk worlds through [`Session`].

mod common;

use common::{load_object, put_object, WorldFixture};
use mudlens::assembly::{
    AssemblyFilter, EntityQuery, Resolution, Session, UnresolvedReason, Verdict,
};
use mudlens::world::{EntityKind, EntityRef};
use mudlens::config::{Config, ScriptedItemConfig};
use serde_json::json;

fn config_for(fx: &WorldFixture) -> Config {
    let mut config = Config::default();
    config.world.root = fx.root().display().to_string();
    config
}

/// Town (zone 1, open) and a god zone (zone 2) with a few loads and recipes.
fn town_world() -> WorldFixture {
    let fx = WorldFixture::new();
    fx.zone(
        1,
        "Town",
        &[],
        json!([
            load_object(100, 1000, 100.0),
            load_object(101, 1000, 40.0),
            load_object(110, 1001, 50.0),
            put_object(111, 110, 50.0),
        ]),
    )
    .room(1, 1000, "Market Square")
    .room(1, 1001, "Old Cellar")
    .object(1, 100, "an iron ingot")
    .object(1, 101, "a leather strap")
    .object(1, 110, "a dusty chest")
    .object(1, 111, "a silver ring")
    .recipe(1, 1, 900, &[100, 101])
    .recipe(1, 2, 901, &[200])
    .recipe(1, 3, 902, &[111, 100]);
    fx.zone(
        2,
        "Olympus",
        &["GODZONE"],
        json!([load_object(200, 2000, 100.0)]),
    )
    .object(2, 200, "a divine spark");
    fx
}

#[test]
fn open_zone_components_are_fully_accessible() {
    let fx = town_world();
    let session = Session::open(&config_for(&fx)).expect("open session");

    let report = session.analyze_result(900).expect("recipe for 900");
    assert_eq!(report.verdict, Verdict::FullyAccessible);
    assert_eq!(report.success_rate, 40.0);
    assert!(report.zone_accessible);
    assert_eq!(report.components.len(), 2);
    match &report.components[1].resolution {
        Resolution::LoadLocation { best } => assert_eq!(best.zone, 1),
        other => panic!("expected a load location, got {:?}", other),
    }
}

#[test]
fn restricted_only_sources_make_recipe_inaccessible() {
    let fx = town_world();
    let session = Session::open(&config_for(&fx)).expect("open session");

    let report = session.analyze_result(901).expect("recipe for 901");
    assert_eq!(report.verdict, Verdict::Inaccessible);
    assert_eq!(report.success_rate, 0.0);
    assert_eq!(
        report.components[0].unresolved_reason(),
        Some(&UnresolvedReason::OnlyRestrictedZones { zones: vec![2] })
    );
    assert!(!session.is_zone_accessible(2));
}

#[test]
fn container_loads_compound_probability() {
    let fx = town_world();
    let session = Session::open(&config_for(&fx)).expect("open session");

    // ring at 50% inside a chest that loads at 50%
    let report = session.analyze_result(902).expect("recipe for 902");
    assert_eq!(report.success_rate, 25.0);
    assert_eq!(report.verdict, Verdict::FullyAccessible);
    assert!(!report.has_low_probability_component);
}

#[test]
fn malformed_recipes_are_skipped_without_blocking_others() {
    let fx = town_world();
    fx.write_raw("1/assemble/4.json", "{ broken");
    fx.write_json("1/assemble/5.json", json!({"vnum": 950, "parts": []}));
    fx.write_json("1/assemble/6.json", json!({"parts": [100]}));

    let session = Session::open(&config_for(&fx)).expect("open session");
    assert_eq!(session.status().recipes, 3);
    assert!(session.analyze_result(950).is_none());
    assert!(session.analyze_result(900).is_some());
}

#[test]
fn corrupt_zone_file_makes_only_that_zone_unknown() {
    let fx = town_world();
    fx.write_raw("3/3.json", "not json at all");
    fx.object(3, 300, "a cracked lens").recipe(3, 1, 903, &[100]);

    let session = Session::open(&config_for(&fx)).expect("open session");
    let report = session.analyze_result(903).expect("recipe for 903");
    assert!(!report.zone_accessible);
    assert_eq!(report.verdict, Verdict::Inaccessible);

    assert_eq!(
        session.analyze_result(900).map(|r| r.verdict),
        Some(Verdict::FullyAccessible)
    );
}

#[test]
fn configured_scripted_items_resolve_components() {
    let fx = town_world();
    fx.recipe(1, 7, 907, &[555, 100]);
    let mut config = config_for(&fx);
    config.scripted_items.push(ScriptedItemConfig {
        target: 555,
        target_name: "a blessed hammer".to_string(),
        creator: 1500,
        creator_name: "the priest".to_string(),
        creator_zone: 1,
        procedure: "mob_priest".to_string(),
        requirements: "Donate 100 coins".to_string(),
    });

    let session = Session::open(&config).expect("open session");
    let report = session.analyze_result(907).expect("recipe for 907");
    assert_eq!(report.verdict, Verdict::PartiallyAccessible);
    assert!(report.requires_scripted_procedure);
    assert_eq!(report.success_rate, 100.0);
    assert!(report.components[0].is_scripted());

    config.analysis.scripted_is_fully_accessible = true;
    let session = Session::open(&config).expect("open session");
    assert_eq!(
        session.analyze_result(907).map(|r| r.verdict),
        Some(Verdict::FullyAccessible)
    );
}

#[test]
fn browse_and_search() {
    let fx = town_world();
    let session = Session::open(&config_for(&fx)).expect("open session");

    let possible = session.browse(&AssemblyFilter {
        accessible_only: true,
        ..Default::default()
    });
    let results: Vec<u32> = possible.iter().map(|r| r.result.vnum).collect();
    assert_eq!(results, vec![900, 902]);

    let impossible = session.browse(&AssemblyFilter {
        verdict: Some(Verdict::Inaccessible),
        ..Default::default()
    });
    assert_eq!(impossible.len(), 1);

    let using_ingot = session.recipes_using_part("IRON INGOT");
    assert_eq!(using_ingot.len(), 2);
    assert_eq!(session.recipes_using_part("200").len(), 1);
    assert!(session.search_recipes("dragon").is_empty());
}

#[test]
fn reload_if_changed_picks_up_new_recipes() {
    let fx = town_world();
    let mut session = Session::open(&config_for(&fx)).expect("open session");
    session.analyze_all();
    assert_eq!(session.cached_reports(), 3);
    assert!(!session.reload_if_changed().expect("check"));

    fx.recipe(1, 8, 908, &[101]);
    assert!(session.reload_if_changed().expect("reload"));
    assert_eq!(session.status().recipes, 4);
    assert_eq!(session.cached_reports(), 0);
    assert_eq!(
        session.analyze_result(908).map(|r| r.success_rate),
        Some(40.0)
    );
}

#[test]
fn same_recipe_file_number_in_two_zones_yields_two_recipes() {
    let fx = WorldFixture::new();
    fx.zone(10, "West", &[], json!([load_object(100, 1000, 100.0)]))
        .object(10, 100, "an iron ingot")
        .recipe(10, 500, 500, &[100]);
    fx.zone(20, "East", &[], json!([]))
        .write_json("20/assemble/500.json", json!({"vnum": 500, "parts": [100, 100]}));

    let session = Session::open(&config_for(&fx)).expect("open session");
    assert_eq!(session.status().recipes, 2);
    let producing = session.recipes().producing(500);
    let zones: Vec<u32> = producing.iter().map(|r| r.zone).collect();
    assert_eq!(zones, vec![10, 20]);
    assert_eq!(producing[1].components.len(), 2);
}

#[test]
fn entity_search_over_objects_and_mobiles() {
    let fx = town_world();
    fx.mobile(
        1,
        1500,
        json!({"short_descr": "the ingot merchant", "name": "merchant trader", "level": 10}),
    );

    let session = Session::open(&config_for(&fx)).expect("open session");
    let hits = session.search_entities(&EntityQuery::new("ingot"));
    let found: Vec<EntityRef> = hits.iter().map(|h| h.entity).collect();
    assert_eq!(found, vec![EntityRef::object(100), EntityRef::mobile(1500)]);
    assert!(hits[0].accessible);
    // loaded by no reset
    assert!(!hits[1].accessible);

    let mobiles = session.search_entities(&EntityQuery::new("trader").with_kind(EntityKind::Mobile));
    assert_eq!(mobiles.len(), 1);
    assert_eq!(mobiles[0].name, "the ingot merchant");

    let spark = session.search_entities(&EntityQuery::new("spark").accessible_only());
    assert!(spark.is_empty());
}

#[test]
fn show_object_and_zone_summary() {
    let fx = town_world();
    fx.write_json(
        "1/object/100.json",
        json!({
            "short_desc": "an iron ingot",
            "name": "ingot iron",
            "type_flag": 12,
            "weight": 5,
            "cost": 40,
            "wear_flags": "1"
        }),
    );
    fx.write_json(
        "1/script/1050.json",
        json!({"name": "smelter", "trigger_type": "Command", "code": "say heat\nsay pour"}),
    );

    let session = Session::open(&config_for(&fx)).expect("open session");
    let lines = session.describe(EntityRef::object(100)).expect("object 100");
    assert_eq!(lines[0], "=== Object [100] 'an iron ingot' ===");
    assert!(lines.iter().any(|l| l == "Weight: 5, Value: 40"));
    assert!(lines.iter().any(|l| l == "Used in:"));

    let zone = session.describe(EntityRef::zone(1)).expect("zone 1");
    assert_eq!(zone[0], "Access: open");
    assert!(zone.iter().any(|l| l == "=== Assembles (3) ==="));
    assert!(zone.iter().any(|l| l == "- [1050] \"smelter\" (trigger=Command)"));
    assert!(zone.iter().any(|l| l == "    | say pour"));
}
