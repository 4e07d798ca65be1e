//! Binary entrypoint for the mudlens CLI.
//!
//! Commands:
//! - `init [--force]` - write a starter `mudlens.toml`
//! - `status` - world and catalog summary
//! - `recipes [--possible|--impossible] [--zone N].. [--min-rate R]` - browse recipes
//! - `analyze <vnum> [--zone N]` - full accessibility report for a craftable object
//! - `locations <vnum> [--kind K]` - every load location of an entity
//! - `brief <vnum> [--kind K]` - one-line description of any entity
//! - `zones [--restricted]` - zone access listing
//! - `zone <id> [--script-lines N]` - zone resets, assemblies and scripts
//! - `scripted [--investigate]` - script-created item registry
//! - `crafts <term>` / `uses <term>` - find recipes by result or by component
//! - `search <term> [--kind K] [--zone N].. [--accessible] [--limit N]` - find objects and mobiles
//! - `show <vnum> [--kind K]` - identify-style detail view of an entity
//!
//! Most listing commands accept `--json`. See the library crate docs: `mudlens::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use serde::Serialize;
use std::path::Path;

use mudlens::assembly::format::{
    format_creator_summary, format_location, format_recipe_line, format_report,
    format_search_hit, format_zone_summary, SCRIPT_PREVIEW_LINES,
};
use mudlens::assembly::search::DEFAULT_SEARCH_LIMIT;
use mudlens::assembly::{
    AssemblyFilter, CreatorSummary, EntityQuery, Recipe, RecipeKey, ScriptCreatedEntry, Session,
    Verdict,
};
use mudlens::config::{Config, DEFAULT_CONFIG_FILE};
use mudlens::world::{EntityKind, EntityRef, WorldData};

#[derive(Parser)]
#[command(name = "mudlens")]
#[command(about = "Assembly accessibility analyzer for file-based MUD worlds")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: String,

    /// World root directory, overriding `world.root` from the config file
    #[arg(short, long, global = true)]
    world: Option<String>,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    #[command(flatten)]
    World(WorldCommand),
}

/// Commands that read the world through an analysis session.
#[derive(Subcommand)]
enum WorldCommand {
    /// Show world and catalog statistics
    Status {
        #[arg(long)]
        json: bool,
    },
    /// List recipes with their accessibility, best first
    Recipes {
        /// Only recipes a player can complete
        #[arg(long, conflicts_with = "impossible")]
        possible: bool,
        /// Only recipes that cannot be completed
        #[arg(long)]
        impossible: bool,
        /// Restrict to recipes owned by these zones
        #[arg(long = "zone")]
        zones: Vec<u32>,
        /// Minimum success rate in percent
        #[arg(long)]
        min_rate: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Analyze the recipes producing an object
    Analyze {
        vnum: u32,
        /// Analyze only the recipe owned by this zone
        #[arg(long)]
        zone: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Show where an entity loads
    Locations {
        vnum: u32,
        #[arg(long, default_value = "object")]
        kind: EntityKind,
        #[arg(long)]
        json: bool,
    },
    /// One-line description of an entity (kind auto-detected unless given)
    Brief {
        vnum: u32,
        #[arg(long)]
        kind: Option<EntityKind>,
    },
    /// List zones and their accessibility
    Zones {
        /// Only zones closed to players
        #[arg(long)]
        restricted: bool,
    },
    /// Show a zone's metadata, reset commands, assemblies and scripts
    Zone {
        id: u32,
        /// Script code lines to preview
        #[arg(long, default_value_t = SCRIPT_PREVIEW_LINES)]
        script_lines: usize,
    },
    /// List script-created items
    Scripted {
        /// Look up each creator mobile in the world
        #[arg(long)]
        investigate: bool,
        #[arg(long)]
        json: bool,
    },
    /// Find recipes by result name or vnum
    Crafts { term: String },
    /// Find recipes that use a component (by name or vnum)
    Uses { term: String },
    /// Search objects and mobiles by name, keywords and descriptions
    Search {
        term: String,
        /// Only this kind (object or mobile)
        #[arg(long)]
        kind: Option<EntityKind>,
        /// Only entities stored in these zones
        #[arg(long = "zone")]
        zones: Vec<u32>,
        /// Only entities a player can obtain
        #[arg(long)]
        accessible: bool,
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Identify-style details of an entity (kind auto-detected unless given)
    Show {
        vnum: u32,
        #[arg(long)]
        kind: Option<EntityKind>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            init_logging(&None, cli.verbose);
            init_config(&cli.config, force).await
        }
        Commands::World(command) => {
            let config = load_config(&cli.config, cli.world.as_deref(), cli.verbose).await?;
            let session = Session::open(&config)
                .map_err(|e| anyhow!("Failed to open world {}: {}", config.world.root, e))?;
            run(command, &session)
        }
    }
}

async fn load_config(path: &str, world: Option<&str>, verbosity: u8) -> Result<Config> {
    let (mut config, from_file) = if Path::new(path).exists() {
        (Config::load(path).await?, true)
    } else {
        (Config::default(), false)
    };
    if let Some(root) = world {
        config.world.root = root.to_string();
    }
    init_logging(&Some(config.clone()), verbosity);
    if !from_file {
        info!("No config file at {}; using defaults", path);
    }
    config.validate()?;
    Ok(config)
}

async fn init_config(path: &str, force: bool) -> Result<()> {
    if Path::new(path).exists() && !force {
        warn!("{} already exists; use --force to overwrite", path);
        return Err(anyhow!("Refusing to overwrite {}", path));
    }
    Config::create_default(path).await?;
    info!("Configuration file created at {}", path);
    println!("Wrote {}", path);
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

#[derive(Serialize)]
struct ScriptedView<'a> {
    entry: &'a ScriptCreatedEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    creator: Option<CreatorSummary>,
}

fn run(command: WorldCommand, session: &Session) -> Result<()> {
    let world = session.world();
    match command {
        WorldCommand::Status { json } => {
            let status = session.status();
            if json {
                return print_json(&status);
            }
            println!("Zones:            {} ({} restricted)", status.zones, status.restricted_zones);
            println!("Recipes:          {}", status.recipes);
            println!("Load locations:   {}", status.load_locations);
            println!(
                "Scripted items:   {} (registry v{})",
                status.scripted_entries, status.registry_version
            );
            println!("Loaded at:        {}", status.loaded_at.format("%Y-%m-%dT%H:%M:%SZ"));
            if let Some(fingerprint) = &status.fingerprint {
                println!("Fingerprint:      {}", &fingerprint[..fingerprint.len().min(16)]);
            }
        }
        WorldCommand::Recipes {
            possible,
            impossible,
            zones,
            min_rate,
            json,
        } => {
            let filter = AssemblyFilter {
                accessible_only: possible,
                min_success_rate: min_rate,
                zones,
                verdict: impossible.then_some(Verdict::Inaccessible),
            };
            let reports = session.browse(&filter);
            if json {
                return print_json(&reports);
            }
            if reports.is_empty() {
                println!("No recipes match.");
            }
            for report in &reports {
                if let Some(recipe) = session.recipes().get(report.key()) {
                    println!("{}", format_recipe_line(recipe, report, world));
                }
            }
        }
        WorldCommand::Analyze { vnum, zone, json } => {
            let report = match zone {
                Some(zone) => session
                    .recipes()
                    .get(RecipeKey { zone, result: vnum })
                    .map(|recipe| session.analyze(recipe)),
                None => session.analyze_result(vnum),
            }
            .ok_or_else(|| anyhow!("No recipe produces {}", world.brief_of(EntityRef::object(vnum))))?;
            if json {
                return print_json(&report);
            }
            print_lines(&format_report(&report, world));
        }
        WorldCommand::Locations { vnum, kind, json } => {
            let entity = EntityRef::new(kind, vnum);
            let locations = session.find_load_locations(entity);
            if json {
                return print_json(locations);
            }
            println!("{}", world.brief_of(entity));
            if locations.is_empty() {
                println!("No load locations.");
            }
            for location in locations {
                let access = if session.is_zone_accessible(location.zone) {
                    ""
                } else {
                    " (restricted zone)"
                };
                println!("- {}{}", format_location(location, world), access);
            }
        }
        WorldCommand::Brief { vnum, kind } => match kind {
            Some(kind) => println!("{}", world.brief_of(EntityRef::new(kind, vnum))),
            None => println!("{}", world.brief(vnum)),
        },
        WorldCommand::Zones { restricted } => {
            for zone in session.zones() {
                let access = session.zone_access(zone.id);
                if restricted && access.is_open() {
                    continue;
                }
                println!("{} - {}", zone.brief(), access.describe());
            }
        }
        WorldCommand::Zone { id, script_lines } => {
            let zone = world.zone(id)?;
            println!("Access: {}", session.zone_access(id).describe());
            print_lines(&format_zone_summary(&zone, world, script_lines));
        }
        WorldCommand::Scripted { investigate, json } => {
            let views: Vec<ScriptedView> = session
                .scripted_entries()
                .map(|entry| ScriptedView {
                    entry,
                    creator: investigate.then(|| session.investigate(entry)),
                })
                .collect();
            if json {
                return print_json(&views);
            }
            for view in &views {
                match &view.creator {
                    Some(summary) => print_lines(&format_creator_summary(view.entry, summary)),
                    None => println!(
                        "{} - {}",
                        world.brief_of(view.entry.target),
                        view.entry.describe()
                    ),
                }
            }
        }
        WorldCommand::Crafts { term } => {
            print_recipe_matches(session, session.search_recipes(&term))
        }
        WorldCommand::Uses { term } => {
            print_recipe_matches(session, session.recipes_using_part(&term))
        }
        WorldCommand::Search {
            term,
            kind,
            zones,
            accessible,
            limit,
            json,
        } => {
            let query = EntityQuery {
                term,
                kind,
                zones,
                accessible_only: accessible,
                limit,
            };
            let hits = session.search_entities(&query);
            if json {
                return print_json(&hits);
            }
            if hits.is_empty() {
                println!("Nothing matches '{}'.", query.term);
            }
            for hit in &hits {
                println!("{}", format_search_hit(hit));
            }
        }
        WorldCommand::Show { vnum, kind } => {
            let kind = kind
                .or_else(|| world.detect_kind(vnum))
                .ok_or_else(|| anyhow!("Nothing with vnum {} in the world", vnum))?;
            print_lines(&session.describe(EntityRef::new(kind, vnum))?);
        }
    }
    Ok(())
}

fn print_recipe_matches(session: &Session, recipes: Vec<&Recipe>) {
    if recipes.is_empty() {
        println!("No recipes match.");
        return;
    }
    let count = recipes.len();
    for recipe in recipes {
        let report = session.analyze(recipe);
        println!("{}", format_recipe_line(recipe, &report, session.world()));
    }
    println!("{} recipe(s)", count);
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // -v overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
            .unwrap_or(log::LevelFilter::Warn),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Echo to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
