//! # Assembly accessibility analysis
//!
//! Decides whether a craftable item can be obtained by an ordinary player, given where
//! its components load, which zones players can reach, and which components are only
//! produced by scripted procedures.
//!
//! - [`recipes`] - recipe catalog read from the world's assembly files
//! - [`locations`] - load-location index built from resets, repops and shops
//! - [`zones`] - zone accessibility policy and per-zone verdicts
//! - [`scripted`] - registry of script-created items
//! - [`search`] - free-text search over objects and mobiles
//! - [`analyzer`] - the recursive accessibility analysis
//! - [`session`] - owns all of the above plus the report cache
//! - [`format`] - plain-text renderers
//!
//! ```no_run
//! use mudlens::assembly::session::Session;
//! use mudlens::config::Config;
//!
//! # fn main() -> Result<(), mudlens::world::WorldError> {
//! let session = Session::open(&Config::default())?;
//! for recipe in session.load_all_recipes() {
//!     let report = session.analyze(recipe);
//!     println!("{} {} {:.0}%", recipe.key(), report.verdict, report.success_rate);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod errors;
pub mod format;
pub mod locations;
pub mod recipes;
pub mod scripted;
pub mod search;
pub mod session;
pub mod zones;

pub use analyzer::{
    AccessibilityReport, Analyzer, AnalyzerOptions, NestedSummary, Resolution, UnresolvedReason,
    Verdict,
};
pub use errors::CatalogError;
pub use locations::{LoadLocation, LoadLocationIndex, LoadSite, Mechanism};
pub use recipes::{load_all_recipes, Recipe, RecipeCatalog, RecipeKey};
pub use scripted::{CreatorSummary, ScriptCreatedEntry, ScriptRegistry};
pub use search::{EntityQuery, SearchHit};
pub use session::{AssemblyFilter, Session, SessionSettings, SessionStatus};
pub use zones::{AccessPolicy, ZoneAccess, ZoneAccessibility};
