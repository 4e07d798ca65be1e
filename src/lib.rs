//! # mudlens - Assembly Accessibility Analyzer for MUD Worlds
//!
//! mudlens reads a file-based MUD world (zones, rooms, objects, mobiles, scripts, shops
//! and assembly recipes) and answers one question for every craftable item: can an
//! ordinary player actually obtain it?
//!
//! ## Features
//!
//! - **World Indexing**: One directory scan per load; kind detection is an index lookup.
//! - **Load Locations**: Zone resets, nested containers (with compounded probabilities),
//!   mobile equipment and inventory, repops and shop stock.
//! - **Zone Policy**: Restricted flags and reserved zone ids decide which zones count.
//! - **Recursive Analysis**: Nested recipes with cycle detection, a depth cap and
//!   per-analysis memoization of shared sub-assemblies.
//! - **Entity Search**: Ranked search over objects and mobiles with identify-style views.
//! - **Scripted Items**: A versioned registry of items created by special procedures,
//!   extensible from the configuration file.
//! - **Serializable Reports**: Every result type derives serde traits.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mudlens::assembly::Session;
//! use mudlens::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("mudlens.toml").await?;
//!     let session = Session::open(&config)?;
//!
//!     if let Some(report) = session.analyze_result(19002) {
//!         println!("{}: {}", report.result, report.verdict);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`world`] - world data accessor trait, file-backed and in-memory worlds
//! - [`assembly`] - recipe catalog, load locations, zone access, analyzer, search and session
//! - [`config`] - configuration loading and validation
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Session       │ ← catalogs + report cache
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   Analyzer      │ ← pure function of the catalogs
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   WorldData     │ ← file or in-memory world
//! └─────────────────┘
//! ```

pub mod assembly;
pub mod config;
pub mod world;
