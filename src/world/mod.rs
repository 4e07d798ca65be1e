//! # World data access
//!
//! Typed, read-only access to a file-based MUD world: zones with their reset command
//! streams, rooms, objects, mobiles, scripts, shops and assembly recipe files.
//!
//! - [`WorldData`] is the accessor trait every analysis component consumes
//! - [`FileWorld`] indexes the on-disk `<root>/<zone>/<kind>/<vnum>.json` layout
//! - [`MemoryWorld`] holds a dataset built in code (fixtures, tests)
//! - [`identify`] renders identify-style stat blocks for objects and mobiles
//!
//! ```no_run
//! use mudlens::world::{FileWorld, WorldData};
//!
//! # fn main() -> Result<(), mudlens::world::WorldError> {
//! let world = FileWorld::open("world")?;
//! for zone in world.list_zones() {
//!     println!("{}", zone.brief());
//! }
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod identify;
pub mod loader;
pub mod memory;
pub mod store;
pub mod types;

pub use errors::WorldError;
pub use memory::MemoryWorld;
pub use store::{FileWorld, FileWorldBuilder, WorldData};
pub use types::*;
