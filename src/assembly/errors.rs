use thiserror::Error;

use crate::world::{Vnum, WorldError};

/// Errors raised while building the analysis catalogs from a world.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An assembly file was readable but does not describe a usable recipe.
    #[error("malformed recipe {file} in zone {zone}: {reason}")]
    MalformedRecipe {
        zone: Vnum,
        file: Vnum,
        reason: String,
    },

    /// Underlying world access failure.
    #[error(transparent)]
    World(#[from] WorldError),
}
