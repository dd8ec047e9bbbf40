//! Elevation lookups backed by a directory of NASADEM tiles.

mod error;
mod tile_source;

pub use crate::{
    error::TerrainError,
    tile_source::{TileMode, TileSource},
};
