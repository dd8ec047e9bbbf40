//! NASADEM file aggregator.

use crate::TerrainError;
use dashmap::DashMap;
use geo::geometry::Coord;
use log::{debug, warn};
use nasadem::{tile_name, NasademError, Tile};
use orography::{ElevationSource, GeoPoint};
use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Point elevations read from NASADEM tiles, loaded on demand.
///
/// Cloning is cheap; clones share loaded tiles.
#[derive(Clone)]
pub struct TileSource {
    inner: Arc<Inner>,
}

struct Inner {
    /// Directory containing NASADEM HGT tile files.
    tile_dir: PathBuf,

    /// How to load tiles (in-memory or mapped).
    tile_mode: TileMode,

    /// Tiles which have been loaded on demand.
    ///
    /// `None` records a tile which does not exist on disk, so that
    /// we only look for it once.
    tiles: DashMap<Coord<i16>, Option<Arc<Tile>>>,
}

impl TileSource {
    pub fn new(tile_dir: PathBuf, tile_mode: TileMode) -> Result<Self, TerrainError> {
        let mut has_height_files = false;

        // Let's try to fail early by checking that tile_dir has at
        // least one `hgt` file.
        for entry in std::fs::read_dir(&tile_dir)? {
            let path = entry?.path();
            if Some("hgt") == path.extension().and_then(|ext| ext.to_str()) {
                has_height_files = true;
                break;
            }
        }

        if has_height_files {
            Ok(Self {
                inner: Arc::new(Inner {
                    tile_dir,
                    tile_mode,
                    tiles: DashMap::new(),
                }),
            })
        } else {
            Err(TerrainError::Path(tile_dir))
        }
    }

    /// Returns the tile containing `coord`, if any.
    ///
    /// This TileSource will attempt to load the tile from disk if it
    /// doesn't already have it in memory.
    pub fn get(&self, coord: Coord<f64>) -> Result<Option<Arc<Tile>>, TerrainError> {
        let Some(sw_corner) = sw_corner(coord) else {
            return Ok(None);
        };
        self.inner
            .tiles
            .entry(sw_corner)
            .or_try_insert_with(|| match self.load_tile(sw_corner) {
                Ok(tile) => Ok(Some(Arc::new(tile))),
                Err(TerrainError::Nasadem(NasademError::Io(e)))
                    if e.kind() == ErrorKind::NotFound =>
                {
                    debug!("no tile for {sw_corner:?}");
                    Ok(None)
                }
                Err(e) => Err(e),
            })
            .map(|r| r.clone())
    }

    /// Returns the elevation (meters) at `coord`, or `None` where
    /// there is no tile or the sample is void.
    pub fn elevation(&self, coord: Coord<f64>) -> Result<Option<f64>, TerrainError> {
        Ok(self.get(coord)?.and_then(|tile| tile.elevation(coord)))
    }
}

impl TileSource {
    fn load_tile(&self, sw_corner: Coord<i16>) -> Result<Tile, TerrainError> {
        let file_name = tile_name(sw_corner);
        let tile_path: PathBuf = [&self.inner.tile_dir, Path::new(&file_name)]
            .iter()
            .collect();
        debug!("loading {}", tile_path.display());

        match self.inner.tile_mode {
            TileMode::InMem => Ok(Tile::load(tile_path)?),
            TileMode::MemMap => Ok(Tile::memmap(tile_path)?),
        }
    }
}

impl ElevationSource for TileSource {
    type Error = TerrainError;

    fn elevation(
        &self,
        point: GeoPoint,
    ) -> impl Future<Output = Result<Vec<f64>, Self::Error>> + Send {
        let source = self.clone();
        async move {
            // Tile loading is blocking file IO.
            let elevation =
                tokio::task::spawn_blocking(move || source.elevation(point.into())).await??;
            if elevation.is_none() {
                warn!("no elevation data at {point:?}");
            }
            Ok::<_, TerrainError>(elevation.into_iter().collect())
        }
    }
}

/// How to handle tile.
///
/// The trade off between loading tile data into memory versus memory
/// mapping is not obvious, and you should measure both before
/// deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileMode {
    /// Parse tile and load into memory.
    ///
    /// Note that this can consume gigabytes of RAM when loading many
    /// tiles.
    InMem,

    /// Memory map file contents.
    MemMap,
}

/// Returns the southwest corner as integers for coord.
fn sw_corner(Coord { x, y }: Coord<f64>) -> Option<Coord<i16>> {
    if !(-180.0..=180.0).contains(&x) || !(-90.0..=90.0).contains(&y) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let sw_corner = Coord {
        x: x.floor() as i16,
        y: y.floor() as i16,
    };
    Some(sw_corner)
}
