//! Coordinate reference systems and the transforms between them.
//!
//! Definitions are static configuration data (see `data/crs.json`):
//! one proj string per system, compiled once into an immutable
//! [CrsRegistry] which is then shared by reference.

use crate::{geodesic::normalize_lon, GeoPoint, OrographyError, ProjectedPoint};
use geo::geometry::Coord;
use log::{debug, warn};
use proj4rs::{transform::transform, Proj};
use serde::Deserialize;
use std::{collections::HashMap, fmt};

/// Geographic WGS84.
pub const WGS84: &str = "EPSG:4326";

/// Belgian Lambert 72.
pub const LAMBERT72: &str = "EPSG:31370";

/// Belgian Lambert 2008.
pub const LAMBERT2008: &str = "EPSG:3812";

/// Built-in CRS parameter table.
const BUILTIN_TABLE: &str = include_str!("../data/crs.json");

#[derive(Debug, Clone, Deserialize)]
pub struct CrsTable {
    pub systems: Vec<CrsDefinition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrsDefinition {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// proj definition string, e.g. `+proj=longlat +datum=WGS84`.
    pub proj: String,
}

/// A compiled, ready to use, coordinate reference system.
pub struct CoordinateSystem {
    definition: CrsDefinition,
    proj: Proj,
    geographic: bool,
}

impl CoordinateSystem {
    fn compile(definition: CrsDefinition) -> Result<Self, OrographyError> {
        let proj = Proj::from_proj_string(&definition.proj).map_err(|e| {
            OrographyError::CrsDefinition {
                id: definition.id.clone(),
                reason: e.to_string(),
            }
        })?;
        let geographic = definition
            .proj
            .split_whitespace()
            .any(|param| param == "+proj=longlat" || param == "+proj=latlong");
        Ok(Self {
            definition,
            proj,
            geographic,
        })
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn is_geographic(&self) -> bool {
        self.geographic
    }

    /// Returns `coord` in the units proj works with: radians for
    /// geographic systems, meters otherwise.
    fn to_native(&self, Coord { x, y }: Coord<f64>) -> (f64, f64, f64) {
        if self.geographic {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        }
    }

    fn from_native(&self, (x, y, _z): (f64, f64, f64)) -> Coord<f64> {
        if self.geographic {
            Coord {
                x: normalize_lon(x.to_degrees()),
                y: y.to_degrees(),
            }
        } else {
            Coord { x, y }
        }
    }
}

impl fmt::Debug for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateSystem")
            .field("id", &self.definition.id)
            .field("proj", &self.definition.proj)
            .finish()
    }
}

/// Immutable set of coordinate reference systems.
///
/// A registry may be _unavailable_, in which case every transform
/// fails with [OrographyError::ProjectionUnavailable] while callers
/// working purely in WGS84 carry on unaffected.
#[derive(Debug)]
pub struct CrsRegistry {
    systems: Option<HashMap<String, CoordinateSystem>>,
}

impl CrsRegistry {
    /// Returns the registry built from the built-in parameter table.
    pub fn builtin() -> Result<Self, OrographyError> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Parses and compiles a JSON parameter table.
    pub fn from_json(table: &str) -> Result<Self, OrographyError> {
        let CrsTable { systems } = serde_json::from_str(table)?;
        let mut compiled = HashMap::with_capacity(systems.len());
        for definition in systems {
            let system = CoordinateSystem::compile(definition)?;
            debug!("registered {} ({})", system.id(), system.name());
            compiled.insert(system.id().to_owned(), system);
        }
        Ok(Self {
            systems: Some(compiled),
        })
    }

    /// Like `from_json`, but degrades to an unavailable registry
    /// instead of failing.
    pub fn init(table: &str) -> Self {
        match Self::from_json(table) {
            Ok(registry) => registry,
            Err(e) => {
                warn!("projection subsystem unavailable, Lambert conversion disabled: {e}");
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self { systems: None }
    }

    pub fn is_available(&self) -> bool {
        self.systems.is_some()
    }

    /// Fails with `ProjectionUnavailable` if the registry did not
    /// initialize.
    pub fn ensure_available(&self) -> Result<(), OrographyError> {
        self.systems
            .as_ref()
            .map(|_| ())
            .ok_or(OrographyError::ProjectionUnavailable)
    }

    pub fn get(&self, id: &str) -> Result<&CoordinateSystem, OrographyError> {
        self.systems
            .as_ref()
            .ok_or(OrographyError::ProjectionUnavailable)?
            .get(id)
            .ok_or_else(|| OrographyError::UnknownCrs(id.to_owned()))
    }

    /// Transforms `coord` from CRS `from` to CRS `to`.
    ///
    /// Geographic coordinates are degrees with `x` as longitude.
    pub fn transform(
        &self,
        coord: Coord<f64>,
        from: &str,
        to: &str,
    ) -> Result<Coord<f64>, OrographyError> {
        let src = self.get(from)?;
        let dst = self.get(to)?;
        if src.id() == dst.id() {
            return Ok(coord);
        }

        let mut point = src.to_native(coord);
        transform(&src.proj, &dst.proj, &mut point).map_err(|e| {
            warn!("transforming {coord:?} from {from} to {to} failed: {e}");
            OrographyError::ProjectionUnavailable
        })?;
        Ok(dst.from_native(point))
    }

    /// Projects a WGS84 point into the CRS `to`.
    pub fn project(&self, point: GeoPoint, to: &str) -> Result<ProjectedPoint, OrographyError> {
        let Coord { x, y } = self.transform(point.into(), WGS84, to)?;
        Ok(ProjectedPoint::new(x, y, to))
    }

    /// Returns the WGS84 location of a projected point.
    pub fn unproject(&self, projected: &ProjectedPoint) -> Result<GeoPoint, OrographyError> {
        let Coord { x, y } = self.transform(
            Coord {
                x: projected.x,
                y: projected.y,
            },
            &projected.crs,
            WGS84,
        )?;
        GeoPoint::normalized(y, x)
    }

    /// Returns the ids of all registered systems.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.systems
            .iter()
            .flat_map(|systems| systems.keys().map(String::as_str))
    }
}
