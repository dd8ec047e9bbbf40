//! NASADEM elevation (`.hgt`) file format.
//!
//! A tile covers one degree of latitude and longitude. Samples are
//! big-endian `i16` meters, stored in rows from north to south, each
//! row from west to east. Tile files are named after the center of
//! their southwest most sample, e.g. `N50E004.hgt`.
//!
//! # References
//!
//! 1. [HGT file layout](http://fileformats.archiveteam.org/index.php?title=HGT&oldid=17250)
//! 1. [SRTM Collection User Guide](https://lpdaac.usgs.gov/documents/179/SRTM_User_Guide_V3.pdf)

mod error;

pub use crate::error::NasademError;
use byteorder::{BigEndian as BE, ReadBytesExt};
use geo::geometry::Coord;
use memmap2::Mmap;
use std::{fs::File, io::BufReader, mem::size_of, path::Path};

/// Base floating point type used for all coordinates.
pub type C = f64;

/// Marker for samples without data.
pub const VOID: i16 = i16::MIN;

const ARCSEC_PER_DEG: C = 3600.0;

pub struct Tile {
    /// Southwest corner of the tile.
    ///
    /// Specifically, the _center_ of the SW most sample of the tile.
    sw_corner_center: Coord<C>,

    /// Arcseconds per sample.
    resolution: u8,

    /// Number of (columns, rows) in this tile.
    dimensions: (usize, usize),

    /// Elevation samples.
    samples: SampleStore,
}

enum SampleStore {
    InMem(Box<[i16]>),
    MemMap(Mmap),
}

impl SampleStore {
    fn get(&self, index: usize) -> Option<i16> {
        match self {
            Self::InMem(samples) => samples.get(index).copied(),
            Self::MemMap(raw) => {
                let start = index * size_of::<i16>();
                let bytes = raw.get(start..start + size_of::<i16>())?;
                Some(i16::from_be_bytes([bytes[0], bytes[1]]))
            }
        }
    }
}

impl Tile {
    /// Returns a Tile read into memory from the file at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NasademError> {
        let (resolution, dimensions @ (cols, rows)) = extract_resolution(&path)?;
        let sw_corner_center = sw_corner_center(&path)?;

        let mut file = BufReader::new(File::open(path)?);
        let mut samples = Vec::with_capacity(cols * rows);
        for _ in 0..(cols * rows) {
            samples.push(file.read_i16::<BE>()?);
        }

        Ok(Self {
            sw_corner_center,
            resolution,
            dimensions,
            samples: SampleStore::InMem(samples.into_boxed_slice()),
        })
    }

    /// Returns a Tile using the memory-mapped file as storage.
    pub fn memmap<P: AsRef<Path>>(path: P) -> Result<Self, NasademError> {
        let (resolution, dimensions) = extract_resolution(&path)?;
        let sw_corner_center = sw_corner_center(&path)?;

        let samples = {
            let file = File::open(path)?;
            // SAFETY: tiles are read-only data files which are not
            // modified while mapped.
            let mmap = unsafe { Mmap::map(&file)? };
            SampleStore::MemMap(mmap)
        };

        Ok(Self {
            sw_corner_center,
            resolution,
            dimensions,
            samples,
        })
    }

    /// Returns the number of samples in this tile.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        let (x, y) = self.dimensions;
        x * y
    }

    /// Returns this tile's resolution in arcseconds per sample.
    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    /// Returns the raw sample nearest to the given geo coordinates, or
    /// `None` if they are outside this tile.
    pub fn get(&self, coord: Coord<C>) -> Option<i16> {
        let (x, y) = self.coord_to_xy(coord)?;
        self.samples.get(self.xy_to_linear_index((x, y)))
    }

    /// Returns the elevation in meters nearest to the given geo
    /// coordinates, or `None` if they are outside this tile or the
    /// sample is void.
    pub fn elevation(&self, coord: Coord<C>) -> Option<C> {
        self.get(coord)
            .filter(|&sample| sample != VOID)
            .map(C::from)
    }
}

/// Private API
impl Tile {
    /// Returns the (column, row) of the sample nearest to `coord`,
    /// counting rows from the south.
    fn coord_to_xy(&self, coord: Coord<C>) -> Option<(usize, usize)> {
        let c = ARCSEC_PER_DEG / C::from(self.resolution);
        let x = ((coord.x - self.sw_corner_center.x) * c).round();
        let y = ((coord.y - self.sw_corner_center.y) * c).round();
        let (cols, rows) = self.dimensions;
        #[allow(clippy::cast_precision_loss)]
        if x.is_nan() || y.is_nan() || x < 0.0 || y < 0.0 || x >= cols as C || y >= rows as C {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let xy = (x as usize, y as usize);
        Some(xy)
    }

    fn xy_to_linear_index(&self, (x, y): (usize, usize)) -> usize {
        let (cols, rows) = self.dimensions;
        cols * (rows - y - 1) + x
    }
}

/// Returns the file name of the tile whose southwest corner is
/// `sw_corner`.
pub fn tile_name(sw_corner: Coord<i16>) -> String {
    let ns = if sw_corner.y < 0 { 'S' } else { 'N' };
    let ew = if sw_corner.x < 0 { 'W' } else { 'E' };
    format!(
        "{ns}{:02}{ew}{:03}.hgt",
        sw_corner.y.unsigned_abs(),
        sw_corner.x.unsigned_abs()
    )
}

fn sw_corner_center<P: AsRef<Path>>(path: P) -> Result<Coord<C>, NasademError> {
    let Coord { x, y } = parse_sw_corner(path)?;
    Ok(Coord {
        x: C::from(x),
        y: C::from(y),
    })
}

fn extract_resolution<P: AsRef<Path>>(path: P) -> Result<(u8, (usize, usize)), NasademError> {
    const RES_1_ARCSECONDS_FILE_LEN: u64 = 3601 * 3601 * size_of::<u16>() as u64;
    const RES_3_ARCSECONDS_FILE_LEN: u64 = 1201 * 1201 * size_of::<u16>() as u64;
    match path.as_ref().metadata().map(|m| m.len())? {
        RES_1_ARCSECONDS_FILE_LEN => Ok((1, (3601, 3601))),
        RES_3_ARCSECONDS_FILE_LEN => Ok((3, (1201, 1201))),
        invalid_len => Err(NasademError::HgtLen(invalid_len, path.as_ref().to_owned())),
    }
}

fn parse_sw_corner<P: AsRef<Path>>(path: P) -> Result<Coord<i16>, NasademError> {
    let mk_err = || NasademError::HgtName(path.as_ref().to_owned());
    let name = path
        .as_ref()
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(mk_err)?;
    if name.len() != 7 || !name.is_ascii() {
        return Err(mk_err());
    }
    let lat_sign = match &name[0..1] {
        "N" | "n" => 1,
        "S" | "s" => -1,
        _ => return Err(mk_err()),
    };
    let lat = lat_sign * name[1..3].parse::<i16>().map_err(|_| mk_err())?;
    let lon_sign = match &name[3..4] {
        "E" | "e" => 1,
        "W" | "w" => -1,
        _ => return Err(mk_err()),
    };
    let lon = lon_sign * name[4..7].parse::<i16>().map_err(|_| mk_err())?;
    Ok(Coord { x: lon, y: lat })
}
