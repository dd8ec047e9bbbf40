use clap::{Args, Parser, Subcommand, ValueEnum};
use orography::SiteInput;
use std::path::PathBuf;
use terrain::TileMode;

/// Assess the orography of a structure site.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON coordinate reference system table to use instead of the
    /// built-in one.
    #[arg(long, global = true)]
    pub crs_table: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a site's WGS84 and Lambert coordinates.
    Resolve(Resolve),

    /// Sample terrain around a site and print its orography factor.
    Assess(Assess),

    /// Print the sampling circles and cross around a site as GeoJSON.
    Overlay(Overlay),
}

#[derive(Debug, Clone, Args)]
pub struct Site {
    /// How to interpret the site values.
    #[arg(short, long, value_enum, default_value_t = SiteKind::Lonlat)]
    pub kind: SiteKind,

    /// JSON list of `{name, lat, lon}` places used to look up
    /// addresses.
    #[arg(long)]
    pub gazetteer: Option<PathBuf>,

    /// Address words, "LON LAT" or Lambert "X Y". Defaults to central
    /// Brussels. Either `.` or `,` may be used as decimal separator.
    #[arg(allow_negative_numbers = true)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SiteKind {
    Address,
    Lonlat,
    Lambert72,
    Lambert2008,
}

#[derive(Debug, Clone, Args)]
pub struct Resolve {
    #[command(flatten)]
    pub site: Site,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct Assess {
    #[command(flatten)]
    pub site: Site,

    /// Directory of NASADEM elevation tiles.
    #[arg(short, long)]
    pub tile_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = TileModeArg::MemMap)]
    pub tile_mode: TileModeArg,

    /// Tower height in meters. Defaults to 30.
    #[arg(long)]
    pub height: Option<f64>,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct Overlay {
    #[command(flatten)]
    pub site: Site,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TileModeArg {
    InMem,
    MemMap,
}

impl From<TileModeArg> for TileMode {
    fn from(mode: TileModeArg) -> Self {
        match mode {
            TileModeArg::InMem => TileMode::InMem,
            TileModeArg::MemMap => TileMode::MemMap,
        }
    }
}

impl Site {
    /// Returns the site as resolver input.
    pub fn input(&self) -> anyhow::Result<SiteInput> {
        Ok(match self.kind {
            SiteKind::Address => SiteInput::Address(self.values.join(" ")),
            SiteKind::Lonlat => {
                let [lon, lat] = self.pair(Some(["4.3517", "50.8503"]))?;
                SiteInput::LonLat { lon, lat }
            }
            SiteKind::Lambert72 => {
                let [x, y] = self.pair(None)?;
                SiteInput::Lambert72 { x, y }
            }
            SiteKind::Lambert2008 => {
                let [x, y] = self.pair(None)?;
                SiteInput::Lambert2008 { x, y }
            }
        })
    }

    fn pair(&self, default: Option<[&str; 2]>) -> anyhow::Result<[String; 2]> {
        match (self.values.as_slice(), default) {
            ([a, b], _) => Ok([a.clone(), b.clone()]),
            ([], Some(default)) => Ok(default.map(str::to_owned)),
            _ => anyhow::bail!("expected two coordinate values for {:?}", self.kind),
        }
    }
}
