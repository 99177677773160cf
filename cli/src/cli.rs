use std::path::PathBuf;

use shorebin::{Region, Resolution, ShoreSelect};

/// Binned shoreline database tools
#[derive(clap::Parser, Debug)]
#[command(name = "shorebin", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Directory holding the binned databases (overrides GSHHGDIR)
    #[arg(long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub gshhg_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Assemble shoreline polygons for a region and write them as GeoJSON
    Coast(CoastArgs),

    /// Extract river or border lines for a region as GeoJSON
    Lines(LinesArgs),

    /// Print database metadata and the resolutions available
    Info(InfoArgs),
}

#[derive(clap::Args, Debug)]
pub struct CoastArgs {
    /// Region as west/east/south/north in degrees
    #[arg(short = 'R', long, allow_hyphen_values = true)]
    pub region: Region,

    /// Resolution: f, h, i, l or c
    #[arg(short = 'D', long, default_value = "l")]
    pub resolution: Resolution,

    /// Polygon filter: min_area[/low[/high]][+as][+l|+r][+p<percent>]
    #[arg(short = 'A', long, default_value = "0")]
    pub select: ShoreSelect,

    /// Paint wet areas instead of dry ones
    #[arg(long)]
    pub water: bool,

    /// Emit the raw clipped segments instead of closed rings
    #[arg(long)]
    pub no_assemble: bool,

    /// Densify ring edges to at most this many degrees before clipping
    #[arg(long)]
    pub step: Option<f64>,

    /// Longitude and latitude of the map's antipode
    #[arg(long, num_args = 2, value_names = ["LON", "LAT"], allow_hyphen_values = true)]
    pub antipode: Option<Vec<f64>>,

    /// Output file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKindArg {
    River,
    Border,
}

#[derive(clap::Args, Debug)]
pub struct LinesArgs {
    /// Which line database
    #[arg(value_enum)]
    pub kind: LineKindArg,

    /// Region as west/east/south/north in degrees
    #[arg(short = 'R', long, allow_hyphen_values = true)]
    pub region: Region,

    /// Resolution: f, h, i, l or c
    #[arg(short = 'D', long, default_value = "l")]
    pub resolution: Resolution,

    /// Levels to keep, e.g. -L 1 -L 2; all levels when omitted
    #[arg(short = 'L', long = "level")]
    pub levels: Vec<u8>,

    /// Output file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    /// Resolution: f, h, i, l or c
    #[arg(short = 'D', long, default_value = "l")]
    pub resolution: Resolution,

    /// Substitute the best coarser resolution when the requested one is missing
    #[arg(long)]
    pub fallback: bool,
}
