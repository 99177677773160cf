pub mod coast;
pub mod info;
pub mod lines;

use std::{fs::File, io::{self, BufWriter, Write}, path::Path};

use anyhow::{Context, Result};
use shorebin::{io::write_geojson, ShoreConfig, ShorePolygon};

use crate::cli::Cli;

/// Search paths from the environment, with `--gshhg-dir` taking precedence.
pub fn config(cli: &Cli) -> ShoreConfig {
    let config = ShoreConfig::from_env();
    match &cli.gshhg_dir {
        Some(dir) => config.with_gshhg_dir(dir),
        None => config,
    }
}

/// Write features to `output`, or to stdout when no path is given.
pub fn emit(polys: &[(usize, ShorePolygon)], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_geojson(polys, &mut writer)?;
            writer.flush()?;
        }
        None => {
            let mut out = io::stdout().lock();
            write_geojson(polys, &mut out)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
