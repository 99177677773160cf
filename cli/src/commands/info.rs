use anyhow::Result;
use serde_json::json;
use shorebin::{adjust_resolution, available_resolutions, DbKind, Region, Resolution, ShoreCatalog, ShoreSelect};

use crate::cli::{Cli, InfoArgs};

pub fn run(cli: &Cli, args: &InfoArgs) -> Result<()> {
    let config = super::config(cli);
    let resolution = if args.fallback { adjust_resolution(&config, args.resolution) } else { args.resolution };

    let catalog = ShoreCatalog::open(&config, resolution, &Region::world(), &ShoreSelect::default())?;
    let available = available_resolutions(&config);
    let report = json!({
        "file": DbKind::Shore.file_name(resolution),
        "resolution": resolution.to_string(),
        "bin_size_minutes": catalog.grid().bin_size(),
        "database": catalog.info(),
        "available": Resolution::ALL.iter()
            .filter(|r| available[r.rank()])
            .map(|r| r.code().to_string())
            .collect::<Vec<_>>(),
    });
    catalog.close()?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
