use anyhow::{Context, Result};
use shorebin::{prep_shore_polygons, Direction, LonLatBoundary, ShoreCatalog};
use tracing::info;

use crate::cli::{Cli, CoastArgs};

pub fn run(cli: &Cli, args: &CoastArgs) -> Result<()> {
    let config = super::config(cli);
    let dir = if args.water { Direction::Water } else { Direction::Land };

    let mut catalog = ShoreCatalog::open(&config, args.resolution, &args.region, &args.select)
        .with_context(|| format!("[coast] cannot open the {} shoreline database", args.resolution))?;
    info!("[coast] {} bins selected for {}", catalog.n_bins(), catalog.region());

    let boundary = LonLatBoundary::new(catalog.region());
    let (step, resample) = match args.step {
        Some(step) if step > 0.0 => (step, true),
        _ => (0.0, false),
    };
    let antipode = args.antipode.as_deref()
        .and_then(|pair| catalog.grid().bin_at(pair[0], pair[1]));
    let (west, east) = (catalog.west_border(), catalog.east_border());

    let mut features = Vec::new();
    for index in 0..catalog.n_bins() {
        let bin = catalog.get_bin(index)
            .with_context(|| format!("[coast] failed to decode bin index {index}"))?;
        let rings = bin.assemble(dir, !args.no_assemble, west, east)
            .with_context(|| format!("[coast] failed to assemble bin {}", bin.bin()))?;
        if rings.is_empty() { continue }

        let rings = if args.no_assemble {
            rings
        } else {
            let antipodal = antipode.filter(|&a| a == bin.bin());
            prep_shore_polygons(rings, &boundary, resample, step, antipodal)
        };
        features.extend(rings.into_iter().map(|ring| (bin.bin(), ring)));
    }
    catalog.close()?;

    info!("[coast] writing {} features", features.len());
    super::emit(&features, args.output.as_deref())
}
