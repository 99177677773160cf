use anyhow::{Context, Result};
use shorebin::{LineCatalog, LineKind};
use tracing::info;

use crate::cli::{Cli, LineKindArg, LinesArgs};

pub fn run(cli: &Cli, args: &LinesArgs) -> Result<()> {
    let config = super::config(cli);
    let kind = match args.kind {
        LineKindArg::River => LineKind::River,
        LineKindArg::Border => LineKind::Border,
    };

    let mut catalog = LineCatalog::open(&config, kind, args.resolution, &args.region)
        .with_context(|| format!("[lines] cannot open the {kind:?} database at resolution {}", args.resolution))?;
    info!("[lines] {} bins selected", catalog.n_bins());

    // bins straddling the seam of a world map move to its western side
    let centre = catalog.region().west + 180.0;
    let world = catalog.is_world();

    let mut features = Vec::new();
    for index in 0..catalog.n_bins() {
        let bin = catalog.get_bin(index, &args.levels)?;
        if bin.is_empty() { continue }
        let shift = world && bin.straddles(centre);
        features.extend(bin.assemble(shift, centre).into_iter().map(|line| (bin.bin(), line)));
    }
    catalog.close()?;

    info!("[lines] writing {} features", features.len());
    super::emit(&features, args.output.as_deref())
}
