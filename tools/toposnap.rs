use std::path::PathBuf;

use clap::Parser;
use eyre::WrapErr;
use toposnap::io::{get_input_reader, get_output_writer, read_wkt_geometries, write_wkt_geometries};
use toposnap::snap::{EuclideanKernel, InMemoryEdgeStore, ReferenceEdge, SnapConfig, snap};
use tracing::warn;

/// Snap a geometry's vertices onto a reference topology
#[derive(Debug, Parser)]
#[clap(name = "toposnap", verbatim_doc_comment)]
struct CmdlineOptions {
    /// The log level
    #[clap(short, long, default_value_t = tracing::Level::INFO)]
    log_level: tracing::Level,

    /// File of reference topology edges, one WKT LINESTRING per line
    #[clap(short = 'T', long)]
    topology: PathBuf,

    /// Input file of WKT geometries to snap, one per line. Defaults to stdin.
    #[clap(short, long)]
    input: Option<PathBuf>,

    /// Output file to write the snapped WKT geometries to. Defaults to stdout.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Maximum distance at which a reference vertex may be inserted
    #[clap(short = 's', long, default_value_t = 0.0)]
    tolerance_snap: f64,

    /// Maximum distance at which a redundant interior vertex may be removed. Negative disables
    /// removal.
    #[clap(short = 'r', long, default_value_t = -1.0)]
    tolerance_removal: f64,

    /// Run the addition/removal passes to a fixed point instead of a single pass
    #[clap(long)]
    iterate: bool,
}

fn load_reference_edges(path: PathBuf) -> eyre::Result<InMemoryEdgeStore> {
    let reader = get_input_reader(&Some(path)).map_err(|e| eyre::eyre!(e))?;
    let mut edges = Vec::new();
    for (id, geometry) in read_wkt_geometries(reader).enumerate() {
        match geometry {
            geo::Geometry::LineString(ls) => {
                edges.push(ReferenceEdge::new(id as u64, ls.0));
            }
            other => {
                warn!("Ignoring non-LINESTRING reference topology entry: {other:?}");
            }
        }
    }
    Ok(InMemoryEdgeStore::new(edges))
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let args = CmdlineOptions::parse();

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(args.log_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .init();

    let store = load_reference_edges(args.topology).wrap_err("failed to load reference topology")?;

    let reader = get_input_reader(&args.input).map_err(|e| eyre::eyre!(e))?;
    let mut writer = get_output_writer(&args.output).map_err(|e| eyre::eyre!(e))?;

    let kernel = EuclideanKernel;
    let config = SnapConfig {
        tolerance_snap: args.tolerance_snap,
        tolerance_removal: args.tolerance_removal,
        iterate: args.iterate,
    };

    let mut snapped = Vec::new();
    for geometry in read_wkt_geometries(reader) {
        let result = snap(&kernel, &store, &geometry, config).wrap_err("snap failed")?;
        snapped.push(result);
    }

    write_wkt_geometries(&mut writer, snapped);
    Ok(())
}
