//! Prints the spark and python build matrices for the CI.
use clap::Parser;
use okdp_cli::{init_tracing, run_version_matrix, VersionMatrixArgs};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = VersionMatrixArgs::parse();
    run_version_matrix(&args, &mut std::io::stdout().lock())
}
