//! Applies the version based tags to a freshly built image.
use clap::Parser;
use okdp_cli::{init_tracing, run_apply_tags, ApplyTagsArgs};
use okdp_tagging::DockerCli;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = ApplyTagsArgs::parse();
    let tags = run_apply_tags(&args, &DockerCli)?;
    tracing::info!(count = tags.len(), image = %args.image_name, "Image tagged");
    Ok(())
}
