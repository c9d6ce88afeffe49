//! OKDP CLI: entry points invoked by the images CI
//!
//! `version-matrix` prints the `spark=` and `python=` job matrices on stdout.
//! `apply-tags` probes a built image and applies its long form tags.
//! Logs always go to stderr.
use clap::Parser;
use okdp_matrix::VersionCompatibilityMatrix;
use okdp_tagging::{
    CommandRunner, DockerContainer, HostFacts, Platform, Registry, Tagging,
};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber, `RUST_LOG` overrides the `info` default
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(name = "version-matrix")]
#[command(about = "Generate the spark and python build matrices from the versions file")]
pub struct VersionMatrixArgs {
    /// Versions matrix file
    #[arg(long, env = "OKDP_VERSIONS_MATRIX_PATH")]
    pub versions_matrix_path: PathBuf,

    /// Current git branch, used in the dev tags
    #[arg(long, env = "OKDP_GIT_BRANCH")]
    pub git_branch: String,
}

pub fn run_version_matrix(args: &VersionMatrixArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let matrix = VersionCompatibilityMatrix::from_path(&args.versions_matrix_path, &args.git_branch)?;
    let generated = matrix.generate()?;
    generated.ensure_not_empty(matrix.source())?;

    for line in generated.render_outputs()? {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "apply-tags")]
#[command(about = "Tag <registry>/<owner>/<image>:<tag>-<platform> with the versions of its stack")]
pub struct ApplyTagsArgs {
    /// Image name:tag
    #[arg(long)]
    pub image_name: String,

    /// Image registry
    #[arg(long, value_parser = Registry::VALUES)]
    pub registry: String,

    /// Owner of the image
    #[arg(long)]
    pub owner: String,

    /// Platform
    #[arg(long, value_parser = Platform::VALUES)]
    pub platform: String,
}

impl ApplyTagsArgs {
    pub fn tagging(&self) -> anyhow::Result<Tagging> {
        Ok(Tagging::new(
            &self.image_name,
            self.registry.parse()?,
            self.owner.as_str(),
            self.platform.parse()?,
        )?)
    }
}

/// Probes the source image in a throwaway container, then tags it on the host
pub fn run_apply_tags(args: &ApplyTagsArgs, runner: &dyn CommandRunner) -> anyhow::Result<Vec<String>> {
    let tagging = args.tagging()?;
    let container = DockerContainer::start(&tagging.source_image())?;
    Ok(tagging.apply_tags(&container, &HostFacts::current(), runner)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        VersionMatrixArgs::command().debug_assert();
        ApplyTagsArgs::command().debug_assert();
    }

    #[test]
    fn test_apply_tags_args() {
        let args = ApplyTagsArgs::try_parse_from([
            "apply-tags",
            "--image-name",
            "pyspark-notebook:2025-09-22",
            "--registry",
            "quay.io",
            "--owner",
            "okdp",
            "--platform",
            "arm64",
        ])
        .unwrap();
        assert_eq!(
            args.tagging().unwrap().source_image(),
            "quay.io/okdp/pyspark-notebook:2025-09-22-arm64"
        );
    }

    #[test]
    fn test_unsupported_registry_is_rejected() {
        let result = ApplyTagsArgs::try_parse_from([
            "apply-tags",
            "--image-name",
            "pyspark-notebook:latest",
            "--registry",
            "docker.io",
            "--owner",
            "okdp",
            "--platform",
            "amd64",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_version_matrix_args() {
        let args = VersionMatrixArgs::try_parse_from([
            "version-matrix",
            "--versions-matrix-path",
            "custom.yml",
            "--git-branch",
            "feature/x",
        ])
        .unwrap();
        assert_eq!(args.versions_matrix_path, PathBuf::from("custom.yml"));
        assert_eq!(args.git_branch, "feature/x");
    }

    #[test]
    fn test_versions_matrix_path_is_required() {
        let result = VersionMatrixArgs::try_parse_from(["version-matrix", "--git-branch", "main"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }
}
