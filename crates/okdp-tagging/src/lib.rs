//! OKDP Tagging: image hierarchy and version based tags
//!
//! Probes a built image for the versions of its stack and composes the
//! long form tags published next to the build tag.
pub mod docker;
pub mod error;
pub mod images;
pub mod probe;
pub mod tagger;
pub mod tagging;

pub use docker::{DockerCli, DockerContainer};
pub use error::TaggingError;
pub use images::{get_taggers_and_manifests, ImageDescription, ManifestSpec, ALL_IMAGES};
pub use probe::{CachedEnvironment, ExecEnvironment, HostFacts, Probe};
pub use tagger::TagSpec;
pub use tagging::{CommandRunner, Platform, Registry, Tagging};
