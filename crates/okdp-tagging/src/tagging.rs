//! Tag composition and application for a built image.

use crate::error::TaggingError;
use crate::images::get_taggers_and_manifests;
use crate::probe::{CachedEnvironment, ExecEnvironment, HostFacts};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Registry {
    #[serde(rename = "quay.io")]
    Quay,
    #[serde(rename = "ghcr.io")]
    Ghcr,
}

impl Registry {
    pub const VALUES: [&'static str; 2] = ["quay.io", "ghcr.io"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quay => "quay.io",
            Self::Ghcr => "ghcr.io",
        }
    }
}

impl FromStr for Registry {
    type Err = TaggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quay.io" => Ok(Self::Quay),
            "ghcr.io" => Ok(Self::Ghcr),
            other => Err(TaggingError::Unsupported {
                kind: "registry",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Amd64,
    Arm64,
}

impl Platform {
    pub const VALUES: [&'static str; 2] = ["amd64", "arm64"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

impl FromStr for Platform {
    type Err = TaggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amd64" => Ok(Self::Amd64),
            "arm64" => Ok(Self::Arm64),
            other => Err(TaggingError::Unsupported {
                kind: "platform",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs host side commands such as `docker tag`
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), TaggingError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagging {
    pub image_name: String,
    pub tag: String,
    pub registry: Registry,
    pub owner: String,
    pub platform: Platform,
}

impl Tagging {
    /// `image_name` is `<name>:<tag>`, e.g. `pyspark-notebook:2025-09-22`
    pub fn new(
        image_name: &str,
        registry: Registry,
        owner: impl Into<String>,
        platform: Platform,
    ) -> Result<Self, TaggingError> {
        let (name, tag) = image_name
            .split_once(':')
            .filter(|(name, tag)| !name.is_empty() && !tag.is_empty() && !tag.contains(':'))
            .ok_or_else(|| TaggingError::InvalidImageName(image_name.to_string()))?;

        Ok(Self {
            image_name: name.to_string(),
            tag: tag.to_string(),
            registry,
            owner: owner.into(),
            platform,
        })
    }

    fn qualified(&self, tag: &str) -> String {
        format!(
            "{}/{}/{}:{}-{}",
            self.registry, self.owner, self.image_name, tag, self.platform
        )
    }

    /// The image as pushed by the build job
    pub fn source_image(&self) -> String {
        self.qualified(&self.tag)
    }

    /// Source image followed by one tag per registered tagger
    pub fn generate_tags(&self, env: &dyn ExecEnvironment, host: &HostFacts) -> Result<Vec<String>, TaggingError> {
        info!(image = %self.image_name, "Generating tags");
        let (taggers, _) = get_taggers_and_manifests(Some(&self.image_name))?;
        let env = CachedEnvironment::new(env);

        let mut tags = vec![self.source_image()];
        for tagger in &taggers {
            let tag_value = tagger.tag_value(&env, host)?;
            info!(tagger = %tagger.describe(), tag_value = %tag_value, "Calculated tag");
            tags.push(self.qualified(&tag_value));
        }
        Ok(tags)
    }

    pub fn apply_tags(
        &self,
        env: &dyn ExecEnvironment,
        host: &HostFacts,
        runner: &dyn CommandRunner,
    ) -> Result<Vec<String>, TaggingError> {
        let source = self.source_image();
        let tags = self.generate_tags(env, host)?;
        for tag in &tags {
            info!(tag = %tag, "Applying tag");
            runner.run("docker", &["tag", &source, tag])?;
        }
        Ok(tags)
    }
}
