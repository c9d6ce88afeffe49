//! Image hierarchy
//!
//! Each image inherits the taggers and manifests of its parent. Only long
//! form taggers are registered so that images built from several python
//! versions on the same day never collide on a tag.
use crate::error::TaggingError;
use crate::probe::Probe::{self, *};
use crate::tagger::TagSpec;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestSpec {
    CondaEnvironment,
    AptPackages,
    RPackages,
    JuliaPackages,
    SparkInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescription {
    pub parent: Option<&'static str>,
    pub taggers: Vec<TagSpec>,
    pub manifests: Vec<ManifestSpec>,
}

impl ImageDescription {
    fn child_of(parent: Option<&'static str>) -> Self {
        Self {
            parent,
            taggers: Vec::new(),
            manifests: Vec::new(),
        }
    }

    fn tagged(mut self, taggers: impl IntoIterator<Item = TagSpec>) -> Self {
        self.taggers.extend(taggers);
        self
    }

    fn manifests(mut self, manifests: impl IntoIterator<Item = ManifestSpec>) -> Self {
        self.manifests.extend(manifests);
        self
    }
}

/// `python-<x>`, `python-<x>-date`, `python-<x>-hub-lab`, `python-<x>-hub-lab-date`
fn notebook_taggers(stack: &[Probe]) -> Vec<TagSpec> {
    let with = |suffix: &[Probe]| {
        TagSpec::long(
            std::iter::once(Python)
                .chain(stack.iter().copied())
                .chain(suffix.iter().copied()),
        )
    };
    vec![
        with(&[]),
        with(&[Date]),
        with(&[JupyterHub, JupyterLab]),
        with(&[JupyterHub, JupyterLab, Date]),
    ]
}

pub static ALL_IMAGES: Lazy<IndexMap<&'static str, ImageDescription>> = Lazy::new(|| {
    let mut images = IndexMap::new();

    images.insert(
        "docker-stacks-foundation",
        ImageDescription::child_of(None)
            .tagged([
                TagSpec::long([Ubuntu, Python]),
                TagSpec::long([Python, CommitSha]),
                TagSpec::long([Python, CommitSha]),
                TagSpec::long([Python, Date]),
                TagSpec::long([PythonMajorMinor, Date]),
            ])
            .manifests([ManifestSpec::CondaEnvironment, ManifestSpec::AptPackages]),
    );
    images.insert(
        "base-notebook",
        ImageDescription::child_of(Some("docker-stacks-foundation")).tagged([
            TagSpec::long([Python, JupyterHub, JupyterLab]),
            TagSpec::long([Python, JupyterHub, JupyterLab, Date]),
        ]),
    );
    images.insert("minimal-notebook", ImageDescription::child_of(Some("base-notebook")));
    images.insert("scipy-notebook", ImageDescription::child_of(Some("minimal-notebook")));
    images.insert(
        "r-notebook",
        ImageDescription::child_of(Some("minimal-notebook"))
            .tagged(notebook_taggers(&[R]))
            .manifests([ManifestSpec::RPackages]),
    );
    images.insert(
        "julia-notebook",
        ImageDescription::child_of(Some("minimal-notebook"))
            .tagged(notebook_taggers(&[Julia]))
            .manifests([ManifestSpec::JuliaPackages]),
    );
    images.insert(
        "tensorflow-notebook",
        ImageDescription::child_of(Some("scipy-notebook")).tagged(notebook_taggers(&[TensorFlow])),
    );
    images.insert(
        "pytorch-notebook",
        ImageDescription::child_of(Some("scipy-notebook")).tagged(notebook_taggers(&[PyTorch])),
    );
    images.insert(
        "datascience-notebook",
        ImageDescription::child_of(Some("scipy-notebook"))
            .tagged(notebook_taggers(&[R, Julia]))
            .manifests([ManifestSpec::RPackages, ManifestSpec::JuliaPackages]),
    );
    // Tagged on its own: parent tags would not identify the spark stack.
    images.insert(
        "pyspark-notebook",
        ImageDescription::child_of(None)
            .tagged([
                TagSpec::long([Spark, PythonMajorMinor, JavaMajor, ScalaMajorMinor]),
                TagSpec::long([Spark, PythonMajorMinor, JavaMajor, ScalaMajorMinor, CommitSha]),
                TagSpec::long([Spark, PythonMajorMinor, JavaMajor, ScalaMajorMinor, Date]),
                TagSpec::long([Spark, Python, Java, Scala, JupyterHub, JupyterLab]),
                TagSpec::long([Spark, Python, Java, Scala, JupyterHub, JupyterLab, Date]),
            ])
            .manifests([ManifestSpec::SparkInfo]),
    );
    images.insert(
        "all-spark-notebook",
        ImageDescription::child_of(Some("pyspark-notebook"))
            .tagged([
                TagSpec::long([Spark, Python, R, Java, Scala, JupyterHub, JupyterLab]),
                TagSpec::long([Spark, Python, R, Java, Scala, JupyterHub, JupyterLab, Date]),
            ])
            .manifests([ManifestSpec::RPackages]),
    );

    images
});

/// Taggers and manifests of an image, ancestors first
pub fn get_taggers_and_manifests(
    short_image_name: Option<&str>,
) -> Result<(Vec<TagSpec>, Vec<ManifestSpec>), TaggingError> {
    let Some(name) = short_image_name else {
        return Ok((Vec::new(), Vec::new()));
    };

    let description = ALL_IMAGES
        .get(name)
        .ok_or_else(|| TaggingError::UnknownImage(name.to_string()))?;
    let (mut taggers, mut manifests) = get_taggers_and_manifests(description.parent)?;
    taggers.extend(description.taggers.iter().cloned());
    manifests.extend(description.manifests.iter().copied());
    Ok((taggers, manifests))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_images_registered() {
        assert_eq!(ALL_IMAGES.len(), 11);
        for (name, description) in ALL_IMAGES.iter() {
            if let Some(parent) = description.parent {
                assert!(ALL_IMAGES.contains_key(parent), "{} has unknown parent {}", name, parent);
            }
        }
    }

    #[test]
    fn test_none_has_nothing() {
        let (taggers, manifests) = get_taggers_and_manifests(None).unwrap();
        assert!(taggers.is_empty());
        assert!(manifests.is_empty());
    }

    #[test]
    fn test_parent_taggers_come_first() {
        let (taggers, manifests) = get_taggers_and_manifests(Some("scipy-notebook")).unwrap();
        assert_eq!(taggers.len(), 7);
        assert_eq!(taggers[0], TagSpec::long([Ubuntu, Python]));
        assert_eq!(taggers[6], TagSpec::long([Python, JupyterHub, JupyterLab, Date]));
        assert_eq!(
            manifests,
            vec![ManifestSpec::CondaEnvironment, ManifestSpec::AptPackages]
        );
    }

    #[test]
    fn test_datascience_inherits_from_scipy() {
        let (taggers, manifests) = get_taggers_and_manifests(Some("datascience-notebook")).unwrap();
        assert_eq!(taggers.len(), 11);
        assert_eq!(taggers[7].describe(), "python-r-julia");
        assert_eq!(taggers[10].describe(), "python-r-julia-jupyter_hub-jupyter_lab-date");
        assert_eq!(manifests.len(), 4);
    }

    #[test]
    fn test_all_spark_inherits_pyspark_only() {
        let (taggers, manifests) = get_taggers_and_manifests(Some("all-spark-notebook")).unwrap();
        assert_eq!(taggers.len(), 7);
        assert_eq!(
            taggers[0].describe(),
            "spark-python_major_minor-java_major-scala_major_minor"
        );
        assert_eq!(manifests, vec![ManifestSpec::SparkInfo, ManifestSpec::RPackages]);
    }

    #[test]
    fn test_unknown_image() {
        let err = get_taggers_and_manifests(Some("tiny-notebook")).unwrap_err();
        assert!(matches!(err, TaggingError::UnknownImage(name) if name == "tiny-notebook"));
    }
}
