use crate::error::TaggingError;
use crate::probe::{ExecEnvironment, HostFacts, Probe};
use serde::{Deserialize, Serialize};

/// A tag recipe: a single probe or several joined with `-`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagSpec {
    Probe(Probe),
    Long(Vec<TagSpec>),
}

impl TagSpec {
    pub fn long(parts: impl IntoIterator<Item = Probe>) -> Self {
        Self::Long(parts.into_iter().map(TagSpec::Probe).collect())
    }

    pub fn tag_value(&self, env: &dyn ExecEnvironment, host: &HostFacts) -> Result<String, TaggingError> {
        match self {
            Self::Probe(probe) => probe.tag_value(env, host),
            Self::Long(parts) => {
                let values = parts
                    .iter()
                    .map(|part| part.tag_value(env, host))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(values.join("-"))
            }
        }
    }

    /// Readable form, e.g. `spark-python-java`
    pub fn describe(&self) -> String {
        match self {
            Self::Probe(probe) => probe.name().to_string(),
            Self::Long(parts) => parts
                .iter()
                .map(TagSpec::describe)
                .collect::<Vec<_>>()
                .join("-"),
        }
    }
}

impl From<Probe> for TagSpec {
    fn from(probe: Probe) -> Self {
        Self::Probe(probe)
    }
}
