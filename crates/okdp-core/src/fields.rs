//! Field names shared with the CI consumers of the matrix.
//!
//! These keys are part of the wire contract: renaming one breaks every
//! workflow that reads the generated matrix.

pub const PYTHON_VERSION: &str = "python_version";
pub const SPARK_VERSION: &str = "spark_version";
pub const JAVA_VERSION: &str = "java_version";
pub const SCALA_VERSION: &str = "scala_version";
pub const HADOOP_VERSION: &str = "hadoop_version";
pub const SPARK_DOWNLOAD_URL: &str = "spark_download_url";

pub const SPARK_DEV_TAG: &str = "spark_dev_tag";
pub const PYTHON_DEV_TAG: &str = "python_dev_tag";

/// Fields a group must carry to produce a buildable row.
///
/// `python_version` is not part of this list: a filter that empties it
/// still yields no rows, through the expansion rather than the validator.
pub const MANDATORY_FIELDS: [&str; 5] = [
    SPARK_VERSION,
    JAVA_VERSION,
    SCALA_VERSION,
    HADOOP_VERSION,
    SPARK_DOWNLOAD_URL,
];

/// Fields making up the grouping key, in key order.
pub const GROUP_KEY_FIELDS: [&str; 3] = [PYTHON_VERSION, JAVA_VERSION, HADOOP_VERSION];
