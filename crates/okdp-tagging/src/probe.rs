//! Version probes run against a started image.
//!
//! Each probe issues one command through an [`ExecEnvironment`] and extracts
//! a `<name>-<version>` tag value from its output. Date and commit probes
//! read host side facts instead.

use crate::error::TaggingError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::debug;

const SPARK_VERSION_LINE_PREFIX: &str = r"   /___/ .__/\_,_/_/ /_/\_\   version";
const SCALA_VERSION_LINE_PREFIX: &str = "Using Scala version";

static PIP_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^Version:\s*(\S+)").expect("valid regex"));
static OS_VERSION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^VERSION_ID="?([^"\s]+)"?"#).expect("valid regex"));

/// Somewhere commands can be run, typically a started container
pub trait ExecEnvironment {
    /// Runs a shell command and returns its combined stdout/stderr
    fn run_command(&self, command: &str) -> Result<String, TaggingError>;
}

/// Memoizes command output: several probes read the same `--version` output.
pub struct CachedEnvironment<'a> {
    inner: &'a dyn ExecEnvironment,
    cache: RefCell<HashMap<String, String>>,
}

impl<'a> CachedEnvironment<'a> {
    pub fn new(inner: &'a dyn ExecEnvironment) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }
}

impl ExecEnvironment for CachedEnvironment<'_> {
    fn run_command(&self, command: &str) -> Result<String, TaggingError> {
        if let Some(output) = self.cache.borrow().get(command) {
            return Ok(output.clone());
        }
        let output = self.inner.run_command(command)?;
        self.cache
            .borrow_mut()
            .insert(command.to_string(), output.clone());
        Ok(output)
    }
}

/// Facts taken from the build host rather than the image
#[derive(Debug, Clone)]
pub struct HostFacts {
    pub now: DateTime<Utc>,
    pub commit_sha: Option<String>,
}

impl HostFacts {
    /// Current time and the commit exported by the CI (`GITHUB_SHA`)
    pub fn current() -> Self {
        Self {
            now: Utc::now(),
            commit_sha: std::env::var("GITHUB_SHA").ok(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Probe {
    Python,
    PythonMajorMinor,
    Spark,
    Scala,
    ScalaMajorMinor,
    Java,
    JavaMajor,
    JupyterHub,
    JupyterLab,
    R,
    Julia,
    TensorFlow,
    PyTorch,
    Ubuntu,
    Date,
    CommitSha,
}

impl Probe {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::PythonMajorMinor => "python_major_minor",
            Self::Spark => "spark",
            Self::Scala => "scala",
            Self::ScalaMajorMinor => "scala_major_minor",
            Self::Java => "java",
            Self::JavaMajor => "java_major",
            Self::JupyterHub => "jupyter_hub",
            Self::JupyterLab => "jupyter_lab",
            Self::R => "r",
            Self::Julia => "julia",
            Self::TensorFlow => "tensorflow",
            Self::PyTorch => "pytorch",
            Self::Ubuntu => "ubuntu",
            Self::Date => "date",
            Self::CommitSha => "commit_sha",
        }
    }

    pub fn tag_value(&self, env: &dyn ExecEnvironment, host: &HostFacts) -> Result<String, TaggingError> {
        let value = match self {
            Self::Python => format!("python-{}", nth_token(self, &env.run_command("python --version")?, 1)?),
            Self::PythonMajorMinor => major_minor(&Self::Python.tag_value(env, host)?),
            Self::Spark => parse_spark_version(&env.run_command(&program_version("spark-submit"))?)?,
            Self::Scala => parse_scala_version(&env.run_command(&program_version("spark-submit"))?)?,
            Self::ScalaMajorMinor => major_minor(&Self::Scala.tag_value(env, host)?),
            Self::Java => parse_java_version(&env.run_command(&program_version("java"))?)?,
            Self::JavaMajor => java_major(&Self::Java.tag_value(env, host)?),
            Self::JupyterHub => format!("hub-{}", env.run_command("jupyterhub --version")?.trim()),
            Self::JupyterLab => format!("lab-{}", env.run_command("jupyter-lab --version")?.trim()),
            Self::R => format!("r-{}", nth_token(self, &env.run_command("R --version")?, 2)?),
            Self::Julia => format!("julia-{}", nth_token(self, &env.run_command("julia --version")?, 2)?),
            Self::TensorFlow => format!("tensorflow-{}", pip_version(self, env, "tensorflow")?),
            Self::PyTorch => format!("pytorch-{}", pip_version(self, env, "torch")?),
            Self::Ubuntu => {
                let output = env.run_command("cat /etc/os-release")?;
                let version = capture(self, &OS_VERSION_ID, &output)?;
                format!("ubuntu-{}", version)
            }
            Self::Date => host.now.format("%Y-%m-%d").to_string(),
            Self::CommitSha => {
                let sha = host.commit_sha.as_deref().ok_or_else(|| TaggingError::VersionNotFound {
                    probe: self.name().to_string(),
                    reason: "no commit sha available on the build host".to_string(),
                })?;
                sha.chars().take(12).collect()
            }
        };
        debug!(probe = self.name(), value = %value, "probed version");
        Ok(value)
    }
}

/// Java 11 images set `--add-opens` options in JDK_JAVA_OPTIONS which
/// pollute `--version` output.
pub fn program_version(program: &str) -> String {
    format!("/bin/sh -c 'unset JDK_JAVA_OPTIONS && {} --version 2>&1'", program)
}

pub fn parse_spark_version(output: &str) -> Result<String, TaggingError> {
    let line = find_line(output, SPARK_VERSION_LINE_PREFIX, Probe::Spark)?;
    let version = line.split(' ').last().unwrap_or_default();
    Ok(format!("spark-{}", version))
}

pub fn parse_scala_version(output: &str) -> Result<String, TaggingError> {
    let line = find_line(output, SCALA_VERSION_LINE_PREFIX, Probe::Scala)?;
    let version = line
        .split(' ')
        .nth(3)
        .and_then(|token| token.split(',').next())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| not_found(Probe::Scala, format!("malformed line '{}'", line)))?;
    Ok(format!("scala-{}", version))
}

pub fn parse_java_version(output: &str) -> Result<String, TaggingError> {
    Ok(format!("java-{}", nth_token(&Probe::Java, output, 1)?))
}

/// `scala-2.12.18` → `scala-2.12`
pub fn major_minor(full: &str) -> String {
    match full.rfind('.') {
        Some(idx) => full[..idx].to_string(),
        None => full.to_string(),
    }
}

/// `java-17.0.9` → `java-17`, `java-21` stays `java-21`
pub fn java_major(full: &str) -> String {
    match full.find('.') {
        Some(idx) => full[..idx].to_string(),
        None => full.to_string(),
    }
}

fn find_line<'a>(output: &'a str, prefix: &str, probe: Probe) -> Result<&'a str, TaggingError> {
    output
        .lines()
        .find(|line| line.starts_with(prefix))
        .ok_or_else(|| not_found(probe, format!("line starting with '{}' not found", prefix)))
}

fn nth_token(probe: &Probe, output: &str, n: usize) -> Result<String, TaggingError> {
    output
        .split_whitespace()
        .nth(n)
        .map(str::to_string)
        .ok_or_else(|| not_found(*probe, format!("unexpected output '{}'", output.trim())))
}

fn pip_version(probe: &Probe, env: &dyn ExecEnvironment, package: &str) -> Result<String, TaggingError> {
    let output = env.run_command(&format!("pip show {}", package))?;
    capture(probe, &PIP_VERSION, &output)
}

fn capture(probe: &Probe, pattern: &Regex, output: &str) -> Result<String, TaggingError> {
    pattern
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| not_found(*probe, format!("no match for {}", pattern.as_str())))
}

fn not_found(probe: Probe, reason: String) -> TaggingError {
    TaggingError::VersionNotFound {
        probe: probe.name().to_string(),
        reason,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::Cell;

    pub const SPARK_SUBMIT_OUTPUT: &str = "Welcome to
      ____              __
     / __/__  ___ _____/ /__
    _\\ \\/ _ \\/ _ `/ __/  '_/
   /___/ .__/\\_,_/_/ /_/\\_\\   version 3.5.0
      /_/

Using Scala version 2.12.18, OpenJDK 64-Bit Server VM, 17.0.9
Branch HEAD
";

    /// Answers commands by substring, counting calls
    pub struct FakeContainer {
        pub answers: Vec<(&'static str, &'static str)>,
        pub calls: Cell<usize>,
    }

    impl FakeContainer {
        pub fn new(answers: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                answers,
                calls: Cell::new(0),
            }
        }

        pub fn jupyter_spark() -> Self {
            Self::new(vec![
                ("spark-submit", SPARK_SUBMIT_OUTPUT),
                ("java", "openjdk 17.0.9 2023-10-17\nOpenJDK Runtime Environment"),
                ("python --version", "Python 3.11.6\n"),
                ("jupyterhub", "4.0.2\n"),
                ("jupyter-lab", "4.0.9\n"),
                ("R --version", "R version 4.3.2 (2023-10-31) -- \"Eye Holes\""),
                ("os-release", "NAME=\"Ubuntu\"\nVERSION_ID=\"22.04\"\n"),
                ("pip show torch", "Name: torch\nVersion: 2.1.1\n"),
            ])
        }
    }

    impl ExecEnvironment for FakeContainer {
        fn run_command(&self, command: &str) -> Result<String, TaggingError> {
            self.calls.set(self.calls.get() + 1);
            self.answers
                .iter()
                .find(|(needle, _)| command.contains(needle))
                .map(|(_, output)| output.to_string())
                .ok_or_else(|| TaggingError::Command {
                    command: command.to_string(),
                    message: "not found".to_string(),
                })
        }
    }

    pub fn host() -> HostFacts {
        HostFacts {
            now: Utc.with_ymd_and_hms(2024, 3, 7, 10, 0, 0).unwrap(),
            commit_sha: Some("0123456789abcdef0123".to_string()),
        }
    }

    #[test]
    fn test_spark_and_scala_from_spark_submit() {
        let env = FakeContainer::jupyter_spark();
        assert_eq!(Probe::Spark.tag_value(&env, &host()).unwrap(), "spark-3.5.0");
        assert_eq!(Probe::Scala.tag_value(&env, &host()).unwrap(), "scala-2.12.18");
        assert_eq!(Probe::ScalaMajorMinor.tag_value(&env, &host()).unwrap(), "scala-2.12");
    }

    #[test]
    fn test_java_probes() {
        let env = FakeContainer::jupyter_spark();
        assert_eq!(Probe::Java.tag_value(&env, &host()).unwrap(), "java-17.0.9");
        assert_eq!(Probe::JavaMajor.tag_value(&env, &host()).unwrap(), "java-17");
        assert_eq!(java_major("java-21"), "java-21");
    }

    #[test]
    fn test_container_probes() {
        let env = FakeContainer::jupyter_spark();
        let host = host();
        assert_eq!(Probe::Python.tag_value(&env, &host).unwrap(), "python-3.11.6");
        assert_eq!(Probe::PythonMajorMinor.tag_value(&env, &host).unwrap(), "python-3.11");
        assert_eq!(Probe::JupyterHub.tag_value(&env, &host).unwrap(), "hub-4.0.2");
        assert_eq!(Probe::JupyterLab.tag_value(&env, &host).unwrap(), "lab-4.0.9");
        assert_eq!(Probe::R.tag_value(&env, &host).unwrap(), "r-4.3.2");
        assert_eq!(Probe::Ubuntu.tag_value(&env, &host).unwrap(), "ubuntu-22.04");
        assert_eq!(Probe::PyTorch.tag_value(&env, &host).unwrap(), "pytorch-2.1.1");
    }

    #[test]
    fn test_host_probes() {
        let env = FakeContainer::new(vec![]);
        assert_eq!(Probe::Date.tag_value(&env, &host()).unwrap(), "2024-03-07");
        assert_eq!(Probe::CommitSha.tag_value(&env, &host()).unwrap(), "0123456789ab");

        let no_sha = HostFacts {
            commit_sha: None,
            ..host()
        };
        assert!(matches!(
            Probe::CommitSha.tag_value(&env, &no_sha),
            Err(TaggingError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_spark_line_is_reported() {
        let err = parse_spark_version("Welcome\nnothing here").unwrap_err();
        assert!(err.to_string().contains("spark version not found"));
    }

    #[test]
    fn test_spark_line_must_start_with_prefix() {
        let output = format!("WARN {}", SPARK_VERSION_LINE_PREFIX);
        assert!(parse_spark_version(&output).is_err());
    }

    #[test]
    fn test_echoed_banner_is_skipped() {
        let output = format!(
            "WARN banner: {} 0.0.0\n{}",
            SPARK_VERSION_LINE_PREFIX, SPARK_SUBMIT_OUTPUT
        );
        assert_eq!(parse_spark_version(&output).unwrap(), "spark-3.5.0");
    }

    #[test]
    fn test_java_options_are_unset() {
        assert_eq!(
            program_version("java"),
            "/bin/sh -c 'unset JDK_JAVA_OPTIONS && java --version 2>&1'"
        );
    }

    #[test]
    fn test_cached_environment_runs_once() {
        let env = FakeContainer::jupyter_spark();
        let cached = CachedEnvironment::new(&env);
        Probe::Spark.tag_value(&cached, &host()).unwrap();
        Probe::Scala.tag_value(&cached, &host()).unwrap();
        assert_eq!(env.calls.get(), 1);
    }
}
