//! Docker backed capabilities.

use crate::error::TaggingError;
use crate::probe::ExecEnvironment;
use crate::tagging::CommandRunner;
use std::process::{Command, Output};
use tracing::{debug, info, warn};

fn describe(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

fn run_captured(program: &str, args: &[&str]) -> Result<Output, TaggingError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| TaggingError::Command {
            command: describe(program, args),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(TaggingError::Command {
            command: describe(program, args),
            message: format!(
                "{}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(output)
}

/// A throwaway container kept alive for probing, removed on drop
pub struct DockerContainer {
    id: String,
}

impl DockerContainer {
    pub fn start(image: &str) -> Result<Self, TaggingError> {
        info!(image, "Starting container");
        let output = run_captured("docker", &["run", "--detach", "--rm", image, "sleep", "infinity"])?;
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(TaggingError::Command {
                command: format!("docker run {}", image),
                message: "no container id returned".to_string(),
            });
        }
        debug!(container = %id, "Container started");
        Ok(Self { id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl ExecEnvironment for DockerContainer {
    fn run_command(&self, command: &str) -> Result<String, TaggingError> {
        debug!(container = %self.id, command, "Running command");
        let output = run_captured("docker", &["exec", &self.id, "/bin/sh", "-c", command])?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}

impl Drop for DockerContainer {
    fn drop(&mut self) {
        if let Err(e) = run_captured("docker", &["rm", "--force", &self.id]) {
            warn!(container = %self.id, error = %e, "Failed to remove container");
        }
    }
}

/// Runs commands on the host, inheriting stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct DockerCli;

impl CommandRunner for DockerCli {
    fn run(&self, program: &str, args: &[&str]) -> Result<(), TaggingError> {
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| TaggingError::Command {
                command: describe(program, args),
                message: e.to_string(),
            })?;
        if !status.success() {
            return Err(TaggingError::Command {
                command: describe(program, args),
                message: status.to_string(),
            });
        }
        Ok(())
    }
}
