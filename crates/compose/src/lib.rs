use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Captured output of one finished compose invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stderr followed by stdout, for error reporting. Compose tools write
    /// diagnostics to either stream depending on version.
    pub fn combined(&self) -> String {
        let mut combined = String::new();
        if !self.stderr.trim().is_empty() {
            combined.push_str(self.stderr.trim());
        }
        if !self.stdout.trim().is_empty() {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(self.stdout.trim());
        }
        combined
    }
}

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Docker not installed")]
    NotInstalled,

    #[error("timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Seam over the compose CLI so the validation pipeline can be exercised
/// without a Docker daemon. The real implementation is [`DockerCompose`].
#[async_trait]
pub trait ComposeRunner: Send + Sync {
    /// Run one compose subcommand against `compose_file` inside
    /// `project_dir`, fully awaited, with a hard per-call timeout.
    async fn run(
        &self,
        project_dir: &Path,
        compose_file: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, ComposeError>;
}

/// Which compose front-end is installed on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeFlavor {
    /// `docker compose` (the compose v2 plugin).
    Plugin,
    /// The legacy standalone `docker-compose` binary.
    Standalone,
}

pub struct DockerCompose {
    flavor: ComposeFlavor,
}

impl DockerCompose {
    /// Pick the installed compose flavor. Falls back to the plugin form when
    /// neither binary is on PATH; the spawn will then surface
    /// [`ComposeError::NotInstalled`] at whichever stage first invokes it.
    pub fn detect() -> Self {
        let flavor = if which::which("docker").is_ok() {
            ComposeFlavor::Plugin
        } else if which::which("docker-compose").is_ok() {
            logging::debug("docker not found on PATH, using legacy docker-compose");
            ComposeFlavor::Standalone
        } else {
            ComposeFlavor::Plugin
        };
        DockerCompose { flavor }
    }

    pub fn with_flavor(flavor: ComposeFlavor) -> Self {
        DockerCompose { flavor }
    }

    /// Full argv for one invocation, program first.
    fn command_line(&self, compose_file: &str, args: &[&str]) -> Vec<String> {
        let mut argv: Vec<String> = match self.flavor {
            ComposeFlavor::Plugin => vec!["docker".to_string(), "compose".to_string()],
            ComposeFlavor::Standalone => vec!["docker-compose".to_string()],
        };
        argv.push("-f".to_string());
        argv.push(compose_file.to_string());
        argv.extend(args.iter().map(|arg| arg.to_string()));
        argv
    }
}

#[async_trait]
impl ComposeRunner for DockerCompose {
    async fn run(
        &self,
        project_dir: &Path,
        compose_file: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, ComposeError> {
        let argv = self.command_line(compose_file, args);
        logging::debug(&format!(
            "Running: {} (cwd: {})",
            argv.join(" "),
            project_dir.display()
        ));

        let mut command = Command::new(&argv[0]);
        command
            .args(&argv[1..])
            .current_dir(project_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ComposeError::NotInstalled);
            }
            Ok(Err(e)) => return Err(ComposeError::Io(e)),
            Err(_) => return Err(ComposeError::Timeout(timeout.as_secs())),
        };

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        };

        logging::debug(&format!(
            "{} exited with code {}",
            argv.join(" "),
            result.exit_code
        ));
        if !result.stdout.trim().is_empty() {
            logging::debug(&format!("stdout:\n{}", result.stdout.trim_end()));
        }
        if !result.stderr.trim().is_empty() {
            logging::debug(&format!("stderr:\n{}", result.stderr.trim_end()));
        }

        Ok(result)
    }
}

/// Whether a Docker daemon is reachable. Advisory only: the pipeline reports
/// per-stage failures either way, this just lets the CLI warn before the
/// expensive stages start.
pub async fn daemon_available() -> bool {
    match bollard::Docker::connect_with_local_defaults() {
        Ok(docker) => match docker.ping().await {
            Ok(_) => true,
            Err(e) => {
                logging::debug(&format!("Docker ping failed: {}", e));
                false
            }
        },
        Err(e) => {
            logging::debug(&format!("Docker connection failed: {}", e));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_command_line_uses_docker_compose_subcommand() {
        let runner = DockerCompose::with_flavor(ComposeFlavor::Plugin);
        let argv = runner.command_line("docker-compose.yml", &["config", "--quiet"]);
        assert_eq!(
            argv,
            vec!["docker", "compose", "-f", "docker-compose.yml", "config", "--quiet"]
        );
    }

    #[test]
    fn standalone_command_line_uses_legacy_binary() {
        let runner = DockerCompose::with_flavor(ComposeFlavor::Standalone);
        let argv = runner.command_line("compose.yaml", &["down", "-v", "--remove-orphans"]);
        assert_eq!(
            argv,
            vec!["docker-compose", "-f", "compose.yaml", "down", "-v", "--remove-orphans"]
        );
    }

    #[test]
    fn combined_output_prefers_stderr_first() {
        let output = CommandOutput {
            stdout: "rendered config\n".to_string(),
            stderr: "warning: something\n".to_string(),
            exit_code: 0,
        };
        assert!(output.success());
        assert_eq!(output.combined(), "warning: something\nrendered config");
    }

    #[test]
    fn combined_output_of_empty_streams_is_empty() {
        let output = CommandOutput {
            stdout: " \n".to_string(),
            stderr: String::new(),
            exit_code: 1,
        };
        assert!(!output.success());
        assert!(output.combined().is_empty());
    }
}
