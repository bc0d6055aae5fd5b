use compose::{ComposeError, ComposeRunner};
use models::ValidationResult;
use std::path::Path;
use std::time::Duration;

const SYNTAX_CHECK_TIMEOUT: Duration = Duration::from_secs(30);
const SERVICE_LISTING_TIMEOUT: Duration = Duration::from_secs(10);
const UP_TIMEOUT: Duration = Duration::from_secs(60);
const STATUS_TIMEOUT: Duration = Duration::from_secs(10);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
const DOWN_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_BUILD_TIMEOUT: Duration = Duration::from_secs(300);

// Command output kept in user-facing error entries. Full output goes to the
// debug log.
const ERROR_OUTPUT_LIMIT: usize = 200;

/// Caller opt-ins for the expensive stages. Quick mode (the default) stops
/// right after syntax validation.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Build images with `build --no-cache` after syntax validation.
    pub build: bool,
    /// Start services after a successful build. Ignored unless `build` is
    /// also set: start never runs without a prior successful build in the
    /// same invocation.
    pub start: bool,
    pub build_timeout: Duration,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        ValidateOptions {
            build: false,
            start: false,
            build_timeout: DEFAULT_BUILD_TIMEOUT,
        }
    }
}

/// Validate one project directory and return the assembled result.
///
/// Stages run strictly forward, each gated on its prerequisite:
/// compose discovery, Dockerfile discovery, compose syntax, Dockerfile
/// syntax, then optionally build, start, and health. A failed cheap stage
/// short-circuits the expensive stages that depend on it. Expected failures
/// (missing tool, bad syntax, timeout, non-zero exit) all end up as entries
/// on the result; nothing raises past this call.
pub async fn validate_project(
    project_dir: &Path,
    options: &ValidateOptions,
    runner: &dyn ComposeRunner,
) -> ValidationResult {
    let mut result = ValidationResult::new();

    logging::info(&format!(
        "Validating Docker project: {}",
        project_dir.display()
    ));

    match validators::find_compose_file(project_dir) {
        Some(name) => {
            logging::info(&format!("Found compose file: {}", name));
            result.has_compose_file = true;
            result.compose_file = Some(name);
        }
        None => {
            result.add_error(format!(
                "No compose file found (looked for {})",
                validators::COMPOSE_FILE_NAMES.join(", ")
            ));
        }
    }

    result.dockerfile_paths = validators::find_dockerfiles(project_dir);
    if result.dockerfile_paths.is_empty() {
        result.add_warning("No Dockerfiles found".to_string());
    } else {
        logging::info(&format!(
            "Found {} Dockerfile(s)",
            result.dockerfile_paths.len()
        ));
        result.has_dockerfiles = true;
    }

    if let Some(compose_file) = result.compose_file.clone() {
        check_compose_syntax(runner, project_dir, &compose_file, &mut result).await;
        if result.compose_syntax_valid {
            result.services = list_services(runner, project_dir, &compose_file).await;
        }
    }

    if result.has_dockerfiles {
        validators::validate_dockerfiles(project_dir, &mut result);
    }

    if options.build && result.compose_syntax_valid {
        if let Some(compose_file) = result.compose_file.clone() {
            run_build(
                runner,
                project_dir,
                &compose_file,
                options.build_timeout,
                &mut result,
            )
            .await;

            if options.start && result.images_build {
                run_start(runner, project_dir, &compose_file, &mut result).await;
                if result.services_start {
                    check_health(runner, project_dir, &compose_file, &mut result).await;
                }
            }
        }
    }

    result.finalize();
    result
}

/// Best-effort teardown (`down -v --remove-orphans`). Callers should invoke
/// this after build/start runs regardless of outcome; failures are swallowed.
pub async fn cleanup(project_dir: &Path, compose_file: &str, runner: &dyn ComposeRunner) {
    logging::info("Tearing down compose services");
    match runner
        .run(
            project_dir,
            compose_file,
            &["down", "-v", "--remove-orphans"],
            DOWN_TIMEOUT,
        )
        .await
    {
        Ok(output) if output.success() => logging::debug("Teardown complete"),
        Ok(output) => logging::warning(&format!(
            "Teardown exited with code {}",
            output.exit_code
        )),
        Err(e) => logging::warning(&format!("Teardown failed: {}", e)),
    }
}

async fn check_compose_syntax(
    runner: &dyn ComposeRunner,
    project_dir: &Path,
    compose_file: &str,
    result: &mut ValidationResult,
) {
    logging::info("Checking compose file syntax");
    match runner
        .run(
            project_dir,
            compose_file,
            &["config", "--quiet"],
            SYNTAX_CHECK_TIMEOUT,
        )
        .await
    {
        Ok(output) if output.success() => result.compose_syntax_valid = true,
        Ok(output) => result.add_error(format!(
            "Compose file syntax invalid: {}",
            truncate_for_display(&output.combined(), ERROR_OUTPUT_LIMIT)
        )),
        Err(e) => result.add_error(stage_failure("Compose syntax check", &e)),
    }
}

/// Service names in declaration order, one per line of `config --services`.
/// This listing is informational: any failure yields an empty list.
async fn list_services(
    runner: &dyn ComposeRunner,
    project_dir: &Path,
    compose_file: &str,
) -> Vec<String> {
    match runner
        .run(
            project_dir,
            compose_file,
            &["config", "--services"],
            SERVICE_LISTING_TIMEOUT,
        )
        .await
    {
        Ok(output) if output.success() => output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect(),
        Ok(output) => {
            logging::debug(&format!(
                "Service listing exited with code {}",
                output.exit_code
            ));
            Vec::new()
        }
        Err(e) => {
            logging::debug(&format!("Service listing failed: {}", e));
            Vec::new()
        }
    }
}

async fn run_build(
    runner: &dyn ComposeRunner,
    project_dir: &Path,
    compose_file: &str,
    timeout: Duration,
    result: &mut ValidationResult,
) {
    logging::info("Building images (no cache)");
    match runner
        .run(project_dir, compose_file, &["build", "--no-cache"], timeout)
        .await
    {
        Ok(output) if output.success() => {
            logging::info("Images built successfully");
            result.images_build = true;
        }
        Ok(output) => result.add_error(format!(
            "Build failed: {}",
            truncate_for_display(&output.combined(), ERROR_OUTPUT_LIMIT)
        )),
        Err(e) => result.add_error(stage_failure("Build", &e)),
    }
}

async fn run_start(
    runner: &dyn ComposeRunner,
    project_dir: &Path,
    compose_file: &str,
    result: &mut ValidationResult,
) {
    logging::info("Starting services");
    match runner
        .run(project_dir, compose_file, &["up", "-d"], UP_TIMEOUT)
        .await
    {
        Ok(output) if output.success() => {
            result.services_start = true;
            // The up command's exit code is what gates this stage; the
            // status listing is recorded for diagnostics only.
            match runner
                .run(project_dir, compose_file, &["ps"], STATUS_TIMEOUT)
                .await
            {
                Ok(status) => logging::debug(&format!("Service status:\n{}", status.stdout)),
                Err(e) => logging::debug(&format!("Status listing failed: {}", e)),
            }
        }
        Ok(output) => result.add_error(format!(
            "Failed to start services: {}",
            truncate_for_display(&output.combined(), ERROR_OUTPUT_LIMIT)
        )),
        Err(e) => result.add_error(stage_failure("Start", &e)),
    }
}

/// Per-service health listing. An unhealthy service is a warning, not an
/// error: a partially unhealthy deployment still built and started.
async fn check_health(
    runner: &dyn ComposeRunner,
    project_dir: &Path,
    compose_file: &str,
    result: &mut ValidationResult,
) {
    logging::info("Checking service health");
    let mut all_healthy = true;

    for service in result.services.clone() {
        match runner
            .run(
                project_dir,
                compose_file,
                &["ps", "--format", "{{.Name}} {{.Status}}", &service],
                HEALTH_TIMEOUT,
            )
            .await
        {
            Ok(output) if output.success() => {
                if output.stdout.lines().any(|line| line.contains("unhealthy")) {
                    all_healthy = false;
                    result.add_warning(format!("Service '{}' is unhealthy", service));
                }
            }
            Ok(output) => {
                all_healthy = false;
                logging::debug(&format!(
                    "Health listing for '{}' exited with code {}",
                    service, output.exit_code
                ));
                result.add_warning(format!("Could not check health of service '{}'", service));
            }
            Err(e) => {
                all_healthy = false;
                result.add_warning(format!(
                    "Could not check health of service '{}': {}",
                    service, e
                ));
            }
        }
    }

    result.health_checks_pass = all_healthy;
}

fn stage_failure(stage: &str, err: &ComposeError) -> String {
    match err {
        // Uniform message no matter which stage hit the missing tool.
        ComposeError::NotInstalled => "Docker not installed".to_string(),
        other => format!("{} {}", stage, other),
    }
}

fn truncate_for_display(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(limit).collect();
        format!("{}...", truncated)
    }
}
