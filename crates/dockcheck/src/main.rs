use clap::{Parser, Subcommand};
use colored::Colorize;
use compose::DockerCompose;
use models::ValidationResult;
use pipeline::{validate_project, ValidateOptions};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "dockcheck",
    about = "Docker Compose project validator",
    version,
    long_about = "Validates a Docker Compose project directory and reports a 0-100 score.\n\nExamples:\n  dockcheck validate                       # Quick check of the current directory\n  dockcheck validate ./myapp               # Quick check of another project\n  dockcheck validate --build               # Also build images (no cache)\n  dockcheck validate --build --start       # Build, start, and health-check services\n  dockcheck validate --json                # Machine-readable result for CI\n  dockcheck --debug validate --build       # Show full command output"
)]
struct Dockcheck {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in verbose mode with detailed output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run in debug mode, including full compose command output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a Docker Compose project directory
    Validate {
        /// Path to the project directory (defaults to the current directory)
        path: Option<PathBuf>,

        /// Build images with --no-cache after syntax validation
        #[arg(long)]
        build: bool,

        /// Start services after a successful build (skipped unless --build)
        #[arg(long)]
        start: bool,

        /// Build timeout in seconds
        #[arg(long, default_value_t = 300)]
        build_timeout: u64,

        /// Emit the result as JSON instead of the human-readable report
        #[arg(long)]
        json: bool,

        /// Leave containers and volumes in place after validation
        #[arg(long)]
        keep: bool,
    },
}

/// Ctrl+C during build/start must not leak containers: tear down what the
/// project may have started, with a hard-exit watchdog in case Docker hangs.
async fn handle_signals(project_dir: PathBuf) {
    let hard_exit_time = Duration::from_secs(10);

    match tokio::signal::ctrl_c().await {
        Ok(_) => {
            println!("Received Ctrl+C, tearing down and exiting...");
        }
        Err(e) => {
            eprintln!("Warning: Failed to listen for ctrl+c event: {}", e);
            println!("Tearing down and exiting...");
        }
    }

    let _ = std::thread::spawn(move || {
        std::thread::sleep(hard_exit_time);
        eprintln!(
            "Teardown taking too long (over {} seconds), forcing exit...",
            hard_exit_time.as_secs()
        );
        logging::error("Forced exit due to teardown timeout");
        std::process::exit(1);
    });

    if let Some(compose_file) = validators::find_compose_file(&project_dir) {
        let runner = DockerCompose::detect();
        pipeline::cleanup(&project_dir, &compose_file, &runner).await;
    }

    std::process::exit(130);
}

async fn run_validate(
    path: Option<PathBuf>,
    build: bool,
    start: bool,
    build_timeout: u64,
    json: bool,
    keep: bool,
) -> i32 {
    let project_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !project_dir.is_dir() {
        eprintln!("Error: path does not exist: {}", project_dir.display());
        return 2;
    }

    if build {
        if !compose::daemon_available().await {
            logging::warning(
                "Docker daemon is not reachable; build and start stages will likely fail",
            );
        }
        // Only the expensive stages create host resources worth reclaiming
        // on interrupt.
        tokio::spawn(handle_signals(project_dir.clone()));
    }

    let runner = DockerCompose::detect();
    let options = ValidateOptions {
        build,
        start,
        build_timeout: Duration::from_secs(build_timeout),
    };

    let result = validate_project(&project_dir, &options, &runner).await;

    if build {
        if keep {
            logging::info("Skipping teardown (--keep)");
        } else if let Some(compose_file) = &result.compose_file {
            pipeline::cleanup(&project_dir, compose_file, &runner).await;
        }
    }

    if json {
        match serde_json::to_string_pretty(&result.to_dict()) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("Error: failed to render JSON result: {}", e);
                return 2;
            }
        }
    } else {
        print_report(&result, &options);
    }

    if result.is_valid {
        0
    } else {
        1
    }
}

fn stage_line(label: &str, passed: bool, ran: bool) {
    if !ran {
        println!("  ⏭️ {}: skipped", label);
    } else if passed {
        println!("  ✅ {}", label);
    } else {
        println!("  ❌ {}", label);
    }
}

fn print_report(result: &ValidationResult, options: &ValidateOptions) {
    println!("\nValidation report:");

    match &result.compose_file {
        Some(name) => println!("  ✅ Compose file: {}", name),
        None => println!("  ❌ Compose file: not found"),
    }

    if result.has_dockerfiles {
        println!("  ✅ Dockerfiles: {}", result.dockerfile_paths.join(", "));
    } else {
        println!("  ⚠️ Dockerfiles: none found");
    }

    stage_line(
        "Compose syntax",
        result.compose_syntax_valid,
        result.has_compose_file,
    );
    stage_line(
        "Dockerfile syntax",
        result.dockerfiles_syntax_valid,
        result.has_dockerfiles,
    );
    stage_line(
        "Image build",
        result.images_build,
        options.build && result.compose_syntax_valid,
    );
    stage_line(
        "Service startup",
        result.services_start,
        options.build && options.start && result.images_build,
    );
    stage_line(
        "Health checks",
        result.health_checks_pass,
        result.services_start,
    );

    if !result.services.is_empty() {
        println!("\nServices: {}", result.services.join(", "));
    }

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for (i, error) in result.errors.iter().enumerate() {
            println!("   {}. {}", i + 1, error);
        }
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for (i, warning) in result.warnings.iter().enumerate() {
            println!("   {}. {}", i + 1, warning);
        }
    }

    let score_display = format!("{}/100", result.score);
    let verdict = if result.is_valid {
        format!("✅ {} (score: {})", "Valid".green(), score_display)
    } else {
        format!("❌ {} (score: {})", "Invalid".red(), score_display)
    };
    println!("\n{}", verdict);
}

#[tokio::main]
async fn main() {
    let cli = Dockcheck::parse();

    if cli.debug {
        logging::set_log_level(logging::LogLevel::Debug);
        logging::debug("Debug mode enabled - showing full command output");
    } else if cli.verbose {
        logging::set_log_level(logging::LogLevel::Info);
        logging::info("Verbose mode enabled");
    } else {
        logging::set_log_level(logging::LogLevel::Warning);
    }

    let exit_code = match cli.command {
        Some(Commands::Validate {
            path,
            build,
            start,
            build_timeout,
            json,
            keep,
        }) => run_validate(path, build, start, build_timeout, json, keep).await,

        // Quick validation of the current directory when no subcommand given.
        None => run_validate(None, false, false, 300, false, false).await,
    };

    std::process::exit(exit_code);
}
