use std::path::Path;

/// Compose file names checked in the project root, in preference order.
pub const COMPOSE_FILE_NAMES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

// Conventional subdirectories checked for a Dockerfile. Discovery is not a
// recursive walk; Dockerfiles anywhere else are invisible to it.
const DOCKERFILE_SUBDIRS: [&str; 7] = [
    "backend", "frontend", "api", "web", "server", "client", "app",
];

/// First compose file that exists in the project root, or `None`.
/// Only root-level files are considered.
pub fn find_compose_file(project_dir: &Path) -> Option<String> {
    COMPOSE_FILE_NAMES
        .iter()
        .find(|name| project_dir.join(name).is_file())
        .map(|name| name.to_string())
}

/// Dockerfiles at the project root and under the conventional subdirectory
/// list, as paths relative to the project root.
pub fn find_dockerfiles(project_dir: &Path) -> Vec<String> {
    let mut dockerfiles = Vec::new();

    if project_dir.join("Dockerfile").is_file() {
        dockerfiles.push("Dockerfile".to_string());
    }

    for subdir in DOCKERFILE_SUBDIRS {
        let candidate = Path::new(subdir).join("Dockerfile");
        if project_dir.join(&candidate).is_file() {
            dockerfiles.push(candidate.to_string_lossy().to_string());
        }
    }

    dockerfiles
}
