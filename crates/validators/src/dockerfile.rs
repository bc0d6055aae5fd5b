use models::ValidationResult;
use std::fs;
use std::path::Path;

/// Shallow, line-oriented Dockerfile check. This is a guard against obviously
/// malformed files, not a Dockerfile grammar parser: the file must contain a
/// `FROM` instruction, and nothing except `ARG` may precede the first `FROM`
/// (build-arg-parameterized base images are legal).
pub fn check_dockerfile_syntax(content: &str) -> Result<(), String> {
    let mut found_from = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Dockerfile instructions are case-insensitive.
        let instruction = trimmed
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_uppercase();

        if instruction == "FROM" {
            found_from = true;
            break;
        }
        if instruction != "ARG" {
            return Err("First instruction must be FROM (or ARG before FROM)".to_string());
        }
    }

    if !found_from {
        return Err("Missing FROM instruction".to_string());
    }

    Ok(())
}

/// Check every discovered Dockerfile in `result.dockerfile_paths` and set
/// `dockerfiles_syntax_valid`. Each failing file contributes one error entry
/// prefixed with its path; unreadable files go through the same channel.
pub fn validate_dockerfiles(project_dir: &Path, result: &mut ValidationResult) {
    let mut all_valid = !result.dockerfile_paths.is_empty();

    for relative_path in result.dockerfile_paths.clone() {
        match fs::read_to_string(project_dir.join(&relative_path)) {
            Ok(content) => {
                if let Err(message) = check_dockerfile_syntax(&content) {
                    all_valid = false;
                    result.add_error(format!("{}: {}", relative_path, message));
                }
            }
            Err(e) => {
                all_valid = false;
                result.add_error(format!("{}: failed to read Dockerfile: {}", relative_path, e));
            }
        }
    }

    result.dockerfiles_syntax_valid = all_valid;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_from_is_valid() {
        assert!(check_dockerfile_syntax("FROM python:3.11\nRUN pip install flask\n").is_ok());
    }

    #[test]
    fn arg_before_from_is_valid() {
        let content = "ARG BASE=foo\nFROM ${BASE}\n";
        assert!(check_dockerfile_syntax(content).is_ok());
    }

    #[test]
    fn comments_and_blank_lines_before_from_are_ignored() {
        let content = "# syntax=docker/dockerfile:1\n\n# base image\nFROM alpine:3.19\n";
        assert!(check_dockerfile_syntax(content).is_ok());
    }

    #[test]
    fn lowercase_instructions_are_recognized() {
        assert!(check_dockerfile_syntax("from alpine\nrun echo hi\n").is_ok());
    }

    #[test]
    fn instruction_before_from_is_rejected() {
        let content = "RUN echo hi\nFROM alpine\n";
        assert_eq!(
            check_dockerfile_syntax(content),
            Err("First instruction must be FROM (or ARG before FROM)".to_string())
        );
    }

    #[test]
    fn missing_from_is_rejected() {
        let content = "ARG VERSION=1\n# nothing else\n";
        assert_eq!(
            check_dockerfile_syntax(content),
            Err("Missing FROM instruction".to_string())
        );
    }

    #[test]
    fn empty_file_is_rejected() {
        assert_eq!(
            check_dockerfile_syntax(""),
            Err("Missing FROM instruction".to_string())
        );
    }

    #[test]
    fn validate_dockerfiles_records_path_prefixed_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Dockerfile"), "RUN echo hi\n").unwrap();

        let mut result = ValidationResult::new();
        result.dockerfile_paths = vec!["Dockerfile".to_string()];
        validate_dockerfiles(dir.path(), &mut result);

        assert!(!result.dockerfiles_syntax_valid);
        assert_eq!(
            result.errors,
            vec!["Dockerfile: First instruction must be FROM (or ARG before FROM)".to_string()]
        );
    }

    #[test]
    fn validate_dockerfiles_with_no_paths_leaves_flag_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut result = ValidationResult::new();
        validate_dockerfiles(dir.path(), &mut result);

        assert!(!result.dockerfiles_syntax_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn validate_dockerfiles_passes_valid_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Dockerfile"), "FROM python:3.11\n").unwrap();

        let mut result = ValidationResult::new();
        result.dockerfile_paths = vec!["Dockerfile".to_string()];
        validate_dockerfiles(dir.path(), &mut result);

        assert!(result.dockerfiles_syntax_valid);
        assert!(result.errors.is_empty());
    }
}
