use serde::Serialize;

// Score contribution per validation flag. Additive, total = 100.
pub const COMPOSE_FILE_POINTS: u32 = 20;
pub const DOCKERFILES_POINTS: u32 = 10;
pub const COMPOSE_SYNTAX_POINTS: u32 = 20;
pub const DOCKERFILE_SYNTAX_POINTS: u32 = 10;
pub const BUILD_POINTS: u32 = 15;
pub const START_POINTS: u32 = 15;
pub const HEALTH_POINTS: u32 = 10;

/// Result of validating a single Docker Compose project directory.
///
/// One instance is built per validation run: all fields start at their
/// defaults, stages fill them in as they execute, and `finalize` computes
/// the derived `score` and `is_valid` fields before the result is returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub score: u32,
    pub has_compose_file: bool,
    pub has_dockerfiles: bool,
    pub compose_syntax_valid: bool,
    pub dockerfiles_syntax_valid: bool,
    pub images_build: bool,
    pub services_start: bool,
    pub health_checks_pass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compose_file: Option<String>,
    pub services: Vec<String>,
    pub dockerfile_paths: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    pub fn new() -> Self {
        ValidationResult {
            is_valid: false,
            score: 0,
            has_compose_file: false,
            has_dockerfiles: false,
            compose_syntax_valid: false,
            dockerfiles_syntax_valid: false,
            images_build: false,
            services_start: false,
            health_checks_pass: false,
            compose_file: None,
            services: Vec::new(),
            dockerfile_paths: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a fatal finding. Any error forces `is_valid = false`.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Record a non-fatal observation. Warnings never affect validity.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Additive score over the per-stage flags, capped at 100.
    pub fn compute_score(&self) -> u32 {
        let mut score = 0;
        if self.has_compose_file {
            score += COMPOSE_FILE_POINTS;
        }
        if self.has_dockerfiles {
            score += DOCKERFILES_POINTS;
        }
        if self.compose_syntax_valid {
            score += COMPOSE_SYNTAX_POINTS;
        }
        if self.dockerfiles_syntax_valid {
            score += DOCKERFILE_SYNTAX_POINTS;
        }
        if self.images_build {
            score += BUILD_POINTS;
        }
        if self.services_start {
            score += START_POINTS;
        }
        if self.health_checks_pass {
            score += HEALTH_POINTS;
        }
        score.min(100)
    }

    /// Compute the derived fields once all stages have run.
    ///
    /// Valid means: a compose file was found, its syntax checked out, and no
    /// stage recorded an error.
    pub fn finalize(&mut self) {
        self.score = self.compute_score();
        self.is_valid =
            self.has_compose_file && self.compose_syntax_valid && self.errors.is_empty();
    }

    /// Flat JSON mapping of the result, suitable for embedding in a larger
    /// report or CI artifact.
    pub fn to_dict(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_result_has_defaults() {
        let result = ValidationResult::new();
        assert!(!result.is_valid);
        assert_eq!(result.score, 0);
        assert!(result.compose_file.is_none());
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn error_forces_invalid() {
        let mut result = ValidationResult::new();
        result.has_compose_file = true;
        result.compose_syntax_valid = true;
        result.add_error("Build failed: exit code 1".to_string());
        result.finalize();
        assert!(!result.is_valid);
    }

    #[test]
    fn warnings_do_not_affect_validity() {
        let mut result = ValidationResult::new();
        result.has_compose_file = true;
        result.compose_syntax_valid = true;
        result.add_warning("No Dockerfiles found".to_string());
        result.finalize();
        assert!(result.is_valid);
    }

    #[test]
    fn score_is_additive_over_flags() {
        let mut result = ValidationResult::new();
        assert_eq!(result.compute_score(), 0);

        result.has_compose_file = true;
        result.has_dockerfiles = true;
        result.compose_syntax_valid = true;
        result.dockerfiles_syntax_valid = true;
        assert_eq!(result.compute_score(), 60);

        result.images_build = true;
        result.services_start = true;
        result.health_checks_pass = true;
        assert_eq!(result.compute_score(), 100);
    }

    #[test]
    fn score_never_decreases_as_flags_accumulate() {
        let mut result = ValidationResult::new();
        let mut previous = 0;
        let flags: Vec<fn(&mut ValidationResult)> = vec![
            |r| r.has_compose_file = true,
            |r| r.has_dockerfiles = true,
            |r| r.compose_syntax_valid = true,
            |r| r.dockerfiles_syntax_valid = true,
            |r| r.images_build = true,
            |r| r.services_start = true,
            |r| r.health_checks_pass = true,
        ];
        for set_flag in flags {
            set_flag(&mut result);
            let score = result.compute_score();
            assert!(score >= previous);
            previous = score;
        }
        assert_eq!(previous, 100);
    }

    #[test]
    fn to_dict_is_flat_and_omits_absent_compose_file() {
        let mut result = ValidationResult::new();
        result.add_error("No compose file found".to_string());
        result.finalize();

        let dict = result.to_dict();
        let map = dict.as_object().expect("expected a JSON object");
        assert!(!map.contains_key("compose_file"));
        assert_eq!(map["is_valid"], serde_json::json!(false));
        assert_eq!(map["score"], serde_json::json!(0));
        // Every value is a scalar or a flat list of strings.
        for value in map.values() {
            assert!(value.is_boolean() || value.is_number() || value.is_array());
        }
    }

    #[test]
    fn to_dict_includes_compose_file_when_present() {
        let mut result = ValidationResult::new();
        result.has_compose_file = true;
        result.compose_file = Some("docker-compose.yml".to_string());
        result.services = vec!["web".to_string(), "db".to_string()];
        result.finalize();

        let dict = result.to_dict();
        assert_eq!(dict["compose_file"], serde_json::json!("docker-compose.yml"));
        assert_eq!(dict["services"], serde_json::json!(["web", "db"]));
    }
}
