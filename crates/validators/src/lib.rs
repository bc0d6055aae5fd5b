// validators crate

mod discovery;
mod dockerfile;

pub use discovery::{find_compose_file, find_dockerfiles, COMPOSE_FILE_NAMES};
pub use dockerfile::{check_dockerfile_syntax, validate_dockerfiles};
