pub mod json;

pub use super::format::{artifact_file_name, ResultSink, ARTIFACT_EXTENSION};
