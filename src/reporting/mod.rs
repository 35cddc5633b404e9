mod format;
pub mod formats;

pub use format::{artifact_file_name, ResultSink, ARTIFACT_EXTENSION};
pub use formats::json::{load_artifact, JsonSink};
