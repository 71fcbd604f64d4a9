use std::path::PathBuf;

use thiserror::Error;

pub mod archive;
pub mod models;

pub use archive::{extract_archive, reset_dir, write_archive};
pub use models::{find_item_models, read_model, write_model};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid model document {path:?}: {source}")]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("archive {path:?} is unreadable or could not be written: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("archive {archive:?} contains entry {entry:?} outside the extraction directory")]
    UnsafeEntry { archive: PathBuf, entry: String },
    #[error("failed to walk directory {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
