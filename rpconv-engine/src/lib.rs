pub mod batch;
pub mod pipeline;

pub use batch::{BatchSummary, ConvertConfig, run_batch};
pub use pipeline::{ArchiveOutcome, ConversionReport, process_archive};

pub mod errors {
    use std::path::PathBuf;

    use rpconv_io::IoError;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("failed to prepare directory {path:?}: {source}")]
        PrepareDir {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error("failed to list archives in {path:?}: {source}")]
        Discover {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error("failed to create scratch directory in {path:?}: {source}")]
        Scratch {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error(transparent)]
        Io(#[from] IoError),
    }
}
