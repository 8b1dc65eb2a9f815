use airport_atlas_core::DatasetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal build failures. Nothing is written when one of these is returned.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Could not fetch primary feed {source_name}: {error}")]
    Fetch {
        source_name: String,
        #[source]
        error: FetchError,
    },
    #[error("Could not parse primary feed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Primary feed is not a JSON object keyed by facility identifier")]
    NotAnObject,
    #[error("No usable airport records in primary feed ({parsed} entries parsed)")]
    NoRecords { parsed: usize },
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

/// Problems with the secondary type feed. These only ever skip enrichment.
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("Could not fetch type feed: {0}")]
    Fetch(#[from] FetchError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Type feed has no {0} column")]
    MissingColumn(&'static str),
}
