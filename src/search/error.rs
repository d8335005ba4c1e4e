use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal pipeline errors, carried on a failed `SearchResult`.
///
/// An unserviced city is not in here: that outcome lives on
/// `LocationValidation` and leaves the rest of the filters usable.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SearchError {
    /// Blank or whitespace-only query; no collaborator was called
    #[error("search query is empty")]
    EmptyInput,

    /// Completion service unreachable, timed out, or returned something
    /// that does not parse as the expected filter shape
    #[error("filter extraction failed: {0}")]
    ExtractionFailure(String),
}
