use thiserror::Error;

use crate::orders::RowId;

/// Failures surfaced to the operator. The `Display` text doubles as the alert
/// message shown by the browser front end.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("Please select target cells on the grid first.")]
    EmptySelection,
    #[error("No items found for size {0}. Check your imported items.")]
    NoMatchingSize(String),
    #[error("Please map some labels to the grid before printing.")]
    NothingMapped,
    #[error("No data to sync.")]
    NothingToSync,
    #[error("unknown layout `{0}` (expected `standard` or `large`)")]
    UnknownLayout(String),
    #[error("volume `{volume}` is not offered by the {layout} layout")]
    UnsupportedVolume { volume: String, layout: &'static str },
    #[error("cell {index} is outside the {total}-cell grid")]
    CellOutOfRange { index: usize, total: usize },
    #[error("no order row with id {0}")]
    UnknownRow(RowId),
    #[error("invalid normalizer rule `{pattern}`: {source}")]
    Rule {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T, E = LabelError> = std::result::Result<T, E>;
