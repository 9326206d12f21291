//! Error types.

#[derive(thiserror::Error, Debug)]
pub enum PanelError {
    #[error("Wrapped anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
    #[error("Wrapped polars error: {0}")]
    PolarsError(#[from] polars::error::PolarsError),
    #[error("Source table '{table}' is missing expected columns: {columns:?}")]
    MissingColumns {
        table: String,
        columns: Vec<String>,
    },
    #[error("Area code sets diverge between '{reference}' and '{other}': {difference:?}")]
    CodeSetMismatch {
        reference: String,
        other: String,
        difference: Vec<String>,
    },
    #[error("No inflation index for quarters: {0:?}")]
    MissingInflation(Vec<String>),
    #[error("Assembled panel still contains missing values in columns: {0:?}")]
    MissingValues(Vec<String>),
    #[error("Panel is not balanced: expected {expected} rows, found {found}")]
    Unbalanced { expected: usize, found: usize },
}
