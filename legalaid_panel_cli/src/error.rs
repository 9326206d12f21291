use legalaid_panel::error::PanelError;
use polars::error::PolarsError;

#[derive(thiserror::Error, Debug)]
pub enum PanelCliError {
    #[error("Anyhow error")]
    Anyhow(#[from] anyhow::Error),
    #[error("polars error")]
    PolarsError(#[from] PolarsError),
    #[error("panel error")]
    PanelError(#[from] PanelError),
    #[error("TOML error")]
    TomlError(#[from] toml::de::Error),
    #[error("std IO error")]
    IOError(#[from] std::io::Error),
}

pub type PanelCliResult<T> = Result<T, PanelCliError>;
