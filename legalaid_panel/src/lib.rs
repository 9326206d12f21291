use std::path::Path;

use anyhow::Result;
use log::{debug, info};
use polars::frame::DataFrame;
use polars::prelude::{CsvWriter, SerWriter};

use crate::config::Config;

// Re-exports
pub use column_names as COL;

// Modules
pub mod assemble;
pub mod balance;
pub mod cases;
pub mod census;
pub mod census_schema;
pub mod checks;
pub mod column_names;
pub mod config;
pub mod error;
pub mod sources;

/// The panel-construction pipeline: loads the raw extracts, aggregates and
/// balances the case data, normalizes the census tables and assembles the
/// final (area x quarter) panel with all derived variables.
pub struct PanelPipeline {
    pub config: Config,
}

impl PanelPipeline {
    /// Setup the pipeline with default configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Setup the pipeline with custom configuration
    pub fn with_config(config: Config) -> Self {
        debug!("config: {config:?}");
        Self { config }
    }

    /// Builds the fully assembled panel without persisting it. All integrity
    /// checks run, including the final missing-value hard gate.
    pub fn build(&self) -> Result<DataFrame> {
        let raw = sources::load_all(&self.config)?;

        let clean = cases::clean_cases(raw.cases.clone())?;
        let la_totals = cases::la_quarter_totals(&clean)?;
        let national_totals = cases::national_quarter_totals(&clean)?;

        let universe = balance::authority_universe(&raw.la_lookup)?;
        let balanced =
            balance::balance_panel(&la_totals, &national_totals, &universe, &self.config.window)?;

        let census = census::normalize(&raw)?;
        checks::check_code_sets(
            ("case panel", &balanced),
            &[
                ("census population", &census.population),
                ("census ages", &census.ages),
                ("census economic activity", &census.economic_activity),
                ("census housing tenure", &census.housing_tenure),
                ("census ethnicity", &census.ethnicity),
                ("merged census", &census.merged),
            ],
            self.config.strict_code_sets,
        )?;
        checks::check_proportion_bounds(&census.merged)?;

        let panel = assemble::assemble(
            balanced,
            &census.merged,
            &raw.inflation,
            &raw.rural_urban,
            &self.config.window,
            self.config.strict_code_sets,
        )?;

        checks::check_balanced(&panel, universe.height())?;
        checks::check_no_missing(&panel)?;
        Ok(panel)
    }

    /// Builds the panel and writes it to the configured output path. Nothing
    /// is written if any hard check fails, so a failed run leaves no partial
    /// output behind.
    pub fn run(&self) -> Result<DataFrame> {
        let mut panel = self.build()?;
        write_panel(&mut panel, &self.config.output_path)?;
        info!("Panel saved to {:?}", self.config.output_path);
        Ok(panel)
    }
}

impl Default for PanelPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Persists the assembled panel as CSV, creating parent directories as
/// needed.
pub fn write_panel(panel: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(panel)?;
    Ok(())
}
