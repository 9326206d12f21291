//! Loaders for the raw tabular extracts. Every input is read fully into
//! memory before any transform runs; each stage downstream consumes these
//! frames and produces new ones.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use polars::prelude::*;

use crate::config::Config;

/// All raw inputs, loaded up front.
#[derive(Debug)]
pub struct RawTables {
    pub cases: DataFrame,
    pub la_lookup: DataFrame,
    pub code_converter: DataFrame,
    pub census_population: DataFrame,
    pub census_ages: DataFrame,
    pub census_economic_activity: DataFrame,
    pub census_housing_tenure: DataFrame,
    pub census_ethnicity: DataFrame,
    pub inflation: DataFrame,
    pub rural_urban: DataFrame,
}

pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("Failed to open CSV: {}", path.display()))?
        .finish()
        .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;
    debug!("{}: {:?}", path.display(), df.shape());
    Ok(df)
}

pub fn load_all(config: &Config) -> Result<RawTables> {
    info!("Loading raw extracts from {:?}", config.raw_data_dir);
    Ok(RawTables {
        cases: read_csv(config.input_path(&config.case_data))?,
        la_lookup: read_csv(config.input_path(&config.la_lookup))?,
        code_converter: read_csv(config.input_path(&config.code_converter))?,
        census_population: read_csv(config.input_path(&config.census_population))?,
        census_ages: read_csv(config.input_path(&config.census_ages))?,
        census_economic_activity: read_csv(config.input_path(&config.census_economic_activity))?,
        census_housing_tenure: read_csv(config.input_path(&config.census_housing_tenure))?,
        census_ethnicity: read_csv(config.input_path(&config.census_ethnicity))?,
        inflation: read_csv(config.input_path(&config.inflation))?,
        rural_urban: read_csv(config.input_path(&config.rural_urban))?,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_headers_and_rows() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "LAD23CD,LAD23NM")?;
        writeln!(file, "E06000001,Hartlepool")?;
        writeln!(file, "W06000011,Swansea")?;
        let df = read_csv(file.path())?;
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.get_column_names(), vec!["LAD23CD", "LAD23NM"]);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_csv("does/not/exist.csv").is_err());
    }
}
