use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The study window and the named quarters that the derivations hang off.
/// Quarters are canonical `"<year>-q<quarter>"` strings so the panel can be
/// regenerated for a different window without touching derivation logic.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StudyWindow {
    /// First quarter kept in the balanced panel (inclusive).
    pub start: String,
    /// Last quarter kept in the balanced panel (inclusive).
    pub end: String,
    /// Anchor quarter for the rebased indices (= 100).
    pub anchor: String,
    /// First quarter in which the reform is in effect; rows from this quarter
    /// onwards have `post = 1` and are excluded from the exposure average.
    pub cutoff: String,
}

impl Default for StudyWindow {
    fn default() -> Self {
        StudyWindow {
            start: "2010-q1".into(),
            end: "2019-q4".into(),
            anchor: "2012-q4".into(),
            cutoff: "2013-q1".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory containing the raw extracts listed below.
    pub raw_data_dir: PathBuf,
    /// Path the assembled panel is written to.
    pub output_path: PathBuf,
    /// Treat area-code divergence across sources and missing inflation
    /// quarters as fatal instead of logging a warning.
    pub strict_code_sets: bool,
    pub window: StudyWindow,

    // Input file names, resolved relative to `raw_data_dir`.
    pub case_data: String,
    pub la_lookup: String,
    pub code_converter: String,
    pub census_population: String,
    pub census_ages: String,
    pub census_economic_activity: String,
    pub census_housing_tenure: String,
    pub census_ethnicity: String,
    pub inflation: String,
    pub rural_urban: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            raw_data_dir: "raw_data".into(),
            output_path: "cleaned_data/full_panel.csv".into(),
            strict_code_sets: false,
            window: StudyWindow::default(),
            case_data: "legal-aid-statistics-civil-completions-provider-area-data-to-mar-2024.csv"
                .into(),
            la_lookup:
                "Local_Authority_District_(2022)_to_Local_Authority_District_(2023)_Lookup_for_EW.csv"
                    .into(),
            code_converter: "census_la_converter.csv".into(),
            census_population: "raw_census_2011_populations.csv".into(),
            census_ages: "raw_census_2011_ages.csv".into(),
            census_economic_activity: "raw_census_2011_economic_activity.csv".into(),
            census_housing_tenure: "raw_census_2011_housing_tenure.csv".into(),
            census_ethnicity: "raw_census_2011_ethnicity.csv".into(),
            inflation: "inflation_data.csv".into(),
            rural_urban: "rural_urban_categories.csv".into(),
        }
    }
}

impl Config {
    pub fn input_path(&self, file_name: &str) -> PathBuf {
        Path::new(&self.raw_data_dir).join(file_name)
    }
}
