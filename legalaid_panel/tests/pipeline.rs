//! End-to-end run of the pipeline over small file-backed fixtures.

use std::fs;
use std::path::Path;

use anyhow::Result;
use polars::prelude::*;

use legalaid_panel::census_schema::{
    CensusTableSchema, AGES, ECONOMIC_ACTIVITY, ETHNICITY, HOUSING_TENURE, POPULATION,
};
use legalaid_panel::config::{Config, StudyWindow};
use legalaid_panel::{PanelPipeline, COL};

/// Renders a census extract CSV for the given schema: one row per area code,
/// every measure defaulting to 10 unless overridden by canonical name.
fn census_csv(schema: &CensusTableSchema, codes: &[&str], overrides: &[(&str, f64)]) -> String {
    let mut header: Vec<String> = vec![schema.geography_code.to_string()];
    header.extend(schema.keep.iter().map(|(source, _)| source.to_string()));
    let mut out = header.join(",");
    out.push('\n');
    for code in codes {
        let mut row: Vec<String> = vec![code.to_string()];
        for (_, canonical) in schema.keep {
            let value = overrides
                .iter()
                .find(|(name, _)| name == canonical)
                .map(|(_, value)| *value)
                .unwrap_or(10.0);
            row.push(value.to_string());
        }
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn write_fixtures(dir: &Path) -> Result<Config> {
    let mut config = Config::default();
    config.raw_data_dir = dir.to_path_buf();
    config.output_path = dir.join("full_panel.csv");
    config.window = StudyWindow {
        start: "2012-q3".into(),
        end: "2013-q1".into(),
        anchor: "2012-q4".into(),
        cutoff: "2013-q1".into(),
    };

    // Case records for Hartlepool only; Swansea never appears. The last row
    // has an unparseable financial year and must be dropped, not fail.
    fs::write(
        dir.join(&config.case_data),
        "VOL,Total Value,Fin_YR,FIN_QTR,LACode,firm_code\n\
         10,100.0,2012/13,2,E06000001,F1\n\
         20,200.0,2012/13,3,E06000001,F1\n\
         5,50.0,2012/13,3,E06000001,F2\n\
         30,300.0,2012/13,4,E06000001,F1\n\
         1,bad,junk,9,E06000001,F9\n",
    )?;

    // Lookup carries a duplicate Hartlepool row and a Scottish code; both
    // must be dropped from the universe.
    fs::write(
        dir.join(&config.la_lookup),
        "LAD23CD,LAD23NM\n\
         E06000001,Hartlepool\n\
         E06000001,Hartlepool\n\
         W06000011,Swansea\n\
         S12000033,Aberdeen City\n",
    )?;

    // The census files key Hartlepool under its pre-2023 code.
    fs::write(
        dir.join(&config.code_converter),
        "Old,New\nE07000999,E06000001\n",
    )?;

    let census_codes = &["E07000999", "W06000011"];
    fs::write(
        dir.join(&config.census_population),
        census_csv(&POPULATION, census_codes, &[("residents_total", 100.0)]),
    )?;
    fs::write(
        dir.join(&config.census_ages),
        census_csv(&AGES, census_codes, &[]),
    )?;
    // A Scottish row exercises the England/Wales filter.
    fs::write(
        dir.join(&config.census_economic_activity),
        census_csv(
            &ECONOMIC_ACTIVITY,
            &["E07000999", "W06000011", "S92000003"],
            &[("econ_active", 50.0), ("a_unemployed", 5.0)],
        ),
    )?;
    fs::write(
        dir.join(&config.census_housing_tenure),
        census_csv(&HOUSING_TENURE, census_codes, &[("households", 100.0)]),
    )?;
    fs::write(
        dir.join(&config.census_ethnicity),
        census_csv(&ETHNICITY, census_codes, &[("residents", 100.0)]),
    )?;

    fs::write(
        dir.join(&config.inflation),
        "year_quarter,index_15\n\
         2012-q2,1.0\n\
         2012-q3,1.0\n\
         2012-q4,1.0\n\
         2013-q1,1.0\n",
    )?;
    fs::write(
        dir.join(&config.rural_urban),
        "LAD23CD,rural_code\n\
         E06000001,U1\n\
         W06000011,R2\n",
    )?;
    Ok(config)
}

fn area_rows(panel: &DataFrame, code: &str) -> DataFrame {
    panel
        .clone()
        .lazy()
        .filter(col(COL::LA_CODE).eq(lit(code.to_string())))
        .collect()
        .unwrap()
}

#[test]
fn pipeline_builds_a_dense_balanced_panel() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_fixtures(dir.path())?;
    let panel = PanelPipeline::with_config(config).build()?;

    // Two areas x three quarters, fully dense.
    assert_eq!(panel.height(), 6);
    for series in panel.get_columns() {
        assert_eq!(series.null_count(), 0, "nulls in {}", series.name());
    }

    // Swansea never had a case record: structural zeros and a permanent
    // desert.
    let swansea = area_rows(&panel, "W06000011");
    assert_eq!(swansea.height(), 3);
    assert_eq!(swansea.column(COL::LA_TOTAL_VOLUME)?.i64()?.sum(), Some(0));
    assert_eq!(swansea.column(COL::LA_TOTAL_VALUE)?.f64()?.sum(), Some(0.0));
    assert_eq!(swansea.column(COL::UNIQUE_PROVIDERS)?.i64()?.sum(), Some(0));
    let deserts: Vec<Option<i32>> = swansea.column(COL::DESERT)?.i32()?.iter().collect();
    assert_eq!(deserts, vec![Some(1), Some(1), Some(1)]);
    let ever: Vec<Option<i32>> = swansea.column(COL::EVER_DESERT)?.i32()?.iter().collect();
    assert_eq!(ever, vec![Some(1), Some(1), Some(1)]);

    // Hartlepool aggregates: FQ3 of 2012/13 is calendar 2012-q4, with two
    // distinct providers.
    let hartlepool = area_rows(&panel, "E06000001");
    let anchor_row = hartlepool
        .clone()
        .lazy()
        .filter(col(COL::YEAR_QUARTER).eq(lit("2012-q4")))
        .collect()?;
    assert_eq!(
        anchor_row.column(COL::LA_TOTAL_VOLUME)?.i64()?.get(0),
        Some(25)
    );
    assert_eq!(
        anchor_row.column(COL::UNIQUE_PROVIDERS)?.i64()?.get(0),
        Some(2)
    );

    // Rebased index is exactly 100 at the anchor quarter.
    assert_eq!(anchor_row.column(COL::VOLUME_INDEX)?.f64()?.get(0), Some(100.0));
    assert_eq!(anchor_row.column(COL::VALUE_INDEX)?.f64()?.get(0), Some(100.0));

    // Census attributes arrive through the old-to-new code remap.
    assert_eq!(
        hartlepool.column(COL::RESIDENTS_TOTAL)?.f64()?.get(0),
        Some(100.0)
    );

    // Exposure is constant across all quarters of an area.
    let exposure: Vec<Option<f64>> = hartlepool.column(COL::EXPOSURE)?.f64()?.iter().collect();
    assert_eq!(exposure.len(), 3);
    assert!(exposure.windows(2).all(|pair| pair[0] == pair[1]));

    // Post indicator flips at the cutoff.
    let post: Vec<Option<i32>> = hartlepool.column(COL::POST)?.i32()?.iter().collect();
    assert_eq!(post, vec![Some(0), Some(0), Some(1)]);

    // Rurality comes from the code prefix.
    assert_eq!(swansea.column(COL::IS_RURAL)?.i32()?.get(0), Some(1));
    assert_eq!(hartlepool.column(COL::IS_RURAL)?.i32()?.get(0), Some(0));
    Ok(())
}

#[test]
fn run_persists_deterministic_output() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_fixtures(dir.path())?;
    let output_path = config.output_path.clone();

    let pipeline = PanelPipeline::with_config(config);
    pipeline.run()?;
    let first = fs::read_to_string(&output_path)?;
    pipeline.run()?;
    let second = fs::read_to_string(&output_path)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn strict_mode_rejects_missing_inflation_quarters() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut config = write_fixtures(dir.path())?;
    config.strict_code_sets = true;
    fs::write(
        dir.path().join(&config.inflation),
        "year_quarter,index_15\n2012-q3,1.0\n",
    )?;
    let result = PanelPipeline::with_config(config).build();
    assert!(result.is_err());
    Ok(())
}
