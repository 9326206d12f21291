//! Schema-driven cleaning of the 2011 census extracts and their merge into a
//! single per-area table.
//!
//! Every extract goes through the same pipeline: rename the geography column,
//! drop non-substantive columns, remap old-standard area codes through the
//! converter, optionally filter to England and Wales, select and rename the
//! measure columns, and sum over areas that merged under the code remap.
//! Derived sub-aggregates (age bands, unemployment rate, tenure and ethnicity
//! proportions) are added per table before the five-way merge.

use anyhow::Result;
use log::{debug, warn};
use polars::prelude::*;

use crate::census_schema::{
    CensusTableSchema, AGES, CHILDREN_BANDS, ECONOMIC_ACTIVITY, ETHNICITY, HOUSING_TENURE,
    PENSIONER_BANDS, POPULATION, WORKING_AGE_BANDS,
};
use crate::error::PanelError;
use crate::sources::RawTables;
use crate::COL;

/// The five cleaned census tables plus their merge. The individual tables are
/// kept around for the cross-source code-set check.
#[derive(Debug)]
pub struct CensusTables {
    pub population: DataFrame,
    pub ages: DataFrame,
    pub economic_activity: DataFrame,
    pub housing_tenure: DataFrame,
    pub ethnicity: DataFrame,
    pub merged: DataFrame,
}

/// Cleans one census extract according to its schema. Area codes not present
/// in the converter pass through unchanged (assumed already current-standard);
/// multiple old codes collapsing to one new code have their counts summed.
pub fn clean_census_table(
    raw: DataFrame,
    schema: &CensusTableSchema,
    converter: &DataFrame,
) -> Result<DataFrame> {
    let present: Vec<String> = raw
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let missing: Vec<String> = std::iter::once(schema.geography_code)
        .chain(schema.keep.iter().map(|(source, _)| *source))
        .filter(|required| !present.iter().any(|name| name == required))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PanelError::MissingColumns {
            table: schema.name.to_string(),
            columns: missing,
        }
        .into());
    }

    // Only drop what is actually there; some extracts omit e.g. the rurality
    // label column.
    let droppable: Vec<String> = schema
        .drop
        .iter()
        .filter(|name| present.iter().any(|col_name| col_name == *name))
        .map(|name| name.to_string())
        .collect();

    let mut lf = raw
        .lazy()
        .rename([schema.geography_code], [COL::LA_CODE])
        .drop(droppable)
        .join(
            converter
                .clone()
                .lazy()
                .select([col(COL::RAW_CONVERTER_OLD), col(COL::RAW_CONVERTER_NEW)]),
            [col(COL::LA_CODE)],
            [col(COL::RAW_CONVERTER_OLD)],
            JoinArgs::new(JoinType::Left),
        )
        .with_column(
            col(COL::RAW_CONVERTER_NEW)
                .fill_null(col(COL::LA_CODE))
                .alias(COL::LA_CODE),
        )
        .drop([COL::RAW_CONVERTER_NEW]);

    if schema.filter_england_wales {
        lf = lf.filter(
            col(COL::LA_CODE)
                .str()
                .starts_with(lit("E"))
                .or(col(COL::LA_CODE).str().starts_with(lit("W"))),
        );
    }

    let mut selection: Vec<Expr> = vec![col(COL::LA_CODE)];
    selection.extend(
        schema
            .keep
            .iter()
            .map(|(source, canonical)| col(*source).cast(DataType::Float64).alias(canonical)),
    );
    let sums: Vec<Expr> = schema
        .keep
        .iter()
        .map(|(_, canonical)| col(*canonical).sum())
        .collect();

    let cleaned = lf
        .select(selection)
        .group_by([col(COL::LA_CODE)])
        .agg(sums)
        .sort([COL::LA_CODE], Default::default())
        .collect()?;
    debug!("Cleaned census table '{}': {:?}", schema.name, cleaned.shape());
    Ok(cleaned)
}

fn band_sum(bands: &[&str]) -> Expr {
    bands
        .iter()
        .map(|name| col(*name))
        .reduce(|acc, expr| acc + expr)
        .expect("age band list is non-empty")
}

/// Adds the three derived age groupings to the cleaned age table.
pub fn with_age_bands(ages: DataFrame) -> Result<DataFrame> {
    Ok(ages
        .lazy()
        .with_columns([
            band_sum(WORKING_AGE_BANDS).alias(COL::WORKING_AGE),
            band_sum(CHILDREN_BANDS).alias(COL::CHILDREN),
            band_sum(PENSIONER_BANDS).alias(COL::PENSIONER),
        ])
        .collect()?)
}

/// Unemployment rate = unemployed / economically active. An area with zero
/// economically-active residents gets a null rate rather than a divide error.
pub fn with_unemployment_rate(economic_activity: DataFrame) -> Result<DataFrame> {
    Ok(economic_activity
        .lazy()
        .with_column(
            when(col(COL::ECON_ACTIVE).eq(lit(0.0)))
                .then(lit(NULL))
                .otherwise(col(COL::A_UNEMPLOYED) / col(COL::ECON_ACTIVE))
                .alias(COL::UNEMPLOYMENT_RATE),
        )
        .collect()?)
}

/// Tenure proportions over all households.
pub fn with_tenure_proportions(housing_tenure: DataFrame) -> Result<DataFrame> {
    Ok(housing_tenure
        .lazy()
        .with_columns([
            (col(COL::HH_OWNED) / col(COL::HOUSEHOLDS)).alias(COL::PROP_HH_OWNED),
            (col(COL::HH_SOCIAL_RENTED) / col(COL::HOUSEHOLDS)).alias(COL::PROP_HH_SOCIAL_RENTED),
            (col(COL::HH_PRIVATE_RENTED) / col(COL::HOUSEHOLDS)).alias(COL::PROP_HH_PRIVATE_RENTED),
            ((col(COL::HH_SOCIAL_RENTED) + col(COL::HH_PRIVATE_RENTED)) / col(COL::HOUSEHOLDS))
                .alias(COL::PROP_HH_RENTED),
        ])
        .collect()?)
}

/// Ethnic-group proportions over all usual residents.
pub fn with_ethnicity_proportions(ethnicity: DataFrame) -> Result<DataFrame> {
    Ok(ethnicity
        .lazy()
        .with_columns([
            (col(COL::ETH_WHITE) / col(COL::RESIDENTS)).alias(COL::PROP_ETH_WHITE),
            (col(COL::ETH_MIXED) / col(COL::RESIDENTS)).alias(COL::PROP_ETH_MIXED),
            (col(COL::ETH_ASIAN) / col(COL::RESIDENTS)).alias(COL::PROP_ETH_ASIAN),
            (col(COL::ETH_BLACK) / col(COL::RESIDENTS)).alias(COL::PROP_ETH_BLACK),
            (col(COL::ETH_OTHER) / col(COL::RESIDENTS)).alias(COL::PROP_ETH_OTHER),
        ])
        .collect()?)
}

/// Merges the cleaned tables with full outer joins on the area code, so an
/// area missing from one table does not drop rows contributed by the others.
/// Duplicate-named columns from the joins are dropped keeping the first
/// occurrence.
pub fn merge_census(tables: &[&DataFrame]) -> Result<DataFrame> {
    let mut merged: DataFrame = (*tables
        .first()
        .expect("at least one census table to merge"))
    .clone();
    for table in &tables[1..] {
        merged = merged
            .lazy()
            .join(
                (*table).clone().lazy(),
                [col(COL::LA_CODE)],
                [col(COL::LA_CODE)],
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            )
            .collect()?;
    }
    let duplicates: Vec<String> = merged
        .get_column_names()
        .iter()
        .filter(|name| name.ends_with("_right"))
        .map(|name| name.to_string())
        .collect();
    if !duplicates.is_empty() {
        warn!("Dropping duplicate columns from census merge: {duplicates:?}");
        merged = merged.drop_many(&duplicates);
    }
    Ok(merged
        .lazy()
        .sort([COL::LA_CODE], Default::default())
        .collect()?)
}

/// Count of rows holding a missing value in any column.
fn rows_with_missing(df: &DataFrame) -> usize {
    let mut any_null = BooleanChunked::full("any_null", false, df.height());
    for series in df.get_columns() {
        any_null = &any_null | &series.is_null();
    }
    any_null.sum().unwrap_or(0) as usize
}

/// Runs the whole census branch: clean each extract, add its derived fields,
/// merge the five tables.
pub fn normalize(raw: &RawTables) -> Result<CensusTables> {
    let converter = &raw.code_converter;
    let population = clean_census_table(raw.census_population.clone(), &POPULATION, converter)?;
    let ages = with_age_bands(clean_census_table(
        raw.census_ages.clone(),
        &AGES,
        converter,
    )?)?;
    let economic_activity = with_unemployment_rate(clean_census_table(
        raw.census_economic_activity.clone(),
        &ECONOMIC_ACTIVITY,
        converter,
    )?)?;
    let housing_tenure = with_tenure_proportions(clean_census_table(
        raw.census_housing_tenure.clone(),
        &HOUSING_TENURE,
        converter,
    )?)?;
    let ethnicity = with_ethnicity_proportions(clean_census_table(
        raw.census_ethnicity.clone(),
        &ETHNICITY,
        converter,
    )?)?;
    let merged = merge_census(&[
        &population,
        &ages,
        &economic_activity,
        &housing_tenure,
        &ethnicity,
    ])?;
    let incomplete = rows_with_missing(&merged);
    if incomplete > 0 {
        warn!("Merged census table has {incomplete} areas with missing values");
    }
    Ok(CensusTables {
        population,
        ages,
        economic_activity,
        housing_tenure,
        ethnicity,
        merged,
    })
}
