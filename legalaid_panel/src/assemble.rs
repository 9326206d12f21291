//! Final panel assembly: merges the balanced case panel with the census
//! table, inflation series and rurality classification, then derives the
//! analytical variables.
//!
//! Each step is a pure function over the previous table. Order matters: the
//! ratios need the adjusted values, the rebased indices need the ratios, and
//! the desert shares need the desert flag.

use anyhow::Result;
use log::warn;
use polars::prelude::*;

use crate::config::StudyWindow;
use crate::error::PanelError;
use crate::COL;

/// Attaches the time-invariant census attributes to every row of the area.
pub fn join_census(panel: DataFrame, census: &DataFrame) -> Result<DataFrame> {
    Ok(panel
        .lazy()
        .join(
            census.clone().lazy(),
            [col(COL::LA_CODE)],
            [col(COL::LA_CODE)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?)
}

/// Merges the inflation index onto every row by quarter. Quarters present in
/// the panel but absent from the inflation table are reported; under the
/// strict policy they are fatal, otherwise the null index flows on and is
/// caught by the final missing-value gate.
pub fn join_inflation(panel: DataFrame, inflation: &DataFrame, strict: bool) -> Result<DataFrame> {
    let joined = panel
        .lazy()
        .join(
            inflation.clone().lazy().select([
                col(COL::YEAR_QUARTER),
                col(COL::INDEX_15).cast(DataType::Float64),
            ]),
            [col(COL::YEAR_QUARTER)],
            [col(COL::YEAR_QUARTER)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;

    let missing = joined
        .clone()
        .lazy()
        .filter(col(COL::INDEX_15).is_null())
        .select([col(COL::YEAR_QUARTER)])
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;
    if missing.height() > 0 {
        let quarters: Vec<String> = missing
            .column(COL::YEAR_QUARTER)?
            .str()?
            .into_iter()
            .flatten()
            .map(|quarter| quarter.to_string())
            .collect();
        if strict {
            return Err(PanelError::MissingInflation(quarters).into());
        }
        warn!("Quarters in panel missing inflation data: {quarters:?}");
    }
    Ok(joined)
}

/// Nominal values times the price index (2015-Q1 = 100 base), at both area
/// and national granularity.
pub fn with_adjusted_values(panel: DataFrame) -> Result<DataFrame> {
    Ok(panel
        .lazy()
        .with_columns([
            (col(COL::LA_TOTAL_VALUE) * col(COL::INDEX_15)).alias(COL::ADJUSTED_LA_TOTAL_VALUE),
            (col(COL::TOTAL_VALUE) * col(COL::INDEX_15)).alias(COL::ADJUSTED_TOTAL_VALUE),
        ])
        .collect()?)
}

fn ratio_or_zero(value: Expr, volume: Expr) -> Expr {
    when(volume.clone().eq(lit(0)))
        .then(lit(0.0))
        .otherwise(value / volume)
}

/// Adjusted value per case, defined as zero when the volume is zero.
pub fn with_value_per_volume(panel: DataFrame) -> Result<DataFrame> {
    Ok(panel
        .lazy()
        .with_columns([
            ratio_or_zero(col(COL::ADJUSTED_TOTAL_VALUE), col(COL::TOTAL_VOLUME))
                .alias(COL::VAL_VOL),
            ratio_or_zero(col(COL::ADJUSTED_LA_TOTAL_VALUE), col(COL::LA_TOTAL_VOLUME))
                .alias(COL::LA_VAL_VOL),
        ])
        .collect()?)
}

fn anchor_value(panel: &DataFrame, anchor: &str, column: &str) -> Result<Option<f64>> {
    let row = panel
        .clone()
        .lazy()
        .filter(col(COL::YEAR_QUARTER).eq(lit(anchor.to_string())))
        .select([col(column).cast(DataType::Float64).first()])
        .collect()?;
    if row.height() == 0 {
        return Ok(None);
    }
    Ok(row.column(column)?.f64()?.get(0))
}

fn rebased(column: &str, base: Option<f64>) -> Expr {
    match base {
        Some(base) if base != 0.0 => (col(column).cast(DataType::Float64) / lit(base)
            * lit(100.0))
        .fill_null(lit(0.0)),
        // A zero or absent anchor value makes the whole index undefined;
        // resolve it to zero rather than infinity.
        _ => lit(0.0),
    }
}

/// National volume, value and value-per-case series rebased so the anchor
/// quarter equals 100. Null series values become zero.
pub fn with_rebased_indices(panel: DataFrame, window: &StudyWindow) -> Result<DataFrame> {
    let volume_base = anchor_value(&panel, &window.anchor, COL::TOTAL_VOLUME)?;
    let value_base = anchor_value(&panel, &window.anchor, COL::ADJUSTED_TOTAL_VALUE)?;
    let cases_base = anchor_value(&panel, &window.anchor, COL::VAL_VOL)?;
    if volume_base.is_none() {
        warn!(
            "Anchor quarter {} not present in panel; rebased indices are zero",
            window.anchor
        );
    }
    Ok(panel
        .lazy()
        .with_columns([
            rebased(COL::TOTAL_VOLUME, volume_base).alias(COL::VOLUME_INDEX),
            rebased(COL::ADJUSTED_TOTAL_VALUE, value_base).alias(COL::VALUE_INDEX),
            rebased(COL::VAL_VOL, cases_base).alias(COL::CASES_INDEX),
        ])
        .collect()?)
}

/// Natural logs of the population covariates used downstream in regressions.
pub fn with_log_covariates(panel: DataFrame) -> Result<DataFrame> {
    Ok(panel
        .lazy()
        .with_columns([
            col(COL::RESIDENTS_TOTAL)
                .log(std::f64::consts::E)
                .alias(COL::LOG_RESIDENTS_TOTAL),
            col(COL::WORKING_AGE)
                .log(std::f64::consts::E)
                .alias(COL::LOG_WORKING_AGE),
        ])
        .collect()?)
}

/// Per-area mean of adjusted value per resident over the quarters strictly
/// before the reform cutoff, broadcast to every row of the area.
pub fn with_exposure(panel: DataFrame, window: &StudyWindow) -> Result<DataFrame> {
    let exposure = panel
        .clone()
        .lazy()
        .filter(col(COL::YEAR_QUARTER).lt(lit(window.cutoff.clone())))
        .with_column(
            (col(COL::ADJUSTED_LA_TOTAL_VALUE) / col(COL::RESIDENTS_TOTAL)).alias(COL::VALUE_PC),
        )
        .group_by([col(COL::LA_CODE)])
        .agg([col(COL::VALUE_PC).mean().alias(COL::EXPOSURE)]);
    Ok(panel
        .lazy()
        .join(
            exposure,
            [col(COL::LA_CODE)],
            [col(COL::LA_CODE)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?)
}

/// Post-reform indicator: 1 for quarters at or after the cutoff.
pub fn with_post_indicator(panel: DataFrame, window: &StudyWindow) -> Result<DataFrame> {
    Ok(panel
        .lazy()
        .with_column(
            col(COL::YEAR_QUARTER)
                .gt_eq(lit(window.cutoff.clone()))
                .cast(DataType::Int32)
                .alias(COL::POST),
        )
        .collect()?)
}

/// Desert flag (no active providers in the cell) and its per-area maximum
/// across the whole panel.
pub fn with_desert_flags(panel: DataFrame) -> Result<DataFrame> {
    let panel = panel
        .lazy()
        .with_column(
            col(COL::UNIQUE_PROVIDERS)
                .eq(lit(0))
                .cast(DataType::Int32)
                .alias(COL::DESERT),
        )
        .collect()?;
    let ever = panel
        .clone()
        .lazy()
        .group_by([col(COL::LA_CODE)])
        .agg([col(COL::DESERT).max().alias(COL::EVER_DESERT)]);
    Ok(panel
        .lazy()
        .join(
            ever,
            [col(COL::LA_CODE)],
            [col(COL::LA_CODE)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?)
}

/// Cross-sectional desert measures per quarter: the share of areas flagged as
/// deserts and the resident population living in them, broadcast back to
/// every row of the quarter.
pub fn with_desert_shares(panel: DataFrame) -> Result<DataFrame> {
    let share = panel
        .clone()
        .lazy()
        .group_by([col(COL::YEAR_QUARTER)])
        .agg([col(COL::DESERT)
            .cast(DataType::Float64)
            .mean()
            .alias(COL::PROP_ZERO)]);
    let population = panel
        .clone()
        .lazy()
        .filter(col(COL::DESERT).eq(lit(1)))
        .group_by([col(COL::YEAR_QUARTER)])
        .agg([col(COL::RESIDENTS_TOTAL).sum().alias(COL::POP_ZERO)]);
    Ok(panel
        .lazy()
        .join(
            share,
            [col(COL::YEAR_QUARTER)],
            [col(COL::YEAR_QUARTER)],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            population,
            [col(COL::YEAR_QUARTER)],
            [col(COL::YEAR_QUARTER)],
            JoinArgs::new(JoinType::Left),
        )
        // A quarter with no desert areas has no desert population.
        .with_column(col(COL::POP_ZERO).fill_null(lit(0.0)))
        .collect()?)
}

/// Attaches the rural/urban classification and derives the rural indicator
/// from the categorical code prefix ("R..." codes are rural).
pub fn join_rurality(panel: DataFrame, rural_urban: &DataFrame) -> Result<DataFrame> {
    Ok(panel
        .lazy()
        .join(
            rural_urban
                .clone()
                .lazy()
                .select([col(COL::RAW_LAD23CD), col(COL::RURAL_CODE)]),
            [col(COL::LA_CODE)],
            [col(COL::RAW_LAD23CD)],
            JoinArgs::new(JoinType::Left),
        )
        .with_column(
            col(COL::RURAL_CODE)
                .str()
                .starts_with(lit("R"))
                .cast(DataType::Int32)
                .alias(COL::IS_RURAL),
        )
        .collect()?)
}

/// Runs all assembly steps in order over the balanced panel.
pub fn assemble(
    balanced: DataFrame,
    census: &DataFrame,
    inflation: &DataFrame,
    rural_urban: &DataFrame,
    window: &StudyWindow,
    strict: bool,
) -> Result<DataFrame> {
    let panel = join_census(balanced, census)?;
    let panel = join_inflation(panel, inflation, strict)?;
    let panel = with_adjusted_values(panel)?;
    let panel = with_value_per_volume(panel)?;
    let panel = with_rebased_indices(panel, window)?;
    let panel = with_log_covariates(panel)?;
    let panel = with_exposure(panel, window)?;
    let panel = with_post_indicator(panel, window)?;
    let panel = with_desert_flags(panel)?;
    let panel = with_desert_shares(panel)?;
    join_rurality(panel, rural_urban)
}
