//! Construction of the balanced (area x quarter) panel.
//!
//! The raw case facts are sparse: an area with no completions in a quarter
//! simply has no row. Balancing builds the full cross product of the
//! authoritative area universe and every quarter seen in the facts, fills the
//! fact columns with structural zeros, then trims to the study window.

use anyhow::Result;
use log::{debug, info};
use polars::prelude::*;

use crate::config::StudyWindow;
use crate::COL;

/// The authoritative set of local authorities: England and Wales rows of the
/// geographic lookup, deduplicated keeping the first occurrence of each code.
pub fn authority_universe(la_lookup: &DataFrame) -> Result<DataFrame> {
    let universe = la_lookup
        .clone()
        .lazy()
        .filter(
            col(COL::RAW_LAD23CD)
                .str()
                .starts_with(lit("E"))
                .or(col(COL::RAW_LAD23CD).str().starts_with(lit("W"))),
        )
        .select([
            col(COL::RAW_LAD23CD).alias(COL::LA_CODE),
            col(COL::RAW_LAD23NM).alias(COL::LA_NAME),
        ])
        .unique_stable(
            Some(vec![COL::LA_CODE.to_string()]),
            UniqueKeepStrategy::First,
        )
        .sort([COL::LA_CODE], Default::default())
        .collect()?;
    info!("Authority universe: {} local authorities", universe.height());
    Ok(universe)
}

/// Builds the balanced panel: every (quarter, area) combination gets exactly
/// one row; combinations absent from the facts receive volume, value and
/// provider count of zero (structural zeros, not missing data). Authority
/// names and national quarterly totals are attached, then rows are restricted
/// to the study window.
pub fn balance_panel(
    la_totals: &DataFrame,
    national_totals: &DataFrame,
    universe: &DataFrame,
    window: &StudyWindow,
) -> Result<DataFrame> {
    let quarters = la_totals
        .clone()
        .lazy()
        .select([col(COL::YEAR_QUARTER)])
        .unique_stable(None, UniqueKeepStrategy::First)
        .sort([COL::YEAR_QUARTER], Default::default())
        .collect()?;
    let areas = universe.select([COL::LA_CODE])?;
    debug!(
        "Balancing {} quarters x {} areas",
        quarters.height(),
        areas.height()
    );
    let grid = quarters.cross_join(&areas, None, None)?;

    let panel = grid
        .lazy()
        .join(
            la_totals.clone().lazy(),
            [col(COL::YEAR_QUARTER), col(COL::LA_CODE)],
            [col(COL::YEAR_QUARTER), col(COL::LA_CODE)],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([
            col(COL::LA_TOTAL_VOLUME).fill_null(lit(0)),
            col(COL::LA_TOTAL_VALUE).fill_null(lit(0.0)),
            col(COL::UNIQUE_PROVIDERS).fill_null(lit(0)),
        ])
        .join(
            universe.clone().lazy(),
            [col(COL::LA_CODE)],
            [col(COL::LA_CODE)],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            national_totals.clone().lazy(),
            [col(COL::YEAR_QUARTER)],
            [col(COL::YEAR_QUARTER)],
            JoinArgs::new(JoinType::Left),
        )
        // The canonical "<year>-q<quarter>" format sorts year-major then
        // quarter-minor, so plain string comparison implements the window.
        .filter(
            col(COL::YEAR_QUARTER)
                .gt_eq(lit(window.start.clone()))
                .and(col(COL::YEAR_QUARTER).lt_eq(lit(window.end.clone()))),
        )
        .sort([COL::YEAR_QUARTER, COL::LA_CODE], Default::default())
        .collect()?;
    info!("Balanced panel: {:?}", panel.shape());
    Ok(panel)
}
