//! Cleaning and aggregation of the raw case-level administrative records.
//!
//! The raw extract reports completions by financial year and financial
//! quarter. Everything downstream works on calendar quarters, so cleaning
//! derives the canonical `year_quarter` key before any aggregation happens.

use anyhow::Result;
use log::{debug, warn};
use polars::prelude::*;

use crate::COL;

/// Financial quarters map onto calendar quarters as
/// {FQ1 -> Q2, FQ2 -> Q3, FQ3 -> Q4, FQ4 -> Q1 of the next calendar year}.
pub fn calendar_quarter(fy_start: i32, fin_quarter: i32) -> Option<String> {
    let cal_q = match fin_quarter {
        1 => 2,
        2 => 3,
        3 => 4,
        4 => 1,
        _ => return None,
    };
    let cal_year = if fin_quarter == 4 {
        fy_start + 1
    } else {
        fy_start
    };
    Some(format!("{cal_year}-q{cal_q}"))
}

/// Expression form of [`calendar_quarter`] over the cleaned `fy_start` and
/// `fq` columns. A null year or a quarter outside 1..=4 yields a null
/// `year_quarter`.
fn year_quarter_expr() -> Expr {
    let fq = col(COL::FIN_QUARTER);
    let is_fq4 = fq.clone().eq(lit(4));
    let cal_q = when(is_fq4.clone())
        .then(lit(1))
        .when(fq.clone().gt_eq(lit(1)).and(fq.clone().lt(lit(4))))
        .then(fq + lit(1))
        .otherwise(lit(NULL));
    let cal_year = col(COL::FIN_YEAR_START) + when(is_fq4).then(lit(1)).otherwise(lit(0));
    concat_str(
        [
            cal_year.cast(DataType::String),
            cal_q.cast(DataType::String),
        ],
        "-q",
        false,
    )
    .alias(COL::YEAR_QUARTER)
}

/// Selects and renames the needed raw columns, coerces value and year/quarter
/// fields to numeric (non-numeric values become null, not an error) and
/// derives the canonical `year_quarter` key.
///
/// Records whose financial year fails to parse, or whose financial quarter is
/// not 1..=4, cannot be placed in the panel; they are dropped here with a
/// logged count rather than failing the run, since the published extract
/// contains non-numeric placeholder rows.
pub fn clean_cases(raw: DataFrame) -> Result<DataFrame> {
    let cleaned = raw
        .lazy()
        .select([
            col(COL::RAW_VOL).cast(DataType::Int64).alias(COL::VOLUME),
            col(COL::RAW_TOTAL_VALUE)
                .cast(DataType::Float64)
                .alias(COL::VALUE),
            // Financial years are reported as e.g. "2012/13"; the first four
            // characters are the calendar year the financial year starts in.
            col(COL::RAW_FIN_YR)
                .cast(DataType::String)
                .str()
                .slice(lit(0), lit(4))
                .cast(DataType::Int32)
                .alias(COL::FIN_YEAR_START),
            col(COL::RAW_FIN_QTR)
                .cast(DataType::Int32)
                .alias(COL::FIN_QUARTER),
            col(COL::RAW_LA_CODE)
                .cast(DataType::String)
                .alias(COL::LA_CODE),
            col(COL::RAW_FIRM_CODE)
                .cast(DataType::String)
                .alias(COL::FIRM_CODE),
        ])
        .with_column(year_quarter_expr())
        .collect()?;

    let unplaceable = cleaned.column(COL::YEAR_QUARTER)?.null_count();
    if unplaceable > 0 {
        warn!("Dropping {unplaceable} case records with unparseable financial year/quarter");
    }
    let cleaned = cleaned
        .lazy()
        .filter(col(COL::YEAR_QUARTER).is_not_null())
        .collect()?;
    debug!("Cleaned case records: {:?}", cleaned.shape());
    Ok(cleaned)
}

/// Aggregates cleaned case records to (quarter, area) facts: summed volume
/// and value plus the count of distinct providers active in the cell.
pub fn la_quarter_totals(clean: &DataFrame) -> Result<DataFrame> {
    Ok(clean
        .clone()
        .lazy()
        .group_by([col(COL::YEAR_QUARTER), col(COL::LA_CODE)])
        .agg([
            col(COL::VOLUME).sum().alias(COL::LA_TOTAL_VOLUME),
            col(COL::VALUE).sum().alias(COL::LA_TOTAL_VALUE),
            col(COL::FIRM_CODE)
                .n_unique()
                .cast(DataType::Int64)
                .alias(COL::UNIQUE_PROVIDERS),
        ])
        .sort([COL::YEAR_QUARTER, COL::LA_CODE], Default::default())
        .collect()?)
}

/// Aggregates cleaned case records by quarter alone, yielding the national
/// totals attached to every row of that quarter later on.
pub fn national_quarter_totals(clean: &DataFrame) -> Result<DataFrame> {
    Ok(clean
        .clone()
        .lazy()
        .group_by([col(COL::YEAR_QUARTER)])
        .agg([
            col(COL::VOLUME).sum().alias(COL::TOTAL_VOLUME),
            col(COL::VALUE).sum().alias(COL::TOTAL_VALUE),
            col(COL::FIRM_CODE)
                .n_unique()
                .cast(DataType::Int64)
                .alias(COL::TOTAL_UNIQUE_PROVIDERS),
        ])
        .sort([COL::YEAR_QUARTER], Default::default())
        .collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_cases() -> DataFrame {
        df!(
            COL::RAW_VOL => &[10i64, 5, 3, 7, 2],
            COL::RAW_TOTAL_VALUE => &["1000.0", "500.5", "not a number", "700.0", "200.0"],
            COL::RAW_FIN_YR => &["2012/13", "2012/13", "2012/13", "2013/14", "2012/13"],
            COL::RAW_FIN_QTR => &[4i64, 4, 1, 1, 4],
            COL::RAW_LA_CODE => &["E06000001", "E06000001", "E06000001", "W06000011", "E06000002"],
            COL::RAW_FIRM_CODE => &["F1", "F2", "F1", "F3", "F1"],
        )
        .unwrap()
    }

    #[test]
    fn fq4_maps_to_q1_of_next_calendar_year() {
        assert_eq!(calendar_quarter(2012, 4).as_deref(), Some("2013-q1"));
        assert_eq!(calendar_quarter(2012, 1).as_deref(), Some("2012-q2"));
        assert_eq!(calendar_quarter(2012, 2).as_deref(), Some("2012-q3"));
        assert_eq!(calendar_quarter(2012, 3).as_deref(), Some("2012-q4"));
        assert_eq!(calendar_quarter(2012, 5), None);
    }

    #[test]
    fn clean_derives_year_quarter() -> Result<()> {
        let clean = clean_cases(raw_cases())?;
        let quarters: Vec<Option<&str>> = clean.column(COL::YEAR_QUARTER)?.str()?.iter().collect();
        assert_eq!(
            quarters,
            vec![
                Some("2013-q1"),
                Some("2013-q1"),
                Some("2012-q2"),
                Some("2013-q2"),
                Some("2013-q1"),
            ]
        );
        Ok(())
    }

    #[test]
    fn non_numeric_value_coerces_to_null() -> Result<()> {
        let clean = clean_cases(raw_cases())?;
        assert_eq!(clean.column(COL::VALUE)?.null_count(), 1);
        Ok(())
    }

    #[test]
    fn unparseable_quarter_rows_are_dropped() -> Result<()> {
        let raw = df!(
            COL::RAW_VOL => &[1i64, 2],
            COL::RAW_TOTAL_VALUE => &[10.0, 20.0],
            COL::RAW_FIN_YR => &["2012/13", "unknown"],
            COL::RAW_FIN_QTR => &[1i64, 2],
            COL::RAW_LA_CODE => &["E06000001", "E06000001"],
            COL::RAW_FIRM_CODE => &["F1", "F1"],
        )?;
        let clean = clean_cases(raw)?;
        assert_eq!(clean.height(), 1);
        Ok(())
    }

    #[test]
    fn out_of_range_quarter_rows_are_dropped() -> Result<()> {
        let raw = df!(
            COL::RAW_VOL => &[1i64, 2, 3],
            COL::RAW_TOTAL_VALUE => &[10.0, 20.0, 30.0],
            COL::RAW_FIN_YR => &["2012/13", "2012/13", "2012/13"],
            COL::RAW_FIN_QTR => &[1i64, 9, 0],
            COL::RAW_LA_CODE => &["E06000001", "E06000001", "E06000001"],
            COL::RAW_FIRM_CODE => &["F1", "F1", "F1"],
        )?;
        let clean = clean_cases(raw)?;
        // No phantom "2012-q10" period; only the in-range quarter survives.
        let quarters: Vec<Option<&str>> = clean.column(COL::YEAR_QUARTER)?.str()?.iter().collect();
        assert_eq!(quarters, vec![Some("2012-q2")]);
        Ok(())
    }

    #[test]
    fn la_totals_sum_and_count_distinct_providers() -> Result<()> {
        let clean = clean_cases(raw_cases())?;
        let totals = la_quarter_totals(&clean)?;

        // One record placed in 2012-q2, one in 2013-q2, three in 2013-q1
        // split across two areas.
        assert_eq!(totals.height(), 4);

        let first_cell = totals
            .clone()
            .lazy()
            .filter(
                col(COL::YEAR_QUARTER)
                    .eq(lit("2013-q1"))
                    .and(col(COL::LA_CODE).eq(lit("E06000001"))),
            )
            .collect()?;
        assert_eq!(
            first_cell.column(COL::LA_TOTAL_VOLUME)?.i64()?.get(0),
            Some(15)
        );
        assert_eq!(
            first_cell.column(COL::LA_TOTAL_VALUE)?.f64()?.get(0),
            Some(1500.5)
        );
        assert_eq!(
            first_cell.column(COL::UNIQUE_PROVIDERS)?.i64()?.get(0),
            Some(2)
        );
        Ok(())
    }

    #[test]
    fn national_totals_cover_all_areas() -> Result<()> {
        let clean = clean_cases(raw_cases())?;
        let national = national_quarter_totals(&clean)?;
        let q1 = national
            .clone()
            .lazy()
            .filter(col(COL::YEAR_QUARTER).eq(lit("2013-q1")))
            .collect()?;
        assert_eq!(q1.column(COL::TOTAL_VOLUME)?.i64()?.get(0), Some(17));
        // F1 and F2 both active nationally in 2013-q1.
        assert_eq!(
            q1.column(COL::TOTAL_UNIQUE_PROVIDERS)?.i64()?.get(0),
            Some(2)
        );
        Ok(())
    }

    #[test]
    fn aggregation_round_trip_preserves_volume() -> Result<()> {
        let clean = clean_cases(raw_cases())?;
        let totals = la_quarter_totals(&clean)?;
        let summed: i64 = totals.column(COL::LA_TOTAL_VOLUME)?.i64()?.sum().unwrap();
        let raw_sum: i64 = clean.column(COL::VOLUME)?.i64()?.sum().unwrap();
        assert_eq!(summed, raw_sum);
        Ok(())
    }
}
