//! Data-integrity checks run between the construction stages.
//!
//! Most checks are diagnostic: they log what diverges and let the run
//! continue (or abort under the strict policy). The final missing-value check
//! is a hard gate; nothing is persisted if it fails.

use std::collections::BTreeSet;

use anyhow::Result;
use log::{info, warn};
use polars::prelude::*;

use crate::error::PanelError;
use crate::COL;

/// Distinct area codes of a table, ordered for deterministic reporting.
pub fn area_code_set(df: &DataFrame) -> Result<BTreeSet<String>> {
    Ok(df
        .column(COL::LA_CODE)?
        .str()?
        .into_iter()
        .flatten()
        .map(|code| code.to_string())
        .collect())
}

/// Checks that every listed table covers exactly the same area codes as the
/// reference table. Divergence is a warning under the observed design and
/// fatal under the strict policy; either way the symmetric difference is
/// named, never silently tolerated.
pub fn check_code_sets(
    reference: (&str, &DataFrame),
    others: &[(&str, &DataFrame)],
    strict: bool,
) -> Result<()> {
    let (reference_name, reference_df) = reference;
    let reference_codes = area_code_set(reference_df)?;
    let mut all_equal = true;
    for (name, df) in others {
        let codes = area_code_set(df)?;
        let difference: Vec<String> = reference_codes
            .symmetric_difference(&codes)
            .cloned()
            .collect();
        if !difference.is_empty() {
            all_equal = false;
            if strict {
                return Err(PanelError::CodeSetMismatch {
                    reference: reference_name.to_string(),
                    other: name.to_string(),
                    difference,
                }
                .into());
            }
            warn!("Area codes diverge between '{reference_name}' and '{name}': {difference:?}");
        }
    }
    if all_equal {
        info!("Area code sets identical across '{reference_name}' and all compared tables");
    }
    Ok(())
}

/// Checks that every proportion-typed column (`prop_*` and the unemployment
/// rate) lies within [0, 1]. Violations are reported and returned, never
/// clamped.
pub fn check_proportion_bounds(df: &DataFrame) -> Result<Vec<String>> {
    let mut violations = Vec::new();
    for series in df.get_columns() {
        let name = series.name();
        if !(name.starts_with("prop_") || name == COL::UNEMPLOYMENT_RATE) {
            continue;
        }
        let values = series.f64()?;
        let below = values.min().map(|min| min < 0.0).unwrap_or(false);
        let above = values.max().map(|max| max > 1.0).unwrap_or(false);
        if below || above {
            warn!("Proportion column '{name}' has values outside [0, 1]");
            violations.push(name.to_string());
        }
    }
    Ok(violations)
}

/// Checks the balancing guarantee: exactly one row per (area, quarter), with
/// |rows| = |areas| x |quarters|.
pub fn check_balanced(panel: &DataFrame, n_areas: usize) -> Result<()> {
    let n_quarters = panel.column(COL::YEAR_QUARTER)?.n_unique()?;
    let expected = n_areas * n_quarters;
    let distinct_cells = panel
        .clone()
        .lazy()
        .select([col(COL::YEAR_QUARTER), col(COL::LA_CODE)])
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?
        .height();
    if panel.height() != expected || distinct_cells != panel.height() {
        return Err(PanelError::Unbalanced {
            expected,
            found: panel.height(),
        }
        .into());
    }
    Ok(())
}

/// The hard gate: the assembled panel must be fully dense. Any column still
/// holding a missing value aborts the run before anything is written.
pub fn check_no_missing(panel: &DataFrame) -> Result<()> {
    let with_nulls: Vec<String> = panel
        .get_columns()
        .iter()
        .filter(|series| series.null_count() > 0)
        .map(|series| series.name().to_string())
        .collect();
    if !with_nulls.is_empty() {
        return Err(PanelError::MissingValues(with_nulls).into());
    }
    info!("No missing values in assembled panel");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_set_divergence_warns_or_fails() -> Result<()> {
        let panel = df!(COL::LA_CODE => &["A", "B", "A"])?;
        let census = df!(COL::LA_CODE => &["A", "C"])?;
        assert!(check_code_sets(("panel", &panel), &[("census", &census)], false).is_ok());
        let err = check_code_sets(("panel", &panel), &[("census", &census)], true).unwrap_err();
        assert!(err.to_string().contains("census"));
        Ok(())
    }

    #[test]
    fn proportion_bounds_flag_but_do_not_clamp() -> Result<()> {
        let census = df!(
            "prop_eth_white" => &[0.5, 1.2],
            "prop_hh_owned" => &[0.3, 0.9],
            "unemployment_rate" => &[0.04, 0.07],
            "residents_total" => &[100.0, 200.0],
        )?;
        let violations = check_proportion_bounds(&census)?;
        assert_eq!(violations, vec!["prop_eth_white".to_string()]);
        // Unchanged: the offending value is still there.
        assert_eq!(census.column("prop_eth_white")?.f64()?.max(), Some(1.2));
        Ok(())
    }

    #[test]
    fn unbalanced_panel_is_detected() -> Result<()> {
        let panel = df!(
            COL::YEAR_QUARTER => &["2010-q1", "2010-q1", "2010-q2"],
            COL::LA_CODE => &["A", "B", "A"],
        )?;
        // Missing (2010-q2, B) cell.
        assert!(check_balanced(&panel, 2).is_err());
        let balanced = df!(
            COL::YEAR_QUARTER => &["2010-q1", "2010-q1", "2010-q2", "2010-q2"],
            COL::LA_CODE => &["A", "B", "A", "B"],
        )?;
        assert!(check_balanced(&balanced, 2).is_ok());
        Ok(())
    }

    #[test]
    fn missing_values_fail_the_hard_gate() -> Result<()> {
        let panel = df!(
            COL::LA_CODE => &["A", "B"],
            "exposure" => &[Some(1.0), None],
        )?;
        let err = check_no_missing(&panel).unwrap_err();
        assert!(err.to_string().contains("exposure"));
        Ok(())
    }
}
