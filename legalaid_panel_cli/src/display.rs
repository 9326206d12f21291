use comfy_table::{presets::NOTHING, *};
use itertools::izip;
use polars::frame::DataFrame;
use polars::prelude::{ChunkAgg, DataType, Series};

use legalaid_panel::COL;

/// The desert flag is `Int32` when the panel comes straight from the
/// pipeline but `Int64` after a CSV round-trip; normalize before unpacking.
fn desert_flags(panel: &DataFrame) -> anyhow::Result<Series> {
    Ok(panel.column(COL::DESERT)?.cast(&DataType::Int64)?)
}

fn horizontal_rules(table: &mut Table) {
    table
        .set_style(comfy_table::TableComponent::BottomBorder, '─')
        .set_style(comfy_table::TableComponent::MiddleHeaderIntersections, '─')
        .set_style(comfy_table::TableComponent::HeaderLines, '─')
        .set_style(comfy_table::TableComponent::BottomBorderIntersections, '─')
        .set_style(comfy_table::TableComponent::TopBorder, '─')
        .set_style(comfy_table::TableComponent::TopBorderIntersections, '─');
}

/// Prints headline figures for an assembled panel.
pub fn display_panel_summary(panel: &DataFrame) -> anyhow::Result<()> {
    let n_areas = panel.column(COL::LA_CODE)?.n_unique()?;
    let n_quarters = panel.column(COL::YEAR_QUARTER)?.n_unique()?;
    let quarters = panel.column(COL::YEAR_QUARTER)?.str()?;
    let first_quarter = quarters.into_iter().flatten().min().unwrap_or_default();
    let last_quarter = quarters.into_iter().flatten().max().unwrap_or_default();
    let total_volume = panel.column(COL::LA_TOTAL_VOLUME)?.i64()?.sum().unwrap_or(0);
    let desert_share = desert_flags(panel)?.i64()?.mean().unwrap_or(0.0);

    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);
    horizontal_rules(&mut table);
    table
        .add_row(vec![
            Cell::new("Rows").add_attribute(Attribute::Bold),
            panel.height().to_string().into(),
        ])
        .add_row(vec![
            Cell::new("Local authorities").add_attribute(Attribute::Bold),
            n_areas.to_string().into(),
        ])
        .add_row(vec![
            Cell::new("Quarters").add_attribute(Attribute::Bold),
            n_quarters.to_string().into(),
        ])
        .add_row(vec![
            Cell::new("First quarter").add_attribute(Attribute::Bold),
            first_quarter.into(),
        ])
        .add_row(vec![
            Cell::new("Last quarter").add_attribute(Attribute::Bold),
            last_quarter.into(),
        ])
        .add_row(vec![
            Cell::new("Total case volume").add_attribute(Attribute::Bold),
            total_volume.to_string().into(),
        ])
        .add_row(vec![
            Cell::new("Desert cell share").add_attribute(Attribute::Bold),
            format!("{desert_share:.3}").into(),
        ]);
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    println!("\n{}", table);
    Ok(())
}

/// Prints panel rows, one line per (area, quarter) cell.
pub fn display_panel_rows(panel: DataFrame, max_results: Option<usize>) -> anyhow::Result<()> {
    let df_to_show = match max_results {
        Some(max) => panel.head(Some(max)),
        None => panel,
    };
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Quarter").add_attribute(Attribute::Bold),
            Cell::new("LA code").add_attribute(Attribute::Bold),
            Cell::new("Local authority").add_attribute(Attribute::Bold),
            Cell::new("Volume").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
            Cell::new("Providers").add_attribute(Attribute::Bold),
            Cell::new("Desert").add_attribute(Attribute::Bold),
        ]);
    horizontal_rules(&mut table);
    let deserts = desert_flags(&df_to_show)?;
    for (quarter, code, name, volume, value, providers, desert) in izip!(
        df_to_show.column(COL::YEAR_QUARTER)?.str()?,
        df_to_show.column(COL::LA_CODE)?.str()?,
        df_to_show.column(COL::LA_NAME)?.str()?,
        df_to_show.column(COL::LA_TOTAL_VOLUME)?.i64()?,
        df_to_show.column(COL::LA_TOTAL_VALUE)?.f64()?,
        df_to_show.column(COL::UNIQUE_PROVIDERS)?.i64()?,
        deserts.i64()?,
    ) {
        table.add_row(vec![
            quarter.unwrap_or_default().to_string(),
            code.unwrap_or_default().to_string(),
            name.unwrap_or_default().to_string(),
            volume.unwrap_or_default().to_string(),
            format!("{:.2}", value.unwrap_or_default()),
            providers.unwrap_or_default().to_string(),
            desert.unwrap_or_default().to_string(),
        ]);
    }
    println!("\n{}", table);
    Ok(())
}

#[cfg(test)]
mod tests {
    use legalaid_panel::sources::read_csv;
    use polars::prelude::*;

    use super::*;

    fn panel() -> DataFrame {
        df!(
            COL::YEAR_QUARTER => &["2012-q3", "2012-q3"],
            COL::LA_CODE => &["E06000001", "W06000011"],
            COL::LA_NAME => &["Hartlepool", "Swansea"],
            COL::LA_TOTAL_VOLUME => &[10i64, 0],
            COL::LA_TOTAL_VALUE => &[100.0, 0.0],
            COL::UNIQUE_PROVIDERS => &[2i64, 0],
            COL::DESERT => &[0i32, 1],
        )
        .unwrap()
    }

    #[test]
    fn display_handles_csv_round_tripped_panel() -> anyhow::Result<()> {
        let mut panel = panel();
        let file = tempfile::NamedTempFile::new()?;
        let mut handle = std::fs::File::create(file.path())?;
        CsvWriter::new(&mut handle)
            .include_header(true)
            .finish(&mut panel)?;

        // CSV inference widens the desert flag to Int64.
        let reread = read_csv(file.path())?;
        assert_eq!(reread.column(COL::DESERT)?.dtype(), &DataType::Int64);
        display_panel_rows(reread.clone(), None)?;
        display_panel_summary(&reread)?;
        Ok(())
    }

    #[test]
    fn display_handles_in_memory_panel() -> anyhow::Result<()> {
        let panel = panel();
        display_panel_rows(panel.clone(), Some(1))?;
        display_panel_summary(&panel)?;
        Ok(())
    }
}
