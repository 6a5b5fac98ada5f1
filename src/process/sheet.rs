// src/process/sheet.rs
use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use std::{collections::HashMap, path::Path};
use tracing::{debug, warn};

use super::{Cell, Table, TableError};

/// Load `sheet` from the workbook at `path`.
///
/// The first `header_row` physical rows are skipped, the next row supplies the
/// column names and everything below it is data. Rows and columns are counted
/// from A1, not from the first populated cell.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_sheet<P: AsRef<Path>>(path: P, sheet: &str, header_row: usize) -> Result<Table> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {:?}", path))?;

    let names = workbook.sheet_names();
    if !names.iter().any(|n| n == sheet) {
        return Err(TableError::MissingSheet {
            sheet: sheet.to_string(),
            available: names,
        }
        .into());
    }

    let range = workbook
        .worksheet_range(sheet)
        .with_context(|| format!("Failed to read sheet {:?} in {:?}", sheet, path))?;

    let table = table_from_range(&range, header_row)?;
    debug!(
        columns = table.headers.len(),
        rows = table.height(),
        "sheet loaded"
    );
    Ok(table)
}

fn table_from_range(range: &Range<Data>, header_row: usize) -> Result<Table, TableError> {
    let Some((last_row, last_col)) = range.end() else {
        return Err(TableError::NoHeader(header_row));
    };
    let (last_row, width) = (last_row as usize, last_col as usize + 1);
    if header_row > last_row {
        return Err(TableError::NoHeader(header_row));
    }

    let read_row = |r: usize| -> Vec<Cell> {
        (0..width)
            .map(|c| {
                range
                    .get_value((r as u32, c as u32))
                    .map(Cell::from)
                    .unwrap_or_default()
            })
            .collect()
    };

    let mut table = Table::new(header_names(&read_row(header_row)));
    for r in header_row + 1..=last_row {
        table.push_row(read_row(r));
    }

    while table
        .rows
        .last()
        .is_some_and(|row| row.iter().all(Cell::is_empty))
    {
        table.rows.pop();
    }

    Ok(table)
}

/// Blank headers become `Unnamed: {col}`; repeats get `.1`, `.2`, ... suffixes.
fn header_names(cells: &[Cell]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    cells
        .iter()
        .enumerate()
        .map(|(col, cell)| {
            let base = match cell {
                Cell::Empty => format!("Unnamed: {}", col),
                other => other.to_string(),
            };
            let n = seen.entry(base.clone()).or_insert(0);
            let name = if *n == 0 {
                base
            } else {
                warn!(header = %base, col, "duplicate header renamed");
                format!("{}.{}", base, n)
            };
            *n += 1;
            name
        })
        .collect()
}
