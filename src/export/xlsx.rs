use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::{io::Write, path::Path};
use tracing::{debug, info};

use super::{commit, staging_file};
use crate::process::{Cell, Table};

/// Append `table` below the last used row of `sheet` in the workbook at `path`.
///
/// Every other sheet in an existing workbook is carried over by value. The
/// header row is written only when `sheet` is new or empty, so repeated runs
/// accumulate rows under one header. A missing workbook is created.
/// Cell formatting and formulas of carried-over sheets are not preserved.
pub fn append_xlsx<P: AsRef<Path>>(table: &Table, path: P, sheet: &str) -> Result<()> {
    let path = path.as_ref();
    let existing: Vec<(String, Range<Data>)> = if path.exists() {
        let mut workbook = open_workbook_auto(path)
            .with_context(|| format!("Failed to open workbook: {:?}", path))?;
        workbook.worksheets()
    } else {
        Vec::new()
    };

    let mut book = Workbook::new();
    let mut appended = false;
    for (name, range) in &existing {
        let ws = book.add_worksheet();
        ws.set_name(name)
            .with_context(|| format!("naming sheet {:?}", name))?;
        copy_range(ws, range).with_context(|| format!("copying sheet {:?}", name))?;

        if name == sheet {
            let next_row = range.end().map_or(0, |(r, _)| r + 1);
            write_table(ws, table, next_row, range.is_empty())?;
            appended = true;
        }
    }
    if !appended {
        let ws = book.add_worksheet();
        ws.set_name(sheet)
            .with_context(|| format!("naming sheet {:?}", sheet))?;
        write_table(ws, table, 0, true)?;
        debug!(sheet, "created sheet");
    }

    let bytes = book.save_to_buffer().context("serialising workbook")?;
    let mut tmp = staging_file(path)?;
    tmp.write_all(&bytes)
        .with_context(|| format!("writing workbook for {:?}", path))?;
    commit(tmp, path)?;

    info!(
        path = %path.display(),
        sheet,
        rows = table.height(),
        sheets = existing.len().max(1),
        "appended xlsx"
    );
    Ok(())
}

fn column(col: usize) -> Result<u16> {
    u16::try_from(col).with_context(|| format!("column {} is beyond the sheet width", col))
}

fn row_number(row: usize) -> Result<u32> {
    u32::try_from(row).with_context(|| format!("row {} is beyond the sheet height", row))
}

fn copy_range(ws: &mut Worksheet, range: &Range<Data>) -> Result<()> {
    let (r0, c0) = range.start().unwrap_or((0, 0));
    for (r, c, value) in range.used_cells() {
        let row = r0 + row_number(r)?;
        let col = column(c0 as usize + c)?;
        match value {
            Data::Empty | Data::Error(_) => {}
            Data::String(s) => {
                ws.write_string(row, col, s)?;
            }
            Data::Float(f) => {
                ws.write_number(row, col, *f)?;
            }
            Data::Int(i) => {
                ws.write_number(row, col, *i as f64)?;
            }
            Data::Bool(b) => {
                ws.write_boolean(row, col, *b)?;
            }
            Data::DateTime(dt) => {
                ws.write_number(row, col, dt.as_f64())?;
            }
            other => {
                ws.write_string(row, col, other.to_string())?;
            }
        }
    }
    Ok(())
}

fn write_table(ws: &mut Worksheet, table: &Table, first_row: u32, with_header: bool) -> Result<()> {
    let mut row = first_row;
    if with_header {
        for (c, name) in table.headers.iter().enumerate() {
            ws.write_string(row, column(c)?, name)?;
        }
        row += 1;
    }
    for cells in &table.rows {
        for (c, cell) in cells.iter().enumerate() {
            let col = column(c)?;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) | Cell::Other(s) => {
                    ws.write_string(row, col, s)?;
                }
                Cell::Int(i) => {
                    ws.write_number(row, col, *i as f64)?;
                }
                Cell::Float(f) => {
                    ws.write_number(row, col, *f)?;
                }
                Cell::Bool(b) => {
                    ws.write_boolean(row, col, *b)?;
                }
            }
        }
        row += 1;
    }
    Ok(())
}
