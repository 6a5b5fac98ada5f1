// src/bin/inspect_sheet.rs
//
// Usage: inspect_sheet <workbook> [sheet] [header_row]

use anyhow::{anyhow, Context, Result};
use ftscraper::{config::MergeConfig, process::load_sheet, process::KeywordFilter};
use std::env;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or_else(|| anyhow!("usage: inspect_sheet <workbook> [sheet] [header_row]"))?;

    let defaults = MergeConfig::default();
    let sheet = args.next().unwrap_or(defaults.sheet);
    let header_row = match args.next() {
        Some(n) => n
            .parse::<usize>()
            .with_context(|| format!("header_row must be a number, got {:?}", n))?,
        None => defaults.header_row,
    };

    let table = load_sheet(&path, &sheet, header_row)?;
    println!("▶ {} [{}] header at row {}", path, sheet, header_row + 1);
    for (i, h) in table.headers.iter().enumerate() {
        println!("  {:>3}  {}", i, h);
    }
    println!("▶ {} data rows", table.height());

    if let Ok(idx) = table.column_index(&defaults.description_column) {
        let filter = KeywordFilter::default();
        let hits = table.rows.iter().filter(|r| filter.matches(&r[idx])).count();
        println!(
            "▶ {} rows match {:?} + any of {:?}",
            hits,
            filter.required(),
            filter.any_of()
        );
    }
    Ok(())
}
