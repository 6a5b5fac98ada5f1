use std::collections::HashMap;

use super::{Cell, Table};

/// Concatenate `tables` in order.
///
/// Headers are the union of every input's headers in first-seen order; a
/// table lacking a column contributes `Cell::Empty` for it.
pub fn merge<I>(tables: I) -> Table
where
    I: IntoIterator<Item = Table>,
{
    let tables: Vec<Table> = tables.into_iter().collect();

    let mut headers: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for t in &tables {
        for h in &t.headers {
            if !positions.contains_key(h) {
                positions.insert(h.clone(), headers.len());
                headers.push(h.clone());
            }
        }
    }

    let total = tables.iter().map(Table::height).sum();
    let mut merged = Table {
        headers,
        rows: Vec::with_capacity(total),
    };
    let width = merged.headers.len();

    for t in tables {
        let targets: Vec<usize> = t.headers.iter().map(|h| positions[h]).collect();
        for row in t.rows {
            let mut out = vec![Cell::Empty; width];
            for (cell, &target) in row.into_iter().zip(&targets) {
                out[target] = cell;
            }
            merged.rows.push(out);
        }
    }

    merged
}
