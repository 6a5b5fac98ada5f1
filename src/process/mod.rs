// src/process/mod.rs
use std::fmt;
use thiserror::Error;

pub mod filter;
pub mod merge;
pub mod sheet;
pub mod transform;

#[cfg(test)]
pub(crate) mod fixture;

pub use filter::KeywordFilter;
pub use merge::merge;
pub use sheet::load_sheet;
pub use transform::{transform, TransformRules};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TableError {
    #[error("sheet {sheet:?} not found (available: {available:?})")]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },
    #[error("column {0:?} not found")]
    MissingColumn(String),
    #[error("no header row at row {0}")]
    NoHeader(usize),
}

/// A single spreadsheet value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Dates, durations and other values that only survive as display text.
    Other(String),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<&calamine::Data> for Cell {
    fn from(d: &calamine::Data) -> Self {
        use calamine::Data;
        match d {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::Bool(b) => Cell::Bool(*b),
            other => Cell::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) | Cell::Other(s) => f.write_str(s),
            Cell::Int(i) => write!(f, "{}", i),
            // spreadsheets store every number as a float
            Cell::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
        }
    }
}

/// Headers plus rows; every row holds exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Push a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.headers.len(), Cell::Empty);
        self.rows.push(row);
    }

    /// Renames `from` to `to`. Absent columns are left alone.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        for h in self.headers.iter_mut().filter(|h| h.as_str() == from) {
            *h = to.to_string();
        }
    }

    /// Removes every column called `name`; errors if there is none.
    pub fn drop_column(&mut self, name: &str) -> Result<(), TableError> {
        let keep: Vec<bool> = self.headers.iter().map(|h| h != name).collect();
        if keep.iter().all(|k| *k) {
            return Err(TableError::MissingColumn(name.to_string()));
        }
        let mut flags = keep.iter();
        self.headers.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
        Ok(())
    }

    pub fn retain_rows<F>(&mut self, column: &str, mut keep: F) -> Result<(), TableError>
    where
        F: FnMut(&Cell) -> bool,
    {
        let idx = self.column_index(column)?;
        self.rows.retain(|row| keep(&row[idx]));
        Ok(())
    }

    /// Fill column `name` with `value` in every row, overwriting it in place
    /// when it already exists and appending it otherwise.
    pub fn set_constant_column(&mut self, name: &str, value: Cell) {
        let targets: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.as_str() == name)
            .map(|(i, _)| i)
            .collect();
        if targets.is_empty() {
            self.headers.push(name.to_string());
            for row in &mut self.rows {
                row.push(value.clone());
            }
            return;
        }
        for row in &mut self.rows {
            for &i in &targets {
                row[i] = value.clone();
            }
        }
    }

    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Cell>, TableError> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn sample() -> Table {
        let mut t = Table::new(vec!["HSCode".into(), "Description".into(), "Value".into()]);
        t.push_row(vec![Cell::Float(8703.0), text("Electric car"), Cell::Float(12.5)]);
        t.push_row(vec![Cell::Float(8711.0), text("Motorbike")]);
        t
    }

    #[test]
    fn push_row_pads_short_rows() {
        let t = sample();
        assert_eq!(t.rows[1].len(), 3);
        assert!(t.rows[1][2].is_empty());
    }

    #[test]
    fn rename_then_drop() {
        let mut t = sample();
        t.rename_column("HSCode", "Sn No");
        t.rename_column("NotThere", "Whatever");
        t.drop_column("Sn No").unwrap();
        assert_eq!(t.headers, vec!["Description", "Value"]);
        assert_eq!(t.rows[0], vec![text("Electric car"), Cell::Float(12.5)]);
        assert_eq!(
            t.drop_column("HSCode"),
            Err(TableError::MissingColumn("HSCode".into()))
        );
    }

    #[test]
    fn drop_removes_every_column_with_the_name() {
        let mut t = Table::new(vec!["Sn No".into(), "HSCode".into(), "Description".into()]);
        t.push_row(vec![Cell::Float(1.0), Cell::Float(87038010.0), text("Electric car")]);
        t.rename_column("HSCode", "Sn No");
        t.drop_column("Sn No").unwrap();
        assert_eq!(t.headers, vec!["Description"]);
        assert_eq!(t.rows[0], vec![text("Electric car")]);
    }

    #[test]
    fn constant_column_fills_every_row() {
        let mut t = sample();
        t.set_constant_column("Month", text("magh"));
        let months: Vec<_> = t.column("Month").unwrap().cloned().collect();
        assert_eq!(months, vec![text("magh"), text("magh")]);
    }

    #[test]
    fn constant_column_overwrites_existing() {
        let mut t = Table::new(vec!["Description".into(), "Month".into()]);
        t.push_row(vec![text("Electric bus"), text("2080-07")]);
        t.set_constant_column("Month", text("kartik"));
        assert_eq!(t.headers, vec!["Description", "Month"]);
        assert_eq!(t.rows[0], vec![text("Electric bus"), text("kartik")]);
    }

    #[test]
    fn display_matches_spreadsheet_rendering() {
        assert_eq!(Cell::Float(8703.0).to_string(), "8703");
        assert_eq!(Cell::Float(0.25).to_string(), "0.25");
        assert_eq!(Cell::Int(-4).to_string(), "-4");
        assert_eq!(Cell::Empty.to_string(), "");
        assert_eq!(Cell::Bool(true).to_string(), "True");
    }
}
