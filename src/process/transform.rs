use std::collections::BTreeMap;
use tracing::debug;

use super::{Cell, KeywordFilter, Table, TableError};
use crate::config::MergeConfig;

/// Column edits and row filter applied to every loaded sheet.
#[derive(Debug, Clone)]
pub struct TransformRules {
    pub rename: BTreeMap<String, String>,
    pub drop: Vec<String>,
    pub description_column: String,
    pub month_column: String,
    pub filter: KeywordFilter,
}

impl From<&MergeConfig> for TransformRules {
    fn from(cfg: &MergeConfig) -> Self {
        Self {
            rename: cfg.rename.clone(),
            drop: cfg.drop.clone(),
            description_column: cfg.description_column.clone(),
            month_column: cfg.month_column.clone(),
            filter: cfg.filter.clone(),
        }
    }
}

impl Default for TransformRules {
    fn default() -> Self {
        Self::from(&MergeConfig::default())
    }
}

/// Rename, drop, filter on the description column, then tag with `month`.
pub fn transform(mut table: Table, rules: &TransformRules, month: &str) -> Result<Table, TableError> {
    for (from, to) in &rules.rename {
        table.rename_column(from, to);
    }
    for col in &rules.drop {
        table.drop_column(col)?;
    }

    let before = table.height();
    table.retain_rows(&rules.description_column, |cell| rules.filter.matches(cell))?;
    debug!(month, before, kept = table.height(), "filtered rows");

    table.set_constant_column(&rules.month_column, Cell::Text(month.to_string()));
    Ok(table)
}
