//! Index arguments for select and filter commands.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::Filter;
use crate::json;
use crate::Error;

/// Marks a selected value that is not among a filter's values.
const NOT_FOUND: i64 = -1;

/// How a filter request treats the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// The requested values become the whole selection.
    Replace,
    /// The requested values are added and the rest of the current selection
    /// is explicitly removed.
    Delta,
}

impl Default for FilterMode {
    fn default() -> Self {
        Self::Replace
    }
}

/// Positions to add to and remove from a filter's selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterIndices {
    pub add: Vec<i64>,
    pub remove: Vec<i64>,
}

impl FilterIndices {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

fn position<T, F>(items: &[T], matches: F) -> Option<i64>
where
    F: Fn(&T) -> bool,
{
    items
        .iter()
        .position(matches)
        .and_then(|pos| i64::try_from(pos).ok())
}

/// The index a select command needs for `value` in `column`.
///
/// A column is tuple addressed when one of its tuple-id lists is at least as
/// long as its selectable values; the tuple id at the value's position is
/// returned from the first such list. Otherwise the 1-based position is.
pub fn resolve_select_index(
    column: &str,
    value: &str,
    tuple_ids: &[Vec<i64>],
    selectable: &[Value],
) -> Result<i64, Error> {
    let pos = selectable
        .iter()
        .position(|v| json::content(v) == value)
        .ok_or_else(|| Error::value_not_found(value, format!("column {}", column)))?;
    match tuple_ids.iter().find(|ids| ids.len() >= selectable.len()) {
        Some(ids) => ids
            .get(pos)
            .copied()
            .ok_or_else(|| Error::value_not_found(value, format!("tuple ids of column {}", column))),
        None => i64::try_from(pos + 1)
            .map_err(|_| Error::value_not_found(value, format!("column {}", column))),
    }
}

/// Positions in `filter.values` that are currently selected. Selected
/// values missing from the list map to `-1`.
pub fn selected_positions(filter: &Filter) -> Vec<i64> {
    if !filter.selection.is_empty() {
        return filter
            .selection
            .iter()
            .map(|s| position(&filter.values, |v| v == s).unwrap_or(NOT_FOUND))
            .collect();
    }
    filter
        .selection_alt
        .first()
        .map(|alt| {
            alt.domain_tables
                .iter()
                .filter(|entry| entry.is_selected)
                .map(|entry| position(&filter.values, |v| *v == entry.label).unwrap_or(NOT_FOUND))
                .collect()
        })
        .unwrap_or_default()
}

/// The index arguments of a filter command requesting `values`.
pub fn resolve_filter_indices<S>(filter: &Filter, values: &[S], mode: FilterMode) -> Result<FilterIndices, Error>
where
    S: AsRef<str>,
{
    let add = values
        .iter()
        .map(|value| {
            position(&filter.values, |v| v == value.as_ref()).ok_or_else(|| {
                Error::value_not_found(value.as_ref(), format!("filter {}", filter.column))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut remove = Vec::new();
    if mode == FilterMode::Delta {
        for pos in selected_positions(filter) {
            if pos != NOT_FOUND && !add.contains(&pos) && !remove.contains(&pos) {
                remove.push(pos);
            }
        }
    }
    Ok(FilterIndices { add, remove })
}
