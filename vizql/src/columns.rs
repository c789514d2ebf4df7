//! Extraction of per-column index lists from rendered visuals.
//!
//! A visual lists its columns in `vizDataColumns`; each column points at one
//! or more `(pane, column)` pairs in `paneColumnsList`, where the value,
//! alias and tuple-id indices live.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json::{self, Object};
use crate::zone::PRES_MODEL_MAP;
use crate::Error;

/// The `fn` of the synthetic column carrying tuple ids.
pub const TUPLE_ID_FN: &str = "[system:visual].[tuple_id]";

/// Index lists of one rendered column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicesInfo {
    /// Display label. Absent for tuple-only columns.
    pub field_caption: Option<String>,
    pub data_type: String,
    /// Disambiguates a caption shown under several aggregations.
    #[serde(rename = "fn")]
    pub function: String,
    pub is_auto_select: bool,
    pub tuple_ids: Vec<i64>,
    pub value_indices: Vec<i64>,
    pub alias_indices: Vec<i64>,
}

impl IndicesInfo {
    /// The caption, or an empty string for uncaptioned columns.
    pub fn caption(&self) -> &str {
        self.field_caption.as_deref().unwrap_or_default()
    }

    pub fn is_tuple_column(&self) -> bool {
        self.function == TUPLE_ID_FN
    }
}

/// Which columns to extract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnOptions {
    /// Keep only columns flagged `isAutoSelect`.
    pub select_only: bool,
    /// Keep columns that have no `fieldCaption`.
    pub include_uncaptioned: bool,
}

impl ColumnOptions {
    /// Every column, captioned or not.
    pub fn all() -> Self {
        Self {
            select_only: false,
            include_uncaptioned: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panes {
    All,
    First,
}

fn decode(columns_data: &Object, opts: ColumnOptions, panes: Panes) -> Result<Vec<IndicesInfo>, Error> {
    let mut result = Vec::new();
    for column in json::array(columns_data, "vizDataColumns")? {
        let column = column.as_object().ok_or_else(|| Error::UnexpectedType {
            field: "vizDataColumns".to_string(),
            expected: "object",
        })?;
        let field_caption = json::opt_string(column, "fieldCaption");
        let is_auto_select = json::flag(column, "isAutoSelect");
        if (field_caption.is_none() && !opts.include_uncaptioned) || (opts.select_only && !is_auto_select) {
            continue;
        }
        let pane_indices = json::array(column, "paneIndices")?;
        let column_indices = json::array(column, "columnIndices")?;
        let take = match panes {
            Panes::All => pane_indices.len(),
            Panes::First => 1,
        };
        for (i, pane) in pane_indices.iter().enumerate().take(take) {
            let column_index = column_indices
                .get(i)
                .ok_or_else(|| Error::MissingField(format!("columnIndices[{}]", i)))?;
            let pane_columns = pane_column(
                columns_data,
                json::index(pane, "paneIndices")?,
                json::index(column_index, "columnIndices")?,
            )?;
            result.push(IndicesInfo {
                field_caption: field_caption.clone(),
                data_type: json::opt_string(column, "dataType").unwrap_or_default(),
                function: json::opt_string(column, "fn").unwrap_or_default(),
                is_auto_select,
                tuple_ids: match json::opt_array(pane_columns, "tupleIds") {
                    Some(_) => json::integers(pane_columns, "tupleIds")?,
                    None => Vec::new(),
                },
                value_indices: json::integers(pane_columns, "valueIndices")?,
                alias_indices: json::integers(pane_columns, "aliasIndices")?,
            });
        }
    }
    Ok(result)
}

fn pane_column(columns_data: &Object, pane: usize, column: usize) -> Result<&Object, Error> {
    let pane_obj = json::array(columns_data, "paneColumnsList")?
        .get(pane)
        .and_then(Value::as_object)
        .ok_or_else(|| Error::MissingField(format!("paneColumnsList[{}]", pane)))?;
    json::array(pane_obj, "vizPaneColumns")?
        .get(column)
        .and_then(Value::as_object)
        .ok_or_else(|| Error::MissingField(format!("paneColumnsList[{}].vizPaneColumns[{}]", pane, column)))
}

/// Columns of a worksheet in a viz-data pres-model map. Every pane a column
/// spans yields one entry.
pub fn from_viz_data(
    pres_model_map: &Object,
    worksheet: &str,
    opts: ColumnOptions,
) -> Result<Vec<IndicesInfo>, Error> {
    let sheet = json::path(pres_model_map, PRES_MODEL_MAP)?
        .get(worksheet)
        .and_then(Value::as_object)
        .ok_or_else(|| Error::NoSuchWorksheet(worksheet.to_string()))?;
    let viz = json::path(sheet, &["presModelHolder", "genVizDataPresModel"])?;
    match json::opt_object(viz, "paneColumnsData") {
        Some(columns_data) => decode(columns_data, opts, Panes::All),
        None => Ok(Vec::new()),
    }
}

/// Columns of a zone carrying a rendered visual. Only the first pane of each
/// column is read.
pub fn from_zone(zone: &Object, opts: ColumnOptions) -> Result<Vec<IndicesInfo>, Error> {
    let viz = json::path(zone, &["presModelHolder", "visual", "vizData"])?;
    match json::opt_object(viz, "paneColumnsData") {
        Some(columns_data) => decode(columns_data, opts, Panes::First),
        None => Ok(Vec::new()),
    }
}

/// Columns of the first zone rendering `worksheet`; empty if no zone does.
pub fn from_zones(zones: &[&Object], worksheet: &str, opts: ColumnOptions) -> Result<Vec<IndicesInfo>, Error> {
    match zones
        .iter()
        .find(|zone| crate::zone::worksheet(zone) == Some(worksheet))
    {
        Some(zone) => from_zone(zone, opts),
        None => Ok(Vec::new()),
    }
}

/// Whether a zone's visual carries column data at all.
pub fn has_columns(zone: &Object) -> bool {
    json::opt_path(zone, &["presModelHolder", "visual", "vizData", "paneColumnsData"]).is_some()
}

/// Captioned columns of an underlying or summary data table.
pub fn from_table(columns: &[Value]) -> Result<Vec<IndicesInfo>, Error> {
    columns
        .iter()
        .filter_map(Value::as_object)
        .filter(|column| json::opt_string(column, "fieldCaption").is_some())
        .map(|column| {
            Ok(IndicesInfo {
                field_caption: json::opt_string(column, "fieldCaption"),
                data_type: json::string(column, "dataType")?,
                function: json::opt_string(column, "fn").unwrap_or_default(),
                is_auto_select: false,
                tuple_ids: Vec::new(),
                value_indices: json::integers(column, "valueIndices")?,
                alias_indices: json::integers(column, "aliasIndices")?,
            })
        })
        .collect()
}
