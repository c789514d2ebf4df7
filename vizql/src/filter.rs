//! Filter descriptors.
//!
//! Worksheet zones embed their filters as a JSON string (`filtersJson`)
//! holding a list of filter tables. Categorical quick-filter zones carry an
//! alternate view of the same selection (`domainTables`), matched to a
//! filter by its global field name.

use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json::{self, Object};
use crate::locate::{self, PresModel};
use crate::zone::{self, MAX_STORY_DEPTH};
use crate::Error;

/// Selection value appended when every value of a filter is checked.
pub const ALL: &str = "all";

/// One entry of a categorical filter's domain table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEntry {
    pub label: String,
    pub is_selected: bool,
}

/// The state of a categorical quick-filter widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFilter {
    #[serde(rename = "fn")]
    pub field: String,
    pub column_full_names: Vec<String>,
    pub domain_tables: Vec<DomainEntry>,
}

/// Where a filter found inside a story point lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryScope {
    pub storyboard: String,
    pub dashboard: String,
    pub storyboard_id: String,
}

/// A filter applicable to a worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub column: String,
    pub ordinal: i64,
    pub values: Vec<String>,
    /// `[datasource].[field]`; identifies the filter on the server.
    pub global_field_name: String,
    pub selection: Vec<String>,
    pub selection_alt: Vec<SelectedFilter>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub scope: Option<StoryScope>,
}

/// Filters per worksheet, in worksheet order.
pub type FilterMap = IndexMap<String, Vec<Filter>>;

fn categorical_filter(zone: &Object) -> Option<&Object> {
    json::opt_path(
        zone,
        &[
            "presModelHolder",
            "quickFilterDisplay",
            "quickFilter",
            "categoricalFilter",
        ],
    )
}

fn decode_selected(filter: &Object) -> Result<SelectedFilter, Error> {
    let column_full_names = json::array(filter, "columnFullNames")?
        .iter()
        .map(json::content)
        .collect();
    let domain_tables = json::array(filter, "domainTables")?
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| DomainEntry {
            label: json::opt_string(entry, "label").unwrap_or_default(),
            is_selected: json::flag(entry, "isSelected"),
        })
        .collect();
    Ok(SelectedFilter {
        field: json::string(filter, "fn")?,
        column_full_names,
        domain_tables,
    })
}

fn collect_selected(zone_map: &Object, worksheet: &str, depth: usize) -> Result<Vec<SelectedFilter>, Error> {
    let direct = json::entries(zone_map)
        .map(|(_, zone)| zone)
        .filter(|zone| zone::worksheet(zone) == Some(worksheet))
        .filter_map(categorical_filter)
        .map(decode_selected)
        .collect::<Result<Vec<_>, _>>()?;
    if !direct.is_empty() || depth >= MAX_STORY_DEPTH {
        return Ok(direct);
    }
    let points = match zone::story_points(zone_map) {
        Some(points) => points,
        None => return Ok(direct),
    };
    let mut nested = Vec::new();
    for (_, point) in json::entries(points) {
        nested.extend(collect_selected(zone::dashboard_zones(point)?, worksheet, depth + 1)?);
    }
    Ok(nested)
}

/// Categorical quick-filter state for a worksheet. When the top-level zones
/// have none, the dashboards of every story point are searched.
pub fn selected_filters(zone_map: &Object, worksheet: &str) -> Result<Vec<SelectedFilter>, Error> {
    collect_selected(zone_map, worksheet, 0)
}

/// Decoded `filtersJson` tables of every zone rendering `worksheet`.
pub fn filter_tables(zone_map: &Object, worksheet: &str) -> Result<Vec<Object>, Error> {
    let mut tables = Vec::new();
    for (_, zone) in json::entries(zone_map) {
        if zone::worksheet(zone) != Some(worksheet) {
            continue;
        }
        let raw = match json::opt_path(zone, &["presModelHolder", "visual"])
            .and_then(|visual| json::opt_string(visual, "filtersJson"))
        {
            Some(raw) => raw,
            None => continue,
        };
        tables.extend(serde_json::from_str::<Vec<Object>>(&raw)?);
    }
    Ok(tables)
}

fn first_value(tuple: &Object) -> Option<&Object> {
    json::opt_array(tuple, "t")
        .and_then(|t| t.first())
        .and_then(Value::as_object)
}

/// Turns filter tables into one [`Filter`] per schema column.
pub fn process_filters(tables: &[Object], selected: &[SelectedFilter]) -> Result<Vec<Filter>, Error> {
    let mut result = Vec::new();
    for entry in tables {
        let table = match json::opt_object(entry, "table") {
            Some(table) => table,
            None => continue,
        };
        let (schema, tuples) = match (json::opt_array(table, "schema"), json::opt_array(table, "tuples")) {
            (Some(schema), Some(tuples)) => (schema, tuples),
            _ => continue,
        };

        let mut values = Vec::new();
        let mut selection = Vec::new();
        for tuple in tuples.iter().filter_map(Value::as_object) {
            if let Some(first) = first_value(tuple) {
                let value = json::string(first, "v")?;
                if tuple.get("s").and_then(Value::as_bool) == Some(true) {
                    selection.push(value.clone());
                }
                values.push(value);
            }
        }
        if json::flag(entry, "all") || json::flag(entry, "allChecked") {
            selection = values.clone();
            selection.push(ALL.to_string());
        }

        for column in schema.iter().filter_map(Value::as_object) {
            let name = json::array(column, "name")?;
            let part = |i: usize| {
                name.get(i)
                    .map(json::content)
                    .ok_or_else(|| Error::MissingField(format!("schema.name[{}]", i)))
            };
            let global_field_name = format!("[{}].[{}]", part(0)?, part(1)?);
            let selection_alt = selected
                .iter()
                .filter(|s| s.field == global_field_name)
                .cloned()
                .collect();
            result.push(Filter {
                column: json::string(column, "caption")?,
                ordinal: json::integer(json::field(column, "ordinal")?, "ordinal")?,
                values: values.clone(),
                global_field_name,
                selection: selection.clone(),
                selection_alt,
                scope: None,
            });
        }
    }
    Ok(result)
}

fn story_scope(point: &Object, root_dashboard: &str) -> Result<Option<StoryScope>, Error> {
    let storyboard_id = json::string(point, "storyPointId")?;
    let dashboard_pm = json::object(point, "dashboardPresModel")?;
    if let Some(sheet_path) = json::opt_object(dashboard_pm, "sheetPath") {
        let dashboard = if json::flag(sheet_path, "isDashboard") {
            json::string(sheet_path, "sheetName")?
        } else {
            root_dashboard.to_string()
        };
        return Ok(Some(StoryScope {
            storyboard: json::string(sheet_path, "storyboard")?,
            dashboard,
            storyboard_id,
        }));
    }
    let visual_ids = match dashboard_pm.get("visualIds") {
        Some(Value::Array(ids)) => ids.first().and_then(Value::as_object),
        Some(Value::Object(ids)) => Some(ids),
        _ => None,
    };
    match visual_ids {
        Some(ids) => Ok(Some(StoryScope {
            storyboard: json::string(ids, "storyboard")?,
            dashboard: json::string(ids, "dashboard")?,
            storyboard_id,
        })),
        None => Ok(None),
    }
}

/// Filters of a worksheet within a zone map. When the worksheet has no
/// direct filter widgets, filters are collected from every story point and
/// tagged with its scope.
pub fn list_filters(zone_map: &Object, worksheet: &str, root_dashboard: &str) -> Result<Vec<Filter>, Error> {
    let selected = selected_filters(zone_map, worksheet)?;
    let tables = filter_tables(zone_map, worksheet)?;
    if !tables.is_empty() {
        return process_filters(&tables, &selected);
    }
    let points = match zone::story_points(zone_map) {
        Some(points) => points,
        None => return Ok(Vec::new()),
    };

    let mut result = Vec::new();
    for (key, point) in json::entries(points) {
        let scope = match story_scope(point, root_dashboard)? {
            Some(scope) => scope,
            None => {
                warn!("Story point {} has neither sheetPath nor visualIds, skipping", key);
                continue;
            }
        };
        let tables = filter_tables(zone::dashboard_zones(point)?, worksheet)?;
        result.extend(process_filters(&tables, &selected)?.into_iter().map(|filter| Filter {
            scope: Some(scope.clone()),
            ..filter
        }));
    }
    Ok(result)
}

fn filters_for(pm: PresModel<'_>, layout: &Object, root_dashboard: &str) -> Result<FilterMap, Error> {
    let zones = match zone::zone_map(layout) {
        Some(zones) => zones,
        None => {
            debug!("No zones to read filters from");
            return Ok(FilterMap::new());
        }
    };
    let mut result = FilterMap::new();
    for worksheet in zone::worksheet_names(pm)? {
        let filters = list_filters(zones, &worksheet, root_dashboard)?;
        result.insert(worksheet, filters);
    }
    Ok(result)
}

/// Filters of every worksheet of a bootstrap pair. Filter widgets are always
/// read from the `info` layout.
pub fn filters_for_bootstrap(info: &Object, data: &Object, root_dashboard: &str) -> Result<FilterMap, Error> {
    let layout = match locate::viz_info(info) {
        Some(layout) => layout,
        None => return Ok(FilterMap::new()),
    };
    let pm = locate::locate_bootstrap(info, data).unwrap_or(PresModel::VizInfo(layout));
    filters_for(pm, layout, root_dashboard)
}

/// Filters of every worksheet of a command response's application pres model.
pub fn filters_for_command_response(pm: &Object, root_dashboard: &str) -> Result<FilterMap, Error> {
    filters_for(PresModel::CommandResponse(pm), pm, root_dashboard)
}
