//! Worksheet views assembled from a document and the session state.

use std::sync::Arc;

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::columns::{self, ColumnOptions, IndicesInfo};
use crate::dictionary::{self, Columns, DataDictionary, FullData};
use crate::json::{self, Object};
use crate::locate::{self, PresModel};
use crate::parameter;
use crate::session::SessionState;
use crate::zone::{self, ZoneKind, PRES_MODEL_MAP};
use crate::Error;

/// Resolved columns laid out as rows. Shorter columns are padded with
/// `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn from_columns(columns: &Columns) -> Self {
        let height = columns.values().map(Vec::len).max().unwrap_or(0);
        let rows = (0..height)
            .map(|i| {
                columns
                    .values()
                    .map(|values| values.get(i).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self {
            columns: columns.keys().cloned().collect(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A column and the values a user can select in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectableItem {
    pub column: String,
    pub values: Vec<Value>,
}

/// A rendered worksheet.
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    columns: Vec<IndicesInfo>,
    full: Arc<FullData>,
}

impl Worksheet {
    pub fn new<S: AsRef<str>>(name: S, columns: Vec<IndicesInfo>, full: Arc<FullData>) -> Self {
        Self {
            name: name.as_ref().to_string(),
            columns,
            full,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn captioned(&self) -> impl Iterator<Item = &IndicesInfo> {
        self.columns.iter().filter(|c| c.field_caption.is_some())
    }

    /// Captions of the worksheet's columns, without repeats.
    pub fn columns(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caption in self.captioned().map(IndicesInfo::caption) {
            if !names.iter().any(|n| n == caption) {
                names.push(caption.to_string());
            }
        }
        names
    }

    /// Captions of the columns the server marks as selectable.
    pub fn auto_select_columns(&self) -> Vec<String> {
        self.captioned()
            .filter(|c| c.is_auto_select)
            .map(|c| c.caption().to_string())
            .collect()
    }

    fn values_of(&self, info: &IndicesInfo) -> Vec<Value> {
        dictionary::resolve_columns(&self.full, std::slice::from_ref(info))
            .into_iter()
            .next()
            .map(|(_, values)| values)
            .unwrap_or_default()
    }

    pub fn selectable_items(&self) -> Vec<SelectableItem> {
        self.captioned()
            .map(|info| SelectableItem {
                column: info.caption().to_string(),
                values: self.values_of(info),
            })
            .collect()
    }

    /// Values of the first column captioned `column`.
    pub fn selectable_values(&self, column: &str) -> Result<Vec<Value>, Error> {
        self.captioned()
            .find(|info| info.caption() == column)
            .map(|info| self.values_of(info))
            .ok_or_else(|| Error::NoSuchColumn {
                worksheet: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Tuple-id lists of the worksheet's tuple columns.
    pub fn tuple_ids(&self) -> Vec<Vec<i64>> {
        self.columns
            .iter()
            .filter(|c| c.is_tuple_column())
            .map(|c| c.tuple_ids.clone())
            .collect()
    }

    /// Every captioned column resolved to literal values.
    pub fn data(&self) -> Columns {
        let captioned = self.captioned().cloned().collect::<Vec<_>>();
        dictionary::resolve_columns(&self.full, &captioned)
    }

    pub fn table(&self) -> Table {
        Table::from_columns(&self.data())
    }
}

/// The worksheets rendered by one document.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    pub fn new(worksheets: Vec<Worksheet>) -> Self {
        Self { worksheets }
    }

    /// Worksheets of a bootstrap pair.
    pub fn from_bootstrap(info: &Object, data: &Object, session: &SessionState) -> Result<Self, Error> {
        match locate::locate_bootstrap(info, data) {
            Some(PresModel::VizData(map)) => Self::from_viz_data(map, session.dictionary()),
            Some(PresModel::VizInfo(pm)) => Self::from_viz_info(pm, data, session.dictionary()),
            _ => {
                debug!("Bootstrap pair describes no workbook");
                Ok(Self::default())
            }
        }
    }

    fn from_viz_data(map: &Object, dict: &DataDictionary) -> Result<Self, Error> {
        let full = Arc::new(FullData::build(dictionary::bootstrap_segments(map), dict)?);
        let worksheets = json::path(map, PRES_MODEL_MAP)?
            .keys()
            .map(|name| {
                let columns = columns::from_viz_data(map, name, ColumnOptions::all())?;
                Ok(Worksheet::new(name, columns, Arc::clone(&full)))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self::new(worksheets))
    }

    fn from_viz_info(pm: &Object, data: &Object, dict: &DataDictionary) -> Result<Self, Error> {
        let own = dictionary::bootstrap_segments(pm)
            .or_else(|| locate::pres_model_map(data).and_then(dictionary::bootstrap_segments));
        let full = Arc::new(FullData::build(own, dict)?);
        let zone_map = match zone::zone_map(pm) {
            Some(zones) => zones,
            None => return Ok(Self::default()),
        };
        let mut zones = zone::worksheet_zones(zone_map);
        zones.extend(zone::story_point_zones(zone_map, ZoneKind::Worksheet)?);

        let worksheets = zone::worksheet_names(PresModel::VizInfo(pm))?
            .into_iter()
            .map(|name| {
                let columns = columns::from_zones(&zones, &name, ColumnOptions::all())?;
                Ok(Worksheet::new(name, columns, Arc::clone(&full)))
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self::new(worksheets))
    }

    /// Worksheets after a command response has been applied to `session`.
    /// Retained zones are preferred over the response's own story point.
    pub fn from_command_response(doc: &Object, session: &SessionState) -> Result<Self, Error> {
        let pm = locate::application_pres_model(doc)?;
        let full = Arc::new(FullData::build(dictionary::command_segments(pm), session.dictionary())?);

        let mut zones = json::entries(session.zones())
            .map(|(_, zone)| zone)
            .filter(|zone| zone::worksheet(zone).is_some() && zone::is_worksheet_zone(zone))
            .collect::<Vec<_>>();
        if zones.is_empty() {
            if let Some(zone_map) = zone::zone_map(pm) {
                zones = zone::story_point_zones(zone_map, ZoneKind::Worksheet)?;
            }
        }

        let mut worksheets = Vec::new();
        for zone in zones {
            let name = match zone::worksheet(zone) {
                Some(name) => name,
                None => continue,
            };
            if !columns::has_columns(zone) {
                debug!("Worksheet {} has no column data, skipping", name);
                continue;
            }
            let columns = columns::from_zone(zone, ColumnOptions::all())?;
            worksheets.push(Worksheet::new(name, columns, Arc::clone(&full)));
        }
        Ok(Self::new(worksheets))
    }

    pub fn worksheets(&self) -> &[Worksheet] {
        &self.worksheets
    }

    pub fn worksheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(Worksheet::name).collect()
    }

    pub fn worksheet(&self, name: &str) -> Result<&Worksheet, Error> {
        self.worksheets
            .iter()
            .find(|ws| ws.name == name)
            .ok_or_else(|| Error::NoSuchWorksheet(name.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }
}

/// Resolves the data table of a summary or underlying data download. The
/// table's own segments take priority over the session dictionary.
pub fn download_columns(doc: &Object, dict: &DataDictionary) -> Result<Columns, Error> {
    let table = json::object(parameter::command_return(doc)?, "underlyingDataTable")?;
    let own = json::path(table, &["dataDictionary", "dataSegments"])?;
    let full = FullData::build(Some(own), dict)?;
    let columns = columns::from_table(json::array(table, "underlyingDataTableColumns")?)?;
    Ok(dictionary::resolve_columns(&full, &columns))
}
