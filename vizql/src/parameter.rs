//! Parameter controls, story points, sheets and the small command results
//! (tooltips, crosstab exports) read straight out of server documents.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::json::{self, Object};
use crate::locate;
use crate::zone;
use crate::Error;

/// A parameter control and the values it currently accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    /// Display label of the control.
    pub column: String,
    /// Server-side identifier, e.g. `[Parameters].[Parameter 1]`.
    pub parameter_name: String,
    pub values: Vec<String>,
}

/// One navigable frame of a storyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPointEntry {
    pub story_point_id: i64,
    pub story_point_caption: String,
}

/// Story points of a storyboard, one list per navigation widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPointHolder {
    pub story_board: String,
    pub story_points: Vec<Vec<StoryPointEntry>>,
}

impl StoryPointHolder {
    /// Whether a story point with this id exists.
    pub fn contains(&self, id: i64) -> bool {
        self.story_points
            .iter()
            .flatten()
            .any(|entry| entry.story_point_id == id)
    }
}

/// A sheet of the workbook as listed in `sheetsInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub sheet: String,
    pub is_dashboard: bool,
    pub is_visible: bool,
    pub names_of_subsheets: Vec<String>,
    pub window_id: String,
}

fn decode_parameter(control: &Object) -> Result<ParameterInfo, Error> {
    Ok(ParameterInfo {
        column: json::string(control, "fieldCaption")?,
        parameter_name: json::string(control, "parameterName")?,
        values: json::array(control, "formattedValues")?
            .iter()
            .map(json::content)
            .collect(),
    })
}

/// Parameter controls of a zone map. Controls nested in the first story
/// point take precedence over top-level ones.
pub fn parameter_controls(zone_map: &Object) -> Result<Vec<ParameterInfo>, Error> {
    zone::story_point_first(zone_map)?
        .into_iter()
        .filter_map(|zone| json::opt_path(zone, &["presModelHolder", "parameterControl"]))
        .map(decode_parameter)
        .collect()
}

/// Parameter controls of a pres model; none if it has no zones.
pub fn parameters(pm: &Object) -> Result<Vec<ParameterInfo>, Error> {
    match zone::zone_map(pm) {
        Some(zones) => parameter_controls(zones),
        None => Ok(Vec::new()),
    }
}

fn required_viz_info(info: &Object) -> Result<&Object, Error> {
    locate::viz_info(info).ok_or_else(|| {
        Error::MissingField("worldUpdate.applicationPresModel.workbookPresModel".to_string())
    })
}

/// Sheets of a bootstrap `info` document.
pub fn sheets(info: &Object) -> Result<Vec<Sheet>, Error> {
    let workbook = json::path(required_viz_info(info)?, &["workbookPresModel"])?;
    match workbook.get("sheetsInfo") {
        Some(list @ Value::Array(_)) => Ok(Vec::<Sheet>::deserialize(list)?),
        _ => Ok(Vec::new()),
    }
}

/// Story points of a bootstrap `info` document. The storyboard is the
/// document's `sheetName`.
pub fn story_points(info: &Object) -> Result<StoryPointHolder, Error> {
    let story_board = match json::opt_string(info, "sheetName") {
        Some(name) => name,
        None => {
            debug!("No sheet name in info, no story points");
            return Ok(StoryPointHolder::default());
        }
    };
    let mut holder = StoryPointHolder {
        story_board,
        story_points: Vec::new(),
    };
    for (_, zone) in zone::list_zones(required_viz_info(info)?) {
        let items = match json::opt_path(zone, &["presModelHolder", "flipboardNav"])
            .and_then(|nav| json::opt_array(nav, "storypointNavItems"))
        {
            Some(items) => items,
            None => continue,
        };
        let entries = items
            .iter()
            .filter_map(Value::as_object)
            .map(|item| {
                Ok(StoryPointEntry {
                    story_point_id: json::integer(json::field(item, "storyPointId")?, "storyPointId")?,
                    story_point_caption: json::string(item, "storyPointCaption")?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        holder.story_points.push(entries);
    }
    Ok(holder)
}

/// `vqlCmdResponse.cmdResultList[0].commandReturn`.
pub(crate) fn command_return(doc: &Object) -> Result<&Object, Error> {
    json::array(json::path(doc, &["vqlCmdResponse"])?, "cmdResultList")?
        .first()
        .and_then(Value::as_object)
        .ok_or_else(|| Error::MissingField("vqlCmdResponse.cmdResultList[0]".to_string()))
        .and_then(|result| json::object(result, "commandReturn"))
}

/// The HTML of a rendered tooltip; empty when the server sent no text.
pub fn tooltip_text(doc: &Object) -> Result<String, Error> {
    let text = json::string(command_return(doc)?, "tooltipText")?;
    if text.is_empty() {
        return Ok(text);
    }
    let tooltip = serde_json::from_str::<Object>(&text)?;
    json::string(&tooltip, "htmlTooltip")
}

fn notification_holder(doc: &Object) -> Option<&Object> {
    locate::application_pres_model(doc)
        .ok()
        .and_then(|pm| json::opt_array(pm, "presentationLayerNotification"))
        .and_then(|list| list.first())
        .and_then(Value::as_object)
        .and_then(|first| json::opt_object(first, "presModelHolder"))
}

/// The sheet id the crosstab export dialog lists for `sheet`.
pub fn crosstab_sheet_id(doc: &Object, sheet: &str) -> Result<String, Error> {
    notification_holder(doc)
        .and_then(|holder| json::opt_object(holder, "genExportCrosstabOptionsDialogPresModel"))
        .and_then(|dialog| json::opt_array(dialog, "thumbnailSheetPickerItems"))
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .find(|item| json::opt_string(item, "sheetName").as_deref() == Some(sheet))
        .and_then(|item| json::opt_string(item, "sheetdocId"))
        .ok_or_else(|| Error::NoSuchSheet(sheet.to_string()))
}

/// The key under which an exported file can be downloaded.
pub fn export_result_key(doc: &Object) -> Result<String, Error> {
    let holder = notification_holder(doc).ok_or_else(|| {
        Error::MissingField("applicationPresModel.presentationLayerNotification".to_string())
    })?;
    json::opt_object(holder, "genExportFilePresModel")
        .and_then(|export| json::opt_string(export, "resultKey"))
        .or_else(|| {
            json::opt_object(holder, "genFileDownloadPresModel")
                .and_then(|download| json::opt_string(download, "tempfileKey"))
        })
        .ok_or_else(|| Error::MissingField("genExportFilePresModel.resultKey".to_string()))
}
