//! Representative server documents for tests.

use std::collections::VecDeque;

use serde_json::{json, Value};

use crate::json::Object;
use crate::transport::{Document, FilterRequest, Transport};
use crate::Error;

pub(crate) fn object(value: Value) -> Object {
    match value {
        Value::Object(obj) => obj,
        other => panic!("fixture is not an object: {:?}", other),
    }
}

fn digits() -> Value {
    json!(["1", "2", "3", "4", "5", "6", "7", "8", "9"])
}

fn segment() -> Value {
    json!({
        "dataColumns": [
            { "dataType": "real", "dataValues": [1, 2, 3, 4, 5] },
            { "dataType": "cstring", "dataValues": digits() },
            { "dataType": "integer", "dataValues": [7, 8] }
        ]
    })
}

/// `[FIELD1]` is value-indexed, `[FIELD2]` alias-indexed, both into `cstring`.
fn worksheet1_columns() -> Value {
    json!({
        "vizDataColumns": [
            {
                "fieldCaption": "[FIELD1]",
                "isAutoSelect": true,
                "dataType": "cstring",
                "fn": "[federated.123].[none:FIELD1:nk]",
                "paneIndices": [0],
                "columnIndices": [0]
            },
            {
                "fieldCaption": "[FIELD2]",
                "dataType": "cstring",
                "fn": "[federated.123].[none:FIELD2:nk]",
                "paneIndices": [0],
                "columnIndices": [1]
            }
        ],
        "paneColumnsList": [{
            "vizPaneColumns": [
                { "tupleIds": [], "valueIndices": [1, 2, 3, 4], "aliasIndices": [] },
                { "tupleIds": [], "valueIndices": [], "aliasIndices": [5, 6, 7, 8] }
            ]
        }]
    })
}

/// `[FIELD3]` mixes typed and pooled values and is tuple addressed.
fn worksheet2_columns() -> Value {
    json!({
        "vizDataColumns": [
            {
                "fieldCaption": "[FIELD3]",
                "isAutoSelect": true,
                "dataType": "integer",
                "paneIndices": [0],
                "columnIndices": [0]
            },
            {
                "fn": "[system:visual].[tuple_id]",
                "dataType": "integer",
                "paneIndices": [0],
                "columnIndices": [1]
            }
        ],
        "paneColumnsList": [{
            "vizPaneColumns": [
                { "tupleIds": [], "valueIndices": [0, 1, -1], "aliasIndices": [] },
                { "tupleIds": [10, 11, 12], "valueIndices": [], "aliasIndices": [] }
            ]
        }]
    })
}

pub(crate) fn filters_json() -> String {
    json!([{
        "table": {
            "schema": [{
                "caption": "[FILTER1]",
                "name": ["federated.123", "none:FILTER1:nk"],
                "ordinal": 0
            }],
            "tuples": [
                { "t": [{ "v": "A" }], "s": true },
                { "t": [{ "v": "B" }], "s": false },
                { "t": [{ "v": "C" }] }
            ]
        }
    }])
    .to_string()
}

fn all_checked_filters_json() -> String {
    json!([{
        "allChecked": true,
        "table": {
            "schema": [{
                "caption": "[FILTER2]",
                "name": ["federated.123", "none:FILTER2:nk"],
                "ordinal": 1
            }],
            "tuples": [
                { "t": [{ "v": "X" }] },
                { "t": [{ "v": "Y" }] }
            ]
        }
    }])
    .to_string()
}

fn parameter_zone(caption: &str, name: &str, values: Value) -> Value {
    json!({
        "presModelHolder": {
            "parameterControl": {
                "fieldCaption": caption,
                "formattedValues": values,
                "parameterName": name
            }
        }
    })
}

/// The `data` half of a viz-data bootstrap pair.
pub(crate) fn data() -> Object {
    object(json!({
        "secondaryInfo": {
            "presModelMap": {
                "dataDictionary": {
                    "presModelHolder": {
                        "genDataDictionaryPresModel": {
                            "dataSegments": { "0": segment() }
                        }
                    }
                },
                "vizData": {
                    "presModelHolder": {
                        "genPresModelMapPresModel": {
                            "presModelMap": {
                                "[WORKSHEET1]": {
                                    "presModelHolder": {
                                        "genVizDataPresModel": { "paneColumnsData": worksheet1_columns() }
                                    }
                                },
                                "[WORKSHEET2]": {
                                    "presModelHolder": {
                                        "genVizDataPresModel": { "paneColumnsData": worksheet2_columns() }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }))
}

/// The `info` half of a viz-data bootstrap pair.
pub(crate) fn info() -> Object {
    object(json!({
        "sheetName": "[DASHBOARD1]",
        "worldUpdate": {
            "applicationPresModel": {
                "workbookPresModel": {
                    "sheetsInfo": [{
                        "sheet": "[WORKSHEET1]",
                        "isDashboard": false,
                        "isVisible": true,
                        "namesOfSubsheets": [],
                        "windowId": "{XXXXX}"
                    }],
                    "dashboardPresModel": {
                        "viewIds": { "[WORKSHEET1]": "1" },
                        "zones": {
                            "0": {
                                "worksheet": "[WORKSHEET1]",
                                "presModelHolder": { "visual": { "filtersJson": filters_json() } }
                            },
                            "1": {
                                "worksheet": "[WORKSHEET2]",
                                "presModelHolder": { "visual": { "filtersJson": all_checked_filters_json() } }
                            },
                            "2": parameter_zone(
                                "[INPUT_NAME1]",
                                "[Parameters].[Parameter 1]",
                                json!(["select1", "select2", "select3"])
                            ),
                            "3": parameter_zone(
                                "[INPUT_NAME2]",
                                "[Parameters].[Parameter 2]",
                                json!(["select4", "select5", "select6"])
                            ),
                            "4": {
                                "worksheet": "[WORKSHEET1]",
                                "presModelHolder": {
                                    "quickFilterDisplay": {
                                        "quickFilter": {
                                            "categoricalFilter": {
                                                "fn": "[federated.123].[none:FILTER1:nk]",
                                                "columnFullNames": ["[FILTER1]"],
                                                "domainTables": [
                                                    { "label": "A", "isSelected": true },
                                                    { "label": "C", "isSelected": true },
                                                    { "label": "B", "isSelected": false }
                                                ]
                                            }
                                        }
                                    }
                                }
                            },
                            "5": null
                        }
                    }
                }
            }
        }
    }))
}

/// A bootstrap pair whose only worksheet lives inside a story point.
pub(crate) fn story_info() -> Object {
    object(json!({
        "sheetName": "[STORY]",
        "worldUpdate": {
            "applicationPresModel": {
                "workbookPresModel": {
                    "dashboardPresModel": {
                        "zones": {
                            "7": {
                                "presModelHolder": {
                                    "flipboardNav": {
                                        "storypointNavItems": [
                                            { "storyPointId": 1, "storyPointCaption": "first" },
                                            { "storyPointId": 2, "storyPointCaption": "second" }
                                        ]
                                    }
                                }
                            },
                            "8": {
                                "presModelHolder": {
                                    "flipboard": {
                                        "storyPoints": {
                                            "1": {
                                                "storyPointId": 1,
                                                "dashboardPresModel": {
                                                    "sheetPath": {
                                                        "storyboard": "[STORY]",
                                                        "isDashboard": true,
                                                        "sheetName": "[INNER]"
                                                    },
                                                    "zones": {
                                                        "10": {
                                                            "worksheet": "[WORKSHEET1]",
                                                            "presModelHolder": {
                                                                "visual": {
                                                                    "vizData": { "paneColumnsData": worksheet1_columns() },
                                                                    "filtersJson": filters_json()
                                                                }
                                                            }
                                                        },
                                                        "11": parameter_zone(
                                                            "[INPUT_NAME1]",
                                                            "[Parameters].[Parameter 1]",
                                                            json!(["select1", "select2", "select3"])
                                                        )
                                                    }
                                                }
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }))
}

pub(crate) fn story_data() -> Object {
    object(json!({
        "secondaryInfo": {
            "presModelMap": {
                "dataDictionary": {
                    "presModelHolder": {
                        "genDataDictionaryPresModel": {
                            "dataSegments": { "0": segment() }
                        }
                    }
                }
            }
        }
    }))
}

fn command_response_with(worksheet1: Value) -> Object {
    object(json!({
        "vqlCmdResponse": {
            "cmdResultList": [],
            "layoutStatus": {
                "applicationPresModel": {
                    "dataDictionary": {
                        "dataSegments": {
                            "1": {
                                "dataColumns": [
                                    { "dataType": "real", "dataValues": [1, 2, 3, 4, 5] },
                                    { "dataType": "cstring", "dataValues": digits() }
                                ]
                            },
                            "2": null
                        }
                    },
                    "workbookPresModel": {
                        "dashboardPresModel": {
                            "zones": {
                                "0": {
                                    "worksheet": "[WORKSHEET1]",
                                    "presModelHolder": {
                                        "visual": {
                                            "vizData": { "paneColumnsData": worksheet1 },
                                            "filtersJson": filters_json()
                                        }
                                    }
                                },
                                "1": {
                                    "worksheet": "[WORKSHEET2]",
                                    "presModelHolder": { "visual": { "vizData": {} } }
                                },
                                "2": parameter_zone(
                                    "[INPUT_NAME1]",
                                    "[Parameters].[Parameter 1]",
                                    json!(["select1", "select2", "select3"])
                                ),
                                "3": parameter_zone(
                                    "[INPUT_NAME3]",
                                    "[Parameters].[Parameter 3]",
                                    json!(["select7"])
                                )
                            }
                        }
                    }
                }
            }
        }
    }))
}

/// A typical response to a select, filter or parameter command.
pub(crate) fn command_response() -> Object {
    command_response_with(worksheet1_columns())
}

/// Same layout as [`command_response`], but the worksheet carries no indices.
pub(crate) fn command_response_empty_values() -> Object {
    command_response_with(json!({
        "vizDataColumns": [
            {
                "fieldCaption": "[FIELD1]",
                "dataType": "cstring",
                "paneIndices": [0],
                "columnIndices": [0]
            }
        ],
        "paneColumnsList": [{
            "vizPaneColumns": [
                { "tupleIds": [], "valueIndices": [], "aliasIndices": [] }
            ]
        }]
    }))
}

/// A response to a story point switch: the worksheet only exists nested
/// under the flipboard.
pub(crate) fn story_command_response() -> Object {
    let story = story_info();
    let zones = story["worldUpdate"]["applicationPresModel"]["workbookPresModel"]["dashboardPresModel"]
        ["zones"]
        .clone();
    object(json!({
        "vqlCmdResponse": {
            "layoutStatus": {
                "applicationPresModel": {
                    "workbookPresModel": { "dashboardPresModel": { "zones": zones } }
                }
            }
        }
    }))
}

pub(crate) fn underlying_data_response() -> Object {
    object(json!({
        "vqlCmdResponse": {
            "cmdResultList": [{
                "commandReturn": {
                    "underlyingDataTable": {
                        "dataDictionary": {
                            "dataSegments": {
                                "5": {
                                    "dataColumns": [
                                        { "dataType": "cstring", "dataValues": ["x", "y"] },
                                        { "dataType": "integer", "dataValues": [10, 20] }
                                    ]
                                }
                            }
                        },
                        "underlyingDataTableColumns": [
                            {
                                "fieldCaption": "Name",
                                "dataType": "cstring",
                                "valueIndices": [0, 1],
                                "aliasIndices": []
                            },
                            {
                                "fieldCaption": "Count",
                                "dataType": "integer",
                                "valueIndices": [1, 0],
                                "aliasIndices": []
                            },
                            { "dataType": "integer", "valueIndices": [0], "aliasIndices": [] }
                        ]
                    }
                }
            }]
        }
    }))
}

pub(crate) fn tooltip_response(text: &str) -> Object {
    object(json!({
        "vqlCmdResponse": {
            "cmdResultList": [{ "commandReturn": { "tooltipText": text } }]
        }
    }))
}

fn notification(holder: Value) -> Object {
    object(json!({
        "vqlCmdResponse": {
            "layoutStatus": {
                "applicationPresModel": {
                    "presentationLayerNotification": [{ "presModelHolder": holder }]
                }
            }
        }
    }))
}

pub(crate) fn crosstab_dialog_response() -> Object {
    notification(json!({
        "genExportCrosstabOptionsDialogPresModel": {
            "thumbnailSheetPickerItems": [
                { "sheetName": "[WORKSHEET1]", "sheetdocId": "{SHEET-1}" },
                { "sheetName": "[WORKSHEET2]", "sheetdocId": "{SHEET-2}" }
            ]
        }
    }))
}

pub(crate) fn crosstab_export_response() -> Object {
    notification(json!({ "genExportFilePresModel": { "resultKey": "RESULT-KEY" } }))
}

pub(crate) fn file_download_response() -> Object {
    notification(json!({ "genFileDownloadPresModel": { "tempfileKey": "TEMP-KEY" } }))
}

/// The raw body of a bootstrap call carrying [`info`] and [`data`].
pub(crate) fn bootstrap_body() -> String {
    let info = Value::Object(info()).to_string();
    let data = Value::Object(data()).to_string();
    format!("{};{}{};{}", info.len(), info, data.len(), data)
}

/// A transport call as recorded by [`FakeTransport`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Select(String, Vec<i64>),
    Filter(FilterRequest),
    ClearFilter(String, String, String),
    DashboardFilter(String, Vec<String>),
    SetParameter(String, String),
    GoToSheet(String),
    SetStoryPoint(String, i64),
    LevelDrill(String, bool, u32),
    Tooltip(String, i64, i64),
    SummaryData(String, String, u32),
    UnderlyingData(String, String, u32),
    CrosstabDialog,
    CrosstabExport(String),
}

/// Records calls and answers them with canned documents, in order.
#[derive(Debug, Default)]
pub(crate) struct FakeTransport {
    pub calls: Vec<Call>,
    responses: VecDeque<Object>,
}

impl FakeTransport {
    pub fn replying(responses: Vec<Object>) -> Self {
        Self {
            calls: Vec::new(),
            responses: responses.into(),
        }
    }

    fn answer(&mut self, call: Call) -> Result<Document, Error> {
        self.calls.push(call);
        self.responses
            .pop_front()
            .ok_or_else(|| Error::Transport("no canned response left".to_string()))
    }
}

impl Transport for FakeTransport {
    fn select(&mut self, worksheet: &str, selection: &[i64]) -> Result<Document, Error> {
        self.answer(Call::Select(worksheet.to_string(), selection.to_vec()))
    }

    fn filter(&mut self, request: &FilterRequest) -> Result<Document, Error> {
        self.answer(Call::Filter(request.clone()))
    }

    fn clear_filter(&mut self, worksheet: &str, global_field_name: &str, dashboard: &str) -> Result<Document, Error> {
        self.answer(Call::ClearFilter(
            worksheet.to_string(),
            global_field_name.to_string(),
            dashboard.to_string(),
        ))
    }

    fn dashboard_filter(&mut self, column: &str, values: &[String]) -> Result<Document, Error> {
        self.answer(Call::DashboardFilter(column.to_string(), values.to_vec()))
    }

    fn set_parameter_value(&mut self, parameter_name: &str, value: &str) -> Result<Document, Error> {
        self.answer(Call::SetParameter(parameter_name.to_string(), value.to_string()))
    }

    fn go_to_sheet(&mut self, window_id: &str) -> Result<Document, Error> {
        self.answer(Call::GoToSheet(window_id.to_string()))
    }

    fn set_active_story_point(&mut self, story_board: &str, story_point_id: i64) -> Result<Document, Error> {
        self.answer(Call::SetStoryPoint(story_board.to_string(), story_point_id))
    }

    fn level_drill(&mut self, worksheet: &str, drill_down: bool, position: u32) -> Result<Document, Error> {
        self.answer(Call::LevelDrill(worksheet.to_string(), drill_down, position))
    }

    fn render_tooltip(&mut self, worksheet: &str, x: i64, y: i64) -> Result<Document, Error> {
        self.answer(Call::Tooltip(worksheet.to_string(), x, y))
    }

    fn summary_data(&mut self, worksheet: &str, dashboard: &str, max_rows: u32) -> Result<Document, Error> {
        self.answer(Call::SummaryData(worksheet.to_string(), dashboard.to_string(), max_rows))
    }

    fn underlying_data(&mut self, worksheet: &str, dashboard: &str, max_rows: u32) -> Result<Document, Error> {
        self.answer(Call::UnderlyingData(worksheet.to_string(), dashboard.to_string(), max_rows))
    }

    fn crosstab_dialog(&mut self) -> Result<Document, Error> {
        self.answer(Call::CrosstabDialog)
    }

    fn crosstab_export(&mut self, sheet_id: &str) -> Result<Document, Error> {
        self.answer(Call::CrosstabExport(sheet_id.to_string()))
    }
}
