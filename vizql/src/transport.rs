//! The seam to the HTTP layer.
//!
//! The engine never builds requests itself. Every server action is a
//! [`Transport`] call answering with the raw decoded response document.

use serde::Serialize;

use crate::json::Object;
use crate::Error;

/// A raw decoded server response.
pub type Document = Object;

/// Arguments of a categorical filter command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub worksheet: String,
    pub global_field_name: String,
    pub dashboard: String,
    pub selection: Vec<i64>,
    pub selection_to_remove: Vec<i64>,
    pub membership_target: bool,
    pub filter_delta: bool,
    pub storyboard: Option<String>,
    pub storyboard_id: Option<String>,
}

/// Server actions of a VizQL session. Implementations report network and
/// protocol failures as [`Error::Transport`].
pub trait Transport {
    /// Selects marks of a worksheet by index.
    fn select(&mut self, worksheet: &str, selection: &[i64]) -> Result<Document, Error>;

    fn filter(&mut self, request: &FilterRequest) -> Result<Document, Error>;

    fn clear_filter(&mut self, worksheet: &str, global_field_name: &str, dashboard: &str) -> Result<Document, Error>;

    /// Applies a filter to every worksheet of the dashboard.
    fn dashboard_filter(&mut self, column: &str, values: &[String]) -> Result<Document, Error>;

    fn set_parameter_value(&mut self, parameter_name: &str, value: &str) -> Result<Document, Error>;

    fn go_to_sheet(&mut self, window_id: &str) -> Result<Document, Error>;

    fn set_active_story_point(&mut self, story_board: &str, story_point_id: i64) -> Result<Document, Error>;

    fn level_drill(&mut self, worksheet: &str, drill_down: bool, position: u32) -> Result<Document, Error>;

    fn render_tooltip(&mut self, worksheet: &str, x: i64, y: i64) -> Result<Document, Error>;

    fn summary_data(&mut self, worksheet: &str, dashboard: &str, max_rows: u32) -> Result<Document, Error>;

    fn underlying_data(&mut self, worksheet: &str, dashboard: &str, max_rows: u32) -> Result<Document, Error>;

    /// Opens the crosstab export dialog, which lists exportable sheets.
    fn crosstab_dialog(&mut self) -> Result<Document, Error>;

    fn crosstab_export(&mut self, sheet_id: &str) -> Result<Document, Error>;
}
