//! Finds the active presentation model inside a server document.
//!
//! Documents come in three root shapes: the two halves of a bootstrap pair
//! (`data` carrying a rendered visualization, `info` carrying the workbook
//! layout) and command responses returned by every mutating action.

use crate::json::{self, Object};
use crate::Error;

const APPLICATION_PRES_MODEL: &[&str] = &["vqlCmdResponse", "layoutStatus", "applicationPresModel"];

/// How a presentation model describes its worksheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Worksheets are keys of a dedicated pres-model map.
    VizData,
    /// Worksheets are zones carrying a visual.
    VizInfo,
    /// Worksheets are zones of the first story point's dashboard.
    StoryPoint,
    /// Worksheets are zones carrying a rendered visual in a command response.
    CommandResponse,
}

/// A presentation model located inside a document, tagged by the shape of
/// the document it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PresModel<'a> {
    /// `secondaryInfo.presModelMap` of a bootstrap `data` document.
    VizData(&'a Object),
    /// `worldUpdate.applicationPresModel` of a bootstrap `info` document.
    VizInfo(&'a Object),
    /// `vqlCmdResponse.layoutStatus.applicationPresModel`.
    CommandResponse(&'a Object),
}

impl<'a> PresModel<'a> {
    /// The located subtree.
    pub fn object(&self) -> &'a Object {
        match self {
            Self::VizData(obj) | Self::VizInfo(obj) | Self::CommandResponse(obj) => obj,
        }
    }
}

/// `secondaryInfo.presModelMap`, whether or not it carries a visualization.
pub fn pres_model_map(data: &Object) -> Option<&Object> {
    json::opt_path(data, &["secondaryInfo", "presModelMap"])
}

/// The pres-model map of a bootstrap `data` document, if it carries a
/// rendered visualization.
pub fn viz_data(data: &Object) -> Option<&Object> {
    pres_model_map(data).filter(|map| map.contains_key("vizData"))
}

/// The application pres model of a bootstrap `info` document, if it
/// describes a workbook.
pub fn viz_info(info: &Object) -> Option<&Object> {
    json::opt_path(info, &["worldUpdate", "applicationPresModel"])
        .filter(|pm| pm.contains_key("workbookPresModel"))
}

/// The application pres model of a command response.
pub fn application_pres_model(doc: &Object) -> Result<&Object, Error> {
    json::path(doc, APPLICATION_PRES_MODEL)
}

/// Locates the pres model of a single document: viz-data first, then
/// viz-info, otherwise the document must be a command response.
pub fn locate(doc: &Object) -> Result<PresModel<'_>, Error> {
    if let Some(map) = viz_data(doc) {
        return Ok(PresModel::VizData(map));
    }
    if let Some(pm) = viz_info(doc) {
        return Ok(PresModel::VizInfo(pm));
    }
    application_pres_model(doc).map(PresModel::CommandResponse)
}

/// Locates the pres model describing the worksheets of a bootstrap pair.
pub fn locate_bootstrap<'a>(info: &'a Object, data: &'a Object) -> Option<PresModel<'a>> {
    viz_data(data)
        .map(PresModel::VizData)
        .or_else(|| viz_info(info).map(PresModel::VizInfo))
}
