//! Zone enumeration.
//!
//! A dashboard is a map of named zones. A zone may be a worksheet (it carries
//! a visual), a filter widget, a parameter control or a story-point container
//! (a flipboard) whose story points hold a nested dashboard with its own zone
//! map. Story points do not nest further.

use log::debug;

use crate::json::{self, Object};
use crate::locate::{PresModel, Shape};
use crate::Error;

/// How many story-point levels the walker descends into.
pub const MAX_STORY_DEPTH: usize = 1;

const ZONES: &[&str] = &["workbookPresModel", "dashboardPresModel", "zones"];
pub(crate) const PRES_MODEL_MAP: &[&str] = &[
    "vizData",
    "presModelHolder",
    "genPresModelMapPresModel",
    "presModelMap",
];

/// Which zones of a story point's dashboard to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    /// Named worksheets carrying a rendered visual.
    Worksheet,
    /// Any zone with a pres-model holder (worksheets, parameter controls,
    /// filters).
    Holder,
}

/// The raw zone map of a pres model.
pub fn zone_map(pm: &Object) -> Option<&Object> {
    json::opt_path(pm, ZONES)
}

/// The zones of a pres model, with `null` entries filtered out.
pub fn list_zones(pm: &Object) -> Vec<(&String, &Object)> {
    zone_map(pm)
        .map(|zones| json::entries(zones).collect())
        .unwrap_or_default()
}

/// The worksheet name of a zone, if it has one.
pub fn worksheet(zone: &Object) -> Option<&str> {
    zone.get("worksheet").and_then(|v| v.as_str())
}

fn visual(zone: &Object) -> Option<&Object> {
    json::opt_path(zone, &["presModelHolder", "visual"])
}

/// Whether the zone carries a visual at all (possibly without rendered data).
pub fn has_visual(zone: &Object) -> bool {
    visual(zone).is_some()
}

/// Whether the zone carries a rendered visual payload.
pub fn is_worksheet_zone(zone: &Object) -> bool {
    visual(zone).map_or(false, |v| v.contains_key("vizData"))
}

/// The story points of the first flipboard zone in the map.
pub fn story_points(zone_map: &Object) -> Option<&Object> {
    json::entries(zone_map)
        .find_map(|(_, zone)| json::opt_path(zone, &["presModelHolder", "flipboard", "storyPoints"]))
}

/// The zone map of a story point's dashboard.
pub fn dashboard_zones(story_point: &Object) -> Result<&Object, Error> {
    json::path(story_point, &["dashboardPresModel", "zones"])
}

/// The zones of the first story point's dashboard, filtered by kind. Empty
/// when the map holds no story points.
pub fn story_point_zones(zone_map: &Object, kind: ZoneKind) -> Result<Vec<&Object>, Error> {
    let first = match story_points(zone_map).and_then(|points| json::entries(points).next()) {
        Some((_, point)) => point,
        None => return Ok(Vec::new()),
    };
    Ok(json::entries(dashboard_zones(first)?)
        .map(|(_, zone)| zone)
        .filter(|zone| match kind {
            ZoneKind::Worksheet => worksheet(zone).is_some() && is_worksheet_zone(zone),
            ZoneKind::Holder => zone.contains_key("presModelHolder"),
        })
        .collect())
}

/// Top-level zones carrying a rendered visual.
pub fn worksheet_zones(zone_map: &Object) -> Vec<&Object> {
    json::entries(zone_map)
        .map(|(_, zone)| zone)
        .filter(|zone| is_worksheet_zone(zone))
        .collect()
}

/// Zones carrying controls: those of the first story point when there is
/// one, otherwise the top-level zones.
pub fn story_point_first(zone_map: &Object) -> Result<Vec<&Object>, Error> {
    let nested = story_point_zones(zone_map, ZoneKind::Holder)?;
    if !nested.is_empty() {
        return Ok(nested);
    }
    Ok(json::entries(zone_map).map(|(_, zone)| zone).collect())
}

fn direct_worksheets(pm: PresModel<'_>) -> Vec<String> {
    let zones = match zone_map(pm.object()) {
        Some(zones) => zones,
        None => return Vec::new(),
    };
    json::entries(zones)
        .map(|(_, zone)| zone)
        .filter(|zone| match pm {
            PresModel::CommandResponse(_) => is_worksheet_zone(zone),
            _ => has_visual(zone),
        })
        .filter_map(worksheet)
        .map(str::to_string)
        .collect()
}

fn story_point_worksheets(pm: &Object) -> Result<Vec<String>, Error> {
    let zones = match zone_map(pm) {
        Some(zones) => zones,
        None => return Ok(Vec::new()),
    };
    Ok(story_point_zones(zones, ZoneKind::Worksheet)?
        .into_iter()
        .filter_map(worksheet)
        .map(str::to_string)
        .collect())
}

/// Determines how the pres model lists its worksheets.
pub fn shape(pm: PresModel<'_>) -> Shape {
    let direct = match pm {
        PresModel::VizData(_) => return Shape::VizData,
        PresModel::VizInfo(_) => Shape::VizInfo,
        PresModel::CommandResponse(_) => Shape::CommandResponse,
    };
    if direct_worksheets(pm).is_empty()
        && zone_map(pm.object()).and_then(story_points).is_some()
    {
        Shape::StoryPoint
    } else {
        direct
    }
}

/// Lists the worksheet names of a pres model according to its shape.
pub fn worksheet_names(pm: PresModel<'_>) -> Result<Vec<String>, Error> {
    match shape(pm) {
        Shape::VizData => Ok(json::path(pm.object(), PRES_MODEL_MAP)?
            .keys()
            .cloned()
            .collect()),
        Shape::StoryPoint => {
            debug!("No worksheet zones found, listing story point worksheets");
            story_point_worksheets(pm.object())
        }
        Shape::VizInfo | Shape::CommandResponse => Ok(direct_worksheets(pm)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixtures;
    use crate::locate;
    use serde_json::json;

    #[test]
    fn lists_viz_data_worksheets() {
        let data = fixtures::data();
        let pm = locate::locate(&data).unwrap();
        assert_eq!(shape(pm), Shape::VizData);
        assert_eq!(
            worksheet_names(pm).unwrap(),
            vec!["[WORKSHEET1]", "[WORKSHEET2]"]
        );
    }

    #[test]
    fn viz_data_without_map_is_structural() {
        let broken = fixtures::object(json!({ "vizData": { "presModelHolder": {} } }));
        match worksheet_names(PresModel::VizData(&broken)) {
            Err(Error::MissingField(path)) => {
                assert_eq!(path, "vizData.presModelHolder.genPresModelMapPresModel")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn lists_viz_info_worksheets() {
        let info = fixtures::info();
        let pm = locate::locate(&info).unwrap();
        assert_eq!(shape(pm), Shape::VizInfo);
        assert_eq!(
            worksheet_names(pm).unwrap(),
            vec!["[WORKSHEET1]", "[WORKSHEET2]"]
        );
        assert_eq!(list_zones(pm.object()).len(), 5);
    }

    #[test]
    fn lists_command_response_worksheets() {
        let cmd = fixtures::command_response();
        let pm = locate::locate(&cmd).unwrap();
        assert_eq!(shape(pm), Shape::CommandResponse);
        assert_eq!(
            worksheet_names(pm).unwrap(),
            vec!["[WORKSHEET1]", "[WORKSHEET2]"]
        );
        let zones = zone_map(pm.object()).unwrap();
        assert_eq!(worksheet_zones(zones).len(), 2);
    }

    #[test]
    fn lists_story_point_worksheets() {
        let info = fixtures::story_info();
        let pm = locate::locate(&info).unwrap();
        assert_eq!(shape(pm), Shape::StoryPoint);
        assert_eq!(worksheet_names(pm).unwrap(), vec!["[WORKSHEET1]"]);

        let zones = zone_map(pm.object()).unwrap();
        assert_eq!(story_point_zones(zones, ZoneKind::Holder).unwrap().len(), 2);
        assert_eq!(story_point_first(zones).unwrap().len(), 2);
    }

    #[test]
    fn absent_structure_is_empty() {
        let empty = fixtures::object(json!({ "workbookPresModel": {} }));
        assert!(list_zones(&empty).is_empty());
        assert!(worksheet_names(PresModel::VizInfo(&empty)).unwrap().is_empty());

        let no_story = fixtures::object(json!({ "0": { "presModelHolder": {} } }));
        assert!(story_point_zones(&no_story, ZoneKind::Holder).unwrap().is_empty());
        assert_eq!(story_point_first(&no_story).unwrap().len(), 1);
    }

    #[test]
    fn malformed_story_point_is_structural() {
        let zones = fixtures::object(json!({
            "0": { "presModelHolder": { "flipboard": { "storyPoints": { "1": { "storyPointId": 1 } } } } }
        }));
        assert!(story_point_zones(&zones, ZoneKind::Worksheet)
            .unwrap_err()
            .is_structural());
    }

    #[test]
    fn zone_predicates() {
        let rendered = fixtures::object(json!({ "presModelHolder": { "visual": { "vizData": {} } } }));
        let stub = fixtures::object(json!({ "presModelHolder": { "visual": {} } }));
        assert!(is_worksheet_zone(&rendered));
        assert!(has_visual(&stub));
        assert!(!is_worksheet_zone(&stub));
    }
}
