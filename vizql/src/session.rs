//! Long-lived session state and its synchronization with command responses.
//!
//! Every mutating server action answers with a partial description of the
//! dashboard. [`SessionState::apply_update`] folds such a response into the
//! state learned so far without forgetting what the response does not
//! re-describe.

use log::debug;
use serde::Serialize;

use crate::dictionary::{self, DataDictionary};
use crate::filter::{self, Filter, FilterMap};
use crate::json::{self, Object};
use crate::locate;
use crate::parameter::{self, ParameterInfo};
use crate::zone;
use crate::Error;

const DOWNLOAD_SEGMENTS: &[&str] = &["underlyingDataTable", "dataDictionary", "dataSegments"];

/// Everything a session learns across successive responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    dictionary: DataDictionary,
    parameters: Vec<ParameterInfo>,
    filters: FilterMap,
    zones: Object,
}

/// The fully decoded content of one command response, computed before any
/// state is touched.
#[derive(Debug)]
struct Update {
    segments: Option<Object>,
    parameters: Vec<ParameterInfo>,
    filters: FilterMap,
    zones: Option<Object>,
}

impl Update {
    fn decode(pm: &Object, root_dashboard: &str) -> Result<Self, Error> {
        Ok(Self {
            segments: dictionary::command_segments(pm).cloned(),
            parameters: parameter::parameters(pm)?,
            filters: filter::filters_for_command_response(pm, root_dashboard)?,
            zones: zone::zone_map(pm).cloned(),
        })
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a session from the bootstrap pair.
    pub fn from_bootstrap(info: &Object, data: &Object, root_dashboard: &str) -> Result<Self, Error> {
        let mut state = Self::new();
        if let Some(segments) = locate::pres_model_map(data).and_then(dictionary::bootstrap_segments) {
            state.merge_segments(segments);
        }
        if let Some(pm) = locate::viz_info(info) {
            state.merge_parameters(parameter::parameters(pm)?);
        }
        state.merge_filters(filter::filters_for_bootstrap(info, data, root_dashboard)?);
        debug!(
            "Bootstrapped session with {} segment(s), {} parameter(s), {} worksheet filter list(s)",
            state.dictionary.len(),
            state.parameters.len(),
            state.filters.len()
        );
        Ok(state)
    }

    /// Folds a command response into the session. Either the whole response
    /// is applied or, on error, nothing is.
    pub fn apply_update(&mut self, doc: &Object, root_dashboard: &str) -> Result<(), Error> {
        let pm = match locate::application_pres_model(doc) {
            Ok(pm) => pm,
            Err(e) => {
                debug!("No application pres model in response ({}), only merging download segments", e);
                if let Some(segments) = download_segments(doc) {
                    self.merge_segments(segments);
                }
                return Ok(());
            }
        };

        let update = Update::decode(pm, root_dashboard)?;
        match &update.segments {
            Some(segments) => self.merge_segments(segments),
            None => debug!("No data dictionary in response"),
        }
        self.merge_parameters(update.parameters);
        self.merge_filters(update.filters);
        match &update.zones {
            Some(zones) => self.retain_zones(zones),
            None => debug!("No zones in response, keeping {} known zone(s)", self.zones.len()),
        }
        Ok(())
    }

    /// Merges every non-null segment by key.
    pub fn merge_segments(&mut self, segments: &Object) {
        self.dictionary.merge(segments);
    }

    /// Appends parameters whose identifier is not known yet. Known entries
    /// are never replaced.
    pub fn merge_parameters(&mut self, parameters: Vec<ParameterInfo>) {
        for param in parameters {
            if self
                .parameters
                .iter()
                .any(|known| known.parameter_name == param.parameter_name)
            {
                continue;
            }
            self.parameters.push(param);
        }
    }

    /// Replaces filters by global field name, moving the replacement to the
    /// end of its worksheet's list.
    pub fn merge_filters(&mut self, filters: FilterMap) {
        for (worksheet, incoming) in filters {
            let known = self.filters.entry(worksheet).or_default();
            for filter in incoming {
                known.retain(|f| f.global_field_name != filter.global_field_name);
                known.push(filter);
            }
        }
    }

    /// Replaces the zone map by `incoming`, except that a zone arriving
    /// without a rendered visual keeps its previously known content.
    pub fn retain_zones(&mut self, incoming: &Object) {
        let mut zones = Object::new();
        for (key, zone) in json::entries(incoming) {
            let kept = match self.zones.get(key) {
                Some(previous) if !zone::is_worksheet_zone(zone) => previous.clone(),
                _ => zone.clone().into(),
            };
            zones.insert(key.clone(), kept);
        }
        debug!("Retaining {} zone(s)", zones.len());
        self.zones = zones;
    }

    pub fn dictionary(&self) -> &DataDictionary {
        &self.dictionary
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    /// Parameters whose display label is `column`.
    pub fn parameter(&self, column: &str) -> Option<&ParameterInfo> {
        self.parameters.iter().find(|p| p.column == column)
    }

    pub fn filters(&self, worksheet: &str) -> &[Filter] {
        self.filters
            .get(worksheet)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn all_filters(&self) -> &FilterMap {
        &self.filters
    }

    pub fn zones(&self) -> &Object {
        &self.zones
    }
}

fn download_segments(doc: &Object) -> Option<&Object> {
    parameter::command_return(doc)
        .ok()
        .and_then(|ret| json::opt_path(ret, DOWNLOAD_SEGMENTS))
}
