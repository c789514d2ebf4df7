//! Drives a session: resolves action arguments, calls the transport, folds
//! the response into the session state and rebuilds the views.

use log::debug;

use crate::bootstrap;
use crate::config::Config;
use crate::dictionary::Columns;
use crate::filter::Filter;
use crate::json::Object;
use crate::parameter::{self, ParameterInfo, Sheet, StoryPointHolder};
use crate::select::{self, FilterMode};
use crate::session::SessionState;
use crate::transport::{Document, FilterRequest, Transport};
use crate::workbook::{self, Workbook};
use crate::Error;

/// A scraping session over some transport.
pub struct Scraper<T: Transport> {
    transport: T,
    config: Config,
    info: Object,
    data: Object,
    dashboard: String,
    session: SessionState,
    workbook: Workbook,
}

impl<T: Transport> Scraper<T> {
    /// Starts a session from a bootstrap pair.
    pub fn new(transport: T, config: Config, info: Object, data: Object) -> Result<Self, Error> {
        let dashboard = config.root_dashboard(&info);
        let session = SessionState::from_bootstrap(&info, &data, &dashboard)?;
        let workbook = Workbook::from_bootstrap(&info, &data, &session)?;
        debug!(
            "Session started on dashboard {:?} with {} worksheet(s)",
            dashboard,
            workbook.worksheets().len()
        );
        Ok(Self {
            transport,
            config,
            info,
            data,
            dashboard,
            session,
            workbook,
        })
    }

    /// Starts a session from the raw body of the bootstrap call.
    pub fn from_bootstrap_body(transport: T, config: Config, body: &str) -> Result<Self, Error> {
        let (info, data) = bootstrap::split_bootstrap(body)?;
        Self::new(transport, config, info, data)
    }

    pub fn dashboard(&self) -> &str {
        &self.dashboard
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The views built from the latest response.
    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        self.session.parameters()
    }

    pub fn filters(&self, worksheet: &str) -> &[Filter] {
        self.session.filters(worksheet)
    }

    pub fn sheets(&self) -> Result<Vec<Sheet>, Error> {
        parameter::sheets(&self.info)
    }

    pub fn story_points(&self) -> Result<StoryPointHolder, Error> {
        parameter::story_points(&self.info)
    }

    /// Rebuilds the views of the bootstrap pair.
    pub fn reset_workbook(&mut self) -> Result<&Workbook, Error> {
        self.workbook = Workbook::from_bootstrap(&self.info, &self.data, &self.session)?;
        Ok(&self.workbook)
    }

    fn apply(&mut self, doc: Document) -> Result<&Workbook, Error> {
        self.session.apply_update(&doc, &self.dashboard)?;
        self.workbook = Workbook::from_command_response(&doc, &self.session)?;
        Ok(&self.workbook)
    }

    /// Selects `value` in `column` of a worksheet.
    pub fn select(&mut self, worksheet: &str, column: &str, value: &str) -> Result<&Workbook, Error> {
        let ws = self.workbook.worksheet(worksheet)?;
        let selectable = ws.selectable_values(column)?;
        let index = select::resolve_select_index(column, value, &ws.tuple_ids(), &selectable)?;
        debug!("Selecting {} in {} of {} at index {}", value, column, worksheet, index);
        let doc = self.transport.select(worksheet, &[index])?;
        self.apply(doc)
    }

    fn find_filter(&self, worksheet: &str, column: &str) -> Result<Filter, Error> {
        self.session
            .filters(worksheet)
            .iter()
            .find(|f| f.column == column)
            .cloned()
            .ok_or_else(|| Error::NoSuchFilter {
                worksheet: worksheet.to_string(),
                column: column.to_string(),
            })
    }

    /// Sets the selection of a worksheet filter, replacing or amending the
    /// current one according to the configured [`FilterMode`].
    pub fn set_filter<S: AsRef<str>>(&mut self, worksheet: &str, column: &str, values: &[S]) -> Result<&Workbook, Error> {
        let filter = self.find_filter(worksheet, column)?;
        let mode = self.config.filter_mode;
        let indices = select::resolve_filter_indices(&filter, values, mode)?;
        if mode == FilterMode::Delta && indices.is_empty() {
            debug!("Filter {} of {} is unchanged", column, worksheet);
            return self.reset_workbook();
        }

        let scope = filter.scope.as_ref();
        let request = FilterRequest {
            worksheet: worksheet.to_string(),
            global_field_name: filter.global_field_name.clone(),
            dashboard: scope.map_or_else(|| self.dashboard.clone(), |s| s.dashboard.clone()),
            selection: indices.add,
            selection_to_remove: indices.remove,
            membership_target: self.config.membership_target,
            filter_delta: mode == FilterMode::Delta,
            storyboard: scope.map(|s| s.storyboard.clone()),
            storyboard_id: scope.map(|s| s.storyboard_id.clone()),
        };
        let doc = self.transport.filter(&request)?;
        self.apply(doc)
    }

    pub fn clear_filter(&mut self, worksheet: &str, column: &str) -> Result<&Workbook, Error> {
        let filter = self.find_filter(worksheet, column)?;
        let dashboard = filter
            .scope
            .as_ref()
            .map_or_else(|| self.dashboard.clone(), |s| s.dashboard.clone());
        let doc = self
            .transport
            .clear_filter(worksheet, &filter.global_field_name, &dashboard)?;
        self.apply(doc)
    }

    /// Filters every worksheet of the dashboard on `column`, which must be a
    /// known filter of `worksheet` accepting every requested value.
    pub fn dashboard_filter<S: AsRef<str>>(
        &mut self,
        worksheet: &str,
        column: &str,
        values: &[S],
    ) -> Result<&Workbook, Error> {
        let filter = self.find_filter(worksheet, column)?;
        select::resolve_filter_indices(&filter, values, FilterMode::Replace)?;
        let values = values.iter().map(|v| v.as_ref().to_string()).collect::<Vec<_>>();
        let doc = self.transport.dashboard_filter(column, &values)?;
        self.apply(doc)
    }

    /// Sets the parameter whose control is labelled `column`.
    pub fn set_parameter(&mut self, column: &str, value: &str) -> Result<&Workbook, Error> {
        let name = self
            .session
            .parameter(column)
            .map(|p| p.parameter_name.clone())
            .ok_or_else(|| Error::NoSuchParameter(column.to_string()))?;
        debug!("Setting parameter {} to {}", name, value);
        let doc = self.transport.set_parameter_value(&name, value)?;
        self.apply(doc)
    }

    /// Switches to another sheet; it becomes the root dashboard.
    pub fn go_to_sheet(&mut self, sheet: &str) -> Result<&Workbook, Error> {
        let window_id = self
            .sheets()?
            .into_iter()
            .find(|s| s.sheet == sheet)
            .map(|s| s.window_id)
            .ok_or_else(|| Error::NoSuchSheet(sheet.to_string()))?;
        let doc = self.transport.go_to_sheet(&window_id)?;
        self.session.apply_update(&doc, &self.dashboard)?;
        self.dashboard = sheet.to_string();
        self.workbook = Workbook::from_command_response(&doc, &self.session)?;
        Ok(&self.workbook)
    }

    pub fn go_to_story_point(&mut self, story_point_id: i64) -> Result<&Workbook, Error> {
        let holder = self.story_points()?;
        if !holder.contains(story_point_id) {
            return Err(Error::NoSuchStoryPoint(story_point_id));
        }
        let doc = self
            .transport
            .set_active_story_point(&holder.story_board, story_point_id)?;
        self.apply(doc)
    }

    pub fn level_drill(&mut self, worksheet: &str, drill_down: bool, position: u32) -> Result<&Workbook, Error> {
        self.workbook.worksheet(worksheet)?;
        let doc = self.transport.level_drill(worksheet, drill_down, position)?;
        self.apply(doc)
    }

    /// The HTML tooltip of the mark at `(x, y)`.
    pub fn render_tooltip(&mut self, worksheet: &str, x: i64, y: i64) -> Result<String, Error> {
        self.workbook.worksheet(worksheet)?;
        let doc = self.transport.render_tooltip(worksheet, x, y)?;
        parameter::tooltip_text(&doc)
    }

    fn download(&mut self, doc: Document) -> Result<Columns, Error> {
        self.session.apply_update(&doc, &self.dashboard)?;
        workbook::download_columns(&doc, self.session.dictionary())
    }

    pub fn summary_data(&mut self, worksheet: &str) -> Result<Columns, Error> {
        let doc = self
            .transport
            .summary_data(worksheet, &self.dashboard, self.config.max_rows)?;
        self.download(doc)
    }

    pub fn underlying_data(&mut self, worksheet: &str) -> Result<Columns, Error> {
        let doc = self
            .transport
            .underlying_data(worksheet, &self.dashboard, self.config.max_rows)?;
        self.download(doc)
    }

    /// Exports a sheet as a crosstab and returns the key of the exported
    /// file.
    pub fn crosstab_result_key(&mut self, sheet: &str) -> Result<String, Error> {
        let dialog = self.transport.crosstab_dialog()?;
        let sheet_id = parameter::crosstab_sheet_id(&dialog, sheet)?;
        let export = self.transport.crosstab_export(&sheet_id)?;
        parameter::export_result_key(&export)
    }
}
