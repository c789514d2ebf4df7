//! VizQL decodes the documents a Tableau-style dashboard server sends to its
//! browser client into worksheets, tables, filters and parameters, and keeps
//! the state of an interactive session in step with the command responses
//! that follow the bootstrap.
//!
//! The crate does no networking. A [`Transport`] implementation supplies the
//! raw documents and [`Scraper`] drives a session over it. For an offline
//! inspector over saved documents, see the `vizql-cli` crate.

mod bootstrap;
pub mod columns;
mod config;
pub mod dictionary;
mod error;
pub mod filter;
mod json;
pub mod locate;
pub mod parameter;
mod scraper;
mod select;
mod session;
mod transport;
mod workbook;
pub mod zone;

#[cfg(test)]
mod fixtures;

pub use bootstrap::split_bootstrap;
pub use columns::{ColumnOptions, IndicesInfo};
pub use config::{Config, SupportedFormat};
pub use dictionary::{Columns, DataDictionary, FullData};
pub use error::Error;
pub use filter::{Filter, FilterMap, StoryScope};
pub use json::Object;
pub use locate::{PresModel, Shape};
pub use parameter::{ParameterInfo, Sheet, StoryPointEntry, StoryPointHolder};
pub use scraper::Scraper;
pub use select::{resolve_filter_indices, resolve_select_index, FilterIndices, FilterMode};
pub use session::SessionState;
pub use transport::{Document, FilterRequest, Transport};
pub use workbook::{download_columns, SelectableItem, Table, Workbook, Worksheet};
