//! Session configuration.

use std::{ffi::OsStr, fs, path::Path, str::FromStr};

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::json::{self, Object};
use crate::select::FilterMode;
use crate::Error;

/// File formats configuration can be loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedFormat {
    Json,
    Yaml,
    Toml,
}

impl FromStr for SupportedFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Ok(match lower.as_ref() {
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            "toml" => Self::Toml,
            _ => return Err(Error::UnsupportedFileType(s.to_string())),
        })
    }
}

/// Knobs of a scraping session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Row cap for summary and underlying data downloads.
    pub max_rows: u32,
    /// Forwarded with every filter request.
    pub membership_target: bool,
    pub filter_mode: FilterMode,
    /// Overrides the root dashboard announced by the bootstrap `info`.
    pub dashboard: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_rows: 200,
            membership_target: true,
            filter_mode: FilterMode::default(),
            dashboard: None,
        }
    }
}

impl Config {
    /// The root dashboard of a session: the configured one, else the
    /// bootstrap `info`'s `sheetName`, else empty.
    pub fn root_dashboard(&self, info: &Object) -> String {
        self.dashboard
            .clone()
            .or_else(|| json::opt_string(info, "sheetName"))
            .unwrap_or_default()
    }

    /// Parses configuration from a string in the given format.
    pub fn load_as(fmt: SupportedFormat, content: &str) -> Result<Self, Error> {
        Ok(match fmt {
            SupportedFormat::Json => serde_json::from_str(content)?,
            SupportedFormat::Yaml => serde_yaml::from_str(content)?,
            SupportedFormat::Toml => toml::from_str(content)?,
        })
    }

    /// Loads configuration from a file, detecting the format from its
    /// extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .ok_or_else(|| Error::CannotDetermineFileType(path.to_path_buf()))?;
        let fmt = SupportedFormat::from_str(ext)?;
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("while trying to read from {}", path.display()), e))?;
        Self::load_as(fmt, &content)
            .wrap_err_with(|| format!("failed to parse configuration from {}", path.display()))
    }
}
