// src/config/options.rs
use std::path::Path;
use std::time::Duration;

use super::consts::*;

/// How the client talks to the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    pub base_url: String,
    pub dataset: String,
    pub per_page: u32,
    pub timeout: Duration,
    /// Local request ledger size per window; `None` disables the check.
    pub quota: Option<u32>,
    pub quota_window: Duration,
    /// Log requested fields that came back without a column.
    pub warn_unresolved: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            base_url: s!(BASE_URL),
            dataset: s!(DATASET),
            per_page: DEFAULT_PER_PAGE,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            quota: Some(DEFAULT_QUOTA_PER_WINDOW),
            quota_window: Duration::from_secs(QUOTA_WINDOW_SECS),
            warn_unresolved: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }

    /// Field separator for the delimited formats.
    pub fn delim(&self) -> Option<char> {
        match self {
            ExportFormat::Csv => Some(','),
            ExportFormat::Tsv => Some('\t'),
            ExportFormat::Json => None,
        }
    }

    /// Infer format from file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .and_then(|ext| match ext.as_str() {
                "csv" => Some(ExportFormat::Csv),
                "tsv" | "tab" => Some(ExportFormat::Tsv),
                "json" => Some(ExportFormat::Json),
                _ => None,
            })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// What the user typed: empty, a directory, or a file path.
    pub out: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            out: s!(),
        }
    }
}

impl ExportOptions {
    /// Build from a user path, taking the format from its extension when it has one.
    pub fn for_path(out: &str, format: Option<ExportFormat>) -> Self {
        let format = format
            .or_else(|| ExportFormat::from_extension(Path::new(out)))
            .unwrap_or(ExportFormat::Csv);
        Self { format, out: s!(out) }
    }

    /// `<DEFAULT_FILE>.<ext>` for the current format.
    pub fn default_filename(&self) -> String {
        join!(DEFAULT_FILE, ".", self.format.ext())
    }
}
