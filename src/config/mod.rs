// src/config/mod.rs

pub mod consts;
pub mod credential;
pub mod options;

pub use credential::Credential;
pub use options::{ExportFormat, ExportOptions, FetchOptions};
