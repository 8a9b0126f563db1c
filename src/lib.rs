// src/lib.rs
//! # scorecard
//!
//! Library + CLI for the College Scorecard API: build the request URL, issue
//! one blocking GET, flatten the JSON `results` into a table keyed by record
//! `id`, then export it or run a few quick statistics.
//!
//! ```no_run
//! use scorecard::{Credential, FetchOptions, ScorecardClient};
//!
//! let mut client = ScorecardClient::new(FetchOptions::default())?;
//! let desc = client
//!     .request("latest.student.size__range=25000..".parse()?, Credential::from_env()?)
//!     .fields(["id", "school.name", "latest.student.size"]);
//! let table = client.fetch(&desc)?;
//! println!("{} schools", table.len());
//! # Ok::<(), scorecard::ScorecardError>(())
//! ```

#[macro_use]
pub mod macros;

pub mod client;
pub mod config;

pub mod csv;
pub mod error;
pub mod file;
pub mod flatten;
pub mod log;
pub mod net;
pub mod progress;
pub mod query;
pub mod stats;
pub mod table;

#[cfg(feature = "cli")]
pub mod cli;

pub use client::{Pages, ScorecardClient};
pub use config::{Credential, ExportFormat, ExportOptions, FetchOptions};
pub use error::{Result, ScorecardError};
pub use flatten::{flatten, flatten_page, PageMeta};
pub use query::{FieldSpec, Filter, RequestDescriptor};
pub use table::{Cell, RecordId, ResultTable};
