//! # Query building
//!
//! Turns a filter, a list of dotted field names and paging options into the
//! one URL the Scorecard endpoint understands.
//!
//! ```text
//! <base><dataset>?<filter>&fields=<f1,f2,…>&per_page=<n>&page=<n>&api_key=<key>
//! ```
//!
//! - Exactly one server-side filter per request. Extra constraints are applied
//!   to the returned table with `ResultTable::filter`.
//! - Field order is kept as given.
//! - Field names are not checked against any schema; an unknown name simply
//!   comes back without a column.
//! - Building the URL has no failure modes. `RequestDescriptor::validate` is
//!   the pre-flight check the client runs before touching the network.

pub mod field;
pub mod filter;
pub mod request;

pub use field::{parse_field_list, FieldSpec, Period};
pub use filter::{Filter, FilterOp};
pub use request::RequestDescriptor;
