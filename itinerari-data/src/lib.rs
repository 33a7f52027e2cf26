//! Data access for the route audit.
//!
//! Responsibilities:
//! - Extract route records from the plant XML export and the interlocking
//!   database.
//! - Persist the audit report to `Report.txt`.
//!
//! Boundaries:
//! - Do not encode comparison rules (live in `itinerari-core`).
//! - Sources are opened read-only and never mutated.

#![forbid(unsafe_code)]

mod db;
mod report;
mod xml;

pub use db::{DbExtractError, DbExtractor, extract_routes, state_code};
pub use report::{REPORT_BANNER, REPORT_FILE_NAME, ReportFile};
pub use xml::{DEFAULT_PLANT_ID, XmlExtractError, XmlExtractor};
