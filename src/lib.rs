//! Facade crate for the interlocking route audit.
//!
//! This crate re-exports the comparison domain and, behind the `data`
//! feature, the XML and database extractors.

#![forbid(unsafe_code)]

pub use itinerari_core::{
    CircuitEntry, CircuitPolicy, ComparisonOutcome, DiagnosticLog, Difference, FieldValue,
    LogFacade, MemorySink, ReconcileError, ReconcileSettings, ReportError, ReportSink, RouteId,
    RouteRecord, RouteStatus, RunSummary, Side, SwitchContainer, check_completeness, classify,
    compare_data, reconcile,
};

#[cfg(feature = "data")]
pub use itinerari_data::{DbExtractor, ReportFile, XmlExtractor};
