//! Scanners for per-process diagnostic logs.

pub mod convergence;
pub mod errors;

pub use convergence::{
    CONVERGENCE_NOT_FOUND, ConvergenceBreakdown, ConvergenceField, ConvergenceOutput,
    ConvergenceQuery, ConvergenceReport, check_convergence, check_convergence_breakdown,
    read_first_diag, scan_convergence, scan_convergence_breakdown,
};
pub use errors::{
    BrokenDiag, DiagSource, ErrorSummary, MissingMarker, aggregate_errors,
    require_error_summary, tally_error_regions,
};
