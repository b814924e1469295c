//! Ingestion and diagnostics for radiative-transfer simulation output.
//!
//! `modules::spectrum` turns `.spec` tables into typed spectra and panel
//! inputs, `modules::diag` scans per-process `.diag` logs for convergence and
//! error summaries, and `numerics`/`common` hold the shared smoothing, axis
//! limit and line catalog helpers.

pub mod common;
pub mod domain;
pub mod modules;
pub mod numerics;

pub use domain::{AxisScale, RtDiagError, RtDiagErrorCategory, RtDiagResult, SpectralAxis};
