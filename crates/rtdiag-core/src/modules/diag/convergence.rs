//! Convergence statistics from the rank-0 diagnostic file.
//!
//! Every ionization cycle logs a `!!Check_convergence` line with the fraction
//! of wind cells that have converged and the fraction still converging. At
//! the end of the run the same statistics are repeated inside a brief
//! summary block, which must not be counted as an extra cycle.

use crate::domain::{RtDiagError, RtDiagResult};
use crate::modules::discovery::first_diag_candidates;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONVERGENCE_NOT_FOUND: f64 = -1.0;

const BRIEF_SUMMARY_ANNOUNCEMENT: &str =
    "Convergence statistics for the wind after the ionization calculation:";
const BRIEF_SUMMARY_FALLBACK_LINES: usize = 9;
const CELL_COUNT_TOKEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceField {
    #[default]
    Converged,
    Converging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvergenceQuery {
    pub field: ConvergenceField,
    pub per_cycle: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConvergenceOutput {
    Last(f64),
    PerCycle(Vec<f64>),
}

/// Per-cycle convergence and converging fractions, in log order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConvergenceReport {
    pub converged: Vec<f64>,
    pub converging: Vec<f64>,
}

impl ConvergenceReport {
    pub fn series(&self, field: ConvergenceField) -> &[f64] {
        match field {
            ConvergenceField::Converged => &self.converged,
            ConvergenceField::Converging => &self.converging,
        }
    }

    /// Value from the final cycle, or `CONVERGENCE_NOT_FOUND`.
    pub fn last(&self, field: ConvergenceField) -> f64 {
        self.series(field)
            .last()
            .copied()
            .unwrap_or(CONVERGENCE_NOT_FOUND)
    }

    pub fn select(&self, query: ConvergenceQuery) -> ConvergenceOutput {
        if query.per_cycle {
            ConvergenceOutput::PerCycle(self.series(query.field).to_vec())
        } else {
            ConvergenceOutput::Last(self.last(query.field))
        }
    }
}

/// Fractions of cells passing each individual convergence test per cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConvergenceBreakdown {
    pub radiation_temperature: Vec<f64>,
    pub electron_temperature: Vec<f64>,
    pub max_electron_temperature: Vec<f64>,
    pub heating_cooling: Vec<f64>,
}

impl ConvergenceBreakdown {
    pub fn cycles(&self) -> usize {
        self.radiation_temperature.len()
    }

    fn push(&mut self, values: [f64; 4]) {
        self.radiation_temperature.push(values[0]);
        self.electron_temperature.push(values[1]);
        self.max_electron_temperature.push(values[2]);
        self.heating_cooling.push(values[3]);
    }
}

/// Tracks whether the scanner is inside the end-of-run brief summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    BriefSummary { remaining: usize },
}

impl ScanState {
    fn advance(self, line: &str) -> Self {
        if line.contains(BRIEF_SUMMARY_ANNOUNCEMENT) {
            return Self::BriefSummary {
                remaining: BRIEF_SUMMARY_FALLBACK_LINES,
            };
        }
        match self {
            Self::Scanning => Self::Scanning,
            Self::BriefSummary { .. } if line.trim().is_empty() => Self::Scanning,
            Self::BriefSummary { remaining } if remaining <= 1 => Self::Scanning,
            Self::BriefSummary { remaining } => Self::BriefSummary {
                remaining: remaining - 1,
            },
        }
    }
}

pub fn scan_convergence(source: &str) -> ConvergenceReport {
    let mut report = ConvergenceReport::default();
    let mut state = ScanState::Scanning;

    for (index, line) in source.lines().enumerate() {
        let in_summary = matches!(state, ScanState::BriefSummary { .. })
            && !line.contains(BRIEF_SUMMARY_ANNOUNCEMENT);
        state = state.advance(line);

        if !(line.contains("converged") && line.contains("converging")) {
            continue;
        }
        if in_summary {
            debug!(line = index + 1, "skipping brief-summary convergence line");
            continue;
        }

        let mut fractions = parenthesized_values(line);
        let converged = fractions.next().unwrap_or(CONVERGENCE_NOT_FOUND);
        let converging = fractions.next().unwrap_or(CONVERGENCE_NOT_FOUND);
        if converged == CONVERGENCE_NOT_FOUND || converging == CONVERGENCE_NOT_FOUND {
            debug!(line = index + 1, "unparseable convergence fraction");
        }
        report.converged.push(converged);
        report.converging.push(converging);
    }

    report
}

pub fn scan_convergence_breakdown(source: &str) -> ConvergenceBreakdown {
    let lines = source.lines().collect::<Vec<_>>();
    let mut breakdown = ConvergenceBreakdown::default();

    for (index, line) in lines.iter().enumerate() {
        if !(line.contains("t_r") && line.contains("t_e(real)") && line.contains("hc(real)")) {
            continue;
        }
        if index >= 2 && lines[index - 2].contains(BRIEF_SUMMARY_ANNOUNCEMENT) {
            continue;
        }
        let previous = index.checked_sub(1).map(|prev| lines[prev]);
        let fractions = previous
            .and_then(|previous| breakdown_fractions(previous, line))
            .unwrap_or_else(|| {
                debug!(line = index + 1, "unparseable convergence breakdown");
                [CONVERGENCE_NOT_FOUND; 4]
            });
        breakdown.push(fractions);
    }

    breakdown
}

/// Read the rank-0 diag file for `root`, trying `wd` first.
pub fn read_first_diag(root: &str, wd: &Path) -> RtDiagResult<(PathBuf, String)> {
    let candidates = first_diag_candidates(wd, root);
    for candidate in &candidates {
        match fs::read_to_string(candidate) {
            Ok(source) => return Ok((candidate.clone(), source)),
            Err(source) => {
                debug!(path = %candidate.display(), %source, "diag candidate unreadable")
            }
        }
    }
    warn!(root, "unable to find {root}_0.diag");
    Err(RtDiagError::not_found(
        "NOT_FOUND.DIAG_FILE",
        format!(
            "unable to find {root}_0.diag at '{}' or '{}'",
            candidates[0].display(),
            candidates[1].display()
        ),
    ))
}

pub fn check_convergence(
    root: &str,
    wd: &Path,
    query: ConvergenceQuery,
) -> RtDiagResult<ConvergenceOutput> {
    let (path, source) = read_first_diag(root, wd)?;
    let report = scan_convergence(&source);
    debug!(path = %path.display(), cycles = report.converged.len(), "scanned convergence");
    Ok(report.select(query))
}

pub fn check_convergence_breakdown(root: &str, wd: &Path) -> RtDiagResult<ConvergenceBreakdown> {
    let (_, source) = read_first_diag(root, wd)?;
    Ok(scan_convergence_breakdown(&source))
}

fn parenthesized_values(line: &str) -> impl Iterator<Item = f64> + '_ {
    line.split_whitespace()
        .filter_map(|token| token.strip_prefix('(')?.strip_suffix(')'))
        .map(|inner| inner.parse::<f64>().unwrap_or(CONVERGENCE_NOT_FOUND))
}

fn breakdown_fractions(previous: &str, line: &str) -> Option<[f64; 4]> {
    let cells = previous
        .split_whitespace()
        .nth(CELL_COUNT_TOKEN)?
        .parse::<u64>()
        .ok()
        .filter(|cells| *cells > 0)? as f64;
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    let mut fractions = [0.0; 4];
    for (slot, token_index) in fractions.iter_mut().zip([2, 4, 6, 8]) {
        let passed = tokens.get(token_index)?.parse::<u64>().ok()?;
        *slot = passed as f64 / cells;
    }
    Some(fractions)
}
