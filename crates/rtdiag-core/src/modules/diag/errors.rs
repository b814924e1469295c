//! Error-summary aggregation across per-process diagnostic files.

use crate::domain::{RtDiagError, RtDiagResult};
use crate::modules::discovery::diag_files;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const ERROR_SUMMARY_START: &str = "Error summary: End of program";
const ERROR_SUMMARY_END: &str = "Run py_error.py for full";

/// Which diagnostic files to aggregate.
#[derive(Debug, Clone, Copy)]
pub enum DiagSource<'a> {
    Explicit(&'a [PathBuf]),
    Discover { root: &'a str, wd: &'a Path },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenDiag {
    pub index: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    pub totals: BTreeMap<String, u64>,
    pub parsed_files: usize,
    pub broken: Vec<BrokenDiag>,
    /// File whose error summary markers were missing, if aggregation aborted.
    pub aborted: Option<PathBuf>,
}

impl ErrorSummary {
    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    /// Totals divided by the number of parsed files, floored.
    ///
    /// A message that was reported at all never averages below one.
    pub fn per_process_average(&self) -> BTreeMap<String, u64> {
        let processes = self.parsed_files.max(1) as u64;
        self.totals
            .iter()
            .map(|(message, count)| (message.clone(), (count / processes).max(1)))
            .collect()
    }
}

/// A diag file that opened but had no complete error summary region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingMarker {
    Start,
    End,
}

/// Tally every error-summary region in one diag file.
pub fn tally_error_regions(source: &str) -> Result<BTreeMap<String, u64>, MissingMarker> {
    let lines = source.lines().collect::<Vec<_>>();
    let mut tally = BTreeMap::new();
    let mut cursor = 0;
    let mut regions = 0;

    while let Some(offset) = lines[cursor..]
        .iter()
        .position(|line| line.contains(ERROR_SUMMARY_START))
    {
        let start = cursor + offset;
        let end = lines[start + 1..]
            .iter()
            .position(|line| line.contains(ERROR_SUMMARY_END))
            .map(|offset| start + 1 + offset)
            .ok_or(MissingMarker::End)?;

        for line in &lines[start + 1..end] {
            if let Some((count, message)) = tally_line(line) {
                *tally.entry(message).or_insert(0) += count;
            }
        }
        regions += 1;
        cursor = end + 1;
    }

    if regions == 0 {
        return Err(MissingMarker::Start);
    }
    Ok(tally)
}

pub fn aggregate_errors(
    source: DiagSource<'_>,
    process_limit: Option<usize>,
) -> RtDiagResult<ErrorSummary> {
    let mut files = match source {
        DiagSource::Explicit(paths) => paths.to_vec(),
        DiagSource::Discover { root, wd } => diag_files(wd, root)?,
    };
    if let Some(limit) = process_limit {
        files.truncate(limit);
    }

    let mut summary = ErrorSummary::default();
    if files.is_empty() {
        info!("no diag files to aggregate");
        return Ok(summary);
    }

    for (index, path) in files.iter().enumerate() {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) => {
                warn!(index, path = %path.display(), %source, "unable to open diag file");
                summary.broken.push(BrokenDiag {
                    index,
                    path: path.clone(),
                });
                continue;
            }
        };

        match tally_error_regions(&text) {
            Ok(tally) => {
                for (message, count) in tally {
                    *summary.totals.entry(message).or_insert(0) += count;
                }
                summary.parsed_files += 1;
            }
            Err(marker) => {
                warn!(
                    path = %path.display(),
                    ?marker,
                    "unable to find error summary, discarding all totals"
                );
                summary.totals.clear();
                summary.aborted = Some(path.clone());
                return Ok(summary);
            }
        }
    }

    debug!(
        parsed = summary.parsed_files,
        broken = summary.broken.len(),
        messages = summary.totals.len(),
        "aggregated error summaries"
    );
    Ok(summary)
}

/// Like [`aggregate_errors`] but fails when the aggregation aborted.
pub fn require_error_summary(
    source: DiagSource<'_>,
    process_limit: Option<usize>,
) -> RtDiagResult<ErrorSummary> {
    let summary = aggregate_errors(source, process_limit)?;
    if let Some(path) = &summary.aborted {
        return Err(RtDiagError::format(
            "FORMAT.ERROR_SUMMARY_MARKERS",
            format!("'{}' has no complete error summary", path.display()),
        ));
    }
    Ok(summary)
}

fn tally_line(line: &str) -> Option<(u64, String)> {
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    let first = tokens.first()?;
    if !first.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    let count = first.parse::<u64>().ok()?;
    Some((count, tokens.get(2..).unwrap_or(&[]).join(" ")))
}

#[cfg(test)]
mod tests {
    use super::{DiagSource, ErrorSummary, MissingMarker, aggregate_errors, tally_error_regions};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn region(body: &str) -> String {
        format!(
            "cycle output\nError summary: End of program, Thread 0 only\n\
             Recurrences --  Description\n{body}Run py_error.py for full error information\n"
        )
    }

    fn write(path: &Path, content: &str) -> PathBuf {
        fs::write(path, content).expect("diag should be written");
        path.to_path_buf()
    }

    #[test]
    fn only_digit_led_lines_inside_the_region_are_counted() {
        let tally = tally_error_regions(&region(
            "     3  times  disk error\n  12 -- photon lost in cell 4\nnot a 5 count\n",
        ))
        .expect("region should parse");
        assert_eq!(tally.get("disk error"), Some(&3));
        assert_eq!(tally.get("photon lost in cell 4"), Some(&12));
        assert_eq!(tally.len(), 2);
    }

    #[test]
    fn markers_must_be_present() {
        assert_eq!(
            tally_error_regions("3 times disk error\n"),
            Err(MissingMarker::Start)
        );
        assert_eq!(
            tally_error_regions("Error summary: End of program\n3 times disk error\n"),
            Err(MissingMarker::End)
        );
    }

    #[test]
    fn totals_sum_across_files() {
        let temp = TempDir::new().expect("tempdir should be created");
        let files = vec![
            write(&temp.path().join("a_0.diag"), &region("3  times  disk error\n")),
            write(&temp.path().join("a_1.diag"), &region("3  times  disk error\n")),
        ];
        let summary = aggregate_errors(DiagSource::Explicit(&files), None).expect("summary");
        assert_eq!(summary.totals.get("disk error"), Some(&6));
        assert!(summary.broken.is_empty());
        assert_eq!(summary.parsed_files, 2);
        assert_eq!(summary.per_process_average().get("disk error"), Some(&3));
    }

    #[test]
    fn rare_messages_average_to_at_least_one() {
        let mut summary = ErrorSummary {
            parsed_files: 4,
            ..ErrorSummary::default()
        };
        summary.totals.insert("rare error".to_string(), 1);
        summary.totals.insert("common error".to_string(), 9);

        let average = summary.per_process_average();
        assert_eq!(average.get("rare error"), Some(&1));
        assert_eq!(average.get("common error"), Some(&2));
    }

    #[test]
    fn missing_end_marker_aborts_with_empty_totals() {
        let temp = TempDir::new().expect("tempdir should be created");
        let good = region("3  times  disk error\n");
        let truncated = "Error summary: End of program\n3  times  disk error\n";
        let files = vec![
            write(&temp.path().join("a_0.diag"), &good),
            write(&temp.path().join("a_1.diag"), &good),
            write(&temp.path().join("a_2.diag"), truncated),
        ];
        let summary = aggregate_errors(DiagSource::Explicit(&files), None).expect("summary");
        assert!(summary.totals.is_empty());
        assert!(summary.is_aborted());
        assert_eq!(summary.aborted.as_deref(), Some(files[2].as_path()));
    }

    #[test]
    fn unreadable_files_are_recorded_as_broken() {
        let temp = TempDir::new().expect("tempdir should be created");
        let files = vec![
            temp.path().join("missing_0.diag"),
            write(&temp.path().join("a_1.diag"), &region("5  times  bad cell\n")),
        ];
        let summary = aggregate_errors(DiagSource::Explicit(&files), None).expect("summary");
        assert_eq!(summary.broken.len(), 1);
        assert_eq!(summary.broken[0].index, 0);
        assert_eq!(summary.totals.get("bad cell"), Some(&5));
        assert_eq!(summary.per_process_average().get("bad cell"), Some(&5));
    }

    #[test]
    fn discovery_honours_the_process_limit() {
        let temp = TempDir::new().expect("tempdir should be created");
        let diag_dir = temp.path().join("diag_run");
        fs::create_dir_all(&diag_dir).expect("diag dir should be created");
        for process in 0..3 {
            write(
                &diag_dir.join(format!("run_{process}.diag")),
                &region("2  times  x error\n"),
            );
        }
        let source = DiagSource::Discover {
            root: "run",
            wd: temp.path(),
        };
        let limited = aggregate_errors(source, Some(2)).expect("summary");
        assert_eq!(limited.totals.get("x error"), Some(&4));
        let all = aggregate_errors(source, None).expect("summary");
        assert_eq!(all.totals.get("x error"), Some(&6));

        let empty = aggregate_errors(
            DiagSource::Discover {
                root: "none",
                wd: temp.path(),
            },
            None,
        )
        .expect("summary");
        assert!(empty.totals.is_empty());
        assert!(!empty.is_aborted());
    }
}
