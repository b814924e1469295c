use crate::domain::{RtDiagError, RtDiagResult};
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const SPEC_FILE_GLOB: &str = "**/*.spec";
const DELAY_DUMP_SUFFIX: &str = ".delay_dump.spec";

pub fn spectrum_path(wd: &Path, root: &str) -> PathBuf {
    wd.join(format!("{root}.spec"))
}

/// Spectrum summed over every photon, written during the ionization cycles.
pub fn total_spectrum_path(wd: &Path, root: &str) -> PathBuf {
    wd.join(format!("{root}.log_spec_tot"))
}

pub fn diag_dir(wd: &Path, root: &str) -> PathBuf {
    wd.join(format!("diag_{root}"))
}

pub fn diag_path(wd: &Path, root: &str, process: usize) -> PathBuf {
    diag_dir(wd, root).join(format!("{root}_{process}.diag"))
}

pub fn optical_depth_path(wd: &Path, root: &str) -> PathBuf {
    diag_dir(wd, root).join(format!("{root}.tau_spec.diag"))
}

/// Lookup order for the rank-0 diagnostic file: under `wd`, then relative
/// to the current directory.
pub fn first_diag_candidates(wd: &Path, root: &str) -> [PathBuf; 2] {
    [diag_path(wd, root, 0), diag_path(Path::new(""), root, 0)]
}

/// Recursively collect `.spec` files under `search_root`, sorted.
pub fn find_spec_files(
    search_root: &Path,
    root: Option<&str>,
    include_delay_dump: bool,
) -> RtDiagResult<Vec<PathBuf>> {
    if !search_root.is_dir() {
        return Err(RtDiagError::not_found(
            "NOT_FOUND.SEARCH_ROOT",
            format!("search path '{}' is not a directory", search_root.display()),
        ));
    }
    let matcher = spec_matcher()?;
    let wanted_name = root.map(|root| format!("{root}.spec"));

    let mut files = Vec::new();
    collect_files_recursive(search_root, search_root, &matcher, &mut files)?;
    files.retain(|path| {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return false;
        };
        if !include_delay_dump && name.ends_with(DELAY_DUMP_SUFFIX) {
            return false;
        }
        wanted_name.as_deref().is_none_or(|wanted| name == wanted)
    });
    files.sort();
    debug!(count = files.len(), path = %search_root.display(), "found spec files");
    Ok(files)
}

/// `<root>_<N>.diag` files in `<wd>/diag_<root>`, ordered by `N`.
///
/// A missing diag directory yields an empty list.
pub fn diag_files(wd: &Path, root: &str) -> RtDiagResult<Vec<PathBuf>> {
    let directory = diag_dir(wd, root);
    if !directory.is_dir() {
        debug!(path = %directory.display(), "no diag directory");
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(&directory).map_err(|source| read_dir_error(&directory, &source))?;

    let prefix = format!("{root}_");
    let mut numbered = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| read_dir_error(&directory, &source))?;
        let path = entry.path();
        let process = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix(&prefix))
            .and_then(|rest| rest.strip_suffix(".diag"))
            .and_then(|number| number.parse::<usize>().ok());
        if let Some(process) = process {
            numbered.push((process, path));
        }
    }
    numbered.sort();
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

/// Split a simulation file path into its root name and containing directory.
///
/// The root is the file name up to its first `.`.
pub fn root_from_file_path(path: &Path) -> RtDiagResult<(String, PathBuf)> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            RtDiagError::input_type(
                "TYPE.ROOT_PATH",
                format!("'{}' does not name a file", path.display()),
            )
        })?;
    let root = name.split('.').next().unwrap_or(name);
    if root.is_empty() {
        return Err(RtDiagError::input_type(
            "TYPE.ROOT_PATH",
            format!("'{}' has no root name before its extension", path.display()),
        ));
    }
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((root.to_string(), directory))
}

fn spec_matcher() -> RtDiagResult<GlobMatcher> {
    Glob::new(SPEC_FILE_GLOB)
        .map(|glob| glob.compile_matcher())
        .map_err(|source| {
            RtDiagError::internal(
                "INTERNAL.GLOB",
                format!("invalid glob '{SPEC_FILE_GLOB}': {source}"),
            )
        })
}

fn collect_files_recursive(
    search_root: &Path,
    current_dir: &Path,
    matcher: &GlobMatcher,
    results: &mut Vec<PathBuf>,
) -> RtDiagResult<()> {
    let directory =
        fs::read_dir(current_dir).map_err(|source| read_dir_error(current_dir, &source))?;

    for entry in directory {
        let entry = entry.map_err(|source| read_dir_error(current_dir, &source))?;
        let entry_path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|source| read_dir_error(&entry_path, &source))?;

        if file_type.is_dir() {
            collect_files_recursive(search_root, &entry_path, matcher, results)?;
            continue;
        }

        let relative = entry_path.strip_prefix(search_root).unwrap_or(&entry_path);
        if file_type.is_file() && matcher.is_match(relative) {
            results.push(entry_path);
        }
    }

    Ok(())
}

fn read_dir_error(path: &Path, source: &std::io::Error) -> RtDiagError {
    RtDiagError::io_system(
        "IO.READ_DIR",
        format!("failed to list '{}': {}", path.display(), source),
    )
}
