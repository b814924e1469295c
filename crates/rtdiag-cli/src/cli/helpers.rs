use super::CliError;
use anyhow::Context;
use rtdiag_core::common::config::{PlotStyle, load_plot_style};
use rtdiag_core::domain::{AxisScale, RtDiagError};
use rtdiag_core::modules::serialization::{to_json_text, write_json_artifact};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub(super) const LOG_ENV: &str = "RTDIAG_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

pub(super) fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // Ignored when a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

pub(super) fn load_style(path: Option<&Path>) -> Result<PlotStyle, CliError> {
    let Some(path) = path else {
        return Ok(PlotStyle::default());
    };
    let style = load_plot_style(path)
        .with_context(|| format!("failed to load style file '{}'", path.display()))?;
    Ok(style)
}

pub(super) fn parse_scale(name: &str) -> Result<AxisScale, CliError> {
    AxisScale::from_name(name).ok_or_else(|| {
        CliError::Usage(format!(
            "unknown axis scale '{name}'; expected one of linear, logx, logy, loglog"
        ))
    })
}

pub(super) fn current_working_dir() -> Result<PathBuf, CliError> {
    std::env::current_dir().map_err(|source| {
        CliError::Core(RtDiagError::io_system(
            "IO.CLI_CURRENT_DIR",
            format!("failed to read current working directory: {}", source),
        ))
    })
}

pub(super) fn resolve_cli_path(working_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    }
}

/// Write `value` as JSON to `output`, or to stdout when no path is given.
pub(super) fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), CliError> {
    match output {
        Some(path) => {
            let path = resolve_cli_path(&current_working_dir()?, path);
            write_json_artifact(&path, value)?;
            println!("JSON output: {}", path.display());
        }
        None => print!("{}", to_json_text(value)?),
    }
    Ok(())
}
