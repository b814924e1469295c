use super::CliError;
use super::helpers::{current_working_dir, emit_json, load_style, parse_scale, resolve_cli_path};
use rtdiag_core::common::lines::{Catalog, CatalogView};
use rtdiag_core::domain::SpectralAxis;
use rtdiag_core::modules::diag::{
    ConvergenceField, ConvergenceOutput, ConvergenceQuery, DiagSource, aggregate_errors,
    check_convergence, check_convergence_breakdown,
};
use rtdiag_core::modules::discovery::{
    find_spec_files, optical_depth_path, root_from_file_path, spectrum_path, total_spectrum_path,
};
use rtdiag_core::modules::spectrum::{
    AngleInput, OpticalDepthPanelRequest, SpectraPanelsRequest, Spectrum,
    SpectrumComponentsRequest, SpectrumPanelRequest, inclinations_from_paths, optical_depth_panel,
    spectra_panels, spectrum_components_panels, spectrum_panel,
};
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args)]
pub(super) struct SpectrumArgs {
    /// Simulation root name
    root: String,

    /// Directory containing `<root>.spec`
    #[arg(long, default_value = ".")]
    wd: PathBuf,

    /// Inclination to plot
    #[arg(long, short = 'i')]
    inclination: String,

    /// Lower x bound
    #[arg(long, allow_negative_numbers = true)]
    xmin: Option<f64>,

    /// Upper x bound
    #[arg(long, allow_negative_numbers = true)]
    xmax: Option<f64>,

    /// Boxcar width; defaults to the style's smoothing width
    #[arg(long)]
    smooth: Option<usize>,

    /// Axis scale: linear, logx, logy or loglog
    #[arg(long)]
    scale: Option<String>,

    /// Use frequency instead of wavelength for the x axis
    #[arg(long)]
    frequency: bool,

    /// Omit line identifications
    #[arg(long)]
    no_line_ids: bool,

    #[command(flatten)]
    output: OutputFlags,
}

#[derive(clap::Args)]
pub(super) struct SpectraArgs {
    /// Simulation root name
    root: String,

    /// Directory containing `<root>.spec`
    #[arg(long, default_value = ".")]
    wd: PathBuf,

    /// Lower x bound
    #[arg(long, allow_negative_numbers = true)]
    xmin: Option<f64>,

    /// Upper x bound
    #[arg(long, allow_negative_numbers = true)]
    xmax: Option<f64>,

    /// Boxcar width; defaults to the style's smoothing width
    #[arg(long)]
    smooth: Option<usize>,

    /// Axis scale: linear, logx, logy or loglog
    #[arg(long)]
    scale: Option<String>,

    /// Use frequency instead of wavelength for the x axis
    #[arg(long)]
    frequency: bool,

    /// Omit line identifications
    #[arg(long)]
    no_line_ids: bool,

    #[command(flatten)]
    output: OutputFlags,
}

#[derive(clap::Args)]
pub(super) struct ComponentsArgs {
    /// Simulation root name
    root: String,

    /// Directory containing the spectrum files
    #[arg(long, default_value = ".")]
    wd: PathBuf,

    /// Read `<root>.log_spec_tot` instead of `<root>.spec`; implies --frequency
    #[arg(long)]
    spec_tot: bool,

    /// Lower x bound
    #[arg(long, allow_negative_numbers = true)]
    xmin: Option<f64>,

    /// Upper x bound
    #[arg(long, allow_negative_numbers = true)]
    xmax: Option<f64>,

    /// Boxcar width; defaults to the style's smoothing width
    #[arg(long)]
    smooth: Option<usize>,

    /// Use a linear y axis
    #[arg(long)]
    linear_y: bool,

    /// Use frequency instead of wavelength for the x axis
    #[arg(long)]
    frequency: bool,

    /// Keep components that are mostly empty
    #[arg(long)]
    keep_sparse: bool,

    #[command(flatten)]
    output: OutputFlags,
}

#[derive(clap::Args)]
pub(super) struct OpticalDepthArgs {
    /// Simulation root name
    root: String,

    /// Simulation directory containing `diag_<root>`
    #[arg(long, default_value = ".")]
    wd: PathBuf,

    /// Inclinations to include; `all` selects every inclination
    #[arg(long = "inclination", short = 'i', default_value = "all")]
    inclinations: Vec<String>,

    /// Lower x bound
    #[arg(long, allow_negative_numbers = true)]
    xmin: Option<f64>,

    /// Upper x bound
    #[arg(long, allow_negative_numbers = true)]
    xmax: Option<f64>,

    /// Axis scale: linear, logx, logy or loglog
    #[arg(long, default_value = "loglog")]
    scale: String,

    /// Use wavelength instead of frequency for the x axis
    #[arg(long)]
    wavelength: bool,

    /// Omit absorption edge labels
    #[arg(long)]
    no_edges: bool,

    #[command(flatten)]
    output: OutputFlags,
}

#[derive(clap::Args)]
pub(super) struct OutputFlags {
    /// JSON style file for labels, smoothing and y-limit scaling
    #[arg(long)]
    style: Option<PathBuf>,

    /// Write JSON to this path instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct InclinationsArgs {
    /// Spectrum files to read
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Report whether this angle is present instead of listing all
    #[arg(long)]
    check: Option<String>,
}

#[derive(clap::Args)]
pub(super) struct ConvergenceArgs {
    /// Simulation root name
    root: String,

    /// Simulation directory containing `diag_<root>`
    #[arg(long, default_value = ".")]
    wd: PathBuf,

    /// Report the fraction still converging instead of converged
    #[arg(long)]
    converging: bool,

    /// Report every cycle instead of the final one
    #[arg(long)]
    per_cycle: bool,

    /// Report the per-test breakdown
    #[arg(long, conflicts_with_all = ["converging", "per_cycle"])]
    breakdown: bool,

    /// Print JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct ErrorsArgs {
    /// Simulation root name
    root: Option<String>,

    /// Simulation directory containing `diag_<root>`
    #[arg(long, default_value = ".")]
    wd: PathBuf,

    /// Explicit diag files to read instead of discovering them
    #[arg(long = "file", conflicts_with = "root")]
    files: Vec<PathBuf>,

    /// Only read the first N processes
    #[arg(long)]
    cores: Option<usize>,

    /// Divide totals by the number of processes read, in text and JSON output
    #[arg(long)]
    average: bool,

    /// Print JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct LinesArgs {
    /// Catalog: lines, edges or photo
    #[arg(long, default_value = "lines")]
    catalog: String,

    /// Convert wavelengths to frequencies
    #[arg(long)]
    frequency: bool,

    /// Report log10 values
    #[arg(long)]
    log: bool,

    /// Print JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct FindSpecsArgs {
    /// Directory to search
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Only report `<root>.spec`
    #[arg(long)]
    root: Option<String>,

    /// Include `.delay_dump.spec` files
    #[arg(long)]
    include_delay_dump: bool,

    /// Print the root name and directory of each file
    #[arg(long)]
    roots: bool,
}

pub(super) fn run_spectrum_command(args: SpectrumArgs) -> Result<i32, CliError> {
    let style = load_style(args.output.style.as_deref())?;
    let path = spectrum_path(&args.wd, &args.root);
    let spectrum = Spectrum::read(&path)?;

    let request = SpectrumPanelRequest {
        axis: SpectralAxis::from_frequency_space(args.frequency),
        xmin: args.xmin,
        xmax: args.xmax,
        smooth_width: args.smooth,
        scale: args.scale.as_deref().map(parse_scale).transpose()?,
        show_line_ids: !args.no_line_ids,
        ..SpectrumPanelRequest::new(AngleInput::Text(args.inclination))
    };
    let panel = spectrum_panel(&spectrum, &request, &style)?;
    info!(path = %path.display(), points = panel.x.len(), "built spectrum panel");
    emit_json(&panel, args.output.output.as_deref())?;
    Ok(0)
}

pub(super) fn run_spectra_command(args: SpectraArgs) -> Result<i32, CliError> {
    let style = load_style(args.output.style.as_deref())?;
    let spectrum = Spectrum::read(&spectrum_path(&args.wd, &args.root))?;

    let request = SpectraPanelsRequest {
        axis: SpectralAxis::from_frequency_space(args.frequency),
        xmin: args.xmin,
        xmax: args.xmax,
        smooth_width: args.smooth,
        scale: args.scale.as_deref().map(parse_scale).transpose()?,
        show_line_ids: !args.no_line_ids,
    };
    let panels = spectra_panels(&spectrum, &request, &style)?;
    info!(root = %args.root, panels = panels.len(), "built inclination panels");
    emit_json(&panels, args.output.output.as_deref())?;
    Ok(0)
}

pub(super) fn run_components_command(args: ComponentsArgs) -> Result<i32, CliError> {
    let style = load_style(args.output.style.as_deref())?;
    let path = if args.spec_tot {
        total_spectrum_path(&args.wd, &args.root)
    } else {
        spectrum_path(&args.wd, &args.root)
    };
    let spectrum = Spectrum::read(&path)?;

    let request = SpectrumComponentsRequest {
        axis: SpectralAxis::from_frequency_space(args.frequency || args.spec_tot),
        xmin: args.xmin,
        xmax: args.xmax,
        smooth_width: args.smooth,
        log_y: !args.linear_y,
        skip_sparse: !args.keep_sparse,
    };
    let panels = spectrum_components_panels(&spectrum, &request, &style)?;
    info!(path = %path.display(), "built spectrum component panels");
    emit_json(&panels, args.output.output.as_deref())?;
    Ok(0)
}

pub(super) fn run_optical_depth_command(args: OpticalDepthArgs) -> Result<i32, CliError> {
    let style = load_style(args.output.style.as_deref())?;
    let path = optical_depth_path(&args.wd, &args.root);
    let spectrum = Spectrum::read(&path)?;

    let request = OpticalDepthPanelRequest {
        inclinations: args.inclinations,
        axis: SpectralAxis::from_frequency_space(!args.wavelength),
        xmin: args.xmin,
        xmax: args.xmax,
        scale: parse_scale(&args.scale)?,
        show_edges: !args.no_edges,
    };
    let panel = optical_depth_panel(&spectrum, &request, &style)?;
    info!(path = %path.display(), series = panel.series.len(), "built optical depth panel");
    emit_json(&panel, args.output.output.as_deref())?;
    Ok(0)
}

pub(super) fn run_inclinations_command(args: InclinationsArgs) -> Result<i32, CliError> {
    let names = inclinations_from_paths(&args.files)?;

    if let Some(angle) = args.check {
        let name = AngleInput::Text(angle).normalize()?;
        let present = names.contains(&name);
        println!("{present}");
        return Ok(if present { 0 } else { 1 });
    }

    for name in names {
        println!("{name}");
    }
    Ok(0)
}

pub(super) fn run_convergence_command(args: ConvergenceArgs) -> Result<i32, CliError> {
    if args.breakdown {
        let breakdown = check_convergence_breakdown(&args.root, &args.wd)?;
        if args.json {
            emit_json(&breakdown, None)?;
            return Ok(0);
        }
        println!("cycle t_r t_e t_e_max hc");
        for cycle in 0..breakdown.cycles() {
            println!(
                "{} {:.3} {:.3} {:.3} {:.3}",
                cycle + 1,
                breakdown.radiation_temperature[cycle],
                breakdown.electron_temperature[cycle],
                breakdown.max_electron_temperature[cycle],
                breakdown.heating_cooling[cycle]
            );
        }
        return Ok(0);
    }

    let query = ConvergenceQuery {
        field: if args.converging {
            ConvergenceField::Converging
        } else {
            ConvergenceField::Converged
        },
        per_cycle: args.per_cycle,
    };
    let output = check_convergence(&args.root, &args.wd, query)?;
    if args.json {
        emit_json(&output, None)?;
        return Ok(0);
    }
    match output {
        ConvergenceOutput::Last(value) => println!("{value}"),
        ConvergenceOutput::PerCycle(values) => {
            for (cycle, value) in values.iter().enumerate() {
                println!("{} {}", cycle + 1, value);
            }
        }
    }
    Ok(0)
}

pub(super) fn run_errors_command(args: ErrorsArgs) -> Result<i32, CliError> {
    let working_dir = current_working_dir()?;
    let files = args
        .files
        .iter()
        .map(|path| resolve_cli_path(&working_dir, path))
        .collect::<Vec<_>>();
    let source = match &args.root {
        Some(root) => DiagSource::Discover {
            root,
            wd: &args.wd,
        },
        None if !files.is_empty() => DiagSource::Explicit(&files),
        None => {
            return Err(CliError::Usage(
                "errors needs a root name or at least one --file".to_string(),
            ));
        }
    };

    let mut summary = aggregate_errors(source, args.cores)?;
    if args.average {
        summary.totals = summary.per_process_average();
    }
    if args.json {
        emit_json(&summary, None)?;
    } else {
        for (message, count) in &summary.totals {
            println!("{count:>8}  {message}");
        }
        for broken in &summary.broken {
            eprintln!("unable to read diag file {}: {}", broken.index, broken.path.display());
        }
    }

    if let Some(path) = &summary.aborted {
        eprintln!("no complete error summary in '{}'; totals discarded", path.display());
        return Ok(1);
    }
    Ok(0)
}

pub(super) fn run_lines_command(args: LinesArgs) -> Result<i32, CliError> {
    let catalog = Catalog::from_name(&args.catalog).ok_or_else(|| {
        CliError::Usage(format!(
            "unknown catalog '{}'; expected lines, edges or photo",
            args.catalog
        ))
    })?;
    let lines = catalog.lines(CatalogView::new(args.frequency, args.log));

    if args.json {
        emit_json(&lines, None)?;
        return Ok(0);
    }
    for line in &lines {
        let label = if line.label.is_empty() { "-" } else { line.label.as_str() };
        println!("{:<16} {}", label, line.value);
    }
    Ok(0)
}

pub(super) fn run_find_specs_command(args: FindSpecsArgs) -> Result<i32, CliError> {
    let search_root = resolve_cli_path(&current_working_dir()?, &args.path);
    let files = find_spec_files(&search_root, args.root.as_deref(), args.include_delay_dump)?;

    for file in &files {
        if args.roots {
            let (root, directory) = root_from_file_path(file)?;
            println!("{root} {}", directory.display());
        } else {
            println!("{}", file.display());
        }
    }
    Ok(0)
}
