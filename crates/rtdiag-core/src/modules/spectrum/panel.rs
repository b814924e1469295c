//! Rendering inputs for spectrum and optical depth figures.
//!
//! Builders here never draw. They gather the series, limits, labels and
//! line-id placements a renderer needs, driven by an explicit `PlotStyle`.

use super::model::{AngleInput, Spectrum, SpectrumUnits};
use crate::common::config::PlotStyle;
use crate::common::lines::{
    CatalogView, LineIdPlacement, absorption_edges, common_lines, place_line_ids,
};
use crate::domain::{AxisScale, RtDiagError, RtDiagResult, SpectralAxis, WAVELENGTH_COLUMN};
use crate::numerics::{RangeSelection, YLimitOptions, axis_y_limits, finite_range, smooth};
use serde::Serialize;
use tracing::debug;

pub const ALL_INCLINATIONS: &str = "all";

/// Emission components produced by the photon sources.
pub const SOURCE_COMPONENTS: [&str; 2] = ["Created", "Emitted"];
/// Emission components split by where photons originated or last interacted.
pub const ORIGIN_COMPONENTS: [&str; 5] = ["CenSrc", "Disk", "Wind", "HitSurf", "Scattered"];

/// Flux below which a component sample counts as empty.
pub const MIN_COMPONENT_FLUX: f64 = 1.0e-17;
const SPARSE_COMPONENT_FRACTION: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSeries {
    pub label: String,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub x_label: String,
    pub y_label: String,
    pub label_size: f64,
    pub tick_label_size: f64,
    pub scale: AxisScale,
    pub x: Vec<f64>,
    pub x_limits: (f64, f64),
    pub y_limits: (Option<f64>, Option<f64>),
    pub series: Vec<PanelSeries>,
    pub line_ids: Vec<LineIdPlacement>,
    pub line_id_label_y: f64,
    pub line_id_font_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumPanelRequest {
    pub inclination: AngleInput,
    pub axis: SpectralAxis,
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    /// Overrides the style's smoothing width when set.
    pub smooth_width: Option<usize>,
    pub scale: Option<AxisScale>,
    pub show_line_ids: bool,
}

impl SpectrumPanelRequest {
    pub fn new(inclination: impl Into<AngleInput>) -> Self {
        Self {
            inclination: inclination.into(),
            axis: SpectralAxis::Wavelength,
            xmin: None,
            xmax: None,
            smooth_width: None,
            scale: None,
            show_line_ids: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpticalDepthPanelRequest {
    /// Inclination names; `all` selects every inclination in the table.
    pub inclinations: Vec<String>,
    pub axis: SpectralAxis,
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub scale: AxisScale,
    pub show_edges: bool,
}

impl Default for OpticalDepthPanelRequest {
    fn default() -> Self {
        Self {
            inclinations: vec![ALL_INCLINATIONS.to_string()],
            axis: SpectralAxis::Frequency,
            xmin: None,
            xmax: None,
            scale: AxisScale::LogLog,
            show_edges: true,
        }
    }
}

/// Every inclination of a spectrum, one panel each.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectraPanelsRequest {
    pub axis: SpectralAxis,
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub smooth_width: Option<usize>,
    pub scale: Option<AxisScale>,
    pub show_line_ids: bool,
}

impl Default for SpectraPanelsRequest {
    fn default() -> Self {
        Self {
            axis: SpectralAxis::Wavelength,
            xmin: None,
            xmax: None,
            smooth_width: None,
            scale: None,
            show_line_ids: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumComponentsRequest {
    pub axis: SpectralAxis,
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub smooth_width: Option<usize>,
    /// Ignored in frequency space, which is always log-log.
    pub log_y: bool,
    /// Drop components whose smoothed flux is mostly below `MIN_COMPONENT_FLUX`.
    pub skip_sparse: bool,
}

impl Default for SpectrumComponentsRequest {
    fn default() -> Self {
        Self {
            axis: SpectralAxis::Wavelength,
            xmin: None,
            xmax: None,
            smooth_width: None,
            log_y: true,
            skip_sparse: true,
        }
    }
}

pub fn spectrum_panel(
    spectrum: &Spectrum,
    request: &SpectrumPanelRequest,
    style: &PlotStyle,
) -> RtDiagResult<Panel> {
    let scale = request.scale.unwrap_or(style.scale);
    let x = spectrum.axis(request.axis)?.to_vec();
    let x_limits = data_x_limits(&x, request.xmin, request.xmax)?;
    let name = request.inclination.normalize()?;

    let mut y = spectrum.column(name.as_str())?.to_vec();
    if request.axis.is_frequency() {
        scale_by_wavelength(spectrum, &mut y)?;
    }
    let y = smooth(&y, Some(request.smooth_width.unwrap_or(style.smooth_width)))?;

    let y_limits = axis_y_limits(
        &x,
        &y,
        Some(x_limits.0),
        Some(x_limits.1),
        YLimitOptions {
            scale: style.y_limit_scale,
            selection: RangeSelection::Inside,
            drop_zeros: true,
        },
    )?;

    let line_ids = if request.show_line_ids {
        place_line_ids(
            &common_lines(CatalogView::new(request.axis.is_frequency(), false)),
            x_limits,
            scale.log_x(),
            style.line_id_offset,
        )
    } else {
        Vec::new()
    };

    Ok(Panel {
        x_label: x_axis_label(request.axis, false),
        y_label: flux_axis_label(spectrum.units(), request.axis),
        label_size: style.label_size,
        tick_label_size: style.tick_label_size,
        scale,
        x,
        x_limits,
        y_limits,
        series: vec![PanelSeries {
            label: inclination_label(&name),
            y,
        }],
        line_ids,
        line_id_label_y: style.line_id_label_y,
        line_id_font_size: style.line_id_font_size,
    })
}

pub fn optical_depth_panel(
    spectrum: &Spectrum,
    request: &OpticalDepthPanelRequest,
    style: &PlotStyle,
) -> RtDiagResult<Panel> {
    let x = spectrum.axis(request.axis)?.to_vec();
    let x_limits = data_x_limits(&x, request.xmin, request.xmax)?;

    let available = spectrum.inclinations();
    let mut requested = request
        .inclinations
        .iter()
        .map(|name| name.trim())
        .filter(|name| *name != ALL_INCLINATIONS)
        .map(str::to_string)
        .collect::<Vec<_>>();
    if requested.is_empty() {
        requested = available.iter().cloned().collect();
    }

    let mut series = Vec::with_capacity(requested.len());
    for name in requested {
        if !available.contains(&name) {
            debug!(inclination = %name, "skipping inclination missing from optical depth table");
            continue;
        }
        let y = spectrum.column(name.as_str())?;
        if y.iter().all(|value| *value == 0.0) {
            debug!(inclination = %name, "skipping all-zero optical depth column");
            continue;
        }
        series.push(PanelSeries {
            label: inclination_label(&name),
            y: y.to_vec(),
        });
    }

    let y_limits = series_y_limits(&series, request.scale);

    let line_ids = if request.show_edges {
        place_line_ids(
            &absorption_edges(CatalogView::new(request.axis.is_frequency(), false)),
            x_limits,
            request.scale.log_x(),
            style.line_id_offset,
        )
    } else {
        Vec::new()
    };

    let y_label = if request.scale.log_y() {
        r"Log(Optical Depth), $\tau$"
    } else {
        r"Optical Depth, $\tau$"
    };

    Ok(Panel {
        x_label: x_axis_label(request.axis, request.scale.log_x()),
        y_label: y_label.to_string(),
        label_size: style.label_size,
        tick_label_size: style.tick_label_size,
        scale: request.scale,
        x,
        x_limits,
        y_limits,
        series,
        line_ids,
        line_id_label_y: style.line_id_label_y,
        line_id_font_size: style.line_id_font_size,
    })
}

/// One spectrum panel per inclination, each with its own y limits.
pub fn spectra_panels(
    spectrum: &Spectrum,
    request: &SpectraPanelsRequest,
    style: &PlotStyle,
) -> RtDiagResult<Vec<Panel>> {
    spectrum
        .inclinations()
        .into_iter()
        .map(|name| {
            let panel_request = SpectrumPanelRequest {
                axis: request.axis,
                xmin: request.xmin,
                xmax: request.xmax,
                smooth_width: request.smooth_width,
                scale: request.scale,
                show_line_ids: request.show_line_ids,
                ..SpectrumPanelRequest::new(name)
            };
            spectrum_panel(spectrum, &panel_request, style)
        })
        .collect()
}

/// Two panels: the source components, then the origin components.
pub fn spectrum_components_panels(
    spectrum: &Spectrum,
    request: &SpectrumComponentsRequest,
    style: &PlotStyle,
) -> RtDiagResult<[Panel; 2]> {
    let scale = match (request.axis, request.log_y) {
        (SpectralAxis::Frequency, _) => AxisScale::LogLog,
        (SpectralAxis::Wavelength, true) => AxisScale::LogY,
        (SpectralAxis::Wavelength, false) => AxisScale::Linear,
    };
    let x = spectrum.axis(request.axis)?.to_vec();
    let x_limits = data_x_limits(&x, request.xmin, request.xmax)?;
    let width = request.smooth_width.unwrap_or(style.smooth_width);

    let build = |components: &[&str]| -> RtDiagResult<Panel> {
        let mut series = Vec::with_capacity(components.len());
        for &component in components {
            let Some(values) = spectrum.table().column(component) else {
                debug!(component, "spectrum has no component column");
                continue;
            };
            let mut y = smooth(values, Some(width))?;
            if request.skip_sparse && is_sparse_component(&y) {
                debug!(component, "skipping sparse component");
                continue;
            }
            if request.axis.is_frequency() {
                scale_by_wavelength(spectrum, &mut y)?;
            }
            series.push(PanelSeries {
                label: component.to_string(),
                y,
            });
        }

        Ok(Panel {
            x_label: x_axis_label(request.axis, false),
            y_label: flux_axis_label(spectrum.units(), request.axis),
            label_size: style.label_size,
            tick_label_size: style.tick_label_size,
            scale,
            x: x.clone(),
            x_limits,
            y_limits: series_y_limits(&series, scale),
            series,
            line_ids: Vec::new(),
            line_id_label_y: style.line_id_label_y,
            line_id_font_size: style.line_id_font_size,
        })
    };

    Ok([build(&SOURCE_COMPONENTS[..])?, build(&ORIGIN_COMPONENTS[..])?])
}

fn is_sparse_component(flux: &[f64]) -> bool {
    let empty = flux.iter().filter(|value| **value < MIN_COMPONENT_FLUX).count();
    empty as f64 > SPARSE_COMPONENT_FRACTION * flux.len() as f64
}

/// Convert F_lambda to lambda F_lambda, which equals nu F_nu.
fn scale_by_wavelength(spectrum: &Spectrum, y: &mut [f64]) -> RtDiagResult<()> {
    let wavelength = spectrum.wavelength().ok_or_else(|| {
        RtDiagError::format(
            "FORMAT.SPECTRUM_AXIS_COLUMN",
            format!("frequency-space panels need a '{WAVELENGTH_COLUMN}' column"),
        )
    })?;
    for (value, lambda) in y.iter_mut().zip(wavelength) {
        *value *= lambda;
    }
    Ok(())
}

fn series_y_limits(series: &[PanelSeries], scale: AxisScale) -> (Option<f64>, Option<f64>) {
    finite_range(
        series
            .iter()
            .flat_map(|entry| entry.y.iter().copied())
            .filter(|value| !scale.log_y() || *value > 0.0),
    )
    .map_or((None, None), |(lo, hi)| (Some(lo), Some(hi)))
}

fn data_x_limits(x: &[f64], xmin: Option<f64>, xmax: Option<f64>) -> RtDiagResult<(f64, f64)> {
    let (lo, hi) = finite_range(x.iter().copied()).ok_or_else(|| {
        RtDiagError::format("FORMAT.PANEL_EMPTY", "spectrum has no finite x values")
    })?;
    Ok((xmin.unwrap_or(lo), xmax.unwrap_or(hi)))
}

fn x_axis_label(axis: SpectralAxis, log: bool) -> String {
    let label = match axis {
        SpectralAxis::Wavelength => r"Wavelength [$\AA$]",
        SpectralAxis::Frequency => "Frequency [Hz]",
    };
    if log {
        format!("Log({label})")
    } else {
        label.to_string()
    }
}

fn flux_axis_label(units: &SpectrumUnits, axis: SpectralAxis) -> String {
    match units {
        SpectrumUnits::Unknown => SpectrumUnits::FluxPerAngstrom.y_axis_label(axis),
        units => units.y_axis_label(axis),
    }
}

fn inclination_label(name: &str) -> String {
    format!(r"$i$ = {name}$^{{\circ}}$")
}

#[cfg(test)]
mod tests {
    use super::{
        OpticalDepthPanelRequest, SpectraPanelsRequest, SpectrumComponentsRequest,
        SpectrumPanelRequest, optical_depth_panel, spectra_panels, spectrum_components_panels,
        spectrum_panel,
    };
    use crate::common::config::PlotStyle;
    use crate::domain::{AxisScale, SpectralAxis};
    use crate::modules::spectrum::model::Spectrum;

    const SPEC: &str = "\
# Units: flambda spectrum (erg/s/cm^-2/A)
Freq. Lambda A10P0.5 A60P0.5
4.0 1000.0 1.0 0.0
3.0 2000.0 2.0 0.0
2.0 3000.0 3.0 0.0
1.0 4000.0 4.0 0.0
";

    const COMPONENTS: &str = "\
Freq. Lambda Created Emitted CenSrc Disk Wind HitSurf A30P0.5
4.0 1000.0 5.0 4.0 1.0 2.0 0.0 0.5 1.0
3.0 2000.0 6.0 5.0 1.0 2.0 0.0 0.0 1.0
2.0 3000.0 7.0 6.0 1.0 2.0 0.0 0.0 1.0
1.0 4000.0 8.0 7.0 1.0 2.0 1.0 0.0 1.0
";

    fn unsmoothed_style() -> PlotStyle {
        PlotStyle {
            smooth_width: 1,
            ..PlotStyle::default()
        }
    }

    #[test]
    fn spectrum_panel_uses_data_range_and_scaled_y_limits() {
        let spectrum = Spectrum::from_source(SPEC).expect("spectrum");
        let panel = spectrum_panel(&spectrum, &SpectrumPanelRequest::new(10), &unsmoothed_style())
            .expect("panel");

        assert_eq!(panel.x_limits, (1000.0, 4000.0));
        assert_eq!(panel.series[0].y, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(panel.y_limits, (Some(0.1), Some(40.0)));
        assert_eq!(panel.scale, AxisScale::LogY);
        let labels = panel
            .line_ids
            .iter()
            .map(|line| line.label.as_str())
            .collect::<Vec<_>>();
        assert!(labels.contains(&"C IV"));
        assert!(!labels.contains(&"Lyman Edge"));
    }

    #[test]
    fn requested_bounds_override_the_data_range() {
        let spectrum = Spectrum::from_source(SPEC).expect("spectrum");
        let request = SpectrumPanelRequest {
            xmin: Some(1500.0),
            xmax: Some(3500.0),
            show_line_ids: false,
            ..SpectrumPanelRequest::new("10")
        };
        let panel = spectrum_panel(&spectrum, &request, &unsmoothed_style()).expect("panel");
        assert_eq!(panel.x_limits, (1500.0, 3500.0));
        assert_eq!(panel.y_limits, (Some(0.2), Some(30.0)));
        assert!(panel.line_ids.is_empty());
    }

    #[test]
    fn frequency_space_multiplies_by_wavelength() {
        let spectrum = Spectrum::from_source(SPEC).expect("spectrum");
        let request = SpectrumPanelRequest {
            axis: SpectralAxis::Frequency,
            ..SpectrumPanelRequest::new(10)
        };
        let panel = spectrum_panel(&spectrum, &request, &unsmoothed_style()).expect("panel");
        assert_eq!(panel.x, vec![4.0, 3.0, 2.0, 1.0]);
        assert_eq!(panel.series[0].y, vec![1000.0, 4000.0, 9000.0, 16000.0]);
        assert_eq!(panel.x_label, "Frequency [Hz]");
    }

    #[test]
    fn unknown_inclination_fails() {
        let spectrum = Spectrum::from_source(SPEC).expect("spectrum");
        let error = spectrum_panel(&spectrum, &SpectrumPanelRequest::new(45), &PlotStyle::default())
            .expect_err("missing inclination");
        assert!(error.message().contains("'45'"));
    }

    #[test]
    fn optical_depth_panel_skips_zero_and_unknown_columns() {
        let spectrum = Spectrum::from_source(SPEC).expect("spectrum");
        let panel = optical_depth_panel(
            &spectrum,
            &OpticalDepthPanelRequest::default(),
            &PlotStyle::default(),
        )
        .expect("panel");
        assert_eq!(panel.series.len(), 1);
        assert!(panel.series[0].label.contains("10"));

        let request = OpticalDepthPanelRequest {
            inclinations: vec!["75".to_string(), "60".to_string()],
            axis: SpectralAxis::Wavelength,
            ..OpticalDepthPanelRequest::default()
        };
        let panel = optical_depth_panel(&spectrum, &request, &PlotStyle::default()).expect("panel");
        assert!(panel.series.is_empty());
        assert_eq!(panel.y_limits, (None, None));
        let edges = panel
            .line_ids
            .iter()
            .map(|line| line.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(edges, vec!["Balmer Edge"]);
    }

    #[test]
    fn spectra_panels_cover_every_inclination_independently() {
        let spectrum = Spectrum::from_source(SPEC).expect("spectrum");
        let style = PlotStyle {
            tick_label_size: 9.0,
            ..unsmoothed_style()
        };
        let panels =
            spectra_panels(&spectrum, &SpectraPanelsRequest::default(), &style).expect("panels");

        assert_eq!(panels.len(), 2);
        assert!(panels[0].series[0].label.contains("10"));
        assert!(panels[1].series[0].label.contains("60"));
        assert_eq!(panels[0].y_limits, (Some(0.1), Some(40.0)));
        assert_eq!(panels[1].y_limits, (None, None));
        assert!(panels.iter().all(|panel| panel.tick_label_size == 9.0));
        assert!(panels.iter().all(|panel| !panel.line_ids.is_empty()));
    }

    #[test]
    fn component_panels_split_sources_from_origins() {
        let spectrum = Spectrum::from_source(COMPONENTS).expect("spectrum");
        let request = SpectrumComponentsRequest {
            smooth_width: Some(1),
            ..SpectrumComponentsRequest::default()
        };
        let [sources, origins] =
            spectrum_components_panels(&spectrum, &request, &PlotStyle::default())
                .expect("panels");

        let labels = |panel: &super::Panel| {
            panel
                .series
                .iter()
                .map(|entry| entry.label.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(labels(&sources), vec!["Created", "Emitted"]);
        // Wind and HitSurf are mostly empty and Scattered is absent.
        assert_eq!(labels(&origins), vec!["CenSrc", "Disk"]);
        assert_eq!(sources.scale, AxisScale::LogY);
        assert_eq!(sources.y_limits, (Some(4.0), Some(8.0)));
        assert!(origins.line_ids.is_empty());
    }

    #[test]
    fn component_panels_keep_sparse_series_on_request() {
        let spectrum = Spectrum::from_source(COMPONENTS).expect("spectrum");
        let request = SpectrumComponentsRequest {
            axis: SpectralAxis::Frequency,
            smooth_width: Some(1),
            log_y: false,
            skip_sparse: false,
            ..SpectrumComponentsRequest::default()
        };
        let [sources, origins] =
            spectrum_components_panels(&spectrum, &request, &PlotStyle::default())
                .expect("panels");

        assert_eq!(origins.series.len(), 4);
        assert_eq!(sources.scale, AxisScale::LogLog);
        assert_eq!(sources.series[0].y, vec![5000.0, 12000.0, 21000.0, 32000.0]);
        assert_eq!(sources.x_label, "Frequency [Hz]");
    }
}
