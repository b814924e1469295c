use rtdiag_core::common::config::PlotStyle;
use rtdiag_core::domain::{RtDiagErrorCategory, SpectralAxis};
use rtdiag_core::modules::discovery::{find_spec_files, root_from_file_path, spectrum_path};
use rtdiag_core::modules::spectrum::{
    InclinationSource, Spectrum, SpectrumPanelRequest, SpectrumUnits, TableData, TableOptions,
    inclinations, parse_spectral_table, read_table, spectrum_panel,
};
use rtdiag_core::numerics::smooth;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CV_SPEC: &str = "\
# Python Version 87f
# Date	Mon Jan  1 00:00:00 2024
# Units: flambda spectrum (erg/s/cm^-2/A)  at 100 parsecs

Freq.        Lambda  Created  WCreated  Emitted  CenSrc  Disk  Wind  HitSurf  Scattered  A10P0.50  A30P0.50  A60P0.50
1.5e15  1998.6  1.0  1.0  1.0  0.0  1.0  0.0  0.0  0.0  2.0  3.0  4.0
1.0e15  2997.9  1.0  1.0  1.0  0.0  1.0  0.0  0.0  0.0  6.0  7.0  8.0
7.5e14  3997.2  1.0  1.0  1.0  0.0  1.0  0.0  0.0  0.0  10.0  11.0  12.0
";

const AGN_SPEC: &str = "\
# Units: L_nu spectrum (erg/s/Hz)
Freq. Lambda Emitted A30P0.50 A75P0.50
1.0e15 2997.9 1.0 1.0 1.0
";

fn write(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent dir should be created");
    }
    fs::write(path, content).expect("file should be written");
    path.to_path_buf()
}

#[test]
fn spectrum_file_round_trips_through_text() {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = write(&spectrum_path(temp.path(), "cv"), CV_SPEC);

    let spectrum = Spectrum::read(&path).expect("spectrum should parse");
    assert_eq!(spectrum.units(), &SpectrumUnits::FluxPerAngstrom);
    assert_eq!(spectrum.table().row_count(), 3);

    let reparsed =
        parse_spectral_table(&spectrum.table().to_text(), None).expect("text should reparse");
    for column in spectrum.table().columns() {
        let original = spectrum.table().column(column).expect("column");
        let restored = reparsed.column(column).expect("column");
        for (a, b) in original.iter().zip(restored) {
            assert!((a - b).abs() <= f64::EPSILON * a.abs().max(1.0));
        }
    }
}

#[test]
fn inclinations_union_across_files_once_each() {
    let temp = TempDir::new().expect("tempdir should be created");
    let paths = vec![
        write(&temp.path().join("cv.spec"), CV_SPEC),
        write(&temp.path().join("agn.spec"), AGN_SPEC),
    ];

    let names = inclinations(InclinationSource::Paths(&paths)).expect("inclinations");
    assert_eq!(
        names.into_iter().collect::<Vec<_>>(),
        vec!["10", "30", "60", "75"]
    );

    let single = inclinations(InclinationSource::Path(&paths[1])).expect("inclinations");
    assert_eq!(single.len(), 2);
}

#[test]
fn missing_spectrum_is_not_found() {
    let temp = TempDir::new().expect("tempdir should be created");
    let error = Spectrum::read(&temp.path().join("absent.spec")).expect_err("missing file");
    assert_eq!(error.category(), RtDiagErrorCategory::NotFound);

    let error = read_table(&temp.path().join("absent.spec"), &TableOptions::default())
        .expect_err("missing file");
    assert_eq!(error.category(), RtDiagErrorCategory::NotFound);
}

#[test]
fn ragged_spectrum_falls_back_to_a_string_grid_on_request() {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = write(
        &temp.path().join("broken.spec"),
        "Lambda A10P0.5\n1.0 2.0\n3.0\n",
    );

    let strict = read_table(&path, &TableOptions::default()).expect_err("ragged table");
    assert_eq!(strict.category(), RtDiagErrorCategory::Format);
    assert!(strict.message().contains("broken.spec"));

    let fallback = read_table(&path, &TableOptions::default().with_string_fallback())
        .expect("fallback grid");
    assert!(matches!(fallback, TableData::Text(_)));
    assert_eq!(fallback.columns(), ["Lambda", "10"]);
}

#[test]
fn panel_smoothing_matches_the_boxcar_filter() {
    let spectrum = Spectrum::from_source(CV_SPEC).expect("spectrum");
    let style = PlotStyle {
        smooth_width: 3,
        ..PlotStyle::default()
    };
    let panel = spectrum_panel(&spectrum, &SpectrumPanelRequest::new(30), &style).expect("panel");

    let expected =
        smooth(spectrum.column(30).expect("column"), Some(3)).expect("smoothing");
    assert_eq!(panel.series[0].y, expected);
    assert_eq!(panel.x_limits, (1998.6, 3997.2));
}

#[test]
fn frequency_panel_reports_nu_f_nu() {
    let spectrum = Spectrum::from_source(CV_SPEC).expect("spectrum");
    let request = SpectrumPanelRequest {
        axis: SpectralAxis::Frequency,
        smooth_width: Some(1),
        show_line_ids: false,
        ..SpectrumPanelRequest::new("10")
    };
    let panel = spectrum_panel(&spectrum, &request, &PlotStyle::default()).expect("panel");
    assert_eq!(panel.x_limits, (7.5e14, 1.5e15));
    assert!((panel.series[0].y[0] - 2.0 * 1998.6).abs() < 1.0e-9);
    assert!(panel.y_label.contains(r"\nu F_{\nu}"));
}

#[test]
fn discovered_specs_resolve_to_roots() {
    let temp = TempDir::new().expect("tempdir should be created");
    write(&temp.path().join("grid/run1/cv.spec"), CV_SPEC);
    write(&temp.path().join("grid/run2/agn.spec"), AGN_SPEC);

    let files = find_spec_files(temp.path(), None, false).expect("search");
    let roots = files
        .iter()
        .map(|path| root_from_file_path(path).expect("root").0)
        .collect::<Vec<_>>();
    assert_eq!(roots, vec!["cv", "agn"]);
}
