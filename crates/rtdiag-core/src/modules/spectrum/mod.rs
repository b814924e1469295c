//! Spectral table ingestion: parsing, the typed spectrum model and panels.

pub mod model;
pub mod panel;
pub mod parser;

pub use model::{
    AngleInput, InclinationSource, Spectrum, SpectrumUnits, inclinations, inclinations_from_grid,
    inclinations_from_paths, inclinations_from_table, is_inclination_name,
};
pub use panel::{
    ALL_INCLINATIONS, MIN_COMPONENT_FLUX, ORIGIN_COMPONENTS, OpticalDepthPanelRequest, Panel,
    PanelSeries, SOURCE_COMPONENTS, SpectraPanelsRequest, SpectrumComponentsRequest,
    SpectrumPanelRequest, optical_depth_panel, spectra_panels, spectrum_components_panels,
    spectrum_panel,
};
pub use parser::{
    SpectralTable, TableData, TableOptions, TextGrid, parse_spectral_table, parse_table,
    read_table, rewrite_header_token, spectrum_units_label,
};
