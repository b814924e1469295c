//! Static line-transition and photoionization-edge catalogs.
//!
//! Entries are stored as rest wavelengths in Angstroms. Every lookup returns
//! fresh owned copies, optionally converted to frequency and/or log10 space,
//! and `place_line_ids` turns a catalog into annotation positions for an axis.

use super::constants::angstrom_to_hz;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    pub label: &'static str,
    pub wavelength: f64,
}

const fn entry(label: &'static str, wavelength: f64) -> CatalogEntry {
    CatalogEntry { label, wavelength }
}

const COMMON_LINES: [CatalogEntry; 29] = [
    entry("He II Edge", 229.0),
    entry("N III/O III", 305.0),
    entry("He I Edge", 504.0),
    entry("Lyman Edge", 912.0),
    entry("P V", 1118.0),
    entry(r"Ly$\alpha$/N V", 1216.0),
    entry("", 1242.0),
    entry("O V/Si IV", 1371.0),
    entry("", 1400.0),
    entry("N IV", 1489.0),
    entry("C IV", 1548.0),
    entry("", 1550.0),
    entry("He II", 1640.0),
    entry("N III]", 1750.0),
    entry("Al III", 1854.0),
    entry("C III]", 1908.0),
    entry("Mg II", 2798.0),
    entry("Balmer Edge", 3646.0),
    entry("Ca II", 3934.0),
    entry("", 3969.0),
    entry(r"H$_{\delta}$", 4101.0),
    entry(r"H$_{\gamma}$", 4340.0),
    entry("He II", 4389.0),
    entry("He II", 4686.0),
    entry(r"H$_{\beta}$", 4861.0),
    entry("Na I", 5891.0),
    entry("", 5897.0),
    entry(r"H$_{\alpha}$", 6564.0),
    entry("Paschen Edge", 8204.0),
];

const ABSORPTION_EDGES: [CatalogEntry; 4] = [
    entry("He II Edge", 229.0),
    entry("Lyman Edge", 912.0),
    entry("Balmer Edge", 3646.0),
    entry("Paschen Edge", 8204.0),
];

const PHOTO_EDGES: [CatalogEntry; 7] = [
    entry("He II Edge", 229.0),
    entry("He I Edge", 504.0),
    entry("Lyman Edge", 912.0),
    entry("Ca I", 2028.0),
    entry("Al I", 2071.0),
    entry("Balmer Edge", 3646.0),
    entry("Paschen Edge", 8204.0),
];

/// Which catalog to draw entries from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Catalog {
    CommonLines,
    AbsorptionEdges,
    PhotoEdges,
}

impl Catalog {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lines" | "common" | "common-lines" => Some(Self::CommonLines),
            "edges" | "absorption" | "absorption-edges" => Some(Self::AbsorptionEdges),
            "photo" | "photo-edges" => Some(Self::PhotoEdges),
            _ => None,
        }
    }

    pub const fn entries(self) -> &'static [CatalogEntry] {
        match self {
            Self::CommonLines => &COMMON_LINES,
            Self::AbsorptionEdges => &ABSORPTION_EDGES,
            Self::PhotoEdges => &PHOTO_EDGES,
        }
    }

    pub fn lines(self, view: CatalogView) -> Vec<LineId> {
        self.entries()
            .iter()
            .map(|entry| LineId {
                label: entry.label.to_string(),
                value: view.convert(entry.wavelength),
            })
            .collect()
    }
}

/// Independent conversions applied to each catalog wavelength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CatalogView {
    pub frequency: bool,
    pub log10: bool,
}

impl CatalogView {
    pub const WAVELENGTH: Self = Self {
        frequency: false,
        log10: false,
    };

    pub const fn new(frequency: bool, log10: bool) -> Self {
        Self { frequency, log10 }
    }

    fn convert(self, wavelength: f64) -> f64 {
        let value = if self.frequency {
            angstrom_to_hz(wavelength)
        } else {
            wavelength
        };
        if self.log10 { value.log10() } else { value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineId {
    pub label: String,
    pub value: f64,
}

pub fn common_lines(view: CatalogView) -> Vec<LineId> {
    Catalog::CommonLines.lines(view)
}

pub fn absorption_edges(view: CatalogView) -> Vec<LineId> {
    Catalog::AbsorptionEdges.lines(view)
}

pub fn photo_edges(view: CatalogView) -> Vec<LineId> {
    Catalog::PhotoEdges.lines(view)
}

/// Where a renderer should draw one line annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineIdPlacement {
    pub label: String,
    /// Data coordinate of the vertical marker.
    pub marker_x: f64,
    /// Axes-fraction coordinate of the text label.
    pub label_x: f64,
}

/// Position line labels for the x range `xlim`, skipping out-of-range entries.
pub fn place_line_ids(
    lines: &[LineId],
    xlim: (f64, f64),
    log_x: bool,
    offset: f64,
) -> Vec<LineIdPlacement> {
    let (xlo, xhi) = xlim;
    lines
        .iter()
        .filter(|line| line.value >= xlo && line.value <= xhi)
        .map(|line| {
            let x = line.value - offset;
            let label_x = if log_x {
                (x.log10() - xlo.log10()) / (xhi.log10() - xlo.log10())
            } else {
                (x - xlo) / (xhi - xlo)
            };
            LineIdPlacement {
                label: line.label.clone(),
                marker_x: line.value,
                label_x,
            }
        })
        .collect()
}
