use super::parser::{
    SpectralTable, TableData, TableOptions, TextGrid, parse_spectral_table, read_source,
    read_table, spectrum_units_label,
};
use crate::domain::{
    FREQUENCY_COLUMN, ParserResult, RtDiagError, SpectralAxis, WAVELENGTH_COLUMN,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Flux or luminosity units declared in a spectrum file header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumUnits {
    FluxPerAngstrom,
    FluxPerHz,
    LuminosityPerHz,
    Other(String),
    #[default]
    Unknown,
}

impl SpectrumUnits {
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("erg/s/cm^-2/A") => Self::FluxPerAngstrom,
            Some("erg/s/cm^-2/Hz") => Self::FluxPerHz,
            Some("erg/s/Hz") => Self::LuminosityPerHz,
            Some(other) => Self::Other(other.to_string()),
            None => Self::Unknown,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::FluxPerAngstrom => "erg/s/cm^-2/A",
            Self::FluxPerHz => "erg/s/cm^-2/Hz",
            Self::LuminosityPerHz => "erg/s/Hz",
            Self::Other(label) => label,
            Self::Unknown => "unknown",
        }
    }

    /// Axis label for a panel y axis, given the spectral axis in use.
    pub fn y_axis_label(&self, axis: SpectralAxis) -> String {
        match (self, axis) {
            (Self::FluxPerAngstrom, SpectralAxis::Wavelength) => {
                r"Flux Density $F_{\lambda}$ [erg s$^{-1}$ cm$^{-2}$ $\AA^{-1}$]".to_string()
            }
            (Self::FluxPerAngstrom, SpectralAxis::Frequency) => {
                r"$\nu F_{\nu}$ [erg s$^{-1}$ cm$^{-2}$]".to_string()
            }
            (Self::FluxPerHz, SpectralAxis::Wavelength) => {
                r"Flux Density $F_{\nu}$ [erg s$^{-1}$ cm$^{-2}$ Hz$^{-1}$]".to_string()
            }
            (Self::FluxPerHz, SpectralAxis::Frequency) => {
                r"$\nu F_{\nu}$ [erg s$^{-1}$ cm$^{-2}$]".to_string()
            }
            (Self::LuminosityPerHz, SpectralAxis::Wavelength) => {
                r"Luminosity $L_{\nu}$ [erg s$^{-1}$ Hz$^{-1}$]".to_string()
            }
            (Self::LuminosityPerHz, SpectralAxis::Frequency) => {
                r"$\nu L_{\nu}$ [erg s$^{-1}$]".to_string()
            }
            (other, _) => format!("Flux [{}]", other.label()),
        }
    }
}

impl Display for SpectrumUnits {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A requested viewing angle before normalization to a column name.
#[derive(Debug, Clone, PartialEq)]
pub enum AngleInput {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl AngleInput {
    /// String form used to look the angle up among table columns.
    ///
    /// Floats keep their decimal point (`45.0`), so they never match a
    /// digit-only inclination column.
    pub fn normalize(&self) -> ParserResult<String> {
        match self {
            Self::Text(text) => Ok(text.trim().to_string()),
            Self::Integer(value) => Ok(value.to_string()),
            Self::Float(value) if value.is_finite() => Ok(format!("{value:?}")),
            Self::Float(value) => Err(RtDiagError::input_type(
                "TYPE.ANGLE",
                format!("angle {value} cannot be converted to an inclination name"),
            )),
        }
    }
}

impl From<&str> for AngleInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AngleInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for AngleInput {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for AngleInput {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for AngleInput {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for AngleInput {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// The inputs an inclination set can be derived from.
#[derive(Debug, Clone, Copy)]
pub enum InclinationSource<'a> {
    Table(&'a SpectralTable),
    Grid(&'a TextGrid),
    Path(&'a Path),
    Paths(&'a [PathBuf]),
}

pub fn is_inclination_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|byte| byte.is_ascii_digit())
}

pub fn inclinations(source: InclinationSource<'_>) -> ParserResult<BTreeSet<String>> {
    match source {
        InclinationSource::Table(table) => Ok(inclinations_from_table(table)),
        InclinationSource::Grid(grid) => inclinations_from_grid(grid),
        InclinationSource::Path(path) => inclinations_from_paths(&[path]),
        InclinationSource::Paths(paths) => inclinations_from_paths(paths),
    }
}

pub fn inclinations_from_table(table: &SpectralTable) -> BTreeSet<String> {
    numeric_names(table.columns())
}

pub fn inclinations_from_grid(grid: &TextGrid) -> ParserResult<BTreeSet<String>> {
    let header = grid.header().ok_or_else(|| {
        RtDiagError::input_type(
            "TYPE.INCLINATION_GRID",
            "string grid has no header row to read inclinations from",
        )
    })?;
    Ok(numeric_names(header))
}

/// Union of the inclinations of every file in `paths`.
pub fn inclinations_from_paths<P: AsRef<Path>>(paths: &[P]) -> ParserResult<BTreeSet<String>> {
    let options = TableOptions::default().with_string_fallback();
    let mut names = BTreeSet::new();
    for path in paths {
        let table = read_table(path.as_ref(), &options)?;
        names.extend(numeric_names(table.columns()));
    }
    Ok(names)
}

fn numeric_names(columns: &[String]) -> BTreeSet<String> {
    columns
        .iter()
        .filter(|name| is_inclination_name(name))
        .cloned()
        .collect()
}

/// A parsed spectrum file: a typed table with a wavelength or frequency axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    table: SpectralTable,
    units: SpectrumUnits,
}

impl Spectrum {
    pub fn new(table: SpectralTable, units: SpectrumUnits) -> ParserResult<Self> {
        if !table.has_column(WAVELENGTH_COLUMN) && !table.has_column(FREQUENCY_COLUMN) {
            return Err(RtDiagError::format(
                "FORMAT.SPECTRUM_AXIS_COLUMN",
                format!(
                    "spectrum has neither a '{WAVELENGTH_COLUMN}' nor a '{FREQUENCY_COLUMN}' column"
                ),
            ));
        }
        Ok(Self { table, units })
    }

    pub fn from_source(source: &str) -> ParserResult<Self> {
        let table = parse_spectral_table(source, None)?;
        let units = SpectrumUnits::from_label(spectrum_units_label(source).as_deref());
        Self::new(table, units)
    }

    pub fn read(path: &Path) -> ParserResult<Self> {
        let source = read_source(path)?;
        Self::from_source(&source).map_err(|error| {
            RtDiagError::new(
                error.category(),
                error.placeholder(),
                format!("{}: {}", path.display(), error.message()),
            )
        })
    }

    pub fn table(&self) -> &SpectralTable {
        &self.table
    }

    pub fn units(&self) -> &SpectrumUnits {
        &self.units
    }

    pub fn wavelength(&self) -> Option<&[f64]> {
        self.table.column(WAVELENGTH_COLUMN)
    }

    pub fn frequency(&self) -> Option<&[f64]> {
        self.table.column(FREQUENCY_COLUMN)
    }

    pub fn axis(&self, axis: SpectralAxis) -> ParserResult<&[f64]> {
        self.table.column(axis.column_name()).ok_or_else(|| {
            RtDiagError::format(
                "FORMAT.SPECTRUM_AXIS_COLUMN",
                format!("spectrum has no '{}' column", axis.column_name()),
            )
        })
    }

    pub fn inclinations(&self) -> BTreeSet<String> {
        inclinations_from_table(&self.table)
    }

    pub fn is_valid_inclination(&self, angle: impl Into<AngleInput>) -> ParserResult<bool> {
        let name = angle.into().normalize()?;
        Ok(self.table.has_column(&name))
    }

    /// Raw numeric column for an angle or any other named column.
    pub fn column(&self, angle: impl Into<AngleInput>) -> ParserResult<&[f64]> {
        let name = angle.into().normalize()?;
        self.table.column(&name).ok_or_else(|| {
            RtDiagError::format(
                "FORMAT.SPECTRUM_COLUMN",
                format!("spectrum has no column named '{name}'"),
            )
        })
    }
}

impl TryFrom<TableData> for Spectrum {
    type Error = RtDiagError;

    fn try_from(data: TableData) -> ParserResult<Self> {
        match data {
            TableData::Numeric(table) => Self::new(table, SpectrumUnits::Unknown),
            TableData::Text(_) => Err(RtDiagError::input_type(
                "TYPE.SPECTRUM_TABLE",
                "a string grid cannot be used as a numeric spectrum",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AngleInput, InclinationSource, Spectrum, SpectrumUnits, inclinations,
        inclinations_from_grid, is_inclination_name,
    };
    use crate::domain::{RtDiagErrorCategory, SpectralAxis};
    use crate::modules::spectrum::parser::{SpectralTable, TextGrid};

    fn table(columns: &[&str]) -> SpectralTable {
        SpectralTable::from_columns(
            columns.iter().map(|name| name.to_string()).collect(),
            columns.iter().map(|_| vec![1.0, 2.0]).collect(),
        )
        .expect("table should build")
    }

    #[test]
    fn inclinations_are_digit_only_columns_sorted_as_text() {
        let sorted = table(&["Lambda", "60", "10", "30", "Emitted", "4.5"]);
        let names = inclinations(InclinationSource::Table(&sorted)).expect("inclinations");
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["10", "30", "60"]);

        let mixed = table(&["Lambda", "9", "100", "10"]);
        let names = inclinations(InclinationSource::Table(&mixed)).expect("inclinations");
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["10", "100", "9"]);
    }

    #[test]
    fn grid_without_header_is_a_type_error() {
        let error = inclinations_from_grid(&TextGrid::default()).expect_err("empty grid");
        assert_eq!(error.category(), RtDiagErrorCategory::InputType);

        let grid = TextGrid::new(vec![vec!["Lambda".to_string(), "45".to_string()]]);
        let names = inclinations(InclinationSource::Grid(&grid)).expect("inclinations");
        assert!(names.contains("45"));
    }

    #[test]
    fn inclination_names_are_ascii_digits() {
        assert!(is_inclination_name("075"));
        assert!(!is_inclination_name(""));
        assert!(!is_inclination_name("45.0"));
        assert!(!is_inclination_name("-10"));
    }

    #[test]
    fn angle_inputs_normalize_to_column_names() {
        assert_eq!(AngleInput::from(45).normalize().expect("int"), "45");
        assert_eq!(AngleInput::from(" 30 ").normalize().expect("text"), "30");
        assert_eq!(AngleInput::from(45.0).normalize().expect("float"), "45.0");
        let error = AngleInput::from(f64::NAN).normalize().expect_err("nan");
        assert_eq!(error.category(), RtDiagErrorCategory::InputType);
    }

    #[test]
    fn spectrum_requires_an_axis_column() {
        let error = Spectrum::new(table(&["Emitted", "10"]), SpectrumUnits::Unknown)
            .expect_err("axis column required");
        assert_eq!(error.placeholder(), "FORMAT.SPECTRUM_AXIS_COLUMN");

        let spectrum = Spectrum::new(table(&["Freq.", "10"]), SpectrumUnits::Unknown)
            .expect("frequency-only spectrum is valid");
        assert!(spectrum.wavelength().is_none());
        assert!(spectrum.axis(SpectralAxis::Wavelength).is_err());
        assert_eq!(spectrum.axis(SpectralAxis::Frequency).expect("freq"), [1.0, 2.0]);
    }

    #[test]
    fn valid_inclination_accepts_text_and_integers_only() {
        let spectrum = Spectrum::new(table(&["Lambda", "45"]), SpectrumUnits::Unknown)
            .expect("spectrum");
        assert!(spectrum.is_valid_inclination("45").expect("text"));
        assert!(spectrum.is_valid_inclination(45).expect("int"));
        assert!(!spectrum.is_valid_inclination(45.0).expect("float"));
        assert!(!spectrum.is_valid_inclination(50).expect("int"));
    }

    #[test]
    fn unknown_column_is_a_format_error_naming_the_angle() {
        let spectrum = Spectrum::new(table(&["Lambda", "45"]), SpectrumUnits::Unknown)
            .expect("spectrum");
        assert_eq!(spectrum.column(45).expect("column"), [1.0, 2.0]);
        let error = spectrum.column(80).expect_err("missing");
        assert_eq!(error.category(), RtDiagErrorCategory::Format);
        assert!(error.message().contains("'80'"));
    }

    #[test]
    fn units_are_recognized_from_labels() {
        assert_eq!(
            SpectrumUnits::from_label(Some("erg/s/cm^-2/A")),
            SpectrumUnits::FluxPerAngstrom
        );
        assert_eq!(
            SpectrumUnits::from_label(Some("Jy")),
            SpectrumUnits::Other("Jy".to_string())
        );
        assert_eq!(SpectrumUnits::from_label(None), SpectrumUnits::Unknown);
        assert!(
            SpectrumUnits::FluxPerHz
                .y_axis_label(SpectralAxis::Frequency)
                .contains(r"\nu F_{\nu}")
        );
    }
}
