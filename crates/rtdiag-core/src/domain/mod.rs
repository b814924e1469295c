pub mod errors;

pub use errors::{NumericsResult, ParserResult, RtDiagError, RtDiagErrorCategory, RtDiagResult};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const WAVELENGTH_COLUMN: &str = "Lambda";
pub const FREQUENCY_COLUMN: &str = "Freq.";

/// Which independent variable a spectral table is being viewed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectralAxis {
    #[default]
    Wavelength,
    Frequency,
}

impl SpectralAxis {
    pub const fn from_frequency_space(frequency_space: bool) -> Self {
        if frequency_space {
            Self::Frequency
        } else {
            Self::Wavelength
        }
    }

    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Wavelength => WAVELENGTH_COLUMN,
            Self::Frequency => FREQUENCY_COLUMN,
        }
    }

    pub const fn is_frequency(self) -> bool {
        matches!(self, Self::Frequency)
    }
}

impl Display for SpectralAxis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).column_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    Linear,
    LogX,
    #[default]
    LogY,
    LogLog,
}

impl AxisScale {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" | "lin" => Some(Self::Linear),
            "logx" => Some(Self::LogX),
            "logy" => Some(Self::LogY),
            "loglog" => Some(Self::LogLog),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::LogX => "logx",
            Self::LogY => "logy",
            Self::LogLog => "loglog",
        }
    }

    pub const fn log_x(self) -> bool {
        matches!(self, Self::LogX | Self::LogLog)
    }

    pub const fn log_y(self) -> bool {
        matches!(self, Self::LogY | Self::LogLog)
    }
}

impl Display for AxisScale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
