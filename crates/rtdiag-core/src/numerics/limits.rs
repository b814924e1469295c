use crate::domain::{NumericsResult, RtDiagError};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_Y_LIMIT_SCALE: f64 = 10.0;

/// Which samples of `y` contribute to the inferred limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSelection {
    /// Samples whose `x` lies within the closed interval `[xmin, xmax]`.
    #[default]
    Inside,
    /// Samples whose `x` lies outside `[xmin, xmax]`.
    Outside,
}

impl RangeSelection {
    fn selects(self, x: f64, xmin: f64, xmax: f64) -> bool {
        let inside = x >= xmin && x <= xmax;
        match self {
            Self::Inside => inside,
            Self::Outside => !inside,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YLimitOptions {
    pub scale: f64,
    pub selection: RangeSelection,
    pub drop_zeros: bool,
}

impl Default for YLimitOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_Y_LIMIT_SCALE,
            selection: RangeSelection::Inside,
            drop_zeros: false,
        }
    }
}

/// Infer `(lower, upper)` y-axis limits for the x range `[xmin, xmax]`.
///
/// Returns `(None, None)` when either bound is missing or nothing is selected.
pub fn axis_y_limits(
    x: &[f64],
    y: &[f64],
    xmin: Option<f64>,
    xmax: Option<f64>,
    options: YLimitOptions,
) -> NumericsResult<(Option<f64>, Option<f64>)> {
    if x.len() != y.len() {
        return Err(RtDiagError::dimension(
            "DIMENSION.Y_LIMITS",
            format!(
                "x and y are of different dimensions: x {} y {}",
                x.len(),
                y.len()
            ),
        ));
    }

    let (Some(xmin), Some(xmax)) = (xmin, xmax) else {
        return Ok((None, None));
    };

    let selected = x
        .iter()
        .zip(y)
        .filter(|(xv, _)| options.selection.selects(**xv, xmin, xmax))
        .map(|(_, yv)| *yv)
        .filter(|yv| !(options.drop_zeros && *yv == 0.0));

    let Some((lowest, highest)) = finite_range(selected) else {
        debug!(xmin, xmax, "no samples selected for y limits");
        return Ok((None, None));
    };

    Ok((Some(lowest / options.scale), Some(highest * options.scale)))
}

/// Minimum and maximum over finite values, `None` when there are none.
pub fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|value| value.is_finite())
        .fold(None, |range, value| match range {
            None => Some((value, value)),
            Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
        })
}
