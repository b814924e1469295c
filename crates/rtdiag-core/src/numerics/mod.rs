pub mod boxcar;
pub mod limits;

pub use boxcar::{smooth, smooth_column_vector};
pub use limits::{DEFAULT_Y_LIMIT_SCALE, RangeSelection, YLimitOptions, axis_y_limits, finite_range};
