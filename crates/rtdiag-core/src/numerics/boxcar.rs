//! Boxcar (moving-average) smoothing with "same"-length output.
//!
//! Output sample `t` averages input samples `t - width/2 ..= t + (width-1)/2`;
//! samples beyond either end count as zero, so the edges taper the same way
//! a centered convolution with an implicitly zero-padded signal does.

use crate::domain::{NumericsResult, RtDiagError};

/// Smooth `values` with a boxcar window of `width` samples.
///
/// `None` is an explicit no-op and a width of one is the identity.
pub fn smooth(values: &[f64], width: Option<usize>) -> NumericsResult<Vec<f64>> {
    let Some(width) = width else {
        return Ok(values.to_vec());
    };
    if width == 0 {
        return Err(RtDiagError::input_type(
            "TYPE.SMOOTH_WIDTH",
            "boxcar width must be a positive integer, got 0",
        ));
    }
    if width == 1 || values.is_empty() {
        return Ok(values.to_vec());
    }

    let lead = width / 2;
    let trail = (width - 1) / 2;
    let last = values.len() - 1;
    let norm = width as f64;

    let smoothed = (0..values.len())
        .map(|index| {
            let start = index.saturating_sub(lead);
            let end = (index + trail).min(last);
            values[start..=end].iter().sum::<f64>() / norm
        })
        .collect();

    Ok(smoothed)
}

/// Smooth an `n x 1` column vector by flattening it first.
pub fn smooth_column_vector(values: &[Vec<f64>], width: Option<usize>) -> NumericsResult<Vec<f64>> {
    if let Some((row, cells)) = values.iter().enumerate().find(|(_, row)| row.len() != 1) {
        return Err(RtDiagError::dimension(
            "DIMENSION.SMOOTH_RANK",
            format!(
                "data is not 1 dimensional: row {} has {} columns",
                row,
                cells.len()
            ),
        ));
    }

    let flat = values.iter().map(|row| row[0]).collect::<Vec<_>>();
    smooth(&flat, width)
}
