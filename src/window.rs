use std::ops::Range;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WindowError {
    #[error("invalid window of {count} entries over a series of {len}")]
    InvalidArgument { count: usize, len: usize },
}

/// Finds the contiguous run of `count` prices with the smallest sum.
///
/// Returns the index range `start..start + count`. When several windows share the
/// minimal sum, the one starting first wins. Every window sum is computed from
/// scratch, so equal windows compare equal bit for bit.
pub fn find_minimal_sum_window(prices: &[f64], count: usize) -> Result<Range<usize>, WindowError> {
    if count == 0 || count > prices.len() {
        return Err(WindowError::InvalidArgument {
            count,
            len: prices.len(),
        });
    }

    let mut min_sum = f64::INFINITY;
    let mut min_start = 0;

    for (start, window) in prices.windows(count).enumerate() {
        let sum: f64 = window.iter().sum();
        if sum < min_sum {
            min_sum = sum;
            min_start = start;
        }
    }

    Ok(min_start..min_start + count)
}
