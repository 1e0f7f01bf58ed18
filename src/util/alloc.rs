//! Fallible buffer allocation for sample grids.

use crate::util::{KickerError, KickerResult};

/// Number of elements in a `width x height` grid.
pub(crate) fn grid_len(width: usize, height: usize) -> KickerResult<usize> {
    if width == 0 || height == 0 {
        return Err(KickerError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(KickerError::InvalidDimensions { width, height })
}

/// Allocates an empty buffer with capacity for `len` elements without
/// aborting on OOM.
pub(crate) fn try_with_capacity<T>(len: usize) -> KickerResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| KickerError::AllocationFailure { len })?;
    Ok(buf)
}
