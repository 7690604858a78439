use num_traits::ToPrimitive;

use crate::MedianError;

/// Converts a heap top to `f64`
///
/// # Arguments
///
/// * `value` - The value to convert
///
/// # Returns
///
/// * `Result<f64, MedianError>` - The converted value, or `Unrepresentable`
#[inline]
pub fn to_f64<T: ToPrimitive>(value: &T) -> Result<f64, MedianError> {
    value.to_f64().ok_or(MedianError::Unrepresentable)
}

/// Returns the midpoint of two partition tops
///
/// Both values are widened to `f64` before adding, so `i64::MIN` and
/// `i64::MAX` average without overflow.
///
/// # Arguments
///
/// * `low` - The maximum of the lower half
/// * `high` - The minimum of the upper half
///
/// # Returns
///
/// * `Result<f64, MedianError>` - The average of both values
#[inline]
pub fn midpoint<T: ToPrimitive>(low: &T, high: &T) -> Result<f64, MedianError> {
    let (low, high) = (to_f64(low)?, to_f64(high)?);
    Ok(low / 2.0 + high / 2.0)
}

/// Returns the median from a sorted slice
///
/// # Arguments
///
/// * `ss` - The sorted slice
///
/// # Returns
///
/// * `Result<f64, MedianError>` - The median, or `Empty` for an empty slice
#[inline]
pub fn median_from_sorted_slice<T: ToPrimitive>(ss: &[T]) -> Result<f64, MedianError> {
    let mid = ss.len() / 2;
    match ss.len() {
        0 => Err(MedianError::Empty),
        len if len % 2 == 0 => midpoint(&ss[mid - 1], &ss[mid]),
        _ => to_f64(&ss[mid]),
    }
}
