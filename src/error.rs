/// Errors reported by the median estimators
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MedianError {
    /// The median was requested before any value was pushed
    #[error("median of an empty stream is undefined")]
    Empty,
    /// A rolling estimator was constructed with a window of zero values
    #[error("window size can not be zero")]
    ZeroWindow,
    /// A heap top could not be represented as `f64`
    #[error("value can not be represented as f64")]
    Unrepresentable,
}
