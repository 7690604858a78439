mod rolling_median;
pub use rolling_median::RollingMedian;
