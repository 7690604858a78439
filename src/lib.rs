#![doc = include_str!("../README.md")]
#![no_std]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(clippy::len_without_is_empty)]

extern crate alloc;

mod utils;
pub(crate) use utils::helper;

mod error;
pub use error::MedianError;

mod median_finder;
pub use median_finder::MedianFinder;

mod rolling;
pub use rolling::RollingMedian;

pub use ordered_float::OrderedFloat;
