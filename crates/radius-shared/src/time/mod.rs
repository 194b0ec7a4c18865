mod duration;
mod serde_impl;

#[cfg(feature = "chrono")]
mod chrono_impl;

#[cfg(feature = "time")]
mod time_impl;

pub use duration::*;
