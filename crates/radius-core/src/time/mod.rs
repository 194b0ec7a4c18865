//! Re-exports the common [`Duration`] type used throughout the control plane
//! for timeouts, retries, and message visibility windows.

pub use radius_shared::time::Duration;
