//! fb-core: shared foundation for the feedback demonstrator.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - timing (wall-clock timers reported through tracing)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod timing;

pub use error::{FbError, FbResult};
pub use numeric::*;
pub use timing::Timer;
