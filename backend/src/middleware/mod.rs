//! Request middleware.
//!
//! Purpose: request lifecycle concerns that sit outside handlers, namely
//! trace correlation and request header limits.

pub mod header_limit;
pub mod trace;

pub use header_limit::HeaderLimit;
pub use trace::Trace;
