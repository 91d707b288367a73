//! pl-core: stable foundation for plantloop.
//!
//! Contains:
//! - signal (signal identity and naming roles)
//! - store (time-series signal store shared by a simulation run)
//! - numeric (bad-data sentinel + tolerance helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod signal;
pub mod store;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use signal::{SignalId, SignalKind};
pub use store::SignalStore;
