//! Industrial PID control algorithm for plantloop.
//!
//! This crate holds the controller proper and the pieces it is configured
//! with: process-value filtering, input/output scaling, gain scheduling,
//! anti-surge kick logic and general feed-forward. The controller is a plain
//! stateful struct iterated one scan at a time; wrapping it into a
//! simulatable plant model is the `pl-models` crate's job.
//!
//! # Design Principles
//!
//! - **One scan per call**: `iterate` consumes the current process value and
//!   setpoint and returns the next output, mutating only the controller's own
//!   memory.
//! - **Bumpless by construction**: warm start, manual transfer and
//!   feed-forward activation never introduce an output step on their own.
//! - **Anti-windup last**: output clamping is applied after every other term
//!   and the clamped value is what the next scan integrates from.

pub mod anti_surge;
pub mod error;
pub mod feedforward;
pub mod filter;
pub mod gain_scheduling;
pub mod pid;
pub mod scaling;

pub use anti_surge::AntiSurgeParams;
pub use error::{ControlError, ControlResult};
pub use feedforward::FeedForward;
pub use filter::{LowPass, PidFilter, PidFilterParams};
pub use gain_scheduling::GainSchedule;
pub use pid::{PidController, PidParameters, PidStatus};
pub use scaling::PidScaling;
