//! Simulatable plant models.
//!
//! Everything a plant graph node can be lives here: the shared
//! [`SimulatableModel`] capability, the closed [`PlantModel`] variant enum
//! over the four model kinds, and the kinds themselves (first-order-lag unit
//! process, PID controller wrapper, min/max selector, guarded divide).
//!
//! Scheduling and initialization algorithms elsewhere in the workspace only
//! ever talk to the shared capability; none of them match on a concrete
//! model type beyond its [`ModelKind`] tag.

pub mod delay;
pub mod divide;
pub mod error;
pub mod model;
pub mod pid_model;
pub mod select;
pub mod unit;

// the controller configuration types are part of this crate's model-building
// surface
pub use pl_controls::{PidParameters, PidStatus};

pub use delay::SampleDelay;
pub use divide::{DivideModel, DivideParameters};
pub use error::{ModelError, ModelResult};
pub use model::{ModelIo, ModelKind, PlantModel, SimulatableModel};
pub use pid_model::{pid_slots, PidModel};
pub use select::{SelectKind, SelectModel};
pub use unit::{UnitModel, UnitParameters};
