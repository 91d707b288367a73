//! Signal identity and naming.
//!
//! Every time series in a plant simulation is identified by the model that
//! produces it, the role the signal plays, and an optional index for
//! multi-input models. The identity is a small struct; the textual rendering
//! is injective and only used at boundaries (logs, serialized data), never
//! parsed back for control flow.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The role a signal plays in the plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalKind {
    /// Output/manipulated variable of a PID controller.
    PidOutput,
    /// Setpoint of a PID controller.
    Setpoint,
    /// An input that is the output of another simulated model.
    InternalInput,
    /// An input supplied externally, not produced by any model.
    ExternalInput,
    /// An additive disturbance on a process output.
    Disturbance,
    /// The output of a process unit.
    Output,
    /// The output of a select block.
    SelectorOutput,
}

impl SignalKind {
    fn as_str(self) -> &'static str {
        match self {
            SignalKind::PidOutput => "PidU",
            SignalKind::Setpoint => "Setpoint",
            SignalKind::InternalInput => "InternalU",
            SignalKind::ExternalInput => "ExternalU",
            SignalKind::Disturbance => "Disturbance",
            SignalKind::Output => "Output",
            SignalKind::SelectorOutput => "SelectorOut",
        }
    }
}

/// Unique identifier of one named time series, produced by exactly one model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignalId {
    /// Id of the producing model (or the external name for external signals).
    pub model: String,
    /// Role of the signal.
    pub kind: SignalKind,
    /// Index, for models with several signals of the same role. Zero for most.
    pub index: u16,
}

// separator should not be "_", external tag names commonly contain it
const SEPARATOR: char = '-';

impl SignalId {
    /// Signal with index zero.
    pub fn new(model: impl Into<String>, kind: SignalKind) -> Self {
        Self {
            model: model.into(),
            kind,
            index: 0,
        }
    }

    /// Signal with an explicit index.
    pub fn indexed(model: impl Into<String>, kind: SignalKind, index: u16) -> Self {
        Self {
            model: model.into(),
            kind,
            index,
        }
    }

    /// An externally supplied signal with a free-form name.
    pub fn external(name: impl Into<String>) -> Self {
        Self::new(name, SignalKind::ExternalInput)
    }

    /// Standardized id of the estimated disturbance acting on a unit model.
    pub fn est_disturbance(model: impl Into<String>) -> Self {
        Self::new(model, SignalKind::Disturbance)
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.index == 0 {
            write!(f, "{}{}{}", self.model, SEPARATOR, self.kind.as_str())
        } else {
            write!(
                f,
                "{}{}{}{}{}",
                self.model,
                SEPARATOR,
                self.kind.as_str(),
                SEPARATOR,
                self.index
            )
        }
    }
}
