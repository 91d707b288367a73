//! Time-series signal store.
//!
//! One store holds every named signal of a simulation run: a fixed-length
//! value vector per signal plus a shared time axis. Signals are kept in
//! insertion order so that iteration over the store is deterministic.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::numeric::BAD_DATA_SENTINEL;
use crate::signal::SignalId;

/// Mapping from signal id to a fixed-length value array, plus shared
/// timestamps.
///
/// Values written as `f64::NAN` mean "not yet simulated"; the configured
/// bad-data value (default `-9999`) marks samples that are missing in
/// external data.
#[derive(Debug, Clone)]
pub struct SignalStore {
    order: Vec<SignalId>,
    values: HashMap<SignalId, Vec<f64>>,
    timestamps: Option<Vec<DateTime<Utc>>>,
    time_base_s: f64,
    bad_data_value: f64,
}

impl SignalStore {
    /// Empty store with the given time base (seconds between samples).
    pub fn new(time_base_s: f64) -> Self {
        Self {
            order: Vec::new(),
            values: HashMap::new(),
            timestamps: None,
            time_base_s,
            bad_data_value: BAD_DATA_SENTINEL,
        }
    }

    /// The interval between consecutive samples, in seconds.
    pub fn time_base_s(&self) -> f64 {
        self.time_base_s
    }

    /// The value treated as "missing" in external data.
    pub fn bad_data_value(&self) -> f64 {
        self.bad_data_value
    }

    pub fn set_bad_data_value(&mut self, value: f64) {
        self.bad_data_value = value;
    }

    /// Number of samples per signal, or `None` for an empty store.
    pub fn length(&self) -> Option<usize> {
        self.order
            .first()
            .and_then(|id| self.values.get(id))
            .map(Vec::len)
    }

    /// Signal ids in insertion order.
    pub fn signal_ids(&self) -> &[SignalId] {
        &self.order
    }

    pub fn contains(&self, id: &SignalId) -> bool {
        self.values.contains_key(id)
    }

    /// Add a complete value vector under a new signal id.
    pub fn add(&mut self, id: SignalId, values: Vec<f64>) -> CoreResult<()> {
        if self.values.contains_key(&id) {
            return Err(CoreError::DuplicateSignal {
                signal: id.to_string(),
            });
        }
        if let Some(expected) = self.length() {
            if values.len() != expected {
                return Err(CoreError::LengthMismatch {
                    signal: id.to_string(),
                    len: values.len(),
                    expected,
                });
            }
        }
        self.order.push(id.clone());
        self.values.insert(id, values);
        Ok(())
    }

    /// Create a signal of `n` samples holding `value0` at index 0 and the
    /// not-yet-simulated sentinel everywhere else.
    pub fn init_new_signal(&mut self, id: SignalId, value0: f64, n: usize) -> CoreResult<()> {
        let mut values = vec![f64::NAN; n];
        if n > 0 {
            values[0] = value0;
        }
        self.add(id, values)
    }

    /// Write one sample of an existing signal.
    pub fn set_value(&mut self, id: &SignalId, index: usize, value: f64) -> CoreResult<()> {
        let values = self
            .values
            .get_mut(id)
            .ok_or_else(|| CoreError::SignalNotFound {
                signal: id.to_string(),
            })?;
        if index >= values.len() {
            return Err(CoreError::IndexOob {
                signal: id.to_string(),
                index,
                len: values.len(),
            });
        }
        values[index] = value;
        Ok(())
    }

    /// One sample of one signal, `None` if the signal or index is absent.
    pub fn get(&self, id: &SignalId, index: usize) -> Option<f64> {
        self.values.get(id).and_then(|v| v.get(index)).copied()
    }

    /// Gather one sample for each of several signals; `None` if any is absent.
    pub fn get_many(&self, ids: &[SignalId], index: usize) -> Option<Vec<f64>> {
        ids.iter().map(|id| self.get(id, index)).collect()
    }

    /// Full value vector of one signal.
    pub fn get_values(&self, id: &SignalId) -> Option<&[f64]> {
        self.values.get(id).map(Vec::as_slice)
    }

    pub fn set_timestamps(&mut self, timestamps: Vec<DateTime<Utc>>) {
        self.timestamps = Some(timestamps);
    }

    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    /// Copy every signal of `other` into this store.
    ///
    /// Signals already present keep their existing values.
    pub fn combine(&self, other: &SignalStore) -> CoreResult<SignalStore> {
        let mut combined = self.clone();
        for id in other.signal_ids() {
            if !combined.contains(id) {
                let values = other.get_values(id).unwrap_or_default().to_vec();
                combined.add(id.clone(), values)?;
            }
        }
        Ok(combined)
    }
}
