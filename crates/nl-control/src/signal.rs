//! Signal value and named-signal-map types.
//!
//! State flows into the loop as a mapping of named measurements (one entry
//! per recording device) and control signals flow out as a mapping of named
//! commands (one entry per stimulation device). Values are scalars or
//! vectors; vectors cover spike-train-like measurements where one sample
//! carries several numbers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single measured or commanded value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalValue {
    /// Scalar floating-point signal.
    Scalar(f64),
    /// Vector signal (e.g. per-channel measurements, spike counts).
    Vector(Vec<f64>),
}

impl SignalValue {
    /// Create a scalar signal.
    pub fn scalar(value: f64) -> Self {
        Self::Scalar(value)
    }

    /// Create a vector signal.
    pub fn vector(values: impl Into<Vec<f64>>) -> Self {
        Self::Vector(values.into())
    }

    /// Get the scalar value as an option.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Vector(_) => None,
        }
    }

    /// Get the vector contents as an option.
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Self::Scalar(_) => None,
            Self::Vector(v) => Some(v),
        }
    }
}

impl From<f64> for SignalValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<f64>> for SignalValue {
    fn from(values: Vec<f64>) -> Self {
        Self::Vector(values)
    }
}

/// Ordered mapping of signal names to values.
///
/// The map on its own carries no time information; pairing a map with a
/// virtual time is the scheduler's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalMap(BTreeMap<String, SignalValue>);

impl SignalMap {
    /// Create an empty signal map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of named signals in the map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map carries no signals.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or replace a named signal.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SignalValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Insert a named signal, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<SignalValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a named signal.
    pub fn get(&self, name: &str) -> Option<&SignalValue> {
        self.0.get(name)
    }

    /// Look up a named scalar signal.
    pub fn scalar(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(SignalValue::as_scalar)
    }

    /// Iterate over (name, value) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SignalValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<N: Into<String>, V: Into<SignalValue>> FromIterator<(N, V)> for SignalMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_round_trip() {
        let mut map = SignalMap::new();
        map.insert("rate", 12.5);
        assert_eq!(map.scalar("rate"), Some(12.5));
        assert_eq!(map.scalar("missing"), None);
    }

    #[test]
    fn vector_value() {
        let map = SignalMap::new().with("spikes", vec![0.0, 2.0, 1.0]);
        let v = map.get("spikes").and_then(SignalValue::as_vector).unwrap();
        assert_eq!(v, &[0.0, 2.0, 1.0]);
        assert_eq!(map.scalar("spikes"), None);
    }

    #[test]
    fn builder_and_from_iter_agree() {
        let a = SignalMap::new().with("x", 1.0).with("y", 2.0);
        let b: SignalMap = [("x", 1.0), ("y", 2.0)].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn serde_round_trip() {
        let map = SignalMap::new().with("x", 1.0).with("v", vec![1.0, 2.0]);
        let json = serde_json::to_string(&map).unwrap();
        let back: SignalMap = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }
}
