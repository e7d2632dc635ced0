use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// The Dirichlet hyperparameter vector over topics.
///
/// This struct holds one positive entry per topic, and is the quantity
/// re-estimated by the Newton-Raphson routines. It is a thin wrapper around
/// [ndarray::Array1<f64>] to provide additional functionality and context.
#[derive(Debug, Clone, PartialEq)]
pub struct Alpha {
    values: Array1<f64>,
}

impl Default for Alpha {
    fn default() -> Self {
        Self {
            values: Array1::zeros(0),
        }
    }
}

impl Alpha {
    pub fn new(values: Array1<f64>) -> Self {
        Self { values }
    }

    /// Create a new [Alpha] instance from a vector of values.
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self {
            values: Array1::from_vec(values),
        }
    }

    /// Create a symmetric [Alpha] with the same value for every topic.
    pub fn uniform(n_topics: usize, value: f64) -> Self {
        Self {
            values: Array1::from_elem(n_topics, value),
        }
    }

    /// Get a reference to the underlying vector.
    pub fn vector(&self) -> &Array1<f64> {
        &self.values
    }

    /// Get the number of topics.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a vector representation of the values.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().cloned()
    }
}

impl Serialize for Alpha {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_vec().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Alpha {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let values = Vec::<f64>::deserialize(deserializer)?;
        Ok(Self::from_vec(values))
    }
}

impl From<Vec<f64>> for Alpha {
    fn from(values: Vec<f64>) -> Self {
        Self::from_vec(values)
    }
}

impl From<Array1<f64>> for Alpha {
    fn from(values: Array1<f64>) -> Self {
        Self { values }
    }
}

impl Index<usize> for Alpha {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl IndexMut<usize> for Alpha {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.values[index]
    }
}
