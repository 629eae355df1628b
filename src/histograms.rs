//! Discrete distributions over a numeric header axis
use indexmap::IndexMap;
use labtab_utils::{argsort_by, cumsum};
use ndarray::{Axis, Dimension, IxDyn};
use serde::{Deserialize, Serialize};

use crate::array::ArrayTable;
use crate::error::TableError;
use crate::operations::single_datakey;

/// A discrete distribution: the weight `data[i]` at the numeric value
/// `index[i]` of the label `axis[i]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Histogram {
    pub name: String,
    pub axisname: String,
    pub dataname: String,
    pub axis: Vec<String>,
    pub index: Vec<f64>,
    pub data: Vec<f64>,
    #[serde(default)]
    pub scope: IndexMap<String, String>,
}

impl Histogram {
    pub fn new<S: Into<String>>(
        name: S,
        (axisname, axis, index): (String, Vec<String>, Vec<f64>),
        (dataname, data): (String, Vec<f64>),
        scope: IndexMap<String, String>,
    ) -> Result<Self, TableError> {
        if axis.len() != index.len() || axis.len() != data.len() {
            return Err(TableError::InvalidArgument(format!(
                "histogram lengths differ: {} labels, {} values, {} weights",
                axis.len(),
                index.len(),
                data.len()
            )));
        }
        if index.iter().any(|x| !x.is_finite()) {
            return Err(TableError::NonNumericAxis(axisname));
        }
        Ok(Histogram {
            name: name.into(),
            axisname,
            dataname,
            axis,
            index,
            data,
            scope,
        })
    }

    /// Build a histogram from a single-layer one-dimensional table. Labels
    /// with missing weights are skipped.
    pub fn from_table(table: &ArrayTable) -> Result<Self, TableError> {
        let datakey = single_datakey(table)?;
        let axisname = match table.dimkeys().as_slice() {
            [axis] => String::from(*axis),
            dims => {
                return Err(TableError::NotOneDimensional(
                    dims.iter().map(|d| String::from(*d)).collect(),
                ))
            }
        };
        let labels = table.header(&axisname)?;
        let values = table.axis_values(&axisname)?;
        let weights = &table.arrays()[datakey.as_str()];

        let mut axis = Vec::new();
        let mut index = Vec::new();
        let mut data = Vec::new();
        for ((label, x), w) in labels.iter().zip(values).zip(weights.iter()) {
            if w.is_nan() {
                continue;
            }
            axis.push(label.clone());
            index.push(x);
            data.push(*w);
        }
        Histogram::new(
            table.name(),
            (axisname, axis, index),
            (datakey, data),
            table.scope().clone(),
        )
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn rename<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// The weights scaled to sum to one
    pub fn probabilities(&self) -> Vec<f64> {
        let total: f64 = self.data.iter().sum();
        self.data.iter().map(|w| w / total).collect()
    }

    fn central_moment(&self, k: i32) -> f64 {
        let mean = self.mean();
        self.index
            .iter()
            .zip(self.probabilities())
            .map(|(x, p)| p * (x - mean).powi(k))
            .sum()
    }

    pub fn mean(&self) -> f64 {
        self.index
            .iter()
            .zip(self.probabilities())
            .map(|(x, p)| x * p)
            .sum()
    }

    /// The smallest value whose cumulative probability reaches one half
    pub fn median(&self) -> f64 {
        let order = argsort_by(&self.index, f64::total_cmp);
        let probs = self.probabilities();
        let sorted: Vec<f64> = order.iter().map(|&ix| probs[ix]).collect();
        cumsum(&sorted)
            .iter()
            .position(|&cdf| cdf >= 0.5 - 1e-12)
            .map_or(f64::NAN, |pos| self.index[order[pos]])
    }

    pub fn std(&self) -> f64 {
        self.central_moment(2).sqrt()
    }

    /// Standard deviation relative to the mean
    pub fn rstd(&self) -> f64 {
        self.std() / self.mean()
    }

    pub fn skew(&self) -> f64 {
        self.central_moment(3) / self.central_moment(2).powf(1.5)
    }

    /// Excess (Fisher) kurtosis
    pub fn kurtosis(&self) -> f64 {
        self.central_moment(4) / self.central_moment(2).powi(2) - 3.0
    }
}

/// Named histograms
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramTable {
    pub name: String,
    pub histograms: IndexMap<String, Histogram>,
}

impl HistogramTable {
    pub fn new<S: Into<String>>(name: S, histograms: Vec<Histogram>) -> Result<Self, TableError> {
        let mut map = IndexMap::new();
        for histogram in histograms {
            let key = histogram.name.clone();
            if map.insert(key.clone(), histogram).is_some() {
                return Err(TableError::KeyOverlap(key));
            }
        }
        Ok(HistogramTable {
            name: name.into(),
            histograms: map,
        })
    }

    /// One histogram over `axis` for every combination of the labels of the
    /// other header axes of a single-layer table.
    ///
    /// Each histogram is named by its labels and carries them in its scope.
    pub fn from_table(table: &ArrayTable, axis: &str) -> Result<Self, TableError> {
        let datakey = single_datakey(table)?;
        let others: Vec<String> = table
            .dimkeys()
            .into_iter()
            .filter(|key| *key != axis)
            .map(String::from)
            .collect();
        if others.len() == table.dims() {
            return Err(TableError::KeyNotFound(String::from(axis)));
        }
        let table = table.transpose(&others)?;
        let arr = &table.arrays()[datakey.as_str()];
        let labels = table.header(axis)?;
        let values = table.axis_values(axis)?;
        let shape = table.shape();
        let shape = &shape[..others.len()];

        let mut histograms = Vec::new();
        for index in ndarray::indices(IxDyn(shape)) {
            let ix = index.slice();
            let mut lane = arr.view();
            for &i in ix {
                lane = lane.index_axis_move(Axis(0), i);
            }
            let mut scope = table.scope().clone();
            let mut parts = Vec::with_capacity(ix.len());
            for (key, &i) in others.iter().zip(ix) {
                let label = table.header(key)?[i].clone();
                parts.push(label.clone());
                scope.insert(key.clone(), label);
            }
            let name = if parts.is_empty() {
                String::from(table.name())
            } else {
                parts.join(", ")
            };

            let mut axis_labels = Vec::new();
            let mut index_values = Vec::new();
            let mut data = Vec::new();
            for ((label, x), w) in labels.iter().zip(values.iter()).zip(lane.iter()) {
                if !w.is_nan() {
                    axis_labels.push(label.clone());
                    index_values.push(*x);
                    data.push(*w);
                }
            }
            histograms.push(Histogram::new(
                name,
                (String::from(axis), axis_labels, index_values),
                (datakey.clone(), data),
                scope,
            )?);
        }
        HistogramTable::new(table.name(), histograms)
    }

    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Histogram> {
        self.histograms.get(name)
    }
}

impl ArrayTable {
    /// The histogram of a single-layer one-dimensional table
    pub fn to_histogram(&self) -> Result<Histogram, TableError> {
        Histogram::from_table(self)
    }
}
