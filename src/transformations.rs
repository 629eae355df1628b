//! Transformations along one axis of every layer
use indexmap::IndexMap;
use labtab_data::Dataset;
use labtab_utils::{nanmax, nanmean, nanmin, nanstd, nansum};
use labtab_variables::{VarType, Variable, Variables};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::array::{widen_integer, ArrayTable};
use crate::error::TableError;
use crate::operations::single_datakey;

/// How values between sampled points are estimated
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterpKind {
    #[default]
    Linear,
    Nearest,
    Previous,
    Next,
}

/// What to return outside of the sampled points
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Fill {
    /// Leave the value missing
    #[default]
    Missing,
    /// Continue the interpolation past the ends
    Extrapolate,
    Constant(f64),
}

/// Direction of a cumulative sum along an axis
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// From the first label to the last
    Lower,
    /// From the last label to the first
    Upper,
}

/// A NaN-aware summary of the values along an axis
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    Sum,
    Mean,
    Min,
    Max,
    Std,
}

impl Reduction {
    pub fn apply(&self, xs: &[f64]) -> f64 {
        match self {
            Reduction::Sum => nansum(xs),
            Reduction::Mean => nanmean(xs),
            Reduction::Min => nanmin(xs),
            Reduction::Max => nanmax(xs),
            Reduction::Std => nanstd(xs),
        }
    }

    /// Whether the reduction of integers may be fractional
    fn widens(&self) -> bool {
        matches!(self, Reduction::Mean | Reduction::Std)
    }
}

/// A transformation applied along one axis of every layer of a table
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Transformation {
    /// Divide by the sum
    Normalize,
    /// Subtract the mean and divide by the standard deviation
    Standardize,
    /// Rescale to the unit interval
    MinMax,
    /// Trailing moving average over `window` labels
    Average { window: usize },
    /// Cumulative sum
    Cumulate { direction: Direction },
    /// Fill missing values from the numeric axis values
    Interpolate {
        #[serde(default)]
        kind: InterpKind,
        #[serde(default)]
        fill: Fill,
    },
    /// Sample the inverse of each lane on the axis values
    Inversion {
        #[serde(default)]
        kind: InterpKind,
        #[serde(default)]
        fill: Fill,
    },
    /// Collapse the axis
    Reduce { reduction: Reduction },
    /// Collapse groups of labels into new labels
    Consolidate {
        groups: IndexMap<String, Vec<String>>,
        reduction: Reduction,
    },
}

/// Sort sampled points by `x`, dropping missing points and repeated `x`
fn sampled_points(xs: &[f64], ys: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut points: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points.dedup_by(|b, a| a.0 == b.0);
    points.into_iter().unzip()
}

/// Estimate the value at `x` of the function sampled at `(xs, ys)`.
///
/// `xs` must be sorted ascending without repeats and neither slice may
/// contain missing values.
pub fn interp1d(xs: &[f64], ys: &[f64], x: f64, kind: InterpKind, fill: Fill) -> f64 {
    let n = xs.len();
    if n == 0 || x.is_nan() {
        return match fill {
            Fill::Constant(c) if n == 0 => c,
            _ => f64::NAN,
        };
    }
    if let Ok(ix) = xs.binary_search_by(|v| v.total_cmp(&x)) {
        return ys[ix];
    }

    if x < xs[0] || x > xs[n - 1] {
        let below = x < xs[0];
        return match fill {
            Fill::Missing => f64::NAN,
            Fill::Constant(c) => c,
            Fill::Extrapolate => match kind {
                InterpKind::Linear if n > 1 => {
                    let (lo, hi) = if below { (0, 1) } else { (n - 2, n - 1) };
                    let slope = (ys[hi] - ys[lo]) / (xs[hi] - xs[lo]);
                    slope.mul_add(x - xs[lo], ys[lo])
                }
                _ if below => ys[0],
                _ => ys[n - 1],
            },
        };
    }

    let hi = xs.partition_point(|&v| v < x);
    let lo = hi - 1;
    match kind {
        InterpKind::Linear => {
            let t = (x - xs[lo]) / (xs[hi] - xs[lo]);
            t.mul_add(ys[hi] - ys[lo], ys[lo])
        }
        InterpKind::Nearest => {
            if x - xs[lo] <= xs[hi] - x {
                ys[lo]
            } else {
                ys[hi]
            }
        }
        InterpKind::Previous => ys[lo],
        InterpKind::Next => ys[hi],
    }
}

fn normalize(xs: &[f64]) -> Vec<f64> {
    let total = nansum(xs);
    xs.iter().map(|x| x / total).collect()
}

fn standardize(xs: &[f64]) -> Vec<f64> {
    let (mean, std) = (nanmean(xs), nanstd(xs));
    xs.iter().map(|x| (x - mean) / std).collect()
}

fn minmax(xs: &[f64]) -> Vec<f64> {
    let (min, max) = (nanmin(xs), nanmax(xs));
    xs.iter().map(|x| (x - min) / (max - min)).collect()
}

fn trailing_average(xs: &[f64], window: usize) -> Vec<f64> {
    (0..xs.len())
        .map(|ix| nanmean(&xs[(ix + 1).saturating_sub(window)..=ix]))
        .collect()
}

/// Running sum that skips missing values and leaves them missing
fn cumulate(xs: &[f64], direction: Direction) -> Vec<f64> {
    let mut total = 0.0;
    let mut running = |x: &f64| {
        if x.is_nan() {
            f64::NAN
        } else {
            total += x;
            total
        }
    };
    match direction {
        Direction::Lower => xs.iter().map(&mut running).collect(),
        Direction::Upper => {
            let mut ys: Vec<f64> = xs.iter().rev().map(&mut running).collect();
            ys.reverse();
            ys
        }
    }
}

fn interpolate(grid: &[f64], ys: &[f64], kind: InterpKind, fill: Fill) -> Vec<f64> {
    let (known_x, known_y) = sampled_points(grid, ys);
    grid.iter()
        .zip(ys.iter())
        .map(|(&x, &y)| {
            if y.is_nan() {
                interp1d(&known_x, &known_y, x, kind, fill)
            } else {
                y
            }
        })
        .collect()
}

fn invert(grid: &[f64], ys: &[f64], kind: InterpKind, fill: Fill) -> Vec<f64> {
    let (known_y, known_x) = sampled_points(ys, grid);
    grid.iter()
        .map(|&y| interp1d(&known_y, &known_x, y, kind, fill))
        .collect()
}

/// The variable of a layer after `transformation`
fn transformed_variable(
    var: &Variable,
    axis_var: &Variable,
    transformation: &Transformation,
) -> Variable {
    match transformation {
        Transformation::Normalize
        | Transformation::Standardize
        | Transformation::MinMax => Variable {
            notes: var.notes.clone(),
            ..Variable::number(var.name.clone())
        },
        Transformation::Average { .. } | Transformation::Interpolate { .. } => {
            widen_integer(var)
        }
        Transformation::Inversion { .. } => Variable::new(
            var.name.clone(),
            VarType::Number {
                unit: axis_var.vartype.unit().map(String::from),
                precision: None,
                scale: 1.0,
            },
        ),
        Transformation::Reduce { reduction }
        | Transformation::Consolidate { reduction, .. } => {
            if reduction.widens() {
                widen_integer(var)
            } else {
                var.clone()
            }
        }
        Transformation::Cumulate { .. } => var.clone(),
    }
}

/// Positions of the labels of each group along `axis`
fn group_positions(
    table: &ArrayTable,
    axis: &str,
    groups: &IndexMap<String, Vec<String>>,
) -> Result<Vec<(String, Vec<usize>)>, TableError> {
    let axis_var = table.variables().try_get(axis)?;
    groups
        .iter()
        .map(|(label, members)| -> Result<(String, Vec<usize>), TableError> {
            let members = members
                .iter()
                .map(|member| axis_var.normalize(member))
                .collect::<Result<Vec<String>, _>>()?;
            let positions = table.dataset().positions(axis, &members)?;
            Ok((label.clone(), positions))
        })
        .collect()
}

/// The axis variable after consolidating into `labels`. Falls back to text
/// if the new labels do not parse.
fn consolidated_axis_variable(axis_var: &Variable, labels: &[String]) -> Variable {
    if labels.iter().all(|label| axis_var.parse(label).is_ok()) {
        axis_var.clone()
    } else {
        debug!(
            "consolidated labels of {} do not parse, using text",
            axis_var.name
        );
        Variable {
            notes: axis_var.notes.clone(),
            ..Variable::text(axis_var.name.clone())
        }
    }
}

impl ArrayTable {
    /// Apply `transformation` along `axis` of every layer. Layers are
    /// transformed in parallel.
    ///
    /// `retag` renames the resulting layer of a single-layer table.
    ///
    /// # Example
    ///
    /// ```
    /// # use indexmap::IndexMap;
    /// # use labtab::{ArrayTable, Reduction, Transformation};
    /// # use labtab_data::Dataset;
    /// # use labtab_variables::Variables;
    /// # use ndarray::array;
    /// let mut dims = IndexMap::new();
    /// dims.insert(String::from("year"), vec![String::from("2020"), String::from("2021")]);
    /// let mut layers = IndexMap::new();
    /// layers.insert(String::from("cases"), array![3.0, 4.0].into_dyn());
    /// let dataset = Dataset::new(dims, layers, IndexMap::new()).unwrap();
    /// let table = ArrayTable::new("cases", dataset, &Variables::default()).unwrap();
    ///
    /// let total = table
    ///     .transform("year", &Transformation::Reduce { reduction: Reduction::Sum }, Some("total"))
    ///     .unwrap();
    ///
    /// assert_eq!(total.datakeys(), vec!["total"]);
    /// assert_eq!(total.arrays()["total"].sum(), 7.0);
    /// ```
    pub fn transform(
        &self,
        axis: &str,
        transformation: &Transformation,
        retag: Option<&str>,
    ) -> Result<ArrayTable, TableError> {
        if !self.dimkeys().contains(&axis) {
            return Err(TableError::KeyNotFound(String::from(axis)));
        }
        if let Transformation::Average { window: 0 } = transformation {
            return Err(TableError::InvalidArgument(String::from(
                "the averaging window must be positive",
            )));
        }
        let axis_var = self.variables().try_get(axis)?;
        let grid = match transformation {
            Transformation::Interpolate { .. } | Transformation::Inversion { .. } => {
                self.axis_values(axis)?
            }
            _ => Vec::new(),
        };
        let groups = match transformation {
            Transformation::Consolidate { groups, .. } => {
                group_positions(self, axis, groups)?
            }
            _ => Vec::new(),
        };

        let apply = |dataset: &Dataset| -> Result<Dataset, TableError> {
            let out = match transformation {
                Transformation::Normalize => dataset.map_lanes(axis, normalize)?,
                Transformation::Standardize => dataset.map_lanes(axis, standardize)?,
                Transformation::MinMax => dataset.map_lanes(axis, minmax)?,
                Transformation::Average { window } => {
                    dataset.map_lanes(axis, |xs| trailing_average(xs, *window))?
                }
                Transformation::Cumulate { direction } => {
                    dataset.map_lanes(axis, |xs| cumulate(xs, *direction))?
                }
                Transformation::Interpolate { kind, fill } => {
                    dataset.map_lanes(axis, |ys| interpolate(&grid, ys, *kind, *fill))?
                }
                Transformation::Inversion { kind, fill } => {
                    dataset.map_lanes(axis, |ys| invert(&grid, ys, *kind, *fill))?
                }
                Transformation::Reduce { reduction } => {
                    dataset.reduce(axis, |xs| reduction.apply(xs))?
                }
                Transformation::Consolidate { reduction, .. } => {
                    dataset.group_reduce(axis, &groups, |xs| reduction.apply(xs))?
                }
            };
            Ok(out)
        };

        let single_layers = self
            .datakeys()
            .iter()
            .map(|datakey| self.dataset().subset(&[datakey]))
            .collect::<Result<Vec<Dataset>, _>>()?;
        let transformed = single_layers
            .par_iter()
            .map(apply)
            .collect::<Result<Vec<Dataset>, TableError>>()?;
        let mut dataset = labtab_data::merge(&transformed)?;
        dataset.attrs = self.dataset().attrs.clone();

        let mut variables: Variables = self.variables().clone();
        for datakey in self.datakeys() {
            let var = variables.try_get(datakey)?;
            let updated = transformed_variable(var, axis_var, transformation);
            variables.insert(updated);
        }
        if let Transformation::Consolidate { .. } = transformation {
            let labels: Vec<String> = groups.iter().map(|(label, _)| label.clone()).collect();
            variables.insert(consolidated_axis_variable(axis_var, &labels));
        }

        let table = ArrayTable::new(self.name(), dataset, &variables)?;
        match retag {
            Some(tag) => {
                let datakey = single_datakey(&table)?;
                table.retag(&[(datakey.as_str(), tag)])
            }
            None => Ok(table),
        }
    }
}
