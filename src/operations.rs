//! Arithmetic between single-layer tables
use indexmap::IndexMap;
use labtab_variables::Method;
use ndarray::Zip;
use serde::{Deserialize, Serialize};

use crate::alignment::{align, align_variables, Join};
use crate::array::ArrayTable;
use crate::error::TableError;

/// Options of a binary operation
///
/// # Example
///
/// ```
/// # use labtab::OperationConfig;
/// let config = OperationConfig::new()
///     .noncore(["source"])
///     .retag("rate")
///     .name("Death rate");
///
/// assert_eq!(config.noncore, vec![String::from("source")]);
/// assert_eq!(config.retag.as_deref(), Some("rate"));
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct OperationConfig {
    /// Length-one axes squeezed into scope before the operation
    #[serde(default)]
    pub axes: Vec<String>,
    /// Axes squeezed and then removed from scope before the operation
    #[serde(default)]
    pub noncore: Vec<String>,
    /// Rename the resulting layer
    #[serde(default)]
    pub retag: Option<String>,
    /// Rename the resulting table
    #[serde(default)]
    pub name: Option<String>,
}

impl OperationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axes<I, S>(mut self, axes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.axes.extend(axes.into_iter().map(Into::into));
        self
    }

    pub fn noncore<I, S>(mut self, noncore: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.noncore.extend(noncore.into_iter().map(Into::into));
        self
    }

    pub fn retag<S: Into<String>>(mut self, retag: S) -> Self {
        self.retag = Some(retag.into());
        self
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }
}

pub(crate) fn single_datakey(table: &ArrayTable) -> Result<String, TableError> {
    match table.datakeys().as_slice() {
        [datakey] => Ok(String::from(*datakey)),
        datakeys => Err(TableError::NotSingleLayer(
            datakeys.iter().map(|k| String::from(*k)).collect(),
        )),
    }
}

/// Squeeze `axes` and `noncore` where possible, then drop `noncore` from
/// scope
pub(crate) fn prepare(
    table: &ArrayTable,
    axes: &[String],
    noncore: &[String],
) -> Result<ArrayTable, TableError> {
    let mut table = table.clone();
    for axis in axes.iter().chain(noncore.iter()) {
        if let Ok(squeezed) = table.squeeze(&[axis]) {
            table = squeezed;
        }
    }
    let scoped: Vec<String> = noncore
        .iter()
        .filter(|key| table.scopekeys().contains(&key.as_str()))
        .cloned()
        .collect();
    table.removescope(&scoped)
}

fn result_datakey(left: &str, right: &str, method: Method) -> String {
    match method {
        Method::Add | Method::Subtract | Method::Average if left == right => {
            String::from(left)
        }
        Method::Add => format!("{left}+{right}"),
        Method::Subtract => format!("{left}-{right}"),
        Method::Multiply => format!("{left}*{right}"),
        Method::Divide => format!("{left}/{right}"),
        Method::Average => format!("Avg{left}&{right}"),
    }
}

fn apply(method: Method, x: f64, y: f64) -> f64 {
    match method {
        Method::Add => x + y,
        Method::Subtract => x - y,
        Method::Multiply => x * y,
        Method::Divide => x / y,
        Method::Average => (x + y) / 2.0,
    }
}

/// Apply `method` between the layers of two single-layer tables.
///
/// Header axes in both tables are inner joined and the others broadcast.
/// The result has the axes of `table` followed by the axes only in `other`.
/// Scope entries that agree, or are in one table only, are kept.
pub fn operation(
    table: &ArrayTable,
    other: &ArrayTable,
    method: Method,
    config: &OperationConfig,
) -> Result<ArrayTable, TableError> {
    let table = prepare(table, &config.axes, &config.noncore)?;
    let other = prepare(other, &config.axes, &config.noncore)?;
    let left_key = single_datakey(&table)?;
    let right_key = single_datakey(&other)?;

    let (table, other) = align(&table, &other, Join::Inner, &[] as &[&str])?;

    let mut dims = table.headers().clone();
    for (axis, labels) in other.headers().iter() {
        if !dims.contains_key(axis) {
            dims.insert(axis.clone(), labels.clone());
        }
    }

    let mut scope: IndexMap<String, String> = IndexMap::new();
    for (key, label) in table.scope().iter().chain(other.scope().iter()) {
        if dims.contains_key(key) {
            continue;
        }
        let in_left = table.scope().get(key);
        let in_right = other.scope().get(key);
        let agree = match (in_left, in_right) {
            (Some(l), Some(r)) => l == r,
            _ => true,
        };
        if agree {
            scope.insert(key.clone(), label.clone());
        }
    }

    let xs = table.dataset().broadcast_layer(&left_key, &dims)?;
    let ys = other.dataset().broadcast_layer(&right_key, &dims)?;
    let values = Zip::from(&xs)
        .and(&ys)
        .map_collect(|&x, &y| apply(method, x, y));

    let datakey = config
        .retag
        .clone()
        .unwrap_or_else(|| result_datakey(&left_key, &right_key, method));
    let left_var = table.variables().try_get(&left_key)?;
    let right_var = other.variables().try_get(&right_key)?;
    let data_var = left_var.operation(right_var, method, datakey.as_str())?;

    let mut left_axes = table.variables().clone();
    left_axes.remove(&left_key);
    let mut right_axes = other.variables().clone();
    right_axes.remove(&right_key);
    right_axes.retain(|var| dims.contains_key(&var.name) || scope.contains_key(&var.name));
    left_axes.retain(|var| dims.contains_key(&var.name) || scope.contains_key(&var.name));
    let mut variables = align_variables(&left_axes, &right_axes)?;
    variables.insert(data_var);

    let mut layers = IndexMap::new();
    layers.insert(datakey, values);
    let dataset = labtab_data::Dataset::new(dims, layers, scope)?;
    let name = config
        .name
        .clone()
        .unwrap_or_else(|| String::from(table.name()));
    ArrayTable::new(name, dataset, &variables)
}

pub fn add(
    table: &ArrayTable,
    other: &ArrayTable,
    config: &OperationConfig,
) -> Result<ArrayTable, TableError> {
    operation(table, other, Method::Add, config)
}

pub fn subtract(
    table: &ArrayTable,
    other: &ArrayTable,
    config: &OperationConfig,
) -> Result<ArrayTable, TableError> {
    operation(table, other, Method::Subtract, config)
}

pub fn multiply(
    table: &ArrayTable,
    other: &ArrayTable,
    config: &OperationConfig,
) -> Result<ArrayTable, TableError> {
    operation(table, other, Method::Multiply, config)
}

pub fn divide(
    table: &ArrayTable,
    other: &ArrayTable,
    config: &OperationConfig,
) -> Result<ArrayTable, TableError> {
    operation(table, other, Method::Divide, config)
}

pub fn average(
    table: &ArrayTable,
    other: &ArrayTable,
    config: &OperationConfig,
) -> Result<ArrayTable, TableError> {
    operation(table, other, Method::Average, config)
}
