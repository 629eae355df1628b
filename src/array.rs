//! Labeled N-dimensional tables
use std::cmp::Ordering;
use std::ops::{Div, Mul};

use indexmap::IndexMap;
use labtab_data::{Dataset, DatasetError};
use labtab_utils::argsort_by;
use labtab_variables::infer::series_to_variable;
use labtab_variables::{How, Value, VarType, Variable, Variables};
use ndarray::{ArrayD, Dimension, IxDyn};
use polars::prelude::{DataFrame, NamedFrom, Series};
use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::flat::FlatTable;

/// Picks labels along one axis of an `ArrayTable`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// A single label. The axis moves into scope.
    Label(String),
    /// A single position. The axis moves into scope.
    Index(usize),
    /// Several labels in the given order
    Labels(Vec<String>),
    /// Every label between `start` and `stop` inclusive, compared by value
    Range {
        start: Option<String>,
        stop: Option<String>,
    },
}

/// An N-dimensional table of numeric layers over labeled header axes.
///
/// Every layer, header, and scope key has a variable. Header and scope
/// labels are kept in the canonical form of their variables.
#[derive(Debug, Clone)]
pub struct ArrayTable {
    name: String,
    dataset: Dataset,
    variables: Variables,
}

/// Tables are equal if their data and variables are equal. Names are
/// ignored.
impl PartialEq for ArrayTable {
    fn eq(&self, other: &Self) -> bool {
        self.dataset == other.dataset && self.variables == other.variables
    }
}

/// Infer the variable of an axis that has none. Labels that are not
/// numbers, dates, or ranges are text, never categories.
fn default_axis_variable(key: &str, labels: &[String]) -> Variable {
    let srs = Series::new(key, labels.to_vec());
    match series_to_variable(&srs, None) {
        Ok(var) if !matches!(var.vartype, VarType::Category { .. }) => var,
        _ => Variable::text(key),
    }
}

/// Data variables must describe numbers
fn numeric_data_variable(var: &Variable) -> Variable {
    match &var.vartype {
        VarType::Number { .. } | VarType::Integer { .. } => var.clone(),
        VarType::Range {
            unit, precision, ..
        } => Variable::new(
            var.name.clone(),
            VarType::Number {
                unit: unit.clone(),
                precision: *precision,
                scale: 1.0,
            },
        ),
        _ => Variable::number(var.name.clone()),
    }
}

/// The same variable with integer data widened to real numbers
pub(crate) fn widen_integer(var: &Variable) -> Variable {
    match &var.vartype {
        VarType::Integer { unit, scale } => Variable {
            name: var.name.clone(),
            vartype: VarType::Number {
                unit: unit.clone(),
                precision: None,
                scale: *scale,
            },
            notes: var.notes.clone(),
        },
        _ => var.clone(),
    }
}

impl ArrayTable {
    /// Create a table from a dataset.
    ///
    /// Variables are matched to keys by name and the rest are dropped. Keys
    /// without a variable get a default one: numbers for data, and a
    /// variable inferred from the labels for axes. Axis labels are
    /// normalized through their variables.
    pub fn new<S: Into<String>>(
        name: S,
        dataset: Dataset,
        variables: &Variables,
    ) -> Result<Self, TableError> {
        let mut dataset = dataset;
        let mut vars: Vec<Variable> = Vec::new();

        for (key, labels) in dataset.dims().clone().iter() {
            let var = variables
                .get(key)
                .cloned()
                .unwrap_or_else(|| default_axis_variable(key, labels));
            let normalized = labels
                .iter()
                .map(|label| var.normalize(label))
                .collect::<Result<Vec<String>, _>>()?;
            if &normalized != labels {
                dataset = dataset.relabel(key, normalized)?;
            }
            vars.push(var);
        }

        for (key, label) in dataset.scope().clone().iter() {
            let var = variables.get(key).cloned().unwrap_or_else(|| {
                default_axis_variable(key, std::slice::from_ref(label))
            });
            let normalized = var.normalize(label)?;
            if &normalized != label {
                dataset = dataset.relabel_scope(key, normalized)?;
            }
            vars.push(var);
        }

        for key in dataset.layer_names() {
            let var = variables
                .get(key)
                .map(numeric_data_variable)
                .unwrap_or_else(|| Variable::number(key));
            vars.push(var);
        }

        Ok(ArrayTable {
            name: name.into(),
            dataset,
            variables: Variables::new(vars)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the same table under a new name
    pub fn rename<S: Into<String>>(&self, name: S) -> Self {
        ArrayTable {
            name: name.into(),
            dataset: self.dataset.clone(),
            variables: self.variables.clone(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Number of data layers
    pub fn layers(&self) -> usize {
        self.dataset.layers().len()
    }

    /// Number of header axes
    pub fn dims(&self) -> usize {
        self.dataset.dims().len()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.dataset.shape()
    }

    pub fn datakeys(&self) -> Vec<&str> {
        self.dataset.layer_names()
    }

    pub fn dimkeys(&self) -> Vec<&str> {
        self.dataset.dim_names()
    }

    /// Alias of `dimkeys`
    pub fn headerkeys(&self) -> Vec<&str> {
        self.dimkeys()
    }

    pub fn scopekeys(&self) -> Vec<&str> {
        self.dataset.scope_names()
    }

    /// Header keys then scope keys
    pub fn axeskeys(&self) -> Vec<&str> {
        let mut keys = self.dimkeys();
        keys.extend(self.scopekeys());
        keys
    }

    /// Header, scope, then data keys
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = self.axeskeys();
        keys.extend(self.datakeys());
        keys
    }

    pub fn headers(&self) -> &IndexMap<String, Vec<String>> {
        self.dataset.dims()
    }

    pub fn scope(&self) -> &IndexMap<String, String> {
        self.dataset.scope()
    }

    pub fn arrays(&self) -> &IndexMap<String, ArrayD<f64>> {
        self.dataset.layers()
    }

    /// The labels along a header axis
    pub fn header(&self, axis: &str) -> Result<&[String], TableError> {
        self.dataset
            .labels(axis)
            .ok_or_else(|| TableError::KeyNotFound(String::from(axis)))
    }

    /// The parsed labels along a header axis
    pub fn header_values(&self, axis: &str) -> Result<Vec<Value>, TableError> {
        let var = self.variables.try_get(axis)?;
        self.header(axis)?
            .iter()
            .map(|label| var.parse(label).map_err(TableError::from))
            .collect()
    }

    /// The numeric projection of the labels along a header axis
    pub fn axis_values(&self, axis: &str) -> Result<Vec<f64>, TableError> {
        self.header_values(axis)?
            .iter()
            .map(|value| {
                value
                    .to_f64_opt()
                    .ok_or_else(|| TableError::NonNumericAxis(String::from(axis)))
            })
            .collect()
    }

    fn with_dataset(&self, dataset: Dataset) -> Result<Self, TableError> {
        ArrayTable::new(self.name.clone(), dataset, &self.variables)
    }

    /// Replace or add the variable of a key
    pub fn with_variable(&self, variable: Variable) -> Result<Self, TableError> {
        if !self.dataset.contains_key(&variable.name) {
            return Err(TableError::KeyNotFound(variable.name));
        }
        let mut variables = self.variables.clone();
        variables.insert(variable);
        ArrayTable::new(self.name.clone(), self.dataset.clone(), &variables)
    }

    /// The table of a single layer
    pub fn layer(&self, datakey: &str) -> Result<Self, TableError> {
        self.layers_of(&[datakey])
    }

    /// The table of the layer at a position
    pub fn layer_at(&self, index: usize) -> Result<Self, TableError> {
        let datakeys = self.datakeys();
        let datakey = datakeys.get(index).ok_or_else(|| {
            TableError::InvalidArgument(format!(
                "layer {index} out of bounds for {} layers",
                datakeys.len()
            ))
        })?;
        self.layer(datakey)
    }

    /// The table of several layers, in the given order
    pub fn layers_of<S: AsRef<str>>(&self, datakeys: &[S]) -> Result<Self, TableError> {
        let dataset = self.dataset.subset(datakeys).map_err(|err| match err {
            DatasetError::LayerNotFound(key) => TableError::KeyNotFound(key),
            err => err.into(),
        })?;
        self.with_dataset(dataset)
    }

    /// Select labels along one or more axes, then drop any header labels
    /// that are entirely missing.
    pub fn sel<S: AsRef<str>>(
        &self,
        selections: &[(S, Selector)],
    ) -> Result<Self, TableError> {
        let mut dataset = self.dataset.clone();
        for (axis, selector) in selections {
            let axis = axis.as_ref();
            let var = self.variables.try_get(axis)?;
            dataset = match selector {
                Selector::Label(label) => dataset.sel_one(axis, &var.normalize(label)?)?,
                Selector::Index(index) => dataset.isel_one(axis, *index)?,
                Selector::Labels(labels) => {
                    let labels = labels
                        .iter()
                        .map(|label| var.normalize(label))
                        .collect::<Result<Vec<String>, _>>()?;
                    dataset.sel(axis, &labels)?
                }
                Selector::Range { start, stop } => {
                    let existing = dataset
                        .labels(axis)
                        .ok_or_else(|| TableError::KeyNotFound(String::from(axis)))?;
                    let mut keep: Vec<usize> = Vec::new();
                    for (ix, label) in existing.iter().enumerate() {
                        let after_start = match start {
                            Some(start) => var.compare(label, start)? != Ordering::Less,
                            None => true,
                        };
                        let before_stop = match stop {
                            Some(stop) => var.compare(label, stop)? != Ordering::Greater,
                            None => true,
                        };
                        if after_start && before_stop {
                            keep.push(ix);
                        }
                    }
                    dataset.isel(axis, &keep)?
                }
            };
        }
        self.with_dataset(dataset)?.dropallna()
    }

    /// Sort the labels of a header axis by their parsed values
    pub fn sort(&self, axis: &str, ascending: bool) -> Result<Self, TableError> {
        let values = self.header_values(axis)?;
        let mut order = argsort_by(&values, |a, b| a.cmp_value(b));
        if !ascending {
            order.reverse();
        }
        if order.iter().enumerate().all(|(i, &ix)| i == ix) {
            return Ok(self.clone());
        }
        let dataset = self.dataset.reorder(axis, &order)?;
        Ok(ArrayTable {
            name: self.name.clone(),
            dataset,
            variables: self.variables.clone(),
        })
    }

    /// Sort every header axis
    pub fn sortall(&self, ascending: bool) -> Result<Self, TableError> {
        self.dimkeys()
            .iter()
            .try_fold(self.clone(), |table, axis| table.sort(axis, ascending))
    }

    /// Drop labels along `axis` where every layer is missing
    pub fn dropna(&self, axis: &str) -> Result<Self, TableError> {
        Ok(ArrayTable {
            name: self.name.clone(),
            dataset: self.dataset.drop_empty(axis)?,
            variables: self.variables.clone(),
        })
    }

    /// `dropna` along every header axis
    pub fn dropallna(&self) -> Result<Self, TableError> {
        self.dimkeys()
            .iter()
            .try_fold(self.clone(), |table, axis| table.dropna(axis))
    }

    /// Move `axes` to the front, keeping the other axes in order
    pub fn transpose<S: AsRef<str>>(&self, axes: &[S]) -> Result<Self, TableError> {
        let mut order: Vec<&str> = axes.iter().map(AsRef::as_ref).collect();
        if let Some(axis) = order.iter().find(|axis| !self.dimkeys().contains(*axis)) {
            return Err(TableError::KeyNotFound(String::from(*axis)));
        }
        order.extend(self.dimkeys().into_iter().filter(|key| {
            !axes.iter().any(|axis| axis.as_ref() == *key)
        }));
        Ok(ArrayTable {
            name: self.name.clone(),
            dataset: self.dataset.transpose(&order)?,
            variables: self.variables.clone(),
        })
    }

    /// Turn the scope axis `axis` into a length-one header axis
    pub fn expand(&self, axis: &str) -> Result<Self, TableError> {
        Ok(ArrayTable {
            name: self.name.clone(),
            dataset: self.dataset.expand_dims(axis)?,
            variables: self.variables.clone(),
        })
    }

    /// Turn length-one header axes into scope. Axes already in scope are
    /// left alone.
    pub fn squeeze<S: AsRef<str>>(&self, axes: &[S]) -> Result<Self, TableError> {
        let mut dataset = self.dataset.clone();
        for axis in axes.iter().map(AsRef::as_ref) {
            if dataset.scope().contains_key(axis) {
                continue;
            }
            if !dataset.dims().contains_key(axis) {
                return Err(TableError::KeyNotFound(String::from(axis)));
            }
            dataset = dataset.squeeze(axis)?;
        }
        Ok(ArrayTable {
            name: self.name.clone(),
            dataset,
            variables: self.variables.clone(),
        })
    }

    /// Remove scope axes and their variables
    pub fn removescope<S: AsRef<str>>(&self, axes: &[S]) -> Result<Self, TableError> {
        let mut dataset = self.dataset.clone();
        let mut variables = self.variables.clone();
        for axis in axes.iter().map(AsRef::as_ref) {
            dataset = dataset.drop_scope(axis)?;
            variables.remove(axis);
        }
        Ok(ArrayTable {
            name: self.name.clone(),
            dataset,
            variables,
        })
    }

    /// Rename keys and their variables, given `(old, new)` pairs
    pub fn retag<S: AsRef<str>>(&self, tags: &[(S, S)]) -> Result<Self, TableError> {
        let mut dataset = self.dataset.clone();
        let mut variables = self.variables.clone();
        for (old, new) in tags {
            let (old, new) = (old.as_ref(), new.as_ref());
            dataset = dataset.rename(old, new).map_err(|err| match err {
                DatasetError::KeyNotFound(key) => TableError::KeyNotFound(key),
                DatasetError::KeyCollision(key) => TableError::KeyOverlap(key),
                err => err.into(),
            })?;
            variables.rename(old, new)?;
        }
        Ok(ArrayTable {
            name: self.name.clone(),
            dataset,
            variables,
        })
    }

    fn factor(&self, factor: f64, how: How) -> Result<Self, TableError> {
        if factor == 1.0 {
            return Ok(self.clone());
        }
        let mut variables = self.variables.clone();
        for datakey in self.datakeys() {
            let var = variables.try_get(datakey)?.factor(factor, how)?;
            variables.insert(var);
        }
        let dataset = match how {
            How::Multiply => self.dataset.map_layers(|x| x * factor),
            How::Divide => self.dataset.map_layers(|x| x / factor),
        };
        Ok(ArrayTable {
            name: self.name.clone(),
            dataset,
            variables,
        })
    }

    /// Multiply every layer by `factor`, rescaling the data variables
    pub fn multiply(&self, factor: f64) -> Result<Self, TableError> {
        self.factor(factor, How::Multiply)
    }

    /// Divide every layer by `factor`, rescaling the data variables
    pub fn divide(&self, factor: f64) -> Result<Self, TableError> {
        self.factor(factor, How::Divide)
    }

    /// Flatten into a row per header combination.
    ///
    /// Columns are the header axes, then the scope axes, then the layers.
    /// Rows where every layer is missing are skipped.
    pub fn flatten(&self) -> Result<FlatTable, TableError> {
        let headers: Vec<(&String, &Vec<String>)> = self.headers().iter().collect();
        let scope: Vec<(&String, &String)> = self.scope().iter().collect();
        let mut variables = self.variables.clone();
        let layers: Vec<(&String, &ArrayD<f64>)> = self.arrays().iter().collect();

        // integer data that is no longer integral is written as numbers
        for (key, arr) in layers.iter() {
            let var = variables.try_get(key)?;
            let fractional = arr.iter().any(|x| x.is_finite() && x.fract() != 0.0);
            if matches!(var.vartype, VarType::Integer { .. }) && fractional {
                let widened = widen_integer(var);
                variables.insert(widened);
            }
        }
        let data_vars: Vec<&Variable> = layers
            .iter()
            .map(|(key, _)| variables.try_get(key))
            .collect::<Result<_, _>>()?;

        let mut header_cols: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        let mut data_cols: Vec<Vec<String>> = vec![Vec::new(); layers.len()];
        let mut nrows = 0;
        for index in ndarray::indices(IxDyn(&self.shape())) {
            let ix = index.slice();
            if layers.iter().all(|(_, arr)| arr[ix].is_nan()) {
                continue;
            }
            nrows += 1;
            for (h, (col, (_, labels))) in
                header_cols.iter_mut().zip(headers.iter()).enumerate()
            {
                col.push(labels[ix[h]].clone());
            }
            for ((col, (_, arr)), var) in
                data_cols.iter_mut().zip(layers.iter()).zip(data_vars.iter())
            {
                col.push(var.format_f64(arr[ix])?);
            }
        }

        let mut columns: Vec<Series> = Vec::new();
        for ((key, _), col) in headers.iter().zip(header_cols) {
            columns.push(Series::new(key.as_str(), col));
        }
        for (key, label) in scope.iter() {
            columns.push(Series::new(key.as_str(), vec![(*label).clone(); nrows]));
        }
        for ((key, _), col) in layers.iter().zip(data_cols) {
            columns.push(Series::new(key.as_str(), col));
        }
        let df = DataFrame::new(columns)?;
        FlatTable::new(self.name.clone(), &df, &variables)
    }
}

impl Mul<f64> for &ArrayTable {
    type Output = Result<ArrayTable, TableError>;

    fn mul(self, factor: f64) -> Self::Output {
        self.multiply(factor)
    }
}

impl Div<f64> for &ArrayTable {
    type Output = Result<ArrayTable, TableError>;

    fn div(self, factor: f64) -> Self::Output {
        self.divide(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use labtab_variables::Variable;
    use ndarray::array;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| String::from(*s)).collect()
    }

    // population by age and year, in the country `x`
    fn quick_table() -> ArrayTable {
        let mut dims = IndexMap::new();
        dims.insert(String::from("age"), labels(&["20-29", "0-9", "10-19"]));
        dims.insert(String::from("year"), labels(&["2021", "2020"]));
        let mut layers = IndexMap::new();
        layers.insert(
            String::from("population"),
            array![[5.0, 6.0], [1.0, 2.0], [3.0, f64::NAN]].into_dyn(),
        );
        let mut scope = IndexMap::new();
        scope.insert(String::from("country"), String::from("x"));
        let dataset = Dataset::new(dims, layers, scope).unwrap();
        let variables = Variables::new(vec![
            Variable::range("age"),
            Variable::integer("year"),
            Variable::integer("population"),
        ])
        .unwrap();
        ArrayTable::new("census", dataset, &variables).unwrap()
    }

    #[test]
    fn new_fills_missing_variables() {
        let table = quick_table();
        assert_eq!(table.variables().len(), 4);
        assert_eq!(table.variables()["country"].vartype, VarType::Text);
        assert_eq!(
            table.variables().names(),
            vec!["age", "year", "country", "population"]
        );
    }

    #[test]
    fn keys_are_partitioned() {
        let table = quick_table();
        assert_eq!(table.datakeys(), vec!["population"]);
        assert_eq!(table.headerkeys(), vec!["age", "year"]);
        assert_eq!(table.scopekeys(), vec!["country"]);
        assert_eq!(table.axeskeys(), vec!["age", "year", "country"]);
        assert_eq!(table.keys(), vec!["age", "year", "country", "population"]);
        assert_eq!(table.layers(), 1);
        assert_eq!(table.dims(), 2);
        assert_eq!(table.shape(), vec![3, 2]);
    }

    #[test]
    fn sort_orders_by_parsed_value() {
        let table = quick_table().sortall(true).unwrap();
        assert_eq!(table.header("age").unwrap(), labels(&["0-9", "10-19", "20-29"]));
        assert_eq!(table.header("year").unwrap(), labels(&["2020", "2021"]));
        let pop = &table.arrays()["population"];
        assert_relative_eq!(pop[[0, 0]], 2.0);
        assert_relative_eq!(pop[[0, 1]], 1.0);
        assert!(pop[[1, 0]].is_nan());
        assert_relative_eq!(pop[[2, 1]], 5.0);
    }

    #[test]
    fn sort_descending() {
        let table = quick_table().sort("age", false).unwrap();
        assert_eq!(table.header("age").unwrap(), labels(&["20-29", "10-19", "0-9"]));
    }

    #[test]
    fn sel_label_moves_axis_to_scope() {
        let table = quick_table()
            .sel(&[("year", Selector::Label(String::from("2020")))])
            .unwrap();
        assert_eq!(table.headerkeys(), vec!["age"]);
        assert_eq!(table.scope()["year"], "2020");
        // the 10-19 cell is missing in 2020 and is dropped
        assert_eq!(table.header("age").unwrap(), labels(&["20-29", "0-9"]));
    }

    #[test]
    fn sel_range_compares_values() {
        let table = quick_table()
            .sel(&[(
                "age",
                Selector::Range {
                    start: Some(String::from("5-14")),
                    stop: None,
                },
            )])
            .unwrap();
        assert_eq!(table.header("age").unwrap(), labels(&["20-29", "10-19"]));
    }

    #[test]
    fn sel_index_and_labels() {
        let table = quick_table()
            .sel(&[
                ("age", Selector::Labels(labels(&["0-9", "20-29"]))),
                ("year", Selector::Index(0)),
            ])
            .unwrap();
        assert_eq!(table.header("age").unwrap(), labels(&["0-9", "20-29"]));
        assert_eq!(table.scope()["year"], "2021");
        assert_eq!(table.arrays()["population"], array![1.0, 5.0].into_dyn());
    }

    #[test]
    fn transpose_moves_axes_to_front() {
        let table = quick_table().transpose(&["year"]).unwrap();
        assert_eq!(table.headerkeys(), vec!["year", "age"]);
        assert_eq!(table.shape(), vec![2, 3]);
        assert!(quick_table().transpose(&["country"]).is_err());
    }

    #[test]
    fn expand_and_squeeze() {
        let table = quick_table().expand("country").unwrap();
        assert_eq!(table.headerkeys(), vec!["country", "age", "year"]);
        let table = table.squeeze(&["country"]).unwrap();
        assert_eq!(table, quick_table());
        // already scope
        assert!(quick_table().squeeze(&["country"]).is_ok());
        assert!(quick_table().squeeze(&["age"]).is_err());
    }

    #[test]
    fn removescope_drops_variable() {
        let table = quick_table().removescope(&["country"]).unwrap();
        assert!(table.scopekeys().is_empty());
        assert!(!table.variables().contains_key("country"));
    }

    #[test]
    fn retag_renames_data_and_variable() {
        let table = quick_table().retag(&[("population", "pop")]).unwrap();
        assert_eq!(table.datakeys(), vec!["pop"]);
        assert_eq!(table.variables()["pop"].vartype, VarType::integer());
        assert!(quick_table().retag(&[("population", "age")]).is_err());
    }

    #[test]
    fn multiply_by_one_is_identity() {
        let table = quick_table();
        assert_eq!(table.multiply(1.0).unwrap(), table);
    }

    #[test]
    fn divide_rescales_data_and_variable() {
        let table = (&quick_table() / 2.0).unwrap();
        assert_relative_eq!(table.arrays()["population"][[1, 1]], 1.0);
        assert_eq!(
            table.variables()["population"].vartype,
            VarType::Number {
                unit: None,
                precision: None,
                scale: 0.5
            }
        );
        assert!(quick_table().divide(0.0).is_err());
    }

    #[test]
    fn multiply_operator() {
        let table = (&quick_table() * 3.0).unwrap();
        assert_relative_eq!(table.arrays()["population"][[0, 0]], 15.0);
    }

    #[test]
    fn dropna_removes_empty_labels() {
        let table = quick_table()
            .sel(&[("age", Selector::Labels(labels(&["10-19"])))])
            .unwrap();
        assert_eq!(table.header("year").unwrap(), labels(&["2021"]));
    }

    #[test]
    fn flatten_orders_columns_and_skips_missing() {
        let flat = quick_table().flatten().unwrap();
        assert_eq!(flat.keys(), vec!["age", "year", "country", "population"]);
        assert_eq!(flat.shape(), (5, 4));
        assert_eq!(
            flat.labels("population").unwrap(),
            vec!["5", "6", "1", "2", "3"]
        );
        assert_eq!(flat.labels("country").unwrap(), vec!["x"; 5]);
    }

    #[test]
    fn flatten_widens_fractional_integers() {
        let flat = quick_table().divide(2.0).unwrap().flatten().unwrap();
        assert_eq!(flat.labels("population").unwrap()[0], "2.5");
    }

    #[test]
    fn layer_by_name_and_position() {
        let table = quick_table();
        assert_eq!(table.layer("population").unwrap(), table);
        assert_eq!(table.layer_at(0).unwrap(), table);
        assert!(table.layer("nope").is_err());
        assert!(table.layer_at(1).is_err());
    }

    #[test]
    fn axis_values_project_ranges() {
        let table = quick_table();
        assert_eq!(table.axis_values("age").unwrap(), vec![24.5, 4.5, 14.5]);
    }
}
