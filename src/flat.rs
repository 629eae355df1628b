//! Row-oriented tables of labels
use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use labtab_data::Dataset;
use labtab_utils::{is_missing_label, unique_in_order};
use labtab_variables::infer::series_to_opt_strings;
use labtab_variables::{Value, VarType, Variable, Variables};
use log::debug;
use ndarray::{ArrayD, IxDyn};
use polars::prelude::{DataFrame, NamedFrom, Series};

use crate::array::ArrayTable;
use crate::error::TableError;

/// A flat table of label strings.
///
/// Every column is stored as a string column. Columns that have a variable
/// hold the canonical labels of that variable; other columns are kept
/// verbatim. Missing cells are empty strings.
#[derive(Debug, Clone)]
pub struct FlatTable {
    name: String,
    data: DataFrame,
    variables: Variables,
}

/// Parse a label with the variable if there is one. Without a variable,
/// numeric labels become numbers and anything else is text.
pub(crate) fn parse_label(
    variable: Option<&Variable>,
    label: &str,
) -> Result<Value, TableError> {
    match variable {
        Some(var) => Ok(var.parse(label)?),
        None if is_missing_label(label) => Ok(Value::Missing),
        None => Ok(label
            .trim()
            .parse::<f64>()
            .map_or_else(|_| Value::from(label), Value::Number)),
    }
}

fn series_labels(srs: &Series) -> Result<Vec<String>, TableError> {
    Ok(series_to_opt_strings(srs)?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

impl PartialEq for FlatTable {
    fn eq(&self, other: &Self) -> bool {
        self.keys() == other.keys()
            && self.variables == other.variables
            && self.keys().iter().all(|key| {
                match (self.labels(key), other.labels(key)) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                }
            })
    }
}

impl FlatTable {
    /// Create a flat table.
    ///
    /// Every column is converted to labels. Columns with a variable are
    /// normalized through it, so a label the variable cannot parse is an
    /// error. Variables without a matching column are dropped.
    pub fn new<S: Into<String>>(
        name: S,
        data: &DataFrame,
        variables: &Variables,
    ) -> Result<Self, TableError> {
        let columns = data
            .get_columns()
            .iter()
            .map(|srs| -> Result<Series, TableError> {
                let labels = series_labels(srs)?;
                let labels = match variables.get(srs.name()) {
                    Some(var) => labels
                        .iter()
                        .map(|label| var.normalize(label))
                        .collect::<Result<Vec<String>, _>>()?,
                    None => labels,
                };
                Ok(Series::new(srs.name(), labels))
            })
            .collect::<Result<Vec<Series>, TableError>>()?;

        let data = DataFrame::new(columns)?;
        let mut variables = variables.clone();
        let names = data.get_column_names();
        variables.retain(|var| names.contains(&var.name.as_str()));

        Ok(FlatTable {
            name: name.into(),
            data,
            variables,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the same table under a new name
    pub fn rename<S: Into<String>>(&self, name: S) -> Self {
        FlatTable {
            name: name.into(),
            data: self.data.clone(),
            variables: self.variables.clone(),
        }
    }

    /// The underlying frame of string columns
    pub fn dataframe(&self) -> &DataFrame {
        &self.data
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// The column names in order
    pub fn keys(&self) -> Vec<&str> {
        self.data.get_column_names()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys().contains(&key)
    }

    /// A flat table always holds one layer of data
    pub fn layers(&self) -> usize {
        1
    }

    /// A flat table is always two dimensional: rows and columns
    pub fn dims(&self) -> usize {
        2
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.data.shape()
    }

    /// The labels of a column
    pub fn labels(&self, key: &str) -> Result<Vec<String>, TableError> {
        let srs = self
            .data
            .column(key)
            .map_err(|_| TableError::KeyNotFound(String::from(key)))?;
        Ok(srs
            .str()?
            .into_iter()
            .map(|label| String::from(label.unwrap_or_default()))
            .collect())
    }

    fn with_columns(&self, columns: Vec<Series>) -> Result<Self, TableError> {
        let data = DataFrame::new(columns)?;
        let mut variables = self.variables.clone();
        let names = data.get_column_names();
        variables.retain(|var| names.contains(&var.name.as_str()));
        Ok(FlatTable {
            name: self.name.clone(),
            data,
            variables,
        })
    }

    /// Keep only `keys`, in the given order
    pub fn select<S: AsRef<str>>(&self, keys: &[S]) -> Result<Self, TableError> {
        let columns = keys
            .iter()
            .map(|key| {
                let key = key.as_ref();
                self.data
                    .column(key)
                    .cloned()
                    .map_err(|_| TableError::KeyNotFound(String::from(key)))
            })
            .collect::<Result<Vec<Series>, TableError>>()?;
        self.with_columns(columns)
    }

    /// Remove `keys`
    pub fn drop<S: AsRef<str>>(&self, keys: &[S]) -> Result<Self, TableError> {
        if let Some(key) = keys.iter().find(|key| !self.contains_key(key.as_ref())) {
            return Err(TableError::KeyNotFound(String::from(key.as_ref())));
        }
        let kept: Vec<&str> = self
            .keys()
            .into_iter()
            .filter(|key| !keys.iter().any(|k| k.as_ref() == *key))
            .collect();
        self.select(&kept)
    }

    /// Rename columns and their variables, given `(old, new)` pairs
    pub fn retag<S: AsRef<str>>(&self, tags: &[(S, S)]) -> Result<Self, TableError> {
        let mut variables = self.variables.clone();
        let mut names: Vec<String> =
            self.keys().into_iter().map(String::from).collect();
        for (old, new) in tags {
            let (old, new) = (old.as_ref(), new.as_ref());
            let ix = names
                .iter()
                .position(|name| name == old)
                .ok_or_else(|| TableError::KeyNotFound(String::from(old)))?;
            if old != new && names.iter().any(|name| name == new) {
                return Err(TableError::KeyOverlap(String::from(new)));
            }
            names[ix] = String::from(new);
            if variables.contains_key(old) {
                variables.rename(old, new)?;
            }
        }

        let columns = self
            .data
            .get_columns()
            .iter()
            .zip(names.iter())
            .map(|(srs, name)| {
                let mut srs = srs.clone();
                srs.rename(name);
                srs
            })
            .collect();
        Ok(FlatTable {
            name: self.name.clone(),
            data: DataFrame::new(columns)?,
            variables,
        })
    }

    /// Create or replace the column `variable.name` from existing columns.
    ///
    /// The labels of `axes` are parsed by their variables, passed to `f` one
    /// row at a time, and the result is formatted by `variable`.
    ///
    /// # Example
    ///
    /// ```
    /// # use labtab::FlatTable;
    /// # use labtab_variables::{Value, Variable, Variables};
    /// # use polars::prelude::*;
    /// let df = DataFrame::new(vec![
    ///     Series::new("lower", vec!["1", "4"]),
    ///     Series::new("upper", vec!["3", "8"]),
    /// ]).unwrap();
    /// let variables = Variables::new(vec![
    ///     Variable::integer("lower"),
    ///     Variable::integer("upper"),
    /// ]).unwrap();
    /// let table = FlatTable::new("bounds", &df, &variables).unwrap();
    ///
    /// let width = table.derive(Variable::integer("width"), &["lower", "upper"], |values| {
    ///     match (values[0].to_f64_opt(), values[1].to_f64_opt()) {
    ///         (Some(lo), Some(hi)) => Value::Number(hi - lo),
    ///         _ => Value::Missing,
    ///     }
    /// }).unwrap();
    ///
    /// assert_eq!(width.labels("width").unwrap(), vec!["2", "4"]);
    /// ```
    pub fn derive<S, F>(
        &self,
        variable: Variable,
        axes: &[S],
        f: F,
    ) -> Result<Self, TableError>
    where
        S: AsRef<str>,
        F: Fn(&[Value]) -> Value,
    {
        if axes.is_empty() {
            return Err(TableError::InvalidArgument(format!(
                "`{}` must be derived from at least one column",
                variable.name
            )));
        }
        let columns: Vec<Vec<Value>> = axes
            .iter()
            .map(|key| {
                let key = key.as_ref();
                let var = self.variables.get(key);
                self.labels(key)?
                    .iter()
                    .map(|label| parse_label(var, label))
                    .collect::<Result<Vec<Value>, TableError>>()
            })
            .collect::<Result<_, _>>()?;

        let labels = (0..self.data.height())
            .map(|row| {
                let values: Vec<Value> =
                    columns.iter().map(|col| col[row].clone()).collect();
                variable.format(&f(&values))
            })
            .collect::<Result<Vec<String>, _>>()?;

        let mut data = self.data.clone();
        data.with_column(Series::new(variable.name.as_str(), labels))?;
        let mut variables = self.variables.clone();
        variables.insert(variable);
        Ok(FlatTable {
            name: self.name.clone(),
            data,
            variables,
        })
    }

    /// The numeric projection of one column. Missing cells are `NaN`.
    pub fn to_series(&self, key: &str) -> Result<Vec<f64>, TableError> {
        let var = self.variables.get(key);
        self.labels(key)?
            .iter()
            .map(|label| match parse_label(var, label)? {
                Value::Missing => Ok(f64::NAN),
                value => value.to_f64_opt().ok_or_else(|| {
                    TableError::NonNumericData {
                        column: String::from(key),
                        label: label.clone(),
                    }
                }),
            })
            .collect()
    }

    /// The numeric projection of several columns
    pub fn to_values<S: AsRef<str>>(
        &self,
        keys: &[S],
    ) -> Result<Vec<Vec<f64>>, TableError> {
        keys.iter().map(|key| self.to_series(key.as_ref())).collect()
    }

    /// Pivot into an N-dimensional table.
    ///
    /// Data columns become layers, header columns become dims (labels in
    /// order of first appearance), and scope columns, which must be constant,
    /// become scalar coordinates. Other columns are dropped. Header
    /// combinations that do not appear are missing.
    pub fn unflatten<S: AsRef<str>>(
        &self,
        datakeys: &[S],
        headerkeys: &[S],
        scopekeys: &[S],
    ) -> Result<ArrayTable, TableError> {
        let as_strs =
            |keys: &[S]| keys.iter().map(|k| String::from(k.as_ref())).collect::<Vec<_>>();
        let (datakeys, headerkeys, scopekeys) =
            (as_strs(datakeys), as_strs(headerkeys), as_strs(scopekeys));

        let mut seen: HashSet<&str> = HashSet::new();
        for key in datakeys.iter().chain(&headerkeys).chain(&scopekeys) {
            if !self.contains_key(key) {
                return Err(TableError::KeyNotFound(key.clone()));
            }
            if !seen.insert(key.as_str()) {
                return Err(TableError::KeyOverlap(key.clone()));
            }
        }
        for key in self.keys().iter().filter(|key| !seen.contains(*key)) {
            debug!("unflattening `{}` drops column `{}`", self.name, key);
        }

        for key in datakeys.iter() {
            if let Some(var) = self.variables.get(key) {
                let numeric = var.is_numeric()
                    || matches!(var.vartype, VarType::Range { .. });
                if !numeric {
                    return Err(TableError::NonNumericData {
                        column: key.clone(),
                        label: String::from(var.vartype.kind()),
                    });
                }
            }
        }

        let nrows = self.data.height();
        if headerkeys.is_empty() && nrows != 1 {
            return Err(TableError::NotSingleRow(nrows));
        }

        let mut scope: IndexMap<String, String> = IndexMap::new();
        for key in scopekeys.iter() {
            let labels = unique_in_order(self.labels(key)?);
            match labels.as_slice() {
                [label] => {
                    scope.insert(key.clone(), label.clone());
                }
                _ => {
                    return Err(TableError::NonConstantScope {
                        column: key.clone(),
                        labels,
                    })
                }
            }
        }

        let header_labels: Vec<Vec<String>> = headerkeys
            .iter()
            .map(|key| self.labels(key))
            .collect::<Result<_, _>>()?;
        let mut dims: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut lookups: Vec<HashMap<String, usize>> = Vec::new();
        for (key, labels) in headerkeys.iter().zip(header_labels.iter()) {
            let unique = unique_in_order(labels.iter().cloned());
            lookups.push(
                unique
                    .iter()
                    .enumerate()
                    .map(|(ix, label)| (label.clone(), ix))
                    .collect(),
            );
            dims.insert(key.clone(), unique);
        }

        let shape: Vec<usize> = dims.values().map(Vec::len).collect();
        let values = self.to_values(&datakeys)?;
        let mut arrays: Vec<ArrayD<f64>> = datakeys
            .iter()
            .map(|_| ArrayD::from_elem(IxDyn(&shape), f64::NAN))
            .collect();

        let mut filled: HashSet<Vec<usize>> = HashSet::with_capacity(nrows);
        for row in 0..nrows {
            let index: Vec<usize> = header_labels
                .iter()
                .zip(lookups.iter())
                .map(|(labels, lookup)| lookup[&labels[row]])
                .collect();
            if !filled.insert(index.clone()) {
                return Err(TableError::NonUniquePivot(
                    header_labels.iter().map(|labels| labels[row].clone()).collect(),
                ));
            }
            for (arr, column) in arrays.iter_mut().zip(values.iter()) {
                arr[index.as_slice()] = column[row];
            }
        }

        let layers: IndexMap<String, ArrayD<f64>> =
            datakeys.iter().cloned().zip(arrays).collect();
        let dataset = Dataset::new(dims, layers, scope)?;
        ArrayTable::new(self.name.clone(), dataset, &self.variables)
    }
}
