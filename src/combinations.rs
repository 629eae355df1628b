//! Combine several tables into one
use std::collections::HashSet;

use indexmap::IndexMap;
use labtab_data::Dataset;
use labtab_variables::{Variables, VariablesError};
use log::debug;

use crate::alignment::{align_variables, join_labels, Join};
use crate::array::ArrayTable;
use crate::error::TableError;
use crate::operations::{prepare, single_datakey};

fn noncore_keys<S: AsRef<str>>(noncore: &[S]) -> Vec<String> {
    noncore.iter().map(|k| String::from(k.as_ref())).collect()
}

/// Union of the variables of every table
fn union_variables(tables: &[ArrayTable]) -> Result<Variables, TableError> {
    tables
        .iter()
        .try_fold(Variables::default(), |acc, table| {
            align_variables(&acc, table.variables())
        })
}

/// Outer join the labels of every header axis except `skip` across the
/// datasets, then reindex every dataset that has the axis.
fn outer_align(datasets: Vec<Dataset>, skip: Option<&str>) -> Result<Vec<Dataset>, TableError> {
    let mut labels: IndexMap<String, Vec<String>> = IndexMap::new();
    for ds in datasets.iter() {
        for (axis, axis_labels) in ds.dims().iter() {
            if Some(axis.as_str()) == skip {
                continue;
            }
            let joined = match labels.get(axis) {
                Some(existing) => join_labels(existing, axis_labels, Join::Outer, axis)?,
                None => axis_labels.clone(),
            };
            labels.insert(axis.clone(), joined);
        }
    }
    datasets
        .into_iter()
        .map(|ds| {
            labels.iter().try_fold(ds, |ds, (axis, joined)| {
                if ds.labels(axis).map_or(true, |own| own == joined.as_slice()) {
                    Ok(ds)
                } else {
                    ds.reindex(axis, joined).map_err(TableError::from)
                }
            })
        })
        .collect()
}

/// Combine tables with distinct layers into one multi-layer table.
///
/// The header axes of the result are the union of every table's axes, in
/// order of first appearance. Shared axes have their labels outer joined,
/// and each layer is repeated along the axes its table lacks. A scope key
/// that is a header axis of another table is expanded first. The `noncore`
/// axes are squeezed and removed from scope before anything else. The result
/// takes the name of the first table.
pub fn layer<S: AsRef<str>>(
    tables: &[ArrayTable],
    noncore: &[S],
) -> Result<ArrayTable, TableError> {
    let first = tables.first().ok_or(TableError::Empty)?;
    let noncore = noncore_keys(noncore);
    let tables = tables
        .iter()
        .map(|table| prepare(table, &[], &noncore))
        .collect::<Result<Vec<_>, _>>()?;

    let dimkeys: HashSet<String> = tables
        .iter()
        .flat_map(|table| table.dimkeys())
        .map(String::from)
        .collect();
    let tables = tables
        .into_iter()
        .map(|table| {
            let scoped: Vec<String> = table
                .scopekeys()
                .into_iter()
                .filter(|key| dimkeys.contains(*key))
                .map(String::from)
                .collect();
            scoped.iter().try_fold(table, |table, key| table.expand(key))
        })
        .collect::<Result<Vec<_>, TableError>>()?;

    let mut datakeys: HashSet<&str> = HashSet::new();
    for table in tables.iter() {
        for datakey in table.datakeys() {
            if !datakeys.insert(datakey) {
                return Err(TableError::DuplicateDatakey(String::from(datakey)));
            }
        }
    }
    for table in tables.iter() {
        if let Some(axis) = table.axeskeys().into_iter().find(|k| datakeys.contains(k)) {
            return Err(TableError::KeyOverlap(String::from(axis)));
        }
    }

    let variables = union_variables(&tables)?;
    let datasets = outer_align(
        tables.iter().map(|t| t.dataset().clone()).collect(),
        None,
    )?;
    let mut dims: IndexMap<String, Vec<String>> = IndexMap::new();
    for ds in datasets.iter() {
        for (dim, labels) in ds.dims().iter() {
            dims.entry(dim.clone()).or_insert_with(|| labels.clone());
        }
    }
    let datasets = datasets
        .iter()
        .map(|ds| ds.broadcast(&dims))
        .collect::<Result<Vec<_>, _>>()?;
    let merged = labtab_data::merge(&datasets)?;
    debug!(
        "layered {} tables into {:?}",
        tables.len(),
        merged.layer_names()
    );
    ArrayTable::new(first.name(), merged, &variables)?.sortall(true)
}

/// Concatenate single-layer tables along `axis`.
///
/// Every table must have the same datakey and data variable. A scope `axis`
/// is expanded into a header axis first. The labels of the other header
/// axes are outer joined and sorted; the labels along `axis` keep the order
/// of the tables and must not repeat.
pub fn concat<S: AsRef<str>>(
    tables: &[ArrayTable],
    axis: &str,
    noncore: &[S],
) -> Result<ArrayTable, TableError> {
    let first = tables.first().ok_or(TableError::Empty)?;
    let noncore = noncore_keys(noncore);
    let tables = tables
        .iter()
        .map(|table| {
            let table = prepare(table, &[], &noncore)?;
            if table.scopekeys().contains(&axis) {
                table.expand(axis)
            } else {
                Ok(table)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let datakey = single_datakey(&tables[0])?;
    let data_var = tables[0].variables().try_get(&datakey)?;
    for table in tables.iter().skip(1) {
        let other = single_datakey(table)?;
        if other != datakey {
            return Err(TableError::DatakeyMismatch {
                left: datakey,
                right: other,
            });
        }
        if table.variables().try_get(&other)? != data_var {
            return Err(VariablesError::Conflict(other).into());
        }
    }
    if let Some(table) = tables.iter().find(|t| !t.dimkeys().contains(&axis)) {
        return Err(TableError::KeyNotFound(format!(
            "{axis} in table {}",
            table.name()
        )));
    }

    let variables = union_variables(&tables)?;
    let datasets = outer_align(
        tables.iter().map(|t| t.dataset().clone()).collect(),
        Some(axis),
    )?;
    let dataset = labtab_data::concat(&datasets, axis)?;
    let table = ArrayTable::new(first.name(), dataset, &variables)?;
    table
        .dimkeys()
        .into_iter()
        .filter(|key| *key != axis)
        .try_fold(table.clone(), |acc, key| acc.sort(key, true))
}
