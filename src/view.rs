//! Plain text display of tables
use std::fmt;

use itertools::Itertools;
use labtab_variables::{VarType, Variable, Variables};

use crate::array::ArrayTable;
use crate::flat::FlatTable;
use crate::histograms::{Histogram, HistogramTable};

/// Rows shown before the display is cut short
const MAX_ROWS: usize = 20;

fn describe_variable(var: &Variable) -> String {
    let kind = var.vartype.kind();
    match &var.vartype {
        VarType::Category { categories } => {
            format!("{}: {kind} [{}]", var.name, categories.iter().join(", "))
        }
        vartype => match vartype.unit() {
            Some(unit) => format!("{}: {kind} ({unit})", var.name),
            None => format!("{}: {kind}", var.name),
        },
    }
}

fn write_variables(f: &mut fmt::Formatter<'_>, variables: &Variables) -> fmt::Result {
    writeln!(f, "Variables:")?;
    for var in variables.iter() {
        writeln!(f, "  {}", describe_variable(var))?;
    }
    Ok(())
}

fn write_rows(f: &mut fmt::Formatter<'_>, keys: &[&str], columns: &[Vec<String>]) -> fmt::Result {
    writeln!(f, "{}", keys.join(","))?;
    let nrows = columns.first().map_or(0, Vec::len);
    for row in 0..nrows.min(MAX_ROWS) {
        writeln!(f, "{}", columns.iter().map(|col| &col[row]).join(","))?;
    }
    if nrows > MAX_ROWS {
        writeln!(f, "... {} more rows", nrows - MAX_ROWS)?;
    }
    Ok(())
}

impl FlatTable {
    /// A one-line summary of the table's structure
    pub fn structure(&self) -> String {
        let (rows, cols) = self.shape();
        format!("FlatTable `{}`: {rows} rows x {cols} columns", self.name())
    }
}

impl fmt::Display for FlatTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.structure())?;
        let keys = self.keys();
        let columns: Vec<Vec<String>> = keys
            .iter()
            .map(|key| self.labels(key).unwrap_or_default())
            .collect();
        write_rows(f, &keys, &columns)?;
        write_variables(f, self.variables())
    }
}

impl ArrayTable {
    /// A one-line summary of the table's structure
    pub fn structure(&self) -> String {
        let headers = self
            .headers()
            .iter()
            .map(|(key, labels)| format!("{key}={}", labels.len()))
            .join(", ");
        format!(
            "ArrayTable `{}`: layers [{}], headers [{headers}], scope [{}]",
            self.name(),
            self.datakeys().join(", "),
            self.scopekeys().join(", ")
        )
    }
}

impl fmt::Display for ArrayTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.structure())?;
        for (key, labels) in self.headers().iter() {
            writeln!(f, "  {key}: {}", labels.join(", "))?;
        }
        for (key, label) in self.scope().iter() {
            writeln!(f, "  {key} = {label}")?;
        }
        match self.flatten() {
            Ok(flat) => {
                let keys = flat.keys();
                let columns: Vec<Vec<String>> = keys
                    .iter()
                    .map(|key| flat.labels(key).unwrap_or_default())
                    .collect();
                write_rows(f, &keys, &columns)?;
            }
            Err(err) => writeln!(f, "<data cannot be displayed: {err}>")?,
        }
        write_variables(f, self.variables())
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Histogram `{}`", self.name)?;
        writeln!(f, "  {} = {}", self.axisname, self.axis.join(", "))?;
        writeln!(f, "  {} = {}", self.dataname, self.data.iter().join(", "))?;
        for (key, label) in self.scope.iter() {
            writeln!(f, "  {key} = {label}")?;
        }
        Ok(())
    }
}

impl fmt::Display for HistogramTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "HistogramTable `{}`", self.name)?;
        for histogram in self.histograms.values() {
            write!(f, "{histogram}")?;
        }
        Ok(())
    }
}
