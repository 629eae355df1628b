//! Named bundles of histograms and curves built from tables
use indexmap::IndexMap;
use labtab_variables::Variables;
use serde::{Deserialize, Serialize};

use crate::alignment::align_variables;
use crate::array::ArrayTable;
use crate::error::TableError;
use crate::histograms::Histogram;
use crate::operations::single_datakey;
use crate::transformations::{interp1d, Fill, InterpKind};

/// A function sampled at the numeric values of a header axis
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Curve {
    pub name: String,
    pub axisname: String,
    pub dataname: String,
    /// Sample points, ascending
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(default)]
    pub scope: IndexMap<String, String>,
    #[serde(default)]
    pub kind: InterpKind,
    #[serde(default)]
    pub fill: Fill,
}

impl Curve {
    /// Sample a single-layer one-dimensional table. Missing values are
    /// skipped.
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
        let xs = table.axis_values(&axisname)?;
        let mut points: Vec<(f64, f64)> = xs
            .into_iter()
            .zip(table.arrays()[datakey.as_str()].iter().copied())
            .filter(|(_, y)| !y.is_nan())
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (x, y) = points.into_iter().unzip();
        Ok(Curve {
            name: String::from(table.name()),
            axisname,
            dataname: datakey,
            x,
            y,
            scope: table.scope().clone(),
            kind: InterpKind::Linear,
            fill: Fill::Missing,
        })
    }

    pub fn with_interpolation(mut self, kind: InterpKind, fill: Fill) -> Self {
        self.kind = kind;
        self.fill = fill;
        self
    }

    /// The interpolated value at `x`
    pub fn at(&self, x: f64) -> f64 {
        interp1d(&self.x, &self.y, x, self.kind, self.fill)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// A field of a concept
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Histogram(&'a Histogram),
    Curve(&'a Curve),
}

/// A named bundle of histogram and curve fields.
///
/// # Example
///
/// ```
/// # use indexmap::IndexMap;
/// # use labtab::{ArrayTable, Concept};
/// # use labtab_data::Dataset;
/// # use labtab_variables::{Variable, Variables};
/// # use ndarray::array;
/// let mut dims = IndexMap::new();
/// dims.insert(String::from("age"), vec![String::from("0-9"), String::from("10-19")]);
/// let mut layers = IndexMap::new();
/// layers.insert(String::from("population"), array![10.0, 30.0].into_dyn());
/// let dataset = Dataset::new(dims, layers, IndexMap::new()).unwrap();
/// let variables = Variables::new(vec![Variable::range("age")]).unwrap();
/// let table = ArrayTable::new("population", dataset, &variables).unwrap();
///
/// let concept = Concept::new("demographics")
///     .with_histogram("ages", &table)
///     .unwrap();
///
/// assert_eq!(concept.fields(), vec!["ages"]);
/// assert_eq!(concept.histogram("ages").unwrap().mean(), 12.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Concept {
    pub name: String,
    histograms: IndexMap<String, Histogram>,
    curves: IndexMap<String, Curve>,
    variables: Variables,
}

impl Concept {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Concept {
            name: name.into(),
            ..Default::default()
        }
    }

    fn check_field(&self, field: &str) -> Result<(), TableError> {
        if self.histograms.contains_key(field) || self.curves.contains_key(field) {
            Err(TableError::KeyOverlap(String::from(field)))
        } else {
            Ok(())
        }
    }

    /// Add the histogram of `table` as `field`
    pub fn with_histogram<S: Into<String>>(
        mut self,
        field: S,
        table: &ArrayTable,
    ) -> Result<Self, TableError> {
        let field = field.into();
        self.check_field(&field)?;
        let histogram = table.to_histogram()?.rename(field.clone());
        self.variables = align_variables(&self.variables, table.variables())?;
        self.histograms.insert(field, histogram);
        Ok(self)
    }

    /// Add the curve of `table` as `field`
    pub fn with_curve<S: Into<String>>(
        mut self,
        field: S,
        table: &ArrayTable,
    ) -> Result<Self, TableError> {
        let field = field.into();
        self.check_field(&field)?;
        let mut curve = Curve::from_table(table)?;
        curve.name = field.clone();
        self.variables = align_variables(&self.variables, table.variables())?;
        self.curves.insert(field, curve);
        Ok(self)
    }

    /// Histogram fields then curve fields
    pub fn fields(&self) -> Vec<&str> {
        self.histograms
            .keys()
            .chain(self.curves.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn histograms(&self) -> &IndexMap<String, Histogram> {
        &self.histograms
    }

    pub fn curves(&self) -> &IndexMap<String, Curve> {
        &self.curves
    }

    /// The union of the variables of every table in the concept
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn histogram(&self, field: &str) -> Option<&Histogram> {
        self.histograms.get(field)
    }

    pub fn curve(&self, field: &str) -> Option<&Curve> {
        self.curves.get(field)
    }

    pub fn get(&self, field: &str) -> Option<Field<'_>> {
        self.histogram(field)
            .map(Field::Histogram)
            .or_else(|| self.curve(field).map(Field::Curve))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use labtab_data::Dataset;
    use labtab_variables::{VarType, Variable};
    use ndarray::{array, ArrayD};

    fn table(name: &str, axis: (&str, &[&str]), datakey: &str, data: ArrayD<f64>) -> ArrayTable {
        let mut dims = IndexMap::new();
        dims.insert(
            String::from(axis.0),
            axis.1.iter().map(|s| String::from(*s)).collect(),
        );
        let mut layers = IndexMap::new();
        layers.insert(String::from(datakey), data);
        let dataset = Dataset::new(dims, layers, IndexMap::new()).unwrap();
        let variables = Variables::new(vec![
            Variable::range("income"),
            Variable::integer("year"),
            Variable::new(
                "rate",
                VarType::Number {
                    unit: Some(String::from("%")),
                    precision: None,
                    scale: 1.0,
                },
            ),
        ])
        .unwrap();
        ArrayTable::new(name, dataset, &variables).unwrap()
    }

    fn rates() -> ArrayTable {
        table(
            "rates",
            ("year", &["2022", "2020", "2021"]),
            "rate",
            array![4.0, 2.0, f64::NAN].into_dyn(),
        )
    }

    #[test]
    fn curve_interpolates_sorted_samples() {
        let curve = Curve::from_table(&rates()).unwrap();
        assert_eq!(curve.x, vec![2020.0, 2022.0]);
        assert_eq!(curve.len(), 2);
        assert_relative_eq!(curve.at(2021.0), 3.0);
        assert!(curve.at(2030.0).is_nan());
        let curve = curve.with_interpolation(InterpKind::Previous, Fill::Extrapolate);
        assert_relative_eq!(curve.at(2021.5), 2.0);
        assert_relative_eq!(curve.at(2030.0), 4.0);
    }

    #[test]
    fn concept_collects_fields_and_variables() {
        let incomes = table(
            "incomes",
            ("income", &["0-10", "10-20"]),
            "households",
            array![1.0, 1.0].into_dyn(),
        );
        let concept = Concept::new("economy")
            .with_histogram("income", &incomes)
            .unwrap()
            .with_curve("rate", &rates())
            .unwrap();
        assert_eq!(concept.fields(), vec!["income", "rate"]);
        assert_eq!(concept.histograms().len(), 1);
        assert_eq!(concept.curves().len(), 1);
        assert!(matches!(concept.get("income"), Some(Field::Histogram(_))));
        assert!(matches!(concept.get("rate"), Some(Field::Curve(_))));
        assert!(concept.get("age").is_none());
        let names = concept.variables().names();
        for key in ["income", "households", "year", "rate"] {
            assert!(names.contains(&key));
        }
        assert_relative_eq!(concept.histogram("income").unwrap().mean(), 10.0);
    }

    #[test]
    fn repeated_field_fails() {
        let result = Concept::new("c")
            .with_curve("rate", &rates())
            .unwrap()
            .with_curve("rate", &rates());
        assert!(matches!(result, Err(TableError::KeyOverlap(_))));
    }
}
