//! Flat and labeled N-dimensional tables with typed variables.
//!
//! Tables come in two shapes. A [`FlatTable`] holds rows of labels, one
//! column per key. An [`ArrayTable`] holds one or more numeric layers over
//! labeled header axes, plus scope: keys with a single label for the whole
//! table. Every key has a [`Variable`] that parses and formats its labels.
//!
//! # Example
//!
//! Pivot population counts by age and year, then total them over age.
//!
//! ```
//! use labtab::{FlatTable, Reduction, Transformation};
//! use labtab_variables::{Variable, Variables};
//! use polars::prelude::{DataFrame, NamedFrom, Series};
//!
//! let df = DataFrame::new(vec![
//!     Series::new("age", &["0-9", "10-19", "0-9", "10-19"]),
//!     Series::new("year", &["2020", "2020", "2021", "2021"]),
//!     Series::new("country", &["x", "x", "x", "x"]),
//!     Series::new("population", &["10", "20", "11", "21"]),
//! ])
//! .unwrap();
//! let variables = Variables::new(vec![
//!     Variable::range("age"),
//!     Variable::integer("year"),
//!     Variable::integer("population"),
//! ])
//! .unwrap();
//!
//! let flat = FlatTable::new("population", &df, &variables).unwrap();
//! let table = flat
//!     .unflatten(&["population"], &["age", "year"], &["country"])
//!     .unwrap();
//! assert_eq!(table.shape(), vec![2, 2]);
//! assert_eq!(table.scope()["country"], "x");
//!
//! let total = table
//!     .transform("age", &Transformation::Reduce { reduction: Reduction::Sum }, None)
//!     .unwrap();
//! let total = total.flatten().unwrap();
//!
//! assert_eq!(total.labels("population").unwrap(), vec!["30", "32"]);
//! ```
#![warn(unused_extern_crates)]
#![warn(
    clippy::all,
    clippy::imprecise_flops,
    clippy::suboptimal_flops,
    clippy::unseparated_literal_suffix,
    clippy::unreadable_literal,
    clippy::option_option,
    clippy::implicit_clone
)]

pub mod alignment;
mod array;
pub mod combinations;
mod concepts;
pub mod config;
mod error;
mod flat;
mod histograms;
mod io;
pub mod operations;
pub mod processors;
pub mod transformations;
mod view;

pub use alignment::{align, align_variables, Join};
pub use array::{ArrayTable, Selector};
pub use concepts::{Concept, Curve, Field};
pub use config::{deserialize_file, serialize_obj, SerializedType, TableConfig, TransformStep};
pub use error::{ProcessError, TableError};
pub use flat::FlatTable;
pub use histograms::{Histogram, HistogramTable};
pub use operations::{add, average, divide, multiply, subtract, OperationConfig};
pub use processors::{Calculation, CsvSource, Feed, FrameSource, Params, Pipeline, Query, TableSource};
pub use transformations::{interp1d, Direction, Fill, InterpKind, Reduction, Transformation};

pub use labtab_variables::{Method, Value, VarType, Variable, Variables};
