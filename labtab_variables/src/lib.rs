//! Variables associate a column (or axis) name with rules for turning label
//! strings into typed values and back. Every label and value that passes
//! through a table is formatted by its variable, which makes the string
//! representation canonical.
//!
//! Variables are usually written as YAML, one entry per column.
//!
//! # Example
//!
//! ```
//! # use labtab_variables::{Value, Variables};
//! use indoc::indoc;
//!
//! let yaml = indoc!("
//!     ---
//!     - name: age
//!       vartype: !range
//!         delimiter: '-'
//!     - name: sex
//!       vartype: !category
//!         categories:
//!           - male
//!           - female
//!     - name: population
//!       vartype: !integer
//!         unit: people
//!       notes: persons counted in the census
//!     ");
//!
//! let variables: Variables = serde_yaml::from_str(yaml).unwrap();
//!
//! assert_eq!(variables.len(), 3);
//!
//! let age = variables.get("age").unwrap();
//! assert_eq!(
//!     age.parse("10-20").unwrap(),
//!     Value::Range { lower: Some(10.0), upper: Some(20.0) },
//! );
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

mod category_map;
mod error;
pub mod infer;
mod value;
mod variable;
mod variables;

pub use category_map::CategoryMap;
pub use error::*;
pub use value::Value;
pub use variable::{How, Method, VarType, Variable};
pub use variables::Variables;
