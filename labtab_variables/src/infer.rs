//! Guess default variables from data.
//!
//! Often the data has too many columns to write variables by hand, so these
//! functions guess a variable for every column of a dataframe. The user can
//! then edit the resulting YAML.
use crate::error::{InferenceError, ReadError};
use crate::variable::{DEFAULT_DATE_FORMAT, DEFAULT_RANGE_DELIMITER};
use crate::{CategoryMap, VarType, Variable, Variables};

use chrono::NaiveDate;
use labtab_utils::is_missing_label;
use polars::prelude::{CsvReader, DataFrame, DataType, SerReader, Series};
use std::collections::BTreeSet;
use std::path::Path;

/// String columns with at most this many distinct values become categories
pub const DEFAULT_CAT_CUTOFF: usize = 20;

/// Convert any supported series into optional label strings
pub fn series_to_opt_strings(
    srs: &Series,
) -> Result<Vec<Option<String>>, InferenceError> {
    macro_rules! sts_arm {
        ($srsi: ident, $method: ident) => {{
            $srsi
                .$method()?
                .into_iter()
                .map(|x_opt| x_opt.map(|x| format!("{}", x)))
                .collect::<Vec<Option<String>>>()
        }};
    }
    let strings = match srs.dtype() {
        DataType::Boolean => sts_arm!(srs, bool),
        DataType::UInt8 => sts_arm!(srs, u8),
        DataType::UInt16 => sts_arm!(srs, u16),
        DataType::UInt32 => sts_arm!(srs, u32),
        DataType::UInt64 => sts_arm!(srs, u64),
        DataType::Int8 => sts_arm!(srs, i8),
        DataType::Int16 => sts_arm!(srs, i16),
        DataType::Int32 => sts_arm!(srs, i32),
        DataType::Int64 => sts_arm!(srs, i64),
        DataType::Float32 => sts_arm!(srs, f32),
        DataType::Float64 => sts_arm!(srs, f64),
        DataType::String => sts_arm!(srs, str),
        DataType::Null => vec![None; srs.len()],
        dtype => {
            return Err(InferenceError::UnsupportedDataType {
                col_name: srs.name().to_owned(),
                dtype: dtype.clone(),
            })
        }
    };
    Ok(strings)
}

fn present_labels(srs: &Series) -> Result<Vec<String>, InferenceError> {
    Ok(series_to_opt_strings(srs)?
        .into_iter()
        .flatten()
        .filter(|label| !is_missing_label(label))
        .collect())
}

fn string_vartype(labels: &[String], cat_cutoff: usize) -> VarType {
    if labels.iter().all(|x| x.trim().parse::<i64>().is_ok()) {
        return VarType::integer();
    }
    if labels.iter().all(|x| x.trim().parse::<f64>().is_ok()) {
        return VarType::number();
    }
    if labels
        .iter()
        .all(|x| NaiveDate::parse_from_str(x.trim(), DEFAULT_DATE_FORMAT).is_ok())
    {
        return VarType::date();
    }
    let range = Variable::new("", VarType::range());
    if labels.iter().all(|x| range.parse(x).is_ok()) {
        return VarType::Range {
            unit: None,
            delimiter: String::from(DEFAULT_RANGE_DELIMITER),
            precision: None,
        };
    }

    let unique: BTreeSet<String> =
        labels.iter().map(|x| String::from(x.trim())).collect();
    if unique.len() <= cat_cutoff {
        VarType::Category {
            categories: CategoryMap::from(unique),
        }
    } else {
        VarType::Text
    }
}

/// Guess the variable for a single column
pub fn series_to_variable(
    srs: &Series,
    cat_cutoff: Option<usize>,
) -> Result<Variable, InferenceError> {
    let name = String::from(srs.name());
    if srs.null_count() == srs.len() {
        return Err(InferenceError::BlankColumn { col_name: name });
    }

    let vartype = match srs.dtype() {
        DataType::Boolean => VarType::Category {
            categories: CategoryMap::from(
                ["false", "true"]
                    .iter()
                    .map(|s| String::from(*s))
                    .collect::<BTreeSet<String>>(),
            ),
        },
        DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64 => VarType::integer(),
        DataType::Float32 | DataType::Float64 => VarType::number(),
        DataType::String => {
            let labels = present_labels(srs)?;
            if labels.is_empty() {
                return Err(InferenceError::BlankColumn { col_name: name });
            }
            string_vartype(&labels, cat_cutoff.unwrap_or(DEFAULT_CAT_CUTOFF))
        }
        dtype => {
            return Err(InferenceError::UnsupportedDataType {
                col_name: name,
                dtype: dtype.clone(),
            })
        }
    };

    Ok(Variable::new(name, vartype))
}

/// Guess a variable for every column of `df`
pub fn df_to_variables(
    df: &DataFrame,
    cat_cutoff: Option<usize>,
) -> Result<Variables, InferenceError> {
    let variables = df
        .get_columns()
        .iter()
        .map(|srs| series_to_variable(srs, cat_cutoff))
        .collect::<Result<Vec<Variable>, InferenceError>>()?;
    Ok(Variables::new(variables)?)
}

/// Read a CSV with a header row, inferring column dtypes
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame, ReadError> {
    let df = CsvReader::from_path(path.as_ref())?
        .infer_schema(Some(1000))
        .has_header(true)
        .finish()?;
    Ok(df)
}

/// Read a CSV with a header row, keeping every column as strings
pub fn read_csv_as_strings<P: AsRef<Path>>(
    path: P,
) -> Result<DataFrame, ReadError> {
    let df = CsvReader::from_path(path.as_ref())?
        .infer_schema(Some(0))
        .has_header(true)
        .finish()?;
    Ok(df)
}

pub fn variables_from_csv<P: AsRef<Path>>(
    path: P,
    cat_cutoff: Option<usize>,
) -> Result<Variables, InferenceError> {
    let df = read_csv(path)?;
    df_to_variables(&df, cat_cutoff)
}

impl Variables {
    /// Guess variables from a polars `DataFrame`
    ///
    /// # Arguments
    /// - df: the dataframe
    /// - cat_cutoff: the maximum number of distinct values a string column
    ///   may take before it is considered text instead of a category
    pub fn from_df(
        df: &DataFrame,
        cat_cutoff: Option<usize>,
    ) -> Result<Self, InferenceError> {
        df_to_variables(df, cat_cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_to_tempfile(s: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(s.as_bytes()).unwrap();
        file
    }

    #[test]
    fn variables_with_all_types_infers_correct_types_csv() {
        let data = "\
            age,sex,date,population,income,name
            0-9,male,2020-01-01,12,1.5,a
            10-19,female,2020-01-02,,2.5,b
            20+,male,2020-01-03,3,,c
            0-9,female,2020-01-04,4,0.1,d\
        "
        .replace(' ', "");

        let file = write_to_tempfile(&data);
        let vars = variables_from_csv(file.path(), Some(3)).unwrap();

        assert_eq!(vars.len(), 6);
        assert_eq!(vars["age"].vartype, VarType::range());
        assert!(matches!(vars["sex"].vartype, VarType::Category { .. }));
        assert_eq!(vars["date"].vartype, VarType::date());
        assert_eq!(vars["population"].vartype, VarType::integer());
        assert_eq!(vars["income"].vartype, VarType::number());
        assert_eq!(vars["name"].vartype, VarType::Text);
    }

    #[test]
    fn string_categories_are_sorted() {
        let srs = Series::new("a", vec!["dog", "cat", "bear", "fox"]);
        let var = series_to_variable(&srs, None).unwrap();
        match var.vartype {
            VarType::Category { categories } => {
                assert_eq!(categories.category(0), Some("bear"));
                assert_eq!(categories.category(1), Some("cat"));
                assert_eq!(categories.category(2), Some("dog"));
                assert_eq!(categories.category(3), Some("fox"));
            }
            _ => panic!("wrong vartype"),
        }
    }

    #[test]
    fn string_categories_skip_nulls() {
        let srs = Series::new("a", vec![Some("dog"), None, Some("cat")]);
        let var = series_to_variable(&srs, None).unwrap();
        match var.vartype {
            VarType::Category { categories } => assert_eq!(categories.len(), 2),
            _ => panic!("wrong vartype"),
        }
    }

    #[test]
    fn numeric_strings_are_numbers() {
        let srs = Series::new("a", vec!["1", "2", "3"]);
        let var = series_to_variable(&srs, None).unwrap();
        assert_eq!(var.vartype, VarType::integer());

        let srs = Series::new("a", vec!["1", "2.5", ""]);
        let var = series_to_variable(&srs, None).unwrap();
        assert_eq!(var.vartype, VarType::number());
    }

    #[test]
    fn many_distinct_strings_are_text() {
        let srs = Series::new(
            "a",
            (0..30).map(|x| format!("item{x}")).collect::<Vec<_>>(),
        );
        let var = series_to_variable(&srs, None).unwrap();
        assert_eq!(var.vartype, VarType::Text);
    }

    #[test]
    fn bool_data_is_category() {
        let srs = Series::new(
            "A",
            (0..10).map(|x| x % 2 == 1).collect::<Vec<bool>>(),
        );
        let var = series_to_variable(&srs, None).unwrap();
        let value = var.parse("true").unwrap();
        assert_eq!(value.to_f64_opt(), Some(1.0));
    }

    #[test]
    fn blank_column_errors() {
        let srs = Series::new("A", vec![None::<&str>, None]);
        match series_to_variable(&srs, None) {
            Err(InferenceError::BlankColumn { col_name }) => {
                assert_eq!(col_name, "A")
            }
            Err(err) => panic!("wrong error: {}", err),
            Ok(_) => panic!("should have failed"),
        }
    }

    #[test]
    fn series_to_opt_strings_formats_numbers() {
        let srs = Series::new("A", vec![Some(1_i64), None, Some(3)]);
        let strings = series_to_opt_strings(&srs).unwrap();
        assert_eq!(
            strings,
            vec![Some(String::from("1")), None, Some(String::from("3"))]
        );
    }
}
