use crate::error::VariableError;
use crate::{CategoryMap, Value};
use chrono::NaiveDate;
use labtab_utils::{is_missing_label, parse_result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_RANGE_DELIMITER: &str = "-";

fn default_scale() -> f64 {
    1.0
}

fn default_delimiter() -> String {
    String::from(DEFAULT_RANGE_DELIMITER)
}

fn default_date_format() -> String {
    String::from(DEFAULT_DATE_FORMAT)
}

/// How a scalar factor is applied to data
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum How {
    Multiply,
    Divide,
}

/// Binary arithmetic between two data variables
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Add,
    Subtract,
    Multiply,
    Divide,
    Average,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Add => "add",
            Method::Subtract => "subtract",
            Method::Multiply => "multiply",
            Method::Divide => "divide",
            Method::Average => "average",
        };
        write!(f, "{name}")
    }
}

/// The parser/formatter kind of a variable
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum VarType {
    /// Real-valued quantities
    Number {
        #[serde(default)]
        unit: Option<String>,
        /// Number of decimal places to format with. Shortest representation
        /// if `None`.
        #[serde(default)]
        precision: Option<usize>,
        /// Accumulated scalar factor applied to the data
        #[serde(default = "default_scale")]
        scale: f64,
    },
    /// Whole-number quantities
    Integer {
        #[serde(default)]
        unit: Option<String>,
        #[serde(default = "default_scale")]
        scale: f64,
    },
    /// Numeric intervals written `lo-hi`, `lo+` (no upper bound), or `<hi`
    /// (no lower bound)
    Range {
        #[serde(default)]
        unit: Option<String>,
        #[serde(default = "default_delimiter")]
        delimiter: String,
        #[serde(default)]
        precision: Option<usize>,
    },
    /// Ordered, closed set of labels
    Category { categories: CategoryMap },
    /// Calendar dates
    Date {
        #[serde(default = "default_date_format")]
        format: String,
    },
    /// Free text, sorted lexicographically
    Text,
}

impl VarType {
    pub fn number() -> Self {
        VarType::Number {
            unit: None,
            precision: None,
            scale: 1.0,
        }
    }

    pub fn integer() -> Self {
        VarType::Integer {
            unit: None,
            scale: 1.0,
        }
    }

    pub fn range() -> Self {
        VarType::Range {
            unit: None,
            delimiter: default_delimiter(),
            precision: None,
        }
    }

    pub fn date() -> Self {
        VarType::Date {
            format: default_date_format(),
        }
    }

    /// A short name of the kind used in messages
    pub fn kind(&self) -> &'static str {
        match self {
            VarType::Number { .. } => "number",
            VarType::Integer { .. } => "integer",
            VarType::Range { .. } => "range",
            VarType::Category { .. } => "category",
            VarType::Date { .. } => "date",
            VarType::Text => "text",
        }
    }

    /// Data under numeric variables can be used as array payloads
    pub fn is_numeric(&self) -> bool {
        matches!(self, VarType::Number { .. } | VarType::Integer { .. })
    }

    pub fn unit(&self) -> Option<&str> {
        match self {
            VarType::Number { unit, .. }
            | VarType::Integer { unit, .. }
            | VarType::Range { unit, .. } => unit.as_deref(),
            _ => None,
        }
    }

    /// The scale of numeric kinds
    pub fn scale(&self) -> Option<f64> {
        match self {
            VarType::Number { scale, .. } | VarType::Integer { scale, .. } => {
                Some(*scale)
            }
            _ => None,
        }
    }
}

fn format_number(x: f64, precision: Option<usize>) -> String {
    match precision {
        Some(p) => format!("{x:.p$}"),
        None => format!("{x}"),
    }
}

fn format_integer(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 9.0e15 {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}

/// Split a range label into its bounds. Returns `None` if the label is not a
/// range.
fn parse_range(label: &str, delimiter: &str) -> Option<(Option<f64>, Option<f64>)> {
    let label = label.trim();
    if let Some(lower) = label.strip_suffix('+') {
        return lower.trim().parse::<f64>().ok().map(|lo| (Some(lo), None));
    }
    if let Some(upper) = label.strip_prefix('<') {
        return upper.trim().parse::<f64>().ok().map(|hi| (None, Some(hi)));
    }
    // skip the first character so that a leading sign is not a delimiter
    let start = label.chars().next()?.len_utf8();
    let at = label[start..].find(delimiter)? + start;
    let lower = label[..at].trim().parse::<f64>().ok()?;
    let upper = label[at + delimiter.len()..].trim().parse::<f64>().ok()?;
    Some((Some(lower), Some(upper)))
}

fn combine_units(
    left: Option<&str>,
    right: Option<&str>,
    op: &str,
) -> Option<String> {
    match (left, right) {
        (Some(l), Some(r)) => Some(format!("{l}{op}{r}")),
        (Some(l), None) => Some(String::from(l)),
        (None, Some(r)) if op == "/" => Some(format!("1/{r}")),
        (None, Some(r)) => Some(String::from(r)),
        (None, None) => None,
    }
}

/// A named parser/formatter for the labels or values of one column
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Variable {
    /// The name of the column or axis
    pub name: String,
    /// How labels are parsed and formatted
    pub vartype: VarType,
    /// Optional notes about the variable
    #[serde(default)]
    pub notes: Option<String>,
}

impl Variable {
    pub fn new<S: Into<String>>(name: S, vartype: VarType) -> Self {
        Variable {
            name: name.into(),
            vartype,
            notes: None,
        }
    }

    pub fn number<S: Into<String>>(name: S) -> Self {
        Self::new(name, VarType::number())
    }

    pub fn integer<S: Into<String>>(name: S) -> Self {
        Self::new(name, VarType::integer())
    }

    pub fn range<S: Into<String>>(name: S) -> Self {
        Self::new(name, VarType::range())
    }

    pub fn date<S: Into<String>>(name: S) -> Self {
        Self::new(name, VarType::date())
    }

    pub fn text<S: Into<String>>(name: S) -> Self {
        Self::new(name, VarType::Text)
    }

    /// Create a category variable. Fails if a category is repeated.
    pub fn category<S, C>(name: S, categories: C) -> Result<Self, VariableError>
    where
        S: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let cats: Vec<String> = categories.into_iter().map(Into::into).collect();
        let categories = CategoryMap::try_from(cats)?;
        Ok(Self::new(name, VarType::Category { categories }))
    }

    /// Return a copy of the variable under a new name
    pub fn with_name<S: Into<String>>(&self, name: S) -> Self {
        Variable {
            name: name.into(),
            vartype: self.vartype.clone(),
            notes: self.notes.clone(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.vartype.is_numeric()
    }

    fn parse_err(&self, label: &str) -> VariableError {
        VariableError::Parse {
            name: self.name.clone(),
            value: String::from(label),
            kind: self.vartype.kind(),
        }
    }

    /// Parse a label into a value. Empty labels are missing.
    ///
    /// # Example
    ///
    /// ```
    /// # use labtab_variables::{Value, Variable};
    /// let var = Variable::integer("population");
    /// assert_eq!(var.parse("12").unwrap(), Value::Number(12.0));
    /// assert_eq!(var.parse("").unwrap(), Value::Missing);
    /// assert!(var.parse("twelve").is_err());
    /// ```
    pub fn parse(&self, label: &str) -> Result<Value, VariableError> {
        // "nan" spellings only mean missing for numeric kinds
        let missing = match self.vartype {
            VarType::Text | VarType::Category { .. } => label.trim().is_empty(),
            _ => is_missing_label(label),
        };
        if missing {
            return Ok(Value::Missing);
        }
        match &self.vartype {
            VarType::Number { .. } => parse_result::<f64>(label)
                .map_err(|_| self.parse_err(label))
                .map(|x| x.map_or(Value::Missing, Value::Number)),
            VarType::Integer { .. } => match parse_result::<i64>(label) {
                Ok(x) => Ok(x.map_or(Value::Missing, |x| Value::Number(x as f64))),
                // integral floats come out of numeric casts, e.g. `3.0`
                Err(_) => match parse_result::<f64>(label) {
                    Ok(Some(x)) if x.fract() == 0.0 => Ok(Value::Number(x)),
                    _ => Err(self.parse_err(label)),
                },
            },
            VarType::Range { delimiter, .. } => {
                match parse_range(label, delimiter) {
                    Some((lower, upper)) => Ok(Value::Range { lower, upper }),
                    None => Err(self.parse_err(label)),
                }
            }
            VarType::Category { categories } => {
                let label = label.trim();
                categories
                    .ix(label)
                    .map(|ix| Value::Category {
                        ix,
                        label: String::from(label),
                    })
                    .ok_or_else(|| VariableError::UnknownCategory {
                        name: self.name.clone(),
                        label: String::from(label),
                    })
            }
            VarType::Date { format } => {
                NaiveDate::parse_from_str(label.trim(), format)
                    .map(Value::Date)
                    .map_err(|_| self.parse_err(label))
            }
            VarType::Text => Ok(Value::Text(String::from(label))),
        }
    }

    fn format_err(&self, value: &Value) -> VariableError {
        VariableError::Format {
            name: self.name.clone(),
            value: format!("{value:?}"),
        }
    }

    /// Format a value into its canonical label
    ///
    /// # Example
    ///
    /// ```
    /// # use labtab_variables::{Value, Variable};
    /// let var = Variable::range("age");
    /// let value = Value::Range { lower: Some(65.0), upper: None };
    /// assert_eq!(var.format(&value).unwrap(), "65+");
    /// ```
    pub fn format(&self, value: &Value) -> Result<String, VariableError> {
        if let Value::Number(x) = value {
            if x.is_nan() {
                return Ok(String::new());
            }
        }
        match (&self.vartype, value) {
            (_, Value::Missing) => Ok(String::new()),
            (VarType::Number { precision, .. }, Value::Number(x)) => {
                Ok(format_number(*x, *precision))
            }
            (VarType::Integer { .. }, Value::Number(x)) => Ok(format_integer(*x)),
            (
                VarType::Range {
                    delimiter,
                    precision,
                    ..
                },
                Value::Range { lower, upper },
            ) => match (lower, upper) {
                (Some(lo), Some(hi)) => Ok(format!(
                    "{}{delimiter}{}",
                    format_number(*lo, *precision),
                    format_number(*hi, *precision)
                )),
                (Some(lo), None) => Ok(format!("{}+", format_number(*lo, *precision))),
                (None, Some(hi)) => Ok(format!("<{}", format_number(*hi, *precision))),
                (None, None) => Ok(String::new()),
            },
            (VarType::Range { precision, .. }, Value::Number(x)) => {
                Ok(format_number(*x, *precision))
            }
            (VarType::Category { categories }, Value::Category { label, .. })
            | (VarType::Category { categories }, Value::Text(label)) => {
                if categories.contains_cat(label) {
                    Ok(label.clone())
                } else {
                    Err(VariableError::UnknownCategory {
                        name: self.name.clone(),
                        label: label.clone(),
                    })
                }
            }
            (VarType::Category { categories }, Value::Number(x)) => {
                let label = if x.fract() == 0.0 && *x >= 0.0 {
                    categories.category(*x as usize)
                } else {
                    None
                };
                label.map(String::from).ok_or_else(|| self.format_err(value))
            }
            (VarType::Date { format }, Value::Date(date)) => {
                Ok(date.format(format).to_string())
            }
            (VarType::Text, Value::Text(text)) => Ok(text.clone()),
            (VarType::Text, Value::Number(x)) => Ok(format_number(*x, None)),
            (VarType::Text, Value::Category { label, .. }) => Ok(label.clone()),
            _ => Err(self.format_err(value)),
        }
    }

    /// Format a raw numeric datum. `NaN` formats as an empty (missing) label.
    pub fn format_f64(&self, x: f64) -> Result<String, VariableError> {
        self.format(&Value::from(x))
    }

    /// Parse then format a label, yielding its canonical form
    ///
    /// # Example
    ///
    /// ```
    /// # use labtab_variables::Variable;
    /// let var = Variable::number("income");
    /// assert_eq!(var.normalize("1.50").unwrap(), "1.5");
    /// assert_eq!(var.normalize(" 2 ").unwrap(), "2");
    /// ```
    pub fn normalize(&self, label: &str) -> Result<String, VariableError> {
        self.parse(label).and_then(|value| self.format(&value))
    }

    /// Compare two labels by their parsed values
    pub fn compare(&self, a: &str, b: &str) -> Result<Ordering, VariableError> {
        let a = self.parse(a)?;
        let b = self.parse(b)?;
        Ok(a.cmp_value(&b))
    }

    /// The variable describing this variable's data after it has been
    /// multiplied or divided by `factor`.
    pub fn factor(&self, factor: f64, how: How) -> Result<Variable, VariableError> {
        if how == How::Divide && factor == 0.0 {
            return Err(VariableError::ZeroFactor {
                name: self.name.clone(),
            });
        }
        let rescale = |scale: f64| match how {
            How::Multiply => scale * factor,
            How::Divide => scale / factor,
        };
        let vartype = match &self.vartype {
            VarType::Number {
                unit,
                precision,
                scale,
            } => VarType::Number {
                unit: unit.clone(),
                precision: *precision,
                scale: rescale(*scale),
            },
            VarType::Integer { unit, scale }
                if how == How::Multiply && factor.fract() == 0.0 =>
            {
                VarType::Integer {
                    unit: unit.clone(),
                    scale: rescale(*scale),
                }
            }
            VarType::Integer { unit, scale } => VarType::Number {
                unit: unit.clone(),
                precision: None,
                scale: rescale(*scale),
            },
            _ => {
                return Err(VariableError::NotNumeric {
                    name: self.name.clone(),
                })
            }
        };
        Ok(Variable {
            name: self.name.clone(),
            vartype,
            notes: self.notes.clone(),
        })
    }

    /// The variable describing the result of `method` applied to data under
    /// `self` and `other`. The result is named `name`.
    ///
    /// Adding, subtracting, and averaging require equal units and scales.
    ///
    /// # Example
    ///
    /// ```
    /// # use labtab_variables::{Method, VarType, Variable};
    /// let dist = Variable::new(
    ///     "distance",
    ///     VarType::Number { unit: Some("m".into()), precision: None, scale: 1.0 },
    /// );
    /// let time = Variable::new(
    ///     "time",
    ///     VarType::Number { unit: Some("s".into()), precision: None, scale: 1.0 },
    /// );
    /// let speed = dist.operation(&time, Method::Divide, "speed").unwrap();
    /// assert_eq!(speed.vartype.unit(), Some("m/s"));
    /// assert!(dist.operation(&time, Method::Add, "nonsense").is_err());
    /// ```
    pub fn operation<S: Into<String>>(
        &self,
        other: &Variable,
        method: Method,
        name: S,
    ) -> Result<Variable, VariableError> {
        let (scale, other_scale) =
            match (self.vartype.scale(), other.vartype.scale()) {
                (Some(a), Some(b)) => (a, b),
                (None, _) => {
                    return Err(VariableError::NotNumeric {
                        name: self.name.clone(),
                    })
                }
                (_, None) => {
                    return Err(VariableError::NotNumeric {
                        name: other.name.clone(),
                    })
                }
            };
        let (unit, other_unit) = (self.vartype.unit(), other.vartype.unit());
        let incompatible = |reason: String| VariableError::Incompatible {
            method,
            left: self.name.clone(),
            right: other.name.clone(),
            reason,
        };
        let precision = |vt: &VarType| match vt {
            VarType::Number { precision, .. } => *precision,
            _ => None,
        };

        let vartype = match method {
            Method::Add | Method::Subtract | Method::Average => {
                if unit != other_unit {
                    return Err(incompatible(format!(
                        "units {unit:?} and {other_unit:?} differ"
                    )));
                }
                if scale != other_scale {
                    return Err(incompatible(format!(
                        "scales {scale} and {other_scale} differ"
                    )));
                }
                let both_integer = matches!(
                    (&self.vartype, &other.vartype),
                    (VarType::Integer { .. }, VarType::Integer { .. })
                );
                if both_integer && method != Method::Average {
                    VarType::Integer {
                        unit: unit.map(String::from),
                        scale,
                    }
                } else {
                    VarType::Number {
                        unit: unit.map(String::from),
                        precision: precision(&self.vartype)
                            .max(precision(&other.vartype)),
                        scale,
                    }
                }
            }
            Method::Multiply => VarType::Number {
                unit: combine_units(unit, other_unit, "*"),
                precision: None,
                scale: scale * other_scale,
            },
            Method::Divide => VarType::Number {
                unit: combine_units(unit, other_unit, "/"),
                precision: None,
                scale: scale / other_scale,
            },
        };

        Ok(Variable::new(name, vartype))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn sizes() -> Variable {
        Variable::category("size", ["small", "medium", "large"]).unwrap()
    }

    #[test]
    fn number_roundtrips_through_format() {
        let var = Variable::number("x");
        for label in ["0", "1.5", "-2.25", "1000000"] {
            let value = var.parse(label).unwrap();
            assert_eq!(var.format(&value).unwrap(), label);
        }
    }

    #[test]
    fn number_with_precision_formats_fixed() {
        let var = Variable::new(
            "x",
            VarType::Number {
                unit: None,
                precision: Some(2),
                scale: 1.0,
            },
        );
        assert_eq!(var.normalize("1.5").unwrap(), "1.50");
    }

    #[test]
    fn number_with_precision_rounds_on_format() {
        let var = Variable::new(
            "x",
            VarType::Number {
                unit: None,
                precision: Some(2),
                scale: 1.0,
            },
        );
        let value = var.parse("1.234").unwrap();
        let label = var.format(&value).unwrap();
        assert_eq!(label, "1.23");
        // the rounded label is stable from here on
        assert_eq!(var.parse(&label).unwrap(), Value::Number(1.23));
        assert_ne!(var.parse(&label).unwrap(), value);
    }

    #[test]
    fn text_and_category_keep_nan_spellings() {
        let var = Variable::text("name");
        for label in ["NaN", "nan", "Nan"] {
            let value = var.parse(label).unwrap();
            assert_eq!(value, Value::Text(String::from(label)));
            assert_eq!(var.parse(&var.format(&value).unwrap()).unwrap(), value);
        }
        assert_eq!(var.parse("  ").unwrap(), Value::Missing);

        let bread = Variable::category("bread", ["naan", "nan"]).unwrap();
        assert_eq!(bread.normalize("nan").unwrap(), "nan");
        assert_eq!(bread.parse("").unwrap(), Value::Missing);

        // numeric kinds still read them as missing
        assert_eq!(Variable::number("x").parse("NaN").unwrap(), Value::Missing);
    }

    #[test]
    fn integer_parses_integral_float_labels() {
        let var = Variable::integer("n");
        assert_eq!(var.parse("3.0").unwrap(), Value::Number(3.0));
        assert!(var.parse("3.5").is_err());
        assert_eq!(var.normalize("3.0").unwrap(), "3");
    }

    #[test]
    fn range_parses_all_forms() {
        let var = Variable::range("age");
        assert_eq!(
            var.parse("10-20").unwrap(),
            Value::Range {
                lower: Some(10.0),
                upper: Some(20.0)
            }
        );
        assert_eq!(
            var.parse("65+").unwrap(),
            Value::Range {
                lower: Some(65.0),
                upper: None
            }
        );
        assert_eq!(
            var.parse("<5").unwrap(),
            Value::Range {
                lower: None,
                upper: Some(5.0)
            }
        );
        assert_eq!(
            var.parse("-10-0").unwrap(),
            Value::Range {
                lower: Some(-10.0),
                upper: Some(0.0)
            }
        );
        assert!(var.parse("ten-twenty").is_err());
    }

    #[test]
    fn range_roundtrips_through_format() {
        let var = Variable::range("age");
        for label in ["10-20", "65+", "<5", "-10-0"] {
            assert_eq!(var.normalize(label).unwrap(), label);
        }
    }

    #[test]
    fn range_with_custom_delimiter() {
        let var = Variable::new(
            "income",
            VarType::Range {
                unit: Some("dollars".into()),
                delimiter: String::from(" to "),
                precision: None,
            },
        );
        assert_eq!(var.normalize("10000 to 20000").unwrap(), "10000 to 20000");
    }

    #[test]
    fn category_unknown_label_errors() {
        let var = sizes();
        assert_eq!(
            var.parse("huge"),
            Err(VariableError::UnknownCategory {
                name: "size".into(),
                label: "huge".into()
            })
        );
    }

    #[test]
    fn category_compare_uses_list_order() {
        let var = sizes();
        assert_eq!(var.compare("large", "small").unwrap(), Ordering::Greater);
        assert_eq!(var.compare("small", "medium").unwrap(), Ordering::Less);
    }

    #[test]
    fn date_roundtrips() {
        let var = Variable::date("date");
        assert_eq!(var.normalize("2020-03-05").unwrap(), "2020-03-05");
        assert!(var.parse("03/05/2020").is_err());
    }

    #[test]
    fn custom_date_format() {
        let var = Variable::new(
            "date",
            VarType::Date {
                format: String::from("%m/%d/%Y"),
            },
        );
        assert_eq!(
            var.parse("03/05/2020").unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2020, 3, 5).unwrap())
        );
    }

    #[test]
    fn missing_formats_empty() {
        let var = Variable::number("x");
        assert_eq!(var.format(&Value::Missing).unwrap(), "");
        assert_eq!(var.format_f64(f64::NAN).unwrap(), "");
    }

    #[test]
    fn factor_multiplies_scale() {
        let var = Variable::number("x");
        let doubled = var.factor(2.0, How::Multiply).unwrap();
        match doubled.vartype {
            VarType::Number { scale, .. } => assert_eq!(scale, 2.0),
            _ => panic!("wrong vartype"),
        }
    }

    #[test]
    fn factor_integer_by_fraction_is_number() {
        let var = Variable::integer("n");
        let halved = var.factor(2.0, How::Divide).unwrap();
        assert!(matches!(halved.vartype, VarType::Number { scale, .. } if scale == 0.5));
        let doubled = var.factor(2.0, How::Multiply).unwrap();
        assert!(matches!(doubled.vartype, VarType::Integer { .. }));
    }

    #[test]
    fn factor_divide_by_zero_errors() {
        let var = Variable::number("x");
        assert!(var.factor(0.0, How::Divide).is_err());
    }

    #[test]
    fn factor_text_errors() {
        let var = Variable::text("x");
        assert_eq!(
            var.factor(2.0, How::Multiply),
            Err(VariableError::NotNumeric { name: "x".into() })
        );
    }

    #[test]
    fn add_integers_is_integer() {
        let a = Variable::integer("a");
        let b = Variable::integer("b");
        let c = a.operation(&b, Method::Add, "a+b").unwrap();
        assert_eq!(c.name, "a+b");
        assert!(matches!(c.vartype, VarType::Integer { .. }));
    }

    #[test]
    fn average_integers_is_number() {
        let a = Variable::integer("a");
        let c = a.operation(&a, Method::Average, "a").unwrap();
        assert!(matches!(c.vartype, VarType::Number { .. }));
    }

    #[test]
    fn add_with_different_scales_errors() {
        let a = Variable::number("a");
        let b = a.factor(10.0, How::Multiply).unwrap();
        assert!(a.operation(&b, Method::Add, "c").is_err());
    }

    #[test]
    fn multiply_combines_units_and_scales() {
        let a = Variable::new(
            "a",
            VarType::Number {
                unit: Some("m".into()),
                precision: None,
                scale: 2.0,
            },
        );
        let b = Variable::new(
            "b",
            VarType::Integer {
                unit: Some("s".into()),
                scale: 3.0,
            },
        );
        let c = a.operation(&b, Method::Multiply, "a*b").unwrap();
        assert_eq!(
            c.vartype,
            VarType::Number {
                unit: Some("m*s".into()),
                precision: None,
                scale: 6.0
            }
        );
    }

    #[test]
    fn divide_unitless_by_unit() {
        let a = Variable::number("a");
        let b = Variable::new(
            "b",
            VarType::Number {
                unit: Some("s".into()),
                precision: None,
                scale: 1.0,
            },
        );
        let c = a.operation(&b, Method::Divide, "a/b").unwrap();
        assert_eq!(c.vartype.unit(), Some("1/s"));
    }

    #[test]
    fn operation_on_category_errors() {
        let a = sizes();
        let b = Variable::number("b");
        assert!(a.operation(&b, Method::Add, "c").is_err());
    }

    #[test]
    fn deserialize_variable_from_yaml() {
        let yaml = indoc!(
            "
            name: income
            vartype: !number
              unit: dollars
              precision: 2
            notes: household income
            "
        );
        let var: Variable = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(var.name, "income");
        assert_eq!(
            var.vartype,
            VarType::Number {
                unit: Some("dollars".into()),
                precision: Some(2),
                scale: 1.0
            }
        );
    }

    #[test]
    fn deserialize_rejects_unknown_fields() {
        let yaml = indoc!(
            "
            name: income
            vartype: text
            color: blue
            "
        );
        assert!(serde_yaml::from_str::<Variable>(yaml).is_err());
    }
}
