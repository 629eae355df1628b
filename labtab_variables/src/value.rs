use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A label or cell parsed by a [`Variable`](crate::Variable)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Number(f64),
    /// A numeric interval. A missing bound is open.
    Range {
        lower: Option<f64>,
        upper: Option<f64>,
    },
    /// A category and its position in the variable's category list
    Category {
        ix: usize,
        label: String,
    },
    Date(NaiveDate),
    Text(String),
    Missing,
}

fn float_eq(x: f64, y: f64) -> bool {
    (x.is_nan() && y.is_nan()) || x == y
}

fn opt_float_eq(x: Option<f64>, y: Option<f64>) -> bool {
    match (x, y) {
        (Some(x), Some(y)) => float_eq(x, y),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(x), Self::Number(y)) => float_eq(*x, *y),
            (
                Self::Range { lower, upper },
                Self::Range {
                    lower: lower_o,
                    upper: upper_o,
                },
            ) => opt_float_eq(*lower, *lower_o) && opt_float_eq(*upper, *upper_o),
            (
                Self::Category { ix, label },
                Self::Category {
                    ix: ix_o,
                    label: label_o,
                },
            ) => ix == ix_o && label == label_o,
            (Self::Date(x), Self::Date(y)) => x == y,
            (Self::Text(x), Self::Text(y)) => x == y,
            (Self::Missing, Self::Missing) => true,
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        if x.is_nan() {
            Value::Missing
        } else {
            Value::Number(x)
        }
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Value::Date(date)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(String::from(text))
    }
}

impl Value {
    /// Project the value onto the real line if possible.
    ///
    /// Ranges project onto their midpoint, or onto their only bound if they
    /// are open. Categories project onto their index and dates onto the
    /// number of days from the common era.
    ///
    /// # Example
    ///
    /// ```
    /// # use labtab_variables::Value;
    /// assert_eq!(Value::Number(1.5).to_f64_opt(), Some(1.5));
    /// let range = Value::Range { lower: Some(10.0), upper: Some(20.0) };
    /// assert_eq!(range.to_f64_opt(), Some(15.0));
    /// let open = Value::Range { lower: Some(65.0), upper: None };
    /// assert_eq!(open.to_f64_opt(), Some(65.0));
    /// assert_eq!(Value::Text("cat".into()).to_f64_opt(), None);
    /// assert_eq!(Value::Missing.to_f64_opt(), None);
    /// ```
    pub fn to_f64_opt(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            Value::Range {
                lower: Some(lower),
                upper: Some(upper),
            } => Some((lower + upper) / 2.0),
            Value::Range { lower, upper } => lower.or(*upper),
            Value::Category { ix, .. } => Some(*ix as f64),
            Value::Date(date) => Some(f64::from(date.num_days_from_ce())),
            Value::Text(_) | Value::Missing => None,
        }
    }

    /// Like `to_f64_opt` but missing projects to `NaN`
    pub fn to_f64_or_nan(&self) -> f64 {
        self.to_f64_opt().unwrap_or(f64::NAN)
    }

    /// Returns `true` if the value is missing
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Number(_) => 0,
            Value::Range { .. } => 1,
            Value::Category { .. } => 2,
            Value::Date(_) => 3,
            Value::Text(_) => 4,
            Value::Missing => 5,
        }
    }

    /// A total order over values used to sort labels.
    ///
    /// Values of the same kind compare naturally: ranges by lower then upper
    /// bound (open bounds extend to infinity), categories by their position
    /// in the category list. Missing values sort last.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
            (
                Value::Range { lower, upper },
                Value::Range {
                    lower: lower_o,
                    upper: upper_o,
                },
            ) => {
                let lo = lower.unwrap_or(f64::NEG_INFINITY);
                let lo_o = lower_o.unwrap_or(f64::NEG_INFINITY);
                let hi = upper.unwrap_or(f64::INFINITY);
                let hi_o = upper_o.unwrap_or(f64::INFINITY);
                lo.total_cmp(&lo_o).then_with(|| hi.total_cmp(&hi_o))
            }
            (Value::Category { ix, .. }, Value::Category { ix: ix_o, .. }) => {
                ix.cmp(ix_o)
            }
            (Value::Date(x), Value::Date(y)) => x.cmp(y),
            (Value::Text(x), Value::Text(y)) => x.cmp(y),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}
