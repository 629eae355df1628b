use crate::error::VariableError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::convert::TryFrom;

/// An ordered list of unique category labels with a reverse lookup.
///
/// The order of the list is the sort order of the categories.
///
/// # Notes
///
/// Serializes to a `Vec` of `String` and deserializes from a `Vec` of
/// `String`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct CategoryMap {
    to_cat: Vec<String>,
    to_ix: HashMap<String, usize>,
}

impl TryFrom<Vec<String>> for CategoryMap {
    type Error = VariableError;

    fn try_from(cats: Vec<String>) -> Result<Self, Self::Error> {
        let mut to_ix = HashMap::with_capacity(cats.len());
        cats.iter().enumerate().try_for_each(|(ix, cat)| {
            if to_ix.insert(cat.clone(), ix).is_some() {
                Err(VariableError::DuplicateCategory(cat.clone()))
            } else {
                Ok(())
            }
        })?;
        Ok(CategoryMap { to_cat: cats, to_ix })
    }
}

impl From<CategoryMap> for Vec<String> {
    fn from(map: CategoryMap) -> Self {
        map.to_cat
    }
}

impl From<BTreeSet<String>> for CategoryMap {
    fn from(cats: BTreeSet<String>) -> Self {
        let to_cat: Vec<String> = cats.into_iter().collect();
        let to_ix = to_cat
            .iter()
            .enumerate()
            .map(|(ix, cat)| (cat.clone(), ix))
            .collect();
        CategoryMap { to_cat, to_ix }
    }
}

impl CategoryMap {
    pub fn len(&self) -> usize {
        self.to_cat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_cat.is_empty()
    }

    /// Get the index of the category if it exists
    ///
    /// # Examples
    ///
    /// ```
    /// # use labtab_variables::CategoryMap;
    /// # use std::convert::TryFrom;
    /// let map = CategoryMap::try_from(vec![
    ///     String::from("low"),
    ///     String::from("mid"),
    ///     String::from("high"),
    /// ]).unwrap();
    ///
    /// assert_eq!(map.ix("low"), Some(0));
    /// assert_eq!(map.ix("high"), Some(2));
    /// assert_eq!(map.ix("none"), None);
    /// ```
    pub fn ix(&self, cat: &str) -> Option<usize> {
        self.to_ix.get(cat).cloned()
    }

    /// Get the category at an index if it exists
    pub fn category(&self, ix: usize) -> Option<&str> {
        self.to_cat.get(ix).map(String::as_str)
    }

    pub fn contains_cat(&self, cat: &str) -> bool {
        self.to_ix.contains_key(cat)
    }

    pub fn iter(&self) -> std::slice::Iter<String> {
        self.to_cat.iter()
    }
}
