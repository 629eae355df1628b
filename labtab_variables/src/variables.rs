use crate::error::{ReadError, VariablesError};
use crate::Variable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::TryFrom;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// An ordered set of variables with unique names.
///
/// # Notes
///
/// Serializes to a `Vec` of `Variable` and deserializes from a `Vec` of
/// `Variable`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(into = "Vec<Variable>", try_from = "Vec<Variable>")]
pub struct Variables {
    variables: Vec<Variable>,
    index_lookup: HashMap<String, usize>,
}

impl Variables {
    /// Create a new `Variables`. Returns an error if any of the variable
    /// names are not unique (case sensitive).
    pub fn new(variables: Vec<Variable>) -> Result<Self, VariablesError> {
        let mut index_lookup = HashMap::new();
        variables
            .iter()
            .enumerate()
            .try_for_each(|(ix, var)| {
                if index_lookup.insert(var.name.clone(), ix).is_none() {
                    Ok(())
                } else {
                    Err(VariablesError::Duplicate(var.name.clone()))
                }
            })
            .map(|_| Variables {
                variables,
                index_lookup,
            })
    }

    /// Append a new variable to the end of the list. Returns an error if the
    /// variable's name already exists.
    pub fn push(&mut self, var: Variable) -> Result<(), VariablesError> {
        use std::collections::hash_map::Entry;

        let n = self.len();
        match self.index_lookup.entry(var.name.clone()) {
            Entry::Vacant(entry) => {
                self.variables.push(var);
                entry.insert(n);
                debug_assert_eq!(self.variables.len(), self.index_lookup.len());
                Ok(())
            }
            _ => Err(VariablesError::Duplicate(var.name)),
        }
    }

    /// Insert a variable, replacing any variable with the same name in place
    pub fn insert(&mut self, var: Variable) {
        match self.index_lookup.get(&var.name) {
            Some(&ix) => self.variables[ix] = var,
            None => {
                self.index_lookup.insert(var.name.clone(), self.len());
                self.variables.push(var);
            }
        }
    }

    /// Iterate through the variables
    pub fn iter(&self) -> std::slice::Iter<Variable> {
        self.variables.iter()
    }

    /// The number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// True if there are no variables
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// True if one of the variables has `name`
    pub fn contains_key(&self, name: &str) -> bool {
        self.index_lookup.contains_key(name)
    }

    /// The variable names in order
    pub fn names(&self) -> Vec<&str> {
        self.variables.iter().map(|var| var.name.as_str()).collect()
    }

    /// Get the variable with `name` if it exists
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.index_lookup.get(name).map(|&ix| &self.variables[ix])
    }

    /// Get the variable with `name` or fail with `NotFound`
    pub fn try_get(&self, name: &str) -> Result<&Variable, VariablesError> {
        self.get(name)
            .ok_or_else(|| VariablesError::NotFound(String::from(name)))
    }

    /// Remove and return the variable with `name`
    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        let ix = self.index_lookup.remove(name)?;
        self.index_lookup.iter_mut().for_each(|(_, i)| {
            if *i > ix {
                *i -= 1;
            }
        });
        Some(self.variables.remove(ix))
    }

    /// Rename a variable in place. Renaming a variable that does not exist is
    /// an error, as is renaming onto an existing name.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), VariablesError> {
        if old == new {
            return self.try_get(old).map(|_| ());
        }
        if self.contains_key(new) {
            return Err(VariablesError::Duplicate(String::from(new)));
        }
        let ix = self
            .index_lookup
            .remove(old)
            .ok_or_else(|| VariablesError::NotFound(String::from(old)))?;
        self.variables[ix].name = String::from(new);
        self.index_lookup.insert(String::from(new), ix);
        Ok(())
    }

    /// Keep only the variables for which `pred` returns `true`
    pub fn retain<F>(&mut self, pred: F)
    where
        F: FnMut(&Variable) -> bool,
    {
        self.variables.retain(pred);
        self.index_lookup = self
            .variables
            .iter()
            .enumerate()
            .map(|(ix, var)| (var.name.clone(), ix))
            .collect();
    }

    /// Return the subset of variables whose names are in `names`
    pub fn subset<S: AsRef<str>>(&self, names: &[S]) -> Variables {
        let mut out = self.clone();
        out.retain(|var| names.iter().any(|name| name.as_ref() == var.name));
        out
    }

    /// Union of two sets of variables. Variables present in both sets must be
    /// equal.
    ///
    /// # Example
    ///
    /// ```
    /// # use labtab_variables::{Variable, Variables, VariablesError};
    /// let a = Variables::new(vec![Variable::number("x")]).unwrap();
    /// let b = Variables::new(vec![Variable::number("x"), Variable::text("y")]).unwrap();
    /// let c = Variables::new(vec![Variable::text("x")]).unwrap();
    ///
    /// assert_eq!(a.merge(&b).unwrap().names(), vec!["x", "y"]);
    /// assert_eq!(a.merge(&c), Err(VariablesError::Conflict("x".into())));
    /// ```
    pub fn merge(&self, other: &Variables) -> Result<Variables, VariablesError> {
        let mut merged = self.clone();
        for var in other.iter() {
            match self.get(&var.name) {
                Some(existing) if existing != var => {
                    return Err(VariablesError::Conflict(var.name.clone()))
                }
                Some(_) => (),
                None => merged.push(var.clone())?,
            }
        }
        Ok(merged)
    }

    /// Read variables from a YAML file
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let mut file = File::open(path)?;
        let mut yaml = String::new();
        file.read_to_string(&mut yaml)?;
        let variables: Variables = serde_yaml::from_str(&yaml)?;
        Ok(variables)
    }

    /// Write variables as a YAML string
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl From<Variables> for Vec<Variable> {
    fn from(vars: Variables) -> Self {
        vars.variables
    }
}

impl TryFrom<Vec<Variable>> for Variables {
    type Error = VariablesError;

    fn try_from(vars: Vec<Variable>) -> Result<Variables, Self::Error> {
        Variables::new(vars)
    }
}

impl std::ops::Index<usize> for Variables {
    type Output = Variable;

    fn index(&self, ix: usize) -> &Self::Output {
        &self.variables[ix]
    }
}

impl std::ops::Index<&str> for Variables {
    type Output = Variable;

    fn index(&self, name: &str) -> &Self::Output {
        let ix = self.index_lookup[name];
        &self.variables[ix]
    }
}

impl<'a> IntoIterator for &'a Variables {
    type Item = &'a Variable;
    type IntoIter = std::slice::Iter<'a, Variable>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VarType;
    use indoc::indoc;
    use std::io::Write;

    fn quick_variables() -> Variables {
        Variables::new(vec![
            Variable::number("0"),
            Variable::integer("1"),
            Variable::text("2"),
        ])
        .unwrap()
    }

    #[test]
    fn new_with_duplicate_names_should_fail() {
        let vars = Variables::new(vec![
            Variable::number("0"),
            Variable::number("2"),
            Variable::text("2"),
        ]);
        assert_eq!(vars, Err(VariablesError::Duplicate(String::from("2"))));
    }

    #[test]
    fn push_duplicate_fails() {
        let mut vars = quick_variables();
        assert!(vars.push(Variable::number("1")).is_err());
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut vars = quick_variables();
        vars.insert(Variable::text("1"));
        assert_eq!(vars.len(), 3);
        assert_eq!(vars[1].vartype, VarType::Text);
        vars.insert(Variable::text("3"));
        assert_eq!(vars.names(), vec!["0", "1", "2", "3"]);
    }

    #[test]
    fn remove_reindexes() {
        let mut vars = quick_variables();
        let removed = vars.remove("0").unwrap();
        assert_eq!(removed.name, "0");
        assert_eq!(vars.names(), vec!["1", "2"]);
        assert_eq!(vars["2"].name, "2");
        assert!(vars.remove("0").is_none());
    }

    #[test]
    fn rename_moves_lookup() {
        let mut vars = quick_variables();
        vars.rename("1", "one").unwrap();
        assert!(!vars.contains_key("1"));
        assert_eq!(vars["one"].vartype, VarType::integer());
        assert_eq!(
            vars.rename("one", "2"),
            Err(VariablesError::Duplicate("2".into()))
        );
        assert_eq!(
            vars.rename("nope", "x"),
            Err(VariablesError::NotFound("nope".into()))
        );
    }

    #[test]
    fn subset_keeps_order() {
        let vars = quick_variables();
        let sub = vars.subset(&["2", "0"]);
        assert_eq!(sub.names(), vec!["0", "2"]);
        assert_eq!(sub["2"].name, "2");
    }

    #[test]
    fn yaml_roundtrip() {
        let vars = quick_variables();
        let yaml = vars.to_yaml().unwrap();
        let back: Variables = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, vars);
    }

    #[test]
    fn duplicate_yaml_fails_to_deserialize() {
        let yaml = indoc!(
            "
            - name: x
              vartype: text
            - name: x
              vartype: text
            "
        );
        assert!(serde_yaml::from_str::<Variables>(yaml).is_err());
    }

    #[test]
    fn from_yaml_file() {
        let yaml = indoc!(
            "
            - name: age
              vartype: !range {}
            - name: date
              vartype: !date
                format: '%d/%m/%Y'
            "
        );
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let vars = Variables::from_yaml(file.path()).unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["age"].vartype, VarType::range());
        assert_eq!(vars["date"].normalize("05/03/2020").unwrap(), "05/03/2020");
    }
}
