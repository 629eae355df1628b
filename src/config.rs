//! Table configuration and file serialization
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use labtab_variables::Variables;
use log::info;
use serde::{Deserialize, Serialize};

use crate::array::ArrayTable;
use crate::error::TableError;
use crate::flat::FlatTable;
use crate::transformations::Transformation;

/// File formats for configs and variables
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SerializedType {
    /// Human-readable and the default
    #[default]
    Yaml,
    Json,
}

impl FromStr for SerializedType {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(TableError::InvalidFileType(String::from(s))),
        }
    }
}

fn serialized_type_from_path<P: AsRef<Path>>(path: &P) -> Result<SerializedType, TableError> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            TableError::InvalidFileType(path.as_ref().display().to_string())
        })?;
    SerializedType::from_str(ext)
}

/// Write `obj` to `path` in the format of its extension
pub fn serialize_obj<T, P>(obj: &T, path: P) -> Result<(), TableError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let serialized_type = serialized_type_from_path(&path)?;
    save(obj, path, serialized_type)
}

/// Read a `T` from `path` in the format of its extension
pub fn deserialize_file<T, P>(path: P) -> Result<T, TableError>
where
    for<'de> T: Deserialize<'de>,
    P: AsRef<Path>,
{
    let serialized_type = serialized_type_from_path(&path)?;
    load(path, serialized_type)
}

pub fn save<T, P>(obj: &T, path: P, serialized_type: SerializedType) -> Result<(), TableError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let bytes = match serialized_type {
        SerializedType::Yaml => serde_yaml::to_string(obj)?.into_bytes(),
        SerializedType::Json => serde_json::to_vec_pretty(obj)?,
    };
    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    let mut writer = io::BufWriter::new(file);
    writer.write_all(&bytes)?;
    Ok(())
}

pub fn load<T, P>(path: P, serialized_type: SerializedType) -> Result<T, TableError>
where
    for<'de> T: Deserialize<'de>,
    P: AsRef<Path>,
{
    let mut file = io::BufReader::new(fs::File::open(path)?);
    let mut ser = String::new();
    file.read_to_string(&mut ser)?;
    match serialized_type {
        SerializedType::Yaml => Ok(serde_yaml::from_str(&ser)?),
        SerializedType::Json => Ok(serde_json::from_str(&ser)?),
    }
}

/// A transformation along one axis, as listed in a config
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TransformStep {
    pub axis: String,
    pub transformation: Transformation,
    #[serde(default)]
    pub retag: Option<String>,
}

/// How to build an `ArrayTable` from flat data.
///
/// # Example
///
/// ```
/// # use labtab::TableConfig;
/// let yaml = "
/// name: population
/// datakeys: [population]
/// headerkeys: [age, year]
/// scopekeys: [country]
/// ";
/// let config: TableConfig = serde_yaml::from_str(yaml).unwrap();
///
/// assert_eq!(config, TableConfig::new("population")
///     .datakeys(["population"])
///     .headerkeys(["age", "year"])
///     .scopekeys(["country"]));
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    /// Name of the table
    pub name: String,
    /// Columns that become layers
    pub datakeys: Vec<String>,
    /// Columns that become header axes, in order
    #[serde(default)]
    pub headerkeys: Vec<String>,
    /// Constant columns that become scope
    #[serde(default)]
    pub scopekeys: Vec<String>,
    /// YAML file of variables. Columns without a variable are inferred.
    #[serde(default)]
    pub variables: Option<PathBuf>,
    /// Transformations applied in order after unflattening
    #[serde(default)]
    pub transforms: Vec<TransformStep>,
}

impl TableConfig {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            datakeys: Vec::new(),
            headerkeys: Vec::new(),
            scopekeys: Vec::new(),
            variables: None,
            transforms: Vec::new(),
        }
    }

    pub fn datakeys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datakeys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn headerkeys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headerkeys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn scopekeys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopekeys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn variables<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.variables = Some(path.into());
        self
    }

    pub fn transform<S: Into<String>>(
        mut self,
        axis: S,
        transformation: Transformation,
        retag: Option<String>,
    ) -> Self {
        self.transforms.push(TransformStep {
            axis: axis.into(),
            transformation,
            retag,
        });
        self
    }

    /// The configured variables, or none
    pub fn load_variables(&self) -> Result<Variables, TableError> {
        match &self.variables {
            Some(path) => Ok(Variables::from_yaml(path)?),
            None => Ok(Variables::default()),
        }
    }

    /// Unflatten `flat` into a table sorted along every header axis, then
    /// apply the configured transforms
    pub fn build(&self, flat: &FlatTable) -> Result<ArrayTable, TableError> {
        let table = flat
            .unflatten(&self.datakeys, &self.headerkeys, &self.scopekeys)?
            .rename(self.name.clone())
            .sortall(true)?;
        self.transforms.iter().try_fold(table, |table, step| {
            info!("applying {:?} along `{}`", step.transformation, step.axis);
            table.transform(&step.axis, &step.transformation, step.retag.as_deref())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformations::Reduction;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn serialized_type_from_extension() {
        assert_eq!(SerializedType::from_str("YML").unwrap(), SerializedType::Yaml);
        assert_eq!(SerializedType::from_str("json").unwrap(), SerializedType::Json);
        assert!(matches!(
            SerializedType::from_str("bin"),
            Err(TableError::InvalidFileType(_))
        ));
    }

    #[test]
    fn config_from_yaml_with_transforms() {
        let yaml = indoc!(
            "
            name: deaths
            datakeys: [deaths]
            headerkeys: [age, year]
            variables: variables.yaml
            transforms:
              - axis: age
                transformation: !reduce
                  reduction: sum
                retag: total
            "
        );
        let config: TableConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.variables, Some(PathBuf::from("variables.yaml")));
        assert_eq!(
            config.transforms,
            vec![TransformStep {
                axis: String::from("age"),
                transformation: Transformation::Reduce {
                    reduction: Reduction::Sum
                },
                retag: Some(String::from("total")),
            }]
        );
    }

    #[test]
    fn config_rejects_unknown_fields() {
        let yaml = indoc!(
            "
            name: deaths
            datakeys: [deaths]
            colour: blue
            "
        );
        assert!(serde_yaml::from_str::<TableConfig>(yaml).is_err());
    }

    #[test]
    fn save_and_load_by_extension() {
        let dir = TempDir::new().unwrap();
        let config = TableConfig::new("deaths")
            .datakeys(["deaths"])
            .headerkeys(["year"])
            .transform(
                "year",
                Transformation::Reduce {
                    reduction: Reduction::Mean,
                },
                None,
            );
        for file in ["config.yaml", "config.json"] {
            let path = dir.path().join(file);
            serialize_obj(&config, &path).unwrap();
            let loaded: TableConfig = deserialize_file(&path).unwrap();
            assert_eq!(loaded, config);
        }
        assert!(serialize_obj(&config, dir.path().join("config.txt")).is_err());
    }

    #[test]
    fn missing_variables_file_is_empty() {
        let config = TableConfig::new("t");
        assert!(config.load_variables().unwrap().is_empty());
    }
}
