use crate::dataset::Dataset;
use crate::error::DatasetError;
use indexmap::IndexMap;
use labtab_utils::first_duplicate;
use ndarray::{concatenate, ArrayD, ArrayViewD, Axis};
use std::collections::BTreeMap;

fn sorted_keys<V>(map: &IndexMap<String, V>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort_unstable();
    keys
}

/// Transpose every dataset to the dim order of the first. All datasets must
/// have the same set of dims.
fn conform_dims(datasets: &[Dataset]) -> Result<Vec<Dataset>, DatasetError> {
    let first = datasets.first().ok_or(DatasetError::Empty)?;
    let order = first.dim_names();
    let expected = sorted_keys(first.dims());
    datasets
        .iter()
        .map(|ds| {
            let found = sorted_keys(ds.dims());
            if found != expected {
                Err(DatasetError::DimMismatch {
                    left: expected.clone(),
                    right: found,
                })
            } else {
                ds.transpose(&order)
            }
        })
        .collect()
}

/// Scope entries that are equal in every dataset
fn common_scope(datasets: &[Dataset]) -> IndexMap<String, String> {
    match datasets.split_first() {
        None => IndexMap::new(),
        Some((first, rest)) => first
            .scope()
            .iter()
            .filter(|(key, value)| {
                rest.iter().all(|ds| ds.scope().get(*key) == Some(value))
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

/// Concatenate datasets along an existing dim.
///
/// Every dataset must have the same layers and dims, and the same labels
/// along every dim but `dim`. The labels along `dim` must not repeat across
/// datasets. Only scope entries shared by every dataset are kept.
pub fn concat(datasets: &[Dataset], dim: &str) -> Result<Dataset, DatasetError> {
    let datasets = conform_dims(datasets)?;
    let first = &datasets[0];
    let ax = first.axis(dim)?;
    let layer_keys = sorted_keys(first.layers());

    for ds in datasets.iter().skip(1) {
        let found = sorted_keys(ds.layers());
        if found != layer_keys {
            return Err(DatasetError::LayerMismatch {
                left: layer_keys,
                right: found,
            });
        }
        for (name, labels) in first.dims().iter() {
            if name != dim && ds.labels(name) != Some(labels.as_slice()) {
                return Err(DatasetError::LabelMismatch(name.clone()));
            }
        }
    }

    let labels: Vec<String> = datasets
        .iter()
        .flat_map(|ds| ds.dims()[ax].iter().cloned())
        .collect();
    if let Some(label) = first_duplicate(labels.iter()) {
        return Err(DatasetError::DuplicateLabel {
            dim: String::from(dim),
            label: label.clone(),
        });
    }

    let mut dims = first.dims().clone();
    dims[ax] = labels;

    let layers = first
        .layer_names()
        .iter()
        .map(|&name| -> Result<(String, ArrayD<f64>), DatasetError> {
            let views: Vec<ArrayViewD<f64>> = datasets
                .iter()
                .filter_map(|ds| ds.layer(name).map(ArrayD::view))
                .collect();
            let arr = concatenate(Axis(ax), &views)?;
            Ok((String::from(name), arr))
        })
        .collect::<Result<IndexMap<String, ArrayD<f64>>, DatasetError>>()?;

    let mut out = Dataset::new(dims, layers, common_scope(&datasets))?;
    out.attrs = first.attrs.clone();
    Ok(out)
}

/// Merge the layers of datasets over identical dims.
///
/// Layer names must be distinct across datasets. Scope entries are unioned
/// and must agree where they overlap.
pub fn merge(datasets: &[Dataset]) -> Result<Dataset, DatasetError> {
    let datasets = conform_dims(datasets)?;
    let first = &datasets[0];

    let mut layers: IndexMap<String, ArrayD<f64>> = IndexMap::new();
    let mut scope: IndexMap<String, String> = IndexMap::new();
    let mut attrs: BTreeMap<String, String> = BTreeMap::new();

    for ds in datasets.iter() {
        if ds.dims() != first.dims() {
            let mismatch = first
                .dims()
                .iter()
                .find(|(name, labels)| ds.labels(name) != Some(labels.as_slice()))
                .map(|(name, _)| name.clone())
                .unwrap_or_default();
            return Err(DatasetError::LabelMismatch(mismatch));
        }
        for (name, arr) in ds.layers().iter() {
            if layers.insert(name.clone(), arr.clone()).is_some() {
                return Err(DatasetError::KeyCollision(name.clone()));
            }
        }
        for (key, value) in ds.scope().iter() {
            match scope.get(key) {
                Some(existing) if existing != value => {
                    return Err(DatasetError::ScopeConflict {
                        key: key.clone(),
                        left: existing.clone(),
                        right: value.clone(),
                    })
                }
                Some(_) => (),
                None => {
                    scope.insert(key.clone(), value.clone());
                }
            }
        }
        ds.attrs.iter().for_each(|(k, v)| {
            attrs.entry(k.clone()).or_insert_with(|| v.clone());
        });
    }

    let mut out = Dataset::new(first.dims().clone(), layers, scope)?;
    out.attrs = attrs;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| String::from(*s)).collect()
    }

    fn dataset(
        layer: &str,
        years: &[&str],
        data: ArrayD<f64>,
        scope: &[(&str, &str)],
    ) -> Dataset {
        let mut dims = IndexMap::new();
        dims.insert(String::from("region"), labels(&["a", "b"]));
        dims.insert(String::from("year"), labels(years));
        let mut layers = IndexMap::new();
        layers.insert(String::from(layer), data);
        let scope = scope
            .iter()
            .map(|(k, v)| (String::from(*k), String::from(*v)))
            .collect();
        Dataset::new(dims, layers, scope).unwrap()
    }

    #[test]
    fn concat_along_year() {
        let x = dataset(
            "pop",
            &["2020"],
            array![[1.0], [2.0]].into_dyn(),
            &[("src", "x"), ("sex", "f")],
        );
        let y = dataset(
            "pop",
            &["2021", "2022"],
            array![[3.0, 4.0], [5.0, 6.0]].into_dyn(),
            &[("src", "y"), ("sex", "f")],
        );
        let out = concat(&[x, y], "year").unwrap();
        assert_eq!(out.labels("year").unwrap(), labels(&["2020", "2021", "2022"]));
        assert_eq!(
            out.layer("pop").unwrap(),
            &array![[1.0, 3.0, 4.0], [2.0, 5.0, 6.0]].into_dyn()
        );
        assert_eq!(out.scope_names(), vec!["sex"]);
    }

    #[test]
    fn concat_transposes_to_first_order() {
        let x = dataset("pop", &["2020"], array![[1.0], [2.0]].into_dyn(), &[]);
        let y = dataset("pop", &["2021"], array![[3.0], [4.0]].into_dyn(), &[])
            .transpose(&["year", "region"])
            .unwrap();
        let out = concat(&[x, y], "year").unwrap();
        assert_eq!(out.dim_names(), vec!["region", "year"]);
        assert_eq!(
            out.layer("pop").unwrap(),
            &array![[1.0, 3.0], [2.0, 4.0]].into_dyn()
        );
    }

    #[test]
    fn concat_duplicate_labels_fail() {
        let x = dataset("pop", &["2020"], array![[1.0], [2.0]].into_dyn(), &[]);
        let y = x.clone();
        assert!(matches!(
            concat(&[x, y], "year"),
            Err(DatasetError::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn concat_different_layers_fail() {
        let x = dataset("pop", &["2020"], array![[1.0], [2.0]].into_dyn(), &[]);
        let y = dataset("cases", &["2021"], array![[1.0], [2.0]].into_dyn(), &[]);
        assert!(matches!(
            concat(&[x, y], "year"),
            Err(DatasetError::LayerMismatch { .. })
        ));
    }

    #[test]
    fn merge_unions_layers() {
        let x = dataset("pop", &["2020"], array![[1.0], [2.0]].into_dyn(), &[("sex", "f")]);
        let y = dataset("cases", &["2020"], array![[0.0], [1.0]].into_dyn(), &[("src", "y")]);
        let out = merge(&[x, y]).unwrap();
        assert_eq!(out.layer_names(), vec!["pop", "cases"]);
        assert_eq!(out.scope().len(), 2);
    }

    #[test]
    fn merge_conflicting_scope_fails() {
        let x = dataset("pop", &["2020"], array![[1.0], [2.0]].into_dyn(), &[("sex", "f")]);
        let y = dataset("cases", &["2020"], array![[0.0], [1.0]].into_dyn(), &[("sex", "m")]);
        assert!(matches!(
            merge(&[x, y]),
            Err(DatasetError::ScopeConflict { .. })
        ));
    }

    #[test]
    fn merge_mismatched_labels_fails() {
        let x = dataset("pop", &["2020"], array![[1.0], [2.0]].into_dyn(), &[]);
        let y = dataset("cases", &["2021"], array![[0.0], [1.0]].into_dyn(), &[]);
        assert_eq!(
            merge(&[x, y]),
            Err(DatasetError::LabelMismatch(String::from("year")))
        );
    }

    #[test]
    fn empty_input_fails() {
        assert_eq!(concat(&[], "year"), Err(DatasetError::Empty));
        assert_eq!(merge(&[]), Err(DatasetError::Empty));
    }
}
