use crate::error::DatasetError;
use indexmap::IndexMap;
use labtab_utils::first_duplicate;
use ndarray::{ArrayD, Axis, IxDyn};
use std::collections::{BTreeMap, HashSet};

/// A set of co-indexed `f64` arrays over named, labeled dimensions.
///
/// Every layer has one axis per dim, in the order of `dims`. The length of
/// each axis equals the number of labels of its dim. Layer, dim, and scope
/// names are pairwise distinct.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    layers: IndexMap<String, ArrayD<f64>>,
    dims: IndexMap<String, Vec<String>>,
    scope: IndexMap<String, String>,
    /// Free-form metadata. Carried along but never interpreted.
    pub attrs: BTreeMap<String, String>,
}

fn arrays_eq(a: &ArrayD<f64>, b: &ArrayD<f64>) -> bool {
    a.shape() == b.shape()
        && a
            .iter()
            .zip(b.iter())
            .all(|(x, y)| (x.is_nan() && y.is_nan()) || x == y)
}

/// `NaN` compares equal to `NaN`. Layer and scope order are ignored; dim
/// order is not.
impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims
            && self.layers.len() == other.layers.len()
            && self.layers.iter().all(|(name, arr)| {
                other
                    .layers
                    .get(name)
                    .map_or(false, |arr_o| arrays_eq(arr, arr_o))
            })
            && self.scope.len() == other.scope.len()
            && self
                .scope
                .iter()
                .all(|(k, v)| other.scope.get(k) == Some(v))
            && self.attrs == other.attrs
    }
}

impl Dataset {
    /// Create and validate a new dataset
    pub fn new(
        dims: IndexMap<String, Vec<String>>,
        layers: IndexMap<String, ArrayD<f64>>,
        scope: IndexMap<String, String>,
    ) -> Result<Self, DatasetError> {
        let dataset = Dataset {
            layers,
            dims,
            scope,
            attrs: BTreeMap::new(),
        };
        dataset.validate()?;
        Ok(dataset)
    }

    /// A dataset with no dims: every layer holds a single value
    pub fn scalar(
        layers: IndexMap<String, f64>,
        scope: IndexMap<String, String>,
    ) -> Result<Self, DatasetError> {
        let layers = layers
            .into_iter()
            .map(|(k, x)| (k, ArrayD::from_elem(IxDyn(&[]), x)))
            .collect();
        Self::new(IndexMap::new(), layers, scope)
    }

    fn validate(&self) -> Result<(), DatasetError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for key in self
            .layers
            .keys()
            .chain(self.dims.keys())
            .chain(self.scope.keys())
        {
            if !seen.insert(key.as_str()) {
                return Err(DatasetError::KeyCollision(key.clone()));
            }
        }

        for (dim, labels) in self.dims.iter() {
            if let Some(label) = first_duplicate(labels.iter()) {
                return Err(DatasetError::DuplicateLabel {
                    dim: dim.clone(),
                    label: label.clone(),
                });
            }
        }

        let expected = self.shape();
        for (name, arr) in self.layers.iter() {
            if arr.shape() != expected.as_slice() {
                return Err(DatasetError::ShapeMismatch {
                    layer: name.clone(),
                    expected,
                    found: arr.shape().to_vec(),
                });
            }
        }
        Ok(())
    }

    pub fn layers(&self) -> &IndexMap<String, ArrayD<f64>> {
        &self.layers
    }

    pub fn dims(&self) -> &IndexMap<String, Vec<String>> {
        &self.dims
    }

    pub fn scope(&self) -> &IndexMap<String, String> {
        &self.scope
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.keys().map(String::as_str).collect()
    }

    pub fn dim_names(&self) -> Vec<&str> {
        self.dims.keys().map(String::as_str).collect()
    }

    pub fn scope_names(&self) -> Vec<&str> {
        self.scope.keys().map(String::as_str).collect()
    }

    /// The length of every dim in order
    pub fn shape(&self) -> Vec<usize> {
        self.dims.values().map(Vec::len).collect()
    }

    /// The number of cells in each layer
    pub fn size(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn layer(&self, name: &str) -> Option<&ArrayD<f64>> {
        self.layers.get(name)
    }

    pub fn labels(&self, dim: &str) -> Option<&[String]> {
        self.dims.get(dim).map(Vec::as_slice)
    }

    /// The axis position of `dim`
    pub fn axis(&self, dim: &str) -> Result<usize, DatasetError> {
        self.dims
            .get_index_of(dim)
            .ok_or_else(|| DatasetError::DimNotFound(String::from(dim)))
    }

    /// Returns `true` if `key` names a layer, dim, or scope coordinate
    pub fn contains_key(&self, key: &str) -> bool {
        self.layers.contains_key(key)
            || self.dims.contains_key(key)
            || self.scope.contains_key(key)
    }

    fn try_layer(&self, name: &str) -> Result<&ArrayD<f64>, DatasetError> {
        self.layers
            .get(name)
            .ok_or_else(|| DatasetError::LayerNotFound(String::from(name)))
    }

    /// The positions of `labels` along `dim`
    pub fn positions<S: AsRef<str>>(
        &self,
        dim: &str,
        labels: &[S],
    ) -> Result<Vec<usize>, DatasetError> {
        let existing = self
            .dims
            .get(dim)
            .ok_or_else(|| DatasetError::DimNotFound(String::from(dim)))?;
        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                existing.iter().position(|x| x == label).ok_or_else(|| {
                    DatasetError::LabelNotFound {
                        dim: String::from(dim),
                        label: String::from(label),
                    }
                })
            })
            .collect()
    }

    /// Select positions along `dim` for every layer. The dim is kept and
    /// positions may be reordered but not repeated.
    pub fn isel(
        &self,
        dim: &str,
        indices: &[usize],
    ) -> Result<Dataset, DatasetError> {
        let ax = self.axis(dim)?;
        let labels = &self.dims[ax];
        if let Some(&index) = indices.iter().find(|&&ix| ix >= labels.len()) {
            return Err(DatasetError::IndexOutOfBounds {
                dim: String::from(dim),
                index,
                len: labels.len(),
            });
        }

        let mut out = self.clone();
        out.dims[ax] = indices.iter().map(|&ix| labels[ix].clone()).collect();
        out.layers
            .values_mut()
            .for_each(|arr| *arr = arr.select(Axis(ax), indices));
        out.validate()?;
        Ok(out)
    }

    /// Permute the positions along `dim`. `order` must be a permutation of
    /// `0..len`.
    pub fn reorder(&self, dim: &str, order: &[usize]) -> Result<Dataset, DatasetError> {
        let len = self.dims[self.axis(dim)?].len();
        let mut sorted = order.to_vec();
        sorted.sort_unstable();
        if sorted != (0..len).collect::<Vec<_>>() {
            return Err(DatasetError::InvalidOrder(
                order.iter().map(|ix| ix.to_string()).collect(),
            ));
        }
        self.isel(dim, order)
    }

    /// Select labels along `dim` for every layer
    pub fn sel<S: AsRef<str>>(
        &self,
        dim: &str,
        labels: &[S],
    ) -> Result<Dataset, DatasetError> {
        let indices = self.positions(dim, labels)?;
        self.isel(dim, &indices)
    }

    /// Select a single position along `dim`. The dim is removed and its
    /// label becomes a scope coordinate.
    pub fn isel_one(&self, dim: &str, index: usize) -> Result<Dataset, DatasetError> {
        self.isel(dim, &[index])?.squeeze(dim)
    }

    /// Select a single label along `dim`, moving it into scope
    pub fn sel_one(&self, dim: &str, label: &str) -> Result<Dataset, DatasetError> {
        let ix = self.positions(dim, &[label])?[0];
        self.isel_one(dim, ix)
    }

    /// Conform `dim` to `labels`. Existing labels keep their data, new
    /// labels are filled with `NaN`, and labels not in `labels` are dropped.
    pub fn reindex(
        &self,
        dim: &str,
        labels: &[String],
    ) -> Result<Dataset, DatasetError> {
        let ax = self.axis(dim)?;
        if let Some(label) = first_duplicate(labels.iter()) {
            return Err(DatasetError::DuplicateLabel {
                dim: String::from(dim),
                label: label.clone(),
            });
        }
        let old = &self.dims[ax];
        let source: Vec<Option<usize>> = labels
            .iter()
            .map(|label| old.iter().position(|x| x == label))
            .collect();

        let mut out = self.clone();
        out.dims[ax] = labels.to_vec();
        let shape = out.shape();
        for (name, arr) in out.layers.iter_mut() {
            let mut new_arr = ArrayD::from_elem(IxDyn(&shape), f64::NAN);
            for (new_ix, old_ix) in source.iter().enumerate() {
                if let Some(old_ix) = old_ix {
                    new_arr
                        .index_axis_mut(Axis(ax), new_ix)
                        .assign(&self.layers[name].index_axis(Axis(ax), *old_ix));
                }
            }
            *arr = new_arr;
        }
        Ok(out)
    }

    /// Drop the positions along `dim` where every layer is `NaN`
    pub fn drop_empty(&self, dim: &str) -> Result<Dataset, DatasetError> {
        let ax = self.axis(dim)?;
        let keep: Vec<usize> = (0..self.dims[ax].len())
            .filter(|&ix| {
                self.layers.values().any(|arr| {
                    arr.index_axis(Axis(ax), ix).iter().any(|x| !x.is_nan())
                })
            })
            .collect();
        self.isel(dim, &keep)
    }

    /// Reorder the dims. `order` must name every dim exactly once.
    pub fn transpose<S: AsRef<str>>(&self, order: &[S]) -> Result<Dataset, DatasetError> {
        let order_names: Vec<String> =
            order.iter().map(|s| String::from(s.as_ref())).collect();
        let invalid = order_names.len() != self.dims.len()
            || first_duplicate(order_names.iter()).is_some()
            || order_names.iter().any(|d| !self.dims.contains_key(d));
        if invalid {
            return Err(DatasetError::InvalidOrder(order_names));
        }

        let axes: Vec<usize> = order_names
            .iter()
            .map(|d| self.axis(d))
            .collect::<Result<_, _>>()?;
        if axes.iter().enumerate().all(|(i, &ax)| i == ax) {
            return Ok(self.clone());
        }

        let mut out = self.clone();
        out.dims = order_names
            .iter()
            .map(|d| (d.clone(), self.dims[d.as_str()].clone()))
            .collect();
        out.layers.values_mut().for_each(|arr| {
            let permuted = arr.clone().permuted_axes(IxDyn(&axes));
            *arr = permuted.as_standard_layout().into_owned();
        });
        Ok(out)
    }

    /// Move the scope coordinate `key` into a new length-one dim at axis 0
    pub fn expand_dims(&self, key: &str) -> Result<Dataset, DatasetError> {
        let mut out = self.clone();
        let label = out
            .scope
            .shift_remove(key)
            .ok_or_else(|| DatasetError::ScopeNotFound(String::from(key)))?;
        let mut dims = IndexMap::with_capacity(out.dims.len() + 1);
        dims.insert(String::from(key), vec![label]);
        dims.extend(out.dims.drain(..));
        out.dims = dims;
        out.layers.values_mut().for_each(|arr| {
            *arr = arr.clone().insert_axis(Axis(0));
        });
        Ok(out)
    }

    /// Remove the length-one dim `dim`, keeping its label as scope
    pub fn squeeze(&self, dim: &str) -> Result<Dataset, DatasetError> {
        let ax = self.axis(dim)?;
        let len = self.dims[ax].len();
        if len != 1 {
            return Err(DatasetError::NotSqueezable {
                dim: String::from(dim),
                len,
            });
        }
        let mut out = self.clone();
        let (name, mut labels) = out
            .dims
            .shift_remove_index(ax)
            .ok_or_else(|| DatasetError::DimNotFound(String::from(dim)))?;
        out.scope.insert(name, labels.remove(0));
        out.layers.values_mut().for_each(|arr| {
            *arr = arr.clone().index_axis_move(Axis(ax), 0);
        });
        Ok(out)
    }

    /// Remove a scope coordinate
    pub fn drop_scope(&self, key: &str) -> Result<Dataset, DatasetError> {
        let mut out = self.clone();
        out.scope
            .shift_remove(key)
            .ok_or_else(|| DatasetError::ScopeNotFound(String::from(key)))?;
        Ok(out)
    }

    /// Keep only the named layers, in the given order
    pub fn subset<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Dataset, DatasetError> {
        let layers = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.try_layer(name).map(|arr| (String::from(name), arr.clone()))
            })
            .collect::<Result<IndexMap<_, _>, _>>()?;
        Ok(Dataset {
            layers,
            dims: self.dims.clone(),
            scope: self.scope.clone(),
            attrs: self.attrs.clone(),
        })
    }

    /// Rename a layer, dim, or scope coordinate, keeping its position
    pub fn rename(&self, old: &str, new: &str) -> Result<Dataset, DatasetError> {
        if old == new {
            return Ok(self.clone());
        }
        if self.contains_key(new) {
            return Err(DatasetError::KeyCollision(String::from(new)));
        }

        fn rename_key<V: Clone>(
            map: &IndexMap<String, V>,
            old: &str,
            new: &str,
        ) -> IndexMap<String, V> {
            map.iter()
                .map(|(k, v)| {
                    let k = if k == old { String::from(new) } else { k.clone() };
                    (k, v.clone())
                })
                .collect()
        }

        if !self.contains_key(old) {
            return Err(DatasetError::KeyNotFound(String::from(old)));
        }
        Ok(Dataset {
            layers: rename_key(&self.layers, old, new),
            dims: rename_key(&self.dims, old, new),
            scope: rename_key(&self.scope, old, new),
            attrs: self.attrs.clone(),
        })
    }

    /// Replace the labels of `dim` with new labels of the same length
    pub fn relabel(
        &self,
        dim: &str,
        labels: Vec<String>,
    ) -> Result<Dataset, DatasetError> {
        let ax = self.axis(dim)?;
        let mut out = self.clone();
        out.dims[ax] = labels;
        out.validate()?;
        Ok(out)
    }

    /// Replace the label of the scope coordinate `key`
    pub fn relabel_scope(&self, key: &str, label: String) -> Result<Dataset, DatasetError> {
        let mut out = self.clone();
        let value = out
            .scope
            .get_mut(key)
            .ok_or_else(|| DatasetError::ScopeNotFound(String::from(key)))?;
        *value = label;
        Ok(out)
    }

    /// Apply `f` to every value of every layer
    pub fn map_layers<F>(&self, f: F) -> Dataset
    where
        F: Fn(f64) -> f64,
    {
        let mut out = self.clone();
        out.layers.values_mut().for_each(|arr| arr.mapv_inplace(&f));
        out
    }

    /// Replace every lane along `dim` of every layer with `f(lane)`. `f`
    /// receives the lane values in order and must return as many values.
    pub fn map_lanes<F>(&self, dim: &str, f: F) -> Result<Dataset, DatasetError>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let ax = self.axis(dim)?;
        let mut out = self.clone();
        for arr in out.layers.values_mut() {
            for mut lane in arr.lanes_mut(Axis(ax)) {
                let ys = f(&lane.to_vec());
                lane.iter_mut().zip(ys).for_each(|(x, y)| *x = y);
            }
        }
        Ok(out)
    }

    /// Collapse `dim` of every layer with `f`, removing the dim
    pub fn reduce<F>(&self, dim: &str, f: F) -> Result<Dataset, DatasetError>
    where
        F: Fn(&[f64]) -> f64,
    {
        let ax = self.axis(dim)?;
        let mut out = self.clone();
        out.dims.shift_remove_index(ax);
        out.layers.values_mut().for_each(|arr| {
            *arr = arr.map_axis(Axis(ax), |lane| f(&lane.to_vec()));
        });
        Ok(out)
    }

    /// Collapse groups of positions along `dim` into single positions.
    ///
    /// Each group is a new label and the positions it replaces. The groups
    /// become the new labels of `dim` in order.
    pub fn group_reduce<F>(
        &self,
        dim: &str,
        groups: &[(String, Vec<usize>)],
        f: F,
    ) -> Result<Dataset, DatasetError>
    where
        F: Fn(&[f64]) -> f64,
    {
        let ax = self.axis(dim)?;
        let len = self.dims[ax].len();
        for (_, members) in groups {
            if let Some(&index) = members.iter().find(|&&ix| ix >= len) {
                return Err(DatasetError::IndexOutOfBounds {
                    dim: String::from(dim),
                    index,
                    len,
                });
            }
        }

        let mut out = self.clone();
        out.dims[ax] = groups.iter().map(|(label, _)| label.clone()).collect();
        out.validate_labels()?;
        let mut shape = self.shape();
        shape[ax] = groups.len();

        for (name, arr) in out.layers.iter_mut() {
            let source = &self.layers[name];
            let mut new_arr = ArrayD::from_elem(IxDyn(&shape), f64::NAN);
            for (gx, (_, members)) in groups.iter().enumerate() {
                let reduced = source
                    .select(Axis(ax), members)
                    .map_axis(Axis(ax), |lane| f(&lane.to_vec()));
                new_arr.index_axis_mut(Axis(ax), gx).assign(&reduced);
            }
            *arr = new_arr;
        }
        Ok(out)
    }

    fn validate_labels(&self) -> Result<(), DatasetError> {
        for (dim, labels) in self.dims.iter() {
            if let Some(label) = first_duplicate(labels.iter()) {
                return Err(DatasetError::DuplicateLabel {
                    dim: dim.clone(),
                    label: label.clone(),
                });
            }
        }
        Ok(())
    }

    /// Replace or add a layer. The array must have the dataset's shape.
    pub fn with_layer(
        &self,
        name: &str,
        arr: ArrayD<f64>,
    ) -> Result<Dataset, DatasetError> {
        if self.dims.contains_key(name) || self.scope.contains_key(name) {
            return Err(DatasetError::KeyCollision(String::from(name)));
        }
        let mut out = self.clone();
        out.layers.insert(String::from(name), arr);
        out.validate()?;
        Ok(out)
    }

    /// Broadcast `layer` over `dims`.
    ///
    /// Every dim of this dataset must appear in `dims` with identical labels.
    /// Dims missing from this dataset are added and the data repeated along
    /// them. The result has one axis per entry of `dims`, in order.
    pub fn broadcast_layer(
        &self,
        layer: &str,
        dims: &IndexMap<String, Vec<String>>,
    ) -> Result<ArrayD<f64>, DatasetError> {
        let mut arr = self.try_layer(layer)?.clone();
        let mut own: Vec<&str> = self.dim_names();
        for (dim, labels) in self.dims.iter() {
            match dims.get(dim) {
                Some(target) if target == labels => (),
                Some(_) => return Err(DatasetError::LabelMismatch(dim.clone())),
                None => {
                    return Err(DatasetError::DimMismatch {
                        left: self.dims.keys().cloned().collect(),
                        right: dims.keys().cloned().collect(),
                    })
                }
            }
        }
        for dim in dims.keys() {
            if !self.dims.contains_key(dim) {
                let n = arr.ndim();
                arr = arr.insert_axis(Axis(n));
                own.push(dim.as_str());
            }
        }
        let axes: Vec<usize> = dims
            .keys()
            .map(|dim| own.iter().position(|d| d == dim).unwrap_or_default())
            .collect();
        let permuted = arr.permuted_axes(IxDyn(&axes));
        let shape: Vec<usize> = dims.values().map(Vec::len).collect();
        let broadcast = permuted.broadcast(IxDyn(&shape)).ok_or_else(|| {
            DatasetError::ShapeMismatch {
                layer: String::from(layer),
                expected: shape.clone(),
                found: permuted.shape().to_vec(),
            }
        })?;
        Ok(broadcast.as_standard_layout().into_owned())
    }

    /// Broadcast every layer over `dims`, as [`Dataset::broadcast_layer`]
    /// does for one. Scope and attrs are kept.
    pub fn broadcast(
        &self,
        dims: &IndexMap<String, Vec<String>>,
    ) -> Result<Dataset, DatasetError> {
        let layers = self
            .layers
            .keys()
            .map(|name| Ok((name.clone(), self.broadcast_layer(name, dims)?)))
            .collect::<Result<IndexMap<String, ArrayD<f64>>, DatasetError>>()?;
        let mut out = Dataset::new(dims.clone(), layers, self.scope.clone())?;
        out.attrs = self.attrs.clone();
        Ok(out)
    }
}
