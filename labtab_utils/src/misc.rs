use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;
use std::ops::AddAssign;
use std::str::FromStr;

/// Returns `true` if a label string stands for a missing value
pub fn is_missing_label(label: &str) -> bool {
    let trimmed = label.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

/// Attempt to turn a `&str` into a `T`
#[inline]
pub fn parse_result<T: FromStr>(x: &str) -> Result<Option<T>, T::Err> {
    // Empty cells are considered missing regardless of type
    if is_missing_label(x) {
        Ok(None)
    } else {
        x.trim().parse::<T>().map(Some)
    }
}

/// Cumulative sum of `xs`
///
/// # Example
///
/// ```rust
/// # use labtab_utils::cumsum;
/// assert_eq!(cumsum(&[1, 2, 3]), vec![1, 3, 6]);
/// ```
#[inline]
pub fn cumsum<T>(xs: &[T]) -> Vec<T>
where
    T: AddAssign + Clone,
{
    let mut summed: Vec<T> = xs.to_vec();
    for i in 1..xs.len() {
        let l = summed[i - 1].clone();
        summed[i] += l;
    }
    summed
}

/// The indices that would sort `xs` according to `cmp`. The sort is stable.
///
/// # Example
///
/// ```rust
/// # use labtab_utils::argsort_by;
/// let xs = vec!["c", "a", "b"];
/// assert_eq!(argsort_by(&xs, |a, b| a.cmp(b)), vec![1, 2, 0]);
/// ```
pub fn argsort_by<T, F>(xs: &[T], mut cmp: F) -> Vec<usize>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut ixs: Vec<usize> = (0..xs.len()).collect();
    ixs.sort_by(|&a, &b| cmp(&xs[a], &xs[b]));
    ixs
}

/// Collect the distinct items of an iterator in order of first appearance
///
/// # Example
///
/// ```rust
/// # use labtab_utils::unique_in_order;
/// let xs = vec![3, 1, 3, 2, 1];
/// assert_eq!(unique_in_order(xs), vec![3, 1, 2]);
/// ```
pub fn unique_in_order<T, I>(items: I) -> Vec<T>
where
    T: Hash + Eq + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen: HashSet<T> = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Returns the first duplicated item, if there is one
pub fn first_duplicate<'a, T, I>(items: I) -> Option<&'a T>
where
    T: Hash + Eq + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut seen: HashSet<&T> = HashSet::new();
    items.into_iter().find(|item| !seen.insert(*item))
}
