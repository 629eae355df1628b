//! NaN-aware summaries over slices. Missing values are stored as `NaN` and
//! are skipped; a slice with no present values summarizes to `NaN`.

fn present(xs: &[f64]) -> impl Iterator<Item = f64> + '_ {
    xs.iter().copied().filter(|x| !x.is_nan())
}

/// Sum of the non-missing values
pub fn nansum(xs: &[f64]) -> f64 {
    let mut n = 0_usize;
    let sum = present(xs).fold(0.0, |acc, x| {
        n += 1;
        acc + x
    });
    if n == 0 {
        f64::NAN
    } else {
        sum
    }
}

/// Mean of the non-missing values
pub fn nanmean(xs: &[f64]) -> f64 {
    let (n, sum) = present(xs).fold((0_usize, 0.0), |(n, s), x| (n + 1, s + x));
    if n == 0 {
        f64::NAN
    } else {
        sum / n as f64
    }
}

/// Population standard deviation of the non-missing values
pub fn nanstd(xs: &[f64]) -> f64 {
    let mean = nanmean(xs);
    if mean.is_nan() {
        return f64::NAN;
    }
    let (n, ss) = present(xs)
        .fold((0_usize, 0.0), |(n, s), x| (n + 1, (x - mean).mul_add(x - mean, s)));
    (ss / n as f64).sqrt()
}

/// Minimum of the non-missing values
pub fn nanmin(xs: &[f64]) -> f64 {
    present(xs).fold(f64::NAN, |acc, x| if acc.is_nan() || x < acc { x } else { acc })
}

/// Maximum of the non-missing values
pub fn nanmax(xs: &[f64]) -> f64 {
    present(xs).fold(f64::NAN, |acc, x| if acc.is_nan() || x > acc { x } else { acc })
}

/// Returns `true` if every value is missing
pub fn all_nan(xs: &[f64]) -> bool {
    xs.iter().all(|x| x.is_nan())
}
