//! Descriptive statistics over finite samples
//!
//! Non-finite values (NaN, ±inf) are skipped, matching the way undefined
//! speeds (first row, zero time deltas) are excluded from model fitting.

/// Mean of the finite values, or `None` when there are none
pub fn finite_mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Unbiased (n - 1) variance of the finite values, or `None` with fewer than two
pub fn finite_variance(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return None;
    }
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    let ss: f64 = finite.iter().map(|v| (v - mean).powi(2)).sum();
    Some(ss / (finite.len() - 1) as f64)
}

/// First differences `values[i] - values[i - 1]`, with NaN in position 0
pub fn first_differences(values: &[f64]) -> Vec<f64> {
    std::iter::once(f64::NAN)
        .chain(values.windows(2).map(|w| w[1] - w[0]))
        .take(values.len())
        .collect()
}

/// Elementwise ratio `num / den`, NaN wherever `den` is zero or non-finite
pub fn safe_ratio(num: &[f64], den: &[f64]) -> Vec<f64> {
    num.iter()
        .zip(den)
        .map(|(n, d)| {
            if *d == 0.0 || !d.is_finite() {
                f64::NAN
            } else {
                n / d
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_mean_skips_nan() {
        assert_eq!(finite_mean(&[f64::NAN, 1.0, 3.0]), Some(2.0));
        assert_eq!(finite_mean(&[f64::NAN]), None);
    }

    #[test]
    fn test_finite_variance_unbiased() {
        let v = finite_variance(&[1.0, 2.0, 3.0, 4.0, f64::INFINITY]).unwrap();
        assert!((v - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(finite_variance(&[1.0]), None);
    }

    #[test]
    fn test_first_differences() {
        let d = first_differences(&[1.0, 3.0, 6.0]);
        assert!(d[0].is_nan());
        assert_eq!(&d[1..], &[2.0, 3.0]);
        assert!(first_differences(&[]).is_empty());
    }

    #[test]
    fn test_safe_ratio_zero_denominator() {
        let r = safe_ratio(&[1.0, 2.0], &[0.0, 4.0]);
        assert!(r[0].is_nan());
        assert_eq!(r[1], 0.5);
    }
}
