//! Summary statistics over playtime.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Value at quantile `p` of an ascending slice.
///
/// Nearest-rank definition: the element at rank `ceil(p·n)`, clamped to
/// `[1, n]`. The result is always an observed value. Returns `None` for an
/// empty slice.
pub fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    let rank = (p * n as f64).ceil() as usize;
    Some(sorted[rank.clamp(1, n) - 1])
}

/// First and third quartile of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub q3: f64,
}

impl Quartiles {
    /// Quartiles of `values`, or `None` if there are none.
    pub fn of(mut values: Vec<f64>) -> Option<Self> {
        values.par_sort_unstable_by(f64::total_cmp);
        Some(Self {
            q1: quantile(&values, 0.25)?,
            q3: quantile(&values, 0.75)?,
        })
    }

    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Inclusive acceptance range `[Q1 - m·IQR, Q3 + m·IQR]`
    pub fn bounds(&self, multiplier: f64) -> (f64, f64) {
        let spread = multiplier * self.iqr();
        (self.q1 - spread, self.q3 + spread)
    }
}

/// Arithmetic mean, `None` when empty
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.par_iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_nearest_rank() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.25), Some(1.0));
        assert_eq!(quantile(&sorted, 0.5), Some(2.0));
        assert_eq!(quantile(&sorted, 0.75), Some(3.0));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_quartiles_unsorted_input() {
        let q = Quartiles::of(vec![9.0, 1.0, 5.0, 3.0, 7.0]).unwrap();
        // ranks ceil(1.25)=2 and ceil(3.75)=4
        assert_eq!(q.q1, 3.0);
        assert_eq!(q.q3, 7.0);
        assert_eq!(q.iqr(), 4.0);
        assert_eq!(q.bounds(2.0), (-5.0, 15.0));
    }

    #[test]
    fn test_degenerate_quartiles() {
        let q = Quartiles::of(vec![42.0; 10]).unwrap();
        assert_eq!(q.iqr(), 0.0);
        assert_eq!(q.bounds(2.0), (42.0, 42.0));
        assert!(Quartiles::of(Vec::new()).is_none());
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
        assert_eq!(mean(&[]), None);
    }
}
