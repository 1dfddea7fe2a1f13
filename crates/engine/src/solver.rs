//! Dense symmetric positive-definite solve.

use ndarray::{Array1, Array2};

/// Pivots at or below this fraction of the largest diagonal entry are
/// treated as zero.
const RELATIVE_PIVOT_TOLERANCE: f64 = 1e-10;

/// Solve `A x = b` for symmetric positive-definite `A` by Cholesky
/// decomposition (`A = L Lᵀ`, then forward and back substitution).
///
/// Returns `None` when `A` is not numerically positive definite.
pub fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let max_diag = (0..n).map(|i| a[[i, i]]).fold(0.0_f64, f64::max);
    let tolerance = RELATIVE_PIVOT_TOLERANCE * max_diag;

    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if !diag.is_finite() || diag <= tolerance {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Lᵀ x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_solves_spd_system() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![2.0, 1.0];
        let x = cholesky_solve(&a, &b).unwrap();

        let residual = a.dot(&x) - &b;
        assert!(residual.iter().all(|r| r.abs() < 1e-12));
    }

    #[test]
    fn test_rank_deficient_is_rejected() {
        // Outer product of one vector: rank 1
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        assert!(cholesky_solve(&a, &b).is_none());
    }

    #[test]
    fn test_zero_matrix_is_rejected() {
        let a = Array2::<f64>::zeros((3, 3));
        let b = Array1::<f64>::zeros(3);
        assert!(cholesky_solve(&a, &b).is_none());
    }
}
