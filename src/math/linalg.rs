//! Small dense linear algebra helpers on top of nalgebra.
//!
//! All matrices here are tiny (at most a handful of variables), so clarity wins
//! over avoiding clones.

use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Eigenvalues below this are treated as zero when inverting a covariance.
const EIGEN_FLOOR: f64 = 1e-12;

/// `(M + Mᵀ) / 2`: removes round-off asymmetry before a symmetric solver.
pub fn symmetrize(m: &DMatrix<f64>) -> DMatrix<f64> {
    (m + m.transpose()) * 0.5
}

/// `ln |M|` for a symmetric positive definite matrix.
pub fn logdet_spd(m: &DMatrix<f64>) -> Option<f64> {
    let chol = m.clone().cholesky()?;
    let l = chol.l();
    let logdet = 2.0 * l.diagonal().iter().map(|d| d.ln()).sum::<f64>();
    logdet.is_finite().then_some(logdet)
}

/// `M^{-1/2}` for a symmetric positive definite matrix, via its eigen-decomposition.
pub fn inverse_sqrt_spd(m: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let eigen = SymmetricEigen::new(symmetrize(m));
    if eigen.eigenvalues.iter().any(|&l| !(l.is_finite() && l > EIGEN_FLOOR)) {
        return None;
    }
    let scale = DMatrix::from_diagonal(&eigen.eigenvalues.map(|l| 1.0 / l.sqrt()));
    Some(&eigen.eigenvectors * scale * eigen.eigenvectors.transpose())
}

/// Symmetric eigen-decomposition sorted by descending eigenvalue.
///
/// Column `i` of the returned matrix is the eigenvector of eigenvalue `i`.
pub fn sorted_symmetric_eigen(m: &DMatrix<f64>) -> (DVector<f64>, DMatrix<f64>) {
    let eigen = SymmetricEigen::new(symmetrize(m));
    let n = eigen.eigenvalues.len();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .partial_cmp(&eigen.eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let values = DVector::from_iterator(n, order.iter().map(|&i| eigen.eigenvalues[i]));
    let vectors = DMatrix::from_fn(n, n, |r, c| eigen.eigenvectors[(r, order[c])]);
    (values, vectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logdet_of_diagonal() {
        let m = DMatrix::from_diagonal(&DVector::from_row_slice(&[2.0, 3.0]));
        assert!((logdet_spd(&m).unwrap() - 6.0_f64.ln()).abs() < 1e-12);
        assert!(logdet_spd(&DMatrix::zeros(2, 2)).is_none());
    }

    #[test]
    fn inverse_sqrt_squares_to_inverse() {
        let m = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let s = inverse_sqrt_spd(&m).unwrap();
        let inv = m.clone().try_inverse().unwrap();
        assert!((&s * &s - inv).abs().max() < 1e-10);
    }

    #[test]
    fn eigen_sorted_descending() {
        let m = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 3.0]);
        let (values, vectors) = sorted_symmetric_eigen(&m);
        for (got, want) in values.iter().zip([5.0, 3.0, 1.0]) {
            assert!((got - want).abs() < 1e-12);
        }
        assert!((vectors[(1, 0)].abs() - 1.0).abs() < 1e-12);
    }
}
