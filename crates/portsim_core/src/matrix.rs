//! Dense matrices and correlation/covariance reconstruction
//!
//! Correlation input is only trusted in its lower triangle (diagonal included).
//! [`symmetrize`] mirrors that triangle into a full symmetric matrix and
//! [`covariance`] scales it by the per-asset standard deviations.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Owned, resizable, row-major matrix of `f64`.
///
/// Serializes as a sequence of rows so that documents stay readable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    #[must_use]
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    /// Build from nested rows. Fails if rows have different lengths.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ValidationError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != n_cols {
                return Err(ValidationError::RaggedMatrix {
                    row,
                    expected: n_cols,
                    actual: values.len(),
                });
            }
            data.extend(values);
        }
        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[must_use]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    #[must_use]
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.rows.min(self.cols)).map(|i| self.get(i, i)).collect()
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t.set(j, i, self.get(i, j));
            }
        }
        t
    }

    /// Copy of the lower triangle (diagonal included); entries above are zero.
    #[must_use]
    pub fn lower_triangle(&self) -> Self {
        let mut l = Self::zeros(self.rows, self.cols);
        for i in 0..self.rows {
            for j in 0..self.cols.min(i + 1) {
                l.set(i, j, self.get(i, j));
            }
        }
        l
    }

    /// Exact elementwise symmetry check.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        self.is_square()
            && (0..self.rows).all(|i| (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Insert a row of `fill` values before `index`.
    pub fn insert_row(&mut self, index: usize, fill: f64) {
        assert!(index <= self.rows, "row index {index} out of bounds");
        let at = index * self.cols;
        self.data.splice(at..at, std::iter::repeat_n(fill, self.cols));
        self.rows += 1;
    }

    /// Insert a column of `fill` values before `index`.
    pub fn insert_col(&mut self, index: usize, fill: f64) {
        assert!(index <= self.cols, "column index {index} out of bounds");
        let new_cols = self.cols + 1;
        let mut data = Vec::with_capacity(self.rows * new_cols);
        for r in 0..self.rows {
            let row = &self.data[r * self.cols..(r + 1) * self.cols];
            data.extend_from_slice(&row[..index]);
            data.push(fill);
            data.extend_from_slice(&row[index..]);
        }
        self.data = data;
        self.cols = new_cols;
    }

    pub fn remove_row(&mut self, index: usize) {
        assert!(index < self.rows, "row index {index} out of bounds");
        let at = index * self.cols;
        self.data.drain(at..at + self.cols);
        self.rows -= 1;
    }

    pub fn remove_col(&mut self, index: usize) {
        assert!(index < self.cols, "column index {index} out of bounds");
        let cols = self.cols;
        let mut c = 0usize;
        self.data.retain(|_| {
            let keep = c % cols != index;
            c += 1;
            keep
        });
        self.cols -= 1;
    }

    /// Append one trailing row and column: `diag` on the new diagonal, `fill` elsewhere.
    pub fn grow(&mut self, diag: f64, fill: f64) {
        self.insert_col(self.cols, fill);
        self.insert_row(self.rows, fill);
        let n = self.rows - 1;
        if n < self.cols {
            self.set(n, n, diag);
        }
    }

    /// Drop the trailing row and column.
    pub fn shrink(&mut self) {
        if self.rows > 0 {
            self.remove_row(self.rows - 1);
        }
        if self.cols > 0 {
            self.remove_col(self.cols - 1);
        }
    }

    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = ValidationError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Matrix::from_rows(rows)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(m: Matrix) -> Self {
        m.to_rows()
    }
}

/// `L + Lᵀ − diag(L)` where `L` is the lower triangle of `m`.
///
/// Entries above the diagonal are replaced by their mirrored lower entries;
/// the diagonal is kept as is.
#[must_use]
pub fn symmetrize(m: &Matrix) -> Matrix {
    let l = m.lower_triangle();
    let lt = l.transpose();
    let mut out = Matrix::zeros(m.rows(), m.cols());
    for i in 0..m.rows() {
        for j in 0..m.cols() {
            // missing for non-square input
            let mirrored = if i < lt.rows() && j < lt.cols() {
                lt.get(i, j)
            } else {
                0.0
            };
            let diag = if i == j { l.get(i, j) } else { 0.0 };
            out.set(i, j, l.get(i, j) + mirrored - diag);
        }
    }
    out
}

/// `cov[i,j] = cor[i,j] * (stds[i] * stds[j])`, symmetric whenever `cor` is.
///
/// # Panics
/// If `cor` is not `stds.len()` square.
#[must_use]
pub fn covariance(cor: &Matrix, stds: &[f64]) -> Matrix {
    assert_eq!(
        cor.shape(),
        (stds.len(), stds.len()),
        "correlation shape does not match stds"
    );
    let mut cov = Matrix::zeros(cor.rows(), cor.cols());
    for i in 0..cor.rows() {
        for j in 0..cor.cols() {
            cov.set(i, j, cor.get(i, j) * (stds[i] * stds[j]));
        }
    }
    cov
}

/// Lower-triangular factor `L` with `L·Lᵀ ≈ a`.
#[derive(Debug, Clone)]
pub struct Cholesky {
    pub factor: Matrix,
    /// Set when a pivot came out negative, i.e. the input was not positive semi-definite
    pub not_psd: bool,
}

/// Tolerance below which a negative pivot is treated as rounding noise.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Cholesky factorization that never fails.
///
/// Non-positive pivots produce a zero column, so semi-definite inputs
/// (zero variance, perfect correlation) factor exactly and non-PSD inputs
/// yield a degenerate factor instead of an error.
#[must_use]
pub fn cholesky(a: &Matrix) -> Cholesky {
    let n = a.rows();
    let mut l = Matrix::zeros(n, n);
    let mut not_psd = false;

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l.get(i, k) * l.get(j, k);
            }

            if i == j {
                let pivot = a.get(i, i) - sum;
                if pivot > 0.0 {
                    l.set(i, i, pivot.sqrt());
                } else if pivot < -PIVOT_TOLERANCE {
                    not_psd = true;
                }
            } else {
                let l_jj = l.get(j, j);
                if l_jj > 0.0 {
                    l.set(i, j, (a.get(i, j) - sum) / l_jj);
                }
            }
        }
    }

    Cholesky { factor: l, not_psd }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square(n: usize, values: &[f64]) -> Matrix {
        Matrix::from_rows(values.chunks(n).map(<[f64]>::to_vec).collect()).unwrap()
    }

    #[test]
    fn test_symmetrize_mirrors_lower_triangle() {
        let m = square(3, &[1.0, 9.0, 9.0, 0.2, 1.0, 9.0, -0.3, 0.4, 1.0]);
        let s = symmetrize(&m);

        assert_eq!(
            s.to_rows(),
            vec![
                vec![1.0, 0.2, -0.3],
                vec![0.2, 1.0, 0.4],
                vec![-0.3, 0.4, 1.0],
            ]
        );
    }

    #[test]
    fn test_transpose() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let t = m.transpose();

        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.to_rows(), vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
        assert_eq!(t.transpose(), m);
    }

    #[test]
    fn test_covariance_diagonal_is_variance() {
        let cor = square(2, &[1.0, 0.5, 0.5, 1.0]);
        let cov = covariance(&cor, &[0.1, 0.2]);

        assert_eq!(cov.get(0, 0), 0.1 * 0.1);
        assert_eq!(cov.get(1, 1), 0.2 * 0.2);
        assert_eq!(cov.get(0, 1), 0.5 * (0.1 * 0.2));
        assert!(cov.is_symmetric());
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RaggedMatrix {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_grow_and_shrink() {
        let original = square(2, &[1.0, 0.3, 0.3, 1.0]);
        let mut m = original.clone();

        m.grow(1.0, 0.0);
        assert_eq!(
            m.to_rows(),
            vec![
                vec![1.0, 0.3, 0.0],
                vec![0.3, 1.0, 0.0],
                vec![0.0, 0.0, 1.0],
            ]
        );

        m.shrink();
        assert_eq!(m, original);
    }

    #[test]
    fn test_insert_and_remove_interior() {
        let mut m = square(2, &[1.0, 2.0, 3.0, 4.0]);
        m.insert_col(1, 7.0);
        m.insert_row(1, 8.0);
        assert_eq!(
            m.to_rows(),
            vec![
                vec![1.0, 7.0, 2.0],
                vec![8.0, 8.0, 8.0],
                vec![3.0, 7.0, 4.0],
            ]
        );
        m.remove_row(1);
        m.remove_col(1);
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_cholesky_reconstructs_input() {
        let cov = square(2, &[0.04, 0.006, 0.006, 0.09]);
        let chol = cholesky(&cov);
        let l = &chol.factor;

        assert!(!chol.not_psd);
        for i in 0..2 {
            for j in 0..2 {
                let v: f64 = (0..2).map(|k| l.get(i, k) * l.get(j, k)).sum();
                assert!((v - cov.get(i, j)).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn test_cholesky_zero_and_non_psd() {
        let zero = cholesky(&Matrix::zeros(3, 3));
        assert!(!zero.not_psd);
        assert_eq!(zero.factor, Matrix::zeros(3, 3));

        // |rho| > 1 is not a valid correlation
        let bad = cholesky(&square(2, &[1.0, 1.5, 1.5, 1.0]));
        assert!(bad.not_psd);
        assert!(bad.factor.data.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_serde_shape() {
        let m = square(2, &[1.0, 0.1, 0.1, 1.0]);
        let rows: Vec<Vec<f64>> = m.clone().into();
        assert_eq!(Matrix::try_from(rows).unwrap(), m);
    }

    fn arb_square() -> impl Strategy<Value = Matrix> {
        (1usize..6).prop_flat_map(|n| {
            prop::collection::vec(-10.0f64..10.0, n * n).prop_map(move |v| square(n, &v))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_symmetrize_is_symmetric_and_keeps_lower(m in arb_square()) {
            let s = symmetrize(&m);
            prop_assert!(s.is_symmetric());
            prop_assert_eq!(s.lower_triangle(), m.lower_triangle());
        }

        #[test]
        fn prop_covariance_symmetric_for_symmetric_cor(
            m in arb_square(),
            seed in prop::collection::vec(0.0f64..1.0, 6),
        ) {
            let cor = symmetrize(&m);
            let stds = &seed[..cor.rows()];
            let cov = covariance(&cor, stds);
            prop_assert!(cov.is_symmetric());
            for (i, s) in stds.iter().enumerate() {
                prop_assert_eq!(cov.get(i, i), cor.get(i, i) * (s * s));
            }
        }
    }
}
