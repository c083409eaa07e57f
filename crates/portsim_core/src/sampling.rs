//! Random growth factors and trajectory generation
//!
//! Each trajectory owns a `SmallRng` seeded from the run seed and its index,
//! so trajectories can be generated in any order (or in parallel) and still
//! produce the same tensor.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, StandardNormal};
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::SimError;
use crate::matrix::{Matrix, cholesky};

/// Independent normal growth factors with mean `1 + profit`.
pub fn growth_distribution(profit: f64, risk: f64) -> Result<Normal<f64>, SimError> {
    let mean = 1.0 + profit;
    Normal::new(mean, risk).map_err(|_| SimError::InvalidDistribution {
        mean,
        std_dev: risk,
        reason: "std_dev must be non-negative and finite",
    })
}

/// Multivariate normal sampler: `mean + L·z` with `L` the Cholesky factor of `cov`.
#[derive(Debug, Clone)]
pub struct MultivariateNormal {
    mean: Vec<f64>,
    factor: Matrix,
    not_psd: bool,
}

impl MultivariateNormal {
    /// # Panics
    /// If `cov` is not `mean.len()` square.
    #[must_use]
    pub fn new(mean: Vec<f64>, cov: &Matrix) -> Self {
        assert_eq!(cov.shape(), (mean.len(), mean.len()));
        let chol = cholesky(cov);
        Self {
            mean,
            factor: chol.factor,
            not_psd: chol.not_psd,
        }
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Whether the covariance was found not to be positive semi-definite
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.not_psd
    }

    /// Draw one joint sample into `out` using `z` as scratch space.
    pub fn sample_into<R: Rng + ?Sized>(&self, rng: &mut R, z: &mut [f64], out: &mut [f64]) {
        let n = self.dim();
        for zi in z.iter_mut().take(n) {
            *zi = StandardNormal.sample(rng);
        }
        for i in 0..n {
            let row = self.factor.row(i);
            let shock: f64 = row[..=i].iter().zip(&z[..=i]).map(|(l, z)| l * z).sum();
            out[i] = self.mean[i] + shock;
        }
    }
}

fn trajectory<F>(run_seed: u64, path_len: usize, fill: &F, index: usize) -> Vec<f64>
where
    F: Fn(&mut SmallRng, &mut [f64]),
{
    let mut rng = SmallRng::seed_from_u64(run_seed.wrapping_add(index as u64));
    let mut path = vec![0.0; path_len];
    fill(&mut rng, &mut path);
    path
}

#[cfg(any(test, not(feature = "parallel")))]
fn generate_paths_serial<F>(size: usize, run_seed: u64, path_len: usize, fill: &F) -> Vec<Vec<f64>>
where
    F: Fn(&mut SmallRng, &mut [f64]),
{
    (0..size)
        .map(|s| trajectory(run_seed, path_len, fill, s))
        .collect()
}

#[cfg(feature = "parallel")]
fn generate_paths_parallel<F>(
    size: usize,
    run_seed: u64,
    path_len: usize,
    fill: &F,
) -> Vec<Vec<f64>>
where
    F: Fn(&mut SmallRng, &mut [f64]) + Sync,
{
    (0..size)
        .into_par_iter()
        .map(|s| trajectory(run_seed, path_len, fill, s))
        .collect()
}

/// Generate `size` trajectories of `path_len` values each.
///
/// `fill` receives a trajectory-local rng and the buffer to fill. The output
/// is the same with or without the `parallel` feature.
pub(crate) fn generate_paths<F>(
    size: usize,
    run_seed: u64,
    path_len: usize,
    fill: F,
) -> Vec<Vec<f64>>
where
    F: Fn(&mut SmallRng, &mut [f64]) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        generate_paths_parallel(size, run_seed, path_len, &fill)
    }
    #[cfg(not(feature = "parallel"))]
    {
        generate_paths_serial(size, run_seed, path_len, &fill)
    }
}

/// Reorder trajectory-major paths (`[trajectory][period, k]`) into a
/// period-major tensor (`[period, trajectory, k]`).
pub(crate) fn period_major(paths: &[Vec<f64>], years: usize, stride: usize) -> Vec<f64> {
    let size = paths.len();
    let mut out = vec![0.0; years * size * stride];
    for (s, path) in paths.iter().enumerate() {
        for t in 0..years {
            let src = &path[t * stride..(t + 1) * stride];
            let at = (t * size + s) * stride;
            out[at..at + stride].copy_from_slice(src);
        }
    }
    out
}
