//! Correlated noise generator shared by every market of a run.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use pricer_core::cache::{CacheKey, KeyPart, MemoCache};
use pricer_core::math::{CholeskyFactor, CorrelationMatrix, Matrix};
use pricer_core::traits::NoiseSource;
use pricer_core::types::{SimDate, SimulationError};
use tracing::{debug, trace};

use super::sampling::SamplingStrategy;

const ALL_NOISES: &str = "all_noises";
const NOISES: &str = "noises";

/// Draws one correlated `n_noises × n_sims` matrix per date.
///
/// Raw draws come from the sampling strategy `S` and are correlated with the
/// Cholesky factor of the correlation matrix, computed once at construction.
/// Every request for the same date, whatever the identifiers, is served from
/// the same draw.
///
/// # Examples
///
/// ```rust
/// use pricer_core::math::CorrelationMatrix;
/// use pricer_core::traits::NoiseSource;
/// use pricer_core::types::SimDate;
/// use pricer_pricing::rng::{IndependentGaussian, NoiseGenerator};
///
/// let correlation = CorrelationMatrix::new(&[1.0, 0.5, 0.5, 1.0], 2).unwrap();
/// let generator =
///     NoiseGenerator::new(1_000, correlation, ["a", "b"], IndependentGaussian::new(42)).unwrap();
///
/// let date = SimDate::new(1.0).unwrap();
/// let all = generator.all_noises(date).unwrap();
/// let b = generator.noises(date, &["b".to_string()]).unwrap();
/// assert_eq!(b.row(0), all.row(1));
/// ```
pub struct NoiseGenerator<S = Box<dyn SamplingStrategy>> {
    n_sims: usize,
    ids: Vec<String>,
    positions: HashMap<String, usize>,
    correlation: CorrelationMatrix,
    cholesky: CholeskyFactor,
    sampler: RefCell<S>,
    cache: MemoCache<Rc<Matrix>>,
}

impl<S: SamplingStrategy> NoiseGenerator<S> {
    /// Creates a generator over `noise_ids`, rows ordered as given.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidParameter`] if `n_sims` is zero
    /// - [`SimulationError::InvalidConfig`] if the identifier count differs
    ///   from the matrix dimension or an identifier is repeated
    /// - [`SimulationError::Correlation`] if the matrix is not positive definite
    pub fn new<I, T>(
        n_sims: usize,
        correlation: CorrelationMatrix,
        noise_ids: I,
        sampler: S,
    ) -> Result<Self, SimulationError>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        if n_sims == 0 {
            return Err(SimulationError::invalid_parameter(
                "n_sims",
                "at least one path is required",
            ));
        }
        let ids: Vec<String> = noise_ids.into_iter().map(Into::into).collect();
        if ids.len() != correlation.dim() {
            return Err(SimulationError::InvalidConfig(format!(
                "{} noise identifiers for a {}x{} correlation matrix",
                ids.len(),
                correlation.dim(),
                correlation.dim()
            )));
        }
        {
            let mut seen = HashSet::with_capacity(ids.len());
            if let Some(duplicate) = ids.iter().find(|id| !seen.insert(id.as_str())) {
                return Err(SimulationError::InvalidConfig(format!(
                    "duplicate noise identifier '{}'",
                    duplicate
                )));
            }
        }
        let cholesky = correlation.cholesky()?;
        let positions = ids
            .iter()
            .enumerate()
            .map(|(position, id)| (id.clone(), position))
            .collect();

        Ok(Self {
            n_sims,
            ids,
            positions,
            correlation,
            cholesky,
            sampler: RefCell::new(sampler),
            cache: MemoCache::new(),
        })
    }

    /// Target correlation matrix.
    pub fn correlation(&self) -> &CorrelationMatrix {
        &self.correlation
    }

    /// Lower-triangular Cholesky factor of the correlation matrix.
    pub fn cholesky(&self) -> &CholeskyFactor {
        &self.cholesky
    }

    /// Name of the sampling strategy.
    pub fn sampler_name(&self) -> &'static str {
        self.sampler.borrow().name()
    }

    /// Correlated draw of every identifier for `date`, `n_noises × n_sims`.
    ///
    /// # Errors
    ///
    /// Propagates sampling errors (odd path count, dimension limits).
    pub fn all_noises(&self, date: SimDate) -> Result<Rc<Matrix>, SimulationError> {
        self.cache.memoize(date, CacheKey::op(ALL_NOISES), || {
            let n_noises = self.ids.len();
            let mut sampler = self.sampler.borrow_mut();
            let raw = sampler.sample(n_noises, self.n_sims)?;
            if raw.rows() != n_noises || raw.cols() != self.n_sims {
                return Err(SimulationError::ShapeMismatch {
                    expected: n_noises * self.n_sims,
                    got: raw.rows() * raw.cols(),
                });
            }
            debug!(
                %date,
                sampler = sampler.name(),
                n_noises,
                n_sims = self.n_sims,
                "drawing correlated noise"
            );
            Ok(Rc::new(self.cholesky.correlate(&raw)?))
        })
    }

    /// Rows of `ids`, in that order, of the draw for `date`.
    ///
    /// # Errors
    ///
    /// [`SimulationError::UnknownNoise`] for an identifier not known to the
    /// generator.
    pub fn noises(&self, date: SimDate, ids: &[String]) -> Result<Rc<Matrix>, SimulationError> {
        if ids == self.ids.as_slice() {
            return self.all_noises(date);
        }
        let rows = ids
            .iter()
            .map(|id| {
                self.positions
                    .get(id)
                    .copied()
                    .ok_or_else(|| SimulationError::UnknownNoise(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let key = CacheKey::new(NOISES, ids.iter().map(|id| KeyPart::from(id.as_str())).collect());
        self.cache.memoize(date, key, || {
            trace!(%date, ?ids, "selecting noise rows");
            let all = self.all_noises(date)?;
            Ok(Rc::new(all.select_rows(&rows)))
        })
    }
}

impl<S: SamplingStrategy> NoiseSource for NoiseGenerator<S> {
    fn n_sims(&self) -> usize {
        self.n_sims
    }

    fn noise_ids(&self) -> &[String] {
        &self.ids
    }

    fn noises(&self, date: SimDate, ids: &[String]) -> Result<Rc<Matrix>, SimulationError> {
        NoiseGenerator::noises(self, date, ids)
    }
}

impl<S> fmt::Debug for NoiseGenerator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseGenerator")
            .field("n_sims", &self.n_sims)
            .field("ids", &self.ids)
            .field("correlation", &self.correlation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{AntitheticGaussian, IndependentGaussian, QmcSequence, QuasiRandom};
    use approx::assert_relative_eq;
    use std::cell::Cell;

    fn date(t: f64) -> SimDate {
        SimDate::new(t).unwrap()
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Counts how often the generator asks for fresh draws.
    struct Counting {
        inner: IndependentGaussian,
        calls: Rc<Cell<usize>>,
    }

    impl SamplingStrategy for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn sample(&mut self, n_noises: usize, n_sims: usize) -> Result<Matrix, SimulationError> {
            self.calls.set(self.calls.get() + 1);
            self.inner.sample(n_noises, n_sims)
        }
    }

    fn correlation_3() -> CorrelationMatrix {
        CorrelationMatrix::new(&[1.0, 0.6, 0.2, 0.6, 1.0, -0.3, 0.2, -0.3, 1.0], 3).unwrap()
    }

    #[test]
    fn test_rejects_invalid_configuration() {
        let identity = CorrelationMatrix::identity(2);
        assert!(matches!(
            NoiseGenerator::new(0, identity.clone(), ["a", "b"], IndependentGaussian::new(1)),
            Err(SimulationError::InvalidParameter { name: "n_sims", .. })
        ));
        assert!(matches!(
            NoiseGenerator::new(10, identity.clone(), ["a"], IndependentGaussian::new(1)),
            Err(SimulationError::InvalidConfig(_))
        ));
        assert!(matches!(
            NoiseGenerator::new(10, identity, ["a", "a"], IndependentGaussian::new(1)),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_definite() {
        // A perfectly correlated pair passes validation but cannot be factorised.
        let singular = CorrelationMatrix::new(&[1.0, 1.0, 1.0, 1.0], 2).unwrap();
        assert!(matches!(
            NoiseGenerator::new(10, singular, ["a", "b"], IndependentGaussian::new(1)),
            Err(SimulationError::Correlation(_))
        ));
    }

    #[test]
    fn test_one_draw_per_date() {
        let calls = Rc::new(Cell::new(0));
        let sampler = Counting {
            inner: IndependentGaussian::new(5),
            calls: Rc::clone(&calls),
        };
        let generator = NoiseGenerator::new(100, correlation_3(), ["x", "y", "z"], sampler).unwrap();

        let d1 = date(0.5);
        let all = generator.all_noises(d1).unwrap();
        let x = generator.noises(d1, &ids(&["x"])).unwrap();
        let zy = generator.noises(d1, &ids(&["z", "y"])).unwrap();
        let again = generator.all_noises(d1).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Rc::ptr_eq(&all, &again));
        assert_eq!(x.row(0), all.row(0));
        assert_eq!(zy.row(0), all.row(2));
        assert_eq!(zy.row(1), all.row(1));

        let next = generator.noises(date(1.0), &ids(&["y"])).unwrap();
        assert_eq!(calls.get(), 2);
        assert_ne!(next.row(0), all.row(1));
    }

    #[test]
    fn test_unknown_identifier() {
        let generator =
            NoiseGenerator::new(4, CorrelationMatrix::identity(1), ["x"], IndependentGaussian::new(1))
                .unwrap();
        assert!(matches!(
            generator.noises(date(1.0), &ids(&["x", "w"])),
            Err(SimulationError::UnknownNoise(id)) if id == "w"
        ));
    }

    #[test]
    fn test_empirical_correlation_converges() {
        let target = correlation_3();
        let generator =
            NoiseGenerator::new(200_000, target.clone(), ["x", "y", "z"], IndependentGaussian::new(11))
                .unwrap();
        let noise = generator.all_noises(date(1.0)).unwrap();
        let n = noise.cols() as f64;
        for i in 0..3 {
            for j in 0..3 {
                let cov: f64 = noise
                    .row(i)
                    .iter()
                    .zip(noise.row(j))
                    .map(|(a, b)| a * b)
                    .sum::<f64>()
                    / n;
                assert_relative_eq!(cov, target.get(i, j), epsilon = 0.02);
            }
        }
    }

    #[test]
    fn test_antithetic_survives_correlation() {
        let generator =
            NoiseGenerator::new(8, correlation_3(), ["x", "y", "z"], AntitheticGaussian::new(2))
                .unwrap();
        let noise = generator.all_noises(date(1.0)).unwrap();
        for row in noise.iter_rows() {
            for j in 0..4 {
                assert_relative_eq!(row[4 + j], -row[j], epsilon = 1e-14);
            }
        }
        let odd =
            NoiseGenerator::new(7, correlation_3(), ["x", "y", "z"], AntitheticGaussian::new(2))
                .unwrap();
        assert!(matches!(odd.all_noises(date(1.0)), Err(SimulationError::OddPathCount(7))));
    }

    #[test]
    fn test_boxed_strategy_and_noise_source() {
        let sampler: Box<dyn SamplingStrategy> = Box::new(QuasiRandom::new(QmcSequence::Halton));
        let generator: NoiseGenerator =
            NoiseGenerator::new(16, CorrelationMatrix::identity(2), ["a", "b"], sampler).unwrap();
        assert_eq!(generator.sampler_name(), "halton");

        let source: &dyn NoiseSource = &generator;
        assert_eq!(source.n_sims(), 16);
        assert_eq!(source.noise_ids(), ids(&["a", "b"]).as_slice());
        let b = source.noises(date(0.25), &ids(&["b"])).unwrap();
        assert_eq!((b.rows(), b.cols()), (1, 16));
    }
}
