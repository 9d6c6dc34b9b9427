//! Low-discrepancy sequences for quasi-Monte Carlo sampling.
//!
//! Every sequence yields points in the open unit hypercube `(0, 1)^d` so that
//! they can be mapped through the inverse normal CDF without producing
//! infinities. Index 0 (the origin for Sobol, Halton and Faure) is skipped.
//!
//! | Sequence | Max dimension | Construction |
//! |----------|---------------|--------------|
//! | [`Sobol`] | 16 | Gray code, Joe-Kuo direction numbers |
//! | [`Halton`] | unbounded | radical inverse in the first primes |
//! | [`LeapedHalton`] | 79 | Halton indices `i · 409` (Kocis-Whiten) |
//! | [`VanDerCorput`] | unbounded | per-dimension digit counters |
//! | [`Hammersley`] | unbounded | `(i + ½)/n` then radical inverses |
//! | [`Faure`] | unbounded | Pascal matrix powers mod a prime base |

use pricer_core::types::SimulationError;

/// Interface of the low-discrepancy sequences.
///
/// Sequences are stateful iterators over points of the unit hypercube.
/// `reset` returns to the first point.
pub trait LowDiscrepancySequence {
    /// Number of coordinates of each point.
    fn dimension(&self) -> usize;

    /// Advances the sequence and returns the next point.
    ///
    /// The slice has `dimension()` values, each in the interval (0, 1).
    fn next_point(&mut self) -> &[f64];

    /// Resets the sequence to its initial state.
    fn reset(&mut self);

    /// Skips ahead by `n` points.
    fn skip(&mut self, n: usize) {
        for _ in 0..n {
            self.next_point();
        }
    }
}

/// First `n` prime numbers.
///
/// ```rust
/// use pricer_pricing::rng::first_primes;
///
/// assert_eq!(first_primes(5), vec![2, 3, 5, 7, 11]);
/// ```
pub fn first_primes(n: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(n);
    let mut candidate = 2u64;
    while primes.len() < n {
        if is_prime(candidate) {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut divisor = 2u64;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 1;
    }
    true
}

fn smallest_prime_at_least(n: u64) -> u64 {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

/// Radical inverse of `index` in `base`: the base-`b` digits of `index`
/// mirrored around the radix point.
///
/// ```rust
/// use pricer_pricing::rng::radical_inverse;
///
/// assert_eq!(radical_inverse(2, 1), 0.5);
/// assert_eq!(radical_inverse(2, 3), 0.75);
/// assert_eq!(radical_inverse(3, 1), 1.0 / 3.0);
/// ```
pub fn radical_inverse(base: u64, mut index: u64) -> f64 {
    let inv_base = 1.0 / base as f64;
    let mut factor = inv_base;
    let mut result = 0.0;
    while index > 0 {
        result += (index % base) as f64 * factor;
        index /= base;
        factor *= inv_base;
    }
    result
}

// ---------------------------------------------------------------------------
// Sobol
// ---------------------------------------------------------------------------

const SOBOL_BITS: usize = 32;

/// Joe-Kuo (new-joe-kuo-6.21201) parameters for dimensions 2..=16:
/// degree `s`, coefficient `a` and initial direction integers `m`.
const JOE_KUO: [(u32, u32, &[u32]); 15] = [
    (1, 0, &[1]),
    (2, 1, &[1, 3]),
    (3, 1, &[1, 3, 1]),
    (3, 2, &[1, 1, 1]),
    (4, 1, &[1, 1, 3, 3]),
    (4, 4, &[1, 3, 5, 13]),
    (5, 2, &[1, 1, 5, 5, 17]),
    (5, 4, &[1, 1, 5, 5, 5]),
    (5, 7, &[1, 1, 7, 11, 19]),
    (5, 11, &[1, 1, 5, 1, 1]),
    (5, 13, &[1, 1, 1, 3, 11]),
    (5, 14, &[1, 3, 5, 5, 31]),
    (6, 1, &[1, 3, 3, 9, 7, 49]),
    (6, 13, &[1, 1, 1, 15, 21, 21]),
    (6, 16, &[1, 3, 1, 13, 27, 49]),
];

/// Gray-code Sobol sequence with Joe-Kuo direction numbers.
///
/// The first dimension is the base-2 van der Corput sequence in Gray-code
/// order.
///
/// ```rust
/// use pricer_pricing::rng::{LowDiscrepancySequence, Sobol};
///
/// let mut sobol = Sobol::new(2).unwrap();
/// assert_eq!(sobol.next_point(), &[0.5, 0.5]);
/// assert_eq!(sobol.next_point(), &[0.75, 0.25]);
/// ```
#[derive(Clone, Debug)]
pub struct Sobol {
    directions: Vec<[u32; SOBOL_BITS]>,
    state: Vec<u32>,
    index: u32,
    point: Vec<f64>,
}

impl Sobol {
    /// Largest supported dimension.
    pub const MAX_DIMENSION: usize = JOE_KUO.len() + 1;

    /// Creates a sequence of `dimension` coordinates.
    ///
    /// # Errors
    ///
    /// [`SimulationError::DimensionLimit`] above [`Sobol::MAX_DIMENSION`].
    pub fn new(dimension: usize) -> Result<Self, SimulationError> {
        if dimension > Self::MAX_DIMENSION {
            return Err(SimulationError::DimensionLimit {
                strategy: "sobol",
                requested: dimension,
                max: Self::MAX_DIMENSION,
            });
        }
        let directions = (0..dimension).map(direction_numbers).collect();
        Ok(Self {
            directions,
            state: vec![0; dimension],
            index: 0,
            point: vec![0.0; dimension],
        })
    }
}

fn direction_numbers(dim: usize) -> [u32; SOBOL_BITS] {
    let mut v = [0u32; SOBOL_BITS];
    if dim == 0 {
        for (bit, value) in v.iter_mut().enumerate() {
            *value = 1 << (SOBOL_BITS - 1 - bit);
        }
        return v;
    }
    let (s, a, m) = JOE_KUO[dim - 1];
    let s = s as usize;
    for (bit, &m_i) in m.iter().enumerate() {
        v[bit] = m_i << (SOBOL_BITS - 1 - bit);
    }
    for bit in s..SOBOL_BITS {
        let mut value = v[bit - s] ^ (v[bit - s] >> s);
        for k in 1..s {
            if (a >> (s - 1 - k)) & 1 == 1 {
                value ^= v[bit - k];
            }
        }
        v[bit] = value;
    }
    v
}

impl LowDiscrepancySequence for Sobol {
    fn dimension(&self) -> usize {
        self.directions.len()
    }

    fn next_point(&mut self) -> &[f64] {
        // Gray code: flip the direction of the lowest zero bit of the old index.
        let bit = self.index.trailing_ones() as usize % SOBOL_BITS;
        self.index = self.index.wrapping_add(1);
        let scale = 1.0 / (1u64 << SOBOL_BITS) as f64;
        for ((x, directions), out) in self
            .state
            .iter_mut()
            .zip(&self.directions)
            .zip(self.point.iter_mut())
        {
            *x ^= directions[bit];
            *out = f64::from(*x) * scale;
        }
        &self.point
    }

    fn reset(&mut self) {
        self.state.iter_mut().for_each(|x| *x = 0);
        self.index = 0;
    }
}

// ---------------------------------------------------------------------------
// Halton family
// ---------------------------------------------------------------------------

/// Halton sequence: coordinate `j` of point `i` is the radical inverse of
/// `i` in the `j`-th prime.
#[derive(Clone, Debug)]
pub struct Halton {
    bases: Vec<u64>,
    index: u64,
    point: Vec<f64>,
}

impl Halton {
    /// Creates a Halton sequence of `dimension` coordinates.
    pub fn new(dimension: usize) -> Self {
        Self {
            bases: first_primes(dimension),
            index: 0,
            point: vec![0.0; dimension],
        }
    }
}

impl LowDiscrepancySequence for Halton {
    fn dimension(&self) -> usize {
        self.bases.len()
    }

    fn next_point(&mut self) -> &[f64] {
        self.index += 1;
        for (out, &base) in self.point.iter_mut().zip(&self.bases) {
            *out = radical_inverse(base, self.index);
        }
        &self.point
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn skip(&mut self, n: usize) {
        self.index += n as u64;
    }
}

/// Kocis-Whiten leaped Halton sequence.
///
/// Point `i` is the Halton point of index `i · 409`. The leap must be a prime
/// distinct from every base, which bounds the dimension by the 79 primes below
/// 409.
#[derive(Clone, Debug)]
pub struct LeapedHalton {
    bases: Vec<u64>,
    index: u64,
    point: Vec<f64>,
}

impl LeapedHalton {
    /// Leap between consecutive indices.
    pub const LEAP: u64 = 409;
    /// Largest supported dimension.
    pub const MAX_DIMENSION: usize = 79;

    /// Creates a leaped Halton sequence of `dimension` coordinates.
    ///
    /// # Errors
    ///
    /// [`SimulationError::DimensionLimit`] above [`LeapedHalton::MAX_DIMENSION`].
    pub fn new(dimension: usize) -> Result<Self, SimulationError> {
        if dimension > Self::MAX_DIMENSION {
            return Err(SimulationError::DimensionLimit {
                strategy: "leaped_halton",
                requested: dimension,
                max: Self::MAX_DIMENSION,
            });
        }
        Ok(Self {
            bases: first_primes(dimension),
            index: 0,
            point: vec![0.0; dimension],
        })
    }
}

impl LowDiscrepancySequence for LeapedHalton {
    fn dimension(&self) -> usize {
        self.bases.len()
    }

    fn next_point(&mut self) -> &[f64] {
        self.index += 1;
        let leaped = self.index * Self::LEAP;
        for (out, &base) in self.point.iter_mut().zip(&self.bases) {
            *out = radical_inverse(base, leaped);
        }
        &self.point
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn skip(&mut self, n: usize) {
        self.index += n as u64;
    }
}

/// Base-`b` digit counter of one van der Corput coordinate.
#[derive(Clone, Debug)]
struct DigitCounter {
    base: u64,
    // Least significant digit first.
    digits: Vec<u64>,
}

impl DigitCounter {
    fn increment(&mut self) {
        for digit in self.digits.iter_mut() {
            *digit += 1;
            if *digit < self.base {
                return;
            }
            *digit = 0;
        }
        self.digits.push(1);
    }

    fn value(&self) -> f64 {
        let inv_base = 1.0 / self.base as f64;
        let mut factor = inv_base;
        let mut result = 0.0;
        for &digit in &self.digits {
            result += digit as f64 * factor;
            factor *= inv_base;
        }
        result
    }
}

/// Van der Corput sequences in the first primes, one per dimension.
///
/// Digits are advanced by carry propagation instead of re-expanding the
/// index, and the result matches [`Halton`] point for point.
#[derive(Clone, Debug)]
pub struct VanDerCorput {
    counters: Vec<DigitCounter>,
    point: Vec<f64>,
}

impl VanDerCorput {
    /// Creates the sequence for `dimension` coordinates.
    pub fn new(dimension: usize) -> Self {
        let counters = first_primes(dimension)
            .into_iter()
            .map(|base| DigitCounter {
                base,
                digits: Vec::new(),
            })
            .collect();
        Self {
            counters,
            point: vec![0.0; dimension],
        }
    }
}

impl LowDiscrepancySequence for VanDerCorput {
    fn dimension(&self) -> usize {
        self.counters.len()
    }

    fn next_point(&mut self) -> &[f64] {
        for (counter, out) in self.counters.iter_mut().zip(self.point.iter_mut()) {
            counter.increment();
            *out = counter.value();
        }
        &self.point
    }

    fn reset(&mut self) {
        self.counters.iter_mut().for_each(|c| c.digits.clear());
    }
}

/// Hammersley point set of a known size.
///
/// The first coordinate of point `i` (from 0) is `(i + ½)/n`; the remaining
/// ones are radical inverses of `i + 1` in successive primes.
#[derive(Clone, Debug)]
pub struct Hammersley {
    bases: Vec<u64>,
    n_points: usize,
    index: usize,
    point: Vec<f64>,
}

impl Hammersley {
    /// Creates a Hammersley set of `n_points` points in `dimension` coordinates.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidParameter`] if `n_points` is zero.
    pub fn new(dimension: usize, n_points: usize) -> Result<Self, SimulationError> {
        if n_points == 0 {
            return Err(SimulationError::invalid_parameter(
                "n_points",
                "Hammersley set needs at least one point",
            ));
        }
        Ok(Self {
            bases: first_primes(dimension.saturating_sub(1)),
            n_points,
            index: 0,
            point: vec![0.0; dimension],
        })
    }
}

impl LowDiscrepancySequence for Hammersley {
    fn dimension(&self) -> usize {
        self.point.len()
    }

    fn next_point(&mut self) -> &[f64] {
        let i = self.index;
        self.index += 1;
        if let Some((first, rest)) = self.point.split_first_mut() {
            *first = (i as f64 + 0.5) / self.n_points as f64;
            for (out, &base) in rest.iter_mut().zip(&self.bases) {
                *out = radical_inverse(base, i as u64 + 1);
            }
        }
        &self.point
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn skip(&mut self, n: usize) {
        self.index += n;
    }
}

// ---------------------------------------------------------------------------
// Faure
// ---------------------------------------------------------------------------

/// Faure sequence in base `b`, the smallest prime not below the dimension.
///
/// Coordinate `k` applies the `k`-th power of the Pascal matrix mod `b` to
/// the digit expansion of the index; coordinate 0 is the plain radical
/// inverse.
#[derive(Clone, Debug)]
pub struct Faure {
    base: u64,
    dimension: usize,
    index: u64,
    point: Vec<f64>,
}

impl Faure {
    /// Creates a Faure sequence of `dimension` coordinates.
    pub fn new(dimension: usize) -> Self {
        Self {
            base: smallest_prime_at_least(dimension as u64),
            dimension,
            index: 0,
            point: vec![0.0; dimension],
        }
    }

    /// Prime base of the sequence.
    pub fn base(&self) -> u64 {
        self.base
    }

    fn digits(&self, mut index: u64) -> Vec<u64> {
        let mut digits = Vec::new();
        while index > 0 {
            digits.push(index % self.base);
            index /= self.base;
        }
        digits
    }

    fn digits_value(&self, digits: &[u64]) -> f64 {
        let inv_base = 1.0 / self.base as f64;
        let mut factor = inv_base;
        let mut result = 0.0;
        for &digit in digits {
            result += digit as f64 * factor;
            factor *= inv_base;
        }
        result
    }
}

/// Binomial coefficients `C(i, j) mod base` for `i, j < n`.
fn pascal_mod(n: usize, base: u64) -> Vec<Vec<u64>> {
    let mut table = vec![vec![0u64; n]; n];
    for i in 0..n {
        table[i][0] = 1;
        for j in 1..=i {
            table[i][j] = (table[i - 1][j - 1] + table[i - 1][j]) % base;
        }
    }
    table
}

impl LowDiscrepancySequence for Faure {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn next_point(&mut self) -> &[f64] {
        self.index += 1;
        let mut digits = self.digits(self.index);
        let pascal = pascal_mod(digits.len(), self.base);
        for k in 0..self.dimension {
            if k > 0 {
                // y_j = sum_{i >= j} C(i, j) x_i mod b
                digits = (0..digits.len())
                    .map(|j| {
                        (j..digits.len())
                            .map(|i| pascal[i][j] * digits[i] % self.base)
                            .sum::<u64>()
                            % self.base
                    })
                    .collect();
            }
            self.point[k] = self.digits_value(&digits);
        }
        &self.point
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn skip(&mut self, n: usize) {
        self.index += n as u64;
    }
}
