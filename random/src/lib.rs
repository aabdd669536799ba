#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Batched deterministic random sources.
//!
//! Every stochastic decision in the colony is drawn from a [`BatchRandom`]
//! bound to one [`Stream`]. Streams are derived from the master seed and a
//! purpose label so that the draws of one purpose never shift when another
//! purpose consumes more or fewer values.

use rand::distributions::uniform::SampleUniform;
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Normal, NormalError};
use spore_colony_core::ResourceKind;

/// Largest `get_batch` request accepted, as a multiple of the batch size.
pub const MAX_BATCH_MULTIPLE: usize = 100;

/// Purposes that each own an independent random stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Direction codes used by the movement resolver.
    Direction,
    /// Food gathered per spore.
    FoodCollection,
    /// Food consumed per spore.
    Consumption,
    /// Health penalty applied to starving spores.
    Starvation,
    /// Category of newborn spores.
    Category,
    /// Shuffles used for spore seeding and newborn placement.
    Placement,
    /// Free-tile shuffles and orientation picks of the building search.
    Construction,
    /// Scatter of generated terrain features.
    Terrain,
    /// Income of a non-food resource.
    Income(ResourceKind),
}

impl Stream {
    /// Stream identifier passed to the underlying generator.
    #[must_use]
    pub fn id(self) -> u64 {
        match self {
            Self::Direction => 1,
            Self::FoodCollection => 2,
            Self::Consumption => 3,
            Self::Starvation => 4,
            Self::Category => 5,
            Self::Placement => 6,
            Self::Terrain => 7,
            Self::Construction => 8,
            Self::Income(kind) => 100 + u64::from(kind.code()),
        }
    }
}

/// Creates the generator backing `stream` for the master `seed`.
#[must_use]
pub fn stream_rng(seed: u64, stream: Stream) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream.id());
    rng
}

/// Errors reported by batch random sources.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RandomError {
    /// Batches must contain at least one draw.
    #[error("batch size must be positive")]
    InvalidBatchSize,
    /// Uniform ranges must be non-empty.
    #[error("uniform range is empty")]
    EmptyRange,
    /// Standard deviations must be non-negative numbers.
    #[error("standard deviation must be non-negative, got {0}")]
    NegativeDeviation(f64),
    /// The normal distribution parameters were rejected.
    #[error("invalid normal distribution: {0}")]
    InvalidNormal(#[from] NormalError),
    /// `get_batch` was asked for more than [`MAX_BATCH_MULTIPLE`] batches at once.
    #[error("requested {requested} draws, the limit is {limit}")]
    BatchTooLarge {
        /// Number of draws requested.
        requested: usize,
        /// Largest accepted request.
        limit: usize,
    },
}

/// Pre-generated buffer of draws from a distribution.
///
/// Draws are produced `batch_size` at a time from a single seeded stream that
/// is never re-seeded. Reading `n` values through [`BatchRandom::get_batch`]
/// yields exactly the values `n` calls of [`BatchRandom::get`] would.
#[derive(Clone, Debug)]
pub struct BatchRandom<T, D> {
    rng: ChaCha8Rng,
    distribution: D,
    buffer: Vec<T>,
    cursor: usize,
    batch_size: usize,
}

/// Uniform draws over a half-open range.
pub type BatchUniform<T> = BatchRandom<T, Uniform<T>>;

/// Normally distributed `f64` draws.
pub type BatchNormal = BatchRandom<f64, Normal<f64>>;

impl<T, D> BatchRandom<T, D>
where
    T: Copy,
    D: Distribution<T>,
{
    /// Creates a source that draws from `distribution` on the given stream.
    pub fn from_distribution(
        seed: u64,
        stream: Stream,
        distribution: D,
        batch_size: usize,
    ) -> Result<Self, RandomError> {
        if batch_size == 0 {
            return Err(RandomError::InvalidBatchSize);
        }
        let mut source = Self {
            rng: stream_rng(seed, stream),
            distribution,
            buffer: Vec::with_capacity(batch_size),
            cursor: 0,
            batch_size,
        };
        source.refill();
        Ok(source)
    }

    /// Number of draws generated per refill.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the next draw.
    pub fn get(&mut self) -> T {
        if self.cursor >= self.buffer.len() {
            self.refill();
        }
        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }

    /// Returns the next `count` draws.
    ///
    /// The result splices the unread tail of the buffer, any number of fresh
    /// full buffers and the head of one more buffer.
    pub fn get_batch(&mut self, count: usize) -> Result<Vec<T>, RandomError> {
        let limit = self.batch_size.saturating_mul(MAX_BATCH_MULTIPLE);
        if count > limit {
            return Err(RandomError::BatchTooLarge {
                requested: count,
                limit,
            });
        }

        let mut draws = Vec::with_capacity(count);
        while draws.len() < count {
            if self.cursor >= self.buffer.len() {
                self.refill();
            }
            let take = (count - draws.len()).min(self.buffer.len() - self.cursor);
            draws.extend_from_slice(&self.buffer[self.cursor..self.cursor + take]);
            self.cursor += take;
        }
        Ok(draws)
    }

    fn refill(&mut self) {
        self.buffer.clear();
        let distribution = &self.distribution;
        let rng = &mut self.rng;
        self.buffer
            .extend((0..self.batch_size).map(|_| distribution.sample(rng)));
        self.cursor = 0;
    }
}

impl<T> BatchRandom<T, Uniform<T>>
where
    T: SampleUniform + PartialOrd + Copy,
{
    /// Creates a uniform source over `low..high`.
    pub fn uniform(
        seed: u64,
        stream: Stream,
        low: T,
        high: T,
        batch_size: usize,
    ) -> Result<Self, RandomError> {
        if !(low < high) {
            return Err(RandomError::EmptyRange);
        }
        Self::from_distribution(seed, stream, Uniform::new(low, high), batch_size)
    }
}

impl BatchRandom<f64, Normal<f64>> {
    /// Creates a normal source with the given mean and standard deviation.
    pub fn normal(
        seed: u64,
        stream: Stream,
        mean: f64,
        std_dev: f64,
        batch_size: usize,
    ) -> Result<Self, RandomError> {
        if !(std_dev >= 0.0) {
            return Err(RandomError::NegativeDeviation(std_dev));
        }
        let distribution = Normal::new(mean, std_dev)?;
        Self::from_distribution(seed, stream, distribution, batch_size)
    }
}
