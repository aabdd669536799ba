#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement resolver that computes the next occupancy map from the current one.
//!
//! Spores are visited in [`OccupancyMap::placements`] order: cells ascending
//! by `(column, row)`, then occupants in list order. With overlap disallowed a
//! candidate is only checked against spores already placed in the new map, so
//! a spore visited early may claim a cell that a later spore is leaving. That
//! ordering is an artifact of the resolver, not a property callers may rely on.

use spore_colony_core::{
    CellCoord, Direction, MovementConfig, OccupancyMap, SporeId, Terrain,
};
use spore_colony_random::{BatchUniform, RandomError, Stream};
use tracing::{debug, warn};

/// Errors raised while resolving a movement pass.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum MovementError {
    /// A spore found no valid cell within the retry tolerance.
    #[error("spore {spore} at {cell} found no valid move after {attempts} attempts")]
    RetryExhausted {
        /// Spore that could not move.
        spore: SporeId,
        /// Cell the spore occupied.
        cell: CellCoord,
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// At least one attempt per spore is required.
    #[error("retry tolerance must be positive")]
    ZeroRetryTolerance,
    /// The direction stream rejected a request.
    #[error(transparent)]
    Random(#[from] RandomError),
}

/// Stateful resolver owning the direction stream.
#[derive(Debug)]
pub struct Movement {
    directions: BatchUniform<u8>,
    retry_tolerance: u32,
    allow_overlap: bool,
}

impl Movement {
    /// Creates a resolver drawing directions from the seed's direction stream.
    pub fn new(seed: u64, config: &MovementConfig) -> Result<Self, MovementError> {
        if config.retry_tolerance == 0 {
            return Err(MovementError::ZeroRetryTolerance);
        }
        let directions = BatchUniform::uniform(
            seed,
            Stream::Direction,
            0,
            Direction::COUNT,
            config.random_batch_size,
        )?;
        Ok(Self {
            directions,
            retry_tolerance: config.retry_tolerance,
            allow_overlap: config.allow_overlap,
        })
    }

    /// Whether several spores may share a cell after resolution.
    #[must_use]
    pub const fn allows_overlap(&self) -> bool {
        self.allow_overlap
    }

    /// Computes the occupancy every spore moves to this tick.
    ///
    /// `directed` returns the next hop of a spore following a route. A hop
    /// that is adjacent and valid is taken without drawing; otherwise the spore
    /// moves stochastically. Every spore ends at most one king move from where
    /// it started.
    pub fn resolve<F>(
        &mut self,
        current: &OccupancyMap,
        terrain: &Terrain,
        mut directed: F,
    ) -> Result<OccupancyMap, MovementError>
    where
        F: FnMut(SporeId, CellCoord) -> Option<CellCoord>,
    {
        let population = current.occupant_count();
        let draws = self.directions.get_batch(population)?;
        let mut next = OccupancyMap::new();
        let mut redraws = 0_u64;

        for ((cell, spore), draw) in current.placements().zip(draws) {
            if let Some(hop) = directed(spore, cell) {
                if cell.chebyshev_distance(hop) <= 1 && self.accepts(hop, terrain, &next) {
                    next.insert(hop, spore);
                    continue;
                }
            }

            let mut code = draw;
            let mut attempts = 1;
            loop {
                let candidate = Direction::from_code(code)
                    .and_then(|direction| cell.step(direction, terrain.columns(), terrain.rows()));
                if let Some(candidate) = candidate {
                    if self.accepts(candidate, terrain, &next) {
                        next.insert(candidate, spore);
                        break;
                    }
                }
                if attempts >= self.retry_tolerance {
                    warn!(%spore, %cell, attempts, "movement retries exhausted");
                    return Err(MovementError::RetryExhausted {
                        spore,
                        cell,
                        attempts,
                    });
                }
                attempts += 1;
                redraws += 1;
                code = self.directions.get();
            }
        }

        debug!(population, redraws, "movement resolved");
        Ok(next)
    }

    fn accepts(&self, candidate: CellCoord, terrain: &Terrain, next: &OccupancyMap) -> bool {
        terrain.is_passable(candidate) && (self.allow_overlap || !next.is_occupied(candidate))
    }
}
