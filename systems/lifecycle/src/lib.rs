#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spore lifecycle manager owning every living spore record.
//!
//! A spore is alive until its health reaches zero, a crowded tile is culled,
//! or an explicit removal arrives. The occupancy map only ever holds ids; it
//! is kept consistent with the table by every transition here.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use spore_colony_core::{
    CellCoord, ColonyConfig, DeathCause, Event, OccupancyMap, ResourceKind, SporeCategory,
    SporeId, Storage, Terrain,
};
use spore_colony_random::{stream_rng, BatchNormal, BatchUniform, RandomError, Stream};
use tracing::{debug, info};

/// Smallest population that keeps a colony alive.
pub const MINIMUM_VIABLE_POPULATION: usize = 2;

/// Errors raised by lifecycle transitions.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    /// Not enough vacant passable cells for the initial population.
    #[error("requested {requested} spores but only {available} vacant cells exist")]
    NoVacantCell {
        /// Spores requested.
        requested: usize,
        /// Vacant cells found.
        available: usize,
    },
    /// A random stream rejected a request.
    #[error(transparent)]
    Random(#[from] RandomError),
}

/// A single living spore.
#[derive(Clone, Debug, PartialEq)]
pub struct Spore {
    id: SporeId,
    category: SporeCategory,
    age: u64,
    health: f64,
    storage: Storage,
}

impl Spore {
    /// Identifier of the spore.
    #[must_use]
    pub const fn id(&self) -> SporeId {
        self.id
    }

    /// Category tag of the spore.
    #[must_use]
    pub const fn category(&self) -> SporeCategory {
        self.category
    }

    /// Ticks the spore has lived.
    #[must_use]
    pub const fn age(&self) -> u64 {
        self.age
    }

    /// Remaining health, never negative.
    #[must_use]
    pub const fn health(&self) -> f64 {
        self.health
    }

    /// Personal resource store.
    #[must_use]
    pub const fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Mutable personal resource store.
    pub fn storage_mut(&mut self) -> &mut Storage {
        &mut self.storage
    }

    /// Whether the spore has run out of health.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// Owns every spore and drives birth, aging, starvation and death.
#[derive(Debug)]
pub struct SporeLifecycle {
    spores: BTreeMap<SporeId, Spore>,
    next_id: u32,
    categories: Vec<SporeCategory>,
    category_draws: BatchUniform<usize>,
    starvation: BatchNormal,
    placement: ChaCha8Rng,
    initial_health: f64,
    personal_capacity: f64,
    crowd_threshold: Option<usize>,
    population_cap: usize,
}

impl SporeLifecycle {
    /// Creates an empty lifecycle manager for the configuration.
    pub fn new(config: &ColonyConfig) -> Result<Self, LifecycleError> {
        let seed = config.world.seed;
        let batch = config.movement.random_batch_size;
        let categories = config.world.categories.clone();
        Ok(Self {
            spores: BTreeMap::new(),
            next_id: 0,
            category_draws: BatchUniform::uniform(seed, Stream::Category, 0, categories.len(), batch)?,
            categories,
            starvation: BatchNormal::normal(
                seed,
                Stream::Starvation,
                config.spores.starvation_mean,
                config.spores.starvation_std,
                batch,
            )?,
            placement: stream_rng(seed, Stream::Placement),
            initial_health: config.spores.initial_health,
            personal_capacity: config.spores.personal_capacity,
            crowd_threshold: config.spores.crowd_threshold,
            population_cap: config.world.population_cap,
        })
    }

    /// Places `count` spores on distinct vacant cells.
    ///
    /// Categories cycle through the configured set in order, so two
    /// categories split an even population evenly.
    pub fn seed_population(
        &mut self,
        count: usize,
        terrain: &Terrain,
        occupancy: &mut OccupancyMap,
        out: &mut Vec<Event>,
    ) -> Result<(), LifecycleError> {
        let mut vacant = vacant_cells(terrain, occupancy);
        if vacant.len() < count {
            return Err(LifecycleError::NoVacantCell {
                requested: count,
                available: vacant.len(),
            });
        }
        vacant.shuffle(&mut self.placement);

        for (index, cell) in vacant.into_iter().take(count).enumerate() {
            let category = self.categories[index % self.categories.len()];
            let _ = self.spawn(cell, category, occupancy, out);
        }
        info!(population = self.spores.len(), "colony seeded");
        Ok(())
    }

    /// Advances the age of every living spore by one tick.
    pub fn age_all(&mut self) {
        for spore in self.spores.values_mut() {
            spore.age += 1;
        }
    }

    /// Applies a non-negative health penalty to every spore without food.
    ///
    /// Returns the number of starving spores.
    pub fn apply_starvation(&mut self) -> Result<usize, LifecycleError> {
        let hungry: Vec<SporeId> = self
            .spores
            .values()
            .filter(|spore| spore.storage.amount(ResourceKind::Food) <= 0.0)
            .map(Spore::id)
            .collect();
        if hungry.is_empty() {
            return Ok(0);
        }

        let penalties = self.starvation.get_batch(hungry.len())?;
        for (id, penalty) in hungry.iter().zip(penalties) {
            if let Some(spore) = self.spores.get_mut(id) {
                spore.health = (spore.health - penalty.max(0.0)).max(0.0);
            }
        }
        debug!(starving = hungry.len(), "starvation applied");
        Ok(hungry.len())
    }

    /// Kills every spore on a tile holding more than the crowd threshold.
    ///
    /// Returns the number of spores removed.
    pub fn cull_crowds(&mut self, occupancy: &mut OccupancyMap, out: &mut Vec<Event>) -> usize {
        let Some(threshold) = self.crowd_threshold else {
            return 0;
        };
        let crowded: Vec<(CellCoord, SporeId)> = occupancy
            .iter()
            .filter(|(_, occupants)| occupants.len() > threshold)
            .flat_map(|(cell, occupants)| occupants.iter().map(move |spore| (cell, *spore)))
            .collect();
        for (cell, spore) in &crowded {
            self.bury(*cell, *spore, DeathCause::Famine, occupancy, out);
        }
        crowded.len()
    }

    /// Removes every spore whose health reached zero.
    ///
    /// Returns the number of spores removed.
    pub fn prune_dead(&mut self, occupancy: &mut OccupancyMap, out: &mut Vec<Event>) -> usize {
        let dead: Vec<(CellCoord, SporeId)> = occupancy
            .placements()
            .filter(|(_, spore)| self.spores.get(spore).map_or(true, Spore::is_dead))
            .collect();
        for (cell, spore) in &dead {
            self.bury(*cell, *spore, DeathCause::Starvation, occupancy, out);
        }
        dead.len()
    }

    /// Removes a spore regardless of its health.
    ///
    /// Returns the cell it occupied, or `None` when the id is not alive.
    pub fn remove(
        &mut self,
        spore: SporeId,
        occupancy: &mut OccupancyMap,
        out: &mut Vec<Event>,
    ) -> Option<CellCoord> {
        if !self.spores.contains_key(&spore) {
            return None;
        }
        let cell = occupancy.locate(spore)?;
        self.bury(cell, spore, DeathCause::Removed, occupancy, out);
        Some(cell)
    }

    /// Admits one newborn on a random vacant cell if the cap allows.
    ///
    /// Returns the newborn's id, or `None` at the cap or on a full grid.
    pub fn admit_newborn(
        &mut self,
        terrain: &Terrain,
        occupancy: &mut OccupancyMap,
        out: &mut Vec<Event>,
    ) -> Option<SporeId> {
        if self.spores.len() >= self.population_cap {
            return None;
        }
        let cell = *vacant_cells(terrain, occupancy).choose(&mut self.placement)?;
        let category = self.categories[self.category_draws.get() % self.categories.len()];
        Some(self.spawn(cell, category, occupancy, out))
    }

    /// Number of living spores.
    #[must_use]
    pub fn population(&self) -> usize {
        self.spores.len()
    }

    /// Whether enough spores remain for the colony to continue.
    #[must_use]
    pub fn survives(&self) -> bool {
        self.spores.len() >= MINIMUM_VIABLE_POPULATION
    }

    /// Living spores per category.
    #[must_use]
    pub fn category_counts(&self) -> BTreeMap<SporeCategory, usize> {
        let mut counts = BTreeMap::new();
        for spore in self.spores.values() {
            *counts.entry(spore.category).or_insert(0) += 1;
        }
        counts
    }

    /// Looks up a living spore.
    #[must_use]
    pub fn spore(&self, id: SporeId) -> Option<&Spore> {
        self.spores.get(&id)
    }

    /// Iterates living spores in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Spore> + '_ {
        self.spores.values()
    }

    /// Personal stores of every living spore in id order.
    pub fn personal_stores_mut(&mut self) -> impl Iterator<Item = &mut Storage> + '_ {
        self.spores.values_mut().map(Spore::storage_mut)
    }

    fn spawn(
        &mut self,
        cell: CellCoord,
        category: SporeCategory,
        occupancy: &mut OccupancyMap,
        out: &mut Vec<Event>,
    ) -> SporeId {
        let id = SporeId::new(self.next_id);
        self.next_id += 1;
        let mut storage = Storage::new();
        storage.track(ResourceKind::Food, 0.0, self.personal_capacity);
        let _ = self.spores.insert(
            id,
            Spore {
                id,
                category,
                age: 0,
                health: self.initial_health,
                storage,
            },
        );
        occupancy.insert(cell, id);
        out.push(Event::SporeBorn {
            spore: id,
            cell,
            category,
        });
        id
    }

    fn bury(
        &mut self,
        cell: CellCoord,
        spore: SporeId,
        cause: DeathCause,
        occupancy: &mut OccupancyMap,
        out: &mut Vec<Event>,
    ) {
        let _ = self.spores.remove(&spore);
        let _ = occupancy.remove(cell, spore);
        info!(%spore, %cell, ?cause, "spore died");
        out.push(Event::SporeDied { spore, cell, cause });
    }
}

fn vacant_cells(terrain: &Terrain, occupancy: &OccupancyMap) -> Vec<CellCoord> {
    (0..terrain.rows())
        .flat_map(|row| (0..terrain.columns()).map(move |column| CellCoord::new(column, row)))
        .filter(|cell| terrain.is_passable(*cell) && !occupancy.is_occupied(*cell))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spore_colony_core::TileCode;

    #[test]
    fn vacant_cells_skip_blocked_and_occupied_tiles() {
        let mut terrain = Terrain::filled(2, 2, TileCode::GRASS);
        terrain.set_tile(CellCoord::new(1, 0), TileCode::MOUNTAIN);
        let mut occupancy = OccupancyMap::new();
        occupancy.insert(CellCoord::new(0, 1), SporeId::new(0));

        let cells = vacant_cells(&terrain, &occupancy);

        assert_eq!(cells, vec![CellCoord::new(0, 0), CellCoord::new(1, 1)]);
    }

    #[test]
    fn identifiers_are_never_reused() {
        let terrain = Terrain::filled(4, 4, TileCode::GRASS);
        let mut occupancy = OccupancyMap::new();
        let mut lifecycle = SporeLifecycle::new(&ColonyConfig::default()).expect("valid config");
        let mut events = Vec::new();
        lifecycle
            .seed_population(2, &terrain, &mut occupancy, &mut events)
            .expect("room for two");

        let _ = lifecycle.remove(SporeId::new(1), &mut occupancy, &mut events);
        let newborn = lifecycle.admit_newborn(&terrain, &mut occupancy, &mut events);

        assert_eq!(newborn, Some(SporeId::new(2)));
    }
}
