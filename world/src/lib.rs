#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative colony state and tick orchestration.
//!
//! A [`Colony`] owns every subsystem and advances them in a fixed order each
//! tick: resources, then lifecycle, then movement. Out-of-band mutations are
//! submitted as [`Command`] values through [`apply`], and every observable
//! change is reported as an [`Event`].

mod buildings;
mod error;
mod navigation;
mod terrain_gen;

use std::collections::{BTreeMap, VecDeque};

use spore_colony_core::{
    BuildingId, BuildingKind, CellCoord, ColonyConfig, Command, CommandError, Event,
    OccupancyMap, PlacementError, SporeId, Terrain,
};
use spore_colony_system_builder::PlacementSearch;
use spore_colony_system_economy::{Happiness, ResourceEconomy};
use spore_colony_system_lifecycle::SporeLifecycle;
use spore_colony_system_movement::Movement;
use tracing::{debug, info, warn};

use buildings::{BuildingRegistry, BuildingState};
pub use error::WorldError;

/// Complete simulation state of a single colony.
#[derive(Debug)]
pub struct Colony {
    config: ColonyConfig,
    terrain: Terrain,
    occupancy: OccupancyMap,
    lifecycle: SporeLifecycle,
    economy: ResourceEconomy,
    happiness: Happiness,
    movement: Movement,
    placement: PlacementSearch,
    buildings: BuildingRegistry,
    routes: BTreeMap<SporeId, VecDeque<CellCoord>>,
    tick: u64,
}

impl Colony {
    /// Founds a colony on terrain generated from the configuration.
    pub fn new(config: ColonyConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let terrain = terrain_gen::generate(&config.world);
        Self::with_terrain(config, terrain)
    }

    /// Founds a colony on caller-provided terrain.
    pub fn with_terrain(config: ColonyConfig, terrain: Terrain) -> Result<Self, WorldError> {
        config.validate()?;
        let world = &config.world;
        if terrain.columns() != world.columns || terrain.rows() != world.rows {
            return Err(WorldError::TerrainMismatch {
                columns: world.columns,
                rows: world.rows,
                actual_columns: terrain.columns(),
                actual_rows: terrain.rows(),
            });
        }

        let mut occupancy = OccupancyMap::new();
        let mut lifecycle = SporeLifecycle::new(&config)?;
        let mut founding = Vec::new();
        lifecycle.seed_population(
            world.initial_population,
            &terrain,
            &mut occupancy,
            &mut founding,
        )?;

        Ok(Self {
            economy: ResourceEconomy::new(&config)?,
            happiness: Happiness::new(&config.happiness, lifecycle.population()),
            movement: Movement::new(world.seed, &config.movement)?,
            placement: PlacementSearch::new(world.seed),
            buildings: BuildingRegistry::new(),
            routes: BTreeMap::new(),
            tick: 0,
            occupancy,
            lifecycle,
            terrain,
            config,
        })
    }

    /// Advances the colony by one tick.
    ///
    /// Returns `Ok(false)` once fewer than two spores remain. A colony that
    /// is already extinct when the call starts is left untouched.
    pub fn progress_a_step(&mut self, out: &mut Vec<Event>) -> Result<bool, WorldError> {
        if !self.lifecycle.survives() {
            out.push(self.died_out());
            return Ok(false);
        }

        if self.economy.is_due(self.tick) {
            let _ = self.economy.settle(self.lifecycle.personal_stores_mut())?;
        }

        self.lifecycle.age_all();
        let _ = self.lifecycle.apply_starvation()?;
        let culled = self.lifecycle.cull_crowds(&mut self.occupancy, out);
        let pruned = self.lifecycle.prune_dead(&mut self.occupancy, out);

        if self.happiness.update(self.lifecycle.population()) {
            if let Some(newborn) =
                self.lifecycle
                    .admit_newborn(&self.terrain, &mut self.occupancy, out)
            {
                info!(spore = %newborn, tick = self.tick, "spore born");
            }
        }

        let lifecycle = &self.lifecycle;
        self.routes.retain(|spore, _| lifecycle.spore(*spore).is_some());

        if !self.lifecycle.survives() {
            self.tick += 1;
            out.push(self.died_out());
            return Ok(false);
        }

        let routes = &self.routes;
        let next = self
            .movement
            .resolve(&self.occupancy, &self.terrain, |spore, _| {
                routes.get(&spore).and_then(|route| route.front().copied())
            })?;
        self.advance_routes(&next);
        self.occupancy = next;

        self.tick += 1;
        let population = self.lifecycle.population();
        debug!(tick = self.tick, population, culled, pruned, "tick completed");
        out.push(Event::TickCompleted {
            tick: self.tick,
            population,
        });
        Ok(true)
    }

    fn died_out(&self) -> Event {
        let population = self.lifecycle.population();
        info!(tick = self.tick, population, "colony died out");
        Event::ColonyDiedOut {
            tick: self.tick,
            population,
        }
    }

    fn advance_routes(&mut self, next: &OccupancyMap) {
        self.routes.retain(|spore, route| {
            let arrived = next.locate(*spore);
            if arrived.is_some() && arrived == route.front().copied() {
                let _ = route.pop_front();
                !route.is_empty()
            } else {
                false
            }
        });
    }

    fn is_occupied(&self, cell: CellCoord) -> bool {
        self.occupancy.is_occupied(cell) || self.buildings.building_at(cell).is_some()
    }

    fn build_structure(
        &mut self,
        kind: BuildingKind,
        level: u8,
        location: Option<CellCoord>,
        orientation: Option<i32>,
        out: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        let spec = self
            .config
            .buildings
            .spec(kind)
            .ok_or(CommandError::UnknownBuildingKind(kind))?;
        let bounds = (self.config.buildings.tech_min, self.config.buildings.tech_max);
        if level < bounds.0 || level > bounds.1 {
            return Err(CommandError::TechLevelOutOfRange {
                level,
                min: bounds.0,
                max: bounds.1,
            });
        }
        let orientation = match orientation {
            Some(index) => {
                let index =
                    usize::try_from(index).map_err(|_| CommandError::NegativeOrientation(index))?;
                if index >= spec.orientations.len() {
                    return Err(CommandError::OrientationOutOfRange {
                        kind,
                        index,
                        available: spec.orientations.len(),
                    });
                }
                Some(index)
            }
            None => None,
        };

        let cost = spec.cost_for(level);
        if !self.economy.colony().covers(&cost) {
            self.reject_building(kind, PlacementError::InsufficientResources, out);
            return Ok(());
        }
        if location.is_some_and(|cell| !self.terrain.contains(cell)) {
            self.reject_building(kind, PlacementError::OutOfBounds, out);
            return Ok(());
        }

        let found = self.placement.search(spec, location, orientation, &self.terrain, |cell| {
            self.occupancy.is_occupied(cell) || self.buildings.building_at(cell).is_some()
        })?;
        let Some(placement) = found else {
            self.reject_building(kind, PlacementError::NoValidPlacement, out);
            return Ok(());
        };

        self.economy.colony_mut().deduct(&cost);
        let region = placement.region();
        let underlay = self.terrain.stamp_building(region, kind, level);
        let id = self.buildings.allocate();
        self.buildings.insert(BuildingState {
            id,
            kind,
            level,
            orientation: placement.orientation,
            region,
            underlay,
        });
        info!(building = %id, %kind, level, origin = %region.origin(), "building placed");
        out.push(Event::BuildingPlaced {
            building: id,
            kind,
            level,
            region,
        });
        Ok(())
    }

    fn reject_building(&self, kind: BuildingKind, reason: PlacementError, out: &mut Vec<Event>) {
        warn!(%kind, ?reason, "building rejected");
        out.push(Event::BuildingRejected { kind, reason });
    }

    fn change_level(
        &mut self,
        building: BuildingId,
        raise: bool,
        out: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        let (min, max) = (self.config.buildings.tech_min, self.config.buildings.tech_max);
        let state = self
            .buildings
            .get_mut(building)
            .ok_or(CommandError::UnknownBuilding(building))?;
        let target = if raise {
            state.level.checked_add(1).filter(|level| *level <= max)
        } else {
            state.level.checked_sub(1).filter(|level| *level >= min)
        };
        let Some(level) = target else {
            debug!(%building, level = state.level, "building level unchanged");
            out.push(Event::BuildingLevelUnchanged {
                building,
                level: state.level,
            });
            return Ok(());
        };

        state.level = level;
        self.terrain.restamp_anchor(state.region, state.kind, level);
        info!(%building, level, "building level changed");
        out.push(Event::BuildingLevelChanged { building, level });
        Ok(())
    }

    fn demolish(&mut self, building: BuildingId, out: &mut Vec<Event>) -> Result<(), CommandError> {
        let state = self
            .buildings
            .remove(building)
            .ok_or(CommandError::UnknownBuilding(building))?;
        self.terrain.restore(state.region, &state.underlay);
        info!(%building, "building demolished");
        out.push(Event::BuildingDemolished {
            building,
            region: state.region,
        });
        Ok(())
    }

    fn relocate(
        &mut self,
        building: BuildingId,
        location: Option<CellCoord>,
        out: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        if let Some(cell) = location.filter(|cell| !self.terrain.contains(*cell)) {
            return Err(CommandError::OutOfBounds(cell));
        }
        let kind = self
            .buildings
            .get(building)
            .map(|state| state.kind)
            .ok_or(CommandError::UnknownBuilding(building))?;
        let spec = self
            .config
            .buildings
            .spec(kind)
            .ok_or(CommandError::UnknownBuildingKind(kind))?;
        let Some(mut state) = self.buildings.remove(building) else {
            return Err(CommandError::UnknownBuilding(building));
        };
        self.terrain.restore(state.region, &state.underlay);

        let searched = self.placement.search(spec, location, None, &self.terrain, |cell| {
            self.occupancy.is_occupied(cell) || self.buildings.building_at(cell).is_some()
        });
        let from = state.region;
        let found = match searched {
            Ok(found) => found,
            Err(error) => {
                state.underlay = self.terrain.stamp_building(from, kind, state.level);
                self.buildings.insert(state);
                return Err(error);
            }
        };
        match found {
            Some(placement) => {
                state.region = placement.region();
                state.orientation = placement.orientation;
                state.underlay = self.terrain.stamp_building(state.region, kind, state.level);
                info!(%building, to = %state.region.origin(), "building relocated");
                out.push(Event::BuildingRelocated {
                    building,
                    from,
                    to: state.region,
                });
            }
            None => {
                state.underlay = self.terrain.stamp_building(from, kind, state.level);
                warn!(%building, "building relocation rejected");
                out.push(Event::BuildingRelocationRejected { building });
            }
        }
        self.buildings.insert(state);
        Ok(())
    }

    fn route_spore(
        &mut self,
        spore: SporeId,
        destination: CellCoord,
        out: &mut Vec<Event>,
    ) -> Result<(), CommandError> {
        if self.lifecycle.spore(spore).is_none() {
            return Err(CommandError::UnknownSpore(spore));
        }
        if !self.terrain.contains(destination) {
            return Err(CommandError::OutOfBounds(destination));
        }
        let start = self
            .occupancy
            .locate(spore)
            .ok_or(CommandError::UnknownSpore(spore))?;

        let allow_overlap = self.movement.allows_overlap();
        let route = navigation::plan_route(
            self.terrain.columns(),
            self.terrain.rows(),
            start,
            destination,
            |cell| {
                !self.terrain.is_passable(cell)
                    || self.buildings.building_at(cell).is_some()
                    || (!allow_overlap && self.occupancy.is_occupied(cell))
            },
        );

        match route {
            Some(route) => {
                let hops = route.len();
                if hops == 0 {
                    let _ = self.routes.remove(&spore);
                } else {
                    let _ = self.routes.insert(spore, route);
                }
                debug!(%spore, %destination, hops, "spore routed");
                out.push(Event::SporeRouted {
                    spore,
                    destination,
                    hops,
                });
            }
            None => {
                warn!(%spore, %destination, "no route to destination");
                out.push(Event::SporeRouteRejected { spore, destination });
            }
        }
        Ok(())
    }

    fn remove_spore(&mut self, spore: SporeId, out: &mut Vec<Event>) -> Result<(), CommandError> {
        let _ = self
            .lifecycle
            .remove(spore, &mut self.occupancy, out)
            .ok_or(CommandError::UnknownSpore(spore))?;
        let _ = self.routes.remove(&spore);
        Ok(())
    }
}

/// Applies the provided command to the colony.
///
/// Invalid arguments are rejected with a [`CommandError`] before any state
/// changes. Valid requests that cannot be satisfied are reported as events.
pub fn apply(colony: &mut Colony, command: Command, out: &mut Vec<Event>) -> Result<(), CommandError> {
    match command {
        Command::BuildStructure {
            kind,
            level,
            location,
            orientation,
        } => colony.build_structure(kind, level, location, orientation, out),
        Command::UpgradeBuilding { building } => colony.change_level(building, true, out),
        Command::DowngradeBuilding { building } => colony.change_level(building, false, out),
        Command::DemolishBuilding { building } => colony.demolish(building, out),
        Command::RelocateBuilding { building, location } => {
            colony.relocate(building, location, out)
        }
        Command::MoveSpore { spore, destination } => colony.route_spore(spore, destination, out),
        Command::RemoveSpore { spore } => colony.remove_spore(spore, out),
    }
}

/// Query functions that provide read-only access to the colony state.
pub mod query {
    use std::collections::BTreeMap;

    use super::Colony;
    use spore_colony_core::{
        BuildingId, BuildingKind, CellCoord, CellRect, ColonyConfig, OccupancyMap,
        ResourceKind, SporeCategory, SporeId, Storage, Terrain,
    };

    /// Immutable representation of a single spore.
    #[derive(Clone, Debug, PartialEq)]
    pub struct SporeSnapshot {
        /// Identifier of the spore.
        pub id: SporeId,
        /// Cell the spore stands on.
        pub cell: CellCoord,
        /// Category tag.
        pub category: SporeCategory,
        /// Ticks lived.
        pub age: u64,
        /// Remaining health.
        pub health: f64,
        /// Food in the personal store.
        pub food: f64,
    }

    /// Immutable representation of a single building.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BuildingSnapshot {
        /// Identifier of the building.
        pub id: BuildingId,
        /// Catalog code.
        pub kind: BuildingKind,
        /// Tech level.
        pub level: u8,
        /// Orientation index of the footprint.
        pub orientation: usize,
        /// Cells covered by the footprint.
        pub region: CellRect,
    }

    /// Configuration the colony was founded with.
    #[must_use]
    pub fn config(colony: &Colony) -> &ColonyConfig {
        &colony.config
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn tick(colony: &Colony) -> u64 {
        colony.tick
    }

    /// Number of living spores.
    #[must_use]
    pub fn population(colony: &Colony) -> usize {
        colony.lifecycle.population()
    }

    /// Whether fewer than two spores remain.
    #[must_use]
    pub fn is_extinct(colony: &Colony) -> bool {
        !colony.lifecycle.survives()
    }

    /// Living spores per category.
    #[must_use]
    pub fn category_counts(colony: &Colony) -> BTreeMap<SporeCategory, usize> {
        colony.lifecycle.category_counts()
    }

    /// Read-only view of the spore occupancy map.
    #[must_use]
    pub fn occupancy(colony: &Colony) -> &OccupancyMap {
        &colony.occupancy
    }

    /// Read-only view of the terrain.
    #[must_use]
    pub fn terrain(colony: &Colony) -> &Terrain {
        &colony.terrain
    }

    /// Snapshot of the colony storage.
    #[must_use]
    pub fn colony_storage(colony: &Colony) -> Storage {
        colony.economy.colony().clone()
    }

    /// Amount of one resource held by the colony.
    #[must_use]
    pub fn resource(colony: &Colony, kind: ResourceKind) -> f64 {
        colony.economy.colony().amount(kind)
    }

    /// Progress toward the next expansion.
    #[must_use]
    pub fn expansion_progress(colony: &Colony) -> f64 {
        colony.happiness.progress()
    }

    /// Snapshot of every living spore, in id order.
    #[must_use]
    pub fn spores(colony: &Colony) -> Vec<SporeSnapshot> {
        let mut snapshots: Vec<SporeSnapshot> = colony
            .occupancy
            .placements()
            .filter_map(|(cell, id)| {
                colony.lifecycle.spore(id).map(|spore| SporeSnapshot {
                    id,
                    cell,
                    category: spore.category(),
                    age: spore.age(),
                    health: spore.health(),
                    food: spore.storage().amount(ResourceKind::Food),
                })
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Remaining hops of a spore's directed route.
    #[must_use]
    pub fn route(colony: &Colony, spore: SporeId) -> Option<Vec<CellCoord>> {
        colony
            .routes
            .get(&spore)
            .map(|route| route.iter().copied().collect())
    }

    /// Snapshot of one building.
    #[must_use]
    pub fn building(colony: &Colony, id: BuildingId) -> Option<BuildingSnapshot> {
        colony.buildings.get(id).map(snapshot)
    }

    /// Snapshot of every building, in id order.
    #[must_use]
    pub fn buildings(colony: &Colony) -> Vec<BuildingSnapshot> {
        colony.buildings.iter().map(snapshot).collect()
    }

    /// Building covering `cell`, if any.
    #[must_use]
    pub fn building_at(colony: &Colony, cell: CellCoord) -> Option<BuildingId> {
        colony.buildings.building_at(cell)
    }

    /// Every footprint tile and its building, in coordinate order.
    #[must_use]
    pub fn building_occupancy(colony: &Colony) -> Vec<(CellCoord, BuildingId)> {
        colony.buildings.tiles()
    }

    /// Whether `cell` holds a spore or a building.
    #[must_use]
    pub fn is_occupied(colony: &Colony, cell: CellCoord) -> bool {
        colony.is_occupied(cell)
    }

    fn snapshot(state: &super::BuildingState) -> BuildingSnapshot {
        BuildingSnapshot {
            id: state.id,
            kind: state.kind,
            level: state.level,
            orientation: state.orientation,
            region: state.region,
        }
    }
}
