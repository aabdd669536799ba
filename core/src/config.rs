//! Configuration consumed by every system when a colony is constructed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{BuildingKind, CellRectSize, ResourceKind, SporeCategory};

/// Top-level configuration for a colony.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Grid, population and seed parameters.
    pub world: WorldConfig,
    /// Per-spore attributes.
    pub spores: SporeConfig,
    /// Colony stocks, income and consumption.
    pub resources: ResourceConfig,
    /// Happiness and expansion settings.
    pub happiness: HappinessConfig,
    /// Movement resolver settings.
    pub movement: MovementConfig,
    /// Building catalog and tech bounds.
    pub buildings: BuildingConfig,
}

impl ColonyConfig {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let world = &self.world;
        if world.columns == 0 || world.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                columns: world.columns,
                rows: world.rows,
            });
        }
        if world.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        let cells = u64::from(world.columns) * u64::from(world.rows);
        if world.initial_population as u64 > cells {
            return Err(ConfigError::InitialPopulationExceedsGrid {
                initial: world.initial_population,
                cells,
            });
        }
        if world.population_cap < world.initial_population {
            return Err(ConfigError::PopulationCapBelowInitial {
                cap: world.population_cap,
                initial: world.initial_population,
            });
        }
        if !(self.spores.starvation_std >= 0.0) {
            return Err(ConfigError::InvalidStarvationDeviation);
        }
        let terrain = &world.terrain;
        let coverage = u32::from(terrain.water_percent)
            + u32::from(terrain.mountain_percent)
            + u32::from(terrain.tree_percent);
        if coverage > 100 {
            return Err(ConfigError::TerrainCoverage(coverage));
        }

        let mut seen_resources = BTreeSet::new();
        for settings in &self.resources.stocks {
            if !seen_resources.insert(settings.kind) {
                return Err(ConfigError::DuplicateResource(settings.kind));
            }
            if settings.capacity.is_nan() || settings.capacity < 0.0 {
                return Err(ConfigError::InvalidCapacity(settings.kind));
            }
            if !(settings.variance_percent >= 0.0) {
                return Err(ConfigError::InvalidVariance(settings.kind));
            }
        }
        if !(self.resources.consumption_variance_percent >= 0.0) {
            return Err(ConfigError::InvalidConsumptionVariance);
        }
        if self.resources.interval == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        if self.happiness.divisor <= 0.0 || self.happiness.divisor.is_nan() {
            return Err(ConfigError::InvalidHappinessDivisor);
        }
        if self.movement.random_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.movement.retry_tolerance == 0 {
            return Err(ConfigError::ZeroRetryTolerance);
        }

        let buildings = &self.buildings;
        if buildings.tech_min == 0 || buildings.tech_min > buildings.tech_max {
            return Err(ConfigError::InvalidTechBounds {
                min: buildings.tech_min,
                max: buildings.tech_max,
            });
        }
        let mut seen_kinds = BTreeSet::new();
        for spec in &buildings.kinds {
            if !seen_kinds.insert(spec.kind) {
                return Err(ConfigError::DuplicateBuildingKind(spec.kind));
            }
            if spec.orientations.is_empty() {
                return Err(ConfigError::BuildingWithoutOrientation(spec.kind));
            }
        }
        Ok(())
    }
}

/// Grid dimensions, population bounds and the master seed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Spores placed when the colony is founded.
    pub initial_population: usize,
    /// Births stop once the population reaches this value.
    pub population_cap: usize,
    /// Master seed every random stream derives from.
    pub seed: u64,
    /// Categories assigned to spores; the initial population cycles through them.
    pub categories: Vec<SporeCategory>,
    /// Scatter percentages used when generating terrain.
    pub terrain: TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            columns: 32,
            rows: 16,
            initial_population: 10,
            population_cap: 100,
            seed: 0,
            categories: vec![SporeCategory::Alpha, SporeCategory::Beta],
            terrain: TerrainConfig::default(),
        }
    }
}

/// Percentages of generated terrain covered by each non-grass tile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Share of tiles turned into water.
    pub water_percent: u8,
    /// Share of tiles turned into mountains.
    pub mountain_percent: u8,
    /// Share of tiles turned into trees.
    pub tree_percent: u8,
}

/// Attributes of individual spores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SporeConfig {
    /// Health of a newly created spore.
    pub initial_health: f64,
    /// Capacity of every personal store.
    pub personal_capacity: f64,
    /// Mean of the starvation penalty distribution.
    pub starvation_mean: f64,
    /// Standard deviation of the starvation penalty distribution.
    pub starvation_std: f64,
    /// Tiles holding more spores than this lose all of them. `None` disables famine.
    pub crowd_threshold: Option<usize>,
}

impl Default for SporeConfig {
    fn default() -> Self {
        Self {
            initial_health: 100.0,
            personal_capacity: 10.0,
            starvation_mean: 10.0,
            starvation_std: 5.0,
            crowd_threshold: None,
        }
    }
}

/// Stock, capacity and income parameters of a single colony resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceSettings {
    /// Resource the settings apply to.
    pub kind: ResourceKind,
    /// Amount held when the colony is founded.
    #[serde(default)]
    pub initial: f64,
    /// Upper bound of the colony stock.
    pub capacity: f64,
    /// Mean amount gathered per spore per economy pass.
    #[serde(default)]
    pub income_speed: f64,
    /// Standard deviation of the gathered amount as a percentage of `income_speed`.
    #[serde(default)]
    pub variance_percent: f64,
}

impl ResourceSettings {
    /// Standard deviation derived from the speed and variance percentage.
    #[must_use]
    pub fn income_std(&self) -> f64 {
        self.income_speed.abs() * self.variance_percent / 100.0
    }
}

/// Colony resources and the economy cadence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Tracked colony resources.
    pub stocks: Vec<ResourceSettings>,
    /// Mean food consumed per spore per economy pass.
    pub food_consumption: f64,
    /// Standard deviation of consumption as a percentage of `food_consumption`.
    pub consumption_variance_percent: f64,
    /// Economy runs on ticks divisible by this value.
    pub interval: u64,
}

impl ResourceConfig {
    /// Settings for `kind`, if tracked.
    #[must_use]
    pub fn settings(&self, kind: ResourceKind) -> Option<&ResourceSettings> {
        self.stocks.iter().find(|settings| settings.kind == kind)
    }

    /// Standard deviation of per-spore consumption.
    #[must_use]
    pub fn consumption_std(&self) -> f64 {
        self.food_consumption.abs() * self.consumption_variance_percent / 100.0
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        let stock = |kind, initial, capacity, income_speed, variance_percent| ResourceSettings {
            kind,
            initial,
            capacity,
            income_speed,
            variance_percent,
        };
        Self {
            stocks: vec![
                stock(ResourceKind::Food, 200.0, 2_000.0, 2.0, 20.0),
                stock(ResourceKind::Wood, 60.0, 500.0, 1.0, 20.0),
                stock(ResourceKind::Stone, 30.0, 500.0, 1.0, 20.0),
                stock(ResourceKind::Metal, 0.0, 500.0, 0.0, 0.0),
            ],
            food_consumption: 1.0,
            consumption_variance_percent: 10.0,
            interval: 1,
        }
    }
}

/// Happiness accumulator settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HappinessConfig {
    /// Happiness score recorded every update.
    pub base: f64,
    /// Progress grows by `happiness / divisor` per update.
    pub divisor: f64,
    /// Number of happiness samples retained.
    pub history_cap: usize,
}

impl Default for HappinessConfig {
    fn default() -> Self {
        Self {
            base: 15.0,
            divisor: 10.0,
            history_cap: 1_000,
        }
    }
}

/// Movement resolver settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Attempts per spore before resolution fails.
    pub retry_tolerance: u32,
    /// Whether several spores may end a tick on the same tile.
    pub allow_overlap: bool,
    /// Draws generated per refill of every batch random source.
    pub random_batch_size: usize,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            retry_tolerance: 10_000,
            allow_overlap: false,
            random_batch_size: 1_000,
        }
    }
}

/// A quantity of one resource, used for building costs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceAmount {
    /// Resource being counted.
    pub kind: ResourceKind,
    /// Quantity of the resource.
    pub amount: f64,
}

impl ResourceAmount {
    /// Creates a resource amount.
    #[must_use]
    pub const fn new(kind: ResourceKind, amount: f64) -> Self {
        Self { kind, amount }
    }
}

/// Catalog entry describing one building kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingSpec {
    /// Catalog code.
    pub kind: BuildingKind,
    /// Human readable name.
    pub name: String,
    /// Footprint sizes, indexed by orientation.
    pub orientations: Vec<CellRectSize>,
    /// Cost at tech level one.
    #[serde(default)]
    pub base_cost: Vec<ResourceAmount>,
}

impl BuildingSpec {
    /// Cost of constructing the building at `level`: the base cost scaled by the level.
    #[must_use]
    pub fn cost_for(&self, level: u8) -> Vec<ResourceAmount> {
        self.base_cost
            .iter()
            .map(|cost| ResourceAmount::new(cost.kind, cost.amount * f64::from(level)))
            .collect()
    }
}

/// Building catalog and tech bounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    /// Lowest tech level.
    pub tech_min: u8,
    /// Highest tech level.
    pub tech_max: u8,
    /// Known building kinds.
    pub kinds: Vec<BuildingSpec>,
}

impl BuildingConfig {
    /// Looks up the catalog entry for `kind`.
    #[must_use]
    pub fn spec(&self, kind: BuildingKind) -> Option<&BuildingSpec> {
        self.kinds.iter().find(|spec| spec.kind == kind)
    }
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            tech_min: 1,
            tech_max: 3,
            kinds: vec![
                BuildingSpec {
                    kind: BuildingKind::FARM,
                    name: String::from("farm"),
                    orientations: vec![CellRectSize::new(2, 1), CellRectSize::new(1, 2)],
                    base_cost: vec![ResourceAmount::new(ResourceKind::Wood, 20.0)],
                },
                BuildingSpec {
                    kind: BuildingKind::LUMBER_CAMP,
                    name: String::from("lumber camp"),
                    orientations: vec![CellRectSize::new(2, 2)],
                    base_cost: vec![ResourceAmount::new(ResourceKind::Wood, 30.0)],
                },
                BuildingSpec {
                    kind: BuildingKind::QUARRY,
                    name: String::from("quarry"),
                    orientations: vec![CellRectSize::new(3, 2), CellRectSize::new(2, 3)],
                    base_cost: vec![
                        ResourceAmount::new(ResourceKind::Wood, 20.0),
                        ResourceAmount::new(ResourceKind::Stone, 10.0),
                    ],
                },
            ],
        }
    }
}

/// Errors raised while validating a [`ColonyConfig`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Grid dimensions must be positive.
    #[error("grid must have at least one cell, got {columns}x{rows}")]
    EmptyGrid {
        /// Configured columns.
        columns: u32,
        /// Configured rows.
        rows: u32,
    },
    /// At least one spore category is required.
    #[error("no spore categories configured")]
    NoCategories,
    /// More initial spores than cells.
    #[error("initial population {initial} exceeds the {cells} grid cells")]
    InitialPopulationExceedsGrid {
        /// Configured initial population.
        initial: usize,
        /// Cells available.
        cells: u64,
    },
    /// The cap must admit the initial population.
    #[error("population cap {cap} is below the initial population {initial}")]
    PopulationCapBelowInitial {
        /// Configured cap.
        cap: usize,
        /// Configured initial population.
        initial: usize,
    },
    /// The starvation penalty deviation must be a non-negative number.
    #[error("starvation standard deviation must be non-negative")]
    InvalidStarvationDeviation,
    /// Scatter percentages add up to more than the whole grid.
    #[error("terrain percentages add up to {0}%")]
    TerrainCoverage(u32),
    /// A resource is listed twice.
    #[error("resource {0} configured more than once")]
    DuplicateResource(ResourceKind),
    /// Capacities must be non-negative numbers.
    #[error("resource {0} has an invalid capacity")]
    InvalidCapacity(ResourceKind),
    /// Income variance percentages must be non-negative numbers.
    #[error("resource {0} has a negative income variance")]
    InvalidVariance(ResourceKind),
    /// The consumption variance percentage must be a non-negative number.
    #[error("consumption variance must be non-negative")]
    InvalidConsumptionVariance,
    /// The economy interval must be positive.
    #[error("economy interval must be positive")]
    ZeroInterval,
    /// The happiness divisor must be positive.
    #[error("happiness divisor must be positive")]
    InvalidHappinessDivisor,
    /// Random batches must hold at least one draw.
    #[error("random batch size must be positive")]
    ZeroBatchSize,
    /// The movement resolver needs at least one attempt per spore.
    #[error("movement retry tolerance must be positive")]
    ZeroRetryTolerance,
    /// Tech bounds must satisfy `1 <= min <= max`.
    #[error("invalid tech bounds {min}..={max}")]
    InvalidTechBounds {
        /// Configured minimum.
        min: u8,
        /// Configured maximum.
        max: u8,
    },
    /// A building kind is listed twice.
    #[error("building kind {0} configured more than once")]
    DuplicateBuildingKind(BuildingKind),
    /// Every building needs a footprint.
    #[error("building kind {0} has no orientations")]
    BuildingWithoutOrientation(BuildingKind),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(ColonyConfig::default().validate(), Ok(()));
    }

    #[test]
    fn cost_scales_with_level() {
        let config = BuildingConfig::default();
        let quarry = config.spec(BuildingKind::QUARRY).expect("quarry in catalog");
        let cost = quarry.cost_for(3);
        assert_eq!(cost[0], ResourceAmount::new(ResourceKind::Wood, 60.0));
        assert_eq!(cost[1], ResourceAmount::new(ResourceKind::Stone, 30.0));
    }

    #[test]
    fn crowded_initial_population_is_rejected() {
        let mut config = ColonyConfig::default();
        config.world.columns = 3;
        config.world.rows = 3;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InitialPopulationExceedsGrid {
                initial: 10,
                cells: 9
            })
        );
    }

    #[test]
    fn negative_or_missing_starvation_deviation_is_rejected() {
        let mut config = ColonyConfig::default();
        config.spores.starvation_std = -5.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidStarvationDeviation)
        );
        config.spores.starvation_std = f64::NAN;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidStarvationDeviation)
        );
    }

    #[test]
    fn negative_variances_are_rejected() {
        let mut config = ColonyConfig::default();
        config.resources.stocks[1].variance_percent = -20.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidVariance(ResourceKind::Wood))
        );

        let mut config = ColonyConfig::default();
        config.resources.consumption_variance_percent = -10.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidConsumptionVariance)
        );
    }

    #[test]
    fn zero_retry_tolerance_is_rejected() {
        let mut config = ColonyConfig::default();
        config.movement.retry_tolerance = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroRetryTolerance));
    }

    #[test]
    fn inverted_tech_bounds_are_rejected() {
        let mut config = ColonyConfig::default();
        config.buildings.tech_min = 4;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTechBounds { min: 4, max: 3 })
        );
    }

    #[test]
    fn duplicate_building_kinds_are_rejected() {
        let mut config = ColonyConfig::default();
        let farm = config.buildings.kinds[0].clone();
        config.buildings.kinds.push(farm);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateBuildingKind(BuildingKind::FARM))
        );
    }
}
