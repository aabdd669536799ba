#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the spore colony simulation.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative colony, and the per-tick systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and reports every observable change
//! as an [`Event`]. Systems operate on the borrowed state types declared here
//! ([`OccupancyMap`], [`Terrain`], [`Storage`]) and never hold references into
//! each other.

use std::fmt;

use serde::{Deserialize, Serialize};

mod config;
mod occupancy;
mod storage;
mod terrain;

pub use config::{
    BuildingConfig, BuildingSpec, ColonyConfig, ConfigError, HappinessConfig, MovementConfig,
    ResourceAmount, ResourceConfig, ResourceSettings, SporeConfig, TerrainConfig, WorldConfig,
};
pub use occupancy::OccupancyMap;
pub use storage::{Stock, Storage};
pub use terrain::{Terrain, TileCode};

/// Commands that express all permissible colony mutations issued from outside a tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests construction of a building, searching for a placement when needed.
    BuildStructure {
        /// Catalog code of the building to construct.
        kind: BuildingKind,
        /// Tech level the building starts at.
        level: u8,
        /// Optional anchor (upper-left) cell of the footprint.
        location: Option<CellCoord>,
        /// Optional index into the building's orientation list.
        orientation: Option<i32>,
    },
    /// Raises the tech level of an existing building by one.
    UpgradeBuilding {
        /// Identifier of the building to upgrade.
        building: BuildingId,
    },
    /// Lowers the tech level of an existing building by one.
    DowngradeBuilding {
        /// Identifier of the building to downgrade.
        building: BuildingId,
    },
    /// Removes a building and restores the terrain beneath it.
    DemolishBuilding {
        /// Identifier of the building to demolish.
        building: BuildingId,
    },
    /// Moves a building to a new placement found by the placement search.
    RelocateBuilding {
        /// Identifier of the building to relocate.
        building: BuildingId,
        /// Optional anchor cell requested for the new footprint.
        location: Option<CellCoord>,
    },
    /// Directs a spore along a breadth-first route toward the destination.
    MoveSpore {
        /// Identifier of the spore to direct.
        spore: SporeId,
        /// Cell the spore should travel to.
        destination: CellCoord,
    },
    /// Removes a spore from the colony immediately.
    RemoveSpore {
        /// Identifier of the spore to remove.
        spore: SporeId,
    },
}

/// Events reported by the colony after ticks and commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that a tick ran every phase to completion.
    TickCompleted {
        /// Tick counter after the step finished.
        tick: u64,
        /// Living spores at the end of the tick.
        population: usize,
    },
    /// Announces that fewer than two spores remain, halting progression.
    ColonyDiedOut {
        /// Tick counter at which the colony was found extinct.
        tick: u64,
        /// Living spores remaining.
        population: usize,
    },
    /// Confirms that a new spore joined the colony.
    SporeBorn {
        /// Identifier assigned to the newborn.
        spore: SporeId,
        /// Cell the newborn was placed on.
        cell: CellCoord,
        /// Category assigned to the newborn.
        category: SporeCategory,
    },
    /// Confirms that a spore left the colony.
    SporeDied {
        /// Identifier of the spore that died.
        spore: SporeId,
        /// Cell the spore occupied.
        cell: CellCoord,
        /// Reason the spore was removed.
        cause: DeathCause,
    },
    /// Confirms that a building was constructed.
    BuildingPlaced {
        /// Identifier assigned to the building.
        building: BuildingId,
        /// Catalog code of the building.
        kind: BuildingKind,
        /// Tech level of the new building.
        level: u8,
        /// Footprint occupied by the building.
        region: CellRect,
    },
    /// Reports that a build request was refused.
    BuildingRejected {
        /// Catalog code that was requested.
        kind: BuildingKind,
        /// Reason the request failed.
        reason: PlacementError,
    },
    /// Confirms that a building changed tech level.
    BuildingLevelChanged {
        /// Identifier of the building.
        building: BuildingId,
        /// Tech level after the change.
        level: u8,
    },
    /// Reports that a level change was refused because a bound was reached.
    BuildingLevelUnchanged {
        /// Identifier of the building.
        building: BuildingId,
        /// Tech level the building keeps.
        level: u8,
    },
    /// Confirms that a building was removed.
    BuildingDemolished {
        /// Identifier of the removed building.
        building: BuildingId,
        /// Footprint the building used to occupy.
        region: CellRect,
    },
    /// Confirms that a building moved to a new footprint.
    BuildingRelocated {
        /// Identifier of the relocated building.
        building: BuildingId,
        /// Footprint before the move.
        from: CellRect,
        /// Footprint after the move.
        to: CellRect,
    },
    /// Reports that no placement was found for a relocation.
    BuildingRelocationRejected {
        /// Identifier of the building that stays in place.
        building: BuildingId,
    },
    /// Confirms that a spore received a directed route.
    SporeRouted {
        /// Identifier of the routed spore.
        spore: SporeId,
        /// Final cell of the route.
        destination: CellCoord,
        /// Number of steps in the route.
        hops: usize,
    },
    /// Reports that no route could be found for a spore.
    SporeRouteRejected {
        /// Identifier of the spore.
        spore: SporeId,
        /// Destination that could not be reached.
        destination: CellCoord,
    },
}

/// Reasons a spore can leave the colony.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// Health dropped to zero.
    Starvation,
    /// The spore's tile exceeded the crowd threshold.
    Famine,
    /// An explicit removal command.
    Removed,
}

/// Reasons a build request may be refused without being an invalid command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// Colony storage cannot cover the building cost.
    InsufficientResources,
    /// The requested anchor lies outside the grid.
    OutOfBounds,
    /// No location and orientation combination fits.
    NoValidPlacement,
}

/// Invalid arguments rejected at the command boundary.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The building code is not present in the catalog.
    #[error("unknown building kind {0}")]
    UnknownBuildingKind(BuildingKind),
    /// The resource code does not name a known resource.
    #[error("unknown resource code {0}")]
    UnknownResource(u16),
    /// Orientation indices must be non-negative.
    #[error("orientation index {0} is negative")]
    NegativeOrientation(i32),
    /// The orientation index exceeds the building's orientation list.
    #[error("orientation {index} out of range for building kind {kind} ({available} available)")]
    OrientationOutOfRange {
        /// Building kind the orientation was requested for.
        kind: BuildingKind,
        /// Requested orientation index.
        index: usize,
        /// Number of orientations the kind supports.
        available: usize,
    },
    /// The tech level falls outside the configured bounds.
    #[error("tech level {level} outside {min}..={max}")]
    TechLevelOutOfRange {
        /// Requested level.
        level: u8,
        /// Lowest allowed level.
        min: u8,
        /// Highest allowed level.
        max: u8,
    },
    /// No living spore carries the identifier.
    #[error("unknown spore {0}")]
    UnknownSpore(SporeId),
    /// No building carries the identifier.
    #[error("unknown building {0}")]
    UnknownBuilding(BuildingId),
    /// The cell lies outside the grid.
    #[error("cell {0} lies outside the grid")]
    OutOfBounds(CellCoord),
}

/// Unique identifier assigned to a spore. Identifiers are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SporeId(u32);

impl SporeId {
    /// Creates a new spore identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SporeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier assigned to a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(u32);

impl BuildingId {
    /// Creates a new building identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the building identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Catalog code identifying a type of building, e.g. `11` for a farm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingKind(u16);

impl BuildingKind {
    /// Farm producing food.
    pub const FARM: Self = Self(11);
    /// Lumber camp producing wood.
    pub const LUMBER_CAMP: Self = Self(21);
    /// Quarry producing stone.
    pub const QUARRY: Self = Self(22);

    /// Wraps a raw catalog code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Raw catalog code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resource types tracked by colony and personal storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Food, code 11. The only resource spores consume.
    Food,
    /// Wood, code 21.
    Wood,
    /// Stone, code 22.
    Stone,
    /// Metal, code 23.
    Metal,
}

impl ResourceKind {
    /// Every resource kind in code order.
    pub const ALL: [Self; 4] = [Self::Food, Self::Wood, Self::Stone, Self::Metal];

    /// Numeric resource code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Food => 11,
            Self::Wood => 21,
            Self::Stone => 22,
            Self::Metal => 23,
        }
    }
}

impl TryFrom<u16> for ResourceKind {
    type Error = CommandError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or(CommandError::UnknownResource(code))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Food => "food",
            Self::Wood => "wood",
            Self::Stone => "stone",
            Self::Metal => "metal",
        };
        f.write_str(name)
    }
}

/// Categorical tag carried by every spore.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SporeCategory {
    /// Category `A`, code 1.
    Alpha,
    /// Category `a`, code 2.
    AlphaRecessive,
    /// Category `B`, code 3.
    Beta,
    /// Category `b`, code 4.
    BetaRecessive,
}

impl SporeCategory {
    /// Numeric category code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Alpha => 1,
            Self::AlphaRecessive => 2,
            Self::Beta => 3,
            Self::BetaRecessive => 4,
        }
    }

    /// Short glyph used when presenting the category.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alpha => "A",
            Self::AlphaRecessive => "a",
            Self::Beta => "B",
            Self::BetaRecessive => "b",
        }
    }
}

/// One of the eight compass moves or staying put.
///
/// The numeric codes match the draws produced by the direction stream:
/// `0` stays, `1..=8` walk clockwise starting from south. Rows grow
/// southward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Remain on the current cell.
    Stay,
    /// Toward increasing row indices.
    South,
    /// Toward increasing column and row indices.
    SouthEast,
    /// Toward increasing column indices.
    East,
    /// Toward increasing columns and decreasing rows.
    NorthEast,
    /// Toward decreasing row indices.
    North,
    /// Toward decreasing column and row indices.
    NorthWest,
    /// Toward decreasing column indices.
    West,
    /// Toward decreasing columns and increasing rows.
    SouthWest,
}

impl Direction {
    /// Number of distinct direction codes.
    pub const COUNT: u8 = 9;

    /// Every direction ordered by code.
    pub const ALL: [Self; 9] = [
        Self::Stay,
        Self::South,
        Self::SouthEast,
        Self::East,
        Self::NorthEast,
        Self::North,
        Self::NorthWest,
        Self::West,
        Self::SouthWest,
    ];

    /// Resolves a direction from its numeric code.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Column and row offsets applied by the direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Stay => (0, 0),
            Self::South => (0, 1),
            Self::SouthEast => (1, 1),
            Self::East => (1, 0),
            Self::NorthEast => (1, -1),
            Self::North => (0, -1),
            Self::NorthWest => (-1, -1),
            Self::West => (-1, 0),
            Self::SouthWest => (-1, 1),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Computes the Chebyshev (king-move) distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column()
            .abs_diff(other.column())
            .max(self.row().abs_diff(other.row()))
    }

    /// Applies a direction, returning `None` when the result leaves a
    /// `columns x rows` grid.
    #[must_use]
    pub fn step(self, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
        let (column_delta, row_delta) = direction.delta();
        let column = i64::from(self.column) + i64::from(column_delta);
        let row = i64::from(self.row) + i64::from(row_delta);
        if column < 0 || row < 0 || column >= i64::from(columns) || row >= i64::from(rows) {
            return None;
        }

        Some(CellCoord::new(
            u32::try_from(column).ok()?,
            u32::try_from(row).ok()?,
        ))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the rectangle lies entirely inside a `columns x rows` grid.
    #[must_use]
    pub fn fits_within(&self, columns: u32, rows: u32) -> bool {
        let right = u64::from(self.origin.column()) + u64::from(self.size.width());
        let bottom = u64::from(self.origin.row()) + u64::from(self.size.height());
        right <= u64::from(columns) && bottom <= u64::from(rows)
    }

    /// Iterates the covered cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let width = self.size.width();
        let height = self.size.height();
        (0..height).flat_map(move |row_offset| {
            (0..width).map(move |column_offset| {
                CellCoord::new(
                    origin.column().saturating_add(column_offset),
                    origin.row().saturating_add(row_offset),
                )
            })
        })
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = u64::from(cell.column());
        let row = u64::from(cell.row());
        let left = u64::from(self.origin.column());
        let top = u64::from(self.origin.row());
        column >= left
            && row >= top
            && column < left + u64::from(self.size.width())
            && row < top + u64::from(self.size.height())
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}
