//! Fixed-size terrain bitmap read by movement and placement and stamped by construction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BuildingKind, CellCoord, CellRect};

/// Integer classification of a single terrain tile.
///
/// Codes `101..=200` are vegetation, `201..=300` water, `301..=500` solids.
/// Four-digit codes starting at `7000` are building footprints: the anchor
/// tile stores `7000 + kind * 10 + tech` and every other footprint tile the
/// zero-suffixed `7000 + kind * 10`, meaning "occupied, no glyph".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileCode(u32);

impl TileCode {
    /// Open grass, the only passable and buildable tile.
    pub const GRASS: Self = Self(101);
    /// Trees.
    pub const TREE: Self = Self(111);
    /// Water.
    pub const WATER: Self = Self(201);
    /// Mountain.
    pub const MOUNTAIN: Self = Self(301);

    const BUILDING_BASE: u32 = 7_000;

    /// Wraps a raw tile code.
    #[must_use]
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// Raw tile code.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Code written to a building's anchor tile.
    #[must_use]
    pub const fn building_anchor(kind: BuildingKind, tech: u8) -> Self {
        Self(Self::BUILDING_BASE + kind.code() as u32 * 10 + tech as u32)
    }

    /// Code written to every non-anchor tile of a building footprint.
    #[must_use]
    pub const fn building_area(kind: BuildingKind) -> Self {
        Self(Self::BUILDING_BASE + kind.code() as u32 * 10)
    }

    /// Whether spores may stand on the tile.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        self.0 == Self::GRASS.0
    }

    /// Whether a building footprint may cover the tile.
    #[must_use]
    pub const fn is_buildable(self) -> bool {
        self.0 == Self::GRASS.0
    }

    /// Whether the tile belongs to a building footprint.
    #[must_use]
    pub const fn is_building(self) -> bool {
        self.0 >= Self::BUILDING_BASE
    }
}

impl fmt::Display for TileCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dense row-major terrain grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terrain {
    columns: u32,
    rows: u32,
    tiles: Vec<TileCode>,
}

impl Terrain {
    /// Creates a terrain where every tile carries `tile`.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, tile: TileCode) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            tiles: vec![tile; count],
        }
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Row-major tile codes.
    #[must_use]
    pub fn tiles(&self) -> &[TileCode] {
        &self.tiles
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Tile at `cell`, or `None` outside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileCode> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Overwrites the tile at `cell`. Cells outside the grid are ignored.
    pub fn set_tile(&mut self, cell: CellCoord, tile: TileCode) {
        if let Some(slot) = self.index(cell).and_then(|index| self.tiles.get_mut(index)) {
            *slot = tile;
        }
    }

    /// Whether a spore may stand on `cell`. Cells outside the grid are never passable.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> bool {
        self.tile(cell).is_some_and(TileCode::is_passable)
    }

    /// Whether a footprint may cover `cell`. Cells outside the grid are never buildable.
    #[must_use]
    pub fn is_buildable(&self, cell: CellCoord) -> bool {
        self.tile(cell).is_some_and(TileCode::is_buildable)
    }

    /// Burns a building footprint into the terrain.
    ///
    /// Returns the replaced tiles in row-major footprint order so that the
    /// footprint can later be lifted with [`Terrain::restore`].
    pub fn stamp_building(&mut self, region: CellRect, kind: BuildingKind, tech: u8) -> Vec<TileCode> {
        let origin = region.origin();
        let mut underlay = Vec::new();
        for cell in region.cells() {
            underlay.push(self.tile(cell).unwrap_or(TileCode::GRASS));
            let code = if cell == origin {
                TileCode::building_anchor(kind, tech)
            } else {
                TileCode::building_area(kind)
            };
            self.set_tile(cell, code);
        }
        underlay
    }

    /// Rewrites only the anchor code of a stamped footprint, e.g. after a level change.
    pub fn restamp_anchor(&mut self, region: CellRect, kind: BuildingKind, tech: u8) {
        self.set_tile(region.origin(), TileCode::building_anchor(kind, tech));
    }

    /// Writes back tiles captured by [`Terrain::stamp_building`].
    pub fn restore(&mut self, region: CellRect, underlay: &[TileCode]) {
        for (cell, tile) in region.cells().zip(underlay.iter().copied()) {
            self.set_tile(cell, tile);
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}
