//! Authoritative building state management utilities.

use std::collections::{BTreeMap, HashMap};

use spore_colony_core::{BuildingId, BuildingKind, CellCoord, CellRect, TileCode};

/// Snapshot of a building stored inside the colony.
#[derive(Clone, Debug)]
pub(crate) struct BuildingState {
    /// Identifier allocated by the registry.
    pub(crate) id: BuildingId,
    /// Catalog code of the building.
    pub(crate) kind: BuildingKind,
    /// Current tech level.
    pub(crate) level: u8,
    /// Orientation index the footprint was placed with.
    pub(crate) orientation: usize,
    /// Region of cells occupied by the building.
    pub(crate) region: CellRect,
    /// Terrain replaced by the footprint, row-major.
    pub(crate) underlay: Vec<TileCode>,
}

/// Registry that stores buildings together with a tile to building index.
#[derive(Debug)]
pub(crate) struct BuildingRegistry {
    entries: BTreeMap<BuildingId, BuildingState>,
    tiles: HashMap<CellCoord, BuildingId>,
    next_building_id: BuildingId,
}

impl BuildingRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            tiles: HashMap::new(),
            next_building_id: BuildingId::new(0),
        }
    }

    /// Allocates the next identifier.
    pub(crate) fn allocate(&mut self) -> BuildingId {
        let id = self.next_building_id;
        self.next_building_id = BuildingId::new(id.get().saturating_add(1));
        id
    }

    /// Stores a building and indexes every tile of its footprint.
    pub(crate) fn insert(&mut self, state: BuildingState) {
        for cell in state.region.cells() {
            let _ = self.tiles.insert(cell, state.id);
        }
        let _ = self.entries.insert(state.id, state);
    }

    /// Removes a building and its tile index entries.
    pub(crate) fn remove(&mut self, id: BuildingId) -> Option<BuildingState> {
        let state = self.entries.remove(&id)?;
        for cell in state.region.cells() {
            let _ = self.tiles.remove(&cell);
        }
        Some(state)
    }

    /// Looks up a building by identifier.
    pub(crate) fn get(&self, id: BuildingId) -> Option<&BuildingState> {
        self.entries.get(&id)
    }

    /// Mutable access to a building. Footprints must not be changed through it.
    pub(crate) fn get_mut(&mut self, id: BuildingId) -> Option<&mut BuildingState> {
        self.entries.get_mut(&id)
    }

    /// Building covering `cell`, if any.
    pub(crate) fn building_at(&self, cell: CellCoord) -> Option<BuildingId> {
        self.tiles.get(&cell).copied()
    }

    /// Iterates buildings in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &BuildingState> {
        self.entries.values()
    }

    /// Iterates the tile index in coordinate order.
    pub(crate) fn tiles(&self) -> Vec<(CellCoord, BuildingId)> {
        let mut tiles: Vec<_> = self.tiles.iter().map(|(cell, id)| (*cell, *id)).collect();
        tiles.sort_unstable();
        tiles
    }
}
