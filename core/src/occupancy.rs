//! Sparse coordinate to occupant-list mapping rebuilt every tick.

use std::collections::BTreeMap;

use crate::{CellCoord, SporeId};

/// Maps occupied cells to the ordered list of spores standing on them.
///
/// Only occupied cells have entries; removing the last occupant of a cell
/// removes the entry. Cells iterate in ascending `(column, row)` order, which
/// is the order the movement resolver visits spores in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OccupancyMap {
    cells: BTreeMap<CellCoord, Vec<SporeId>>,
}

impl OccupancyMap {
    /// Creates an empty occupancy map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `spore` to the occupant list of `cell`.
    pub fn insert(&mut self, cell: CellCoord, spore: SporeId) {
        self.cells.entry(cell).or_default().push(spore);
    }

    /// Removes `spore` from `cell`, dropping the entry once it empties.
    ///
    /// Returns whether the spore was found on the cell.
    pub fn remove(&mut self, cell: CellCoord, spore: SporeId) -> bool {
        let Some(occupants) = self.cells.get_mut(&cell) else {
            return false;
        };
        let Some(position) = occupants.iter().position(|occupant| *occupant == spore) else {
            return false;
        };
        let _ = occupants.remove(position);
        if occupants.is_empty() {
            let _ = self.cells.remove(&cell);
        }
        true
    }

    /// Spores standing on `cell`, in arrival order.
    #[must_use]
    pub fn occupants(&self, cell: CellCoord) -> &[SporeId] {
        self.cells.get(&cell).map_or(&[], Vec::as_slice)
    }

    /// Whether any spore stands on `cell`.
    #[must_use]
    pub fn is_occupied(&self, cell: CellCoord) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Finds the cell a spore stands on by scanning every entry.
    #[must_use]
    pub fn locate(&self, spore: SporeId) -> Option<CellCoord> {
        self.cells
            .iter()
            .find(|(_, occupants)| occupants.contains(&spore))
            .map(|(cell, _)| *cell)
    }

    /// Iterates occupied cells and their occupants.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &[SporeId])> + '_ {
        self.cells
            .iter()
            .map(|(cell, occupants)| (*cell, occupants.as_slice()))
    }

    /// Iterates every `(cell, spore)` pair in resolver order.
    pub fn placements(&self) -> impl Iterator<Item = (CellCoord, SporeId)> + '_ {
        self.cells
            .iter()
            .flat_map(|(cell, occupants)| occupants.iter().map(move |spore| (*cell, *spore)))
    }

    /// Total number of spores across every cell.
    #[must_use]
    pub fn occupant_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Whether no spore stands anywhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
