//! Breadth-first route planning used by directed spore movement.

use std::collections::VecDeque;

use spore_colony_core::CellCoord;

/// Dense distance grid seeded from a single destination.
///
/// Distances are filled by a reverse breadth-first search over 4-connected
/// neighbours and default to `u32::MAX` for unreachable or blocked cells.
#[derive(Clone, Debug, Default)]
pub(crate) struct NavigationField {
    width: u32,
    height: u32,
    distances: Vec<u32>,
}

impl NavigationField {
    /// Rebuilds the distances toward `destination`.
    pub(crate) fn rebuild_with<F>(
        &mut self,
        width: u32,
        height: u32,
        destination: CellCoord,
        mut is_blocked: F,
    ) where
        F: FnMut(CellCoord) -> bool,
    {
        let width_usize = usize::try_from(width).unwrap_or(0);
        let height_usize = usize::try_from(height).unwrap_or(0);
        let cell_count = width_usize.checked_mul(height_usize).unwrap_or(0);

        self.width = width;
        self.height = height;
        self.distances.clear();
        self.distances.resize(cell_count, u32::MAX);

        if destination.column() >= width || destination.row() >= height || is_blocked(destination)
        {
            return;
        }
        let Some(start) = index(width_usize, destination) else {
            return;
        };
        self.distances[start] = 0;

        let mut queue = VecDeque::from([destination]);
        while let Some(cell) = queue.pop_front() {
            let Some(current) = index(width_usize, cell) else {
                continue;
            };
            let next_distance = self.distances[current].saturating_add(1);

            for neighbor in neighbors(cell, width, height) {
                if is_blocked(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = index(width_usize, neighbor) else {
                    continue;
                };
                if self.distances[neighbor_index] <= next_distance {
                    continue;
                }
                self.distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }
    }

    /// Distance captured for the provided cell, if it lies within the field and is reachable.
    pub(crate) fn distance(&self, cell: CellCoord) -> Option<u32> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        index(width, cell)
            .and_then(|offset| self.distances.get(offset).copied())
            .filter(|distance| *distance != u32::MAX)
    }

    /// Walks down the distance gradient from `start`.
    ///
    /// Returns the hops after `start` up to and including the destination, or
    /// `None` when `start` cannot reach it.
    pub(crate) fn route_from(&self, start: CellCoord) -> Option<VecDeque<CellCoord>> {
        let mut remaining = self.distance(start)?;
        let mut route = VecDeque::new();
        let mut cell = start;
        while remaining > 0 {
            cell = neighbors(cell, self.width, self.height)
                .find(|neighbor| self.distance(*neighbor) == Some(remaining - 1))?;
            route.push_back(cell);
            remaining -= 1;
        }
        Some(route)
    }
}

/// Plans a 4-connected route from `start` to `destination`.
///
/// `start` itself is never treated as blocked.
pub(crate) fn plan_route<F>(
    width: u32,
    height: u32,
    start: CellCoord,
    destination: CellCoord,
    is_blocked: F,
) -> Option<VecDeque<CellCoord>>
where
    F: Fn(CellCoord) -> bool,
{
    let mut field = NavigationField::default();
    field.rebuild_with(width, height, destination, |cell| {
        cell != start && is_blocked(cell)
    });
    field.route_from(start)
}

fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < width {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < height {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
