#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Building placement search over terrain and the combined occupancy view.

use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use spore_colony_core::{BuildingSpec, CellCoord, CellRect, CellRectSize, CommandError, Terrain};
use spore_colony_random::{stream_rng, Stream};
use tracing::debug;

/// Accepted footprint for a building.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Anchor (upper-left) cell of the footprint.
    pub origin: CellCoord,
    /// Index of the orientation that was chosen.
    pub orientation: usize,
    /// Footprint size of that orientation.
    pub size: CellRectSize,
}

impl Placement {
    /// Rectangle covered by the footprint.
    #[must_use]
    pub const fn region(&self) -> CellRect {
        CellRect::from_origin_and_size(self.origin, self.size)
    }
}

/// Reports whether `region` lies on buildable terrain and overlaps nothing.
pub fn footprint_fits<F>(terrain: &Terrain, region: CellRect, is_occupied: F) -> bool
where
    F: Fn(CellCoord) -> bool,
{
    region.fits_within(terrain.columns(), terrain.rows())
        && region
            .cells()
            .all(|cell| terrain.is_buildable(cell) && !is_occupied(cell))
}

/// Stateful search that owns the placement stream and the free-tile cache.
#[derive(Debug)]
pub struct PlacementSearch {
    rng: ChaCha8Rng,
    free_tiles: Vec<CellCoord>,
}

impl PlacementSearch {
    /// Creates a search drawing from the seed's construction stream.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: stream_rng(seed, Stream::Construction),
            free_tiles: Vec::new(),
        }
    }

    /// Finds a footprint for `spec`.
    ///
    /// With both `location` and `orientation` the footprint is validated as
    /// given. With only an orientation, or with neither, shuffled free tiles
    /// are popped until one validates, trying the given orientation or every
    /// orientation in order. With only a location, one of the orientations
    /// that fit there is picked uniformly. `Ok(None)` means nothing fits.
    pub fn search<F>(
        &mut self,
        spec: &BuildingSpec,
        location: Option<CellCoord>,
        orientation: Option<usize>,
        terrain: &Terrain,
        is_occupied: F,
    ) -> Result<Option<Placement>, CommandError>
    where
        F: Fn(CellCoord) -> bool,
    {
        if let Some(index) = orientation {
            if index >= spec.orientations.len() {
                return Err(CommandError::OrientationOutOfRange {
                    kind: spec.kind,
                    index,
                    available: spec.orientations.len(),
                });
            }
        }

        let placement = match (location, orientation) {
            (Some(origin), Some(index)) => candidate(spec, origin, index)
                .filter(|placement| footprint_fits(terrain, placement.region(), &is_occupied)),
            (Some(origin), None) => {
                let fitting: Vec<Placement> = (0..spec.orientations.len())
                    .filter_map(|index| candidate(spec, origin, index))
                    .filter(|placement| footprint_fits(terrain, placement.region(), &is_occupied))
                    .collect();
                fitting.choose(&mut self.rng).copied()
            }
            (None, only) => self.pop_free_tiles(spec, only, terrain, &is_occupied),
        };

        self.free_tiles.clear();
        debug!(kind = %spec.kind, found = placement.is_some(), "placement search finished");
        Ok(placement)
    }

    fn pop_free_tiles<F>(
        &mut self,
        spec: &BuildingSpec,
        orientation: Option<usize>,
        terrain: &Terrain,
        is_occupied: &F,
    ) -> Option<Placement>
    where
        F: Fn(CellCoord) -> bool,
    {
        self.free_tiles.clear();
        self.free_tiles.extend(
            (0..terrain.rows())
                .flat_map(|row| (0..terrain.columns()).map(move |column| CellCoord::new(column, row)))
                .filter(|cell| !is_occupied(*cell)),
        );
        self.free_tiles.shuffle(&mut self.rng);

        let orientations: Vec<usize> = match orientation {
            Some(index) => vec![index],
            None => (0..spec.orientations.len()).collect(),
        };
        while let Some(origin) = self.free_tiles.pop() {
            let found = orientations
                .iter()
                .filter_map(|index| candidate(spec, origin, *index))
                .find(|placement| footprint_fits(terrain, placement.region(), is_occupied));
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

fn candidate(spec: &BuildingSpec, origin: CellCoord, orientation: usize) -> Option<Placement> {
    spec.orientations
        .get(orientation)
        .map(|size| Placement {
            origin,
            orientation,
            size: *size,
        })
}
