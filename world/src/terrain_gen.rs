//! Seeded terrain generation.

use rand::seq::SliceRandom;
use spore_colony_core::{CellCoord, Terrain, TileCode, WorldConfig};
use spore_colony_random::{stream_rng, Stream};

/// Builds a grass terrain and scatters water, mountains and trees over it.
///
/// Each feature covers `percent` of the cells, rounded down, on cells drawn
/// without replacement from the terrain stream.
pub(crate) fn generate(config: &WorldConfig) -> Terrain {
    let mut terrain = Terrain::filled(config.columns, config.rows, TileCode::GRASS);
    let mut cells: Vec<CellCoord> = (0..config.rows)
        .flat_map(|row| (0..config.columns).map(move |column| CellCoord::new(column, row)))
        .collect();
    cells.shuffle(&mut stream_rng(config.seed, Stream::Terrain));

    let features = [
        (TileCode::WATER, config.terrain.water_percent),
        (TileCode::MOUNTAIN, config.terrain.mountain_percent),
        (TileCode::TREE, config.terrain.tree_percent),
    ];
    let total = cells.len();
    let mut remaining = cells.into_iter();
    for (tile, percent) in features {
        let count = total * usize::from(percent) / 100;
        for cell in remaining.by_ref().take(count) {
            terrain.set_tile(cell, tile);
        }
    }
    terrain
}

#[cfg(test)]
mod tests {
    use super::*;
    use spore_colony_core::TerrainConfig;

    fn count(terrain: &Terrain, tile: TileCode) -> usize {
        terrain.tiles().iter().filter(|code| **code == tile).count()
    }

    #[test]
    fn default_terrain_is_all_grass() {
        let terrain = generate(&WorldConfig::default());
        assert_eq!(count(&terrain, TileCode::GRASS), 32 * 16);
    }

    #[test]
    fn percentages_are_honoured_and_reproducible() {
        let config = WorldConfig {
            columns: 10,
            rows: 10,
            seed: 4,
            terrain: TerrainConfig {
                water_percent: 10,
                mountain_percent: 5,
                tree_percent: 20,
            },
            ..WorldConfig::default()
        };

        let terrain = generate(&config);

        assert_eq!(count(&terrain, TileCode::WATER), 10);
        assert_eq!(count(&terrain, TileCode::MOUNTAIN), 5);
        assert_eq!(count(&terrain, TileCode::TREE), 20);
        assert_eq!(count(&terrain, TileCode::GRASS), 65);
        assert_eq!(terrain, generate(&config));
    }
}
