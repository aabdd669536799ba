use spore_colony_core::{
    BuildingConfig, BuildingKind, BuildingSpec, CellCoord, CellRectSize, CommandError, Terrain,
    TileCode,
};
use spore_colony_system_builder::{Placement, PlacementSearch};

fn farm() -> BuildingSpec {
    BuildingConfig::default()
        .spec(BuildingKind::FARM)
        .cloned()
        .expect("farm in default catalog")
}

#[test]
fn water_under_the_footprint_fails_closed() {
    let mut terrain = Terrain::filled(2, 1, TileCode::GRASS);
    terrain.set_tile(CellCoord::new(1, 0), TileCode::WATER);
    let mut search = PlacementSearch::new(0);

    let found = search.search(&farm(), Some(CellCoord::new(0, 0)), Some(0), &terrain, |_| false);

    assert_eq!(found, Ok(None));
}

#[test]
fn explicit_location_and_orientation_are_validated_directly() {
    let terrain = Terrain::filled(4, 4, TileCode::GRASS);
    let mut search = PlacementSearch::new(0);

    let found = search.search(&farm(), Some(CellCoord::new(1, 2)), Some(1), &terrain, |_| false);

    assert_eq!(
        found,
        Ok(Some(Placement {
            origin: CellCoord::new(1, 2),
            orientation: 1,
            size: CellRectSize::new(1, 2),
        }))
    );
}

#[test]
fn location_only_picks_among_fitting_orientations() {
    let terrain = Terrain::filled(1, 2, TileCode::GRASS);
    let mut search = PlacementSearch::new(3);

    let found = search
        .search(&farm(), Some(CellCoord::new(0, 0)), None, &terrain, |_| false)
        .expect("valid request")
        .expect("vertical farm fits");

    assert_eq!(found.orientation, 1);
}

#[test]
fn orientation_only_searches_free_tiles_with_that_footprint() {
    let terrain = Terrain::filled(1, 3, TileCode::GRASS);
    let mut search = PlacementSearch::new(5);

    let found = search
        .search(&farm(), None, Some(1), &terrain, |_| false)
        .expect("valid request")
        .expect("vertical farm fits");

    assert_eq!(found.size, CellRectSize::new(1, 2));
    assert!(found.region().fits_within(1, 3));
}

#[test]
fn unconstrained_search_avoids_occupied_cells() {
    let terrain = Terrain::filled(6, 6, TileCode::GRASS);
    let blocked = |cell: CellCoord| cell.column() < 4;
    let mut search = PlacementSearch::new(11);

    for _ in 0..10 {
        let found = search
            .search(&farm(), None, None, &terrain, blocked)
            .expect("valid request")
            .expect("room on the right");
        assert!(found.region().cells().all(|cell| !blocked(cell)));
    }
}

#[test]
fn exhausted_search_reports_no_placement() {
    let terrain = Terrain::filled(5, 5, TileCode::WATER);
    let mut search = PlacementSearch::new(0);

    assert_eq!(search.search(&farm(), None, None, &terrain, |_| false), Ok(None));
}

#[test]
fn orientation_beyond_the_catalog_is_rejected() {
    let terrain = Terrain::filled(5, 5, TileCode::GRASS);
    let mut search = PlacementSearch::new(0);

    assert_eq!(
        search.search(&farm(), None, Some(2), &terrain, |_| false),
        Err(CommandError::OrientationOutOfRange {
            kind: BuildingKind::FARM,
            index: 2,
            available: 2,
        })
    );
}
