use spore_colony_core::{
    BuildingId, BuildingKind, CellCoord, CellRect, ColonyConfig, Command, CommandError, Event,
    PlacementError, ResourceKind, Terrain, TileCode,
};
use spore_colony_world::{self as world, query, Colony};

fn colony_on(terrain: Terrain) -> Colony {
    Colony::with_terrain(ColonyConfig::default(), terrain).expect("valid configuration")
}

fn grass() -> Terrain {
    Terrain::filled(32, 16, TileCode::GRASS)
}

fn build(colony: &mut Colony, kind: BuildingKind, level: u8) -> (BuildingId, CellRect) {
    let mut events = Vec::new();
    world::apply(
        colony,
        Command::BuildStructure {
            kind,
            level,
            location: None,
            orientation: None,
        },
        &mut events,
    )
    .expect("valid build request");
    match events.as_slice() {
        [Event::BuildingPlaced {
            building, region, ..
        }] => (*building, *region),
        other => panic!("unexpected events {other:?}"),
    }
}

fn building_tiles(terrain: &Terrain) -> usize {
    terrain.tiles().iter().filter(|tile| tile.is_building()).count()
}

#[test]
fn water_under_the_requested_footprint_rejects_the_build() {
    let mut terrain = grass();
    terrain.set_tile(CellCoord::new(1, 0), TileCode::WATER);
    let mut colony = colony_on(terrain);
    let terrain_before = query::terrain(&colony).clone();
    let storage_before = query::colony_storage(&colony);
    let mut events = Vec::new();

    world::apply(
        &mut colony,
        Command::BuildStructure {
            kind: BuildingKind::FARM,
            level: 1,
            location: Some(CellCoord::new(0, 0)),
            orientation: Some(0),
        },
        &mut events,
    )
    .expect("valid build request");

    assert_eq!(
        events,
        vec![Event::BuildingRejected {
            kind: BuildingKind::FARM,
            reason: PlacementError::NoValidPlacement,
        }]
    );
    assert_eq!(query::terrain(&colony), &terrain_before);
    assert_eq!(query::colony_storage(&colony), storage_before);
    assert!(query::buildings(&colony).is_empty());
    assert!(query::building_occupancy(&colony).is_empty());
}

#[test]
fn successful_builds_charge_resources_and_stamp_terrain() {
    let mut colony = colony_on(grass());
    let wood_before = query::resource(&colony, ResourceKind::Wood);

    let (id, region) = build(&mut colony, BuildingKind::FARM, 1);

    assert_eq!(query::resource(&colony, ResourceKind::Wood), wood_before - 20.0);
    let terrain = query::terrain(&colony);
    assert_eq!(terrain.tile(region.origin()), Some(TileCode::new(7_111)));
    for cell in region.cells() {
        assert_eq!(query::building_at(&colony, cell), Some(id));
        if cell != region.origin() {
            assert_eq!(terrain.tile(cell), Some(TileCode::new(7_110)));
        }
        assert!(!query::occupancy(&colony).is_occupied(cell));
    }
    assert_eq!(building_tiles(terrain), 2);
}

#[test]
fn spores_never_walk_onto_footprints() {
    let mut colony = colony_on(grass());
    let (_, region) = build(&mut colony, BuildingKind::QUARRY, 1);
    let mut events = Vec::new();

    for _ in 0..30 {
        assert!(colony.progress_a_step(&mut events).expect("tick succeeds"));
        assert!(region
            .cells()
            .all(|cell| !query::occupancy(&colony).is_occupied(cell)));
    }
}

#[test]
fn unaffordable_builds_are_rejected_without_charge() {
    let mut colony = colony_on(grass());
    let storage_before = query::colony_storage(&colony);
    let mut events = Vec::new();

    world::apply(
        &mut colony,
        Command::BuildStructure {
            kind: BuildingKind::LUMBER_CAMP,
            level: 3,
            location: None,
            orientation: None,
        },
        &mut events,
    )
    .expect("valid build request");

    assert_eq!(
        events,
        vec![Event::BuildingRejected {
            kind: BuildingKind::LUMBER_CAMP,
            reason: PlacementError::InsufficientResources,
        }]
    );
    assert_eq!(query::colony_storage(&colony), storage_before);
}

#[test]
fn out_of_grid_locations_are_rejected() {
    let mut colony = colony_on(grass());
    let mut events = Vec::new();

    world::apply(
        &mut colony,
        Command::BuildStructure {
            kind: BuildingKind::FARM,
            level: 1,
            location: Some(CellCoord::new(40, 2)),
            orientation: None,
        },
        &mut events,
    )
    .expect("valid build request");

    assert_eq!(
        events,
        vec![Event::BuildingRejected {
            kind: BuildingKind::FARM,
            reason: PlacementError::OutOfBounds,
        }]
    );
}

#[test]
fn malformed_build_requests_are_typed_errors() {
    let mut colony = colony_on(grass());
    let mut events = Vec::new();
    let mut request = |kind, level, orientation| {
        world::apply(
            &mut colony,
            Command::BuildStructure {
                kind,
                level,
                location: None,
                orientation,
            },
            &mut events,
        )
    };

    assert_eq!(
        request(BuildingKind::new(99), 1, None),
        Err(CommandError::UnknownBuildingKind(BuildingKind::new(99)))
    );
    assert_eq!(
        request(BuildingKind::FARM, 1, Some(-1)),
        Err(CommandError::NegativeOrientation(-1))
    );
    assert_eq!(
        request(BuildingKind::FARM, 1, Some(5)),
        Err(CommandError::OrientationOutOfRange {
            kind: BuildingKind::FARM,
            index: 5,
            available: 2,
        })
    );
    assert_eq!(
        request(BuildingKind::FARM, 4, None),
        Err(CommandError::TechLevelOutOfRange {
            level: 4,
            min: 1,
            max: 3,
        })
    );
    drop(request);
    assert!(events.is_empty());
}

#[test]
fn level_changes_stay_within_bounds() {
    let mut colony = colony_on(grass());
    let (id, region) = build(&mut colony, BuildingKind::FARM, 1);
    let mut events = Vec::new();

    for _ in 0..3 {
        world::apply(&mut colony, Command::UpgradeBuilding { building: id }, &mut events)
            .expect("known building");
    }
    assert_eq!(
        events,
        vec![
            Event::BuildingLevelChanged {
                building: id,
                level: 2,
            },
            Event::BuildingLevelChanged {
                building: id,
                level: 3,
            },
            Event::BuildingLevelUnchanged {
                building: id,
                level: 3,
            },
        ]
    );
    assert_eq!(
        query::terrain(&colony).tile(region.origin()),
        Some(TileCode::new(7_113))
    );

    events.clear();
    for _ in 0..3 {
        world::apply(&mut colony, Command::DowngradeBuilding { building: id }, &mut events)
            .expect("known building");
    }
    assert_eq!(
        events.last(),
        Some(&Event::BuildingLevelUnchanged {
            building: id,
            level: 1,
        })
    );
    assert_eq!(query::building(&colony, id).map(|state| state.level), Some(1));
}

#[test]
fn demolition_restores_the_terrain_without_refund() {
    let mut terrain = grass();
    terrain.set_tile(CellCoord::new(0, 0), TileCode::TREE);
    let mut colony = colony_on(terrain);
    let terrain_before = query::terrain(&colony).clone();
    let (id, region) = build(&mut colony, BuildingKind::FARM, 1);
    let wood_after_build = query::resource(&colony, ResourceKind::Wood);
    let mut events = Vec::new();

    world::apply(&mut colony, Command::DemolishBuilding { building: id }, &mut events)
        .expect("known building");

    assert_eq!(
        events,
        vec![Event::BuildingDemolished {
            building: id,
            region,
        }]
    );
    assert_eq!(query::terrain(&colony), &terrain_before);
    assert_eq!(query::resource(&colony, ResourceKind::Wood), wood_after_build);
    assert!(query::building_occupancy(&colony).is_empty());
    assert_eq!(
        world::apply(&mut colony, Command::DemolishBuilding { building: id }, &mut events),
        Err(CommandError::UnknownBuilding(id))
    );
}

#[test]
fn relocation_moves_the_footprint() {
    let mut colony = colony_on(grass());
    let (id, from) = build(&mut colony, BuildingKind::LUMBER_CAMP, 1);
    let mut events = Vec::new();

    world::apply(
        &mut colony,
        Command::RelocateBuilding {
            building: id,
            location: None,
        },
        &mut events,
    )
    .expect("known building");

    let to = match events.as_slice() {
        [Event::BuildingRelocated {
            building,
            from: reported,
            to,
        }] => {
            assert_eq!(*building, id);
            assert_eq!(*reported, from);
            *to
        }
        other => panic!("unexpected events {other:?}"),
    };
    let terrain = query::terrain(&colony);
    assert_eq!(terrain.tile(to.origin()), Some(TileCode::new(7_211)));
    assert_eq!(building_tiles(terrain), 4);
    assert_eq!(query::building_occupancy(&colony).len(), 4);
    assert!(to.cells().all(|cell| query::building_at(&colony, cell) == Some(id)));
}

#[test]
fn failed_relocation_keeps_the_building_in_place() {
    let mut terrain = grass();
    terrain.set_tile(CellCoord::new(5, 5), TileCode::WATER);
    let mut colony = colony_on(terrain);
    let (id, region) = build(&mut colony, BuildingKind::FARM, 1);
    let terrain_before = query::terrain(&colony).clone();
    let mut events = Vec::new();

    world::apply(
        &mut colony,
        Command::RelocateBuilding {
            building: id,
            location: Some(CellCoord::new(5, 5)),
        },
        &mut events,
    )
    .expect("known building");

    assert_eq!(events, vec![Event::BuildingRelocationRejected { building: id }]);
    assert_eq!(query::terrain(&colony), &terrain_before);
    assert_eq!(query::building(&colony, id).map(|state| state.region), Some(region));
    assert_eq!(
        world::apply(
            &mut colony,
            Command::RelocateBuilding {
                building: id,
                location: Some(CellCoord::new(0, 16)),
            },
            &mut events,
        ),
        Err(CommandError::OutOfBounds(CellCoord::new(0, 16)))
    );
}
