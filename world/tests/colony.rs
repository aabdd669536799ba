use spore_colony_core::{
    CellCoord, ColonyConfig, Command, CommandError, DeathCause, Event, SporeCategory, SporeId,
};
use spore_colony_world::{self as world, query, Colony};

fn default_colony() -> Colony {
    Colony::new(ColonyConfig::default()).expect("default configuration is valid")
}

#[test]
fn first_tick_keeps_population_and_moves_each_spore_at_most_one_tile() {
    let mut colony = default_colony();
    let before = query::spores(&colony);
    let counts = query::category_counts(&colony);
    assert_eq!(before.len(), 10);
    assert_eq!(counts.get(&SporeCategory::Alpha), Some(&5));
    assert_eq!(counts.get(&SporeCategory::Beta), Some(&5));

    let mut events = Vec::new();
    let alive = colony.progress_a_step(&mut events).expect("tick succeeds");

    assert!(alive);
    assert_eq!(query::population(&colony), 10);
    assert_eq!(query::tick(&colony), 1);
    let after = query::spores(&colony);
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.id, new.id);
        assert!(old.cell.chebyshev_distance(new.cell) <= 1);
        assert_eq!(new.age, 1);
    }
    assert_eq!(query::occupancy(&colony).occupied_cells(), 10);
    assert!(events.contains(&Event::TickCompleted {
        tick: 1,
        population: 10,
    }));
}

#[test]
fn occupancy_lists_every_living_spore_exactly_once() {
    let mut colony = default_colony();
    let mut events = Vec::new();

    for _ in 0..80 {
        assert!(colony.progress_a_step(&mut events).expect("tick succeeds"));
        let occupancy = query::occupancy(&colony);
        let mut listed: Vec<SporeId> = occupancy.placements().map(|(_, spore)| spore).collect();
        listed.sort();
        let living: Vec<SporeId> = query::spores(&colony).iter().map(|spore| spore.id).collect();
        assert_eq!(listed, living);
        assert_eq!(listed.len(), query::population(&colony));
        assert!(occupancy
            .iter()
            .all(|(cell, occupants)| cell.column() < 32 && cell.row() < 16 && !occupants.is_empty()));
    }
}

#[test]
fn a_single_survivor_halts_progression_without_mutation() {
    let mut colony = default_colony();
    let mut events = Vec::new();
    let ids: Vec<SporeId> = query::spores(&colony).iter().map(|spore| spore.id).collect();
    for id in &ids[1..] {
        world::apply(&mut colony, Command::RemoveSpore { spore: *id }, &mut events)
            .expect("living spore");
    }
    assert_eq!(query::population(&colony), 1);

    let spores = query::spores(&colony);
    let storage = query::colony_storage(&colony);
    let occupancy = query::occupancy(&colony).clone();
    let mut tick_events = Vec::new();

    let alive = colony.progress_a_step(&mut tick_events).expect("tick succeeds");

    assert!(!alive);
    assert_eq!(
        tick_events,
        vec![Event::ColonyDiedOut {
            tick: 0,
            population: 1,
        }]
    );
    assert_eq!(query::spores(&colony), spores);
    assert_eq!(query::colony_storage(&colony), storage);
    assert_eq!(query::occupancy(&colony), &occupancy);
    assert_eq!(query::tick(&colony), 0);
    assert!(query::is_extinct(&colony));
}

#[test]
fn population_never_shrinks_without_starvation_or_crowding() {
    let mut config = ColonyConfig::default();
    config.spores.starvation_mean = 0.0;
    config.spores.starvation_std = 0.0;
    let mut colony = Colony::new(config).expect("valid configuration");
    let mut events = Vec::new();
    let mut previous = query::population(&colony);

    for _ in 0..150 {
        assert!(colony.progress_a_step(&mut events).expect("tick succeeds"));
        let population = query::population(&colony);
        assert!(population >= previous);
        previous = population;
    }

    assert_eq!(previous, 12);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::SporeBorn { .. }))
            .count(),
        2
    );
}

#[test]
fn a_birth_blocked_by_the_cap_lands_once_a_slot_opens() {
    let mut config = ColonyConfig::default();
    config.world.population_cap = 10;
    config.spores.starvation_mean = 0.0;
    config.spores.starvation_std = 0.0;
    let mut colony = Colony::new(config).expect("valid configuration");
    let mut events = Vec::new();

    for _ in 0..80 {
        assert!(colony.progress_a_step(&mut events).expect("tick succeeds"));
    }
    assert_eq!(query::population(&colony), 10);
    assert_eq!(query::expansion_progress(&colony), 100.0);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SporeBorn { .. })));

    let removed = query::spores(&colony)[0].id;
    world::apply(&mut colony, Command::RemoveSpore { spore: removed }, &mut events)
        .expect("living spore");
    let mut tick_events = Vec::new();
    assert!(colony.progress_a_step(&mut tick_events).expect("tick succeeds"));

    assert_eq!(query::population(&colony), 10);
    assert!(tick_events
        .iter()
        .any(|event| matches!(event, Event::SporeBorn { .. })));
}

#[test]
fn an_empty_larder_starves_the_colony_out() {
    let mut config = ColonyConfig::default();
    for settings in &mut config.resources.stocks {
        settings.initial = 0.0;
        settings.income_speed = 0.0;
        settings.variance_percent = 0.0;
    }
    let mut colony = Colony::new(config).expect("valid configuration");
    let mut events = Vec::new();

    let mut ticks = 0;
    while colony.progress_a_step(&mut events).expect("tick succeeds") {
        ticks += 1;
        assert!(ticks < 200, "colony should starve");
    }

    assert!(query::population(&colony) < 2);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::SporeDied {
            cause: DeathCause::Starvation,
            ..
        }
    )));
    assert!(matches!(events.last(), Some(Event::ColonyDiedOut { .. })));
}

#[test]
fn directed_routes_are_followed_hop_by_hop() {
    let mut config = ColonyConfig::default();
    config.movement.allow_overlap = true;
    let mut colony = Colony::new(config).expect("valid configuration");
    let spore = query::spores(&colony)[0].clone();
    let destination = CellCoord::new(
        (spore.cell.column() + 5) % 32,
        (spore.cell.row() + 3) % 16,
    );
    let mut events = Vec::new();

    world::apply(
        &mut colony,
        Command::MoveSpore {
            spore: spore.id,
            destination,
        },
        &mut events,
    )
    .expect("valid route request");

    let hops = spore.cell.manhattan_distance(destination) as usize;
    assert_eq!(
        events,
        vec![Event::SporeRouted {
            spore: spore.id,
            destination,
            hops,
        }]
    );

    for _ in 0..hops {
        assert!(colony.progress_a_step(&mut events).expect("tick succeeds"));
    }
    let arrived = query::spores(&colony)
        .into_iter()
        .find(|snapshot| snapshot.id == spore.id)
        .expect("spore alive");
    assert_eq!(arrived.cell, destination);
    assert_eq!(query::route(&colony, spore.id), None);
}

#[test]
fn invalid_spore_commands_are_rejected() {
    let mut colony = default_colony();
    let mut events = Vec::new();

    assert_eq!(
        world::apply(
            &mut colony,
            Command::RemoveSpore {
                spore: SporeId::new(99),
            },
            &mut events,
        ),
        Err(CommandError::UnknownSpore(SporeId::new(99)))
    );
    assert_eq!(
        world::apply(
            &mut colony,
            Command::MoveSpore {
                spore: SporeId::new(0),
                destination: CellCoord::new(32, 0),
            },
            &mut events,
        ),
        Err(CommandError::OutOfBounds(CellCoord::new(32, 0)))
    );
    assert!(events.is_empty());
}

#[test]
fn removed_spores_leave_the_occupancy_map() {
    let mut colony = default_colony();
    let target = query::spores(&colony)[3].clone();
    let mut events = Vec::new();

    world::apply(&mut colony, Command::RemoveSpore { spore: target.id }, &mut events)
        .expect("living spore");

    assert_eq!(
        events,
        vec![Event::SporeDied {
            spore: target.id,
            cell: target.cell,
            cause: DeathCause::Removed,
        }]
    );
    assert!(!query::occupancy(&colony).is_occupied(target.cell));
    assert_eq!(query::population(&colony), 9);
}

#[test]
fn invalid_configurations_are_refused() {
    let mut config = ColonyConfig::default();
    config.world.categories.clear();
    assert!(Colony::new(config).is_err());
}
