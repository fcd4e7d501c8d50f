use biosim::{
    rng::SimRng, AnimalSpec, ConfigError, Island, LandscapeKind, Location, Parameters,
    PopulationRecord, Species,
};

fn animals(species: Species, count: usize, age: u32, weight: f64) -> Vec<AnimalSpec> {
    (0..count)
        .map(|_| AnimalSpec {
            species,
            age,
            weight,
        })
        .collect()
}

fn record(row: usize, col: usize, population: Vec<AnimalSpec>) -> PopulationRecord {
    PopulationRecord {
        location: (row, col),
        population,
    }
}

#[test]
fn map_string_round_trips() {
    let map = "WWWWWW\nWLHDLW\nWDDLHW\nWWWWWW";
    let island = Island::build(map, Parameters::default()).unwrap();
    assert_eq!(island.map_string(), map);
}

#[test]
fn malformed_maps_are_rejected() {
    let cases = [
        "WWWW\nWWW\nWWWW",
        "WWWWW\nRWWWW\nWWWWH\nWWWWW",
        "WWQ\nWWW\nWWW",
        "AWC\nDWF",
        "",
    ];
    for map in cases {
        assert!(
            Island::build(map, Parameters::default()).is_err(),
            "map {map:?} should be rejected"
        );
    }
    assert!(Island::build("WWW\nWWW\nWWW", Parameters::default()).is_ok());
}

#[test]
fn water_island_rejects_population() {
    let mut island = Island::build("WWW\nWWW\nWWW", Parameters::default()).unwrap();
    let result = island.ingest_population(&[record(2, 2, animals(Species::Herbivore, 1, 5, 20.0))]);
    assert!(matches!(
        result,
        Err(ConfigError::ImpassableLocation {
            row: 2,
            col: 2,
            kind: LandscapeKind::Water
        })
    ));
    assert_eq!(island.num_animals(), 0);
}

#[test]
fn unknown_and_border_locations_are_rejected() {
    let mut island = Island::build("WWW\nWDW\nWWW", Parameters::default()).unwrap();
    let herbivore = || animals(Species::Herbivore, 1, 5, 20.0);

    assert!(matches!(
        island.ingest_population(&[record(10, 10, herbivore())]),
        Err(ConfigError::UnknownLocation { .. })
    ));
    assert!(matches!(
        island.ingest_population(&[record(1, 1, herbivore())]),
        Err(ConfigError::ImpassableLocation { .. })
    ));
    assert!(matches!(
        island.ingest_population(&[record(2, 3, herbivore())]),
        Err(ConfigError::ImpassableLocation { .. })
    ));
    island.ingest_population(&[record(2, 2, herbivore())]).unwrap();
    assert_eq!(island.num_animals(), 1);
}

#[test]
fn starved_carnivore_dies_regardless_of_seed() {
    let params = Parameters::default();
    let mut island = Island::build("WWW\nWLW\nWWW", params.clone()).unwrap();
    island
        .ingest_population(&[record(2, 2, animals(Species::Carnivore, 1, 20, 0.0))])
        .unwrap();
    let carnivore = island.cell(Location::new(2, 2)).unwrap().carnivores()[0].clone();
    assert_eq!(carnivore.fitness(), 0.0);

    for seed in 0..25 {
        let mut rng = SimRng::new(seed);
        assert!(carnivore.death_check(&params.carnivore, &mut rng));
    }

    let mut rng = SimRng::new(17);
    let counts = island.simulate_year(&mut rng);
    assert_eq!(counts.carnivores, 0);
}

#[test]
fn single_lowland_year_feeds_herbivores() {
    let mut island = Island::build("WWW\nWLW\nWWW", Parameters::default()).unwrap();
    island
        .ingest_population(&[
            record(2, 2, animals(Species::Herbivore, 50, 5, 20.0)),
            record(2, 2, animals(Species::Carnivore, 20, 5, 20.0)),
        ])
        .unwrap();
    let mut rng = SimRng::new(123_456);

    island.simulate_year(&mut rng);

    let cell = island.cell(Location::new(2, 2)).unwrap();
    assert!(cell.available_fodder() <= 800.0);
    assert!((cell.available_fodder() - 300.0).abs() < 1e-9);
    let traits = island.traits(Species::Herbivore);
    assert!(!traits.is_empty());
    assert!(traits.mean_weight().unwrap() > 20.0);
}

#[test]
fn every_animal_gets_one_migration_evaluation_per_year() {
    let mut island = Island::build("WWWWW\nWLLLW\nWLHLW\nWLLLW\nWWWWW", Parameters::default())
        .unwrap();
    island
        .ingest_population(&[
            record(3, 3, animals(Species::Herbivore, 60, 5, 30.0)),
            record(2, 2, animals(Species::Carnivore, 15, 5, 30.0)),
        ])
        .unwrap();
    let mut rng = SimRng::new(4);

    for _ in 0..5 {
        island.simulate_year(&mut rng);
        for location in island.locations() {
            let cell = island.cell(location).unwrap();
            assert!(cell
                .herbivores()
                .iter()
                .chain(cell.carnivores())
                .all(|animal| animal.has_migrated()));
        }
    }
}

#[test]
fn fitness_stays_in_unit_interval_over_many_years() {
    let mut island = Island::build(
        "WWWWWWW\nWLLHHDW\nWLLHHDW\nWDDLLLW\nWWWWWWW",
        Parameters::default(),
    )
    .unwrap();
    island
        .ingest_population(&[
            record(2, 2, animals(Species::Herbivore, 100, 5, 20.0)),
            record(3, 4, animals(Species::Carnivore, 20, 5, 20.0)),
        ])
        .unwrap();
    let mut rng = SimRng::new(2024);

    for _ in 0..30 {
        island.simulate_year(&mut rng);
        for species in Species::ALL {
            let traits = island.traits(species);
            assert!(traits.fitness.iter().all(|phi| (0.0..=1.0).contains(phi)));
            assert!(traits.weights.iter().all(|w| *w > 0.0));
        }
        for row in island.distribution() {
            if row.landscape == LandscapeKind::Water {
                assert_eq!(row.herbivores + row.carnivores, 0);
            }
        }
    }
}

#[test]
fn fodder_regrowth_is_not_cumulative() {
    let params = Parameters::default();
    let mut island = Island::build("WWW\nWLW\nWWW", params.clone()).unwrap();
    let mut rng = SimRng::new(0);
    island.simulate_year(&mut rng);
    island.simulate_year(&mut rng);
    let cell = island.cell(Location::new(2, 2)).unwrap();
    assert_eq!(cell.available_fodder(), params.landscape.lowland_f_max);
}
