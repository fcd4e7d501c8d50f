use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    config::{Parameters, Species},
    engine::{Simulation, YearSummary},
    island::{AnimalSpec, PopulationRecord},
};

fn default_years() -> u32 {
    100
}

fn default_count() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_years")]
    pub years: u32,
    pub map: String,
    #[serde(default)]
    pub population: Vec<ScenarioPopulation>,
    /// Named-option overrides per species, e.g. `Herbivore: { zeta: 3.2 }`.
    #[serde(default)]
    pub species: BTreeMap<Species, BTreeMap<String, f64>>,
    /// Named-option overrides per landscape code, e.g. `L: { f_max: 700 }`.
    #[serde(default)]
    pub landscapes: BTreeMap<char, BTreeMap<String, f64>>,
    /// Population added once the given number of years has been simulated.
    #[serde(default)]
    pub introductions: Vec<Introduction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioPopulation {
    #[serde(alias = "loc")]
    pub location: (usize, usize),
    #[serde(alias = "pop")]
    pub population: Vec<ScenarioAnimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioAnimal {
    pub species: Species,
    pub age: u32,
    pub weight: f64,
    #[serde(default = "default_count")]
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Introduction {
    pub year: u32,
    pub population: Vec<ScenarioPopulation>,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

fn expand(groups: &[ScenarioPopulation]) -> Vec<PopulationRecord> {
    groups
        .iter()
        .map(|group| PopulationRecord {
            location: group.location,
            population: group
                .population
                .iter()
                .flat_map(|animal| {
                    std::iter::repeat(AnimalSpec {
                        species: animal.species,
                        age: animal.age,
                        weight: animal.weight,
                    })
                    .take(animal.count)
                })
                .collect(),
        })
        .collect()
}

impl Scenario {
    pub fn parameters(&self) -> Result<Parameters> {
        let mut params = Parameters::default();
        for (species, overrides) in &self.species {
            params = params
                .with_species_overrides(*species, overrides)
                .with_context(|| format!("Invalid {species} parameters in '{}'", self.name))?;
        }
        for (code, overrides) in &self.landscapes {
            params = params
                .with_landscape_overrides(*code, overrides)
                .with_context(|| {
                    format!("Invalid landscape '{code}' parameters in '{}'", self.name)
                })?;
        }
        Ok(params)
    }

    pub fn initial_population(&self) -> Vec<PopulationRecord> {
        expand(&self.population)
    }

    pub fn build_simulation(&self, seed_override: Option<u64>) -> Result<Simulation> {
        let seed = seed_override.unwrap_or(self.seed);
        let simulation = Simulation::with_parameters(
            &self.map,
            &self.initial_population(),
            seed,
            self.parameters()?,
        )
        .with_context(|| format!("Failed to set up scenario '{}'", self.name))?;
        Ok(simulation.named(self.name.clone()))
    }

    pub fn years(&self, override_years: Option<u32>) -> u32 {
        override_years.unwrap_or(self.years)
    }

    /// Simulates `years` more years, adding each scheduled introduction
    /// once its year has been reached.
    pub fn run<F>(&self, simulation: &mut Simulation, years: u32, mut hook: F) -> Result<()>
    where
        F: FnMut(&YearSummary),
    {
        let end = simulation.year() + years;
        let mut pending: Vec<&Introduction> = self
            .introductions
            .iter()
            .filter(|intro| intro.year >= simulation.year() && intro.year < end)
            .collect();
        pending.sort_by_key(|intro| intro.year);

        for intro in pending {
            simulation.run_with_hook(intro.year - simulation.year(), &mut hook);
            let records = expand(&intro.population);
            if let Err(err) = simulation.add_population(&records) {
                warn!(year = intro.year, error = %err, "introduction rejected");
                return Err(err).with_context(|| {
                    format!("Failed to introduce population at year {}", intro.year)
                });
            }
            info!(
                year = intro.year,
                animals = records.iter().map(|r| r.population.len()).sum::<usize>(),
                "population introduced"
            );
        }
        simulation.run_with_hook(end - simulation.year(), &mut hook);
        Ok(())
    }
}
