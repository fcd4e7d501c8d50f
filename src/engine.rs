use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Parameters, Species};
use crate::error::Result;
use crate::island::{Island, PopulationRecord};
use crate::report::{CellDistribution, IslandSnapshot, PopulationCounts, SpeciesTraits};
use crate::rng::SimRng;

#[derive(Clone, Debug, Serialize)]
pub struct YearSummary {
    pub year: u32,
    pub counts: PopulationCounts,
    pub duration_ms: f64,
}

/// Drives an island year by year from a single seeded random stream.
pub struct Simulation {
    name: String,
    island: Island,
    rng: SimRng,
    year: u32,
    history: Vec<YearSummary>,
}

impl Simulation {
    pub fn new(map: &str, population: &[PopulationRecord], seed: u64) -> Result<Self> {
        Self::with_parameters(map, population, seed, Parameters::default())
    }

    pub fn with_parameters(
        map: &str,
        population: &[PopulationRecord],
        seed: u64,
        params: Parameters,
    ) -> Result<Self> {
        let mut island = Island::build(map, params)?;
        island.ingest_population(population)?;
        Ok(Self {
            name: String::from("island"),
            island,
            rng: SimRng::new(seed),
            year: 0,
            history: Vec::new(),
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_animal_parameters(
        &mut self,
        species: Species,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<()> {
        let next = self
            .island
            .parameters()
            .with_species_overrides(species, overrides)?;
        self.island.set_parameters(next)
    }

    pub fn set_landscape_parameters(
        &mut self,
        code: char,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<()> {
        let next = self
            .island
            .parameters()
            .with_landscape_overrides(code, overrides)?;
        self.island.set_parameters(next)
    }

    pub fn add_population(&mut self, population: &[PopulationRecord]) -> Result<()> {
        self.island.ingest_population(population)
    }

    pub fn simulate(&mut self, years: u32) -> PopulationCounts {
        self.run_with_hook(years, |_| {})
    }

    /// Simulates `years` more years, handing each year's summary to `hook`.
    pub fn run_with_hook<F>(&mut self, years: u32, mut hook: F) -> PopulationCounts
    where
        F: FnMut(&YearSummary),
    {
        for _ in 0..years {
            let start = Instant::now();
            let counts = self.island.simulate_year(&mut self.rng);
            self.year += 1;
            let summary = YearSummary {
                year: self.year,
                counts,
                duration_ms: start.elapsed().as_secs_f64() * 1_000.0,
            };
            info!(
                year = summary.year,
                herbivores = counts.herbivores,
                carnivores = counts.carnivores,
                duration_ms = summary.duration_ms,
                "simulated year"
            );
            hook(&summary);
            self.history.push(summary);
        }
        let counts = self.island.counts();
        debug!(
            scenario = %self.name,
            year = self.year,
            herbivores = counts.herbivores,
            carnivores = counts.carnivores,
            "simulation advanced"
        );
        counts
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn island(&self) -> &Island {
        &self.island
    }

    pub fn num_animals(&self) -> usize {
        self.island.num_animals()
    }

    pub fn num_animals_per_species(&self) -> PopulationCounts {
        self.island.counts()
    }

    pub fn animal_distribution(&self) -> Vec<CellDistribution> {
        self.island.distribution()
    }

    pub fn traits(&self, species: Species) -> SpeciesTraits {
        self.island.traits(species)
    }

    pub fn history(&self) -> &[YearSummary] {
        &self.history
    }

    pub fn snapshot(&self) -> IslandSnapshot {
        IslandSnapshot {
            scenario: self.name.clone(),
            year: self.year,
            counts: self.island.counts(),
            cells: self.island.distribution(),
        }
    }
}
