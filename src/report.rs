//! Read-only views of the island handed to reporting and plotting layers.

use serde::Serialize;

use crate::animal::Animal;
use crate::config::{LandscapeKind, Species};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PopulationCounts {
    pub herbivores: usize,
    pub carnivores: usize,
}

impl PopulationCounts {
    pub fn total(&self) -> usize {
        self.herbivores + self.carnivores
    }

    pub fn get(&self, species: Species) -> usize {
        match species {
            Species::Herbivore => self.herbivores,
            Species::Carnivore => self.carnivores,
        }
    }
}

/// One row of the per-cell distribution table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellDistribution {
    pub row: usize,
    pub col: usize,
    pub landscape: LandscapeKind,
    pub herbivores: usize,
    pub carnivores: usize,
}

/// Flat trait lists for histogram consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeciesTraits {
    pub ages: Vec<u32>,
    pub weights: Vec<f64>,
    pub fitness: Vec<f64>,
}

impl SpeciesTraits {
    pub fn collect<'a>(animals: impl IntoIterator<Item = &'a Animal>) -> Self {
        let mut traits = Self::default();
        for animal in animals {
            traits.ages.push(animal.age());
            traits.weights.push(animal.weight());
            traits.fitness.push(animal.fitness());
        }
        traits
    }

    pub fn len(&self) -> usize {
        self.ages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    pub fn mean_weight(&self) -> Option<f64> {
        if self.weights.is_empty() {
            None
        } else {
            Some(self.weights.iter().sum::<f64>() / self.weights.len() as f64)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IslandSnapshot {
    pub scenario: String,
    pub year: u32,
    pub counts: PopulationCounts,
    pub cells: Vec<CellDistribution>,
}
