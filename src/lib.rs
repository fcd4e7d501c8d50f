pub mod animal;
pub mod cell;
pub mod config;
pub mod engine;
pub mod error;
pub mod island;
pub mod report;
pub mod rng;
pub mod scenario;

pub use config::{LandscapeKind, Parameters, Species, SpeciesParams};
pub use engine::{Simulation, YearSummary};
pub use error::ConfigError;
pub use island::{AnimalSpec, Island, Location, PopulationRecord};
pub use report::{CellDistribution, IslandSnapshot, PopulationCounts, SpeciesTraits};
