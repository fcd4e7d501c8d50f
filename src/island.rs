//! The island grid: map parsing, population ingestion and the yearly cycle.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animal::Animal;
use crate::cell::{Cell, Migrant, Neighbour};
use crate::config::{LandscapeKind, Parameters, Species};
use crate::error::{ConfigError, Result};
use crate::report::{CellDistribution, PopulationCounts, SpeciesTraits};

/// 1-indexed grid position; row grows southwards, column eastwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Location {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One animal as described by a population record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalSpec {
    pub species: Species,
    pub age: u32,
    pub weight: f64,
}

/// Animals to place in one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    #[serde(alias = "loc")]
    pub location: (usize, usize),
    #[serde(alias = "pop")]
    pub population: Vec<AnimalSpec>,
}

pub struct Island {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    neighbours: Vec<Vec<Neighbour>>,
    params: Parameters,
}

impl Island {
    /// Parses a rectangular map of landscape codes whose border is all
    /// Water. Nothing is constructed unless the whole map is valid.
    pub fn build(map: &str, params: Parameters) -> Result<Self> {
        params.validate()?;
        let kinds = parse_map(map)?;
        let rows = kinds.len();
        let cols = kinds[0].len();

        let cells: Vec<Cell> = kinds
            .iter()
            .flatten()
            .map(|&kind| Cell::new(kind, &params.landscape))
            .collect();

        let mut island = Self {
            rows,
            cols,
            cells,
            neighbours: Vec::new(),
            params,
        };
        let neighbours: Vec<Vec<Neighbour>> = island
            .locations()
            .map(|location| island.neighbours_of(location))
            .collect();
        island.neighbours = neighbours;
        debug!(rows, cols, "island built");
        Ok(island)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// Swaps in a new parameter table and refreshes every animal's fitness
    /// against it. Only called between years; a rejected table leaves the
    /// current one in place.
    pub fn set_parameters(&mut self, params: Parameters) -> Result<()> {
        params.validate()?;
        self.params = params;
        for cell in self.cells.iter_mut() {
            cell.refresh(&self.params);
        }
        Ok(())
    }

    fn index(&self, location: Location) -> Option<usize> {
        let in_bounds = (1..=self.rows).contains(&location.row)
            && (1..=self.cols).contains(&location.col);
        in_bounds.then(|| (location.row - 1) * self.cols + (location.col - 1))
    }

    pub fn cell(&self, location: Location) -> Option<&Cell> {
        self.index(location).map(|index| &self.cells[index])
    }

    /// Every location in row-major order.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (1..=self.rows).flat_map(move |row| (1..=self.cols).map(move |col| Location::new(row, col)))
    }

    fn neighbours_of(&self, location: Location) -> Vec<Neighbour> {
        let Location { row, col } = location;
        let candidates = [
            (row.wrapping_sub(1), col),
            (row + 1, col),
            (row, col.wrapping_sub(1)),
            (row, col + 1),
        ];
        candidates
            .into_iter()
            .map(Location::from)
            .filter_map(|target| {
                self.cell(target).map(|cell| Neighbour {
                    location: target,
                    passable: cell.is_passable(),
                })
            })
            .collect()
    }

    /// Re-derives the map text from the cell kinds.
    pub fn map_string(&self) -> String {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|cell| cell.kind().code()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Places the described animals. Every record is validated before any
    /// animal is added, so a rejected call leaves the island unchanged.
    pub fn ingest_population(&mut self, records: &[PopulationRecord]) -> Result<()> {
        let mut targets = Vec::with_capacity(records.len());
        for record in records {
            let (row, col) = record.location;
            let index = self
                .index(Location::new(row, col))
                .ok_or(ConfigError::UnknownLocation { row, col })?;
            let kind = self.cells[index].kind();
            if !kind.is_passable() {
                return Err(ConfigError::ImpassableLocation { row, col, kind });
            }
            for spec in &record.population {
                if !spec.weight.is_finite() || spec.weight < 0.0 {
                    return Err(ConfigError::InvalidAnimal {
                        species: spec.species,
                        row,
                        col,
                        reason: format!(
                            "weight must be a finite, non-negative number, got {}",
                            spec.weight
                        ),
                    });
                }
            }
            targets.push(index);
        }

        let mut added = 0;
        for (record, index) in records.iter().zip(targets) {
            for spec in &record.population {
                let params = self.params.species(spec.species);
                let animal = Animal::new(spec.species, spec.age, spec.weight, params);
                self.cells[index].add_animal(animal);
                added += 1;
            }
        }
        debug!(records = records.len(), animals = added, "population ingested");
        Ok(())
    }

    /// Runs the seven phases in order and returns the resulting head counts.
    pub fn simulate_year<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PopulationCounts {
        let params = &self.params;

        for cell in self.cells.iter_mut() {
            cell.reset_migration();
            cell.regrow_fodder(&params.landscape);
            cell.feed_herbivores(&params.herbivore, rng);
            cell.feed_carnivores(&params.carnivore, rng);
            cell.procreate(params, rng);
        }

        // all departures are settled before anyone arrives
        let mut migrants: Vec<Migrant> = Vec::new();
        for (cell, neighbours) in self.cells.iter_mut().zip(&self.neighbours) {
            migrants.extend(cell.migrate_out(params, neighbours, rng));
        }
        let moved = migrants.len();
        for Migrant { destination, animal } in migrants {
            if let Some(index) = self.index(destination) {
                self.cells[index].add_animal(animal);
            }
        }

        for cell in self.cells.iter_mut() {
            cell.age_all(&self.params);
        }
        let mut deaths = 0;
        for cell in self.cells.iter_mut() {
            deaths += cell.die(&self.params, rng);
        }

        let counts = self.counts();
        debug!(
            herbivores = counts.herbivores,
            carnivores = counts.carnivores,
            moved,
            deaths,
            "year complete"
        );
        counts
    }

    pub fn counts(&self) -> PopulationCounts {
        self.cells.iter().fold(PopulationCounts::default(), |acc, cell| PopulationCounts {
            herbivores: acc.herbivores + cell.herbivore_count(),
            carnivores: acc.carnivores + cell.carnivore_count(),
        })
    }

    pub fn num_animals(&self) -> usize {
        self.counts().total()
    }

    /// Head count per cell, row-major.
    pub fn distribution(&self) -> Vec<CellDistribution> {
        self.locations()
            .zip(&self.cells)
            .map(|(location, cell)| CellDistribution {
                row: location.row,
                col: location.col,
                landscape: cell.kind(),
                herbivores: cell.herbivore_count(),
                carnivores: cell.carnivore_count(),
            })
            .collect()
    }

    /// Age, weight and fitness of every animal of a species.
    pub fn traits(&self, species: Species) -> SpeciesTraits {
        SpeciesTraits::collect(self.cells.iter().flat_map(|cell| cell.animals(species)))
    }
}

fn parse_map(map: &str) -> Result<Vec<Vec<LandscapeKind>>> {
    let lines: Vec<&str> = map.trim().lines().map(str::trim).collect();
    let expected = lines.first().map(|line| line.chars().count()).unwrap_or(0);
    if expected == 0 {
        return Err(ConfigError::EmptyMap);
    }

    let mut kinds = Vec::with_capacity(lines.len());
    for (row_index, line) in lines.iter().enumerate() {
        let found = line.chars().count();
        if found != expected {
            return Err(ConfigError::NotRectangular {
                row: row_index + 1,
                found,
                expected,
            });
        }
        let row = line
            .chars()
            .enumerate()
            .map(|(col_index, code)| {
                LandscapeKind::from_code(code).ok_or(ConfigError::UnknownLandscape {
                    code,
                    row: row_index + 1,
                    col: col_index + 1,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        kinds.push(row);
    }

    let last_row = kinds.len() - 1;
    for (row_index, row) in kinds.iter().enumerate() {
        for (col_index, &kind) in row.iter().enumerate() {
            let on_border = row_index == 0
                || row_index == last_row
                || col_index == 0
                || col_index == expected - 1;
            if on_border && kind != LandscapeKind::Water {
                return Err(ConfigError::OpenBorder {
                    row: row_index + 1,
                    col: col_index + 1,
                    kind,
                });
            }
        }
    }
    Ok(kinds)
}
