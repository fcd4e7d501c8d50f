//! One landscape cell: its fodder pool and the animals standing on it.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use crate::animal::Animal;
use crate::config::{LandscapeKind, LandscapeParams, Parameters, Species, SpeciesParams};
use crate::island::Location;
use crate::rng::RngExt;

/// An animal leaving a cell during the migration phase.
#[derive(Debug, Clone)]
pub struct Migrant {
    pub destination: Location,
    pub animal: Animal,
}

/// A cardinal neighbour as seen from a cell: where it is and whether it can
/// be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbour {
    pub location: Location,
    pub passable: bool,
}

#[derive(Debug, Clone)]
pub struct Cell {
    kind: LandscapeKind,
    available_fodder: f64,
    herbivores: Vec<Animal>,
    carnivores: Vec<Animal>,
}

impl Cell {
    pub fn new(kind: LandscapeKind, landscape: &LandscapeParams) -> Self {
        Self {
            kind,
            available_fodder: landscape.fodder_capacity(kind),
            herbivores: Vec::new(),
            carnivores: Vec::new(),
        }
    }

    pub fn kind(&self) -> LandscapeKind {
        self.kind
    }

    pub fn is_passable(&self) -> bool {
        self.kind.is_passable()
    }

    pub fn available_fodder(&self) -> f64 {
        self.available_fodder
    }

    pub fn herbivores(&self) -> &[Animal] {
        &self.herbivores
    }

    pub fn carnivores(&self) -> &[Animal] {
        &self.carnivores
    }

    pub fn animals(&self, species: Species) -> &[Animal] {
        match species {
            Species::Herbivore => &self.herbivores,
            Species::Carnivore => &self.carnivores,
        }
    }

    fn animals_mut(&mut self, species: Species) -> &mut Vec<Animal> {
        match species {
            Species::Herbivore => &mut self.herbivores,
            Species::Carnivore => &mut self.carnivores,
        }
    }

    pub fn herbivore_count(&self) -> usize {
        self.herbivores.len()
    }

    pub fn carnivore_count(&self) -> usize {
        self.carnivores.len()
    }

    pub fn total_count(&self) -> usize {
        self.herbivores.len() + self.carnivores.len()
    }

    /// Places an animal in the collection matching its species.
    pub fn add_animal(&mut self, animal: Animal) {
        self.animals_mut(animal.species()).push(animal);
    }

    pub fn reset_migration(&mut self) {
        self.herbivores
            .iter_mut()
            .chain(self.carnivores.iter_mut())
            .for_each(Animal::reset_migration);
    }

    pub(crate) fn refresh(&mut self, params: &Parameters) {
        for animal in self.herbivores.iter_mut() {
            animal.refresh_fitness(&params.herbivore);
        }
        for animal in self.carnivores.iter_mut() {
            animal.refresh_fitness(&params.carnivore);
        }
    }

    /// Resets the pool to full capacity; fodder never accumulates.
    pub fn regrow_fodder(&mut self, landscape: &LandscapeParams) {
        self.available_fodder = landscape.fodder_capacity(self.kind);
    }

    /// Herbivores eat in a random order until the fodder runs out.
    pub fn feed_herbivores<R: Rng + ?Sized>(&mut self, params: &SpeciesParams, rng: &mut R) {
        self.herbivores.shuffle(rng);
        for herbivore in self.herbivores.iter_mut() {
            let eaten = herbivore.feed(self.available_fodder, params);
            self.available_fodder = (self.available_fodder - eaten).max(0.0);
        }
    }

    /// The fittest carnivore hunts first, always starting from the weakest
    /// remaining herbivore.
    pub fn feed_carnivores<R: Rng + ?Sized>(&mut self, params: &SpeciesParams, rng: &mut R) {
        if self.carnivores.is_empty() || self.herbivores.is_empty() {
            return;
        }
        self.herbivores.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
        self.carnivores.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));

        for carnivore in self.carnivores.iter_mut() {
            if self.herbivores.is_empty() {
                break;
            }
            let killed = carnivore.hunt(&self.herbivores, params, rng);
            // indices are ascending; removing back to front keeps the prey sorted
            for &index in killed.iter().rev() {
                self.herbivores.remove(index);
            }
        }
    }

    /// Every animal gets one birth trial against the head count taken
    /// before the phase; newborns join once the pass is over.
    pub fn procreate<R: Rng + ?Sized>(&mut self, params: &Parameters, rng: &mut R) {
        for species in Species::ALL {
            let table = params.species(species);
            let animals = self.animals_mut(species);
            let count = animals.len();
            if count < 2 {
                continue;
            }
            let newborns: Vec<Animal> = animals
                .iter_mut()
                .filter_map(|animal| animal.attempt_procreation(count, table, rng))
                .collect();
            trace!(%species, births = newborns.len(), "procreation");
            animals.extend(newborns);
        }
    }

    /// Gives every animal that has not yet moved this year its single
    /// migration attempt. Animals heading for an impassable neighbour stay.
    pub fn migrate_out<R: Rng + ?Sized>(
        &mut self,
        params: &Parameters,
        neighbours: &[Neighbour],
        rng: &mut R,
    ) -> Vec<Migrant> {
        let mut migrants = Vec::new();
        for species in Species::ALL {
            let table = params.species(species);
            let animals = self.animals_mut(species);
            let mut staying = Vec::with_capacity(animals.len());
            for mut animal in std::mem::take(animals) {
                if animal.has_migrated() {
                    staying.push(animal);
                    continue;
                }
                let probability = animal.migration_probability(table);
                animal.mark_migrated();
                if !rng.chance(probability) {
                    staying.push(animal);
                    continue;
                }
                match neighbours.choose(rng) {
                    Some(target) if target.passable => migrants.push(Migrant {
                        destination: target.location,
                        animal,
                    }),
                    _ => staying.push(animal),
                }
            }
            *animals = staying;
        }
        migrants
    }

    pub fn age_all(&mut self, params: &Parameters) {
        for animal in self.herbivores.iter_mut() {
            animal.grow_older(&params.herbivore);
        }
        for animal in self.carnivores.iter_mut() {
            animal.grow_older(&params.carnivore);
        }
    }

    /// Removes the animals that fail their death check and returns how many
    /// died.
    pub fn die<R: Rng + ?Sized>(&mut self, params: &Parameters, rng: &mut R) -> usize {
        let before = self.total_count();
        for species in Species::ALL {
            let table = params.species(species);
            self.animals_mut(species)
                .retain(|animal| !animal.death_check(table, rng));
        }
        before - self.total_count()
    }
}
