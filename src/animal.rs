//! A single herbivore or carnivore and its yearly lifecycle.
//!
//! Age and weight are private so that every mutation goes through a method
//! that refreshes fitness straight away.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::config::{Species, SpeciesParams};
use crate::rng::RngExt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animal {
    species: Species,
    age: u32,
    weight: f64,
    fitness: f64,
    has_migrated: bool,
}

impl Animal {
    pub fn new(species: Species, age: u32, weight: f64, params: &SpeciesParams) -> Self {
        Self {
            species,
            age,
            weight,
            fitness: fitness(age, weight, params),
            has_migrated: false,
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn has_migrated(&self) -> bool {
        self.has_migrated
    }

    pub(crate) fn refresh_fitness(&mut self, params: &SpeciesParams) {
        self.fitness = fitness(self.age, self.weight, params);
    }

    /// Eats from the cell's fodder and returns the amount consumed.
    pub fn feed(&mut self, available_fodder: f64, params: &SpeciesParams) -> f64 {
        debug_assert_eq!(self.species, Species::Herbivore);
        let eaten = params.appetite.min(available_fodder.max(0.0));
        if eaten > 0.0 {
            self.weight += params.beta * eaten;
            self.refresh_fitness(params);
        }
        eaten
    }

    /// Hunts through `prey`, which must be sorted by ascending fitness.
    /// Returns the indices of the prey that were killed.
    pub fn hunt<R: Rng + ?Sized>(
        &mut self,
        prey: &[Animal],
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Vec<usize> {
        debug_assert_eq!(self.species, Species::Carnivore);
        let mut eaten = 0.0;
        let mut killed = Vec::new();
        for (index, herbivore) in prey.iter().enumerate() {
            if eaten >= params.appetite {
                break;
            }
            let probability =
                kill_probability(self.fitness, herbivore.fitness, params.delta_phi_max);
            if probability <= 0.0 || !rng.chance(probability) {
                continue;
            }
            let meal = (params.appetite - eaten).min(herbivore.weight);
            eaten += meal;
            self.weight += params.beta * meal;
            self.refresh_fitness(params);
            killed.push(index);
        }
        killed
    }

    /// One birth trial against `same_species` animals present in the cell
    /// (self included). The parent's weight is clamped at zero.
    pub fn attempt_procreation<R: Rng + ?Sized>(
        &mut self,
        same_species: usize,
        params: &SpeciesParams,
        rng: &mut R,
    ) -> Option<Animal> {
        if same_species < 2 || self.weight < params.breeding_threshold() {
            return None;
        }
        let probability = (params.gamma * self.fitness * (same_species - 1) as f64).min(1.0);
        if !rng.chance(probability) {
            return None;
        }

        let birth_weight = birth_weight(params, rng)?;
        self.weight = (self.weight - params.xi * birth_weight).max(0.0);
        self.refresh_fitness(params);
        Some(Animal::new(self.species, 0, birth_weight, params))
    }

    pub fn grow_older(&mut self, params: &SpeciesParams) {
        self.age += 1;
        self.weight -= params.eta * self.weight;
        self.refresh_fitness(params);
    }

    pub fn migration_probability(&self, params: &SpeciesParams) -> f64 {
        if self.has_migrated {
            0.0
        } else {
            params.mu * self.fitness
        }
    }

    pub fn mark_migrated(&mut self) {
        self.has_migrated = true;
    }

    pub fn reset_migration(&mut self) {
        self.has_migrated = false;
    }

    pub fn death_check<R: Rng + ?Sized>(&self, params: &SpeciesParams, rng: &mut R) -> bool {
        if self.weight <= 0.0 {
            return true;
        }
        rng.chance(params.omega * (1.0 - self.fitness))
    }
}

/// Product of a falling age sigmoid and a rising weight sigmoid.
pub fn fitness(age: u32, weight: f64, params: &SpeciesParams) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }
    let age_term = sigmoid(1.0, age as f64, params.a_half, params.phi_age);
    let weight_term = sigmoid(-1.0, weight, params.w_half, params.phi_weight);
    (age_term * weight_term).clamp(0.0, 1.0)
}

fn sigmoid(sign: f64, x: f64, x_half: f64, phi: f64) -> f64 {
    1.0 / (1.0 + (sign * phi * (x - x_half)).exp())
}

/// Linear in the fitness gap up to `delta_phi_max`, certain beyond it.
pub fn kill_probability(hunter_fitness: f64, prey_fitness: f64, delta_phi_max: f64) -> f64 {
    let gap = hunter_fitness - prey_fitness;
    if gap <= 0.0 {
        0.0
    } else if gap < delta_phi_max {
        gap / delta_phi_max
    } else {
        1.0
    }
}

fn birth_weight<R: Rng + ?Sized>(params: &SpeciesParams, rng: &mut R) -> Option<f64> {
    let distribution = Normal::new(params.w_birth, params.sigma_birth).ok()?;
    let weight = distribution.sample(rng);
    (weight > 0.0).then_some(weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimRng;

    fn herbivore(age: u32, weight: f64) -> Animal {
        Animal::new(Species::Herbivore, age, weight, &SpeciesParams::herbivore())
    }

    fn carnivore(age: u32, weight: f64) -> Animal {
        Animal::new(Species::Carnivore, age, weight, &SpeciesParams::carnivore())
    }

    #[test]
    fn test_fitness_in_unit_interval() {
        let params = SpeciesParams::herbivore();
        for age in [0, 1, 5, 40, 80, 200] {
            for weight in [0.0, 0.5, 10.0, 35.0, 500.0] {
                let phi = fitness(age, weight, &params);
                assert!((0.0..=1.0).contains(&phi), "phi={phi} for age={age} weight={weight}");
            }
        }
        assert_eq!(fitness(3, 0.0, &params), 0.0);
        assert_eq!(fitness(3, -2.0, &params), 0.0);
    }

    #[test]
    fn test_fitness_at_half_values() {
        let params = SpeciesParams::herbivore();
        let phi = fitness(40, 10.0, &params);
        assert!((phi - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_feed_limited_by_appetite_and_fodder() {
        let params = SpeciesParams::herbivore();
        let mut herb = herbivore(5, 20.0);
        let before = herb.fitness();

        assert_eq!(herb.feed(15.0, &params), 10.0);
        assert!((herb.weight() - 29.0).abs() < 1e-12);
        assert!(herb.fitness() > before);

        assert_eq!(herb.feed(4.0, &params), 4.0);
        assert_eq!(herb.feed(0.0, &params), 0.0);
        assert_eq!(herb.feed(-3.0, &params), 0.0);
    }

    #[test]
    fn test_grow_older_ages_then_loses_weight() {
        let params = SpeciesParams::carnivore();
        let mut carn = carnivore(7, 80.0);
        carn.grow_older(&params);
        assert_eq!(carn.age(), 8);
        assert!((carn.weight() - 70.0).abs() < 1e-12);
        assert_eq!(carn.fitness(), fitness(8, 70.0, &params));
    }

    #[test]
    fn test_kill_probability() {
        assert_eq!(kill_probability(0.3, 0.5, 10.0), 0.0);
        assert_eq!(kill_probability(0.5, 0.5, 10.0), 0.0);
        assert!((kill_probability(0.8, 0.3, 10.0) - 0.05).abs() < 1e-12);
        assert_eq!(kill_probability(0.8, 0.3, 0.4), 1.0);
    }

    #[test]
    fn test_hunt_stops_at_appetite() {
        let mut params = SpeciesParams::carnivore();
        params.delta_phi_max = 0.01;
        params.appetite = 30.0;
        let mut carn = Animal::new(Species::Carnivore, 5, 40.0, &params);
        let prey: Vec<Animal> = (0..5).map(|_| herbivore(60, 20.0)).collect();
        let mut rng = SimRng::new(3);

        let killed = carn.hunt(&prey, &params, &mut rng);

        assert_eq!(killed, vec![0, 1]);
        assert!((carn.weight() - (40.0 + 0.75 * 30.0)).abs() < 1e-9);
    }

    #[test]
    fn test_hunt_ignores_fitter_prey() {
        let params = SpeciesParams::carnivore();
        let mut carn = Animal::new(Species::Carnivore, 90, 2.0, &params);
        let prey = vec![herbivore(5, 40.0), herbivore(5, 50.0)];
        let mut rng = SimRng::new(3);

        assert!(carn.hunt(&prey, &params, &mut rng).is_empty());
        assert_eq!(carn.weight(), 2.0);
    }

    #[test]
    fn test_no_procreation_below_threshold_or_alone() {
        let mut params = SpeciesParams::herbivore();
        params.gamma = 100.0;
        let mut rng = SimRng::new(11);

        let mut light = Animal::new(Species::Herbivore, 5, 20.0, &params);
        assert!(light.attempt_procreation(50, &params, &mut rng).is_none());

        let mut lonely = Animal::new(Species::Herbivore, 5, 60.0, &params);
        assert!(lonely.attempt_procreation(1, &params, &mut rng).is_none());
    }

    #[test]
    fn test_procreation_deducts_parent_weight() {
        let mut params = SpeciesParams::herbivore();
        params.gamma = 100.0;
        let mut rng = SimRng::new(11);
        let mut parent = Animal::new(Species::Herbivore, 5, 60.0, &params);

        let child = parent
            .attempt_procreation(10, &params, &mut rng)
            .expect("certain birth");

        assert_eq!(child.age(), 0);
        assert_eq!(child.species(), Species::Herbivore);
        assert!(child.weight() > 0.0);
        let expected = 60.0 - params.xi * child.weight();
        assert!((parent.weight() - expected).abs() < 1e-9);
        assert_eq!(parent.fitness(), fitness(5, parent.weight(), &params));
    }

    #[test]
    fn test_procreation_never_leaves_negative_parent() {
        let mut params = SpeciesParams::herbivore();
        params.gamma = 100.0;
        params.xi = 1_000.0;
        let mut rng = SimRng::new(5);
        let mut parent = Animal::new(Species::Herbivore, 5, 40.0, &params);

        let child = parent.attempt_procreation(10, &params, &mut rng);

        assert!(child.is_some());
        assert_eq!(parent.weight(), 0.0);
        assert_eq!(parent.fitness(), 0.0);
    }

    #[test]
    fn test_migration_probability_zero_after_migration() {
        let params = SpeciesParams::herbivore();
        let mut herb = herbivore(5, 20.0);
        assert!((herb.migration_probability(&params) - params.mu * herb.fitness()).abs() < 1e-12);

        herb.mark_migrated();
        assert_eq!(herb.migration_probability(&params), 0.0);

        herb.reset_migration();
        assert!(!herb.has_migrated());
    }

    #[test]
    fn test_zero_weight_always_dies() {
        let params = SpeciesParams::carnivore();
        let carn = carnivore(20, 0.0);
        for seed in 0..50 {
            let mut rng = SimRng::new(seed);
            assert!(carn.death_check(&params, &mut rng));
        }
    }

    #[test]
    fn test_no_death_when_omega_zero() {
        let mut params = SpeciesParams::herbivore();
        params.omega = 0.0;
        let herb = Animal::new(Species::Herbivore, 90, 1.0, &params);
        let mut rng = SimRng::new(9);
        for _ in 0..100 {
            assert!(!herb.death_check(&params, &mut rng));
        }
    }
}
