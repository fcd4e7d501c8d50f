//! Species and landscape parameter tables.
//!
//! Tables are plain values. Tuning goes through `with_overrides`, which
//! validates every named option and hands back a fresh table, so a table
//! in use by a running island is never patched in place.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    Herbivore,
    Carnivore,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Herbivore, Species::Carnivore];

    pub fn name(self) -> &'static str {
        match self {
            Species::Herbivore => "Herbivore",
            Species::Carnivore => "Carnivore",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Species {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "herbivore" => Ok(Species::Herbivore),
            "carnivore" => Ok(Species::Carnivore),
            _ => Err(ConfigError::UnknownSpecies(value.to_string())),
        }
    }
}

/// Landscape of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandscapeKind {
    Water,
    Desert,
    Lowland,
    Highland,
}

impl LandscapeKind {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'W' => Some(LandscapeKind::Water),
            'D' => Some(LandscapeKind::Desert),
            'L' => Some(LandscapeKind::Lowland),
            'H' => Some(LandscapeKind::Highland),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            LandscapeKind::Water => 'W',
            LandscapeKind::Desert => 'D',
            LandscapeKind::Lowland => 'L',
            LandscapeKind::Highland => 'H',
        }
    }

    /// Water is the only landscape animals can neither stand on nor enter.
    pub fn is_passable(self) -> bool {
        !matches!(self, LandscapeKind::Water)
    }

    pub fn name(self) -> &'static str {
        match self {
            LandscapeKind::Water => "Water",
            LandscapeKind::Desert => "Desert",
            LandscapeKind::Lowland => "Lowland",
            LandscapeKind::Highland => "Highland",
        }
    }
}

impl fmt::Display for LandscapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Constants driving one species' lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesParams {
    pub w_birth: f64,
    pub sigma_birth: f64,
    pub beta: f64,
    pub eta: f64,
    pub a_half: f64,
    pub phi_age: f64,
    pub w_half: f64,
    pub phi_weight: f64,
    pub mu: f64,
    pub gamma: f64,
    pub zeta: f64,
    pub xi: f64,
    pub omega: f64,
    /// Appetite `F`.
    pub appetite: f64,
    /// Only meaningful for carnivores.
    pub delta_phi_max: f64,
}

impl SpeciesParams {
    pub fn herbivore() -> Self {
        Self {
            w_birth: 8.0,
            sigma_birth: 1.5,
            beta: 0.9,
            eta: 0.05,
            a_half: 40.0,
            phi_age: 0.6,
            w_half: 10.0,
            phi_weight: 0.1,
            mu: 0.25,
            gamma: 0.2,
            zeta: 3.5,
            xi: 1.2,
            omega: 0.4,
            appetite: 10.0,
            delta_phi_max: 10.0,
        }
    }

    pub fn carnivore() -> Self {
        Self {
            w_birth: 6.0,
            sigma_birth: 1.0,
            beta: 0.75,
            eta: 0.125,
            a_half: 40.0,
            phi_age: 0.3,
            w_half: 4.0,
            phi_weight: 0.4,
            mu: 0.4,
            gamma: 0.8,
            zeta: 3.5,
            xi: 1.1,
            omega: 0.8,
            appetite: 50.0,
            delta_phi_max: 10.0,
        }
    }

    /// Weight below which an animal never gives birth.
    pub fn breeding_threshold(&self) -> f64 {
        self.zeta * (self.w_birth + self.sigma_birth)
    }

    /// Returns a copy with the named options replaced. The receiver is left
    /// untouched when any option is unknown or out of range.
    pub fn with_overrides(
        &self,
        species: Species,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<Self> {
        let mut next = self.clone();
        for (name, &value) in overrides {
            next.set(species, name, value)?;
        }
        Ok(next)
    }

    /// Runs every option through the same checks as [`with_overrides`].
    ///
    /// [`with_overrides`]: SpeciesParams::with_overrides
    pub fn validate(&self, species: Species) -> Result<()> {
        self.options(species)
            .into_iter()
            .try_for_each(|(name, value)| check_range(species.name(), name, value))
    }

    fn options(&self, species: Species) -> Vec<(&'static str, f64)> {
        let mut options = vec![
            ("w_birth", self.w_birth),
            ("sigma_birth", self.sigma_birth),
            ("beta", self.beta),
            ("eta", self.eta),
            ("a_half", self.a_half),
            ("phi_age", self.phi_age),
            ("w_half", self.w_half),
            ("phi_weight", self.phi_weight),
            ("mu", self.mu),
            ("gamma", self.gamma),
            ("zeta", self.zeta),
            ("xi", self.xi),
            ("omega", self.omega),
            ("F", self.appetite),
        ];
        if species == Species::Carnivore {
            options.push(("DeltaPhiMax", self.delta_phi_max));
        }
        options
    }

    fn set(&mut self, species: Species, name: &str, value: f64) -> Result<()> {
        let target = species.name();
        let slot = match name {
            "w_birth" => &mut self.w_birth,
            "sigma_birth" => &mut self.sigma_birth,
            "beta" => &mut self.beta,
            "eta" => &mut self.eta,
            "a_half" => &mut self.a_half,
            "phi_age" => &mut self.phi_age,
            "w_half" => &mut self.w_half,
            "phi_weight" => &mut self.phi_weight,
            "mu" => &mut self.mu,
            "gamma" => &mut self.gamma,
            "zeta" => &mut self.zeta,
            "xi" => &mut self.xi,
            "omega" => &mut self.omega,
            "F" => &mut self.appetite,
            "DeltaPhiMax" if species == Species::Carnivore => &mut self.delta_phi_max,
            _ => {
                return Err(ConfigError::UnknownParameter {
                    target: target.to_string(),
                    name: name.to_string(),
                })
            }
        };
        check_range(target, name, value)?;
        *slot = value;
        Ok(())
    }
}

fn check_range(target: &str, name: &str, value: f64) -> Result<()> {
    let out_of_range = |reason| ConfigError::ParameterOutOfRange {
        target: target.to_string(),
        name: name.to_string(),
        value,
        reason,
    };
    if !value.is_finite() {
        return Err(out_of_range("must be a finite number"));
    }
    if value < 0.0 {
        return Err(out_of_range("must not be negative"));
    }
    if name == "eta" && value > 1.0 {
        return Err(out_of_range("must lie in [0, 1]"));
    }
    if name == "DeltaPhiMax" && value <= 0.0 {
        return Err(out_of_range("must be strictly positive"));
    }
    Ok(())
}

/// Fodder capacity per landscape kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandscapeParams {
    pub lowland_f_max: f64,
    pub highland_f_max: f64,
}

impl Default for LandscapeParams {
    fn default() -> Self {
        Self {
            lowland_f_max: 800.0,
            highland_f_max: 300.0,
        }
    }
}

impl LandscapeParams {
    pub fn fodder_capacity(&self, kind: LandscapeKind) -> f64 {
        match kind {
            LandscapeKind::Lowland => self.lowland_f_max,
            LandscapeKind::Highland => self.highland_f_max,
            LandscapeKind::Desert | LandscapeKind::Water => 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_range(LandscapeKind::Lowland.name(), "f_max", self.lowland_f_max)?;
        check_range(LandscapeKind::Highland.name(), "f_max", self.highland_f_max)
    }

    pub fn with_overrides(
        &self,
        kind: LandscapeKind,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<Self> {
        let mut next = self.clone();
        for (name, &value) in overrides {
            let slot = match (kind, name.as_str()) {
                (LandscapeKind::Lowland, "f_max") => &mut next.lowland_f_max,
                (LandscapeKind::Highland, "f_max") => &mut next.highland_f_max,
                _ => {
                    return Err(ConfigError::UnknownParameter {
                        target: kind.name().to_string(),
                        name: name.clone(),
                    })
                }
            };
            check_range(kind.name(), name, value)?;
            *slot = value;
        }
        Ok(next)
    }
}

/// Every table an island needs for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub herbivore: SpeciesParams,
    pub carnivore: SpeciesParams,
    pub landscape: LandscapeParams,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            herbivore: SpeciesParams::herbivore(),
            carnivore: SpeciesParams::carnivore(),
            landscape: LandscapeParams::default(),
        }
    }
}

impl Parameters {
    pub fn species(&self, species: Species) -> &SpeciesParams {
        match species {
            Species::Herbivore => &self.herbivore,
            Species::Carnivore => &self.carnivore,
        }
    }

    /// Rejects tables assembled by hand that the named-option setters would
    /// have refused.
    pub fn validate(&self) -> Result<()> {
        self.herbivore.validate(Species::Herbivore)?;
        self.carnivore.validate(Species::Carnivore)?;
        self.landscape.validate()
    }

    pub fn with_species_overrides(
        &self,
        species: Species,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<Self> {
        let table = self.species(species).with_overrides(species, overrides)?;
        let mut next = self.clone();
        match species {
            Species::Herbivore => next.herbivore = table,
            Species::Carnivore => next.carnivore = table,
        }
        Ok(next)
    }

    /// `code` is the single-letter map code (`L`, `H`, `D`, `W`).
    pub fn with_landscape_overrides(
        &self,
        code: char,
        overrides: &BTreeMap<String, f64>,
    ) -> Result<Self> {
        let kind =
            LandscapeKind::from_code(code).ok_or(ConfigError::UnknownLandscapeCode(code))?;
        let mut next = self.clone();
        next.landscape = self.landscape.with_overrides(kind, overrides)?;
        Ok(next)
    }
}
