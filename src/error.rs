//! Setup-time configuration errors.
//!
//! Everything that can go wrong while building an island, ingesting a
//! population or tuning parameters surfaces here. A running year never
//! produces an error.

use thiserror::Error;

use crate::config::{LandscapeKind, Species};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("island map is empty")]
    EmptyMap,

    #[error("island map is not rectangular: row {row} has {found} cells, expected {expected}")]
    NotRectangular {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("unknown landscape code '{code}' at row {row}, column {col}")]
    UnknownLandscape { code: char, row: usize, col: usize },

    #[error("unknown landscape code '{0}'")]
    UnknownLandscapeCode(char),

    #[error("border cell at row {row}, column {col} must be Water, found {kind}")]
    OpenBorder {
        row: usize,
        col: usize,
        kind: LandscapeKind,
    },

    #[error("unknown parameter '{name}' for {target}")]
    UnknownParameter { target: String, name: String },

    #[error("parameter '{name}' for {target} is out of range ({value}): {reason}")]
    ParameterOutOfRange {
        target: String,
        name: String,
        value: f64,
        reason: &'static str,
    },

    #[error("unknown species '{0}'")]
    UnknownSpecies(String),

    #[error("location ({row}, {col}) is outside the island")]
    UnknownLocation { row: usize, col: usize },

    #[error("location ({row}, {col}) is {kind} and cannot hold animals")]
    ImpassableLocation {
        row: usize,
        col: usize,
        kind: LandscapeKind,
    },

    #[error("invalid {species} at ({row}, {col}): {reason}")]
    InvalidAnimal {
        species: Species,
        row: usize,
        col: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
