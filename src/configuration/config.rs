//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`ViewportConfig`]   – the drawing area the particles live in
//! - [`SimulationConfig`] – restitution plus the ordered species list
//! - [`SpeciesConfig`]    – one template stamped out `number_of_particles` times
//! - [`PhysicsConfig`]    – tuning constants (speed clamp, query sizes, ...)
//! - [`RunConfig`]        – headless run settings (ticks, frame time, seed)
//! - [`ScenarioConfig`]   – top-level wrapper loaded from YAML
//!
//! # YAML format
//! ```yaml
//! viewport:
//!   width: 800.0
//!   height: 600.0
//!
//! simulation:
//!   coefficient_of_restitution: 0.9   # 1 = perfectly elastic, 0 = inelastic
//!   species:
//!     - speed: 1.0
//!       volumic_mass: 1.0
//!       radius: 10.0
//!       color: "orange"
//!       number_of_particles: 40
//!       is_sensitive_to_magnetism: true
//!       is_magnetic: true
//!       magnetic_force: 1.0
//!
//! physics:            # optional, every field has a default
//!   max_speed: 2.0
//!
//! run:                # optional
//!   ticks: 600
//!   delta_time: 16.0
//!   seed: 42
//! ```
//!
//! The scenario builder maps this configuration onto the runtime
//! `Environment` and particle collection. Nothing here is clamped silently:
//! [`ScenarioConfig::validate`] rejects values the engine cannot use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::simulation::params::{
    PhysicsParams, COLLISION_QUERY_FACTOR, MAGNETIC_CONSTANT, MAX_SPEED, NEIGHBORHOOD_DIVISOR, QUADTREE_CAPACITY,
};

/// Errors raised while validating a configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("species {species}: {field} must not be negative (got {value})")]
    NegativeValue {
        field: &'static str,
        species: usize,
        value: f64,
    },

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("coefficient of restitution must be within [0, 1] (got {0})")]
    RestitutionOutOfRange(f64),

    #[error("viewport must have a positive size (got {width}x{height})")]
    InvalidViewport { width: f64, height: f64 },

    #[error("invalid physics parameter: {0}")]
    InvalidPhysics(&'static str),
}

/// Drawing area size supplied by the layout collaborator
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 200.0,
        }
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ok = self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0;
        if !ok {
            return Err(ConfigError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Template for a group of physically identical particles
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SpeciesConfig {
    pub speed: f64, // initial speed of every particle
    pub volumic_mass: f64, // density; mass = radius^2 * pi * volumic_mass
    pub radius: f64,
    pub color: String, // opaque to the engine, handed to the renderer
    pub number_of_particles: i64, // signed so a negative count is reported, not a parse error
    pub is_sensitive_to_magnetism: bool,
    pub is_magnetic: bool,
    pub magnetic_force: f64,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            volumic_mass: 1.0,
            radius: 10.0,
            color: String::from("black"),
            number_of_particles: 20,
            is_sensitive_to_magnetism: false,
            is_magnetic: false,
            magnetic_force: 0.0,
        }
    }
}

impl SpeciesConfig {
    /// `species` is the position in the species list, used in error messages
    pub fn validate(&self, species: usize) -> Result<(), ConfigError> {
        for (field, value) in [
            ("speed", self.speed),
            ("volumic_mass", self.volumic_mass),
            ("radius", self.radius),
            ("magnetic_force", self.magnetic_force),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
            if value < 0.0 {
                return Err(ConfigError::NegativeValue { field, species, value });
            }
        }
        if self.number_of_particles < 0 {
            return Err(ConfigError::NegativeValue {
                field: "number_of_particles",
                species,
                value: self.number_of_particles as f64,
            });
        }
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.number_of_particles.max(0) as usize
    }
}

/// Global collision setting plus the ordered species list
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub coefficient_of_restitution: f64, // 1 = elastic, 0 = perfectly inelastic
    pub species: Vec<SpeciesConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            coefficient_of_restitution: 1.0,
            species: vec![SpeciesConfig::default()],
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let e = self.coefficient_of_restitution;
        if !(0.0..=1.0).contains(&e) {
            return Err(ConfigError::RestitutionOutOfRange(e));
        }
        for (i, species) in self.species.iter().enumerate() {
            species.validate(i)?;
        }
        Ok(())
    }

    pub fn total_particles(&self) -> usize {
        self.species.iter().map(SpeciesConfig::count).sum()
    }
}

/// Tuning constants; see `simulation::params` for what each one controls
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub max_speed: f64,
    pub magnetic_constant: f64,
    pub neighborhood_divisor: f64,
    pub collision_query_factor: f64,
    pub quadtree_capacity: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            magnetic_constant: MAGNETIC_CONSTANT,
            neighborhood_divisor: NEIGHBORHOOD_DIVISOR,
            collision_query_factor: COLLISION_QUERY_FACTOR,
            quadtree_capacity: QUADTREE_CAPACITY,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_speed.is_finite() && self.max_speed >= 0.0) {
            return Err(ConfigError::InvalidPhysics("max_speed must be finite and >= 0"));
        }
        if !self.magnetic_constant.is_finite() {
            return Err(ConfigError::InvalidPhysics("magnetic_constant must be finite"));
        }
        if !(self.neighborhood_divisor.is_finite() && self.neighborhood_divisor > 0.0) {
            return Err(ConfigError::InvalidPhysics("neighborhood_divisor must be > 0"));
        }
        if !(self.collision_query_factor.is_finite() && self.collision_query_factor >= 2.0) {
            // below 2 a touching pair of maximum-radius particles can be missed
            return Err(ConfigError::InvalidPhysics("collision_query_factor must be >= 2"));
        }
        if self.quadtree_capacity == 0 {
            return Err(ConfigError::InvalidPhysics("quadtree_capacity must be >= 1"));
        }
        Ok(())
    }

    pub fn to_params(&self) -> PhysicsParams {
        PhysicsParams {
            max_speed: self.max_speed,
            magnetic_constant: self.magnetic_constant,
            neighborhood_divisor: self.neighborhood_divisor,
            collision_query_factor: self.collision_query_factor,
            quadtree_capacity: self.quadtree_capacity,
        }
    }
}

/// Settings for a headless run driven by the binary
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub ticks: u64, // number of ticks to simulate
    pub delta_time: f64, // frame time fed to every tick
    pub seed: Option<u64>, // deterministic seed; None seeds from entropy
    pub report_every: u64, // ticks between summary log lines, 0 disables
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            delta_time: 16.0,
            seed: None,
            report_every: 60,
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport.validate()?;
        self.simulation.validate()?;
        self.physics.validate()?;
        if !(self.run.delta_time.is_finite() && self.run.delta_time >= 0.0) {
            return Err(ConfigError::NonFinite { field: "run.delta_time" });
        }
        Ok(())
    }
}
