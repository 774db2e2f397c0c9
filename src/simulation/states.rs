//! Core state types for the particle simulation.
//!
//! Defines the per-particle record and the read-only view handed to renderers:
//! - `Particle` holds position, polar velocity (`speed`, `angle`) and the
//!   physical constants stamped out from a species
//! - `ParticleView` is the `{x, y, radius, color}` slice a drawing layer needs
//!
//! Species differences are pure data; every behavior lives in free functions
//! (`integrator`, `forces`, `collision`) that take a particle plus context.

use nalgebra::Vector2;
use serde::Serialize;
use std::f64::consts::PI;
use std::fmt;

use crate::simulation::math::{speed_angle_from_velocity, velocity_from_speed_angle};

pub type NVec2 = Vector2<f64>;

/// Stable identifier, unique for the lifetime of a running simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub id: ParticleId,
    pub x: f64, // position
    pub y: f64,
    pub speed: f64, // velocity magnitude
    pub angle: f64, // direction of travel (radians)
    pub mass: f64, // radius^2 * pi * volumic_mass, fixed at construction
    pub volumic_mass: f64,
    pub radius: f64,
    pub color: String,
    pub is_sensitive_to_magnetism: bool, // pulled/pushed by magnetic neighbors
    pub is_magnetic: bool, // exerts force on sensitive neighbors
    pub magnetic_force: f64,
    pub held: bool, // driven by the pointer instead of physics
}

impl Particle {
    /// Plain, non-magnetic particle; mass is derived from radius and density
    pub fn new(id: ParticleId, x: f64, y: f64, speed: f64, angle: f64, radius: f64, volumic_mass: f64) -> Self {
        Self {
            id,
            x,
            y,
            speed,
            angle,
            mass: radius * radius * PI * volumic_mass,
            volumic_mass,
            radius,
            color: String::from("black"),
            is_sensitive_to_magnetism: false,
            is_magnetic: false,
            magnetic_force: 0.0,
            held: false,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_magnetism(mut self, sensitive: bool, magnetic: bool, magnetic_force: f64) -> Self {
        self.is_sensitive_to_magnetism = sensitive;
        self.is_magnetic = magnetic;
        self.magnetic_force = magnetic_force;
        self
    }

    pub fn position(&self) -> NVec2 {
        NVec2::new(self.x, self.y)
    }

    pub fn velocity(&self) -> NVec2 {
        velocity_from_speed_angle(self.speed, self.angle)
    }

    /// Replace the velocity from a cartesian vector, clamping speed to `max_speed`
    pub fn set_velocity(&mut self, v: NVec2, max_speed: f64) {
        let (speed, angle) = speed_angle_from_velocity(v);
        self.speed = clamp_speed(speed, max_speed);
        self.angle = angle;
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.speed * self.speed
    }

    pub fn momentum(&self) -> NVec2 {
        self.velocity() * self.mass
    }

    pub fn view(&self) -> ParticleView<'_> {
        ParticleView {
            x: self.x,
            y: self.y,
            radius: self.radius,
            color: &self.color,
        }
    }
}

/// Keep a speed inside `[0, max_speed]`; NaN collapses to 0
pub fn clamp_speed(speed: f64, max_speed: f64) -> f64 {
    if speed.is_nan() {
        return 0.0;
    }
    speed.clamp(0.0, max_speed)
}

/// What a drawing collaborator reads each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleView<'a> {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: &'a str,
}
