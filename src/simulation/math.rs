//! Small 2D helpers shared by the particle behaviors
//!
//! Velocity lives on particles in polar form (`speed`, `angle`); these
//! functions convert to and from the cartesian `NVec2` used by the force
//! and collision math.

use std::f64::consts::{PI, TAU};

use crate::simulation::states::{NVec2, Particle};

/// Euclidean distance between two particle centres
pub fn distance(a: &Particle, b: &Particle) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Direction from `a` towards `b`
pub fn angle_between(a: &Particle, b: &Particle) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

pub fn velocity_from_speed_angle(speed: f64, angle: f64) -> NVec2 {
    NVec2::new(speed * angle.cos(), speed * angle.sin())
}

/// Returns `(speed, angle)` with the angle from `atan2`, i.e. in (-pi, pi]
pub fn speed_angle_from_velocity(v: NVec2) -> (f64, f64) {
    (v.norm(), v.y.atan2(v.x))
}

/// Wrap an angle into [0, 2pi); only used for display and debugging
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Turn a particle around
pub fn opposite_direction(particle: &mut Particle) {
    particle.angle = normalize_angle(particle.angle + PI);
}
