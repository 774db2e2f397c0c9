//! Per-particle time integration
//!
//! Position and velocity are integrated separately:
//! - `move_particle` advances position by one implicit step of
//!   `speed` along `angle` and reflects off the viewport walls
//! - `apply_force` folds a net force into the velocity over `delta_time`
//!   (semi-implicit Euler: velocity now, position on the next move)

use std::f64::consts::PI;

use super::states::{NVec2, Particle};

/// Advance one step and reflect off the walls of `[0, width] x [0, height]`.
///
/// All four wall checks run every call, x before y, so a particle driven
/// into a corner is reflected on both axes in the same step. Position is
/// pinned to the wall minus/plus the radius, never left overlapping it.
pub fn move_particle(p: &mut Particle, width: f64, height: f64) {
    p.x += p.speed * p.angle.cos();
    p.y += p.speed * p.angle.sin();

    if p.x + p.radius >= width {
        p.x = width - p.radius;
        p.angle = PI - p.angle;
    }
    if p.x <= p.radius {
        p.x = p.radius;
        p.angle = PI - p.angle;
    }
    if p.y + p.radius >= height {
        p.y = height - p.radius;
        p.angle = -p.angle;
    }
    if p.y <= p.radius {
        p.y = p.radius;
        p.angle = -p.angle;
    }
}

/// Apply a net force for `delta_time` and re-derive `(speed, angle)`.
///
/// Massless particles cannot be accelerated and are left untouched.
pub fn apply_force(p: &mut Particle, force: NVec2, delta_time: f64, max_speed: f64) {
    if p.mass <= 0.0 {
        return;
    }
    let acceleration = force / p.mass;
    let v = p.velocity() + acceleration * delta_time;
    p.set_velocity(v, max_speed);
}
