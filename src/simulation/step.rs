//! One simulation tick
//!
//! Two passes, each starting from a freshly rebuilt spatial index:
//!
//! 1. force/motion: every magnetic force is computed from the pre-move
//!    snapshot, then every particle is accelerated and moved
//! 2. collision: contacts found in the post-move positions are resolved,
//!    each unordered pair at most once
//!
//! Held particles skip pass 1 entirely; they still act as obstacles in pass 2.

use tracing::debug;

use crate::simulation::collision::resolve_collisions;
use crate::simulation::environment::Environment;
use crate::simulation::forces::accumulate_magnetic_forces;
use crate::simulation::integrator::{apply_force, move_particle};
use crate::simulation::states::{NVec2, Particle};

/// Counters gathered during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub magnetic_interactions: usize, // (target, source) pairs that exerted a force
    pub collisions: usize, // contacts that received an impulse
}

/// Advance the population by one tick using `env.delta_time`.
///
/// Mutates in place and hands the slice back for chaining.
pub fn step<'a>(env: &mut Environment, particles: &'a mut [Particle]) -> &'a mut [Particle] {
    step_with_report(env, particles);
    particles
}

/// Same as [`step`] but returns the tick counters instead of the slice
pub fn step_with_report(env: &mut Environment, particles: &mut [Particle]) -> TickReport {
    if particles.is_empty() {
        return TickReport::default();
    }

    // Pass 1: forces from the pre-move snapshot, then move everyone
    env.rebuild_index(particles);
    let mut forces = vec![NVec2::zeros(); particles.len()];
    let magnetic_interactions = accumulate_magnetic_forces(env, particles, &mut forces);

    let (width, height) = (env.width, env.height);
    for (p, force) in particles.iter_mut().zip(forces.iter()) {
        if p.held {
            continue;
        }
        if p.is_sensitive_to_magnetism {
            apply_force(p, *force, env.delta_time, env.physics.max_speed);
        }
        move_particle(p, width, height);
    }

    // Pass 2: contacts in the post-move positions
    env.rebuild_index(particles);
    let collisions = resolve_collisions(env, particles);

    let report = TickReport {
        magnetic_interactions,
        collisions,
    };
    debug!(
        particles = particles.len(),
        magnetic_interactions = report.magnetic_interactions,
        collisions = report.collisions,
        "tick"
    );
    report
}
