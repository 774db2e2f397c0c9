//! Impulse-based collision response
//!
//! Contacts are resolved along the line of centres with a global coefficient
//! of restitution `e` (1 = perfectly elastic, 0 = perfectly inelastic along
//! the normal). Both bodies are updated by a single call.

use crate::simulation::environment::Environment;
use crate::simulation::math::distance;
use crate::simulation::spatial::Circle;
use crate::simulation::states::Particle;

/// Resolve a contact between `a` and `b`.
///
/// Returns `true` when an impulse was applied. Nothing changes when:
/// - the bodies are already separating along the normal,
/// - their centres coincide (no normal),
/// - either body has no mass.
pub fn resolve_elastic_collision(a: &mut Particle, b: &mut Particle, restitution: f64, max_speed: f64) -> bool {
    if a.mass <= 0.0 || b.mass <= 0.0 {
        return false;
    }

    let mut v1 = a.velocity();
    let mut v2 = b.velocity();

    // Unit normal from a to b
    let delta = b.position() - a.position();
    let separation = delta.norm();
    if separation == 0.0 || !separation.is_finite() {
        return false;
    }
    let normal = delta / separation;

    // Relative velocity along the normal; >= 0 means moving apart
    let rel_along_normal = (v2 - v1).dot(&normal);
    if rel_along_normal >= 0.0 {
        return false;
    }

    let j = -(1.0 + restitution) * rel_along_normal / (1.0 / a.mass + 1.0 / b.mass);
    let impulse = normal * j;

    v1 -= impulse / a.mass;
    v2 += impulse / b.mass;

    a.set_velocity(v1, max_speed);
    b.set_velocity(v2, max_speed);
    true
}

/// True when the two discs touch or overlap
pub fn are_touching(a: &Particle, b: &Particle) -> bool {
    distance(a, b) <= a.radius + b.radius
}

/// Borrow two distinct elements of a slice mutably
fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> (&mut Particle, &mut Particle) {
    debug_assert!(i != j);
    if i < j {
        let (left, right) = particles.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = particles.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Detect and resolve every contact in the current positions.
///
/// `env.index` must have been rebuilt from `particles`. Each unordered pair
/// is seen twice (once from each side); it is resolved only from the side
/// with the smaller id, so no impulse is applied twice in one pass.
///
/// # Returns
/// The number of contacts that received an impulse.
pub fn resolve_collisions(env: &Environment, particles: &mut [Particle]) -> usize {
    let radius = env.collision_query_radius();
    let restitution = env.coefficient_of_restitution();
    let max_speed = env.physics.max_speed;

    let mut candidates = Vec::new();
    let mut resolved = 0;

    for i in 0..particles.len() {
        candidates.clear();
        let (x, y) = (particles[i].x, particles[i].y);
        env.index.query(&Circle::new(x, y, radius), &mut candidates);

        for point in &candidates {
            let j = point.index;
            if j == i || j >= particles.len() {
                continue;
            }
            // pair dedup: only the lower id resolves
            if particles[i].id >= particles[j].id {
                continue;
            }
            if !are_touching(&particles[i], &particles[j]) {
                continue;
            }

            let (a, b) = pair_mut(particles, i, j);
            if resolve_elastic_collision(a, b, restitution, max_speed) {
                resolved += 1;
            }
        }
    }

    resolved
}
