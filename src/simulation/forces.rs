//! Magnetic interaction between particles
//!
//! Inverse-square law restricted to a spatially-queried neighborhood rather
//! than all pairs. A magnetic source pulls a sensitive target towards it;
//! closer than the target's own radius the sign flips and the pair repels,
//! which keeps attraction from running away at near-zero distance.

use crate::simulation::environment::Environment;
use crate::simulation::integrator::apply_force;
use crate::simulation::spatial::Circle;
use crate::simulation::states::{NVec2, Particle};

/// Signed magnitude of the force between two masses.
///
/// Positive means attraction. Inside `contact_radius` the force repels.
pub fn magnetic_force_magnitude(m1: f64, m2: f64, distance: f64, contact_radius: f64, g: f64) -> f64 {
    let magnitude = g * m1 * m2 / (distance * distance);
    if distance < contact_radius {
        -magnitude
    } else {
        magnitude
    }
}

/// Force exerted on `target` by `source`.
///
/// Returns `None` when `source` is not magnetic or the two centres coincide
/// (the direction is undefined there).
pub fn magnetic_force(target: &Particle, source: &Particle, g: f64) -> Option<NVec2> {
    if !source.is_magnetic {
        return None;
    }

    // r points from target to source; attraction acts along +r
    let r = source.position() - target.position();
    let distance = r.norm();
    if distance == 0.0 || !distance.is_finite() {
        return None;
    }

    let magnitude = magnetic_force_magnitude(target.mass, source.mass, distance, target.radius, g);
    Some(r / distance * magnitude)
}

/// Sum of the forces the given neighbors exert on `target`
pub fn net_magnetic_force<'a, I>(target: &Particle, neighbors: I, g: f64) -> NVec2
where
    I: IntoIterator<Item = &'a Particle>,
{
    neighbors
        .into_iter()
        .filter_map(|source| magnetic_force(target, source, g))
        .fold(NVec2::zeros(), |acc, f| acc + f)
}

/// Pull/push `target` by its magnetic neighbors for one time step.
///
/// The velocity changes, the position does not; `move_particle` integrates
/// position separately. The neighbor list must not contain `target` itself.
pub fn apply_magnetic_forces<'a, I>(target: &mut Particle, neighbors: I, env: &Environment)
where
    I: IntoIterator<Item = &'a Particle>,
{
    let force = net_magnetic_force(target, neighbors, env.physics.magnetic_constant);
    apply_force(target, force, env.delta_time, env.physics.max_speed);
}

/// Compute the net magnetic force on every particle from the current snapshot.
///
/// `env.index` must have been rebuilt from `particles`. Held particles and
/// particles that are not sensitive to magnetism get a zero force.
/// `out[i]` is overwritten with the force on `particles[i]`.
///
/// # Returns
/// The number of (target, source) pairs that contributed a force.
pub fn accumulate_magnetic_forces(env: &Environment, particles: &[Particle], out: &mut [NVec2]) -> usize {
    // Zero buffer
    for f in out.iter_mut() {
        *f = NVec2::zeros();
    }

    let radius = env.magnetic_query_radius();
    let g = env.physics.magnetic_constant;
    let mut neighbors = Vec::new();
    let mut interactions = 0;

    for (i, target) in particles.iter().enumerate() {
        if target.held || !target.is_sensitive_to_magnetism {
            continue;
        }

        neighbors.clear();
        env.index.query(&Circle::new(target.x, target.y, radius), &mut neighbors);

        for point in &neighbors {
            // self filter by identity, never by coordinates
            if point.index == i {
                continue;
            }
            let Some(source) = particles.get(point.index) else {
                continue;
            };
            if let Some(f) = magnetic_force(target, source, g) {
                out[i] += f;
                interactions += 1;
            }
        }
    }

    interactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::ParticleId;

    fn magnet(id: u64, x: f64, y: f64) -> Particle {
        Particle::new(ParticleId(id), x, y, 0.0, 0.0, 2.0, 1.0).with_magnetism(true, true, 1.0)
    }

    #[test]
    fn attracts_towards_source() {
        let a = magnet(1, 0.0, 0.0);
        let b = magnet(2, 10.0, 0.0);
        let f = magnetic_force(&a, &b, 1e-5).unwrap();
        assert!(f.x > 0.0);
        assert!(f.y.abs() < 1e-15);
    }

    #[test]
    fn repels_inside_contact_radius() {
        let a = magnet(1, 0.0, 0.0);
        let b = magnet(2, 1.0, 0.0);
        let f = magnetic_force(&a, &b, 1e-5).unwrap();
        assert!(f.x < 0.0);
    }

    #[test]
    fn inverse_square_law() {
        let near = magnetic_force_magnitude(1.0, 1.0, 10.0, 1.0, 1.0);
        let far = magnetic_force_magnitude(1.0, 1.0, 20.0, 1.0, 1.0);
        assert!((near / far - 4.0).abs() < 1e-12);
    }

    #[test]
    fn skips_non_magnetic_and_coincident() {
        let a = magnet(1, 5.0, 5.0);
        let same_spot = magnet(2, 5.0, 5.0);
        let inert = Particle::new(ParticleId(3), 9.0, 5.0, 0.0, 0.0, 2.0, 1.0);
        assert!(magnetic_force(&a, &same_spot, 1e-5).is_none());
        assert!(magnetic_force(&a, &inert, 1e-5).is_none());
        assert_eq!(net_magnetic_force(&a, [&same_spot, &inert], 1e-5), NVec2::zeros());
    }

    #[test]
    fn pair_forces_are_equal_and_opposite() {
        let a = magnet(1, 0.0, 0.0);
        let b = magnet(2, 3.0, 4.0);
        let fa = magnetic_force(&a, &b, 1e-5).unwrap();
        let fb = magnetic_force(&b, &a, 1e-5).unwrap();
        assert!((fa + fb).norm() < 1e-15);
    }

    #[test]
    fn apply_changes_velocity_not_position() {
        use crate::configuration::config::SimulationConfig;
        use crate::simulation::params::PhysicsParams;

        let mut env = Environment::new(400.0, 400.0, SimulationConfig::default(), PhysicsParams::default());
        env.set_delta_time(16.0);
        let mut target = magnet(1, 100.0, 100.0);
        let source = magnet(2, 100.0, 120.0);

        apply_magnetic_forces(&mut target, [&source], &env);
        assert_eq!((target.x, target.y), (100.0, 100.0));
        assert!(target.speed > 0.0);
        assert!(target.velocity().y > 0.0);
    }
}
