//! Pointer drag support
//!
//! A host can grab one particle, drive it with the pointer and let go. While
//! held the particle is skipped by the force/motion pass; its velocity is
//! derived from the frame-to-frame pointer displacement so that, on release,
//! it keeps moving the way it was thrown.

use crate::simulation::environment::Environment;
use crate::simulation::error::SimError;
use crate::simulation::states::{NVec2, Particle, ParticleId};

#[derive(Debug, Clone, Default)]
pub struct PointerDrag {
    held: Option<ParticleId>,
}

impl PointerDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> Option<ParticleId> {
        self.held
    }

    /// Grab the particle under `(x, y)`; the closest centre wins.
    ///
    /// Any previously held particle is released first.
    pub fn grab(&mut self, particles: &mut [Particle], x: f64, y: f64) -> Option<ParticleId> {
        self.release(particles);

        let pointer = NVec2::new(x, y);
        let picked = particles
            .iter_mut()
            .map(|p| {
                let d = (p.position() - pointer).norm();
                (d, p)
            })
            .filter(|(d, p)| *d <= p.radius)
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, p)| p)?;

        picked.held = true;
        self.held = Some(picked.id);
        Some(picked.id)
    }

    /// Move the held particle to `(x, y)`, clamped inside the viewport.
    ///
    /// Does nothing when no particle is held.
    pub fn drag_to(&mut self, env: &Environment, particles: &mut [Particle], x: f64, y: f64) -> Result<(), SimError> {
        let Some(id) = self.held else {
            return Ok(());
        };
        let Some(p) = particles.iter_mut().find(|p| p.id == id) else {
            self.held = None;
            return Err(SimError::UnknownParticle(id));
        };

        let target = NVec2::new(
            clamp_axis(x, p.radius, env.width),
            clamp_axis(y, p.radius, env.height),
        );
        let displacement = target - p.position();
        if displacement.norm() > 0.0 {
            p.set_velocity(displacement, env.physics.max_speed);
        }
        p.x = target.x;
        p.y = target.y;
        Ok(())
    }

    /// Hand the held particle back to the physics
    pub fn release(&mut self, particles: &mut [Particle]) {
        if let Some(id) = self.held.take() {
            if let Some(p) = particles.iter_mut().find(|p| p.id == id) {
                p.held = false;
            }
        }
    }
}

/// Clamp a coordinate to `[radius, extent - radius]`, or the middle if the disc is wider than the extent
fn clamp_axis(v: f64, radius: f64, extent: f64) -> f64 {
    if 2.0 * radius >= extent {
        return extent / 2.0;
    }
    v.clamp(radius, extent - radius)
}
