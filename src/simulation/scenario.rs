//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! `Scenario` containing:
//! - the shared `Environment` (viewport, spatial index, clock, settings)
//! - the particle collection stamped out from the species list
//! - the id sequence and the seeded RNG used to place particles
//! - the pointer drag state
//!
//! A configuration or viewport change rebuilds environment and population
//! wholesale; particle ids keep increasing across rebuilds.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;
use tracing::info;

use crate::configuration::config::{ConfigError, RunConfig, ScenarioConfig, SimulationConfig, SpeciesConfig, ViewportConfig};
use crate::simulation::environment::Environment;
use crate::simulation::error::SimError;
use crate::simulation::params::PhysicsParams;
use crate::simulation::pointer::PointerDrag;
use crate::simulation::states::{clamp_speed, NVec2, Particle, ParticleId, ParticleView};
use crate::simulation::step::{step_with_report, TickReport};

/// Stamps out particles from species templates and hands out ids
#[derive(Debug, Clone)]
pub struct ParticleFactory {
    next_id: u64,
}

impl Default for ParticleFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleFactory {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    pub fn next_id(&mut self) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// One particle of `species` at `(x, y)` heading along `angle`
    pub fn spawn(&mut self, species: &SpeciesConfig, x: f64, y: f64, angle: f64, max_speed: f64) -> Particle {
        Particle::new(
            self.next_id(),
            x,
            y,
            clamp_speed(species.speed, max_speed),
            angle,
            species.radius,
            species.volumic_mass,
        )
        .with_color(species.color.clone())
        .with_magnetism(species.is_sensitive_to_magnetism, species.is_magnetic, species.magnetic_force)
    }

    /// Build the whole population for a viewport.
    ///
    /// Each particle gets a random position that keeps its disc inside the
    /// viewport and a random direction; the physical constants come from its
    /// species unchanged. An invalid configuration is rejected, not clamped.
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        config: &SimulationConfig,
        width: f64,
        height: f64,
        max_speed: f64,
        rng: &mut R,
    ) -> Result<Vec<Particle>, ConfigError> {
        config.validate()?;

        let mut particles = Vec::with_capacity(config.total_particles());
        for species in &config.species {
            for _ in 0..species.count() {
                let x = random_coordinate(rng, species.radius, width);
                let y = random_coordinate(rng, species.radius, height);
                let angle = rng.gen_range(0.0..TAU);
                particles.push(self.spawn(species, x, y, angle, max_speed));
            }
        }
        Ok(particles)
    }
}

/// Uniform in `[radius, extent - radius]`, or the middle when the disc does not fit
fn random_coordinate<R: Rng + ?Sized>(rng: &mut R, radius: f64, extent: f64) -> f64 {
    if 2.0 * radius >= extent {
        return extent / 2.0;
    }
    rng.gen_range(radius..=extent - radius)
}

/// Aggregate numbers for reporting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationStats {
    pub particles: usize,
    pub mean_speed: f64,
    pub kinetic_energy: f64, // sum of 1/2 m v^2
    pub momentum: NVec2, // sum of m v
}

impl SimulationStats {
    pub fn from_particles(particles: &[Particle]) -> Self {
        let n = particles.len();
        let speed_sum: f64 = particles.iter().map(|p| p.speed).sum();
        Self {
            particles: n,
            mean_speed: if n == 0 { 0.0 } else { speed_sum / n as f64 },
            kinetic_energy: particles.iter().map(Particle::kinetic_energy).sum(),
            momentum: particles.iter().fold(NVec2::zeros(), |acc, p| acc + p.momentum()),
        }
    }
}

/// Runtime bundle built from a [`ScenarioConfig`]: environment, population
/// and everything needed to rebuild them on configuration or size changes.
pub struct Scenario {
    pub environment: Environment,
    pub particles: Vec<Particle>,
    pub pointer: PointerDrag,
    pub run: RunConfig,
    physics: PhysicsParams,
    factory: ParticleFactory,
    rng: ChaCha8Rng,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, SimError> {
        cfg.validate()?;

        let rng = match cfg.run.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let physics = cfg.physics.to_params();
        let ViewportConfig { width, height } = cfg.viewport;

        let mut scenario = Self {
            environment: Environment::new(width, height, SimulationConfig::default(), physics.clone()),
            particles: Vec::new(),
            pointer: PointerDrag::new(),
            run: cfg.run,
            physics,
            factory: ParticleFactory::new(),
            rng,
        };
        scenario.rebuild(width, height, cfg.simulation)?;
        Ok(scenario)
    }

    /// Replace the species configuration and restart with a fresh population
    pub fn reconfigure(&mut self, simulation: &SimulationConfig) -> Result<(), SimError> {
        let (width, height) = (self.environment.width, self.environment.height);
        self.rebuild(width, height, simulation.clone())
    }

    /// Replace the viewport and restart with a fresh population
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), SimError> {
        ViewportConfig { width, height }.validate()?;
        let simulation = self.environment.simulation.clone();
        self.rebuild(width, height, simulation)
    }

    fn rebuild(&mut self, width: f64, height: f64, simulation: SimulationConfig) -> Result<(), SimError> {
        let particles = self
            .factory
            .populate(&simulation, width, height, self.physics.max_speed, &mut self.rng)?;

        let mut environment = Environment::new(width, height, simulation, self.physics.clone());
        environment.refresh_max_particle_radius(&particles);

        info!(
            width,
            height,
            species = environment.simulation.species.len(),
            particles = particles.len(),
            restitution = environment.coefficient_of_restitution(),
            "built particle population"
        );

        self.environment = environment;
        self.particles = particles;
        self.pointer = PointerDrag::new();
        Ok(())
    }

    /// Advance one tick with an explicit time step
    pub fn tick(&mut self, delta_time: f64) -> TickReport {
        self.environment.set_delta_time(delta_time);
        step_with_report(&mut self.environment, &mut self.particles)
    }

    /// Advance one tick, deriving the time step from a host timestamp
    pub fn tick_at(&mut self, now: f64) -> TickReport {
        self.environment.advance_clock(now);
        step_with_report(&mut self.environment, &mut self.particles)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// `{x, y, radius, color}` for every particle, in collection order
    pub fn render_view(&self) -> impl Iterator<Item = ParticleView<'_>> + '_ {
        self.particles.iter().map(Particle::view)
    }

    pub fn stats(&self) -> SimulationStats {
        SimulationStats::from_particles(&self.particles)
    }

    pub fn grab(&mut self, x: f64, y: f64) -> Option<ParticleId> {
        self.pointer.grab(&mut self.particles, x, y)
    }

    pub fn drag_to(&mut self, x: f64, y: f64) -> Result<(), SimError> {
        self.pointer.drag_to(&self.environment, &mut self.particles, x, y)
    }

    pub fn release(&mut self) {
        self.pointer.release(&mut self.particles);
    }
}
