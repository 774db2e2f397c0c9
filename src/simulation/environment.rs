//! Shared per-tick context
//!
//! One `Environment` exists per configuration/viewport epoch. It is replaced
//! wholesale when either changes; within an epoch only the clock fields and
//! the contents of the spatial index change from tick to tick.

use tracing::warn;

use crate::configuration::config::SimulationConfig;
use crate::simulation::params::PhysicsParams;
use crate::simulation::quadtree::QuadTree;
use crate::simulation::spatial::{IndexedPoint, SpatialIndex};
use crate::simulation::states::Particle;

pub struct Environment {
    pub width: f64, // viewport bounds
    pub height: f64,
    pub index: Box<dyn SpatialIndex + Send + Sync>, // cleared and reloaded each pass, never reallocated
    pub max_particle_radius: f64, // sizes the collision query
    pub last_update_time: Option<f64>, // timestamp of the previous tick
    pub delta_time: f64, // physical time step of the current tick
    pub simulation: SimulationConfig, // restitution + species list
    pub physics: PhysicsParams,
    points: Vec<IndexedPoint>, // scratch buffer reused by rebuild_index
}

impl Environment {
    /// Fresh environment backed by a viewport-sized quadtree
    pub fn new(width: f64, height: f64, simulation: SimulationConfig, physics: PhysicsParams) -> Self {
        let max_particle_radius = simulation
            .species
            .iter()
            .filter(|s| s.count() > 0)
            .map(|s| s.radius)
            .fold(0.0, f64::max);

        Self {
            width,
            height,
            index: Box::new(QuadTree::new(width, height, physics.quadtree_capacity)),
            max_particle_radius,
            last_update_time: None,
            delta_time: 0.0,
            simulation,
            physics,
            points: Vec::new(),
        }
    }

    /// Swap the spatial index for another implementation
    pub fn with_index<I>(mut self, index: I) -> Self
    where
        I: SpatialIndex + Send + Sync + 'static,
    {
        self.index = Box::new(index);
        self
    }

    pub fn coefficient_of_restitution(&self) -> f64 {
        self.simulation.coefficient_of_restitution
    }

    /// Set the time step for the next tick; negative or non-finite values become 0
    pub fn set_delta_time(&mut self, delta_time: f64) {
        if !delta_time.is_finite() || delta_time < 0.0 {
            warn!(delta_time, "ignoring invalid frame time, using 0");
            self.delta_time = 0.0;
            return;
        }
        self.delta_time = delta_time;
    }

    /// Derive `delta_time` from a host timestamp. The first call yields 0.
    pub fn advance_clock(&mut self, now: f64) -> f64 {
        let dt = match self.last_update_time {
            Some(last) => now - last,
            None => 0.0,
        };
        self.last_update_time = Some(now);
        self.set_delta_time(dt);
        self.delta_time
    }

    /// Clear the index and reload it from the current particle positions
    pub fn rebuild_index(&mut self, particles: &[Particle]) {
        self.points.clear();
        self.points
            .extend(particles.iter().enumerate().map(|(i, p)| IndexedPoint::from_particle(i, p)));
        self.index.clear();
        self.index.insert(&self.points);
    }

    pub fn refresh_max_particle_radius(&mut self, particles: &[Particle]) {
        self.max_particle_radius = particles.iter().map(|p| p.radius).fold(0.0, f64::max);
    }

    /// Radius of the neighborhood searched for magnetic sources
    pub fn magnetic_query_radius(&self) -> f64 {
        self.height / self.physics.neighborhood_divisor
    }

    /// Radius of the neighborhood searched for contacts
    pub fn collision_query_radius(&self) -> f64 {
        self.max_particle_radius * self.physics.collision_query_factor
    }
}
