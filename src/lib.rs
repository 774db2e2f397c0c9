pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Particle, ParticleId, ParticleView, NVec2};
pub use simulation::spatial::{Circle, IndexedPoint, LinearIndex, SpatialIndex};
pub use simulation::quadtree::QuadTree;
pub use simulation::environment::Environment;
pub use simulation::step::{step, step_with_report, TickReport};
pub use simulation::scenario::{ParticleFactory, Scenario, SimulationStats};
pub use simulation::pointer::PointerDrag;
pub use simulation::error::SimError;

pub use configuration::config::{ConfigError, PhysicsConfig, RunConfig, ScenarioConfig, SimulationConfig, SpeciesConfig, ViewportConfig};

pub use benchmark::benchmark::{bench_neighbor_queries, bench_step, bench_step_curve};
