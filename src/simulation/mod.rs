pub mod states;
pub mod params;
pub mod math;
pub mod spatial;
pub mod quadtree;
pub mod environment;
pub mod forces;
pub mod integrator;
pub mod collision;
pub mod step;
pub mod pointer;
pub mod scenario;
pub mod error;
