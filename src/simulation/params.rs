//! Numerical and physical parameters for the simulation
//!
//! `PhysicsParams` holds the tuning constants the tick reads:
//! - the global speed clamp,
//! - the magnetic force constant,
//! - the neighborhood sizes used for magnetic and collision queries,
//! - the quadtree bucket capacity

/// Speed ceiling applied after every force or collision update
pub const MAX_SPEED: f64 = 2.0;

/// Constant of the inverse-square magnetic law
pub const MAGNETIC_CONSTANT: f64 = 1e-5;

/// Magnetic query radius is `height / NEIGHBORHOOD_DIVISOR`
pub const NEIGHBORHOOD_DIVISOR: f64 = 8.0;

/// Collision query radius is `max_particle_radius * COLLISION_QUERY_FACTOR`
pub const COLLISION_QUERY_FACTOR: f64 = 3.0;

pub const QUADTREE_CAPACITY: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsParams {
    pub max_speed: f64, // speed clamp
    pub magnetic_constant: f64, // G in F = G m1 m2 / d^2
    pub neighborhood_divisor: f64, // magnetic neighborhood = height / divisor
    pub collision_query_factor: f64, // collision neighborhood = max radius * factor
    pub quadtree_capacity: usize, // points per leaf before subdividing
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            magnetic_constant: MAGNETIC_CONSTANT,
            neighborhood_divisor: NEIGHBORHOOD_DIVISOR,
            collision_query_factor: COLLISION_QUERY_FACTOR,
            quadtree_capacity: QUADTREE_CAPACITY,
        }
    }
}
