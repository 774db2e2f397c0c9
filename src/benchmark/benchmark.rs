use std::time::Instant;
use crate::configuration::config::{SimulationConfig, SpeciesConfig};
use crate::simulation::environment::Environment;
use crate::simulation::params::PhysicsParams;
use crate::simulation::quadtree::QuadTree;
use crate::simulation::spatial::{Circle, IndexedPoint, LinearIndex, SpatialIndex};
use crate::simulation::states::{Particle, ParticleId};
use crate::simulation::step::step;

const WIDTH: f64 = 1600.0;
const HEIGHT: f64 = 1200.0;
const RADIUS: f64 = 3.0;

/// Helper to build `n` particles spread over the benchmark viewport
fn make_particles(n: usize) -> Vec<Particle> {
    let mut particles = Vec::with_capacity(n);

    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let x = WIDTH / 2.0 + (i_f * 0.37).sin() * (WIDTH / 2.0 - RADIUS);
        let y = HEIGHT / 2.0 + (i_f * 0.13).cos() * (HEIGHT / 2.0 - RADIUS);
        let angle = i_f * 0.07;

        particles.push(
            Particle::new(ParticleId(i as u64 + 1), x, y, 1.0, angle, RADIUS, 1.0)
                .with_magnetism(true, i % 4 == 0, 1.0),
        );
    }

    particles
}

/// Helper to build an environment sized for the benchmark population
fn make_environment() -> Environment {
    let simulation = SimulationConfig {
        coefficient_of_restitution: 0.9,
        species: vec![SpeciesConfig {
            radius: RADIUS,
            ..SpeciesConfig::default()
        }],
    };
    let mut env = Environment::new(WIDTH, HEIGHT, simulation, PhysicsParams::default());
    env.set_delta_time(16.0);
    env
}

/// Time one magnetic-sized neighborhood query per point, quadtree vs linear scan
pub fn bench_neighbor_queries() {
    // Different population sizes to test
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let radius = HEIGHT / PhysicsParams::default().neighborhood_divisor;

    for n in ns {
        let points: Vec<IndexedPoint> = make_particles(n)
            .iter()
            .enumerate()
            .map(|(i, p)| IndexedPoint::from_particle(i, p))
            .collect();

        let mut tree = QuadTree::new(WIDTH, HEIGHT, PhysicsParams::default().quadtree_capacity);
        let mut linear = LinearIndex::new();
        let mut out = Vec::new();

        // Time quadtree build + queries
        let t0 = Instant::now();
        tree.clear();
        tree.insert(&points);
        let mut found_tree = 0;
        for p in &points {
            out.clear();
            tree.query(&Circle::new(p.position.x, p.position.y, radius), &mut out);
            found_tree += out.len();
        }
        let dt_tree = t0.elapsed().as_secs_f64();

        // Time linear build + queries
        let t1 = Instant::now();
        linear.clear();
        linear.insert(&points);
        let mut found_linear = 0;
        for p in &points {
            out.clear();
            linear.query(&Circle::new(p.position.x, p.position.y, radius), &mut out);
            found_linear += out.len();
        }
        let dt_linear = t1.elapsed().as_secs_f64();

        debug_assert_eq!(found_tree, found_linear);
        println!(
            "N = {n:5}, quadtree = {:8.6} s, linear = {:8.6} s, depth = {}",
            dt_tree,
            dt_linear,
            tree.depth()
        );
    }
}

pub fn bench_step() {
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let steps = 5; // ticks per index kind

    for n in ns {
        let template = make_particles(n);

        // Quadtree-backed tick
        let mut env_tree = make_environment();
        let mut particles_tree = template.clone();

        // Warm-up
        step(&mut env_tree, &mut particles_tree);

        let t0 = Instant::now();
        for _ in 0..steps {
            step(&mut env_tree, &mut particles_tree);
        }
        let tree_per_step = t0.elapsed().as_secs_f64() / steps as f64;

        // Linear-scan tick
        let mut env_linear = make_environment().with_index(LinearIndex::new());
        let mut particles_linear = template.clone();

        step(&mut env_linear, &mut particles_linear);

        let t1 = Instant::now();
        for _ in 0..steps {
            step(&mut env_linear, &mut particles_linear);
        }
        let linear_per_step = t1.elapsed().as_secs_f64() / steps as f64;

        println!("N = {:5}, quadtree step = {:8.6} s,   linear step = {:8.6} s", n, tree_per_step, linear_per_step);
    }
}

/// Per-tick cost for a range of n, printed as CSV
pub fn bench_step_curve() {
    println!("N,quadtree_ms,linear_ms");

    for n in (200..=6400).step_by(200) {
        // Linear scan is quadratic; keep large n to a single tick
        let steps_tree = if n <= 2000 { 5 } else { 2 };
        let steps_linear = if n <= 800 { 5 } else { 1 };

        let template = make_particles(n);

        let mut env_tree = make_environment();
        let mut particles_tree = template.clone();
        let t0 = Instant::now();
        for _ in 0..steps_tree {
            step(&mut env_tree, &mut particles_tree);
        }
        let ms_tree = t0.elapsed().as_secs_f64() * 1000.0 / steps_tree as f64;

        let mut env_linear = make_environment().with_index(LinearIndex::new());
        let mut particles_linear = template.clone();
        let t1 = Instant::now();
        for _ in 0..steps_linear {
            step(&mut env_linear, &mut particles_linear);
        }
        let ms_linear = t1.elapsed().as_secs_f64() * 1000.0 / steps_linear as f64;

        println!("{},{:.6},{:.6}", n, ms_tree, ms_linear);
    }
}
