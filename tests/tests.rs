use magsim::simulation::collision::{resolve_collisions, resolve_elastic_collision};
use magsim::simulation::forces::accumulate_magnetic_forces;
use magsim::simulation::integrator::move_particle;
use magsim::simulation::params::PhysicsParams;
use magsim::{
    step, Circle, Environment, IndexedPoint, LinearIndex, NVec2, Particle, ParticleId, PhysicsConfig, QuadTree,
    RunConfig, Scenario, ScenarioConfig, SimError, SimulationConfig, SpatialIndex, SpeciesConfig, ViewportConfig,
};

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::PI;

/// Plain particle with the given kinematics
pub fn ball(id: u64, x: f64, y: f64, speed: f64, angle: f64, radius: f64) -> Particle {
    Particle::new(ParticleId(id), x, y, speed, angle, radius, 1.0)
}

/// Particle that both exerts and feels magnetic force
pub fn magnet(id: u64, x: f64, y: f64, radius: f64) -> Particle {
    ball(id, x, y, 0.0, 0.0, radius).with_magnetism(true, true, 1.0)
}

/// Environment with no species; `max_radius` sizes the collision query
pub fn environment(width: f64, height: f64, restitution: f64, max_radius: f64) -> Environment {
    let simulation = SimulationConfig {
        coefficient_of_restitution: restitution,
        species: Vec::new(),
    };
    let mut env = Environment::new(width, height, simulation, PhysicsParams::default());
    env.max_particle_radius = max_radius;
    env.set_delta_time(16.0);
    env
}

/// Mixed population: magnets, sensitive particles and inert heavy ones
pub fn mixed_config(seed: u64) -> ScenarioConfig {
    ScenarioConfig {
        viewport: ViewportConfig {
            width: 400.0,
            height: 300.0,
        },
        simulation: SimulationConfig {
            coefficient_of_restitution: 0.8,
            species: vec![
                SpeciesConfig {
                    speed: 1.0,
                    radius: 6.0,
                    color: "orange".into(),
                    number_of_particles: 25,
                    is_sensitive_to_magnetism: true,
                    is_magnetic: true,
                    magnetic_force: 1.0,
                    ..SpeciesConfig::default()
                },
                SpeciesConfig {
                    speed: 1.8,
                    radius: 4.0,
                    volumic_mass: 0.5,
                    number_of_particles: 40,
                    is_sensitive_to_magnetism: true,
                    ..SpeciesConfig::default()
                },
                SpeciesConfig {
                    speed: 0.5,
                    radius: 10.0,
                    volumic_mass: 3.0,
                    number_of_particles: 8,
                    ..SpeciesConfig::default()
                },
            ],
        },
        physics: PhysicsConfig::default(),
        run: RunConfig {
            seed: Some(seed),
            ..RunConfig::default()
        },
    }
}

fn sorted_indices(points: &[IndexedPoint]) -> Vec<usize> {
    let mut v: Vec<usize> = points.iter().map(|p| p.index).collect();
    v.sort_unstable();
    v
}

// ==================================================================================
// Magnetic force tests
// ==================================================================================

#[test]
fn magnetic_newton_third_law() {
    let env_particles = vec![magnet(1, 180.0, 200.0, 2.0), magnet(2, 205.0, 190.0, 2.0)];
    let mut env = environment(400.0, 400.0, 1.0, 2.0);
    env.rebuild_index(&env_particles);

    let mut forces = vec![NVec2::zeros(); 2];
    let interactions = accumulate_magnetic_forces(&env, &env_particles, &mut forces);

    assert_eq!(interactions, 2);
    let net = forces[0] + forces[1];
    assert!(net.norm() < 1e-15, "Net force not zero: {:?}", net);
}

#[test]
fn magnetic_force_points_toward_source() {
    let particles = vec![magnet(1, 100.0, 100.0, 2.0), magnet(2, 120.0, 100.0, 2.0)];
    let mut env = environment(400.0, 400.0, 1.0, 2.0);
    env.rebuild_index(&particles);

    let mut forces = vec![NVec2::zeros(); 2];
    accumulate_magnetic_forces(&env, &particles, &mut forces);

    let dx = particles[1].position() - particles[0].position();
    assert!(forces[0].dot(&dx) > 0.0, "Force is not toward the source");
}

#[test]
fn magnetic_inverse_square_law() {
    let near = vec![magnet(1, 100.0, 100.0, 1.0), magnet(2, 110.0, 100.0, 1.0)];
    let far = vec![magnet(1, 100.0, 100.0, 1.0), magnet(2, 120.0, 100.0, 1.0)];
    let mut env = environment(400.0, 400.0, 1.0, 1.0);

    let mut f_near = vec![NVec2::zeros(); 2];
    let mut f_far = vec![NVec2::zeros(); 2];
    env.rebuild_index(&near);
    accumulate_magnetic_forces(&env, &near, &mut f_near);
    env.rebuild_index(&far);
    accumulate_magnetic_forces(&env, &far, &mut f_far);

    let ratio = f_near[0].norm() / f_far[0].norm();
    assert!((ratio - 4.0).abs() < 1e-9, "Expected 4x, got {}", ratio);
}

#[test]
fn magnetic_force_limited_to_neighborhood() {
    // query radius is height / 8 = 50
    let particles = vec![magnet(1, 100.0, 200.0, 2.0), magnet(2, 160.0, 200.0, 2.0)];
    let mut env = environment(400.0, 400.0, 1.0, 2.0);
    env.rebuild_index(&particles);

    let mut forces = vec![NVec2::zeros(); 2];
    assert_eq!(accumulate_magnetic_forces(&env, &particles, &mut forces), 0);
    assert_eq!(forces[0], NVec2::zeros());
}

#[test]
fn insensitive_particle_feels_nothing() {
    let particles = vec![
        ball(1, 100.0, 100.0, 0.0, 0.0, 2.0).with_magnetism(false, true, 1.0),
        magnet(2, 110.0, 100.0, 2.0),
    ];
    let mut env = environment(400.0, 400.0, 1.0, 2.0);
    env.rebuild_index(&particles);

    let mut forces = vec![NVec2::zeros(); 2];
    accumulate_magnetic_forces(&env, &particles, &mut forces);
    assert_eq!(forces[0], NVec2::zeros());
    assert!(forces[1].x < 0.0);
}

#[test]
fn coincident_magnets_stay_finite() {
    let mut particles = vec![magnet(1, 100.0, 100.0, 2.0), magnet(2, 100.0, 100.0, 2.0)];
    let mut env = environment(400.0, 400.0, 1.0, 2.0);
    for _ in 0..5 {
        step(&mut env, &mut particles);
    }
    for p in &particles {
        assert!(p.x.is_finite() && p.y.is_finite() && p.speed.is_finite() && p.angle.is_finite());
    }
}

// ==================================================================================
// Collision tests
// ==================================================================================

#[test]
fn restitution_one_head_on_reverses_directions() {
    let mut a = ball(1, 50.0, 50.0, 1.0, 0.0, 10.0);
    let mut b = ball(2, 69.0, 50.0, 1.0, PI, 10.0);

    assert!(resolve_elastic_collision(&mut a, &mut b, 1.0, 2.0));
    assert!((a.speed - 1.0).abs() < 1e-12);
    assert!((b.speed - 1.0).abs() < 1e-12);
    assert!((a.velocity().x + 1.0).abs() < 1e-12);
    assert!((b.velocity().x - 1.0).abs() < 1e-12);
}

#[test]
fn restitution_zero_equalizes_normal_velocity() {
    let mut a = ball(1, 50.0, 50.0, 1.5, 0.2, 10.0);
    let mut b = ball(2, 66.0, 58.0, 0.4, 3.5, 8.0);
    let normal = (b.position() - a.position()).normalize();

    assert!(resolve_elastic_collision(&mut a, &mut b, 0.0, 2.0));
    let va = a.velocity().dot(&normal);
    let vb = b.velocity().dot(&normal);
    assert!((va - vb).abs() < 1e-12, "normal components differ: {} vs {}", va, vb);
}

#[test]
fn collision_pass_independent_of_iteration_order() {
    let pairs = vec![
        ball(1, 50.0, 50.0, 0.8, 0.0, 10.0),
        ball(2, 69.0, 50.0, 0.6, PI, 10.0),
        ball(3, 150.0, 150.0, 0.5, PI / 2.0, 10.0),
        ball(4, 150.0, 169.0, 0.7, -PI / 2.0, 10.0),
    ];
    let mut forward = pairs.clone();
    let mut reversed: Vec<Particle> = pairs.iter().rev().cloned().collect();

    let mut env = environment(200.0, 200.0, 1.0, 10.0);
    env.rebuild_index(&forward);
    assert_eq!(resolve_collisions(&env, &mut forward), 2);
    env.rebuild_index(&reversed);
    assert_eq!(resolve_collisions(&env, &mut reversed), 2);

    let total = |ps: &[Particle]| ps.iter().fold(NVec2::zeros(), |acc, p| acc + p.momentum());
    assert!((total(&forward) - total(&pairs)).norm() < 1e-9);
    assert!((total(&forward) - total(&reversed)).norm() < 1e-9);

    for p in &forward {
        let q = reversed.iter().find(|q| q.id == p.id).unwrap();
        assert!((p.velocity() - q.velocity()).norm() < 1e-12);
    }
}

#[test]
fn each_contact_resolved_once_per_pass() {
    let mut particles = vec![ball(1, 50.0, 50.0, 1.0, 0.0, 10.0), ball(2, 69.0, 50.0, 1.0, PI, 10.0)];
    let mut env = environment(200.0, 200.0, 1.0, 10.0);
    env.rebuild_index(&particles);

    assert_eq!(resolve_collisions(&env, &mut particles), 1);

    // a second pass sees separating bodies and leaves them alone
    env.rebuild_index(&particles);
    assert_eq!(resolve_collisions(&env, &mut particles), 0);
    assert!(particles[0].velocity().x < 0.0);
}

// ==================================================================================
// Boundary tests
// ==================================================================================

#[test]
fn particle_at_boundary_is_pulled_inward() {
    let mut p = ball(1, 190.0, 100.0, 1.0, 0.0, 10.0);
    move_particle(&mut p, 200.0, 200.0);
    assert_eq!(p.x, 190.0);
    assert!(p.velocity().x < 0.0);

    let mut q = ball(2, 10.0, 10.0, 1.5, 5.0 * PI / 4.0, 10.0);
    move_particle(&mut q, 200.0, 200.0);
    assert_eq!((q.x, q.y), (10.0, 10.0));
    assert!(q.velocity().x > 0.0 && q.velocity().y > 0.0);
}

#[test]
fn positions_and_speeds_stay_bounded() {
    let mut scenario = Scenario::build_scenario(mixed_config(11)).unwrap();
    let (w, h) = (scenario.environment.width, scenario.environment.height);

    for _ in 0..200 {
        scenario.tick(16.0);
        for p in scenario.particles() {
            assert!(p.x >= p.radius && p.x <= w - p.radius, "x out of bounds: {:?}", p);
            assert!(p.y >= p.radius && p.y <= h - p.radius, "y out of bounds: {:?}", p);
            assert!(p.speed >= 0.0 && p.speed <= 2.0, "speed out of range: {}", p.speed);
        }
    }
}

// ==================================================================================
// Spatial index tests
// ==================================================================================

#[test]
fn quadtree_matches_linear_scan() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let points: Vec<IndexedPoint> = (0..500)
        .map(|i| IndexedPoint::new(rng.gen_range(0.0..400.0), rng.gen_range(0.0..300.0), i))
        .collect();

    let mut tree = QuadTree::new(400.0, 300.0, 4);
    let mut linear = LinearIndex::new();
    tree.insert(&points);
    linear.insert(&points);
    assert_eq!(tree.len(), linear.len());

    for _ in 0..50 {
        let region = Circle::new(rng.gen_range(0.0..400.0), rng.gen_range(0.0..300.0), rng.gen_range(1.0..80.0));
        let mut a = Vec::new();
        let mut b = Vec::new();
        tree.query(&region, &mut a);
        linear.query(&region, &mut b);
        assert_eq!(sorted_indices(&a), sorted_indices(&b));
    }
}

#[test]
fn query_is_insertion_order_independent() {
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let mut points: Vec<IndexedPoint> = (0..200)
        .map(|i| IndexedPoint::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), i))
        .collect();
    // duplicate coordinates
    points.push(IndexedPoint::new(50.0, 50.0, 200));
    points.push(IndexedPoint::new(50.0, 50.0, 201));
    points.push(IndexedPoint::new(50.0, 50.0, 202));

    let region = Circle::new(50.0, 50.0, 20.0);
    let mut tree = QuadTree::new(100.0, 100.0, 2);
    tree.insert(&points);
    let mut expected = Vec::new();
    tree.query(&region, &mut expected);
    let expected = sorted_indices(&expected);
    assert!(expected.contains(&200) && expected.contains(&201) && expected.contains(&202));

    for _ in 0..5 {
        points.shuffle(&mut rng);
        tree.clear();
        tree.insert(&points);
        let mut found = Vec::new();
        tree.query(&region, &mut found);
        assert_eq!(sorted_indices(&found), expected);
    }
}

#[test]
fn forces_are_index_independent() {
    let scenario = Scenario::build_scenario(mixed_config(21)).unwrap();
    let particles = scenario.particles();

    let mut tree_env = environment(400.0, 300.0, 0.8, 10.0);
    let mut linear_env = environment(400.0, 300.0, 0.8, 10.0).with_index(LinearIndex::new());
    tree_env.rebuild_index(particles);
    linear_env.rebuild_index(particles);

    let mut f_tree = vec![NVec2::zeros(); particles.len()];
    let mut f_linear = vec![NVec2::zeros(); particles.len()];
    let n_tree = accumulate_magnetic_forces(&tree_env, particles, &mut f_tree);
    let n_linear = accumulate_magnetic_forces(&linear_env, particles, &mut f_linear);

    assert_eq!(n_tree, n_linear);
    for (a, b) in f_tree.iter().zip(&f_linear) {
        assert!((a - b).norm() <= 1e-9 * a.norm() + 1e-15);
    }
}

// ==================================================================================
// Determinism tests
// ==================================================================================

#[test]
fn same_seed_gives_identical_trajectories() {
    let mut a = Scenario::build_scenario(mixed_config(42)).unwrap();
    let mut b = Scenario::build_scenario(mixed_config(42)).unwrap();

    for _ in 0..100 {
        a.tick(16.0);
        b.tick(16.0);
    }
    for (p, q) in a.particles().iter().zip(b.particles()) {
        assert_eq!(p.id, q.id);
        assert_eq!(p.x.to_bits(), q.x.to_bits());
        assert_eq!(p.y.to_bits(), q.y.to_bits());
        assert_eq!(p.speed.to_bits(), q.speed.to_bits());
        assert_eq!(p.angle.to_bits(), q.angle.to_bits());
    }
}

#[test]
fn different_seeds_place_differently() {
    let a = Scenario::build_scenario(mixed_config(1)).unwrap();
    let b = Scenario::build_scenario(mixed_config(2)).unwrap();
    assert!(a.particles().iter().zip(b.particles()).any(|(p, q)| p.x != q.x));
}

// ==================================================================================
// End-to-end tests
// ==================================================================================

const HEAD_ON_YAML: &str = r#"
viewport:
  width: 200.0
  height: 200.0
simulation:
  coefficient_of_restitution: 1.0
  species:
    - speed: 1.0
      volumic_mass: 1.0
      radius: 10.0
      number_of_particles: 2
      is_magnetic: false
run:
  seed: 3
"#;

#[test]
fn head_on_pair_swaps_velocities() {
    let config = ScenarioConfig::from_yaml_str(HEAD_ON_YAML).unwrap();
    let mut scenario = Scenario::build_scenario(config).unwrap();
    assert_eq!(scenario.particles().len(), 2);

    // one unit apart on each side of contact, approaching along x
    {
        let particles = &mut scenario.particles;
        particles[0].x = 89.0;
        particles[0].y = 100.0;
        particles[0].angle = 0.0;
        particles[0].speed = 1.0;
        particles[1].x = 111.0;
        particles[1].y = 100.0;
        particles[1].angle = PI;
        particles[1].speed = 1.0;
    }

    let report = scenario.tick(16.0);
    assert_eq!(report.collisions, 1);

    let v0 = scenario.particles()[0].velocity();
    let v1 = scenario.particles()[1].velocity();
    assert!((v0.x + 1.0).abs() < 1e-9, "v0 = {:?}", v0);
    assert!((v1.x - 1.0).abs() < 1e-9, "v1 = {:?}", v1);
    assert!((scenario.particles()[0].speed - 1.0).abs() < 1e-9);
}

#[test]
fn empty_species_list_ticks_as_no_op() {
    let mut scenario = Scenario::build_scenario(mixed_config(4)).unwrap();
    scenario
        .reconfigure(&SimulationConfig {
            coefficient_of_restitution: 1.0,
            species: Vec::new(),
        })
        .unwrap();

    assert!(scenario.particles().is_empty());
    assert_eq!(scenario.tick(16.0).collisions, 0);
    assert_eq!(scenario.stats().particles, 0);
    assert_eq!(scenario.stats().mean_speed, 0.0);
}

#[test]
fn invalid_configuration_is_rejected() {
    let mut config = mixed_config(5);
    config.simulation.species[1].radius = -1.0;
    assert!(matches!(Scenario::build_scenario(config), Err(SimError::Config(_))));

    let mut config = mixed_config(5);
    config.simulation.coefficient_of_restitution = 1.5;
    assert!(Scenario::build_scenario(config).is_err());

    // a failed reconfigure keeps the running population
    let mut scenario = Scenario::build_scenario(mixed_config(5)).unwrap();
    let before = scenario.particles().len();
    let bad = SimulationConfig {
        coefficient_of_restitution: -0.5,
        species: Vec::new(),
    };
    assert!(scenario.reconfigure(&bad).is_err());
    assert_eq!(scenario.particles().len(), before);
}

#[test]
fn rebuild_keeps_ids_increasing() {
    let mut scenario = Scenario::build_scenario(mixed_config(8)).unwrap();
    let first_max = scenario.particles().iter().map(|p| p.id).max().unwrap();

    scenario.resize(600.0, 500.0).unwrap();
    assert_eq!(scenario.environment.width, 600.0);
    assert!(scenario.particles().iter().all(|p| p.id > first_max));
    for p in scenario.particles() {
        assert!(p.x >= p.radius && p.x <= 600.0 - p.radius);
        assert!(p.y >= p.radius && p.y <= 500.0 - p.radius);
    }

    assert!(scenario.resize(0.0, 100.0).is_err());
}

#[test]
fn timestamp_driven_ticks() {
    let mut scenario = Scenario::build_scenario(mixed_config(9)).unwrap();
    scenario.tick_at(1000.0);
    assert_eq!(scenario.environment.delta_time, 0.0);
    scenario.tick_at(1016.5);
    assert!((scenario.environment.delta_time - 16.5).abs() < 1e-12);
}

#[test]
fn held_particle_follows_pointer() {
    let mut scenario = Scenario::build_scenario(mixed_config(10)).unwrap();
    let (x, y) = (scenario.particles()[0].x, scenario.particles()[0].y);

    let id = scenario.grab(x, y).unwrap();
    scenario.drag_to(x + 1.0, y).unwrap();
    scenario.tick(16.0);

    let held = scenario.particles().iter().find(|p| p.id == id).unwrap();
    assert!(held.held);
    assert_eq!(held.y, y);

    scenario.release();
    assert!(scenario.particles().iter().all(|p| !p.held));
}

#[test]
fn render_view_mirrors_particles() {
    let scenario = Scenario::build_scenario(mixed_config(12)).unwrap();
    let views: Vec<_> = scenario.render_view().collect();
    assert_eq!(views.len(), scenario.particles().len());
    assert_eq!(views[0].color, "orange");
    assert_eq!(views[0].radius, scenario.particles()[0].radius);

    let energy: f64 = scenario.particles().iter().map(|p| 0.5 * p.mass * p.speed * p.speed).sum();
    assert!((scenario.stats().kinetic_energy - energy).abs() < 1e-9);
}
