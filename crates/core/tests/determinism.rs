//! Reproducibility of seeded runs
//!
//! Same configuration and seed must give the same run, down to every grid
//! snapshot, whether instances run alone, sequentially or on the rayon pool.

use forest_fire_core::{
    Ensemble, Forest, ForestConfig, LakeConfig, Neighborhood, StepOrder, Topology, WindConfig,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn busy_config() -> ForestConfig {
    let mut config = ForestConfig::new(24, 7, 0.8)
        .with_timesteps(1500)
        .with_lakes(LakeConfig::new(0.15))
        .with_wind(WindConfig::new(-3.0, 1.5));
    config.neighborhood = Neighborhood::Moore;
    config.diagonal_spread_probability = Some(0.4);
    config
}

#[test]
fn test_same_seed_same_run() {
    let mut a = Forest::with_seed(busy_config(), 314).unwrap();
    let mut b = Forest::with_seed(busy_config(), 314).unwrap();

    while !a.is_finished() {
        let outcome_a = a.step();
        let outcome_b = b.step();
        assert_eq!(outcome_a, outcome_b);
        if a.timestep() % 100 == 0 {
            assert_eq!(a.snapshot(), b.snapshot());
        }
    }

    assert_eq!(a.report(), b.report());
    assert_eq!(a.fire_records(), b.fire_records());
}

#[test]
fn test_config_seed_used_by_new() {
    let config = busy_config().with_timesteps(300).with_seed(55);
    let mut a = Forest::new(config.clone()).unwrap();
    let mut b = Forest::with_seed(config, 55).unwrap();
    a.run();
    b.run();

    assert_eq!(a.seed(), 55);
    assert_eq!(a.report(), b.report());
}

#[test]
fn test_variants_are_reproducible() {
    let mut bounded = ForestConfig::new(16, 4, 0.9).with_timesteps(600);
    bounded.topology = Topology::Bounded;
    bounded.step_order = StepOrder::PlantingFirst;
    bounded.burn_duration = 3;

    let frozen = ForestConfig::new(16, 4, 0.9)
        .with_timesteps(600)
        .with_freeze_time_during_fire(true);

    for config in [bounded, frozen] {
        let mut a = Forest::with_seed(config.clone(), 9).unwrap();
        let mut b = Forest::with_seed(config, 9).unwrap();
        a.run();
        b.run();
        assert_eq!(a.report(), b.report());
        assert_eq!(a.snapshot(), b.snapshot());
    }
}

#[test]
fn test_ensemble_is_reproducible() {
    let config = busy_config()
        .with_timesteps(400)
        .with_instances(6)
        .with_seed(77);

    let first = Ensemble::new(config.clone()).unwrap().run().unwrap();
    let second = Ensemble::new(config.clone()).unwrap().run().unwrap();
    let sequential = Ensemble::new(config).unwrap().run_sequential().unwrap();

    assert_eq!(first, second);
    assert_eq!(first, sequential);
    assert_eq!(first.instances(), 6);

    // Instances draw from independent streams
    let series = first.tree_counts();
    assert!(series.windows(2).any(|pair| pair[0] != pair[1]));
}

#[test]
fn test_ensemble_report_survives_json() {
    let config = ForestConfig::new(12, 5, 0.6)
        .with_timesteps(150)
        .with_instances(2)
        .with_seed(3);
    let report = Ensemble::new(config).unwrap().run().unwrap();

    let json = report.to_json_string().unwrap();
    let back: forest_fire_core::EnsembleReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, report);
}
