use neurofm::synth::chaos::{
    ChaosConfig, ChaosSource, SpikeConfig, SpikeInjector, LOGISTIC_K, MAX_SPIKE_BOOST,
};
use neurofm::synth::network::OperatorNetwork;
use neurofm::synth::noise::{NoiseBurst, BURST_SECONDS};
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[test]
fn test_chaos_steps_at_rate() {
    let mut chaos = ChaosSource::new(4.0, 1.0, 0.3, 0.0);
    assert_eq!(chaos.poll(0.1), 0.0);
    let first = chaos.poll(0.25);
    let expected_x = LOGISTIC_K * 0.3 * 0.7;
    assert!((chaos.state() - expected_x).abs() < 1e-12);
    assert!((first - ((expected_x - 0.5) * 2.0) as f32).abs() < 1e-6);
    // Held until the next interval has elapsed
    assert_eq!(chaos.poll(0.4), first);
    assert_ne!(chaos.poll(0.5), first);
}

#[test]
fn test_chaos_stays_bounded_by_amount() {
    let mut chaos = ChaosSource::new(60.0, 0.3, 0.77, 0.0);
    let mut t = 0.0;
    for _ in 0..5000 {
        t += 1.0 / 60.0;
        let value = chaos.poll(t);
        assert!(value.abs() <= 0.3 + 1e-6, "{value}");
        assert!(chaos.state() > 0.0 && chaos.state() < 1.0);
    }
}

#[test]
fn test_zero_rate_freezes() {
    let mut chaos = ChaosSource::new(0.0, 1.0, 0.4, 0.0);
    for t in [1.0, 10.0, 100.0] {
        assert_eq!(chaos.poll(t), 0.0);
    }
    assert_eq!(chaos.state(), 0.4);
}

#[test]
fn test_seed_is_folded_into_open_interval() {
    assert_eq!(ChaosSource::new(1.0, 1.0, 0.0, 0.0).state(), 0.5);
    assert_eq!(ChaosSource::new(1.0, 1.0, 1.5, 0.0).state(), 0.5);
    assert_eq!(ChaosSource::new(1.0, 1.0, f64::NAN, 0.0).state(), 0.5);

    let mut rng = SmallRng::seed_from_u64(1);
    for _ in 0..100 {
        let seeded = ChaosSource::with_rng(1.0, 1.0, &mut rng, 0.0);
        assert!((0.1..0.9).contains(&seeded.state()));
    }
}

#[test]
fn test_spikes_pick_existing_edges() {
    let mut network = OperatorNetwork::with_default_patch(4, 55.0);
    let injector = SpikeInjector::new(SpikeConfig {
        enabled: true,
        probability: 1.0,
        boost: 1.6,
    });
    let mut rng = SmallRng::seed_from_u64(99);
    for i in 0..50 {
        let idx = injector
            .poll(&mut network, &mut rng, i as f64 * 0.5)
            .expect("certain spike");
        assert!(idx < network.edges().len());
    }
}

#[test]
fn test_spikes_disabled_or_impossible() {
    let mut network = OperatorNetwork::with_default_patch(4, 55.0);
    let mut rng = SmallRng::seed_from_u64(5);
    let off = SpikeInjector::new(SpikeConfig {
        enabled: false,
        ..SpikeConfig::default()
    });
    let never = SpikeInjector::new(SpikeConfig {
        probability: 0.0,
        ..SpikeConfig::default()
    });
    for _ in 0..100 {
        assert!(off.poll(&mut network, &mut rng, 0.0).is_none());
        assert!(never.poll(&mut network, &mut rng, 0.0).is_none());
    }

    let mut empty = OperatorNetwork::new(4, 55.0);
    let always = SpikeInjector::new(SpikeConfig {
        probability: 1.0,
        ..SpikeConfig::default()
    });
    assert!(always.poll(&mut empty, &mut rng, 0.0).is_none());
}

#[test]
fn test_non_finite_spike_settings_never_fire() {
    let mut network = OperatorNetwork::with_default_patch(4, 55.0);
    let mut rng = SmallRng::seed_from_u64(3);
    let raw = SpikeInjector::new(SpikeConfig {
        enabled: true,
        probability: f32::NAN,
        boost: 1.6,
    });
    for _ in 0..100 {
        assert!(raw.poll(&mut network, &mut rng, 0.0).is_none());
    }

    let cleaned = SpikeConfig {
        enabled: true,
        probability: f32::NAN,
        boost: f32::INFINITY,
    }
    .sanitized();
    assert_eq!(cleaned.probability, SpikeConfig::default().probability);
    assert_eq!(cleaned.boost, SpikeConfig::default().boost);

    let loud = SpikeConfig {
        probability: 7.0,
        boost: 50.0,
        ..SpikeConfig::default()
    }
    .sanitized();
    assert_eq!(loud.probability, 1.0);
    assert_eq!(loud.boost, MAX_SPIKE_BOOST);
}

#[test]
fn test_chaos_settings_are_sanitized() {
    let config = ChaosConfig {
        rate: f32::NAN,
        amount: -2.0,
        ..ChaosConfig::default()
    }
    .sanitized();
    assert_eq!(config.rate, ChaosConfig::default().rate);
    assert_eq!(config.amount, 0.0);
}

#[test]
fn test_chaos_config_json_layout() {
    let config: ChaosConfig =
        serde_json::from_str(r#"{"rate": 8.0, "targetMod": true}"#).unwrap();
    assert_eq!(config.rate, 8.0);
    assert_eq!(config.amount, ChaosConfig::default().amount);
    assert!(config.target_mod);
    assert!(config.target_filter);

    let json = serde_json::to_string(&ChaosConfig::default()).unwrap();
    assert!(json.contains("\"targetFilter\":true"));
}

#[test]
fn test_noise_burst_decays_and_ends() {
    let mut burst = NoiseBurst::new();
    let mut rng = SmallRng::seed_from_u64(3);
    assert_eq!(burst.next(0.0, &mut rng), 0.0);

    burst.trigger(1.0, 0.2);
    assert!(burst.is_active());
    assert_eq!(burst.next(0.5, &mut rng), 0.0);
    for i in 0..100 {
        let t = 1.0 + i as f64 * 0.001;
        assert!(burst.next(t, &mut rng).abs() <= 0.2);
    }
    assert_eq!(burst.next(1.0 + BURST_SECONDS + 0.001, &mut rng), 0.0);
    assert!(!burst.is_active());
}
