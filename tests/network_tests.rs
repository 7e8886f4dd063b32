use neurofm::synth::context::ProcessContext;
use neurofm::synth::network::OperatorNetwork;

const SR: f32 = 48000.0;

/// Render `seconds` of audio starting at `start`, one 128-frame block at a time.
fn run(network: &mut OperatorNetwork, start: f64, seconds: f64) -> (Vec<f32>, f64) {
    let mut out = Vec::new();
    let mut now = start;
    let mut block = [0.0f32; 128];
    while now < start + seconds {
        network.process(&mut block, &ProcessContext::new(SR, now));
        out.extend_from_slice(&block);
        now += block.len() as f64 / SR as f64;
    }
    (out, now)
}

fn four_op_scenario() -> OperatorNetwork {
    let mut network = OperatorNetwork::new(4, 55.0);
    for (op, ratio) in [1.0, 1.5, 2.01, 0.5].into_iter().enumerate() {
        network.set_ratio(op, ratio, 0.0);
    }
    network.connect(2, 1, 180.0);
    network.connect(3, 2, 140.0);
    network.connect(1, 0, 190.0);
    network.set_output_level(0, 1.0, 0.0);
    network
}

#[test]
fn test_self_loop_is_rejected() {
    let mut network = OperatorNetwork::new(4, 55.0);
    network.connect(0, 0, 100.0);
    assert!(network.edges().is_empty());
}

#[test]
fn test_duplicate_connect_keeps_one_edge() {
    let mut network = OperatorNetwork::new(4, 55.0);
    network.connect(1, 0, 100.0);
    network.connect(1, 0, 300.0);
    assert_eq!(network.edges().len(), 1);
    assert_eq!(network.edge(1, 0).unwrap().nominal_depth(), 100.0);
}

#[test]
fn test_invalid_operators_and_negative_depth() {
    let mut network = OperatorNetwork::new(4, 55.0);
    network.connect(7, 0, 100.0);
    network.connect(0, 9, 100.0);
    assert!(network.edges().is_empty());

    network.connect(2, 3, -40.0);
    assert_eq!(network.edge(2, 3).unwrap().nominal_depth(), 0.0);
    network.set_mod_depth(2, 3, -5.0, 0.0);
    assert_eq!(network.edge(2, 3).unwrap().target_depth(), 0.0);
}

#[test]
fn test_remove_connection() {
    let mut network = four_op_scenario();
    network.remove_connection(3, 2);
    assert_eq!(network.edges().len(), 2);
    assert!(network.edge(3, 2).is_none());
    // Removing again is harmless
    network.remove_connection(3, 2);
    assert_eq!(network.edges().len(), 2);
}

#[test]
fn test_base_frequency_retune_scenario() {
    let mut network = four_op_scenario();
    let ratios = [1.0f32, 1.5, 2.01, 0.5];
    network.set_base_frequency(110.0, 0.0);

    for (op, ratio) in ratios.iter().enumerate() {
        let target = network.operator(op).unwrap().target_frequency();
        assert!((target - 110.0 * ratio).abs() < 1e-3, "op {op}: {target}");
    }

    run(&mut network, 0.0, 0.5);
    for (op, ratio) in ratios.iter().enumerate() {
        let live = network.operator(op).unwrap().frequency();
        assert!((live - 110.0 * ratio).abs() < 1e-3, "op {op} settled at {live}");
    }
}

#[test]
fn test_retune_glides_instead_of_jumping() {
    let mut network = OperatorNetwork::new(1, 100.0);
    network.set_base_frequency(200.0, 0.0);
    let mut block = [0.0f32; 1];
    network.process(&mut block, &ProcessContext::new(SR, 1.0 / SR as f64));
    let early = network.operator(0).unwrap().frequency();
    assert!(early > 100.0 && early < 110.0, "{early}");
}

#[test]
fn test_silent_without_gate() {
    let mut network = four_op_scenario();
    let (out, _) = run(&mut network, 0.0, 0.1);
    assert!(out.iter().all(|s| *s == 0.0));
}

#[test]
fn test_gated_network_renders_bounded_audio() {
    let mut network = four_op_scenario();
    network.gate_on(1.0, 0.0);
    assert!(network.is_active());
    let (out, now) = run(&mut network, 0.0, 0.3);
    assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 1.0 + 1e-4));
    assert!(out.iter().any(|s| s.abs() > 0.1));

    network.gate_off(now);
    assert!(!network.is_active());
    let (tail, _) = run(&mut network, now, 1.0);
    assert!(tail.iter().rev().take(1000).all(|s| *s == 0.0));
}

#[test]
fn test_feedback_cycle_is_well_defined() {
    let mut network = OperatorNetwork::new(2, 110.0);
    network.connect(0, 1, 200.0);
    network.connect(1, 0, 200.0);
    network.set_output_level(0, 1.0, 0.0);
    network.set_output_level(1, 1.0, 0.0);
    network.gate_on(1.0, 0.0);
    let (out, _) = run(&mut network, 0.0, 0.2);
    assert!(out.iter().all(|s| s.is_finite()));
}

#[test]
fn test_spike_returns_to_held_depth() {
    let mut network = four_op_scenario();
    let idx = network
        .edges()
        .iter()
        .position(|e| e.source() == 1 && e.dest() == 0)
        .unwrap();
    network.spike(idx, 2.0, 0.0);

    let (_, now) = run(&mut network, 0.0, 0.02);
    let peak = network.edges()[idx].live_depth();
    assert!(peak > 300.0, "spike peak {peak}");

    run(&mut network, now, 0.3);
    assert!((network.edges()[idx].live_depth() - 190.0).abs() < 1e-3);
}

#[test]
fn test_default_patch_layout() {
    let network = OperatorNetwork::with_default_patch(4, 55.0);
    assert_eq!(network.operator_count(), 4);
    assert_eq!(network.edges().len(), 3);
    assert_eq!(network.operator(0).unwrap().output_level(), 1.0);
    assert_eq!(network.operator(1).unwrap().output_level(), 0.0);
    assert!((network.operator(2).unwrap().target_frequency() - 55.0 * 2.01).abs() < 1e-3);
}

#[test]
fn test_carrier_phase_advances_by_modulated_frequency() {
    let mut network = OperatorNetwork::new(2, 100.0);
    network.connect(1, 0, 50.0);
    let sr = 44100.0f32;
    let mut sample = [0.0f32; 1];
    let mut increments = Vec::new();
    for i in 0..2000 {
        let t = i as f64 / sr as f64;
        let source_prev = network.operator(1).unwrap().output();
        let before = network.operator(0).unwrap().phase();
        network.process(&mut sample, &ProcessContext::new(sr, t));
        let after = network.operator(0).unwrap().phase();

        let increment = (after - before).rem_euclid(1.0);
        let expected = (100.0f32 + source_prev * 50.0) as f64 / sr as f64;
        assert!(
            (increment - expected).abs() < 1e-9,
            "sample {i}: {increment} vs {expected}"
        );
        increments.push(increment);
    }
    let min = increments.iter().cloned().fold(f64::MAX, f64::min);
    let max = increments.iter().cloned().fold(f64::MIN, f64::max);
    // 100 Hz +/- 50 Hz of deviation
    assert!(min < 60.0 / sr as f64 && max > 140.0 / sr as f64);
}

#[test]
fn test_output_is_sum_of_enveloped_sends() {
    let mut network = four_op_scenario();
    network.set_output_level(2, 0.5, 0.0);
    network.gate_on(1.0, 0.0);
    let mut sample = [0.0f32; 1];
    for i in 0..4800 {
        let t = i as f64 / SR as f64;
        network.process(&mut sample, &ProcessContext::new(SR, t));
        let expected: f32 = network
            .operators()
            .iter()
            .map(|op| op.output() * op.envelope.value() * op.live_output_level())
            .sum();
        assert!((sample[0] - expected).abs() < 1e-6, "sample {i}");
    }
}

#[test]
fn test_output_level_glides_over_fifty_ms() {
    let mut network = OperatorNetwork::new(2, 55.0);
    network.set_output_level(1, 1.0, 0.0);
    let (_, now) = run(&mut network, 0.0, 0.05);
    let level = network.operator(1).unwrap().live_output_level();
    assert!(level > 0.5 && level < 0.75, "{level} after 50 ms");
    assert_eq!(network.operator(1).unwrap().output_level(), 1.0);

    run(&mut network, now, 0.45);
    assert!(network.operator(1).unwrap().live_output_level() > 0.99);
}
