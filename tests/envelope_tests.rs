use neurofm::synth::envelope::{EnvelopeGenerator, EnvelopeParams, EnvelopePhase};

const SR: f64 = 48000.0;

/// Tick from `from` to `to` at audio rate, collecting every value.
fn render(env: &mut EnvelopeGenerator, from: f64, to: f64) -> Vec<f32> {
    let mut out = Vec::new();
    let mut i = 0u64;
    loop {
        let t = from + i as f64 / SR;
        if t > to {
            break;
        }
        out.push(env.tick(t));
        i += 1;
    }
    out
}

#[test]
fn test_immediate_release_never_jumps() {
    let mut env = EnvelopeGenerator::new();
    env.gate_on(1.0, 0.0);
    env.gate_off(0.0);
    let at_gate_off = env.value();
    for value in render(&mut env, 0.0, 0.5) {
        assert!(value <= at_gate_off + 1e-6, "{value} > {at_gate_off}");
    }
    assert_eq!(env.value(), 0.0);
}

#[test]
fn test_release_mid_attack_starts_from_live_value() {
    let mut env = EnvelopeGenerator::new();
    env.gate_on(1.0, 0.0);
    render(&mut env, 0.0, 0.005);
    let live = env.value();
    assert!(live > 0.3 && live < 0.7, "live value {live}");

    env.gate_off(0.005);
    let release = render(&mut env, 0.005, 0.5);
    assert!((release[0] - live).abs() < 1e-6);
    for pair in release.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-6, "release rose: {:?}", pair);
    }
    assert_eq!(*release.last().unwrap(), 0.0);
}

#[test]
fn test_retrigger_continues_from_current_value() {
    let mut env = EnvelopeGenerator::new();
    env.gate_on(1.0, 0.0);
    render(&mut env, 0.0, 0.004);
    let before = env.value();
    assert!(before > 0.0);

    env.gate_on(1.0, 0.004);
    let first = env.tick(0.004);
    assert!(first > 0.0, "retrigger restarted from silence");
    assert!(first <= env.peak());
    assert!((first - before).abs() < 1e-6);
}

#[test]
fn test_retrigger_after_silence_starts_at_zero() {
    let mut env = EnvelopeGenerator::new();
    env.gate_on(1.0, 0.0);
    render(&mut env, 0.0, 0.1);
    env.gate_off(0.1);
    render(&mut env, 0.1, 1.0);
    assert_eq!(env.value(), 0.0);

    env.gate_on(0.8, 1.0);
    assert_eq!(env.tick(1.0), 0.0);
}

#[test]
fn test_stages_and_sustain_level() {
    let mut env = EnvelopeGenerator::with_params(EnvelopeParams {
        a: 0.01,
        d: 0.1,
        s: 0.5,
        r: 0.2,
        level: 1.0,
        mod_scale: 1.0,
    });
    env.gate_on(0.8, 0.0);
    assert!(env.is_active());
    assert_eq!(env.phase(0.005), EnvelopePhase::Attack);
    assert_eq!(env.phase(0.05), EnvelopePhase::Decay);
    assert_eq!(env.phase(0.3), EnvelopePhase::Sustain);

    let values = render(&mut env, 0.0, 0.3);
    let max = values.iter().cloned().fold(0.0f32, f32::max);
    assert!((max - 0.8).abs() < 1e-3, "peak {max}");
    assert!((env.value() - 0.4).abs() < 1e-6, "sustain {}", env.value());

    env.gate_off(0.3);
    assert!(!env.is_active());
    assert_eq!(env.phase(0.4), EnvelopePhase::Release);
    assert_eq!(env.phase(0.6), EnvelopePhase::Idle);
}

#[test]
fn test_gate_off_while_idle_is_noop() {
    let mut env = EnvelopeGenerator::new();
    env.gate_off(0.0);
    assert_eq!(env.phase(0.0), EnvelopePhase::Idle);
    assert_eq!(env.tick(0.1), 0.0);
}

#[test]
fn test_zero_stage_times_are_clamped() {
    let params = EnvelopeParams {
        a: 0.0,
        d: -1.0,
        s: 2.0,
        r: f32::NAN,
        level: 1.0,
        mod_scale: 1.0,
    }
    .sanitized();
    assert_eq!(params.a, 0.0);
    assert_eq!(params.d, 0.0);
    assert_eq!(params.s, 1.0);
    assert_eq!(params.r, EnvelopeParams::default().r);

    let mut env = EnvelopeGenerator::with_params(params);
    env.gate_on(1.0, 0.0);
    // Attack still takes the minimum stage time instead of stepping.
    let half = env.tick(0.0005);
    assert!(half > 0.0 && half < 1.0, "{half}");
}
