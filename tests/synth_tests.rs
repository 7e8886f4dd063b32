use neurofm::synth::chaos::{ChaosConfig, SpikeConfig};
use neurofm::synth::command::SynthCommand;
use neurofm::synth::config::{SynthConfig, VelocityMode};
use neurofm::synth::core::NORMALIZED_MAX_DEPTH;
use neurofm::synth::envelope::EnvelopeParams;
use neurofm::synth::preset::{builtin_preset, EdgeSetting, FmSettings, Param, Preset};
use neurofm::synth::randomize::RandomizeMode;
use neurofm::synth::scale::Scale;
use neurofm::synth::sequencer::{SequencerStep, STEP_COUNT};
use neurofm::synth::Synth;

/// Render `seconds` of audio in 512-frame buffers.
fn render(synth: &mut Synth, seconds: f64) -> Vec<f32> {
    let mut out = Vec::new();
    let mut buffer = [0.0f32; 512];
    let frames = (seconds * synth.sample_rate() as f64) as usize;
    while out.len() < frames {
        synth.render_block(&mut buffer);
        out.extend_from_slice(&buffer);
    }
    out
}

fn quiet_synth() -> Synth {
    let mut synth = Synth::new();
    synth.set_spikes(SpikeConfig {
        enabled: false,
        ..SpikeConfig::default()
    });
    synth
}

#[test]
fn test_render_is_finite_and_limited() {
    let mut synth = Synth::new();
    synth.note_on(36, 1.0);
    let out = render(&mut synth, 0.5);
    assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 0.91));
    assert!(out.iter().any(|s| s.abs() > 0.01), "note produced no sound");
}

#[test]
fn test_clock_advances_with_rendered_frames() {
    let mut synth = Synth::new();
    let mut buffer = vec![0.0f32; 441];
    synth.render_block(&mut buffer);
    assert!((synth.time() - 0.01).abs() < 1e-9);
}

#[test]
fn test_release_only_matches_current_note() {
    let mut synth = quiet_synth();
    synth.note_on(60, 0.8);
    synth.note_on(62, 0.8);
    assert_eq!(synth.current_note(), Some(62));

    synth.release_note(60);
    assert!(synth.is_gate_on(), "stale release cut the new note");
    synth.release_note(62);
    assert!(!synth.is_gate_on());
}

#[test]
fn test_note_follows_tuning() {
    let mut synth = quiet_synth();
    synth.note_on(69, 1.0);
    assert!((synth.network().base_frequency() - 440.0).abs() < 1e-3);

    assert!(synth.load_builtin_scale("Pythagorean Pentatonic"));
    synth.set_root(60);
    synth.note_on(65, 1.0);
    let root = 440.0 * 2f32.powf(-9.0 / 12.0);
    assert!((synth.network().base_frequency() - root * 2.0).abs() < 1e-2);

    assert!(!synth.load_builtin_scale("No Such Scale"));
    synth.reset_tuning();
    assert_eq!(synth.tuning().scale().steps(), 12);
}

#[test]
fn test_pitch_bend_scales_current_note() {
    let mut synth = quiet_synth();
    synth.note_on(69, 1.0);
    synth.set_pitch_bend(2.0);
    assert!((synth.network().base_frequency() - 880.0).abs() < 1e-2);
    synth.set_pitch_bend(-1.0);
    assert_eq!(synth.pitch_bend(), 2.0);
}

#[test]
fn test_velocity_modes() {
    let mut synth = quiet_synth();
    synth.set_velocity_mode(VelocityMode::Fixed);
    synth.note_on_auto(40);
    let velocity = synth.network().operator(0).unwrap().envelope.velocity();
    assert!((velocity - 100.0 / 127.0).abs() < 1e-6);

    synth.set_velocity_mode(VelocityMode::Accent);
    synth.note_on_auto(40);
    let first = synth.network().operator(0).unwrap().envelope.velocity();
    synth.note_on_auto(40);
    let second = synth.network().operator(0).unwrap().envelope.velocity();
    assert_eq!((first, second), (1.0, 0.55));

    synth.set_velocity_mode(VelocityMode::Random);
    for _ in 0..50 {
        synth.note_on_auto(40);
        let v = synth.network().operator(0).unwrap().envelope.velocity();
        assert!((60.0 / 127.0..=1.0).contains(&v), "{v}");
    }
}

#[test]
fn test_preset_round_trip_through_engine() {
    let preset = builtin_preset("Laser Shred (Chaotic)").unwrap();
    let mut synth = quiet_synth();
    synth.apply_preset(&preset);
    render(&mut synth, 0.05);
    let collected = synth.collect_preset(&preset.name);
    assert_eq!(collected, preset);
}

#[test]
fn test_preset_routing_is_diffed() {
    let mut synth = quiet_synth();
    assert_eq!(synth.network().edges().len(), 3);
    let preset = Preset {
        name: "Two Op".to_string(),
        version: 2,
        fm: Some(FmSettings {
            ratios: vec![1.0, 3.0],
            mod_depths: vec![
                EdgeSetting { s: 1, d: 0, depth: 75.0 },
                EdgeSetting { s: 0, d: 3, depth: 20.0 },
                EdgeSetting { s: 2, d: 2, depth: 50.0 },
            ],
            out_levels: vec![0.8],
        }),
        ..Preset::default()
    };
    synth.apply_preset(&preset);

    let edges: Vec<(usize, usize, f32)> = synth
        .network()
        .edges()
        .iter()
        .map(|e| (e.source(), e.dest(), e.nominal_depth()))
        .collect();
    assert_eq!(edges, vec![(1, 0, 75.0), (0, 3, 20.0)]);
    assert_eq!(synth.network().operator(1).unwrap().ratio(), 3.0);
    // Ratios beyond the list are left alone
    assert_eq!(synth.network().operator(2).unwrap().ratio(), 2.01);
    assert_eq!(synth.network().operator(0).unwrap().output_level(), 0.8);
}

#[test]
fn test_old_preset_resets_envelopes_and_keeps_chaos() {
    let mut synth = quiet_synth();
    let custom = EnvelopeParams {
        a: 0.5,
        ..EnvelopeParams::default()
    };
    synth.set_envelope(0, custom);
    let chaos = ChaosConfig {
        rate: 9.0,
        ..ChaosConfig::default()
    };
    synth.set_chaos(chaos);

    let old = Preset::from_json(r#"{"name": "v1", "chaos": {"rate": 1.0}}"#).unwrap();
    synth.apply_preset(&old);
    assert_eq!(
        synth.network().operator(0).unwrap().envelope.params(),
        EnvelopeParams::default()
    );
    assert_eq!(synth.chaos_config(), chaos);
}

#[test]
fn test_sequencer_drives_engine_through_render() {
    let mut synth = quiet_synth();
    synth.set_bpm(120.0);
    synth.set_step(0, SequencerStep::new(60, 0.8, 0.5));
    synth.start_sequencer();

    render(&mut synth, 0.02);
    assert_eq!(synth.current_note(), Some(60));
    assert!(synth.is_gate_on());

    render(&mut synth, 0.06);
    assert!(!synth.is_gate_on(), "gate should close after 62.5 ms");
}

#[test]
fn test_stop_sequencer_releases_note() {
    let mut synth = quiet_synth();
    synth.set_step(0, SequencerStep::new(45, 1.0, 1.0));
    synth.start_sequencer();
    render(&mut synth, 0.01);
    assert!(synth.is_gate_on());

    synth.stop_sequencer();
    assert!(!synth.is_gate_on());
    assert!(!synth.sequencer().is_running());
}

#[test]
fn test_reset_silences_everything() {
    let mut synth = quiet_synth();
    synth.set_step(0, SequencerStep::new(45, 1.0, 1.0));
    synth.start_sequencer();
    synth.note_on(50, 1.0);
    synth.apply_command(SynthCommand::Reset);
    assert!(!synth.is_gate_on());
    assert!(!synth.sequencer().is_running());
}

#[test]
fn test_params_are_clamped_at_the_boundary() {
    let mut synth = quiet_synth();
    synth.apply_command(SynthCommand::SetParam {
        param: Param::FilterCut,
        value: 1.0e6,
    });
    assert_eq!(synth.param(Param::FilterCut), 20000.0);
    synth.set_param(Param::OutGain, f32::NAN);
    assert_eq!(synth.param(Param::OutGain), 0.6);

    synth.set_macro(1, 4.0);
    assert_eq!(synth.macros()[1], 1.0);
    synth.set_macro(9, 0.5);
    assert_eq!(synth.macros().len(), 4);
}

#[test]
fn test_invalid_routing_is_ignored() {
    let mut synth = quiet_synth();
    synth.connect(0, 9, 100.0);
    synth.connect(2, 2, 100.0);
    synth.set_ratio(12, 2.0);
    synth.set_mod_depth(1, 0, f32::NAN);
    assert_eq!(synth.network().edges().len(), 3);
    assert_eq!(synth.network().edge(1, 0).unwrap().nominal_depth(), 180.0);

    synth.set_mod_depth(1, 0, -10.0);
    assert_eq!(synth.network().edge(1, 0).unwrap().nominal_depth(), 0.0);
}

#[test]
fn test_chaos_moves_at_control_rate() {
    let mut synth = quiet_synth();
    synth.set_chaos(ChaosConfig {
        rate: 30.0,
        amount: 1.0,
        target_filter: true,
        target_drive: true,
        target_mod: true,
    });
    render(&mut synth, 0.5);
    assert_ne!(synth.chaos_value(), 0.0);
    assert!(synth.chaos_value().abs() <= 1.0);
}

#[test]
fn test_config_shapes_the_engine() {
    let config = SynthConfig {
        operator_count: 2,
        sample_rate: 48000.0,
        oversample: true,
        ..SynthConfig::default()
    };
    let mut synth = Synth::with_config(config);
    assert_eq!(synth.network().operator_count(), 2);
    assert_eq!(synth.network().edges().len(), 1);
    assert!(synth.mix().oversample());
    synth.note_on(40, 1.0);
    assert!(render(&mut synth, 0.1).iter().all(|s| s.is_finite()));
}

#[cfg(feature = "native")]
#[test]
fn test_native_runtime_applies_queued_commands() {
    use neurofm::runtime::NativeSynth;
    use std::sync::mpsc::channel;

    let (tx, rx) = channel();
    let mut native = NativeSynth::new(quiet_synth(), rx);
    tx.send(SynthCommand::NoteOn {
        note: 57,
        velocity: Some(0.9),
    })
    .unwrap();
    tx.send(SynthCommand::SetBpm(90.0)).unwrap();

    let mut buffer = [0.0f32; 128];
    native.process(&mut buffer);
    assert_eq!(native.synth().current_note(), Some(57));
    assert_eq!(native.synth().sequencer().bpm(), 90.0);
}

#[test]
fn test_non_finite_spike_probability_is_replaced() {
    let mut synth = Synth::new();
    synth.apply_command(SynthCommand::SetSpikes(SpikeConfig {
        enabled: true,
        probability: f32::NAN,
        boost: f32::NAN,
    }));
    let config = synth.spike_config();
    assert_eq!(config.probability, SpikeConfig::default().probability);
    assert_eq!(config.boost, SpikeConfig::default().boost);

    synth.note_on(40, 1.0);
    let sample_rate = synth.sample_rate();
    let out = render(&mut synth, 1024.0 / sample_rate as f64);
    assert!(out.iter().all(|s| s.is_finite()));
}

#[test]
fn test_non_finite_step_gate_closes_through_render() {
    let mut synth = quiet_synth();
    synth.set_bpm(120.0);
    synth.set_step(
        0,
        SequencerStep {
            enabled: true,
            note: 60,
            velocity: f32::NAN,
            gate: f32::NAN,
        },
    );
    synth.start_sequencer();
    render(&mut synth, 0.02);
    assert!(synth.is_gate_on());
    render(&mut synth, 0.08);
    assert!(!synth.is_gate_on(), "note-off never fired");
}

#[test]
fn test_load_scale_command_keeps_name() {
    let mut synth = quiet_synth();
    let scale = Scale::from_cents(&[240.0, 480.0, 720.0, 960.0, 1200.0]);
    synth.apply_command(SynthCommand::LoadScale {
        name: "Slendro".to_string(),
        scale: scale.clone(),
    });
    assert_eq!(synth.tuning().name(), "Slendro");
    assert_eq!(synth.tuning().scale(), &scale);
}

#[test]
fn test_preset_without_fm_clears_routing() {
    let mut synth = quiet_synth();
    assert_eq!(synth.network().edges().len(), 3);
    let old = Preset::from_json(r#"{"name": "v1", "macros": [0.1, 0.2, 0.3, 0.4]}"#).unwrap();
    synth.apply_preset(&old);
    assert!(synth.network().edges().is_empty());
    assert_eq!(synth.network().operator(1).unwrap().ratio(), 1.5);
    assert_eq!(synth.network().operator(0).unwrap().output_level(), 1.0);
    assert_eq!(synth.macros()[2], 0.3);
}

#[test]
fn test_randomize_is_seeded_and_bounded() {
    let mut a = quiet_synth();
    let mut b = quiet_synth();
    a.apply_command(SynthCommand::Randomize(RandomizeMode::Safe));
    b.randomize(RandomizeMode::Safe);

    for (x, y) in a.network().operators().iter().zip(b.network().operators()) {
        assert_eq!(x.ratio(), y.ratio());
        assert!((1.0..=5.0).contains(&x.ratio()), "{}", x.ratio());
        assert!(x.envelope.params().a <= 0.05);
    }
    for (x, y) in a.network().edges().iter().zip(b.network().edges()) {
        assert_eq!(x.nominal_depth(), y.nominal_depth());
        assert!((40.0..=240.0).contains(&x.nominal_depth()));
        assert_eq!(x.target_depth(), x.nominal_depth());
    }
    assert_eq!(a.macros(), b.macros());
    assert_ne!(a.macros(), &[0.3, 0.5, 0.2, 0.4]);
    // Routing itself is untouched
    assert_eq!(a.network().edges().len(), 3);

    a.randomize(RandomizeMode::Wild);
    let out = render(&mut a, 0.1);
    assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 0.91));
}

#[test]
fn test_randomize_all_keeps_everything_in_range() {
    let mut synth = Synth::new();
    for _ in 0..20 {
        synth.apply_command(SynthCommand::RandomizeAll);
        let params = *synth.params();
        assert_eq!(params, params.sanitized());
        assert!((30.0..110.0).contains(&params.base_freq));
        let spikes = synth.spike_config();
        assert!((0.0..=0.4).contains(&spikes.probability));
        let chaos = synth.chaos_config();
        assert!((0.2..=12.2).contains(&chaos.rate));
        for op in synth.network().operators() {
            assert!((0.25..=12.25).contains(&op.ratio()));
        }
    }
    synth.note_on(36, 1.0);
    let out = render(&mut synth, 0.2);
    assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 0.91));
}

#[test]
fn test_normalize_routes_scales_deepest_edge() {
    let mut synth = quiet_synth();
    synth.apply_command(SynthCommand::NormalizeRoutes);
    let depth = |synth: &Synth, s, d| synth.network().edge(s, d).unwrap().nominal_depth();
    assert!((depth(&synth, 1, 0) - NORMALIZED_MAX_DEPTH).abs() < 1e-3);
    assert!((depth(&synth, 3, 2) - 140.0 / 180.0 * 300.0).abs() < 1e-3);
    assert!((depth(&synth, 2, 1) - 110.0 / 180.0 * 300.0).abs() < 1e-3);

    // Glides rather than jumps
    render(&mut synth, 0.05);
    let live = synth.network().edge(1, 0).unwrap().live_depth();
    assert!(live > 180.0 && live < 300.0, "{live}");

    let mut silent = quiet_synth();
    for (s, d) in [(2, 1), (3, 2), (1, 0)] {
        silent.set_mod_depth(s, d, 0.0);
    }
    silent.normalize_routes();
    assert!(silent.network().edges().iter().all(|e| e.nominal_depth() == 0.0));

    let mut empty = quiet_synth();
    for (s, d) in [(2, 1), (3, 2), (1, 0)] {
        empty.remove_connection(s, d);
    }
    empty.normalize_routes();
    assert!(empty.network().edges().is_empty());
}

#[test]
fn test_accent_lane_lifts_edge_scale() {
    let no_mod = ChaosConfig {
        target_mod: false,
        ..ChaosConfig::default()
    };
    let mut plain = quiet_synth();
    plain.set_chaos(no_mod);
    let mut accented = quiet_synth();
    accented.set_chaos(no_mod);
    for index in 0..STEP_COUNT {
        accented.apply_command(SynthCommand::SetAccentStep { index, on: true });
    }
    render(&mut plain, 0.05);
    render(&mut accented, 0.05);

    let base = plain.network().edges()[0].scale();
    let lifted = accented.network().edges()[0].scale();
    let boost = 1.0 + 0.1 * accented.macros()[0];
    assert!((lifted - base * boost).abs() < 1e-6, "{lifted} vs {base}");

    accented.apply_command(SynthCommand::SetAccentLane(false));
    render(&mut accented, 0.05);
    assert!((accented.network().edges()[0].scale() - base).abs() < 1e-6);
}

#[test]
fn test_stutter_burst_runs_for_its_window() {
    let mut synth = quiet_synth();
    synth.note_on(45, 1.0);
    render(&mut synth, 0.05);
    synth.apply_command(SynthCommand::Stutter);
    let sr = synth.sample_rate() as f64;
    let delay = synth.mix().stutter().delay_samples() as f64 / sr;
    assert!((0.079..=0.131).contains(&delay), "{delay}");
    assert!(synth.mix().stutter().is_active(synth.time()));

    let out = render(&mut synth, 0.3);
    assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 0.91));
    assert!(!synth.mix().stutter().is_active(synth.time()));
}

#[test]
fn test_panic_cuts_note_sequencer_and_tails() {
    let mut synth = quiet_synth();
    synth.set_step(0, SequencerStep::new(45, 1.0, 1.0));
    synth.start_sequencer();
    render(&mut synth, 0.01);
    synth.stutter();
    assert!(synth.is_gate_on());

    synth.apply_command(SynthCommand::Panic);
    assert!(!synth.is_gate_on());
    assert!(!synth.sequencer().is_running());
    assert!(!synth.mix().stutter().is_active(synth.time()));
}
