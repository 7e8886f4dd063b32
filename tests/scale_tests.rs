use neurofm::synth::scale::{builtin_scale, normalize, parse_scale, Scale, Tuning, BUILTIN_SCALES};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9 * b.abs().max(1.0)
}

#[test]
fn test_parse_always_starts_at_zero() {
    let inputs = [
        "Plain\n3\n100.0\n200.0\n1200.0\n",
        "No zero\n2\n 3/2\n2/1\n",
        "Junk lines\n4\nabc\n\n(comment only)\n700.0 (fifth)\n",
        "Declares more than it has\n12\n350.0\n",
        "Negative count\n-3\n100\n",
        "Zero first\n3\n0\n500\n1200\n",
    ];
    for text in inputs {
        let cents = parse_scale(text);
        assert_eq!(cents.first(), Some(&0.0), "input: {text:?}");
    }
}

#[test]
fn test_parse_reads_ratios_and_cents() {
    let text = "! fifths.scl\n!\nFifth and octave\n2\n!\n3/2\n1200.0\n";
    let cents = parse_scale(text);
    assert_eq!(cents.len(), 3);
    assert!(close(cents[1], 701.955000865));
    assert_eq!(cents[2], 1200.0);
}

#[test]
fn test_parse_without_header_is_twelve_tet() {
    let cents = parse_scale("only a description");
    assert_eq!(cents.len(), 13);
    assert_eq!(cents[12], 1200.0);
}

#[test]
fn test_parse_stops_at_declared_count() {
    let cents = parse_scale("Short\n2\n100\n200\n300\n400\n");
    assert_eq!(cents, vec![0.0, 100.0, 200.0]);
}

#[test]
fn test_normalize_is_idempotent() {
    let samples: Vec<Vec<f64>> = vec![
        vec![0.0, 100.0, 200.0, 1200.0],
        vec![700.0, 200.0, 200.0, 0.0],
        vec![146.304, 1756.652],
        vec![-50.0, 300.0, f64::NAN, 1199.8],
        vec![],
        vec![0.1234567, 0.1234568],
    ];
    for cents in samples {
        let once = normalize(&cents);
        let twice = normalize(&once);
        assert_eq!(once, twice, "input: {cents:?}");
        assert_eq!(once.first(), Some(&0.0));
        assert!(once.windows(2).all(|w| w[0] < w[1]), "not ascending: {once:?}");
    }
}

#[test]
fn test_normalize_adds_missing_octave() {
    assert_eq!(normalize(&[0.0, 700.0]), vec![0.0, 700.0, 1200.0]);
    // Within half a cent of 1200 already counts as the octave.
    assert_eq!(normalize(&[0.0, 700.0, 1199.8]), vec![0.0, 700.0, 1199.8]);
}

#[test]
fn test_default_tuning_reference_pitches() {
    let tuning = Tuning::default();
    assert_eq!(tuning.frequency_for_note(69), 440.0);
    assert_eq!(tuning.frequency_for_note(81), 880.0);
    assert!(close(tuning.frequency_for_note(57), 220.0));
}

#[test]
fn test_root_maps_to_equal_tempered_pitch_for_every_scale() {
    for (name, text) in BUILTIN_SCALES {
        let scale = Scale::from_scl(text);
        for root in [0, 36, 48, 60, 69, 72, 127] {
            let tuning = Tuning::new(*name, scale.clone(), root);
            let expected = 440.0 * 2f64.powf((root - 69) as f64 * 100.0 / 1200.0);
            assert!(
                close(tuning.frequency_for_note(root), expected),
                "{name} root {root}"
            );
        }
    }
}

#[test]
fn test_one_note_step_is_one_scale_degree() {
    let scale = builtin_scale("Pythagorean Pentatonic").expect("built-in scale");
    assert_eq!(scale.steps(), 5);
    let tuning = Tuning::new("pent", scale, 60);
    let root = tuning.frequency_for_note(60);
    assert!(close(tuning.frequency_for_note(65), root * 2.0));
    assert!(close(tuning.frequency_for_note(55), root / 2.0));
    let second = root * 2f64.powf(203.910 / 1200.0);
    assert!(close(tuning.frequency_for_note(61), second));
}

#[test]
fn test_bohlen_pierce_repeats_at_largest_degree() {
    let scale = builtin_scale("Bohlen-Pierce (tritave)").expect("built-in scale");
    assert!(close(scale.period_cents(), 1756.652));
    let steps = scale.steps() as i32;
    let tuning = Tuning::new("bp", scale.clone(), 60);
    let ratio = 2f64.powf(scale.period_cents() / 1200.0);
    assert!(close(
        tuning.frequency_for_note(60 + steps),
        tuning.frequency_for_note(60) * ratio
    ));
}

#[test]
fn test_quarter_tone_gets_root_degree() {
    let scale = builtin_scale("Quarter-tone 24-EDO").expect("built-in scale");
    assert_eq!(scale.cents()[0], 0.0);
    assert_eq!(scale.steps(), 24);
    let tuning = Tuning::new("24", scale, 69);
    assert!(close(tuning.frequency_for_note(70), 440.0 * 2f64.powf(50.0 / 1200.0)));
}

#[test]
fn test_malformed_text_degrades_to_root_plus_octave() {
    let scale = Scale::from_scl("Broken\n3\nnot a pitch\n???\n");
    assert_eq!(scale.cents(), &[0.0, 1200.0]);
    assert_eq!(scale.steps(), 1);
}

#[test]
fn test_every_builtin_scale_parses() {
    for (name, _) in BUILTIN_SCALES {
        let scale = builtin_scale(name).expect("listed scale");
        assert!(scale.steps() >= 1, "{name}");
        assert!(scale.cents().iter().all(|c| c.is_finite()), "{name}");
    }
    assert!(builtin_scale("Nope").is_none());
}
