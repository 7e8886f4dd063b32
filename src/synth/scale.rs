//! Microtonal pitch mapping.
//!
//! Scales are lists of cents offsets (first element exactly 0, strictly
//! ascending, last element the repeat period) read from Scala-style `.scl`
//! text. A [`Tuning`] pairs a scale with a root note and turns note numbers
//! into frequencies.

use std::borrow::Cow;

/// 12-per-octave equal temperament reference: note 69 sounds at 440 Hz.
pub const REFERENCE_NOTE: i32 = 69;
pub const REFERENCE_FREQUENCY: f64 = 440.0;
pub const OCTAVE_CENTS: f64 = 1200.0;

/// Root note of a fresh tuning (C4).
pub const DEFAULT_ROOT: i32 = 60;

/// Tolerance within which the largest degree counts as an octave.
const OCTAVE_TOLERANCE: f64 = 0.5;

/// Degrees of standard 12-TET, period included.
pub fn default_cents() -> Vec<f64> {
    (0..=12).map(|i| i as f64 * 100.0).collect()
}

/// Parse Scala text into a raw list of cents, root degree included.
///
/// Blank lines and `!` comments are skipped. The first remaining line is the
/// description, the second the declared pitch count; pitch lines follow.
/// Ratios (`n/d`) are converted to cents, anything in parentheses is ignored,
/// and unparseable pitch lines are skipped. Text without a description and
/// count line yields 12-TET.
pub fn parse_scale(text: &str) -> Vec<f64> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('!'));

    let (Some(_description), Some(count_line)) = (lines.next(), lines.next()) else {
        return default_cents();
    };
    let declared = leading_integer(count_line).unwrap_or(0).max(0) as usize;

    let mut cents = Vec::with_capacity(declared.min(256) + 1);
    for line in lines {
        if cents.len() >= declared {
            break;
        }
        let token = strip_parentheticals(line);
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(value) = parse_pitch(token) {
            cents.push(value);
        }
    }

    if cents.first() != Some(&0.0) {
        cents.insert(0, 0.0);
    }
    cents
}

/// Deduplicate (6 decimal places), sort, make sure the root degree is 0 and
/// that an octave exists when the source omits one.
///
/// Negative and non-finite degrees are discarded; they can't sit above a root
/// of 0 in an ascending list.
pub fn normalize(cents: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = cents
        .iter()
        .copied()
        .filter(|c| c.is_finite() && *c >= 0.0)
        .map(round6)
        .collect();
    out.sort_by(f64::total_cmp);
    out.dedup();

    if out.first() != Some(&0.0) {
        out.insert(0, 0.0);
    }

    let max = out.last().copied().unwrap_or(0.0);
    if (max - OCTAVE_CENTS).abs() > OCTAVE_TOLERANCE && !out.contains(&OCTAVE_CENTS) {
        out.push(OCTAVE_CENTS);
        out.sort_by(f64::total_cmp);
    }
    out
}

fn round6(value: f64) -> f64 {
    let rounded = (value * 1e6).round() / 1e6;
    // Fold -0.0 into 0.0 so the root compares and prints as exactly zero.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text[..end].parse().ok()
}

fn strip_parentheticals(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

fn parse_pitch(token: &str) -> Option<f64> {
    let token = token.split_whitespace().next()?;
    if let Some((n, d)) = token.split_once('/') {
        let n: f64 = n.trim().parse().ok()?;
        let d: f64 = d.trim().parse().ok()?;
        if n > 0.0 && d > 0.0 {
            return Some(OCTAVE_CENTS * (n / d).log2());
        }
        return None;
    }
    let end = token
        .char_indices()
        .find(|&(_, c)| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    token[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// An immutable, normalized scale. Replaced wholesale on tuning changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    cents: Vec<f64>,
}

impl Scale {
    pub fn from_cents(cents: &[f64]) -> Self {
        Self {
            cents: normalize(cents),
        }
    }

    /// Parse and normalize Scala text. Never fails; malformed input degrades to
    /// a root-plus-octave scale at worst.
    pub fn from_scl(text: &str) -> Self {
        Self::from_cents(&parse_scale(text))
    }

    pub fn twelve_tet() -> Self {
        Self::from_cents(&default_cents())
    }

    pub fn cents(&self) -> &[f64] {
        &self.cents
    }

    /// Span of one repeat of the scale; the largest degree.
    pub fn period_cents(&self) -> f64 {
        self.cents.last().copied().unwrap_or(OCTAVE_CENTS)
    }

    /// Scale steps per period.
    pub fn steps(&self) -> usize {
        self.cents.len().saturating_sub(1).max(1)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::twelve_tet()
    }
}

/// Scale plus root note: the note-number to frequency mapping.
///
/// Each integer note step advances exactly one scale degree, whatever the
/// number of degrees per period.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    name: Cow<'static, str>,
    scale: Scale,
    root_note: i32,
}

impl Tuning {
    pub fn new(name: impl Into<Cow<'static, str>>, scale: Scale, root_note: i32) -> Self {
        Self {
            name: name.into(),
            scale,
            root_note,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scale(&self) -> &Scale {
        &self.scale
    }

    pub fn root_note(&self) -> i32 {
        self.root_note
    }

    /// Takes ownership of the name; a `String` or static name moves in
    /// without copying.
    pub fn set_scale(&mut self, name: impl Into<Cow<'static, str>>, scale: Scale) {
        self.name = name.into();
        self.scale = scale;
    }

    pub fn set_root(&mut self, note: i32) {
        self.root_note = note;
    }

    pub fn frequency_for_note(&self, note: i32) -> f64 {
        let cents = self.scale.cents();
        let steps = self.scale.steps() as i32;
        let diff = note - self.root_note;
        let degree = diff.rem_euclid(steps) as usize;
        let octave = diff.div_euclid(steps);
        let degree_cents = cents.get(degree).copied().unwrap_or(0.0);
        let total_cents = degree_cents + octave as f64 * self.scale.period_cents();

        let root_cents_from_reference = (self.root_note - REFERENCE_NOTE) as f64 * 100.0;
        REFERENCE_FREQUENCY * 2f64.powf((root_cents_from_reference + total_cents) / OCTAVE_CENTS)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::new(BUILTIN_SCALES[0].0, Scale::twelve_tet(), DEFAULT_ROOT)
    }
}

pub fn builtin_scale(name: &str) -> Option<Scale> {
    BUILTIN_SCALES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, text)| Scale::from_scl(text))
}

/// Built-in tunings as (name, Scala text).
pub const BUILTIN_SCALES: &[(&str, &str)] = &[
    (
        "12-TET (Standard)",
        "! 12-equal.scl
!
Standard 12-tone equal temperament
12
!
100.0
200.0
300.0
400.0
500.0
600.0
700.0
800.0
900.0
1000.0
1100.0
1200.0",
    ),
    (
        "Pythagorean Pentatonic",
        "! pythagorean_pentatonic.scl
!
Pythagorean pentatonic scale (5 notes per octave)
5
!
0
203.910
407.821
701.955
905.865",
    ),
    (
        "Greek Enharmonic Tetrachord",
        "! greek_enharmonic.scl
!
Ancient Greek enharmonic tetrachord
4
!
0
72.0
144.0
792.0",
    ),
    (
        "Bohlen-Pierce (tritave)",
        "! bohlen_pierce.scl
!
Bohlen-Pierce scale (13 steps per tritave)
13
!
0
146.304
292.609
439.913
585.217
733.422
878.826
1025.130
1171.435
1317.739
1464.043
1610.348
1756.652",
    ),
    (
        "Japanese In Sen",
        "! in_sen.scl
!
Japanese In Sen pentatonic
5
!
0
151.0
498.0
701.0
998.0",
    ),
    (
        "Overtone (Natural Harmonics)",
        "! overtone.scl
!
Overtone scale subset (harmonics 1-8 normalized)
7
!
0
231.174
347.407
498.045
701.955
968.826
1200.0",
    ),
    (
        "Quarter-tone 24-EDO",
        "! 24-tet.scl
!
24 equal divisions of the octave (quarter-tones)
24
!
50
100
150
200
250
300
350
400
450
500
550
600
650
700
750
800
850
900
950
1000
1050
1100
1150
1200",
    ),
    (
        "Just Intonation (7-limit)",
        "! just_7_limit.scl
!
Example 7-limit just intonation (12 steps)
12
!
0
111.731 (9/8)
203.910 (10/9)
315.641 (6/5)
386.314 (5/4)
498.045 (4/3)
582.512 (7/5)
701.955 (3/2)
813.686 (8/5)
884.359 (5/3)
1017.596 (9/5)
1200.0",
    ),
    (
        "Pure Major",
        "! pure_major.scl
!
Pure (just) major scale degrees
7
!
0
203.910 (9/8)
386.314 (5/4)
498.045 (4/3)
701.955 (3/2)
905.865 (5/3)
1100.0 (15/8)",
    ),
    (
        "Pure Minor",
        "! pure_minor.scl
!
Just minor scale
7
!
0
203.910 (9/8)
315.641 (6/5)
498.045 (4/3)
701.955 (3/2)
813.686 (8/5)
1017.596 (9/5)",
    ),
];
