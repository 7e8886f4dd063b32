/// Maximum number of scheduled segments per parameter. Writers always cancel
/// before scheduling, so in practice no more than three are ever queued.
const MAX_SEGMENTS: usize = 8;

/// An exponential approach is considered settled after this many time
/// constants; the value then snaps exactly onto its target.
const SETTLE_TIME_CONSTANTS: f64 = 12.0;

#[derive(Clone, Copy, Debug, PartialEq)]
enum SegmentKind {
    /// Jump to the target at `start`.
    Set,
    /// Linear ramp from the value held at `start` to the target.
    Linear { duration: f64 },
    /// Exponential approach towards the target, superseded by the next segment.
    Target { time_constant: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Segment {
    kind: SegmentKind,
    start: f64,
    target: f32,
}

impl Segment {
    const EMPTY: Segment = Segment {
        kind: SegmentKind::Set,
        start: 0.0,
        target: 0.0,
    };
}

/// A scalar parameter driven by a queue of scheduled curves.
///
/// Control-rate code only ever enqueues future automation; the audio path
/// consumes it in time order by calling [`AutomatedParam::tick`] once per
/// sample. The queue lives in a fixed-size array so neither side allocates.
#[derive(Clone, Debug)]
pub struct AutomatedParam {
    value: f32,
    anchor: f32,
    anchored: bool,
    segments: [Segment; MAX_SEGMENTS],
    len: usize,
}

impl AutomatedParam {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            anchor: value,
            anchored: false,
            segments: [Segment::EMPTY; MAX_SEGMENTS],
            len: 0,
        }
    }

    /// The live instantaneous value (the last value produced by `tick`).
    pub fn value(&self) -> f32 {
        self.value
    }

    /// The value the parameter will rest at once every queued segment has run.
    pub fn target(&self) -> f32 {
        if self.len == 0 {
            self.value
        } else {
            self.segments[self.len - 1].target
        }
    }

    pub fn is_settled(&self) -> bool {
        self.len == 0
    }

    pub fn pending(&self) -> usize {
        self.len
    }

    /// Drop every pending segment. The live value becomes the anchor for
    /// whatever is scheduled next.
    pub fn cancel(&mut self) {
        self.len = 0;
        self.anchored = false;
    }

    /// Cancel and jump straight to `value`.
    pub fn set_immediate(&mut self, value: f32) {
        self.cancel();
        self.value = value;
    }

    pub fn set_value_at(&mut self, value: f32, time: f64) -> bool {
        self.push(Segment {
            kind: SegmentKind::Set,
            start: time,
            target: value,
        })
    }

    /// Ramp linearly from the value held at `start` to `target` over `duration`
    /// seconds.
    pub fn linear_ramp_to(&mut self, target: f32, start: f64, duration: f64) -> bool {
        let kind = if duration > 0.0 {
            SegmentKind::Linear { duration }
        } else {
            SegmentKind::Set
        };
        self.push(Segment {
            kind,
            start,
            target,
        })
    }

    /// Cancel pending automation and approach `target` exponentially from the
    /// live value, starting at `now`.
    pub fn set_target(&mut self, target: f32, now: f64, time_constant: f64) {
        self.cancel();
        let kind = if time_constant > 0.0 {
            SegmentKind::Target { time_constant }
        } else {
            SegmentKind::Set
        };
        self.push(Segment {
            kind,
            start: now,
            target,
        });
    }

    /// Advance to time `t` (seconds) and return the instantaneous value.
    /// Calls must be monotonic in `t`.
    pub fn tick(&mut self, t: f64) -> f32 {
        while self.len > 0 {
            let segment = self.segments[0];
            if t < segment.start {
                break;
            }
            if !self.anchored {
                self.anchor = self.value;
                self.anchored = true;
            }
            let elapsed = t - segment.start;
            match segment.kind {
                SegmentKind::Set => {
                    self.value = segment.target;
                    self.pop();
                }
                SegmentKind::Linear { duration } => {
                    if elapsed >= duration {
                        self.value = segment.target;
                        self.pop();
                    } else {
                        let progress = (elapsed / duration) as f32;
                        self.value = self.anchor + (segment.target - self.anchor) * progress;
                        break;
                    }
                }
                SegmentKind::Target { time_constant } => {
                    if self.len > 1 && t >= self.segments[1].start {
                        self.pop();
                        continue;
                    }
                    if elapsed >= time_constant * SETTLE_TIME_CONSTANTS {
                        self.value = segment.target;
                        self.pop();
                    } else {
                        let decay = (-elapsed / time_constant).exp() as f32;
                        self.value = segment.target + (self.anchor - segment.target) * decay;
                    }
                    break;
                }
            }
        }
        self.value
    }

    fn push(&mut self, segment: Segment) -> bool {
        if self.len == MAX_SEGMENTS {
            return false;
        }
        self.segments[self.len] = segment;
        self.len += 1;
        true
    }

    fn pop(&mut self) {
        if self.len == 0 {
            return;
        }
        self.segments.copy_within(1..self.len, 0);
        self.len -= 1;
        self.anchored = false;
    }
}

impl Default for AutomatedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}
