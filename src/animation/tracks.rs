use crate::animation::values::Interpolatable;

/// How values between two keyframes are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    Step,
}

/// How far a cursor-guided lookup scans linearly before falling back to a
/// binary search. Scroll scrubbing moves time in small steps in either
/// direction, so a short window catches almost every sample.
const MAX_SCAN: usize = 3;

/// Remembers the keyframe interval a consumer sampled last, making
/// consecutive samples O(1) for slowly-moving (or slowly-reversing) time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleCursor {
    last_index: usize,
}

/// Time-sampled curve for one bone channel.
///
/// `times` is strictly increasing and never empty; ingestion drops channels
/// that would violate this.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    times: Vec<f32>,
    values: Vec<T>,
    interpolation: Interpolation,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    /// Returns `None` when the channel is empty or times/values disagree in
    /// length, so callers can drop it instead of carrying a poisoned track.
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: Interpolation) -> Option<Self> {
        if times.is_empty() || times.len() != values.len() {
            return None;
        }
        Some(Self {
            times,
            values,
            interpolation,
        })
    }

    /// Timestamp of the last keyframe.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        *self.times.last().unwrap_or(&0.0)
    }

    /// Samples the track at `time`, clamping outside the keyframe range.
    ///
    /// The cursor is advanced to the interval that served this sample; reuse
    /// the same cursor for the same consumer to keep lookups O(1).
    pub fn sample(&self, time: f32, cursor: &mut SampleCursor) -> T {
        let len = self.times.len();
        if len == 1 {
            return self.values[0];
        }

        let index = self
            .scan_near(time, cursor.last_index.min(len - 1))
            .unwrap_or_else(|| {
                // Large jump: fall back to a global binary search.
                let next = self.times.partition_point(|&t| t <= time);
                next.saturating_sub(1)
            });
        cursor.last_index = index;

        self.sample_interval(index, time)
    }

    /// Tries to locate the interval containing `time` within `MAX_SCAN`
    /// steps of `start`, in the direction time moved.
    fn scan_near(&self, time: f32, start: usize) -> Option<usize> {
        let len = self.times.len();

        if time >= self.times[start] {
            for idx in start..=(start + MAX_SCAN).min(len - 1) {
                if idx == len - 1 {
                    return (time >= self.times[idx]).then_some(idx);
                }
                if time < self.times[idx + 1] {
                    return Some(idx);
                }
            }
        } else {
            for offset in 1..=MAX_SCAN.min(start) {
                let idx = start - offset;
                if time >= self.times[idx] {
                    return Some(idx);
                }
            }
            if start <= MAX_SCAN && time < self.times[0] {
                // Before the first keyframe: clamp to it.
                return Some(0);
            }
        }
        None
    }

    fn sample_interval(&self, index: usize, time: f32) -> T {
        let len = self.times.len();
        if index >= len - 1 {
            return self.values[len - 1];
        }

        let t0 = self.times[index];
        let t1 = self.times[index + 1];
        if time <= t0 {
            return self.values[index];
        }

        match self.interpolation {
            Interpolation::Step => self.values[index],
            Interpolation::Linear => {
                let dt = t1 - t0;
                let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
                T::interpolate(self.values[index], self.values[index + 1], t.clamp(0.0, 1.0))
            }
        }
    }
}
