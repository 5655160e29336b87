use chrono::{DateTime, Duration, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// A closed time interval whose end is always `start + duration`.
///
/// The end is derived rather than stored, so a window can never carry a
/// start/end pair that disagrees with its duration. Negative durations are
/// clamped to zero on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    duration: Duration,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            start,
            duration: duration.max(Duration::zero()),
        }
    }

    /// Window that finishes at `end` and lasted `duration`
    pub fn ending_at(end: DateTime<Utc>, duration: Duration) -> Self {
        let duration = duration.max(Duration::zero());
        Self::new(end - duration, duration)
    }

    /// Like [`TimeWindow::ending_at`], but `None` when the start would fall
    /// outside the representable date range
    pub fn checked_ending_at(end: DateTime<Utc>, duration: Duration) -> Option<Self> {
        let duration = duration.max(Duration::zero());
        let start = end.checked_sub_signed(duration)?;
        start.checked_add_signed(duration)?;
        Some(Self::new(start, duration))
    }

    /// Window spanning `start..=end`; zero-length if `end` precedes `start`
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new(start, end - start)
    }

    pub fn instant(at: DateTime<Utc>) -> Self {
        Self::new(at, Duration::zero())
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.duration
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Same duration, moved to begin at `start`
    pub fn starting_at(&self, start: DateTime<Utc>) -> Self {
        Self::new(start, self.duration)
    }

    pub fn contains(&self, other: &TimeWindow) -> bool {
        other.start >= self.start && other.end() <= self.end()
    }

    /// Move (and if necessary shrink) this window so it lies inside `outer`.
    ///
    /// A start before `outer` is pinned to `outer.start`; an end past `outer`
    /// is pinned to `outer.end` with the start shifted back by the duration.
    /// A window longer than `outer` becomes `outer`.
    pub fn clip_into(&self, outer: &TimeWindow) -> TimeWindow {
        let shifted = self.starting_at(self.start.max(outer.start));
        if shifted.end() <= outer.end() {
            return shifted;
        }

        let pinned = TimeWindow::ending_at(outer.end(), self.duration);
        if pinned.start < outer.start {
            *outer
        } else {
            pinned
        }
    }
}

impl Serialize for TimeWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TimeWindow", 3)?;
        state.serialize_field("start", &self.start)?;
        state.serialize_field("end", &self.end())?;
        state.serialize_field("duration_ms", &self.duration.num_milliseconds())?;
        state.end()
    }
}
