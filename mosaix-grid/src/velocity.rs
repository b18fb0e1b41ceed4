//! Scroll velocity tracking.
//!
//! A short sliding window of (instant, offset) samples classifies scrolling
//! as normal or fast. While fast, deferred placeholder upgrades are postponed
//! so a fling through the library never pays full-asset work for tiles the
//! user blows straight past.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Samples older than this are considered stale; the tracker settles back to
/// normal speed once the window goes quiet.
const SETTLE_AFTER: Duration = Duration::from_millis(150);

#[derive(Debug)]
pub struct ScrollVelocityTracker {
    samples: VecDeque<(Instant, f32)>,
    capacity: usize,
    threshold: f32,
    velocity: f32,
    fast: bool,
}

impl ScrollVelocityTracker {
    /// `capacity` is the sample window length, `threshold` the px/s speed
    /// beyond which scrolling counts as fast.
    pub fn new(capacity: usize, threshold: f32) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.max(2)),
            capacity: capacity.max(2),
            threshold,
            velocity: 0.0,
            fast: false,
        }
    }

    /// Current speed estimate in px/s (absolute).
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn is_fast(&self) -> bool {
        self.fast
    }

    /// Record a scroll sample and reclassify.
    pub fn record(&mut self, now: Instant, offset: f32) {
        self.samples.push_back((now, offset));
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }

        if self.samples.len() >= 2 {
            let (oldest_at, oldest_offset) = *self.samples.front().unwrap();
            let (newest_at, newest_offset) = *self.samples.back().unwrap();
            let elapsed = newest_at.duration_since(oldest_at).as_secs_f32();
            if elapsed > 0.0 {
                self.velocity = ((newest_offset - oldest_offset) / elapsed).abs();
                let was_fast = self.fast;
                self.fast = self.velocity > self.threshold;
                if was_fast != self.fast {
                    log::debug!(
                        "scroll mode changed: {} (velocity: {:.0} px/s)",
                        if self.fast { "fast" } else { "normal" },
                        self.velocity
                    );
                }
            }
        }
    }

    /// Settle back to normal once no sample has arrived for a while.
    pub fn settle(&mut self, now: Instant) {
        if !self.fast {
            return;
        }
        let quiet = self
            .samples
            .back()
            .is_none_or(|(at, _)| now.duration_since(*at) >= SETTLE_AFTER);
        if quiet {
            self.fast = false;
            self.velocity = 0.0;
            self.samples.clear();
            log::debug!("scroll settled");
        }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.velocity = 0.0;
        self.fast = false;
    }
}
