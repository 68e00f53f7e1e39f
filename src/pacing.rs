use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

/// Throttle between listing-page requests. Called once after every page,
/// whether the page succeeded or not.
pub trait Pacing {
    fn pause(&self, page: u32);
}

/// Any `Fn(page)` works as a pacing policy.
impl<F: Fn(u32)> Pacing for F {
    fn pause(&self, page: u32) {
        self(page)
    }
}

/// Sleeps for a uniformly random interval within `[min, max]`.
#[derive(Debug, Clone)]
pub struct RandomPacing {
    min: Duration,
    max: Duration,
}

impl RandomPacing {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            RandomPacing { min, max }
        } else {
            RandomPacing { min: max, max: min }
        }
    }

    pub fn next_delay(&self) -> Duration {
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

impl Pacing for RandomPacing {
    fn pause(&self, page: u32) {
        let delay = self.next_delay();
        debug!("Pausing {:.2}s after page {}", delay.as_secs_f64(), page);
        thread::sleep(delay);
    }
}

/// No delay at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl Pacing for NoPacing {
    fn pause(&self, _page: u32) {}
}
