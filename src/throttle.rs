use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A leading-edge rate limiter: the first acquisition fires, later ones are
/// suppressed until the minimum interval has elapsed. There is no trailing
/// invocation.
pub struct Throttle {
    min_interval: Duration,
    last_fired: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Creates a throttle with the given minimum spacing.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_fired: Mutex::new(None),
        }
    }

    /// Attempts to acquire at the current instant.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    /// Attempts to acquire at an injected instant. `now` must not move
    /// backwards between calls.
    pub fn try_acquire_at(&self, now: Instant) -> bool {
        let mut last_fired = self.last_fired.lock().unwrap();
        match *last_fired {
            Some(previous) if now.duration_since(previous) < self.min_interval => false,
            _ => {
                *last_fired = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_acquisition_fires() {
        let throttle = Throttle::new(Duration::from_secs(5));
        assert!(throttle.try_acquire_at(Instant::now()));
    }

    #[test]
    fn acquisitions_within_the_interval_are_suppressed() {
        let throttle = Throttle::new(Duration::from_secs(5));
        let start = Instant::now();
        assert!(throttle.try_acquire_at(start));
        assert!(!throttle.try_acquire_at(start + Duration::from_millis(1)));
        assert!(!throttle.try_acquire_at(start + Duration::from_millis(4_999)));
    }

    #[test]
    fn acquisition_after_the_interval_fires_again() {
        let throttle = Throttle::new(Duration::from_secs(5));
        let start = Instant::now();
        assert!(throttle.try_acquire_at(start));
        assert!(throttle.try_acquire_at(start + Duration::from_secs(5)));
    }

    #[test]
    fn burst_of_calls_fires_exactly_once() {
        let throttle = Throttle::new(Duration::from_secs(5));
        let start = Instant::now();
        let fired = (0..10)
            .filter(|n| throttle.try_acquire_at(start + Duration::from_millis(*n * 100)))
            .count();
        assert_eq!(fired, 1);
    }
}
