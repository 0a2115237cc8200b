//! Global admission control.

use std::time::Instant;

use parking_lot::Mutex;

/// Token-bucket limiter shared by every client of the service.
///
/// Capacity is `burst` tokens; tokens refill continuously at `rps` per
/// second. Admitting a request takes one token, and an empty bucket turns
/// the request away. The bucket is global, not per-client.
#[derive(Debug)]
pub struct RateLimiter {
    rps: f64,
    burst: f64,
    bucket: Mutex<Bucket>,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

impl RateLimiter {
    pub fn new(rps: f64, burst: u32) -> Self {
        Self {
            rps,
            burst: f64::from(burst),
            bucket: Mutex::new(Bucket {
                tokens: f64::from(burst),
                refilled_at: Instant::now(),
            }),
        }
    }

    /// Take one token if available.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    fn allow_at(&self, now: Instant) -> bool {
        let mut bucket = self.bucket.lock();

        let elapsed = now.saturating_duration_since(bucket.refilled_at);
        bucket.tokens = (bucket.tokens + elapsed.as_secs_f64() * self.rps).min(self.burst);
        bucket.refilled_at = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn admits_up_to_burst_immediately() {
        let limiter = RateLimiter::new(2.0, 4);
        let now = Instant::now();

        for _ in 0..4 {
            assert!(limiter.allow_at(now));
        }
        assert!(!limiter.allow_at(now));
    }

    #[test]
    fn refills_over_time_at_configured_rate() {
        let limiter = RateLimiter::new(2.0, 4);
        let start = Instant::now();
        for _ in 0..4 {
            assert!(limiter.allow_at(start));
        }
        assert!(!limiter.allow_at(start));

        // Half a second at 2 rps refills exactly one token.
        let later = start + Duration::from_millis(500);
        assert!(limiter.allow_at(later));
        assert!(!limiter.allow_at(later));
    }

    #[test]
    fn refill_never_exceeds_burst() {
        let limiter = RateLimiter::new(100.0, 2);
        let start = Instant::now();
        assert!(limiter.allow_at(start));

        let much_later = start + Duration::from_secs(3600);
        assert!(limiter.allow_at(much_later));
        assert!(limiter.allow_at(much_later));
        assert!(!limiter.allow_at(much_later));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: at a single instant, admissions never exceed burst.
            #[test]
            fn admissions_never_exceed_burst(burst in 1u32..32, attempts in 1usize..128) {
                let limiter = RateLimiter::new(0.0, burst);
                let now = Instant::now();

                let admitted = (0..attempts).filter(|_| limiter.allow_at(now)).count();
                prop_assert_eq!(admitted, attempts.min(burst as usize));
            }

            /// Property: a drained bucket refills in proportion to elapsed
            /// time, capped at burst.
            #[test]
            fn refill_is_proportional_to_elapsed_time(rps in 1u32..50, gap_ms in 0u64..10_000) {
                let rps = f64::from(rps);
                let burst = 64u32;
                let limiter = RateLimiter::new(rps, burst);
                let start = Instant::now();

                let mut drained = 0usize;
                while limiter.allow_at(start) {
                    drained += 1;
                }
                prop_assert_eq!(drained, burst as usize);

                let later = start + Duration::from_millis(gap_ms);
                let expected = ((gap_ms as f64 / 1000.0) * rps)
                    .min(f64::from(burst))
                    .floor() as usize;

                let mut readmitted = 0usize;
                while limiter.allow_at(later) {
                    readmitted += 1;
                }
                prop_assert_eq!(readmitted, expected);
            }
        }
    }
}
