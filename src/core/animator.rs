//! Counter animation: eased count-up toward a target value
//!
//! The easing core is a pure function of elapsed time; the async driver
//! samples it on a frame interval. Restarting with a new target abandons
//! the prior run and starts from the last displayed value, so there is
//! never a visual jump.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::FRAME_INTERVAL_MS;

/// Cubic ease-out: 1 - (1-t)^3, clamped to [0, 1]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Interpolated integer value at the given eased progress
pub fn value_at(start: i64, end: i64, progress: f64) -> i64 {
    (start as f64 + (end - start) as f64 * ease_out_cubic(progress)).floor() as i64
}

/// One animation run, sampled by elapsed time
#[derive(Debug, Clone, Copy)]
pub struct CountAnimation {
    pub start: i64,
    pub end: i64,
    pub duration: Duration,
}

impl CountAnimation {
    pub fn new(start: i64, end: i64, duration: Duration) -> Self {
        Self { start, end, duration }
    }

    /// Value at `elapsed`, plus whether the run is complete
    pub fn sample(&self, elapsed: Duration) -> (i64, bool) {
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f64() / self.duration.as_secs_f64()
        };
        if progress >= 1.0 {
            (self.end, true)
        } else {
            (value_at(self.start, self.end, progress), false)
        }
    }
}

/// Retargetable frame-loop driver for one displayed counter.
///
/// Two counters (bonus badge, prize reveal) each own an independent
/// instance; they share no mutable animation state.
#[derive(Debug, Default)]
pub struct CounterAnimator {
    task: Option<JoinHandle<()>>,
}

impl CounterAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abandon any running animation and start a new one from `start`
    /// toward `end`. `frame` is invoked once per sampled frame with the
    /// current value and a completion flag; the final invocation always
    /// carries `end` and `done = true`. A no-op when `start == end`.
    pub fn retarget<F>(&mut self, start: i64, end: i64, duration: Duration, mut frame: F)
    where
        F: FnMut(i64, bool) + Send + 'static,
    {
        self.cancel();
        if start == end {
            return;
        }
        self.task = Some(tokio::spawn(async move {
            let anim = CountAnimation::new(start, end, duration);
            let began = tokio::time::Instant::now();
            let mut ticker = tokio::time::interval(Duration::from_millis(FRAME_INTERVAL_MS));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let (value, done) = anim.sample(began.elapsed());
                frame(value, done);
                if done {
                    break;
                }
            }
        }));
    }

    /// Abort the running animation, if any
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }
}

impl Drop for CounterAnimator {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_ease_boundaries() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert_eq!(ease_out_cubic(-1.0), 0.0);
    }

    #[test]
    fn test_ease_is_monotone() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = ease_out_cubic(i as f64 / 100.0);
            assert!(v >= prev, "easing regressed at t={}", i);
            prev = v;
        }
    }

    #[test]
    fn test_value_converges_to_end() {
        assert_eq!(value_at(0, 50_000, 1.0), 50_000);
        assert_eq!(value_at(100, 100, 0.5), 100);
        assert_eq!(value_at(50_000, 45_000, 1.0), 45_000);
    }

    #[test]
    fn test_sample_monotone_toward_end() {
        let anim = CountAnimation::new(0, 10_000, Duration::from_millis(2500));
        let mut prev = -1;
        for ms in (0..=2500).step_by(50) {
            let (v, _) = anim.sample(Duration::from_millis(ms));
            assert!(v >= prev, "displayed value regressed at {}ms", ms);
            prev = v;
        }
        let (v, done) = anim.sample(Duration::from_millis(2500));
        assert_eq!(v, 10_000);
        assert!(done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_reaches_end_and_stops() {
        let seen = Arc::new(AtomicI64::new(-1));
        let seen2 = seen.clone();
        let mut animator = CounterAnimator::new();
        animator.retarget(0, 1000, Duration::from_millis(200), move |v, _done| {
            seen2.store(v, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1000);
        assert!(!animator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retarget_abandons_previous_run() {
        let seen = Arc::new(AtomicI64::new(0));
        let mut animator = CounterAnimator::new();
        let s1 = seen.clone();
        animator.retarget(0, 1_000_000, Duration::from_secs(10), move |v, _| {
            s1.store(v, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let mid = seen.load(Ordering::SeqCst);
        // New animation picks up from the last displayed value
        let s2 = seen.clone();
        animator.retarget(mid, mid + 10, Duration::from_millis(50), move |v, _| {
            s2.store(v, Ordering::SeqCst);
        });
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(seen.load(Ordering::SeqCst), mid + 10);
        assert!(!animator.is_running());
    }

    #[tokio::test]
    async fn test_equal_start_end_is_noop() {
        let mut animator = CounterAnimator::new();
        animator.retarget(5, 5, Duration::from_millis(100), |_, _| {
            panic!("frame must not fire when start == end");
        });
        assert!(!animator.is_running());
    }
}
