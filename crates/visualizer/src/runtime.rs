use std::time::{Duration, Instant};

/// Caps the render loop at a target frame rate.
///
/// The window loop asks [`FrameScheduler::ready_for_frame`] whenever winit is
/// about to wait and otherwise parks until [`FrameScheduler::next_deadline`].
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FrameScheduler {
    /// `None` or a non-positive rate renders on every wakeup.
    pub fn new(target_fps: Option<f32>) -> Self {
        let interval = target_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)));
        Self {
            interval,
            last_frame: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match self.next_deadline() {
            Some(deadline) => now >= deadline,
            None => true,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let interval = self.interval?;
        self.last_frame.map(|last| last + interval)
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}

/// Measures the time between consecutive frames.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_tick: Option<Instant>,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick; zero on the first tick.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let delta = self
            .last_tick
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_tick = Some(now);
        self.frames = self.frames.saturating_add(1);
        delta
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Rolling frames-per-second counter used for debug stats.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Records a frame, returning the new rate once per elapsed second.
    pub fn record(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        self.fps = self.frames as f32 / elapsed.as_secs_f32();
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_is_always_ready() {
        let scheduler = FrameScheduler::new(Some(60.0));
        assert!(scheduler.ready_for_frame(Instant::now()));
        assert!(scheduler.next_deadline().is_none());
    }

    #[test]
    fn waits_one_interval_between_frames() {
        let mut scheduler = FrameScheduler::new(Some(50.0));
        let start = Instant::now();
        scheduler.mark_rendered(start);

        assert_eq!(scheduler.next_deadline(), Some(start + Duration::from_millis(20)));
        assert!(!scheduler.ready_for_frame(start + Duration::from_millis(10)));
        assert!(scheduler.ready_for_frame(start + Duration::from_millis(20)));
        assert!(scheduler.ready_for_frame(start + Duration::from_millis(35)));
    }

    #[test]
    fn uncapped_scheduler_never_waits() {
        for fps in [None, Some(0.0), Some(-5.0), Some(f32::NAN)] {
            let mut scheduler = FrameScheduler::new(fps);
            let now = Instant::now();
            scheduler.mark_rendered(now);
            assert!(scheduler.interval().is_none());
            assert!(scheduler.ready_for_frame(now));
            assert!(scheduler.next_deadline().is_none());
        }
    }

    #[test]
    fn reset_clears_deadline() {
        let mut scheduler = FrameScheduler::new(Some(10.0));
        let now = Instant::now();
        scheduler.mark_rendered(now);
        scheduler.reset();
        assert!(scheduler.ready_for_frame(now));
    }

    #[test]
    fn clock_reports_deltas() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        assert_eq!(clock.tick(start), 0.0);
        let delta = clock.tick(start + Duration::from_millis(250));
        assert!((delta - 0.25).abs() < 1e-6);
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let start = Instant::now();
        let mut counter = FpsCounter::new(start);
        for frame in 1..30 {
            assert!(counter
                .record(start + Duration::from_millis(frame * 30))
                .is_none());
        }
        let fps = counter
            .record(start + Duration::from_millis(1000))
            .expect("rate after one second");
        assert!((fps - 30.0).abs() < 1e-3);
        assert_eq!(counter.fps(), fps);
    }
}
