use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;
const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;
/// Frames longer than this are logged; physics still advances one unit step.
pub const LONG_FRAME_MS: f64 = 250.0;

/// Monotonic millisecond timestamps relative to process start, the same unit
/// the frame ticks and input handlers receive.
pub struct HostClock {
    origin: Instant,
}

impl HostClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for HostClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame timing statistics for diagnostics.
pub struct FrameClock {
    pub frame_count: u64,
    pub last_elapsed_ms: f64,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            last_elapsed_ms: 0.0,
            fps_samples: [NOMINAL_FRAME_MS; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: NOMINAL_FRAME_MS,
        }
    }

    pub fn record_frame(&mut self, elapsed_ms: f64) {
        if elapsed_ms > LONG_FRAME_MS {
            log::warn!("Frame took {elapsed_ms:.1}ms (physics steps once per frame regardless)");
        }

        self.last_elapsed_ms = elapsed_ms;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = elapsed_ms.max(0.0);
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_ms: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_ms;
        self.smoothed_fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_clock_reports_nominal_rate() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame_count, 0);
        assert!((clock.smoothed_fps - 60.0).abs() < 1e-9);
    }

    #[test]
    fn record_frame_counts_and_tracks_elapsed() {
        let mut clock = FrameClock::new();
        clock.record_frame(20.0);
        clock.record_frame(10.0);
        assert_eq!(clock.frame_count, 2);
        assert_eq!(clock.last_elapsed_ms, 10.0);
    }

    #[test]
    fn smoothing_converges_to_steady_rate() {
        let mut clock = FrameClock::new();
        for _ in 0..FPS_SAMPLE_COUNT {
            clock.record_frame(25.0);
        }
        assert!((clock.smoothed_frame_time_ms - 25.0).abs() < 1e-9);
        assert!((clock.smoothed_fps - 40.0).abs() < 1e-9);
    }

    #[test]
    fn host_clock_is_monotonic() {
        let clock = HostClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(a >= 0.0);
        assert!(b >= a);
    }
}
