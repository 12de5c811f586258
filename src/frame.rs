use std::time::Instant;

pub const FPS_UPDATE_INTERVAL: f32 = 1.0;

/// Frame counter for the host loop, reporting FPS once per interval
pub struct FrameStats {
    frame_number: u64,
    start_time: Instant,
    last_frame_time: Instant,
    window_frames: u32,
    window_time: f32,
    fps: f32,
}

impl FrameStats {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            frame_number: 0,
            start_time: now,
            last_frame_time: now,
            window_frames: 0,
            window_time: 0.0,
            fps: 0.0,
        }
    }

    /// Record a frame that just ran
    pub fn record(&mut self) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        self.frame_number += 1;
        self.accumulate(delta);
    }

    fn accumulate(&mut self, delta: f32) {
        self.window_frames += 1;
        self.window_time += delta;

        if self.window_time >= FPS_UPDATE_INTERVAL {
            self.fps = self.window_frames as f32 / self.window_time;
            log::debug!("FPS: {:.1}", self.fps);
            self.window_frames = 0;
            self.window_time = 0.0;
        }
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Seconds since the counter started
    pub fn elapsed(&self) -> f32 {
        self.start_time.elapsed().as_secs_f32()
    }

    /// Most recent FPS measurement, zero until the first interval completes
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}
