//! Frame timing for the window title.
//!
//! The simulation itself advances a fixed step per frame, so this only
//! tracks frame counts and a periodically refreshed FPS figure.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Time {
    frame_count: u64,
    fps: f32,
    /// Frame count at the last FPS refresh.
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Time {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Count a frame. Returns `true` when the FPS figure was refreshed.
    pub fn update(&mut self) -> bool {
        self.update_at(Instant::now())
    }

    fn update_at(&mut self, now: Instant) -> bool {
        self.frame_count += 1;

        let since = now.duration_since(self.fps_update_time);
        if since < self.fps_update_interval {
            return false;
        }
        let frames = self.frame_count - self.fps_frame_count;
        self.fps = frames as f32 / since.as_secs_f32();
        self.fps_frame_count = self.frame_count;
        self.fps_update_time = now;
        true
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the last refresh interval.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_refreshes_after_interval() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);

        for i in 1..30 {
            assert!(!time.update_at(start + Duration::from_millis(i * 10)));
        }
        assert!(time.update_at(start + Duration::from_millis(500)));
        assert_eq!(time.frame(), 30);
        assert!((time.fps() - 60.0).abs() < 0.01);
    }

    #[test]
    fn test_new_time_is_zero() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.fps(), 0.0);
    }
}
