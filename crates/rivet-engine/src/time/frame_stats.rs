use std::collections::VecDeque;

/// Rolling average of frame deltas.
#[derive(Debug, Clone)]
pub struct FrameStats {
    window: usize,
    samples: VecDeque<f32>,
    sum: f32,
}

impl FrameStats {
    /// Averages over the last `window` frames (at least one).
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            samples: VecDeque::with_capacity(window),
            sum: 0.0,
        }
    }

    pub fn push(&mut self, dt: f32) {
        if self.samples.len() == self.window {
            if let Some(old) = self.samples.pop_front() {
                self.sum -= old;
            }
        }
        self.samples.push_back(dt);
        self.sum += dt;
    }

    /// Average frame time in milliseconds; 0 before the first sample.
    pub fn average_ms(&self) -> f32 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum / self.samples.len() as f32 * 1000.0
        }
    }

    pub fn fps(&self) -> f32 {
        let ms = self.average_ms();
        if ms > 0.0 { 1000.0 / ms } else { 0.0 }
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(60)
    }
}
