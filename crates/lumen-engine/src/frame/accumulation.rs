/// What the raytracer does with its accumulation buffer this frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AccumulationState {
    /// Buffer cleared, frame index back to 1.
    Reset,
    /// Buffer kept, frame index incremented.
    Accumulating,
}

/// Progressive-sampling frame counter.
///
/// The kernel averages `sum / frame_index`, so the index is the number of
/// samples in the buffer after this frame's dispatch.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    frame_index: u32,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances to the next frame. `moved` is the camera's has-moved flag.
    pub fn advance(&mut self, moved: bool) -> AccumulationState {
        if moved || self.frame_index == 0 {
            self.frame_index = 1;
            AccumulationState::Reset
        } else {
            self.frame_index = self.frame_index.saturating_add(1);
            AccumulationState::Accumulating
        }
    }

    /// Forces a reset on the next frame (scene contents changed).
    pub fn invalidate(&mut self) {
        self.frame_index = 0;
    }

    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Host stand-in for the kernel: one accumulated pixel.
    struct Pixel {
        sum: f32,
    }

    impl Pixel {
        fn step(&mut self, state: AccumulationState, frame_index: u32, sample: f32) -> f32 {
            if state == AccumulationState::Reset {
                self.sum = 0.0;
            }
            self.sum += sample;
            self.sum / frame_index as f32
        }
    }

    #[test]
    fn first_frame_resets() {
        let mut acc = Accumulator::new();
        assert_eq!(acc.advance(false), AccumulationState::Reset);
        assert_eq!(acc.frame_index(), 1);
    }

    #[test]
    fn stationary_frames_increment() {
        let mut acc = Accumulator::new();
        acc.advance(false);
        for k in 2..=10 {
            assert_eq!(acc.advance(false), AccumulationState::Accumulating);
            assert_eq!(acc.frame_index(), k);
        }
    }

    #[test]
    fn movement_resets_to_one() {
        let mut acc = Accumulator::new();
        for _ in 0..5 {
            acc.advance(false);
        }
        assert_eq!(acc.advance(true), AccumulationState::Reset);
        assert_eq!(acc.frame_index(), 1);
        assert_eq!(acc.advance(false), AccumulationState::Accumulating);
        assert_eq!(acc.frame_index(), 2);
    }

    #[test]
    fn invalidate_resets_next_frame() {
        let mut acc = Accumulator::new();
        acc.advance(false);
        acc.advance(false);
        acc.invalidate();
        assert_eq!(acc.advance(false), AccumulationState::Reset);
    }

    #[test]
    fn average_tracks_samples_since_last_reset() {
        let mut acc = Accumulator::new();
        let mut px = Pixel { sum: 0.0 };

        let mut avg = 0.0;
        for sample in [1.0, 3.0, 5.0] {
            let state = acc.advance(false);
            avg = px.step(state, acc.frame_index(), sample);
        }
        assert!((avg - 3.0).abs() < 1e-6);

        let state = acc.advance(true);
        avg = px.step(state, acc.frame_index(), 8.0);
        assert!((avg - 8.0).abs() < 1e-6);
    }
}
