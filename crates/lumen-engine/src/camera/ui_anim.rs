/// Frame counter for the raycaster's on-screen weapon sprite.
///
/// Idle at `first_frame`; a trigger starts playback, frames advance at `fps`
/// and passing `last_frame` stops the animation back at `first_frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct UiAnimation {
    first_frame: u32,
    last_frame: u32,
    fps: f32,
    current: u32,
    playing: bool,
    timer: f32,
}

impl Default for UiAnimation {
    fn default() -> Self {
        Self::new(17, 23, 6.0)
    }
}

impl UiAnimation {
    pub fn new(first_frame: u32, last_frame: u32, fps: f32) -> Self {
        let last_frame = last_frame.max(first_frame);
        Self {
            first_frame,
            last_frame,
            fps: fps.max(f32::MIN_POSITIVE),
            current: first_frame,
            playing: false,
            timer: 0.0,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn update(&mut self, trigger: bool, dt: f32) {
        if trigger && !self.playing {
            self.playing = true;
            self.current = self.first_frame;
            self.timer = 0.0;
        }
        if !self.playing {
            return;
        }

        let frame_time = 1.0 / self.fps;
        self.timer += dt.max(0.0);
        while self.timer >= frame_time {
            self.timer -= frame_time;
            self.current += 1;
            if self.current > self.last_frame {
                self.current = self.first_frame;
                self.playing = false;
                self.timer = 0.0;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 6.0 + 1e-4;

    #[test]
    fn idle_without_trigger() {
        let mut anim = UiAnimation::default();
        anim.update(false, 1.0);
        assert_eq!(anim.current(), 17);
        assert!(!anim.is_playing());
    }

    #[test]
    fn trigger_advances_one_frame_per_tick() {
        let mut anim = UiAnimation::default();
        anim.update(true, 0.0);
        assert!(anim.is_playing());
        anim.update(false, FRAME);
        assert_eq!(anim.current(), 18);
        anim.update(false, FRAME);
        assert_eq!(anim.current(), 19);
    }

    #[test]
    fn passing_last_frame_wraps_and_stops() {
        let mut anim = UiAnimation::default();
        anim.update(true, 0.0);
        for _ in 0..7 {
            anim.update(false, FRAME);
            assert!((17..=23).contains(&anim.current()));
        }
        assert_eq!(anim.current(), 17);
        assert!(!anim.is_playing());
    }

    #[test]
    fn large_dt_never_escapes_range() {
        let mut anim = UiAnimation::new(2, 4, 10.0);
        anim.update(true, 100.0);
        assert_eq!(anim.current(), 2);
        assert!(!anim.is_playing());
    }
}
