//! L3 Molecular Layer: Carousel intro timeline
//!
//! The intro is a fixed timeline measured from carousel start: a delay, then
//! a translation of the track by `intro_distance_factor * scroll_width` while
//! the items grow from zero height. [`IntroTimeline::pose_at`] is a pure
//! function of elapsed time, so frames can be sampled at any rate.

use std::time::Duration;

use crate::config::{CarouselConfig, CarouselConfigExt, EasingType};
use crate::easing::EasingTypeExt;
use crate::physics::loop_modifier;
use crate::timing::{lerp, progress};

/// Track state at one point of the intro
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntroPose {
    /// Horizontal offset to apply to the track
    pub offset: f64,
    /// Vertical scale of the items
    pub scale_y: f64,
    /// Both the translation and the reveal have ended
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntroTimeline {
    scroll_width: f64,
    initial_offset: f64,
    distance: f64,
    delay: Duration,
    duration: Duration,
    reveal_duration: Duration,
    easing: EasingType,
}

impl IntroTimeline {
    pub fn new(config: &CarouselConfig, scroll_width: f64, initial_offset: f64) -> Self {
        Self {
            scroll_width,
            initial_offset,
            distance: config.intro_distance_factor * scroll_width,
            delay: config.intro_delay(),
            duration: config.intro_duration(),
            reveal_duration: config.reveal_duration(),
            easing: config.intro_easing,
        }
    }

    /// Time from start until the timeline has fully played
    pub fn total(&self) -> Duration {
        self.delay + self.duration.max(self.reveal_duration)
    }

    pub fn pose_at(&self, elapsed: Duration) -> IntroPose {
        let Some(run) = elapsed.checked_sub(self.delay) else {
            return IntroPose {
                offset: self.initial_offset,
                scale_y: 0.0,
                finished: false,
            };
        };

        let travel = self.easing.apply(progress(run, self.duration));
        let raw = lerp(self.initial_offset, self.initial_offset - self.distance, travel);
        let scale_y = self.easing.apply(progress(run, self.reveal_duration));

        IntroPose {
            offset: loop_modifier(raw, self.scroll_width),
            scale_y,
            finished: run >= self.duration && run >= self.reveal_duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f64 = 1296.0;
    const MARGIN: f64 = 24.0;

    fn timeline() -> IntroTimeline {
        IntroTimeline::new(&CarouselConfig::default(), WIDTH, MARGIN)
    }

    #[test]
    fn test_waits_out_the_delay() {
        let intro = timeline();
        let pose = intro.pose_at(Duration::from_millis(1999));
        assert_eq!(pose.offset, MARGIN);
        assert_eq!(pose.scale_y, 0.0);
        assert!(!pose.finished);
    }

    #[test]
    fn test_first_frame_keeps_margin() {
        let pose = timeline().pose_at(Duration::from_millis(2000));
        assert_eq!(pose.offset, MARGIN);
        assert_eq!(pose.scale_y, 0.0);
    }

    #[test]
    fn test_reveal_finishes_before_translation() {
        let intro = timeline();
        let pose = intro.pose_at(Duration::from_millis(3000));
        assert!((pose.scale_y - 1.0).abs() < 1e-12);
        assert!(!pose.finished);
    }

    #[test]
    fn test_final_pose() {
        let intro = timeline();
        assert_eq!(intro.total(), Duration::from_millis(4000));

        let pose = intro.pose_at(intro.total());
        assert!(pose.finished);
        // 24 - 1.5 * 1296 = -1920, truncated into the duplicated range
        assert!((pose.offset - (-624.0)).abs() < 1e-9);
    }

    #[test]
    fn test_offset_never_leaves_duplicated_range() {
        let intro = timeline();
        for ms in (0..=4500).step_by(16) {
            let pose = intro.pose_at(Duration::from_millis(ms));
            assert!(pose.offset > -WIDTH && pose.offset < WIDTH, "at {}ms: {}", ms, pose.offset);
        }
    }
}
