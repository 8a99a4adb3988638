//! Property-based tests for the carousel physics and engine.

use std::sync::Arc;
use std::time::Duration;

use marquee_core::HeadlessPage;
use marquee_scroll::physics::{self, wrap_position, InertiaParams, Motion};
use marquee_scroll::{CarouselConfig, CarouselEngine, HeadlessTrack, InputEvent};
use proptest::prelude::*;
use tokio::time::Instant;
use url::Url;

fn in_range(position: f64, scroll_width: f64) -> bool {
    position > -scroll_width && position <= 0.0
}

proptest! {
    #[test]
    fn wrap_lands_in_range(position in -1.0e7f64..1.0e7, scroll_width in 1.0f64..5000.0) {
        let wrapped = wrap_position(position, scroll_width);
        prop_assert!(in_range(wrapped, scroll_width), "{} -> {}", position, wrapped);
    }

    #[test]
    fn position_stays_wrapped_under_large_impulses(
        impulses in prop::collection::vec(-5.0e5f64..5.0e5, 1..20),
        scroll_width in 50.0f64..4000.0,
        start in 0.0f64..1.0,
    ) {
        let params = InertiaParams::default();
        let mut motion = Motion::new(-start * scroll_width, 0.0);

        for impulse in impulses {
            motion.velocity += impulse;
            for _ in 0..30 {
                motion = physics::step(motion, scroll_width, &params);
                prop_assert!(in_range(motion.position, scroll_width));
            }
        }
    }

    #[test]
    fn velocity_settles_within_bound(v0 in -1.0e6f64..1.0e6, decay in 0.5f64..0.99) {
        let params = InertiaParams { decay, ..InertiaParams::default() };
        let bound = physics::settle_bound(v0, &params);

        let mut motion = Motion::new(0.0, v0);
        for _ in 0..bound {
            motion = physics::step(motion, 1200.0, &params);
        }
        prop_assert!(!physics::is_moving(motion.velocity, &params));
    }

    #[test]
    fn fractional_frames_stay_wrapped(
        velocity in -2.0e4f64..2.0e4,
        frames in 0.1f64..4.0,
        scroll_width in 50.0f64..4000.0,
    ) {
        let params = InertiaParams::default();
        let motion = physics::advance(Motion::new(0.0, velocity), scroll_width, &params, frames);
        prop_assert!(in_range(motion.position, scroll_width));
        prop_assert!(motion.velocity.abs() <= velocity.abs());
    }

    #[test]
    fn engine_keeps_track_wrapped(
        deltas in prop::collection::vec(-3000.0f64..3000.0, 1..30),
        item_width in 100.0f64..600.0,
        count in 1usize..8,
    ) {
        let host = Arc::new(HeadlessPage::new(Url::parse("https://studio.test/").unwrap()));
        let track = HeadlessTrack::uniform(count, item_width, 24.0, 400.0);
        let mut engine = CarouselEngine::new(CarouselConfig::default(), track, host);

        let t0 = Instant::now();
        engine.start(t0).unwrap();
        let mut now = t0 + Duration::from_millis(4000);
        engine.frame(now);
        prop_assert!(!engine.is_locked());

        for delta in deltas {
            engine.handle_input(InputEvent::Wheel { delta_y: delta }, 0.0);
            for _ in 0..5 {
                now += Duration::from_millis(16);
                engine.frame(now);
                let state = engine.state();
                prop_assert!(in_range(state.position, state.scroll_width));
                prop_assert_eq!(engine.track().offset(), state.position);
            }
        }
    }
}
