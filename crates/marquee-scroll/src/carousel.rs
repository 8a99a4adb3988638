//! L2 Organism Layer: Inertial carousel engine
//!
//! State machine `Uninitialized -> Intro -> Interactive` over a
//! [`TrackSurface`]. The engine is driven from outside: [`CarouselEngine::start`]
//! once content is ready, [`CarouselEngine::frame`] on every display refresh,
//! and [`CarouselEngine::handle_input`] for each window input event.

use std::sync::Arc;
use std::time::Duration;

use marquee_core::{PageHost, ScrollLockGuard};
use serde::Serialize;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{CarouselConfig, CarouselConfigExt};
use crate::input::{InputDisposition, InputEvent, TouchTracker};
use crate::intro::IntroTimeline;
use crate::physics::{self, InertiaParams, Motion};
use crate::surface::TrackSurface;
use crate::timing::frames_between;

/// Upper bound on reference frames integrated in one callback, so a stalled
/// tab does not fling the track on resume
const MAX_CATCH_UP_FRAMES: f64 = 4.0;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CarouselError {
    #[error("carousel track has no items")]
    NoItems,

    #[error("carousel track has no measurable width")]
    DegenerateTrack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CarouselPhase {
    Uninitialized,
    Intro,
    Interactive,
    /// Start was attempted on an unusable track
    Disabled,
}

/// Snapshot of the engine for callers and traces
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CarouselState {
    /// Track offset. Lies in `(-scroll_width, 0]` once `locked` is false;
    /// during the intro it follows the intro pose, which starts at the
    /// positive leading margin.
    pub position: f64,
    pub velocity: f64,
    pub locked: bool,
    pub scroll_width: f64,
}

enum Stage {
    Uninitialized,
    Intro {
        timeline: IntroTimeline,
        started_at: Instant,
        // Held for the whole intro; dropping the stage unlocks the page
        _lock: ScrollLockGuard,
    },
    Interactive {
        last_frame: Option<Instant>,
    },
    Disabled,
}

pub struct CarouselEngine<T: TrackSurface> {
    config: CarouselConfig,
    params: InertiaParams,
    frame_duration: Duration,
    track: T,
    host: Arc<dyn PageHost>,
    stage: Stage,
    motion: Motion,
    scroll_width: f64,
    touch: TouchTracker,
}

impl<T: TrackSurface> CarouselEngine<T> {
    pub fn new(config: CarouselConfig, track: T, host: Arc<dyn PageHost>) -> Self {
        Self {
            params: config.inertia(),
            frame_duration: config.frame_duration(),
            config,
            track,
            host,
            stage: Stage::Uninitialized,
            motion: Motion::default(),
            scroll_width: 0.0,
            touch: TouchTracker::default(),
        }
    }

    pub fn phase(&self) -> CarouselPhase {
        match self.stage {
            Stage::Uninitialized => CarouselPhase::Uninitialized,
            Stage::Intro { .. } => CarouselPhase::Intro,
            Stage::Interactive { .. } => CarouselPhase::Interactive,
            Stage::Disabled => CarouselPhase::Disabled,
        }
    }

    pub fn state(&self) -> CarouselState {
        CarouselState {
            position: self.motion.position,
            velocity: self.motion.velocity,
            locked: self.is_locked(),
            scroll_width: self.scroll_width,
        }
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.motion.position
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.motion.velocity
    }

    #[inline]
    pub fn scroll_width(&self) -> f64 {
        self.scroll_width
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        matches!(self.stage, Stage::Intro { .. })
    }

    pub fn track(&self) -> &T {
        &self.track
    }

    /// Initialize the track and begin the intro. Only the first call does anything.
    pub fn start(&mut self, now: Instant) -> Result<(), CarouselError> {
        if !matches!(self.stage, Stage::Uninitialized) {
            debug!("Carousel already initialized");
            return Ok(());
        }

        if self.track.item_count() == 0 {
            warn!("Carousel track has no items, not starting");
            self.stage = Stage::Disabled;
            return Err(CarouselError::NoItems);
        }

        self.track.duplicate_items();
        let scroll_width = self.track.track_width() / 2.0;
        if !scroll_width.is_finite() || scroll_width <= 0.0 {
            warn!(scroll_width, "Carousel track has no width, not starting");
            self.stage = Stage::Disabled;
            return Err(CarouselError::DegenerateTrack);
        }
        self.scroll_width = scroll_width;

        let initial_offset = self.track.first_item_margin_right();
        self.motion = Motion::new(initial_offset, 0.0);
        self.track.set_offset(initial_offset);
        self.track.set_clip_height(Some(self.track.first_item_height()));
        self.track.prepare_items();

        let lock = ScrollLockGuard::acquire(Arc::clone(&self.host));
        self.stage = Stage::Intro {
            timeline: IntroTimeline::new(&self.config, scroll_width, initial_offset),
            started_at: now,
            _lock: lock,
        };

        info!(
            items = self.track.item_count(),
            scroll_width, "Carousel intro scheduled"
        );
        Ok(())
    }

    /// Advance one display refresh
    pub fn frame(&mut self, now: Instant) {
        match &mut self.stage {
            Stage::Uninitialized | Stage::Disabled => {}
            Stage::Intro {
                timeline,
                started_at,
                ..
            } => {
                let pose = timeline.pose_at(now.saturating_duration_since(*started_at));
                self.track.set_items_scale_y(pose.scale_y);
                self.track.set_offset(pose.offset);
                self.motion.position = pose.offset;
                if pose.finished {
                    self.finish_intro(now);
                }
            }
            Stage::Interactive { last_frame } => {
                let frames = match last_frame {
                    Some(previous) if self.config.normalize_frame_rate => {
                        frames_between(*previous, now, self.frame_duration)
                            .min(MAX_CATCH_UP_FRAMES)
                    }
                    _ => 1.0,
                };
                *last_frame = Some(now);

                if !physics::is_moving(self.motion.velocity, &self.params) {
                    return;
                }
                self.motion = physics::advance(self.motion, self.scroll_width, &self.params, frames);
                self.track.set_offset(self.motion.position);
            }
        }
    }

    fn finish_intro(&mut self, now: Instant) {
        self.motion = Motion::new(
            physics::wrap_position(self.motion.position, self.scroll_width),
            0.0,
        );
        self.track.set_offset(self.motion.position);
        self.track.set_items_scale_y(1.0);
        self.track.set_clip_height(None);
        // Replacing the intro stage drops the scroll lock
        self.stage = Stage::Interactive {
            last_frame: Some(now),
        };
        info!(position = self.motion.position, "Carousel intro complete");
    }

    /// React to a window input event. `page_scroll_y` is the vertical page
    /// scroll offset at the time of the event.
    pub fn handle_input(&mut self, event: InputEvent, page_scroll_y: f64) -> InputDisposition {
        match self.stage {
            Stage::Intro { .. } => Self::blocked_during_intro(event),
            Stage::Interactive { .. } => self.interact(event, page_scroll_y),
            Stage::Uninitialized | Stage::Disabled => InputDisposition::Default,
        }
    }

    fn blocked_during_intro(event: InputEvent) -> InputDisposition {
        match event {
            InputEvent::Wheel { .. } | InputEvent::TouchMove { .. } => {
                InputDisposition::PreventDefault
            }
            InputEvent::Key(key) if key.scrolls_page() => InputDisposition::PreventDefault,
            InputEvent::Key(_) | InputEvent::TouchStart { .. } => InputDisposition::Default,
        }
    }

    fn interact(&mut self, event: InputEvent, page_scroll_y: f64) -> InputDisposition {
        match event {
            InputEvent::Wheel { delta_y } => {
                self.motion.velocity += physics::wheel_impulse(delta_y, &self.params);
                InputDisposition::Default
            }
            InputEvent::TouchStart { y } => {
                // A finger on the track catches it
                self.touch.start(y);
                self.motion.velocity = 0.0;
                InputDisposition::Default
            }
            InputEvent::TouchMove { y } => {
                if let Some(delta) = self.touch.drag(y) {
                    self.motion.velocity += physics::touch_impulse(delta, &self.params);
                }
                if page_scroll_y <= 0.0 && self.touch.is_dragging_down() {
                    InputDisposition::PreventDefault
                } else {
                    InputDisposition::Default
                }
            }
            InputEvent::Key(_) => InputDisposition::Default,
        }
    }
}

impl<T: TrackSurface> std::fmt::Debug for CarouselEngine<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselEngine")
            .field("phase", &self.phase())
            .field("state", &self.state())
            .finish()
    }
}
