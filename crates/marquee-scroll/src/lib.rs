//! Inertial infinite-loop carousel for Marquee
//!
//! # Architecture
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing curves (cubic, quintic, exponential)
//! - `timing` - Time calculation utilities (progress, interpolation, frame counts)
//! - `config` - Configuration types and derived values (re-exported from marquee-core)
//! - `physics` - Velocity decay and wraparound as pure functions
//!
//! ## L3 Molecular Layer
//! - `intro` - The locked intro timeline
//! - `input` - Window input classification
//! - `surface` - The track seam and its headless implementation
//!
//! ## L2 Organism Layer
//! - `carousel` - The engine state machine
//! - `driver` - Frame driver feeding the engine

// L4 Atomic Layer
pub mod config;
pub mod easing;
pub mod physics;
pub mod timing;

// L3 Molecular Layer
pub mod input;
pub mod intro;
pub mod surface;

// L2 Organism Layer
pub mod carousel;
pub mod driver;

pub use carousel::{CarouselEngine, CarouselError, CarouselPhase, CarouselState};
pub use config::{CarouselConfig, CarouselConfigExt, EasingType};
pub use driver::{run_carousel, FrameDriver, IntervalFrames};
pub use easing::EasingTypeExt;
pub use input::{InputDisposition, InputEvent, ScrollKey};
pub use physics::{InertiaParams, Motion};
pub use surface::{HeadlessTrack, TrackSurface};
