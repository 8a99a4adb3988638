//! Frame driver for the carousel
//!
//! A browser binding drives the engine from `requestAnimationFrame`; here a
//! [`FrameDriver`] yields one timestamp per display refresh and
//! [`run_carousel`] feeds them to the engine until shutdown.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use marquee_core::{Notification, PageLifecycle};
use tokio::sync::watch;
use tokio::time::{interval, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::carousel::{CarouselEngine, CarouselError};
use crate::surface::TrackSurface;

pub trait FrameDriver: Send {
    /// Wait for the next display refresh
    fn next_frame(&mut self) -> impl Future<Output = Instant> + Send;
}

/// Fixed-rate frames from a tokio interval
#[derive(Debug)]
pub struct IntervalFrames {
    ticker: Interval,
}

impl IntervalFrames {
    pub fn new(frame: Duration) -> Self {
        let mut ticker = interval(frame);
        // A late frame is drawn late rather than followed by a burst
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { ticker }
    }
}

impl FrameDriver for IntervalFrames {
    async fn next_frame(&mut self) -> Instant {
        self.ticker.tick().await
    }
}

/// Start the carousel on content-ready, then run one engine frame per
/// display refresh until `shutdown` flips to true.
///
/// Returns early with the start error when the track is unusable.
pub async fn run_carousel<T, F>(
    engine: Arc<Mutex<CarouselEngine<T>>>,
    lifecycle: Arc<PageLifecycle>,
    mut frames: F,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), CarouselError>
where
    T: TrackSurface,
    F: FrameDriver,
{
    tokio::select! {
        _ = lifecycle.wait_for(Notification::ContentReady) => {}
        _ = async { shutdown.wait_for(|stop| *stop).await.is_ok() } => {
            debug!("Carousel shut down before content was ready");
            return Ok(());
        }
    }

    engine
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .start(Instant::now())?;

    loop {
        tokio::select! {
            result = shutdown.changed() => {
                if result.is_err() || *shutdown.borrow() {
                    info!("Carousel frame loop stopped");
                    break;
                }
            }

            now = frames.next_frame() => {
                engine
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .frame(now);
            }
        }
    }

    Ok(())
}
