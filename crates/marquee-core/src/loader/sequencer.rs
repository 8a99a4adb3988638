use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::LoaderConfig;
use crate::host::PageHost;
use crate::lifecycle::PageLifecycle;

use super::progress::LoaderState;

/// How a loader run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoaderOutcome {
    /// The overlay played. `timed_out` is set when the hard ceiling fired
    /// before window-load and content readiness were both observed.
    Played { timed_out: bool },
    /// Revisit within the session: content revealed without the overlay
    Skipped { timed_out: bool },
    /// Another run already owns this page
    AlreadyStarted,
}

/// Drives the loader overlay from mount to page-ready
pub struct LoaderSequencer<R = StdRng> {
    config: LoaderConfig,
    host: Arc<dyn PageHost>,
    lifecycle: Arc<PageLifecycle>,
    rng: R,
}

impl LoaderSequencer<StdRng> {
    pub fn new(config: LoaderConfig, host: Arc<dyn PageHost>, lifecycle: Arc<PageLifecycle>) -> Self {
        Self::with_rng(config, host, lifecycle, StdRng::from_entropy())
    }
}

impl<R: Rng + Send> LoaderSequencer<R> {
    /// Use a specific random source for the simulated progress
    pub fn with_rng(
        config: LoaderConfig,
        host: Arc<dyn PageHost>,
        lifecycle: Arc<PageLifecycle>,
        rng: R,
    ) -> Self {
        Self {
            config,
            host,
            lifecycle,
            rng,
        }
    }

    /// Run the whole sequence. Call once document-ready has fired.
    pub async fn run(mut self) -> LoaderOutcome {
        if !self.lifecycle.claim_loader() {
            debug!("Loader already running on this page, ignoring start");
            return LoaderOutcome::AlreadyStarted;
        }

        if self.lifecycle.session().loader_already_played(Utc::now()) {
            info!("Loader already played this session, revealing content");
            self.reveal();
            let timed_out = self.await_content_only().await;
            self.lifecycle.announce_ready();
            return LoaderOutcome::Skipped { timed_out };
        }

        self.host.set_page_scroll(false);
        self.host.mount_loader();

        let mut state = LoaderState::new(&self.config);
        self.render(&state);

        let timed_out = self.simulate_until_gates(&mut state).await;

        state.begin_completing();
        debug!(progress = state.displayed(), "Loader gates satisfied, completing");
        self.complete(&mut state).await;

        self.host.collapse_loader();
        sleep(Duration::from_millis(self.config.collapse_grace_ms)).await;
        self.host.remove_loader();

        self.reveal();
        self.lifecycle.session().mark_loader_played(Utc::now());
        self.lifecycle.announce_ready();

        info!(timed_out, "Loader finished");
        LoaderOutcome::Played { timed_out }
    }

    /// Tick the synthetic progress until both gates fire or the ceiling expires.
    /// The simulation timer is dropped on return, so it cannot race the completion timer.
    async fn simulate_until_gates(&mut self, state: &mut LoaderState) -> bool {
        let window = self.lifecycle.window_loaded.clone();
        let content = self.lifecycle.content_loaded.clone();
        let gates = async move {
            tokio::join!(window.when_ready(), content.when_ready());
        };
        tokio::pin!(gates);

        let ceiling = sleep(Duration::from_millis(self.config.fallback_timeout_ms));
        tokio::pin!(ceiling);

        let mut ticker = interval(Duration::from_millis(self.config.simulate_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the first tick (fires immediately)
        ticker.tick().await;

        let max_step = self.config.simulate_max_step.max(0.0);

        loop {
            tokio::select! {
                biased;

                _ = &mut gates => return false,

                _ = &mut ceiling => {
                    warn!(
                        window_loaded = self.lifecycle.window_loaded.is_resolved(),
                        content_loaded = self.lifecycle.content_loaded.is_resolved(),
                        "Loader gates did not resolve in {}ms, forcing completion",
                        self.config.fallback_timeout_ms
                    );
                    return true;
                }

                _ = ticker.tick() => {
                    let step = self.rng.gen_range(0.0..=max_step);
                    if state.simulate_tick(step) {
                        self.render(state);
                    }
                }
            }
        }
    }

    async fn complete(&self, state: &mut LoaderState) {
        let mut ticker = interval(Duration::from_millis(self.config.complete_interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let done = state.complete_tick();
            self.render(state);
            if done {
                break;
            }
        }
    }

    async fn await_content_only(&self) -> bool {
        let limit = Duration::from_millis(self.config.fallback_timeout_ms);
        match timeout(limit, self.lifecycle.content_loaded.when_ready()).await {
            Ok(()) => false,
            Err(_) => {
                warn!("Content did not resolve in {}ms, continuing", limit.as_millis());
                true
            }
        }
    }

    fn render(&self, state: &LoaderState) {
        self.host.render_progress(&state.label(), state.scale());
    }

    fn reveal(&self) {
        self.host.reveal_main_content();
        self.host.set_page_scroll(true);
    }
}
