//! Headless page bootstrap
//!
//! Wires one page instance the way a browser binding would on
//! document-ready: the loader sequencer, the hero entrance, the carousel
//! frame loop and the transition navigator, all sharing one
//! [`PageLifecycle`].

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use marquee_core::loader::{self, LoaderOutcome, LoaderSequencer};
use marquee_core::transition::{ClickOutcome, ElementId, TransitionLink};
use marquee_core::{
    AppConfig, BreakpointWatcher, HeadlessPage, PageHost, PageLifecycle, SessionStore,
    TransitionNavigator,
};
use marquee_scroll::{
    run_carousel, CarouselConfigExt, CarouselEngine, CarouselState, HeadlessTrack,
    InputDisposition, InputEvent, IntervalFrames, ScrollKey,
};

type SharedEngine = Arc<Mutex<CarouselEngine<HeadlessTrack>>>;

pub struct Page {
    host: Arc<HeadlessPage>,
    lifecycle: Arc<PageLifecycle>,
    navigator: Arc<TransitionNavigator>,
    carousel: SharedEngine,
    breakpoints: Mutex<BreakpointWatcher>,
    page_scroll_y: f64,
    shutdown: watch::Sender<bool>,
    loader: JoinHandle<LoaderOutcome>,
    background: Vec<JoinHandle<()>>,
}

impl Page {
    /// Boot a page at `url` with a viewport `width` px wide. Must run inside
    /// a tokio runtime.
    pub fn boot(
        config: &AppConfig,
        url: Url,
        width: u32,
        session: SessionStore,
        track: HeadlessTrack,
        links: &[TransitionLink],
    ) -> Self {
        let host = Arc::new(HeadlessPage::new(url));
        let page_host: Arc<dyn PageHost> = host.clone();
        let lifecycle = PageLifecycle::new(session);

        let loader = tokio::spawn(
            LoaderSequencer::new(config.loader.clone(), page_host.clone(), lifecycle.clone()).run(),
        );

        let mut background = vec![tokio::spawn(loader::play_entrance(
            lifecycle.clone(),
            page_host.clone(),
        ))];

        let carousel: SharedEngine = Arc::new(Mutex::new(CarouselEngine::new(
            config.carousel.clone(),
            track,
            page_host.clone(),
        )));
        let (shutdown, shutdown_rx) = watch::channel(false);
        let frames = IntervalFrames::new(config.carousel.frame_duration());
        let frame_loop = run_carousel(carousel.clone(), lifecycle.clone(), frames, shutdown_rx);
        background.push(tokio::spawn(async move {
            if let Err(e) = frame_loop.await {
                warn!("Carousel disabled: {}", e);
            }
        }));

        let navigator =
            TransitionNavigator::new(config.transition.clone(), page_host, lifecycle.clone());
        let attached = navigator.attach(links);
        debug!(attached, "Transition links attached");

        Self {
            host,
            lifecycle,
            navigator,
            carousel,
            breakpoints: Mutex::new(BreakpointWatcher::new(config.breakpoints.clone(), width)),
            page_scroll_y: 0.0,
            shutdown,
            loader,
            background,
        }
    }

    pub fn host(&self) -> &HeadlessPage {
        &self.host
    }

    pub fn lifecycle(&self) -> &Arc<PageLifecycle> {
        &self.lifecycle
    }

    pub fn carousel_state(&self) -> CarouselState {
        self.engine().state()
    }

    /// Vertical page scroll offset reported with touch events
    pub fn set_page_scroll_y(&mut self, y: f64) {
        self.page_scroll_y = y;
    }

    pub fn wheel(&self, delta_y: f64) -> InputDisposition {
        self.input(InputEvent::Wheel { delta_y })
    }

    /// A vertical swipe from `from_y` to `to_y` in `steps` touch-move events
    pub fn swipe(&self, from_y: f64, to_y: f64, steps: u32) -> InputDisposition {
        let mut disposition = self.input(InputEvent::TouchStart { y: from_y });
        let steps = steps.max(1);
        for i in 1..=steps {
            let y = from_y + (to_y - from_y) * f64::from(i) / f64::from(steps);
            disposition = self.input(InputEvent::TouchMove { y });
        }
        disposition
    }

    pub fn key(&self, key: ScrollKey) -> InputDisposition {
        self.input(InputEvent::Key(key))
    }

    pub fn click(&self, element: ElementId) -> ClickOutcome {
        self.navigator.click(element)
    }

    /// Viewport resize; returns the reload target when the breakpoint class changed
    pub fn resize(&self, width: u32) -> Option<Url> {
        self.breakpoints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle_resize(width, &self.lifecycle, self.host.as_ref())
    }

    /// Back/forward cache restore
    pub fn restore(&self) {
        self.navigator.on_page_restored();
    }

    /// Stop the frame loop and wait for the loader to settle
    pub async fn close(self) -> Result<LoaderOutcome> {
        // The receiver may already be gone when the carousel was disabled
        let _ = self.shutdown.send(true);
        let outcome = self.loader.await.context("loader task failed")?;
        for task in self.background {
            task.abort();
            let _ = task.await;
        }
        Ok(outcome)
    }

    fn input(&self, event: InputEvent) -> InputDisposition {
        self.lifecycle.note_activity();
        self.engine().handle_input(event, self.page_scroll_y)
    }

    fn engine(&self) -> std::sync::MutexGuard<'_, CarouselEngine<HeadlessTrack>> {
        self.carousel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use marquee_core::host::HostEvent;
    use marquee_scroll::CarouselPhase;
    use tokio::time::sleep;

    fn boot(session: SessionStore) -> Page {
        let config = AppConfig::default();
        let links = [
            TransitionLink::new(1, "/work"),
            TransitionLink::new(2, "https://studio.test/about"),
        ];
        Page::boot(
            &config,
            Url::parse("https://studio.test/").expect("valid url"),
            1280,
            session,
            HeadlessTrack::uniform(6, 320.0, 24.0, 440.0),
            &links,
        )
    }

    fn fresh_session() -> SessionStore {
        SessionStore::in_memory(Duration::from_secs(300))
    }

    fn resolve_gates(page: &Page) {
        page.lifecycle().window_loaded.resolve();
        page.lifecycle().content_loaded.resolve();
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_visit_plays_loader_then_carousel() {
        let page = boot(fresh_session());
        sleep(Duration::from_millis(500)).await;
        resolve_gates(&page);

        while !page.lifecycle().is_page_ready() {
            sleep(Duration::from_millis(50)).await;
        }
        assert!(page.host().contains(&HostEvent::ContentRevealed));

        sleep(Duration::from_millis(100)).await;
        assert!(page.carousel_state().locked);
        assert_eq!(
            page.wheel(120.0),
            InputDisposition::PreventDefault
        );

        sleep(Duration::from_millis(4100)).await;
        assert!(!page.carousel_state().locked);
        assert!(!page.host().is_scroll_locked());

        page.wheel(300.0);
        sleep(Duration::from_millis(100)).await;
        let state = page.carousel_state();
        assert!(state.position > -state.scroll_width && state.position <= 0.0);

        let outcome = page.close().await.expect("close");
        assert_eq!(outcome, LoaderOutcome::Played { timed_out: false });
    }

    #[tokio::test(start_paused = true)]
    async fn test_revisit_skips_loader() {
        let session = fresh_session();
        session.mark_loader_played(chrono::Utc::now());

        let page = boot(session);
        resolve_gates(&page);
        let outcome = page.close().await.expect("close");
        assert_eq!(outcome, LoaderOutcome::Skipped { timed_out: false });
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_navigates_after_page_ready() {
        let page = boot(fresh_session());
        assert_eq!(page.click(1), ClickOutcome::NotReady { prevent_default: false });

        resolve_gates(&page);
        while !page.lifecycle().is_page_ready() {
            sleep(Duration::from_millis(50)).await;
        }

        let outcome = page.click(1);
        assert!(matches!(outcome, ClickOutcome::Started { .. }));
        assert_eq!(page.click(2), ClickOutcome::Ignored);
        sleep(Duration::from_millis(1100)).await;
        assert_eq!(page.host().navigations(), vec!["https://studio.test/work".to_string()]);

        page.close().await.expect("close");
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_reloads_on_class_change() {
        let page = boot(fresh_session());
        assert_eq!(page.resize(1100), None);

        let target = page.resize(900).expect("tablet reload");
        assert!(target.query().is_some_and(|q| q.starts_with("_br=")));
        assert!(!page.lifecycle().session().snapshot().loader_played);

        page.close().await.expect("close");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_track_does_not_block_page() {
        let config = AppConfig::default();
        let page = Page::boot(
            &config,
            Url::parse("https://studio.test/").expect("valid url"),
            1280,
            fresh_session(),
            HeadlessTrack::new(Vec::new(), 24.0, 440.0),
            &[],
        );
        resolve_gates(&page);
        while !page.lifecycle().is_page_ready() {
            sleep(Duration::from_millis(50)).await;
        }
        sleep(Duration::from_millis(100)).await;
        assert_eq!(page.engine().phase(), CarouselPhase::Disabled);
        assert!(!page.host().is_scroll_locked());

        page.close().await.expect("close");
    }
}
