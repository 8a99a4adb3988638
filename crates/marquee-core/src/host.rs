//! The page seam
//!
//! Everything the orchestration does to the document goes through
//! [`PageHost`]. A browser binding implements it over the DOM; the
//! [`HeadlessPage`] implementation records what would have happened.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use url::Url;

pub trait PageHost: Send + Sync {
    fn current_url(&self) -> Url;

    // Loader overlay
    fn mount_loader(&self);
    fn render_progress(&self, label: &str, scale: f64);
    fn collapse_loader(&self);
    fn remove_loader(&self);

    fn reveal_main_content(&self);
    /// Toggle ordinary page scrolling (body overflow)
    fn set_page_scroll(&self, enabled: bool);

    /// Hide overflow and block wheel, touch-move and scroll keys
    fn lock_scroll(&self);
    fn unlock_scroll(&self);

    // Content-ready consumers
    fn start_text_reveal(&self);
    fn play_hero_entrance(&self);

    // Transition wipe
    fn has_transition_overlay(&self) -> bool;
    /// Small circular seed at bottom-centre with easing disabled, scrim cleared
    fn reset_transition_seed(&self);
    fn flush_layout(&self);
    /// Re-enable easing and grow the seed to the full viewport while the scrim fades in
    fn expand_transition(&self, duration: Duration, scrim_opacity: f64);
    fn hide_transition_overlay(&self);

    fn navigate(&self, target: &Url);
    fn reload(&self, target: &Url);
}

/// Scoped intro lock: acquiring locks page scroll, dropping unlocks it
pub struct ScrollLockGuard {
    host: Arc<dyn PageHost>,
}

impl ScrollLockGuard {
    pub fn acquire(host: Arc<dyn PageHost>) -> Self {
        host.lock_scroll();
        Self { host }
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        self.host.unlock_scroll();
    }
}

impl std::fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ScrollLockGuard")
    }
}

/// Something the headless page was asked to do
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HostEvent {
    LoaderMounted,
    Progress { label: String, scale: f64 },
    LoaderCollapsed,
    LoaderRemoved,
    ContentRevealed,
    PageScroll { enabled: bool },
    ScrollLocked,
    ScrollUnlocked,
    TextRevealStarted,
    HeroEntrance,
    TransitionReset,
    LayoutFlushed,
    TransitionExpanded { duration_ms: u64, scrim_opacity: f64 },
    TransitionHidden,
    Navigated { url: String },
    Reloaded { url: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: HostEvent,
}

#[derive(Debug)]
struct HeadlessState {
    url: Url,
    events: Vec<RecordedEvent>,
    transition_overlay: bool,
    scroll_locks: u32,
}

/// Recording page used by the CLI and tests
#[derive(Debug)]
pub struct HeadlessPage {
    origin: Instant,
    state: Mutex<HeadlessState>,
}

impl HeadlessPage {
    pub fn new(url: Url) -> Self {
        Self {
            origin: Instant::now(),
            state: Mutex::new(HeadlessState {
                url,
                events: Vec::new(),
                transition_overlay: true,
                scroll_locks: 0,
            }),
        }
    }

    /// Page without the transition overlay nodes
    pub fn without_transition_overlay(url: Url) -> Self {
        let page = Self::new(url);
        page.state().transition_overlay = false;
        page
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state().events.clone()
    }

    pub fn kinds(&self) -> Vec<HostEvent> {
        self.state().events.iter().map(|e| e.event.clone()).collect()
    }

    pub fn contains(&self, event: &HostEvent) -> bool {
        self.state().events.iter().any(|e| &e.event == event)
    }

    /// Offset of the first matching event from page creation
    pub fn time_of(&self, event: &HostEvent) -> Option<u64> {
        self.state()
            .events
            .iter()
            .find(|e| &e.event == event)
            .map(|e| e.at_ms)
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.state().scroll_locks > 0
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state()
            .events
            .iter()
            .filter_map(|e| match &e.event {
                HostEvent::Navigated { url } | HostEvent::Reloaded { url } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: HostEvent) {
        let at_ms = self.origin.elapsed().as_millis() as u64;
        self.state().events.push(RecordedEvent { at_ms, event });
    }
}

impl PageHost for HeadlessPage {
    fn current_url(&self) -> Url {
        self.state().url.clone()
    }

    fn mount_loader(&self) {
        self.push(HostEvent::LoaderMounted);
    }

    fn render_progress(&self, label: &str, scale: f64) {
        self.push(HostEvent::Progress {
            label: label.to_string(),
            scale,
        });
    }

    fn collapse_loader(&self) {
        self.push(HostEvent::LoaderCollapsed);
    }

    fn remove_loader(&self) {
        self.push(HostEvent::LoaderRemoved);
    }

    fn reveal_main_content(&self) {
        self.push(HostEvent::ContentRevealed);
    }

    fn set_page_scroll(&self, enabled: bool) {
        self.push(HostEvent::PageScroll { enabled });
    }

    fn lock_scroll(&self) {
        self.state().scroll_locks += 1;
        self.push(HostEvent::ScrollLocked);
    }

    fn unlock_scroll(&self) {
        {
            let mut state = self.state();
            state.scroll_locks = state.scroll_locks.saturating_sub(1);
        }
        self.push(HostEvent::ScrollUnlocked);
    }

    fn start_text_reveal(&self) {
        self.push(HostEvent::TextRevealStarted);
    }

    fn play_hero_entrance(&self) {
        self.push(HostEvent::HeroEntrance);
    }

    fn has_transition_overlay(&self) -> bool {
        self.state().transition_overlay
    }

    fn reset_transition_seed(&self) {
        self.push(HostEvent::TransitionReset);
    }

    fn flush_layout(&self) {
        self.push(HostEvent::LayoutFlushed);
    }

    fn expand_transition(&self, duration: Duration, scrim_opacity: f64) {
        self.push(HostEvent::TransitionExpanded {
            duration_ms: duration.as_millis() as u64,
            scrim_opacity,
        });
    }

    fn hide_transition_overlay(&self) {
        self.push(HostEvent::TransitionHidden);
    }

    fn navigate(&self, target: &Url) {
        self.state().url = target.clone();
        self.push(HostEvent::Navigated {
            url: target.to_string(),
        });
    }

    fn reload(&self, target: &Url) {
        self.state().url = target.clone();
        self.push(HostEvent::Reloaded {
            url: target.to_string(),
        });
    }
}
