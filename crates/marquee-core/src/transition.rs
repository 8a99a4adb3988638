//! Full-screen wipe before internal navigation
//!
//! Links carrying the transition marker get one click handler each. Once
//! the page is ready a click plays the wipe and navigates when it ends;
//! only one wipe can be in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::config::{NotReadyPolicy, TransitionConfig};
use crate::host::PageHost;
use crate::lifecycle::PageLifecycle;
use crate::{Error, Result};

/// Stable identity of a DOM element
pub type ElementId = u64;

/// An element bearing the transition marker attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionLink {
    pub element: ElementId,
    pub href: Option<String>,
}

impl TransitionLink {
    pub fn new(element: ElementId, href: impl Into<String>) -> Self {
        Self {
            element,
            href: Some(href.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not a managed element; the browser handles it
    Unmanaged,
    /// Clicked before page-ready
    NotReady { prevent_default: bool },
    /// A wipe is already running; the click is swallowed
    Ignored,
    /// The wipe started and navigation to `target` is scheduled
    Started { target: Url },
}

impl ClickOutcome {
    pub fn prevents_default(&self) -> bool {
        match self {
            ClickOutcome::Unmanaged => false,
            ClickOutcome::NotReady { prevent_default } => *prevent_default,
            ClickOutcome::Ignored | ClickOutcome::Started { .. } => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionState {
    pub active: bool,
    pub pending_href: Option<Url>,
    /// Bumped by every started wipe and every page restore; a wipe only
    /// navigates while it still owns the current generation
    pub generation: u64,
}

pub struct TransitionNavigator {
    config: TransitionConfig,
    host: Arc<dyn PageHost>,
    lifecycle: Arc<PageLifecycle>,
    links: Mutex<HashMap<ElementId, Url>>,
    state: Mutex<TransitionState>,
}

impl TransitionNavigator {
    pub fn new(
        config: TransitionConfig,
        host: Arc<dyn PageHost>,
        lifecycle: Arc<PageLifecycle>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            host,
            lifecycle,
            links: Mutex::new(HashMap::new()),
            state: Mutex::new(TransitionState::default()),
        })
    }

    /// Attach handlers to transition-enabled elements. Elements already
    /// attached are skipped, so this can be re-run after dynamic content renders.
    /// Returns the number of newly attached elements.
    pub fn attach(&self, elements: &[TransitionLink]) -> usize {
        if !self.host.has_transition_overlay() {
            let err = Error::MissingElement("transition overlay".to_string());
            warn!("{}, {} links left on default navigation", err, elements.len());
            return 0;
        }

        let base = self.host.current_url();
        let mut links = self.links();
        let mut attached = 0;

        for element in elements {
            if links.contains_key(&element.element) {
                continue;
            }
            match resolve_href(&base, element.href.as_deref()) {
                Ok(target) => {
                    links.insert(element.element, target);
                    attached += 1;
                }
                Err(e) => warn!(element = element.element, "Skipping transition link: {}", e),
            }
        }

        debug!(
            attached,
            total = links.len(),
            marker = %self.config.marker_attribute,
            "Transition links attached"
        );
        attached
    }

    pub fn is_attached(&self, element: ElementId) -> bool {
        self.links().contains_key(&element)
    }

    pub fn state(&self) -> TransitionState {
        self.state_guard().clone()
    }

    /// Click handler. Must run inside a tokio runtime; the wipe is spawned.
    pub fn click(self: &Arc<Self>, element: ElementId) -> ClickOutcome {
        let Some(target) = self.links().get(&element).cloned() else {
            return ClickOutcome::Unmanaged;
        };
        self.lifecycle.note_activity();

        if !self.lifecycle.is_page_ready() {
            let prevent_default = self.config.not_ready_policy == NotReadyPolicy::Suppress;
            debug!(href = %target, prevent_default, "Transition click before page ready");
            return ClickOutcome::NotReady { prevent_default };
        }

        let generation = {
            let mut state = self.state_guard();
            if state.active {
                debug!(href = %target, "Transition already running, click ignored");
                return ClickOutcome::Ignored;
            }
            state.active = true;
            state.pending_href = Some(target.clone());
            state.generation += 1;
            state.generation
        };

        info!(href = %target, generation, "Starting page transition");
        tokio::spawn(Arc::clone(self).play(target.clone(), generation));
        ClickOutcome::Started { target }
    }

    /// Back/forward cache restore: hide leftovers of a previous wipe
    pub fn on_page_restored(&self) {
        self.host.hide_transition_overlay();
        let mut state = self.state_guard();
        *state = TransitionState {
            generation: state.generation + 1,
            ..TransitionState::default()
        };
        debug!(generation = state.generation, "Transition overlay reset after page restore");
    }

    async fn play(self: Arc<Self>, target: Url, generation: u64) {
        let duration = Duration::from_millis(self.config.duration_ms);

        // Jump to the seed without easing, then let the expansion animate
        self.host.reset_transition_seed();
        self.host.flush_layout();
        self.host.expand_transition(duration, self.config.scrim_opacity);

        tokio::time::sleep(duration).await;

        let still_pending = {
            let mut state = self.state_guard();
            let owned = state.active && state.generation == generation;
            if owned {
                state.active = false;
                state.pending_href = None;
            }
            owned
        };
        if still_pending {
            self.host.navigate(&target);
        } else {
            debug!(href = %target, "Transition cancelled before navigation");
        }
    }

    fn links(&self) -> MutexGuard<'_, HashMap<ElementId, Url>> {
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_guard(&self) -> MutexGuard<'_, TransitionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn resolve_href(base: &Url, href: Option<&str>) -> Result<Url> {
    let href = href
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::InvalidHref("missing href".to_string()))?;
    base.join(href)
        .map_err(|e| Error::InvalidHref(format!("{}: {}", href, e)))
}
