//! Page-lifetime context shared by the orchestration components
//!
//! The bootstrap routine owns one `PageLifecycle` per page instance and
//! hands clones of the `Arc` to the loader, the transition navigator and
//! the carousel. Notifications are typed latches instead of string-keyed
//! events, so the content-ready -> page-ready ordering is explicit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::readiness::ReadinessSignal;
use crate::session::SessionStore;

/// Notifications emitted by the loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// Main content is visible; text reveal, hero entrance and carousel start
    ContentReady,
    /// Transition links may animate
    PageReady,
}

#[derive(Debug)]
pub struct PageLifecycle {
    page_id: Uuid,
    /// Resolved by the content-loading collaborator (e.g. a live data widget)
    pub content_loaded: ReadinessSignal,
    /// Resolved when all static assets finished loading
    pub window_loaded: ReadinessSignal,
    content_ready: ReadinessSignal,
    page_ready: ReadinessSignal,
    loader_claimed: AtomicBool,
    session: SessionStore,
}

impl PageLifecycle {
    pub fn new(session: SessionStore) -> Arc<Self> {
        Arc::new(Self {
            page_id: Uuid::new_v4(),
            content_loaded: ReadinessSignal::new("content-loaded"),
            window_loaded: ReadinessSignal::new("window-loaded"),
            content_ready: ReadinessSignal::new("content-ready"),
            page_ready: ReadinessSignal::new("page-ready"),
            loader_claimed: AtomicBool::new(false),
            session,
        })
    }

    pub fn page_id(&self) -> Uuid {
        self.page_id
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Claim the right to run the loader on this page. Only the first caller wins.
    pub fn claim_loader(&self) -> bool {
        !self.loader_claimed.swap(true, Ordering::AcqRel)
    }

    /// Emit content-ready followed by page-ready. Later calls are no-ops.
    pub fn announce_ready(&self) {
        if self.content_ready.resolve() {
            info!(page = %self.page_id, "Content ready");
        }
        if self.page_ready.resolve() {
            info!(page = %self.page_id, "Page ready");
        }
    }

    pub fn is_fired(&self, notification: Notification) -> bool {
        self.signal(notification).is_resolved()
    }

    pub fn is_page_ready(&self) -> bool {
        self.page_ready.is_resolved()
    }

    pub async fn wait_for(&self, notification: Notification) {
        self.signal(notification).when_ready().await
    }

    /// Record user input for the session idle clock
    pub fn note_activity(&self) {
        self.session.record_activity(Utc::now());
    }

    fn signal(&self, notification: Notification) -> &ReadinessSignal {
        match notification {
            Notification::ContentReady => &self.content_ready,
            Notification::PageReady => &self.page_ready,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn lifecycle() -> Arc<PageLifecycle> {
        PageLifecycle::new(SessionStore::in_memory(Duration::from_secs(300)))
    }

    #[test]
    fn test_announce_fires_both_once() {
        let lifecycle = lifecycle();
        assert!(!lifecycle.is_fired(Notification::ContentReady));
        assert!(!lifecycle.is_page_ready());

        lifecycle.announce_ready();
        lifecycle.announce_ready();

        assert!(lifecycle.is_fired(Notification::ContentReady));
        assert!(lifecycle.is_page_ready());
    }

    #[test]
    fn test_loader_claimed_once() {
        let lifecycle = lifecycle();
        assert!(lifecycle.claim_loader());
        assert!(!lifecycle.claim_loader());
    }

    #[tokio::test]
    async fn test_content_ready_observed_before_page_ready() {
        let lifecycle = lifecycle();
        let observer = {
            let lifecycle = lifecycle.clone();
            tokio::spawn(async move {
                lifecycle.wait_for(Notification::PageReady).await;
                lifecycle.is_fired(Notification::ContentReady)
            })
        };

        lifecycle.announce_ready();
        assert!(observer.await.unwrap());
    }
}
