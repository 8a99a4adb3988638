//! Viewport class tracking
//!
//! Layout-dependent measurements (card widths, scroller geometry) are only
//! taken once per page instance, so crossing a viewport class boundary
//! reloads the page instead of relaying out in place.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use url::Url;

use crate::config::BreakpointConfig;
use crate::host::PageHost;
use crate::lifecycle::PageLifecycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Breakpoint {
    Mobile,
    Tablet,
    Desktop,
}

impl Breakpoint {
    pub fn classify(width: u32, config: &BreakpointConfig) -> Self {
        if width <= config.mobile_max {
            Breakpoint::Mobile
        } else if width <= config.tablet_max {
            Breakpoint::Tablet
        } else {
            Breakpoint::Desktop
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Breakpoint::Mobile => "mobile",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakpointChange {
    pub from: Breakpoint,
    pub to: Breakpoint,
}

#[derive(Debug, Clone)]
pub struct BreakpointWatcher {
    config: BreakpointConfig,
    current: Breakpoint,
}

impl BreakpointWatcher {
    pub fn new(config: BreakpointConfig, width: u32) -> Self {
        let current = Breakpoint::classify(width, &config);
        Self { config, current }
    }

    pub fn current(&self) -> Breakpoint {
        self.current
    }

    /// Record a new viewport width; returns the change when the class differs
    pub fn observe(&mut self, width: u32) -> Option<BreakpointChange> {
        let next = Breakpoint::classify(width, &self.config);
        if next == self.current {
            return None;
        }
        let change = BreakpointChange {
            from: self.current,
            to: next,
        };
        self.current = next;
        Some(change)
    }

    /// Resize handler: on a class change, clear the loader flag and reload.
    /// Returns the reload target when one was issued.
    pub fn handle_resize(
        &mut self,
        width: u32,
        lifecycle: &PageLifecycle,
        host: &dyn PageHost,
    ) -> Option<Url> {
        let change = self.observe(width)?;
        info!(width, from = %change.from, to = %change.to, "Breakpoint changed, reloading");

        lifecycle.session().clear_loader_flag();
        let target = cache_busted(&host.current_url(), &self.config.cache_bust_param, Utc::now());
        host.reload(&target);
        Some(target)
    }
}

/// Same path and query with a fresh timestamp parameter; an older value of
/// the parameter is replaced and the fragment dropped
pub fn cache_busted(url: &Url, param: &str, now: DateTime<Utc>) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != param)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut target = url.clone();
    target.set_fragment(None);
    target.set_query(None);
    {
        let mut pairs = target.query_pairs_mut();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(param, &now.timestamp_millis().to_string());
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HeadlessPage, HostEvent};
    use crate::session::SessionStore;
    use std::time::Duration;

    fn classify(width: u32) -> Breakpoint {
        Breakpoint::classify(width, &BreakpointConfig::default())
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(classify(0), Breakpoint::Mobile);
        assert_eq!(classify(767), Breakpoint::Mobile);
        assert_eq!(classify(768), Breakpoint::Tablet);
        assert_eq!(classify(1023), Breakpoint::Tablet);
        assert_eq!(classify(1024), Breakpoint::Desktop);
        assert_eq!(classify(3840), Breakpoint::Desktop);
    }

    #[test]
    fn test_reload_only_on_class_change() {
        let mut watcher = BreakpointWatcher::new(BreakpointConfig::default(), 800);

        assert_eq!(watcher.observe(850), None);
        assert_eq!(
            watcher.observe(1200),
            Some(BreakpointChange {
                from: Breakpoint::Tablet,
                to: Breakpoint::Desktop
            })
        );
        assert_eq!(watcher.observe(1300), None);
        assert_eq!(
            watcher.observe(500),
            Some(BreakpointChange {
                from: Breakpoint::Desktop,
                to: Breakpoint::Mobile
            })
        );
    }

    #[test]
    fn test_resize_clears_session_and_reloads() {
        let page = HeadlessPage::new(Url::parse("https://example.com/work?tab=2#top").unwrap());
        let lifecycle = PageLifecycle::new(SessionStore::in_memory(Duration::from_secs(300)));
        lifecycle.session().mark_loader_played(Utc::now());

        let mut watcher = BreakpointWatcher::new(BreakpointConfig::default(), 800);
        assert!(watcher.handle_resize(820, &lifecycle, &page).is_none());
        assert!(lifecycle.session().snapshot().loader_played);

        let target = watcher.handle_resize(1200, &lifecycle, &page).unwrap();
        assert!(!lifecycle.session().snapshot().loader_played);
        assert_eq!(target.path(), "/work");
        assert!(target.fragment().is_none());
        assert!(matches!(page.kinds().last(), Some(HostEvent::Reloaded { .. })));
    }

    #[test]
    fn test_cache_bust_replaces_previous_param() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let url = Url::parse("https://example.com/?a=1&_br=99").unwrap();
        let busted = cache_busted(&url, "_br", now);
        assert_eq!(busted.as_str(), "https://example.com/?a=1&_br=1700000000123");

        let bare = Url::parse("https://example.com/about").unwrap();
        assert_eq!(
            cache_busted(&bare, "_br", now).as_str(),
            "https://example.com/about?_br=1700000000123"
        );
    }
}
