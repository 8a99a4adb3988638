//! User input reaching the carousel
//!
//! Browser events are reduced to [`InputEvent`]s; the engine answers each
//! one with an [`InputDisposition`] telling the binding whether to cancel
//! the browser's default scrolling.

/// Input events the carousel listens to on the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Wheel { delta_y: f64 },
    TouchStart { y: f64 },
    TouchMove { y: f64 },
    Key(ScrollKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDisposition {
    /// Let the browser handle the event
    Default,
    /// Call `preventDefault()`
    PreventDefault,
}

/// Keys that scroll the page natively
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKey {
    Space,
    PageUp,
    PageDown,
    End,
    Home,
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    Other,
}

impl ScrollKey {
    /// Map a legacy `keyCode` (32..=40 are the scrolling keys)
    pub fn from_key_code(code: u32) -> Self {
        match code {
            32 => ScrollKey::Space,
            33 => ScrollKey::PageUp,
            34 => ScrollKey::PageDown,
            35 => ScrollKey::End,
            36 => ScrollKey::Home,
            37 => ScrollKey::ArrowLeft,
            38 => ScrollKey::ArrowUp,
            39 => ScrollKey::ArrowRight,
            40 => ScrollKey::ArrowDown,
            _ => ScrollKey::Other,
        }
    }

    /// Map a `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Self {
        match key {
            " " | "Spacebar" => ScrollKey::Space,
            "PageUp" => ScrollKey::PageUp,
            "PageDown" => ScrollKey::PageDown,
            "End" => ScrollKey::End,
            "Home" => ScrollKey::Home,
            "ArrowLeft" | "Left" => ScrollKey::ArrowLeft,
            "ArrowUp" | "Up" => ScrollKey::ArrowUp,
            "ArrowRight" | "Right" => ScrollKey::ArrowRight,
            "ArrowDown" | "Down" => ScrollKey::ArrowDown,
            _ => ScrollKey::Other,
        }
    }

    #[inline]
    pub fn scrolls_page(&self) -> bool {
        !matches!(self, ScrollKey::Other)
    }
}

/// Follows a single vertical drag between touch events
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    last_y: Option<f64>,
    dragging_down: bool,
}

impl TouchTracker {
    pub fn start(&mut self, y: f64) {
        self.last_y = Some(y);
        self.dragging_down = false;
    }

    /// Delta since the previous touch point; a move without a start only records the point
    pub fn drag(&mut self, y: f64) -> Option<f64> {
        let delta = self.last_y.map(|last| y - last);
        self.last_y = Some(y);
        if delta.is_some_and(|d| d > 0.0) {
            self.dragging_down = true;
        }
        delta
    }

    /// Any downward movement since the touch started
    #[inline]
    pub fn is_dragging_down(&self) -> bool {
        self.dragging_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        let blocked: Vec<ScrollKey> = (32..=40).map(ScrollKey::from_key_code).collect();
        assert!(blocked.iter().all(ScrollKey::scrolls_page));
        assert!(!ScrollKey::from_key_code(13).scrolls_page());
        assert!(!ScrollKey::from_key_code(41).scrolls_page());
    }

    #[test]
    fn test_key_names() {
        assert_eq!(ScrollKey::from_key(" "), ScrollKey::Space);
        assert_eq!(ScrollKey::from_key("PageDown"), ScrollKey::PageDown);
        assert_eq!(ScrollKey::from_key("Enter"), ScrollKey::Other);
    }

    #[test]
    fn test_touch_tracker() {
        let mut touch = TouchTracker::default();
        assert_eq!(touch.drag(10.0), None);

        touch.start(100.0);
        assert!(!touch.is_dragging_down());
        assert_eq!(touch.drag(90.0), Some(-10.0));
        assert!(!touch.is_dragging_down());
        assert_eq!(touch.drag(95.0), Some(5.0));
        assert!(touch.is_dragging_down());

        // A new touch resets the direction
        touch.start(50.0);
        assert!(!touch.is_dragging_down());
    }
}
