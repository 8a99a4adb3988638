pub mod breakpoint;
pub mod config;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod loader;
pub mod readiness;
pub mod session;
pub mod transition;

pub use breakpoint::{Breakpoint, BreakpointWatcher};
pub use config::{AppConfig, CarouselConfig, EasingType};
pub use error::{Error, Result};
pub use host::{HeadlessPage, PageHost, ScrollLockGuard};
pub use lifecycle::{Notification, PageLifecycle};
pub use readiness::ReadinessSignal;
pub use session::SessionStore;
pub use transition::TransitionNavigator;
