pub mod progress;
mod sequencer;

pub use progress::{LoaderPhase, LoaderState};
pub use sequencer::{LoaderOutcome, LoaderSequencer};

use std::sync::Arc;

use crate::host::PageHost;
use crate::lifecycle::{Notification, PageLifecycle};

/// Start text reveal and the hero entrance once content is ready
pub async fn play_entrance(lifecycle: Arc<PageLifecycle>, host: Arc<dyn PageHost>) {
    lifecycle.wait_for(Notification::ContentReady).await;
    host.play_hero_entrance();
    host.start_text_reveal();
}
