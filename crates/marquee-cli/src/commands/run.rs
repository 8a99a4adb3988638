use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};
use url::Url;

use marquee_core::host::RecordedEvent;
use marquee_core::loader::LoaderOutcome;
use marquee_core::session::FileSessionStorage;
use marquee_core::transition::{ElementId, TransitionLink};
use marquee_core::{AppConfig, Notification, SessionStore};
use marquee_scroll::{CarouselConfigExt, CarouselState, HeadlessTrack, ScrollKey};

use crate::page::Page;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Page URL
    #[arg(long, default_value = "https://example.com/")]
    pub url: String,
    /// Viewport width in px
    #[arg(short = 'w', long, default_value_t = 1280)]
    pub width: u32,
    /// Number of carousel cards
    #[arg(long, default_value_t = 6)]
    pub items: usize,
    /// Card width in px
    #[arg(long, default_value_t = 320.0)]
    pub item_width: f64,
    /// Delay before the content collaborator resolves (omit with --stall-content)
    #[arg(long, default_value_t = 1200)]
    pub content_ms: u64,
    /// Never resolve the content signal
    #[arg(long)]
    pub stall_content: bool,
    /// Delay before window-load fires
    #[arg(long, default_value_t = 800)]
    pub window_ms: u64,
    /// Wheel deltas to send once the carousel is interactive
    #[arg(long = "wheel", allow_negative_numbers = true)]
    pub wheel: Vec<f64>,
    /// Vertical swipe distances (positive swipes up)
    #[arg(long = "swipe", allow_negative_numbers = true)]
    pub swipe: Vec<f64>,
    /// Key names to press (e.g. PageDown, ArrowUp)
    #[arg(long = "key")]
    pub keys: Vec<String>,
    /// Vertical page scroll offset while sending input
    #[arg(long, default_value_t = 0.0)]
    pub scroll_y: f64,
    /// Transition links to click, in order
    #[arg(long = "click")]
    pub clicks: Vec<String>,
    /// Viewport widths to resize to
    #[arg(long = "resize")]
    pub resizes: Vec<u32>,
    /// Simulate a back/forward cache restore at the end
    #[arg(long)]
    pub restore: bool,
    /// Forget that the loader already played this session
    #[arg(long)]
    pub fresh: bool,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    loader: LoaderOutcome,
    carousel: CarouselState,
    events: Vec<RecordedEvent>,
}

pub async fn run(config: &AppConfig, args: RunArgs) -> Result<()> {
    let url = Url::parse(&args.url).with_context(|| format!("invalid page url: {}", args.url))?;

    let session = SessionStore::open(
        Box::new(FileSessionStorage::new(config.session_path())),
        Duration::from_secs(config.session.idle_timeout_secs),
    );
    if args.fresh {
        session.clear_loader_flag();
    }

    let links: Vec<TransitionLink> = args
        .clicks
        .iter()
        .enumerate()
        .map(|(i, href)| TransitionLink::new(i as ElementId + 1, href.clone()))
        .collect();
    let track = HeadlessTrack::uniform(args.items, args.item_width, 24.0, args.item_width * 1.4);

    let mut page = Page::boot(config, url, args.width, session, track, &links);
    page.set_page_scroll_y(args.scroll_y);

    schedule_gates(&page, &args);

    let ready_limit = Duration::from_millis(config.loader.fallback_timeout_ms * 2);
    if timeout(ready_limit, page.lifecycle().wait_for(Notification::PageReady))
        .await
        .is_err()
    {
        warn!("Page never became ready");
    }

    // Let the carousel intro finish before sending input
    sleep(config.carousel.intro_delay() + config.carousel.intro_duration() + Duration::from_millis(100))
        .await;

    for delta in &args.wheel {
        let disposition = page.wheel(*delta);
        info!(delta, ?disposition, "Wheel");
        sleep(Duration::from_millis(500)).await;
    }
    for distance in &args.swipe {
        let disposition = page.swipe(400.0, 400.0 - distance, 8);
        info!(distance, ?disposition, "Swipe");
        sleep(Duration::from_millis(500)).await;
    }
    for key in &args.keys {
        let disposition = page.key(ScrollKey::from_key(key));
        info!(key = key.as_str(), ?disposition, "Key");
    }

    for width in &args.resizes {
        if let Some(target) = page.resize(*width) {
            info!(width, %target, "Page would reload");
        }
    }

    for (i, link) in links.iter().enumerate() {
        let outcome = page.click(link.element);
        info!(click = i + 1, ?outcome, "Transition click");
        sleep(Duration::from_millis(config.transition.duration_ms + 50)).await;
    }

    if args.restore {
        page.restore();
    }

    let carousel = page.carousel_state();
    let events = page.host().events();
    let loader = page.close().await?;

    let report = Report {
        loader,
        carousel,
        events,
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn schedule_gates(page: &Page, args: &RunArgs) {
    let window = page.lifecycle().window_loaded.clone();
    let window_delay = Duration::from_millis(args.window_ms);
    tokio::spawn(async move {
        sleep(window_delay).await;
        window.resolve();
    });

    if args.stall_content {
        warn!("Content signal will never resolve");
        return;
    }
    let content = page.lifecycle().content_loaded.clone();
    let content_delay = Duration::from_millis(args.content_ms);
    tokio::spawn(async move {
        sleep(content_delay).await;
        content.resolve();
    });
}

fn print_report(report: &Report) {
    println!("Loader: {:?}", report.loader);
    println!(
        "Carousel: position {:.1}px of {:.1}px, velocity {:.3}{}",
        report.carousel.position,
        report.carousel.scroll_width,
        report.carousel.velocity,
        if report.carousel.locked { " (locked)" } else { "" }
    );
    println!("\nEvents ({}):\n", report.events.len());
    for recorded in &report.events {
        println!("  {:>7}ms  {:?}", recorded.at_ms, recorded.event);
    }
}
