use anyhow::{bail, Result};
use clap::Args;

use marquee_core::AppConfig;
use marquee_scroll::physics::{self, Motion};
use marquee_scroll::CarouselConfigExt;

#[derive(Debug, Args)]
pub struct CarouselArgs {
    /// Input delta: wheel delta_y, or the drag distance with --touch
    #[arg(allow_negative_numbers = true, default_value_t = 1000.0)]
    pub delta: f64,
    /// Treat the delta as a vertical touch drag
    #[arg(long)]
    pub touch: bool,
    /// Half the duplicated track width in px
    #[arg(long, default_value_t = 1296.0)]
    pub scroll_width: f64,
    /// Starting offset in px
    #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
    pub position: f64,
    /// Stop after this many frames even if still moving
    #[arg(long, default_value_t = 2000)]
    pub max_frames: u32,
    /// Print the trace as JSON
    #[arg(long)]
    pub json: bool,
}

/// Trace the interactive physics for a single impulse, one line per frame
pub fn run(config: &AppConfig, args: CarouselArgs) -> Result<()> {
    if !args.scroll_width.is_finite() || args.scroll_width <= 0.0 {
        bail!("scroll width must be positive, got {}", args.scroll_width);
    }

    let params = config.carousel.inertia();
    let velocity = if args.touch {
        physics::touch_impulse(args.delta, &params)
    } else {
        physics::wheel_impulse(args.delta, &params)
    };

    let mut motion = Motion::new(
        physics::wrap_position(args.position, args.scroll_width),
        velocity,
    );
    let mut trace = vec![motion];
    while physics::is_moving(motion.velocity, &params) && trace.len() <= args.max_frames as usize {
        motion = physics::step(motion, args.scroll_width, &params);
        trace.push(motion);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
        return Ok(());
    }

    println!(
        "Impulse {:.3}px/frame, at rest after {} frames (bound {})\n",
        velocity,
        trace.len() - 1,
        physics::settle_bound(velocity, &params)
    );
    for (frame, m) in trace.iter().enumerate() {
        println!("  {:>5}  {:>10.3}  {:>10.4}", frame, m.position, m.velocity);
    }

    Ok(())
}
