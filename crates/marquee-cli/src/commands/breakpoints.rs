use anyhow::{bail, Result};
use clap::Args;

use marquee_core::{AppConfig, BreakpointWatcher};

#[derive(Debug, Args)]
pub struct BreakpointArgs {
    /// Viewport widths, in the order the window is resized through them
    #[arg(required = true)]
    pub widths: Vec<u32>,
}

pub fn run(config: &AppConfig, args: BreakpointArgs) -> Result<()> {
    let Some((first, rest)) = args.widths.split_first() else {
        bail!("at least one width is required");
    };

    let mut watcher = BreakpointWatcher::new(config.breakpoints.clone(), *first);
    println!("  {:>5}px  {}", first, watcher.current());

    for width in rest {
        match watcher.observe(*width) {
            Some(change) => println!(
                "  {:>5}px  {}  (reload: {} -> {})",
                width, change.to, change.from, change.to
            ),
            None => println!("  {:>5}px  {}", width, watcher.current()),
        }
    }

    Ok(())
}
