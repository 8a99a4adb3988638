use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;

use marquee_core::AppConfig;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Write the effective configuration to the config path
    #[arg(long)]
    pub init: bool,
}

/// Print the effective configuration as TOML, or write it out with `--init`
pub fn run(config: &AppConfig, path: &Path, args: ConfigArgs) -> Result<()> {
    if args.init {
        if path.exists() {
            bail!("{} already exists", path.display());
        }
        config.save(path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let source = if path.exists() { "" } else { " (not found, defaults)" };
    println!("# {}{}", path.display(), source);
    print!("{}", config.to_toml()?);
    Ok(())
}
