//! `arbor init` — Write a default configuration and a sample topology.

use arbor_core::ArborConfig;
use arbor_routing::TopologySpec;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to current directory).
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

pub fn run(args: &InitArgs) -> anyhow::Result<()> {
    let (config_path, topology_path) = initialize(&args.dir)?;

    println!("Initialized Arbor in {}", args.dir.display());
    println!("  Config:   {}", config_path.display());
    println!("  Topology: {}", topology_path.display());
    println!("Run 'arbor check' to validate the topology, or");
    println!("'arbor route --address /1/1' to route a packet through it.");

    Ok(())
}

/// Write `arbor.toml` and `topology.toml` into `dir`. Either both files are
/// written or neither is left behind.
fn initialize(dir: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
    let config_path = dir.join("arbor.toml");
    let topology_path = dir.join("topology.toml");

    for path in [&config_path, &topology_path] {
        if path.exists() {
            anyhow::bail!("file already exists at {}", path.display());
        }
    }

    let topology = TopologySpec::sample().to_toml_string()?;
    std::fs::create_dir_all(dir)?;
    std::fs::write(&topology_path, topology)?;
    if let Err(err) = ArborConfig::default().save(&config_path) {
        if let Err(cleanup) = std::fs::remove_file(&topology_path) {
            tracing::warn!(
                path = %topology_path.display(),
                error = %cleanup,
                "failed to remove partially initialized topology"
            );
        }
        return Err(err.into());
    }

    Ok((config_path, topology_path))
}
