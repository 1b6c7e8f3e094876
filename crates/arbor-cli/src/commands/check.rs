//! `arbor check` — Build a topology and report structural problems.

use std::path::PathBuf;

use arbor_core::ArborConfig;
use clap::Args;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Topology file (TOML).
    #[arg(short, long, default_value = "topology.toml")]
    pub topology: PathBuf,

    /// Require every address to extend its parent's, regardless of config.
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: &CheckArgs, config: &ArborConfig) -> anyhow::Result<()> {
    let spec = super::load_topology(&args.topology)?;
    let strict = args.strict || config.routing.strict_topology;
    let tree = spec.build::<String>(strict)?;

    println!("Topology: {}", args.topology.display());
    println!("  Nodes:          {}", tree.len());
    println!("  Parallel links: {}", spec.parallel.len());

    let issues = tree.validate();
    if issues.is_empty() {
        println!("  No issues found.");
        return Ok(());
    }

    println!("  Issues:");
    for issue in &issues {
        println!("    - {}", tree.describe(issue));
    }
    anyhow::bail!("{} topology issue(s) found", issues.len());
}
