use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use verse_packs::{cli, pipeline};

/// Update metadata keys in an existing pack without rebuilding it.
#[derive(Parser)]
#[command(name = "patch_metadata")]
struct Cli {
    /// Pack file to patch
    pack: PathBuf,

    /// key=value, repeatable
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    #[arg(long)]
    version: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    license: Option<String>,

    #[arg(long)]
    attribution: Option<String>,
}

fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    let args = Cli::parse();

    let mut entries: Vec<(String, String)> = Vec::new();
    for pair in &args.set {
        let Some((k, v)) = pair.split_once('=') else {
            bail!("expected KEY=VALUE, got {pair:?}");
        };
        entries.push((k.trim().to_string(), v.to_string()));
    }
    for (key, value) in [
        ("version", args.version),
        ("name", args.name),
        ("license", args.license),
        ("attribution", args.attribution),
    ] {
        if let Some(v) = value {
            entries.push((key.to_string(), v));
        }
    }
    if entries.is_empty() {
        bail!("nothing to patch: pass --set KEY=VALUE or one of --version/--name/--license/--attribution");
    }

    let metadata = pipeline::patch_metadata(&args.pack, &entries)
        .with_context(|| format!("patching {}", args.pack.display()))?;

    println!("Metadata for {}:", args.pack.display());
    for (k, v) in &metadata {
        println!("  {:<16} {}", k, v);
    }
    Ok(())
}
