use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use verse_packs::cli;
use verse_packs::manifest::Manifest;
use verse_packs::pipeline;
use verse_packs::progress;
use verse_packs::settings::Settings;

/// Run every build in a manifest, one after another, stopping at the first failure.
#[derive(Parser)]
#[command(name = "build_all")]
struct Cli {
    /// Manifest listing [[packs]] entries
    #[arg(default_value = "manifest.toml")]
    manifest: PathBuf,
}

fn main() -> anyhow::Result<()> {
    cli::init_tracing();
    let t0 = Instant::now();
    let args = Cli::parse();
    let settings = Settings::load().context("loading settings")?;
    let manifest = Manifest::load(&args.manifest)
        .with_context(|| format!("reading manifest {}", args.manifest.display()))?;

    let total = manifest.packs.len();
    for (i, entry) in manifest.packs.iter().enumerate() {
        info!("[{}/{}] building {} ({:?})", i + 1, total, entry.id, entry.kind);
        let builder = entry.builder()?;
        let meta = entry.metadata(builder.as_ref());
        let output = entry.output_path(&settings);

        let mut observer = progress::for_stderr();
        let report = pipeline::build(builder.as_ref(), &meta, &output, &settings, observer.as_mut())
            .with_context(|| format!("building {} from {}", entry.id, entry.input.display()))?;
        println!("{report}\n");
    }

    println!("Built {} packs in {:.1}s", total, t0.elapsed().as_secs_f64());
    Ok(())
}
